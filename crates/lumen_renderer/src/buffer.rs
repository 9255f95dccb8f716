//! Flat 8-bit color buffer, the render target.

use crate::material::Color;

/// Bytes per pixel; colors are stored as packed RGB.
pub const BYTES_PER_PIXEL: usize = 3;

/// A width x height grid of RGB bytes, row-major.
///
/// Row 0 is the *bottom* of the image, matching the camera's
/// bottom-left-origin viewport. Each cell is written exactly once by
/// the pixel task that owns its coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl ColorBuffer {
    /// Create a buffer filled with black.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * BYTES_PER_PIXEL],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Convert a [0, 1] color to its packed byte form.
    pub fn color_to_bytes(color: Color) -> [u8; 3] {
        let clamped = color.clamp(Color::ZERO, Color::ONE);
        [
            (clamped.x * 255.0) as u8,
            (clamped.y * 255.0) as u8,
            (clamped.z * 255.0) as u8,
        ]
    }

    /// Write a color at the given coordinate (row 0 at the bottom).
    pub fn write(&mut self, x: usize, y: usize, color: Color) {
        let i = self.index(x, y);
        self.data[i..i + BYTES_PER_PIXEL].copy_from_slice(&Self::color_to_bytes(color));
    }

    /// Read back the packed bytes at the given coordinate.
    pub fn read(&self, x: usize, y: usize) -> [u8; 3] {
        let i = self.index(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// The raw RGB bytes, row-major, bottom row first.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, yielding the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        BYTES_PER_PIXEL * (y * self.width + x)
    }
}
