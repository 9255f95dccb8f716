//! Deterministic per-pixel random number generation.
//!
//! The generator is a pure hash-and-permute of a 32-bit state (PCG
//! style), not an object with hidden mutable fields: every draw maps
//! the current state to the next. Each pixel seeds its own state from
//! its linear index, so streams never cross pixel boundaries and the
//! render is reproducible regardless of thread count.

use lumen_math::Vec3;
use std::f32::consts::TAU;

/// Advance a 32-bit PCG state by one hash-and-permute step.
#[inline]
pub fn pcg_hash(state: u32) -> u32 {
    let state = state.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
    let word = ((state >> ((state >> 28) + 4)) ^ state).wrapping_mul(277_803_737);
    (word >> 22) ^ word
}

/// A per-pixel random stream. Copy, 4 bytes, never shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rng {
    state: u32,
}

impl Rng {
    /// Seed a stream, typically from a pixel's linear index.
    pub fn seed(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next value in [0, 1).
    ///
    /// Uses the top 24 bits so the conversion to f32 is exact and the
    /// result can never round up to 1.0.
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        self.state = pcg_hash(self.state);
        (self.state >> 8) as f32 * (1.0 / 16_777_216.0)
    }

    /// Standard normal deviate via Box-Muller.
    pub fn normal(&mut self) -> f32 {
        let theta = TAU * self.next_f32();
        // 1 - u keeps the argument in (0, 1]; ln(0) is -inf
        let rho = (-2.0 * (1.0 - self.next_f32()).ln()).sqrt();
        rho * theta.cos()
    }

    /// Isotropic unit direction from three normal deviates.
    pub fn unit_sphere(&mut self) -> Vec3 {
        Vec3::new(self.normal(), self.normal(), self.normal()).normalize()
    }

    /// Unit-sphere point flipped onto the hemisphere around `normal`.
    pub fn unit_hemisphere(&mut self, normal: Vec3) -> Vec3 {
        let p = self.unit_sphere();
        if p.dot(normal) >= 0.0 {
            p
        } else {
            -p
        }
    }

    /// Cosine-weighted direction on the hemisphere around `normal`.
    pub fn cosine_hemisphere(&mut self, normal: Vec3) -> Vec3 {
        (normal + self.unit_sphere()).normalize()
    }

    /// Point in a disk of the given radius, as (x, y) offsets.
    pub fn in_disk(&mut self, radius: f32) -> (f32, f32) {
        loop {
            let x = self.next_f32() * 2.0 - 1.0;
            let y = self.next_f32() * 2.0 - 1.0;
            if x * x + y * y < 1.0 {
                return (x * radius, y * radius);
            }
        }
    }
}
