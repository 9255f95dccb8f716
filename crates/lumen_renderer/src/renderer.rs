//! Render scheduler.
//!
//! Drives per-pixel sampling across a bounded worker pool. Every pixel
//! is an independent task: it seeds its own random stream from its
//! linear index, so the finished buffer is byte-identical for the same
//! inputs regardless of thread count or scheduling order. The buffer's
//! disjoint per-pixel cells are the only shared mutable state, which is
//! why no locking is needed on the write path.

use crate::buffer::{ColorBuffer, BYTES_PER_PIXEL};
use crate::camera::Camera;
use crate::material::Color;
use crate::rng::Rng;
use crate::shape::Scene;
use crate::tracer::{trace, Sky};
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use thiserror::Error;

/// Errors surfaced by a render run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The render was cancelled before every pixel was processed.
    #[error("render was cancelled before all pixels were processed")]
    Cancelled,

    /// A pixel task failed; the failure already triggered cancellation.
    #[error("pixel task at ({x}, {y}) failed")]
    PixelFailed { x: usize, y: usize },

    /// The render parameters are unusable.
    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),
}

/// Render parameters.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
    /// Camera rays drawn per pixel
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Worker pool size; pixels in flight never exceed this
    pub concurrency: usize,
    /// Sky gradient sampled by escaping rays, or none for black
    pub sky: Option<Sky>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 450,
            samples_per_pixel: 100,
            max_depth: 10,
            concurrency: std::thread::available_parallelism().map_or(1, |n| n.get()),
            sky: None,
        }
    }
}

impl RenderConfig {
    fn validate(&self) -> Result<(), RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "image dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(RenderError::InvalidConfig(
                "samples per pixel must be positive".into(),
            ));
        }
        if self.concurrency == 0 {
            return Err(RenderError::InvalidConfig(
                "concurrency limit must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Path tracing renderer: a camera, a scene and render parameters.
pub struct Renderer {
    camera: Camera,
    scene: Scene,
    config: RenderConfig,
}

impl Renderer {
    pub fn new(camera: Camera, scene: Scene, config: RenderConfig) -> Self {
        Self {
            camera,
            scene,
            config,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render the scene into a fresh color buffer.
    ///
    /// Fails fast: the first pixel task failure cancels the whole
    /// render (in-flight pixels drain), and a cancelled render never
    /// yields a partially filled buffer.
    pub fn render(&self) -> Result<ColorBuffer, RenderError> {
        self.config.validate()?;

        let width = self.config.width;
        let height = self.config.height;
        log::info!(
            "rendering {}x{} at {} spp, depth {}, {} workers",
            width,
            height,
            self.config.samples_per_pixel,
            self.config.max_depth,
            self.config.concurrency
        );

        dispatch(width, height, self.config.concurrency, |x, y, index| {
            self.render_pixel(x, y, index)
        })
    }

    /// Sample one pixel: jittered camera rays, traced and averaged.
    fn render_pixel(&self, x: usize, y: usize, index: usize) -> [u8; 3] {
        let mut rng = Rng::seed(index as u32);
        let mut color = Color::ZERO;

        for _ in 0..self.config.samples_per_pixel {
            let u = (x as f32 + rng.next_f32()) / self.config.width as f32;
            let v = (y as f32 + rng.next_f32()) / self.config.height as f32;

            let ray = self.camera.get_ray(u, v, &mut rng);
            color += trace(
                &ray,
                &self.scene,
                self.config.sky.as_ref(),
                self.config.max_depth,
                &mut rng,
            );
        }

        ColorBuffer::color_to_bytes(color / self.config.samples_per_pixel as f32)
    }
}

/// Run a pixel function over every coordinate on a bounded worker pool.
///
/// The pool size is the concurrency limit. A shared flag provides
/// cooperative one-shot cancellation: it is checked before each pixel
/// starts, and any pixel failure sets it so no further pixels are
/// dispatched while in-flight ones drain.
fn dispatch<F>(
    width: usize,
    height: usize,
    concurrency: usize,
    pixel_fn: F,
) -> Result<ColorBuffer, RenderError>
where
    F: Fn(usize, usize, usize) -> [u8; 3] + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency)
        .build()
        .map_err(|e| RenderError::InvalidConfig(e.to_string()))?;

    let mut buffer = ColorBuffer::new(width, height);
    let cancelled = AtomicBool::new(false);
    let processed = AtomicUsize::new(0);
    let first_failure: Mutex<Option<(usize, usize)>> = Mutex::new(None);

    let outcome = pool.install(|| {
        buffer
            .bytes_mut()
            .par_chunks_mut(BYTES_PER_PIXEL)
            .enumerate()
            .try_for_each(|(index, cell)| {
                if cancelled.load(Ordering::Relaxed) {
                    return Err(RenderError::Cancelled);
                }

                let x = index % width;
                let y = index / width;

                match panic::catch_unwind(AssertUnwindSafe(|| pixel_fn(x, y, index))) {
                    Ok(rgb) => {
                        cell.copy_from_slice(&rgb);

                        let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
                        if done % width == 0 {
                            log::info!("processed scanlines: {} of {}", done / width, height);
                        }
                        Ok(())
                    }
                    Err(payload) => {
                        cancelled.store(true, Ordering::Relaxed);
                        let message = panic_message(&payload);
                        log::error!("pixel task ({x}, {y}) failed: {message}");
                        first_failure
                            .lock()
                            .unwrap_or_else(|e| e.into_inner())
                            .get_or_insert((x, y));
                        Err(RenderError::PixelFailed { x, y })
                    }
                }
            })
    });

    match outcome {
        Ok(()) => Ok(buffer),
        // Report the failing pixel if there was one; the error rayon
        // hands back may be a secondary Cancelled from another worker
        Err(_) => match *first_failure.lock().unwrap_or_else(|e| e.into_inner()) {
            Some((x, y)) => Err(RenderError::PixelFailed { x, y }),
            None => Err(RenderError::Cancelled),
        },
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::shape::Sphere;
    use lumen_math::Vec3;

    fn demo_renderer(width: usize, height: usize, concurrency: usize) -> Renderer {
        let camera = Camera::new(2.0, 2.0, 1.0, Vec3::ZERO, Vec3::NEG_Z);

        let mut scene = Scene::new();
        scene.add(Sphere::new(
            Vec3::new(0.0, 0.0, -2.0),
            0.5,
            Material::diffuse(Vec3::new(0.8, 0.3, 0.3)),
        ));
        scene.add(Sphere::new(
            Vec3::new(0.0, 8.0, -2.0),
            6.0,
            Material::emissive(Vec3::ONE, 2.0),
        ));

        let config = RenderConfig {
            width,
            height,
            samples_per_pixel: 8,
            max_depth: 4,
            concurrency,
            sky: Some(Sky::daylight()),
        };

        Renderer::new(camera, scene, config)
    }

    #[test]
    fn test_render_fills_buffer() {
        let buffer = demo_renderer(16, 12, 2).render().expect("render succeeds");

        assert_eq!(buffer.width(), 16);
        assert_eq!(buffer.height(), 12);
        // Sky alone guarantees non-black pixels
        assert!(buffer.as_bytes().iter().any(|&b| b > 0));
    }

    #[test]
    fn test_render_deterministic_across_thread_counts() {
        let single = demo_renderer(16, 12, 1).render().unwrap();
        let multi = demo_renderer(16, 12, 4).render().unwrap();
        let again = demo_renderer(16, 12, 4).render().unwrap();

        assert_eq!(single.as_bytes(), multi.as_bytes());
        assert_eq!(multi.as_bytes(), again.as_bytes());
    }

    #[test]
    fn test_black_scene_renders_black() {
        let camera = Camera::new(2.0, 2.0, 1.0, Vec3::ZERO, Vec3::NEG_Z);
        let mut scene = Scene::new();
        scene.add(Sphere::new(
            Vec3::new(0.0, 0.0, -2.0),
            0.5,
            Material::diffuse(Vec3::splat(0.5)),
        ));

        let config = RenderConfig {
            width: 8,
            height: 8,
            samples_per_pixel: 4,
            max_depth: 4,
            concurrency: 2,
            sky: None,
        };

        let buffer = Renderer::new(camera, scene, config).render().unwrap();
        assert!(buffer.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let make = |width, samples, concurrency| {
            let camera = Camera::new(2.0, 2.0, 1.0, Vec3::ZERO, Vec3::NEG_Z);
            let config = RenderConfig {
                width,
                height: 8,
                samples_per_pixel: samples,
                max_depth: 2,
                concurrency,
                sky: None,
            };
            Renderer::new(camera, Scene::new(), config).render()
        };

        assert!(matches!(make(0, 4, 1), Err(RenderError::InvalidConfig(_))));
        assert!(matches!(make(8, 0, 1), Err(RenderError::InvalidConfig(_))));
        assert!(matches!(make(8, 4, 0), Err(RenderError::InvalidConfig(_))));
    }

    #[test]
    fn test_pixel_failure_cancels_render() {
        // A poisoned pixel aborts the whole render instead of leaving
        // a silently corrupt buffer
        let result = dispatch(8, 8, 2, |x, y, _| {
            if x == 5 && y == 3 {
                panic!("injected failure");
            }
            [0, 0, 0]
        });

        assert_eq!(result, Err(RenderError::PixelFailed { x: 5, y: 3 }));
    }

    #[test]
    fn test_dispatch_coordinates_are_row_major() {
        let buffer = dispatch(4, 3, 1, |x, y, index| {
            assert_eq!(index, y * 4 + x);
            [index as u8, x as u8, y as u8]
        })
        .unwrap();

        assert_eq!(buffer.read(2, 1), [6, 2, 1]);
    }

    #[test]
    fn test_max_depth_zero_is_background_only() {
        // With no bounces allowed, no material shading ever applies
        let camera = Camera::new(2.0, 2.0, 1.0, Vec3::ZERO, Vec3::NEG_Z);
        let mut scene = Scene::new();
        scene.add(Sphere::new(
            Vec3::new(0.0, 0.0, -2.0),
            0.5,
            Material::emissive(Vec3::ONE, 100.0),
        ));

        let config = RenderConfig {
            width: 8,
            height: 8,
            samples_per_pixel: 4,
            max_depth: 0,
            concurrency: 1,
            sky: None,
        };

        let buffer = Renderer::new(camera, scene, config).render().unwrap();
        assert!(buffer.as_bytes().iter().all(|&b| b == 0));
    }
}
