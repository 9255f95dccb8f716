//! Recursive Monte Carlo light transport.
//!
//! A single top-level `trace` call follows one camera ray through the
//! scene, branching at partially reflective surfaces, and yields the
//! full radiance contribution of the path tree. The carried throughput
//! is attenuated by surface colors and Beer-Lambert absorption; any
//! emission met along the way is weighted by it and accumulated.

use crate::material::{reflect, reflectance, refract, Color};
use crate::rng::Rng;
use crate::shape::Scene;
use lumen_math::{Interval, Ray};

/// Lower root bound for bounce rays, suppresses self-intersection at
/// the origin of a freshly spawned ray.
pub const ROOT_MIN: f32 = 1e-3;

/// Index of refraction of the surrounding medium.
const AIR_IOR: f32 = 1.0;

/// Vertical sky gradient sampled by escaping rays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sky {
    /// Color at the horizon-down direction.
    pub bottom: Color,
    /// Color straight up.
    pub top: Color,
}

impl Sky {
    /// Classic white-to-blue daylight gradient.
    pub fn daylight() -> Self {
        Self {
            bottom: Color::ONE,
            top: Color::new(0.5, 0.7, 1.0),
        }
    }

    /// Radiance for a ray leaving the scene.
    pub fn sample(&self, ray: &Ray) -> Color {
        let a = 0.5 * (ray.direction().y + 1.0);
        self.bottom.lerp(self.top, a)
    }
}

/// Estimate the radiance arriving along `ray`.
pub fn trace(ray: &Ray, scene: &Scene, sky: Option<&Sky>, max_depth: u32, rng: &mut Rng) -> Color {
    let mut radiance = Color::ZERO;
    trace_impl(
        ray,
        scene,
        sky,
        max_depth,
        Color::ONE,
        false,
        &mut radiance,
        rng,
    );
    radiance
}

/// Beer-Lambert attenuation over a segment traveled inside a medium.
fn absorb(throughput: Color, absorbance: f32, absorbance_color: Color, distance: f32) -> Color {
    throughput * (-absorbance * absorbance_color * distance).exp()
}

#[allow(clippy::too_many_arguments)]
fn trace_impl(
    ray: &Ray,
    scene: &Scene,
    sky: Option<&Sky>,
    depth: u32,
    throughput: Color,
    in_medium: bool,
    radiance: &mut Color,
    rng: &mut Rng,
) {
    if depth == 0 {
        return;
    }

    let Some(rec) = scene.nearest_hit(ray, Interval::new(ROOT_MIN, f32::INFINITY)) else {
        if let Some(sky) = sky {
            *radiance += throughput * sky.sample(ray);
        }
        return;
    };

    let material = rec.material;

    // Emission is unconditionally additive along the path
    if material.is_emissive() {
        *radiance += material.emission_color * material.emission_strength * throughput;
    }

    // The segment just traveled ran inside an absorbing medium
    let throughput = if in_medium && material.absorbance > 0.0 {
        absorb(throughput, material.absorbance, material.absorbance_color, rec.t)
    } else {
        throughput
    };

    // Reflection branch: diffuse or specular scatter off the surface
    if material.reflectivity > 0.0 && rec.front_face {
        let specular_bounce = rng.next_f32() < material.specular_probability;
        let diffuse_dir = rng.cosine_hemisphere(rec.normal);

        let direction = if specular_bounce {
            let mut specular_dir = reflect(ray.direction(), rec.normal);
            if material.fuzz > 0.0 {
                let mut perturbation = material.fuzz * rng.unit_sphere();
                // Keep the lobe in the forward hemisphere: negate the
                // perturbation rather than discarding the sample
                if (specular_dir + perturbation).dot(rec.normal) < 0.0 {
                    perturbation = -perturbation;
                }
                specular_dir += perturbation;
            }
            diffuse_dir.lerp(specular_dir, material.smoothness)
        } else {
            diffuse_dir
        };

        let tint = if specular_bounce {
            material.specular_color
        } else {
            material.color
        };

        trace_impl(
            &Ray::new(rec.point, direction),
            scene,
            sky,
            depth - 1,
            throughput * tint * material.reflectivity,
            in_medium,
            radiance,
            rng,
        );
    }

    // Transmission branch: the dielectric part of the energy
    if material.reflectivity < 1.0 {
        let refraction_ratio = if rec.front_face {
            AIR_IOR / material.ior
        } else {
            material.ior
        };

        let cos_theta = (-ray.direction()).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let (direction, in_medium) =
            if cannot_refract || reflectance(cos_theta, refraction_ratio) > rng.next_f32() {
                (reflect(ray.direction(), rec.normal), in_medium)
            } else {
                // Crossing the boundary toggles absorption for the next segment
                (
                    refract(ray.direction(), rec.normal, refraction_ratio),
                    !in_medium,
                )
            };

        trace_impl(
            &Ray::new(rec.point, direction),
            scene,
            sky,
            depth - 1,
            throughput * material.color * (1.0 - material.reflectivity),
            in_medium,
            radiance,
            rng,
        );
    }
}
