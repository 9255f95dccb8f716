//! Surface material description.

use lumen_math::Vec3;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Value-type material attached to a shape. Immutable during a render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Base surface color.
    pub color: Color,
    /// Tint applied when a bounce is sampled as specular.
    pub specular_color: Color,
    /// Emission color; meaningful only with a non-zero strength.
    pub emission_color: Color,
    /// Emission strength. 0 means the surface emits no light.
    pub emission_strength: f32,
    /// Diffuse-to-mirror blend for specular bounces. 1.0 is a perfect mirror.
    pub smoothness: f32,
    /// Probability a bounce is treated as specular rather than diffuse.
    pub specular_probability: f32,
    /// Fraction of energy that reflects rather than transmits.
    /// 1.0 is fully opaque, 0.0 fully transmissive.
    pub reflectivity: f32,
    /// Index of refraction; meaningful only when transmissive.
    pub ior: f32,
    /// Specular lobe perturbation radius.
    pub fuzz: f32,
    /// Beer-Lambert extinction coefficient inside the medium.
    pub absorbance: f32,
    /// Per-channel extinction tint inside the medium.
    pub absorbance_color: Color,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::ONE,
            specular_color: Color::ONE,
            emission_color: Color::ZERO,
            emission_strength: 0.0,
            smoothness: 0.0,
            specular_probability: 0.0,
            reflectivity: 1.0,
            ior: 1.0,
            fuzz: 0.0,
            absorbance: 0.0,
            absorbance_color: Color::ZERO,
        }
    }
}

impl Material {
    /// Matte surface with the given base color.
    pub fn diffuse(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// Perfect mirror with the given tint.
    pub fn mirror(color: Color) -> Self {
        Self {
            color,
            specular_color: color,
            smoothness: 1.0,
            specular_probability: 1.0,
            ..Self::default()
        }
    }

    /// Polished surface: specular with a probability, diffuse otherwise.
    pub fn glossy(color: Color, smoothness: f32, specular_probability: f32) -> Self {
        Self {
            color,
            smoothness,
            specular_probability,
            ..Self::default()
        }
    }

    /// Clear dielectric with the given index of refraction.
    pub fn glass(ior: f32) -> Self {
        Self {
            reflectivity: 0.0,
            ior,
            smoothness: 1.0,
            specular_probability: 1.0,
            ..Self::default()
        }
    }

    /// Absorbing dielectric (colored glass / liquid).
    pub fn tinted_glass(ior: f32, absorbance: f32, absorbance_color: Color) -> Self {
        Self {
            absorbance,
            absorbance_color,
            ..Self::glass(ior)
        }
    }

    /// Light source with the given emission color and strength.
    pub fn emissive(emission_color: Color, emission_strength: f32) -> Self {
        Self {
            color: Color::ZERO,
            emission_color,
            emission_strength,
            ..Self::default()
        }
    }

    /// Whether the material contributes light of its own.
    pub fn is_emissive(&self) -> bool {
        self.emission_strength > 0.0
    }
}

/// Reflect a vector about a normal.
#[inline]
pub(crate) fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface with the given ratio of
/// refraction indices.
#[inline]
pub(crate) fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

/// Schlick's approximation for Fresnel reflectance.
#[inline]
pub(crate) fn reflectance(cosine: f32, refraction_ratio: f32) -> f32 {
    let r0 = ((1.0 - refraction_ratio) / (1.0 + refraction_ratio)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
