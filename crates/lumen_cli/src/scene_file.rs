//! Scene description files.
//!
//! A scene file is JSON holding the camera record, render parameters,
//! a named material table and the sphere list. Loading resolves
//! material names and produces the plain structs the renderer takes.

use lumen_renderer::{Camera, Material, RenderConfig, Scene, Sky, Sphere, Vec3};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a scene file.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scene file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sphere '{sphere}' references unknown material '{material}'")]
    UnknownMaterial { sphere: String, material: String },
}

fn vec3(v: [f32; 3]) -> Vec3 {
    Vec3::from_array(v)
}

#[derive(Debug, Deserialize)]
pub struct CameraDesc {
    pub viewport_height: f32,
    pub focal_length: f32,
    pub origin: [f32; 3],
    pub look_direction: [f32; 3],
    #[serde(default)]
    pub defocus_strength: f32,
}

#[derive(Debug, Deserialize)]
pub struct RenderDesc {
    pub width: usize,
    pub height: usize,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    /// Worker count; defaults to the host's available parallelism
    #[serde(default)]
    pub threads: Option<usize>,
}

fn default_white() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_reflectivity() -> f32 {
    1.0
}

fn default_ior() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
pub struct MaterialDesc {
    #[serde(default = "default_white")]
    pub color: [f32; 3],
    #[serde(default = "default_white")]
    pub specular_color: [f32; 3],
    #[serde(default)]
    pub emission_color: [f32; 3],
    #[serde(default)]
    pub emission_strength: f32,
    #[serde(default)]
    pub smoothness: f32,
    #[serde(default)]
    pub specular_probability: f32,
    #[serde(default = "default_reflectivity")]
    pub reflectivity: f32,
    #[serde(default = "default_ior")]
    pub ior: f32,
    #[serde(default)]
    pub fuzz: f32,
    #[serde(default)]
    pub absorbance: f32,
    #[serde(default)]
    pub absorbance_color: [f32; 3],
}

impl From<&MaterialDesc> for Material {
    fn from(desc: &MaterialDesc) -> Self {
        Material {
            color: vec3(desc.color),
            specular_color: vec3(desc.specular_color),
            emission_color: vec3(desc.emission_color),
            emission_strength: desc.emission_strength,
            smoothness: desc.smoothness,
            specular_probability: desc.specular_probability,
            reflectivity: desc.reflectivity,
            ior: desc.ior,
            fuzz: desc.fuzz,
            absorbance: desc.absorbance,
            absorbance_color: vec3(desc.absorbance_color),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SphereDesc {
    pub name: String,
    pub center: [f32; 3],
    pub radius: f32,
    pub material: String,
}

#[derive(Debug, Deserialize)]
pub struct SkyDesc {
    pub bottom: [f32; 3],
    pub top: [f32; 3],
}

/// Top-level scene file contents.
#[derive(Debug, Deserialize)]
pub struct SceneFile {
    pub camera: CameraDesc,
    pub render: RenderDesc,
    pub materials: HashMap<String, MaterialDesc>,
    pub spheres: Vec<SphereDesc>,
    #[serde(default)]
    pub sky: Option<SkyDesc>,
}

impl SceneFile {
    /// Load and parse a scene file from disk.
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse scene file contents.
    pub fn parse(contents: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Resolve the description into renderer inputs.
    ///
    /// The viewport width follows from the image aspect ratio.
    pub fn build(&self) -> Result<(Camera, Scene, RenderConfig), SceneError> {
        let aspect = self.render.width as f32 / self.render.height as f32;
        let camera = Camera::new(
            self.camera.viewport_height,
            aspect * self.camera.viewport_height,
            self.camera.focal_length,
            vec3(self.camera.origin),
            vec3(self.camera.look_direction),
        )
        .with_defocus(self.camera.defocus_strength);

        let mut scene = Scene::new();
        for sphere in &self.spheres {
            let material = self.materials.get(&sphere.material).ok_or_else(|| {
                SceneError::UnknownMaterial {
                    sphere: sphere.name.clone(),
                    material: sphere.material.clone(),
                }
            })?;
            scene.add(Sphere::new(
                vec3(sphere.center),
                sphere.radius,
                Material::from(material),
            ));
        }

        let config = RenderConfig {
            width: self.render.width,
            height: self.render.height,
            samples_per_pixel: self.render.samples_per_pixel,
            max_depth: self.render.max_depth,
            concurrency: self
                .render
                .threads
                .unwrap_or_else(|| RenderConfig::default().concurrency),
            sky: self.sky.as_ref().map(|s| Sky {
                bottom: vec3(s.bottom),
                top: vec3(s.top),
            }),
        };

        Ok((camera, scene, config))
    }
}
