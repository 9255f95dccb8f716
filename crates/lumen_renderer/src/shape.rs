//! Shape primitives and ray-shape intersection.

use crate::material::Material;
use lumen_math::{Interval, Ray, Vec3};

/// Record of a ray-shape intersection.
///
/// Stack-scoped to a single intersection test or bounce step.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub point: Vec3,
    /// Unit surface normal, always flipped to oppose the incoming ray
    pub normal: Vec3,
    /// Root (distance along the ray) where the intersection occurs
    pub t: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// Material of the hit shape
    pub material: &'a Material,
}

/// A sphere primitive with an owned material.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Material,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Material) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Outward unit normal at a point on the surface.
    pub fn outward_normal(&self, point: Vec3) -> Vec3 {
        (point - self.center) / self.radius
    }

    /// Ray-sphere intersection.
    ///
    /// Substituting the ray P(t) = A + t*b into the implicit sphere
    /// equation (P - C)·(P - C) = r^2 gives a quadratic in t; solved
    /// here in the half-b form. The near root is tried first, the far
    /// root is the fallback for rays starting inside the sphere.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let oc = ray.origin() - self.center;
        let a = ray.direction().length_squared();
        let half_b = oc.dot(ray.direction());
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }

        // Find the nearest root in the acceptable range
        let sqrtd = discriminant.sqrt();
        let mut root = (-half_b - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (-half_b + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let point = ray.at(root);
        let outward = self.outward_normal(point);
        let front_face = ray.direction().dot(outward) < 0.0;

        Some(HitRecord {
            point,
            normal: if front_face { outward } else { -outward },
            t: root,
            front_face,
            material: &self.material,
        })
    }
}

/// Closed set of intersectable primitives.
///
/// A tagged enum rather than trait objects: the primitive set is fixed
/// and dispatch stays branch-predictable in the intersection loop.
#[derive(Debug, Clone)]
pub enum Shape {
    Sphere(Sphere),
}

impl Shape {
    /// Test the ray against this shape within the given root interval.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        match self {
            Shape::Sphere(sphere) => sphere.hit(ray, ray_t),
        }
    }

    /// Outward unit normal at a point on the surface.
    pub fn outward_normal(&self, point: Vec3) -> Vec3 {
        match self {
            Shape::Sphere(sphere) => sphere.outward_normal(point),
        }
    }
}

impl From<Sphere> for Shape {
    fn from(sphere: Sphere) -> Self {
        Shape::Sphere(sphere)
    }
}

/// An ordered, immutable collection of shapes.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    shapes: Vec<Shape>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from an existing shape list.
    pub fn from_shapes(shapes: Vec<Shape>) -> Self {
        Self { shapes }
    }

    /// Add a shape to the scene.
    pub fn add(&mut self, shape: impl Into<Shape>) {
        self.shapes.push(shape.into());
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Find the nearest intersection over all shapes.
    ///
    /// Linear scan that shrinks the upper root bound to the closest
    /// hit found so far.
    pub fn nearest_hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut closest = ray_t;
        let mut nearest = None;

        for shape in &self.shapes {
            if let Some(rec) = shape.hit(ray, closest) {
                debug_assert!(
                    closest.contains(rec.t),
                    "intersection root outside the queried interval"
                );
                closest = closest.with_max(rec.t);
                nearest = Some(rec);
            }
        }

        nearest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_sphere_at(center: Vec3) -> Sphere {
        Sphere::new(center, 0.5, Material::diffuse(Vec3::splat(0.5)))
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = unit_sphere_at(Vec3::new(0.0, 0.0, -1.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let rec = sphere
            .hit(&ray, Interval::new(0.001, f32::INFINITY))
            .expect("ray through center must hit");
        assert!((rec.t - 0.5).abs() < 0.001);
        assert!(rec.front_face);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = unit_sphere_at(Vec3::new(0.0, 0.0, -1.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));

        assert!(sphere.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_hit_point_on_surface() {
        // Any reported hit lies on the sphere within tolerance
        let sphere = Sphere::new(Vec3::new(1.0, 2.0, -3.0), 1.25, Material::default());
        let mut rng = crate::rng::Rng::seed(3);

        for _ in 0..200 {
            let dir = rng.unit_sphere();
            let ray = Ray::new(Vec3::new(0.5, 0.0, 0.0), dir);
            if let Some(rec) = sphere.hit(&ray, Interval::new(0.001, f32::INFINITY)) {
                let residual = ((rec.point - sphere.center()).length() - sphere.radius()).abs();
                assert!(residual < 1e-3, "residual {residual}");
                assert!(rec.t >= 0.001);
            }
        }
    }

    #[test]
    fn test_front_face_consistency() {
        let sphere = unit_sphere_at(Vec3::new(0.0, 0.0, -1.0));

        // From outside: front face, normal opposes the ray
        let outside = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = sphere
            .hit(&outside, Interval::new(0.001, f32::INFINITY))
            .unwrap();
        let geometric = sphere.outward_normal(rec.point);
        assert_eq!(rec.front_face, outside.direction().dot(geometric) < 0.0);
        assert!(rec.normal.dot(outside.direction()) < 0.0);

        // From inside: back face, stored normal still opposes the ray
        let inside = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = sphere
            .hit(&inside, Interval::new(0.001, f32::INFINITY))
            .unwrap();
        assert!(!rec.front_face);
        assert!(rec.normal.dot(inside.direction()) < 0.0);
    }

    #[test]
    fn test_far_root_from_inside() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0, Material::default());
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        // Near root is negative; the far root at t=1 must be picked
        let rec = sphere.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_nearest_hit_picks_closest() {
        let mut scene = Scene::new();
        scene.add(unit_sphere_at(Vec3::new(0.0, 0.0, -3.0)));
        scene.add(unit_sphere_at(Vec3::new(0.0, 0.0, -1.5)));
        scene.add(unit_sphere_at(Vec3::new(0.0, 0.0, -6.0)));

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = scene
            .nearest_hit(&ray, Interval::new(0.001, f32::INFINITY))
            .unwrap();

        // Closest sphere front face is at z = -1.0
        assert!((rec.t - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_nearest_hit_empty_scene() {
        let scene = Scene::new();
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        assert!(scene
            .nearest_hit(&ray, Interval::new(0.001, f32::INFINITY))
            .is_none());
    }
}
