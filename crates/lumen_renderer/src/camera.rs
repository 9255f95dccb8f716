//! Camera for ray generation.

use crate::rng::Rng;
use lumen_math::{Ray, Vec3};

/// World-up reference axis for the camera basis.
const WORLD_UP: Vec3 = Vec3::Y;

/// Camera mapping viewport coordinates to world-space rays.
///
/// The viewport plane sits `focal_length` along the look direction;
/// (u, v) in [0, 1] address it with the origin at the bottom left.
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Vec3,
    look: Vec3,
    right: Vec3,
    up: Vec3,
    viewport_width: f32,
    viewport_height: f32,
    focal_length: f32,
    defocus_strength: f32,
}

impl Camera {
    /// Create a camera.
    ///
    /// A look direction parallel to world-up would make the basis
    /// cross products vanish; the reference axis falls back to +X in
    /// that case.
    pub fn new(
        viewport_height: f32,
        viewport_width: f32,
        focal_length: f32,
        origin: Vec3,
        look_direction: Vec3,
    ) -> Self {
        let look = look_direction.normalize();

        let mut right = look.cross(WORLD_UP);
        if right.length_squared() < 1e-8 {
            right = look.cross(Vec3::X);
        }
        let right = right.normalize();
        let up = right.cross(look).normalize();

        Self {
            origin,
            look,
            right,
            up,
            viewport_width,
            viewport_height,
            focal_length,
            defocus_strength: 0.0,
        }
    }

    /// Enable lens defocus (depth of field) with the given strength.
    pub fn with_defocus(mut self, defocus_strength: f32) -> Self {
        self.defocus_strength = defocus_strength;
        self
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn look_direction(&self) -> Vec3 {
        self.look
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Bottom-left corner of the viewport plane.
    fn viewport_bottom_left(&self) -> Vec3 {
        self.origin - self.viewport_width * self.right / 2.0
            - self.viewport_height * self.up / 2.0
            + self.focal_length * self.look
    }

    /// Ray from the camera toward (u, v) on the viewport, u and v in
    /// [0, 1] with (0, 0) at the bottom left.
    ///
    /// With a positive defocus strength the ray origin is jittered on
    /// a lens disk, simulating a finite aperture.
    pub fn get_ray(&self, u: f32, v: f32, rng: &mut Rng) -> Ray {
        let target = self.viewport_bottom_left()
            + u * self.viewport_width * self.right
            + v * self.viewport_height * self.up;

        let origin = if self.defocus_strength > 0.0 {
            let (dx, dy) = rng.in_disk(self.defocus_strength);
            self.origin + dx * self.right + dy * self.up
        } else {
            self.origin
        };

        Ray::new(origin, target - origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_camera() -> Camera {
        Camera::new(
            2.0,
            2.0 * 16.0 / 9.0,
            1.0,
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, -1.0),
        )
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let camera = test_camera();

        assert!(camera.right().dot(camera.up()).abs() < 1e-6);
        assert!(camera.right().dot(camera.look_direction()).abs() < 1e-6);
        assert!((camera.right().length() - 1.0).abs() < 1e-6);
        assert!((camera.up().length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_center_ray_matches_look() {
        let camera = test_camera();
        let mut rng = Rng::seed(1);

        let ray = camera.get_ray(0.5, 0.5, &mut rng);
        assert!((ray.direction() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_viewport_orientation() {
        let camera = test_camera();
        let mut rng = Rng::seed(1);

        // Larger v aims higher, larger u aims right
        let low = camera.get_ray(0.5, 0.1, &mut rng);
        let high = camera.get_ray(0.5, 0.9, &mut rng);
        assert!(high.direction().y > low.direction().y);

        let left = camera.get_ray(0.1, 0.5, &mut rng);
        let right = camera.get_ray(0.9, 0.5, &mut rng);
        assert!(right.direction().x > left.direction().x);
    }

    #[test]
    fn test_degenerate_look_direction() {
        // Looking straight up must still produce a finite basis
        let camera = Camera::new(2.0, 2.0, 1.0, Vec3::ZERO, Vec3::Y);

        assert!(camera.right().is_finite());
        assert!(camera.up().is_finite());
        assert!((camera.right().length() - 1.0).abs() < 1e-6);

        let mut rng = Rng::seed(1);
        let ray = camera.get_ray(0.5, 0.5, &mut rng);
        assert!(ray.direction().is_finite());
    }

    #[test]
    fn test_defocus_jitters_origin() {
        let camera = test_camera().with_defocus(0.5);
        let mut rng = Rng::seed(9);

        let mut moved = false;
        for _ in 0..16 {
            let ray = camera.get_ray(0.5, 0.5, &mut rng);
            if ray.origin() != Vec3::ZERO {
                moved = true;
            }
            // Jitter stays on the lens disk
            assert!((ray.origin() - Vec3::ZERO).length() <= 0.5 + 1e-6);
        }
        assert!(moved);
    }

    #[test]
    fn test_no_defocus_fixed_origin() {
        let camera = test_camera();
        let mut rng = Rng::seed(9);

        for _ in 0..16 {
            assert_eq!(camera.get_ray(0.3, 0.7, &mut rng).origin(), Vec3::ZERO);
        }
    }
}
