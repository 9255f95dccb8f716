// Re-export glam for convenience
pub use glam::*;

mod interval;
mod ray;

pub use interval::Interval;
pub use ray::Ray;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glam_reexport_covers_vector_algebra() {
        // The re-exported Vec3 is what the whole workspace builds on:
        // dot/cross/normalize must come through intact
        let right = Vec3::X;
        let up = Vec3::Y;

        assert_eq!(right.cross(up), Vec3::Z);
        assert_eq!(right.dot(up), 0.0);
        assert!((Vec3::new(3.0, 0.0, 4.0).normalize().length() - 1.0).abs() < 1e-6);
    }
}
