//! Point/segment geometry
//!
//! All inputs are expected in one shared (world) coordinate frame.

use glam::{Mat4, Vec3};

/// Euclidean distance from `point` to the segment `segment_start`→`segment_end`
///
/// The closest point is clamped to the segment: parameters at or before the
/// start measure to `segment_start`, parameters at or past the end measure to
/// `segment_end`. A zero-length segment degenerates to a point distance.
pub fn distance_point_to_segment(point: Vec3, segment_start: Vec3, segment_end: Vec3) -> f32 {
    let to_point = point - segment_start;
    let segment = segment_end - segment_start;

    let len2 = segment.length_squared();
    if len2 == 0.0 {
        return to_point.length();
    }

    let t = to_point.dot(segment) / len2;
    if t <= 0.0 {
        to_point.length()
    } else if t >= 1.0 {
        (point - segment_end).length()
    } else {
        (point - (segment_start + t * segment)).length()
    }
}

/// Arithmetic mean of `points`, or `fallback` when there are none
pub fn mean_or(points: impl IntoIterator<Item = Vec3>, fallback: Vec3) -> Vec3 {
    let mut total = Vec3::ZERO;
    let mut count = 0usize;
    for p in points {
        total += p;
        count += 1;
    }

    if count == 0 {
        fallback
    } else {
        total / count as f32
    }
}

/// World-space center of mass of object-local `vertices`
///
/// Vertices are transformed by `world` before averaging. An empty vertex set
/// yields the object's world-space origin.
pub fn center_of_mass(vertices: &[Vec3], world: Mat4) -> Vec3 {
    let origin = world.w_axis.truncate();
    mean_or(vertices.iter().map(|&v| world.transform_point3(v)), origin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    const EPSILON: f32 = 1e-5;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    fn sample_points() -> Vec<Vec3> {
        vec![
            Vec3::ZERO,
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-4.0, 0.5, 2.0),
            Vec3::new(0.0, 0.0, -7.5),
            Vec3::new(3.25, -1.0, 0.0),
        ]
    }

    // ========================================================================
    // distance_point_to_segment
    // ========================================================================

    #[test]
    fn test_degenerate_segment_is_point_distance() {
        let a = Vec3::new(1.0, -2.0, 0.5);
        for p in sample_points() {
            assert_close(distance_point_to_segment(p, a, a), (p - a).length());
        }
    }

    #[test]
    fn test_points_on_segment_have_zero_distance() {
        let start = Vec3::new(-1.0, 2.0, 0.0);
        let end = Vec3::new(3.0, -2.0, 4.0);
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            let p = start.lerp(end, t);
            assert_close(distance_point_to_segment(p, start, end), 0.0);
        }
    }

    #[test]
    fn test_symmetric_under_endpoint_swap() {
        let start = Vec3::new(0.0, 0.0, 0.0);
        let end = Vec3::new(2.0, 1.0, -1.0);
        for p in sample_points() {
            assert_close(
                distance_point_to_segment(p, start, end),
                distance_point_to_segment(p, end, start),
            );
        }
    }

    #[test]
    fn test_clamps_before_head() {
        let d = distance_point_to_segment(
            Vec3::new(0.0, 0.0, -5.0),
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 10.0),
        );
        assert_close(d, 5.0);
    }

    #[test]
    fn test_clamps_past_tail() {
        let d = distance_point_to_segment(
            Vec3::new(3.0, 0.0, 14.0),
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 10.0),
        );
        assert_close(d, 5.0);
    }

    #[test]
    fn test_perpendicular_distance_inside_segment() {
        let d = distance_point_to_segment(
            Vec3::new(3.0, 4.0, 5.0),
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 10.0),
        );
        assert_close(d, 5.0);
    }

    #[test]
    fn test_distance_is_never_negative() {
        let start = Vec3::new(1.0, 1.0, 1.0);
        let end = Vec3::new(-1.0, 4.0, 2.0);
        for p in sample_points() {
            assert!(distance_point_to_segment(p, start, end) >= 0.0);
        }
    }

    // ========================================================================
    // Center of mass
    // ========================================================================

    #[test]
    fn test_mean_of_points() {
        let points = [Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 4.0, -6.0)];
        let mean = mean_or(points, Vec3::splat(99.0));
        assert!(mean.abs_diff_eq(Vec3::new(1.0, 2.0, -3.0), EPSILON));
    }

    #[test]
    fn test_mean_of_empty_set_uses_fallback() {
        let fallback = Vec3::new(7.0, 8.0, 9.0);
        assert_eq!(mean_or(std::iter::empty(), fallback), fallback);
    }

    #[test]
    fn test_center_of_mass_applies_world_transform() {
        let world = Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            Quat::IDENTITY,
            Vec3::new(10.0, 0.0, 0.0),
        );
        let vertices = [Vec3::new(1.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 2.0)];
        let center = center_of_mass(&vertices, world);
        assert!(center.abs_diff_eq(Vec3::new(10.0, 0.0, 2.0), EPSILON));
    }

    #[test]
    fn test_center_of_mass_empty_mesh_is_object_origin() {
        let world = Mat4::from_rotation_translation(
            Quat::from_rotation_z(1.0),
            Vec3::new(-3.0, 4.0, 5.0),
        );
        let center = center_of_mass(&[], world);
        assert!(center.abs_diff_eq(Vec3::new(-3.0, 4.0, 5.0), EPSILON));
    }
}
