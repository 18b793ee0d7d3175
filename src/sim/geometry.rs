//! Oriented rectangles and convex polygon tests
//!
//! Pure functions. Angles are degrees, 0° faces up, clockwise, y points down.

use glam::Vec2;

use crate::consts::*;

/// Which hitbox of an actor to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hitbox {
    Body,
    Turret,
}

impl Hitbox {
    /// (width, height, margin from front) in reference units
    fn dimensions(self) -> (f32, f32, f32) {
        match self {
            Hitbox::Body => (BODY_WIDTH, BODY_HEIGHT, BODY_MARGIN_FRONT),
            Hitbox::Turret => (TURRET_WIDTH, TURRET_HEIGHT, TURRET_MARGIN_FRONT),
        }
    }
}

/// Corners of a hitbox rectangle inside an actor of size `body_w` x `body_h`.
///
/// The hitbox is `rect_w` x `rect_h` reference units, its top edge sits
/// `margin_front` units below the actor's front edge, and the whole thing is
/// scaled by `body_w / HITBOX_REFERENCE_SIZE` before rotating by `angle`
/// about `center`. Corners come back in a fixed winding (front-left,
/// front-right, back-right, back-left in the unrotated frame).
#[allow(clippy::too_many_arguments)]
pub fn rect_corners(
    center: Vec2,
    angle: f32,
    body_w: f32,
    body_h: f32,
    rect_w: f32,
    rect_h: f32,
    margin_front: f32,
) -> [Vec2; 4] {
    let scale = body_w / HITBOX_REFERENCE_SIZE;
    let half_w = rect_w * scale / 2.0;
    let half_h = rect_h * scale / 2.0;
    // Local y grows toward the back of the actor
    let offset_y = margin_front * scale + half_h - body_h / 2.0;

    let rad = angle.to_radians();
    let (sin, cos) = rad.sin_cos();

    let local = [
        Vec2::new(-half_w, -half_h),
        Vec2::new(half_w, -half_h),
        Vec2::new(half_w, half_h),
        Vec2::new(-half_w, half_h),
    ];

    local.map(|p| {
        let y = p.y + offset_y;
        center + Vec2::new(p.x * cos - y * sin, p.x * sin + y * cos)
    })
}

/// Corners of one of the actor's standard hitboxes
#[inline]
pub fn hitbox_corners(center: Vec2, angle: f32, size: Vec2, hitbox: Hitbox) -> [Vec2; 4] {
    let (w, h, margin) = hitbox.dimensions();
    rect_corners(center, angle, size.x, size.y, w, h, margin)
}

/// Project a polygon onto an axis, returning (min, max)
fn project(polygon: &[Vec2], axis: Vec2) -> (f32, f32) {
    polygon
        .iter()
        .map(|p| p.dot(axis))
        .fold((f32::MAX, f32::MIN), |(lo, hi), d| (lo.min(d), hi.max(d)))
}

/// Separating axis test for two convex polygons.
///
/// Touching counts as intersecting. Polygons with fewer than 3 vertices never
/// intersect anything.
pub fn polygons_intersect(a: &[Vec2], b: &[Vec2]) -> bool {
    if a.len() < 3 || b.len() < 3 {
        return false;
    }

    for polygon in [a, b] {
        for i in 0..polygon.len() {
            let j = (i + 1) % polygon.len();
            let edge = polygon[j] - polygon[i];
            let axis = Vec2::new(edge.y, -edge.x);
            if axis.length_squared() == 0.0 {
                continue;
            }

            let (min_a, max_a) = project(a, axis);
            let (min_b, max_b) = project(b, axis);
            if max_a < min_b || max_b < min_a {
                return false;
            }
        }
    }
    true
}

/// Regular polygon approximating a circle
pub fn circle_polygon(center: Vec2, radius: f32, sides: usize) -> Vec<Vec2> {
    let sides = sides.max(3);
    (0..sides)
        .map(|i| {
            let theta = i as f32 / sides as f32 * std::f32::consts::TAU;
            center + Vec2::new(theta.cos(), theta.sin()) * radius
        })
        .collect()
}

/// Closest point to `p` on segment `a`-`b`
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Distance from `p` to segment `a`-`b`
#[inline]
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    (p - closest_point_on_segment(p, a, b)).length()
}

/// Proper crossing test for segments `a1`-`a2` and `b1`-`b2`.
///
/// Parallel segments report no crossing; the endpoint distances in
/// [`segment_distance`] cover the overlapping case.
pub fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let da = a2 - a1;
    let db = b2 - b1;
    let den = db.y * da.x - db.x * da.y;
    if den == 0.0 {
        return false;
    }
    let ua = (db.x * (a1.y - b1.y) - db.y * (a1.x - b1.x)) / den;
    let ub = (da.x * (a1.y - b1.y) - da.y * (a1.x - b1.x)) / den;
    (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub)
}

/// Minimum distance between two segments (zero when they cross)
pub fn segment_distance(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> f32 {
    if segments_intersect(a1, a2, b1, b2) {
        return 0.0;
    }
    point_segment_distance(a1, b1, b2)
        .min(point_segment_distance(a2, b1, b2))
        .min(point_segment_distance(b1, a1, a2))
        .min(point_segment_distance(b2, a1, a2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unit_square(center: Vec2) -> Vec<Vec2> {
        vec![
            center + Vec2::new(-0.5, -0.5),
            center + Vec2::new(0.5, -0.5),
            center + Vec2::new(0.5, 0.5),
            center + Vec2::new(-0.5, 0.5),
        ]
    }

    #[test]
    fn test_identical_squares_intersect() {
        let a = unit_square(Vec2::ZERO);
        assert!(polygons_intersect(&a, &a.clone()));
    }

    #[test]
    fn test_distant_squares_do_not_intersect() {
        let a = unit_square(Vec2::ZERO);
        let b = unit_square(Vec2::new(10.0, 0.0));
        assert!(!polygons_intersect(&a, &b));
    }

    #[test]
    fn test_offset_diamond_does_not_intersect() {
        let a = unit_square(Vec2::ZERO);
        let diamond = vec![
            Vec2::new(1.2, 0.5),
            Vec2::new(1.7, 1.0),
            Vec2::new(1.2, 1.5),
            Vec2::new(0.7, 1.0),
        ];
        assert!(!polygons_intersect(&a, &diamond));
    }

    #[test]
    fn test_degenerate_polygon_never_intersects() {
        let a = unit_square(Vec2::ZERO);
        assert!(!polygons_intersect(&a, &[Vec2::ZERO, Vec2::ONE]));
    }

    #[test]
    fn test_body_corners_centered_at_zero_angle() {
        // Body is centered: margin + half height == half actor height
        let corners = hitbox_corners(Vec2::new(100.0, 100.0), 0.0, Vec2::splat(70.0), Hitbox::Body);
        assert!((corners[0] - Vec2::new(83.0, 77.0)).length() < 1e-4);
        assert!((corners[2] - Vec2::new(117.0, 123.0)).length() < 1e-4);
    }

    #[test]
    fn test_turret_extends_toward_heading() {
        let center = Vec2::new(50.0, 50.0);
        let size = Vec2::splat(70.0);
        let up = hitbox_corners(center, 0.0, size, Hitbox::Turret);
        assert!(up.iter().all(|c| c.y < center.y));
        let right = hitbox_corners(center, 90.0, size, Hitbox::Turret);
        assert!(right.iter().all(|c| c.x > center.x));
    }

    #[test]
    fn test_corners_keep_winding_after_rotation() {
        let corners = hitbox_corners(Vec2::ZERO, 37.0, Vec2::splat(40.0), Hitbox::Body);
        // Signed area keeps its sign regardless of rotation
        let area: f32 = (0..4)
            .map(|i| corners[i].perp_dot(corners[(i + 1) % 4]))
            .sum();
        let reference: f32 = {
            let c = hitbox_corners(Vec2::ZERO, 0.0, Vec2::splat(40.0), Hitbox::Body);
            (0..4).map(|i| c[i].perp_dot(c[(i + 1) % 4])).sum()
        };
        assert!(area * reference > 0.0);
    }

    #[test]
    fn test_segment_distance() {
        let d = segment_distance(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(5.0, 3.0),
            Vec2::new(5.0, 8.0),
        );
        assert!((d - 3.0).abs() < 1e-5);

        let crossing = segment_distance(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(5.0, -3.0),
            Vec2::new(5.0, 3.0),
        );
        assert_eq!(crossing, 0.0);
    }

    #[test]
    fn test_circle_polygon_vertices_on_circle() {
        let poly = circle_polygon(Vec2::new(3.0, 4.0), 2.0, 8);
        assert_eq!(poly.len(), 8);
        for p in poly {
            assert!(((p - Vec2::new(3.0, 4.0)).length() - 2.0).abs() < 1e-4);
        }
    }

    proptest! {
        #[test]
        fn prop_intersection_is_symmetric(
            ax in -50.0f32..50.0, ay in -50.0f32..50.0, a_angle in 0.0f32..360.0,
            bx in -50.0f32..50.0, by in -50.0f32..50.0, b_angle in 0.0f32..360.0,
            size in 5.0f32..60.0,
        ) {
            let a = hitbox_corners(Vec2::new(ax, ay), a_angle, Vec2::splat(size), Hitbox::Body);
            let b = hitbox_corners(Vec2::new(bx, by), b_angle, Vec2::splat(size), Hitbox::Turret);
            prop_assert_eq!(polygons_intersect(&a, &b), polygons_intersect(&b, &a));
        }
    }
}
