//! Projectile ricochet off maze walls
//!
//! The projectile circle is inflated by half the wall thickness and tested
//! against every solid cell edge it could touch. The first contact wins: the
//! velocity is mirrored about the contact normal, damped, and the projectile
//! is pushed clear of the wall so it cannot stick on the next frame.

use glam::Vec2;

use super::geometry::closest_point_on_segment;
use super::maze::{Cell, Maze};
use crate::consts::{RICOCHET_PUSH_EPSILON, WALL_THICKNESS_FACTOR};

/// A projectile touching a wall
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallContact {
    /// Closest point on the wall centerline
    pub point: Vec2,
    /// Unit normal pointing from the wall toward the projectile
    pub normal: Vec2,
    /// How far the inflated circle overlaps the wall (never negative)
    pub penetration: f32,
}

impl WallContact {
    /// Bounce `vel` off this contact and move `pos` clear of the wall
    pub fn apply(&self, pos: &mut Vec2, vel: &mut Vec2, damping: f32) {
        *vel = reflect_velocity(*vel, self.normal) * damping;
        *pos += self.normal * (self.penetration + RICOCHET_PUSH_EPSILON);
    }
}

/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Half the collision thickness of a wall
#[inline]
pub fn half_wall_thickness(cell_size: f32) -> f32 {
    cell_size * WALL_THICKNESS_FACTOR * 0.5
}

/// First solid wall the projectile circle at `pos` touches, if any.
///
/// `from` is where the projectile was before its last step. The contact normal
/// always points back toward that side, so a center that ended up past the
/// wall line is pushed back rather than through.
pub fn find_wall_contact(pos: Vec2, from: Vec2, radius: f32, cell_size: f32, maze: &Maze) -> Option<WallContact> {
    let half = half_wall_thickness(cell_size);
    let reach = radius + half;

    let lo = Cell::containing(pos - Vec2::splat(reach), cell_size);
    let hi = Cell::containing(pos + Vec2::splat(reach), cell_size);
    let min_x = (lo.x - 1).max(0);
    let max_x = (hi.x + 1).min(maze.width() - 1);
    let min_y = (lo.y - 1).max(0);
    let max_y = (hi.y + 1).min(maze.height() - 1);

    for x in min_x..=max_x {
        for y in min_y..=max_y {
            for wall in maze.solid_edges(Cell::new(x, y), cell_size) {
                let closest = closest_point_on_segment(pos, wall.start, wall.end);
                let offset = pos - closest;
                let dist = offset.length();
                if dist > reach {
                    continue;
                }
                let normal = contact_normal(offset, from - closest);
                // Crossed the line: the push has to cover the far half too
                let crossed = offset.dot(normal) < 0.0;
                let penetration = if crossed { reach + dist } else { reach - dist };
                return Some(WallContact {
                    point: closest,
                    normal,
                    penetration: penetration.max(0.0),
                });
            }
        }
    }
    None
}

/// Unit normal on the side the projectile came from.
///
/// Uses the current offset when it agrees with the approach side, flips it
/// when the center has crossed the line, and falls back to the approach
/// offset and then straight up when the center sits exactly on the line.
fn contact_normal(offset: Vec2, approach: Vec2) -> Vec2 {
    const DEGENERATE: f32 = 1e-6;

    if offset.length() >= DEGENERATE {
        let normal = offset.normalize();
        if normal.dot(approach) < 0.0 {
            return -normal;
        }
        return normal;
    }
    if approach.length() >= DEGENERATE {
        return approach.normalize();
    }
    Vec2::new(0.0, -1.0)
}

/// Reflect the projectile off the first wall it touches.
///
/// Returns whether a reflection happened. At most one wall is resolved per call.
pub fn reflect_if_hit(
    pos: &mut Vec2,
    vel: &mut Vec2,
    from: Vec2,
    radius: f32,
    cell_size: f32,
    maze: &Maze,
    damping: f32,
) -> bool {
    match find_wall_contact(*pos, from, radius, cell_size, maze) {
        Some(contact) => {
            contact.apply(pos, vel, damping);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELL: f32 = 100.0;

    fn single_cell() -> Maze {
        Maze::generate_seeded(1, 1, 0.0, 1).unwrap()
    }

    #[test]
    fn test_reflect_velocity() {
        let reflected = reflect_velocity(Vec2::new(100.0, 0.0), Vec2::new(-1.0, 0.0));
        assert!((reflected.x + 100.0).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }

    #[test]
    fn test_no_contact_in_open_space() {
        let maze = single_cell();
        let mut pos = Vec2::new(50.0, 50.0);
        let mut vel = Vec2::new(100.0, 0.0);
        assert!(!reflect_if_hit(&mut pos, &mut vel, Vec2::new(45.0, 50.0), 3.0, CELL, &maze, 0.98));
        assert_eq!(vel, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_bounce_slows_and_clears_wall() {
        let maze = single_cell();
        let radius = 3.0;
        // Right wall at x=100, overlapping it slightly
        let mut pos = Vec2::new(96.0, 50.0);
        let mut vel = Vec2::new(200.0, 30.0);
        let speed_before = vel.length();

        assert!(reflect_if_hit(&mut pos, &mut vel, Vec2::new(90.0, 49.0), radius, CELL, &maze, 0.98));
        assert!(vel.x < 0.0);
        assert!(vel.length() < speed_before);

        let gap = 100.0 - pos.x;
        assert!(gap > radius + half_wall_thickness(CELL));
        assert!(find_wall_contact(pos, pos, radius, CELL, &maze).is_none());
    }

    #[test]
    fn test_crossed_center_is_pushed_back_to_its_side() {
        let maze = single_cell();
        let radius = 3.0;
        // Came from inside the cell but the center is already past x=100
        let mut pos = Vec2::new(101.0, 50.0);
        let mut vel = Vec2::new(300.0, 0.0);

        assert!(reflect_if_hit(&mut pos, &mut vel, Vec2::new(95.0, 50.0), radius, CELL, &maze, 0.98));
        assert!(vel.x < 0.0);
        assert!(pos.x < 100.0 - radius - half_wall_thickness(CELL));
    }

    #[test]
    fn test_on_line_center_uses_approach_side() {
        let maze = single_cell();
        let mut pos = Vec2::new(100.0, 50.0);
        let mut vel = Vec2::new(200.0, 0.0);

        assert!(reflect_if_hit(&mut pos, &mut vel, Vec2::new(96.0, 50.0), 3.0, CELL, &maze, 0.98));
        assert!((vel - Vec2::new(-196.0, 0.0)).length() < 1e-3);
        assert!(pos.x < 100.0);
    }

    #[test]
    fn test_degenerate_normal_falls_back_to_approach() {
        let normal = contact_normal(Vec2::ZERO, Vec2::new(0.0, 5.0));
        assert!((normal - Vec2::new(0.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_fully_degenerate_normal_points_up() {
        assert_eq!(contact_normal(Vec2::ZERO, Vec2::ZERO), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_open_passage_lets_projectile_through() {
        let maze = Maze::generate_seeded(2, 1, 0.0, 1).unwrap();
        let mut pos = Vec2::new(99.0, 50.0);
        let mut vel = Vec2::new(200.0, 0.0);
        assert!(!reflect_if_hit(&mut pos, &mut vel, Vec2::new(95.0, 50.0), 3.0, CELL, &maze, 0.98));
    }
}
