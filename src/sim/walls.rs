//! Actor-vs-maze collision
//!
//! Walls are treated as thick strokes: a hitbox edge collides when it comes
//! within half the wall thickness of a solid cell edge, not only when the
//! thin geometric segments cross.

use glam::Vec2;

use super::geometry::{Hitbox, hitbox_corners, segment_distance};
use super::maze::{Cell, Maze};
use crate::consts::{BOUNDARY_MARGIN, WALL_THICKNESS_FACTOR};

/// Whether an actor at `center`/`angle` overlaps the boundary or any solid wall
/// with either its body or its turret.
pub fn is_colliding_with_wall(center: Vec2, angle: f32, size: Vec2, cell_size: f32, maze: &Maze) -> bool {
    let body = hitbox_corners(center, angle, size, Hitbox::Body);
    let turret = hitbox_corners(center, angle, size, Hitbox::Turret);
    let bounds = maze.pixel_size(cell_size);

    if is_outside(&body, bounds) || is_outside(&turret, bounds) {
        return true;
    }

    touches_wall(&body, cell_size, maze) || touches_wall(&turret, cell_size, maze)
}

/// Any corner within the boundary margin of the map edge
fn is_outside(corners: &[Vec2; 4], bounds: Vec2) -> bool {
    corners.iter().any(|p| {
        p.x < BOUNDARY_MARGIN
            || p.y < BOUNDARY_MARGIN
            || p.x > bounds.x - BOUNDARY_MARGIN
            || p.y > bounds.y - BOUNDARY_MARGIN
    })
}

/// Whether any edge of the polygon comes within half a wall of a solid cell edge
fn touches_wall(corners: &[Vec2; 4], cell_size: f32, maze: &Maze) -> bool {
    let half_thickness = cell_size * WALL_THICKNESS_FACTOR * 0.5;

    (0..corners.len()).any(|i| {
        let p1 = corners[i];
        let p2 = corners[(i + 1) % corners.len()];
        let lo = Cell::containing(p1.min(p2), cell_size);
        let hi = Cell::containing(p1.max(p2), cell_size);

        (lo.x..=hi.x).any(|x| {
            (lo.y..=hi.y).any(|y| {
                maze.solid_edges(Cell::new(x, y), cell_size)
                    .any(|wall| segment_distance(p1, p2, wall.start, wall.end) <= half_thickness)
            })
        })
    })
}
