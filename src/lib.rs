//! Maze Tanks - simulation core for a top-down maze tank arena
//!
//! Core modules:
//! - `sim`: Per-frame simulation (maze, collisions, motion, projectiles, rounds)
//! - `settings`: Data-driven tunables
//! - `scoreboard`: Session kill/win totals across rounds
//! - `error`: Construction-time errors
//!
//! The host drives the core with frame deltas and input intents, and renders
//! the poses and events the core publishes back.

pub mod error;
pub mod scoreboard;
pub mod settings;
pub mod sim;

pub use error::ArenaError;
pub use scoreboard::Scoreboard;
pub use settings::ArenaSettings;

use glam::Vec2;

/// Fixed geometry ratios
pub mod consts {
    /// Reference width the hitbox dimensions below are expressed in
    pub const HITBOX_REFERENCE_SIZE: f32 = 70.0;

    /// Body hitbox (reference units)
    pub const BODY_WIDTH: f32 = 34.0;
    pub const BODY_HEIGHT: f32 = 46.0;
    pub const BODY_MARGIN_FRONT: f32 = 12.0;

    /// Turret hitbox (reference units) - narrower, longer, pushed forward
    pub const TURRET_WIDTH: f32 = 8.0;
    pub const TURRET_HEIGHT: f32 = 25.0;
    pub const TURRET_MARGIN_FRONT: f32 = 3.0;

    /// Collision wall thickness as a fraction of cell size
    pub const WALL_THICKNESS_FACTOR: f32 = 0.04;
    /// Rendered wall stroke as a fraction of cell size
    pub const RENDERED_WALL_FACTOR: f32 = 0.08;

    /// Hitbox corners closer than this to the map edge count as colliding (pixels)
    pub const BOUNDARY_MARGIN: f32 = 2.0;

    /// Extra push-out after a ricochet so the next frame starts clear (pixels)
    pub const RICOCHET_PUSH_EPSILON: f32 = 0.5;

    /// Projectiles further than this outside the map are dropped (pixels)
    pub const OUT_OF_BOUNDS_SLACK: f32 = 20.0;

    /// Sides of the polygon approximating a projectile for hit tests
    pub const PROJECTILE_POLYGON_SIDES: usize = 8;

    /// Nominal host frame (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
}

/// Wrap an angle in degrees to [0, 360)
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Signed shortest difference `to - from` in degrees, in (-180, 180]
#[inline]
pub fn delta_degrees(from: f32, to: f32) -> f32 {
    let d = wrap_degrees(to - from);
    if d > 180.0 { d - 360.0 } else { d }
}

/// Unit facing vector for a heading (0° = up, clockwise, y down)
#[inline]
pub fn heading_to_dir(degrees: f32) -> Vec2 {
    let rad = degrees.to_radians();
    Vec2::new(rad.sin(), -rad.cos())
}

/// Heading in degrees that faces along `dir`
#[inline]
pub fn dir_to_heading(dir: Vec2) -> f32 {
    wrap_degrees(dir.x.atan2(-dir.y).to_degrees())
}
