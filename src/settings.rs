//! Arena tunables
//!
//! Everything here is balance, not geometry. Loaded from JSON by hosts that
//! want to tweak feel without rebuilding; missing fields keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ArenaError;

/// Game balance and pacing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    // === Maze ===
    /// Smallest maze width picked for a round (cells)
    pub maze_min_width: i32,
    /// Largest maze width picked for a round (cells, inclusive)
    pub maze_max_width: i32,
    /// Probability of opening each remaining wall after the spanning tree
    pub extra_opening_chance: f64,
    /// Fraction of the viewport the maze may fill
    pub viewport_fill: f32,

    // === Actors ===
    /// Actor bounding size relative to cell size
    pub actor_scale: f32,
    /// Forward speed (cells per second)
    pub forward_speed_cells: f32,
    /// Backward speed as a fraction of forward speed
    pub backward_factor: f32,
    /// Rotation speed (degrees per second)
    pub rotation_speed: f32,
    /// Largest frame delta motion integrates in one go (seconds)
    pub max_motion_dt: f32,
    /// Length of one movement sub-step (pixels)
    pub substep_length: f32,
    /// Number of increasing radii tried by the unstick search (pixels: 1..=n)
    pub unstick_radii: u32,
    /// Fraction of the pusher's step transferred to the pushed actor
    pub push_factor: f32,
    /// Degrees of rotation per unit of push torque
    pub push_torque_gain: f32,

    // === Pointer steering ===
    /// Heading error below which no rotation is applied (degrees)
    pub pointer_deadzone: f32,
    /// Target distance below which the actor stops (cells)
    pub pointer_min_distance_cells: f32,
    /// Targets this close to the arena edge force movement (pixels)
    pub pointer_edge_margin: f32,

    // === Projectiles ===
    /// Projectile speed (cells per second)
    pub projectile_speed_cells: f32,
    /// Projectile radius relative to cell size
    pub projectile_radius_factor: f32,
    /// Seconds before a projectile expires
    pub projectile_lifetime: f32,
    /// Seconds between shots from one actor
    pub fire_cooldown: f32,
    /// Maximum projectiles alive at once across all actors
    pub max_active_projectiles: usize,
    /// Bounces a projectile survives before it is removed
    pub ricochet_budget: u32,
    /// Seconds after spawn during which a projectile ignores its owner
    pub owner_grace: f32,
    /// Speed multiplier applied on every bounce (< 1)
    pub ricochet_damping: f32,
    /// Largest frame delta projectiles integrate in one go (seconds)
    pub max_projectile_dt: f32,

    // === Rounds ===
    /// Countdown after a single survivor remains (seconds)
    pub win_countdown: f32,
    /// Countdown after nobody survives (seconds)
    pub draw_countdown: f32,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            maze_min_width: 6,
            maze_max_width: 6,
            extra_opening_chance: 0.05,
            viewport_fill: 0.85,

            actor_scale: 0.65,
            forward_speed_cells: 1.5,
            backward_factor: 0.75,
            rotation_speed: 250.0,
            max_motion_dt: 0.05,
            substep_length: 2.0,
            unstick_radii: 3,
            push_factor: 0.8,
            push_torque_gain: 8.0,

            pointer_deadzone: 2.0,
            pointer_min_distance_cells: 0.3,
            pointer_edge_margin: 12.0,

            projectile_speed_cells: 8.0,
            projectile_radius_factor: 0.05,
            projectile_lifetime: 4.0,
            fire_cooldown: 0.25,
            max_active_projectiles: 20,
            ricochet_budget: 6,
            owner_grace: 0.15,
            ricochet_damping: 0.98,
            max_projectile_dt: 0.25,

            win_countdown: 3.0,
            draw_countdown: 2.0,
        }
    }
}

impl ArenaSettings {
    /// Parse settings from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self, ArenaError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArenaError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded arena settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ArenaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> Result<(), ArenaError> {
        let invalid = |msg: &str| Err(ArenaError::InvalidSettings(msg.to_string()));

        if self.maze_min_width < 1 || self.maze_max_width < self.maze_min_width {
            return invalid("maze width range must satisfy 1 <= min <= max");
        }
        if !(0.0..=1.0).contains(&self.extra_opening_chance) {
            return invalid("extra_opening_chance must be within [0, 1]");
        }
        if !(self.viewport_fill > 0.0 && self.viewport_fill <= 1.0) {
            return invalid("viewport_fill must be within (0, 1]");
        }
        if !(self.actor_scale > 0.0 && self.actor_scale < 1.0) {
            return invalid("actor_scale must be within (0, 1)");
        }
        if self.substep_length <= 0.0 || self.max_motion_dt <= 0.0 || self.max_projectile_dt <= 0.0 {
            return invalid("step sizes must be positive");
        }
        if !(self.ricochet_damping > 0.0 && self.ricochet_damping < 1.0) {
            return invalid("ricochet_damping must be within (0, 1)");
        }
        if self.win_countdown < 0.0 || self.draw_countdown < 0.0 {
            return invalid("countdowns cannot be negative");
        }
        Ok(())
    }

    /// Maze height for a given width
    pub fn maze_height_for(&self, width: i32) -> i32 {
        (width / 2).max(1)
    }
}
