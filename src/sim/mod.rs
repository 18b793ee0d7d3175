//! Arena simulation
//!
//! All gameplay logic lives here. The module is host-agnostic:
//! - Driven only by frame deltas and input intents
//! - Seeded RNG only, so a session replays from its seed
//! - Stable iteration order (spawn order for actors, fire order for projectiles)
//! - No rendering or platform dependencies

pub mod actors;
pub mod geometry;
pub mod maze;
pub mod motion;
pub mod projectiles;
pub mod ricochet;
pub mod round;
pub mod state;
pub mod tick;
pub mod walls;

pub use actors::{Actor, ActorId, ActorStore, Pose, VisualHandle, find_colliding_actor, try_push};
pub use geometry::{Hitbox, hitbox_corners, polygons_intersect};
pub use maze::{Cell, Maze, WallSegment, cell_size_for_viewport, wall_thickness};
pub use motion::{InputSource, KeyIntents, MotionController};
pub use projectiles::{Projectile, ProjectileId, ProjectileManager};
pub use ricochet::{WallContact, find_wall_contact, reflect_if_hit};
pub use round::{RoundOutcome, RoundPhase, RoundSignal, RoundStateMachine};
pub use state::{Arena, ControlKind, GameEvent, GameState};
pub use tick::tick;
pub use walls::is_colliding_with_wall;
