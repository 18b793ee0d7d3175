//! Per-actor motion: steering from input, collide-and-slide integration
//!
//! One controller type serves both keyboard and pointer steering; the input
//! source is chosen at construction. Rotation that would collide triggers a
//! small unstick search; translation runs in short sub-steps so no single step
//! can tunnel into a wall, pushing other actors or sliding along walls when
//! the direct step is blocked.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::actors::{ActorId, ActorStore, Pose, find_colliding_actor, try_push};
use super::state::Arena;
use super::walls::is_colliding_with_wall;
use crate::{delta_degrees, dir_to_heading, heading_to_dir, wrap_degrees};

/// Held directional intents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyIntents {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// Where a controller's steering comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputSource {
    /// Discrete drive/turn intents
    Keyboard(KeyIntents),
    /// Drive toward a point supplied each frame (None = hold still)
    PointerFollow(Option<Vec2>),
}

/// Desired change for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Steering {
    /// Degrees, positive = clockwise
    rotation: f32,
    /// Pixels along the heading, negative = reverse
    movement: f32,
}

/// Drives one actor
#[derive(Debug, Clone)]
pub struct MotionController {
    actor: ActorId,
    input: InputSource,
}

impl MotionController {
    pub fn keyboard(actor: ActorId) -> Self {
        Self {
            actor,
            input: InputSource::Keyboard(KeyIntents::default()),
        }
    }

    pub fn pointer(actor: ActorId) -> Self {
        Self {
            actor,
            input: InputSource::PointerFollow(None),
        }
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn input(&self) -> InputSource {
        self.input
    }

    /// Replace held intents. Ignored by pointer controllers.
    pub fn set_intents(&mut self, intents: KeyIntents) -> bool {
        match &mut self.input {
            InputSource::Keyboard(held) => {
                *held = intents;
                true
            }
            InputSource::PointerFollow(_) => {
                log::debug!("Keyboard intents sent to pointer-driven {:?}", self.actor);
                false
            }
        }
    }

    /// Replace the pointer target. Ignored by keyboard controllers.
    pub fn set_pointer_target(&mut self, target: Option<Vec2>) -> bool {
        match &mut self.input {
            InputSource::PointerFollow(current) => {
                *current = target;
                true
            }
            InputSource::Keyboard(_) => {
                log::debug!("Pointer target sent to keyboard-driven {:?}", self.actor);
                false
            }
        }
    }

    /// Advance the actor by one frame and publish its pose
    pub fn update<R: Rng>(&self, dt: f32, arena: &Arena, store: &mut ActorStore, rng: &mut R) {
        let Some(actor) = store.get(self.actor).filter(|a| a.alive) else {
            return;
        };
        let dt = dt.min(arena.settings.max_motion_dt);
        if dt <= 0.0 {
            return;
        }

        let size = actor.size;
        let mut pos = actor.pose.position;
        let mut angle = actor.pose.angle;
        let steering = self.steer(actor.pose, dt, arena);

        if steering.rotation != 0.0 {
            let next_angle = wrap_degrees(angle + steering.rotation);
            if !self.blocked(pos, next_angle, size, arena, store) {
                angle = next_angle;
            } else if let Some(free) = self.unstick(pos, next_angle, size, arena, store) {
                pos = free;
                angle = next_angle;
            } else {
                log::debug!("Rotation of {:?} blocked", self.actor);
            }
        }

        if steering.movement.abs() > 0.01 {
            let steps = (steering.movement.abs() / arena.settings.substep_length).ceil().max(1.0) as u32;
            let step = heading_to_dir(angle) * (steering.movement / steps as f32);

            for _ in 0..steps {
                let next = pos + step;
                if !is_colliding_with_wall(next, angle, size, arena.cell_size, arena.maze) {
                    if let Some(other) = find_colliding_actor(store, self.actor, Pose::new(next, angle), size) {
                        let pushed = try_push(
                            store,
                            self.actor,
                            other,
                            step,
                            pos,
                            arena.cell_size,
                            arena.maze,
                            arena.settings,
                            rng,
                        );
                        if !pushed {
                            continue;
                        }
                    }
                    pos = next;
                } else {
                    // Slide along whichever axis is still free
                    let along_x = Vec2::new(next.x, pos.y);
                    let along_y = Vec2::new(pos.x, next.y);
                    if !self.blocked(along_x, angle, size, arena, store) {
                        pos = along_x;
                    } else if !self.blocked(along_y, angle, size, arena, store) {
                        pos = along_y;
                    }
                }
            }
        }

        store.commit_pose(self.actor, Pose::new(pos, angle));
    }

    fn steer(&self, pose: Pose, dt: f32, arena: &Arena) -> Steering {
        let settings = arena.settings;
        let speed = settings.forward_speed_cells * arena.cell_size * dt;
        let max_turn = settings.rotation_speed * dt;

        match self.input {
            InputSource::Keyboard(keys) => {
                let rotation = if keys.left {
                    -max_turn
                } else if keys.right {
                    max_turn
                } else {
                    0.0
                };
                let mut movement = 0.0;
                if keys.forward {
                    movement += speed;
                }
                if keys.backward {
                    movement -= speed * settings.backward_factor;
                }
                Steering { rotation, movement }
            }
            InputSource::PointerFollow(Some(target)) => {
                let to_target = target - pose.position;
                let distance = to_target.length();
                if distance < 1e-3 {
                    return Steering::default();
                }

                let diff = delta_degrees(pose.angle, dir_to_heading(to_target));
                // Targets behind the actor are approached in reverse
                let reverse = diff.abs() > 90.0;
                let aim = if reverse { delta_degrees(0.0, diff + 180.0) } else { diff };

                let rotation = if aim.abs() > settings.pointer_deadzone {
                    aim.clamp(-max_turn, max_turn)
                } else {
                    0.0
                };

                let far_enough = distance > settings.pointer_min_distance_cells * arena.cell_size;
                let movement = if far_enough || self.near_edge(target, arena) {
                    if reverse { -speed * settings.backward_factor } else { speed }
                } else {
                    0.0
                };
                Steering { rotation, movement }
            }
            InputSource::PointerFollow(None) => Steering::default(),
        }
    }

    /// Target sits at the rim of the arena, where the pointer cannot go further out
    fn near_edge(&self, target: Vec2, arena: &Arena) -> bool {
        let bounds = arena.maze.pixel_size(arena.cell_size);
        let margin = arena.settings.pointer_edge_margin;
        target.x <= margin || target.y <= margin || target.x >= bounds.x - margin || target.y >= bounds.y - margin
    }

    fn blocked(&self, pos: Vec2, angle: f32, size: Vec2, arena: &Arena, store: &ActorStore) -> bool {
        is_colliding_with_wall(pos, angle, size, arena.cell_size, arena.maze)
            || find_colliding_actor(store, self.actor, Pose::new(pos, angle), size).is_some()
    }

    /// Nearby position where `angle` fits: compass points at radius 1, 2, ...
    fn unstick(&self, pos: Vec2, angle: f32, size: Vec2, arena: &Arena, store: &ActorStore) -> Option<Vec2> {
        (1..=arena.settings.unstick_radii).find_map(|radius| {
            (0..8).find_map(|i| {
                let theta = (i as f32 * 45.0).to_radians();
                let candidate = pos + Vec2::new(theta.cos(), theta.sin()) * radius as f32;
                (!self.blocked(candidate, angle, size, arena, store)).then_some(candidate)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ArenaSettings;
    use crate::sim::maze::Maze;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const CELL: f32 = 100.0;

    struct Fixture {
        maze: Maze,
        settings: ArenaSettings,
        store: ActorStore,
        rng: Pcg32,
    }

    impl Fixture {
        fn open(width: i32, height: i32) -> Self {
            Self {
                maze: Maze::generate_seeded(width, height, 1.0, 1).unwrap(),
                settings: ArenaSettings::default(),
                store: ActorStore::new(),
                rng: Pcg32::seed_from_u64(11),
            }
        }

        fn place(&mut self, pose: Pose) -> ActorId {
            let ids = self
                .store
                .spawn(1, &self.maze, CELL, &self.settings, &mut self.rng)
                .unwrap();
            self.store.commit_pose(ids[0], pose);
            ids[0]
        }

        fn run(&mut self, controller: &MotionController, dt: f32, frames: usize) {
            let arena = Arena {
                maze: &self.maze,
                cell_size: CELL,
                settings: &self.settings,
            };
            for _ in 0..frames {
                controller.update(dt, &arena, &mut self.store, &mut self.rng);
            }
        }

        fn pose(&self, id: ActorId) -> Pose {
            self.store.get(id).unwrap().pose
        }
    }

    #[test]
    fn test_forward_moves_along_heading() {
        let mut fx = Fixture::open(3, 3);
        let id = fx.place(Pose::new(Vec2::new(150.0, 150.0), 90.0));
        let mut controller = MotionController::keyboard(id);
        controller.set_intents(KeyIntents {
            forward: true,
            ..Default::default()
        });

        fx.run(&controller, 0.02, 10);
        let pose = fx.pose(id);
        // 150 px/s for 0.2 s
        assert!((pose.position.x - 180.0).abs() < 0.01);
        assert!((pose.position.y - 150.0).abs() < 0.01);
    }

    #[test]
    fn test_backward_is_slower() {
        let mut fx = Fixture::open(3, 3);
        let id = fx.place(Pose::new(Vec2::new(150.0, 150.0), 0.0));
        let mut controller = MotionController::keyboard(id);
        controller.set_intents(KeyIntents {
            backward: true,
            ..Default::default()
        });

        fx.run(&controller, 0.02, 10);
        let moved = fx.pose(id).position.y - 150.0;
        assert!(moved > 0.0);
        assert!((moved - 30.0 * 0.75).abs() < 0.01);
    }

    #[test]
    fn test_stalled_frame_is_clamped() {
        let mut fx = Fixture::open(3, 3);
        let id = fx.place(Pose::new(Vec2::new(150.0, 150.0), 0.0));
        let mut controller = MotionController::keyboard(id);
        controller.set_intents(KeyIntents {
            forward: true,
            ..Default::default()
        });

        fx.run(&controller, 2.0, 1);
        assert!((fx.pose(id).position.y - (150.0 - 7.5)).abs() < 0.01);
    }

    #[test]
    fn test_rotation_turns_clockwise_on_right() {
        let mut fx = Fixture::open(3, 3);
        let id = fx.place(Pose::new(Vec2::new(150.0, 150.0), 0.0));
        let mut controller = MotionController::keyboard(id);
        controller.set_intents(KeyIntents {
            right: true,
            ..Default::default()
        });

        fx.run(&controller, 0.02, 5);
        assert!((fx.pose(id).angle - 25.0).abs() < 0.01);
    }

    #[test]
    fn test_driving_into_wall_never_overlaps() {
        let mut fx = Fixture::open(1, 1);
        let id = fx.place(Pose::new(Vec2::new(50.0, 50.0), 30.0));
        let mut controller = MotionController::keyboard(id);
        controller.set_intents(KeyIntents {
            forward: true,
            right: true,
            ..Default::default()
        });

        for _ in 0..200 {
            fx.run(&controller, 0.03, 1);
            let pose = fx.pose(id);
            let size = fx.store.get(id).unwrap().size;
            assert!(!is_colliding_with_wall(pose.position, pose.angle, size, CELL, &fx.maze));
        }
    }

    #[test]
    fn test_random_intents_never_end_inside_walls() {
        let mut fx = Fixture {
            maze: Maze::generate_seeded(4, 3, 0.05, 99).unwrap(),
            settings: ArenaSettings::default(),
            store: ActorStore::new(),
            rng: Pcg32::seed_from_u64(99),
        };
        let ids = fx
            .store
            .spawn(3, &fx.maze, CELL, &fx.settings, &mut fx.rng)
            .unwrap();
        let mut controllers: Vec<_> = ids.iter().map(|&id| MotionController::keyboard(id)).collect();
        let mut script = Pcg32::seed_from_u64(4);

        for frame in 0..600 {
            if frame % 20 == 0 {
                for c in &mut controllers {
                    c.set_intents(KeyIntents {
                        forward: script.random_bool(0.7),
                        backward: script.random_bool(0.2),
                        left: script.random_bool(0.3),
                        right: script.random_bool(0.3),
                    });
                }
            }
            for c in &controllers {
                fx.run(c, 1.0 / 60.0, 1);
            }
            for actor in fx.store.iter() {
                assert!(
                    !is_colliding_with_wall(actor.pose.position, actor.pose.angle, actor.size, CELL, &fx.maze),
                    "actor {:?} inside a wall at frame {}",
                    actor.id,
                    frame
                );
            }
        }
    }

    #[test]
    fn test_dead_actor_does_not_move() {
        let mut fx = Fixture::open(3, 3);
        let id = fx.place(Pose::new(Vec2::new(150.0, 150.0), 0.0));
        fx.store.kill(id);
        let mut controller = MotionController::keyboard(id);
        controller.set_intents(KeyIntents {
            forward: true,
            ..Default::default()
        });

        fx.run(&controller, 0.02, 10);
        assert_eq!(fx.pose(id).position, Vec2::new(150.0, 150.0));
    }

    #[test]
    fn test_pointer_ahead_drives_forward() {
        let mut fx = Fixture::open(3, 3);
        let id = fx.place(Pose::new(Vec2::new(150.0, 150.0), 90.0));
        let mut controller = MotionController::pointer(id);
        controller.set_pointer_target(Some(Vec2::new(260.0, 150.0)));

        fx.run(&controller, 0.02, 10);
        let pose = fx.pose(id);
        assert!(pose.position.x > 170.0);
        assert!((pose.angle - 90.0).abs() < 0.01);
    }

    #[test]
    fn test_pointer_behind_reverses() {
        let mut fx = Fixture::open(3, 3);
        let id = fx.place(Pose::new(Vec2::new(150.0, 150.0), 90.0));
        let mut controller = MotionController::pointer(id);
        controller.set_pointer_target(Some(Vec2::new(40.0, 150.0)));

        fx.run(&controller, 0.02, 10);
        let pose = fx.pose(id);
        assert!(pose.position.x < 135.0);
        // Still facing away from the target
        assert!((pose.angle - 90.0).abs() < 0.01);
    }

    #[test]
    fn test_pointer_close_target_only_turns() {
        let mut fx = Fixture::open(3, 3);
        let id = fx.place(Pose::new(Vec2::new(150.0, 150.0), 0.0));
        let mut controller = MotionController::pointer(id);
        controller.set_pointer_target(Some(Vec2::new(160.0, 150.0)));

        fx.run(&controller, 0.02, 25);
        let pose = fx.pose(id);
        assert_eq!(pose.position, Vec2::new(150.0, 150.0));
        assert!((pose.angle - 90.0).abs() < 0.01);
    }

    #[test]
    fn test_intents_ignored_by_pointer_controller() {
        let mut controller = MotionController::pointer(ActorId(0));
        assert!(!controller.set_intents(KeyIntents::default()));
        assert!(controller.set_pointer_target(Some(Vec2::ZERO)));
        let mut keyboard = MotionController::keyboard(ActorId(1));
        assert!(!keyboard.set_pointer_target(None));
    }
}
