//! Session state
//!
//! Owns everything a running arena needs: the round's maze and actors, the
//! per-seat motion controllers, projectiles, the round state machine, the
//! session scoreboard and the event queue the host drains each frame.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actors::{ActorId, ActorStore, VisualHandle};
use super::maze::{Maze, WallSegment, cell_size_for_viewport, wall_thickness};
use super::motion::{KeyIntents, MotionController};
use super::projectiles::{ProjectileId, ProjectileManager};
use super::round::{RoundOutcome, RoundStateMachine};
use crate::error::ArenaError;
use crate::scoreboard::Scoreboard;
use crate::settings::ArenaSettings;

/// Read-only view of the world shared by per-frame components
#[derive(Debug, Clone, Copy)]
pub struct Arena<'a> {
    pub maze: &'a Maze,
    pub cell_size: f32,
    pub settings: &'a ArenaSettings,
}

/// How a player seat is steered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlKind {
    #[default]
    Keyboard,
    Pointer,
}

/// Notifications for the host, drained once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ActorHit {
        victim: ActorId,
        /// None for self-hits
        killer: Option<ActorId>,
    },
    RoundEnding {
        outcome: RoundOutcome,
        remaining: f32,
    },
    RoundReset {
        round: u32,
        /// Visuals of the previous round, to be released by the host
        released: Vec<VisualHandle>,
    },
    ProjectileFired {
        projectile: ProjectileId,
        owner: ActorId,
    },
    ProjectileRicocheted {
        projectile: ProjectileId,
        position: Vec2,
    },
    ProjectileRemoved {
        projectile: ProjectileId,
        visual: Option<VisualHandle>,
    },
}

/// A running arena session
#[derive(Debug)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    pub settings: ArenaSettings,
    pub(crate) rng: Pcg32,
    /// Viewport the maze is scaled into (pixels)
    pub viewport: Vec2,
    /// Steering kind per player seat
    pub controls: Vec<ControlKind>,
    pub maze: Maze,
    pub cell_size: f32,
    pub actors: ActorStore,
    /// One per live seat, rebuilt each round
    pub controllers: Vec<MotionController>,
    pub projectiles: ProjectileManager,
    pub round: RoundStateMachine,
    pub scoreboard: Scoreboard,
    /// Rounds started this session (1-based)
    pub round_number: u32,
    /// Seconds since the session started
    pub clock: f64,
    /// Set by teardown; the tick ignores a torn-down session
    pub torn_down: bool,
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Start a session with one actor per entry in `controls`
    pub fn new(settings: ArenaSettings, controls: Vec<ControlKind>, viewport: Vec2, seed: u64) -> Result<Self, ArenaError> {
        settings.validate()?;
        if controls.is_empty() {
            return Err(ArenaError::NoActors);
        }
        // The smallest maze a round can pick must still seat everyone
        let min_width = settings.maze_min_width;
        let min_cells = (min_width * settings.maze_height_for(min_width)) as usize;
        if controls.len() > min_cells {
            return Err(ArenaError::TooManyActors {
                requested: controls.len(),
                cells: min_cells,
            });
        }

        let mut rng = Pcg32::seed_from_u64(seed);
        let (maze, cell_size) = round_maze(&settings, viewport, &mut rng)?;

        let mut state = Self {
            seed,
            round: RoundStateMachine::new(settings.win_countdown, settings.draw_countdown),
            scoreboard: Scoreboard::new(controls.len()),
            settings,
            rng,
            viewport,
            controls,
            maze,
            cell_size,
            actors: ActorStore::new(),
            controllers: Vec::new(),
            projectiles: ProjectileManager::new(),
            round_number: 1,
            clock: 0.0,
            torn_down: false,
            events: Vec::new(),
        };
        state.populate()?;
        log::info!("Session started with seed {}", seed);
        Ok(state)
    }

    /// Convenience constructor with every seat on the keyboard
    pub fn with_keyboard_players(
        settings: ArenaSettings,
        players: usize,
        viewport: Vec2,
        seed: u64,
    ) -> Result<Self, ArenaError> {
        Self::new(settings, vec![ControlKind::Keyboard; players], viewport, seed)
    }

    fn populate(&mut self) -> Result<(), ArenaError> {
        let ids = self.actors.spawn(
            self.controls.len(),
            &self.maze,
            self.cell_size,
            &self.settings,
            &mut self.rng,
        )?;
        self.controllers = ids
            .iter()
            .zip(&self.controls)
            .map(|(&id, kind)| match kind {
                ControlKind::Keyboard => MotionController::keyboard(id),
                ControlKind::Pointer => MotionController::pointer(id),
            })
            .collect();
        Ok(())
    }

    pub fn arena(&self) -> Arena<'_> {
        Arena {
            maze: &self.maze,
            cell_size: self.cell_size,
            settings: &self.settings,
        }
    }

    /// This round's actor for a player seat, while it is alive
    pub fn actor_for_player(&self, player_index: usize) -> Option<ActorId> {
        self.actors.for_player(player_index).map(|a| a.id)
    }

    fn controller_mut(&mut self, actor: ActorId) -> Option<&mut MotionController> {
        self.controllers.iter_mut().find(|c| c.actor() == actor)
    }

    /// Set held keyboard intents for an actor
    pub fn set_intent(&mut self, actor: ActorId, intents: KeyIntents) -> bool {
        self.controller_mut(actor).is_some_and(|c| c.set_intents(intents))
    }

    /// Set (or clear) the pointer target for an actor
    pub fn set_pointer_target(&mut self, actor: ActorId, target: Option<Vec2>) -> bool {
        self.controller_mut(actor).is_some_and(|c| c.set_pointer_target(target))
    }

    /// Fire from an actor. No-op for dead actors, cooldowns and a full cap.
    pub fn fire(&mut self, actor: ActorId) -> Option<ProjectileId> {
        if self.torn_down {
            return None;
        }
        let arena = Arena {
            maze: &self.maze,
            cell_size: self.cell_size,
            settings: &self.settings,
        };
        let id = self.projectiles.fire(actor, self.clock, &arena, &self.actors)?;
        self.events.push(GameEvent::ProjectileFired { projectile: id, owner: actor });
        Some(id)
    }

    pub fn attach_visual(&mut self, actor: ActorId, visual: VisualHandle) -> bool {
        self.actors.attach_visual(actor, visual)
    }

    pub fn attach_projectile_visual(&mut self, projectile: ProjectileId, visual: VisualHandle) -> bool {
        self.projectiles.attach_visual(projectile, visual)
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Solid wall segments of the current maze, in pixels
    pub fn wall_segments(&self) -> Vec<WallSegment> {
        self.maze.wall_segments(self.cell_size)
    }

    /// Rendered wall stroke width for the current maze
    pub fn wall_thickness(&self) -> f32 {
        wall_thickness(self.cell_size)
    }

    /// Replace the round: clear actors and projectiles, regenerate the maze
    /// and respawn every seat.
    pub fn reset_round(&mut self) -> Result<(), ArenaError> {
        let mut released = self.actors.clear();
        released.extend(self.projectiles.clear());
        self.controllers.clear();

        let (maze, cell_size) = round_maze(&self.settings, self.viewport, &mut self.rng)?;
        self.maze = maze;
        self.cell_size = cell_size;
        self.populate()?;

        self.round_number += 1;
        self.round.finish_reset();
        log::info!("Round {} started", self.round_number);
        self.events.push(GameEvent::RoundReset {
            round: self.round_number,
            released,
        });
        Ok(())
    }

    /// Score a finished round and start the next one
    pub(crate) fn finish_round(&mut self, outcome: RoundOutcome) {
        let winner = match outcome {
            RoundOutcome::Win if self.actors.alive_count() == 1 => self.actors.alive().next().map(|a| a.player_index),
            _ => None,
        };
        self.scoreboard.record_round(winner);
        if let Err(err) = self.reset_round() {
            log::error!("Round reset failed: {}", err);
            self.round.finish_reset();
        }
    }

    /// Stop the session: cancel the countdown and hand back every visual
    pub fn teardown(&mut self) -> Vec<VisualHandle> {
        self.round.stop_timer();
        self.controllers.clear();
        self.torn_down = true;
        let mut released = self.actors.clear();
        released.extend(self.projectiles.clear());
        log::info!("Session torn down after {} rounds", self.scoreboard.rounds);
        released
    }
}

/// Pick a maze size for a round, scale it into the viewport and generate it
fn round_maze<R: Rng>(settings: &ArenaSettings, viewport: Vec2, rng: &mut R) -> Result<(Maze, f32), ArenaError> {
    let width = rng.random_range(settings.maze_min_width..=settings.maze_max_width);
    let height = settings.maze_height_for(width);
    let cell_size = cell_size_for_viewport(width, height, viewport, settings.viewport_fill)?;
    let maze = Maze::generate_with(width, height, settings.extra_opening_chance, rng)?;
    Ok((maze, cell_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(1200.0, 800.0);

    fn session(players: usize) -> GameState {
        GameState::with_keyboard_players(ArenaSettings::default(), players, VIEWPORT, 42).unwrap()
    }

    #[test]
    fn test_new_session_spawns_every_seat() {
        let state = session(3);
        assert_eq!(state.actors.alive_count(), 3);
        assert_eq!(state.controllers.len(), 3);
        assert_eq!((state.maze.width(), state.maze.height()), (6, 3));
        // min(0.85 * 1200 / 6, 0.85 * 800 / 3)
        assert!((state.cell_size - 170.0).abs() < 1e-3);
        for seat in 0..3 {
            assert!(state.actor_for_player(seat).is_some());
        }
    }

    #[test]
    fn test_rejects_bad_construction() {
        let settings = ArenaSettings::default();
        assert!(matches!(
            GameState::new(settings.clone(), vec![], VIEWPORT, 1),
            Err(ArenaError::NoActors)
        ));
        assert!(matches!(
            GameState::with_keyboard_players(settings.clone(), 19, VIEWPORT, 1),
            Err(ArenaError::TooManyActors { .. })
        ));
        assert!(matches!(
            GameState::with_keyboard_players(settings, 2, Vec2::new(0.0, 600.0), 1),
            Err(ArenaError::InvalidViewport { .. })
        ));
    }

    #[test]
    fn test_same_seed_same_session() {
        let a = session(2);
        let b = session(2);
        assert_eq!(a.wall_segments(), b.wall_segments());
        let poses_a: Vec<_> = a.actors.iter().map(|x| x.pose).collect();
        let poses_b: Vec<_> = b.actors.iter().map(|x| x.pose).collect();
        assert_eq!(poses_a, poses_b);
    }

    #[test]
    fn test_intents_route_by_control_kind() {
        let mut state = GameState::new(
            ArenaSettings::default(),
            vec![ControlKind::Keyboard, ControlKind::Pointer],
            VIEWPORT,
            7,
        )
        .unwrap();
        let keyboard = state.actor_for_player(0).unwrap();
        let pointer = state.actor_for_player(1).unwrap();

        assert!(state.set_intent(keyboard, KeyIntents::default()));
        assert!(!state.set_intent(pointer, KeyIntents::default()));
        assert!(state.set_pointer_target(pointer, Some(Vec2::ZERO)));
        assert!(!state.set_intent(ActorId(999), KeyIntents::default()));
    }

    #[test]
    fn test_fire_queues_event() {
        let mut state = session(2);
        let shooter = state.actor_for_player(0).unwrap();
        let id = state.fire(shooter).unwrap();
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::ProjectileFired {
                projectile: id,
                owner: shooter
            }]
        );
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_reset_round_mints_new_actors() {
        let mut state = session(2);
        let before = state.actor_for_player(0).unwrap();
        state.attach_visual(before, VisualHandle(5));

        state.reset_round().unwrap();
        let after = state.actor_for_player(0).unwrap();
        assert_ne!(before, after);
        assert_eq!(state.round_number, 2);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::RoundReset {
                round: 2,
                released: vec![VisualHandle(5)]
            }]
        );
    }

    #[test]
    fn test_teardown_releases_everything() {
        let mut state = session(2);
        let a = state.actor_for_player(0).unwrap();
        let b = state.actor_for_player(1).unwrap();
        state.attach_visual(a, VisualHandle(1));
        state.attach_visual(b, VisualHandle(2));
        let shot = state.fire(a).unwrap();
        state.attach_projectile_visual(shot, VisualHandle(3));

        let mut released = state.teardown();
        released.sort_by_key(|v| v.0);
        assert_eq!(released, vec![VisualHandle(1), VisualHandle(2), VisualHandle(3)]);
        assert!(state.actors.is_empty());
        assert!(state.fire(a).is_none());
    }

    #[test]
    fn test_wall_rendering_data() {
        let state = session(2);
        assert!(!state.wall_segments().is_empty());
        assert!((state.wall_thickness() - state.cell_size * 0.08).abs() < 1e-4);
        assert_eq!(state.arena().maze.width(), state.maze.width());
    }
}
