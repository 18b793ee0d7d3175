//! Maze Tanks headless runner
//!
//! Plays a session with scripted wandering actors and prints the final
//! scoreboard as JSON. Useful for soak-testing the simulation core.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use clap::Parser;
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use serde::Serialize;

    use maze_tanks::consts::FRAME_DT;
    use maze_tanks::sim::{GameEvent, GameState, KeyIntents, tick};
    use maze_tanks::{ArenaError, ArenaSettings, Scoreboard};

    /// Frames between scripted intent changes
    const RETHINK_FRAMES: u64 = 30;

    #[derive(Parser)]
    #[command(name = "maze-tanks")]
    #[command(about = "Run a headless maze tank session with scripted players")]
    struct Args {
        /// Session seed (random when omitted)
        #[arg(long)]
        seed: Option<u64>,
        /// Number of players
        #[arg(long, default_value_t = 3)]
        players: usize,
        /// Frames to simulate
        #[arg(long, default_value_t = 60 * 120)]
        frames: u64,
        /// Seconds per frame
        #[arg(long, default_value_t = FRAME_DT)]
        dt: f32,
        /// JSON settings file
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Viewport width in pixels
        #[arg(long, default_value_t = 1280.0)]
        width: f32,
        /// Viewport height in pixels
        #[arg(long, default_value_t = 720.0)]
        height: f32,
    }

    #[derive(Serialize)]
    struct Summary {
        seed: u64,
        frames: u64,
        shots: u32,
        scoreboard: Scoreboard,
    }

    pub fn run() -> Result<(), ArenaError> {
        env_logger::init();
        let args = Args::parse();

        let settings = match &args.settings {
            Some(path) => ArenaSettings::load(path)?,
            None => ArenaSettings::default(),
        };
        let seed = args.seed.unwrap_or_else(rand::random);
        log::info!("Maze Tanks (headless) starting with seed {}", seed);

        let mut state = GameState::with_keyboard_players(
            settings,
            args.players,
            Vec2::new(args.width, args.height),
            seed,
        )?;
        // Bot decisions use their own stream so the session RNG stays untouched
        let mut script = Pcg32::seed_from_u64(seed ^ 0x5eed_b075);
        let mut shots = 0;

        for frame in 0..args.frames {
            for seat in 0..args.players {
                let Some(actor) = state.actor_for_player(seat) else {
                    continue;
                };
                if frame % RETHINK_FRAMES == 0 {
                    state.set_intent(actor, wander(&mut script));
                }
                if script.random_bool(0.02) && state.fire(actor).is_some() {
                    shots += 1;
                }
            }

            tick(&mut state, args.dt);

            for event in state.drain_events() {
                match event {
                    GameEvent::ActorHit { victim, killer } => {
                        log::info!("Frame {}: {:?} destroyed by {:?}", frame, victim, killer);
                    }
                    GameEvent::RoundReset { round, .. } => log::info!("Frame {}: round {} begins", frame, round),
                    _ => {}
                }
            }
        }

        state.teardown();
        let summary = Summary {
            seed,
            frames: args.frames,
            shots,
            scoreboard: state.scoreboard.clone(),
        };
        let json = serde_json::to_string_pretty(&summary)?;
        println!("{}", json);
        Ok(())
    }

    /// Mostly drive forward, sometimes turn or reverse
    fn wander<R: Rng>(rng: &mut R) -> KeyIntents {
        let turn = rng.random_range(0..3);
        KeyIntents {
            forward: rng.random_bool(0.8),
            backward: rng.random_bool(0.1),
            left: turn == 1,
            right: turn == 2,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), maze_tanks::ArenaError> {
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The headless runner is native-only; web hosts embed the library
}
