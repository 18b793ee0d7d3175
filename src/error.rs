//! Construction-time errors
//!
//! Only setup paths fail. Per-frame simulation absorbs conflicts locally.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("maze dimensions must be at least 1x1, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
    #[error("viewport must be positive, got {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },
    #[error("cannot spawn {requested} actors into {cells} cells")]
    TooManyActors { requested: usize, cells: usize },
    #[error("at least one actor is required")]
    NoActors,
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("failed to parse settings: {0}")]
    SettingsParse(#[from] serde_json::Error),
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
}
