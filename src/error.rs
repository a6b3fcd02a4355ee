use thiserror::Error;

use crate::player::PlayerId;

/// Errors that can occur when editing or aggregating score records.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("round index {index} is out of range (game has {len} rounds)")]
    RoundOutOfRange { index: usize, len: usize },
    #[error("player {0} is not part of this game")]
    UnknownPlayer(PlayerId),
    #[error("player {0} is not active in this game")]
    PlayerNotActive(PlayerId),
    #[error("game {game} belongs to group {found}, expected {expected}")]
    GroupMismatch {
        game: String,
        expected: String,
        found: String,
    },
    #[error("game {0} already exists in this group")]
    DuplicateGame(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
