//! Worker error types

use chess_core::{IllegalMove, NotationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    Config(&'static str),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Depth {depth} outside 1..={max}")]
    DepthOutOfRange { depth: u8, max: u8 },

    #[error("Illegal move {mv} at ply {ply}: {source}")]
    IllegalMove {
        ply: usize,
        mv: String,
        #[source]
        source: IllegalMove,
    },

    #[error("Notation error: {0}")]
    Notation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<NotationError> for WorkerError {
    fn from(e: NotationError) -> Self {
        Self::Notation(e.to_string())
    }
}
