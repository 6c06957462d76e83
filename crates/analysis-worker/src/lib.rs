//! Engine-backed analysis of finished games.
//!
//! Games are replayed on a private `chess_core::Table` and a UCI engine is
//! asked for its preferred move at every position.

pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;

pub use analysis::{analyze_game, GameAnalysis, MoveAnalysis};
pub use config::WorkerConfig;
pub use engine::{BestMoveSearch, EngineOptions, UciEngine};
pub use error::WorkerError;
