//! AbilityChess - Error types
//!
//! Illegal moves are expected outcomes and are reported as `false`; these
//! errors cover malformed input crossing the crate boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChessError {
    #[error("invalid army composition: {0}")]
    InvalidArmy(#[source] serde_json::Error),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(#[source] serde_json::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(#[source] serde_json::Error),

    #[error("invalid square notation: {0}")]
    InvalidSquare(String),

    #[error("invalid command: {0}")]
    InvalidCommand(String),
}

pub type Result<T> = std::result::Result<T, ChessError>;
