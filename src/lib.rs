//! AbilityChess - Chess rules engine with per-piece abilities
//!
//! A chess core where each piece variant may carry abilities:
//! - Movement and capture modifiers (Ranger pawn, Charge knight, Bombing rook)
//! - Defensive vetoes (Guard pawn)
//! - Passive auras and board effects (Freezing bishop)
//! - Mandatory multi-move turns (Glass queen)
//! - Once-per-game checkmate escape (Resurrecting king)
//!
//! `Board` is the entry point: set it up from two `Army` compositions, commit
//! moves with `Board::move_piece`, and query check and highlights through the
//! same validation path.

pub mod types;
pub mod error;
pub mod config;
pub mod abilities;
pub mod piece;
pub mod variants;
pub mod grid;
pub mod movegen;
pub mod state;
pub mod board;
pub mod validator;
pub mod army;
pub mod snapshot;
pub mod status;
pub mod console;

pub use army::Army;
pub use board::{Board, BoardEvent, BoardView};
pub use config::{GameConfig, HighlightMode};
pub use error::ChessError;
pub use piece::{Piece, PieceId, Variant};
pub use snapshot::BoardSnapshot;
pub use status::GameStatus;
pub use types::{Color, MoveKind, PieceType, Square};
