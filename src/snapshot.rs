//! AbilityChess - Full-state snapshots
//!
//! A snapshot lists every piece with its transient state so another replica
//! can rebuild the same position. Handles are process-local, so freeze
//! sources are recorded by square.

use crate::board::Board;
use crate::config::GameConfig;
use crate::error::{ChessError, Result};
use crate::piece::{Piece, Variant};
use crate::state::StateValue;
use crate::types::{Color, PieceType, Square};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSnapshot {
    pub piece_type: PieceType,
    pub variant: Variant,
    pub color: Color,
    pub square: Square,
    pub has_moved: bool,
    #[serde(default)]
    pub is_frozen: bool,
    #[serde(default)]
    pub frozen_by: Option<Square>,
    #[serde(default)]
    pub frozen_duration: i32,
    #[serde(default)]
    pub moves_this_turn: u32,
    #[serde(default)]
    pub pending_auto_capture: bool,
    #[serde(default)]
    pub custom: BTreeMap<String, StateValue>,
}

/// Pieces in registration order, which is the ability dispatch order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub pieces: Vec<PieceSnapshot>,
}

impl BoardSnapshot {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{\"pieces\":[]}".to_string())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(ChessError::InvalidSnapshot)
    }
}

impl Board {
    pub fn snapshot(&self) -> BoardSnapshot {
        let states = self.states();
        let pieces = states
            .registered()
            .iter()
            .filter_map(|&id| {
                let piece = self.piece(id)?;
                let state = states.state(id).cloned().unwrap_or_default();
                Some(PieceSnapshot {
                    piece_type: piece.piece_type,
                    variant: piece.variant,
                    color: piece.color,
                    square: piece.position,
                    has_moved: piece.has_moved,
                    is_frozen: state.is_frozen,
                    frozen_by: state
                        .frozen_by
                        .and_then(|source| self.piece(source))
                        .map(|source| source.position),
                    frozen_duration: state.frozen_duration,
                    moves_this_turn: state.moves_this_turn,
                    pending_auto_capture: state.pending_auto_capture,
                    custom: state.custom,
                })
            })
            .collect();
        BoardSnapshot { pieces }
    }

    /// Rebuild a board from a trusted snapshot. Entries on invalid or
    /// repeated squares are dropped; a freeze whose source square is empty
    /// is dropped too.
    pub fn from_snapshot(snapshot: &BoardSnapshot, config: GameConfig) -> Board {
        let mut board = Board::new(config);
        let mut placed = Vec::with_capacity(snapshot.pieces.len());

        for entry in &snapshot.pieces {
            if board.piece_at(entry.square).is_some() {
                warn!("Snapshot lists two pieces on {}, keeping the first", entry.square);
                continue;
            }
            let mut piece = Piece::new(entry.color, entry.piece_type, entry.variant);
            piece.has_moved = entry.has_moved;
            if let Some(id) = board.place(piece, entry.square) {
                placed.push((id, entry));
            }
        }

        for (id, entry) in placed {
            let source = entry.frozen_by.and_then(|square| board.piece_at(square));
            let states = board.states_mut();
            if entry.is_frozen {
                match source {
                    Some(source) => states.freeze(id, source, entry.frozen_duration),
                    None => warn!("Dropping freeze on {}: source square is empty", entry.square),
                }
            }
            let state = states.state_mut(id);
            state.moves_this_turn = entry.moves_this_turn;
            state.pending_auto_capture = entry.pending_auto_capture;
            state.custom = entry.custom.clone();
        }
        board
    }
}
