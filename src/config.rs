//! AbilityChess - Game configuration
//!
//! Settings are an explicit value handed to `Board::new`; nothing here is
//! global. The struct loads from JSON with every field optional.

use crate::error::{ChessError, Result};
use crate::types::{Color, Square};
use serde::{Deserialize, Serialize};

/// How `valid_moves_for_display` filters candidates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HighlightMode {
    /// Drop friendly and capture-immune targets only. A highlighted square
    /// may still be rejected by `is_legal` because it exposes the king.
    #[default]
    Fast,
    /// Every highlighted square passes the full legality predicate
    Strict,
}

impl HighlightMode {
    pub fn parse(name: &str) -> Option<HighlightMode> {
        match name.to_ascii_lowercase().as_str() {
            "fast" => Some(HighlightMode::Fast),
            "strict" => Some(HighlightMode::Strict),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side the local player controls
    pub player_color: Color,
    pub flip_board_for_black: bool,
    pub highlight_mode: HighlightMode,
    /// Forbid castling out of, through or into an attacked square
    pub strict_castling: bool,
    /// Seed for the Resurrecting king's teleport pick; random when unset
    pub teleport_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            player_color: Color::White,
            flip_board_for_black: true,
            highlight_mode: HighlightMode::Fast,
            strict_castling: false,
            teleport_seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(ChessError::InvalidConfig)
    }

    /// Screen row 0 is the top. Row 7 is drawn at the top unless flipped.
    pub fn should_flip_board(&self) -> bool {
        self.flip_board_for_black && self.player_color == Color::White
    }

    /// Board square to screen cell
    pub fn to_display(&self, square: Square) -> (i8, i8) {
        if self.should_flip_board() {
            (square.file, 7 - square.row)
        } else {
            (square.file, square.row)
        }
    }

    /// Screen cell to board square (inverse of `to_display`)
    pub fn from_display(&self, x: i8, y: i8) -> Square {
        if self.should_flip_board() {
            Square::new(x, 7 - y)
        } else {
            Square::new(x, y)
        }
    }
}
