//! AbilityChess - Game status evaluation
//!
//! Checkmate and stalemate come from enumerating every piece of the side to
//! move through the full legality predicate. Pieces flagged for auto-capture
//! should be resolved with `Board::resolve_pending_captures` first.

use crate::board::Board;
use crate::types::{Color, PieceType};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Check,
    Checkmate,
    Stalemate,
    /// Insufficient material
    Draw,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        matches!(self, GameStatus::Checkmate | GameStatus::Stalemate | GameStatus::Draw)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameStatus::Playing => "playing",
            GameStatus::Check => "check",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
            GameStatus::Draw => "draw",
        };
        f.write_str(name)
    }
}

/// Status for the side about to move
pub fn evaluate(board: &Board, color: Color) -> GameStatus {
    let in_check = board.is_king_in_check(color);
    if !board.validator().has_legal_move(board, color) {
        return if in_check {
            GameStatus::Checkmate
        } else {
            GameStatus::Stalemate
        };
    }
    if is_insufficient_material(board) {
        return GameStatus::Draw;
    }
    if in_check {
        GameStatus::Check
    } else {
        GameStatus::Playing
    }
}

/// Bare kings, or kings plus a single knight or bishop
pub fn is_insufficient_material(board: &Board) -> bool {
    let mut others = board
        .grid()
        .pieces()
        .filter(|(_, piece)| piece.piece_type != PieceType::King);
    match (others.next(), others.next()) {
        (None, _) => true,
        (Some((_, piece)), None) => {
            matches!(piece.piece_type, PieceType::Knight | PieceType::Bishop)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::piece::{Piece, Variant};
    use crate::types::Square;

    fn board() -> Board {
        Board::new(GameConfig {
            teleport_seed: Some(11),
            ..GameConfig::default()
        })
    }

    /// Back-rank mate: white king h1 boxed by its pawns, black rook on a1
    fn back_rank(king_variant: Variant) -> Board {
        let mut b = board();
        b.place(Piece::new(Color::White, PieceType::King, king_variant), Square::new(7, 0));
        b.place(Piece::standard(Color::White, PieceType::Pawn), Square::new(6, 1));
        b.place(Piece::standard(Color::White, PieceType::Pawn), Square::new(7, 1));
        b.place(Piece::standard(Color::Black, PieceType::Rook), Square::new(0, 0));
        b.place(Piece::standard(Color::Black, PieceType::King), Square::new(0, 7));
        b
    }

    #[test]
    fn opening_position_is_playing() {
        let b = Board::with_standard_setup(GameConfig::default());
        assert_eq!(evaluate(&b, Color::White), GameStatus::Playing);
    }

    #[test]
    fn back_rank_mate_is_checkmate() {
        let b = back_rank(Variant::Standard);
        assert_eq!(evaluate(&b, Color::White), GameStatus::Checkmate);
        assert!(evaluate(&b, Color::White).is_over());
    }

    #[test]
    fn resurrecting_king_escapes_back_rank_mate() {
        let b = back_rank(Variant::Resurrecting);
        assert_eq!(evaluate(&b, Color::White), GameStatus::Check);
    }

    #[test]
    fn cornered_king_without_check_is_stalemate() {
        let mut b = board();
        b.place(Piece::standard(Color::Black, PieceType::King), Square::new(7, 7));
        b.place(Piece::standard(Color::White, PieceType::Queen), Square::new(6, 5));
        b.place(Piece::standard(Color::White, PieceType::King), Square::new(5, 6));
        assert_eq!(evaluate(&b, Color::Black), GameStatus::Stalemate);
    }

    #[test]
    fn lone_minor_piece_is_a_draw() {
        let mut b = board();
        b.place(Piece::standard(Color::White, PieceType::King), Square::new(4, 0));
        b.place(Piece::standard(Color::Black, PieceType::King), Square::new(4, 7));
        assert_eq!(evaluate(&b, Color::White), GameStatus::Draw);

        b.place(Piece::standard(Color::White, PieceType::Knight), Square::new(1, 0));
        assert_eq!(evaluate(&b, Color::White), GameStatus::Draw);

        b.place(Piece::standard(Color::Black, PieceType::Pawn), Square::new(0, 6));
        assert_eq!(evaluate(&b, Color::White), GameStatus::Playing);
    }
}
