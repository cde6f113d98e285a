//! AbilityChess - Move Validator
//!
//! Stateless legality checks composed from grid and state-manager queries:
//! geometry (ability-modified), freeze, capture immunity and own-king safety.

use crate::board::Board;
use crate::config::HighlightMode;
use crate::piece::PieceId;
use crate::types::{Color, Move, Square};

#[derive(Clone, Copy, Debug, Default)]
pub struct MoveValidator;

impl MoveValidator {
    pub fn new() -> Self {
        MoveValidator
    }

    /// Full legality predicate for committing a move
    pub fn is_legal(&self, board: &Board, from: Square, to: Square) -> bool {
        let view = board.view();
        let states = board.states();
        let Some((id, piece)) = board.get(from) else {
            return false;
        };
        if !to.is_valid() || !states.can_move(id) {
            return false;
        }

        let movement = states.movement_moves(id, piece, &view, view.base_moves(piece));
        let reachable_by_movement = movement.contains(&to);
        if !reachable_by_movement && !states.additional_captures(id, piece, &view).contains(&to) {
            return false;
        }

        if let Some((target_id, target)) = board.get(to) {
            if !piece.is_enemy(target) {
                return false;
            }
            if !states.can_be_captured_from(target_id, from, &view) {
                return false;
            }
            if !reachable_by_movement && !states.can_capture(id, piece, to, &view) {
                return false;
            }
        }

        !view.would_leave_king_in_check(from, to, piece.color)
    }

    /// Capture-immunity clause on its own: true when `to` is empty, or holds
    /// an enemy that allows capture from `from`
    pub fn can_capture_at(&self, board: &Board, from: Square, to: Square) -> bool {
        let Some((_, piece)) = board.get(from) else {
            return false;
        };
        match board.get(to) {
            None => true,
            Some((target_id, target)) => {
                piece.is_enemy(target)
                    && board.states().can_be_captured_from(target_id, from, &board.view())
            }
        }
    }

    /// Squares to highlight for a piece.
    ///
    /// `Fast` drops friendly and capture-immune targets only; it does not test
    /// own-king safety, so a highlighted square may still be refused by
    /// `is_legal`. `Strict` keeps only squares `is_legal` accepts. Never use
    /// this list as a legality source for committing moves.
    pub fn valid_moves_for_display(
        &self,
        board: &Board,
        id: PieceId,
        mode: HighlightMode,
    ) -> Vec<Square> {
        let view = board.view();
        let Some(piece) = board.piece(id) else {
            return Vec::new();
        };
        let from = piece.position;
        let candidates = board
            .states()
            .get_modified_moves(id, &view, view.base_moves(piece));

        let mut moves = Vec::with_capacity(candidates.len());
        for to in candidates {
            if moves.contains(&to) || !self.can_capture_at(board, from, to) {
                continue;
            }
            if mode == HighlightMode::Strict && !self.is_legal(board, from, to) {
                continue;
            }
            moves.push(to);
        }
        moves
    }

    /// Every fully legal move for `color`, pieces in square order
    pub fn legal_moves(&self, board: &Board, color: Color) -> Vec<Move> {
        let mut moves = Vec::new();
        for (id, piece) in board.grid().pieces_of(color) {
            let from = piece.position;
            for to in self.valid_moves_for_display(board, id, HighlightMode::Strict) {
                moves.push(Move::new(from, to, id, board.piece_at(to)));
            }
        }
        moves
    }

    pub fn has_legal_move(&self, board: &Board, color: Color) -> bool {
        board.grid().pieces_of(color).any(|(id, _)| {
            !self
                .valid_moves_for_display(board, id, HighlightMode::Strict)
                .is_empty()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::piece::Piece;
    use crate::state::FREEZE_UNTIL_SOURCE_MOVES;
    use crate::types::PieceType;

    fn board() -> Board {
        Board::new(GameConfig {
            teleport_seed: Some(9),
            ..GameConfig::default()
        })
    }

    #[test]
    fn missing_piece_and_out_of_range_are_illegal() {
        let mut b = board();
        b.place(Piece::standard(Color::White, PieceType::Rook), Square::new(0, 0));
        let v = MoveValidator::new();
        assert!(!v.is_legal(&b, Square::new(3, 3), Square::new(3, 4)));
        assert!(!v.is_legal(&b, Square::new(0, 0), Square::new(0, 8)));
        assert!(!v.is_legal(&b, Square::new(-1, 0), Square::new(0, 0)));
        assert!(v.is_legal(&b, Square::new(0, 0), Square::new(0, 7)));
    }

    #[test]
    fn frozen_piece_has_no_moves() {
        let mut b = board();
        let rook = b
            .place(Piece::standard(Color::White, PieceType::Rook), Square::new(0, 0))
            .expect("placed");
        let source = b
            .place(Piece::standard(Color::Black, PieceType::Bishop), Square::new(1, 1))
            .expect("placed");
        b.states_mut().freeze(rook, source, FREEZE_UNTIL_SOURCE_MOVES);

        let v = MoveValidator::new();
        assert!(b.valid_moves_for_display(rook).is_empty());
        assert!(Square::all().all(|to| !v.is_legal(&b, Square::new(0, 0), to)));

        b.states_mut().unfreeze(rook);
        assert!(v.is_legal(&b, Square::new(0, 0), Square::new(0, 5)));
    }

    #[test]
    fn fast_mode_keeps_king_exposing_squares_strict_drops_them() {
        let mut b = board();
        b.place(Piece::standard(Color::White, PieceType::King), Square::new(4, 0));
        let rook = b
            .place(Piece::standard(Color::White, PieceType::Rook), Square::new(4, 2))
            .expect("placed");
        b.place(Piece::standard(Color::Black, PieceType::Rook), Square::new(4, 7));

        let v = MoveValidator::new();
        let fast = v.valid_moves_for_display(&b, rook, HighlightMode::Fast);
        let strict = v.valid_moves_for_display(&b, rook, HighlightMode::Strict);
        assert!(fast.contains(&Square::new(0, 2)));
        assert!(!strict.contains(&Square::new(0, 2)));
        assert!(strict.contains(&Square::new(4, 5)));
        assert!(strict.contains(&Square::new(4, 7)));
        assert!(!v.is_legal(&b, Square::new(4, 2), Square::new(0, 2)));
    }

    #[test]
    fn legal_moves_lists_opening_moves() {
        let b = Board::with_standard_setup(GameConfig::default());
        let v = MoveValidator::new();
        assert_eq!(v.legal_moves(&b, Color::White).len(), 20);
        assert!(v.has_legal_move(&b, Color::Black));
    }
}
