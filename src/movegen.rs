//! AbilityChess - Move Generator Module
//!
//! Geometric candidate generation for the six standard piece types, including
//! castling. Abilities are applied later by the state manager; nothing here
//! consults check, freezes or defensive vetoes.

use crate::grid::Grid;
use crate::piece::{Piece, PieceId};
use crate::types::{PieceType, Square};

/// Direction offsets (file, row) for sliding pieces
pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (0, -1), (-1, 0), (1, 0)];
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];
pub const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
    (0, 1), (0, -1), (-1, 0), (1, 0), (1, 1), (-1, 1), (1, -1), (-1, -1),
];
pub const KING_DIRECTIONS: [(i8, i8); 8] = QUEEN_DIRECTIONS;
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2), (-1, 2), (2, 1), (-2, 1), (2, -1), (-2, -1), (1, -2), (-1, -2),
];

/// King-side and queen-side castling destinations (files)
pub const KINGSIDE_KING_FILE: i8 = 6;
pub const QUEENSIDE_KING_FILE: i8 = 2;

/// Move generator for a single piece
#[derive(Clone, Copy, Debug, Default)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub fn new() -> Self {
        MoveGenerator
    }

    /// Standard geometric destinations, castling included
    pub fn base_moves(&self, grid: &Grid, piece: &Piece) -> Vec<Square> {
        let mut moves = Vec::with_capacity(28);
        match piece.piece_type {
            PieceType::Pawn => self.generate_pawn_moves(grid, piece, &mut moves),
            PieceType::Knight => {
                self.generate_step_moves(grid, piece, &KNIGHT_OFFSETS, &mut moves)
            }
            PieceType::Bishop => {
                self.generate_sliding_moves(grid, piece, &BISHOP_DIRECTIONS, &mut moves)
            }
            PieceType::Rook => {
                self.generate_sliding_moves(grid, piece, &ROOK_DIRECTIONS, &mut moves)
            }
            PieceType::Queen => {
                self.generate_sliding_moves(grid, piece, &QUEEN_DIRECTIONS, &mut moves)
            }
            PieceType::King => {
                self.generate_step_moves(grid, piece, &KING_DIRECTIONS, &mut moves);
                self.generate_castling_moves(grid, piece, &mut moves);
            }
        }
        moves
    }

    /// Pawn pushes and forward diagonal captures
    fn generate_pawn_moves(&self, grid: &Grid, piece: &Piece, moves: &mut Vec<Square>) {
        let forward = piece.color.forward();
        let from = piece.position;

        // Single push
        let one_step = from.offset(0, forward);
        if grid.is_empty(one_step) {
            moves.push(one_step);

            // Double push before the first move
            if !piece.has_moved {
                let two_step = from.offset(0, 2 * forward);
                if grid.is_empty(two_step) {
                    moves.push(two_step);
                }
            }
        }

        // Captures
        for df in [-1, 1] {
            let target = from.offset(df, forward);
            if grid.is_enemy(target, piece.color) {
                moves.push(target);
            }
        }
    }

    /// Leaper moves (knight, king steps) onto empty or enemy squares
    pub fn generate_step_moves(
        &self,
        grid: &Grid,
        piece: &Piece,
        offsets: &[(i8, i8)],
        moves: &mut Vec<Square>,
    ) {
        for &(df, dr) in offsets {
            let target = piece.position.offset(df, dr);
            if grid.is_empty(target) || grid.is_enemy(target, piece.color) {
                moves.push(target);
            }
        }
    }

    /// Rays stopping at the first occupied square, which is included if it
    /// holds an enemy
    pub fn generate_sliding_moves(
        &self,
        grid: &Grid,
        piece: &Piece,
        directions: &[(i8, i8)],
        moves: &mut Vec<Square>,
    ) {
        for &(df, dr) in directions {
            let mut current = piece.position;
            loop {
                current = current.offset(df, dr);
                if !current.is_valid() {
                    break;
                }
                if grid.is_empty(current) {
                    moves.push(current);
                } else {
                    if grid.is_enemy(current, piece.color) {
                        moves.push(current);
                    }
                    break;
                }
            }
        }
    }

    /// Castling destinations whose precondition holds
    fn generate_castling_moves(&self, grid: &Grid, piece: &Piece, moves: &mut Vec<Square>) {
        for kingside in [true, false] {
            if self.castling_rook(grid, piece, kingside).is_some() {
                let file = if kingside { KINGSIDE_KING_FILE } else { QUEENSIDE_KING_FILE };
                moves.push(Square::new(file, piece.color.home_row()));
            }
        }
    }

    /// Castling precondition: an unmoved king on its home square, an unmoved
    /// friendly rook in the corner, and nothing between them. Returns the rook.
    pub fn castling_rook(&self, grid: &Grid, king: &Piece, kingside: bool) -> Option<PieceId> {
        let row = king.color.home_row();
        if king.piece_type != PieceType::King
            || king.has_moved
            || king.position != Square::new(4, row)
        {
            return None;
        }

        let rook_file = if kingside { 7 } else { 0 };
        let (rook_id, rook) = grid.get(Square::new(rook_file, row))?;
        if rook.piece_type != PieceType::Rook || rook.color != king.color || rook.has_moved {
            return None;
        }

        let between = if kingside { 5..=6 } else { 1..=3 };
        let path_clear = between
            .into_iter()
            .all(|file| grid.is_empty(Square::new(file, row)));
        path_clear.then_some(rook_id)
    }

    /// Squares a piece threatens for check detection. Kings threaten their
    /// eight neighbours only: castling never captures.
    pub fn attack_moves(&self, grid: &Grid, piece: &Piece) -> Vec<Square> {
        if piece.piece_type == PieceType::King {
            let mut moves = Vec::with_capacity(8);
            self.generate_step_moves(grid, piece, &KING_DIRECTIONS, &mut moves);
            moves
        } else {
            self.base_moves(grid, piece)
        }
    }
}

/// Rook target square after castling, given the king's destination
pub fn castling_rook_squares(king_to: Square) -> (Square, Square) {
    let row = king_to.row;
    if king_to.file == KINGSIDE_KING_FILE {
        (Square::new(7, row), Square::new(5, row))
    } else {
        (Square::new(0, row), Square::new(3, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    fn put(grid: &mut Grid, color: Color, piece_type: PieceType, file: i8, row: i8) -> PieceId {
        grid.insert(Piece::standard(color, piece_type), Square::new(file, row))
            .expect("valid square")
    }

    #[test]
    fn pawn_double_push_only_before_first_move() {
        let mut grid = Grid::new();
        let id = put(&mut grid, Color::White, PieceType::Pawn, 0, 1);
        let gen = MoveGenerator::new();
        let piece = *grid.piece(id).expect("placed");
        assert_eq!(gen.base_moves(&grid, &piece), vec![Square::new(0, 2), Square::new(0, 3)]);

        let mut moved = piece;
        moved.has_moved = true;
        assert_eq!(gen.base_moves(&grid, &moved), vec![Square::new(0, 2)]);
    }

    #[test]
    fn blocked_pawn_cannot_jump() {
        let mut grid = Grid::new();
        let id = put(&mut grid, Color::Black, PieceType::Pawn, 3, 6);
        put(&mut grid, Color::White, PieceType::Knight, 3, 5);
        put(&mut grid, Color::White, PieceType::Bishop, 4, 5);
        let piece = *grid.piece(id).expect("placed");
        assert_eq!(MoveGenerator::new().base_moves(&grid, &piece), vec![Square::new(4, 5)]);
    }

    #[test]
    fn knight_in_corner_has_two_moves() {
        let mut grid = Grid::new();
        let id = put(&mut grid, Color::White, PieceType::Knight, 0, 0);
        let piece = *grid.piece(id).expect("placed");
        let moves = MoveGenerator::new().base_moves(&grid, &piece);
        assert_eq!(moves.len(), 2);
        assert!(moves.contains(&Square::new(1, 2)));
        assert!(moves.contains(&Square::new(2, 1)));
    }

    #[test]
    fn rook_ray_stops_at_blockers() {
        let mut grid = Grid::new();
        let id = put(&mut grid, Color::White, PieceType::Rook, 0, 0);
        put(&mut grid, Color::White, PieceType::Pawn, 0, 2);
        put(&mut grid, Color::Black, PieceType::Knight, 3, 0);
        let piece = *grid.piece(id).expect("placed");
        let moves = MoveGenerator::new().base_moves(&grid, &piece);
        assert_eq!(moves.len(), 4);
        assert!(moves.contains(&Square::new(3, 0)));
        assert!(!moves.contains(&Square::new(0, 2)));
    }

    #[test]
    fn castling_requires_empty_path_and_unmoved_rook() {
        let mut grid = Grid::new();
        let king = put(&mut grid, Color::White, PieceType::King, 4, 0);
        put(&mut grid, Color::White, PieceType::Rook, 7, 0);
        let queen_rook = put(&mut grid, Color::White, PieceType::Rook, 0, 0);
        put(&mut grid, Color::White, PieceType::Knight, 1, 0);
        let gen = MoveGenerator::new();
        let piece = *grid.piece(king).expect("placed");

        assert!(gen.castling_rook(&grid, &piece, true).is_some());
        assert!(gen.castling_rook(&grid, &piece, false).is_none());
        let moves = gen.base_moves(&grid, &piece);
        assert!(moves.contains(&Square::new(6, 0)));
        assert!(!moves.contains(&Square::new(2, 0)));

        grid.piece_mut(queen_rook).expect("placed").has_moved = true;
        assert!(gen.castling_rook(&grid, &piece, false).is_none());
    }

    #[test]
    fn king_attacks_exclude_castling() {
        let mut grid = Grid::new();
        let king = put(&mut grid, Color::Black, PieceType::King, 4, 7);
        put(&mut grid, Color::Black, PieceType::Rook, 7, 7);
        let piece = *grid.piece(king).expect("placed");
        let attacks = MoveGenerator::new().attack_moves(&grid, &piece);
        assert!(!attacks.contains(&Square::new(6, 7)));
        assert_eq!(attacks.len(), 5);
    }

    #[test]
    fn rook_squares_follow_king_destination() {
        assert_eq!(
            castling_rook_squares(Square::new(6, 0)),
            (Square::new(7, 0), Square::new(5, 0))
        );
        assert_eq!(
            castling_rook_squares(Square::new(2, 7)),
            (Square::new(0, 7), Square::new(3, 7))
        );
    }
}
