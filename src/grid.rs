//! AbilityChess - Position grid
//!
//! The raw 8x8 array of piece handles plus the arena that owns the pieces.
//! The grid knows nothing about legality; it only keeps every placed piece's
//! `position` in sync with its slot.

use crate::piece::{Piece, PieceId};
use crate::types::{Color, PieceType, Square};

#[derive(Clone, Debug)]
pub struct Grid {
    squares: [Option<PieceId>; 64],
    /// Indexed by `PieceId`; a retired handle leaves `None` behind
    pieces: Vec<Option<Piece>>,
}

impl Default for Grid {
    fn default() -> Self {
        Grid::new()
    }
}

impl Grid {
    pub fn new() -> Self {
        Grid {
            squares: [None; 64],
            pieces: Vec::with_capacity(32),
        }
    }

    /// Put a piece on an empty, valid square and issue its handle
    pub(crate) fn insert(&mut self, mut piece: Piece, square: Square) -> Option<PieceId> {
        let index = square.index()?;
        debug_assert!(self.squares[index].is_none(), "insert onto occupied {}", square);
        let id = PieceId(self.pieces.len() as u32);
        piece.position = square;
        self.pieces.push(Some(piece));
        self.squares[index] = Some(id);
        Some(id)
    }

    /// Take a piece off the board and retire its handle
    pub(crate) fn remove(&mut self, id: PieceId) -> Option<Piece> {
        let piece = self.pieces.get_mut(id.index())?.take()?;
        if let Some(index) = piece.position.index() {
            if self.squares[index] == Some(id) {
                self.squares[index] = None;
            }
        }
        Some(piece)
    }

    /// Move whatever stands on `from` to `to`. Anything on `to` is removed
    /// from the arena first. Returns the moved handle.
    pub(crate) fn relocate(&mut self, from: Square, to: Square) -> Option<PieceId> {
        let from_index = from.index()?;
        let to_index = to.index()?;
        let id = self.squares[from_index]?;
        if let Some(occupant) = self.squares[to_index] {
            if occupant != id {
                self.remove(occupant);
            }
        }
        self.squares[from_index] = None;
        self.squares[to_index] = Some(id);
        if let Some(piece) = self.piece_mut(id) {
            piece.position = to;
        }
        Some(id)
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<PieceId> {
        square.index().and_then(|index| self.squares[index])
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.index()).and_then(Option::as_ref)
    }

    pub(crate) fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Handle and piece on a square
    pub fn get(&self, square: Square) -> Option<(PieceId, &Piece)> {
        let id = self.piece_at(square)?;
        self.piece(id).map(|piece| (id, piece))
    }

    /// Valid and unoccupied
    pub fn is_empty(&self, square: Square) -> bool {
        square.is_valid() && self.piece_at(square).is_none()
    }

    pub fn is_enemy(&self, square: Square, friendly: Color) -> bool {
        self.get(square).map_or(false, |(_, piece)| piece.color != friendly)
    }

    pub fn is_friendly(&self, square: Square, friendly: Color) -> bool {
        self.get(square).map_or(false, |(_, piece)| piece.color == friendly)
    }

    /// Live pieces in square order (a1, b1, ..., h8)
    pub fn pieces(&self) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.squares
            .iter()
            .filter_map(move |slot| slot.and_then(|id| self.piece(id).map(|piece| (id, piece))))
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.color == color)
    }

    pub fn find_king(&self, color: Color) -> Option<(PieceId, Square)> {
        self.pieces_of(color)
            .find(|(_, piece)| piece.piece_type == PieceType::King)
            .map(|(id, piece)| (id, piece.position))
    }

    pub fn piece_count(&self) -> usize {
        self.squares.iter().filter(|slot| slot.is_some()).count()
    }

    /// Every live piece sits on the slot its position names and vice versa
    pub fn is_consistent(&self) -> bool {
        let slots_ok = self.squares.iter().enumerate().all(|(index, slot)| match slot {
            Some(id) => self
                .piece(*id)
                .map_or(false, |piece| piece.position == Square::from_index(index)),
            None => true,
        });
        let arena_ok = self.pieces.iter().enumerate().all(|(i, slot)| match slot {
            Some(piece) => self.piece_at(piece.position) == Some(PieceId(i as u32)),
            None => true,
        });
        slots_ok && arena_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_relocate_remove_keep_slots_in_sync() {
        let mut grid = Grid::new();
        let rook = grid
            .insert(Piece::standard(Color::White, PieceType::Rook), Square::new(0, 0))
            .expect("valid square");
        let pawn = grid
            .insert(Piece::standard(Color::Black, PieceType::Pawn), Square::new(0, 6))
            .expect("valid square");

        assert_eq!(grid.relocate(Square::new(0, 0), Square::new(0, 6)), Some(rook));
        assert!(grid.piece(pawn).is_none());
        assert_eq!(grid.piece_at(Square::new(0, 6)), Some(rook));
        assert!(grid.is_empty(Square::new(0, 0)));
        assert!(grid.is_consistent());

        assert!(grid.remove(rook).is_some());
        assert_eq!(grid.piece_count(), 0);
        assert!(grid.is_consistent());
    }

    #[test]
    fn out_of_range_is_never_occupied_or_empty() {
        let grid = Grid::new();
        assert_eq!(grid.piece_at(Square::new(8, 0)), None);
        assert!(!grid.is_empty(Square::new(-1, 3)));
        assert!(grid.get(Square::new(3, 9)).is_none());
    }

    #[test]
    fn handles_are_not_reused() {
        let mut grid = Grid::new();
        let a = grid
            .insert(Piece::standard(Color::White, PieceType::Knight), Square::new(1, 0))
            .expect("valid square");
        grid.remove(a);
        let b = grid
            .insert(Piece::standard(Color::White, PieceType::Knight), Square::new(1, 0))
            .expect("valid square");
        assert_ne!(a, b);
    }
}
