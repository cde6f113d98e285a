//! AbilityChess - Type definitions and constants
//!
//! This module provides the core type definitions for representing colors,
//! piece types, board coordinates and move records.

use crate::piece::PieceId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Board dimension (files and rows)
pub const BOARD_SIZE: i8 = 8;

/// File and rank names for algebraic notation
pub const FILE_NAMES: &[u8; 8] = b"abcdefgh";
pub const RANK_NAMES: &[u8; 8] = b"12345678";

/// Side of a piece. White is the first player and starts on row 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    /// Row holding this side's back rank
    pub fn home_row(self) -> i8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// Row this side's pawns start on
    pub fn pawn_row(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// Row delta of a forward pawn step
    pub fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Farthest row, where pawns promote
    pub fn promotion_row(self) -> i8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    pub fn parse(name: &str) -> Option<Color> {
        match name.to_ascii_lowercase().as_str() {
            "white" | "w" => Some(Color::White),
            "black" | "b" => Some(Color::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

/// Piece type (the chess rank of a piece, independent of its variant)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// FEN letter, uppercase for white
    pub fn to_fen(self, color: Color) -> char {
        let c = match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Parse a piece letter, ignoring case
    pub fn from_char(c: char) -> Option<PieceType> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceType::Pawn),
            'n' => Some(PieceType::Knight),
            'b' => Some(PieceType::Bishop),
            'r' => Some(PieceType::Rook),
            'q' => Some(PieceType::Queen),
            'k' => Some(PieceType::King),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PieceType::Pawn => "Pawn",
            PieceType::Knight => "Knight",
            PieceType::Bishop => "Bishop",
            PieceType::Rook => "Rook",
            PieceType::Queen => "Queen",
            PieceType::King => "King",
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Grid coordinate. `file` is the column (0 = a), `row` the rank (0 = white's back row).
///
/// Coordinates may be constructed out of range; every board query treats such
/// squares as empty and unreachable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square {
    pub file: i8,
    pub row: i8,
}

impl Square {
    pub const fn new(file: i8, row: i8) -> Self {
        Square { file, row }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        (0..BOARD_SIZE).contains(&self.file) && (0..BOARD_SIZE).contains(&self.row)
    }

    #[inline]
    pub fn offset(self, df: i8, dr: i8) -> Square {
        Square::new(self.file.saturating_add(df), self.row.saturating_add(dr))
    }

    /// Index into a 64-element array (0=a1, 1=b1, ..., 63=h8)
    #[inline]
    pub fn index(self) -> Option<usize> {
        if self.is_valid() {
            Some(self.row as usize * 8 + self.file as usize)
        } else {
            None
        }
    }

    pub fn from_index(index: usize) -> Square {
        Square::new((index % 8) as i8, (index / 8) as i8)
    }

    /// Chebyshev (king-step) distance
    pub fn distance(self, other: Square) -> i8 {
        (self.file - other.file).abs().max((self.row - other.row).abs())
    }

    /// True for the eight neighbouring squares, false for the square itself
    pub fn is_adjacent(self, other: Square) -> bool {
        self.distance(other) == 1
    }

    /// All 64 squares, a1 first
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64).map(Square::from_index)
    }

    /// Algebraic notation (e.g., "e4"); out-of-range squares print as "--"
    pub fn name(self) -> String {
        if !self.is_valid() {
            return "--".to_string();
        }
        format!(
            "{}{}",
            FILE_NAMES[self.file as usize] as char,
            RANK_NAMES[self.row as usize] as char
        )
    }

    /// Parse algebraic notation
    pub fn parse(name: &str) -> Option<Square> {
        let mut chars = name.chars();
        let file = match chars.next()? {
            c @ 'a'..='h' => (c as u8 - b'a') as i8,
            _ => return None,
        };
        let row = match chars.next()? {
            c @ '1'..='8' => (c as u8 - b'1') as i8,
            _ => return None,
        };
        if chars.next().is_some() {
            return None;
        }
        Some(Square::new(file, row))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// A candidate move. Constructed per candidate, never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: PieceId,
    pub captured: Option<PieceId>,
}

impl Move {
    pub fn new(from: Square, to: Square, piece: PieceId, captured: Option<PieceId>) -> Self {
        Move { from, to, piece, captured }
    }

    /// Coordinate notation (e.g., "e2e4")
    pub fn to_coord(&self) -> String {
        format!("{}{}", self.from, self.to)
    }
}

/// How a committed move was reached
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveKind {
    /// Plain piece geometry
    Standard,
    /// King two files along its home row, rook relocated
    Castle,
    /// Destination supplied by a movement or capture ability
    Ability,
}

/// Parse coordinate notation ("e2e4") into a square pair
pub fn parse_move(text: &str) -> Option<(Square, Square)> {
    if text.len() != 4 || !text.is_ascii() {
        return None;
    }
    let from = Square::parse(&text[0..2])?;
    let to = Square::parse(&text[2..4])?;
    Some((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_names_round_trip() {
        assert_eq!(Square::new(4, 3).name(), "e4");
        assert_eq!(Square::parse("h8"), Some(Square::new(7, 7)));
        assert_eq!(Square::parse("i1"), None);
        assert_eq!(Square::parse("a9"), None);
        assert_eq!(Square::parse("a1x"), None);
    }

    #[test]
    fn out_of_range_squares_have_no_index() {
        assert_eq!(Square::new(-1, 0).index(), None);
        assert_eq!(Square::new(0, 8).index(), None);
        assert_eq!(Square::new(7, 7).index(), Some(63));
        assert_eq!(Square::new(8, 3).name(), "--");
    }

    #[test]
    fn adjacency_is_chebyshev_one() {
        let c = Square::new(3, 3);
        assert!(c.is_adjacent(Square::new(4, 4)));
        assert!(c.is_adjacent(Square::new(2, 3)));
        assert!(!c.is_adjacent(c));
        assert!(!c.is_adjacent(Square::new(5, 3)));
    }

    #[test]
    fn parse_move_text() {
        assert_eq!(
            parse_move("e2e4"),
            Some((Square::new(4, 1), Square::new(4, 3)))
        );
        assert_eq!(parse_move("e2e"), None);
        assert_eq!(parse_move("z2e4"), None);
    }

    #[test]
    fn color_rows() {
        assert_eq!(Color::White.promotion_row(), 7);
        assert_eq!(Color::Black.forward(), -1);
        assert_eq!(Color::White.opposite(), Color::Black);
        assert_eq!(Color::parse("Black"), Some(Color::Black));
    }
}
