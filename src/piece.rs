//! AbilityChess - Piece entity and variant registry
//!
//! A `Piece` is identified by the `PieceId` handle the grid issues when the
//! piece is placed. Pieces deliberately do not implement `PartialEq`: two
//! pieces with the same fields are still different pieces.

use crate::abilities::AbilitySet;
use crate::types::{Color, PieceType, Square};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle for a placed piece. Handles are never reused within a board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u32);

impl PieceId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Behavioural subtype of a piece type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    Standard,
    /// Pawn: always double-steps, captures diagonally backward too
    Ranger,
    /// Pawn: cannot be captured along its file or row
    Guard,
    /// Knight: extended (3,1) leaps before its first move
    Charge,
    /// Bishop: freezes enemies that land next to it
    Freezing,
    /// Rook: bombs the enemy one square past the first blocker
    Bombing,
    /// Queen: moves twice per turn, shatters when exposed on its row
    Glass,
    /// King: teleports once per game out of checkmate
    Resurrecting,
}

/// Registry entry describing one selectable variant
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VariantInfo {
    pub variant: Variant,
    pub piece_type: PieceType,
    pub display_name: &'static str,
    pub description: &'static str,
}

const REGISTRY: &[VariantInfo] = &[
    VariantInfo {
        variant: Variant::Ranger,
        piece_type: PieceType::Pawn,
        display_name: "Ranger",
        description: "Can move 2 squares forward at any time and capture backwards",
    },
    VariantInfo {
        variant: Variant::Guard,
        piece_type: PieceType::Pawn,
        display_name: "Guard",
        description: "Immune to captures along its file or rank",
    },
    VariantInfo {
        variant: Variant::Charge,
        piece_type: PieceType::Knight,
        display_name: "Charge",
        description: "Opens with a long (3,1) leap",
    },
    VariantInfo {
        variant: Variant::Freezing,
        piece_type: PieceType::Bishop,
        display_name: "Freezing",
        description: "Freezes enemy pieces that land adjacent to this bishop until it moves",
    },
    VariantInfo {
        variant: Variant::Bombing,
        piece_type: PieceType::Rook,
        display_name: "Bombing",
        description:
            "Can capture enemies one square beyond normal range by throwing bombs over pieces",
    },
    VariantInfo {
        variant: Variant::Glass,
        piece_type: PieceType::Queen,
        display_name: "Glass",
        description: "Must move twice per turn but shatters if exposed to horizontal threats",
    },
    VariantInfo {
        variant: Variant::Resurrecting,
        piece_type: PieceType::King,
        display_name: "Resurrecting",
        description:
            "Once per game, when about to be checkmated, teleports to a random safe square",
    },
];

impl Variant {
    pub fn name(self) -> &'static str {
        match self {
            Variant::Standard => "Standard",
            Variant::Ranger => "Ranger",
            Variant::Guard => "Guard",
            Variant::Charge => "Charge",
            Variant::Freezing => "Freezing",
            Variant::Bombing => "Bombing",
            Variant::Glass => "Glass",
            Variant::Resurrecting => "Resurrecting",
        }
    }

    /// Resolve a variant name for a piece type. `None` if the name is unknown
    /// or belongs to another piece type.
    pub fn from_name(piece_type: PieceType, name: &str) -> Option<Variant> {
        if name == "Standard" {
            return Some(Variant::Standard);
        }
        REGISTRY
            .iter()
            .find(|info| info.piece_type == piece_type && info.display_name == name)
            .map(|info| info.variant)
    }

    /// Variants selectable for a piece type, Standard first then by name
    pub fn available_for(piece_type: PieceType) -> Vec<VariantInfo> {
        let mut infos = vec![VariantInfo {
            variant: Variant::Standard,
            piece_type,
            display_name: "Standard",
            description: "Standard piece with traditional movement",
        }];
        let mut extra: Vec<VariantInfo> = REGISTRY
            .iter()
            .filter(|info| info.piece_type == piece_type)
            .copied()
            .collect();
        extra.sort_by_key(|info| info.display_name);
        infos.extend(extra);
        infos
    }

    pub fn is_valid_for(self, piece_type: PieceType) -> bool {
        Variant::from_name(piece_type, self.name()) == Some(self)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A chess piece. Color, type and variant are fixed at creation; the
/// position is written only by the grid.
#[derive(Clone, Copy, Debug)]
pub struct Piece {
    pub color: Color,
    pub piece_type: PieceType,
    pub variant: Variant,
    pub position: Square,
    pub has_moved: bool,
    pub abilities: AbilitySet,
}

impl Piece {
    /// Create an unplaced piece with the abilities its variant carries.
    /// A variant that does not belong to `piece_type` falls back to Standard.
    pub fn new(color: Color, piece_type: PieceType, variant: Variant) -> Self {
        let variant = if variant.is_valid_for(piece_type) {
            variant
        } else {
            Variant::Standard
        };
        Piece {
            color,
            piece_type,
            variant,
            position: Square::new(-1, -1),
            has_moved: false,
            abilities: variant.abilities(),
        }
    }

    pub fn standard(color: Color, piece_type: PieceType) -> Self {
        Piece::new(color, piece_type, Variant::Standard)
    }

    pub fn is_enemy(&self, other: &Piece) -> bool {
        self.color != other.color
    }

    /// True for a pawn standing on its farthest row
    pub fn can_be_promoted(&self) -> bool {
        self.piece_type == PieceType::Pawn && self.position.row == self.color.promotion_row()
    }

    /// Short label such as "White Freezing Bishop"
    pub fn label(&self) -> String {
        match self.variant {
            Variant::Standard => format!("{} {}", self.color, self.piece_type),
            v => format!("{} {} {}", self.color, v, self.piece_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_names_resolve_per_piece_type() {
        assert_eq!(Variant::from_name(PieceType::Pawn, "Guard"), Some(Variant::Guard));
        assert_eq!(Variant::from_name(PieceType::Rook, "Guard"), None);
        assert_eq!(Variant::from_name(PieceType::Queen, "Standard"), Some(Variant::Standard));
        assert_eq!(Variant::from_name(PieceType::Queen, "glass"), None);
    }

    #[test]
    fn registry_lists_standard_first() {
        let pawns = Variant::available_for(PieceType::Pawn);
        let names: Vec<&str> = pawns.iter().map(|i| i.display_name).collect();
        assert_eq!(names, vec!["Standard", "Guard", "Ranger"]);
    }

    #[test]
    fn mismatched_variant_falls_back_to_standard() {
        let piece = Piece::new(Color::White, PieceType::Knight, Variant::Glass);
        assert_eq!(piece.variant, Variant::Standard);
        assert!(piece.abilities.is_empty());
    }
}
