//! AbilityChess - Army composition and piece factory
//!
//! An army maps (piece type, file) slots to variants and builds pieces from
//! them. Armies are setup factories only; they hold no gameplay state.
//!
//! The exchange format is a JSON list of assignments:
//! `[{"type":"Pawn","file":0,"variant":"Ranger"}, ...]`

use crate::error::{ChessError, Result};
use crate::piece::{Piece, Variant};
use crate::types::{Color, PieceType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Back-rank piece types by file
pub const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// One (type, file, variant) slot of a composition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PieceAssignment {
    pub piece_type: PieceType,
    pub file: u8,
    pub variant: Variant,
}

/// Wire shape: names stay strings so unknown entries can be recovered
#[derive(Serialize, Deserialize)]
struct WireAssignment {
    #[serde(rename = "type")]
    piece_type: String,
    file: i64,
    variant: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Army {
    color: Color,
    classes: BTreeMap<(PieceType, u8), Variant>,
}

impl Army {
    /// Standard army: every pawn file and back-rank slot set to Standard
    pub fn new(color: Color) -> Self {
        let mut army = Army {
            color,
            classes: BTreeMap::new(),
        };
        army.reset();
        army
    }

    fn reset(&mut self) {
        self.classes.clear();
        for file in 0..8u8 {
            self.classes.insert((PieceType::Pawn, file), Variant::Standard);
        }
        for (file, piece_type) in BACK_RANK.iter().enumerate() {
            self.classes.insert((*piece_type, file as u8), Variant::Standard);
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Assign a variant to a slot. A variant of another piece type is stored
    /// as Standard.
    pub fn set_piece_class(&mut self, piece_type: PieceType, file: u8, variant: Variant) {
        let variant = if variant.is_valid_for(piece_type) {
            variant
        } else {
            warn!("{} is not a {} variant, using Standard", variant, piece_type);
            Variant::Standard
        };
        self.classes.insert((piece_type, file), variant);
    }

    /// Variant for a slot, Standard when unassigned
    pub fn piece_class(&self, piece_type: PieceType, file: u8) -> Variant {
        self.classes
            .get(&(piece_type, file))
            .copied()
            .unwrap_or(Variant::Standard)
    }

    /// Build an unplaced piece for a slot
    pub fn create(&self, piece_type: PieceType, file: u8) -> Piece {
        Piece::new(self.color, piece_type, self.piece_class(piece_type, file))
    }

    /// Assignments in (type, file) order
    pub fn composition(&self) -> Vec<PieceAssignment> {
        self.classes
            .iter()
            .map(|(&(piece_type, file), &variant)| PieceAssignment {
                piece_type,
                file,
                variant,
            })
            .collect()
    }

    /// Replace the whole composition. Slots not listed read as Standard.
    pub fn load_composition(&mut self, composition: &[PieceAssignment]) {
        self.classes.clear();
        for assignment in composition {
            self.set_piece_class(assignment.piece_type, assignment.file, assignment.variant);
        }
    }

    pub fn serialize(&self) -> String {
        let wire: Vec<WireAssignment> = self
            .composition()
            .into_iter()
            .map(|a| WireAssignment {
                piece_type: a.piece_type.name().to_string(),
                file: a.file as i64,
                variant: a.variant.name().to_string(),
            })
            .collect();
        // A list of plain string/integer records always serializes
        serde_json::to_string(&wire).unwrap_or_else(|_| "[]".to_string())
    }

    /// Parse an exchanged composition. Malformed JSON is an error; entries
    /// with an unknown type or a file outside 0..8 are skipped, and unknown
    /// variant names become Standard.
    pub fn deserialize(json: &str, color: Color) -> Result<Army> {
        let wire: Vec<WireAssignment> =
            serde_json::from_str(json).map_err(ChessError::InvalidArmy)?;
        let mut composition = Vec::with_capacity(wire.len());
        for entry in wire {
            let Some(piece_type) = PieceType::ALL
                .into_iter()
                .find(|t| t.name() == entry.piece_type)
            else {
                debug!("Skipping unknown piece type {:?}", entry.piece_type);
                continue;
            };
            if !(0..8).contains(&entry.file) {
                debug!("Skipping {} on file {}", piece_type, entry.file);
                continue;
            }
            let variant = Variant::from_name(piece_type, &entry.variant).unwrap_or_else(|| {
                warn!("Unknown {} variant {:?}, using Standard", piece_type, entry.variant);
                Variant::Standard
            });
            composition.push(PieceAssignment {
                piece_type,
                file: entry.file as u8,
                variant,
            });
        }

        let mut army = Army::new(color);
        army.load_composition(&composition);
        Ok(army)
    }
}
