//! AbilityChess - Piece capability traits
//!
//! A variant opts into behaviour by implementing zero or more of the traits
//! below. The implementations are stateless statics; anything a variant needs
//! to remember between calls lives in its `PieceState` custom bag.
//!
//! `AbilitySet` is the closed set of optional trait references a piece
//! carries. It is computed once from the variant when the piece is created
//! and recorded by the state manager at registration, so dispatch never
//! tests types at query time.

use crate::board::BoardView;
use crate::grid::Grid;
use crate::piece::{Piece, PieceId};
use crate::state::PieceStateManager;
use crate::types::{Color, MoveKind, Square};
use std::fmt;

/// Identification shared by every capability
pub trait Ability: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
}

/// Rewrites or extends the candidate destination set
pub trait MovementModifier: Ability {
    fn modify_movement(
        &self,
        id: PieceId,
        piece: &Piece,
        view: &BoardView<'_>,
        moves: Vec<Square>,
    ) -> Vec<Square>;
}

/// Supplies capture targets beyond normal movement
pub trait CaptureModifier: Ability {
    fn additional_captures(
        &self,
        id: PieceId,
        piece: &Piece,
        view: &BoardView<'_>,
    ) -> Vec<Square>;

    /// Validates a capture that normal movement does not reach
    fn can_capture(
        &self,
        id: PieceId,
        piece: &Piece,
        target: Square,
        view: &BoardView<'_>,
    ) -> bool {
        self.additional_captures(id, piece, view).contains(&target)
    }
}

/// Can veto being captured
pub trait DefensiveAbility: Ability {
    fn can_be_captured_from(&self, piece: &Piece, attacker: Square, view: &BoardView<'_>) -> bool;
}

/// Reacts to game events. Hooks may mutate any piece's state.
pub trait PassiveAbility: Ability {
    /// Any piece (including the owner) completed a move
    fn on_piece_moved(
        &self,
        _owner: PieceId,
        _moved: PieceId,
        _from: Square,
        _to: Square,
        _grid: &Grid,
        _states: &mut PieceStateManager,
    ) {
    }

    fn on_turn_start(
        &self,
        _owner: PieceId,
        _turn: Color,
        _grid: &Grid,
        _states: &mut PieceStateManager,
    ) {
    }

    /// The owner itself completed a move
    fn on_self_moved(
        &self,
        _owner: PieceId,
        _from: Square,
        _to: Square,
        _kind: MoveKind,
        _grid: &Grid,
        _states: &mut PieceStateManager,
    ) {
    }
}

/// Area ability affecting other pieces
pub trait BoardEffect: Ability {
    fn affected_pieces(&self, source: PieceId, grid: &Grid) -> Vec<PieceId>;
    fn apply_effect(&self, source: PieceId, targets: &[PieceId], states: &mut PieceStateManager);
    fn remove_effect(&self, source: PieceId, targets: &[PieceId], states: &mut PieceStateManager);
}

/// Forces a number of moves by the same piece each turn
pub trait MultiMoveAbility: Ability {
    fn moves_per_turn(&self) -> u32;

    fn mandatory_moves(&self) -> bool {
        true
    }

    fn can_end_turn(&self, moves_made: u32) -> bool {
        !self.mandatory_moves() || moves_made >= self.moves_per_turn()
    }

    /// Called after each committed move with the updated count (1-based)
    fn on_move_completed(
        &self,
        _owner: PieceId,
        _move_number: u32,
        _from: Square,
        _to: Square,
        _grid: &Grid,
    ) {
    }

    /// Self-destruct condition, checked after every move
    fn should_shatter(&self, _piece: &Piece, _grid: &Grid) -> bool {
        false
    }
}

/// Optional capability slots of one piece
#[derive(Clone, Copy, Default)]
pub struct AbilitySet {
    pub movement: Option<&'static dyn MovementModifier>,
    pub capture: Option<&'static dyn CaptureModifier>,
    pub defense: Option<&'static dyn DefensiveAbility>,
    pub passive: Option<&'static dyn PassiveAbility>,
    pub board_effect: Option<&'static dyn BoardEffect>,
    pub multi_move: Option<&'static dyn MultiMoveAbility>,
}

impl AbilitySet {
    pub fn none() -> Self {
        AbilitySet::default()
    }

    pub fn count(&self) -> usize {
        [
            self.movement.is_some(),
            self.capture.is_some(),
            self.defense.is_some(),
            self.passive.is_some(),
            self.board_effect.is_some(),
            self.multi_move.is_some(),
        ]
        .iter()
        .filter(|&&slot| slot)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Distinct ability names, in slot order
    pub fn names(&self) -> Vec<&'static str> {
        let all = [
            self.movement.map(|a| a.name()),
            self.capture.map(|a| a.name()),
            self.defense.map(|a| a.name()),
            self.passive.map(|a| a.name()),
            self.board_effect.map(|a| a.name()),
            self.multi_move.map(|a| a.name()),
        ];
        let mut names = Vec::new();
        for name in all.into_iter().flatten() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

impl fmt::Debug for AbilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
