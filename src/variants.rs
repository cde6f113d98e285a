//! AbilityChess - Concrete piece variants
//!
//! Each variant is a unit struct implementing the capability traits it
//! needs. `Variant::abilities` maps a variant name onto its slot set.

use crate::abilities::*;
use crate::board::BoardView;
use crate::grid::Grid;
use crate::movegen::{MoveGenerator, ROOK_DIRECTIONS};
use crate::piece::{Piece, PieceId, Variant};
use crate::state::{PieceStateManager, StateValue, FREEZE_UNTIL_SOURCE_MOVES};
use crate::types::{Color, MoveKind, Square};
use rand::prelude::*;
use tracing::{debug, info};

static RANGER_PAWN: RangerPawn = RangerPawn;
static GUARD_PAWN: GuardPawn = GuardPawn;
static CHARGE_KNIGHT: ChargeKnight = ChargeKnight;
static FREEZING_BISHOP: FreezingBishop = FreezingBishop;
static BOMBING_ROOK: BombingRook = BombingRook;
static GLASS_QUEEN: GlassQueen = GlassQueen;
static RESURRECTING_KING: ResurrectingKing = ResurrectingKing;

impl Variant {
    /// Capability slots carried by pieces of this variant
    pub fn abilities(self) -> AbilitySet {
        match self {
            Variant::Standard => AbilitySet::none(),
            Variant::Ranger => AbilitySet {
                movement: Some(&RANGER_PAWN),
                ..AbilitySet::none()
            },
            Variant::Guard => AbilitySet {
                defense: Some(&GUARD_PAWN),
                ..AbilitySet::none()
            },
            Variant::Charge => AbilitySet {
                movement: Some(&CHARGE_KNIGHT),
                ..AbilitySet::none()
            },
            Variant::Freezing => AbilitySet {
                passive: Some(&FREEZING_BISHOP),
                board_effect: Some(&FREEZING_BISHOP),
                ..AbilitySet::none()
            },
            Variant::Bombing => AbilitySet {
                capture: Some(&BOMBING_ROOK),
                ..AbilitySet::none()
            },
            Variant::Glass => AbilitySet {
                multi_move: Some(&GLASS_QUEEN),
                ..AbilitySet::none()
            },
            Variant::Resurrecting => AbilitySet {
                movement: Some(&RESURRECTING_KING),
                passive: Some(&RESURRECTING_KING),
                ..AbilitySet::none()
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Pawns
// ---------------------------------------------------------------------------

/// Always double-steps; captures diagonally forward and backward
pub struct RangerPawn;

impl Ability for RangerPawn {
    fn name(&self) -> &'static str {
        "Ranger Stride"
    }

    fn description(&self) -> &'static str {
        "Can move 2 squares forward at any time and capture backwards"
    }
}

impl MovementModifier for RangerPawn {
    fn modify_movement(
        &self,
        _id: PieceId,
        piece: &Piece,
        view: &BoardView<'_>,
        _moves: Vec<Square>,
    ) -> Vec<Square> {
        let grid = view.grid();
        let forward = piece.color.forward();
        let from = piece.position;
        let mut moves = Vec::with_capacity(6);

        let one_step = from.offset(0, forward);
        if grid.is_empty(one_step) {
            moves.push(one_step);
            let two_step = from.offset(0, 2 * forward);
            if grid.is_empty(two_step) {
                moves.push(two_step);
            }
        }

        for dr in [forward, -forward] {
            for df in [-1, 1] {
                let target = from.offset(df, dr);
                if grid.is_enemy(target, piece.color) {
                    moves.push(target);
                }
            }
        }
        moves
    }
}

/// Immune to captures along its own file or row
pub struct GuardPawn;

impl Ability for GuardPawn {
    fn name(&self) -> &'static str {
        "Shield Wall"
    }

    fn description(&self) -> &'static str {
        "Cannot be captured horizontally or vertically"
    }
}

impl DefensiveAbility for GuardPawn {
    fn can_be_captured_from(&self, piece: &Piece, attacker: Square, _view: &BoardView<'_>) -> bool {
        attacker.file != piece.position.file && attacker.row != piece.position.row
    }
}

// ---------------------------------------------------------------------------
// Knights
// ---------------------------------------------------------------------------

const CHARGE_OFFSETS: [(i8, i8); 8] = [
    (3, 1), (3, -1), (-3, 1), (-3, -1), (1, 3), (1, -3), (-1, 3), (-1, -3),
];

/// Opens with an extended (3,1) leap
pub struct ChargeKnight;

impl Ability for ChargeKnight {
    fn name(&self) -> &'static str {
        "Charge"
    }

    fn description(&self) -> &'static str {
        "Before its first move, may also leap three squares and one to the side"
    }
}

impl MovementModifier for ChargeKnight {
    fn modify_movement(
        &self,
        _id: PieceId,
        piece: &Piece,
        view: &BoardView<'_>,
        mut moves: Vec<Square>,
    ) -> Vec<Square> {
        if !piece.has_moved {
            MoveGenerator::new().generate_step_moves(
                view.grid(),
                piece,
                &CHARGE_OFFSETS,
                &mut moves,
            );
        }
        moves
    }
}

// ---------------------------------------------------------------------------
// Bishops
// ---------------------------------------------------------------------------

/// Freezes enemies that land next to it until it moves away
pub struct FreezingBishop;

impl Ability for FreezingBishop {
    fn name(&self) -> &'static str {
        "Frost Aura"
    }

    fn description(&self) -> &'static str {
        "Freezes enemy pieces that land adjacent to this bishop until it moves"
    }
}

impl PassiveAbility for FreezingBishop {
    fn on_piece_moved(
        &self,
        owner: PieceId,
        moved: PieceId,
        _from: Square,
        to: Square,
        grid: &Grid,
        states: &mut PieceStateManager,
    ) {
        if moved == owner {
            return;
        }
        let (Some(bishop), Some(mover)) = (grid.piece(owner), grid.piece(moved)) else {
            return;
        };
        if bishop.is_enemy(mover) && bishop.position.is_adjacent(to) {
            debug!("Frost aura at {} catches {} on {}", bishop.position, mover.label(), to);
            self.apply_effect(owner, &[moved], states);
        }
    }

    fn on_self_moved(
        &self,
        owner: PieceId,
        _from: Square,
        to: Square,
        _kind: MoveKind,
        grid: &Grid,
        states: &mut PieceStateManager,
    ) {
        let released: Vec<PieceId> = states
            .frozen_by(owner)
            .into_iter()
            .filter(|&target| grid.piece(target).map_or(true, |p| !p.position.is_adjacent(to)))
            .collect();
        self.remove_effect(owner, &released, states);
    }
}

impl BoardEffect for FreezingBishop {
    fn affected_pieces(&self, source: PieceId, grid: &Grid) -> Vec<PieceId> {
        let Some(bishop) = grid.piece(source) else {
            return Vec::new();
        };
        let mut affected = Vec::new();
        for df in -1..=1 {
            for dr in -1..=1 {
                if df == 0 && dr == 0 {
                    continue;
                }
                if let Some((id, piece)) = grid.get(bishop.position.offset(df, dr)) {
                    if bishop.is_enemy(piece) {
                        affected.push(id);
                    }
                }
            }
        }
        affected
    }

    fn apply_effect(&self, source: PieceId, targets: &[PieceId], states: &mut PieceStateManager) {
        for &target in targets {
            states.freeze(target, source, FREEZE_UNTIL_SOURCE_MOVES);
        }
    }

    fn remove_effect(&self, _source: PieceId, targets: &[PieceId], states: &mut PieceStateManager) {
        for &target in targets {
            states.unfreeze(target);
        }
    }
}

// ---------------------------------------------------------------------------
// Rooks
// ---------------------------------------------------------------------------

/// Bombs the enemy one square past the first piece on each file/row ray
pub struct BombingRook;

impl Ability for BombingRook {
    fn name(&self) -> &'static str {
        "Artillery Strike"
    }

    fn description(&self) -> &'static str {
        "Can capture enemies one square beyond normal range by throwing bombs over pieces"
    }
}

impl CaptureModifier for BombingRook {
    fn additional_captures(
        &self,
        _id: PieceId,
        piece: &Piece,
        view: &BoardView<'_>,
    ) -> Vec<Square> {
        let grid = view.grid();
        let mut captures = Vec::new();
        for &(df, dr) in &ROOK_DIRECTIONS {
            let mut current = piece.position.offset(df, dr);
            while grid.is_empty(current) {
                current = current.offset(df, dr);
            }
            // `current` is now the first blocker, or off the board
            if !current.is_valid() {
                continue;
            }
            let bomb = current.offset(df, dr);
            if grid.is_enemy(bomb, piece.color) {
                debug!("Bombing rook on {} can bomb {}", piece.position, bomb);
                captures.push(bomb);
            }
        }
        captures
    }
}

// ---------------------------------------------------------------------------
// Queens
// ---------------------------------------------------------------------------

/// Moves twice per turn; shatters if an enemy sees it along its row
pub struct GlassQueen;

impl GlassQueen {
    /// Clear line of sight to an enemy along the row, friendly pieces block
    pub fn is_exposed(&self, position: Square, color: Color, grid: &Grid) -> bool {
        [-1, 1].into_iter().any(|df| {
            let mut current = position.offset(df, 0);
            while grid.is_empty(current) {
                current = current.offset(df, 0);
            }
            grid.is_enemy(current, color)
        })
    }
}

impl Ability for GlassQueen {
    fn name(&self) -> &'static str {
        "Glass Cannon"
    }

    fn description(&self) -> &'static str {
        "Must move twice per turn but shatters if exposed to horizontal threats"
    }
}

impl MultiMoveAbility for GlassQueen {
    fn moves_per_turn(&self) -> u32 {
        2
    }

    fn on_move_completed(
        &self,
        _owner: PieceId,
        move_number: u32,
        from: Square,
        to: Square,
        _grid: &Grid,
    ) {
        debug!(
            "Glass queen completed move {} of {} ({}{})",
            move_number,
            self.moves_per_turn(),
            from,
            to
        );
    }

    fn should_shatter(&self, piece: &Piece, grid: &Grid) -> bool {
        self.is_exposed(piece.position, piece.color, grid)
    }
}

// ---------------------------------------------------------------------------
// Kings
// ---------------------------------------------------------------------------

/// Custom-state key set once the king has teleported
pub const RESURRECTED_KEY: &str = "resurrected";

/// Once per game, escapes checkmate by teleporting to a safe square
pub struct ResurrectingKing;

impl ResurrectingKing {
    pub fn has_resurrected(&self, id: PieceId, states: &PieceStateManager) -> bool {
        matches!(states.custom(id, RESURRECTED_KEY), Some(StateValue::Bool(true)))
    }

    /// Empty squares anywhere on the board where the king would not be
    /// attacked
    fn safe_squares(&self, piece: &Piece, view: &BoardView<'_>) -> Vec<Square> {
        Square::all()
            .filter(|&square| {
                view.grid().is_empty(square)
                    && !view.would_leave_king_in_check(piece.position, square, piece.color)
            })
            .collect()
    }

    /// Whether any normal king move passes every legality clause: an
    /// occupied target must allow capture and the king must end up safe
    fn has_escape(&self, piece: &Piece, view: &BoardView<'_>, moves: &[Square]) -> bool {
        moves.iter().any(|&to| {
            let capturable = match view.grid().get(to) {
                None => true,
                Some((target_id, target)) => {
                    piece.is_enemy(target)
                        && view.states().can_be_captured_from(target_id, piece.position, view)
                }
            };
            capturable && !view.would_leave_king_in_check(piece.position, to, piece.color)
        })
    }
}

impl Ability for ResurrectingKing {
    fn name(&self) -> &'static str {
        "Phoenix Revival"
    }

    fn description(&self) -> &'static str {
        "Once per game, when about to be checkmated, teleports to a random safe square"
    }
}

impl MovementModifier for ResurrectingKing {
    fn modify_movement(
        &self,
        id: PieceId,
        piece: &Piece,
        view: &BoardView<'_>,
        mut moves: Vec<Square>,
    ) -> Vec<Square> {
        if self.has_resurrected(id, view.states()) || !view.is_king_in_check(piece.color) {
            return moves;
        }
        if self.has_escape(piece, view, &moves) {
            return moves;
        }

        let safe = self.safe_squares(piece, view);
        let salt = ((id.0 as u64) << 32) | piece.position.index().unwrap_or(0) as u64;
        let mut rng = StdRng::seed_from_u64(view.teleport_seed() ^ salt);
        match safe.choose(&mut rng) {
            Some(&square) => {
                debug!(
                    "Resurrecting king offers teleport to {} ({} safe squares)",
                    square,
                    safe.len()
                );
                moves.push(square);
            }
            None => debug!("No safe resurrection squares, true checkmate"),
        }
        moves
    }
}

impl PassiveAbility for ResurrectingKing {
    fn on_self_moved(
        &self,
        owner: PieceId,
        from: Square,
        to: Square,
        kind: MoveKind,
        _grid: &Grid,
        states: &mut PieceStateManager,
    ) {
        // The teleport is the only destination this king adds to its geometry
        if kind == MoveKind::Ability {
            states.set_custom(owner, RESURRECTED_KEY, StateValue::Bool(true));
            info!("Resurrecting king used Phoenix Revival: {} -> {}", from, to);
        }
    }
}
