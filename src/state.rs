//! AbilityChess - Piece State Manager
//!
//! Side table of transient per-piece state, indexed by `PieceId`. It records
//! each piece's `AbilitySet` at registration and dispatches ability hooks on
//! move and turn events. Dispatch runs in registration order, which mirrors
//! placement order and is therefore deterministic for a given setup.

use crate::abilities::{AbilitySet, PassiveAbility};
use crate::board::BoardView;
use crate::grid::Grid;
use crate::piece::{Piece, PieceId};
use crate::types::{Color, MoveKind, Square};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Freeze lasting until the source moves away or the target leaves its side
pub const FREEZE_UNTIL_SOURCE_MOVES: i32 = -1;

/// Value stored in a piece's custom state bag
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PieceState {
    pub is_frozen: bool,
    /// Back-reference to the freezing piece; never owns it
    pub frozen_by: Option<PieceId>,
    /// -1 until the source moves away, 0 expired, >0 turns remaining
    pub frozen_duration: i32,
    pub moves_this_turn: u32,
    pub pending_auto_capture: bool,
    pub custom: BTreeMap<String, StateValue>,
}

impl PieceState {
    pub fn clear_frozen_state(&mut self) {
        self.is_frozen = false;
        self.frozen_by = None;
        self.frozen_duration = 0;
    }
}

#[derive(Clone, Debug)]
struct Entry {
    state: PieceState,
    abilities: AbilitySet,
    registered: bool,
}

impl Entry {
    fn new() -> Self {
        Entry {
            state: PieceState::default(),
            abilities: AbilitySet::none(),
            registered: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PieceStateManager {
    entries: Vec<Option<Entry>>,
    /// Registered handles in registration order
    order: Vec<PieceId>,
    last_moved: [Option<PieceId>; 2],
}

impl PieceStateManager {
    pub fn new() -> Self {
        PieceStateManager::default()
    }

    /// Create the entry if absent and record the piece's abilities for dispatch
    pub fn register(&mut self, id: PieceId, piece: &Piece) {
        let entry = self.entry_mut(id);
        debug_assert!(!entry.registered, "piece {} registered twice", id);
        if entry.registered {
            return;
        }
        entry.abilities = piece.abilities;
        entry.registered = true;
        self.order.push(id);
        if !piece.abilities.is_empty() {
            debug!(
                "Registered {} {} with abilities {:?}",
                piece.label(),
                id,
                piece.abilities
            );
        }
    }

    /// Clear every freeze this piece causes, then drop its entry
    pub fn unregister(&mut self, id: PieceId) {
        for target in self.frozen_by(id) {
            self.unfreeze(target);
        }
        if let Some(slot) = self.entries.get_mut(id.index()) {
            *slot = None;
        }
        self.order.retain(|&other| other != id);
        for last in self.last_moved.iter_mut() {
            if *last == Some(id) {
                *last = None;
            }
        }
    }

    pub fn is_registered(&self, id: PieceId) -> bool {
        self.entry(id).map_or(false, |entry| entry.registered)
    }

    /// Registered handles in dispatch order
    pub fn registered(&self) -> &[PieceId] {
        &self.order
    }

    fn entry(&self, id: PieceId) -> Option<&Entry> {
        self.entries.get(id.index()).and_then(Option::as_ref)
    }

    fn entry_mut(&mut self, id: PieceId) -> &mut Entry {
        let index = id.index();
        if self.entries.len() <= index {
            self.entries.resize_with(index + 1, || None);
        }
        self.entries[index].get_or_insert_with(Entry::new)
    }

    /// State of a piece, if an entry exists
    pub fn state(&self, id: PieceId) -> Option<&PieceState> {
        self.entry(id).map(|entry| &entry.state)
    }

    /// State of a piece, creating a default entry on first access
    pub fn state_mut(&mut self, id: PieceId) -> &mut PieceState {
        &mut self.entry_mut(id).state
    }

    fn abilities_of(&self, id: PieceId, piece: &Piece) -> AbilitySet {
        match self.entry(id) {
            Some(entry) if entry.registered => entry.abilities,
            _ => piece.abilities,
        }
    }

    pub fn can_move(&self, id: PieceId) -> bool {
        !self.state(id).map_or(false, |state| state.is_frozen)
    }

    pub fn freeze(&mut self, target: PieceId, source: PieceId, duration: i32) {
        let state = self.state_mut(target);
        state.is_frozen = true;
        state.frozen_by = Some(source);
        state.frozen_duration = duration;
        info!("Piece {} frozen by {} (duration {})", target, source, duration);
    }

    pub fn unfreeze(&mut self, target: PieceId) {
        if let Some(entry) = self.entries.get_mut(target.index()).and_then(Option::as_mut) {
            if entry.state.is_frozen {
                entry.state.clear_frozen_state();
                info!("Piece {} unfrozen", target);
            }
        }
    }

    /// Pieces currently frozen by `source`
    pub fn frozen_by(&self, source: PieceId) -> Vec<PieceId> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let entry = slot.as_ref()?;
                (entry.state.is_frozen && entry.state.frozen_by == Some(source))
                    .then_some(PieceId(index as u32))
            })
            .collect()
    }

    pub fn last_moved(&self, color: Color) -> Option<PieceId> {
        self.last_moved[color.index()]
    }

    pub fn custom(&self, id: PieceId, key: &str) -> Option<&StateValue> {
        self.state(id).and_then(|state| state.custom.get(key))
    }

    pub fn set_custom(&mut self, id: PieceId, key: &str, value: StateValue) {
        self.state_mut(id).custom.insert(key.to_string(), value);
    }

    /// Central move hook, called once per committed grid move
    pub fn on_piece_moved(
        &mut self,
        id: PieceId,
        from: Square,
        to: Square,
        kind: MoveKind,
        grid: &Grid,
    ) {
        let Some(piece) = grid.piece(id).copied() else {
            debug_assert!(false, "moved piece {} is not on the grid", id);
            return;
        };
        let abilities = self.abilities_of(id, &piece);

        self.last_moved[piece.color.index()] = Some(id);
        let state = self.state_mut(id);
        state.moves_this_turn += 1;
        let count = state.moves_this_turn;

        if let Some(multi) = abilities.multi_move {
            multi.on_move_completed(id, count, from, to, grid);
            if multi.should_shatter(&piece, grid) {
                if multi.can_end_turn(count) {
                    info!("{} at {} shatters after its final move", piece.label(), to);
                    self.state_mut(id).pending_auto_capture = true;
                } else {
                    debug!("{} exposed at {} with moves remaining", piece.label(), to);
                }
            }
        }

        for (owner, passive) in self.passive_abilities() {
            passive.on_piece_moved(owner, id, from, to, grid, self);
        }
        if let Some(passive) = abilities.passive {
            passive.on_self_moved(id, from, to, kind, grid, self);
        }

        for target in self.frozen_by(id) {
            let still_adjacent = grid
                .piece(target)
                .map_or(false, |frozen| frozen.position.is_adjacent(to));
            if !still_adjacent {
                self.unfreeze(target);
            }
        }
    }

    /// Reset the active side's counters, tick freeze durations, then fire
    /// turn-start hooks
    pub fn on_turn_start(&mut self, color: Color, grid: &Grid) {
        for (id, _) in grid.pieces_of(color) {
            let state = self.state_mut(id);
            state.moves_this_turn = 0;
            state.pending_auto_capture = false;
        }

        for entry in self.entries.iter_mut().flatten() {
            let state = &mut entry.state;
            if state.is_frozen && state.frozen_duration > 0 {
                state.frozen_duration -= 1;
                if state.frozen_duration == 0 {
                    state.clear_frozen_state();
                }
            }
        }

        for (owner, passive) in self.passive_abilities() {
            passive.on_turn_start(owner, color, grid, self);
        }
    }

    fn passive_abilities(&self) -> Vec<(PieceId, &'static dyn PassiveAbility)> {
        self.order
            .iter()
            .filter_map(|&id| {
                let entry = self.entry(id)?;
                entry.abilities.passive.map(|passive| (id, passive))
            })
            .collect()
    }

    /// True while a multi-move piece still owes moves this turn
    pub fn needs_another_move(&self, id: PieceId) -> bool {
        let Some(entry) = self.entry(id) else {
            return false;
        };
        match entry.abilities.multi_move {
            Some(multi) => !multi.can_end_turn(entry.state.moves_this_turn),
            None => false,
        }
    }

    /// Moves-per-turn requirement of a piece, if it has one
    pub fn moves_per_turn(&self, id: PieceId) -> Option<u32> {
        self.entry(id)
            .and_then(|entry| entry.abilities.multi_move)
            .map(|multi| multi.moves_per_turn())
    }

    /// Base moves threaded through the piece's movement modifier
    pub fn movement_moves(
        &self,
        id: PieceId,
        piece: &Piece,
        view: &BoardView<'_>,
        base_moves: Vec<Square>,
    ) -> Vec<Square> {
        match self.abilities_of(id, piece).movement {
            Some(modifier) => modifier.modify_movement(id, piece, view, base_moves),
            None => base_moves,
        }
    }

    /// Bonus capture squares from the piece's capture modifier
    pub fn additional_captures(
        &self,
        id: PieceId,
        piece: &Piece,
        view: &BoardView<'_>,
    ) -> Vec<Square> {
        match self.abilities_of(id, piece).capture {
            Some(modifier) => modifier.additional_captures(id, piece, view),
            None => Vec::new(),
        }
    }

    /// Whether the capture modifier accepts a capture on `target`. Pieces
    /// without one accept nothing beyond normal movement.
    pub fn can_capture(
        &self,
        id: PieceId,
        piece: &Piece,
        target: Square,
        view: &BoardView<'_>,
    ) -> bool {
        self.abilities_of(id, piece)
            .capture
            .map_or(false, |modifier| modifier.can_capture(id, piece, target, view))
    }

    /// Movement and capture modifiers applied, freeze ignored. Used for
    /// attack detection, where frozen pieces still threaten.
    pub fn apply_modifiers(
        &self,
        id: PieceId,
        piece: &Piece,
        view: &BoardView<'_>,
        base_moves: Vec<Square>,
    ) -> Vec<Square> {
        let mut moves = self.movement_moves(id, piece, view, base_moves);
        for square in self.additional_captures(id, piece, view) {
            if !moves.contains(&square) {
                moves.push(square);
            }
        }
        moves
    }

    /// Ability-modified destinations; empty while frozen
    pub fn get_modified_moves(
        &self,
        id: PieceId,
        view: &BoardView<'_>,
        base_moves: Vec<Square>,
    ) -> Vec<Square> {
        if !self.can_move(id) {
            return Vec::new();
        }
        match view.grid().piece(id) {
            Some(piece) => self.apply_modifiers(id, piece, view, base_moves),
            None => Vec::new(),
        }
    }

    /// AND over the target's defensive abilities
    pub fn can_be_captured_from(
        &self,
        target: PieceId,
        attacker: Square,
        view: &BoardView<'_>,
    ) -> bool {
        let Some(piece) = view.grid().piece(target) else {
            return true;
        };
        match self.abilities_of(target, piece).defense {
            Some(defense) => defense.can_be_captured_from(piece, attacker, view),
            None => true,
        }
    }

    /// Pieces inside `source`'s area effect
    pub fn affected_by(&self, source: PieceId, grid: &Grid) -> Vec<PieceId> {
        let Some(piece) = grid.piece(source) else {
            return Vec::new();
        };
        match self.abilities_of(source, piece).board_effect {
            Some(effect) => effect.affected_pieces(source, grid),
            None => Vec::new(),
        }
    }

    /// Pieces of `color` flagged for auto-capture
    pub fn pending_auto_captures(&self, color: Color, grid: &Grid) -> Vec<PieceId> {
        grid.pieces_of(color)
            .filter(|(id, _)| self.state(*id).map_or(false, |state| state.pending_auto_capture))
            .map(|(id, _)| id)
            .collect()
    }
}
