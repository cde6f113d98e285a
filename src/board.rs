//! AbilityChess - Board Representation Module
//!
//! `Board` is the authoritative game position: the grid, the piece state
//! manager, both armies and the event queue. `move_piece` is the single
//! mutation entry point for play; everything else is setup or queries.
//!
//! `BoardView` is a read-only borrow of grid + state used by abilities and
//! the validator. Check simulation clones the grid into a scratch view, so the
//! real position is never touched while a hypothetical move is evaluated.

use crate::army::{Army, BACK_RANK};
use crate::config::GameConfig;
use crate::grid::Grid;
use crate::movegen::{castling_rook_squares, MoveGenerator};
use crate::piece::{Piece, PieceId, Variant};
use crate::state::PieceStateManager;
use crate::types::*;
use crate::validator::MoveValidator;
use tracing::{debug, info};

/// Notifications for the turn, network and presentation collaborators
#[derive(Clone, Debug)]
pub enum BoardEvent {
    PieceMoved {
        piece: PieceId,
        from: Square,
        to: Square,
    },
    /// `by` is `None` when a piece is removed outside a move (e.g. shattering)
    PieceCaptured {
        captured: PieceId,
        piece: Piece,
        by: Option<PieceId>,
    },
    PromotionPending {
        piece: PieceId,
        square: Square,
    },
}

/// Read-only view over a grid and its piece states
#[derive(Clone, Copy)]
pub struct BoardView<'a> {
    grid: &'a Grid,
    states: &'a PieceStateManager,
    config: &'a GameConfig,
    teleport_seed: u64,
}

impl<'a> BoardView<'a> {
    pub fn new(
        grid: &'a Grid,
        states: &'a PieceStateManager,
        config: &'a GameConfig,
        teleport_seed: u64,
    ) -> Self {
        BoardView {
            grid,
            states,
            config,
            teleport_seed,
        }
    }

    pub fn grid(&self) -> &'a Grid {
        self.grid
    }

    pub fn states(&self) -> &'a PieceStateManager {
        self.states
    }

    pub fn config(&self) -> &'a GameConfig {
        self.config
    }

    pub fn teleport_seed(&self) -> u64 {
        self.teleport_seed
    }

    pub fn piece_at(&self, square: Square) -> Option<PieceId> {
        self.grid.piece_at(square)
    }

    pub fn piece(&self, id: PieceId) -> Option<&'a Piece> {
        self.grid.piece(id)
    }

    /// Geometric destinations. With strict castling, castling out of,
    /// through or into an attacked square is dropped.
    pub fn base_moves(&self, piece: &Piece) -> Vec<Square> {
        let mut moves = MoveGenerator::new().base_moves(self.grid, piece);
        if self.config.strict_castling && piece.piece_type == PieceType::King && !piece.has_moved {
            let color = piece.color;
            let from = piece.position;
            moves.retain(|&to| {
                if to.row != from.row || (to.file - from.file).abs() != 2 {
                    return true;
                }
                // Stand the king on each square so pawn diagonals count
                let step = (to.file - from.file).signum();
                !self.is_king_in_check(color)
                    && !self.would_leave_king_in_check(from, from.offset(step, 0), color)
                    && !self.would_leave_king_in_check(from, to, color)
            });
        }
        moves
    }

    /// Ability-modified destinations, ignoring freeze
    pub fn candidate_moves(&self, id: PieceId) -> Vec<Square> {
        match self.grid.piece(id) {
            Some(piece) => {
                let base = self.base_moves(piece);
                self.states.apply_modifiers(id, piece, self, base)
            }
            None => Vec::new(),
        }
    }

    /// Squares a piece threatens. Kings threaten their neighbours only; every
    /// other piece threatens its ability-modified candidates, frozen or not.
    pub fn attacks_of(&self, id: PieceId) -> Vec<Square> {
        match self.grid.piece(id) {
            Some(piece) if piece.piece_type == PieceType::King => {
                MoveGenerator::new().attack_moves(self.grid, piece)
            }
            Some(piece) => {
                let base = MoveGenerator::new().base_moves(self.grid, piece);
                self.states.apply_modifiers(id, piece, self, base)
            }
            None => Vec::new(),
        }
    }

    pub fn is_square_attacked(&self, square: Square, by: Color) -> bool {
        self.grid
            .pieces_of(by)
            .any(|(id, _)| self.attacks_of(id).contains(&square))
    }

    /// No king of that color reports "not in check"
    pub fn is_king_in_check(&self, color: Color) -> bool {
        match self.grid.find_king(color) {
            Some((_, king_square)) => self.is_square_attacked(king_square, color.opposite()),
            None => false,
        }
    }

    /// Play `from -> to` on a scratch copy of the grid (captured piece
    /// removed, no hooks, no events) and test `color`'s king
    pub fn would_leave_king_in_check(&self, from: Square, to: Square, color: Color) -> bool {
        let mut scratch = self.grid.clone();
        if scratch.relocate(from, to).is_none() {
            return false;
        }
        BoardView::new(&scratch, self.states, self.config, self.teleport_seed)
            .is_king_in_check(color)
    }
}

/// Chess board with abilities
pub struct Board {
    grid: Grid,
    states: PieceStateManager,
    white_army: Army,
    black_army: Army,
    config: GameConfig,
    teleport_seed: u64,
    validator: MoveValidator,
    events: Vec<BoardEvent>,
}

impl Board {
    /// Create an empty board
    pub fn new(config: GameConfig) -> Self {
        let teleport_seed = config.teleport_seed.unwrap_or_else(rand::random);
        Board {
            grid: Grid::new(),
            states: PieceStateManager::new(),
            white_army: Army::new(Color::White),
            black_army: Army::new(Color::Black),
            config,
            teleport_seed,
            validator: MoveValidator::new(),
            events: Vec::new(),
        }
    }

    /// Create a board with both armies in their starting position
    pub fn with_standard_setup(config: GameConfig) -> Self {
        let mut board = Board::new(config);
        board.setup_standard();
        board
    }

    pub fn view(&self) -> BoardView<'_> {
        BoardView::new(&self.grid, &self.states, &self.config, self.teleport_seed)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn states(&self) -> &PieceStateManager {
        &self.states
    }

    /// Direct access for freeze/unfreeze and custom state
    pub fn states_mut(&mut self) -> &mut PieceStateManager {
        &mut self.states
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GameConfig) {
        if let Some(seed) = config.teleport_seed {
            self.teleport_seed = seed;
        }
        self.config = config;
    }

    pub fn validator(&self) -> &MoveValidator {
        &self.validator
    }

    pub fn army(&self, color: Color) -> &Army {
        match color {
            Color::White => &self.white_army,
            Color::Black => &self.black_army,
        }
    }

    /// Replace the composition used by `setup_standard`
    pub fn set_army(&mut self, army: Army) {
        match army.color() {
            Color::White => self.white_army = army,
            Color::Black => self.black_army = army,
        }
    }

    /// Place both armies: pawns first, then the back rank, white then black
    pub fn setup_standard(&mut self) {
        for color in Color::ALL {
            let army = self.army(color).clone();
            for file in 0..8 {
                let pawn = army.create(PieceType::Pawn, file);
                self.place(pawn, Square::new(file as i8, color.pawn_row()));
            }
            for (file, piece_type) in BACK_RANK.iter().enumerate() {
                let piece = army.create(*piece_type, file as u8);
                self.place(piece, Square::new(file as i8, color.home_row()));
            }
        }
    }

    /// Unconditional setup placement. Out-of-range squares are a no-op; an
    /// occupant is removed without a capture event.
    pub fn place(&mut self, piece: Piece, square: Square) -> Option<PieceId> {
        if !square.is_valid() {
            return None;
        }
        if let Some(existing) = self.grid.piece_at(square) {
            self.states.unregister(existing);
            self.grid.remove(existing);
        }
        let id = self.grid.insert(piece, square)?;
        if let Some(placed) = self.grid.piece(id).copied() {
            self.states.register(id, &placed);
            debug!("Placed {} {} at {}", placed.label(), id, square);
        }
        Some(id)
    }

    pub fn piece_at(&self, square: Square) -> Option<PieceId> {
        self.grid.piece_at(square)
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.grid.piece(id)
    }

    pub fn get(&self, square: Square) -> Option<(PieceId, &Piece)> {
        self.grid.get(square)
    }

    /// Validate and commit a move. Returns false without mutating anything
    /// when any legality clause fails.
    pub fn move_piece(&mut self, from: Square, to: Square) -> bool {
        if !self.validator.is_legal(self, from, to) {
            debug!("Rejected move {}{}", from, to);
            return false;
        }
        let Some((id, piece)) = self.grid.get(from).map(|(id, piece)| (id, *piece)) else {
            return false;
        };
        let kind = self.move_kind(&piece, to);

        // Capture
        if let Some((target_id, target)) = self.grid.get(to).map(|(tid, t)| (tid, *t)) {
            if !piece.is_enemy(&target) || !self.validator.can_capture_at(self, from, to) {
                return false;
            }
            self.states.unregister(target_id);
            self.grid.remove(target_id);
            info!("{} captured {} on {}", piece.label(), target.label(), to);
            self.events.push(BoardEvent::PieceCaptured {
                captured: target_id,
                piece: target,
                by: Some(id),
            });
        }

        self.grid.relocate(from, to);
        if let Some(moved) = self.grid.piece_mut(id) {
            moved.has_moved = true;
        }

        if kind == MoveKind::Castle {
            let (rook_from, rook_to) = castling_rook_squares(to);
            if let Some(rook_id) = self.grid.relocate(rook_from, rook_to) {
                if let Some(rook) = self.grid.piece_mut(rook_id) {
                    rook.has_moved = true;
                }
                debug!("Castled rook {} -> {}", rook_from, rook_to);
            }
        }

        self.states.on_piece_moved(id, from, to, kind, &self.grid);
        self.events.push(BoardEvent::PieceMoved { piece: id, from, to });

        if self.grid.piece(id).map_or(false, Piece::can_be_promoted) {
            self.events.push(BoardEvent::PromotionPending { piece: id, square: to });
        }

        debug_assert!(self.grid.is_consistent());
        true
    }

    /// Classify a legal destination before it is committed. Only geometric
    /// king moves castle; anything outside the geometry came from an ability.
    fn move_kind(&self, piece: &Piece, to: Square) -> MoveKind {
        if !self.view().base_moves(piece).contains(&to) {
            return MoveKind::Ability;
        }
        let from = piece.position;
        let castles = piece.piece_type == PieceType::King
            && from == Square::new(4, piece.color.home_row())
            && to.row == from.row
            && (to.file - from.file).abs() == 2;
        if castles {
            MoveKind::Castle
        } else {
            MoveKind::Standard
        }
    }

    /// Remove a piece outside of a move, e.g. a shattered piece
    pub fn remove_piece(&mut self, square: Square) -> Option<Piece> {
        let id = self.grid.piece_at(square)?;
        self.states.unregister(id);
        let piece = self.grid.remove(id)?;
        self.events.push(BoardEvent::PieceCaptured {
            captured: id,
            piece,
            by: None,
        });
        Some(piece)
    }

    /// Remove every piece of `color` flagged for auto-capture
    pub fn resolve_pending_captures(&mut self, color: Color) -> Vec<Piece> {
        let pending = self.states.pending_auto_captures(color, &self.grid);
        let mut removed = Vec::with_capacity(pending.len());
        for id in pending {
            if let Some(square) = self.grid.piece(id).map(|piece| piece.position) {
                if let Some(piece) = self.remove_piece(square) {
                    info!("{} shattered on {}", piece.label(), square);
                    removed.push(piece);
                }
            }
        }
        removed
    }

    /// Replace a pawn on its farthest row with a Standard piece. Pawn and
    /// King choices become a Queen.
    pub fn promote_pawn(&mut self, square: Square, piece_type: PieceType) -> Option<PieceId> {
        let (id, pawn) = self.grid.get(square).map(|(id, piece)| (id, *piece))?;
        if !pawn.can_be_promoted() {
            return None;
        }
        let piece_type = match piece_type {
            PieceType::Pawn | PieceType::King => PieceType::Queen,
            other => other,
        };
        self.states.unregister(id);
        self.grid.remove(id);

        let mut promoted = Piece::new(pawn.color, piece_type, Variant::Standard);
        promoted.has_moved = true;
        let new_id = self.place(promoted, square)?;
        info!("{} promoted to {} on {}", pawn.label(), piece_type, square);
        Some(new_id)
    }

    pub fn is_king_in_check(&self, color: Color) -> bool {
        self.view().is_king_in_check(color)
    }

    /// True if playing `from -> to` would leave `color`'s king in check.
    /// The board is not modified.
    pub fn simulate_move_for_check(&self, from: Square, to: Square, color: Color) -> bool {
        self.view().would_leave_king_in_check(from, to, color)
    }

    pub fn on_turn_start(&mut self, color: Color) {
        self.states.on_turn_start(color, &self.grid);
    }

    pub fn needs_another_move(&self, id: PieceId) -> bool {
        self.states.needs_another_move(id)
    }

    pub fn can_move(&self, id: PieceId) -> bool {
        self.states.can_move(id)
    }

    pub fn is_legal(&self, from: Square, to: Square) -> bool {
        self.validator.is_legal(self, from, to)
    }

    /// Display list using the configured highlight mode
    pub fn valid_moves_for_display(&self, id: PieceId) -> Vec<Square> {
        self.validator
            .valid_moves_for_display(self, id, self.config.highlight_mode)
    }

    pub fn events(&self) -> &[BoardEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    /// Display the board as a string
    pub fn display(&self) -> String {
        let mut lines = Vec::new();
        lines.push("  +---+---+---+---+---+---+---+---+".to_string());

        for row in (0..8).rev() {
            let mut line = format!("{} |", row + 1);
            for file in 0..8 {
                match self.grid.get(Square::new(file, row)) {
                    None => line.push_str("   |"),
                    Some((id, piece)) => {
                        let marker = if !self.states.can_move(id) {
                            '*'
                        } else if piece.variant != Variant::Standard {
                            '+'
                        } else {
                            ' '
                        };
                        let symbol = piece.piece_type.to_fen(piece.color);
                        line.push_str(&format!(" {}{}|", symbol, marker));
                    }
                }
            }
            lines.push(line);
            lines.push("  +---+---+---+---+---+---+---+---+".to_string());
        }
        lines.push("    a   b   c   d   e   f   g   h".to_string());
        lines.push("  (+ ability variant, * frozen)".to_string());

        lines.join("\n")
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new(GameConfig::default())
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> GameConfig {
        GameConfig {
            teleport_seed: Some(1),
            ..GameConfig::default()
        }
    }

    #[test]
    fn standard_setup_places_thirty_two_pieces() {
        let board = Board::with_standard_setup(seeded());
        assert_eq!(board.grid().piece_count(), 32);
        assert_eq!(board.states().registered().len(), 32);
        let (_, king) = board.get(Square::new(4, 7)).expect("black king");
        assert_eq!(king.piece_type, PieceType::King);
        assert_eq!(king.color, Color::Black);
        assert!(!board.is_king_in_check(Color::White));
    }

    #[test]
    fn place_out_of_range_is_noop() {
        let mut board = Board::new(seeded());
        let piece = Piece::standard(Color::White, PieceType::Rook);
        assert!(board.place(piece, Square::new(8, 0)).is_none());
        assert!(board.place(piece, Square::new(0, -1)).is_none());
        assert_eq!(board.grid().piece_count(), 0);
    }

    #[test]
    fn place_over_occupant_replaces_it() {
        let mut board = Board::new(seeded());
        let first = board
            .place(Piece::standard(Color::White, PieceType::Rook), Square::new(0, 0))
            .expect("placed");
        let second = board
            .place(Piece::standard(Color::Black, PieceType::Knight), Square::new(0, 0))
            .expect("placed");
        assert!(board.piece(first).is_none());
        assert!(!board.states().is_registered(first));
        assert_eq!(board.piece_at(Square::new(0, 0)), Some(second));
    }

    #[test]
    fn simulation_leaves_board_untouched() {
        let mut board = Board::new(seeded());
        board.place(Piece::standard(Color::White, PieceType::King), Square::new(4, 0));
        board.place(Piece::standard(Color::White, PieceType::Rook), Square::new(4, 1));
        board.place(Piece::standard(Color::Black, PieceType::Rook), Square::new(4, 7));

        assert!(board.simulate_move_for_check(Square::new(4, 1), Square::new(0, 1), Color::White));
        assert!(!board.simulate_move_for_check(Square::new(4, 1), Square::new(4, 7), Color::White));
        assert!(board.get(Square::new(4, 1)).is_some());
        assert!(board.get(Square::new(4, 7)).is_some());
        assert!(board.events().is_empty());
    }

    #[test]
    fn no_king_is_not_in_check() {
        let mut board = Board::new(seeded());
        board.place(Piece::standard(Color::Black, PieceType::Queen), Square::new(3, 3));
        assert!(!board.is_king_in_check(Color::White));
    }

    #[test]
    fn capture_emits_event_and_retires_state() {
        let mut board = Board::new(seeded());
        let rook = board
            .place(Piece::standard(Color::White, PieceType::Rook), Square::new(0, 0))
            .expect("placed");
        let knight = board
            .place(Piece::standard(Color::Black, PieceType::Knight), Square::new(0, 5))
            .expect("placed");

        assert!(board.move_piece(Square::new(0, 0), Square::new(0, 5)));
        assert!(board.piece(knight).is_none());
        assert!(board.states().state(knight).is_none());
        let events = board.drain_events();
        assert!(matches!(
            events[0],
            BoardEvent::PieceCaptured { captured, by: Some(by), .. }
                if captured == knight && by == rook
        ));
        assert!(matches!(events[1], BoardEvent::PieceMoved { piece, .. } if piece == rook));
    }

    #[test]
    fn promotion_event_and_promote() {
        let mut board = Board::new(seeded());
        let pawn = board
            .place(Piece::standard(Color::White, PieceType::Pawn), Square::new(2, 6))
            .expect("placed");
        assert!(board.move_piece(Square::new(2, 6), Square::new(2, 7)));
        assert!(board
            .events()
            .iter()
            .any(|e| matches!(e, BoardEvent::PromotionPending { piece, .. } if *piece == pawn)));

        let queen = board
            .promote_pawn(Square::new(2, 7), PieceType::King)
            .expect("promoted");
        let promoted = board.piece(queen).expect("on board");
        assert_eq!(promoted.piece_type, PieceType::Queen);
        assert!(promoted.has_moved);
        assert!(board.states().is_registered(queen));
        assert!(board.promote_pawn(Square::new(2, 7), PieceType::Rook).is_none());
    }

    #[test]
    fn remove_piece_reports_capture_without_capturer() {
        let mut board = Board::new(seeded());
        board.place(Piece::standard(Color::Black, PieceType::Bishop), Square::new(5, 5));
        let removed = board.remove_piece(Square::new(5, 5)).expect("removed");
        assert_eq!(removed.piece_type, PieceType::Bishop);
        assert!(matches!(board.events()[0], BoardEvent::PieceCaptured { by: None, .. }));
        assert!(board.remove_piece(Square::new(5, 5)).is_none());
    }
}
