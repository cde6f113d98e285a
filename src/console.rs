//! AbilityChess - Console Protocol Module
//!
//! Line-oriented text protocol driving a two-player game. The console is the
//! turn keeper: it starts turns, enforces the side to move, keeps a
//! multi-move piece on the move, holds the turn for a pending promotion and
//! removes shattered pieces before handing the turn over.
//!
//! Commands:
//!   newgame | army <white|black> <json> | setoption name <N> value <V>
//!   move <from><to> | moves <sq> | promote <sq> <q|r|b|n>
//!   status | snapshot | d | quit

use crate::army::Army;
use crate::board::{Board, BoardEvent};
use crate::config::{GameConfig, HighlightMode};
use crate::error::{ChessError, Result};
use crate::piece::PieceId;
use crate::status::{self, GameStatus};
use crate::types::*;
use std::io::{self, BufRead, Write};
use tracing::{debug, warn};

const CONSOLE_NAME: &str = "AbilityChess";
const CONSOLE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Console protocol handler writing replies to `W`
pub struct Console<W: Write> {
    board: Board,
    config: GameConfig,
    side_to_move: Color,
    /// Multi-move piece that owes another move this turn
    active_piece: Option<PieceId>,
    pending_promotion: Option<Square>,
    running: bool,
    out: W,
}

impl Console<io::Stdout> {
    pub fn stdout(config: GameConfig) -> Self {
        Console::new(config, io::stdout())
    }
}

impl<W: Write> Console<W> {
    pub fn new(config: GameConfig, out: W) -> Self {
        let mut console = Console {
            board: Board::new(config.clone()),
            config,
            side_to_move: Color::White,
            active_piece: None,
            pending_promotion: None,
            running: true,
            out,
        };
        console.cmd_newgame();
        console
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Consume the console and return its writer
    pub fn into_output(self) -> W {
        self.out
    }

    pub fn run<R: BufRead>(&mut self, input: R) {
        self.send(&format!("{} {}", CONSOLE_NAME, CONSOLE_VERSION));
        for line in input.lines() {
            match line {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        self.process_command(line);
                    }
                }
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    break;
                }
            }
            if !self.running {
                break;
            }
        }
    }

    pub fn process_command(&mut self, line: &str) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = parts.split_first() else {
            return;
        };

        let result = match command {
            "newgame" => {
                self.cmd_newgame();
                Ok(())
            }
            "army" => self.cmd_army(args),
            "setoption" => self.cmd_setoption(args),
            "move" => self.cmd_move(args),
            "moves" => self.cmd_moves(args),
            "promote" => self.cmd_promote(args),
            "status" => {
                self.cmd_status();
                Ok(())
            }
            "snapshot" => {
                let json = self.board.snapshot().to_json();
                self.send(&json);
                Ok(())
            }
            "d" => {
                self.cmd_display();
                Ok(())
            }
            "quit" => {
                self.running = false;
                Ok(())
            }
            other => Err(ChessError::InvalidCommand(format!("unknown command {}", other))),
        };

        if let Err(e) = result {
            self.send(&format!("error {}", e));
        }
    }

    fn send(&mut self, message: &str) {
        writeln!(self.out, "{}", message).ok();
        self.out.flush().ok();
    }

    fn cmd_newgame(&mut self) {
        let white = self.board.army(Color::White).clone();
        let black = self.board.army(Color::Black).clone();
        self.board = Board::new(self.config.clone());
        self.board.set_army(white);
        self.board.set_army(black);
        self.board.setup_standard();
        self.board.drain_events();

        self.side_to_move = Color::White;
        self.active_piece = None;
        self.pending_promotion = None;
        self.board.on_turn_start(Color::White);
        debug!("New game started");
    }

    /// Store a composition; it applies from the next `newgame`
    fn cmd_army(&mut self, args: &[&str]) -> Result<()> {
        let (color, json) = match args.split_first() {
            Some((name, rest)) if !rest.is_empty() => {
                let color = Color::parse(name)
                    .ok_or_else(|| ChessError::InvalidCommand(format!("unknown color {}", name)))?;
                (color, rest.join(" "))
            }
            _ => return Err(ChessError::InvalidCommand("usage: army <white|black> <json>".into())),
        };
        let army = Army::deserialize(&json, color)?;
        self.board.set_army(army);
        self.send(&format!("ok army {}", color));
        Ok(())
    }

    fn cmd_setoption(&mut self, args: &[&str]) -> Result<()> {
        if args.len() < 2 || args[0] != "name" {
            return Err(ChessError::InvalidCommand("usage: setoption name <N> value <V>".into()));
        }

        // Parse option name and value
        let mut name_parts = Vec::new();
        let mut value = None;
        let mut i = 1;
        while i < args.len() {
            if args[i] == "value" {
                value = args.get(i + 1..).map(|rest| rest.join(" "));
                break;
            }
            name_parts.push(args[i]);
            i += 1;
        }
        let name = name_parts.join(" ");
        let value =
            value.ok_or_else(|| ChessError::InvalidCommand(format!("no value for {}", name)))?;
        let invalid = || ChessError::InvalidCommand(format!("bad value {} for {}", value, name));

        let mut config = self.config.clone();
        match name.as_str() {
            "HighlightMode" => {
                config.highlight_mode = HighlightMode::parse(&value).ok_or_else(invalid)?
            }
            "StrictCastling" => config.strict_castling = parse_bool(&value).ok_or_else(invalid)?,
            "FlipBoardForBlack" => {
                config.flip_board_for_black = parse_bool(&value).ok_or_else(invalid)?
            }
            "PlayerColor" => config.player_color = Color::parse(&value).ok_or_else(invalid)?,
            "TeleportSeed" => config.teleport_seed = Some(value.parse().map_err(|_| invalid())?),
            _ => return Err(ChessError::InvalidCommand(format!("unknown option {}", name))),
        }
        self.board.set_config(config.clone());
        self.config = config;
        self.send(&format!("ok {} {}", name, value));
        Ok(())
    }

    fn cmd_move(&mut self, args: &[&str]) -> Result<()> {
        let text = args
            .first()
            .ok_or_else(|| ChessError::InvalidCommand("usage: move <from><to>".into()))?;
        let (from, to) =
            parse_move(text).ok_or_else(|| ChessError::InvalidSquare(text.to_string()))?;

        if let Some(square) = self.pending_promotion {
            self.send(&format!("illegal promotion pending on {}", square));
            return Ok(());
        }
        let Some((id, piece)) = self.board.get(from).map(|(id, piece)| (id, *piece)) else {
            self.send(&format!("illegal no piece on {}", from));
            return Ok(());
        };
        if piece.color != self.side_to_move {
            self.send(&format!("illegal {} to move", self.side_to_move));
            return Ok(());
        }
        if let Some(active) = self.active_piece {
            if active != id {
                self.send(&format!("illegal {} must move again", self.describe(active)));
                return Ok(());
            }
        }
        if !self.board.move_piece(from, to) {
            self.send(&format!("illegal {}{}", from, to));
            return Ok(());
        }

        self.send(&format!("ok {}{}", from, to));
        self.report_events();

        if self.pending_promotion.is_some() {
            return Ok(());
        }
        if self.board.needs_another_move(id) {
            let can_continue = !self
                .board
                .validator()
                .valid_moves_for_display(&self.board, id, HighlightMode::Strict)
                .is_empty();
            if can_continue {
                self.active_piece = Some(id);
                self.send(&format!("info {} must move again", self.describe(id)));
                return Ok(());
            }
            debug!("{} owes a move but has none, ending turn", self.describe(id));
        }
        self.end_turn();
        Ok(())
    }

    fn cmd_moves(&mut self, args: &[&str]) -> Result<()> {
        let name = args
            .first()
            .ok_or_else(|| ChessError::InvalidCommand("usage: moves <square>".into()))?;
        let square =
            Square::parse(name).ok_or_else(|| ChessError::InvalidSquare(name.to_string()))?;
        let moves = match self.board.piece_at(square) {
            Some(id) => self.board.valid_moves_for_display(id),
            None => Vec::new(),
        };
        let list: Vec<String> = moves.iter().map(|square| square.name()).collect();
        self.send(&format!("moves {}: {}", square, list.join(" ")));
        Ok(())
    }

    fn cmd_promote(&mut self, args: &[&str]) -> Result<()> {
        let usage = || ChessError::InvalidCommand("usage: promote <square> <q|r|b|n>".into());
        let (name, letter) = match args {
            [name, letter, ..] => (*name, *letter),
            _ => return Err(usage()),
        };
        let square =
            Square::parse(name).ok_or_else(|| ChessError::InvalidSquare(name.to_string()))?;
        let piece_type = letter
            .chars()
            .next()
            .and_then(PieceType::from_char)
            .ok_or_else(usage)?;

        if self.pending_promotion != Some(square) {
            self.send(&format!("illegal no promotion pending on {}", square));
            return Ok(());
        }
        match self.board.promote_pawn(square, piece_type) {
            Some(id) => {
                self.pending_promotion = None;
                self.send(&format!("ok promoted {}", self.describe(id)));
                self.end_turn();
            }
            None => self.send(&format!("illegal cannot promote on {}", square)),
        }
        Ok(())
    }

    fn cmd_status(&mut self) {
        let status = status::evaluate(&self.board, self.side_to_move);
        self.send(&format!("status {} {}", self.side_to_move, status));
    }

    fn cmd_display(&mut self) {
        let display = self.board.display();
        self.send(&display);
        self.send(&format!("Side to move: {}", self.side_to_move));
        if let Some(active) = self.active_piece {
            self.send(&format!("Active piece: {}", self.describe(active)));
        }
    }

    fn report_events(&mut self) {
        for event in self.board.drain_events() {
            match event {
                BoardEvent::PieceCaptured { piece, .. } => {
                    self.send(&format!("info captured {} on {}", piece.label(), piece.position));
                }
                BoardEvent::PromotionPending { square, .. } => {
                    self.pending_promotion = Some(square);
                    self.send(&format!("info promote {}", square));
                }
                BoardEvent::PieceMoved { .. } => {}
            }
        }
    }

    /// Shatter pending pieces, pass the turn, and report the new status
    fn end_turn(&mut self) {
        for piece in self.board.resolve_pending_captures(self.side_to_move) {
            self.send(&format!("info shattered {} on {}", piece.label(), piece.position));
        }
        self.board.drain_events();

        self.side_to_move = self.side_to_move.opposite();
        self.active_piece = None;
        self.board.on_turn_start(self.side_to_move);

        let status = status::evaluate(&self.board, self.side_to_move);
        if status != GameStatus::Playing {
            self.send(&format!("status {} {}", self.side_to_move, status));
        }
    }

    fn describe(&self, id: PieceId) -> String {
        match self.board.piece(id) {
            Some(piece) => format!("{} on {}", piece.label(), piece.position),
            None => id.to_string(),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "1" => Some(true),
        "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console() -> Console<Vec<u8>> {
        Console::new(
            GameConfig {
                teleport_seed: Some(2),
                ..GameConfig::default()
            },
            Vec::new(),
        )
    }

    fn output(console: Console<Vec<u8>>) -> String {
        String::from_utf8(console.into_output()).expect("utf8")
    }

    #[test]
    fn moves_alternate_sides() {
        let mut c = console();
        c.process_command("move e2e4");
        assert_eq!(c.side_to_move(), Color::Black);
        c.process_command("move d2d4");
        assert_eq!(c.side_to_move(), Color::Black);
        c.process_command("move e7e5");
        assert_eq!(c.side_to_move(), Color::White);

        let out = output(c);
        assert!(out.contains("ok e2e4"));
        assert!(out.contains("illegal Black to move"));
        assert!(out.contains("ok e7e5"));
    }

    #[test]
    fn bad_input_reports_errors() {
        let mut c = console();
        c.process_command("move e9e4");
        c.process_command("fly");
        c.process_command("setoption name HighlightMode value sideways");
        let out = output(c);
        assert!(out.contains("error invalid square notation: e9e4"));
        assert!(out.contains("error invalid command: unknown command fly"));
        assert!(out.contains("bad value sideways"));
    }

    #[test]
    fn setoption_updates_board_config() {
        let mut c = console();
        c.process_command("setoption name HighlightMode value strict");
        c.process_command("setoption name StrictCastling value true");
        assert_eq!(c.board().config().highlight_mode, HighlightMode::Strict);
        assert!(c.board().config().strict_castling);
    }

    #[test]
    fn army_applies_on_newgame() {
        let mut c = console();
        c.process_command(r#"army white [{"type":"Queen","file":3,"variant":"Glass"}]"#);
        c.process_command("newgame");
        let (_, queen) = c.board().get(Square::new(3, 0)).expect("queen");
        assert_eq!(queen.variant, crate::piece::Variant::Glass);
    }

    #[test]
    fn glass_queen_holds_the_turn() {
        let mut c = console();
        c.process_command(r#"army white [{"type":"Queen","file":3,"variant":"Glass"}]"#);
        c.process_command("newgame");
        c.process_command("move e2e4");
        c.process_command("move e7e5");
        c.process_command("move d1h5");
        assert_eq!(c.side_to_move(), Color::White);
        c.process_command("move g1f3");
        assert_eq!(c.side_to_move(), Color::White);
        c.process_command("move h5g4");
        assert_eq!(c.side_to_move(), Color::Black);

        let out = output(c);
        assert!(out.contains("must move again"));
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut c = console();
        c.run("d\nquit\nmove e2e4\n".as_bytes());
        assert!(!c.is_running());
        assert_eq!(c.side_to_move(), Color::White);
    }
}
