//! Go Text Protocol (GTP) implementation.
//!
//! GTP is a text-based protocol for communicating with Go-playing programs.
//! This module implements GTP version 2, allowing the engine to be used
//! with graphical Go interfaces like Sabaki or GoGui.
//!
//! ## Supported Commands
//!
//! - `name` - Return engine name
//! - `version` - Return engine version
//! - `protocol_version` - Return GTP protocol version (2)
//! - `list_commands` - List all supported commands
//! - `known_command <cmd>` - Check if a command is supported
//! - `quit` - Exit the program
//! - `boardsize <size>` - Set board size and clear the board
//! - `clear_board` - Reset the board to empty
//! - `komi <value>` - Set komi (before the first move only)
//! - `play <color> <vertex>` - Play a move
//! - `genmove <color>` - Generate and play a move for the given color
//! - `showboard` - Print the board
//! - `final_score` - Area score of the current position
//!
//! ## Example
//!
//! ```ignore
//! use roost::gtp::{GtpEngine, GtpSettings};
//! use roost::evaluator::ScoreEvaluator;
//! let mut engine = GtpEngine::new(GtpSettings::default(), ScoreEvaluator)?;
//! engine.run()?;
//! ```

use std::io::{self, BufRead, Write};

use log::warn;

use crate::action::{format_action, parse_vertex, Action, ActionKind, Vertex};
use crate::board::Color;
use crate::constants::{DEFAULT_BOARD_SIZE, DEFAULT_KOMI, MAX_GTP_BOARD_SIZE, RESIGN_THRES};
use crate::error::{GameError, MoveError};
use crate::evaluator::Evaluator;
use crate::mcts::SearchConfig;
use crate::player::{MctsPlayer, Player};
use crate::rules::{RuleSet, RulesEngine};

/// The list of known GTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "final_score",
    "genmove",
    "known_command",
    "komi",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "version",
];

/// Game and search settings for a GTP session.
#[derive(Clone, Debug)]
pub struct GtpSettings {
    pub board_size: usize,
    pub komi: f32,
    pub rules: RuleSet,
    pub search: SearchConfig,
    /// Resign when the searched win rate drops below this
    pub resign_threshold: Option<f32>,
}

impl Default for GtpSettings {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            komi: DEFAULT_KOMI,
            rules: RuleSet::default(),
            search: SearchConfig::default(),
            resign_threshold: Some(RESIGN_THRES),
        }
    }
}

/// GTP engine state.
pub struct GtpEngine<E> {
    settings: GtpSettings,
    engine: RulesEngine,
    player: MctsPlayer<E>,
}

impl<E: Evaluator> GtpEngine<E> {
    pub fn new(settings: GtpSettings, evaluator: E) -> Result<Self, GameError> {
        if settings.board_size > MAX_GTP_BOARD_SIZE {
            return Err(GameError::Config(format!(
                "board size {} exceeds {MAX_GTP_BOARD_SIZE}",
                settings.board_size
            )));
        }
        let engine = new_engine(&settings)?;
        let player = MctsPlayer::new(evaluator, settings.search.clone())?;
        Ok(Self {
            settings,
            engine,
            player,
        })
    }

    /// Run the GTP command loop, reading from stdin and writing to stdout.
    pub fn run(&mut self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // Parse optional command ID
            let (id, command_line) = Self::parse_id(line);

            // Parse command and arguments
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }

            let command = parts[0].to_lowercase();
            let args = &parts[1..];

            let (success, message) = self.execute(&command, args);
            if !success {
                warn!("gtp {command}: {message}");
            }
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            write!(stdout, "{prefix}{id_str} {message}\n\n")?;
            stdout.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    /// Execute a GTP command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "2".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(cmd) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "boardsize" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<usize>() {
                    Ok(size) if (1..=MAX_GTP_BOARD_SIZE).contains(&size) => {
                        self.settings.board_size = size;
                        self.reset()
                    }
                    Ok(_) => (false, "unacceptable size".to_string()),
                    Err(_) => (false, "invalid size".to_string()),
                }
            }

            "clear_board" => self.reset(),

            "komi" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let Ok(komi) = arg.parse::<f32>() else {
                    return (false, "invalid komi".to_string());
                };
                if self.engine.last_action().is_some() {
                    return (false, "cannot change komi during a game".to_string());
                }
                self.settings.komi = komi;
                self.reset()
            }

            "play" => {
                if args.len() < 2 {
                    return (false, "missing arguments".to_string());
                }
                let Some(color) = parse_color(args[0]) else {
                    return (false, "invalid color".to_string());
                };
                let size = self.engine.board_size();
                let action = match parse_vertex(args[1], size) {
                    Some(Vertex::Pass) => Action::pass(color),
                    Some(Vertex::Point { x, y }) => Action::play(color, x, y),
                    None if args[1].eq_ignore_ascii_case("resign") => Action::resign(color),
                    None => return (false, "invalid vertex".to_string()),
                };
                match self.engine.apply(action) {
                    Ok(()) => (true, String::new()),
                    Err(e) => (false, format!("illegal move: {e}")),
                }
            }

            "genmove" => {
                let Some(color) = args.first().and_then(|c| parse_color(c)) else {
                    return (false, "invalid color".to_string());
                };
                match self.genmove(color) {
                    Ok(action) => (true, format_action(&action, self.engine.board_size())),
                    Err(e) => (false, e.to_string()),
                }
            }

            "showboard" => (true, format!("\n{}", self.engine.board())),

            "final_score" => (true, format_score(self.engine.score())),

            _ => (false, format!("unknown command: {command}")),
        }
    }

    fn reset(&mut self) -> (bool, String) {
        match new_engine(&self.settings) {
            Ok(engine) => {
                self.engine = engine;
                (true, String::new())
            }
            Err(e) => (false, e.to_string()),
        }
    }

    /// Search, decide and play a move for `color`.
    fn genmove(&mut self, color: Color) -> Result<Action, GameError> {
        if self.engine.done() {
            return Err(GameError::GameOver);
        }
        if color != self.engine.color_to_move() {
            return Err(GameError::IllegalMove {
                action: Action::pass(color),
                reason: MoveError::WrongTurn,
            });
        }

        // If opponent passed and we're ahead, pass too
        let opponent_passed = self.engine.last_action().is_some_and(|a| a.is_pass());
        let action = if opponent_passed && self.engine.score() * color.sign() > 0.0 {
            Action::pass(color)
        } else {
            let action = self.player.get_move(&self.engine)?;
            let winrate = self.player.last_winrate().unwrap_or(0.5);
            match self.settings.resign_threshold {
                Some(thres) if winrate < thres && action.kind != ActionKind::Pass => {
                    Action::resign(color)
                }
                _ => action,
            }
        };

        self.engine.apply(action)?;
        Ok(action)
    }
}

fn new_engine(settings: &GtpSettings) -> Result<RulesEngine, GameError> {
    RulesEngine::with_rules(settings.board_size, 0, settings.komi, settings.rules)
}

fn parse_color(s: &str) -> Option<Color> {
    match s.to_lowercase().as_str() {
        "b" | "black" => Some(Color::Black),
        "w" | "white" => Some(Color::White),
        _ => None,
    }
}

/// Format a Black margin as "B+x", "W+x" or "0".
fn format_score(margin: f32) -> String {
    if margin > 0.0 {
        format!("B+{margin:.1}")
    } else if margin < 0.0 {
        format!("W+{:.1}", -margin)
    } else {
        "0".to_string()
    }
}
