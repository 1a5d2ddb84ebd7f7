//! Roost: a Go-like game engine with evaluator-guided MCTS.
//!
//! ## Usage
//!
//! - `roost` - Play one demo match (MCTS vs random)
//! - `roost gtp` - Start GTP server for GUI integration
//! - `roost match --black mcts --white mcts --games 10` - Run a series of matches

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use roost::arena::Match;
use roost::board::Color;
use roost::constants::{DEFAULT_BOARD_SIZE, DEFAULT_KOMI, N_PLAYOUTS, RESIGN_THRES};
use roost::evaluator::{Evaluator, RolloutEvaluator, ScoreEvaluator};
use roost::gtp::{GtpEngine, GtpSettings};
use roost::mcts::SearchConfig;
use roost::player::{MctsPlayer, Player, RandomPlayer};
use roost::rules::{RuleSet, RulesEngine};

/// Roost: a Go-like game engine with evaluator-guided MCTS
#[derive(Parser)]
#[command(name = "roost")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Board size (NxN)
    #[arg(long, global = true, default_value_t = DEFAULT_BOARD_SIZE)]
    size: usize,

    /// Compensation points for White
    #[arg(long, global = true, default_value_t = DEFAULT_KOMI, allow_negative_numbers = true)]
    komi: f32,

    /// Playouts per searched move
    #[arg(long, global = true, default_value_t = N_PLAYOUTS)]
    playouts: usize,

    /// Seed for every random source
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Position evaluator used by the search
    #[arg(long, global = true, value_enum, default_value_t = EvaluatorKind::Rollout)]
    evaluator: EvaluatorKind,

    /// Allow groups of exactly four stones
    #[arg(long, global = true)]
    no_four_stone_rule: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp {
        /// Never resign
        #[arg(long)]
        no_resign: bool,
    },
    /// Play matches between two players
    Match {
        #[arg(long, value_enum, default_value_t = PlayerKind::Mcts)]
        black: PlayerKind,
        #[arg(long, value_enum, default_value_t = PlayerKind::Random)]
        white: PlayerKind,
        /// Number of games to play
        #[arg(long, default_value_t = 1)]
        games: usize,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum EvaluatorKind {
    /// Uniform priors, value from the current area score
    Score,
    /// Uniform priors, value from a random playout
    Rollout,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PlayerKind {
    Mcts,
    Random,
}

impl Cli {
    fn rules(&self) -> RuleSet {
        RuleSet {
            four_stone_rule: !self.no_four_stone_rule,
            max_moves: None,
        }
    }

    fn search(&self, offset: u64) -> SearchConfig {
        SearchConfig {
            playouts: self.playouts,
            seed: self.seed.map(|s| s.wrapping_add(offset)),
            ..SearchConfig::default()
        }
    }

    fn rollout(&self, offset: u64) -> RolloutEvaluator {
        match self.seed {
            Some(seed) => RolloutEvaluator::new(seed.wrapping_add(offset)),
            None => RolloutEvaluator::default(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Gtp { no_resign }) => {
            let no_resign = *no_resign;
            let settings = GtpSettings {
                board_size: cli.size,
                komi: cli.komi,
                rules: cli.rules(),
                search: cli.search(0),
                resign_threshold: (!no_resign).then_some(RESIGN_THRES),
            };
            match cli.evaluator {
                EvaluatorKind::Score => GtpEngine::new(settings, ScoreEvaluator)?.run(),
                EvaluatorKind::Rollout => GtpEngine::new(settings, cli.rollout(0))?.run(),
            }
        }
        Some(Commands::Match {
            black,
            white,
            games,
        }) => run_matches(&cli, *black, *white, *games),
        None => run_matches(&cli, PlayerKind::Mcts, PlayerKind::Random, 1),
    }
}

fn make_player(cli: &Cli, kind: PlayerKind, offset: u64) -> Result<Box<dyn Player>> {
    fn boxed<E: Evaluator + 'static>(e: E, config: SearchConfig) -> Result<Box<dyn Player>> {
        Ok(Box::new(MctsPlayer::new(e, config)?))
    }

    match (kind, cli.evaluator) {
        (PlayerKind::Random, _) => Ok(Box::new(RandomPlayer::new(
            cli.seed.map(|s| s.wrapping_add(offset)),
        ))),
        (PlayerKind::Mcts, EvaluatorKind::Score) => boxed(ScoreEvaluator, cli.search(offset)),
        (PlayerKind::Mcts, EvaluatorKind::Rollout) => {
            boxed(cli.rollout(offset), cli.search(offset))
        }
    }
}

fn run_matches(cli: &Cli, black: PlayerKind, white: PlayerKind, games: usize) -> Result<()> {
    let mut black_wins = 0;
    let mut white_wins = 0;

    for game in 0..games {
        let offset = 2 * game as u64;
        let engine = RulesEngine::with_rules(cli.size, 0, cli.komi, cli.rules())?;
        let mut m = Match::new(
            make_player(cli, black, offset)?,
            make_player(cli, white, offset + 1)?,
            engine,
        );
        let result = m.play()?;
        println!("{}", m.engine().board());
        match result.winner {
            Some(Color::Black) => black_wins += 1,
            Some(Color::White) => white_wins += 1,
            None => {}
        }
        info!("game {}: winner {:?}, margin {:.1}", game + 1, result.winner, result.score);
    }

    println!("Black wins: {black_wins}, White wins: {white_wins}, games: {games}");
    Ok(())
}
