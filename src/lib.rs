//! Roost: a rules engine and evaluator-guided MCTS for Go-like games.
//!
//! ## Modules
//!
//! - [`constants`] - Default game and search parameters
//! - [`board`] - Stones, groups, liberties and area flood fills
//! - [`action`] - Actions, move indices and GTP vertices
//! - [`rules`] - The rules engine (legality, captures, ko, scoring)
//! - [`evaluator`] - Position evaluators consumed by the search
//! - [`mcts`] - Monte Carlo Tree Search with policy priors
//! - [`player`] - Search-based and random players
//! - [`arena`] - Matches between two players
//! - [`gtp`] - Go Text Protocol front end
//!
//! ## Example
//!
//! ```
//! use roost::evaluator::ScoreEvaluator;
//! use roost::mcts::{Mcts, SearchConfig};
//! use roost::rules::RulesEngine;
//!
//! // Create a new game
//! let mut engine = RulesEngine::new(9, 0, 7.5).unwrap();
//!
//! // Run MCTS to find a move and play it
//! let config = SearchConfig { playouts: 50, seed: Some(1), ..SearchConfig::default() };
//! let mut mcts = Mcts::new(ScoreEvaluator, config).unwrap();
//! let action = mcts.choose(&engine).unwrap();
//! engine.apply(action).unwrap();
//! println!("Played {action}");
//! ```

pub mod action;
pub mod arena;
pub mod board;
pub mod constants;
pub mod error;
pub mod evaluator;
pub mod gtp;
pub mod mcts;
pub mod player;
pub mod rules;

pub use error::{GameError, MoveError};
