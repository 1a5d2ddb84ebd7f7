//! Default parameters for the rules engine, the search and the front ends.
//!
//! Board size is a runtime value (see [`crate::rules::RulesEngine::new`]);
//! the constants here are only the defaults used when nothing else is given.

// =============================================================================
// Game Defaults
// =============================================================================

/// Default board size (NxN).
pub const DEFAULT_BOARD_SIZE: usize = 9;

/// Default komi (compensation points for White).
pub const DEFAULT_KOMI: f32 = 7.5;

/// Largest board the GTP front end accepts (letters A-Z without I).
pub const MAX_GTP_BOARD_SIZE: usize = 25;

/// Maximum game length in plays for a board of the given size.
pub const fn max_game_len(size: usize) -> usize {
    2 * size * size + 1
}

// =============================================================================
// MCTS Parameters
// =============================================================================

/// Default number of playouts per move.
pub const N_PLAYOUTS: usize = 400;

/// Weight of the Dirichlet noise mixed into the root priors.
pub const DIRICHLET_EPSILON: f32 = 0.25;

/// Dirichlet concentration before scaling; alpha = scale / legal moves.
pub const DIRICHLET_ALPHA_SCALE: f32 = 10.0;

/// Root winrate below which `genmove` resigns.
pub const RESIGN_THRES: f32 = 0.1;
