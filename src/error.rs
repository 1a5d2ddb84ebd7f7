//! Error types shared by the rules engine and the search.

use std::fmt;

use thiserror::Error;

use crate::action::Action;

/// Why a play was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    /// Point is not empty
    Occupied,
    /// Move would be suicide (no liberties after capture resolution)
    Suicide,
    /// Move would form a group of exactly four stones
    FourStoneGroup,
    /// Move recreates the immediately preceding position
    Ko,
    /// Actor is not the color to move
    WrongTurn,
    /// The game has already finished
    GameOver,
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::Occupied => write!(f, "point is occupied"),
            MoveError::Suicide => write!(f, "suicide"),
            MoveError::FourStoneGroup => write!(f, "forms a group of four"),
            MoveError::Ko => write!(f, "retakes ko"),
            MoveError::WrongTurn => write!(f, "not this color's turn"),
            MoveError::GameOver => write!(f, "game is over"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("illegal move {action}: {reason}")]
    IllegalMove { action: Action, reason: MoveError },

    #[error("coordinate ({x}, {y}) is outside a {size}x{size} board")]
    InvalidCoordinate { x: usize, y: usize, size: usize },

    #[error("malformed evaluator output: {0}")]
    MalformedEvaluatorOutput(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("search requested on a finished game")]
    GameOver,
}
