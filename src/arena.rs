//! Play two players against each other on one authoritative engine.

use log::{debug, info};

use crate::action::Action;
use crate::board::Color;
use crate::error::GameError;
use crate::player::Player;
use crate::rules::RulesEngine;

/// Final outcome of a [`Match`].
#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult {
    pub winner: Option<Color>,
    /// Area margin for Black at the end of the game (komi included)
    pub score: f32,
    pub actions: Vec<Action>,
}

pub struct Match {
    black: Box<dyn Player>,
    white: Box<dyn Player>,
    engine: RulesEngine,
}

impl Match {
    pub fn new(black: Box<dyn Player>, white: Box<dyn Player>, engine: RulesEngine) -> Self {
        Self {
            black,
            white,
            engine,
        }
    }

    pub fn engine(&self) -> &RulesEngine {
        &self.engine
    }

    /// Alternate the players until the game is done.
    pub fn play(&mut self) -> Result<MatchResult, GameError> {
        let mut actions = Vec::new();
        while !self.engine.done() {
            let player = match self.engine.color_to_move() {
                Color::Black => &mut self.black,
                Color::White => &mut self.white,
            };
            let action = player.get_move(&self.engine)?;
            debug!("{} plays {action}", player.name());
            self.engine.apply(action)?;
            actions.push(action);
        }

        let result = MatchResult {
            winner: self.engine.winner(),
            score: self.engine.score(),
            actions,
        };
        info!(
            "{} ({}) vs {} ({}): winner {:?}, margin {:.1}, {} actions",
            self.black.name(),
            Color::Black,
            self.white.name(),
            Color::White,
            result.winner,
            result.score,
            result.actions.len()
        );
        Ok(result)
    }
}
