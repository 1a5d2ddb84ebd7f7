//! Players: anything that picks an action for the color to move.

use crate::action::{Action, ActionKind};
use crate::error::GameError;
use crate::evaluator::Evaluator;
use crate::mcts::{Mcts, SearchConfig};
use crate::rules::RulesEngine;

pub trait Player {
    /// Choose an action for `engine`'s color to move. `engine` is not changed.
    fn get_move(&mut self, engine: &RulesEngine) -> Result<Action, GameError>;

    fn name(&self) -> &'static str;
}

/// A search-based player parameterized by its evaluator.
pub struct MctsPlayer<E> {
    mcts: Mcts<E>,
    last_winrate: Option<f32>,
}

impl<E: Evaluator> MctsPlayer<E> {
    pub fn new(evaluator: E, config: SearchConfig) -> Result<Self, GameError> {
        Ok(Self {
            mcts: Mcts::new(evaluator, config)?,
            last_winrate: None,
        })
    }

    /// Win rate for the mover reported by the most recent search.
    pub fn last_winrate(&self) -> Option<f32> {
        self.last_winrate
    }

    pub fn mcts_mut(&mut self) -> &mut Mcts<E> {
        &mut self.mcts
    }
}

impl<E: Evaluator> Player for MctsPlayer<E> {
    fn get_move(&mut self, engine: &RulesEngine) -> Result<Action, GameError> {
        let tree = self.mcts.search(engine)?;
        self.last_winrate = tree.root_winrate();
        self.mcts.decide(&tree)
    }

    fn name(&self) -> &'static str {
        "mcts"
    }
}

/// Plays a uniformly random legal pass or play. Never resigns.
pub struct RandomPlayer {
    rng: fastrand::Rng,
}

impl RandomPlayer {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self { rng }
    }
}

impl Player for RandomPlayer {
    fn get_move(&mut self, engine: &RulesEngine) -> Result<Action, GameError> {
        let moves: Vec<Action> = engine
            .legal_moves()
            .into_iter()
            .filter(|a| a.kind != ActionKind::Resign)
            .collect();
        if moves.is_empty() {
            return Err(GameError::GameOver);
        }
        Ok(moves[self.rng.usize(..moves.len())])
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Color;
    use crate::evaluator::ScoreEvaluator;

    #[test]
    fn test_random_player_plays_legal_moves() {
        let mut engine = RulesEngine::new(5, 0, 7.5).unwrap();
        let mut player = RandomPlayer::new(Some(9));
        for _ in 0..20 {
            if engine.done() {
                break;
            }
            let action = player.get_move(&engine).unwrap();
            assert_ne!(action.kind, ActionKind::Resign);
            assert!(engine.is_legal(&action));
            engine.apply(action).unwrap();
        }
    }

    #[test]
    fn test_random_player_on_finished_game() {
        let mut engine = RulesEngine::new(5, 0, 7.5).unwrap();
        engine.apply(Action::resign(Color::White)).unwrap();
        let mut player = RandomPlayer::new(Some(1));
        assert!(matches!(player.get_move(&engine), Err(GameError::GameOver)));
    }

    #[test]
    fn test_mcts_player_reports_winrate() {
        let engine = RulesEngine::new(5, 0, 7.5).unwrap();
        let config = SearchConfig {
            playouts: 30,
            seed: Some(5),
            ..SearchConfig::default()
        };
        let mut player = MctsPlayer::new(ScoreEvaluator, config).unwrap();
        assert_eq!(player.last_winrate(), None);
        let action = player.get_move(&engine).unwrap();
        assert_eq!(action.color, Color::Black);
        assert!(engine.is_legal(&action));
        let wr = player.last_winrate().unwrap();
        assert!((0.0..=1.0).contains(&wr));
    }
}
