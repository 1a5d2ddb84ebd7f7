//! Position evaluators consumed by the search.
//!
//! An evaluator maps a position to a prior over every move index
//! (`N*N + 1` entries, pass last) and a value in `[-1, 1]` from Black's
//! side. The search masks priors of illegal moves itself.
//!
//! Two evaluators are provided:
//! - [`ScoreEvaluator`] - uniform priors, value from the current area score
//! - [`RolloutEvaluator`] - uniform priors, value from one random playout

use crate::action::Action;
use crate::board::Color;
use crate::error::GameError;
use crate::rules::RulesEngine;

/// Output of an [`Evaluator`].
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub policy: Vec<f32>,
    pub value: f32,
}

impl Evaluation {
    /// Uniform prior over `action_space` indices.
    pub fn uniform(action_space: usize, value: f32) -> Self {
        Self {
            policy: vec![1.0 / action_space as f32; action_space],
            value,
        }
    }

    /// Reject output the search cannot use. Nothing is clamped.
    pub fn validate(&self, action_space: usize) -> Result<(), GameError> {
        if self.policy.len() != action_space {
            return Err(GameError::MalformedEvaluatorOutput(format!(
                "policy has {} entries, expected {action_space}",
                self.policy.len()
            )));
        }
        if let Some((i, p)) = self
            .policy
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p < 0.0)
        {
            return Err(GameError::MalformedEvaluatorOutput(format!(
                "policy entry {i} is {p}"
            )));
        }
        if !self.value.is_finite() || !(-1.0..=1.0).contains(&self.value) {
            return Err(GameError::MalformedEvaluatorOutput(format!(
                "value {} outside [-1, 1]",
                self.value
            )));
        }
        Ok(())
    }
}

/// Anything that can judge a position.
pub trait Evaluator {
    fn evaluate(&mut self, engine: &RulesEngine) -> Evaluation;
}

impl<F> Evaluator for F
where
    F: FnMut(&RulesEngine) -> Evaluation,
{
    fn evaluate(&mut self, engine: &RulesEngine) -> Evaluation {
        self(engine)
    }
}

/// Value of a finished game from Black's side: +1, -1, or 0 for no winner.
pub fn terminal_value(engine: &RulesEngine) -> f32 {
    engine.winner().map_or(0.0, Color::sign)
}

/// Uniform priors; value is the area margin scaled into `[-1, 1]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScoreEvaluator;

impl Evaluator for ScoreEvaluator {
    fn evaluate(&mut self, engine: &RulesEngine) -> Evaluation {
        let space = engine.action_space();
        if engine.done() {
            return Evaluation::uniform(space, terminal_value(engine));
        }
        let n = engine.board_size();
        let max_score = (n * n) as f32 + engine.komi().abs();
        let value = (engine.score() / max_score).clamp(-1.0, 1.0);
        Evaluation::uniform(space, value)
    }
}

/// Uniform priors; value is the result of a random playout to the end.
///
/// Playouts never fill a point whose neighbors are all the mover's own
/// stones, so games end by double pass instead of filling every eye.
pub struct RolloutEvaluator {
    rng: fastrand::Rng,
}

impl RolloutEvaluator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Default for RolloutEvaluator {
    fn default() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }
}

impl Evaluator for RolloutEvaluator {
    fn evaluate(&mut self, engine: &RulesEngine) -> Evaluation {
        let space = engine.action_space();
        let mut game = engine.clone();
        while !game.done() {
            let color = game.color_to_move();
            let action = choose_random_move(&game, &mut self.rng)
                .unwrap_or_else(|| Action::pass(color));
            if game.apply(action).is_err() {
                break;
            }
        }
        let value = if game.done() {
            terminal_value(&game)
        } else {
            game.score().signum()
        };
        Evaluation::uniform(space, value)
    }
}

/// Choose a random legal play that does not fill one of the mover's eyes.
pub fn choose_random_move(engine: &RulesEngine, rng: &mut fastrand::Rng) -> Option<Action> {
    let board = engine.board();
    let color = engine.color_to_move();
    let size = board.size();

    let mut candidates: Vec<usize> = (0..size * size)
        .filter(|&pt| board.at(pt).is_none() && board.is_eyeish(pt) != Some(color))
        .collect();

    // Shuffle lazily and stop at the first legal candidate
    let n = candidates.len();
    for i in 0..n {
        let j = rng.usize(i..n);
        candidates.swap(i, j);

        let (x, y) = board.coords(candidates[i]);
        let action = Action::play(color, x, y);
        if engine.is_legal(&action) {
            return Some(action);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;

    #[test]
    fn test_validate_accepts_uniform() {
        let eval = Evaluation::uniform(26, 0.5);
        assert!(eval.validate(26).is_ok());
    }

    #[test]
    fn test_validate_rejects_wrong_length() {
        let eval = Evaluation::uniform(10, 0.0);
        assert!(matches!(
            eval.validate(26),
            Err(GameError::MalformedEvaluatorOutput(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_entries() {
        let mut eval = Evaluation::uniform(4, 0.0);
        eval.policy[2] = f32::NAN;
        assert!(eval.validate(4).is_err());

        let mut eval = Evaluation::uniform(4, 0.0);
        eval.policy[1] = -0.1;
        assert!(eval.validate(4).is_err());

        let eval = Evaluation::uniform(4, 1.5);
        assert!(eval.validate(4).is_err());

        let eval = Evaluation::uniform(4, f32::INFINITY);
        assert!(eval.validate(4).is_err());
    }

    #[test]
    fn test_score_evaluator_empty_board() {
        let engine = RulesEngine::new(5, 0, 7.0).unwrap();
        let eval = ScoreEvaluator.evaluate(&engine);
        assert_eq!(eval.policy.len(), 26);
        assert!((eval.value - (-7.0 / 32.0)).abs() < 1e-6);
        assert!(eval.validate(26).is_ok());
    }

    #[test]
    fn test_score_evaluator_terminal() {
        let mut engine = RulesEngine::new(5, 0, 7.5).unwrap();
        engine.apply(Action::resign(Color::White)).unwrap();
        assert_eq!(ScoreEvaluator.evaluate(&engine).value, 1.0);
    }

    #[test]
    fn test_closure_evaluator() {
        let mut calls = 0;
        let mut eval = |engine: &RulesEngine| {
            calls += 1;
            Evaluation::uniform(engine.action_space(), 0.0)
        };
        let engine = RulesEngine::new(3, 0, 0.0).unwrap();
        eval.evaluate(&engine);
        eval.evaluate(&engine);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_rollout_terminates_with_outcome() {
        let rules = RuleSet {
            four_stone_rule: false,
            max_moves: None,
        };
        let engine = RulesEngine::with_rules(5, 0, 0.5, rules).unwrap();
        let mut rollout = RolloutEvaluator::new(7);
        for _ in 0..5 {
            let eval = rollout.evaluate(&engine);
            assert!(eval.value == 1.0 || eval.value == -1.0);
            assert!(eval.validate(26).is_ok());
        }
    }

    #[test]
    fn test_rollout_is_reproducible() {
        let engine = RulesEngine::new(5, 0, 0.5).unwrap();
        let a: Vec<f32> = {
            let mut r = RolloutEvaluator::new(42);
            (0..4).map(|_| r.evaluate(&engine).value).collect()
        };
        let b: Vec<f32> = {
            let mut r = RolloutEvaluator::new(42);
            (0..4).map(|_| r.evaluate(&engine).value).collect()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_move_avoids_own_eye() {
        // Black to move; (0,0) is surrounded by Black stones.
        let mut engine = RulesEngine::new(3, 0, 0.0).unwrap();
        engine.apply(Action::play(Color::Black, 0, 1)).unwrap();
        engine.apply(Action::play(Color::White, 2, 2)).unwrap();
        engine.apply(Action::play(Color::Black, 1, 0)).unwrap();
        engine.apply(Action::pass(Color::White)).unwrap();
        let mut rng = fastrand::Rng::with_seed(3);
        for _ in 0..20 {
            let action = choose_random_move(&engine, &mut rng).unwrap();
            assert_ne!(action, Action::play(Color::Black, 0, 0));
        }
    }
}
