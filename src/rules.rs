//! The rules engine: legality, move application, termination and scoring.
//!
//! A [`RulesEngine`] owns its [`Board`] and is mutated in place by
//! [`RulesEngine::apply`]. Legality checks never touch the live board: they
//! place the candidate stone on a scratch copy through a rollback guard.
//!
//! Repetition is checked against the single immediately preceding
//! [`GameState`] only (simple ko, no superko).

use log::trace;

use crate::action::{Action, ActionKind};
use crate::board::{Board, Color, Trial};
use crate::constants::max_game_len;
use crate::error::{GameError, MoveError};

/// Optional rule switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleSet {
    /// Reject any play whose resulting group has exactly four stones.
    pub four_stone_rule: bool,
    /// Number of plays after which the game ends; defaults to `2*N*N + 1`.
    pub max_moves: Option<usize>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            four_stone_rule: true,
            max_moves: None,
        }
    }
}

/// A snapshot of board contents, the color to move and the last action.
///
/// Two snapshots are equal iff board and color to move match.
#[derive(Clone, Debug)]
pub struct GameState {
    pub board: Board,
    pub to_move: Color,
    pub last_action: Option<Action>,
}

impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        self.to_move == other.to_move && self.board == other.board
    }
}

impl Eq for GameState {}

#[derive(Clone, Debug)]
pub struct RulesEngine {
    board: Board,
    to_move: Color,
    done: bool,
    winner: Option<Color>,
    move_count: usize,
    last_action: Option<Action>,
    previous: GameState,
    komi: f32,
    handicap: usize,
    rules: RuleSet,
}

impl RulesEngine {
    /// Create an engine with the default rule set.
    ///
    /// `handicap` is recorded but no handicap stones are placed.
    pub fn new(board_size: usize, handicap: usize, komi: f32) -> Result<Self, GameError> {
        Self::with_rules(board_size, handicap, komi, RuleSet::default())
    }

    pub fn with_rules(
        board_size: usize,
        handicap: usize,
        komi: f32,
        rules: RuleSet,
    ) -> Result<Self, GameError> {
        if board_size == 0 {
            return Err(GameError::Config("board size must be positive".into()));
        }
        if !komi.is_finite() {
            return Err(GameError::Config(format!("komi must be finite, got {komi}")));
        }
        if rules.max_moves == Some(0) {
            return Err(GameError::Config("move ceiling must be positive".into()));
        }
        let board = Board::new(board_size);
        let previous = GameState {
            board: board.clone(),
            to_move: Color::Black,
            last_action: None,
        };
        Ok(Self {
            board,
            to_move: Color::Black,
            done: false,
            winner: None,
            move_count: 0,
            last_action: None,
            previous,
            komi,
            handicap,
            rules,
        })
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn board_size(&self) -> usize {
        self.board.size()
    }

    #[inline]
    pub fn color_to_move(&self) -> Color {
        self.to_move
    }

    #[inline]
    pub fn done(&self) -> bool {
        self.done
    }

    /// Winner once the game is over; `None` while playing or on a tie.
    #[inline]
    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    /// Number of plays (passes and resignations excluded).
    #[inline]
    pub fn move_count(&self) -> usize {
        self.move_count
    }

    #[inline]
    pub fn komi(&self) -> f32 {
        self.komi
    }

    #[inline]
    pub fn handicap(&self) -> usize {
        self.handicap
    }

    #[inline]
    pub fn rules(&self) -> RuleSet {
        self.rules
    }

    #[inline]
    pub fn last_action(&self) -> Option<Action> {
        self.last_action
    }

    pub fn max_moves(&self) -> usize {
        self.rules
            .max_moves
            .unwrap_or_else(|| max_game_len(self.board.size()))
    }

    /// Number of move indices: every point plus pass.
    #[inline]
    pub fn action_space(&self) -> usize {
        let n = self.board.size();
        n * n + 1
    }

    pub fn game_state(&self) -> GameState {
        GameState {
            board: self.board.clone(),
            to_move: self.to_move,
            last_action: self.last_action,
        }
    }

    /// The position before the most recent action.
    pub fn previous_state(&self) -> &GameState {
        &self.previous
    }

    pub fn is_legal(&self, action: &Action) -> bool {
        self.check(action).is_ok()
    }

    /// Every legal action: pass and resign first, then plays in index order.
    pub fn legal_moves(&self) -> Vec<Action> {
        if self.done {
            return Vec::new();
        }
        let color = self.to_move;
        let mut moves = vec![Action::pass(color), Action::resign(color)];
        let mut scratch = self.board.clone();
        let size = self.board.size();
        for x in 0..size {
            for y in 0..size {
                if self.check_play(&mut scratch, x, y, color).is_ok() {
                    moves.push(Action::play(color, x, y));
                }
            }
        }
        moves
    }

    /// Legal move indices in ascending order, pass (`N*N`) last.
    ///
    /// Empty once the game is over.
    pub fn legal_move_indices(&self) -> Vec<usize> {
        if self.done {
            return Vec::new();
        }
        let size = self.board.size();
        let mut scratch = self.board.clone();
        let mut indices: Vec<usize> = (0..size * size)
            .filter(|&pt| {
                let (x, y) = self.board.coords(pt);
                self.check_play(&mut scratch, x, y, self.to_move).is_ok()
            })
            .collect();
        indices.push(size * size);
        indices
    }

    /// Validate an action without applying it.
    pub fn check(&self, action: &Action) -> Result<(), GameError> {
        let illegal = |reason| GameError::IllegalMove {
            action: *action,
            reason,
        };
        if self.done {
            return Err(illegal(MoveError::GameOver));
        }
        match action.kind {
            ActionKind::Resign => Ok(()),
            ActionKind::Pass if action.color != self.to_move => Err(illegal(MoveError::WrongTurn)),
            ActionKind::Pass => Ok(()),
            ActionKind::Play { x, y } => {
                if !self.board.contains(x, y) {
                    return Err(GameError::InvalidCoordinate {
                        x,
                        y,
                        size: self.board.size(),
                    });
                }
                if action.color != self.to_move {
                    return Err(illegal(MoveError::WrongTurn));
                }
                let mut scratch = self.board.clone();
                self.check_play(&mut scratch, x, y, action.color)
                    .map_err(illegal)
            }
        }
    }

    /// Tentatively place a stone on `scratch`, which must match the live
    /// board, and judge the result. `scratch` is restored before returning.
    fn check_play(&self, scratch: &mut Board, x: usize, y: usize, color: Color) -> Result<(), MoveError> {
        let pt = scratch.point(x, y);
        if scratch.at(pt).is_some() {
            return Err(MoveError::Occupied);
        }
        let mut trial = Trial::new(scratch);
        let placed = trial.place(pt, color);
        if placed.liberties == 0 {
            return Err(MoveError::Suicide);
        }
        if self.rules.four_stone_rule && placed.group_size == 4 {
            return Err(MoveError::FourStoneGroup);
        }
        if self.previous.to_move == -color && self.previous.board == *trial.board() {
            return Err(MoveError::Ko);
        }
        Ok(())
    }

    /// Apply a legal action, mutating the engine in place.
    ///
    /// # Errors
    /// - `IllegalMove` if the action fails [`RulesEngine::check`]
    /// - `InvalidCoordinate` for an off-board play
    pub fn apply(&mut self, action: Action) -> Result<(), GameError> {
        self.check(&action)?;
        self.previous = self.game_state();

        match action.kind {
            ActionKind::Resign => {
                self.done = true;
                self.winner = Some(-action.color);
            }
            ActionKind::Pass => {
                let double_pass = self.last_action.is_some_and(|a| a.is_pass());
                self.to_move = -self.to_move;
                self.last_action = Some(action);
                if double_pass {
                    self.finish();
                }
            }
            ActionKind::Play { x, y } => {
                let pt = self.board.point(x, y);
                let mut trial = Trial::new(&mut self.board);
                let placed = trial.place(pt, action.color);
                trial.commit();
                if placed.captured > 0 {
                    trace!("{action} captures {} stone(s)", placed.captured);
                }
                self.to_move = -self.to_move;
                self.last_action = Some(action);
                self.move_count += 1;
                if self.move_count >= self.max_moves() {
                    self.finish();
                }
            }
        }
        Ok(())
    }

    /// Area score margin: black area - white area - komi.
    ///
    /// A point counts for a color iff it is reachable from that color's
    /// stones and not from the other's.
    pub fn score(&self) -> f32 {
        let (black, white) = self.board.area();
        black as f32 - white as f32 - self.komi
    }

    fn finish(&mut self) {
        self.done = true;
        let margin = self.score();
        if margin > 0.0 {
            self.winner = Some(Color::Black);
        } else if margin < 0.0 {
            self.winner = Some(Color::White);
        }
        trace!("game over after {} plays, margin {margin}", self.move_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(size: usize) -> RulesEngine {
        RulesEngine::new(size, 0, 0.0).unwrap()
    }

    #[test]
    fn test_new_engine() {
        let e = engine(7);
        assert_eq!(e.board_size(), 7);
        assert_eq!(e.color_to_move(), Color::Black);
        assert!(!e.done());
        assert_eq!(e.winner(), None);
        assert_eq!(e.move_count(), 0);
        assert_eq!(e.max_moves(), 99);
        assert_eq!(e.action_space(), 50);
    }

    #[test]
    fn test_rejects_zero_board() {
        assert!(matches!(RulesEngine::new(0, 0, 7.5), Err(GameError::Config(_))));
    }

    #[test]
    fn test_legal_moves_on_empty_board() {
        let e = engine(3);
        let moves = e.legal_moves();
        assert_eq!(moves.len(), 2 + 9);
        assert!(moves[0].is_pass());
        assert_eq!(moves[1].kind, ActionKind::Resign);
        assert_eq!(e.legal_move_indices(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_wrong_turn() {
        let e = engine(5);
        let err = e.check(&Action::play(Color::White, 0, 0)).unwrap_err();
        assert!(matches!(
            err,
            GameError::IllegalMove {
                reason: MoveError::WrongTurn,
                ..
            }
        ));
        assert!(e.is_legal(&Action::resign(Color::White)));
    }

    #[test]
    fn test_off_board() {
        let mut e = engine(5);
        let err = e.apply(Action::play(Color::Black, 5, 0)).unwrap_err();
        assert!(matches!(err, GameError::InvalidCoordinate { x: 5, y: 0, size: 5 }));
        assert!(!e.is_legal(&Action::play(Color::Black, 0, 9)));
    }

    #[test]
    fn test_move_ceiling_ends_game() {
        let rules = RuleSet {
            four_stone_rule: true,
            max_moves: Some(2),
        };
        let mut e = RulesEngine::with_rules(5, 0, 0.5, rules).unwrap();
        e.apply(Action::play(Color::Black, 0, 0)).unwrap();
        assert!(!e.done());
        e.apply(Action::play(Color::White, 4, 4)).unwrap();
        assert!(e.done());
        // Both stones reach the whole board, so nothing is counted.
        assert_eq!(e.score(), -0.5);
        assert_eq!(e.winner(), Some(Color::White));
        assert!(e.legal_moves().is_empty());
        assert!(e.legal_move_indices().is_empty());
    }

    #[test]
    fn test_resign() {
        let mut e = engine(5);
        e.apply(Action::resign(Color::Black)).unwrap();
        assert!(e.done());
        assert_eq!(e.winner(), Some(Color::White));
        assert!(!e.is_legal(&Action::pass(Color::Black)));
    }

    #[test]
    fn test_pass_then_play_does_not_end() {
        let mut e = engine(5);
        e.apply(Action::pass(Color::Black)).unwrap();
        e.apply(Action::play(Color::White, 1, 1)).unwrap();
        e.apply(Action::pass(Color::Black)).unwrap();
        assert!(!e.done());
        assert_eq!(e.move_count(), 1);
    }

    #[test]
    fn test_four_stone_rule_is_configurable() {
        let rules = RuleSet {
            four_stone_rule: false,
            max_moves: None,
        };
        let mut on = engine(5);
        let mut off = RulesEngine::with_rules(5, 0, 0.0, rules).unwrap();
        for e in [&mut on, &mut off] {
            for y in 0..3 {
                e.apply(Action::play(Color::Black, 0, y)).unwrap();
                e.apply(Action::play(Color::White, 4, y)).unwrap();
            }
        }
        let fourth = Action::play(Color::Black, 0, 3);
        assert!(matches!(
            on.check(&fourth),
            Err(GameError::IllegalMove {
                reason: MoveError::FourStoneGroup,
                ..
            })
        ));
        assert!(off.is_legal(&fourth));
        assert!(on.is_legal(&Action::play(Color::Black, 2, 2)));
    }

    #[test]
    fn test_check_leaves_board_untouched() {
        let mut e = engine(3);
        e.apply(Action::play(Color::Black, 0, 1)).unwrap();
        e.apply(Action::play(Color::White, 1, 1)).unwrap();
        e.apply(Action::play(Color::Black, 1, 0)).unwrap();
        e.apply(Action::pass(Color::White)).unwrap();
        e.apply(Action::play(Color::Black, 2, 1)).unwrap();
        e.apply(Action::pass(Color::White)).unwrap();
        let before = e.board().clone();
        // Capturing move and a suicide probe both leave the live board as is.
        assert!(e.is_legal(&Action::play(Color::Black, 1, 2)));
        let _ = e.legal_moves();
        assert_eq!(e.board(), &before);
    }
}
