//! Monte Carlo Tree Search guided by an [`Evaluator`].
//!
//! Each search runs a fixed playout budget of:
//! - **Select**: descend from the root by `argmax(Q + U)` over legal moves,
//!   creating the child for the chosen move on first use
//! - **Expand**: query the evaluator at the leaf, mask illegal priors, and
//!   record the legal move set (root priors get Dirichlet noise)
//! - **Backup**: add the value to every node on the path, from the point of
//!   view of the color whose move produced that node
//!
//! The root is expanded before the budget is spent, so the root children's
//! visits always sum to the number of playouts.
//!
//! Nodes live in an arena owned by the [`SearchTree`]; each node stores its
//! own statistics and the index of its parent.

use std::collections::HashMap;

use log::{debug, log_enabled, trace, warn, Level};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Dirichlet, Distribution};

use crate::action::{format_action, Action};
use crate::board::Color;
use crate::constants::{DIRICHLET_ALPHA_SCALE, DIRICHLET_EPSILON, N_PLAYOUTS};
use crate::error::GameError;
use crate::evaluator::{terminal_value, Evaluator};
use crate::rules::RulesEngine;

/// Index of a node in its [`SearchTree`].
pub type NodeId = usize;

/// The root is always the first node of the arena.
pub const ROOT: NodeId = 0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirichletOptions {
    /// Concentration is `alpha_scale / number of legal moves`.
    pub alpha_scale: f32,
    /// Weight of the noise; the evaluator keeps `1 - epsilon`.
    pub epsilon: f32,
}

impl Default for DirichletOptions {
    fn default() -> Self {
        Self {
            alpha_scale: DIRICHLET_ALPHA_SCALE,
            epsilon: DIRICHLET_EPSILON,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    /// Playouts per search, not counting the root expansion.
    pub playouts: usize,
    /// Root exploration noise; `None` disables it.
    pub dirichlet: Option<DirichletOptions>,
    /// For this many opening plays, sample the move by visit count.
    pub temperature_moves: usize,
    /// Seed for noise and tie breaking; random when `None`.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            playouts: N_PLAYOUTS,
            dirichlet: Some(DirichletOptions::default()),
            temperature_moves: 0,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.playouts == 0 {
            return Err(GameError::Config("playout budget must be positive".into()));
        }
        if let Some(d) = &self.dirichlet {
            if !(d.alpha_scale > 0.0) || !d.alpha_scale.is_finite() {
                return Err(GameError::Config(format!(
                    "dirichlet alpha scale must be positive, got {}",
                    d.alpha_scale
                )));
            }
            if !(0.0..=1.0).contains(&d.epsilon) {
                return Err(GameError::Config(format!(
                    "dirichlet epsilon must be in [0, 1], got {}",
                    d.epsilon
                )));
            }
        }
        Ok(())
    }
}

/// A node in the search tree.
pub struct SearchNode {
    /// The position reached by this node (an independent copy)
    pub engine: RulesEngine,
    /// Move index that produced this node (`None` at the root)
    pub mv: Option<usize>,
    /// Color whose move produced this node
    pub mover: Color,
    /// Number of backups through this node
    pub visits: u32,
    /// Sum of backed-up values, from `mover`'s point of view
    pub value_sum: f32,
    /// Whether the evaluator has been applied
    pub expanded: bool,
    /// Legal move indices, fixed at expansion
    pub legal: Vec<usize>,
    /// Masked priors over every move index
    pub priors: Vec<f32>,
    parent: Option<NodeId>,
    children: HashMap<usize, NodeId>,
}

impl SearchNode {
    fn new(engine: RulesEngine, mv: Option<usize>, mover: Color, parent: Option<NodeId>) -> Self {
        Self {
            engine,
            mv,
            mover,
            visits: 0,
            value_sum: 0.0,
            expanded: false,
            legal: Vec::new(),
            priors: Vec::new(),
            parent,
            children: HashMap::new(),
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child for a move index, if it has been created.
    #[inline]
    pub fn child(&self, mv: usize) -> Option<NodeId> {
        self.children.get(&mv).copied()
    }

    #[inline]
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// Mean value for `mover`, or `None` if never visited.
    pub fn mean_value(&self) -> Option<f32> {
        (self.visits > 0).then(|| self.value_sum / self.visits as f32)
    }
}

pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl SearchTree {
    pub fn new(engine: RulesEngine) -> Self {
        let mover = -engine.color_to_move();
        Self {
            nodes: vec![SearchNode::new(engine, None, mover, None)],
        }
    }

    #[inline]
    pub fn root(&self) -> &SearchNode {
        &self.nodes[ROOT]
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `(visits, value_sum)` of the child reached by `mv`, zero if absent.
    fn child_stats(&self, id: NodeId, mv: usize) -> (u32, f32) {
        self.nodes[id]
            .child(mv)
            .map(|c| (self.nodes[c].visits, self.nodes[c].value_sum))
            .unwrap_or((0, 0.0))
    }

    /// Visit count of every legal root move, in move index order.
    pub fn root_visits(&self) -> Vec<(usize, u32)> {
        self.root()
            .legal
            .iter()
            .map(|&mv| (mv, self.child_stats(ROOT, mv).0))
            .collect()
    }

    /// Win rate in `[0, 1]` of the most visited root move for the side to move.
    pub fn root_winrate(&self) -> Option<f32> {
        let root = self.root();
        root.legal
            .iter()
            .filter_map(|&mv| root.child(mv))
            .map(|c| &self.nodes[c])
            .max_by_key(|c| c.visits)
            .and_then(SearchNode::mean_value)
            .map(|q| (q + 1.0) / 2.0)
    }

    /// The legal move maximizing `Q + U`; first index wins ties.
    ///
    /// `Q = value / (1 + visits)` and
    /// `U = sqrt(parent visits) * prior / (1 + visits)`.
    fn best_child(&self, id: NodeId) -> Option<usize> {
        let node = &self.nodes[id];
        let sqrt_visits = (node.visits as f32).sqrt();
        let mut best = None;
        let mut best_score = f32::NEG_INFINITY;

        for &mv in &node.legal {
            let (visits, value) = self.child_stats(id, mv);
            let denom = 1.0 + visits as f32;
            let score = value / denom + sqrt_visits * node.priors[mv] / denom;
            if score > best_score {
                best_score = score;
                best = Some(mv);
            }
        }
        best
    }

    /// Fetch the child for `mv`, creating it from a copy of the parent's engine.
    fn get_or_add_child(&mut self, id: NodeId, mv: usize) -> Result<NodeId, GameError> {
        if let Some(child) = self.nodes[id].child(mv) {
            return Ok(child);
        }
        let parent = &self.nodes[id];
        let color = parent.engine.color_to_move();
        let action = Action::from_index(color, mv, parent.engine.board_size());
        let mut engine = parent.engine.clone();
        engine.apply(action)?;

        let child = self.nodes.len();
        self.nodes.push(SearchNode::new(engine, Some(mv), color, Some(id)));
        self.nodes[id].children.insert(mv, child);
        Ok(child)
    }

    /// Descend through expanded nodes to a leaf.
    ///
    /// Stops at the first unexpanded node, or at a node with no legal move.
    fn select_leaf(&mut self) -> Result<NodeId, GameError> {
        let mut id = ROOT;
        while self.nodes[id].expanded {
            match self.best_child(id) {
                Some(mv) => id = self.get_or_add_child(id, mv)?,
                None => break,
            }
        }
        Ok(id)
    }

    /// Propagate a value (Black's point of view) from `leaf` up to the root.
    fn backup(&mut self, leaf: NodeId, value: f32) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = &mut self.nodes[id];
            node.visits += 1;
            node.value_sum += value * node.mover.sign();
            current = node.parent;
        }
    }
}

/// The search controller: owns the evaluator, the configuration and the RNGs.
pub struct Mcts<E> {
    evaluator: E,
    config: SearchConfig,
    rng: fastrand::Rng,
    noise_rng: StdRng,
}

impl<E: Evaluator> Mcts<E> {
    pub fn new(evaluator: E, config: SearchConfig) -> Result<Self, GameError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(|| fastrand::u64(..));
        Ok(Self {
            evaluator,
            config,
            rng: fastrand::Rng::with_seed(seed),
            noise_rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn evaluator_mut(&mut self) -> &mut E {
        &mut self.evaluator
    }

    /// Build a tree rooted at a copy of `engine` and spend the playout budget.
    pub fn search(&mut self, engine: &RulesEngine) -> Result<SearchTree, GameError> {
        if engine.done() {
            return Err(GameError::GameOver);
        }
        let mut tree = SearchTree::new(engine.clone());
        let value = self.evaluate_leaf(&mut tree, ROOT)?;
        tree.backup(ROOT, value);

        for i in 0..self.config.playouts {
            let leaf = tree.select_leaf()?;
            let value = self.evaluate_leaf(&mut tree, leaf)?;
            tree.backup(leaf, value);
            trace!("playout {i}: leaf {leaf} value {value:.3}");
        }

        debug!(
            "searched {} playouts, {} nodes, winrate {:?}",
            self.config.playouts,
            tree.len(),
            tree.root_winrate()
        );
        if log_enabled!(Level::Debug) {
            dump_children(&tree);
        }
        Ok(tree)
    }

    /// Value of a leaf from Black's side; expands it on first evaluation.
    ///
    /// Finished games are scored directly without calling the evaluator.
    fn evaluate_leaf(&mut self, tree: &mut SearchTree, id: NodeId) -> Result<f32, GameError> {
        let node = &tree.nodes[id];
        if node.engine.done() {
            return Ok(terminal_value(&node.engine));
        }

        let eval = self.evaluator.evaluate(&node.engine);
        eval.validate(node.engine.action_space())?;
        if node.expanded {
            return Ok(eval.value);
        }

        let legal = node.engine.legal_move_indices();
        let mut priors = vec![0.0; eval.policy.len()];
        for &mv in &legal {
            priors[mv] = eval.policy[mv];
        }
        if id == ROOT {
            if let Some(dirichlet) = self.config.dirichlet {
                self.add_noise(&legal, &mut priors, dirichlet)?;
            }
        }

        let node = &mut tree.nodes[id];
        node.expanded = true;
        node.legal = legal;
        node.priors = priors;
        Ok(eval.value)
    }

    /// Blend Dirichlet noise into the priors of the legal moves.
    fn add_noise(
        &mut self,
        legal: &[usize],
        priors: &mut [f32],
        dirichlet: DirichletOptions,
    ) -> Result<(), GameError> {
        // Do not apply noise if there is only one action.
        if legal.len() < 2 {
            return Ok(());
        }
        let alpha = dirichlet.alpha_scale / legal.len() as f32;
        let noise: Vec<f32> = Dirichlet::new_with_size(alpha, legal.len())
            .map_err(|e| GameError::Config(format!("dirichlet noise: {e:?}")))?
            .sample(&mut self.noise_rng);
        if noise.iter().any(|n| !n.is_finite()) {
            warn!("dirichlet sample was not finite, keeping raw priors");
            return Ok(());
        }

        let e = dirichlet.epsilon;
        for (&mv, n) in legal.iter().zip(noise) {
            priors[mv] = (1.0 - e) * priors[mv] + e * n;
        }
        Ok(())
    }

    /// Choose the move to play from a finished search.
    ///
    /// The most visited root move wins, ties broken uniformly at random.
    /// During the first `temperature_moves` plays the move is instead
    /// sampled in proportion to visits.
    pub fn decide(&mut self, tree: &SearchTree) -> Result<Action, GameError> {
        let root = tree.root();
        let visits = tree.root_visits();
        if visits.is_empty() {
            return Err(GameError::GameOver);
        }

        let total: u64 = visits.iter().map(|&(_, v)| v as u64).sum();
        let mv = if root.engine.move_count() < self.config.temperature_moves && total > 0 {
            let target = self.rng.u64(1..=total);
            let mut counter = 0;
            visits
                .iter()
                .find(|&&(_, v)| {
                    counter += v as u64;
                    counter >= target
                })
                .map(|&(mv, _)| mv)
                .unwrap_or(visits[visits.len() - 1].0)
        } else {
            let max = visits.iter().map(|&(_, v)| v).max().unwrap_or(0);
            let best: Vec<usize> = visits
                .iter()
                .filter(|&&(_, v)| v == max)
                .map(|&(mv, _)| mv)
                .collect();
            best[self.rng.usize(..best.len())]
        };

        let engine = &root.engine;
        Ok(Action::from_index(engine.color_to_move(), mv, engine.board_size()))
    }

    /// Search `engine` and return the chosen action.
    pub fn choose(&mut self, engine: &RulesEngine) -> Result<Action, GameError> {
        let tree = self.search(engine)?;
        self.decide(&tree)
    }
}

/// Log the visited root children.
pub fn dump_children(tree: &SearchTree) {
    let root = tree.root();
    let size = root.engine.board_size();
    for &mv in &root.legal {
        let Some(c) = root.child(mv) else { continue };
        let child = tree.node(c);
        let action = Action::from_index(root.engine.color_to_move(), mv, size);
        debug!(
            "move {} v={} q={:.3} p={:.3}",
            format_action(&action, size),
            child.visits,
            child.mean_value().unwrap_or(0.0),
            root.priors[mv]
        );
    }
}
