//! The search driver: selection, expansion, evaluation, backpropagation.
//!
//! Single-threaded and synchronous. One iteration runs the four phases in
//! sequence; the budget is polled between iterations only. Independent
//! `Searcher` instances share nothing and may run on separate threads.

use log::debug;
use magpie_core::{Move, MoveList, Position, legal_moves};

use crate::config::SearchConfig;
use crate::eval::{Evaluator, cp_to_value, value_to_cp};
use crate::limits::{Budget, SearchLimits};
use crate::oracle::{EndgameOracle, NoOracle, Probe};
use crate::tree::{Edge, NONE, Tree};
use crate::tt::{TranspositionCache, UNEVALUATED};

/// Outcome of one `search` call.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// `None` only when the root has no legal moves.
    pub best_move: Option<Move>,
    /// Root value in [-1, 1] from the side to move's perspective.
    pub value: f32,
    /// The same value, decompressed to centipawns.
    pub score_cp: i32,
    pub iterations: u64,
    pub nodes: u64,
    pub pv: Vec<Move>,
    /// True when a wall-clock deadline cut the search short.
    pub stopped: bool,
}

/// Snapshot handed to the progress callback.
#[derive(Debug)]
pub struct SearchProgress<'a> {
    pub iterations: u64,
    pub nodes: u64,
    pub score_cp: i32,
    pub pv: &'a [Move],
    pub elapsed_ms: u128,
}

const MAX_PV: usize = 16;

pub struct Searcher<'a, E: Evaluator> {
    config: &'a SearchConfig,
    root_pos: Position,
    tree: Tree,
    tt: TranspositionCache,
    evaluator: E,
    oracle: Box<dyn EndgameOracle>,
}

impl<'a, E: Evaluator> Searcher<'a, E> {
    pub fn new(pos: Position, mut evaluator: E, config: &'a SearchConfig) -> Self {
        evaluator.refresh(&pos);
        Searcher {
            config,
            tree: Tree::new(config.tree_memory_mib, pos.hash()),
            tt: TranspositionCache::new_mib(config.tt_memory_mib),
            root_pos: pos,
            evaluator,
            oracle: Box::new(NoOracle),
        }
    }

    pub fn with_oracle(mut self, oracle: Box<dyn EndgameOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn position(&self) -> &Position {
        &self.root_pos
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn tree_bytes(&self) -> usize {
        self.tree.bytes()
    }

    /// Replace the game position and drop all search state tied to it.
    pub fn set_position(&mut self, pos: Position) {
        self.tree.reset(pos.hash());
        self.evaluator.refresh(&pos);
        self.root_pos = pos;
    }

    /// Forget everything, including cached evaluations.
    pub fn new_game(&mut self) {
        self.tree.reset(self.root_pos.hash());
        self.tt.clear();
        self.evaluator.refresh(&self.root_pos);
    }

    /// Play `mv` on the game position and keep the matching subtree as the
    /// new root. Without a live subtree the tree restarts from scratch.
    pub fn advance(&mut self, mv: Move) {
        let kept = self.tree.advance_root(mv);
        self.root_pos.apply_move(mv);
        if !kept {
            self.tree.reset(self.root_pos.hash());
        }
        self.evaluator.refresh(&self.root_pos);
    }

    pub fn search(&mut self, limits: SearchLimits) -> SearchResult {
        self.search_with_progress(limits, &mut |_| {})
    }

    pub fn search_with_progress(
        &mut self,
        limits: SearchLimits,
        progress: &mut dyn FnMut(&SearchProgress),
    ) -> SearchResult {
        let mut budget = Budget::new(limits, self.config);
        let mut iterations = 0u64;
        let mut nodes = 0u64;
        let mut stopped = false;

        if !self.ensure_root_expanded() {
            // No legal moves: report the game-theoretic value and no move.
            let value = self
                .tree
                .node(self.tree.root())
                .terminal
                .unwrap_or(0.0);
            return SearchResult {
                best_move: None,
                value,
                score_cp: value_to_cp(value, self.config.cp_scale),
                iterations: 0,
                nodes: 0,
                pv: Vec::new(),
                stopped: false,
            };
        }

        if let Some(Probe::ForcedMove(mv)) = self.oracle.probe(&self.root_pos) {
            debug!("oracle forces {mv:?} at the root");
            return SearchResult {
                best_move: Some(mv),
                value: 0.0,
                score_cp: 0,
                iterations: 0,
                nodes: 0,
                pv: vec![mv],
                stopped: false,
            };
        }

        let mut prev_best = self.best_root_edge();
        loop {
            let root_visits = self.tree.node(self.tree.root()).visits as u64;
            if budget.should_stop(iterations, nodes, root_visits) {
                stopped = matches!(limits, SearchLimits::MoveTime { .. });
                break;
            }

            nodes += self.iterate();
            iterations += 1;

            let best = self.best_root_edge();
            if best != prev_best {
                budget.record_best_change();
                prev_best = best;
            }

            if budget.should_report() {
                let pv = self.principal_line();
                let value = self.root_value();
                progress(&SearchProgress {
                    iterations,
                    nodes,
                    score_cp: value_to_cp(value, self.config.cp_scale),
                    pv: &pv,
                    elapsed_ms: budget.elapsed().as_millis(),
                });
            }
        }

        let value = self.root_value();
        SearchResult {
            best_move: self.best_root_edge().map(|i| {
                self.tree.node(self.tree.root()).edges[i as usize].mv
            }),
            value,
            score_cp: value_to_cp(value, self.config.cp_scale),
            iterations,
            nodes,
            pv: self.principal_line(),
            stopped,
        }
    }

    // ---------------------------------------------------------------------
    // One iteration
    // ---------------------------------------------------------------------

    /// Run one select/expand/evaluate/backprop cycle. Returns the number of
    /// positions visited.
    fn iterate(&mut self) -> u64 {
        let root = self.tree.root();
        let mut pos = self.root_pos;
        let mut path: Vec<(u32, u16)> = Vec::with_capacity(64);
        let mut pushes = 0usize;
        let mut current = root;
        self.tree.move_to_head(root);
        self.tree.node_mut(root).pinned = true;

        let (leaf_value, forced) = loop {
            if let Some(tv) = self.tree.node(current).terminal {
                break (tv, true);
            }
            // Repetition and fifty-move draws depend on the path taken, so
            // they score as draw leaves without marking the node terminal.
            if current != root && (pos.is_repetition() || pos.fifty_move_draw()) {
                break (0.0, false);
            }
            if !self.tree.node(current).is_expanded() {
                if let Some(tv) = self.expand(current, &pos) {
                    break (tv, true);
                }
            }

            let edge_i = self.select_edge(current, current == root);
            path.push((current, edge_i as u16));
            let (mv, child) = {
                let edge = self.tree.node(current).edges[edge_i];
                (edge.mv, edge.child)
            };
            self.evaluator.push(&pos, mv);
            pushes += 1;
            pos.apply_move(mv);

            if child == NONE {
                let leaf = self.tree.push_node(pos.hash(), current, edge_i as u16);
                self.tree.node_mut(leaf).pinned = true;
                break (self.evaluate_leaf(&pos), false);
            }
            current = child;
            self.tree.move_to_head(current);
            self.tree.node_mut(current).pinned = true;
        };

        self.backpropagate(&path, leaf_value, forced);

        for _ in 0..pushes {
            self.evaluator.pop();
        }
        self.tree.node_mut(root).pinned = false;
        for &(node, edge_i) in &path {
            self.tree.node_mut(node).pinned = false;
            let child = self.tree.node(node).edges[edge_i as usize].child;
            if child != NONE {
                self.tree.node_mut(child).pinned = false;
            }
        }
        pushes as u64
    }

    /// Expand `node` with the legal moves of `pos`. Returns the terminal
    /// value when there are none.
    fn expand(&mut self, node: u32, pos: &Position) -> Option<f32> {
        let mut moves = MoveList::new();
        legal_moves(pos, &mut moves);
        if moves.is_empty() {
            // Checkmate is a loss for the side to move, stalemate a draw.
            let tv = if pos.in_check() { -1.0 } else { 0.0 };
            self.tree.node_mut(node).terminal = Some(tv);
            return Some(tv);
        }
        let edges: Vec<Edge> = moves.iter().copied().map(Edge::new).collect();
        self.tree.set_edges(node, edges);
        None
    }

    /// Value of a freshly created leaf, from its side to move's
    /// perspective: oracle first, then cache, then the evaluator.
    fn evaluate_leaf(&mut self, pos: &Position) -> f32 {
        if pos.is_repetition() || pos.fifty_move_draw() {
            return 0.0;
        }
        if let Some(Probe::Value(v)) = self.oracle.probe(pos) {
            return v;
        }
        if let Some(v) = self.tt.probe(pos.hash()) {
            return v;
        }
        let cp = self.evaluator.evaluate(pos.side_to_move());
        let v = cp_to_value(cp, self.config.cp_scale);
        self.tt.store(pos.hash(), v);
        v
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    /// Pick the next edge out of `node`, first maximal edge winning.
    fn select_edge(&self, node_idx: u32, is_root: bool) -> usize {
        let node = self.tree.node(node_idx);
        debug_assert!(!node.edges.is_empty(), "selection on an edgeless node");

        let parent_visits = node.visits.max(1) as f32;
        let ln_p = parent_visits.ln();
        let c = if is_root {
            self.config.exploration_root
        } else {
            self.config.exploration
        };
        let expl_term = ln_p * ln_p.sqrt() * c;

        let mut best = 0usize;
        let mut best_priority = f32::NEG_INFINITY;
        for (i, edge) in node.edges.iter().enumerate() {
            let priority = self.edge_priority(node_idx, edge, expl_term, parent_visits);
            if priority > best_priority {
                best_priority = priority;
                best = i;
            }
        }
        best
    }

    fn edge_priority(&self, node_idx: u32, edge: &Edge, expl_term: f32, parent_visits: f32) -> f32 {
        let (child_visits, estimate) = if edge.child != NONE {
            let child = self.tree.node(edge.child);
            let est = if child.iterations > 0 {
                child.avg_value
            } else {
                edge.value
            };
            (child.visits, est)
        } else if edge.evicted && edge.value != UNEVALUATED {
            // The subtree is gone but its last estimate survives on the
            // edge; pretend it had a few visits so it is not treated as
            // brand new.
            (self.config.evicted_prior_visits, edge.value)
        } else {
            return f32::INFINITY;
        };
        if child_visits == 0 || estimate == UNEVALUATED {
            return f32::INFINITY;
        }

        let boost = self.exploration_boost(node_idx, edge, parent_visits, child_visits);
        -estimate + boost * expl_term / (child_visits as f32).sqrt()
    }

    /// Variance-derived exploration multiplier in [1, 2], blended in over
    /// the configured horizon and doubled when the child's statistics are
    /// stale relative to the parent's.
    fn exploration_boost(
        &self,
        node_idx: u32,
        edge: &Edge,
        parent_visits: f32,
        child_visits: u32,
    ) -> f32 {
        let node = self.tree.node(node_idx);
        let variance = if edge.child != NONE {
            self.tree.node(edge.child).variance()
        } else {
            node.variance()
        };
        let var_factor = (1.0 + 2.0 * variance.sqrt()).min(2.0);
        let blend = (node.iterations as f32 / self.config.boost_horizon as f32).min(1.0);
        let mut boost = 1.0 + blend * (var_factor - 1.0);
        if parent_visits > self.config.stale_visit_ratio * child_visits as f32 {
            boost *= 2.0;
        }
        boost
    }

    // ---------------------------------------------------------------------
    // Backpropagation
    // ---------------------------------------------------------------------

    /// Walk the recorded path leaf-to-root folding `value` in, negating per
    /// ply. Once an ancestor's best child is unaffected and the step is not
    /// forced, the climb downgrades to visit increments only, except for the
    /// final step into the root.
    fn backpropagate(&mut self, path: &[(u32, u16)], mut value: f32, terminal: bool) {
        let root = self.tree.root();
        let mut full = true;
        for &(node_idx, edge_i) in path.iter().rev() {
            let child = self.tree.node(node_idx).edges[edge_i as usize].child;
            debug_assert!(child != NONE, "backprop across an unlinked edge");
            // The step into the root is always processed in full so the
            // root's edge values stay authoritative.
            if !full && node_idx != root {
                self.tree.node_mut(child).visits += 1;
                value = -value;
                continue;
            }

            let prev_best = self.best_edge(node_idx);
            let iterations = self.tree.node(child).iterations as f32;
            let base_weight = 1.0 / (iterations + 1.0);
            let confirm = base_weight.max(self.config.confirm_weight_floor);

            // Floors differ so an overturning result takes hold faster.
            let cur = self.tree.node(child).avg_value;
            let tentative = cur + confirm * (value - cur);
            let overturns = self.best_edge_with(node_idx, edge_i, tentative) != prev_best;
            let weight = if overturns {
                base_weight.max(self.config.overturn_weight_floor)
            } else {
                confirm
            };

            {
                let c = self.tree.node_mut(child);
                c.apply_update(value, weight);
                c.visits += 1;
            }
            let new_value = self.tree.node(child).avg_value;
            let hash = self.tree.node(child).hash;
            self.tree.node_mut(node_idx).edges[edge_i as usize].value = new_value;
            self.tt.store(hash, new_value);

            let best_changed = self.best_edge(node_idx) != prev_best;
            if !best_changed && !terminal {
                full = false;
            }
            value = -value;
        }
        self.tree.node_mut(root).visits += 1;
    }

    /// Best edge of `node` from its own perspective, `None` before any
    /// edge has a value.
    fn best_edge(&self, node_idx: u32) -> Option<u16> {
        let mut best = None;
        let mut best_v = f32::NEG_INFINITY;
        for (i, edge) in self.tree.node(node_idx).edges.iter().enumerate() {
            if edge.value != UNEVALUATED && -edge.value > best_v {
                best_v = -edge.value;
                best = Some(i as u16);
            }
        }
        best
    }

    /// [`Self::best_edge`] with edge `edge_i`'s value replaced by
    /// `candidate`.
    fn best_edge_with(&self, node_idx: u32, edge_i: u16, candidate: f32) -> Option<u16> {
        let mut best = None;
        let mut best_v = f32::NEG_INFINITY;
        for (i, edge) in self.tree.node(node_idx).edges.iter().enumerate() {
            let value = if i as u16 == edge_i {
                candidate
            } else {
                edge.value
            };
            if value != UNEVALUATED && -value > best_v {
                best_v = -value;
                best = Some(i as u16);
            }
        }
        best
    }

    // ---------------------------------------------------------------------
    // Results
    // ---------------------------------------------------------------------

    fn ensure_root_expanded(&mut self) -> bool {
        let root = self.tree.root();
        if !self.tree.node(root).is_expanded() {
            let pos = self.root_pos;
            self.expand(root, &pos);
        }
        self.tree.node(root).terminal.is_none()
    }

    /// Root best edge: most-visited child, edge value as the tie-break.
    /// Falls back to the first edge when nothing has been evaluated yet
    /// (a zero budget must still yield a legal move).
    fn best_root_edge(&self) -> Option<u16> {
        let root = self.tree.root();
        let mut best = None;
        let mut best_key = (0u32, f32::NEG_INFINITY);
        for (i, edge) in self.tree.node(root).edges.iter().enumerate() {
            if edge.value == UNEVALUATED {
                continue;
            }
            let visits = if edge.child != NONE {
                self.tree.node(edge.child).visits
            } else {
                0
            };
            let key = (visits, -edge.value);
            if best.is_none() || key.0 > best_key.0 || (key.0 == best_key.0 && key.1 > best_key.1)
            {
                best_key = key;
                best = Some(i as u16);
            }
        }
        if best.is_none() && !self.tree.node(root).edges.is_empty() {
            return Some(0);
        }
        best
    }

    fn root_value(&self) -> f32 {
        match self.best_root_edge() {
            Some(i) => {
                let value = self.tree.node(self.tree.root()).edges[i as usize].value;
                if value == UNEVALUATED { 0.0 } else { -value }
            }
            None => 0.0,
        }
    }

    fn principal_line(&self) -> Vec<Move> {
        let mut pv = Vec::new();
        let mut node_idx = self.tree.root();
        while pv.len() < MAX_PV {
            let best = if node_idx == self.tree.root() {
                self.best_root_edge()
            } else {
                self.best_edge(node_idx)
            };
            let Some(i) = best else { break };
            let edge = self.tree.node(node_idx).edges[i as usize];
            pv.push(edge.mv);
            if edge.child == NONE {
                break;
            }
            node_idx = edge.child;
            if !self.tree.node(node_idx).is_expanded() {
                break;
            }
        }
        pv
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod search_tests;
