//! Arena-backed search tree with a memory ceiling.
//!
//! Nodes live in one contiguous `Vec` and reference each other by `u32`
//! handle. The budget is enforced two ways: when a push would exceed it,
//! the least-recently-touched node is evicted and its slot recycled; when
//! the root advances to a child after a real move, a mark-compact pass
//! drops everything unreachable and shrinks the arena to the live count.

use magpie_core::Move;

use crate::tt::UNEVALUATED;

/// Null handle.
pub const NONE: u32 = u32::MAX;

/// One legal move out of a node, with the current estimate of the position
/// behind it (from the mover's opponent's perspective, [`UNEVALUATED`]
/// before the first backup).
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub mv: Move,
    pub value: f32,
    pub child: u32,
    /// The child subtree existed once and was evicted. Kept off `Move`
    /// so the move encoding stays a pure move.
    pub evicted: bool,
}

impl Edge {
    pub fn new(mv: Move) -> Self {
        Edge {
            mv,
            value: UNEVALUATED,
            child: NONE,
            evicted: false,
        }
    }
}

#[derive(Debug)]
pub struct Node {
    pub hash: u64,
    pub parent: u32,
    /// Index of the edge in `parent` that owns this node.
    pub parent_edge: u16,
    /// Empty until expansion; an expanded node has one edge per legal move.
    pub edges: Vec<Edge>,
    pub visits: u32,
    /// Backup count driving the weighted-average schedule.
    pub iterations: u32,
    pub avg_value: f32,
    /// Running average of squared backed-up values, for variance.
    pub avg_sq: f32,
    /// Fixed game-theoretic value when no legal moves exist.
    pub terminal: Option<f32>,
    /// Nodes on the path currently under exploration are exempt from
    /// eviction.
    pub pinned: bool,
    lru_prev: u32,
    lru_next: u32,
    // Mark-compact scratch.
    marked: bool,
    forward: u32,
}

impl Node {
    fn new(hash: u64, parent: u32, parent_edge: u16) -> Self {
        Node {
            hash,
            parent,
            parent_edge,
            edges: Vec::new(),
            visits: 1,
            iterations: 0,
            avg_value: 0.0,
            avg_sq: 0.0,
            terminal: None,
            pinned: false,
            lru_prev: NONE,
            lru_next: NONE,
            marked: false,
            forward: NONE,
        }
    }

    pub fn is_expanded(&self) -> bool {
        !self.edges.is_empty() || self.terminal.is_some()
    }

    /// Running value variance of backups through this node.
    pub fn variance(&self) -> f32 {
        (self.avg_sq - self.avg_value * self.avg_value).max(0.0)
    }

    /// Fold one backed-up value into the running averages.
    pub fn apply_update(&mut self, value: f32, weight: f32) {
        self.iterations += 1;
        self.avg_value += weight * (value - self.avg_value);
        self.avg_sq += weight * (value * value - self.avg_sq);
    }

    fn bytes(&self) -> usize {
        std::mem::size_of::<Node>() + self.edges.len() * std::mem::size_of::<Edge>()
    }
}

pub struct Tree {
    nodes: Vec<Node>,
    root: u32,
    lru_head: u32,
    lru_tail: u32,
    /// Evicted slots awaiting recycling.
    free: Vec<u32>,
    bytes: usize,
    limit: usize,
}

impl Tree {
    pub fn new(limit_mib: usize, root_hash: u64) -> Self {
        let mut tree = Tree {
            nodes: Vec::new(),
            root: NONE,
            lru_head: NONE,
            lru_tail: NONE,
            free: Vec::new(),
            bytes: 0,
            limit: limit_mib.max(1) * 1024 * 1024,
        };
        tree.reset(root_hash);
        tree
    }

    /// Throw the whole tree away and start over from a bare root.
    pub fn reset(&mut self, root_hash: u64) {
        self.nodes.clear();
        self.free.clear();
        self.nodes.push(Node::new(root_hash, NONE, 0));
        self.root = 0;
        self.lru_head = 0;
        self.lru_tail = 0;
        self.bytes = std::mem::size_of::<Node>();
    }

    #[inline]
    pub fn root(&self) -> u32 {
        self.root
    }

    #[inline]
    pub fn node(&self, idx: u32) -> &Node {
        &self.nodes[idx as usize]
    }

    #[inline]
    pub fn node_mut(&mut self, idx: u32) -> &mut Node {
        &mut self.nodes[idx as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn bytes(&self) -> usize {
        self.bytes
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    // ---------------------------------------------------------------------
    // LRU list
    // ---------------------------------------------------------------------

    fn lru_unlink(&mut self, idx: u32) {
        let (prev, next) = {
            let n = self.node(idx);
            (n.lru_prev, n.lru_next)
        };
        if prev != NONE {
            self.node_mut(prev).lru_next = next;
        } else {
            self.lru_head = next;
        }
        if next != NONE {
            self.node_mut(next).lru_prev = prev;
        } else {
            self.lru_tail = prev;
        }
        let n = self.node_mut(idx);
        n.lru_prev = NONE;
        n.lru_next = NONE;
    }

    fn lru_push_front(&mut self, idx: u32) {
        let old_head = self.lru_head;
        {
            let n = self.node_mut(idx);
            n.lru_prev = NONE;
            n.lru_next = old_head;
        }
        if old_head != NONE {
            self.node_mut(old_head).lru_prev = idx;
        } else {
            self.lru_tail = idx;
        }
        self.lru_head = idx;
    }

    /// Record a touch. Must be called every time descent visits a node.
    pub fn move_to_head(&mut self, idx: u32) {
        if self.lru_head == idx {
            return;
        }
        self.lru_unlink(idx);
        self.lru_push_front(idx);
    }

    // ---------------------------------------------------------------------
    // Allocation and eviction
    // ---------------------------------------------------------------------

    /// Allocate a node for `parent`'s edge `parent_edge`, recycling the LRU
    /// tail when the budget would be exceeded. Links the edge to the new
    /// node and returns its handle.
    pub fn push_node(&mut self, hash: u64, parent: u32, parent_edge: u16) -> u32 {
        let base = std::mem::size_of::<Node>();
        while self.bytes + base > self.limit {
            match self.find_victim() {
                Some(victim) => self.evict(victim),
                // Everything left is the root or pinned; an over-budget
                // push beats corrupting the active path.
                None => break,
            }
        }

        let node = Node::new(hash, parent, parent_edge);
        let idx = if let Some(slot) = self.free.pop() {
            self.nodes[slot as usize] = node;
            slot
        } else {
            let idx = self.nodes.len() as u32;
            self.nodes.push(node);
            idx
        };
        self.bytes += base;
        self.lru_push_front(idx);

        let edge = &mut self.node_mut(parent).edges[parent_edge as usize];
        edge.child = idx;
        edge.evicted = false;
        idx
    }

    /// Attach the expanded edge set to `idx` and account for it.
    pub fn set_edges(&mut self, idx: u32, edges: Vec<Edge>) {
        debug_assert!(self.node(idx).edges.is_empty(), "node expanded twice");
        self.bytes += edges.len() * std::mem::size_of::<Edge>();
        self.node_mut(idx).edges = edges;
    }

    fn find_victim(&self) -> Option<u32> {
        let mut idx = self.lru_tail;
        while idx != NONE {
            let n = self.node(idx);
            if idx != self.root && !n.pinned {
                return Some(idx);
            }
            idx = n.lru_prev;
        }
        None
    }

    /// Drop `victim` from the tree: orphan its children, flag its parent
    /// edge, release its bytes and LRU links. The slot itself stays for the
    /// caller to recycle.
    fn evict(&mut self, victim: u32) {
        debug_assert!(victim != self.root && !self.node(victim).pinned);

        let (parent, parent_edge, bytes) = {
            let n = self.node(victim);
            (n.parent, n.parent_edge, n.bytes())
        };
        for i in 0..self.node(victim).edges.len() {
            let child = self.node(victim).edges[i].child;
            if child != NONE {
                self.node_mut(child).parent = NONE;
            }
        }
        if parent != NONE {
            let edge = &mut self.node_mut(parent).edges[parent_edge as usize];
            edge.child = NONE;
            edge.evicted = true;
        }
        self.lru_unlink(victim);
        self.bytes -= bytes;
        self.node_mut(victim).edges = Vec::new();
        self.free.push(victim);
    }

    // ---------------------------------------------------------------------
    // Tree reuse
    // ---------------------------------------------------------------------

    /// Make the child behind the root edge for `mv` the new root, dropping
    /// the rest of the arena via mark-compact. The new root gives up its
    /// creation visit. Returns false when no live subtree exists for `mv`
    /// (caller starts a fresh tree).
    pub fn advance_root(&mut self, mv: Move) -> bool {
        let root = self.root;
        let child = self
            .node(root)
            .edges
            .iter()
            .find(|e| e.mv == mv)
            .map(|e| e.child);
        let new_root = match child {
            Some(idx) if idx != NONE => idx,
            _ => return false,
        };

        self.mark(new_root);
        self.assign_forwarding();
        self.relink(new_root);
        self.compact();
        self.free.clear();
        true
    }

    fn mark(&mut self, from: u32) {
        let mut stack = vec![from];
        while let Some(idx) = stack.pop() {
            let node = self.node_mut(idx);
            if node.marked {
                continue;
            }
            node.marked = true;
            for i in 0..self.node(idx).edges.len() {
                let child = self.node(idx).edges[i].child;
                if child != NONE {
                    stack.push(child);
                }
            }
        }
    }

    fn assign_forwarding(&mut self) {
        let mut next = 0u32;
        for node in &mut self.nodes {
            if node.marked {
                node.forward = next;
                next += 1;
            } else {
                node.forward = NONE;
            }
        }
    }

    fn relink(&mut self, new_root: u32) {
        // Collect the recency order of live nodes (old indices) before any
        // link is rewritten.
        let mut order = Vec::new();
        let mut idx = self.lru_head;
        while idx != NONE {
            if self.node(idx).marked {
                order.push(idx);
            }
            idx = self.node(idx).lru_next;
        }

        let mut bytes = 0usize;
        for i in 0..self.nodes.len() {
            if !self.nodes[i].marked {
                continue;
            }
            bytes += self.nodes[i].bytes();
            let parent = self.nodes[i].parent;
            self.nodes[i].parent = if i as u32 == new_root || parent == NONE {
                NONE
            } else {
                // A live node's parent is live unless it was orphaned by
                // eviction, in which case the link was already severed.
                debug_assert!(self.nodes[parent as usize].marked);
                self.nodes[parent as usize].forward
            };
            for j in 0..self.nodes[i].edges.len() {
                let child = self.nodes[i].edges[j].child;
                if child != NONE {
                    self.nodes[i].edges[j].child = self.nodes[child as usize].forward;
                }
            }
        }
        self.bytes = bytes;

        self.root = self.nodes[new_root as usize].forward;
        let root = self.root;
        self.nodes[new_root as usize].visits =
            self.nodes[new_root as usize].visits.saturating_sub(1);

        // Stitch the LRU list back together in forwarded coordinates,
        // writing through the still-valid old indices.
        self.lru_head = NONE;
        self.lru_tail = NONE;
        let mut prev_old = NONE;
        for &old in &order {
            let fwd = self.nodes[old as usize].forward;
            if prev_old == NONE {
                self.lru_head = fwd;
            } else {
                self.nodes[prev_old as usize].lru_next = fwd;
                self.nodes[old as usize].lru_prev = self.nodes[prev_old as usize].forward;
            }
            self.nodes[old as usize].lru_next = NONE;
            self.lru_tail = fwd;
            prev_old = old;
        }
        if let Some(&first) = order.first() {
            self.nodes[first as usize].lru_prev = NONE;
        }
        debug_assert!(root != NONE);
    }

    fn compact(&mut self) {
        let mut live = 0usize;
        for i in 0..self.nodes.len() {
            if self.nodes[i].marked {
                let fwd = self.nodes[i].forward as usize;
                self.nodes[i].marked = false;
                self.nodes[i].forward = NONE;
                if fwd != i {
                    self.nodes.swap(fwd, i);
                }
                live += 1;
            }
        }
        self.nodes.truncate(live);
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tree_tests;
