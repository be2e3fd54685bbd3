//! Endgame oracle contract.
//!
//! Table content and probing mechanics live outside this crate; the search
//! only needs the call shape. A probe runs before each playout, and at the
//! root a forced move short-circuits the search entirely.

use magpie_core::{Move, Position};

/// Outcome of an oracle probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Probe {
    /// Exact game-theoretic value in [-1, 1] from the side to move's
    /// perspective.
    Value(f32),
    /// The oracle dictates this move; only meaningful at the root.
    ForcedMove(Move),
}

pub trait EndgameOracle {
    /// `None` when the position is outside the oracle's coverage.
    fn probe(&self, pos: &Position) -> Option<Probe>;
}

/// Oracle that knows nothing; the default collaborator.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOracle;

impl EndgameOracle for NoOracle {
    fn probe(&self, _pos: &Position) -> Option<Probe> {
        None
    }
}
