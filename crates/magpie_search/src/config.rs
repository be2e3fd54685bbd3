//! Search tuning parameters.
//!
//! One immutable [`SearchConfig`] is built up front and passed by reference
//! into the searcher; nothing reads tunables from global state.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Exploration constant applied at the root.
    pub exploration_root: f32,
    /// Exploration constant applied everywhere below the root.
    pub exploration: f32,
    /// Iteration count over which the exploration boost blends from 1.0
    /// toward its variance-derived value.
    pub boost_horizon: u32,
    /// When parent visits exceed this multiple of a child's visits, the
    /// child's estimate is considered stale and its boost doubles.
    pub stale_visit_ratio: f32,
    /// Weight floor used when a backed-up value confirms the current best
    /// child.
    pub confirm_weight_floor: f32,
    /// Weight floor used when a backed-up value overturns the best child.
    /// Larger than the confirm floor so fresh conclusions take hold faster.
    pub overturn_weight_floor: f32,
    /// Visit count assumed for an unvisited child whose previous subtree
    /// was evicted, so it is not re-explored as if brand new.
    pub evicted_prior_visits: u32,
    /// Memory budget for the node arena, in MiB.
    pub tree_memory_mib: usize,
    /// Memory budget for the transposition cache, in MiB.
    pub tt_memory_mib: usize,
    /// Centipawn scale of the tanh compression into [-1, 1].
    pub cp_scale: f32,
    /// Milliseconds between progress reports.
    pub progress_interval_ms: u64,
    /// How strongly root best-move churn stretches the soft time limit.
    pub churn_time_scale: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            exploration_root: 0.5,
            exploration: 0.25,
            boost_horizon: 2_000,
            stale_visit_ratio: 100.0,
            confirm_weight_floor: 0.02,
            overturn_weight_floor: 0.10,
            evicted_prior_visits: 8,
            tree_memory_mib: 256,
            tt_memory_mib: 64,
            cp_scale: 400.0,
            progress_interval_ms: 2_000,
            churn_time_scale: 1.0,
        }
    }
}

impl SearchConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
