//! Search budgets and time management.
//!
//! Stopping is cooperative: the driver polls [`Budget::should_stop`] at the
//! top of every iteration and nothing interrupts an iteration in flight.

use std::time::{Duration, Instant};

use crate::config::SearchConfig;

/// What ends the search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchLimits {
    Unlimited,
    /// Wall-clock bounded. The soft deadline stretches or shrinks with
    /// root best-move churn; the hard deadline is absolute.
    MoveTime { soft: Duration, hard: Duration },
    Nodes(u64),
    Iterations(u64),
}

impl SearchLimits {
    /// Plain time budget: soft at the nominal time, hard at twice it.
    pub fn move_time(nominal: Duration) -> Self {
        SearchLimits::MoveTime {
            soft: nominal,
            hard: nominal * 2,
        }
    }
}

/// Scale factor for the soft deadline given how often the root's best move
/// changed versus how often record-breaks are expected among `visits`
/// samples (roughly ln visits). More churn than expected means the position
/// is unsettled and deserves more time.
pub fn churn_scale(best_changes: u64, visits: u64, coeff: f32) -> f32 {
    let expected = (visits.max(2) as f32).ln();
    (coeff * best_changes as f32 / expected).clamp(0.2, 2.0)
}

/// Live budget state for one search call.
pub struct Budget {
    limits: SearchLimits,
    start: Instant,
    best_changes: u64,
    churn_coeff: f32,
    progress_interval: Duration,
    last_progress: Instant,
}

impl Budget {
    pub fn new(limits: SearchLimits, config: &SearchConfig) -> Self {
        let now = Instant::now();
        Budget {
            limits,
            start: now,
            best_changes: 0,
            churn_coeff: config.churn_time_scale,
            progress_interval: Duration::from_millis(config.progress_interval_ms),
            last_progress: now,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Note that the root's best move flipped.
    pub fn record_best_change(&mut self) {
        self.best_changes += 1;
    }

    /// The soft deadline after churn scaling, never past the hard one.
    pub fn soft_deadline(&self, root_visits: u64) -> Option<Duration> {
        match self.limits {
            SearchLimits::MoveTime { soft, hard } => {
                let scale = churn_scale(self.best_changes, root_visits, self.churn_coeff);
                Some(soft.mul_f32(scale).min(hard))
            }
            _ => None,
        }
    }

    /// Budget check at the top of each iteration.
    pub fn should_stop(&self, iterations: u64, nodes: u64, root_visits: u64) -> bool {
        match self.limits {
            SearchLimits::Unlimited => false,
            SearchLimits::Nodes(max) => nodes >= max,
            SearchLimits::Iterations(max) => iterations >= max,
            SearchLimits::MoveTime { hard, .. } => {
                let elapsed = self.start.elapsed();
                if elapsed >= hard {
                    return true;
                }
                match self.soft_deadline(root_visits) {
                    Some(soft) => elapsed >= soft,
                    None => false,
                }
            }
        }
    }

    /// True roughly once per configured interval; used for info output.
    pub fn should_report(&mut self) -> bool {
        if self.last_progress.elapsed() >= self.progress_interval {
            self.last_progress = Instant::now();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
#[path = "limits_tests.rs"]
mod limits_tests;
