pub mod config;
pub mod eval;
pub mod limits;
pub mod oracle;
pub mod search;
pub mod tree;
pub mod tt;

pub use config::{ConfigError, SearchConfig};
pub use eval::{Evaluator, MaterialEvaluator, cp_to_value, value_to_cp};
pub use limits::SearchLimits;
pub use oracle::{EndgameOracle, Probe};
pub use search::{SearchProgress, SearchResult, Searcher};
