//! Greedy ordering engine, cutoffs, post-passes, and multi-start search.

pub mod config;
pub mod engine;
pub mod lower_bound;
pub mod redundancy;
pub mod search;

pub use config::OrderingConfig;
pub use engine::{compute_elimination_order, OrderingEngine};
pub use lower_bound::induced_width_lower_bound;
pub use redundancy::remove_redundant_fill_edges;
pub use search::find_best_order;
