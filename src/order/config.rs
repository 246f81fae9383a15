//! Configuration of the ordering engine.

use crate::types::CostFunction;
use serde::{Deserialize, Serialize};

/// Configuration for one ordering run.
///
/// The defaults give a deterministic, purely greedy min-fill run with no
/// cutoffs: ties break by vertex index and the seeded generator is never
/// consulted. Randomized tie-breaking for multi-start searches is enabled by
/// raising [`n_random_pick`](Self::n_random_pick) and/or
/// [`e_random_pick`](Self::e_random_pick).
///
/// # Example
///
/// ```
/// use elimorder::order::OrderingConfig;
/// use elimorder::types::CostFunction;
///
/// let config = OrderingConfig::default()
///     .with_cost(CostFunction::MinDegree)
///     .with_seed(7)
///     .with_random_pick(4, 0.5);
/// assert_eq!(config.cost, CostFunction::MinDegree);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderingConfig {
    /// Cost function ranking General candidates.
    pub cost: CostFunction,
    /// Abort once a pick's degree would exceed this width; 0 disables.
    pub width_limit: usize,
    /// Whether to honor `width_limit`.
    pub early_terminate_on_width: bool,
    /// Abort once the cumulative elimination complexity (log10) would exceed
    /// this; `f64::INFINITY` disables.
    pub complexity_limit_log10: f64,
    /// Whether to honor `complexity_limit_log10`.
    pub early_terminate_on_complexity: bool,
    /// Return the partial order as soon as both easy buckets are empty.
    /// Typically used to seed large randomized searches.
    pub quit_after_easy_done: bool,
    /// A General vertex with degree at most this is picked immediately,
    /// regardless of cost; 0 disables.
    pub easy_width: usize,
    /// Sample size among the best candidates; values ≤ 1 mean pure greedy.
    pub n_random_pick: usize,
    /// Additive cost slack admitting a candidate into the tie-break pool.
    pub e_random_pick: f64,
    /// Seed of the engine's random generator.
    pub seed: u64,
    /// Variables forced to the tail of the order; at most one is supported.
    pub ignored: Vec<usize>,
    /// Optional cap on the total number of adjacency records (two per edge);
    /// exhausting it aborts the run with a fatal in-band outcome.
    pub edge_budget: Option<usize>,
    /// Initial capacity of the per-iteration fill-edge scratch buffers.
    pub fill_scratch_capacity: usize,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            cost: CostFunction::MinFill,
            width_limit: 0,
            early_terminate_on_width: false,
            complexity_limit_log10: f64::INFINITY,
            early_terminate_on_complexity: false,
            quit_after_easy_done: false,
            easy_width: 0,
            n_random_pick: 1,
            e_random_pick: 0.0,
            seed: 0,
            ignored: Vec::new(),
            edge_budget: None,
            fill_scratch_capacity: 4096,
        }
    }
}

impl OrderingConfig {
    /// Set the cost function.
    pub fn with_cost(mut self, cost: CostFunction) -> Self {
        self.cost = cost;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable the width cutoff.
    pub fn with_width_limit(mut self, width_limit: usize) -> Self {
        self.width_limit = width_limit;
        self.early_terminate_on_width = width_limit > 0;
        self
    }

    /// Enable the cumulative complexity cutoff (log10).
    pub fn with_complexity_limit(mut self, limit_log10: f64) -> Self {
        self.complexity_limit_log10 = limit_log10;
        self.early_terminate_on_complexity = limit_log10.is_finite();
        self
    }

    /// Enable randomized tie-breaking among near-best candidates.
    pub fn with_random_pick(mut self, n_random_pick: usize, e_random_pick: f64) -> Self {
        self.n_random_pick = n_random_pick;
        self.e_random_pick = e_random_pick;
        self
    }

    /// Force a variable to the tail of the order.
    pub fn with_ignored(mut self, variable: usize) -> Self {
        self.ignored = vec![variable];
        self
    }

    /// True when the tie-break pool is sampled rather than scanned greedily.
    pub(crate) fn randomized(&self) -> bool {
        self.n_random_pick > 1 || self.e_random_pick > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_pure_greedy_min_fill() {
        let config = OrderingConfig::default();
        assert_eq!(config.cost, CostFunction::MinFill);
        assert!(!config.randomized());
        assert!(!config.early_terminate_on_width);
        assert!(!config.early_terminate_on_complexity);
        assert!(config.ignored.is_empty());
    }

    #[test]
    fn test_with_width_limit_enables_cutoff() {
        let config = OrderingConfig::default().with_width_limit(12);
        assert_eq!(config.width_limit, 12);
        assert!(config.early_terminate_on_width);
    }

    #[test]
    fn test_randomized_flag() {
        assert!(OrderingConfig::default().with_random_pick(4, 0.0).randomized());
        assert!(OrderingConfig::default().with_random_pick(1, 0.5).randomized());
        assert!(!OrderingConfig::default().with_random_pick(1, 0.0).randomized());
    }

    #[test]
    fn test_serde_round_trip() {
        // serde_json cannot represent the infinite default complexity limit,
        // so the round trip uses a finite one.
        let config = OrderingConfig::default()
            .with_cost(CostFunction::MinComplexity)
            .with_seed(42)
            .with_width_limit(9)
            .with_complexity_limit(20.0);
        let json = serde_json::to_string(&config).unwrap();
        let back: OrderingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.cost, config.cost);
        assert_eq!(back.seed, config.seed);
        assert_eq!(back.width_limit, config.width_limit);
        assert_eq!(back.complexity_limit_log10, config.complexity_limit_log10);
    }
}
