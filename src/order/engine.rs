//! The greedy variable elimination ordering engine.
//!
//! The engine repeatedly selects a vertex, simulates its elimination on the
//! [`ElimGraph`], and reclassifies the vertices whose scores changed. Easy
//! picks (Trivial, then ZeroFill) are taken from their buckets in FIFO
//! order; only when both are empty does the engine search the General bucket
//! with the configured cost function. Cutoffs are checked at pick time and
//! reported in-band.

use crate::error::{ModelError, Result};
use crate::graph::elim_graph::ElimGraph;
use crate::graph::partition::CandidatePartition;
use crate::model::GraphicalModel;
use crate::order::config::OrderingConfig;
use crate::types::{log_sum_exp10, CostFunction, Outcome, OrderingResult};
use log::{debug, trace};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A single-use engine: one instance runs one ordering over one graph copy.
///
/// Outer randomized searches run independent instances with distinct seeds;
/// there is no shared mutable state between them.
///
/// # Example
///
/// ```
/// use elimorder::model::GraphicalModel;
/// use elimorder::order::{OrderingConfig, OrderingEngine};
///
/// let model = GraphicalModel::new(
///     vec![2; 4],
///     vec![vec![0, 1], vec![1, 2], vec![2, 3]],
/// ).unwrap();
/// let result = OrderingEngine::new(&model, OrderingConfig::default())
///     .unwrap()
///     .run();
/// assert!(result.outcome.is_completed());
/// assert_eq!(result.width, 1);
/// ```
pub struct OrderingEngine {
    graph: ElimGraph,
    partition: CandidatePartition,
    config: OrderingConfig,
    rng: StdRng,
}

impl OrderingEngine {
    /// Build the primal graph of `model`, classify every vertex, and seed
    /// the random generator.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidIgnored`] if the ignored list names a
    /// variable out of range or holds more than one entry.
    pub fn new(model: &GraphicalModel, config: OrderingConfig) -> Result<Self> {
        let n = model.num_variables();
        if config.ignored.len() > 1 {
            return Err(ModelError::InvalidIgnored(format!(
                "at most one ignored variable is supported, got {}",
                config.ignored.len()
            )));
        }
        if let Some(&v) = config.ignored.iter().find(|&&v| v >= n) {
            return Err(ModelError::InvalidIgnored(format!(
                "variable {} out of range for {} variables",
                v, n
            )));
        }
        let graph = ElimGraph::from_model(model, config.edge_budget, config.fill_scratch_capacity);
        let partition = CandidatePartition::new(&graph, &config.ignored);
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self {
            graph,
            partition,
            config,
            rng,
        })
    }

    /// Run the elimination loop to completion, cutoff, or pool exhaustion.
    pub fn run(mut self) -> OrderingResult {
        let n = self.graph.num_vertices();
        let selectable = n - self.config.ignored.len();
        let mut order = Vec::with_capacity(n);
        let mut fill_edges = Vec::new();
        let mut changed: Vec<u32> = Vec::new();
        let mut width = 0usize;
        let mut complexity = f64::NEG_INFINITY;
        let mut max_single = f64::NEG_INFINITY;
        let mut storage = f64::NEG_INFINITY;
        let mut outcome = Outcome::Completed;
        let mut iteration = 0i32;

        while order.len() < selectable {
            let pick = if let Some(v) = self.partition.pop_trivial() {
                v
            } else if let Some(v) = self.partition.pop_zero_fill() {
                v
            } else if self.config.quit_after_easy_done {
                break;
            } else {
                let v = self.pick_general();
                self.partition.take_general(v);
                v
            };

            let degree = self.graph.degree(pick);
            if self.config.early_terminate_on_width
                && self.config.width_limit > 0
                && degree > self.config.width_limit
            {
                outcome = Outcome::AbortedByWidth;
                break;
            }
            let elim = self.graph.elim_score(pick);
            let next_complexity = log_sum_exp10(complexity, elim);
            if self.config.early_terminate_on_complexity
                && next_complexity > self.config.complexity_limit_log10
            {
                outcome = Outcome::AbortedByComplexity;
                break;
            }

            trace!(
                "iteration {}: eliminating {} (degree {}, fill {})",
                iteration,
                pick,
                degree,
                self.graph.fill_score(pick)
            );
            width = width.max(degree);
            max_single = max_single.max(elim);
            complexity = next_complexity;
            storage = log_sum_exp10(storage, elim - self.graph.log_k(pick));

            if self
                .graph
                .eliminate(pick, iteration, &mut fill_edges)
                .is_err()
            {
                outcome = Outcome::FatalPoolExhausted {
                    iteration: iteration as usize,
                };
                break;
            }
            order.push(pick);
            self.graph.take_changed(&mut changed);
            for &v in &changed {
                self.partition.reclassify(&self.graph, v as usize);
            }
            iteration += 1;
        }

        // The ignored tail joins complete orders only; aborted runs report
        // the bare prefix.
        if outcome.is_completed() && order.len() == selectable {
            order.extend_from_slice(&self.config.ignored);
        }

        debug!(
            "ordering run done: {:?}, width {}, {} of {} ordered, {} fill edges",
            outcome,
            width,
            order.len(),
            n,
            fill_edges.len()
        );
        OrderingResult {
            order,
            width,
            complexity_log10: complexity,
            max_single_complexity_log10: max_single,
            new_function_storage_log10: storage,
            fill_edges,
            outcome,
        }
    }

    /// Search the General bucket with the configured cost function.
    ///
    /// With no randomization configured this is a single greedy scan and
    /// ties break by bucket order (ascending index for the initial
    /// population). Otherwise every candidate within `e_random_pick` of the
    /// minimum enters the pool, `min(n_random_pick, |pool|)` members are
    /// sampled without replacement, and the cheapest sampled member wins.
    fn pick_general(&mut self) -> usize {
        debug_assert!(self.partition.general_len() > 0);
        let easy_width = self.config.easy_width;
        let mut best_cost = f64::INFINITY;
        let mut best_vertex = usize::MAX;
        for v in self.partition.iter_general() {
            if easy_width > 0 && self.graph.degree(v) <= easy_width {
                return v;
            }
            let cost = self.cost_of(v);
            if cost < best_cost {
                best_cost = cost;
                best_vertex = v;
            }
        }
        if !self.config.randomized() {
            return best_vertex;
        }

        let slack = self.config.e_random_pick;
        let pool: Vec<usize> = self
            .partition
            .iter_general()
            .filter(|&v| self.cost_of(v) <= best_cost + slack)
            .collect();
        let k = self.config.n_random_pick.max(1).min(pool.len());
        let sample = rand::seq::index::sample(&mut self.rng, pool.len(), k);

        let mut winner = (OrderedFloat(f64::INFINITY), usize::MAX);
        for i in sample.iter() {
            let v = pool[i];
            let candidate = (OrderedFloat(self.cost_of(v)), v);
            if candidate < winner {
                winner = candidate;
            }
        }
        winner.1
    }

    fn cost_of(&self, v: usize) -> f64 {
        match self.config.cost {
            CostFunction::MinFill => self.graph.fill_score(v) as f64,
            CostFunction::MinDegree => self.graph.degree(v) as f64,
            CostFunction::MinComplexity => self.graph.elim_score(v),
        }
    }
}

/// Compute an elimination order for `model` in one call.
///
/// # Example
///
/// ```
/// use elimorder::model::GraphicalModel;
/// use elimorder::order::{compute_elimination_order, OrderingConfig};
///
/// let model = GraphicalModel::new(vec![2; 3], vec![vec![0, 1, 2]]).unwrap();
/// let result = compute_elimination_order(&model, OrderingConfig::default()).unwrap();
/// assert_eq!(result.order.len(), 3);
/// assert_eq!(result.width, 2);
/// ```
pub fn compute_elimination_order(
    model: &GraphicalModel,
    config: OrderingConfig,
) -> Result<OrderingResult> {
    Ok(OrderingEngine::new(model, config)?.run())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_model(n: usize, scopes: Vec<Vec<usize>>) -> GraphicalModel {
        GraphicalModel::new(vec![2; n], scopes).unwrap()
    }

    #[test]
    fn test_ignored_variable_goes_last() {
        let model = binary_model(4, vec![vec![0, 1], vec![1, 2], vec![2, 3]]);
        let config = OrderingConfig::default().with_ignored(1);
        let result = compute_elimination_order(&model, config).unwrap();
        assert_eq!(result.order, vec![0, 3, 2, 1]);
        assert!(result.outcome.is_completed());
    }

    #[test]
    fn test_invalid_ignored_rejected() {
        let model = binary_model(3, vec![vec![0, 1]]);
        let config = OrderingConfig::default().with_ignored(7);
        assert!(matches!(
            OrderingEngine::new(&model, config),
            Err(ModelError::InvalidIgnored(_))
        ));

        let mut config = OrderingConfig::default();
        config.ignored = vec![0, 1];
        assert!(matches!(
            OrderingEngine::new(&model, config),
            Err(ModelError::InvalidIgnored(_))
        ));
    }

    #[test]
    fn test_quit_after_easy_done_returns_prefix() {
        // A pendant vertex hangs off a 4-cycle: the pendant is the only easy
        // elimination before the cycle forces a General pick.
        let model = binary_model(
            5,
            vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![3, 0], vec![0, 4]],
        );
        let mut config = OrderingConfig::default();
        config.quit_after_easy_done = true;
        let result = compute_elimination_order(&model, config).unwrap();
        assert_eq!(result.order, vec![4]);
        assert!(result.outcome.is_completed());
        assert!(result.fill_edges.is_empty());
    }

    #[test]
    fn test_min_complexity_prefers_small_domains() {
        // On a 4-cycle with one 9-valued variable, min-complexity starts at
        // the vertex whose closed neighborhood avoids it.
        let model = GraphicalModel::new(
            vec![2, 2, 2, 9],
            vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![3, 0]],
        )
        .unwrap();
        let config = OrderingConfig::default().with_cost(CostFunction::MinComplexity);
        let result = compute_elimination_order(&model, config).unwrap();
        assert_eq!(result.order[0], 1);
        assert_eq!(result.width, 2);
    }

    #[test]
    fn test_min_degree_on_star() {
        let model = binary_model(4, vec![vec![0, 1], vec![0, 2], vec![0, 3]]);
        let config = OrderingConfig::default().with_cost(CostFunction::MinDegree);
        let result = compute_elimination_order(&model, config).unwrap();
        assert_eq!(result.order, vec![1, 2, 3, 0]);
        assert_eq!(result.width, 1);
    }

    #[test]
    fn test_randomized_run_is_deterministic_for_fixed_seed() {
        let model = binary_model(
            9,
            vec![
                vec![0, 1], vec![1, 2], vec![3, 4], vec![4, 5], vec![6, 7],
                vec![7, 8], vec![0, 3], vec![3, 6], vec![1, 4], vec![4, 7],
                vec![2, 5], vec![5, 8],
            ],
        );
        let config = OrderingConfig::default()
            .with_random_pick(3, 1.0)
            .with_seed(5);
        let a = compute_elimination_order(&model, config.clone()).unwrap();
        let b = compute_elimination_order(&model, config).unwrap();
        assert_eq!(a.order, b.order);
        assert_eq!(a, b);
    }

    #[test]
    fn test_pool_exhaustion_is_fatal_outcome() {
        // A wheel: every vertex is a General candidate, and the very first
        // elimination needs a fill edge the record budget cannot supply.
        let model = binary_model(
            5,
            vec![
                vec![0, 1], vec![0, 2], vec![0, 3], vec![0, 4],
                vec![1, 2], vec![2, 3], vec![3, 4], vec![4, 1],
            ],
        );
        let mut config = OrderingConfig::default();
        config.edge_budget = Some(16);
        let result = compute_elimination_order(&model, config).unwrap();
        assert_eq!(result.outcome, Outcome::FatalPoolExhausted { iteration: 0 });
        assert!(result.order.is_empty());
    }
}
