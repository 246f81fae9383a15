//! Multi-start search over randomized engine runs.
//!
//! Each restart runs an independent engine instance with its own seed; the
//! incumbent's width becomes the cutoff for later restarts, and the search
//! stops early once the degeneracy lower bound is met. Outer parallelism,
//! when wanted, wraps whole calls; there is no shared state between runs.

use crate::error::Result;
use crate::model::GraphicalModel;
use crate::order::config::OrderingConfig;
use crate::order::engine::OrderingEngine;
use crate::order::lower_bound::induced_width_lower_bound;
use crate::types::OrderingResult;
use log::debug;
use ordered_float::OrderedFloat;

/// Run `restarts` ordering attempts with seeds `seed, seed + 1, …` and keep
/// the best complete order (smallest width, ties by smallest complexity).
///
/// With the default pure-greedy configuration every restart is identical;
/// pass a config with [`with_random_pick`](OrderingConfig::with_random_pick)
/// to make restarts explore. If no restart completes under the caller's
/// cutoffs, the first run's (aborted) result is returned as-is.
///
/// # Example
///
/// ```
/// use elimorder::model::GraphicalModel;
/// use elimorder::order::{find_best_order, OrderingConfig};
///
/// let model = GraphicalModel::new(
///     vec![2; 4],
///     vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![3, 0]],
/// ).unwrap();
/// let config = OrderingConfig::default().with_random_pick(2, 0.0);
/// let best = find_best_order(&model, config, 8).unwrap();
/// assert_eq!(best.width, 2);
/// ```
pub fn find_best_order(
    model: &GraphicalModel,
    config: OrderingConfig,
    restarts: usize,
) -> Result<OrderingResult> {
    let restarts = restarts.max(1);
    let full_len = model.num_variables();
    let lower_bound = induced_width_lower_bound(model);
    let mut first: Option<OrderingResult> = None;
    let mut best: Option<OrderingResult> = None;

    for attempt in 0..restarts {
        let mut cfg = config.clone();
        cfg.seed = config.seed.wrapping_add(attempt as u64);
        if let Some(b) = &best {
            // A restart that would exceed the incumbent's width cannot win.
            cfg.width_limit = b.width;
            cfg.early_terminate_on_width = true;
        }

        let result = OrderingEngine::new(model, cfg)?.run();
        debug!(
            "restart {}: {:?}, width {}, complexity {:.3}",
            attempt, result.outcome, result.width, result.complexity_log10
        );

        let complete = result.outcome.is_completed() && result.order.len() == full_len;
        let improves = complete
            && best.as_ref().is_none_or(|b| {
                (result.width, OrderedFloat(result.complexity_log10))
                    < (b.width, OrderedFloat(b.complexity_log10))
            });
        if first.is_none() {
            first = Some(result.clone());
        }
        if improves {
            let at_bound = result.width <= lower_bound;
            best = Some(result);
            if at_bound {
                debug!("restart search met the lower bound {}", lower_bound);
                break;
            }
        }
    }

    Ok(best.or(first).expect("at least one restart ran"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Outcome;

    fn grid_model(rows: usize, cols: usize) -> GraphicalModel {
        let mut scopes = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                let v = r * cols + c;
                if c + 1 < cols {
                    scopes.push(vec![v, v + 1]);
                }
                if r + 1 < rows {
                    scopes.push(vec![v, v + cols]);
                }
            }
        }
        GraphicalModel::new(vec![2; rows * cols], scopes).unwrap()
    }

    #[test]
    fn test_best_order_is_a_permutation() {
        let model = grid_model(3, 3);
        let config = OrderingConfig::default().with_random_pick(2, 0.0);
        let best = find_best_order(&model, config, 6).unwrap();
        assert_eq!(best.outcome, Outcome::Completed);
        let mut sorted = best.order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..9).collect::<Vec<_>>());
        // A 3x3 grid has treewidth 3; min-fill should not do worse than 4.
        assert!(best.width >= 3 && best.width <= 4);
    }

    #[test]
    fn test_search_is_deterministic() {
        let model = grid_model(3, 4);
        let config = OrderingConfig::default().with_random_pick(4, 1.0).with_seed(11);
        let a = find_best_order(&model, config.clone(), 5).unwrap();
        let b = find_best_order(&model, config, 5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_lower_bound_stops_early_on_tree() {
        // On a chain the very first greedy run meets the bound.
        let model = GraphicalModel::new(
            vec![2; 5],
            vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![3, 4]],
        )
        .unwrap();
        let best = find_best_order(&model, OrderingConfig::default(), 100).unwrap();
        assert_eq!(best.width, 1);
        assert_eq!(best.order.len(), 5);
    }
}
