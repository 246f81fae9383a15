//! Cheap lower bound on the induced width of a model.

use crate::model::GraphicalModel;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

/// Degeneracy lower bound on the induced width.
///
/// Repeatedly removes a vertex of minimum current degree and reports the
/// largest degree seen at removal time. No elimination order over the primal
/// graph can induce a smaller width, so outer searches use this to prune
/// hopeless restarts. Runs in `O(N log N + E)` with a lazy min-heap.
///
/// # Example
///
/// ```
/// use elimorder::model::GraphicalModel;
/// use elimorder::order::induced_width_lower_bound;
///
/// let clique = GraphicalModel::new(vec![2; 4], vec![vec![0, 1, 2, 3]]).unwrap();
/// assert_eq!(induced_width_lower_bound(&clique), 3);
/// ```
pub fn induced_width_lower_bound(model: &GraphicalModel) -> usize {
    let n = model.num_variables();
    let mut adj: Vec<HashSet<usize>> = vec![HashSet::new(); n];
    for (u, v) in model.primal_edges() {
        adj[u].insert(v);
        adj[v].insert(u);
    }

    let mut heap: BinaryHeap<Reverse<(usize, usize)>> = BinaryHeap::with_capacity(n);
    for (v, neighbors) in adj.iter().enumerate() {
        heap.push(Reverse((neighbors.len(), v)));
    }

    let mut removed = vec![false; n];
    let mut bound = 0;
    while let Some(Reverse((degree, v))) = heap.pop() {
        // Stale entries carry an outdated degree.
        if removed[v] || degree != adj[v].len() {
            continue;
        }
        removed[v] = true;
        bound = bound.max(degree);
        let neighbors: Vec<usize> = adj[v].iter().copied().collect();
        for w in neighbors {
            adj[w].remove(&v);
            heap.push(Reverse((adj[w].len(), w)));
        }
    }
    bound
}
