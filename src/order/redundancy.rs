//! Post-pass removal of redundant fill edges.
//!
//! Greedy elimination can commit to fill edges that turn out, in hindsight,
//! unnecessary for keeping the induced graph triangulated. This pass walks
//! the recorded fill edges in reverse order of introduction and deletes each
//! edge whose removal provably preserves chordality: an edge of a chordal
//! graph can be dropped iff every pair of common neighbors of its endpoints
//! is adjacent, i.e. iff the edge is not the unique chord of any 4-cycle.
//! Deletions shrink the induced graph handed to downstream inference without
//! altering the elimination order itself.

use crate::model::GraphicalModel;
use crate::types::FillEdge;
use log::debug;
use std::collections::BTreeSet;

/// Scan `fill_edges` in reverse introduction order (descending iteration,
/// ties by ascending endpoints) and drop the redundant ones.
///
/// Returns the retained fill edges in their original insertion order. An
/// empty fill set returns immediately.
///
/// # Example
///
/// ```
/// use elimorder::model::GraphicalModel;
/// use elimorder::order::{compute_elimination_order, remove_redundant_fill_edges, OrderingConfig};
///
/// let model = GraphicalModel::new(
///     vec![2; 4],
///     vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![3, 0]],
/// ).unwrap();
/// let result = compute_elimination_order(&model, OrderingConfig::default()).unwrap();
/// // The single fill edge of the 4-cycle is its only chord and must stay.
/// let kept = remove_redundant_fill_edges(&model, &result.fill_edges);
/// assert_eq!(kept, result.fill_edges);
/// ```
pub fn remove_redundant_fill_edges(
    model: &GraphicalModel,
    fill_edges: &[FillEdge],
) -> Vec<FillEdge> {
    if fill_edges.is_empty() {
        return Vec::new();
    }

    let n = model.num_variables();
    let mut adj: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
    for (u, v) in model.primal_edges() {
        adj[u].insert(v);
        adj[v].insert(u);
    }
    for f in fill_edges {
        adj[f.u].insert(f.v);
        adj[f.v].insert(f.u);
    }

    let mut scan: Vec<FillEdge> = fill_edges.to_vec();
    scan.sort_by(|a, b| {
        b.iteration
            .cmp(&a.iteration)
            .then(a.u.cmp(&b.u))
            .then(a.v.cmp(&b.v))
    });

    let mut removed: BTreeSet<(usize, usize)> = BTreeSet::new();
    for e in &scan {
        let common: Vec<usize> = adj[e.u].intersection(&adj[e.v]).copied().collect();
        let removable = common
            .iter()
            .enumerate()
            .all(|(i, &a)| common[i + 1..].iter().all(|&b| adj[a].contains(&b)));
        if removable {
            adj[e.u].remove(&e.v);
            adj[e.v].remove(&e.u);
            removed.insert((e.u, e.v));
        }
    }

    if !removed.is_empty() {
        debug!(
            "fill post-pass removed {} of {} fill edges",
            removed.len(),
            fill_edges.len()
        );
    }
    fill_edges
        .iter()
        .filter(|f| !removed.contains(&(f.u, f.v)))
        .copied()
        .collect()
}
