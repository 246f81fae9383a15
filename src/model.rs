//! Graphical model description: variables with finite domains and factor scopes.
//!
//! A [`GraphicalModel`] is the input boundary of the library. It supplies the
//! variable count, per-variable domain sizes, and the factor scopes from
//! which the primal graph is derived: two variables are adjacent iff they
//! co-occur in some scope.

use crate::error::{ModelError, Result};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

/// A graphical model (Bayesian network, Markov random field, or constraint
/// network) reduced to what elimination ordering needs: domain sizes and
/// factor scopes.
///
/// # Example
///
/// ```
/// use elimorder::model::GraphicalModel;
///
/// // A chain of four binary variables: factors {0,1}, {1,2}, {2,3}.
/// let model = GraphicalModel::new(
///     vec![2, 2, 2, 2],
///     vec![vec![0, 1], vec![1, 2], vec![2, 3]],
/// ).unwrap();
///
/// assert_eq!(model.num_variables(), 4);
/// assert_eq!(model.num_primal_edges(), 3);
/// assert!(model.has_primal_edge(1, 2));
/// assert!(!model.has_primal_edge(0, 3));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicalModel {
    /// Domain size of each variable.
    domain_sizes: Vec<usize>,
    /// Factor scopes, as given.
    scopes: Vec<Vec<usize>>,
    /// The primal graph: variables as nodes, co-occurrence as edges.
    primal: UnGraph<(), ()>,
}

impl GraphicalModel {
    /// Create a model from per-variable domain sizes and factor scopes.
    ///
    /// Each scope is a set of variable indices; the primal graph connects
    /// every pair of variables sharing a scope. Duplicate pairs across
    /// scopes collapse to a single edge.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if a domain size is 0, a scope references a
    /// variable out of range, or a scope lists a variable twice.
    pub fn new(domain_sizes: Vec<usize>, scopes: Vec<Vec<usize>>) -> Result<Self> {
        let n = domain_sizes.len();
        for (variable, &k) in domain_sizes.iter().enumerate() {
            if k == 0 {
                return Err(ModelError::EmptyDomain { variable });
            }
        }
        let mut seen = vec![usize::MAX; n];
        for (s, scope) in scopes.iter().enumerate() {
            for &v in scope {
                if v >= n {
                    return Err(ModelError::VariableOutOfRange {
                        scope: s,
                        variable: v,
                        num_variables: n,
                    });
                }
                if seen[v] == s {
                    return Err(ModelError::DuplicateScopeVariable { scope: s, variable: v });
                }
                seen[v] = s;
            }
        }

        let mut primal = UnGraph::new_undirected();
        for _ in 0..n {
            primal.add_node(());
        }
        for scope in &scopes {
            for (i, &u) in scope.iter().enumerate() {
                for &v in &scope[i + 1..] {
                    let (a, b) = (NodeIndex::new(u), NodeIndex::new(v));
                    if primal.find_edge(a, b).is_none() {
                        primal.add_edge(a, b, ());
                    }
                }
            }
        }

        Ok(Self {
            domain_sizes,
            scopes,
            primal,
        })
    }

    /// Number of variables in the model.
    pub fn num_variables(&self) -> usize {
        self.domain_sizes.len()
    }

    /// Domain size of variable `v`.
    pub fn domain_size(&self, v: usize) -> usize {
        self.domain_sizes[v]
    }

    /// log10 of the domain size of variable `v`.
    pub fn log10_domain_size(&self, v: usize) -> f64 {
        (self.domain_sizes[v] as f64).log10()
    }

    /// The factor scopes the model was built from.
    pub fn scopes(&self) -> &[Vec<usize>] {
        &self.scopes
    }

    /// Number of edges in the primal graph.
    pub fn num_primal_edges(&self) -> usize {
        self.primal.edge_count()
    }

    /// Whether variables `u` and `v` are adjacent in the primal graph.
    pub fn has_primal_edge(&self, u: usize, v: usize) -> bool {
        self.primal
            .find_edge(NodeIndex::new(u), NodeIndex::new(v))
            .is_some()
    }

    /// Primal edges as (u, v) pairs with `u < v`, in no particular order.
    pub fn primal_edges(&self) -> Vec<(usize, usize)> {
        self.primal
            .edge_references()
            .map(|e| {
                let (u, v) = (e.source().index(), e.target().index());
                if u < v {
                    (u, v)
                } else {
                    (v, u)
                }
            })
            .collect()
    }

    /// The primal graph itself.
    pub fn primal_graph(&self) -> &UnGraph<(), ()> {
        &self.primal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_creation() {
        let model =
            GraphicalModel::new(vec![2, 3, 2], vec![vec![0, 1], vec![1, 2]]).unwrap();
        assert_eq!(model.num_variables(), 3);
        assert_eq!(model.num_primal_edges(), 2);
        assert_eq!(model.domain_size(1), 3);
    }

    #[test]
    fn test_scope_pairs_become_edges() {
        // A single ternary scope yields a triangle.
        let model = GraphicalModel::new(vec![2; 3], vec![vec![0, 1, 2]]).unwrap();
        assert_eq!(model.num_primal_edges(), 3);
        assert!(model.has_primal_edge(0, 1));
        assert!(model.has_primal_edge(0, 2));
        assert!(model.has_primal_edge(1, 2));
    }

    #[test]
    fn test_duplicate_pairs_collapse() {
        let model =
            GraphicalModel::new(vec![2; 3], vec![vec![0, 1], vec![1, 0], vec![0, 1, 2]])
                .unwrap();
        assert_eq!(model.num_primal_edges(), 3);
    }

    #[test]
    fn test_empty_domain_rejected() {
        let err = GraphicalModel::new(vec![2, 0], vec![]).unwrap_err();
        assert_eq!(err, ModelError::EmptyDomain { variable: 1 });
    }

    #[test]
    fn test_out_of_range_scope_rejected() {
        let err = GraphicalModel::new(vec![2, 2], vec![vec![0, 5]]).unwrap_err();
        assert_eq!(
            err,
            ModelError::VariableOutOfRange {
                scope: 0,
                variable: 5,
                num_variables: 2
            }
        );
    }

    #[test]
    fn test_duplicate_in_scope_rejected() {
        let err = GraphicalModel::new(vec![2, 2], vec![vec![0, 1], vec![1, 1]]).unwrap_err();
        assert_eq!(err, ModelError::DuplicateScopeVariable { scope: 1, variable: 1 });
    }

    #[test]
    fn test_log10_domain_size() {
        let model = GraphicalModel::new(vec![10, 100], vec![]).unwrap();
        assert!((model.log10_domain_size(0) - 1.0).abs() < 1e-12);
        assert!((model.log10_domain_size(1) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_primal_edges_normalized() {
        let model = GraphicalModel::new(vec![2; 4], vec![vec![3, 0]]).unwrap();
        assert_eq!(model.primal_edges(), vec![(0, 3)]);
    }

    #[test]
    fn test_serde_round_trip() {
        let model =
            GraphicalModel::new(vec![2, 3, 4], vec![vec![0, 1], vec![1, 2]]).unwrap();
        let json = serde_json::to_string(&model).unwrap();
        let back: GraphicalModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back.num_variables(), 3);
        assert_eq!(back.domain_size(2), 4);
        assert_eq!(back.num_primal_edges(), 2);
        assert!(back.has_primal_edge(1, 2));
    }
}
