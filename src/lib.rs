//! # elimorder
//!
//! A library for computing variable elimination orders for graphical models.
//!
//! Given variables with finite domains and a set of factor scopes, elimorder
//! builds the primal graph (variables are adjacent iff they share a scope)
//! and greedily searches for an elimination order of small induced width and
//! small induced complexity, the quantities that govern the cost of
//! downstream bucket / variable elimination.
//!
//! ## Features
//!
//! - **Ordering engine**: min-fill, min-degree, and min-complexity cost
//!   functions over an incrementally scored elimination graph
//! - **Candidate partition**: trivial and zero-fill vertices are eliminated
//!   without touching the expensive candidate search
//! - **Cutoffs**: width and complexity limits reported as in-band outcomes
//! - **Multi-start search**: seeded randomized tie-breaking with restart
//!   pruning against a degeneracy lower bound
//! - **Fill post-pass**: removes fill edges the triangulation can do without
//!
//! ## Example
//!
//! ```rust
//! use elimorder::prelude::*;
//!
//! // Four binary variables on a cycle.
//! let model = GraphicalModel::new(
//!     vec![2; 4],
//!     vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![3, 0]],
//! ).unwrap();
//!
//! let result = compute_elimination_order(&model, OrderingConfig::default()).unwrap();
//! assert_eq!(result.outcome, Outcome::Completed);
//! assert_eq!(result.width, 2);
//! assert_eq!(result.fill_edge_count(), 1);
//! ```

pub mod error;
pub mod model;
pub mod order;
pub mod types;

mod graph;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ModelError, Result};
    pub use crate::model::GraphicalModel;
    pub use crate::order::{
        compute_elimination_order, find_best_order, induced_width_lower_bound,
        remove_redundant_fill_edges, OrderingConfig, OrderingEngine,
    };
    pub use crate::types::{CostFunction, FillEdge, Outcome, OrderingResult};
}
