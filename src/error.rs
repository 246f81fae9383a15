//! Error types for the elimorder library.

use thiserror::Error;

/// Errors raised while validating a model or an engine configuration.
///
/// These are construction-time errors only: once an ordering run has started,
/// cutoffs and resource exhaustion are reported in-band through
/// [`Outcome`](crate::types::Outcome) rather than by unwinding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A variable was declared with an empty domain.
    #[error("variable {variable} has domain size 0")]
    EmptyDomain { variable: usize },

    /// A factor scope references a variable outside `[0, num_variables)`.
    #[error("scope {scope} references variable {variable}, but the model has {num_variables} variables")]
    VariableOutOfRange {
        scope: usize,
        variable: usize,
        num_variables: usize,
    },

    /// A factor scope lists the same variable twice.
    #[error("scope {scope} lists variable {variable} more than once")]
    DuplicateScopeVariable { scope: usize, variable: usize },

    /// The ignored-variable list is invalid (out of range, or more than one entry).
    #[error("invalid ignored variables: {0}")]
    InvalidIgnored(String),
}

/// Result type alias for elimorder operations.
pub type Result<T> = std::result::Result<T, ModelError>;
