use thiserror::Error;

/// Failures that the algebra can report.
///
/// Uncertainty negativity is absent on purpose: it is clamped at construction
/// and never surfaces as an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlgebraError {
    /// A pair was built from a component list that is not exactly two long.
    #[error("N/U pair requires exactly 2 components, got {found}")]
    Arity { found: usize },

    /// An aggregate without a natural identity was given no pairs.
    #[error("weighted mean requires at least one pair")]
    EmptyCollection,

    #[error("weighted mean requires a non-zero total weight")]
    ZeroTotalWeight,

    #[error("weight count mismatch: {pairs} pairs but {weights} weights")]
    WeightCountMismatch { pairs: usize, weights: usize },
}

pub type Result<T> = std::result::Result<T, AlgebraError>;
