//! Folds over collections of N/U pairs.

use crate::error::{AlgebraError, Result};
use crate::nu::Nu;
use crate::ops;
use num_traits::{One, Zero};

/// Left fold over [`ops::add`]. The empty sum is `(0, 0)`.
pub fn cumulative_sum(pairs: &[Nu]) -> Nu {
    pairs.iter().copied().fold(Nu::zero(), ops::add)
}

/// Left fold over [`ops::multiply`]. The empty product is `(1, 0)`.
pub fn cumulative_product(pairs: &[Nu]) -> Nu {
    pairs.iter().copied().fold(Nu::one(), ops::multiply)
}

/// Weighted mean: each pair is scaled by its weight, the scaled pairs are
/// summed, and the sum is scaled by `1 / Σw`.
///
/// `weights` defaults to uniform. Unlike the sum and product there is no
/// identity for the empty case, so an empty slice or a zero total weight is
/// an error. Every check runs before any arithmetic.
pub fn weighted_mean(pairs: &[Nu], weights: Option<&[f64]>) -> Result<Nu> {
    if pairs.is_empty() {
        return Err(AlgebraError::EmptyCollection);
    }

    let total_weight = match weights {
        Some(w) => {
            if w.len() != pairs.len() {
                return Err(AlgebraError::WeightCountMismatch {
                    pairs: pairs.len(),
                    weights: w.len(),
                });
            }
            w.iter().sum::<f64>()
        }
        None => pairs.len() as f64,
    };
    if total_weight == 0.0 {
        return Err(AlgebraError::ZeroTotalWeight);
    }

    let weighted_sum = match weights {
        Some(w) => pairs
            .iter()
            .zip(w)
            .map(|(&x, &weight)| ops::scalar(weight, x))
            .fold(Nu::zero(), ops::add),
        None => cumulative_sum(pairs),
    };

    Ok(ops::scalar(1.0 / total_weight, weighted_sum))
}
