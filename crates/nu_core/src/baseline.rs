//! Reference propagation rules that N/U results are compared against.
//!
//! None of these feed back into the algebra. They exist so the validation
//! sweeps and tests can measure how conservative the N/U formulas are.

use crate::nu::Nu;

/// Root-sum-square of independent uncertainties.
pub fn gaussian_rss(uncertainties: &[f64]) -> f64 {
    uncertainties.iter().map(|u| u * u).sum::<f64>().sqrt()
}

/// First-order Gaussian uncertainty of a product,
/// `|n1 n2| sqrt((u1/n1)^2 + (u2/n2)^2)`. Zero when either nominal is zero.
pub fn gaussian_product(a: Nu, b: Nu) -> f64 {
    if a.n() == 0.0 || b.n() == 0.0 {
        return 0.0;
    }
    let ra = a.u() / a.n();
    let rb = b.u() / b.n();
    (a.n() * b.n()).abs() * (ra * ra + rb * rb).sqrt()
}

/// Exact interval product `[a] x [b]` as `(min corner, max corner)`.
pub fn interval_product(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    let corners = [a.0 * b.0, a.0 * b.1, a.1 * b.0, a.1 * b.1];
    corners
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &c| {
            (lo.min(c), hi.max(c))
        })
}

/// Half-width of the exact interval product of two pairs.
pub fn interval_product_halfwidth(a: Nu, b: Nu) -> f64 {
    let (lo, hi) = interval_product(a.interval(), b.interval());
    (hi - lo) / 2.0
}

/// Half-width of the interval product of a whole chain, folded left to right.
pub fn interval_chain_halfwidth(chain: &[Nu]) -> f64 {
    let mut iter = chain.iter();
    let Some(first) = iter.next() else {
        return 0.0;
    };
    let (lo, hi) = iter.fold(first.interval(), |acc, x| interval_product(acc, x.interval()));
    (hi - lo) / 2.0
}
