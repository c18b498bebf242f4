//! Named operator API.
//!
//! These free functions are the operators of record. The arithmetic trait
//! impls on [`Nu`] are sugar that delegates here.
//!
//! Every output uncertainty is a sum or product of non-negative terms, so no
//! operator re-validates `u >= 0`.

use crate::nu::Nu;

/// `(n1 + n2, u1 + u2)`
#[inline]
pub fn add(x: Nu, y: Nu) -> Nu {
    Nu::new(x.n() + y.n(), x.u() + y.u())
}

/// `(n1 - n2, u1 + u2)`. Uncertainties never cancel.
#[inline]
pub fn subtract(x: Nu, y: Nu) -> Nu {
    Nu::new(x.n() - y.n(), x.u() + y.u())
}

/// `(n1 * n2, |n1| u2 + |n2| u1)`.
///
/// The uncertainty is the first-order worst-case bound on the product error.
/// It dominates Gaussian root-sum-square propagation and must stay that way.
#[inline]
pub fn multiply(x: Nu, y: Nu) -> Nu {
    Nu::new(
        x.n() * y.n(),
        x.n().abs() * y.u() + y.n().abs() * x.u(),
    )
}

/// `(a n, |a| u)`
#[inline]
pub fn scalar(a: f64, x: Nu) -> Nu {
    Nu::new(a * x.n(), a.abs() * x.u())
}

/// `(a n + b, |a| u)`. The offset is exact and carries no uncertainty.
#[inline]
pub fn affine(a: f64, x: Nu, b: f64) -> Nu {
    Nu::new(a * x.n() + b, a.abs() * x.u())
}

/// Catch: `(0, |n| + u)`.
#[inline]
pub fn catch(x: Nu) -> Nu {
    Nu::new(0.0, x.n().abs() + x.u())
}

/// Flip: `(u, |n|)`.
#[inline]
pub fn flip(x: Nu) -> Nu {
    Nu::new(x.u(), x.n().abs())
}
