use crate::error::{AlgebraError, Result};
use crate::ops;
use crate::relative::RelativeUncertainty;
use crate::tolerance::Tolerance;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::{Product, Sum};
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// An N/U pair: nominal value `n` with an explicit uncertainty bound `u`.
///
/// `u >= 0` holds for every value of this type. The only way in is
/// [`Nu::new`] (or a conversion that calls it), which clamps negative input
/// to zero instead of rejecting it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "NuFields")]
pub struct Nu {
    #[serde(rename = "nominal")]
    n: f64,
    #[serde(rename = "uncertainty")]
    u: f64,
}

#[derive(Deserialize)]
struct NuFields {
    nominal: f64,
    uncertainty: f64,
}

impl From<NuFields> for Nu {
    fn from(fields: NuFields) -> Self {
        Nu::new(fields.nominal, fields.uncertainty)
    }
}

/// Alias for [`Nu::new`].
#[inline]
pub fn make(n: f64, u: f64) -> Nu {
    Nu::new(n, u)
}

impl Nu {
    /// Builds a pair, clamping the uncertainty to `max(0, u)`.
    ///
    /// Negative zero and NaN also clamp to `0.0`.
    #[inline]
    pub fn new(n: f64, u: f64) -> Self {
        Self {
            n,
            u: if u > 0.0 { u } else { 0.0 },
        }
    }

    /// An exact value: `(n, 0)`.
    #[inline]
    pub fn exact(n: f64) -> Self {
        Self::new(n, 0.0)
    }

    #[inline]
    pub fn n(&self) -> f64 {
        self.n
    }

    #[inline]
    pub fn u(&self) -> f64 {
        self.u
    }

    #[inline]
    pub fn into_parts(self) -> (f64, f64) {
        (self.n, self.u)
    }

    /// `M(n, u) = |n| + u`, conserved by [`Nu::catch`] and [`Nu::flip`].
    #[inline]
    pub fn invariant(&self) -> f64 {
        self.n.abs() + self.u
    }

    #[inline]
    pub fn lower(&self) -> f64 {
        self.n - self.u
    }

    #[inline]
    pub fn upper(&self) -> f64 {
        self.n + self.u
    }

    /// `[n - u, n + u]` as `(lower, upper)`.
    #[inline]
    pub fn interval(&self) -> (f64, f64) {
        (self.lower(), self.upper())
    }

    /// `u / |n|`, or [`RelativeUncertainty::Unbounded`] when `n == 0`.
    pub fn relative(&self) -> RelativeUncertainty {
        if self.n == 0.0 {
            RelativeUncertainty::Unbounded
        } else {
            RelativeUncertainty::Bounded(self.u / self.n.abs())
        }
    }

    /// True when the interval excludes zero (`|n| > u`). The boundary case
    /// `|n| == u` is not stable.
    #[inline]
    pub fn is_sign_stable(&self) -> bool {
        self.n.abs() > self.u
    }

    #[inline]
    pub fn catch(self) -> Self {
        ops::catch(self)
    }

    #[inline]
    pub fn flip(self) -> Self {
        ops::flip(self)
    }

    #[inline]
    pub fn scale(self, a: f64) -> Self {
        ops::scalar(a, self)
    }

    #[inline]
    pub fn affine(self, a: f64, b: f64) -> Self {
        ops::affine(a, self, b)
    }

    /// Compares both channels under `tolerance`.
    pub fn approx_eq(&self, other: &Nu, tolerance: Tolerance) -> bool {
        tolerance.close(self.n, other.n) && tolerance.close(self.u, other.u)
    }

    /// Renders `NU(n, u)` with `precision` decimal places on both channels.
    pub fn format(&self, precision: usize) -> String {
        format!("{:.*}", precision, self)
    }
}

impl fmt::Display for Nu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "NU({:.*}, {:.*})", p, self.n, p, self.u),
            None => write!(f, "NU({}, {})", self.n, self.u),
        }
    }
}

impl From<(f64, f64)> for Nu {
    fn from((n, u): (f64, f64)) -> Self {
        Nu::new(n, u)
    }
}

impl<'a> TryFrom<&'a [f64]> for Nu {
    type Error = AlgebraError;

    fn try_from(parts: &'a [f64]) -> Result<Self> {
        match parts {
            [n, u] => Ok(Nu::new(*n, *u)),
            _ => Err(AlgebraError::Arity { found: parts.len() }),
        }
    }
}

impl TryFrom<Vec<f64>> for Nu {
    type Error = AlgebraError;

    fn try_from(parts: Vec<f64>) -> Result<Self> {
        Nu::try_from(parts.as_slice())
    }
}

impl Zero for Nu {
    fn zero() -> Self {
        Self::new(0.0, 0.0)
    }
    fn is_zero(&self) -> bool {
        self.n == 0.0 && self.u == 0.0
    }
}

impl One for Nu {
    fn one() -> Self {
        Self::new(1.0, 0.0)
    }
}

impl Add for Nu {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        ops::add(self, rhs)
    }
}

impl Sub for Nu {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        ops::subtract(self, rhs)
    }
}

impl Mul for Nu {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        ops::multiply(self, rhs)
    }
}

impl Neg for Nu {
    type Output = Self;
    fn neg(self) -> Self {
        ops::scalar(-1.0, self)
    }
}

// Exact offsets and scalings.

impl Add<f64> for Nu {
    type Output = Self;
    fn add(self, rhs: f64) -> Self {
        ops::affine(1.0, self, rhs)
    }
}

impl Sub<f64> for Nu {
    type Output = Self;
    fn sub(self, rhs: f64) -> Self {
        ops::affine(1.0, self, -rhs)
    }
}

impl Mul<f64> for Nu {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        ops::scalar(rhs, self)
    }
}

impl Mul<Nu> for f64 {
    type Output = Nu;
    fn mul(self, rhs: Nu) -> Nu {
        ops::scalar(self, rhs)
    }
}

impl AddAssign for Nu {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
impl SubAssign for Nu {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
impl MulAssign for Nu {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Sum for Nu {
    fn sum<I: Iterator<Item = Nu>>(iter: I) -> Self {
        iter.fold(Nu::zero(), ops::add)
    }
}

impl<'a> Sum<&'a Nu> for Nu {
    fn sum<I: Iterator<Item = &'a Nu>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Product for Nu {
    fn product<I: Iterator<Item = Nu>>(iter: I) -> Self {
        iter.fold(Nu::one(), ops::multiply)
    }
}

impl<'a> Product<&'a Nu> for Nu {
    fn product<I: Iterator<Item = &'a Nu>>(iter: I) -> Self {
        iter.copied().product()
    }
}
