use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of the relative uncertainty query `u / |n|`.
///
/// A zero nominal yields `Unbounded` instead of a division fault. The derived
/// ordering places every `Bounded` value below `Unbounded`, and two
/// `Unbounded` values compare equal. This is a terminal query: there is no
/// conversion back into a [`Nu`](crate::Nu).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeUncertainty {
    Bounded(f64),
    Unbounded,
}

impl RelativeUncertainty {
    pub fn is_unbounded(&self) -> bool {
        matches!(self, RelativeUncertainty::Unbounded)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            RelativeUncertainty::Bounded(v) => Some(*v),
            RelativeUncertainty::Unbounded => None,
        }
    }

    /// Lossy conversion for reporting. `Unbounded` becomes `f64::INFINITY`.
    pub fn to_f64(&self) -> f64 {
        self.value().unwrap_or(f64::INFINITY)
    }
}

impl fmt::Display for RelativeUncertainty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelativeUncertainty::Bounded(v) => match f.precision() {
                Some(p) => write!(f, "{:.*}", p, v),
                None => write!(f, "{}", v),
            },
            RelativeUncertainty::Unbounded => f.write_str("inf"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RelativeUncertainty::{Bounded, Unbounded};

    #[test]
    fn unbounded_orders_above_every_bounded_value() {
        assert!(Bounded(0.5) < Unbounded);
        assert!(Bounded(f64::MAX) < Unbounded);
        assert!(Bounded(f64::INFINITY) < Unbounded);
        assert_eq!(Unbounded, Unbounded);
        assert!(Bounded(0.1) < Bounded(0.2));
    }

    #[test]
    fn reporting_helpers() {
        assert_eq!(Bounded(0.25).value(), Some(0.25));
        assert_eq!(Unbounded.value(), None);
        assert_eq!(Unbounded.to_f64(), f64::INFINITY);
        assert_eq!(Unbounded.to_string(), "inf");
        assert_eq!(format!("{:.2}", Bounded(0.126)), "0.13");
    }
}
