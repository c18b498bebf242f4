use serde::{Deserialize, Serialize};

/// Numerical tolerance used for floating-point comparisons of derived values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub abs: f64,
    pub rel: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            abs: 1e-9,
            rel: 1e-12,
        }
    }
}

impl Tolerance {
    /// `|a - b| <= abs + rel * |b|`
    #[inline]
    pub fn close(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.abs + self.rel * b.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::Tolerance;

    #[test]
    fn default_tolerance_accepts_rounding_noise() {
        let tol = Tolerance::default();
        assert!(tol.close(0.1 + 0.2, 0.3));
        assert!(tol.close(1e12 + 0.5, 1e12));
        assert!(!tol.close(1.0, 1.0 + 1e-6));
    }
}
