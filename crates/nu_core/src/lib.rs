pub mod aggregate;
pub mod baseline;
pub mod error;
pub mod nu;
pub mod ops;
pub mod relative;
pub mod tolerance;
pub mod validation;

/// The `nu_core` crate implements N/U algebra: a closed algebra over pairs
/// `(n, u)` of a nominal value and a non-negative uncertainty bound, which
/// propagates conservative uncertainty through arithmetic without any
/// distributional assumptions.
///
/// Key components:
/// - **Nu**: the value type. Construction clamps `u` to `max(0, u)`, which is
///   the only validation rule in the algebra.
/// - **Ops**: the named operators (`add`, `subtract`, `multiply`, `scalar`,
///   `affine`, `catch`, `flip`). Operator overloads on `Nu` delegate to them.
/// - **Aggregate**: `cumulative_sum`, `cumulative_product`, `weighted_mean`.
/// - **Baseline / Validation**: Gaussian and interval reference rules and the
///   seeded sweeps that measure how conservative the algebra is.
pub use aggregate::{cumulative_product, cumulative_sum, weighted_mean};
pub use error::AlgebraError;
pub use nu::{make, Nu};
pub use relative::RelativeUncertainty;
pub use tolerance::Tolerance;
