//! WASM bridge for `nu_core`.
//!
//! Errors cross the boundary as plain strings.

mod nu;
mod validation;

pub use nu::{cumulative_product, cumulative_sum, weighted_mean, WasmNu};
pub use validation::WasmValidationRunner;
