//! `Nu` wrapper and the algebra surface exposed to JavaScript.

use nu_core::{ops, AlgebraError, Nu};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
#[derive(Clone, Copy)]
pub struct WasmNu {
    pub(crate) inner: Nu,
}

impl From<Nu> for WasmNu {
    fn from(inner: Nu) -> Self {
        Self { inner }
    }
}

/// Zips flat nominal/uncertainty arrays into pairs.
pub(crate) fn pairs_from_arrays(
    nominals: &[f64],
    uncertainties: &[f64],
) -> Result<Vec<Nu>, String> {
    if nominals.len() != uncertainties.len() {
        return Err(format!(
            "Pair arrays differ in length: {} nominals, {} uncertainties.",
            nominals.len(),
            uncertainties.len()
        ));
    }
    Ok(nominals
        .iter()
        .zip(uncertainties)
        .map(|(&n, &u)| Nu::new(n, u))
        .collect())
}

fn algebra_error(err: AlgebraError) -> JsValue {
    JsValue::from_str(&format!("{}", err))
}

#[wasm_bindgen]
impl WasmNu {
    #[wasm_bindgen(constructor)]
    pub fn new(n: f64, u: f64) -> WasmNu {
        console_error_panic_hook::set_once();
        Nu::new(n, u).into()
    }

    /// Builds a pair from a two-element array. Any other length is rejected.
    pub fn from_array(parts: Vec<f64>) -> Result<WasmNu, JsValue> {
        Nu::try_from(parts).map(WasmNu::from).map_err(algebra_error)
    }

    #[wasm_bindgen(getter)]
    pub fn n(&self) -> f64 {
        self.inner.n()
    }

    #[wasm_bindgen(getter)]
    pub fn u(&self) -> f64 {
        self.inner.u()
    }

    pub fn add(&self, other: &WasmNu) -> WasmNu {
        ops::add(self.inner, other.inner).into()
    }

    pub fn subtract(&self, other: &WasmNu) -> WasmNu {
        ops::subtract(self.inner, other.inner).into()
    }

    pub fn multiply(&self, other: &WasmNu) -> WasmNu {
        ops::multiply(self.inner, other.inner).into()
    }

    pub fn scalar(&self, a: f64) -> WasmNu {
        ops::scalar(a, self.inner).into()
    }

    pub fn affine(&self, a: f64, b: f64) -> WasmNu {
        ops::affine(a, self.inner, b).into()
    }

    pub fn catch(&self) -> WasmNu {
        ops::catch(self.inner).into()
    }

    pub fn flip(&self) -> WasmNu {
        ops::flip(self.inner).into()
    }

    pub fn invariant(&self) -> f64 {
        self.inner.invariant()
    }

    pub fn lower(&self) -> f64 {
        self.inner.lower()
    }

    pub fn upper(&self) -> f64 {
        self.inner.upper()
    }

    /// `[lower, upper]`
    pub fn interval(&self) -> Vec<f64> {
        let (lower, upper) = self.inner.interval();
        vec![lower, upper]
    }

    /// `u / |n|`, or `Infinity` for a zero nominal. Check
    /// `is_relative_unbounded` rather than comparing against `Infinity`.
    pub fn relative(&self) -> f64 {
        self.inner.relative().to_f64()
    }

    pub fn is_relative_unbounded(&self) -> bool {
        self.inner.relative().is_unbounded()
    }

    pub fn is_sign_stable(&self) -> bool {
        self.inner.is_sign_stable()
    }

    pub fn to_string_with(&self, precision: usize) -> String {
        self.inner.format(precision)
    }

    #[wasm_bindgen(js_name = toString)]
    pub fn to_js_string(&self) -> String {
        self.inner.to_string()
    }
}

#[wasm_bindgen]
pub fn cumulative_sum(nominals: Vec<f64>, uncertainties: Vec<f64>) -> Result<WasmNu, JsValue> {
    let pairs = pairs_from_arrays(&nominals, &uncertainties).map_err(|e| JsValue::from_str(&e))?;
    Ok(nu_core::cumulative_sum(&pairs).into())
}

#[wasm_bindgen]
pub fn cumulative_product(
    nominals: Vec<f64>,
    uncertainties: Vec<f64>,
) -> Result<WasmNu, JsValue> {
    let pairs = pairs_from_arrays(&nominals, &uncertainties).map_err(|e| JsValue::from_str(&e))?;
    Ok(nu_core::cumulative_product(&pairs).into())
}

#[wasm_bindgen]
pub fn weighted_mean(
    nominals: Vec<f64>,
    uncertainties: Vec<f64>,
    weights: Option<Vec<f64>>,
) -> Result<WasmNu, JsValue> {
    let pairs = pairs_from_arrays(&nominals, &uncertainties).map_err(|e| JsValue::from_str(&e))?;
    nu_core::weighted_mean(&pairs, weights.as_deref())
        .map(WasmNu::from)
        .map_err(algebra_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_from_arrays_zips_and_clamps() {
        let pairs = pairs_from_arrays(&[1.0, 2.0], &[0.5, -1.0]).expect("pairs");
        assert_eq!(pairs, vec![Nu::new(1.0, 0.5), Nu::new(2.0, 0.0)]);
    }

    #[test]
    fn pairs_from_arrays_rejects_length_mismatch() {
        let err = pairs_from_arrays(&[1.0, 2.0], &[0.5]).expect_err("mismatch");
        assert!(err.contains("2 nominals, 1 uncertainties"));
    }

    #[test]
    fn wrapper_methods_delegate_to_core() {
        let x = WasmNu::new(5.0, 2.0);
        let y = WasmNu::new(1.0, 0.5);
        assert_eq!(x.add(&y).inner, Nu::new(6.0, 2.5));
        assert_eq!(x.catch().inner, Nu::new(0.0, 7.0));
        assert_eq!(x.flip().inner, Nu::new(2.0, 5.0));
        assert_eq!(x.interval(), vec![3.0, 7.0]);
        assert_eq!(x.to_string_with(1), "NU(5.0, 2.0)");
        assert!(WasmNu::new(0.0, 1.0).is_relative_unbounded());
        assert_eq!(WasmNu::new(0.0, 1.0).relative(), f64::INFINITY);
    }

    #[test]
    fn aggregates_succeed_on_valid_input() {
        let sum = cumulative_sum(vec![1.0, 2.0, 3.0], vec![0.1, 0.2, 0.3]).expect("sum");
        assert_eq!(sum.n(), 6.0);
        let mean = weighted_mean(vec![10.0, 20.0], vec![1.0, 2.0], Some(vec![1.0, 3.0]))
            .expect("mean");
        assert!((mean.n() - 17.5).abs() < 1e-12);
    }
}
