//! Stepped validation sweep runner.

use nu_core::validation::{ValidationReport, ValidationRunner, ValidationSettings};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmValidationRunner {
    runner: Option<ValidationRunner>,
    report: Option<ValidationReport>,
}

impl WasmValidationRunner {
    pub(crate) fn from_settings(settings: ValidationSettings) -> anyhow::Result<Self> {
        Ok(Self {
            runner: Some(ValidationRunner::new(settings)?),
            report: None,
        })
    }

    /// Advances the sweeps; once the last case is drawn the report is built
    /// and the runner is released.
    pub(crate) fn advance(&mut self, batch_size: usize) -> anyhow::Result<()> {
        let Some(runner) = self.runner.as_mut() else {
            return Ok(());
        };
        runner.run_steps(batch_size);
        if runner.is_done() {
            if let Some(runner) = self.runner.take() {
                self.report = Some(runner.finish()?);
            }
        }
        Ok(())
    }
}

#[wasm_bindgen]
impl WasmValidationRunner {
    /// `settings` is a partial `ValidationSettings` object; missing fields take
    /// their defaults. `undefined` runs the full default sweep.
    #[wasm_bindgen(constructor)]
    pub fn new(settings: JsValue) -> Result<WasmValidationRunner, JsValue> {
        console_error_panic_hook::set_once();

        let settings: ValidationSettings = if settings.is_undefined() || settings.is_null() {
            ValidationSettings::default()
        } else {
            from_value(settings)
                .map_err(|e| JsValue::from_str(&format!("Invalid validation settings: {}", e)))?
        };

        Self::from_settings(settings).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
    }

    pub fn is_done(&self) -> bool {
        self.report.is_some()
    }

    pub fn run_steps(&mut self, batch_size: u32) -> Result<JsValue, JsValue> {
        self.advance(batch_size as usize)
            .map_err(|e| JsValue::from_str(&format!("Validation failed: {:#}", e)))?;
        self.get_progress()
    }

    pub fn get_progress(&self) -> Result<JsValue, JsValue> {
        let progress = match (&self.runner, &self.report) {
            (Some(runner), _) => runner.progress(),
            (None, Some(report)) => {
                let total = report.addition.len()
                    + report.product.len()
                    + report.interval_relation.len()
                    + report.chain.len()
                    + report.associativity.len();
                nu_core::validation::ValidationProgress {
                    done: true,
                    stage: nu_core::validation::ValidationStage::Done,
                    cases_done: total,
                    total_cases: total,
                }
            }
            (None, None) => return Err(JsValue::from_str("Runner not initialized")),
        };
        to_value(&progress).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Full report with every table and the summary.
    pub fn get_result(&self) -> Result<JsValue, JsValue> {
        let report = self
            .report
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Validation run is not finished"))?;
        to_value(report).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn get_summary(&self) -> Result<JsValue, JsValue> {
        let report = self
            .report
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Validation run is not finished"))?;
        to_value(&report.summary)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}
