//! Numerical validation sweeps.
//!
//! Each sweep draws random N/U pairs, propagates them through the algebra and
//! records the result next to a reference baseline (Gaussian RSS or exact
//! interval arithmetic). The rows carry the column names used by the
//! published validation tables; writing them to disk is left to the host.

use crate::aggregate::cumulative_product;
use crate::baseline::{
    gaussian_product, gaussian_rss, interval_chain_halfwidth, interval_product_halfwidth,
};
use crate::nu::Nu;
use crate::ops;
use crate::tolerance::Tolerance;
use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub const DEFAULT_SEED: u64 = 20250926;

/// Upper bound on the number of generated rows in a single run, summed over
/// every sweep. Settings may arrive from JavaScript, so sizes are checked
/// before anything is allocated.
pub const MAX_TOTAL_CASES: usize = 5_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    pub seed: u64,
    pub addition_cases: usize,
    pub product_cases: usize,
    pub interval_cases: usize,
    pub chain_trials: usize,
    pub chain_lengths: Vec<usize>,
    pub associativity_cases: usize,
    pub tolerance: Tolerance,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            addition_cases: 8000,
            product_cases: 30000,
            interval_cases: 30000,
            chain_trials: 800,
            chain_lengths: vec![3, 5, 10, 20],
            associativity_cases: 20000,
            tolerance: Tolerance::default(),
        }
    }
}

impl ValidationSettings {
    pub fn validate(&self) -> Result<()> {
        if self.addition_cases == 0 {
            bail!("addition_cases must be greater than zero.");
        }
        if self.product_cases == 0 {
            bail!("product_cases must be greater than zero.");
        }
        if self.interval_cases == 0 {
            bail!("interval_cases must be greater than zero.");
        }
        if self.chain_trials == 0 {
            bail!("chain_trials must be greater than zero.");
        }
        if self.chain_lengths.is_empty() {
            bail!("chain_lengths must not be empty.");
        }
        if let Some(&length) = self.chain_lengths.iter().find(|&&l| l < 2) {
            bail!("chain lengths must be at least 2, got {}.", length);
        }
        if self.associativity_cases == 0 {
            bail!("associativity_cases must be greater than zero.");
        }
        if !(self.tolerance.abs > 0.0) {
            bail!("tolerance.abs must be positive.");
        }
        if !(self.tolerance.rel >= 0.0) {
            bail!("tolerance.rel must be non-negative.");
        }
        match self.checked_total_cases() {
            Some(total) if total <= MAX_TOTAL_CASES => {}
            Some(total) => bail!(
                "total case count {} exceeds the limit of {}.",
                total,
                MAX_TOTAL_CASES
            ),
            None => bail!(
                "total case count overflows; the limit is {}.",
                MAX_TOTAL_CASES
            ),
        }
        Ok(())
    }

    fn chain_cases(&self) -> Option<usize> {
        self.chain_trials.checked_mul(self.chain_lengths.len())
    }

    fn checked_total_cases(&self) -> Option<usize> {
        self.addition_cases
            .checked_add(self.product_cases)?
            .checked_add(self.interval_cases)?
            .checked_add(self.chain_cases()?)?
            .checked_add(self.associativity_cases)
    }
}

// --- Rows ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionCase {
    pub k: usize,
    pub sum_u_nu: f64,
    pub rss_u: f64,
    pub ratio_nu_over_rss: Option<f64>,
    pub nu_minus_rss: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCase {
    pub n1: f64,
    pub u1: f64,
    pub n2: f64,
    pub u2: f64,
    pub u_nu: f64,
    pub u_gauss: f64,
    pub ratio_nu_over_gauss: Option<f64>,
    pub diff_nu_minus_gauss: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalCase {
    pub n1: f64,
    pub u1: f64,
    pub n2: f64,
    pub u2: f64,
    pub u_nu: f64,
    pub interval_halfwidth: f64,
    pub nu_minus_interval: f64,
    pub rel_error: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainCase {
    #[serde(rename = "L")]
    pub length: usize,
    pub nu_u: f64,
    pub interval_half: f64,
    pub ratio_nu_over_interval: Option<f64>,
    pub diff_nu_minus_interval: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvariantCase {
    pub n: f64,
    pub u: f64,
    #[serde(rename = "M0")]
    pub m0: f64,
    #[serde(rename = "M_catch")]
    pub m_catch: f64,
    #[serde(rename = "M_flip")]
    pub m_flip: f64,
    pub max_abs_error: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociativityCase {
    pub nominal_lhs: f64,
    pub nominal_rhs: f64,
    pub abs_diff: f64,
    pub rel_diff: f64,
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator > 0.0).then(|| numerator / denominator)
}

fn random_pair<R: Rng + ?Sized>(rng: &mut R, n_range: (f64, f64), u_range: (f64, f64)) -> Nu {
    Nu::new(
        rng.gen_range(n_range.0..n_range.1),
        rng.gen_range(u_range.0..u_range.1),
    )
}

// --- Generators ---

/// Sum of 2..=50 random terms against Gaussian RSS of their uncertainties.
pub fn addition_case<R: Rng + ?Sized>(rng: &mut R) -> AdditionCase {
    let k = rng.gen_range(2..=50);
    let terms: Vec<Nu> = (0..k)
        .map(|_| random_pair(rng, (-100.0, 100.0), (0.1, 10.0)))
        .collect();
    let sum_u_nu = crate::aggregate::cumulative_sum(&terms).u();
    let uncertainties: Vec<f64> = terms.iter().map(Nu::u).collect();
    let rss_u = gaussian_rss(&uncertainties);
    AdditionCase {
        k,
        sum_u_nu,
        rss_u,
        ratio_nu_over_rss: ratio(sum_u_nu, rss_u),
        nu_minus_rss: sum_u_nu - rss_u,
    }
}

/// Product of two random pairs against first-order Gaussian propagation.
pub fn product_case<R: Rng + ?Sized>(rng: &mut R) -> ProductCase {
    let a = random_pair(rng, (-100.0, 100.0), (0.1, 10.0));
    let b = random_pair(rng, (-100.0, 100.0), (0.1, 10.0));
    let u_nu = ops::multiply(a, b).u();
    let u_gauss = gaussian_product(a, b);
    ProductCase {
        n1: a.n(),
        u1: a.u(),
        n2: b.n(),
        u2: b.u(),
        u_nu,
        u_gauss,
        ratio_nu_over_gauss: ratio(u_nu, u_gauss),
        diff_nu_minus_gauss: u_nu - u_gauss,
    }
}

/// Product of two pairs with positive nominals against the exact interval
/// half-width.
pub fn interval_case<R: Rng + ?Sized>(rng: &mut R) -> IntervalCase {
    let a = random_pair(rng, (0.1, 100.0), (0.01, 10.0));
    let b = random_pair(rng, (0.1, 100.0), (0.01, 10.0));
    let u_nu = ops::multiply(a, b).u();
    let interval_halfwidth = interval_product_halfwidth(a, b);
    let diff = u_nu - interval_halfwidth;
    IntervalCase {
        n1: a.n(),
        u1: a.u(),
        n2: b.n(),
        u2: b.u(),
        u_nu,
        interval_halfwidth,
        nu_minus_interval: diff,
        rel_error: ratio(diff.abs(), interval_halfwidth).unwrap_or(0.0),
    }
}

/// Repeated multiplication of `length` factors near one.
pub fn chain_case<R: Rng + ?Sized>(length: usize, rng: &mut R) -> ChainCase {
    let chain: Vec<Nu> = (0..length)
        .map(|_| random_pair(rng, (0.5, 2.0), (0.01, 0.2)))
        .collect();
    let nu_u = cumulative_product(&chain).u();
    let interval_half = interval_chain_halfwidth(&chain);
    ChainCase {
        length,
        nu_u,
        interval_half,
        ratio_nu_over_interval: ratio(nu_u, interval_half),
        diff_nu_minus_interval: nu_u - interval_half,
    }
}

/// Nominal difference between `(a*b)*c` and `a*(b*c)`.
pub fn associativity_case<R: Rng + ?Sized>(rng: &mut R) -> AssociativityCase {
    let a = random_pair(rng, (-100.0, 100.0), (0.1, 10.0));
    let b = random_pair(rng, (-100.0, 100.0), (0.1, 10.0));
    let c = random_pair(rng, (-100.0, 100.0), (0.1, 10.0));
    let lhs = ops::multiply(ops::multiply(a, b), c).n();
    let rhs = ops::multiply(a, ops::multiply(b, c)).n();
    let abs_diff = (lhs - rhs).abs();
    AssociativityCase {
        nominal_lhs: lhs,
        nominal_rhs: rhs,
        abs_diff,
        rel_diff: ratio(abs_diff, lhs.abs()).unwrap_or(0.0),
    }
}

fn linspace(start: f64, stop: f64, count: usize) -> impl Iterator<Item = f64> {
    let step = if count > 1 {
        (stop - start) / (count - 1) as f64
    } else {
        0.0
    };
    (0..count).map(move |i| start + step * i as f64)
}

/// Catch/Flip invariant check over `n in [-10, 10]` (9 points) and
/// `u in [0, 10]` (6 points).
pub fn invariants_grid() -> Vec<InvariantCase> {
    let mut rows = Vec::with_capacity(9 * 6);
    for n in linspace(-10.0, 10.0, 9) {
        for u in linspace(0.0, 10.0, 6) {
            let x = Nu::new(n, u);
            let m0 = x.invariant();
            let m_catch = x.catch().invariant();
            let m_flip = x.flip().invariant();
            rows.push(InvariantCase {
                n,
                u,
                m0,
                m_catch,
                m_flip,
                max_abs_error: (m0 - m_catch).abs().max((m0 - m_flip).abs()),
            });
        }
    }
    rows
}

// --- Summary ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioStats {
    pub count: usize,
    pub min_ratio: f64,
    pub median_ratio: f64,
    pub max_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConservatismSummary {
    pub rows: usize,
    pub ratios: Option<RatioStats>,
    pub min_diff: f64,
    pub max_diff: f64,
    /// Rows whose N/U uncertainty falls below the baseline beyond tolerance.
    pub violations_below_baseline: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalSummary {
    pub rows: usize,
    pub min_diff_nu_minus_interval: f64,
    pub max_diff_nu_minus_interval: f64,
    pub violations_beyond_tol: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSummary {
    pub rows: usize,
    pub ratio_stats_by_length: BTreeMap<usize, RatioStats>,
    pub max_diff: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvariantSummary {
    pub rows: usize,
    pub max_abs_error: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociativitySummary {
    pub rows: usize,
    pub max_abs_diff: f64,
    pub median_abs_diff: f64,
    pub violations_beyond_tol: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub addition: ConservatismSummary,
    pub product: ConservatismSummary,
    /// Product ratios above `sqrt(2) + tolerance.abs`.
    pub product_ratio_above_sqrt2: usize,
    pub interval_relation: IntervalSummary,
    pub chain: ChainSummary,
    pub invariants: InvariantSummary,
    pub associativity_nominal: AssociativitySummary,
    pub tolerance: Tolerance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub settings: ValidationSettings,
    pub addition: Vec<AdditionCase>,
    pub product: Vec<ProductCase>,
    pub interval_relation: Vec<IntervalCase>,
    pub chain: Vec<ChainCase>,
    pub invariants: Vec<InvariantCase>,
    pub associativity: Vec<AssociativityCase>,
    pub summary: ValidationSummary,
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Min/median/max of the finite values, or `None` if there are none.
pub fn ratio_stats(values: impl IntoIterator<Item = f64>) -> Option<RatioStats> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    Some(RatioStats {
        count: sorted.len(),
        min_ratio: sorted[0],
        median_ratio: median_of_sorted(&sorted),
        max_ratio: sorted[sorted.len() - 1],
    })
}

fn min_max(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
}

fn conservatism(
    rows: usize,
    pairs: impl Iterator<Item = (f64, f64, Option<f64>)> + Clone,
    tolerance: Tolerance,
) -> ConservatismSummary {
    let (min_diff, max_diff) = min_max(pairs.clone().map(|(nu, base, _)| nu - base));
    let violations_below_baseline = pairs
        .clone()
        .filter(|&(nu, base, _)| nu < base && !tolerance.close(nu, base))
        .count();
    ConservatismSummary {
        rows,
        ratios: ratio_stats(pairs.filter_map(|(_, _, r)| r)),
        min_diff,
        max_diff,
        violations_below_baseline,
    }
}

pub fn summarize(
    tolerance: Tolerance,
    addition: &[AdditionCase],
    product: &[ProductCase],
    interval_relation: &[IntervalCase],
    chain: &[ChainCase],
    invariants: &[InvariantCase],
    associativity: &[AssociativityCase],
) -> ValidationSummary {
    let addition_summary = conservatism(
        addition.len(),
        addition
            .iter()
            .map(|c| (c.sum_u_nu, c.rss_u, c.ratio_nu_over_rss)),
        tolerance,
    );
    let product_summary = conservatism(
        product.len(),
        product
            .iter()
            .map(|c| (c.u_nu, c.u_gauss, c.ratio_nu_over_gauss)),
        tolerance,
    );
    let sqrt2_limit = std::f64::consts::SQRT_2 + tolerance.abs;
    let product_ratio_above_sqrt2 = product
        .iter()
        .filter_map(|c| c.ratio_nu_over_gauss)
        .filter(|&r| r > sqrt2_limit)
        .count();

    let (min_interval, max_interval) = min_max(interval_relation.iter().map(|c| c.nu_minus_interval));
    let interval_summary = IntervalSummary {
        rows: interval_relation.len(),
        min_diff_nu_minus_interval: min_interval,
        max_diff_nu_minus_interval: max_interval,
        violations_beyond_tol: interval_relation
            .iter()
            .filter(|c| c.rel_error > tolerance.rel)
            .count(),
    };

    let mut by_length: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
    for case in chain {
        if let Some(r) = case.ratio_nu_over_interval {
            by_length.entry(case.length).or_default().push(r);
        }
    }
    let chain_summary = ChainSummary {
        rows: chain.len(),
        ratio_stats_by_length: by_length
            .into_iter()
            .filter_map(|(length, ratios)| ratio_stats(ratios).map(|s| (length, s)))
            .collect(),
        max_diff: chain
            .iter()
            .map(|c| c.diff_nu_minus_interval.abs())
            .fold(0.0, f64::max),
    };

    let invariant_summary = InvariantSummary {
        rows: invariants.len(),
        max_abs_error: invariants
            .iter()
            .map(|c| c.max_abs_error)
            .fold(0.0, f64::max),
    };

    let associativity_summary = AssociativitySummary {
        rows: associativity.len(),
        max_abs_diff: associativity
            .iter()
            .map(|c| c.abs_diff)
            .fold(0.0, f64::max),
        median_abs_diff: ratio_stats(associativity.iter().map(|c| c.abs_diff))
            .map_or(0.0, |s| s.median_ratio),
        violations_beyond_tol: associativity
            .iter()
            .filter(|c| c.rel_diff > tolerance.rel)
            .count(),
    };

    ValidationSummary {
        addition: addition_summary,
        product: product_summary,
        product_ratio_above_sqrt2,
        interval_relation: interval_summary,
        chain: chain_summary,
        invariants: invariant_summary,
        associativity_nominal: associativity_summary,
        tolerance,
    }
}

// --- Runner ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStage {
    Addition,
    Product,
    Interval,
    Chain,
    Associativity,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationProgress {
    pub done: bool,
    pub stage: ValidationStage,
    pub cases_done: usize,
    pub total_cases: usize,
}

/// Runs every sweep in batches so a host can report progress between calls.
///
/// Cases are drawn in a fixed order from one seeded RNG, so a batched run and
/// [`run_validation`] produce identical tables for the same settings.
pub struct ValidationRunner {
    settings: ValidationSettings,
    rng: StdRng,
    stage: ValidationStage,
    stage_index: usize,
    cases_done: usize,
    addition: Vec<AdditionCase>,
    product: Vec<ProductCase>,
    interval_relation: Vec<IntervalCase>,
    chain: Vec<ChainCase>,
    associativity: Vec<AssociativityCase>,
}

impl ValidationRunner {
    pub fn new(settings: ValidationSettings) -> Result<Self> {
        settings
            .validate()
            .context("Invalid validation settings.")?;
        let chain_cases = settings.chain_cases().unwrap_or_default();
        debug!(
            seed = settings.seed,
            addition = settings.addition_cases,
            product = settings.product_cases,
            interval = settings.interval_cases,
            chain = chain_cases,
            associativity = settings.associativity_cases,
            "starting validation sweeps"
        );
        Ok(Self {
            rng: StdRng::seed_from_u64(settings.seed),
            addition: Vec::with_capacity(settings.addition_cases),
            product: Vec::with_capacity(settings.product_cases),
            interval_relation: Vec::with_capacity(settings.interval_cases),
            chain: Vec::with_capacity(chain_cases),
            associativity: Vec::with_capacity(settings.associativity_cases),
            settings,
            stage: ValidationStage::Addition,
            stage_index: 0,
            cases_done: 0,
        })
    }

    pub fn settings(&self) -> &ValidationSettings {
        &self.settings
    }

    pub fn total_cases(&self) -> usize {
        // Bounded by `MAX_TOTAL_CASES` once the settings have validated.
        self.settings.checked_total_cases().unwrap_or(usize::MAX)
    }

    fn stage_len(&self, stage: ValidationStage) -> usize {
        match stage {
            ValidationStage::Addition => self.settings.addition_cases,
            ValidationStage::Product => self.settings.product_cases,
            ValidationStage::Interval => self.settings.interval_cases,
            ValidationStage::Chain => self.settings.chain_cases().unwrap_or_default(),
            ValidationStage::Associativity => self.settings.associativity_cases,
            ValidationStage::Done => 0,
        }
    }

    fn next_stage(stage: ValidationStage) -> ValidationStage {
        match stage {
            ValidationStage::Addition => ValidationStage::Product,
            ValidationStage::Product => ValidationStage::Interval,
            ValidationStage::Interval => ValidationStage::Chain,
            ValidationStage::Chain => ValidationStage::Associativity,
            ValidationStage::Associativity | ValidationStage::Done => ValidationStage::Done,
        }
    }

    pub fn is_done(&self) -> bool {
        self.stage == ValidationStage::Done
    }

    pub fn progress(&self) -> ValidationProgress {
        ValidationProgress {
            done: self.is_done(),
            stage: self.stage,
            cases_done: self.cases_done,
            total_cases: self.total_cases(),
        }
    }

    fn run_one(&mut self) {
        let rng = &mut self.rng;
        match self.stage {
            ValidationStage::Addition => self.addition.push(addition_case(rng)),
            ValidationStage::Product => self.product.push(product_case(rng)),
            ValidationStage::Interval => self.interval_relation.push(interval_case(rng)),
            ValidationStage::Chain => {
                let length = self.settings.chain_lengths[self.stage_index / self.settings.chain_trials];
                self.chain.push(chain_case(length, rng));
            }
            ValidationStage::Associativity => self.associativity.push(associativity_case(rng)),
            ValidationStage::Done => return,
        }
        self.stage_index += 1;
        self.cases_done += 1;
    }

    /// Draws up to `batch_size` cases, crossing stage boundaries as needed.
    pub fn run_steps(&mut self, batch_size: usize) -> ValidationProgress {
        let mut remaining = batch_size;
        while remaining > 0 && !self.is_done() {
            if self.stage_index >= self.stage_len(self.stage) {
                info!(stage = ?self.stage, rows = self.stage_index, "sweep complete");
                self.stage = Self::next_stage(self.stage);
                self.stage_index = 0;
                continue;
            }
            self.run_one();
            remaining -= 1;
        }
        // Settle a stage that finished exactly on the batch boundary.
        while !self.is_done() && self.stage_index >= self.stage_len(self.stage) {
            info!(stage = ?self.stage, rows = self.stage_index, "sweep complete");
            self.stage = Self::next_stage(self.stage);
            self.stage_index = 0;
        }
        self.progress()
    }

    /// Consumes a finished runner and assembles the report.
    pub fn finish(self) -> Result<ValidationReport> {
        if !self.is_done() {
            bail!(
                "Validation run is incomplete ({} of {} cases).",
                self.cases_done,
                self.total_cases()
            );
        }
        let invariants = invariants_grid();
        let summary = summarize(
            self.settings.tolerance,
            &self.addition,
            &self.product,
            &self.interval_relation,
            &self.chain,
            &invariants,
            &self.associativity,
        );
        info!(
            addition_violations = summary.addition.violations_below_baseline,
            product_violations = summary.product.violations_below_baseline,
            invariant_error = summary.invariants.max_abs_error,
            "validation summary ready"
        );
        Ok(ValidationReport {
            settings: self.settings,
            addition: self.addition,
            product: self.product,
            interval_relation: self.interval_relation,
            chain: self.chain,
            invariants,
            associativity: self.associativity,
            summary,
        })
    }
}

/// Runs every sweep to completion with the RNG seeded from `settings.seed`.
pub fn run_validation(settings: &ValidationSettings) -> Result<ValidationReport> {
    let mut runner = ValidationRunner::new(settings.clone())?;
    let total = runner.total_cases();
    runner.run_steps(total);
    runner.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_settings() -> ValidationSettings {
        ValidationSettings {
            seed: 7,
            addition_cases: 200,
            product_cases: 500,
            interval_cases: 300,
            chain_trials: 20,
            chain_lengths: vec![3, 5],
            associativity_cases: 300,
            tolerance: Tolerance::default(),
        }
    }

    fn assert_err_contains<T: std::fmt::Debug>(result: Result<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err:#}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn default_settings_are_valid() {
        let settings = ValidationSettings::default();
        assert_eq!(settings.seed, DEFAULT_SEED);
        settings.validate().expect("defaults should validate");
    }

    #[test]
    fn validate_rejects_bad_settings() {
        let mut settings = small_settings();
        settings.product_cases = 0;
        assert_err_contains(settings.validate(), "product_cases");

        let mut settings = small_settings();
        settings.chain_lengths = vec![];
        assert_err_contains(settings.validate(), "chain_lengths");

        let mut settings = small_settings();
        settings.chain_lengths = vec![3, 1];
        assert_err_contains(settings.validate(), "at least 2");

        let mut settings = small_settings();
        settings.tolerance.abs = 0.0;
        assert_err_contains(settings.validate(), "tolerance.abs");

        let mut settings = small_settings();
        settings.addition_cases = 0;
        assert_err_contains(ValidationRunner::new(settings).map(|_| ()), "addition_cases");
    }

    #[test]
    fn validate_rejects_overflowing_case_counts() {
        let mut settings = small_settings();
        settings.chain_trials = usize::MAX / 2 + 1;
        settings.chain_lengths = vec![3, 5];
        assert_err_contains(settings.validate(), "overflows");
        assert_err_contains(ValidationRunner::new(settings).map(|_| ()), "overflows");

        let mut settings = small_settings();
        settings.addition_cases = usize::MAX;
        assert_err_contains(settings.validate(), "overflows");
    }

    #[test]
    fn validate_caps_total_case_count() {
        let mut settings = small_settings();
        settings.product_cases = MAX_TOTAL_CASES;
        assert_err_contains(settings.validate(), "exceeds the limit");

        let mut settings = small_settings();
        settings.chain_trials = MAX_TOTAL_CASES / 2;
        settings.chain_lengths = vec![3, 5, 10];
        assert_err_contains(settings.validate(), "exceeds the limit");
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: ValidationSettings =
            serde_json::from_str(r#"{"seed": 1, "product_cases": 10}"#).expect("settings");
        assert_eq!(settings.seed, 1);
        assert_eq!(settings.product_cases, 10);
        assert_eq!(settings.chain_lengths, vec![3, 5, 10, 20]);
    }

    #[test]
    fn addition_is_never_below_rss() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let case = addition_case(&mut rng);
            assert!((2..=50).contains(&case.k));
            assert!(case.ratio_nu_over_rss.expect("ratio") >= 1.0);
            assert!(case.nu_minus_rss >= 0.0);
        }
    }

    #[test]
    fn product_ratio_stays_within_sqrt2() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..500 {
            let case = product_case(&mut rng);
            let ratio = case.ratio_nu_over_gauss.expect("ratio");
            assert!(ratio >= 1.0 - 1e-12, "ratio {ratio}");
            assert!(ratio <= std::f64::consts::SQRT_2 + 1e-9, "ratio {ratio}");
        }
    }

    #[test]
    fn interval_case_matches_for_positive_nominals() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut checked = 0;
        for _ in 0..200 {
            let case = interval_case(&mut rng);
            // Only intervals that stay on the positive side agree exactly.
            if case.n1 - case.u1 >= 0.0 && case.n2 - case.u2 >= 0.0 {
                assert!(case.rel_error < 1e-9, "rel_error {}", case.rel_error);
                checked += 1;
            }
        }
        assert!(checked > 0);
    }

    #[test]
    fn chain_case_reports_length() {
        let mut rng = StdRng::seed_from_u64(4);
        let case = chain_case(10, &mut rng);
        assert_eq!(case.length, 10);
        assert!(case.nu_u > 0.0 && case.interval_half > 0.0);
    }

    #[test]
    fn invariants_grid_is_exact() {
        let grid = invariants_grid();
        assert_eq!(grid.len(), 54);
        assert_eq!(grid[0].n, -10.0);
        assert_eq!(grid[grid.len() - 1].u, 10.0);
        assert!(grid.iter().all(|row| row.max_abs_error == 0.0));
    }

    #[test]
    fn ratio_stats_median_and_non_finite_filtering() {
        let stats = ratio_stats([3.0, 1.0, f64::NAN, 2.0, 4.0]).expect("stats");
        assert_eq!(stats.count, 4);
        assert_eq!(stats.min_ratio, 1.0);
        assert_eq!(stats.median_ratio, 2.5);
        assert_eq!(stats.max_ratio, 4.0);
        assert!(ratio_stats([f64::INFINITY]).is_none());
    }

    #[test]
    fn run_validation_produces_full_report() {
        let settings = small_settings();
        let report = run_validation(&settings).expect("report");
        assert_eq!(report.addition.len(), 200);
        assert_eq!(report.product.len(), 500);
        assert_eq!(report.interval_relation.len(), 300);
        assert_eq!(report.chain.len(), 40);
        assert_eq!(report.associativity.len(), 300);
        assert_eq!(report.invariants.len(), 54);

        let summary = &report.summary;
        assert_eq!(summary.addition.violations_below_baseline, 0);
        assert_eq!(summary.product.violations_below_baseline, 0);
        assert_eq!(summary.product_ratio_above_sqrt2, 0);
        assert!(summary.addition.ratios.expect("ratios").min_ratio >= 1.0);
        assert_eq!(summary.invariants.max_abs_error, 0.0);
        assert_eq!(
            summary.chain.ratio_stats_by_length.keys().copied().collect::<Vec<_>>(),
            vec![3, 5]
        );
        assert_eq!(summary.chain.ratio_stats_by_length[&3].count, 20);
    }

    #[test]
    fn batched_runner_matches_single_run() {
        let settings = small_settings();
        let expected = run_validation(&settings).expect("report");

        let mut runner = ValidationRunner::new(settings).expect("runner");
        let total = runner.total_cases();
        let mut last = runner.progress();
        assert_eq!(last.stage, ValidationStage::Addition);
        while !runner.is_done() {
            let progress = runner.run_steps(37);
            assert!(progress.cases_done >= last.cases_done);
            last = progress;
        }
        assert!(last.done);
        assert_eq!(last.cases_done, total);
        assert_eq!(runner.finish().expect("report"), expected);
    }

    #[test]
    fn batch_ending_on_stage_boundary_advances_stage() {
        let mut runner = ValidationRunner::new(small_settings()).expect("runner");
        let progress = runner.run_steps(200);
        assert_eq!(progress.cases_done, 200);
        assert_eq!(progress.stage, ValidationStage::Product);
    }

    #[test]
    fn tolerance_violations_use_relative_error() {
        let tolerance = Tolerance::default();
        let interval = [
            IntervalCase {
                n1: 1.0,
                u1: 1e-12,
                n2: 1.0,
                u2: 1e-12,
                u_nu: 2.2e-12,
                interval_halfwidth: 2.0e-12,
                nu_minus_interval: 2.0e-13,
                rel_error: 0.1,
            },
            IntervalCase {
                n1: 2.0,
                u1: 0.1,
                n2: 3.0,
                u2: 0.2,
                u_nu: 0.7,
                interval_halfwidth: 0.7,
                nu_minus_interval: 0.0,
                rel_error: 0.0,
            },
        ];
        let associativity = [
            AssociativityCase {
                nominal_lhs: 1.0e-12,
                nominal_rhs: 1.1e-12,
                abs_diff: 1.0e-13,
                rel_diff: 0.1,
            },
            AssociativityCase {
                nominal_lhs: 6.0,
                nominal_rhs: 6.0,
                abs_diff: 0.0,
                rel_diff: 0.0,
            },
        ];
        let summary = summarize(tolerance, &[], &[], &interval, &[], &[], &associativity);
        assert_eq!(summary.interval_relation.violations_beyond_tol, 1);
        assert_eq!(summary.associativity_nominal.violations_beyond_tol, 1);
    }

    #[test]
    fn finish_rejects_incomplete_run() {
        let mut runner = ValidationRunner::new(small_settings()).expect("runner");
        runner.run_steps(5);
        assert_err_contains(runner.finish(), "incomplete");
    }

    #[test]
    fn same_seed_same_tables() {
        let a = run_validation(&small_settings()).expect("a");
        let b = run_validation(&small_settings()).expect("b");
        assert_eq!(a.product, b.product);
        let mut other = small_settings();
        other.seed = 8;
        let c = run_validation(&other).expect("c");
        assert_ne!(a.product, c.product);
    }
}
