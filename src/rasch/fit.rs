//! rasch::fit — infit and outfit mean-square statistics.
//!
//! Purpose
//! -------
//! Summarize how well observed responses for one item (or one subject)
//! agree with the Rasch-expected probabilities, using the standard
//! mean-square residual statistics.
//!
//! Key behaviors
//! -------------
//! - For each pair, the residual is r = o − e and the binomial variance
//!   weight is w = e(1 − e).
//! - Outfit = mean(r²), unweighted and therefore sensitive to surprising
//!   responses far from the item's difficulty.
//! - Infit = Σ w r² / Σ w, information-weighted and therefore dominated by
//!   responses near the item's difficulty.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs contain only paired, non-missing cells; dropping missing cells
//!   is the caller's job (see
//!   [`ResponseMatrix::item_pairs`](crate::matrix::response_matrix::ResponseMatrix::item_pairs)).
//! - Observed and expected values lie in [0, 1].
//! - Zero pairs or Σ w = 0 make the statistic undefined and are reported as
//!   errors, never as 0 or NaN.
//!
//! Conventions
//! -----------
//! - Values near 1.0 indicate good fit. The acceptance band is a reporting
//!   concern ([`FitBand`](crate::report::tables::FitBand)).
use crate::rasch::{
    errors::{RaschError, RaschResult},
    validation::{validate_aligned, validate_unit_interval},
};

/// Infit/outfit pair for one item or one subject.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitStatistics {
    infit: f64,
    outfit: f64,
    n: usize,
}

impl FitStatistics {
    /// Information-weighted mean square.
    pub fn infit(&self) -> f64 {
        self.infit
    }

    /// Unweighted mean square.
    pub fn outfit(&self) -> f64 {
        self.outfit
    }

    /// Number of paired cells the statistics were computed from.
    pub fn n(&self) -> usize {
        self.n
    }
}

/// Compute infit and outfit from aligned observed/expected values.
///
/// Parameters
/// ----------
/// - `observed`: `&[f64]`
///   Observed scores (0/1 for dichotomous items) in [0, 1].
/// - `expected`: `&[f64]`
///   Model probabilities for the same cells, in the same order.
///
/// Returns
/// -------
/// `RaschResult<FitStatistics>`
///
/// Errors
/// ------
/// - `RaschError::LengthMismatch` if the slices differ in length.
/// - `RaschError::EmptyInput` if there are no pairs.
/// - `RaschError::NonFiniteValue` / `RaschError::OutOfUnitInterval` for
///   invalid entries.
/// - `RaschError::DegenerateFit` if every expected value is exactly 0 or 1.
///
/// Examples
/// --------
/// ```rust
/// use rust_rasch::rasch::fit::infit_outfit;
///
/// let fit = infit_outfit(&[1.0, 0.0], &[0.5, 0.5]).unwrap();
/// assert!((fit.outfit() - 0.25).abs() < 1e-12);
/// assert!((fit.infit() - 0.25).abs() < 1e-12);
/// ```
pub fn infit_outfit(observed: &[f64], expected: &[f64]) -> RaschResult<FitStatistics> {
    validate_aligned(observed.len(), expected.len(), "expected values")?;
    if observed.is_empty() {
        return Err(RaschError::EmptyInput { what: "observed/expected pairs" });
    }
    validate_unit_interval(observed, "observed score")?;
    validate_unit_interval(expected, "expected probability")?;

    let mut sq_sum = 0.0;
    let mut weighted_sq_sum = 0.0;
    let mut weight_sum = 0.0;
    for (&o, &e) in observed.iter().zip(expected) {
        let r2 = (o - e).powi(2);
        let w = e * (1.0 - e);
        sq_sum += r2;
        weighted_sq_sum += w * r2;
        weight_sum += w;
    }

    if weight_sum <= 0.0 {
        return Err(RaschError::DegenerateFit { weight_sum });
    }

    let n = observed.len();
    Ok(FitStatistics { infit: weighted_sq_sum / weight_sum, outfit: sq_sum / n as f64, n })
}
