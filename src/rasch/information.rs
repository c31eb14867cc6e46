//! rasch::information — test information, measurement precision and
//! reliability.
//!
//! Purpose
//! -------
//! Aggregate per-item Fisher information into test-level precision
//! (standard error of measurement) and a sample-level reliability
//! coefficient.
//!
//! Key behaviors
//! -------------
//! - [`test_information`]: I(θ) = Σᵢ Pᵢ(θ)(1 − Pᵢ(θ)).
//! - [`standard_error`]: SE(θ) = 1 / √I(θ), undefined when I(θ) is zero or
//!   numerically negligible.
//! - [`reliability`]: person variance / (person variance + mean error
//!   variance) over the known ability estimates of a sample.
//!
//! Invariants & assumptions
//! ------------------------
//! - For a single item, I(θ) peaks at θ = b with value 0.25 and decreases
//!   monotonically moving away from b.
//! - Person variance is the population variance (denominator n) of the
//!   known abilities; unknown abilities are skipped, never treated as 0.
//! - The error variance of a person with zero information is taken as 0,
//!   so such persons do not inflate the error term.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the peak/monotonicity of single-item information,
//!   the SE guard, and the zero-variance reliability scenarios.
use statrs::statistics::Statistics;

use crate::rasch::{
    errors::{RaschError, RaschResult},
    probability::probability,
    validation::validate_finite,
};

/// Information below this level yields an undefined standard error.
pub const MIN_INFORMATION: f64 = 1e-12;

/// Fisher information the items provide at `ability`.
///
/// Empty `difficulties` give zero information.
pub fn test_information(ability: f64, difficulties: &[f64]) -> f64 {
    difficulties
        .iter()
        .map(|&b| {
            let p = probability(ability, b);
            p * (1.0 - p)
        })
        .sum()
}

/// Standard error of measurement at `ability`.
///
/// # Errors
/// - [`RaschError::NonFiniteValue`] if `ability` or any difficulty is not finite.
/// - [`RaschError::ZeroInformation`] when I(θ) < [`MIN_INFORMATION`]; the
///   precision is undefined rather than a meaningful zero error.
pub fn standard_error(ability: f64, difficulties: &[f64]) -> RaschResult<f64> {
    validate_finite(&[ability])?;
    validate_finite(difficulties)?;
    let information = test_information(ability, difficulties);
    if information < MIN_INFORMATION {
        return Err(RaschError::ZeroInformation { ability, information });
    }
    Ok(1.0 / information.sqrt())
}

/// Error variance 1 / I(θ), or 0 when the items carry no information at θ.
pub fn error_variance(ability: f64, difficulties: &[f64]) -> f64 {
    let information = test_information(ability, difficulties);
    if information > 0.0 { 1.0 / information } else { 0.0 }
}

/// Sample reliability and its components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reliability {
    coefficient: f64,
    person_variance: f64,
    error_variance: f64,
    n_persons: usize,
}

impl Reliability {
    /// pv / (pv + mev), in [0, 1].
    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    /// Population variance of the known ability estimates.
    pub fn person_variance(&self) -> f64 {
        self.person_variance
    }

    /// Mean of 1 / I(θ) over the same persons.
    pub fn error_variance(&self) -> f64 {
        self.error_variance
    }

    /// Number of persons with a known ability.
    pub fn n_persons(&self) -> usize {
        self.n_persons
    }
}

/// Reliability of a sample of ability estimates against a set of items.
///
/// Parameters
/// ----------
/// - `abilities`: `&[Option<f64>]`
///   Ability per person; `None` marks an unknown estimate and is skipped.
/// - `difficulties`: `&[f64]`
///   Known item difficulties defining the test.
///
/// Returns
/// -------
/// `RaschResult<Reliability>`
///
/// Errors
/// ------
/// - `RaschError::NonFiniteValue` if a known ability or a difficulty is not
///   finite.
/// - `RaschError::NoValidAbilities` if every ability is `None`.
/// - `RaschError::ZeroTotalVariance` if person variance and mean error
///   variance are both zero.
///
/// Examples
/// --------
/// ```rust
/// use rust_rasch::rasch::information::reliability;
///
/// // Identical abilities carry no true-score variance.
/// let r = reliability(&[Some(0.5), Some(0.5)], &[-1.0, 0.0, 1.0]).unwrap();
/// assert_eq!(r.coefficient(), 0.0);
/// ```
pub fn reliability(abilities: &[Option<f64>], difficulties: &[f64]) -> RaschResult<Reliability> {
    validate_finite(difficulties)?;
    let known: Vec<f64> = abilities.iter().flatten().copied().collect();
    validate_finite(&known)?;
    if known.is_empty() {
        return Err(RaschError::NoValidAbilities);
    }

    let person_variance = known.iter().population_variance();
    let error_variance =
        known.iter().map(|&theta| error_variance(theta, difficulties)).collect::<Vec<_>>().mean();

    let total = person_variance + error_variance;
    if total <= 0.0 {
        return Err(RaschError::ZeroTotalVariance);
    }

    Ok(Reliability {
        coefficient: person_variance / total,
        person_variance,
        error_variance,
        n_persons: known.len(),
    })
}
