//! rasch::validation — shared input guards for engine routines.
//!
//! Purpose
//! -------
//! Centralize the preconditions shared by the fit, information, estimation
//! and curve routines so that each check is written once and reported with
//! the same [`RaschError`] variant everywhere.
//!
//! Invariants & assumptions
//! ------------------------
//! - Guards stop at the first offending element and report its index.
//! - Guards allocate nothing beyond the error payload.
//!
//! Testing notes
//! -------------
//! - Unit tests cover each error branch and the success path.
use crate::rasch::errors::{RaschError, RaschResult};

/// Require two index-aligned sequences to have the same length.
///
/// # Errors
/// [`RaschError::LengthMismatch`] with `expected = left`, `found = right`.
pub fn validate_aligned(left: usize, right: usize, what: &'static str) -> RaschResult<()> {
    if left != right {
        return Err(RaschError::LengthMismatch { expected: left, found: right, what });
    }
    Ok(())
}

/// Require every value to be finite.
///
/// # Errors
/// [`RaschError::NonFiniteValue`] for the first NaN or ±∞.
pub fn validate_finite(values: &[f64]) -> RaschResult<()> {
    for (index, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(RaschError::NonFiniteValue { index, value });
        }
    }
    Ok(())
}

/// Require every value to be finite and inside the closed unit interval.
///
/// Used for observed scores and model-expected probabilities.
///
/// # Errors
/// - [`RaschError::NonFiniteValue`] for NaN or ±∞.
/// - [`RaschError::OutOfUnitInterval`] for values below 0 or above 1.
pub fn validate_unit_interval(values: &[f64], what: &'static str) -> RaschResult<()> {
    for (index, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(RaschError::NonFiniteValue { index, value });
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(RaschError::OutOfUnitInterval { index, value, what });
        }
    }
    Ok(())
}

/// Require a finite, strictly increasing interval.
///
/// # Errors
/// [`RaschError::InvalidBracket`] if either end is non-finite or
/// `lower >= upper`.
pub fn validate_bracket(lower: f64, upper: f64) -> RaschResult<()> {
    if !lower.is_finite() || !upper.is_finite() {
        return Err(RaschError::InvalidBracket {
            lower,
            upper,
            reason: "Bracket ends must be finite.",
        });
    }
    if lower >= upper {
        return Err(RaschError::InvalidBracket {
            lower,
            upper,
            reason: "Lower end must be strictly below upper end.",
        });
    }
    Ok(())
}
