//! rasch::errors — error surface for the psychometric engine.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias shared by every engine routine
//! (probability, fit statistics, information/reliability, ability
//! estimation, curves) and by the reporting layer built on top of them.
//!
//! Key behaviors
//! -------------
//! - Define [`RaschResult`] and [`RaschError`] as the canonical result and
//!   error types for engine calls.
//! - Separate *degenerate-statistics* conditions (zero weights, zero
//!   information, zero total variance, empty inputs) from genuine input
//!   errors via [`RaschError::is_degenerate`], so callers can render
//!   "insufficient data" instead of failing a whole report.
//! - Normalize `argmin` backend failures into [`RaschError::Solver`].
//! - Map errors into Python exceptions when `python-bindings` is enabled:
//!   coercion failures become `TypeError`, everything else `ValueError`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Variants are small and `Clone + PartialEq` so they can be stored in
//!   report rows and compared in tests.
//! - Non-convergence of the ability estimator is *not* an error; it is a
//!   regular [`AbilityEstimate`](crate::rasch::estimator::AbilityEstimate)
//!   outcome.
//!
//! Testing notes
//! -------------
//! - Unit tests check payload embedding in `Display` messages, the
//!   degenerate/input split, and the `MatrixError` conversion.
use argmin::core::{ArgminError, Error};

use crate::matrix::errors::MatrixError;

#[cfg(feature = "python-bindings")]
use pyo3::{
    PyErr,
    exceptions::{PyTypeError, PyValueError},
};

/// Crate-wide result alias for engine operations.
pub type RaschResult<T> = Result<T, RaschError>;

#[derive(Debug, Clone, PartialEq)]
pub enum RaschError {
    // ---- Input coercion / validation ----
    /// A loosely-typed value could not be coerced into a finite logit.
    InvalidLogit { input: String, reason: &'static str },

    /// A numeric input contained NaN or ±∞.
    NonFiniteValue { index: usize, value: f64 },

    /// A value that must lie in [0, 1] (observed score, expected probability)
    /// fell outside it.
    OutOfUnitInterval { index: usize, value: f64, what: &'static str },

    /// Two sequences that must be aligned by index have different lengths.
    LengthMismatch { expected: usize, found: usize, what: &'static str },

    /// A response code other than 0 or 1.
    InvalidResponse { value: i64 },

    // ---- Degenerate statistics ----
    /// No paired values were supplied, so the statistic is undefined.
    EmptyInput { what: &'static str },

    /// Σ e(1 − e) is zero, so infit is undefined.
    DegenerateFit { weight_sum: f64 },

    /// Test information at `ability` is zero or numerically negligible.
    ZeroInformation { ability: f64, information: f64 },

    /// Reliability needs at least one known ability estimate.
    NoValidAbilities,

    /// Person variance plus mean error variance is zero.
    ZeroTotalVariance,

    // ---- Options ----
    /// Root-finding bracket must be finite with `lower < upper`.
    InvalidBracket { lower: f64, upper: f64, reason: &'static str },

    /// Tolerance must be finite and strictly positive.
    InvalidTolerance { tol: f64, reason: &'static str },

    /// Iteration cap must be positive.
    InvalidMaxIter { max_iter: u64, reason: &'static str },

    /// Curve grid needs at least two points on a finite, increasing range.
    InvalidCurve { lower: f64, upper: f64, points: usize, reason: &'static str },

    /// Fit band must satisfy `0 ≤ lower < upper`.
    InvalidFitBand { lower: f64, upper: f64, reason: &'static str },

    /// Memoization capacity must be at least one entry.
    InvalidCacheCapacity { capacity: usize },

    // ---- Solver ----
    /// The root finder finished without reporting a parameter.
    MissingEstimate,

    /// Wrapper for errors raised by the `argmin` backend.
    Solver { kind: &'static str, text: String },

    // ---- Data boundary / export ----
    /// Response-matrix assembly or record validation failed.
    Matrix(MatrixError),

    /// Writing a tabular export failed.
    Export { text: String },
}

impl RaschError {
    /// `true` for conditions that mean "not enough information to compute
    /// this statistic" rather than malformed input.
    pub fn is_degenerate(&self) -> bool {
        matches!(
            self,
            RaschError::EmptyInput { .. }
                | RaschError::DegenerateFit { .. }
                | RaschError::ZeroInformation { .. }
                | RaschError::NoValidAbilities
                | RaschError::ZeroTotalVariance
        )
    }
}

impl std::error::Error for RaschError {}

impl std::fmt::Display for RaschError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Input coercion / validation ----
            RaschError::InvalidLogit { input, reason } => {
                write!(f, "Cannot interpret {input:?} as a logit value: {reason}")
            }
            RaschError::NonFiniteValue { index, value } => {
                write!(f, "Non-finite value {value} at index {index}")
            }
            RaschError::OutOfUnitInterval { index, value, what } => {
                write!(f, "Invalid {what} {value} at index {index}: must lie in [0, 1]")
            }
            RaschError::LengthMismatch { expected, found, what } => {
                write!(f, "Length mismatch for {what}: expected {expected}, found {found}")
            }
            RaschError::InvalidResponse { value } => {
                write!(f, "Invalid response code {value}: must be 0 or 1")
            }

            // ---- Degenerate statistics ----
            RaschError::EmptyInput { what } => {
                write!(f, "Insufficient data: no valid {what}")
            }
            RaschError::DegenerateFit { weight_sum } => {
                write!(f, "Degenerate fit statistics: variance weights sum to {weight_sum}")
            }
            RaschError::ZeroInformation { ability, information } => {
                write!(
                    f,
                    "Undefined precision at ability {ability}: test information is {information}"
                )
            }
            RaschError::NoValidAbilities => {
                write!(f, "Insufficient data: no known ability estimates")
            }
            RaschError::ZeroTotalVariance => {
                write!(f, "Undefined reliability: person variance and error variance are both zero")
            }

            // ---- Options ----
            RaschError::InvalidBracket { lower, upper, reason } => {
                write!(f, "Invalid bracket [{lower}, {upper}]: {reason}")
            }
            RaschError::InvalidTolerance { tol, reason } => {
                write!(f, "Invalid tolerance {tol}: {reason}")
            }
            RaschError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            RaschError::InvalidCurve { lower, upper, points, reason } => {
                write!(f, "Invalid curve grid [{lower}, {upper}] with {points} points: {reason}")
            }
            RaschError::InvalidFitBand { lower, upper, reason } => {
                write!(f, "Invalid fit band [{lower}, {upper}]: {reason}")
            }
            RaschError::InvalidCacheCapacity { capacity } => {
                write!(f, "Invalid cache capacity {capacity}: must be at least 1")
            }

            // ---- Solver ----
            RaschError::MissingEstimate => {
                write!(f, "Root finder returned no parameter")
            }
            RaschError::Solver { kind, text } => {
                write!(f, "Solver error ({kind}): {text}")
            }

            // ---- Data boundary / export ----
            RaschError::Matrix(err) => write!(f, "Data error: {err}"),
            RaschError::Export { text } => write!(f, "Export failed: {text}"),
        }
    }
}

impl From<Error> for RaschError {
    fn from(original_err: Error) -> Self {
        match original_err.downcast::<ArgminError>() {
            Ok(argmin_err) => {
                let (kind, text) = match argmin_err {
                    ArgminError::InvalidParameter { text } => ("invalid parameter", text),
                    ArgminError::NotImplemented { text } => ("not implemented", text),
                    ArgminError::NotInitialized { text } => ("not initialized", text),
                    ArgminError::ConditionViolated { text } => ("condition violated", text),
                    ArgminError::CheckpointNotFound { text } => ("checkpoint not found", text),
                    ArgminError::PotentialBug { text } => ("potential bug", text),
                    ArgminError::ImpossibleError { text } => ("impossible error", text),
                    other => ("unknown", other.to_string()),
                };
                RaschError::Solver { kind, text }
            }
            Err(err) => match err.downcast::<RaschError>() {
                Ok(inner) => inner,
                Err(err) => RaschError::Solver { kind: "backend", text: err.to_string() },
            },
        }
    }
}

impl From<MatrixError> for RaschError {
    fn from(err: MatrixError) -> Self {
        RaschError::Matrix(err)
    }
}

impl From<csv::Error> for RaschError {
    fn from(err: csv::Error) -> Self {
        RaschError::Export { text: err.to_string() }
    }
}

#[cfg(feature = "python-bindings")]
impl From<RaschError> for PyErr {
    fn from(err: RaschError) -> PyErr {
        match err {
            RaschError::InvalidLogit { .. } | RaschError::InvalidResponse { .. } => {
                PyTypeError::new_err(err.to_string())
            }
            other => PyValueError::new_err(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Payload embedding in `Display` messages.
    // - The degenerate vs input-error split used by the reporting layer.
    // - Conversion from `MatrixError` and from argmin's error type.
    //
    // They intentionally DO NOT cover:
    // - The PyO3 conversion, which needs the Python C API at link time.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that `InvalidLogit` reports the offending input verbatim.
    //
    // Given
    // -----
    // - An `InvalidLogit` built from the text "hard".
    //
    // Expect
    // ------
    // - The message contains "hard".
    fn invalid_logit_includes_input_in_display() {
        // Arrange
        let err = RaschError::InvalidLogit { input: "hard".to_string(), reason: "not numeric" };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("hard"), "Display message should include the input.\nGot: {msg}");
    }

    #[test]
    // Purpose
    // -------
    // Ensure degenerate conditions are flagged and input errors are not.
    //
    // Given
    // -----
    // - One representative of each group.
    //
    // Expect
    // ------
    // - `is_degenerate` is true for degeneracies and false for input errors.
    fn is_degenerate_separates_insufficient_data_from_bad_input() {
        // Arrange
        let degenerate = [
            RaschError::EmptyInput { what: "pairs" },
            RaschError::DegenerateFit { weight_sum: 0.0 },
            RaschError::ZeroInformation { ability: 0.0, information: 0.0 },
            RaschError::NoValidAbilities,
            RaschError::ZeroTotalVariance,
        ];
        let invalid = [
            RaschError::NonFiniteValue { index: 0, value: f64::NAN },
            RaschError::LengthMismatch { expected: 2, found: 3, what: "difficulties" },
            RaschError::InvalidResponse { value: 2 },
        ];

        // Act & Assert
        for err in &degenerate {
            assert!(err.is_degenerate(), "{err:?} should be degenerate");
        }
        for err in &invalid {
            assert!(!err.is_degenerate(), "{err:?} should not be degenerate");
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that `LengthMismatch` reports both lengths.
    //
    // Given
    // -----
    // - expected = 4, found = 7.
    //
    // Expect
    // ------
    // - The message contains "4" and "7".
    fn length_mismatch_includes_both_lengths() {
        // Arrange
        let err = RaschError::LengthMismatch { expected: 4, found: 7, what: "expected values" };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains('4') && msg.contains('7'), "Got: {msg}");
    }

    #[test]
    // Purpose
    // -------
    // Check that matrix errors are wrapped rather than flattened.
    //
    // Given
    // -----
    // - A `MatrixError::DuplicateSubject`.
    //
    // Expect
    // ------
    // - Conversion yields `RaschError::Matrix` holding the same value.
    fn matrix_error_converts_into_matrix_variant() {
        // Arrange
        let inner = MatrixError::DuplicateSubject { id: "s1".to_string() };

        // Act
        let err: RaschError = inner.clone().into();

        // Assert
        assert_eq!(err, RaschError::Matrix(inner));
    }

    #[test]
    // Purpose
    // -------
    // Ensure an engine error smuggled through argmin's error type comes back
    // out unchanged.
    //
    // Given
    // -----
    // - A `RaschError::NonFiniteValue` converted into `argmin::core::Error`.
    //
    // Expect
    // ------
    // - Converting back yields the original variant.
    fn argmin_error_round_trips_engine_errors() {
        // Arrange
        let original = RaschError::NonFiniteValue { index: 1, value: f64::INFINITY };
        let wrapped: Error = original.clone().into();

        // Act
        let back = RaschError::from(wrapped);

        // Assert
        assert_eq!(back, original);
    }
}
