//! rasch::estimator — maximum-likelihood ability estimation.
//!
//! Purpose
//! -------
//! Estimate a subject's ability θ from a dichotomous response vector and
//! known item difficulties by solving the Rasch score equation
//!
//!   S(θ) = Σᵢ (xᵢ − P(θ, bᵢ)) = 0
//!
//! with bracketed root finding.
//!
//! Key behaviors
//! -------------
//! - S is the derivative of the Rasch log-likelihood in θ and is strictly
//!   decreasing, so a sign change across the bracket guarantees a unique
//!   root inside it.
//! - The root is found with Brent's method (`argmin`'s `BrentRoot`) on the
//!   bracket configured in [`EstimatorOptions`] (default [-4, 4]).
//! - When S has the same sign at both ends (always the case for
//!   all-correct or all-incorrect vectors, whose likelihood has no finite
//!   maximum) the result is [`AbilityEstimate::NotConverged`] rather than
//!   a bracket endpoint.
//!
//! Invariants & assumptions
//! ------------------------
//! - Responses and difficulties are aligned by item index and non-empty.
//! - The iteration count is capped by `EstimatorOptions::max_iter`; hitting
//!   the cap is reported as non-convergence.
//! - No randomness: identical inputs give bit-identical estimates.
//!
//! Conventions
//! -----------
//! - Non-convergence is an expected outcome for perfect and zero scores and
//!   is not an error. Errors are reserved for malformed input and backend
//!   failures.
//! - With the `obs_slog` feature and `verbose = true`, solver progress is
//!   streamed to the terminal through `argmin_observer_slog`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the typical-pattern scenario, both boundary
//!   patterns, option validation, determinism, and agreement between the
//!   estimate and a zero of the score function.
//! - The seeded synthetic round-trip lives in the integration tests.
use argmin::{
    core::{CostFunction, Error, Executor, State, TerminationReason, TerminationStatus},
    solver::brent::BrentRoot,
};

use crate::rasch::{
    errors::{RaschError, RaschResult},
    probability::probability,
    response::Response,
    validation::{validate_aligned, validate_bracket, validate_finite},
};

/// Root-finding configuration for [`estimate_ability`].
///
/// Default:
/// - bracket `[-4, 4]` logits,
/// - `tol = 1e-10`,
/// - `max_iter = 100`,
/// - `verbose = false`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorOptions {
    pub lower: f64,
    pub upper: f64,
    pub tol: f64,
    pub max_iter: u64,
    pub verbose: bool,
}

impl EstimatorOptions {
    /// Construct validated options.
    ///
    /// # Errors
    /// - [`RaschError::InvalidBracket`] unless both ends are finite and
    ///   `lower < upper`.
    /// - [`RaschError::InvalidTolerance`] unless `tol` is finite and > 0.
    /// - [`RaschError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(bracket: (f64, f64), tol: f64, max_iter: u64, verbose: bool) -> RaschResult<Self> {
        let (lower, upper) = bracket;
        validate_bracket(lower, upper)?;
        if !tol.is_finite() || tol <= 0.0 {
            return Err(RaschError::InvalidTolerance {
                tol,
                reason: "Tolerance must be finite and positive.",
            });
        }
        if max_iter == 0 {
            return Err(RaschError::InvalidMaxIter {
                max_iter,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(Self { lower, upper, tol, max_iter, verbose })
    }
}

impl Default for EstimatorOptions {
    fn default() -> Self {
        Self { lower: -4.0, upper: 4.0, tol: 1e-10, max_iter: 100, verbose: false }
    }
}

/// Why an estimate is unavailable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NonConvergence {
    /// S(θ) has the same sign at both bracket ends, so no root lies inside.
    /// Positive scores mean the estimate lies above the bracket
    /// (e.g. all-correct), negative below it (all-incorrect).
    NoSignChange { score_at_lower: f64, score_at_upper: f64 },
    /// Brent's method hit the iteration cap.
    MaxIterations { iterations: u64, last_theta: f64 },
}

/// Outcome of a single ability estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AbilityEstimate {
    Converged { theta: f64, iterations: u64 },
    NotConverged(NonConvergence),
}

impl AbilityEstimate {
    /// The estimate, or `None` when unavailable.
    pub fn theta(&self) -> Option<f64> {
        match self {
            AbilityEstimate::Converged { theta, .. } => Some(*theta),
            AbilityEstimate::NotConverged(_) => None,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, AbilityEstimate::Converged { .. })
    }
}

/// Rasch score function S(θ) = Σ (xᵢ − P(θ, bᵢ)).
///
/// Callers must pass aligned slices; extra elements of the longer slice are
/// ignored.
pub fn score_function(theta: f64, responses: &[Response], difficulties: &[f64]) -> f64 {
    responses.iter().zip(difficulties).map(|(r, &b)| r.score() - probability(theta, b)).sum()
}

/// Exposes S(θ) to `argmin` as a scalar "cost" whose root Brent's method
/// locates.
struct ScoreEquation<'a> {
    responses: &'a [Response],
    difficulties: &'a [f64],
}

impl CostFunction for ScoreEquation<'_> {
    type Param = f64;
    type Output = f64;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let value = score_function(*theta, self.responses, self.difficulties);
        if !value.is_finite() {
            return Err(RaschError::NonFiniteValue { index: 0, value }.into());
        }
        Ok(value)
    }
}

/// Estimate ability from a response vector and known item difficulties.
///
/// Parameters
/// ----------
/// - `responses`: `&[Response]`
///   Scored responses, one per item.
/// - `difficulties`: `&[f64]`
///   Item difficulties aligned with `responses`.
/// - `opts`: [`EstimatorOptions`]
///   Bracket, tolerance and iteration cap.
///
/// Returns
/// -------
/// `RaschResult<AbilityEstimate>`
///   - `Converged { theta, iterations }` when the score equation has a root
///     in the bracket.
///   - `NotConverged(..)` when it does not, or when the iteration cap is hit.
///
/// Errors
/// ------
/// - `RaschError::LengthMismatch` for misaligned inputs.
/// - `RaschError::EmptyInput` for an empty response vector.
/// - `RaschError::NonFiniteValue` for a non-finite difficulty.
/// - `RaschError::Solver` for backend failures.
///
/// Examples
/// --------
/// ```rust
/// use rust_rasch::rasch::estimator::{estimate_ability, EstimatorOptions};
/// use rust_rasch::rasch::response::Response::{Correct, Incorrect};
///
/// let opts = EstimatorOptions::default();
/// let typical = estimate_ability(&[Correct, Correct, Incorrect], &[-1.0, 0.0, 1.0], &opts)?;
/// let theta = typical.theta().expect("mixed pattern converges");
/// assert!(-1.0 < theta && theta < 1.0);
///
/// let perfect = estimate_ability(&[Correct, Correct, Correct], &[-1.0, 0.0, 1.0], &opts)?;
/// assert!(perfect.theta().is_none());
/// # Ok::<(), rust_rasch::rasch::errors::RaschError>(())
/// ```
pub fn estimate_ability(
    responses: &[Response], difficulties: &[f64], opts: &EstimatorOptions,
) -> RaschResult<AbilityEstimate> {
    validate_aligned(responses.len(), difficulties.len(), "difficulties")?;
    if responses.is_empty() {
        return Err(RaschError::EmptyInput { what: "responses" });
    }
    validate_finite(difficulties)?;

    let score_at_lower = score_function(opts.lower, responses, difficulties);
    let score_at_upper = score_function(opts.upper, responses, difficulties);
    if score_at_lower == 0.0 {
        return Ok(AbilityEstimate::Converged { theta: opts.lower, iterations: 0 });
    }
    if score_at_upper == 0.0 {
        return Ok(AbilityEstimate::Converged { theta: opts.upper, iterations: 0 });
    }
    if score_at_lower.signum() == score_at_upper.signum() {
        return Ok(AbilityEstimate::NotConverged(NonConvergence::NoSignChange {
            score_at_lower,
            score_at_upper,
        }));
    }

    run_brent(ScoreEquation { responses, difficulties }, opts)
}

// ---- Helper Methods ----

fn run_brent(problem: ScoreEquation<'_>, opts: &EstimatorOptions) -> RaschResult<AbilityEstimate> {
    let solver = BrentRoot::new(opts.lower, opts.upper, opts.tol);
    #[allow(unused_mut)]
    let mut executor =
        Executor::new(problem, solver).configure(|state| state.max_iters(opts.max_iter));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        executor = executor.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }

    let result = executor.run()?;
    let state = result.state();
    let iterations = state.get_iter();
    // `best_param` tracks the smallest signed S, not the root.
    let theta = state
        .get_param()
        .or_else(|| state.get_best_param())
        .copied()
        .ok_or(RaschError::MissingEstimate)?;

    match state.get_termination_status() {
        TerminationStatus::Terminated(TerminationReason::SolverConverged) => {
            Ok(AbilityEstimate::Converged { theta, iterations })
        }
        _ => Ok(AbilityEstimate::NotConverged(NonConvergence::MaxIterations {
            iterations,
            last_theta: theta,
        })),
    }
}
