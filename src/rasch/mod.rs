//! rasch — the Rasch (one-parameter logistic) measurement engine.
//!
//! Purpose
//! -------
//! Collect the pure numerical routines of the measurement model: response
//! probabilities, infit/outfit statistics, test information and
//! reliability, maximum-likelihood ability estimation, item characteristic
//! curves and synthetic response generation.
//!
//! Key behaviors
//! -------------
//! - [`probability`] / [`rasch_probability`]: P(θ, b) with explicit input
//!   coercion through [`IntoLogit`].
//! - [`infit_outfit`]: mean-square fit for one item or subject.
//! - [`test_information`], [`standard_error`], [`reliability`].
//! - [`estimate_ability`]: Brent root finding on the score equation,
//!   returning an [`AbilityEstimate`] that makes non-convergence explicit.
//! - [`item_characteristic_curve`] and [`simulate_responses`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Every routine is a pure function of its arguments: no global state,
//!   no I/O, no caching. All are safe to call concurrently.
//! - Unknown abilities/difficulties never reach this module as numbers;
//!   the `matrix` layer represents them as `None` and filters them out.
//! - Undefined statistics are errors flagged by
//!   [`RaschError::is_degenerate`], never NaN or a silent 0.
//!
//! Conventions
//! -----------
//! - Abilities and difficulties share the logit scale; the practical range
//!   is [-4, 4].
//! - Responses are [`Response`] values scored 1 (correct) / 0 (incorrect).
//!
//! Downstream usage
//! ----------------
//! - Rust callers usually import the surface in one line:
//!
//!   ```rust
//!   use rust_rasch::rasch::prelude::*;
//!
//!   let estimate = estimate_ability(
//!       &[Response::Correct, Response::Incorrect],
//!       &[-1.0, 1.0],
//!       &EstimatorOptions::default(),
//!   )?;
//!   assert!(estimate.is_converged());
//!   # Ok::<(), RaschError>(())
//!   ```
//!
//! - The `report` module composes these routines over a response matrix.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests for its formulas and error branches.
//! - The seeded simulate-then-estimate round trip lives in
//!   `tests/integration_rasch_pipeline.rs`.

pub mod curve;
pub mod errors;
pub mod estimator;
pub mod fit;
pub mod information;
pub mod probability;
pub mod response;
pub mod simulation;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::curve::{CurveOptions, CurvePoint, item_characteristic_curve};
pub use self::errors::{RaschError, RaschResult};
pub use self::estimator::{
    AbilityEstimate, EstimatorOptions, NonConvergence, estimate_ability, score_function,
};
pub use self::fit::{FitStatistics, infit_outfit};
pub use self::information::{
    Reliability, error_variance, reliability, standard_error, test_information,
};
pub use self::probability::{IntoLogit, probability, rasch_probability};
pub use self::response::Response;
pub use self::simulation::{SimOptions, simulate_responses, simulate_with_rng};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::curve::{CurveOptions, CurvePoint, item_characteristic_curve};
    pub use super::errors::{RaschError, RaschResult};
    pub use super::estimator::{AbilityEstimate, EstimatorOptions, NonConvergence, estimate_ability};
    pub use super::fit::{FitStatistics, infit_outfit};
    pub use super::information::{Reliability, reliability, standard_error, test_information};
    pub use super::probability::{probability, rasch_probability};
    pub use super::response::Response;
    pub use super::simulation::{SimOptions, simulate_responses};
}
