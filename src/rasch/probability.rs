//! rasch::probability — the one-parameter logistic item response function.
//!
//! Purpose
//! -------
//! Compute the Rasch probability of a correct response,
//! P(θ, b) = 1 / (1 + exp(−(θ − b))), and coerce loosely-typed inputs into
//! logits before they reach that formula.
//!
//! Key behaviors
//! -------------
//! - [`probability`] is the pure kernel used by every other engine routine.
//! - [`rasch_probability`] accepts anything implementing [`IntoLogit`]
//!   (floats, integers, numeric text) and fails with
//!   [`RaschError::InvalidLogit`] when coercion is impossible.
//!
//! Invariants & assumptions
//! ------------------------
//! - P is strictly increasing in θ, strictly decreasing in b, and
//!   P(b, b) = 0.5 exactly.
//! - 1 − P(θ, b) = P(b, θ).
//! - For finite inputs P lies in (0, 1) mathematically; in `f64` it rounds
//!   to exactly 0 or 1 only once |θ − b| exceeds roughly 37 logits, far
//!   outside the practical [-4, 4] range.
//!
//! Conventions
//! -----------
//! - Abilities and difficulties share the logit scale.
//! - No caching happens here; see
//!   [`ProbabilityCache`](crate::report::cache::ProbabilityCache) for the
//!   caller-owned memoization layer.
use crate::rasch::errors::{RaschError, RaschResult};

/// Rasch probability of a correct response for ability `ability` on an item
/// of difficulty `difficulty`.
///
/// ```rust
/// use rust_rasch::rasch::probability::probability;
///
/// assert_eq!(probability(0.7, 0.7), 0.5);
/// assert!(probability(1.0, 0.0) > 0.5);
/// ```
#[inline]
pub fn probability(ability: f64, difficulty: f64) -> f64 {
    1.0 / (1.0 + (-(ability - difficulty)).exp())
}

/// Coercing front end to [`probability`].
///
/// Parameters
/// ----------
/// - `ability`, `difficulty`: any value implementing [`IntoLogit`], e.g.
///   `f64`, `i32`, or a numeric string read from loosely-typed storage.
///
/// Returns
/// -------
/// `RaschResult<f64>`
///   The probability, or the coercion error of the first argument that
///   could not be interpreted as a finite logit.
///
/// Errors
/// ------
/// - `RaschError::InvalidLogit` for non-numeric text or non-finite numbers.
pub fn rasch_probability<A: IntoLogit, B: IntoLogit>(
    ability: A, difficulty: B,
) -> RaschResult<f64> {
    let theta = ability.into_logit()?;
    let b = difficulty.into_logit()?;
    Ok(probability(theta, b))
}

/// Explicit numeric coercion into a finite logit.
///
/// Implemented for the floating-point and integer primitives and for text,
/// so values read from a document store (where difficulties are often kept
/// as strings) are converted deliberately rather than defaulted.
pub trait IntoLogit {
    fn into_logit(self) -> RaschResult<f64>;
}

impl IntoLogit for f64 {
    fn into_logit(self) -> RaschResult<f64> {
        if !self.is_finite() {
            return Err(RaschError::InvalidLogit {
                input: self.to_string(),
                reason: "Logits must be finite.",
            });
        }
        Ok(self)
    }
}

impl IntoLogit for f32 {
    fn into_logit(self) -> RaschResult<f64> {
        f64::from(self).into_logit()
    }
}

macro_rules! impl_into_logit_for_int {
    ($($t:ty),*) => {
        $(
            impl IntoLogit for $t {
                fn into_logit(self) -> RaschResult<f64> {
                    Ok(self as f64)
                }
            }
        )*
    };
}

impl_into_logit_for_int!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

impl IntoLogit for &str {
    fn into_logit(self) -> RaschResult<f64> {
        let trimmed = self.trim();
        let value: f64 = trimmed.parse().map_err(|_| RaschError::InvalidLogit {
            input: self.to_string(),
            reason: "Text is not a number.",
        })?;
        if !value.is_finite() {
            return Err(RaschError::InvalidLogit {
                input: self.to_string(),
                reason: "Logits must be finite.",
            });
        }
        Ok(value)
    }
}

impl IntoLogit for &String {
    fn into_logit(self) -> RaschResult<f64> {
        self.as_str().into_logit()
    }
}

impl IntoLogit for String {
    fn into_logit(self) -> RaschResult<f64> {
        self.as_str().into_logit()
    }
}
