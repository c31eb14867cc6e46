//! rasch::curve — item characteristic curves.
//!
//! Purpose
//! -------
//! Sample P(θ, b) for one item over an evenly spaced ability grid, giving
//! the points a plotting layer draws as the item characteristic curve
//! (ICC).
//!
//! Invariants & assumptions
//! ------------------------
//! - The grid has exactly `points` values and includes both ends.
//! - Probabilities along the grid are strictly increasing and equal 0.5
//!   where the grid crosses θ = b.
//!
//! Conventions
//! -----------
//! - The default grid is 100 points over [-4, 4] logits.
use ndarray::Array1;

use crate::rasch::{
    errors::{RaschError, RaschResult},
    probability::probability,
    validation::validate_finite,
};

/// Ability grid for ICC sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveOptions {
    pub lower: f64,
    pub upper: f64,
    pub points: usize,
}

impl CurveOptions {
    /// Construct a validated grid.
    ///
    /// # Errors
    /// [`RaschError::InvalidCurve`] unless both ends are finite,
    /// `lower < upper` and `points >= 2`.
    pub fn new(lower: f64, upper: f64, points: usize) -> RaschResult<Self> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(RaschError::InvalidCurve {
                lower,
                upper,
                points,
                reason: "Range ends must be finite.",
            });
        }
        if lower >= upper {
            return Err(RaschError::InvalidCurve {
                lower,
                upper,
                points,
                reason: "Lower end must be strictly below upper end.",
            });
        }
        if points < 2 {
            return Err(RaschError::InvalidCurve {
                lower,
                upper,
                points,
                reason: "A curve needs at least two points.",
            });
        }
        Ok(Self { lower, upper, points })
    }

    /// The evenly spaced ability values of this grid.
    pub fn grid(&self) -> Array1<f64> {
        Array1::linspace(self.lower, self.upper, self.points)
    }
}

impl Default for CurveOptions {
    fn default() -> Self {
        Self { lower: -4.0, upper: 4.0, points: 100 }
    }
}

/// One sampled point of an ICC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub theta: f64,
    pub probability: f64,
}

/// Sample the ICC of an item with difficulty `difficulty`.
///
/// # Errors
/// [`RaschError::NonFiniteValue`] if `difficulty` is not finite.
///
/// ```rust
/// use rust_rasch::rasch::curve::{item_characteristic_curve, CurveOptions};
///
/// let opts = CurveOptions::new(-1.0, 1.0, 3)?;
/// let curve = item_characteristic_curve(0.0, &opts)?;
/// assert_eq!(curve[1].probability, 0.5);
/// # Ok::<(), rust_rasch::rasch::errors::RaschError>(())
/// ```
pub fn item_characteristic_curve(
    difficulty: f64, opts: &CurveOptions,
) -> RaschResult<Vec<CurvePoint>> {
    validate_finite(&[difficulty])?;
    Ok(opts
        .grid()
        .iter()
        .map(|&theta| CurvePoint { theta, probability: probability(theta, difficulty) })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    // Purpose
    // -------
    // The default grid matches the dashboard convention and the curve is
    // monotone.
    //
    // Given
    // -----
    // - Default options, b = 0.8.
    //
    // Expect
    // ------
    // - 100 points from -4 to 4, strictly increasing probabilities.
    fn item_characteristic_curve_default_grid_is_monotone() {
        // Act
        let curve = item_characteristic_curve(0.8, &CurveOptions::default()).expect("finite");

        // Assert
        assert_eq!(curve.len(), 100);
        assert_abs_diff_eq!(curve[0].theta, -4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(curve[99].theta, 4.0, epsilon = 1e-12);
        for pair in curve.windows(2) {
            assert!(pair[0].theta < pair[1].theta);
            assert!(pair[0].probability < pair[1].probability);
        }
    }

    #[test]
    fn curve_options_reject_invalid_grids() {
        assert!(matches!(CurveOptions::new(1.0, -1.0, 10), Err(RaschError::InvalidCurve { .. })));
        assert!(matches!(CurveOptions::new(-1.0, 1.0, 1), Err(RaschError::InvalidCurve { .. })));
        assert!(matches!(
            CurveOptions::new(f64::NEG_INFINITY, 1.0, 10),
            Err(RaschError::InvalidCurve { .. })
        ));
        assert!(matches!(
            item_characteristic_curve(f64::NAN, &CurveOptions::default()),
            Err(RaschError::NonFiniteValue { .. })
        ));
    }
}
