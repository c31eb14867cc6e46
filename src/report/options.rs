//! report::options — configuration for one analysis pass.
use crate::{
    matrix::response_matrix::UnansweredPolicy,
    rasch::{
        curve::CurveOptions,
        errors::{RaschError, RaschResult},
        estimator::EstimatorOptions,
    },
    report::{cache::DEFAULT_CACHE_CAPACITY, tables::FitBand},
};

/// Analysis-level configuration.
///
/// Fields:
/// - `estimator: EstimatorOptions` — bracket, tolerance and iteration cap for
///   per-subject re-estimation.
/// - `curve: CurveOptions` — ability grid for item characteristic curves.
/// - `fit_band: FitBand` — acceptance band for fit classification.
/// - `unanswered: UnansweredPolicy` — scoring of unanswered items.
/// - `min_ability: f64` — heatmap rows keep subjects with a known ability at
///   or above this value.
/// - `cache_capacity: usize` — bound of the probability memo.
///
/// Default:
/// - component defaults, `Exclude`, `min_ability = -4.0`, `cache_capacity = 4096`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    pub estimator: EstimatorOptions,
    pub curve: CurveOptions,
    pub fit_band: FitBand,
    pub unanswered: UnansweredPolicy,
    pub min_ability: f64,
    pub cache_capacity: usize,
}

impl AnalysisOptions {
    /// Combine validated component options.
    ///
    /// # Errors
    /// - [`RaschError::NonFiniteValue`] if `min_ability` is not finite.
    /// - [`RaschError::InvalidCacheCapacity`] if `cache_capacity == 0`.
    pub fn new(
        estimator: EstimatorOptions, curve: CurveOptions, fit_band: FitBand,
        unanswered: UnansweredPolicy, min_ability: f64, cache_capacity: usize,
    ) -> RaschResult<Self> {
        if !min_ability.is_finite() {
            return Err(RaschError::NonFiniteValue { index: 0, value: min_ability });
        }
        if cache_capacity == 0 {
            return Err(RaschError::InvalidCacheCapacity { capacity: cache_capacity });
        }
        Ok(Self { estimator, curve, fit_band, unanswered, min_ability, cache_capacity })
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            estimator: EstimatorOptions::default(),
            curve: CurveOptions::default(),
            fit_band: FitBand::default(),
            unanswered: UnansweredPolicy::default(),
            min_ability: -4.0,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}
