//! report — the reporting layer over the Rasch engine.
//!
//! Purpose
//! -------
//! Gather validated records, build the response matrix, run the engine and
//! return plain data for tables and plots. Nothing here renders.
//!
//! Key behaviors
//! -------------
//! - [`RaschAnalysis`] runs one pass and returns a [`RaschReport`].
//! - [`FitTable`] holds item or person fit rows and exports them as CSV.
//! - [`ProbabilityCache`] memoizes P(θ, b) for the duration of a pass.
//! - [`AnalysisOptions`] gathers the per-pass configuration.
//!
//! Conventions
//! -----------
//! - Undefined statistics are kept as degenerate `Err` cells so one
//!   uninformative item or subject never fails a whole report.
//! - Diagnostics go through the `log` facade; callers choose the logger.

pub mod analysis;
pub mod cache;
pub mod options;
pub mod tables;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::analysis::{
    HeatmapRow, ItemCurve, ItemPerformance, ObservedPoint, RaschAnalysis, RaschReport,
    SubjectAbility, SubjectProfile, SubjectTotals, SummaryMetrics, WrightKind, WrightPoint,
};
pub use self::cache::{DEFAULT_CACHE_CAPACITY, ProbabilityCache};
pub use self::options::AnalysisOptions;
pub use self::tables::{FitBand, FitClass, FitRow, FitTable, FitTableKind};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::analysis::{RaschAnalysis, RaschReport};
    pub use super::options::AnalysisOptions;
    pub use super::tables::{FitBand, FitTable};
}
