//! report::analysis — one end-to-end analytics pass over a response matrix.
//!
//! Purpose
//! -------
//! Compose the engine routines over a [`ResponseMatrix`] and return every
//! number an assessment dashboard displays, as plain data: summary
//! metrics, item and person fit tables, per-subject ability re-estimates,
//! item characteristic curves with observed overlays, Wright map points,
//! heatmap rows, item performance and subject totals.
//!
//! Key behaviors
//! -------------
//! - [`RaschAnalysis`] owns the [`ProbabilityCache`] and invalidates it at
//!   the start of every run, so no value outlives the data it came from.
//! - Degenerate statistics (no pairs, zero weights, zero information,
//!   undefined reliability) are stored in the report as `Err` cells; any
//!   other engine error aborts the run.
//! - Non-convergent re-estimates are logged and kept as
//!   [`AbilityEstimate::NotConverged`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Report rows follow matrix order: subjects in input order, items by id.
//! - Subjects are keyed by their unique id everywhere; the display label
//!   travels next to it and may repeat.
//! - Unknown abilities and difficulties are omitted from means, the Wright
//!   map, curve overlays and the heatmap; they are never counted as 0.
//!
//! Downstream usage
//! ----------------
//! - Build records, call [`RaschAnalysis::run`], then render the report or
//!   export its fit tables with
//!   [`FitTable::write_csv`](crate::report::tables::FitTable::write_csv).
//!
//! Testing notes
//! -------------
//! - Unit tests here check degenerate-cell storage, cache invalidation and
//!   the derived tables on a small hand-built matrix.
//! - The records → report → CSV path is covered in
//!   `tests/integration_rasch_pipeline.rs`.
use crate::{
    matrix::{
        records::{AttemptRecord, ItemRecord, StudentRecord},
        response_matrix::{ExpectedMatrix, ResponseMatrix},
    },
    rasch::{
        curve::{CurvePoint, item_characteristic_curve},
        errors::RaschResult,
        estimator::{AbilityEstimate, estimate_ability},
        fit::infit_outfit,
        information::{Reliability, reliability, standard_error},
        response::Response,
    },
    report::{
        cache::ProbabilityCache,
        options::AnalysisOptions,
        tables::{FitRow, FitTable, FitTableKind},
    },
};

/// Dataset-level metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryMetrics {
    pub n_subjects: usize,
    pub n_items: usize,
    /// Mean of the known stored abilities.
    pub mean_ability: Option<f64>,
    /// Mean of the known difficulties.
    pub mean_difficulty: Option<f64>,
    pub reliability: RaschResult<Reliability>,
}

/// Stored ability and re-estimate for one subject.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectAbility {
    pub subject: String,
    pub label: String,
    pub stored: Option<f64>,
    /// Estimate from the subject's responses on items with known difficulty.
    pub estimate: RaschResult<AbilityEstimate>,
    /// SE at the re-estimate over the same items, when both are defined.
    pub standard_error: Option<f64>,
}

/// An observed response plotted against the subject's stored ability.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedPoint {
    pub subject: String,
    pub theta: f64,
    pub score: f64,
}

/// ICC samples for one item plus the observed overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemCurve {
    pub item: String,
    pub difficulty: Option<f64>,
    /// `None` when the difficulty is unknown.
    pub points: Option<Vec<CurvePoint>>,
    pub observed: Vec<ObservedPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrightKind {
    Person,
    Item,
}

/// One labelled point on the shared logit scale.
#[derive(Debug, Clone, PartialEq)]
pub struct WrightPoint {
    pub kind: WrightKind,
    pub label: String,
    pub logit: f64,
}

/// Observed row of one subject, for the response heatmap.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapRow {
    pub subject: String,
    pub label: String,
    pub ability: f64,
    pub cells: Vec<Option<Response>>,
}

/// Attempt and accuracy counts for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemPerformance {
    pub item: String,
    pub attempts: usize,
    pub correct: usize,
    /// `100 · correct / attempts`; `None` without attempts.
    pub percent_correct: Option<f64>,
}

/// Answer counts for one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectTotals {
    pub answered: usize,
    pub correct: usize,
    pub incorrect: usize,
}

/// One subject's stored data and responses, for a profile view.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectProfile<'a> {
    pub subject: &'a str,
    pub label: &'a str,
    pub group: Option<&'a str>,
    pub ability: Option<f64>,
    /// `(item id, response)` in item order.
    pub responses: Vec<(&'a str, Option<Response>)>,
}

/// Everything one analysis pass produces.
#[derive(Debug, Clone, PartialEq)]
pub struct RaschReport {
    pub matrix: ResponseMatrix,
    pub summary: SummaryMetrics,
    pub item_fit: FitTable,
    pub person_fit: FitTable,
    pub abilities: Vec<SubjectAbility>,
    pub curves: Vec<ItemCurve>,
    pub wright_map: Vec<WrightPoint>,
    pub heatmap: Vec<HeatmapRow>,
    pub item_performance: Vec<ItemPerformance>,
    pub subject_totals: Vec<(String, SubjectTotals)>,
}

impl RaschReport {
    /// The `k` attempted items with the lowest percent correct, hardest
    /// first; ties keep item order.
    pub fn hardest_items(&self, k: usize) -> Vec<&ItemPerformance> {
        let mut attempted: Vec<&ItemPerformance> =
            self.item_performance.iter().filter(|p| p.percent_correct.is_some()).collect();
        attempted.sort_by(|a, b| {
            let pa = a.percent_correct.unwrap_or_default();
            pa.total_cmp(&b.percent_correct.unwrap_or_default())
        });
        attempted.truncate(k);
        attempted
    }

    pub fn curve(&self, item: &str) -> Option<&ItemCurve> {
        self.curves.iter().find(|c| c.item == item)
    }

    /// Profile of the subject with id `subject`.
    pub fn subject_profile(&self, subject: &str) -> Option<SubjectProfile<'_>> {
        let row = self.matrix.subject_row(subject)?;
        let responses = self
            .matrix
            .items()
            .iter()
            .enumerate()
            .map(|(col, item)| (item.as_str(), self.matrix.get(row, col)))
            .collect();
        Some(SubjectProfile {
            subject: self.matrix.subjects()[row].as_str(),
            label: self.matrix.labels()[row].as_str(),
            group: self.matrix.groups()[row].as_deref(),
            ability: self.matrix.abilities()[row],
            responses,
        })
    }
}

/// Runs analysis passes with one set of options and a reusable cache.
#[derive(Debug, Clone)]
pub struct RaschAnalysis {
    options: AnalysisOptions,
    cache: ProbabilityCache,
}

impl RaschAnalysis {
    /// # Errors
    /// [`RaschError::InvalidCacheCapacity`](crate::rasch::errors::RaschError::InvalidCacheCapacity)
    /// if the configured capacity is 0.
    pub fn new(options: AnalysisOptions) -> RaschResult<Self> {
        let cache = ProbabilityCache::new(options.cache_capacity)?;
        Ok(Self { options, cache })
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn cache(&self) -> &ProbabilityCache {
        &self.cache
    }

    /// Build the response matrix from records and analyse it.
    ///
    /// # Errors
    /// - [`RaschError::Matrix`](crate::rasch::errors::RaschError::Matrix) for
    ///   inconsistent records.
    /// - Any non-degenerate engine error.
    pub fn run(
        &mut self, students: &[StudentRecord], items: &[ItemRecord], attempts: &[AttemptRecord],
    ) -> RaschResult<RaschReport> {
        let matrix =
            ResponseMatrix::from_records(students, items, attempts, self.options.unanswered)?;
        self.run_matrix(matrix)
    }

    /// Analyse an already-built response matrix.
    pub fn run_matrix(&mut self, matrix: ResponseMatrix) -> RaschResult<RaschReport> {
        self.cache.invalidate();
        log::debug!(
            "Rasch analysis over {} subjects x {} items",
            matrix.n_subjects(),
            matrix.n_items()
        );

        let cache = &mut self.cache;
        let expected = matrix.expected_with(|theta, b| cache.get_or_compute(theta, b));

        let summary = summarize(&matrix)?;
        let item_fit = item_fit_table(&matrix, &expected)?;
        let person_fit = person_fit_table(&matrix, &expected)?;
        let abilities = self.reestimate(&matrix)?;
        let curves = self.curves(&matrix)?;
        let wright_map = wright_map(&matrix);
        let heatmap = heatmap(&matrix, self.options.min_ability);
        let item_performance = item_performance(&matrix);
        let subject_totals = subject_totals(&matrix);

        log::debug!(
            "Probability cache: {} hits, {} misses",
            self.cache.hits(),
            self.cache.misses()
        );

        Ok(RaschReport {
            matrix,
            summary,
            item_fit,
            person_fit,
            abilities,
            curves,
            wright_map,
            heatmap,
            item_performance,
            subject_totals,
        })
    }

    // ---- Helper Methods ----

    fn reestimate(&self, matrix: &ResponseMatrix) -> RaschResult<Vec<SubjectAbility>> {
        (0..matrix.n_subjects())
            .map(|row| {
                let subject = matrix.subjects()[row].clone();
                let (responses, difficulties) = matrix.subject_responses(row);
                let estimate = keep_degenerate(estimate_ability(
                    &responses,
                    &difficulties,
                    &self.options.estimator,
                ))?;
                if let Ok(AbilityEstimate::NotConverged(reason)) = &estimate {
                    log::warn!("Ability of subject {subject:?} did not converge: {reason:?}");
                }
                let standard_error = estimate
                    .as_ref()
                    .ok()
                    .and_then(AbilityEstimate::theta)
                    .and_then(|theta| standard_error(theta, &difficulties).ok());
                Ok(SubjectAbility {
                    subject,
                    label: matrix.labels()[row].clone(),
                    stored: matrix.abilities()[row],
                    estimate,
                    standard_error,
                })
            })
            .collect()
    }

    fn curves(&self, matrix: &ResponseMatrix) -> RaschResult<Vec<ItemCurve>> {
        let mut curves = Vec::with_capacity(matrix.n_items());
        for (col, item) in matrix.items().iter().enumerate() {
            let difficulty = matrix.difficulties()[col];
            let points = match difficulty {
                Some(b) => Some(item_characteristic_curve(b, &self.options.curve)?),
                None => None,
            };
            let observed = matrix
                .subjects()
                .iter()
                .zip(matrix.abilities())
                .enumerate()
                .filter_map(|(row, (subject, theta))| {
                    Some(ObservedPoint {
                        subject: subject.clone(),
                        theta: (*theta)?,
                        score: matrix.get(row, col)?.score(),
                    })
                })
                .collect();
            curves.push(ItemCurve { item: item.clone(), difficulty, points, observed });
        }
        Ok(curves)
    }
}

/// Store degenerate outcomes as values; propagate everything else.
fn keep_degenerate<T>(result: RaschResult<T>) -> RaschResult<RaschResult<T>> {
    match result {
        Err(err) if !err.is_degenerate() => Err(err),
        other => Ok(other),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() { None } else { Some(values.iter().sum::<f64>() / values.len() as f64) }
}

fn summarize(matrix: &ResponseMatrix) -> RaschResult<SummaryMetrics> {
    let known_abilities: Vec<f64> = matrix.abilities().iter().flatten().copied().collect();
    let known_difficulties = matrix.known_difficulties();
    Ok(SummaryMetrics {
        n_subjects: matrix.n_subjects(),
        n_items: matrix.n_items(),
        mean_ability: mean(&known_abilities),
        mean_difficulty: mean(&known_difficulties),
        reliability: keep_degenerate(reliability(matrix.abilities(), &known_difficulties))?,
    })
}

fn item_fit_table(matrix: &ResponseMatrix, expected: &ExpectedMatrix) -> RaschResult<FitTable> {
    let mut rows = Vec::with_capacity(matrix.n_items());
    for (col, item) in matrix.items().iter().enumerate() {
        let (observed, model) = matrix.item_pairs(expected, col)?;
        rows.push(FitRow {
            id: item.clone(),
            label: item.clone(),
            fit: keep_degenerate(infit_outfit(&observed, &model))?,
        });
    }
    Ok(FitTable::new(FitTableKind::Item, rows))
}

fn person_fit_table(matrix: &ResponseMatrix, expected: &ExpectedMatrix) -> RaschResult<FitTable> {
    let mut rows = Vec::with_capacity(matrix.n_subjects());
    for (row, (subject, label)) in matrix.subjects().iter().zip(matrix.labels()).enumerate() {
        let (observed, model) = matrix.subject_pairs(expected, row)?;
        rows.push(FitRow {
            id: subject.clone(),
            label: label.clone(),
            fit: keep_degenerate(infit_outfit(&observed, &model))?,
        });
    }
    Ok(FitTable::new(FitTableKind::Person, rows))
}

fn wright_map(matrix: &ResponseMatrix) -> Vec<WrightPoint> {
    let items = matrix.items().iter().zip(matrix.difficulties()).filter_map(|(label, b)| {
        Some(WrightPoint { kind: WrightKind::Item, label: label.clone(), logit: (*b)? })
    });
    let persons = matrix.labels().iter().zip(matrix.abilities()).filter_map(|(label, theta)| {
        Some(WrightPoint { kind: WrightKind::Person, label: label.clone(), logit: (*theta)? })
    });
    items.chain(persons).collect()
}

fn heatmap(matrix: &ResponseMatrix, min_ability: f64) -> Vec<HeatmapRow> {
    matrix
        .cells()
        .rows()
        .into_iter()
        .zip(matrix.subjects().iter().zip(matrix.labels()).zip(matrix.abilities()))
        .filter_map(|(cells, ((subject, label), ability))| {
            let ability = ability.filter(|&theta| theta >= min_ability)?;
            Some(HeatmapRow {
                subject: subject.clone(),
                label: label.clone(),
                ability,
                cells: cells.to_vec(),
            })
        })
        .collect()
}

fn item_performance(matrix: &ResponseMatrix) -> Vec<ItemPerformance> {
    matrix
        .items()
        .iter()
        .zip(matrix.cells().columns())
        .map(|(item, column)| {
            let attempts = column.iter().flatten().count();
            let correct = column.iter().flatten().filter(|r| r.is_correct()).count();
            let percent_correct =
                (attempts > 0).then(|| 100.0 * correct as f64 / attempts as f64);
            ItemPerformance { item: item.clone(), attempts, correct, percent_correct }
        })
        .collect()
}

fn subject_totals(matrix: &ResponseMatrix) -> Vec<(String, SubjectTotals)> {
    matrix
        .subjects()
        .iter()
        .zip(matrix.cells().rows())
        .map(|(subject, row)| {
            let answered = row.iter().flatten().count();
            let correct = row.iter().flatten().filter(|r| r.is_correct()).count();
            (subject.clone(), SubjectTotals { answered, correct, incorrect: answered - correct })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasch::{
        errors::RaschError,
        response::Response::{Correct, Incorrect},
    };
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Degenerate statistics stored as report cells instead of failing.
    // - Derived tables (performance, totals, heatmap, Wright map, curves).
    // - Cache invalidation between runs.
    // -------------------------------------------------------------------------

    fn matrix() -> ResponseMatrix {
        ResponseMatrix::from_cells(
            vec!["ann".into(), "bob".into(), "cy".into()],
            vec!["q1".into(), "q2".into(), "q3".into()],
            array![
                [Some(Correct), Some(Incorrect), None],
                [Some(Correct), Some(Correct), Some(Incorrect)],
                [None, None, None],
            ],
            vec![Some(-0.5), Some(1.0), None],
            vec![Some(-1.0), Some(0.5), None],
        )
        .expect("consistent fixture")
    }

    #[test]
    // Purpose
    // -------
    // Items and subjects without usable pairs produce undefined cells while
    // the rest of the report is computed.
    //
    // Given
    // -----
    // - q3 has no difficulty; cy has no ability and no responses.
    //
    // Expect
    // ------
    // - q3 item fit and cy person fit are degenerate errors.
    // - cy's re-estimate is `EmptyInput`; q1/q2 fit is defined.
    fn run_matrix_stores_degenerate_cells() {
        // Arrange
        let mut analysis = RaschAnalysis::new(AnalysisOptions::default()).unwrap();

        // Act
        let report = analysis.run_matrix(matrix()).expect("report");

        // Assert
        let q3 = report.item_fit.get("q3").unwrap();
        assert!(q3.fit.as_ref().is_err_and(RaschError::is_degenerate));
        assert!(report.item_fit.get("q1").unwrap().fit.is_ok());
        assert!(report.person_fit.get("cy").unwrap().fit.is_err());
        assert!(matches!(report.abilities[2].estimate, Err(RaschError::EmptyInput { .. })));
        assert!(report.abilities[1].estimate.as_ref().is_ok_and(|e| !e.is_converged()));
        assert!(report.abilities[0].estimate.as_ref().is_ok_and(AbilityEstimate::is_converged));
        assert!(report.abilities[0].standard_error.is_some());
    }

    #[test]
    // Purpose
    // -------
    // Summary, performance, totals and plotting data follow the matrix.
    //
    // Given
    // -----
    // - The fixture matrix with default options.
    //
    // Expect
    // ------
    // - Means over known values only.
    // - q3 is 0 % correct, so it is the hardest item.
    // - Heatmap keeps ann and bob; the Wright map omits unknowns.
    // - q3 has no curve; q1's overlay holds ann and bob.
    fn run_matrix_builds_derived_tables() {
        // Arrange
        let mut analysis = RaschAnalysis::new(AnalysisOptions::default()).unwrap();

        // Act
        let report = analysis.run_matrix(matrix()).expect("report");

        // Assert
        assert_eq!(report.summary.n_subjects, 3);
        assert_abs_diff_eq!(report.summary.mean_ability.unwrap(), 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(report.summary.mean_difficulty.unwrap(), -0.25, epsilon = 1e-12);
        assert!(report.summary.reliability.is_ok());

        let hardest = report.hardest_items(1);
        assert_eq!(hardest[0].item, "q3");
        assert_eq!(hardest[0].percent_correct, Some(0.0));
        assert_eq!(report.item_performance[0].percent_correct, Some(100.0));
        assert_eq!(report.item_performance[1].attempts, 2);

        assert_eq!(report.subject_totals[1].1, SubjectTotals {
            answered: 3,
            correct: 2,
            incorrect: 1
        });
        assert_eq!(report.subject_totals[2].1.answered, 0);

        let heat: Vec<&str> = report.heatmap.iter().map(|r| r.subject.as_str()).collect();
        assert_eq!(heat, ["ann", "bob"]);
        assert_eq!(report.wright_map.len(), 4);

        assert!(report.curve("q3").unwrap().points.is_none());
        let q1 = report.curve("q1").unwrap();
        assert_eq!(q1.points.as_ref().unwrap().len(), 100);
        assert_eq!(q1.observed.len(), 2);

        let profile = report.subject_profile("ann").unwrap();
        assert_eq!(profile.ability, Some(-0.5));
        assert_eq!(profile.group, None);
        assert_eq!(profile.responses, vec![
            ("q1", Some(Correct)),
            ("q2", Some(Incorrect)),
            ("q3", None)
        ]);
    }

    #[test]
    // Purpose
    // -------
    // The minimum-ability threshold filters heatmap rows.
    //
    // Given
    // -----
    // - min_ability = 0.
    //
    // Expect
    // ------
    // - Only bob (θ = 1) remains.
    fn heatmap_respects_min_ability() {
        let options = AnalysisOptions { min_ability: 0.0, ..AnalysisOptions::default() };
        let report = RaschAnalysis::new(options).unwrap().run_matrix(matrix()).unwrap();
        assert_eq!(report.heatmap.len(), 1);
        assert_eq!(report.heatmap[0].subject, "bob");
    }

    #[test]
    // Purpose
    // -------
    // Each run starts from an empty cache.
    //
    // Given
    // -----
    // - Two consecutive runs over the same matrix.
    //
    // Expect
    // ------
    // - Identical miss counts after each run (nothing carried over), with
    //   the 4 defined expected cells all computed.
    fn run_matrix_invalidates_cache_between_runs() {
        // Arrange
        let mut analysis = RaschAnalysis::new(AnalysisOptions::default()).unwrap();

        // Act
        let first = analysis.run_matrix(matrix()).unwrap();
        let misses_first = analysis.cache().misses();
        let second = analysis.run_matrix(matrix()).unwrap();
        let misses_second = analysis.cache().misses();

        // Assert
        assert_eq!(misses_first, 4);
        assert_eq!(misses_first, misses_second);
        assert_eq!(first, second);
    }
}
