//! Integration tests for the Rasch analysis pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end path: loosely-typed student, item and attempt
//!   records, through response-matrix assembly and one analysis pass, to
//!   fit tables exported as CSV.
//! - Check that the ability estimator recovers a known ability from
//!   simulated responses on a realistically long test.
//!
//! Coverage
//! --------
//! - `matrix::records` / `matrix::response_matrix`:
//!   - Text logits, missing difficulties, unanswered sentinels, repeated
//!     attempts and both unanswered policies.
//! - `report::analysis::RaschAnalysis`:
//!   - Summary metrics, re-estimates, fit tables and item performance.
//! - `report::tables::FitTable::to_csv_string`.
//! - `rasch::simulation` + `rasch::estimator`.
//!
//! Exclusions
//! ----------
//! - Hand-computed values of the individual formulas; those live in the
//!   unit tests of each module.
//! - Python bindings.
use approx::assert_abs_diff_eq;
use rust_rasch::{
    matrix::{
        records::{AttemptRecord, ItemRecord, RawLogit, StudentRecord},
        response_matrix::UnansweredPolicy,
    },
    rasch::{
        estimator::{AbilityEstimate, EstimatorOptions, NonConvergence, estimate_ability},
        information::standard_error,
        response::Response,
        simulation::{SimOptions, simulate_responses},
    },
    report::{analysis::RaschAnalysis, options::AnalysisOptions},
};

/// Purpose
/// -------
/// Build a small classroom dataset with the irregularities stored
/// documents carry.
///
/// Returns
/// -------
/// - Students: `s1` (ann, θ = 0.8), `s2` (bob, θ stored as text `"-0.4"`),
///   `s3` (no username, no ability, no attempt).
/// - Items: `q1` (b = -1), `q2` (b stored as text `"0.5"`), `q3` (no
///   difficulty).
/// - Attempts: ann answers everything correctly; bob gets q1 right, q2
///   wrong and leaves q3 unanswered (`"W"`); a second attempt by ann that
///   must be ignored.
fn classroom() -> (Vec<StudentRecord>, Vec<ItemRecord>, Vec<AttemptRecord>) {
    let students = vec![
        StudentRecord::new("s1", Some("ann"), RawLogit::from(0.8), Some("A")).unwrap(),
        StudentRecord::new("s2", Some("bob"), RawLogit::from("-0.4"), Some("A")).unwrap(),
        StudentRecord::new("s3", None, RawLogit::Missing, None).unwrap(),
    ];
    let items = vec![
        ItemRecord::new("q1", Some("A"), RawLogit::from(-1.0)).unwrap(),
        ItemRecord::new("q2", Some("B"), RawLogit::from("0.5")).unwrap(),
        ItemRecord::new("q3", Some("C"), RawLogit::Missing).unwrap(),
    ];
    let attempts = vec![
        AttemptRecord::new("s1", [("q1", "A"), ("q2", "B"), ("q3", "C")]).unwrap(),
        AttemptRecord::new("s2", [("q1", "A"), ("q2", "D"), ("q3", "W")]).unwrap(),
        AttemptRecord::new("s1", [("q1", "D"), ("q2", "D"), ("q3", "D")]).unwrap(),
    ];
    (students, items, attempts)
}

#[test]
// Purpose
// -------
// Run the whole pipeline from records to CSV with default options.
//
// Given
// -----
// - The classroom dataset; unanswered items excluded.
//
// Expect
// ------
// - Subjects keyed by id and labelled by username (falling back to id),
//   items by id.
// - Means over known values only: mean θ = 0.2, mean b = -0.25.
// - ann (all correct on calibrated items) does not converge; bob converges
//   to θ = -0.25, the midpoint of q1 and q2, with a finite SE.
// - Item fit CSV has a header and one row per item; q3 is undefined.
fn pipeline_from_records_to_csv() {
    // Arrange
    let (students, items, attempts) = classroom();
    let mut analysis = RaschAnalysis::new(AnalysisOptions::default()).unwrap();

    // Act
    let report = analysis.run(&students, &items, &attempts).expect("consistent records");

    // Assert
    assert_eq!(report.matrix.subjects(), ["s1", "s2", "s3"]);
    assert_eq!(report.matrix.labels(), ["ann", "bob", "s3"]);
    assert_eq!(report.matrix.items(), ["q1", "q2", "q3"]);
    assert_eq!(report.matrix.get(1, 2), None);
    assert_eq!(report.matrix.get(0, 2), Some(Response::Correct));

    assert_abs_diff_eq!(report.summary.mean_ability.unwrap(), 0.2, epsilon = 1e-12);
    assert_abs_diff_eq!(report.summary.mean_difficulty.unwrap(), -0.25, epsilon = 1e-12);
    assert!(report.summary.reliability.is_ok());

    let ann = report.abilities[0].estimate.as_ref().unwrap();
    assert!(matches!(ann, AbilityEstimate::NotConverged(NonConvergence::NoSignChange { .. })));
    let bob = &report.abilities[1];
    assert_abs_diff_eq!(bob.estimate.as_ref().unwrap().theta().unwrap(), -0.25, epsilon = 1e-6);
    assert!(bob.standard_error.is_some_and(f64::is_finite));
    assert!(report.abilities[2].estimate.is_err());

    let csv = report.item_fit.to_csv_string().unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "id,label,infit,outfit");
    assert!(lines[1].starts_with("q1,q1,"));
    assert_eq!(lines[3], "q3,q3,,");
    assert!(report.person_fit.get("s3").unwrap().fit.is_err());

    let hardest = report.hardest_items(1);
    assert_eq!(hardest[0].item, "q2");
    assert_eq!(report.item_performance[2].attempts, 1);
}

#[test]
// Purpose
// -------
// Scoring unanswered items as incorrect changes the matrix and the
// derived counts, not the set of items.
//
// Given
// -----
// - The classroom dataset with `UnansweredPolicy::ScoreIncorrect`.
//
// Expect
// ------
// - bob's q3 becomes incorrect; q3 has two attempts at 50 %.
// - Subject totals count bob's blank as an incorrect answer.
fn pipeline_scores_unanswered_as_incorrect_when_requested() {
    // Arrange
    let (students, items, attempts) = classroom();
    let options = AnalysisOptions {
        unanswered: "score-incorrect".parse::<UnansweredPolicy>().unwrap(),
        ..AnalysisOptions::default()
    };
    let mut analysis = RaschAnalysis::new(options).unwrap();

    // Act
    let report = analysis.run(&students, &items, &attempts).unwrap();

    // Assert
    assert_eq!(report.matrix.n_items(), 3);
    assert_eq!(report.matrix.get(1, 2), Some(Response::Incorrect));
    assert_eq!(report.item_performance[2].attempts, 2);
    assert_eq!(report.item_performance[2].percent_correct, Some(50.0));
    let (id, bob) = &report.subject_totals[1];
    assert_eq!(id, "s2");
    assert_eq!((bob.answered, bob.correct, bob.incorrect), (3, 1, 2));
}

#[test]
// Purpose
// -------
// Two students with the same username stay separate rows that can be
// told apart in the person-fit export and looked up individually.
//
// Given
// -----
// - s1 and s2 both named "ann", in different groups and with different
//   stored abilities and answers.
//
// Expect
// ------
// - Person-fit CSV rows `s1,ann,...` and `s2,ann,...` with different
//   values.
// - `person_fit.get` and `subject_profile` resolve each id to its own
//   row, group and stored ability.
fn shared_usernames_stay_distinguishable() {
    // Arrange
    let students = vec![
        StudentRecord::new("s1", Some("ann"), RawLogit::from(0.5), Some("7A")).unwrap(),
        StudentRecord::new("s2", Some("ann"), RawLogit::from(-0.5), Some("7B")).unwrap(),
    ];
    let items = vec![
        ItemRecord::new("q1", Some("A"), RawLogit::from(-1.0)).unwrap(),
        ItemRecord::new("q2", Some("B"), RawLogit::from(0.0)).unwrap(),
        ItemRecord::new("q3", Some("C"), RawLogit::from(1.0)).unwrap(),
    ];
    let attempts = vec![
        AttemptRecord::new("s1", [("q1", "A"), ("q2", "B"), ("q3", "D")]).unwrap(),
        AttemptRecord::new("s2", [("q1", "D"), ("q2", "B"), ("q3", "C")]).unwrap(),
    ];
    let mut analysis = RaschAnalysis::new(AnalysisOptions::default()).unwrap();

    // Act
    let report = analysis.run(&students, &items, &attempts).unwrap();
    let csv = report.person_fit.to_csv_string().unwrap();

    // Assert
    assert_eq!(report.matrix.labels(), ["ann", "ann"]);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("s1,ann,"));
    assert!(lines[2].starts_with("s2,ann,"));
    assert_ne!(&lines[1]["s1".len()..], &lines[2]["s2".len()..]);

    let s1 = report.person_fit.get("s1").unwrap().fit.as_ref().unwrap();
    let s2 = report.person_fit.get("s2").unwrap().fit.as_ref().unwrap();
    assert_ne!(s1.infit(), s2.infit());

    let profile = report.subject_profile("s2").unwrap();
    assert_eq!((profile.subject, profile.label, profile.group), ("s2", "ann", Some("7B")));
    assert_eq!(profile.ability, Some(-0.5));
    assert_eq!(profile.responses[0], ("q1", Some(Response::Incorrect)));
    assert_eq!(report.subject_profile("s1").unwrap().group, Some("7A"));
}

#[test]
// Purpose
// -------
// Recover a known ability from simulated responses.
//
// Given
// -----
// - θ = 0.5; 200 difficulties cycling evenly over [-3, 3]; fixed seed.
//
// Expect
// ------
// - The estimate converges inside the default bracket.
// - |θ̂ − θ| < 1 (the SE here is roughly 0.16).
fn simulated_responses_recover_true_ability() {
    // Arrange
    let theta = 0.5;
    let difficulties: Vec<f64> = (0..200).map(|i| -3.0 + 6.0 * (i % 25) as f64 / 24.0).collect();
    let responses =
        simulate_responses(theta, &difficulties, &SimOptions::seeded(20_240_917)).unwrap();

    // Act
    let estimate =
        estimate_ability(&responses, &difficulties, &EstimatorOptions::default()).unwrap();

    // Assert
    let theta_hat = estimate.theta().expect("mixed responses converge");
    assert!((theta_hat - theta).abs() < 1.0, "theta_hat = {theta_hat}");
    assert!(standard_error(theta_hat, &difficulties).unwrap() < 0.3);
}
