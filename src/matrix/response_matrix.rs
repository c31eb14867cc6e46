//! matrix::response_matrix — observed and expected subject × item matrices.
//!
//! Purpose
//! -------
//! Assemble validated records into a sparse response matrix aligned with
//! the subjects' stored abilities and the items' difficulties, and derive
//! the matching expected-probability matrix.
//!
//! Key behaviors
//! -------------
//! - Subjects keep their input order and are keyed by their unique id;
//!   display labels and groups ride along for reporting. Items are the
//!   sorted union of the item ids present in the subjects' first attempts.
//! - Only the first attempt of each subject is used.
//! - A cell is scored by comparing the trimmed answer with the trimmed
//!   answer key. Unanswered or absent answers follow [`UnansweredPolicy`].
//! - Expected cells are defined only where both θ and b are known.
//!
//! Invariants & assumptions
//! ------------------------
//! - `cells`, `abilities` and `difficulties` always agree in shape with the
//!   subject and item axes.
//! - Missing data is `None`, never 0 and never 0.5, in both matrices.
//! - Cells of items with no record or no answer key cannot be scored and
//!   stay `None` under every policy.
//!
//! Conventions
//! -----------
//! - Row index = subject, column index = item.
//! - Pair extraction drops any cell where either side is `None`, so the
//!   vectors handed to `infit_outfit` are aligned and complete.
//!
//! Testing notes
//! -------------
//! - Unit tests cover axis ordering, first-attempt selection, both
//!   unanswered policies, undefined expected cells and pair extraction.
use std::collections::{BTreeSet, HashMap, HashSet};

use ndarray::Array2;

use crate::{
    matrix::{
        errors::{MatrixError, MatrixResult},
        records::{AnswerCode, AttemptRecord, ItemRecord, StudentRecord},
    },
    rasch::{
        probability::probability,
        response::{Response, scores},
    },
};

/// How an item without a usable answer is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnansweredPolicy {
    /// Leave the cell missing.
    #[default]
    Exclude,
    /// Score the cell as incorrect.
    ScoreIncorrect,
}

impl std::str::FromStr for UnansweredPolicy {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "exclude" => Ok(UnansweredPolicy::Exclude),
            "score_incorrect" => Ok(UnansweredPolicy::ScoreIncorrect),
            _ => Err(MatrixError::InvalidPolicy {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'exclude' or 'score_incorrect'.",
            }),
        }
    }
}

/// Observed responses with the abilities and difficulties aligned to them.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMatrix {
    subjects: Vec<String>,
    labels: Vec<String>,
    groups: Vec<Option<String>>,
    items: Vec<String>,
    abilities: Vec<Option<f64>>,
    difficulties: Vec<Option<f64>>,
    cells: Array2<Option<Response>>,
}

impl ResponseMatrix {
    /// Build the matrix from input records.
    ///
    /// Subjects without an attempt get an all-missing row.
    ///
    /// # Errors
    /// - [`MatrixError::DuplicateSubject`] / [`MatrixError::DuplicateItem`]
    ///   for repeated record ids.
    /// - [`MatrixError::UnknownSubject`] for an attempt whose subject has no
    ///   record.
    pub fn from_records(
        students: &[StudentRecord], items: &[ItemRecord], attempts: &[AttemptRecord],
        policy: UnansweredPolicy,
    ) -> MatrixResult<Self> {
        let mut subject_index = HashMap::with_capacity(students.len());
        for (row, student) in students.iter().enumerate() {
            if subject_index.insert(student.id(), row).is_some() {
                return Err(MatrixError::DuplicateSubject { id: student.id().to_string() });
            }
        }
        let mut item_records = HashMap::with_capacity(items.len());
        for item in items {
            if item_records.insert(item.id(), item).is_some() {
                return Err(MatrixError::DuplicateItem { id: item.id().to_string() });
            }
        }

        let mut first_attempts: Vec<Option<&AttemptRecord>> = vec![None; students.len()];
        for attempt in attempts {
            let row = *subject_index.get(attempt.student_id()).ok_or_else(|| {
                MatrixError::UnknownSubject { id: attempt.student_id().to_string() }
            })?;
            match first_attempts[row] {
                Some(_) => {
                    log::warn!(
                        "Ignoring repeated attempt for subject {:?}; the first attempt is used",
                        attempt.student_id()
                    )
                }
                None => first_attempts[row] = Some(attempt),
            }
        }

        let item_ids: Vec<String> = first_attempts
            .iter()
            .flatten()
            .flat_map(|attempt| attempt.answers().keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut unscorable = BTreeSet::new();
        let keys: Vec<Option<&str>> = item_ids
            .iter()
            .map(|id| {
                let key = item_records.get(id.as_str()).and_then(|item| item.answer_key());
                if key.is_none() {
                    unscorable.insert(id.as_str());
                }
                key
            })
            .collect();
        for id in &unscorable {
            log::warn!("Item {id:?} has no record or answer key; its responses stay missing");
        }

        let mut cells = Array2::from_elem((students.len(), item_ids.len()), None);
        for (row, attempt) in first_attempts.iter().enumerate() {
            let Some(attempt) = attempt else { continue };
            for (col, (item_id, key)) in item_ids.iter().zip(&keys).enumerate() {
                let Some(key) = key else { continue };
                cells[[row, col]] = score_answer(attempt.answers().get(item_id), key, policy);
            }
        }

        let difficulties = item_ids
            .iter()
            .map(|id| item_records.get(id.as_str()).and_then(|item| item.difficulty()))
            .collect();

        Ok(Self {
            subjects: students.iter().map(|s| s.id().to_string()).collect(),
            labels: students.iter().map(|s| s.label().to_string()).collect(),
            groups: students.iter().map(|s| s.group().map(String::from)).collect(),
            items: item_ids,
            abilities: students.iter().map(StudentRecord::ability).collect(),
            difficulties,
            cells,
        })
    }

    /// Build the matrix from already-scored cells.
    ///
    /// Subject ids double as display labels; no groups are attached.
    ///
    /// # Errors
    /// - [`MatrixError::DuplicateSubject`] / [`MatrixError::DuplicateItem`]
    ///   for repeated axis ids.
    /// - [`MatrixError::ShapeMismatch`] if `cells` is not
    ///   `subjects.len() × items.len()`.
    /// - [`MatrixError::LengthMismatch`] if `abilities` or `difficulties`
    ///   do not match their axis.
    /// - [`MatrixError::InvalidField`] for a non-finite ability or difficulty.
    pub fn from_cells(
        subjects: Vec<String>, items: Vec<String>, cells: Array2<Option<Response>>,
        abilities: Vec<Option<f64>>, difficulties: Vec<Option<f64>>,
    ) -> MatrixResult<Self> {
        let shape = (subjects.len(), items.len());
        if cells.dim() != shape {
            return Err(MatrixError::ShapeMismatch { expected: shape, found: cells.dim() });
        }
        if abilities.len() != subjects.len() {
            return Err(MatrixError::LengthMismatch {
                expected: subjects.len(),
                found: abilities.len(),
                what: "abilities",
            });
        }
        if difficulties.len() != items.len() {
            return Err(MatrixError::LengthMismatch {
                expected: items.len(),
                found: difficulties.len(),
                what: "difficulties",
            });
        }
        if let Some(id) = first_duplicate(&subjects) {
            return Err(MatrixError::DuplicateSubject { id: id.to_string() });
        }
        if let Some(id) = first_duplicate(&items) {
            return Err(MatrixError::DuplicateItem { id: id.to_string() });
        }
        check_known_finite(&subjects, &abilities, "ability")?;
        check_known_finite(&items, &difficulties, "difficulty")?;
        let labels = subjects.clone();
        let groups = vec![None; subjects.len()];
        Ok(Self { subjects, labels, groups, items, abilities, difficulties, cells })
    }

    pub fn n_subjects(&self) -> usize {
        self.subjects.len()
    }

    pub fn n_items(&self) -> usize {
        self.items.len()
    }

    /// Subject ids in row order.
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    /// Display labels in row order; not necessarily unique.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn groups(&self) -> &[Option<String>] {
        &self.groups
    }

    /// Row of the subject with id `id`.
    pub fn subject_row(&self, id: &str) -> Option<usize> {
        self.subjects.iter().position(|s| s == id)
    }

    /// Item ids in column order.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn abilities(&self) -> &[Option<f64>] {
        &self.abilities
    }

    pub fn difficulties(&self) -> &[Option<f64>] {
        &self.difficulties
    }

    /// The known difficulties, in column order.
    pub fn known_difficulties(&self) -> Vec<f64> {
        self.difficulties.iter().flatten().copied().collect()
    }

    pub fn cells(&self) -> &Array2<Option<Response>> {
        &self.cells
    }

    pub fn get(&self, subject: usize, item: usize) -> Option<Response> {
        self.cells.get((subject, item)).copied().flatten()
    }

    /// Expected probabilities computed with [`probability`].
    pub fn expected(&self) -> ExpectedMatrix {
        self.expected_with(probability)
    }

    /// Expected probabilities from a caller-supplied P(θ, b), e.g. a
    /// memoized one.
    pub fn expected_with<F>(&self, mut prob: F) -> ExpectedMatrix
    where
        F: FnMut(f64, f64) -> f64,
    {
        let cells = Array2::from_shape_fn(self.cells.dim(), |(row, col)| {
            match (self.abilities[row], self.difficulties[col]) {
                (Some(theta), Some(b)) => Some(prob(theta, b)),
                _ => None,
            }
        });
        ExpectedMatrix { cells }
    }

    /// Aligned (observed, expected) scores of one item over all subjects,
    /// keeping only cells where both are present.
    ///
    /// # Errors
    /// [`MatrixError::ShapeMismatch`] if `expected` was built for another
    /// matrix shape.
    ///
    /// # Panics
    /// If `item >= self.n_items()`.
    pub fn item_pairs(
        &self, expected: &ExpectedMatrix, item: usize,
    ) -> MatrixResult<(Vec<f64>, Vec<f64>)> {
        self.check_shape(expected)?;
        Ok(collect_pairs(self.cells.column(item).iter().zip(expected.cells.column(item).iter())))
    }

    /// Aligned (observed, expected) scores of one subject over all items,
    /// keeping only cells where both are present.
    ///
    /// # Errors
    /// [`MatrixError::ShapeMismatch`] if `expected` was built for another
    /// matrix shape.
    ///
    /// # Panics
    /// If `subject >= self.n_subjects()`.
    pub fn subject_pairs(
        &self, expected: &ExpectedMatrix, subject: usize,
    ) -> MatrixResult<(Vec<f64>, Vec<f64>)> {
        self.check_shape(expected)?;
        Ok(collect_pairs(self.cells.row(subject).iter().zip(expected.cells.row(subject).iter())))
    }

    /// A subject's observed responses on items with a known difficulty,
    /// with those difficulties, ready for ability estimation.
    ///
    /// # Panics
    /// If `subject >= self.n_subjects()`.
    pub fn subject_responses(&self, subject: usize) -> (Vec<Response>, Vec<f64>) {
        self.cells
            .row(subject)
            .iter()
            .zip(&self.difficulties)
            .filter_map(|(cell, b)| Some(((*cell)?, (*b)?)))
            .unzip()
    }

    // ---- Helper Methods ----

    fn check_shape(&self, expected: &ExpectedMatrix) -> MatrixResult<()> {
        if expected.cells.dim() != self.cells.dim() {
            return Err(MatrixError::ShapeMismatch {
                expected: self.cells.dim(),
                found: expected.cells.dim(),
            });
        }
        Ok(())
    }
}

/// Model-expected probabilities, `None` where θ or b is unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedMatrix {
    cells: Array2<Option<f64>>,
}

impl ExpectedMatrix {
    pub fn cells(&self) -> &Array2<Option<f64>> {
        &self.cells
    }

    pub fn get(&self, subject: usize, item: usize) -> Option<f64> {
        self.cells.get((subject, item)).copied().flatten()
    }

    pub fn dim(&self) -> (usize, usize) {
        self.cells.dim()
    }
}

fn score_answer(
    answer: Option<&AnswerCode>, key: &str, policy: UnansweredPolicy,
) -> Option<Response> {
    match answer {
        Some(AnswerCode::Selected(given)) => Some(Response::from(given.trim() == key.trim())),
        Some(AnswerCode::Unanswered) | None => match policy {
            UnansweredPolicy::Exclude => None,
            UnansweredPolicy::ScoreIncorrect => Some(Response::Incorrect),
        },
    }
}

fn collect_pairs<'a, I>(cells: I) -> (Vec<f64>, Vec<f64>)
where
    I: Iterator<Item = (&'a Option<Response>, &'a Option<f64>)>,
{
    let (observed, expected): (Vec<Response>, Vec<f64>) =
        cells.filter_map(|(obs, exp)| Some(((*obs)?, (*exp)?))).unzip();
    (scores(&observed), expected)
}

fn first_duplicate(ids: &[String]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().map(String::as_str).find(|id| !seen.insert(*id))
}

fn check_known_finite(
    labels: &[String], values: &[Option<f64>], field: &'static str,
) -> MatrixResult<()> {
    for (label, value) in labels.iter().zip(values) {
        if let Some(v) = value.filter(|v| !v.is_finite()) {
            return Err(MatrixError::InvalidField {
                record: label.clone(),
                field,
                text: format!("{v} is not finite"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::records::RawLogit;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Axis ordering and first-attempt selection in `from_records`.
    // - Both unanswered policies and unscorable items.
    // - Undefined expected cells and aligned pair extraction.
    // - Shape validation in `from_cells`.
    // -------------------------------------------------------------------------

    fn fixture(policy: UnansweredPolicy) -> ResponseMatrix {
        let students = vec![
            StudentRecord::new("s2", Some("bob"), RawLogit::Number(0.5), Some("7B")).unwrap(),
            StudentRecord::new("s1", Some("ann"), RawLogit::Missing, None).unwrap(),
            StudentRecord::new("s3", None, RawLogit::from("-1"), None).unwrap(),
        ];
        let items = vec![
            ItemRecord::new("q2", Some("B"), RawLogit::Number(1.0)).unwrap(),
            ItemRecord::new("q1", Some("A"), RawLogit::from("nan")).unwrap(),
            ItemRecord::new("q3", Some("C"), RawLogit::Number(-0.5)).unwrap(),
        ];
        let attempts = vec![
            AttemptRecord::new("s2", [("q2", "B"), ("q1", "D"), ("q3", "W")]).unwrap(),
            AttemptRecord::new("s1", [("q1", "A")]).unwrap(),
            AttemptRecord::new("s2", [("q2", "X"), ("q1", "A"), ("q3", "C")]).unwrap(),
            AttemptRecord::new("s3", [("q3", " C "), ("q4", "A")]).unwrap(),
        ];
        ResponseMatrix::from_records(&students, &items, &attempts, policy).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Axes follow input order for subjects and sorted ids for items; only
    // first attempts are scored.
    //
    // Given
    // -----
    // - Three students, a repeated attempt for s2, an item (q4) answered but
    //   without a record.
    //
    // Expect
    // ------
    // - Subject ids [s2, s1, s3] labelled [bob, ann, s3]; items
    //   [q1, q2, q3, q4].
    // - bob scored from the first attempt: q1 wrong, q2 right, q3 missing.
    // - q4 stays missing; trimmed answers match keys.
    fn from_records_orders_axes_and_uses_first_attempt() {
        // Act
        let m = fixture(UnansweredPolicy::Exclude);

        // Assert
        assert_eq!(m.subjects(), ["s2", "s1", "s3"]);
        assert_eq!(m.labels(), ["bob", "ann", "s3"]);
        assert_eq!(m.groups(), [Some("7B".to_string()), None, None]);
        assert_eq!(m.subject_row("s1"), Some(1));
        assert_eq!(m.items(), ["q1", "q2", "q3", "q4"]);
        assert_eq!(m.get(0, 0), Some(Response::Incorrect));
        assert_eq!(m.get(0, 1), Some(Response::Correct));
        assert_eq!(m.get(0, 2), None);
        assert_eq!(m.get(1, 0), Some(Response::Correct));
        assert_eq!(m.get(1, 1), None);
        assert_eq!(m.get(2, 2), Some(Response::Correct));
        assert_eq!(m.get(2, 3), None);
        assert_eq!(m.difficulties(), [None, Some(1.0), Some(-0.5), None]);
        assert_eq!(m.abilities(), [Some(0.5), None, Some(-1.0)]);
    }

    #[test]
    // Purpose
    // -------
    // `ScoreIncorrect` turns unanswered and absent answers into incorrect
    // responses, but cannot score items without a key.
    //
    // Given
    // -----
    // - The same fixture under `ScoreIncorrect`.
    //
    // Expect
    // ------
    // - bob/q3 ("W") and ann/q2 (absent) are incorrect; s3/q4 stays missing.
    fn score_incorrect_policy_fills_unanswered_cells() {
        // Act
        let m = fixture(UnansweredPolicy::ScoreIncorrect);

        // Assert
        assert_eq!(m.get(0, 2), Some(Response::Incorrect));
        assert_eq!(m.get(1, 1), Some(Response::Incorrect));
        assert_eq!(m.get(2, 3), None);
    }

    #[test]
    // Purpose
    // -------
    // Expected cells are undefined when either θ or b is unknown, and pair
    // extraction keeps only fully defined cells.
    //
    // Given
    // -----
    // - The Exclude fixture: ann has no ability, q1 and q4 have no difficulty.
    //
    // Expect
    // ------
    // - ann's row and the q1/q4 columns are `None`.
    // - bob/q2 equals P(0.5, 1.0).
    // - Item q2 pairs contain only bob; subject s3 pairs contain only q3.
    fn expected_matrix_propagates_unknowns() {
        // Arrange
        let m = fixture(UnansweredPolicy::Exclude);

        // Act
        let expected = m.expected();
        let (obs_q2, exp_q2) = m.item_pairs(&expected, 1).unwrap();
        let (obs_s3, exp_s3) = m.subject_pairs(&expected, 2).unwrap();

        // Assert
        assert!(expected.cells().row(1).iter().all(Option::is_none));
        assert!(expected.cells().column(0).iter().all(Option::is_none));
        assert!(expected.cells().column(3).iter().all(Option::is_none));
        assert_abs_diff_eq!(expected.get(0, 1).unwrap(), probability(0.5, 1.0), epsilon = 1e-15);
        assert_eq!(obs_q2, vec![1.0]);
        assert_eq!(exp_q2.len(), 1);
        assert_eq!(obs_s3, vec![1.0]);
        assert_abs_diff_eq!(exp_s3[0], probability(-1.0, -0.5), epsilon = 1e-15);
    }

    #[test]
    fn unanswered_policy_parses_names() {
        assert_eq!("Exclude".parse(), Ok(UnansweredPolicy::Exclude));
        assert_eq!("score-incorrect".parse(), Ok(UnansweredPolicy::ScoreIncorrect));
        assert!(matches!(
            "zero".parse::<UnansweredPolicy>(),
            Err(MatrixError::InvalidPolicy { .. })
        ));
    }

    #[test]
    fn subject_responses_skip_unknown_difficulties() {
        let m = fixture(UnansweredPolicy::Exclude);
        let (responses, difficulties) = m.subject_responses(0);
        assert_eq!(responses, vec![Response::Correct]);
        assert_eq!(difficulties, vec![1.0]);
    }

    #[test]
    // Purpose
    // -------
    // Input validation reports duplicates and dangling references.
    //
    // Given
    // -----
    // - Duplicate student ids, duplicate item ids, an attempt for an
    //   unknown subject.
    //
    // Expect
    // ------
    // - `DuplicateSubject`, `DuplicateItem`, `UnknownSubject`.
    fn from_records_rejects_inconsistent_records() {
        let s = StudentRecord::new("s1", None, RawLogit::Missing, None).unwrap();
        let q = ItemRecord::new("q1", Some("A"), RawLogit::Number(0.0)).unwrap();
        let attempt = AttemptRecord::new("ghost", [("q1", "A")]).unwrap();
        assert_eq!(
            ResponseMatrix::from_records(&[s.clone(), s.clone()], &[], &[], Default::default()),
            Err(MatrixError::DuplicateSubject { id: "s1".to_string() })
        );
        assert_eq!(
            ResponseMatrix::from_records(&[s.clone()], &[q.clone(), q], &[], Default::default()),
            Err(MatrixError::DuplicateItem { id: "q1".to_string() })
        );
        assert_eq!(
            ResponseMatrix::from_records(&[s], &[], &[attempt], Default::default()),
            Err(MatrixError::UnknownSubject { id: "ghost".to_string() })
        );
    }

    #[test]
    fn from_cells_validates_shapes() {
        let cells = array![[Some(Response::Correct), None]];
        let ok = ResponseMatrix::from_cells(
            vec!["a".into()],
            vec!["q1".into(), "q2".into()],
            cells.clone(),
            vec![Some(0.0)],
            vec![Some(0.0), None],
        );
        assert!(ok.is_ok());
        assert!(matches!(
            ResponseMatrix::from_cells(
                vec!["a".into()],
                vec!["q1".into()],
                cells.clone(),
                vec![None],
                vec![None]
            ),
            Err(MatrixError::ShapeMismatch { expected: (1, 1), found: (1, 2) })
        ));
        assert!(matches!(
            ResponseMatrix::from_cells(
                vec!["a".into()],
                vec!["q1".into(), "q2".into()],
                cells,
                vec![Some(f64::NAN)],
                vec![None, None]
            ),
            Err(MatrixError::InvalidField { field: "ability", .. })
        ));
        assert_eq!(
            ResponseMatrix::from_cells(
                vec!["a".into(), "a".into()],
                vec![],
                Array2::from_elem((2, 0), None),
                vec![None, None],
                vec![]
            ),
            Err(MatrixError::DuplicateSubject { id: "a".to_string() })
        );
    }
}
