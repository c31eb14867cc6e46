//! matrix::records — validated input schemas for the analytics pipeline.
//!
//! Purpose
//! -------
//! Describe the subject, item and attempt documents an input provider
//! hands to the engine, and coerce their loosely-typed fields explicitly
//! at construction time.
//!
//! Key behaviors
//! -------------
//! - [`RawLogit`] carries a stored ability or difficulty exactly as it was
//!   found (number, text, or absent) and resolves it to `Option<f64>`.
//! - [`AnswerCode`] distinguishes a selected option from the unanswered
//!   sentinel [`UNANSWERED_SENTINEL`].
//! - Record constructors reject empty identifiers and turn missing or
//!   unusable logits into `None`, logging the unusable ones.
//!
//! Invariants & assumptions
//! ------------------------
//! - Identifiers are non-empty after trimming and stored trimmed.
//! - A resolved logit is finite; NaN, blank text and absent values all mean
//!   "unknown" and never default to 0.
use std::collections::BTreeMap;

use crate::matrix::errors::{MatrixError, MatrixResult};

/// Answer value recorded for an item the subject did not answer.
pub const UNANSWERED_SENTINEL: &str = "W";

/// A stored logit before coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawLogit {
    Number(f64),
    Text(String),
    Missing,
}

impl RawLogit {
    /// Resolve to a finite logit, or `None` for an unknown value.
    ///
    /// NaN, blank text and the text `"nan"` resolve to `None`.
    ///
    /// # Errors
    /// [`MatrixError::InvalidField`] for infinite numbers and for text that is
    /// not a number.
    pub fn resolve(&self, record: &str, field: &'static str) -> MatrixResult<Option<f64>> {
        let value = match self {
            RawLogit::Missing => return Ok(None),
            RawLogit::Number(value) => *value,
            RawLogit::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed.parse::<f64>().map_err(|_| MatrixError::InvalidField {
                    record: record.to_string(),
                    field,
                    text: format!("{text:?} is not a number"),
                })?
            }
        };
        if value.is_nan() {
            return Ok(None);
        }
        if value.is_infinite() {
            return Err(MatrixError::InvalidField {
                record: record.to_string(),
                field,
                text: format!("{value} is not finite"),
            });
        }
        Ok(Some(value))
    }

    /// As [`resolve`](Self::resolve), downgrading an unusable value to
    /// `None` with a warning.
    pub fn resolve_or_unknown(&self, record: &str, field: &'static str) -> Option<f64> {
        self.resolve(record, field).unwrap_or_else(|err| {
            log::warn!("{err}; treating {field} as unknown");
            None
        })
    }
}

impl From<f64> for RawLogit {
    fn from(value: f64) -> Self {
        RawLogit::Number(value)
    }
}

impl From<Option<f64>> for RawLogit {
    fn from(value: Option<f64>) -> Self {
        value.map_or(RawLogit::Missing, RawLogit::Number)
    }
}

impl From<&str> for RawLogit {
    fn from(text: &str) -> Self {
        RawLogit::Text(text.to_string())
    }
}

/// One recorded answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerCode {
    Selected(String),
    Unanswered,
}

impl AnswerCode {
    /// Interpret a raw answer; the sentinel and blank text mean unanswered.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == UNANSWERED_SENTINEL {
            AnswerCode::Unanswered
        } else {
            AnswerCode::Selected(trimmed.to_string())
        }
    }
}

fn clean_id(raw: &str, what: &'static str) -> MatrixResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MatrixError::EmptyIdentifier { what });
    }
    Ok(trimmed.to_string())
}

/// A subject (student) with an optional stored ability.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    id: String,
    username: Option<String>,
    ability: Option<f64>,
    group: Option<String>,
}

impl StudentRecord {
    /// # Errors
    /// [`MatrixError::EmptyIdentifier`] if `id` is blank.
    pub fn new(
        id: &str, username: Option<&str>, ability: RawLogit, group: Option<&str>,
    ) -> MatrixResult<Self> {
        let id = clean_id(id, "subject")?;
        let ability = ability.resolve_or_unknown(&id, "ability");
        let username = username.map(str::trim).filter(|u| !u.is_empty()).map(String::from);
        let group = group.map(str::trim).filter(|g| !g.is_empty()).map(String::from);
        Ok(Self { id, username, ability, group })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display label: the username, or the id when no username is stored.
    pub fn label(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.id)
    }

    pub fn ability(&self) -> Option<f64> {
        self.ability
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }
}

/// An item (question) with its answer key and optional difficulty.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    id: String,
    answer_key: Option<String>,
    difficulty: Option<f64>,
}

impl ItemRecord {
    /// # Errors
    /// [`MatrixError::EmptyIdentifier`] if `id` is blank.
    pub fn new(id: &str, answer_key: Option<&str>, difficulty: RawLogit) -> MatrixResult<Self> {
        let id = clean_id(id, "item")?;
        let difficulty = difficulty.resolve_or_unknown(&id, "difficulty");
        let answer_key = answer_key.map(str::trim).filter(|k| !k.is_empty()).map(String::from);
        Ok(Self { id, answer_key, difficulty })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn answer_key(&self) -> Option<&str> {
        self.answer_key.as_deref()
    }

    pub fn difficulty(&self) -> Option<f64> {
        self.difficulty
    }
}

/// One test attempt: the subject and the answer given per item id.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    student_id: String,
    answers: BTreeMap<String, AnswerCode>,
}

impl AttemptRecord {
    /// Build an attempt from `(item id, raw answer)` pairs.
    ///
    /// A later pair for the same item id replaces an earlier one.
    ///
    /// # Errors
    /// [`MatrixError::EmptyIdentifier`] for a blank subject or item id.
    pub fn new<'a, I>(student_id: &str, answers: I) -> MatrixResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let student_id = clean_id(student_id, "subject")?;
        let mut parsed = BTreeMap::new();
        for (item_id, raw) in answers {
            parsed.insert(clean_id(item_id, "item")?, AnswerCode::parse(raw));
        }
        Ok(Self { student_id, answers: parsed })
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    /// Answers keyed by item id, in id order.
    pub fn answers(&self) -> &BTreeMap<String, AnswerCode> {
        &self.answers
    }
}
