//! matrix::errors — record validation and matrix assembly failures.
//!
//! Purpose
//! -------
//! Report problems found at the data boundary: malformed loosely-typed
//! fields, duplicate or dangling identifiers, and shape disagreements
//! between matrices and the vectors aligned with them.
//!
//! Conventions
//! -----------
//! - Missing values (no difficulty, no stored ability, unanswered items)
//!   are *not* errors here; they become `None` cells.
//! - Messages name the offending record and field so a caller can point a
//!   user at the bad document.
//! - The reporting layer lifts these into
//!   [`RaschError::Matrix`](crate::rasch::errors::RaschError::Matrix).

pub type MatrixResult<T> = Result<T, MatrixError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// Two subject records share an identifier.
    DuplicateSubject { id: String },

    /// Two item records share an identifier.
    DuplicateItem { id: String },

    /// An attempt refers to a subject that has no record.
    UnknownSubject { id: String },

    /// A record identifier is empty or whitespace.
    EmptyIdentifier { what: &'static str },

    /// A loosely-typed field could not be interpreted.
    InvalidField { record: String, field: &'static str, text: String },

    /// A vector aligned with one matrix axis has the wrong length.
    LengthMismatch { expected: usize, found: usize, what: &'static str },

    /// Two matrices that must share a shape do not.
    ShapeMismatch { expected: (usize, usize), found: (usize, usize) },

    /// Unrecognised unanswered-item policy name.
    InvalidPolicy { name: String, reason: &'static str },
}

impl std::error::Error for MatrixError {}

impl std::fmt::Display for MatrixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatrixError::DuplicateSubject { id } => write!(f, "Duplicate subject record {id:?}"),
            MatrixError::DuplicateItem { id } => write!(f, "Duplicate item record {id:?}"),
            MatrixError::UnknownSubject { id } => {
                write!(f, "Attempt refers to unknown subject {id:?}")
            }
            MatrixError::EmptyIdentifier { what } => write!(f, "Empty {what} identifier"),
            MatrixError::InvalidField { record, field, text } => {
                write!(f, "Invalid {field} in record {record:?}: {text}")
            }
            MatrixError::LengthMismatch { expected, found, what } => {
                write!(f, "Length mismatch for {what}: expected {expected}, found {found}")
            }
            MatrixError::ShapeMismatch { expected, found } => write!(
                f,
                "Shape mismatch: expected {}x{}, found {}x{}",
                expected.0, expected.1, found.0, found.1
            ),
            MatrixError::InvalidPolicy { name, reason } => {
                write!(f, "Invalid unanswered policy {name:?}: {reason}")
            }
        }
    }
}
