//! matrix — the data boundary between stored documents and the engine.
//!
//! Purpose
//! -------
//! Turn loosely-typed subject, item and attempt documents into validated
//! records, and records into the subject × item response matrix and its
//! expected-probability counterpart.
//!
//! Key behaviors
//! -------------
//! - [`records`]: schemas with explicit coercion of stored logits
//!   ([`RawLogit`]) and answers ([`AnswerCode`]).
//! - [`response_matrix`]: [`ResponseMatrix`] assembly under an
//!   [`UnansweredPolicy`], [`ExpectedMatrix`] derivation and aligned pair
//!   extraction for fit statistics.
//! - [`errors`]: [`MatrixError`] / [`MatrixResult`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Unknown abilities, difficulties and responses are `None` from this
//!   point on; no sentinel numbers cross into the engine.
//! - Axis order is deterministic for identical input.
//!
//! Downstream usage
//! ----------------
//! - The `report` module builds a [`ResponseMatrix`] per analysis and
//!   discards it afterwards.

pub mod errors;
pub mod records;
pub mod response_matrix;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{MatrixError, MatrixResult};
pub use self::records::{
    AnswerCode, AttemptRecord, ItemRecord, RawLogit, StudentRecord, UNANSWERED_SENTINEL,
};
pub use self::response_matrix::{ExpectedMatrix, ResponseMatrix, UnansweredPolicy};
