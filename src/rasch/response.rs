//! Dichotomous item responses.
use crate::rasch::errors::{RaschError, RaschResult};

/// A scored (subject, item) outcome.
///
/// Missing responses are represented by the *absence* of a `Response`
/// (`Option::None` in matrices), never by `Incorrect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Response {
    Incorrect,
    Correct,
}

impl Response {
    /// Score on the 0/1 scale used by the Rasch equations.
    #[inline]
    pub fn score(self) -> f64 {
        match self {
            Response::Correct => 1.0,
            Response::Incorrect => 0.0,
        }
    }

    #[inline]
    pub fn is_correct(self) -> bool {
        matches!(self, Response::Correct)
    }

    /// Parse a 0/1 response code.
    ///
    /// # Errors
    /// [`RaschError::InvalidResponse`] for any other integer.
    pub fn from_code(code: i64) -> RaschResult<Self> {
        match code {
            0 => Ok(Response::Incorrect),
            1 => Ok(Response::Correct),
            value => Err(RaschError::InvalidResponse { value }),
        }
    }
}

impl From<bool> for Response {
    fn from(correct: bool) -> Self {
        if correct { Response::Correct } else { Response::Incorrect }
    }
}

/// Raw scores of a response vector, in order.
pub fn scores(responses: &[Response]) -> Vec<f64> {
    responses.iter().map(|r| r.score()).collect()
}
