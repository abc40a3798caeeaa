//! Error types for decoding.
//!
//! Configuration and shape problems are programmer errors and are reported
//! before the first oracle call. Numeric degeneracies are not errors: a row
//! of `-inf` scores is valid (if useless) output.

use thiserror::Error;

/// Boxed error returned by a step oracle.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while configuring or running a sampler.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("num_beams must be strictly positive, got {0}")]
    InvalidNumBeams(usize),

    #[error("temperature must be finite and positive, got {0}")]
    InvalidTemperature(f32),

    #[error("start index {index} is out of range for sequence length {length}")]
    StartIndexOutOfRange { index: usize, length: usize },

    #[error("shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("index {index} is out of range for a leading axis of size {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("tensor backend error: {0}")]
    Backend(String),

    #[error("step oracle failed: {0}")]
    Oracle(#[source] BoxError),
}

impl DecodeError {
    pub(crate) fn shape(what: &'static str, expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            what,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Returns true if the error was raised by the caller's oracle rather
    /// than by the sampler itself.
    pub fn is_oracle_failure(&self) -> bool {
        matches!(self, Self::Oracle(_))
    }
}
