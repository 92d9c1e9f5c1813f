//! Error types produced by the engine itself.
//!
//! Streams carry their own error type parameter (`Err`). The types here are
//! the ones the engine has to manufacture on its own: a timeout, a subject
//! built without its seed value, or a malformed marble diagram. `RxError` is a
//! ready-made stream error type for hosts that do not want to define one.

use std::time::Duration;

use thiserror::Error;

/// Raised by the `timeout` operator when no value arrives in time.
///
/// Streams using `timeout` need `Err: From<TimeoutError>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no value arrived within {after:?}")]
pub struct TimeoutError {
  pub after: Duration,
}

/// General purpose stream error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RxError {
  #[error("timed out: no value arrived within {0:?}")]
  Timeout(Duration),

  #[error("producer failed: {0}")]
  Producer(String),
}

impl RxError {
  pub fn producer(msg: impl Into<String>) -> Self { RxError::Producer(msg.into()) }
}

impl From<TimeoutError> for RxError {
  fn from(err: TimeoutError) -> Self { RxError::Timeout(err.after) }
}

impl From<TimeoutError> for String {
  fn from(err: TimeoutError) -> Self { err.to_string() }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubjectError {
  #[error("a BehaviorSubject must be seeded with an initial value")]
  MissingInitialValue,
}

/// Problems found while parsing a marble diagram.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarbleError {
  #[error("unexpected `{found}` at position {pos}")]
  Unexpected { found: char, pos: usize },

  #[error("group opened at position {pos} is never closed")]
  UnclosedGroup { pos: usize },

  #[error("no value registered for marble `{marble}` at position {pos}")]
  UnknownValue { marble: char, pos: usize },

  #[error("marble `#` at position {pos} requires an error value")]
  MissingError { pos: usize },
}
