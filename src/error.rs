use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Identifies which ingestion queue refused an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
  Set,
  Ack,
}

impl fmt::Display for QueueKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      QueueKind::Set => f.write_str("set"),
      QueueKind::Ack => f.write_str("ack"),
    }
  }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
  #[error("Configuration Error: {0}")]
  Config(String),

  /// The bounded queue is full. The caller decides whether to retry or drop.
  #[error("Backpressure: {0} queue is full")]
  Backpressure(QueueKind),
}

impl Error {
  /// Returns true if the error is a recoverable queue-full signal.
  pub fn is_backpressure(&self) -> bool {
    matches!(self, Error::Backpressure(_))
  }
}
