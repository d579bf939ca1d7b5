use std::time::{Duration, Instant};

/// A message that has been sent and is waiting for its acknowledgment.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<F, V> {
  /// Message id. Unique within its shard at any instant.
  pub id: u64,
  /// When the message was recorded as sent.
  pub timestamp: Instant,
  /// Caller-defined token compared against the ack flag by the predicate.
  pub flag: F,
  /// The message payload.
  pub value: V,
}

impl<F, V> Record<F, V> {
  /// Creates a record stamped with the current instant.
  pub fn new(id: u64, flag: F, value: V) -> Self {
    Self {
      id,
      timestamp: Instant::now(),
      flag,
      value,
    }
  }

  /// Time elapsed since the record was created.
  #[inline]
  pub fn age(&self) -> Duration {
    self.timestamp.elapsed()
  }

  #[inline]
  pub(crate) fn age_at(&self, now: Instant) -> Duration {
    now.saturating_duration_since(self.timestamp)
  }
}
