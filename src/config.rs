/// Construction-time settings for an [`AckManager`](crate::AckManager).
///
/// Values are consumed once; the manager never re-reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckOptions {
  /// Number of independently locked shards. Ids route to `id % capacity`.
  /// Must be greater than zero.
  /// Default: 16.
  pub capacity: usize,

  // --- Ingestion ---
  /// Route `set`/`ack` through bounded queues drained by a background
  /// worker instead of mutating shards on the caller's thread.
  /// Default: false.
  pub async_mode: bool,

  /// Slots in the set-queue. Only used when `async_mode` is on.
  /// Default: 1024.
  pub set_buffer_size: usize,

  /// Slots in the ack-queue. Only used when `async_mode` is on.
  /// Default: 1024.
  pub ack_buffer_size: usize,
}

impl Default for AckOptions {
  fn default() -> Self {
    Self {
      capacity: 16,
      async_mode: false,
      set_buffer_size: 1024,
      ack_buffer_size: 1024,
    }
  }
}

impl AckOptions {
  /// Synchronous options with the given shard count.
  pub fn new(capacity: usize) -> Self {
    Self {
      capacity,
      ..Default::default()
    }
  }

  /// Asynchronous options with explicit queue sizes.
  pub fn asynchronous(capacity: usize, set_buffer_size: usize, ack_buffer_size: usize) -> Self {
    Self {
      capacity,
      async_mode: true,
      set_buffer_size,
      ack_buffer_size,
    }
  }
}
