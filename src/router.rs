//! Id-based routing to determine shard assignment.
//!
//! Message ids are already well distributed integers, so routing is a plain
//! modulo. The mapping is fixed for the lifetime of a manager.

/// Routes message ids to shard indices.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Router {
  shard_count: usize,
}

impl Router {
  /// Creates a new router with the specified shard count.
  ///
  /// # Panics
  ///
  /// Panics if `shard_count` is zero. Callers validate before constructing.
  pub fn new(shard_count: usize) -> Self {
    assert!(shard_count > 0, "shard_count must be greater than zero");
    Self { shard_count }
  }

  /// Routes an id to its shard index in `0..shard_count`.
  ///
  /// The same id always routes to the same shard.
  #[inline]
  pub fn route(&self, id: u64) -> usize {
    (id % self.shard_count as u64) as usize
  }

  pub fn shard_count(&self) -> usize {
    self.shard_count
  }
}
