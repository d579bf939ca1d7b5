//! AckManager implementation - the main public API.

use crate::AckOptions;
use crate::error::{Error, Result};
use crate::manager::pipeline::{Pipeline, PipelineStats};
use crate::predicate::AckPredicate;
use crate::record::Record;
use crate::router::Router;
use crate::shard::Shard;

use std::sync::Arc;
use std::time::Duration;

/// A sharded tracker of sent-but-unacknowledged messages.
///
/// `F` is the flag type compared by the ack predicate and `V` the payload.
///
/// # Example
///
/// ```
/// use ironack::{AckManager, AckOptions};
/// use std::time::Duration;
///
/// # fn main() -> ironack::Result<()> {
/// let manager: AckManager<(), &str> = AckManager::new(AckOptions::new(4))?;
///
/// manager.set(5, (), "A")?;
/// std::thread::sleep(Duration::from_millis(100));
///
/// let overdue = manager.expired(Duration::from_millis(50));
/// assert_eq!(overdue[0].id, 5);
///
/// manager.ack(5, ())?;
/// assert!(manager.is_empty());
/// # Ok(())
/// # }
/// ```
pub struct AckManager<F, V> {
  shards: Arc<[Shard<F, V>]>,
  router: Router,
  pipeline: Option<Pipeline<F, V>>,
}

impl<F, V> AckManager<F, V> {
  /// Creates a manager where every ack for a present record is accepted.
  ///
  /// # Errors
  ///
  /// Returns `Error::Config` if `capacity` is zero, or if `async_mode` is on
  /// and either buffer size is zero.
  pub fn new(opts: AckOptions) -> Result<Self> {
    Self::build(opts, None)
  }

  /// Creates a manager that consults `predicate(set_flag, ack_flag)` before
  /// removing a record.
  pub fn with_predicate(opts: AckOptions, predicate: AckPredicate<F>) -> Result<Self> {
    Self::build(opts, Some(predicate))
  }

  fn build(opts: AckOptions, predicate: Option<AckPredicate<F>>) -> Result<Self> {
    if opts.capacity == 0 {
      return Err(Error::Config("capacity must be greater than zero".into()));
    }

    let pipeline = if opts.async_mode {
      if opts.set_buffer_size == 0 || opts.ack_buffer_size == 0 {
        return Err(Error::Config(format!(
          "async buffer sizes must be greater than zero (set: {}, ack: {})",
          opts.set_buffer_size, opts.ack_buffer_size
        )));
      }

      if opts.set_buffer_size < opts.capacity || opts.ack_buffer_size < opts.capacity {
        tracing::warn!(
          target: "ironack",
          "Async buffers (set: {}, ack: {}) are smaller than capacity ({}). \
           Parallel producers will hit backpressure early.",
          opts.set_buffer_size,
          opts.ack_buffer_size,
          opts.capacity
        );
      }

      Some(Pipeline::new(opts.set_buffer_size, opts.ack_buffer_size))
    } else {
      None
    };

    let shards: Arc<[Shard<F, V>]> = (0..opts.capacity)
      .map(|_| Shard::new(predicate.clone()))
      .collect::<Vec<_>>()
      .into();

    tracing::debug!(
      target: "ironack",
      "Created AckManager with {} shards (async: {}, predicate: {})",
      opts.capacity,
      opts.async_mode,
      predicate.is_some()
    );

    Ok(Self {
      shards,
      router: Router::new(opts.capacity),
      pipeline,
    })
  }

  /// Records `id` as sent.
  ///
  /// Synchronous managers update the shard immediately. Asynchronous managers
  /// stamp the record now and enqueue it without blocking.
  ///
  /// # Errors
  ///
  /// Returns `Error::Backpressure` if the set-queue is full. Never fails in
  /// synchronous mode.
  pub fn set(&self, id: u64, flag: F, value: V) -> Result<()> {
    match &self.pipeline {
      Some(pipeline) => pipeline.submit_set(Record::new(id, flag, value)),
      None => {
        self.shard(id).set(id, flag, value);
        Ok(())
      }
    }
  }

  /// Acknowledges `id`.
  ///
  /// Unknown ids are ignored and never reach the predicate. A record whose
  /// flag the predicate rejects stays in place unchanged.
  ///
  /// # Errors
  ///
  /// Returns `Error::Backpressure` if the ack-queue is full. Never fails in
  /// synchronous mode.
  pub fn ack(&self, id: u64, flag: F) -> Result<()> {
    match &self.pipeline {
      Some(pipeline) => pipeline.submit_ack(id, flag),
      None => {
        self.shard(id).remove(id, &flag);
        Ok(())
      }
    }
  }

  /// Returns every pending record at least `duration` old.
  ///
  /// A zero duration returns nothing without touching any shard. Order
  /// across shards is unspecified.
  pub fn expired(&self, duration: Duration) -> Vec<Arc<Record<F, V>>> {
    if duration.is_zero() {
      return Vec::new();
    }

    self
      .shards
      .iter()
      .flat_map(|shard| shard.expired(duration))
      .collect()
  }

  /// Same as [`expired`](Self::expired) but only the ids.
  pub fn expired_ids(&self, duration: Duration) -> Vec<u64> {
    self.expired(duration).iter().map(|record| record.id).collect()
  }

  /// Rebuilds every shard's storage to release space left by removals.
  ///
  /// Never changes the set of pending records. Not triggered automatically.
  pub fn compact(&self) {
    for shard in self.shards.iter() {
      shard.compact();
    }
  }

  /// Stops the background worker. Items still queued are discarded.
  ///
  /// Returns true only for the call that performed the transition. Always
  /// false for synchronous managers.
  pub fn stop(&self) -> bool {
    self.pipeline.as_ref().is_some_and(|pipeline| pipeline.stop())
  }

  /// Looks up the pending record for `id`.
  pub fn get(&self, id: u64) -> Option<Arc<Record<F, V>>> {
    self.shard(id).get(id)
  }

  /// Every pending record, regardless of age.
  pub fn snapshot(&self) -> Vec<Arc<Record<F, V>>> {
    self.shards.iter().flat_map(|shard| shard.snapshot()).collect()
  }

  /// Number of pending records across all shards.
  pub fn len(&self) -> usize {
    self.shards.iter().map(|shard| shard.len()).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.shards.iter().all(|shard| shard.len() == 0)
  }

  /// Shard that owns `id`. Always `id % capacity`.
  #[inline]
  pub fn shard_index(&self, id: u64) -> usize {
    self.router.route(id)
  }

  /// Returns the number of shards.
  pub fn capacity(&self) -> usize {
    self.router.shard_count()
  }

  pub fn is_async(&self) -> bool {
    self.pipeline.is_some()
  }

  /// Whether the background worker is running.
  pub fn is_running(&self) -> bool {
    self.pipeline.as_ref().is_some_and(|pipeline| pipeline.is_running())
  }

  /// Items waiting in the ingestion queues. Zero for synchronous managers.
  pub fn pending(&self) -> PipelineStats {
    self
      .pipeline
      .as_ref()
      .map(|pipeline| pipeline.stats())
      .unwrap_or_default()
  }

  #[inline]
  fn shard(&self, id: u64) -> &Shard<F, V> {
    &self.shards[self.router.route(id)]
  }
}

impl<F, V> AckManager<F, V>
where
  F: Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  /// Starts the background worker.
  ///
  /// Returns true only for the call that performed the transition. Always
  /// false for synchronous managers.
  ///
  /// A false return has two causes, told apart by [`is_running`](Self::is_running):
  /// if it reports true the worker was already running; if it reports false the
  /// worker thread could not be spawned (logged at `error`) and the manager
  /// stays stopped, so `start` may be retried.
  pub fn start(&self) -> bool {
    match &self.pipeline {
      Some(pipeline) => pipeline.start(self.shards.clone(), self.router),
      None => false,
    }
  }
}
