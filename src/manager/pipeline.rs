//! Bounded ingestion queues and the single background worker that drains them.
//!
//! Producers never block: a full queue is reported as backpressure. The worker
//! is created by `start` and destroyed by `stop`; every cycle gets a fresh stop
//! channel so the pipeline can be restarted any number of times.

use crate::error::{Error, QueueKind, Result};
use crate::record::Record;
use crate::router::Router;
use crate::shard::Shard;

use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded, select};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

/// An acknowledgment waiting to be applied.
pub(crate) struct AckItem<F> {
  pub id: u64,
  pub flag: F,
}

/// Depth of the ingestion queues at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
  pub set_queued: usize,
  pub ack_queued: usize,
}

struct Worker {
  // Dropping the sender disconnects the worker's stop channel.
  stop_tx: Sender<()>,
  handle: JoinHandle<()>,
}

pub(crate) struct Pipeline<F, V> {
  set_tx: Sender<Record<F, V>>,
  set_rx: Receiver<Record<F, V>>,
  ack_tx: Sender<AckItem<F>>,
  ack_rx: Receiver<AckItem<F>>,
  running: AtomicBool,
  worker: Mutex<Option<Worker>>,
}

impl<F, V> Pipeline<F, V> {
  pub fn new(set_buffer_size: usize, ack_buffer_size: usize) -> Self {
    let (set_tx, set_rx) = bounded(set_buffer_size);
    let (ack_tx, ack_rx) = bounded(ack_buffer_size);
    Self {
      set_tx,
      set_rx,
      ack_tx,
      ack_rx,
      running: AtomicBool::new(false),
      worker: Mutex::new(None),
    }
  }

  /// Enqueues a record without blocking.
  pub fn submit_set(&self, record: Record<F, V>) -> Result<()> {
    // The pipeline holds both receivers, so the only failure is a full queue.
    self
      .set_tx
      .try_send(record)
      .map_err(|_| Error::Backpressure(QueueKind::Set))
  }

  /// Enqueues an acknowledgment without blocking.
  pub fn submit_ack(&self, id: u64, flag: F) -> Result<()> {
    self
      .ack_tx
      .try_send(AckItem { id, flag })
      .map_err(|_| Error::Backpressure(QueueKind::Ack))
  }

  pub fn is_running(&self) -> bool {
    self.running.load(Ordering::Acquire)
  }

  pub fn stats(&self) -> PipelineStats {
    PipelineStats {
      set_queued: self.set_rx.len(),
      ack_queued: self.ack_rx.len(),
    }
  }

  /// Transitions Running -> Stopped, joins the worker and discards whatever
  /// was still buffered. Returns false if the pipeline was already stopped.
  pub fn stop(&self) -> bool {
    let mut slot = self.worker.lock();
    if self
      .running
      .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
      .is_err()
    {
      return false;
    }

    if let Some(Worker { stop_tx, handle }) = slot.take() {
      drop(stop_tx);
      if handle.join().is_err() {
        tracing::error!(target: "ironack::manager", "Ack worker terminated abnormally");
      }
    }

    let discarded_sets = self.set_rx.try_iter().count();
    let discarded_acks = self.ack_rx.try_iter().count();
    if discarded_sets > 0 || discarded_acks > 0 {
      tracing::debug!(
        target: "ironack::manager",
        "Discarded {} set and {} ack items buffered at stop",
        discarded_sets,
        discarded_acks
      );
    }

    tracing::info!(target: "ironack::manager", "Ack worker stopped");
    true
  }
}

impl<F, V> Pipeline<F, V>
where
  F: Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  /// Transitions Stopped -> Running and spawns the worker. Returns false if
  /// the pipeline was already running or the thread could not be spawned. A
  /// failed spawn resets the running flag before returning, so callers can
  /// tell the two apart with [`is_running`](Self::is_running).
  pub fn start(&self, shards: Arc<[Shard<F, V>]>, router: Router) -> bool {
    let mut slot = self.worker.lock();
    if self
      .running
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .is_err()
    {
      return false;
    }

    let (stop_tx, stop_rx) = bounded::<()>(0);
    let set_rx = self.set_rx.clone();
    let ack_rx = self.ack_rx.clone();

    let spawned = thread::Builder::new()
      .name("ironack-worker".into())
      .spawn(move || worker_loop(shards, router, set_rx, ack_rx, stop_rx));

    match spawned {
      Ok(handle) => {
        *slot = Some(Worker { stop_tx, handle });
        tracing::info!(target: "ironack::manager", "Ack worker started");
        true
      }
      Err(e) => {
        self.running.store(false, Ordering::Release);
        tracing::error!(target: "ironack::manager", "Failed to spawn ack worker: {}", e);
        false
      }
    }
  }
}

impl<F, V> Drop for Pipeline<F, V> {
  fn drop(&mut self) {
    self.stop();
  }
}

/// Applies one queued item per wake until the stop channel disconnects.
fn worker_loop<F, V>(
  shards: Arc<[Shard<F, V>]>,
  router: Router,
  set_rx: Receiver<Record<F, V>>,
  ack_rx: Receiver<AckItem<F>>,
  stop_rx: Receiver<()>,
) {
  loop {
    // Stop wins over pending items.
    if let Err(TryRecvError::Disconnected) = stop_rx.try_recv() {
      break;
    }

    select! {
      recv(stop_rx) -> _ => break,
      recv(set_rx) -> msg => match msg {
        Ok(record) => apply(|| shards[router.route(record.id)].insert(record)),
        Err(_) => break,
      },
      recv(ack_rx) -> msg => match msg {
        Ok(AckItem { id, flag }) => apply(|| {
          shards[router.route(id)].remove(id, &flag);
        }),
        Err(_) => break,
      },
    }
  }
}

/// Runs a shard mutation, keeping the worker alive if a predicate panics.
fn apply(op: impl FnOnce()) {
  if panic::catch_unwind(AssertUnwindSafe(op)).is_err() {
    tracing::error!(target: "ironack::manager", "Ack worker caught a panic while applying an item");
  }
}
