//! # Ack Manager
//!
//! `AckManager` owns a fixed array of shards and routes every operation to
//! exactly one of them by `id % capacity`. It can ingest synchronously or
//! through a bounded asynchronous pipeline.
//!
//! ## Architecture
//!
//! Each shard is an independently locked map from message id to its pending
//! record. Callers only contend when their ids land on the same shard.
//! In asynchronous mode `set` and `ack` are pushed onto two bounded queues
//! and a single background worker applies them to the shards. A full queue is
//! reported to the caller as [`Error::Backpressure`](crate::Error::Backpressure)
//! instead of blocking.
//!
//! ## Example
//!
//! ```
//! use ironack::{AckManager, AckOptions, predicate};
//! use std::time::Duration;
//!
//! # fn main() -> ironack::Result<()> {
//! let manager = AckManager::with_predicate(AckOptions::new(4), predicate::ordered::<u64>())?;
//!
//! manager.set(1, 10, "x")?;
//! manager.set(1, 20, "y")?; // overwrites
//!
//! manager.ack(1, 15)?; // stale ack, ignored
//! assert_eq!(manager.len(), 1);
//!
//! manager.ack(1, 25)?;
//! assert!(manager.expired(Duration::from_millis(1)).is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! ## Limitations
//!
//! - **Single consumer**: async throughput is bounded by one worker thread
//! - **No cross-queue ordering**: a queued `set` and `ack` may apply in either order
//! - **No draining on stop**: items still buffered when `stop` runs are discarded
//! - **Manual compaction**: call `compact` periodically under high churn

mod ack_manager;
mod pipeline;

pub use ack_manager::AckManager;
pub use pipeline::PipelineStats;
