//! # IronAck
//!
//! `ironack` tracks messages that have been sent but not yet acknowledged, so a
//! delivery system can ask which ones have been outstanding for too long.
//!
//! It is an in-process accounting primitive. It never touches the network and
//! never decides retry policy.
//!
//! ## Key Features
//!
//! * **Sharded Storage**: Ids map to `id % capacity` independently locked shards.
//! * **Pluggable Ack Predicate**: Stale or out-of-order acks are filtered by a caller-supplied `(set_flag, ack_flag)` check.
//! * **Bounded Async Ingestion**: Optional queues with a background worker and explicit backpressure.
//! * **Manual Compaction**: Caller-driven map rebuilds to bound memory under churn.
//!
//! ## Example
//!
//! ```
//! use ironack::{AckManager, AckOptions};
//! use std::time::Duration;
//!
//! # fn main() -> ironack::Result<()> {
//! let manager = AckManager::new(AckOptions::asynchronous(16, 1024, 1024))?;
//! manager.start();
//!
//! // Non-blocking; fails with Error::Backpressure when the queue is full
//! manager.set(42, (), b"payload".to_vec())?;
//! manager.ack(42, ())?;
//!
//! for record in manager.expired(Duration::from_secs(30)) {
//!     println!("redeliver {}", record.id);
//! }
//!
//! manager.stop();
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod manager;
pub mod predicate;
mod record;
mod router;
mod shard;

// Re-exports for the flat public API
pub use config::AckOptions;
pub use error::{Error, QueueKind, Result};
pub use manager::{AckManager, PipelineStats};
pub use predicate::AckPredicate;
pub use record::Record;
