//! Ack-compatibility predicates.
//!
//! A predicate receives `(set_flag, ack_flag)` and decides whether the
//! acknowledgment is valid for the stored record. It is shared across every
//! shard and the background worker, so it must be pure and thread-safe.

use std::sync::Arc;

/// Shared ack-compatibility function: `(set_flag, ack_flag) -> can_ack`.
pub type AckPredicate<F> = Arc<dyn Fn(&F, &F) -> bool + Send + Sync>;

/// Wraps a closure as an [`AckPredicate`].
pub fn from_fn<F, P>(predicate: P) -> AckPredicate<F>
where
  P: Fn(&F, &F) -> bool + Send + Sync + 'static,
{
  Arc::new(predicate)
}

/// Accepts an ack whose flag is not older than the stored one.
///
/// Useful when flags are versions or send timestamps: an ack for a
/// superseded send is ignored.
pub fn ordered<F>() -> AckPredicate<F>
where
  F: PartialOrd + 'static,
{
  Arc::new(|set: &F, ack: &F| set <= ack)
}

/// Accepts an ack only if it carries exactly the stored flag.
pub fn matching<F>() -> AckPredicate<F>
where
  F: PartialEq + 'static,
{
  Arc::new(|set: &F, ack: &F| set == ack)
}
