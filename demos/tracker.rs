//! Example: tracking outbound messages until they are acknowledged
//!
//! This example demonstrates:
//! - Recording sends with a version flag
//! - Ignoring stale acknowledgments
//! - Finding overdue messages for redelivery
//! - Asynchronous ingestion with backpressure

use ironack::{AckManager, AckOptions, Error, predicate};
use std::thread;
use std::time::Duration;

fn main() -> ironack::Result<()> {
  println!("=== IronAck Tracker Example ===\n");

  // 1. Synchronous tracker where acks must carry a version >= the send
  let tracker = AckManager::with_predicate(AckOptions::new(16), predicate::ordered::<u32>())?;
  println!("✓ Created AckManager with {} shards", tracker.capacity());

  println!("\n--- Sending ---");
  for id in 0..10 {
    tracker.set(id, 1, format!("order_{}", id))?;
  }
  // Message 3 is resent with a newer version
  tracker.set(3, 2, "order_3_retry".to_string())?;
  println!("  sent 10 messages, resent id 3 as version 2");

  println!("\n--- Acknowledging ---");
  for id in 0..10 {
    if id % 2 == 0 {
      tracker.ack(id, 1)?;
    }
  }
  println!("  acked even ids at version 1");
  println!("  pending: {}", tracker.len());

  // 2. Look for overdue messages
  thread::sleep(Duration::from_millis(120));
  println!("\n--- Overdue after 100ms ---");
  let mut overdue = tracker.expired(Duration::from_millis(100));
  overdue.sort_by_key(|record| record.id);
  for record in &overdue {
    println!("  redeliver id {} (v{}): {}", record.id, record.flag, record.value);
  }

  tracker.compact();
  println!("✓ Compacted shard storage");

  // 3. Asynchronous ingestion
  println!("\n--- Async Ingestion ---");
  let pipeline: AckManager<(), u64> = AckManager::new(AckOptions::asynchronous(8, 4, 4))?;

  let mut refused = 0;
  for id in 0..8 {
    match pipeline.set(id, (), id) {
      Ok(()) => {}
      Err(Error::Backpressure(queue)) => {
        refused += 1;
        println!("  id {} refused: {} queue full", id, queue);
      }
      Err(e) => return Err(e),
    }
  }
  println!("  {} sends refused before the worker started", refused);

  pipeline.start();
  thread::sleep(Duration::from_millis(20));
  println!("  worker applied {} records", pipeline.len());
  pipeline.stop();

  println!("\n✓ Example completed successfully!");
  Ok(())
}
