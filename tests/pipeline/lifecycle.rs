//! Start / stop state machine and worker processing

use crate::common::{async_manager, wait_until};
use ironack::{AckManager, AckOptions, PipelineStats, predicate};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[test]
fn test_worker_applies_sets_and_acks() {
  let manager = async_manager::<(), u64>(4, 64, 64);
  assert!(manager.start());

  for id in 0..50 {
    manager.set(id, (), id).unwrap();
  }
  assert!(wait_until(|| manager.len() == 50));

  for id in 0..50 {
    manager.ack(id, ()).unwrap();
  }
  assert!(wait_until(|| manager.is_empty()));
  assert!(manager.stop());
}

#[test]
fn test_async_expiry_uses_enqueue_time() {
  let manager = async_manager::<(), ()>(2, 8, 8);
  manager.set(1, (), ()).unwrap();
  thread::sleep(Duration::from_millis(60));

  assert!(manager.start());
  assert!(wait_until(|| manager.get(1).is_some()));
  assert_eq!(manager.expired_ids(Duration::from_millis(50)), vec![1]);
  assert!(manager.stop());
}

#[test]
fn test_async_predicate_filters_stale_acks() {
  let manager: AckManager<u64, ()> =
    AckManager::with_predicate(AckOptions::asynchronous(2, 16, 16), predicate::ordered()).unwrap();
  assert!(manager.start());

  manager.set(1, 20, ()).unwrap();
  assert!(wait_until(|| manager.get(1).is_some()));

  manager.ack(1, 15).unwrap();
  assert!(wait_until(|| manager.pending().ack_queued == 0));
  // The ack may still be mid-flight inside the worker
  thread::sleep(Duration::from_millis(20));
  assert!(manager.get(1).is_some());

  manager.ack(1, 25).unwrap();
  assert!(wait_until(|| manager.get(1).is_none()));
  assert!(manager.stop());
}

#[test]
fn test_start_stop_twice_in_a_row() {
  let manager = async_manager::<(), ()>(2, 8, 8);

  assert!(!manager.is_running());
  assert!(manager.start());
  assert!(!manager.start());
  assert!(manager.is_running());

  assert!(manager.stop());
  assert!(!manager.stop());
  assert!(!manager.is_running());
}

#[test]
fn test_concurrent_start_transitions_once() {
  let manager = Arc::new(async_manager::<(), ()>(2, 8, 8));
  let barrier = Arc::new(Barrier::new(16));

  let handles: Vec<_> = (0..16)
    .map(|_| {
      let manager = manager.clone();
      let barrier = barrier.clone();
      thread::spawn(move || {
        barrier.wait();
        manager.start()
      })
    })
    .collect();

  let started = handles.into_iter().map(|h| h.join().unwrap()).filter(|s| *s).count();
  assert_eq!(started, 1);
  assert!(manager.is_running());

  let barrier = Arc::new(Barrier::new(16));
  let handles: Vec<_> = (0..16)
    .map(|_| {
      let manager = manager.clone();
      let barrier = barrier.clone();
      thread::spawn(move || {
        barrier.wait();
        manager.stop()
      })
    })
    .collect();

  let stopped = handles.into_iter().map(|h| h.join().unwrap()).filter(|s| *s).count();
  assert_eq!(stopped, 1);
  assert!(!manager.is_running());
}

#[test]
fn test_repeated_cycles() {
  let manager = async_manager::<(), u32>(4, 32, 32);

  for cycle in 0..20u64 {
    assert!(manager.start());
    manager.set(cycle, (), cycle as u32).unwrap();
    assert!(wait_until(|| manager.get(cycle).is_some()));
    assert!(manager.stop());
  }

  assert_eq!(manager.len(), 20);
  assert_eq!(manager.pending(), PipelineStats::default());
}

#[test]
fn test_stop_without_start_keeps_queue() {
  let manager = async_manager::<(), ()>(2, 8, 8);
  manager.set(1, (), ()).unwrap();

  // Not running, so there is no transition and nothing is discarded
  assert!(!manager.stop());
  assert_eq!(manager.pending().set_queued, 1);
}

#[test]
fn test_producers_during_lifecycle_churn() {
  let manager = Arc::new(async_manager::<(), u64>(8, 256, 256));

  // Each producer reports the ids the pipeline accepted
  let producers: Vec<_> = (0..4u64)
    .map(|t_id| {
      let manager = manager.clone();
      thread::spawn(move || {
        let mut accepted = HashSet::new();
        for i in 0..2_000u64 {
          let id = i * 4 + t_id;
          if manager.set(id, (), t_id).is_ok() {
            accepted.insert(id);
          }
        }
        accepted
      })
    })
    .collect();

  for _ in 0..10 {
    manager.start();
    thread::sleep(Duration::from_millis(1));
    manager.stop();
  }

  let mut accepted = HashSet::new();
  for h in producers {
    accepted.extend(h.join().unwrap());
  }

  // Anything still buffered is dropped by the final cycle
  assert!(manager.start());
  assert!(manager.stop());
  assert_eq!(manager.pending(), PipelineStats::default());
  assert!(!manager.is_running());

  // Discarded items may be missing, but nothing refused or invented appears
  for record in manager.snapshot() {
    assert!(accepted.contains(&record.id), "id {} was never accepted", record.id);
    assert_eq!(record.value, record.id % 4);
  }
}

#[test]
fn test_start_reports_already_running_through_is_running() {
  let manager = async_manager::<(), ()>(2, 8, 8);
  assert!(manager.start());

  // A refused start with the worker alive means it was already running
  assert!(!manager.start());
  assert!(manager.is_running());

  assert!(manager.stop());
  assert!(!manager.is_running());
}
