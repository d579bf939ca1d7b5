use crate::predicate::AckPredicate;
use crate::record::Record;

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One independently locked partition of the id space.
///
/// Writers (`set`, `insert`, `remove`, `compact`) take the write lock and
/// readers take the read lock. No method acquires the lock twice.
pub(crate) struct Shard<F, V> {
  records: RwLock<HashMap<u64, Arc<Record<F, V>>>>,
  predicate: Option<AckPredicate<F>>,
}

impl<F, V> Shard<F, V> {
  pub fn new(predicate: Option<AckPredicate<F>>) -> Self {
    Self {
      records: RwLock::new(HashMap::new()),
      predicate,
    }
  }

  /// Records `id` as sent now, replacing any earlier record for it.
  pub fn set(&self, id: u64, flag: F, value: V) {
    self.insert(Record::new(id, flag, value));
  }

  /// Stores a prebuilt record, keeping its timestamp.
  pub fn insert(&self, record: Record<F, V>) {
    let record = Arc::new(record);
    self.records.write().insert(record.id, record);
  }

  /// Removes the record for `id` if the predicate accepts `flag`.
  ///
  /// The predicate only runs against a present record. Returns whether a
  /// record was removed.
  pub fn remove(&self, id: u64, flag: &F) -> bool {
    let mut records = self.records.write();
    let Some(record) = records.get(&id) else {
      return false;
    };

    let can_ack = match &self.predicate {
      Some(predicate) => predicate(&record.flag, flag),
      None => true,
    };

    if can_ack {
      records.remove(&id);
    }
    can_ack
  }

  /// Returns every record whose age is at least `duration`.
  pub fn expired(&self, duration: Duration) -> Vec<Arc<Record<F, V>>> {
    if duration.is_zero() {
      return Vec::new();
    }

    let now = Instant::now();
    let records = self.records.read();
    records
      .values()
      .filter(|record| record.age_at(now) >= duration)
      .cloned()
      .collect()
  }

  /// Rebuilds the map at its live size, releasing space held by deletions.
  pub fn compact(&self) {
    let mut records = self.records.write();
    let mut rebuilt = HashMap::with_capacity(records.len());
    rebuilt.extend(records.drain());
    *records = rebuilt;
  }

  /// Every live record, regardless of age.
  pub fn snapshot(&self) -> Vec<Arc<Record<F, V>>> {
    self.records.read().values().cloned().collect()
  }

  pub fn get(&self, id: u64) -> Option<Arc<Record<F, V>>> {
    self.records.read().get(&id).cloned()
  }

  pub fn len(&self) -> usize {
    self.records.read().len()
  }

  #[cfg(test)]
  fn allocated(&self) -> usize {
    self.records.read().capacity()
  }
}
