//! In-memory hot tier

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use tierstore_core::{Clock, CoreError, CoreResult, Record, SystemClock};

use crate::tier::Storage;

/// Volatile map-backed tier.
///
/// Every operation runs under the tier's own lock; `get` takes the write
/// side because it bumps access metadata. The lock is never held across an
/// `.await`.
pub struct MemoryTier {
    records: RwLock<HashMap<String, Record>>,
    clock: Arc<dyn Clock>,
}

impl MemoryTier {
    /// Create an empty tier on the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty tier whose access bumps and scans read `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn scan(&self, keep: impl Fn(&Record) -> bool) -> Vec<Record> {
        let records = self.records.read();
        records.values().filter(|r| keep(r)).cloned().collect()
    }
}

impl Default for MemoryTier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryTier {
    fn name(&self) -> &str {
        "hot"
    }

    async fn get(&self, id: &str) -> CoreResult<Record> {
        let now = self.clock.now();
        let mut records = self.records.write();
        let record = records
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("record", id))?;
        record.touch(now);
        Ok(record.clone())
    }

    async fn save(&self, record: Record) -> CoreResult<()> {
        self.records.write().insert(record.id.clone(), record);
        Ok(())
    }

    async fn delete(&self, id: &str) -> CoreResult<()> {
        self.records
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| CoreError::not_found("record", id))
    }

    async fn contains(&self, id: &str) -> CoreResult<bool> {
        Ok(self.records.read().contains_key(id))
    }

    async fn list(&self) -> CoreResult<Vec<Record>> {
        Ok(self.scan(|_| true))
    }

    async fn find_cold_data(&self, threshold_secs: i64) -> CoreResult<Vec<Record>> {
        let now = self.clock.now();
        Ok(self.scan(|r| r.is_cold(now, threshold_secs)))
    }

    async fn find_hot_data(&self, threshold_secs: i64) -> CoreResult<Vec<Record>> {
        let now = self.clock.now();
        Ok(self.scan(|r| r.is_hot(now, threshold_secs)))
    }
}
