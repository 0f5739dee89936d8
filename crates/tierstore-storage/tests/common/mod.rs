//! Shared helpers for tierstore integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tierstore_core::{Clock, CoreError, CoreResult, ManualClock, Payload, Record};
use tierstore_storage::{MemoryTier, Storage};

/// Operations a [`FailingTier`] can be told to fail. `Get` also covers `contains`.
#[derive(Debug, Clone, Copy)]
pub enum Op {
    Get,
    Save,
    Delete,
    List,
    Scan,
}

/// Memory tier wrapper whose operations can be switched to fail.
pub struct FailingTier {
    inner: MemoryTier,
    label: &'static str,
    fail_get: AtomicBool,
    fail_save: AtomicBool,
    fail_delete: AtomicBool,
    fail_list: AtomicBool,
    fail_scan: AtomicBool,
}

impl FailingTier {
    pub fn new(label: &'static str, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: MemoryTier::with_clock(clock),
            label,
            fail_get: AtomicBool::new(false),
            fail_save: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            fail_list: AtomicBool::new(false),
            fail_scan: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, op: Op, failing: bool) {
        self.flag(op).store(failing, Ordering::SeqCst);
    }

    /// Direct access that bypasses failure injection.
    pub fn inner(&self) -> &MemoryTier {
        &self.inner
    }

    fn flag(&self, op: Op) -> &AtomicBool {
        match op {
            Op::Get => &self.fail_get,
            Op::Save => &self.fail_save,
            Op::Delete => &self.fail_delete,
            Op::List => &self.fail_list,
            Op::Scan => &self.fail_scan,
        }
    }

    fn check(&self, op: Op) -> CoreResult<()> {
        if self.flag(op).load(Ordering::SeqCst) {
            return Err(CoreError::StorageFailed(format!(
                "injected {op:?} failure in {} tier",
                self.label
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FailingTier {
    fn name(&self) -> &str {
        self.label
    }

    async fn get(&self, id: &str) -> CoreResult<Record> {
        self.check(Op::Get)?;
        self.inner.get(id).await
    }

    async fn save(&self, record: Record) -> CoreResult<()> {
        self.check(Op::Save)?;
        self.inner.save(record).await
    }

    async fn delete(&self, id: &str) -> CoreResult<()> {
        self.check(Op::Delete)?;
        self.inner.delete(id).await
    }

    async fn contains(&self, id: &str) -> CoreResult<bool> {
        self.check(Op::Get)?;
        self.inner.contains(id).await
    }

    async fn list(&self) -> CoreResult<Vec<Record>> {
        self.check(Op::List)?;
        self.inner.list().await
    }

    async fn find_cold_data(&self, threshold_secs: i64) -> CoreResult<Vec<Record>> {
        self.check(Op::Scan)?;
        self.inner.find_cold_data(threshold_secs).await
    }

    async fn find_hot_data(&self, threshold_secs: i64) -> CoreResult<Vec<Record>> {
        self.check(Op::Scan)?;
        self.inner.find_hot_data(threshold_secs).await
    }
}

/// Clock frozen at a round, arbitrary instant.
pub fn test_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::at_secs(1_700_000_000))
}

pub fn payload(value: &str) -> Payload {
    let mut map = Payload::new();
    map.insert("k".into(), json!(value));
    map
}

pub fn record_at(id: &str, clock: &ManualClock) -> Record {
    Record::new_at(id, payload("v"), clock.now())
}

/// Poll `tier` until `id` shows up, for detached pre-warm saves.
pub async fn wait_until_present(tier: &dyn Storage, id: &str) -> bool {
    for _ in 0..200 {
        if let Ok(records) = tier.list().await {
            if records.iter().any(|r| r.id == id) {
                return true;
            }
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    false
}
