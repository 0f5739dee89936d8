//! Read-through front door over a hot and a cold tier.

use std::sync::Arc;
use tracing::{debug, warn};

use tierstore_core::{validate_id, CoreResult, Record};

use crate::tier::Storage;

/// Single logical store composed of one hot and one cold tier.
///
/// - `get`: hot first; on any hot miss, cold, then a detached pre-warm save
///   into hot whose outcome is discarded.
/// - `save`: hot only. Cold placement happens through migration.
/// - `delete`: both tiers; a tier that reports `NotFound` counts as done, and
///   the call fails only when both tiers fail outright.
/// - `list`: hot ++ cold, no de-duplication; a failing tier contributes nothing.
///
/// Pre-warming spawns onto the current tokio runtime.
#[derive(Clone)]
pub struct Accessor {
    hot: Arc<dyn Storage>,
    cold: Arc<dyn Storage>,
}

impl Accessor {
    /// Compose an accessor over an existing pair of tiers.
    pub fn new(hot: Arc<dyn Storage>, cold: Arc<dyn Storage>) -> Self {
        Self { hot, cold }
    }

    /// Fetch `id`, bumping its access metadata in whichever tier served it.
    ///
    /// A hot error other than `NotFound` is logged and treated as a miss. The
    /// cold tier's error is returned as-is.
    pub async fn get(&self, id: &str) -> CoreResult<Record> {
        match self.hot.get(id).await {
            Ok(record) => return Ok(record),
            Err(e) if !e.is_not_found() => {
                debug!(id = %id, tier = self.hot.name(), error = %e, "Hot tier read failed, falling back");
            }
            Err(_) => {}
        }

        let record = self.cold.get(id).await?;
        self.prewarm(record.clone());
        Ok(record)
    }

    /// Store `record` in the hot tier.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ValidationError` for an id the cold tier could
    /// never hold, so the record is not stranded in hot.
    pub async fn save(&self, record: Record) -> CoreResult<()> {
        validate_id(&record.id)?;
        self.hot.save(record).await
    }

    /// Remove `id` from both tiers.
    pub async fn delete(&self, id: &str) -> CoreResult<()> {
        let hot = absent_ok(self.hot.delete(id).await);
        let cold = absent_ok(self.cold.delete(id).await);

        match (hot, cold) {
            (Ok(()), _) | (_, Ok(())) => Ok(()),
            (Err(hot_err), Err(cold_err)) => {
                warn!(id = %id, error = %cold_err, "Cold tier delete failed");
                Err(hot_err)
            }
        }
    }

    /// Every record from hot, then every record from cold. Never bumps.
    pub async fn list(&self) -> CoreResult<Vec<Record>> {
        let mut records = self.list_or_empty(&self.hot).await;
        records.extend(self.list_or_empty(&self.cold).await);
        Ok(records)
    }

    async fn list_or_empty(&self, tier: &Arc<dyn Storage>) -> Vec<Record> {
        tier.list().await.unwrap_or_else(|e| {
            warn!(tier = tier.name(), error = %e, "Tier list failed, omitting its records");
            Vec::new()
        })
    }

    /// Copy a cold hit into the hot tier in the background.
    fn prewarm(&self, record: Record) {
        let hot = Arc::clone(&self.hot);
        tokio::spawn(async move {
            let id = record.id.clone();
            if let Err(e) = hot.save(record).await {
                debug!(id = %id, error = %e, "Pre-warm save failed");
            }
        });
    }
}

/// A tier that never held the id has nothing to delete.
fn absent_ok(result: CoreResult<()>) -> CoreResult<()> {
    match result {
        Err(e) if e.is_not_found() => Ok(()),
        other => other,
    }
}
