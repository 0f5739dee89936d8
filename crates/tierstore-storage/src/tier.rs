use async_trait::async_trait;

use tierstore_core::Record;

use crate::error::Result;

/// Capability every storage tier provides.
///
/// All implementations must be thread-safe (Send + Sync). Operations are
/// cancelled by dropping their future.
///
/// # Error Handling
///
/// - `CoreError::NotFound` - record is absent from this tier (`get`, `delete`)
/// - `CoreError::InvalidData` - stored record could not be decoded
/// - `CoreError::IoError` / `CoreError::StorageFailed` - backend failure
#[async_trait]
pub trait Storage: Send + Sync {
    /// Short tier label used in logs (`"hot"`, `"cold"`).
    fn name(&self) -> &str;

    /// Fetch a record, bumping `access_count` and `last_accessed` first.
    ///
    /// The returned record reflects the bump. Durable tiers persist it
    /// before returning.
    async fn get(&self, id: &str) -> Result<Record>;

    /// Upsert by id. The record is stored exactly as given.
    async fn save(&self, record: Record) -> Result<()>;

    /// Remove a record. A second delete of the same id reports `NotFound`.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Whether the tier holds `id`. Never bumps access metadata.
    async fn contains(&self, id: &str) -> Result<bool>;

    /// Unordered snapshot of every record held.
    async fn list(&self) -> Result<Vec<Record>>;

    /// Records idle for strictly longer than `threshold_secs`.
    async fn find_cold_data(&self, threshold_secs: i64) -> Result<Vec<Record>>;

    /// Records accessed within the last `threshold_secs`, inclusive.
    async fn find_hot_data(&self, threshold_secs: i64) -> Result<Vec<Record>>;
}
