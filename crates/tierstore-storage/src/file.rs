//! File-backed cold tier
//!
//! One JSON document per record at `<base_dir>/<id>.json`. Every operation
//! that changes a file (including the access bump inside `get`) holds the
//! tier's write guard from first read to final rename, so a concurrent
//! delete or overwrite cannot land between them.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use tierstore_core::{validate_id, Clock, CoreError, CoreResult, Record, SystemClock};

use crate::tier::Storage;

const RECORD_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "json.tmp";

/// Durable directory-backed tier.
///
/// # Example
///
/// ```rust,no_run
/// use tierstore_storage::{FileTier, Storage};
/// use tierstore_core::Record;
///
/// #[tokio::main]
/// async fn main() -> tierstore_core::CoreResult<()> {
///     let tier = FileTier::new("./data/cold").await?;
///     tier.save(Record::new("x", Default::default())).await?;
///     let record = tier.get("x").await?;
///     assert_eq!(record.access_count, 1);
///     Ok(())
/// }
/// ```
pub struct FileTier {
    base_dir: PathBuf,
    lock: RwLock<()>,
    clock: Arc<dyn Clock>,
}

impl FileTier {
    /// Open a tier rooted at `base_dir`, creating it (and parents) if absent.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::IoError` if the directory cannot be created.
    pub async fn new(base_dir: impl AsRef<Path>) -> CoreResult<Self> {
        Self::with_clock(base_dir, Arc::new(SystemClock)).await
    }

    /// Open a tier whose access bumps and scans read time from `clock`.
    pub async fn with_clock(base_dir: impl AsRef<Path>, clock: Arc<dyn Clock>) -> CoreResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&base_dir).await?;
        debug!(base_dir = %base_dir.display(), "Opened file tier");

        Ok(Self {
            base_dir,
            lock: RwLock::new(()),
            clock,
        })
    }

    /// Directory holding the record documents.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the document for `id`.
    fn record_path(&self, id: &str) -> CoreResult<PathBuf> {
        validate_id(id)?;
        Ok(self.base_dir.join(format!("{id}.{RECORD_EXTENSION}")))
    }

    async fn read_record(&self, path: &Path, id: &str) -> CoreResult<Record> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::not_found("record", id)
            } else {
                CoreError::from(e)
            }
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Write via a sibling temp file and rename, so readers never see a torn document.
    async fn write_record(&self, record: &Record) -> CoreResult<()> {
        let path = self.record_path(&record.id)?;
        let tmp = self
            .base_dir
            .join(format!("{}.{TEMP_EXTENSION}", record.id));

        let data = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(&tmp, &data).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Decode every record document. Caller holds the lock.
    async fn load_all(&self) -> CoreResult<Vec<Record>> {
        let mut records = Vec::new();

        let mut read_dir = tokio::fs::read_dir(&self.base_dir).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }

            let decoded = match tokio::fs::read(&path).await {
                Ok(bytes) => serde_json::from_slice::<Record>(&bytes).map_err(CoreError::from),
                Err(e) => Err(CoreError::from(e)),
            };

            match decoded {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable record file");
                }
            }
        }

        Ok(records)
    }

    async fn scan(&self, keep: impl Fn(&Record) -> bool + Send) -> CoreResult<Vec<Record>> {
        let _guard = self.lock.read().await;
        let records = self.load_all().await?;
        Ok(records.into_iter().filter(|r| keep(r)).collect())
    }
}

#[async_trait]
impl Storage for FileTier {
    fn name(&self) -> &str {
        "cold"
    }

    async fn get(&self, id: &str) -> CoreResult<Record> {
        let path = self.record_path(id)?;

        let _guard = self.lock.write().await;
        let mut record = self.read_record(&path, id).await?;
        record.touch(self.clock.now());
        self.write_record(&record).await.map_err(|e| {
            CoreError::StorageFailed(format!("persisting access bump for `{id}`: {e}"))
        })?;

        Ok(record)
    }

    async fn save(&self, record: Record) -> CoreResult<()> {
        validate_id(&record.id)?;

        let _guard = self.lock.write().await;
        self.write_record(&record).await
    }

    async fn delete(&self, id: &str) -> CoreResult<()> {
        let path = self.record_path(id)?;

        let _guard = self.lock.write().await;
        tokio::fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::not_found("record", id)
            } else {
                CoreError::from(e)
            }
        })
    }

    async fn contains(&self, id: &str) -> CoreResult<bool> {
        let path = self.record_path(id)?;

        let _guard = self.lock.read().await;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn list(&self) -> CoreResult<Vec<Record>> {
        self.scan(|_| true).await
    }

    async fn find_cold_data(&self, threshold_secs: i64) -> CoreResult<Vec<Record>> {
        let now = self.clock.now();
        self.scan(move |r| r.is_cold(now, threshold_secs)).await
    }

    async fn find_hot_data(&self, threshold_secs: i64) -> CoreResult<Vec<Record>> {
        let now = self.clock.now();
        self.scan(move |r| r.is_hot(now, threshold_secs)).await
    }
}
