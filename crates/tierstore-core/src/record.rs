//! The unit of data moved between tiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};

/// Opaque key/value payload carried by a record.
pub type Payload = Map<String, Value>;

/// A record plus the access metadata both tiers track.
///
/// Timestamps are unix seconds. The serialized form is the durable file
/// layout: `id`, `created_at`, `access_count`, `last_accessed`, `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Stable identity, unique within a tier.
    pub id: String,

    /// Creation time, never mutated.
    pub created_at: i64,

    /// Successful reads through a tier `get`.
    pub access_count: u64,

    /// Time of the most recent access bump.
    pub last_accessed: i64,

    /// Caller-defined content.
    #[serde(rename = "data", default)]
    pub payload: Payload,
}

impl Record {
    /// Create a fresh record stamped with the wall clock.
    pub fn new(id: impl Into<String>, payload: Payload) -> Self {
        Self::new_at(id, payload, Utc::now())
    }

    /// Create a fresh record stamped at `at`.
    pub fn new_at(id: impl Into<String>, payload: Payload, at: DateTime<Utc>) -> Self {
        let secs = at.timestamp();
        Self {
            id: id.into(),
            created_at: secs,
            access_count: 0,
            last_accessed: secs,
            payload,
        }
    }

    /// Normalize data that arrives without access metadata of its own.
    ///
    /// Identity, creation time and access count are carried over;
    /// `last_accessed` restarts at `now` so foreign staleness is not inherited.
    pub fn from_parts(
        id: impl Into<String>,
        created_at: i64,
        access_count: u64,
        payload: Payload,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            created_at,
            access_count,
            last_accessed: now.timestamp(),
            payload,
        }
    }

    /// Record one access at `now`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.access_count = self.access_count.saturating_add(1);
        self.last_accessed = now.timestamp();
    }

    /// Seconds since the last access. Saturates on out-of-range timestamps.
    #[must_use]
    pub fn idle_secs(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp().saturating_sub(self.last_accessed)
    }

    /// Idle for strictly longer than `threshold_secs`.
    #[must_use]
    pub fn is_cold(&self, now: DateTime<Utc>, threshold_secs: i64) -> bool {
        self.idle_secs(now) > threshold_secs
    }

    /// Accessed within the last `threshold_secs` (inclusive).
    #[must_use]
    pub fn is_hot(&self, now: DateTime<Utc>, threshold_secs: i64) -> bool {
        !self.is_cold(now, threshold_secs)
    }
}

/// Check that `id` can name a record in every tier.
///
/// Ids double as file names in the cold tier, so anything that could escape
/// its directory is rejected: empty ids, `.`, `..`, path separators and NUL.
///
/// # Errors
///
/// Returns `CoreError::ValidationError` describing the rejected id.
pub fn validate_id(id: &str) -> CoreResult<()> {
    if id.is_empty() {
        return Err(CoreError::ValidationError("record id cannot be empty".into()));
    }
    if id == "." || id == ".." || id.contains(['/', '\\', '\0']) {
        return Err(CoreError::ValidationError(format!(
            "record id `{id}` is not a valid file name"
        )));
    }
    Ok(())
}
