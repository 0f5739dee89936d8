use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Migration policy configuration
///
/// Controls when records move between the hot and cold tiers based on time
/// since last access.
///
/// # Example
///
/// ```
/// use tierstore_storage::migrator::MigrationPolicy;
///
/// let policy = MigrationPolicy::default();
/// assert_eq!(policy.cold_threshold_secs, 3600);
/// assert!(policy.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationPolicy {
    /// Cold records accessed within this many seconds are promoted (default: 300)
    pub hot_threshold_secs: i64,

    /// Hot records idle for longer than this many seconds are demoted (default: 3600)
    pub cold_threshold_secs: i64,

    /// Seconds between background passes (default: 60)
    pub interval_secs: u64,
}

impl Default for MigrationPolicy {
    fn default() -> Self {
        Self {
            hot_threshold_secs: 300,
            cold_threshold_secs: 3600,
            interval_secs: 60,
        }
    }
}

impl MigrationPolicy {
    /// Validate policy configuration
    ///
    /// # Errors
    ///
    /// Returns error if a value is out of range, or if the hot threshold
    /// exceeds the cold threshold (a record could then qualify for both
    /// sub-passes of one pass).
    pub fn validate(&self) -> Result<(), String> {
        if self.hot_threshold_secs < 0 {
            return Err("hot_threshold_secs must be >= 0".into());
        }
        if self.cold_threshold_secs < 0 {
            return Err("cold_threshold_secs must be >= 0".into());
        }
        if self.hot_threshold_secs > self.cold_threshold_secs {
            return Err("hot_threshold_secs must be <= cold_threshold_secs".into());
        }
        if self.interval_secs < 1 {
            return Err("interval_secs must be >= 1".into());
        }
        Ok(())
    }

    /// Get pass interval as Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
