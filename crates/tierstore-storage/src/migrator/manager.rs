use super::MigrationPolicy;
use crate::tier::Storage;
use std::sync::Arc;
use std::time::Duration;
use tierstore_core::{CoreError, CoreResult, Record};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

const HOT_TO_COLD: &str = "hot→cold";
const COLD_TO_HOT: &str = "cold→hot";

/// Outcome of one migration pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Records copied from hot into cold.
    pub demoted: usize,
    /// Records moved from cold into hot. Includes ids hot already held,
    /// whose cold copy was only removed.
    pub promoted: usize,
    /// Per-record save or delete failures (logged and skipped).
    pub failed: usize,
    /// Wall time of the pass.
    pub duration: Duration,
}

/// Background mover between the hot and cold tiers
///
/// Each pass runs two ordered sub-passes:
/// - Hot → Cold: hot records idle longer than `cold_threshold_secs`
/// - Cold → Hot: cold records accessed within `hot_threshold_secs`
///
/// The hot copy of a record always wins. Demotion overwrites a stale cold
/// copy; promotion of an id hot already holds only removes the cold copy.
///
/// A record is copied into the destination, then deleted from its origin.
/// A failed copy leaves the record where it was; a failed delete leaves it in
/// both tiers until a later pass or a caller delete removes it. Neither aborts
/// the pass. Only a failed candidate query does.
///
/// # Example
///
/// ```no_run
/// use tierstore_storage::migrator::{Migrator, MigrationPolicy};
/// use tierstore_storage::{FileTier, MemoryTier};
/// use tokio_util::sync::CancellationToken;
/// use std::sync::Arc;
///
/// # async fn example() -> tierstore_core::CoreResult<()> {
/// let hot = Arc::new(MemoryTier::new());
/// let cold = Arc::new(FileTier::new("./data/cold").await?);
/// let migrator = Migrator::new(hot, cold, MigrationPolicy::default())?;
///
/// let cancel = CancellationToken::new();
/// let worker = migrator.start(cancel.clone());
///
/// // ...
/// cancel.cancel();
/// let _ = worker.await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Migrator {
    hot: Arc<dyn Storage>,
    cold: Arc<dyn Storage>,
    policy: MigrationPolicy,
}

impl Migrator {
    /// Create new migrator
    ///
    /// # Errors
    ///
    /// Returns error if policy validation fails
    pub fn new(
        hot: Arc<dyn Storage>,
        cold: Arc<dyn Storage>,
        policy: MigrationPolicy,
    ) -> CoreResult<Self> {
        policy.validate().map_err(CoreError::invalid_state)?;

        Ok(Self { hot, cold, policy })
    }

    /// Policy this migrator was built with.
    pub fn policy(&self) -> &MigrationPolicy {
        &self.policy
    }

    /// Start background worker
    ///
    /// Returns immediately. The first pass runs one full interval after start.
    /// Cancellation is only observed between passes; a pass that has begun
    /// always runs to completion.
    pub fn start(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let migrator = self.clone();
        let interval = self.policy.interval();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                if let Err(e) = migrator.migrate().await {
                    tracing::error!(error = %e, "Migration pass failed");
                }
            }

            tracing::info!("Background migrator stopped");
        });

        tracing::info!(interval_secs = interval.as_secs(), "Background migrator started");
        handle
    }

    /// Run one migration pass (hot → cold, then cold → hot)
    ///
    /// This method is called by the background worker but can also be
    /// invoked manually.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MigrationFailed` naming the sub-pass whose
    /// candidate query failed. Per-record failures are counted in the report
    /// instead.
    pub async fn migrate(&self) -> CoreResult<MigrationReport> {
        tracing::debug!("Starting migration pass");
        let start = std::time::Instant::now();
        let mut report = MigrationReport::default();

        let cold_candidates = self
            .hot
            .find_cold_data(self.policy.cold_threshold_secs)
            .await
            .map_err(|e| CoreError::migration_failed(HOT_TO_COLD, e))?;

        let (moved, failed) = self
            .move_records(cold_candidates, &self.hot, &self.cold, Placement::Overwrite)
            .await;
        report.demoted = moved;
        report.failed += failed;

        let hot_candidates = self
            .cold
            .find_hot_data(self.policy.hot_threshold_secs)
            .await
            .map_err(|e| CoreError::migration_failed(COLD_TO_HOT, e))?;

        let (moved, failed) = self
            .move_records(hot_candidates, &self.cold, &self.hot, Placement::KeepExisting)
            .await;
        report.promoted = moved;
        report.failed += failed;

        report.duration = start.elapsed();
        tracing::info!(
            demoted = report.demoted,
            promoted = report.promoted,
            failed = report.failed,
            duration_ms = report.duration.as_millis() as u64,
            "Migration pass complete"
        );

        Ok(report)
    }

    /// Demote every hot record to cold, regardless of age.
    ///
    /// The hot tier does not survive the process, so a shutdown drains it
    /// after the worker has stopped. Records whose copy or delete fails stay
    /// where they were and are counted in `failed`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MigrationFailed` if the hot tier cannot be listed.
    pub async fn drain(&self) -> CoreResult<MigrationReport> {
        let start = std::time::Instant::now();

        let records = self
            .hot
            .list()
            .await
            .map_err(|e| CoreError::migration_failed(HOT_TO_COLD, e))?;

        let (demoted, failed) = self
            .move_records(records, &self.hot, &self.cold, Placement::Overwrite)
            .await;

        let report = MigrationReport {
            demoted,
            promoted: 0,
            failed,
            duration: start.elapsed(),
        };
        tracing::info!(
            demoted = report.demoted,
            failed = report.failed,
            duration_ms = report.duration.as_millis() as u64,
            "Hot tier drained"
        );

        Ok(report)
    }

    /// Copy each record into `to`, then delete it from `from`.
    ///
    /// Returns (records moved, per-record failures).
    async fn move_records(
        &self,
        records: Vec<Record>,
        from: &Arc<dyn Storage>,
        to: &Arc<dyn Storage>,
        placement: Placement,
    ) -> (usize, usize) {
        let direction = placement.direction();
        let mut moved = 0;
        let mut failed = 0;

        for record in records {
            let id = record.id.clone();

            let already_placed = match placement {
                Placement::Overwrite => false,
                Placement::KeepExisting => match to.contains(&id).await {
                    Ok(present) => present,
                    Err(e) => {
                        tracing::error!(
                            id = %id,
                            direction,
                            error = %e,
                            "Failed to check {} tier, leaving record in place",
                            to.name()
                        );
                        failed += 1;
                        continue;
                    }
                },
            };

            if already_placed {
                tracing::debug!(id = %id, direction, "Destination already holds record, dropping origin copy");
            } else if let Err(e) = to.save(record).await {
                tracing::error!(
                    id = %id,
                    direction,
                    error = %e,
                    "Failed to save record into {} tier, leaving it in place",
                    to.name()
                );
                failed += 1;
                continue;
            }
            moved += 1;

            if let Err(e) = from.delete(&id).await {
                tracing::error!(
                    id = %id,
                    direction,
                    error = %e,
                    "Failed to delete record from {} tier after copy",
                    from.name()
                );
                failed += 1;
            }
        }

        (moved, failed)
    }
}

/// How a moved record lands in its destination tier.
#[derive(Debug, Clone, Copy)]
enum Placement {
    /// Hot → cold: the hot copy is what readers see, so it replaces any cold copy.
    Overwrite,
    /// Cold → hot: a hot copy (pre-warmed or saved since) is newer and is kept.
    KeepExisting,
}

impl Placement {
    fn direction(self) -> &'static str {
        match self {
            Placement::Overwrite => HOT_TO_COLD,
            Placement::KeepExisting => COLD_TO_HOT,
        }
    }
}
