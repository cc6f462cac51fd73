use crate::derive::{DerivedFieldSpec, derive_columns};
use crate::errors::SeriesError;
use crate::source::DataSource;
use crate::table::{DateField, TimeSeriesTable};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tokio::time::Instant;
use tracing::{info, warn};

/// How long a failed rebuild is remembered before the upstream is tried again.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(30);

/// One built table and the moment its rows were fetched.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub table: Arc<TimeSeriesTable>,
    pub fetched_at: Instant,
}

impl Snapshot {
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }
}

/// A table handed to a reader, and whether it is older than the window.
#[derive(Debug, Clone)]
pub struct Reading {
    pub table: Arc<TimeSeriesTable>,
    pub stale: bool,
}

#[derive(Debug)]
struct FailedAttempt {
    at: Instant,
    error: SeriesError,
}

/// Owns the table for a single source and rebuilds it at most once per
/// staleness window.
///
/// The snapshot sits behind its own lock and is only ever replaced whole, so
/// readers never wait on a fetch and never see a half-built table. Rebuilds
/// are serialized by a second lock that also remembers the last failure;
/// until `retry_after` has passed that failure is returned without another
/// fetch.
pub struct SeriesRepository {
    source: Arc<dyn DataSource>,
    date_field: DateField,
    derived: Vec<DerivedFieldSpec>,
    stale_after: Duration,
    retry_after: Duration,
    snapshot: RwLock<Option<Snapshot>>,
    rebuild: Mutex<Option<FailedAttempt>>,
}

impl SeriesRepository {
    pub fn new(
        source: Arc<dyn DataSource>,
        date_field: DateField,
        derived: Vec<DerivedFieldSpec>,
        stale_after: Duration,
    ) -> Self {
        Self {
            source,
            date_field,
            derived,
            stale_after,
            retry_after: DEFAULT_RETRY_AFTER,
            snapshot: RwLock::new(None),
            rebuild: Mutex::new(None),
        }
    }

    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = retry_after;
        self
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Returns the current snapshot, fetching and rebuilding first if the
    /// slot is empty or older than the staleness window.
    ///
    /// Callers that arrive during a rebuild wait for it and share its
    /// result. A failed fetch or derivation leaves the previous snapshot in
    /// place.
    pub async fn refresh(&self) -> Result<Arc<TimeSeriesTable>, SeriesError> {
        if let Some(table) = self.fresh().await {
            return Ok(table);
        }
        let guard = self.rebuild.lock().await;
        self.rebuild_locked(guard).await
    }

    /// Like `refresh`, but once any snapshot exists it never waits on
    /// another caller's rebuild and falls back to the old table when the
    /// upstream is unreachable.
    pub async fn read(&self) -> Result<Reading, SeriesError> {
        if let Some(table) = self.fresh().await {
            return Ok(Reading { table, stale: false });
        }

        let previous = self.cached().await;
        let guard = match (self.rebuild.try_lock(), previous.as_ref()) {
            (Ok(guard), _) => guard,
            (Err(_), Some(snapshot)) => return Ok(stale_reading(snapshot)),
            (Err(_), None) => self.rebuild.lock().await,
        };

        match (self.rebuild_locked(guard).await, previous) {
            (Ok(table), _) => Ok(Reading { table, stale: false }),
            (Err(err @ SeriesError::SourceUnavailable { .. }), Some(snapshot)) => {
                warn!(
                    source = self.source.name(),
                    age_secs = snapshot.age().as_secs(),
                    "serving stale snapshot: {err}"
                );
                Ok(stale_reading(&snapshot))
            }
            (Err(err), _) => Err(err),
        }
    }

    /// The last successfully built snapshot, however old.
    pub async fn cached(&self) -> Option<Snapshot> {
        self.snapshot.read().await.clone()
    }

    async fn fresh(&self) -> Option<Arc<TimeSeriesTable>> {
        let slot = self.snapshot.read().await;
        slot.as_ref()
            .filter(|snapshot| snapshot.age() < self.stale_after)
            .map(|snapshot| Arc::clone(&snapshot.table))
    }

    async fn rebuild_locked(
        &self,
        mut last_failure: MutexGuard<'_, Option<FailedAttempt>>,
    ) -> Result<Arc<TimeSeriesTable>, SeriesError> {
        // another caller may have finished a rebuild while this one waited
        if let Some(table) = self.fresh().await {
            return Ok(table);
        }
        if let Some(failed) = last_failure.as_ref() {
            if failed.at.elapsed() < self.retry_after {
                return Err(failed.error.clone());
            }
        }

        match self.build().await {
            Ok(snapshot) => {
                let table = Arc::clone(&snapshot.table);
                *self.snapshot.write().await = Some(snapshot);
                *last_failure = None;
                Ok(table)
            }
            Err(error) => {
                *last_failure = Some(FailedAttempt {
                    at: Instant::now(),
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    async fn build(&self) -> Result<Snapshot, SeriesError> {
        let fetched_at = Instant::now();
        let rows = self.source.fetch().await.inspect_err(|err| {
            warn!(source = self.source.name(), "fetch failed: {err}");
        })?;

        let base = TimeSeriesTable::ingest(&rows, &self.date_field);
        let specs = self.applicable(&base);
        let table = Arc::new(derive_columns(&base, &specs)?);

        info!(
            source = self.source.name(),
            rows = table.len(),
            columns = table.column_names().count(),
            "rebuilt snapshot"
        );
        Ok(Snapshot { table, fetched_at })
    }

    /// Drops derivations whose inputs this feed does not carry, so only the
    /// charts that need those columns go missing.
    fn applicable(&self, base: &TimeSeriesTable) -> Vec<DerivedFieldSpec> {
        let mut available: HashSet<&str> = base.column_names().collect();
        let mut kept = Vec::with_capacity(self.derived.len());

        for spec in &self.derived {
            let missing = spec.inputs().into_iter().find(|input| !available.contains(input));
            match missing {
                Some(missing) => warn!(
                    source = self.source.name(),
                    output = spec.output(),
                    missing,
                    "skipping derived column"
                ),
                None => {
                    available.insert(spec.output());
                    kept.push(spec.clone());
                }
            }
        }
        kept
    }
}

fn stale_reading(snapshot: &Snapshot) -> Reading {
    Reading {
        table: Arc::clone(&snapshot.table),
        stale: true,
    }
}
