use chrono::{DateTime, Duration, Utc};
use lecture_datastore::{DataStore, ResultRecord};

use crate::types::{OrchestrationResult, VideoReference};

/// Default freshness window: entries older than this behave as misses.
pub fn default_freshness() -> Duration {
    Duration::days(7)
}

/// A cached aggregate together with its creation timestamp.
#[derive(Debug, Clone)]
pub struct CachedResult {
    pub result: OrchestrationResult,
    pub cached_at: DateTime<Utc>,
}

impl CachedResult {
    pub fn age_hours(&self) -> f64 {
        let age = Utc::now() - self.cached_at;
        age.num_milliseconds() as f64 / 3_600_000.0
    }
}

/// Write-through cache over the datastore, keyed by normalized video id.
///
/// Expiry is lazy: stale records are treated as absent, never swept. Read and
/// write failures degrade (miss / no persist) rather than failing the run;
/// only explicit invalidation propagates its error.
#[derive(Debug)]
pub struct ResultCache<D> {
    store: D,
    freshness: Duration,
}

impl<D> ResultCache<D>
where
    D: DataStore + Send + Sync,
{
    pub fn new(store: D, freshness: Duration) -> Self {
        ResultCache { store, freshness }
    }

    #[tracing::instrument(skip(self), fields(video_id = %video.video_id))]
    pub async fn get(&self, video: &VideoReference) -> Option<CachedResult> {
        let record = match self.store.find_result(&video.video_id).await {
            Ok(record) => record?,
            Err(e) => {
                tracing::warn!(error = ?e, "Cache read failed; treating as miss");
                return None;
            }
        };

        let age = Utc::now() - record.created_at;
        if age >= self.freshness {
            tracing::debug!(age_hours = age.num_hours(), "Cache entry expired");
            return None;
        }

        match serde_json::from_value::<OrchestrationResult>(record.payload) {
            Ok(result) => Some(CachedResult {
                result,
                cached_at: record.created_at,
            }),
            Err(e) => {
                tracing::warn!(error = ?e, "Failed to decode cached result; treating as miss");
                None
            }
        }
    }

    /// Whole-entry replacement; newest write wins. Failures are logged and
    /// swallowed so result delivery is never blocked on persistence.
    #[tracing::instrument(skip_all, fields(video_id = %result.video.video_id))]
    pub async fn put(&self, result: &OrchestrationResult) {
        let payload = match serde_json::to_value(result) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = ?e, "Failed to serialize result; skipping cache write");
                return;
            }
        };

        let record = ResultRecord {
            result_id: result.result_id.clone(),
            video_id: result.video.video_id.clone(),
            payload,
            created_at: Utc::now(),
        };

        if let Err(e) = self.store.upsert_result(&record).await {
            tracing::warn!(error = ?e, "Cache write failed; result not persisted");
        }
    }

    pub async fn invalidate(&self, video: &VideoReference) -> anyhow::Result<()> {
        self.store.delete_result(&video.video_id).await
    }
}
