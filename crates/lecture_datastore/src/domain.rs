use chrono::{DateTime, Utc};

/// Durable form of one orchestration run.
///
/// `payload` is the JSON-serialized aggregate owned by the engine crate; the
/// datastore treats it as opaque. `video_id` is the upsert key, so at most one
/// live record exists per video.
#[derive(Debug, Clone)]
pub struct ResultRecord {
    pub result_id: String,
    pub video_id: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
