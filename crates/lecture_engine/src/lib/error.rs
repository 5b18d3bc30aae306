use std::time::Duration;

use crate::types::TaskId;

/// Fatal per-run errors raised by the content fetcher. Any of these aborts
/// the run before a single generation task is launched.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid YouTube URL or video id: {0}")]
    InvalidUrl(String),
    #[error("video unavailable: {0}")]
    Unavailable(String),
    #[error("no transcript available for this video")]
    NoTranscript,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest_middleware::Error),
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to parse player response: {0}")]
    Parse(&'static str),
}

/// Task-scoped errors. Never surfaced as a stream-level error event for
/// eager-tier tasks; recorded as an omission in the aggregate instead.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("malformed model output: {0}")]
    Malformed(String),
    #[error("missing prerequisite artifact: {0}")]
    MissingPrerequisite(TaskId),
    #[error("task timed out after {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Other(String),
}
