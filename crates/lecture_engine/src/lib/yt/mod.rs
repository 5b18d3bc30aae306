pub mod fetcher;
pub mod player;

use std::future::Future;

use crate::{
    error::FetchError,
    types::{TranscriptBundle, VideoReference},
};

/// Retrieves metadata and a transcript for one video. Leaf dependency of the
/// task graph; no generation task runs without its output.
pub trait ContentFetcher {
    fn fetch(
        &self,
        video: &VideoReference,
    ) -> impl Future<Output = Result<TranscriptBundle, FetchError>> + Send;
}
