use std::sync::{Arc, Mutex};

use lecture_engine::{
    types::{TranscriptBundle, VideoReference},
    yt::ContentFetcher,
    FetchError,
};

#[derive(Clone)]
pub struct MockFetcher {
    pub bundle: TranscriptBundle,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl MockFetcher {
    pub fn new(bundle: TranscriptBundle) -> Self {
        Self {
            bundle,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            bundle: super::sample_bundle(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(msg.to_string()),
        }
    }
}

impl ContentFetcher for MockFetcher {
    async fn fetch(&self, video: &VideoReference) -> Result<TranscriptBundle, FetchError> {
        self.calls.lock().unwrap().push(video.video_id.clone());
        if let Some(ref msg) = self.fail_with {
            return Err(FetchError::Unavailable(msg.clone()));
        }
        Ok(self.bundle.clone())
    }
}
