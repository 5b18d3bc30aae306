use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use futures::StreamExt;
use lecture_engine::{types::TranscriptBundle, NotesGenerator, NotesStream, TaskError};

#[derive(Clone)]
pub struct MockNotesGenerator {
    pub chunks: Vec<String>,
    pub calls: Arc<Mutex<Vec<String>>>,
    /// Fail before yielding any chunk.
    pub fail_with: Option<String>,
    /// Yield all chunks, then fail mid-stream.
    pub fail_mid_stream: Option<String>,
    /// Stall before the stream opens; pairs with a short task timeout.
    pub delay: Option<Duration>,
}

impl MockNotesGenerator {
    pub fn new(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
            fail_mid_stream: None,
            delay: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::new(&[])
        }
    }

    pub fn failing_mid_stream(chunks: &[&str], msg: &str) -> Self {
        Self {
            fail_mid_stream: Some(msg.to_string()),
            ..Self::new(chunks)
        }
    }

    pub fn stalled(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(&["never delivered"])
        }
    }
}

impl NotesGenerator for MockNotesGenerator {
    const NOTES_MODEL: &'static str = "mock-notes";

    async fn generate_notes(&self, bundle: &TranscriptBundle) -> Result<NotesStream, TaskError> {
        self.calls.lock().unwrap().push(bundle.transcript.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(ref msg) = self.fail_with {
            return Err(TaskError::Other(msg.clone()));
        }

        let mut items: Vec<Result<String, TaskError>> =
            self.chunks.iter().cloned().map(Ok).collect();
        if let Some(ref msg) = self.fail_mid_stream {
            items.push(Err(TaskError::Other(msg.clone())));
        }
        Ok(futures::stream::iter(items).boxed())
    }
}
