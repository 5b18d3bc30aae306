use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use lecture_engine::{
    types::{Concept, TranscriptBundle},
    ConceptExtraction, ConceptExtractor, TaskError,
};

#[derive(Clone)]
pub struct MockConceptExtractor {
    pub concepts: Vec<Concept>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
    pub delay: Option<Duration>,
}

impl MockConceptExtractor {
    pub fn new(concepts: Vec<Concept>) -> Self {
        Self {
            concepts,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
            delay: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::new(Vec::new())
        }
    }

    pub fn stalled(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(super::sample_concepts())
        }
    }
}

impl ConceptExtractor for MockConceptExtractor {
    const CONCEPTS_MODEL: &'static str = "mock-concepts";

    async fn extract_concepts(
        &self,
        bundle: &TranscriptBundle,
    ) -> Result<ConceptExtraction, TaskError> {
        self.calls.lock().unwrap().push(bundle.transcript.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(ref msg) = self.fail_with {
            return Err(TaskError::Other(msg.clone()));
        }

        Ok(ConceptExtraction {
            content_type: super::sample_content_type(),
            concepts: self.concepts.clone(),
        })
    }
}
