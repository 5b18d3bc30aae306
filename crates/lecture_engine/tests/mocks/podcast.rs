use std::sync::{Arc, Mutex};

use lecture_engine::{
    types::{Concept, PodcastDialogue, PodcastScript},
    PodcastScriptGenerator, TaskError,
};

#[derive(Clone)]
pub struct MockPodcastGenerator {
    pub script: PodcastScript,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl MockPodcastGenerator {
    pub fn new() -> Self {
        Self {
            script: PodcastScript {
                title: "Thermodynamics, Explained".to_string(),
                introduction: "Welcome back! Today we dig into the first law.".to_string(),
                dialogue: vec![
                    PodcastDialogue {
                        speaker: "Alex".to_string(),
                        text: "So what is the first law, really?".to_string(),
                    },
                    PodcastDialogue {
                        speaker: "Jordan".to_string(),
                        text: "At its core, energy bookkeeping.".to_string(),
                    },
                ],
                conclusion: "Energy in equals energy out.".to_string(),
            },
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::new()
        }
    }
}

impl PodcastScriptGenerator for MockPodcastGenerator {
    const PODCAST_MODEL: &'static str = "mock-podcast";

    async fn generate_podcast(
        &self,
        _concepts: &[Concept],
        _notes: Option<&str>,
        video_title: &str,
    ) -> Result<PodcastScript, TaskError> {
        self.calls.lock().unwrap().push(video_title.to_string());
        if let Some(ref msg) = self.fail_with {
            return Err(TaskError::Other(msg.clone()));
        }
        Ok(self.script.clone())
    }
}
