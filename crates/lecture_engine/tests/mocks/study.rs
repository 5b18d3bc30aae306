use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use lecture_engine::{
    types::{Concept, Flashcard, QuizQuestion, StudyMaterials},
    StudyMaterialsGenerator, TaskError,
};

#[derive(Clone)]
pub struct MockStudyGenerator {
    pub materials: StudyMaterials,
    pub calls: Arc<Mutex<Vec<Vec<String>>>>,
    pub fail_with: Option<String>,
    pub delay: Option<Duration>,
}

impl MockStudyGenerator {
    pub fn new() -> Self {
        Self {
            materials: sample_materials(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
            delay: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::new()
        }
    }

    pub fn stalled(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }
}

fn sample_materials() -> StudyMaterials {
    StudyMaterials {
        flashcards: vec![Flashcard {
            question: "What does the first law of thermodynamics state?".to_string(),
            answer: "Energy is conserved in an isolated system.".to_string(),
            concept_name: "First law of thermodynamics".to_string(),
            difficulty: "easy".to_string(),
            category: "theory".to_string(),
        }],
        quiz_questions: vec![QuizQuestion {
            question: "Which quantity is conserved per the first law?".to_string(),
            options: vec![
                "Energy".to_string(),
                "Entropy".to_string(),
                "Momentum".to_string(),
                "Charge".to_string(),
            ],
            correct_index: 0,
            explanation: "The first law is a statement of energy conservation.".to_string(),
            concept_name: "First law of thermodynamics".to_string(),
            difficulty: "easy".to_string(),
        }],
    }
}

impl StudyMaterialsGenerator for MockStudyGenerator {
    const STUDY_MODEL: &'static str = "mock-study";

    async fn generate_study_materials(
        &self,
        concepts: &[Concept],
        _transcript: Option<&str>,
    ) -> Result<StudyMaterials, TaskError> {
        self.calls
            .lock()
            .unwrap()
            .push(concepts.iter().map(|c| c.name.clone()).collect());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(ref msg) = self.fail_with {
            return Err(TaskError::Other(msg.clone()));
        }
        Ok(self.materials.clone())
    }
}
