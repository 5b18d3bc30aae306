pub mod concepts;
pub mod datastore;
pub mod fetcher;
pub mod notes;
pub mod podcast;
pub mod study;

use lecture_engine::types::{
    Concept, ConceptCategory, ContentKind, ContentType, Importance, TranscriptBundle,
    TranscriptSegment,
};

pub fn sample_bundle() -> TranscriptBundle {
    TranscriptBundle {
        video_id: "dQw4w9WgXcQ".to_string(),
        title: "Intro to Thermodynamics".to_string(),
        channel: "Open Lectures".to_string(),
        duration_seconds: Some(1800),
        transcript: "Today we cover the first law of thermodynamics. Energy cannot be created or destroyed."
            .to_string(),
        segments: vec![
            TranscriptSegment {
                start: 0.0,
                text: "Today we cover the first law of thermodynamics.".to_string(),
            },
            TranscriptSegment {
                start: 4.2,
                text: "Energy cannot be created or destroyed.".to_string(),
            },
        ],
    }
}

pub fn sample_concepts() -> Vec<Concept> {
    vec![
        Concept {
            name: "First law of thermodynamics".to_string(),
            category: ConceptCategory::Theory,
            definition: Some("Energy is conserved in an isolated system.".to_string()),
            context_snippet: "the first law of thermodynamics".to_string(),
            timestamp: Some(2.0),
            confidence_score: 0.95,
            importance: Importance::High,
        },
        Concept {
            name: "Energy conservation".to_string(),
            category: ConceptCategory::Term,
            definition: None,
            context_snippet: "Energy cannot be created or destroyed".to_string(),
            timestamp: Some(5.0),
            confidence_score: 0.8,
            importance: Importance::Medium,
        },
    ]
}

pub fn sample_content_type() -> ContentType {
    ContentType {
        primary_type: ContentKind::Science,
        confidence: 0.9,
        keywords_matched: vec!["thermodynamics".to_string(), "energy".to_string()],
    }
}
