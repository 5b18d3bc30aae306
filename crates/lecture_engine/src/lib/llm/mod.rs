pub mod openai;

use std::future::Future;

use futures::stream::BoxStream;
use serde::Deserialize;

use crate::{
    error::TaskError,
    types::{Concept, ContentType, PodcastScript, StudyMaterials, TranscriptBundle},
};

/// Finite, non-restartable sequence of text chunks from a streaming task.
pub type NotesStream = BoxStream<'static, Result<String, TaskError>>;

/// Streaming-mode generation task: lecture notes as incremental markdown.
pub trait NotesGenerator {
    const NOTES_MODEL: &'static str;

    fn generate_notes(
        &self,
        bundle: &TranscriptBundle,
    ) -> impl Future<Output = Result<NotesStream, TaskError>> + Send;
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConceptExtraction {
    pub content_type: ContentType,
    #[serde(default)]
    pub concepts: Vec<Concept>,
}

/// Atomic-mode task: key concepts plus the detected content type.
pub trait ConceptExtractor {
    const CONCEPTS_MODEL: &'static str;

    fn extract_concepts(
        &self,
        bundle: &TranscriptBundle,
    ) -> impl Future<Output = Result<ConceptExtraction, TaskError>> + Send;
}

/// Atomic-mode task: flashcards and quiz questions from the concept set.
pub trait StudyMaterialsGenerator {
    const STUDY_MODEL: &'static str;

    fn generate_study_materials(
        &self,
        concepts: &[Concept],
        transcript: Option<&str>,
    ) -> impl Future<Output = Result<StudyMaterials, TaskError>> + Send;
}

/// Atomic-mode task: a two-host podcast script from the concept set.
pub trait PodcastScriptGenerator {
    const PODCAST_MODEL: &'static str;

    fn generate_podcast(
        &self,
        concepts: &[Concept],
        notes: Option<&str>,
        video_title: &str,
    ) -> impl Future<Output = Result<PodcastScript, TaskError>> + Send;
}

/// Rough character budget that keeps prompts inside the model context window.
const TRANSCRIPT_CHAR_LIMIT: usize = 60_000;

/// Truncates at a char boundary so long transcripts never blow the context
/// window. Chunked map-reduce summarization is a possible refinement; a hard
/// cut has been good enough for lecture-length content.
pub(crate) fn clip_for_prompt(transcript: &str) -> &str {
    if transcript.len() <= TRANSCRIPT_CHAR_LIMIT {
        return transcript;
    }
    let mut end = TRANSCRIPT_CHAR_LIMIT;
    while !transcript.is_char_boundary(end) {
        end -= 1;
    }
    &transcript[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_short_input_untouched() {
        assert_eq!(clip_for_prompt("short"), "short");
    }

    #[test]
    fn test_clip_respects_char_boundaries() {
        let long = "é".repeat(TRANSCRIPT_CHAR_LIMIT);
        let clipped = clip_for_prompt(&long);
        assert!(clipped.len() <= TRANSCRIPT_CHAR_LIMIT);
        assert!(clipped.chars().all(|c| c == 'é'));
    }
}
