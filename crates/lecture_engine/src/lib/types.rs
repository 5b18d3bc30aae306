//! Domain types shared across the orchestration pipeline: the normalized
//! video reference, the fetched transcript bundle, generation artifacts, the
//! aggregate result, and the event stream vocabulary.

use std::{fmt, sync::LazyLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

static VIDEO_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:v=|/)([0-9A-Za-z_-]{11})(?:[?&#/]|$)",
        r"(?:embed/)([0-9A-Za-z_-]{11})",
        r"^([0-9A-Za-z_-]{11})$",
    ]
    .into_iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Normalized video identifier plus the URL the caller supplied.
///
/// Derived once per request; used as the cache key and as fetcher input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoReference {
    pub video_id: String,
    pub url: String,
}

impl VideoReference {
    /// Accepts watch URLs, `youtu.be` short links, embed URLs, and bare
    /// 11-character video ids.
    pub fn parse(input: &str) -> Result<Self, FetchError> {
        let input = input.trim();
        for pattern in VIDEO_ID_PATTERNS.iter() {
            if let Some(captures) = pattern.captures(input) {
                let video_id = captures[1].to_string();
                return Ok(VideoReference {
                    url: if input == video_id {
                        format!("https://www.youtube.com/watch?v={video_id}")
                    } else {
                        input.to_string()
                    },
                    video_id,
                });
            }
        }
        Err(FetchError::InvalidUrl(input.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub text: String,
}

/// Video metadata plus the full transcript. Produced once per run by the
/// content fetcher and shared read-only by every generation task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptBundle {
    pub video_id: String,
    pub title: String,
    pub channel: String,
    pub duration_seconds: Option<u64>,
    pub transcript: String,
    pub segments: Vec<TranscriptSegment>,
}

impl TranscriptBundle {
    pub fn metadata_event(&self, include_transcript: bool) -> StreamEvent {
        StreamEvent::Metadata {
            video_id: self.video_id.clone(),
            title: self.title.clone(),
            channel: self.channel.clone(),
            duration_seconds: self.duration_seconds,
            transcript: include_transcript.then(|| self.transcript.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConceptCategory {
    Term,
    Definition,
    Person,
    Theory,
    Formula,
    Event,
    Tool,
    Framework,
    Book,
    Place,
    Date,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Science,
    History,
    Business,
    Tech,
    Math,
    #[serde(other)]
    General,
}

/// Detected subject area of the lecture, reported by the concept extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentType {
    pub primary_type: ContentKind,
    pub confidence: f64,
    #[serde(default)]
    pub keywords_matched: Vec<String>,
}

/// One key concept, term, person, or entity extracted from the transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concept {
    pub name: String,
    pub category: ConceptCategory,
    #[serde(default)]
    pub definition: Option<String>,
    /// Supporting quote from the transcript.
    pub context_snippet: String,
    #[serde(default)]
    pub timestamp: Option<f64>,
    pub confidence_score: f64,
    pub importance: Importance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
    pub concept_name: String,
    pub difficulty: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    /// Exactly four options; entries violating this are dropped on parse.
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: String,
    pub concept_name: String,
    pub difficulty: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudyMaterials {
    #[serde(default)]
    pub flashcards: Vec<Flashcard>,
    #[serde(default)]
    pub quiz_questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodcastDialogue {
    pub speaker: String,
    pub text: String,
}

/// Two-host podcast script built from the extracted concepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodcastScript {
    pub title: String,
    pub introduction: String,
    #[serde(default)]
    pub dialogue: Vec<PodcastDialogue>,
    pub conclusion: String,
}

/// Identifier of one generation task in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskId {
    Notes,
    Concepts,
    StudyMaterials,
    Podcast,
}

impl TaskId {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskId::Notes => "notes",
            TaskId::Concepts => "concepts",
            TaskId::StudyMaterials => "study_materials",
            TaskId::Podcast => "podcast",
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one generation task, discriminated by task id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum GenerationArtifact {
    Notes {
        markdown: String,
    },
    Concepts {
        content_type: ContentType,
        concepts: Vec<Concept>,
    },
    StudyMaterials {
        flashcards: Vec<Flashcard>,
        quiz_questions: Vec<QuizQuestion>,
    },
    Podcast {
        script: PodcastScript,
        audio_base64: Option<String>,
        duration_seconds: Option<u64>,
    },
}

impl GenerationArtifact {
    pub fn task_id(&self) -> TaskId {
        match self {
            GenerationArtifact::Notes { .. } => TaskId::Notes,
            GenerationArtifact::Concepts { .. } => TaskId::Concepts,
            GenerationArtifact::StudyMaterials { .. } => TaskId::StudyMaterials,
            GenerationArtifact::Podcast { .. } => TaskId::Podcast,
        }
    }
}

/// Per-task outcome recorded in the aggregate, so callers can tell
/// "not generated" apart from "generation failed".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    Completed,
    Failed { reason: String },
    TimedOut,
    Skipped { missing: TaskId },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRun {
    pub task: TaskId,
    pub outcome: TaskOutcome,
}

/// The aggregate produced by one orchestration run. Immutable once created;
/// this is the unit stored in the cache and replayed on a hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationResult {
    pub result_id: String,
    pub video: VideoReference,
    pub bundle: TranscriptBundle,
    pub artifacts: Vec<GenerationArtifact>,
    pub task_runs: Vec<TaskRun>,
    pub processing_seconds: f64,
}

impl OrchestrationResult {
    pub fn artifact(&self, task: TaskId) -> Option<&GenerationArtifact> {
        self.artifacts.iter().find(|a| a.task_id() == task)
    }

    /// Concept list from the concepts artifact, if that task produced output.
    pub fn concepts(&self) -> Option<&[Concept]> {
        match self.artifact(TaskId::Concepts) {
            Some(GenerationArtifact::Concepts { concepts, .. }) => Some(concepts),
            _ => None,
        }
    }

    pub fn notes_markdown(&self) -> Option<&str> {
        match self.artifact(TaskId::Notes) {
            Some(GenerationArtifact::Notes { markdown }) => Some(markdown),
            _ => None,
        }
    }
}

/// Ordered event stream delivered to the consumer during one run.
///
/// Invariants upheld by the orchestrator: metadata precedes every
/// task-specific event, chunks for a task precede that task's completion,
/// and exactly one terminal event (`Complete` or `Error`) closes the stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Status {
        message: String,
    },
    CacheNotice {
        from_cache: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        cached_at: Option<DateTime<Utc>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        age_hours: Option<f64>,
    },
    Metadata {
        video_id: String,
        title: String,
        channel: String,
        duration_seconds: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        transcript: Option<String>,
    },
    ArtifactChunk {
        task: TaskId,
        text: String,
    },
    ArtifactComplete {
        task: TaskId,
        artifact: GenerationArtifact,
    },
    Complete {
        result_id: String,
    },
    Error {
        message: String,
    },
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Complete { .. } | StreamEvent::Error { .. })
    }
}
