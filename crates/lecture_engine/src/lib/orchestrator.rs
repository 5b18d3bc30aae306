//! # Orchestrator
//!
//! Owns the task graph for one video: cache check, transcript fetch,
//! concurrent fan-out of the eager generation tasks, event forwarding, and
//! aggregate assembly with write-through caching. The on-demand tier reuses
//! the same generators against an already-produced concept set.

pub mod builder;

use std::{
    collections::HashSet,
    time::{Duration, Instant},
};

use futures::StreamExt;
use lecture_datastore::DataStore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    cache::{CachedResult, ResultCache},
    error::{FetchError, TaskError},
    events::EventSink,
    llm::{ConceptExtractor, NotesGenerator, PodcastScriptGenerator, StudyMaterialsGenerator},
    types::{
        Concept, GenerationArtifact, OrchestrationResult, StreamEvent, TaskId, TaskOutcome,
        TaskRun, TranscriptBundle, VideoReference,
    },
    yt::ContentFetcher,
};

/// One node of the task graph: a task and the artifacts it needs as input.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    pub id: TaskId,
    pub requires: &'static [TaskId],
}

impl TaskSpec {
    /// First prerequisite not present in `available`, if any.
    pub fn missing_prerequisite(&self, available: &HashSet<TaskId>) -> Option<TaskId> {
        self.requires.iter().find(|t| !available.contains(t)).copied()
    }
}

/// Tasks launched concurrently as soon as the fetch succeeds. None of these
/// may depend on another eager task.
pub const EAGER_TASKS: &[TaskSpec] = &[
    TaskSpec {
        id: TaskId::Notes,
        requires: &[],
    },
    TaskSpec {
        id: TaskId::Concepts,
        requires: &[],
    },
];

/// Tasks run only on explicit follow-up request, consuming eager-tier output.
pub const ON_DEMAND_TASKS: &[TaskSpec] = &[
    TaskSpec {
        id: TaskId::StudyMaterials,
        requires: &[TaskId::Concepts],
    },
    TaskSpec {
        id: TaskId::Podcast,
        requires: &[TaskId::Concepts],
    },
];

pub fn task_spec(id: TaskId) -> TaskSpec {
    match id {
        TaskId::Notes => EAGER_TASKS[0],
        TaskId::Concepts => EAGER_TASKS[1],
        TaskId::StudyMaterials => ON_DEMAND_TASKS[0],
        TaskId::Podcast => ON_DEMAND_TASKS[1],
    }
}

/// Selector for the on-demand tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDemandKind {
    StudyMaterials,
    Podcast,
}

impl OnDemandKind {
    pub fn task_id(&self) -> TaskId {
        match self {
            OnDemandKind::StudyMaterials => TaskId::StudyMaterials,
            OnDemandKind::Podcast => TaskId::Podcast,
        }
    }
}

fn default_title() -> String {
    "Lecture".to_string()
}

/// Direct input for the on-demand tier; the fetcher is never re-run here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnDemandInput {
    pub concepts: Vec<Concept>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default = "default_title")]
    pub video_title: String,
}

impl OnDemandInput {
    fn available_tasks(&self) -> HashSet<TaskId> {
        let mut available = HashSet::new();
        if !self.concepts.is_empty() {
            available.insert(TaskId::Concepts);
        }
        if self.notes.is_some() {
            available.insert(TaskId::Notes);
        }
        available
    }
}

/// The orchestration core, generic over its collaborators so tests can swap
/// in-memory fakes for the network-facing implementations.
#[derive(Debug)]
pub struct Orchestrator<D, F, N, C, S, P>
where
    D: DataStore + Send + Sync + 'static,
    F: ContentFetcher + Send + Sync + 'static,
    N: NotesGenerator + Send + Sync + 'static,
    C: ConceptExtractor + Send + Sync + 'static,
    S: StudyMaterialsGenerator + Send + Sync + 'static,
    P: PodcastScriptGenerator + Send + Sync + 'static,
{
    cache: ResultCache<D>,
    fetcher: F,
    notes: N,
    concepts: C,
    study: S,
    podcast: P,
    task_timeout: Duration,
}

impl<D, F, N, C, S, P> Orchestrator<D, F, N, C, S, P>
where
    D: DataStore + Send + Sync + 'static,
    F: ContentFetcher + Send + Sync + 'static,
    N: NotesGenerator + Send + Sync + 'static,
    C: ConceptExtractor + Send + Sync + 'static,
    S: StudyMaterialsGenerator + Send + Sync + 'static,
    P: PodcastScriptGenerator + Send + Sync + 'static,
{
    /// Runs the full eager-tier orchestration for one video.
    ///
    /// Emits the event sequence for the run and returns the aggregate. A
    /// fetch failure is the only fatal outcome; generation-task failures
    /// degrade to omissions recorded in the aggregate.
    #[tracing::instrument(skip(self, sink), fields(video_id = %video.video_id))]
    pub async fn process(
        &self,
        video: VideoReference,
        force: bool,
        sink: &EventSink,
    ) -> Result<OrchestrationResult, FetchError> {
        let started = Instant::now();

        if force {
            tracing::info!("Cache bypass requested; reprocessing");
            sink.emit(StreamEvent::CacheNotice {
                from_cache: false,
                cached_at: None,
                age_hours: None,
            })
            .await;
        } else if let Some(cached) = self.cache.get(&video).await {
            // a replay opens with its cache notice, never a status message
            tracing::info!(age_hours = cached.age_hours(), "Cache hit; replaying");
            return Ok(self.replay(cached, sink).await);
        }

        sink.status("Fetching transcript...").await;
        let bundle = match self.fetcher.fetch(&video).await {
            Ok(bundle) => bundle,
            Err(e) => {
                tracing::error!(error = %e, "Transcript fetch failed; aborting run");
                sink.emit(StreamEvent::Error {
                    message: e.to_string(),
                })
                .await;
                return Err(e);
            }
        };
        sink.emit(bundle.metadata_event(true)).await;

        // Fan-out: eager tasks run concurrently and the sink interleaves
        // whichever has output ready first. Join-all barrier: aggregation
        // waits for every task to settle.
        let (notes_run, concepts_run) = tokio::join!(
            self.run_notes_task(&bundle, sink),
            self.run_concepts_task(&bundle, sink),
        );

        let mut artifacts = Vec::new();
        let mut task_runs = Vec::new();
        for (run, artifact) in [notes_run, concepts_run] {
            task_runs.push(run);
            artifacts.extend(artifact);
        }

        let result = OrchestrationResult {
            result_id: Uuid::new_v4().to_string(),
            video,
            bundle,
            artifacts,
            task_runs,
            processing_seconds: started.elapsed().as_secs_f64(),
        };

        self.cache.put(&result).await;
        sink.emit(StreamEvent::Complete {
            result_id: result.result_id.clone(),
        })
        .await;

        tracing::info!(
            result_id = %result.result_id,
            artifacts = result.artifacts.len(),
            seconds = result.processing_seconds,
            "Orchestration complete"
        );
        Ok(result)
    }

    /// Replays a cached aggregate as the equivalent event sequence. Replay is
    /// atomic: stored artifacts are delivered whole, with no chunk events.
    async fn replay(&self, cached: CachedResult, sink: &EventSink) -> OrchestrationResult {
        sink.emit(StreamEvent::CacheNotice {
            from_cache: true,
            cached_at: Some(cached.cached_at),
            age_hours: Some(cached.age_hours()),
        })
        .await;

        let result = cached.result;
        sink.emit(result.bundle.metadata_event(true)).await;
        for artifact in &result.artifacts {
            sink.emit(StreamEvent::ArtifactComplete {
                task: artifact.task_id(),
                artifact: artifact.clone(),
            })
            .await;
        }
        sink.emit(StreamEvent::Complete {
            result_id: result.result_id.clone(),
        })
        .await;

        result
    }

    async fn run_notes_task(
        &self,
        bundle: &TranscriptBundle,
        sink: &EventSink,
    ) -> (TaskRun, Option<GenerationArtifact>) {
        let task = TaskId::Notes;
        match tokio::time::timeout(self.task_timeout, self.collect_notes(bundle, sink)).await {
            Err(_) => {
                tracing::warn!(%task, timeout = ?self.task_timeout, "Task timed out");
                (
                    TaskRun {
                        task,
                        outcome: TaskOutcome::TimedOut,
                    },
                    None,
                )
            }
            Ok(Err(e)) => {
                tracing::warn!(%task, error = %e, "Task failed; omitting artifact");
                (
                    TaskRun {
                        task,
                        outcome: TaskOutcome::Failed {
                            reason: e.to_string(),
                        },
                    },
                    None,
                )
            }
            Ok(Ok(markdown)) => {
                let artifact = GenerationArtifact::Notes { markdown };
                sink.emit(StreamEvent::ArtifactComplete {
                    task,
                    artifact: artifact.clone(),
                })
                .await;
                (
                    TaskRun {
                        task,
                        outcome: TaskOutcome::Completed,
                    },
                    Some(artifact),
                )
            }
        }
    }

    /// Forwards each notes chunk as it arrives and returns the concatenation.
    async fn collect_notes(
        &self,
        bundle: &TranscriptBundle,
        sink: &EventSink,
    ) -> Result<String, TaskError> {
        let mut stream = self.notes.generate_notes(bundle).await?;
        let mut markdown = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            markdown.push_str(&chunk);
            sink.emit(StreamEvent::ArtifactChunk {
                task: TaskId::Notes,
                text: chunk,
            })
            .await;
        }
        Ok(markdown)
    }

    async fn run_concepts_task(
        &self,
        bundle: &TranscriptBundle,
        sink: &EventSink,
    ) -> (TaskRun, Option<GenerationArtifact>) {
        let task = TaskId::Concepts;
        match tokio::time::timeout(self.task_timeout, self.concepts.extract_concepts(bundle)).await
        {
            Err(_) => {
                tracing::warn!(%task, timeout = ?self.task_timeout, "Task timed out");
                (
                    TaskRun {
                        task,
                        outcome: TaskOutcome::TimedOut,
                    },
                    None,
                )
            }
            Ok(Err(e)) => {
                tracing::warn!(%task, error = %e, "Task failed; omitting artifact");
                (
                    TaskRun {
                        task,
                        outcome: TaskOutcome::Failed {
                            reason: e.to_string(),
                        },
                    },
                    None,
                )
            }
            Ok(Ok(extraction)) => {
                let artifact = GenerationArtifact::Concepts {
                    content_type: extraction.content_type,
                    concepts: extraction.concepts,
                };
                sink.emit(StreamEvent::ArtifactComplete {
                    task,
                    artifact: artifact.clone(),
                })
                .await;
                (
                    TaskRun {
                        task,
                        outcome: TaskOutcome::Completed,
                    },
                    Some(artifact),
                )
            }
        }
    }

    /// On-demand tier: generates one artifact from an already-produced
    /// concept set. Never re-runs the fetcher and never touches the
    /// eager-tier cache.
    #[tracing::instrument(skip(self, input), fields(task = %kind.task_id()))]
    pub async fn generate_on_demand(
        &self,
        input: &OnDemandInput,
        kind: OnDemandKind,
    ) -> Result<GenerationArtifact, TaskError> {
        let spec = task_spec(kind.task_id());
        if let Some(missing) = spec.missing_prerequisite(&input.available_tasks()) {
            tracing::warn!(%missing, "On-demand task skipped: prerequisite missing");
            return Err(TaskError::MissingPrerequisite(missing));
        }

        let generate = async {
            match kind {
                OnDemandKind::StudyMaterials => {
                    let materials = self
                        .study
                        .generate_study_materials(&input.concepts, input.transcript.as_deref())
                        .await?;
                    Ok(GenerationArtifact::StudyMaterials {
                        flashcards: materials.flashcards,
                        quiz_questions: materials.quiz_questions,
                    })
                }
                OnDemandKind::Podcast => {
                    let script = self
                        .podcast
                        .generate_podcast(
                            &input.concepts,
                            input.notes.as_deref(),
                            &input.video_title,
                        )
                        .await?;
                    // audio synthesis is a collaborator concern; the slots
                    // stay empty here
                    Ok(GenerationArtifact::Podcast {
                        script,
                        audio_base64: None,
                        duration_seconds: None,
                    })
                }
            }
        };

        match tokio::time::timeout(self.task_timeout, generate).await {
            Err(_) => Err(TaskError::Timeout(self.task_timeout)),
            Ok(result) => result,
        }
    }

    /// Removes any cached entry for the video, forcing the next request to
    /// reprocess.
    pub async fn invalidate(&self, video: &VideoReference) -> anyhow::Result<()> {
        self.cache.invalidate(video).await
    }
}
