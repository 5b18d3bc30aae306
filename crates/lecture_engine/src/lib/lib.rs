mod cache;
mod error;
mod events;
mod llm;
mod orchestrator;
pub mod tracing;
pub mod types;
pub mod yt;

pub use cache::{default_freshness, CachedResult, ResultCache};
pub use error::{FetchError, TaskError};
pub use events::EventSink;
pub use llm::openai;
pub use llm::{
    ConceptExtraction, ConceptExtractor, NotesGenerator, NotesStream, PodcastScriptGenerator,
    StudyMaterialsGenerator,
};
pub use orchestrator::{
    builder::OrchestratorBuilder, task_spec, OnDemandInput, OnDemandKind, Orchestrator, TaskSpec,
    EAGER_TASKS, ON_DEMAND_TASKS,
};
