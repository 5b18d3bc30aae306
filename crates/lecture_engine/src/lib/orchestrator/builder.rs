//! Typestate builder for [`Orchestrator`]. Every collaborator slot starts as
//! `()` and `build` is only available once all six are filled, so a
//! half-wired orchestrator cannot compile.

use std::time::Duration;

use lecture_datastore::DataStore;

use crate::{
    cache::{default_freshness, ResultCache},
    llm::{ConceptExtractor, NotesGenerator, PodcastScriptGenerator, StudyMaterialsGenerator},
    yt::ContentFetcher,
};

use super::Orchestrator;

const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(120);

pub struct OrchestratorBuilder<D = (), F = (), N = (), C = (), S = (), P = ()> {
    store: D,
    fetcher: F,
    notes: N,
    concepts: C,
    study: S,
    podcast: P,
    task_timeout: Duration,
    freshness: chrono::Duration,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        OrchestratorBuilder {
            store: (),
            fetcher: (),
            notes: (),
            concepts: (),
            study: (),
            podcast: (),
            task_timeout: DEFAULT_TASK_TIMEOUT,
            freshness: default_freshness(),
        }
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, F, N, C, S, P> OrchestratorBuilder<D, F, N, C, S, P> {
    pub fn store<D2>(self, store: D2) -> OrchestratorBuilder<D2, F, N, C, S, P>
    where
        D2: DataStore + Send + Sync + 'static,
    {
        OrchestratorBuilder {
            store,
            fetcher: self.fetcher,
            notes: self.notes,
            concepts: self.concepts,
            study: self.study,
            podcast: self.podcast,
            task_timeout: self.task_timeout,
            freshness: self.freshness,
        }
    }

    pub fn fetcher<F2>(self, fetcher: F2) -> OrchestratorBuilder<D, F2, N, C, S, P>
    where
        F2: ContentFetcher + Send + Sync + 'static,
    {
        OrchestratorBuilder {
            store: self.store,
            fetcher,
            notes: self.notes,
            concepts: self.concepts,
            study: self.study,
            podcast: self.podcast,
            task_timeout: self.task_timeout,
            freshness: self.freshness,
        }
    }

    pub fn notes_generator<N2>(self, notes: N2) -> OrchestratorBuilder<D, F, N2, C, S, P>
    where
        N2: NotesGenerator + Send + Sync + 'static,
    {
        OrchestratorBuilder {
            store: self.store,
            fetcher: self.fetcher,
            notes,
            concepts: self.concepts,
            study: self.study,
            podcast: self.podcast,
            task_timeout: self.task_timeout,
            freshness: self.freshness,
        }
    }

    pub fn concept_extractor<C2>(self, concepts: C2) -> OrchestratorBuilder<D, F, N, C2, S, P>
    where
        C2: ConceptExtractor + Send + Sync + 'static,
    {
        OrchestratorBuilder {
            store: self.store,
            fetcher: self.fetcher,
            notes: self.notes,
            concepts,
            study: self.study,
            podcast: self.podcast,
            task_timeout: self.task_timeout,
            freshness: self.freshness,
        }
    }

    pub fn study_generator<S2>(self, study: S2) -> OrchestratorBuilder<D, F, N, C, S2, P>
    where
        S2: StudyMaterialsGenerator + Send + Sync + 'static,
    {
        OrchestratorBuilder {
            store: self.store,
            fetcher: self.fetcher,
            notes: self.notes,
            concepts: self.concepts,
            study,
            podcast: self.podcast,
            task_timeout: self.task_timeout,
            freshness: self.freshness,
        }
    }

    pub fn podcast_generator<P2>(self, podcast: P2) -> OrchestratorBuilder<D, F, N, C, S, P2>
    where
        P2: PodcastScriptGenerator + Send + Sync + 'static,
    {
        OrchestratorBuilder {
            store: self.store,
            fetcher: self.fetcher,
            notes: self.notes,
            concepts: self.concepts,
            study: self.study,
            podcast,
            task_timeout: self.task_timeout,
            freshness: self.freshness,
        }
    }

    /// Hard deadline applied independently to each generation task.
    pub fn task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = timeout;
        self
    }

    /// Age beyond which cached aggregates are treated as misses.
    pub fn freshness(mut self, freshness: chrono::Duration) -> Self {
        self.freshness = freshness;
        self
    }
}

impl<D, F, N, C, S, P> OrchestratorBuilder<D, F, N, C, S, P>
where
    D: DataStore + Send + Sync + 'static,
    F: ContentFetcher + Send + Sync + 'static,
    N: NotesGenerator + Send + Sync + 'static,
    C: ConceptExtractor + Send + Sync + 'static,
    S: StudyMaterialsGenerator + Send + Sync + 'static,
    P: PodcastScriptGenerator + Send + Sync + 'static,
{
    pub fn build(self) -> Orchestrator<D, F, N, C, S, P> {
        Orchestrator {
            cache: ResultCache::new(self.store, self.freshness),
            fetcher: self.fetcher,
            notes: self.notes,
            concepts: self.concepts,
            study: self.study,
            podcast: self.podcast,
            task_timeout: self.task_timeout,
        }
    }
}
