use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand, ValueEnum};
use lecture_datastore::PgDataStore;
use lecture_engine::{
    openai::OpenAIClient, tracing::init_tracing_subscriber, types::VideoReference,
    yt::fetcher::YouTubeFetcher, EventSink, OnDemandInput, OnDemandKind, OrchestratorBuilder,
};

#[derive(Parser)]
#[command(name = "lecture-engine", about = "Lecture video ingestion and study-material generator")]
struct Cli {
    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY")]
    openai_key: String,

    /// Per-task generation deadline in seconds
    #[arg(long, env = "TASK_TIMEOUT_SECS", default_value = "120")]
    task_timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest one video and stream events to stdout as JSON lines
    Process {
        /// Video URL or bare 11-character video id
        url: String,

        /// Bypass the cache and reprocess even if a fresh result exists
        #[arg(long)]
        force: bool,
    },
    /// Drop any cached result for a video
    Invalidate {
        /// Video URL or bare 11-character video id
        url: String,
    },
    /// Generate an on-demand artifact from a saved concept set
    Generate {
        /// JSON file holding concepts (plus optional notes and transcript)
        input_path: PathBuf,

        /// Which artifact to generate
        #[arg(long, value_enum)]
        kind: ArtifactKind,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ArtifactKind {
    StudyMaterials,
    Podcast,
}

impl From<ArtifactKind> for OnDemandKind {
    fn from(kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::StudyMaterials => OnDemandKind::StudyMaterials,
            ArtifactKind::Podcast => OnDemandKind::Podcast,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some("production".into()),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber()?;

    let store = PgDataStore::init(&cli.database_url).await?;
    let openai = OpenAIClient::new(&cli.openai_key);

    // one client, four generator slots: the orchestrator is generic over its
    // collaborators but the production wiring shares a single resource pool
    let orchestrator = OrchestratorBuilder::new()
        .store(store)
        .fetcher(YouTubeFetcher::new())
        .notes_generator(openai.clone())
        .concept_extractor(openai.clone())
        .study_generator(openai.clone())
        .podcast_generator(openai)
        .task_timeout(Duration::from_secs(cli.task_timeout))
        .build();

    match cli.command {
        Command::Process { url, force } => {
            let video = VideoReference::parse(&url)?;
            tracing::info!(video_id = %video.video_id, force, "Processing video...");

            let (sink, mut rx) = EventSink::channel(256);
            let printer = tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    match serde_json::to_string(&event) {
                        Ok(line) => println!("{line}"),
                        Err(e) => tracing::warn!(error = ?e, "Failed to encode event"),
                    }
                }
            });

            let outcome = orchestrator.process(video, force, &sink).await;
            drop(sink);
            let _ = printer.await;
            outcome?;
        }
        Command::Invalidate { url } => {
            let video = VideoReference::parse(&url)?;
            orchestrator.invalidate(&video).await?;
            tracing::info!(video_id = %video.video_id, "Cached result removed");
        }
        Command::Generate { input_path, kind } => {
            let raw = std::fs::read_to_string(&input_path)?;
            let input: OnDemandInput = serde_json::from_str(&raw)?;
            let artifact = orchestrator.generate_on_demand(&input, kind.into()).await?;
            println!("{}", serde_json::to_string_pretty(&artifact)?);
        }
    }

    Ok(())
}
