use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::{migrate::Migrator, postgres::PgPoolOptions, PgPool};

use crate::{datastore::DataStore, ResultRecord};

static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Debug, Clone)]
pub struct PgDataStore {
    pub pool: PgPool,
}

impl PgDataStore {
    /// Establish connection to database and run pending migrations
    pub async fn init(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .inspect_err(
                |e| tracing::error!(error = ?e, "Failed to establish connection to database"),
            )
            .context("Failed to connect to postgres database")?;

        MIGRATOR
            .run(&pool)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to run database migrations"))
            .context("Failed to run database migrations")?;

        Ok(PgDataStore { pool })
    }
}

#[derive(sqlx::FromRow)]
struct ResultRow {
    result_id: String,
    video_id: String,
    payload: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl From<ResultRow> for ResultRecord {
    fn from(row: ResultRow) -> Self {
        ResultRecord {
            result_id: row.result_id,
            video_id: row.video_id,
            payload: row.payload,
            created_at: row.created_at,
        }
    }
}

impl DataStore for PgDataStore {
    async fn find_result(&self, video_id: &str) -> anyhow::Result<Option<ResultRecord>> {
        let row = sqlx::query_as::<_, ResultRow>(
            r#"
            SELECT result_id, video_id, payload, created_at
            FROM orchestration_results
            WHERE video_id = $1
            "#,
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await
        .inspect_err(|e| {
            tracing::error!(error = ?e, video_id, "Failed to fetch orchestration result");
        })
        .context("Failed to fetch orchestration result")?;

        Ok(row.map(ResultRecord::from))
    }

    async fn upsert_result(&self, record: &ResultRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orchestration_results (result_id, video_id, payload, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (video_id) DO UPDATE
            SET result_id = EXCLUDED.result_id,
                payload = EXCLUDED.payload,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(&record.result_id)
        .bind(&record.video_id)
        .bind(&record.payload)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .inspect_err(|err| {
            tracing::error!(
                error = ?err,
                video_id = %record.video_id,
                "Failed to upsert orchestration result"
            )
        })
        .context("Failed to upsert orchestration result")?;

        Ok(())
    }

    async fn delete_result(&self, video_id: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM orchestration_results WHERE video_id = $1")
            .bind(video_id)
            .execute(&self.pool)
            .await
            .inspect_err(|err| {
                tracing::error!(error = ?err, video_id, "Failed to delete orchestration result")
            })
            .context("Failed to delete orchestration result")?;

        Ok(())
    }
}
