//! SQLite-backed store for finished analyses.
//!
//! One table, plain save/list/get: records are written once and never
//! updated. All writes funnel through a single queue so concurrent saves
//! serialize on the storage engine's own transaction guarantees.

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
    Row,
};
use std::{future::Future, path::Path, str::FromStr, time::Duration};
use time::OffsetDateTime;
use tokio::{
    fs::create_dir_all,
    sync::{mpsc, oneshot},
};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::assessment::{DailyObservation, RiskAssessment};

/// A stored analysis run, as shown in history listings and returned by
/// the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub month: u8,
    pub day: u8,
    pub requested_years: usize,
    /// Unix timestamp (UTC seconds) of when the analysis ran.
    pub created_at: i64,
    pub assessment: RiskAssessment,
    pub observations: Vec<DailyObservation>,
}

/// Everything needed to persist one analysis; id and timestamp are
/// assigned on save.
#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub month: u8,
    pub day: u8,
    pub requested_years: usize,
    pub assessment: RiskAssessment,
    pub observations: Vec<DailyObservation>,
}

type WriteOperation = std::pin::Pin<Box<dyn Future<Output = ()> + Send>>;

/// Funnels writes through one task so inserts never contend on the
/// SQLite write lock.
struct DatabaseWriter {
    write_tx: mpsc::UnboundedSender<WriteOperation>,
    _handle: tokio::task::JoinHandle<()>,
}

impl DatabaseWriter {
    fn new() -> Self {
        let (write_tx, mut write_rx) = mpsc::unbounded_channel::<WriteOperation>();

        let handle = tokio::spawn(async move {
            while let Some(future) = write_rx.recv().await {
                future.await;
            }
        });

        Self {
            write_tx,
            _handle: handle,
        }
    }

    async fn execute<T, F, Fut>(&self, pool: SqlitePool, operation: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(SqlitePool) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel::<Result<T>>();

        let write_op = Box::pin(async move {
            let result = operation(pool).await;
            let _ = result_tx.send(result);
        });

        self.write_tx
            .send(write_op)
            .map_err(|_| anyhow::anyhow!("Database writer channel closed"))?;

        result_rx
            .await
            .map_err(|_| anyhow::anyhow!("Failed to receive write result"))?
    }
}

pub struct Database {
    pool: SqlitePool,
    writer: DatabaseWriter,
}

impl Database {
    pub async fn new(path: &str) -> Result<Self> {
        let db_path = format!("{}/analyses.sqlite", path);

        if let Some(parent) = Path::new(&db_path).parent() {
            create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create database directory: {parent:?}"))?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path))?
            .create_if_missing(true)
            .pragma("journal_mode", "WAL")
            .pragma("synchronous", "NORMAL")
            .pragma("busy_timeout", "5000")
            .pragma("foreign_keys", "ON")
            .pragma("temp_store", "MEMORY");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .context("Failed to create database connection pool")?;

        let db = Self {
            pool,
            writer: DatabaseWriter::new(),
        };

        db.run_migrations().await?;
        info!("SQLite database initialized at: {}", db_path);

        Ok(db)
    }

    /// A private in-memory database; used by the HTTP-level tests.
    /// Capped at one connection so every query sees the same memory.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        let db = Self {
            pool,
            writer: DatabaseWriter::new(),
        };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Check database connectivity and integrity.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database connectivity check failed")?;

        let result: String = sqlx::query_scalar("PRAGMA quick_check;")
            .fetch_one(&self.pool)
            .await
            .context("Database integrity check failed")?;
        if result != "ok" {
            return Err(anyhow::anyhow!(
                "Database integrity check failed: {}",
                result
            ));
        }

        Ok(())
    }

    /// Persists one finished analysis and returns the stored record with
    /// its assigned id and timestamp.
    pub async fn save(&self, analysis: NewAnalysis) -> Result<AnalysisRecord> {
        let pool = self.pool.clone();

        let record = AnalysisRecord {
            id: Uuid::now_v7(),
            created_at: OffsetDateTime::now_utc().unix_timestamp(),
            location_name: analysis.location_name,
            latitude: analysis.latitude,
            longitude: analysis.longitude,
            month: analysis.month,
            day: analysis.day,
            requested_years: analysis.requested_years,
            assessment: analysis.assessment,
            observations: analysis.observations,
        };
        let stored = record.clone();

        self.writer
            .execute(pool, move |pool| async move {
                let assessment_json = serde_json::to_string(&record.assessment)?;
                let observations_json = serde_json::to_string(&record.observations)?;

                sqlx::query(
                    "INSERT INTO analyses (
                        id, location_name, latitude, longitude,
                        month, day, requested_years, created_at,
                        assessment, observations
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(record.id.to_string())
                .bind(&record.location_name)
                .bind(record.latitude)
                .bind(record.longitude)
                .bind(record.month as i64)
                .bind(record.day as i64)
                .bind(record.requested_years as i64)
                .bind(record.created_at)
                .bind(&assessment_json)
                .bind(&observations_json)
                .execute(&pool)
                .await?;

                Ok(())
            })
            .await?;

        Ok(stored)
    }

    /// Most recent analyses, newest first.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<AnalysisRecord>> {
        let rows = sqlx::query(
            "SELECT id, location_name, latitude, longitude,
                    month, day, requested_years, created_at,
                    assessment, observations
             FROM analyses
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(record_from_row).collect()
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<AnalysisRecord>> {
        let row = sqlx::query(
            "SELECT id, location_name, latitude, longitude,
                    month, day, requested_years, created_at,
                    assessment, observations
             FROM analyses
             WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(record_from_row).transpose()
    }
}

fn record_from_row(row: &SqliteRow) -> Result<AnalysisRecord> {
    let id: String = row.try_get("id")?;
    let assessment_json: String = row.try_get("assessment")?;
    let observations_json: String = row.try_get("observations")?;

    Ok(AnalysisRecord {
        id: Uuid::parse_str(&id).context("stored analysis id is not a UUID")?,
        location_name: row.try_get("location_name")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        month: row.try_get::<i64, _>("month")? as u8,
        day: row.try_get::<i64, _>("day")? as u8,
        requested_years: row.try_get::<i64, _>("requested_years")? as usize,
        created_at: row.try_get("created_at")?,
        assessment: serde_json::from_str(&assessment_json)
            .context("stored assessment is not valid JSON")?,
        observations: serde_json::from_str(&observations_json)
            .context("stored observations are not valid JSON")?,
    })
}
