use crate::models::{parse_start_date, parse_truthy, Requester, StructuredResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

/// Roster row as imported from the planning spreadsheet
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RosterRow {
    pub name: String,
    pub start_date: String,
    pub location: String,
    pub zip_code: String,
    pub city: String,
    pub state: Option<String>,
    pub urgent: String,
    pub budget_max: Option<i32>,
    pub party_size: i32,
}

impl RosterRow {
    /// Convert to a requester; `None` when the start date cannot be parsed
    pub fn into_requester(self) -> Option<Requester> {
        let start_date = parse_start_date(&self.start_date)?;

        Some(Requester {
            name: self.name,
            start_date,
            location: self.location,
            zip_code: self.zip_code,
            city: self.city,
            state: self.state.filter(|s| !s.trim().is_empty()),
            urgent: parse_truthy(&self.urgent),
            budget_max: self.budget_max.and_then(|b| u32::try_from(b).ok()),
            party_size: u32::try_from(self.party_size).unwrap_or(1).max(1),
        })
    }
}

/// Persisted ranking with its ordered results
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRanking {
    pub id: Uuid,
    pub requester_name: String,
    pub location: String,
    pub urgent: bool,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    pub results: Vec<StructuredResponse>,
}

/// PostgreSQL store for the requester roster and ranking output
pub struct RankingStore {
    pool: PgPool,
}

impl RankingStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Load every active requester from the roster
    ///
    /// Rows whose start date cannot be parsed are skipped with a warning.
    pub async fn fetch_requesters(&self) -> Result<Vec<Requester>, StoreError> {
        let query = r#"
            SELECT name, start_date, location, zip_code, city, state, urgent, budget_max, party_size
            FROM requesters
            WHERE active
            ORDER BY id
        "#;

        let rows: Vec<RosterRow> = sqlx::query_as(query).fetch_all(&self.pool).await?;
        let total = rows.len();

        let requesters: Vec<Requester> = rows
            .into_iter()
            .filter_map(|row| {
                let name = row.name.clone();
                let start_date = row.start_date.clone();
                let requester = row.into_requester();
                if requester.is_none() {
                    tracing::warn!(requester = %name, start_date = %start_date, "Skipping requester with unparseable start date");
                }
                requester
            })
            .collect();

        tracing::debug!("Loaded {} of {} requesters", requesters.len(), total);

        Ok(requesters)
    }

    /// Persist a ranking and its ordered results
    pub async fn save_ranking(
        &self,
        requester: &Requester,
        results: &[StructuredResponse],
        summary: &str,
    ) -> Result<Uuid, StoreError> {
        let ranking_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO rankings (id, requester_name, location, urgent, summary, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            "#,
        )
        .bind(ranking_id)
        .bind(&requester.name)
        .bind(&requester.location)
        .bind(requester.urgent)
        .bind(summary)
        .execute(&mut *tx)
        .await?;

        for (position, response) in results.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO ranked_responses (ranking_id, position, rank, score, warnings, response)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(ranking_id)
            .bind(position as i32)
            .bind(response.rank.map(i16::from))
            .bind(response.score)
            .bind(&response.warnings)
            .bind(Json(response))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            requester = %requester.name,
            ranking_id = %ranking_id,
            "Saved ranking with {} results",
            results.len()
        );

        Ok(ranking_id)
    }

    /// Most recent ranking stored for a requester
    pub async fn latest_ranking(&self, requester_name: &str) -> Result<Option<StoredRanking>, StoreError> {
        let header = sqlx::query(
            r#"
            SELECT id, requester_name, location, urgent, summary, created_at
            FROM rankings
            WHERE requester_name = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(requester_name)
        .fetch_optional(&self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let ranking_id: Uuid = header.try_get("id")?;

        let rows = sqlx::query(
            r#"
            SELECT response
            FROM ranked_responses
            WHERE ranking_id = $1
            ORDER BY position
            "#,
        )
        .bind(ranking_id)
        .fetch_all(&self.pool)
        .await?;

        let results = rows
            .iter()
            .map(|row| row.try_get::<Json<StructuredResponse>, _>("response").map(|json| json.0))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(StoredRanking {
            id: ranking_id,
            requester_name: header.try_get("requester_name")?,
            location: header.try_get("location")?,
            urgent: header.try_get("urgent")?,
            summary: header.try_get("summary")?,
            created_at: header.try_get("created_at")?,
            results,
        }))
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
