//! Pull request store on SQLite

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rota_core::{
    Entity, Error, PrStatus, PullRequest, PullRequestShort, PullRequestStore, Result,
};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use super::{is_unique_violation, storage};

#[derive(Debug, sqlx::FromRow)]
struct PullRequestRow {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: String,
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct PullRequestShortRow {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: String,
}

impl TryFrom<PullRequestShortRow> for PullRequestShort {
    type Error = Error;

    fn try_from(row: PullRequestShortRow) -> Result<Self> {
        Ok(PullRequestShort {
            pull_request_id: row.pull_request_id,
            pull_request_name: row.pull_request_name,
            author_id: row.author_id,
            status: row.status.parse()?,
        })
    }
}

/// Repository for pull requests and reviewer slots
#[derive(Debug, Clone)]
pub struct PullRequestRepo {
    pool: SqlitePool,
}

impl PullRequestRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn exists(conn: &mut SqliteConnection, pr_id: &str) -> Result<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM pull_requests WHERE pull_request_id = ?")
                .bind(pr_id)
                .fetch_optional(conn)
                .await
                .map_err(storage("check pull request"))?;
        Ok(found.is_some())
    }

    async fn insert_reviewers(
        conn: &mut SqliteConnection,
        pr_id: &str,
        reviewer_ids: &[String],
    ) -> Result<()> {
        for (position, reviewer_id) in reviewer_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO pr_reviewers (pull_request_id, reviewer_id, position) VALUES (?, ?, ?)",
            )
            .bind(pr_id)
            .bind(reviewer_id)
            .bind(position as i64)
            .execute(&mut *conn)
            .await
            .map_err(storage("insert reviewer"))?;
        }
        Ok(())
    }
}

#[async_trait]
impl PullRequestStore for PullRequestRepo {
    async fn create(&self, pr: &PullRequest) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage("begin create pull request"))?;

        sqlx::query(
            r#"
            INSERT INTO pull_requests (
                pull_request_id, pull_request_name, author_id, status, created_at, merged_at
            )
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&pr.pull_request_id)
        .bind(&pr.pull_request_name)
        .bind(&pr.author_id)
        .bind(pr.status.as_str())
        .bind(pr.created_at)
        .bind(pr.merged_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::already_exists(Entity::PullRequest, &pr.pull_request_id)
            } else {
                Error::storage("create pull request", e)
            }
        })?;

        Self::insert_reviewers(&mut tx, &pr.pull_request_id, &pr.assigned_reviewers).await?;

        tx.commit()
            .await
            .map_err(storage("commit create pull request"))?;

        debug!(pr_id = %pr.pull_request_id, "pull request stored");
        Ok(())
    }

    async fn get_by_id(&self, pr_id: &str) -> Result<PullRequest> {
        let row = sqlx::query_as::<_, PullRequestRow>(
            r#"
            SELECT pull_request_id, pull_request_name, author_id, status, created_at, merged_at
            FROM pull_requests
            WHERE pull_request_id = ?
            "#,
        )
        .bind(pr_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage("get pull request"))?
        .ok_or_else(|| Error::not_found(Entity::PullRequest, pr_id))?;

        let assigned_reviewers: Vec<String> = sqlx::query_scalar(
            "SELECT reviewer_id FROM pr_reviewers WHERE pull_request_id = ? ORDER BY position",
        )
        .bind(pr_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage("get pull request reviewers"))?;

        Ok(PullRequest {
            pull_request_id: row.pull_request_id,
            pull_request_name: row.pull_request_name,
            author_id: row.author_id,
            status: row.status.parse()?,
            assigned_reviewers,
            created_at: row.created_at,
            merged_at: row.merged_at,
        })
    }

    async fn update_status(
        &self,
        pr_id: &str,
        status: PrStatus,
        merged_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE pull_requests
            SET status = ?, merged_at = ?
            WHERE pull_request_id = ? AND status != ?
            "#,
        )
        .bind(status.as_str())
        .bind(merged_at)
        .bind(pr_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(storage("update pull request status"))?;

        if result.rows_affected() == 0 {
            let mut conn = self
                .pool
                .acquire()
                .await
                .map_err(storage("acquire connection"))?;
            if !Self::exists(&mut conn, pr_id).await? {
                return Err(Error::not_found(Entity::PullRequest, pr_id));
            }
        }
        Ok(())
    }

    async fn set_reviewers(&self, pr_id: &str, reviewer_ids: &[String]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage("begin set reviewers"))?;

        if !Self::exists(&mut tx, pr_id).await? {
            return Err(Error::not_found(Entity::PullRequest, pr_id));
        }

        sqlx::query("DELETE FROM pr_reviewers WHERE pull_request_id = ?")
            .bind(pr_id)
            .execute(&mut *tx)
            .await
            .map_err(storage("clear reviewers"))?;

        Self::insert_reviewers(&mut tx, pr_id, reviewer_ids).await?;

        tx.commit().await.map_err(storage("commit set reviewers"))?;
        Ok(())
    }

    async fn list_by_reviewer(&self, reviewer_id: &str) -> Result<Vec<PullRequestShort>> {
        let rows = sqlx::query_as::<_, PullRequestShortRow>(
            r#"
            SELECT p.pull_request_id, p.pull_request_name, p.author_id, p.status
            FROM pull_requests p
            JOIN pr_reviewers r ON r.pull_request_id = p.pull_request_id
            WHERE r.reviewer_id = ?
            ORDER BY p.created_at DESC, p.rowid DESC
            "#,
        )
        .bind(reviewer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage("list pull requests by reviewer"))?;

        rows.into_iter().map(PullRequestShort::try_from).collect()
    }

    async fn list_open_by_reviewers(
        &self,
        reviewer_ids: &[String],
    ) -> Result<Vec<PullRequestShort>> {
        if reviewer_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT p.pull_request_id, p.pull_request_name, p.author_id, p.status
            FROM pull_requests p
            WHERE p.status = 'OPEN'
              AND p.pull_request_id IN (
                SELECT pull_request_id FROM pr_reviewers WHERE reviewer_id IN (
            "#,
        );
        let mut ids = builder.separated(", ");
        for id in reviewer_ids {
            ids.push_bind(id.as_str());
        }
        builder.push(")) ORDER BY p.created_at, p.rowid");

        let rows = builder
            .build_query_as::<PullRequestShortRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(storage("list open pull requests by reviewers"))?;

        rows.into_iter().map(PullRequestShort::try_from).collect()
    }

    async fn count_by_reviewer(&self) -> Result<HashMap<String, String>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT reviewer_id, CAST(COUNT(*) AS TEXT)
            FROM pr_reviewers
            GROUP BY reviewer_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage("count reviews by reviewer"))?;

        Ok(rows.into_iter().collect())
    }
}
