use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

/// One recorded search, including the full results payload.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub query: String,
    pub filters: Value,
    pub intent_detected: Value,
    pub results_count: i32,
    pub results: Value,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Listing row: the same record without the results payload, which can be
/// large and is only wanted on the detail view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistorySummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub query: String,
    pub filters: Value,
    pub intent_detected: Value,
    pub results_count: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A history entry waiting to be persisted by the detached recording task.
#[derive(Debug, Clone)]
pub struct NewSearchHistory {
    pub user_id: Uuid,
    pub query: String,
    pub filters: Value,
    pub intent_detected: Value,
    pub results_count: i32,
    pub results: Value,
}

impl NewSearchHistory {
    /// Build an entry from the search service's response body. The body
    /// shape is owned by that service, so anything missing defaults empty.
    pub fn from_search_response(user_id: Uuid, query: &str, filters: Value, body: &Value) -> Self {
        let results = body
            .get("results")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        let results_count = results.as_array().map_or(0, Vec::len) as i32;
        let intent_detected = body
            .get("intent_detected")
            .cloned()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

        Self {
            user_id,
            query: query.to_string(),
            filters,
            intent_detected,
            results_count,
            results,
        }
    }

    pub async fn insert(&self, db: &PgPool) -> Result<Uuid, ApiError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO search_history (user_id, query, filters, intent_detected, results_count, results)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(self.user_id)
        .bind(&self.query)
        .bind(&self.filters)
        .bind(&self.intent_detected)
        .bind(self.results_count)
        .bind(&self.results)
        .fetch_one(db)
        .await?;
        Ok(id)
    }
}

impl SearchHistorySummary {
    /// One page of a user's history, newest first. Served by the
    /// `(user_id, created_at DESC)` index.
    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SearchHistorySummary>, ApiError> {
        let rows = sqlx::query_as::<_, SearchHistorySummary>(
            r#"
            SELECT id, user_id, query, filters, intent_detected, results_count, created_at
            FROM search_history
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn count_by_user(db: &PgPool, user_id: Uuid) -> Result<i64, ApiError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM search_history WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(total)
    }
}

impl SearchHistoryEntry {
    /// Detail lookup. Ownership is part of the predicate so a foreign id
    /// is indistinguishable from a missing one.
    pub async fn find_owned(
        db: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<SearchHistoryEntry>, ApiError> {
        let entry = sqlx::query_as::<_, SearchHistoryEntry>(
            r#"
            SELECT id, user_id, query, filters, intent_detected, results_count, results, created_at
            FROM search_history
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(entry)
    }

    /// Delete under the same ownership predicate; `false` means nothing
    /// matched (absent or foreign).
    pub async fn delete_owned(db: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query(
            r#"DELETE FROM search_history WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
