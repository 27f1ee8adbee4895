use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    auth::dto::MessageResponse,
    auth::jwt::AuthUser,
    error::ApiError,
    search::{
        dto::{HistoryPage, HistoryQuery, PaginationMeta, SearchParams},
        repo::{NewSearchHistory, SearchHistoryEntry, SearchHistorySummary},
    },
    state::AppState,
};

pub fn search_routes() -> Router<AppState> {
    Router::new().route("/search", get(search))
}

pub fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/search/history", get(list_history))
        .route(
            "/search/history/:history_id",
            get(history_detail).delete(delete_history),
        )
}

/// Forward a query to the search service and pass its reply through. On
/// success the search is also recorded to the caller's history, on a
/// detached task so the reply never waits for (or fails with) the write.
#[instrument(skip(state, params))]
pub async fn search(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    let query = params.q.as_deref().unwrap_or("").trim().to_string();
    if query.is_empty() {
        return Err(ApiError::BadRequest("Missing search query".into()));
    }

    let filters: Value = match params.filters.as_deref() {
        None | Some("") => Value::Object(serde_json::Map::new()),
        Some(raw) => serde_json::from_str(raw)
            .map_err(|_| ApiError::Validation("Malformed filters".into()))?,
    };

    let response = state
        .search
        .search(&query, &filters)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    if response.is_success() {
        let entry =
            NewSearchHistory::from_search_response(claims.sub, &query, filters, &response.body);
        let db = state.db.clone();
        tokio::spawn(async move {
            match entry.insert(&db).await {
                Ok(id) => info!(history_id = %id, user_id = %entry.user_id, "search recorded"),
                // Best effort only; the reply is already on its way out.
                Err(e) => error!(error = %e, user_id = %entry.user_id, "failed to record search history"),
            }
        });
    }

    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, Json(response.body)).into_response())
}

#[instrument(skip(state))]
pub async fn list_history(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<HistoryPage>, ApiError> {
    let (page, limit) = (params.page(), params.limit());

    let history =
        SearchHistorySummary::list_by_user(&state.db, claims.sub, limit, params.offset()).await?;
    let total = SearchHistorySummary::count_by_user(&state.db, claims.sub).await?;

    Ok(Json(HistoryPage {
        history,
        pagination: PaginationMeta::new(total, page, limit),
    }))
}

#[instrument(skip(state))]
pub async fn history_detail(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(history_id): Path<Uuid>,
) -> Result<Json<SearchHistoryEntry>, ApiError> {
    let entry = SearchHistoryEntry::find_owned(&state.db, history_id, claims.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("Search history entry not found".into()))?;

    Ok(Json(entry))
}

#[instrument(skip(state))]
pub async fn delete_history(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(history_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = SearchHistoryEntry::delete_owned(&state.db, history_id, claims.sub).await?;
    if !deleted {
        return Err(ApiError::NotFound("Search history entry not found".into()));
    }

    info!(history_id = %history_id, user_id = %claims.sub, "search history deleted");
    Ok(Json(MessageResponse {
        message: "Search history deleted".into(),
    }))
}
