//! Hook handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use axum_extra::extract::WithRejection;
use reel_db::models::Hook;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::GeneratedHook;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;
const MAX_BULK_DELETE: usize = 100;

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateHooksRequest {
    #[validate(length(min = 1, max = 500, message = "prompt must be 1 to 500 characters"))]
    pub prompt: String,
    #[validate(range(min = 1, max = 10, message = "num_hooks must be between 1 and 10"))]
    pub num_hooks: u32,
}

#[derive(Debug, Serialize)]
pub struct GenerateHooksResponse {
    pub hooks: Vec<GeneratedHook>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListHooksQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListHooksQuery {
    /// Limit clamped to 1..=100 and a non-negative offset.
    pub fn page(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

#[derive(Debug, Serialize)]
pub struct ListHooksResponse {
    pub hooks: Vec<Hook>,
    pub total_count: i64,
}

#[derive(Debug, Serialize)]
pub struct DeleteHookResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub hook_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub message: String,
    pub deleted_count: usize,
    pub deleted_ids: Vec<Uuid>,
}

fn parse_hook_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::bad_request("invalid_hook_id", format!("Invalid hook ID format: {}", raw)))
}

pub async fn generate_hooks(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(req), _): WithRejection<Json<GenerateHooksRequest>, ApiError>,
) -> ApiResult<Json<GenerateHooksResponse>> {
    req.validate()?;
    if req.prompt.trim().is_empty() {
        return Err(ApiError::validation("prompt must not be blank"));
    }

    let hooks = state
        .hooks
        .generate(user.user_id, req.prompt.trim(), req.num_hooks)
        .await?;

    Ok(Json(GenerateHooksResponse { hooks }))
}

pub async fn list_hooks(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Query(query), _): WithRejection<Query<ListHooksQuery>, ApiError>,
) -> ApiResult<Json<ListHooksResponse>> {
    let (limit, offset) = query.page();
    let (hooks, total_count) = state.hooks.list(user.user_id, limit, offset).await?;
    Ok(Json(ListHooksResponse { hooks, total_count }))
}

pub async fn delete_hook(
    State(state): State<AppState>,
    user: AuthUser,
    Path(hook_id): Path<String>,
) -> ApiResult<Json<DeleteHookResponse>> {
    let hook_id = parse_hook_id(&hook_id)?;

    if !state.hooks.delete(user.user_id, hook_id).await? {
        return Err(ApiError::not_found("hook_not_found", "Hook not found"));
    }

    Ok(Json(DeleteHookResponse {
        message: "Hook deleted successfully".to_string(),
    }))
}

pub async fn delete_hooks_bulk(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(req), _): WithRejection<Json<BulkDeleteRequest>, ApiError>,
) -> ApiResult<Json<BulkDeleteResponse>> {
    if req.hook_ids.is_empty() || req.hook_ids.len() > MAX_BULK_DELETE {
        return Err(ApiError::validation(format!(
            "hook_ids must contain between 1 and {} ids",
            MAX_BULK_DELETE
        )));
    }

    let ids = req
        .hook_ids
        .iter()
        .map(|raw| parse_hook_id(raw))
        .collect::<ApiResult<Vec<_>>>()?;

    let deleted = state.hooks.delete_many(user.user_id, &ids).await?;
    let deleted_ids: Vec<Uuid> = deleted.iter().map(|h| h.id).collect();

    Ok(Json(BulkDeleteResponse {
        message: "Successfully deleted hooks".to_string(),
        deleted_count: deleted_ids.len(),
        deleted_ids,
    }))
}
