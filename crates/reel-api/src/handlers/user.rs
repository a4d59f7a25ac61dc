//! Account handler.

use axum::extract::State;
use axum::Json;
use reel_db::models::UserAccount;
use reel_db::repositories::UserRepo;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

/// Return the caller's account, creating it on first sight.
pub async fn get_user_account(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<UserAccount>> {
    let account = UserRepo::ensure_exists(&state.db, user.user_id).await?;
    Ok(Json(account))
}
