//! Checkout and billing portal handlers.

use axum::extract::State;
use axum::Json;
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutSessionRequest {
    pub price_id: Option<String>,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutSessionResponse {
    pub checkout_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CustomerPortalRequest {
    pub return_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CustomerPortalResponse {
    pub portal_url: String,
}

fn required(value: Option<String>, code: &'static str, field: &str) -> ApiResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(code, format!("{} is required", field)))
}

pub async fn create_checkout_session(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(req), _): WithRejection<Json<CheckoutSessionRequest>, ApiError>,
) -> ApiResult<Json<CheckoutSessionResponse>> {
    let price_id = required(req.price_id, "missing_price_id", "price_id")?;
    let success_url = required(req.success_url, "missing_success_url", "success_url")?;
    let cancel_url = required(req.cancel_url, "missing_cancel_url", "cancel_url")?;

    let checkout_url = state
        .subscriptions
        .create_checkout_session(
            user.user_id,
            user.email.as_deref(),
            &price_id,
            &success_url,
            &cancel_url,
        )
        .await?;

    Ok(Json(CheckoutSessionResponse { checkout_url }))
}

pub async fn create_customer_portal_session(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(req), _): WithRejection<Json<CustomerPortalRequest>, ApiError>,
) -> ApiResult<Json<CustomerPortalResponse>> {
    let return_url = required(req.return_url, "missing_return_url", "return_url")?;

    let portal_url = state
        .subscriptions
        .create_portal_session(user.user_id, &return_url)
        .await?;

    Ok(Json(CustomerPortalResponse { portal_url }))
}
