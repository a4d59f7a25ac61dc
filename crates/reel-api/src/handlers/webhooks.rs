//! Stripe webhook receiver.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use tracing::{error, info};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::services::billing::{verify_webhook_signature, WebhookError, WEBHOOK_TOLERANCE};
use crate::services::WebhookEvent;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Verify, parse and apply one Stripe event.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookAck>> {
    let secret = state
        .config
        .billing
        .webhook_secret
        .as_deref()
        .ok_or_else(|| ApiError::internal("STRIPE_WEBHOOK_SECRET is not configured"))?;

    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::InvalidSignature(WebhookError::MissingHeader.to_string()))?;

    verify_webhook_signature(
        &body,
        signature,
        secret,
        WEBHOOK_TOLERANCE,
        chrono::Utc::now().timestamp(),
    )
    .map_err(|e| ApiError::InvalidSignature(e.to_string()))?;

    let (event_id, event) = WebhookEvent::parse(&body)
        .map_err(|e| ApiError::bad_request("invalid_payload", format!("Invalid event payload: {}", e)))?;
    let kind = event.kind().to_string();
    info!(event_id = %event_id, event_type = %kind, "Received webhook event");

    if let Err(e) = state.subscriptions.handle_event(event).await {
        error!(event_id = %event_id, event_type = %kind, "Webhook processing failed: {:#}", e);
        metrics::record_webhook_event(&kind, "error");
        return Err(ApiError::WebhookProcessing(format!("{:#}", e)));
    }

    metrics::record_webhook_event(&kind, "ok");
    Ok(Json(WebhookAck { received: true }))
}
