//! API routes.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::ai_avatar::list_ai_avatar_videos;
use crate::handlers::hooks::{delete_hook, delete_hooks_bulk, generate_hooks, list_hooks};
use crate::handlers::subscription::{create_checkout_session, create_customer_portal_session};
use crate::handlers::user::get_user_account;
use crate::handlers::user_generated_videos::{
    create_user_generated_video, list_user_generated_videos,
};
use crate::handlers::webhooks::stripe_webhook;
use crate::handlers::{health, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_logging, security_headers, trace_id,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let user_routes = Router::new().route("/user", get(get_user_account));

    let video_routes = Router::new()
        .route("/ai-avatar/videos", get(list_ai_avatar_videos))
        .route(
            "/user-generated-videos",
            get(list_user_generated_videos).post(create_user_generated_video),
        );

    let subscription_routes = Router::new()
        .route("/subscription/create-checkout-session", post(create_checkout_session))
        .route("/subscription/customer-portal", post(create_customer_portal_session));

    let hook_routes = Router::new()
        .route("/hooks", get(list_hooks))
        .route("/hooks/generate", post(generate_hooks))
        // Static segment wins over the id parameter
        .route("/hooks/bulk", delete(delete_hooks_bulk))
        .route("/hooks/:hook_id", delete(delete_hook));

    let rate_limiter = Arc::new(
        RateLimiterCache::new(state.config.rate_limit_rps)
            .with_trusted_proxy_hops(state.config.trusted_proxy_hops),
    );

    let api_routes = Router::new()
        .merge(user_routes)
        .merge(video_routes)
        .merge(subscription_routes)
        .merge(hook_routes)
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    // Signed by the payment provider, not by users
    let webhook_routes = Router::new().route("/webhooks/stripe", post(stripe_webhook));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(api_routes)
        .merge(webhook_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(trace_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
