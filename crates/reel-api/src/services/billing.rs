//! Stripe REST client and webhook verification.
//!
//! Requests are form-encoded with bearer auth, the way Stripe's API expects.
//! Only the handful of calls the subscription flow needs are modelled.

use std::collections::HashMap;
use std::time::Duration;

use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::config::BillingConfig;

/// Maximum accepted age of a webhook signature timestamp.
pub const WEBHOOK_TOLERANCE: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("STRIPE_SECRET_KEY is not configured")]
    NotConfigured,

    #[error("Stripe request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Stripe returned {status}: {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
pub struct Customer {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PortalSession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub status: String,
    /// Unix seconds.
    pub created: i64,
    /// Unix seconds.
    #[serde(default)]
    pub current_period_end: i64,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Subscription {
    /// Account id stored in the subscription metadata at checkout.
    pub fn user_id(&self) -> Option<Uuid> {
        self.metadata
            .get("user_id")
            .and_then(|id| Uuid::parse_str(id).ok())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Invoice {
    pub id: String,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub subscription: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

/// Minimal Stripe client.
#[derive(Clone)]
pub struct StripeClient {
    http: Client,
    api_base: String,
    secret_key: Option<String>,
}

impl StripeClient {
    pub fn new(http: Client, config: &BillingConfig) -> Self {
        Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        }
    }

    pub async fn create_customer(
        &self,
        email: Option<&str>,
        user_id: Uuid,
    ) -> Result<Customer, BillingError> {
        let user = user_id.to_string();
        let mut form = vec![("metadata[user_id]", user.as_str())];
        if let Some(email) = email {
            form.push(("email", email));
        }
        self.post("/v1/customers", &form).await
    }

    pub async fn create_checkout_session(
        &self,
        customer_id: &str,
        price_id: &str,
        user_id: Uuid,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, BillingError> {
        let user = user_id.to_string();
        let form = [
            ("customer", customer_id),
            ("client_reference_id", user.as_str()),
            ("payment_method_types[]", "card"),
            ("line_items[0][price]", price_id),
            ("line_items[0][quantity]", "1"),
            ("mode", "subscription"),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
            ("subscription_data[metadata][user_id]", user.as_str()),
        ];
        self.post("/v1/checkout/sessions", &form).await
    }

    pub async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, BillingError> {
        let form = [("customer", customer_id), ("return_url", return_url)];
        self.post("/v1/billing_portal/sessions", &form).await
    }

    pub async fn get_subscription(&self, subscription_id: &str) -> Result<Subscription, BillingError> {
        let key = self.secret_key.as_deref().ok_or(BillingError::NotConfigured)?;
        let url = format!("{}/v1/subscriptions/{}", self.api_base, subscription_id);
        debug!("GET {}", url);

        let response = self.http.get(&url).bearer_auth(key).send().await?;
        Self::decode(response).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T, BillingError> {
        let key = self.secret_key.as_deref().ok_or(BillingError::NotConfigured)?;
        let url = format!("{}{}", self.api_base, path);
        debug!("POST {}", url);

        let response = self.http.post(&url).bearer_auth(key).form(form).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BillingError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StripeErrorBody>(&text)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or(text);
            return Err(BillingError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}

/// Webhook signature failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("missing Stripe-Signature header")]
    MissingHeader,
    #[error("malformed Stripe-Signature header")]
    MalformedHeader,
    #[error("no matching v1 signature")]
    SignatureMismatch,
    #[error("timestamp outside the tolerance window")]
    StaleTimestamp,
}

/// Verify a `Stripe-Signature` header (`t=<ts>,v1=<hex>[,v1=<hex>...]`)
/// against the raw payload.
///
/// The expected signature is HMAC-SHA256 over `"<t>.<payload>"`. Any one
/// matching `v1` entry is enough. Timestamps older than `tolerance` relative
/// to `now` (unix seconds) are rejected even when the signature matches.
pub fn verify_webhook_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance: Duration,
    now: i64,
) -> Result<(), WebhookError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let (key, value) = part
            .trim()
            .split_once('=')
            .ok_or(WebhookError::MalformedHeader)?;
        match key {
            "t" => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| WebhookError::MalformedHeader)?,
                )
            }
            "v1" => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(WebhookError::SignatureMismatch);
    }

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| WebhookError::SignatureMismatch)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = signatures.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });
    if !matched {
        return Err(WebhookError::SignatureMismatch);
    }

    if now - timestamp > tolerance.as_secs() as i64 {
        return Err(WebhookError::StaleTimestamp);
    }

    Ok(())
}

/// Produce a `Stripe-Signature` header value for `payload`.
pub fn sign_webhook_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
    // HMAC accepts keys of any length.
    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return format!("t={}", timestamp),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: RawEventData,
}

#[derive(Debug, Deserialize)]
struct RawEventData {
    object: serde_json::Value,
}

/// Webhook events the API reacts to.
#[derive(Debug, Clone)]
pub enum WebhookEvent {
    SubscriptionCreated(Subscription),
    SubscriptionUpdated(Subscription),
    SubscriptionDeleted(Subscription),
    PaymentSucceeded(Invoice),
    PaymentFailed(Invoice),
    Other(String),
}

impl WebhookEvent {
    /// Parse a verified webhook payload.
    pub fn parse(payload: &[u8]) -> Result<(String, Self), serde_json::Error> {
        let raw: RawEvent = serde_json::from_slice(payload)?;
        let object = raw.data.object;

        let event = match raw.event_type.as_str() {
            "customer.subscription.created" => Self::SubscriptionCreated(serde_json::from_value(object)?),
            "customer.subscription.updated" => Self::SubscriptionUpdated(serde_json::from_value(object)?),
            "customer.subscription.deleted" => Self::SubscriptionDeleted(serde_json::from_value(object)?),
            "invoice.payment_succeeded" => Self::PaymentSucceeded(serde_json::from_value(object)?),
            "invoice.payment_failed" => Self::PaymentFailed(serde_json::from_value(object)?),
            _ => Self::Other(raw.event_type),
        };

        Ok((raw.id, event))
    }

    /// Stripe event type name.
    pub fn kind(&self) -> &str {
        match self {
            Self::SubscriptionCreated(_) => "customer.subscription.created",
            Self::SubscriptionUpdated(_) => "customer.subscription.updated",
            Self::SubscriptionDeleted(_) => "customer.subscription.deleted",
            Self::PaymentSucceeded(_) => "invoice.payment_succeeded",
            Self::PaymentFailed(_) => "invoice.payment_failed",
            Self::Other(kind) => kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const PAYLOAD: &[u8] = br#"{"id":"evt_1","type":"invoice.payment_failed","data":{"object":{"id":"in_1"}}}"#;

    #[test]
    fn test_valid_signature_is_accepted() {
        let header = sign_webhook_payload(PAYLOAD, SECRET, 1_700_000_000);
        assert_eq!(
            verify_webhook_signature(PAYLOAD, &header, SECRET, WEBHOOK_TOLERANCE, 1_700_000_100),
            Ok(())
        );
    }

    #[test]
    fn test_any_matching_v1_entry_is_enough() {
        let valid = sign_webhook_payload(PAYLOAD, SECRET, 1_700_000_000);
        let sig = valid.split_once("v1=").unwrap().1;
        let header = format!("t=1700000000,v1={},v0=ignored,v1={}", "ab".repeat(32), sig);
        assert_eq!(
            verify_webhook_signature(PAYLOAD, &header, SECRET, WEBHOOK_TOLERANCE, 1_700_000_000),
            Ok(())
        );
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let header = sign_webhook_payload(PAYLOAD, SECRET, 1_700_000_000);
        let tampered = br#"{"id":"evt_1","type":"invoice.payment_succeeded","data":{"object":{"id":"in_1"}}}"#;
        assert_eq!(
            verify_webhook_signature(tampered, &header, SECRET, WEBHOOK_TOLERANCE, 1_700_000_000),
            Err(WebhookError::SignatureMismatch)
        );
        assert_eq!(
            verify_webhook_signature(PAYLOAD, &header, "whsec_other", WEBHOOK_TOLERANCE, 1_700_000_000),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn test_stale_timestamp_is_rejected() {
        let header = sign_webhook_payload(PAYLOAD, SECRET, 1_700_000_000);
        assert_eq!(
            verify_webhook_signature(PAYLOAD, &header, SECRET, WEBHOOK_TOLERANCE, 1_700_000_301),
            Err(WebhookError::StaleTimestamp)
        );
    }

    #[test]
    fn test_malformed_headers() {
        for header in ["", "garbage", "t=abc,v1=00", "v1=00"] {
            assert_eq!(
                verify_webhook_signature(PAYLOAD, header, SECRET, WEBHOOK_TOLERANCE, 0),
                Err(WebhookError::MalformedHeader),
                "{:?}",
                header
            );
        }
        assert_eq!(
            verify_webhook_signature(PAYLOAD, "t=1", SECRET, WEBHOOK_TOLERANCE, 1),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn test_parse_subscription_event() {
        let user = Uuid::new_v4();
        let payload = serde_json::json!({
            "id": "evt_sub",
            "type": "customer.subscription.updated",
            "data": {"object": {
                "id": "sub_1",
                "status": "past_due",
                "created": 1_700_000_000,
                "current_period_end": 1_702_592_000,
                "customer": "cus_1",
                "metadata": {"user_id": user.to_string()}
            }}
        });

        let (id, event) = WebhookEvent::parse(payload.to_string().as_bytes()).unwrap();
        assert_eq!(id, "evt_sub");
        assert_eq!(event.kind(), "customer.subscription.updated");
        match event {
            WebhookEvent::SubscriptionUpdated(sub) => {
                assert_eq!(sub.status, "past_due");
                assert_eq!(sub.current_period_end, 1_702_592_000);
                assert_eq!(sub.user_id(), Some(user));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_parse_invoice_and_unknown_events() {
        let (_, event) = WebhookEvent::parse(
            br#"{"id":"evt_2","type":"invoice.payment_succeeded","data":{"object":{"id":"in_1","customer":"cus_1","subscription":"sub_9"}}}"#,
        )
        .unwrap();
        match event {
            WebhookEvent::PaymentSucceeded(invoice) => {
                assert_eq!(invoice.subscription.as_deref(), Some("sub_9"))
            }
            other => panic!("unexpected event {:?}", other),
        }

        let (_, event) = WebhookEvent::parse(
            br#"{"id":"evt_3","type":"charge.refunded","data":{"object":{}}}"#,
        )
        .unwrap();
        assert_eq!(event.kind(), "charge.refunded");
        assert!(matches!(event, WebhookEvent::Other(_)));
    }

    #[test]
    fn test_subscription_without_user_metadata() {
        let sub: Subscription = serde_json::from_value(serde_json::json!({
            "id": "sub_1", "status": "active", "created": 1,
            "metadata": {"user_id": "not-a-uuid"}
        }))
        .unwrap();
        assert_eq!(sub.user_id(), None);
        assert_eq!(sub.current_period_end, 0);
    }

    mod client {
        use serde_json::json;
        use wiremock::matchers::{body_string_contains, header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        use super::*;

        fn stripe(server: &MockServer, key: Option<&str>) -> StripeClient {
            StripeClient::new(
                Client::new(),
                &BillingConfig {
                    secret_key: key.map(str::to_string),
                    api_base: format!("{}/", server.uri()),
                    ..Default::default()
                },
            )
        }

        #[tokio::test]
        async fn test_checkout_session_is_form_encoded() {
            let server = MockServer::start().await;
            let user = Uuid::new_v4();
            Mock::given(method("POST"))
                .and(path("/v1/checkout/sessions"))
                .and(header("authorization", "Bearer sk_test"))
                .and(body_string_contains("mode=subscription"))
                .and(body_string_contains("customer=cus_1"))
                .and(body_string_contains(format!("client_reference_id={}", user)))
                .and(body_string_contains("payment_method_types%5B%5D=card"))
                .and(body_string_contains(format!(
                    "subscription_data%5Bmetadata%5D%5Buser_id%5D={}",
                    user
                )))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "id": "cs_1",
                    "url": "https://checkout.stripe.test/cs_1"
                })))
                .expect(1)
                .mount(&server)
                .await;

            let session = stripe(&server, Some("sk_test"))
                .create_checkout_session("cus_1", "price_pro", user, "https://a/ok", "https://a/no")
                .await
                .unwrap();
            assert_eq!(session.url.as_deref(), Some("https://checkout.stripe.test/cs_1"));
        }

        #[tokio::test]
        async fn test_api_error_message_is_surfaced() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/v1/customers"))
                .respond_with(ResponseTemplate::new(402).set_body_json(json!({
                    "error": {"message": "Your card was declined."}
                })))
                .mount(&server)
                .await;

            let err = stripe(&server, Some("sk_test"))
                .create_customer(Some("a@example.com"), Uuid::new_v4())
                .await
                .unwrap_err();
            match err {
                BillingError::Api { status, message } => {
                    assert_eq!(status, 402);
                    assert_eq!(message, "Your card was declined.");
                }
                other => panic!("unexpected error {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_get_subscription() {
            let server = MockServer::start().await;
            let user = Uuid::new_v4();
            Mock::given(method("GET"))
                .and(path("/v1/subscriptions/sub_1"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "id": "sub_1",
                    "status": "active",
                    "created": 1_700_000_000,
                    "current_period_end": 1_702_592_000,
                    "metadata": {"user_id": user.to_string()}
                })))
                .mount(&server)
                .await;

            let sub = stripe(&server, Some("sk_test"))
                .get_subscription("sub_1")
                .await
                .unwrap();
            assert_eq!(sub.user_id(), Some(user));
            assert_eq!(sub.current_period_end, 1_702_592_000);
        }

        #[tokio::test]
        async fn test_missing_secret_key_skips_request() {
            let server = MockServer::start().await;
            let err = stripe(&server, None)
                .create_portal_session("cus_1", "https://a/back")
                .await
                .unwrap_err();
            assert!(matches!(err, BillingError::NotConfigured));
            assert!(server.received_requests().await.unwrap().is_empty());
        }
    }
}
