//! Subscription lifecycle: checkout, portal, and webhook-driven plan changes.

use anyhow::{anyhow, Context};
use chrono::{DateTime, TimeZone, Utc};
use reel_db::repositories::UserRepo;
use reel_models::{PlanTier, MONTHLY_PRO_CREDITS};
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::services::billing::{BillingError, StripeClient, Subscription, WebhookEvent};

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        ApiError::internal(err.to_string())
    }
}

#[derive(Clone)]
pub struct SubscriptionService {
    pool: PgPool,
    stripe: StripeClient,
}

impl SubscriptionService {
    pub fn new(pool: PgPool, stripe: StripeClient) -> Self {
        Self { pool, stripe }
    }

    /// Start a subscription checkout, creating and remembering the billing
    /// customer on first use. Returns the hosted checkout URL.
    pub async fn create_checkout_session(
        &self,
        user_id: Uuid,
        email: Option<&str>,
        price_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> ApiResult<String> {
        let account = UserRepo::ensure_exists(&self.pool, user_id).await?;

        let customer_id = match account.billing_customer_id.filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => {
                let customer = self.stripe.create_customer(email, user_id).await?;
                UserRepo::set_billing_customer_id(&self.pool, user_id, &customer.id).await?;
                info!(user_id = %user_id, customer_id = %customer.id, "Created billing customer");
                customer.id
            }
        };

        let session = self
            .stripe
            .create_checkout_session(&customer_id, price_id, user_id, success_url, cancel_url)
            .await?;

        session
            .url
            .ok_or_else(|| ApiError::internal(format!("checkout session {} has no URL", session.id)))
    }

    /// Open the billing portal for an existing customer.
    pub async fn create_portal_session(&self, user_id: Uuid, return_url: &str) -> ApiResult<String> {
        let account = UserRepo::ensure_exists(&self.pool, user_id).await?;

        let customer_id = account
            .billing_customer_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ApiError::bad_request("no_billing_customer", "User does not have a billing customer")
            })?;

        let session = self.stripe.create_portal_session(&customer_id, return_url).await?;
        Ok(session.url)
    }

    /// Apply a verified webhook event.
    pub async fn handle_event(&self, event: WebhookEvent) -> anyhow::Result<()> {
        match event {
            WebhookEvent::SubscriptionCreated(sub) => {
                let user_id = subscription_user(&sub)?;
                self.set_plan(user_id, PlanTier::Pro, unix(sub.created)?, Some(unix(sub.current_period_end)?))
                    .await?;
                info!(user_id = %user_id, subscription = %sub.id, "Upgraded to pro");
            }
            WebhookEvent::SubscriptionUpdated(sub) => {
                let user_id = subscription_user(&sub)?;
                match sub.status.as_str() {
                    "active" => {
                        self.set_plan(
                            user_id,
                            PlanTier::Pro,
                            unix(sub.created)?,
                            Some(unix(sub.current_period_end)?),
                        )
                        .await?;
                        info!(user_id = %user_id, subscription = %sub.id, "Subscription active");
                    }
                    "canceled" | "unpaid" | "past_due" => {
                        self.set_plan(user_id, PlanTier::Free, Utc::now(), None).await?;
                        warn!(
                            user_id = %user_id,
                            status = %sub.status,
                            "Subscription lapsed, downgraded to free"
                        );
                    }
                    other => {
                        debug!(subscription = %sub.id, status = other, "Ignoring subscription status")
                    }
                }
            }
            WebhookEvent::SubscriptionDeleted(sub) => {
                let user_id = subscription_user(&sub)?;
                self.set_plan(user_id, PlanTier::Free, Utc::now(), None).await?;
                info!(user_id = %user_id, subscription = %sub.id, "Subscription ended, credits kept");
            }
            WebhookEvent::PaymentSucceeded(invoice) => {
                let subscription_id = invoice
                    .subscription
                    .as_deref()
                    .ok_or_else(|| anyhow!("invoice {} has no subscription", invoice.id))?;
                let sub = self
                    .stripe
                    .get_subscription(subscription_id)
                    .await
                    .with_context(|| format!("failed to fetch subscription {}", subscription_id))?;
                let user_id = subscription_user(&sub)?;

                let account = UserRepo::grant_subscription_period(
                    &self.pool,
                    user_id,
                    MONTHLY_PRO_CREDITS,
                    unix(sub.current_period_end)?,
                )
                .await?
                .ok_or_else(|| anyhow!("user account {} not found", user_id))?;

                info!(
                    user_id = %user_id,
                    credits = account.credits,
                    "Granted {} monthly credits",
                    MONTHLY_PRO_CREDITS
                );
            }
            WebhookEvent::PaymentFailed(invoice) => {
                let customer = invoice.customer.as_deref().unwrap_or("unknown");
                let user_id = match invoice.customer.as_deref() {
                    Some(customer_id) => {
                        match UserRepo::find_by_billing_customer_id(&self.pool, customer_id).await {
                            Ok(account) => account.map(|a| a.id.to_string()),
                            Err(e) => {
                                warn!(customer = customer_id, "Account lookup failed: {}", e);
                                None
                            }
                        }
                    }
                    None => None,
                };
                warn!(
                    invoice = %invoice.id,
                    customer,
                    user_id = user_id.as_deref().unwrap_or("unknown"),
                    "Invoice payment failed"
                );
            }
            WebhookEvent::Other(kind) => {
                debug!(event_type = %kind, "Unhandled webhook event");
            }
        }

        Ok(())
    }

    async fn set_plan(
        &self,
        user_id: Uuid,
        plan: PlanTier,
        started_at: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
    ) -> anyhow::Result<()> {
        let updated = UserRepo::update_plan(&self.pool, user_id, plan, started_at, ends_at).await?;
        if !updated {
            return Err(anyhow!("user account {} not found", user_id));
        }
        Ok(())
    }
}

fn subscription_user(sub: &Subscription) -> anyhow::Result<Uuid> {
    sub.user_id()
        .ok_or_else(|| anyhow!("no valid user_id in metadata of subscription {}", sub.id))
}

fn unix(seconds: i64) -> anyhow::Result<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| anyhow!("invalid timestamp {}", seconds))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_unix_conversion() {
        assert_eq!(unix(1_700_000_000).unwrap().timestamp(), 1_700_000_000);
        assert!(unix(i64::MAX).is_err());
    }

    #[test]
    fn test_subscription_user_requires_metadata() {
        let user = Uuid::new_v4();
        let mut sub = Subscription {
            id: "sub_1".to_string(),
            status: "active".to_string(),
            created: 0,
            current_period_end: 0,
            metadata: HashMap::new(),
        };
        assert!(subscription_user(&sub).is_err());

        sub.metadata.insert("user_id".to_string(), user.to_string());
        assert_eq!(subscription_user(&sub).unwrap(), user);
    }
}
