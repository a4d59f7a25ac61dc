//! User account model.

use chrono::{DateTime, Utc};
use reel_models::PlanTier;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `user_accounts` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: Uuid,
    pub plan: String,
    pub plan_started_at: DateTime<Utc>,
    pub plan_ends_at: Option<DateTime<Utc>>,
    pub credits: i32,
    pub billing_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn plan_tier(&self) -> PlanTier {
        PlanTier::from_db(&self.plan)
    }
}
