//! Repository for the `user_accounts` table.
//!
//! Credit balances only move through single conditional statements, so
//! concurrent spenders serialise on the row lock and the balance can never
//! go negative.

use chrono::{DateTime, Utc};
use reel_models::PlanTier;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::UserAccount;

/// Column list for user account queries.
const COLUMNS: &str = "id, plan, plan_started_at, plan_ends_at, credits, billing_customer_id, \
    created_at, updated_at";

/// Account, plan and credit operations.
pub struct UserRepo;

impl UserRepo {
    /// Find an account by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserAccount>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_accounts WHERE id = $1");
        sqlx::query_as::<_, UserAccount>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Return the account, creating a free one with zero credits if absent.
    pub async fn ensure_exists(pool: &PgPool, id: Uuid) -> Result<UserAccount, sqlx::Error> {
        sqlx::query("INSERT INTO user_accounts (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(id)
            .execute(pool)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM user_accounts WHERE id = $1");
        sqlx::query_as::<_, UserAccount>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Find the account linked to a billing-provider customer.
    pub async fn find_by_billing_customer_id(
        pool: &PgPool,
        customer_id: &str,
    ) -> Result<Option<UserAccount>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_accounts WHERE billing_customer_id = $1");
        sqlx::query_as::<_, UserAccount>(&query)
            .bind(customer_id)
            .fetch_optional(pool)
            .await
    }

    /// Set the plan and its period. Returns `false` if the account does not exist.
    pub async fn update_plan(
        pool: &PgPool,
        id: Uuid,
        plan: PlanTier,
        started_at: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_accounts \
             SET plan = $2, plan_started_at = $3, plan_ends_at = $4, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(plan.as_str())
        .bind(started_at)
        .bind(ends_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Link the account to a billing-provider customer.
    pub async fn set_billing_customer_id(
        pool: &PgPool,
        id: Uuid,
        customer_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_accounts SET billing_customer_id = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(customer_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Add credits, returning the new balance (`None` if the account does not exist).
    pub async fn add_credits(pool: &PgPool, id: Uuid, credits: i32) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE user_accounts SET credits = credits + $2, updated_at = now() \
             WHERE id = $1 RETURNING credits",
        )
        .bind(id)
        .bind(credits)
        .fetch_optional(pool)
        .await
    }

    /// Atomically spend credits.
    ///
    /// Returns the remaining balance, or `None` when the account is missing
    /// or holds fewer than `amount` credits. Nothing is deducted in that case.
    pub async fn spend_credits(pool: &PgPool, id: Uuid, amount: i32) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE user_accounts SET credits = credits - $2, updated_at = now() \
             WHERE id = $1 AND credits >= $2 RETURNING credits",
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(pool)
        .await
    }

    /// Credit a paid subscription period: add `credits` and set the plan to
    /// pro until `ends_at`, in one transaction.
    pub async fn grant_subscription_period(
        pool: &PgPool,
        id: Uuid,
        credits: i32,
        ends_at: DateTime<Utc>,
    ) -> Result<Option<UserAccount>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let balance = sqlx::query_scalar::<_, i32>(
            "UPDATE user_accounts SET credits = credits + $2 WHERE id = $1 RETURNING credits",
        )
        .bind(id)
        .bind(credits)
        .fetch_optional(&mut *tx)
        .await?;

        if balance.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let query = format!(
            "UPDATE user_accounts \
             SET plan = $2, plan_started_at = now(), plan_ends_at = $3, updated_at = now() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let account = sqlx::query_as::<_, UserAccount>(&query)
            .bind(id)
            .bind(PlanTier::Pro.as_str())
            .bind(ends_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(account))
    }
}
