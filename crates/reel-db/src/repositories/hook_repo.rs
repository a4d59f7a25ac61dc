//! Repository for the `hooks` table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Hook;

/// Column list for hook queries.
const COLUMNS: &str =
    "id, user_id, generation_id, prompt, hook_text, hook_index, credits_used, created_at";

/// Hook storage operations.
pub struct HookRepo;

impl HookRepo {
    /// Store one generation's hooks in a single transaction.
    ///
    /// `hook_index` is the text's position in `hook_texts`.
    pub async fn create_batch(
        pool: &PgPool,
        user_id: Uuid,
        generation_id: Uuid,
        prompt: &str,
        hook_texts: &[String],
        credits_used: i32,
    ) -> Result<Vec<Hook>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO hooks (user_id, generation_id, prompt, hook_text, hook_index, credits_used) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );

        let mut hooks = Vec::with_capacity(hook_texts.len());
        for (index, text) in hook_texts.iter().enumerate() {
            let hook = sqlx::query_as::<_, Hook>(&query)
                .bind(user_id)
                .bind(generation_id)
                .bind(prompt)
                .bind(text)
                .bind(index as i32)
                .bind(credits_used)
                .fetch_one(&mut *tx)
                .await?;
            hooks.push(hook);
        }

        tx.commit().await?;
        Ok(hooks)
    }

    /// List a user's hooks, newest first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Hook>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM hooks \
             WHERE user_id = $1 \
             ORDER BY created_at DESC, hook_index ASC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Hook>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_by_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM hooks WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Hook>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hooks WHERE id = $1");
        sqlx::query_as::<_, Hook>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All hooks from one generation, in generation order.
    pub async fn list_by_generation(
        pool: &PgPool,
        generation_id: Uuid,
    ) -> Result<Vec<Hook>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM hooks WHERE generation_id = $1 ORDER BY hook_index ASC"
        );
        sqlx::query_as::<_, Hook>(&query)
            .bind(generation_id)
            .fetch_all(pool)
            .await
    }

    /// Delete one of the user's hooks. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM hooks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete several of the user's hooks, returning the rows removed.
    /// Ids that are missing or owned by someone else are skipped.
    pub async fn delete_many(
        pool: &PgPool,
        ids: &[Uuid],
        user_id: Uuid,
    ) -> Result<Vec<Hook>, sqlx::Error> {
        let query = format!(
            "DELETE FROM hooks WHERE id = ANY($1) AND user_id = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Hook>(&query)
            .bind(ids)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
