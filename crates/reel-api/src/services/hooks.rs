//! Hook generation.
//!
//! A generation spends credits up front, asks the LLM for a JSON array of
//! hook lines and stores them under one generation id. If anything fails
//! after the spend, the credits are refunded before the error is returned.

use reel_db::models::Hook;
use reel_db::repositories::{HookRepo, UserRepo};
use reel_models::HOOK_GENERATION_CREDIT_COST;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::services::llm::LlmClient;

/// A stored hook as returned by the generate endpoint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GeneratedHook {
    pub id: Uuid,
    pub text: String,
}

/// Prompt sent to the LLM for one generation.
pub fn build_hook_prompt(prompt: &str, num_hooks: u32) -> String {
    format!(
        r#"You are a helpful assistant that generates short hooks for a tiktok slideshow.
You will be given a prompt and you will need to generate a list of hooks for the prompt.

For example:
Prompt: "Plants dying in my house"
Hooks:
- "5 things I wish I knew before killing my plants"
- "um so why did it take a plant expert explaining to me that traditional planters are so expensive just to constantly water plants..."
- "fun fact you're probably spending way too much time and money on watering your plants when you don't need to"

The hooks should be returned in a json array of strings.
For example:
[
  "hook1",
  "hook2",
  "hook3"
]

The prompt is: {prompt}
The number of hooks to generate is: {num_hooks}"#
    )
}

/// Parse the LLM reply into hook lines, tolerating a ```json fence.
pub fn parse_hooks(content: &str) -> Result<Vec<String>, serde_json::Error> {
    let text = content.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);

    let hooks: Vec<String> = serde_json::from_str(text.trim())?;
    Ok(hooks
        .into_iter()
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .collect())
}

#[derive(Clone)]
pub struct HookService {
    pool: PgPool,
    llm: LlmClient,
}

impl HookService {
    pub fn new(pool: PgPool, llm: LlmClient) -> Self {
        Self { pool, llm }
    }

    /// Generate and store `num_hooks` hooks for `prompt`.
    pub async fn generate(
        &self,
        user_id: Uuid,
        prompt: &str,
        num_hooks: u32,
    ) -> ApiResult<Vec<GeneratedHook>> {
        let remaining = UserRepo::spend_credits(&self.pool, user_id, HOOK_GENERATION_CREDIT_COST)
            .await?
            .ok_or(ApiError::InsufficientCredits {
                required: HOOK_GENERATION_CREDIT_COST,
            })?;

        match self.generate_paid(user_id, prompt, num_hooks).await {
            Ok(hooks) => {
                info!(
                    user_id = %user_id,
                    count = hooks.len(),
                    credits_remaining = remaining,
                    "Generated hooks"
                );
                metrics::record_hooks_generated(hooks.len());
                Ok(hooks)
            }
            Err(e) => {
                warn!(user_id = %user_id, "Hook generation failed, refunding credits: {}", e);
                if let Err(refund) =
                    UserRepo::add_credits(&self.pool, user_id, HOOK_GENERATION_CREDIT_COST).await
                {
                    error!(user_id = %user_id, "Failed to refund hook credits: {}", refund);
                }
                Err(e)
            }
        }
    }

    async fn generate_paid(
        &self,
        user_id: Uuid,
        prompt: &str,
        num_hooks: u32,
    ) -> ApiResult<Vec<GeneratedHook>> {
        let content = self
            .llm
            .complete(&build_hook_prompt(prompt, num_hooks))
            .await
            .map_err(|e| ApiError::internal(format!("failed to generate hooks: {}", e)))?;

        let texts = parse_hooks(&content)
            .map_err(|e| ApiError::internal(format!("failed to parse hooks: {}", e)))?;
        if texts.is_empty() {
            return Err(ApiError::internal("LLM returned no hooks"));
        }

        let generation_id = Uuid::new_v4();
        let stored = HookRepo::create_batch(
            &self.pool,
            user_id,
            generation_id,
            prompt,
            &texts,
            HOOK_GENERATION_CREDIT_COST,
        )
        .await?;

        Ok(stored
            .into_iter()
            .map(|hook| GeneratedHook {
                id: hook.id,
                text: hook.hook_text,
            })
            .collect())
    }

    /// One page of the user's hooks plus their total count.
    pub async fn list(&self, user_id: Uuid, limit: i64, offset: i64) -> ApiResult<(Vec<Hook>, i64)> {
        let hooks = HookRepo::list_by_user(&self.pool, user_id, limit, offset).await?;
        let total = HookRepo::count_by_user(&self.pool, user_id).await?;
        Ok((hooks, total))
    }

    /// Delete one hook. Returns `false` when it does not exist or is not the user's.
    pub async fn delete(&self, user_id: Uuid, hook_id: Uuid) -> ApiResult<bool> {
        Ok(HookRepo::delete(&self.pool, hook_id, user_id).await?)
    }

    /// Delete the user's hooks among `ids`, returning the ones removed.
    pub async fn delete_many(&self, user_id: Uuid, ids: &[Uuid]) -> ApiResult<Vec<Hook>> {
        Ok(HookRepo::delete_many(&self.pool, ids, user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_request_and_count() {
        let prompt = build_hook_prompt("Plants dying in my house", 3);
        assert!(prompt.contains("The prompt is: Plants dying in my house"));
        assert!(prompt.ends_with("The number of hooks to generate is: 3"));
        assert!(prompt.contains("json array of strings"));
    }

    #[test]
    fn test_parse_plain_array() {
        let hooks = parse_hooks(r#"["one", "two"]"#).unwrap();
        assert_eq!(hooks, vec!["one", "two"]);
    }

    #[test]
    fn test_parse_fenced_array() {
        let reply = "```json\n[\n  \"5 things I wish I knew\",\n  \"fun fact\"\n]\n```";
        assert_eq!(parse_hooks(reply).unwrap(), vec!["5 things I wish I knew", "fun fact"]);

        let bare_fence = "```\n[\"x\"]\n```";
        assert_eq!(parse_hooks(bare_fence).unwrap(), vec!["x"]);
    }

    #[test]
    fn test_parse_drops_blank_entries() {
        assert_eq!(parse_hooks(r#"[" a ", "", "   "]"#).unwrap(), vec!["a"]);
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(parse_hooks("Sure! Here are your hooks:").is_err());
        assert!(parse_hooks(r#"{"hooks": ["a"]}"#).is_err());
    }
}
