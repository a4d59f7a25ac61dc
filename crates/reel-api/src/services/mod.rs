//! Business services behind the HTTP handlers.

pub mod billing;
pub mod hooks;
pub mod llm;
pub mod subscription;

pub use billing::{StripeClient, WebhookEvent};
pub use hooks::{GeneratedHook, HookService};
pub use llm::LlmClient;
pub use subscription::SubscriptionService;
