//! Request handlers.

pub mod ai_avatar;
pub mod health;
pub mod hooks;
pub mod subscription;
pub mod user;
pub mod user_generated_videos;
pub mod webhooks;

pub use health::*;
