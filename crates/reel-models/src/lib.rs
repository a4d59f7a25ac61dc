//! Shared data models for the Reel Farm backend.
//!
//! This crate provides Serde-serializable types for:
//! - Subscription plans and credit costs
//! - Generated video status
//! - Encoding and caption constants shared by the pipeline and tools

pub mod encoding;
pub mod plan;
pub mod video;

// Re-export common types
pub use plan::{PlanTier, HOOK_GENERATION_CREDIT_COST, MONTHLY_PRO_CREDITS};
pub use video::VideoStatus;
