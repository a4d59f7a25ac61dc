//! Row structs and DTOs.
//!
//! Each submodule holds a `FromRow` entity matching its table plus the
//! create DTO used for inserts.

pub mod generated_video;
pub mod hook;
pub mod source_video;
pub mod user_account;

pub use generated_video::{CreateGeneratedVideo, GeneratedVideo};
pub use hook::Hook;
pub use source_video::{CreateSourceVideo, SourceVideo, UpdateSourceVideo};
pub use user_account::UserAccount;
