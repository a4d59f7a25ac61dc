//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod generated_video_repo;
pub mod hook_repo;
pub mod source_video_repo;
pub mod user_repo;

pub use generated_video_repo::GeneratedVideoRepo;
pub use hook_repo::HookRepo;
pub use source_video_repo::SourceVideoRepo;
pub use user_repo::UserRepo;
