//! Blob storage and CDN delivery.
//!
//! This crate provides:
//! - File upload and deletion against an S3-compatible bucket
//! - The object key layout for catalog and generated media
//! - CDN signed URL issuance and verification (canned policy)

pub mod client;
pub mod error;
pub mod keys;
pub mod signing;

pub use client::{BlobStore, S3Client, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use keys::{thumbnail_filename, thumbnail_key, video_filename, video_key, MediaNamespace};
pub use signing::{
    CdnConfig, CdnSigner, CdnUrlVerifier, Clock, ManualClock, SignedUrl, SignedUrlError,
    SystemClock, DEFAULT_SIGNED_URL_TTL,
};
