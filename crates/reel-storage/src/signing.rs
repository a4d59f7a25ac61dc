//! CDN signed URLs.
//!
//! URLs are signed with a canned policy in the CloudFront format:
//!
//! ```text
//! https://<domain>/<key>?Expires=<epoch>&Signature=<sig>&Key-Pair-Id=<id>
//! ```
//!
//! where `<sig>` is an RSA-SHA1 (PKCS#1 v1.5) signature over
//! `{"Statement":[{"Resource":"<url>","Condition":{"DateLessThan":{"AWS:EpochTime":<epoch>}}}]}`
//! in base64 with `+ = /` replaced by `- _ ~`. The private key is parsed
//! once when the signer is built and shared for the life of the process.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use thiserror::Error;

use crate::error::{StorageError, StorageResult};

/// Validity window for generated-video URLs.
pub const DEFAULT_SIGNED_URL_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Source of "now" for issuing and checking expirations.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    epoch_secs: AtomicI64,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            epoch_secs: AtomicI64::new(start.timestamp()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.epoch_secs
            .fetch_add(by.as_secs() as i64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let secs = self.epoch_secs.load(Ordering::SeqCst);
        Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
    }
}

/// CDN signing configuration.
#[derive(Clone)]
pub struct CdnConfig {
    /// CDN host, e.g. `d111111abcdef8.cloudfront.net`. A bare host is
    /// served over https; an explicit `http://` origin is kept as is.
    pub domain: String,
    /// Identifier of the public key registered with the CDN.
    pub key_pair_id: String,
    /// PEM-encoded RSA private key.
    pub private_key_pem: String,
}

impl fmt::Debug for CdnConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdnConfig")
            .field("domain", &self.domain)
            .field("key_pair_id", &self.key_pair_id)
            .finish_non_exhaustive()
    }
}

impl CdnConfig {
    /// Create config from environment variables.
    ///
    /// `CLOUDFRONT_PRIVATE_KEY` may contain literal `\n` sequences, which is
    /// how multi-line PEMs usually survive `.env` files.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            domain: std::env::var("CLOUDFRONT_DOMAIN")
                .map_err(|_| StorageError::config_error("CLOUDFRONT_DOMAIN not set"))?,
            key_pair_id: std::env::var("CLOUDFRONT_KEY_PAIR_ID")
                .map_err(|_| StorageError::config_error("CLOUDFRONT_KEY_PAIR_ID not set"))?,
            private_key_pem: std::env::var("CLOUDFRONT_PRIVATE_KEY")
                .map_err(|_| StorageError::config_error("CLOUDFRONT_PRIVATE_KEY not set"))?
                .replace("\\n", "\n"),
        })
    }
}

/// A signed, expiring URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues signed CDN URLs.
#[derive(Clone)]
pub struct CdnSigner {
    base_url: String,
    key_pair_id: String,
    key: Arc<SigningKey<Sha1>>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for CdnSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdnSigner")
            .field("base_url", &self.base_url)
            .field("key_pair_id", &self.key_pair_id)
            .finish_non_exhaustive()
    }
}

impl CdnSigner {
    /// Build a signer, parsing the private key.
    pub fn new(config: CdnConfig) -> StorageResult<Self> {
        let pem = config.private_key_pem.trim();
        let key = RsaPrivateKey::from_pkcs1_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
            .map_err(|e| StorageError::config_error(format!("invalid CDN private key: {}", e)))?;

        Ok(Self {
            base_url: base_url(&config.domain),
            key_pair_id: config.key_pair_id,
            key: Arc::new(SigningKey::<Sha1>::new(key)),
            clock: Arc::new(SystemClock),
        })
    }

    /// Build a signer from its parts.
    pub fn from_pem(
        domain: impl Into<String>,
        key_pair_id: impl Into<String>,
        private_key_pem: impl Into<String>,
    ) -> StorageResult<Self> {
        Self::new(CdnConfig {
            domain: domain.into(),
            key_pair_id: key_pair_id.into(),
            private_key_pem: private_key_pem.into(),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Self::new(CdnConfig::from_env()?)
    }

    /// Replace the clock used by [`CdnSigner::sign`].
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn key_pair_id(&self) -> &str {
        &self.key_pair_id
    }

    /// Unsigned URL for a key.
    pub fn public_url(&self, key: &str) -> String {
        let path = key
            .trim_start_matches('/')
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}", self.base_url, path)
    }

    /// Sign `key` for `ttl` starting now.
    pub fn sign(&self, key: &str, ttl: Duration) -> StorageResult<SignedUrl> {
        self.sign_at(key, ttl, self.clock.now())
    }

    /// Sign `key` for `ttl` starting at `now`.
    pub fn sign_at(&self, key: &str, ttl: Duration, now: DateTime<Utc>) -> StorageResult<SignedUrl> {
        let resource = self.public_url(key);
        let expires = now.timestamp() + ttl.as_secs() as i64;
        let policy = canned_policy(&resource, expires);

        let signature = self
            .key
            .try_sign(policy.as_bytes())
            .map_err(|e| StorageError::signing_failed(e.to_string()))?;

        let expires_at = Utc
            .timestamp_opt(expires, 0)
            .single()
            .ok_or_else(|| StorageError::signing_failed("expiry out of range"))?;

        Ok(SignedUrl {
            url: format!(
                "{}?Expires={}&Signature={}&Key-Pair-Id={}",
                resource,
                expires,
                encode_cdn_base64(&signature.to_bytes()),
                self.key_pair_id
            ),
            expires_at,
        })
    }
}

/// Reasons a signed URL is refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignedUrlError {
    #[error("Malformed signed URL: {0}")]
    Malformed(String),

    #[error("Signature does not match")]
    BadSignature,

    #[error("Signed URL expired at {0}")]
    Expired(i64),
}

/// Checks signed URLs the way the CDN edge does.
pub struct CdnUrlVerifier {
    key: VerifyingKey<Sha1>,
    key_pair_id: String,
    clock: Arc<dyn Clock>,
}

impl CdnUrlVerifier {
    /// Build a verifier from the PEM public key registered under `key_pair_id`.
    pub fn from_pem(public_key_pem: &str, key_pair_id: impl Into<String>) -> StorageResult<Self> {
        let pem = public_key_pem.trim();
        let key = RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|e| StorageError::config_error(format!("invalid CDN public key: {}", e)))?;
        Ok(Self {
            key: VerifyingKey::<Sha1>::new(key),
            key_pair_id: key_pair_id.into(),
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Accept or reject a signed URL at the clock's current time.
    pub fn verify(&self, signed_url: &str) -> Result<(), SignedUrlError> {
        let (resource, query) = signed_url
            .split_once('?')
            .ok_or_else(|| SignedUrlError::Malformed("missing query string".to_string()))?;

        let mut expires = None;
        let mut signature = None;
        let mut key_pair_id = None;
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match name.as_ref() {
                "Expires" => expires = Some(value.into_owned()),
                "Signature" => signature = Some(value.into_owned()),
                "Key-Pair-Id" => key_pair_id = Some(value.into_owned()),
                _ => {}
            }
        }

        let expires: i64 = expires
            .ok_or_else(|| SignedUrlError::Malformed("missing Expires".to_string()))?
            .parse()
            .map_err(|_| SignedUrlError::Malformed("Expires is not a number".to_string()))?;
        let signature =
            signature.ok_or_else(|| SignedUrlError::Malformed("missing Signature".to_string()))?;
        let key_pair_id =
            key_pair_id.ok_or_else(|| SignedUrlError::Malformed("missing Key-Pair-Id".to_string()))?;

        if key_pair_id != self.key_pair_id {
            return Err(SignedUrlError::BadSignature);
        }

        let raw = decode_cdn_base64(&signature).ok_or(SignedUrlError::BadSignature)?;
        let signature =
            Signature::try_from(raw.as_slice()).map_err(|_| SignedUrlError::BadSignature)?;
        let policy = canned_policy(resource, expires);
        self.key
            .verify(policy.as_bytes(), &signature)
            .map_err(|_| SignedUrlError::BadSignature)?;

        if self.clock.now().timestamp() >= expires {
            return Err(SignedUrlError::Expired(expires));
        }

        Ok(())
    }
}

fn base_url(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.starts_with("https://") || domain.starts_with("http://") {
        domain.to_string()
    } else {
        format!("https://{}", domain)
    }
}

/// The canned policy text. Byte-exact: the edge rebuilds it to verify.
fn canned_policy(resource: &str, expires: i64) -> String {
    format!(
        r#"{{"Statement":[{{"Resource":"{}","Condition":{{"DateLessThan":{{"AWS:EpochTime":{}}}}}}}]}}"#,
        resource, expires
    )
}

fn encode_cdn_base64(bytes: &[u8]) -> String {
    STANDARD
        .encode(bytes)
        .chars()
        .map(|c| match c {
            '+' => '-',
            '=' => '_',
            '/' => '~',
            other => other,
        })
        .collect()
}

fn decode_cdn_base64(encoded: &str) -> Option<Vec<u8>> {
    let standard: String = encoded
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '=',
            '~' => '/',
            other => other,
        })
        .collect();
    STANDARD.decode(standard).ok()
}
