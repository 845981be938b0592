//! HMAC-SHA256 signing.
//!
//! [`Signer`] appends a keyed signature to a string; [`TimestampSigner`]
//! additionally stamps the issue time so signatures can expire. Signatures
//! are URL-safe base64 without padding and the separator is `:`, so signed
//! values survive query strings and form fields unchanged.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use crate::error::XProfileError;

type HmacSha256 = Hmac<Sha256>;

const SEP: char = ':';

fn bad_signature(message: &str) -> XProfileError {
    XProfileError::BadRequest(message.to_string())
}

/// Keyed signer for strings.
///
/// ```
/// use xprofile_core::signing::Signer;
///
/// let signer = Signer::new("site-key").with_salt("xprofile.example");
/// let signed = signer.sign("field:7");
/// assert_eq!(signer.unsign(&signed).unwrap(), "field:7");
/// assert!(Signer::new("other-key").unsign(&signed).is_err());
/// ```
#[derive(Clone)]
pub struct Signer {
    key: String,
    salt: String,
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("salt", &self.salt)
            .finish_non_exhaustive()
    }
}

impl Signer {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            salt: "xprofile.signing".to_string(),
        }
    }

    /// Replaces the salt. Signers with different salts reject each other's
    /// output even under the same key.
    #[must_use]
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = salt.into();
        self
    }

    fn mac(&self, value: &str) -> HmacSha256 {
        let key = format!("{}{SEP}{}", self.salt, self.key);
        let mut mac = HmacSha256::new_from_slice(key.as_bytes())
            .expect("HMAC-SHA256 takes keys of any length");
        mac.update(value.as_bytes());
        mac
    }

    /// The encoded signature of `value`.
    pub fn signature(&self, value: &str) -> String {
        URL_SAFE_NO_PAD.encode(self.mac(value).finalize().into_bytes())
    }

    /// Returns `"{value}:{signature}"`.
    pub fn sign(&self, value: &str) -> String {
        format!("{value}{SEP}{}", self.signature(value))
    }

    /// Checks the trailing signature and returns the value before it.
    pub fn unsign(&self, signed: &str) -> Result<String, XProfileError> {
        let (value, encoded) = signed
            .rsplit_once(SEP)
            .ok_or_else(|| bad_signature("Signed value has no signature"))?;
        let raw = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| bad_signature("Signature is not valid base64"))?;
        self.mac(value)
            .verify_slice(&raw)
            .map_err(|_| bad_signature("Signature verification failed"))?;
        Ok(value.to_string())
    }
}

/// Signer that embeds the signing time as decimal UNIX seconds:
/// `"{value}:{timestamp}:{signature}"`.
///
/// ```
/// use xprofile_core::signing::TimestampSigner;
///
/// let signer = TimestampSigner::new("site-key");
/// let signed = signer.sign_at("admin", 1_700_000_000);
/// assert_eq!(signed.split(':').nth(1), Some("1700000000"));
/// assert!(signer.unsign_at(&signed, Some(60), 1_700_000_060).is_ok());
/// assert!(signer.unsign_at(&signed, Some(60), 1_700_000_061).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct TimestampSigner {
    inner: Signer,
}

impl TimestampSigner {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            inner: Signer::new(key).with_salt("xprofile.signing.timestamp"),
        }
    }

    #[must_use]
    pub fn with_salt(self, salt: impl Into<String>) -> Self {
        Self {
            inner: self.inner.with_salt(salt),
        }
    }

    pub fn sign(&self, value: &str) -> String {
        self.sign_at(value, now_secs())
    }

    pub fn sign_at(&self, value: &str, timestamp: u64) -> String {
        self.inner.sign(&format!("{value}{SEP}{timestamp}"))
    }

    /// Verifies against the current clock. See [`unsign_at`](Self::unsign_at).
    pub fn unsign(&self, signed: &str, max_age: Option<u64>) -> Result<String, XProfileError> {
        self.unsign_at(signed, max_age, now_secs())
    }

    /// Verifies `signed` as of `now`. With `max_age`, a signature stamped
    /// more than `max_age` seconds before `now` is rejected; one stamped in
    /// the future is accepted.
    pub fn unsign_at(
        &self,
        signed: &str,
        max_age: Option<u64>,
        now: u64,
    ) -> Result<String, XProfileError> {
        let stamped = self.inner.unsign(signed)?;
        let (value, timestamp) = stamped
            .rsplit_once(SEP)
            .ok_or_else(|| bad_signature("Signed value has no timestamp"))?;
        let issued: u64 = timestamp
            .parse()
            .map_err(|_| bad_signature("Malformed signature timestamp"))?;

        match max_age {
            Some(max_age) if now.saturating_sub(issued) > max_age => {
                Err(bad_signature("Signature has expired"))
            }
            _ => Ok(value.to_string()),
        }
    }
}

/// Seconds since the UNIX epoch.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// 32 random bytes, hex encoded. Used as a throwaway secret key.
pub fn random_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Compares two byte strings in time independent of where they differ.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}
