//! Action- and user-scoped nonces.
//!
//! A nonce is the timestamp and HMAC of `"{action}|{username}"` produced by a
//! [`TimestampSigner`]. The signed value itself is not part of the token; it
//! is rebuilt from the expected action and user on verification, so a token
//! issued for one action or one user never verifies for another.

use xprofile_core::signing::{now_secs, TimestampSigner};

/// Action guarding the bulk-add form submission.
pub const FORM_ACTION: &str = "add_options_to_xprofile_field_action";

/// Action guarding the result notice shown after a redirect.
pub const RESULTS_ACTION: &str = "add_options_to_xprofile_field_results";

const SALT: &str = "xprofile.admin.nonce";

/// Issues and verifies nonces.
///
/// # Examples
///
/// ```
/// use xprofile_admin::nonce::{NonceIssuer, FORM_ACTION, RESULTS_ACTION};
///
/// let issuer = NonceIssuer::new("secret", 86400);
/// let token = issuer.create(FORM_ACTION, "admin");
/// assert!(issuer.verify(&token, FORM_ACTION, "admin"));
/// assert!(!issuer.verify(&token, RESULTS_ACTION, "admin"));
/// assert!(!issuer.verify(&token, FORM_ACTION, "editor"));
/// ```
#[derive(Debug, Clone)]
pub struct NonceIssuer {
    signer: TimestampSigner,
    lifetime_secs: u64,
}

impl NonceIssuer {
    /// Creates an issuer keyed by `secret_key` whose nonces expire after
    /// `lifetime_secs`.
    pub fn new(secret_key: impl Into<String>, lifetime_secs: u64) -> Self {
        Self {
            signer: TimestampSigner::new(secret_key).with_salt(SALT),
            lifetime_secs,
        }
    }

    /// Creates a nonce for `action` and `user`, valid from now.
    pub fn create(&self, action: &str, user: &str) -> String {
        self.create_at(action, user, now_secs())
    }

    /// Creates a nonce stamped with the given UNIX time.
    pub fn create_at(&self, action: &str, user: &str, timestamp: u64) -> String {
        let value = scope(action, user);
        let signed = self.signer.sign_at(&value, timestamp);
        signed
            .strip_prefix(&value)
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or_default()
            .to_string()
    }

    /// Verifies `token` for `action` and `user` against the current time.
    pub fn verify(&self, token: &str, action: &str, user: &str) -> bool {
        self.verify_at(token, action, user, now_secs())
    }

    /// Verifies `token` as of the given UNIX time.
    pub fn verify_at(&self, token: &str, action: &str, user: &str, now: u64) -> bool {
        if token.is_empty() {
            return false;
        }
        let signed = format!("{}:{token}", scope(action, user));
        match self.signer.unsign_at(&signed, Some(self.lifetime_secs), now) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(action, user, error = %e, "Nonce rejected");
                false
            }
        }
    }
}

fn scope(action: &str, user: &str) -> String {
    format!("{action}|{user}")
}
