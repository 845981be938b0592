//! Resolving the requesting admin user.
//!
//! Requests carry a token either as `Authorization: Bearer <token>` or in the
//! `xprofile_token` cookie. [`SettingsAuthenticator`] matches it against the
//! users configured in settings.

use std::collections::HashSet;

use async_trait::async_trait;
use http::HeaderMap;
use xprofile_core::settings::UserSettings;
use xprofile_core::signing::constant_time_eq;
use xprofile_core::{XProfileError, XProfileResult};

/// Name of the cookie that may carry the access token.
pub const TOKEN_COOKIE: &str = "xprofile_token";

/// An authenticated admin user and their capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser {
    /// The login name.
    pub username: String,
    /// Granted capabilities, e.g. `manage_options`.
    pub capabilities: HashSet<String>,
}

impl AdminUser {
    /// Creates a user with the given capabilities.
    pub fn new<I, S>(username: impl Into<String>, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            username: username.into(),
            capabilities: capabilities.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if the user holds `capability`.
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}

/// Resolves the user behind a request.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Returns the authenticated user, or `None` for anonymous or unknown
    /// credentials.
    async fn authenticate(&self, headers: &HeaderMap) -> Option<AdminUser>;
}

/// Authenticates against the `[[users]]` table from settings.
#[derive(Debug, Clone, Default)]
pub struct SettingsAuthenticator {
    users: Vec<UserSettings>,
}

impl SettingsAuthenticator {
    /// Creates an authenticator over the configured users.
    pub fn new(users: Vec<UserSettings>) -> Self {
        Self { users }
    }

    /// Looks up the user owning `token`, comparing in constant time.
    pub fn user_for_token(&self, token: &str) -> Option<AdminUser> {
        if token.is_empty() {
            return None;
        }
        self.users
            .iter()
            .find(|u| !u.token.is_empty() && constant_time_eq(u.token.as_bytes(), token.as_bytes()))
            .map(|u| AdminUser::new(u.username.clone(), u.capabilities.iter().cloned()))
    }
}

#[async_trait]
impl Authenticator for SettingsAuthenticator {
    async fn authenticate(&self, headers: &HeaderMap) -> Option<AdminUser> {
        let token = request_token(headers)?;
        let user = self.user_for_token(&token);
        if user.is_none() {
            tracing::debug!("Unknown access token presented");
        }
        user
    }
}

/// Extracts the access token from the bearer header or the token cookie.
pub fn request_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return Some(token.trim().to_string());
    }

    let cookie_header = headers
        .get(http::header::COOKIE)
        .and_then(|v| v.to_str().ok())?;
    for cookie in cookie_header.split(';') {
        let cookie = cookie.trim();
        if let Some(value) = cookie.strip_prefix(&format!("{TOKEN_COOKIE}=")) {
            return Some(value.to_string());
        }
    }
    None
}

/// Checks that a user is present and holds `capability`.
pub fn require_capability<'a>(
    user: Option<&'a AdminUser>,
    capability: &str,
) -> XProfileResult<&'a AdminUser> {
    match user {
        None => Err(XProfileError::Unauthorized(
            "authentication required".to_string(),
        )),
        Some(user) if !user.has_capability(capability) => Err(XProfileError::Unauthorized(
            format!("user '{}' lacks capability '{capability}'", user.username),
        )),
        Some(user) => Ok(user),
    }
}
