//! Settings for xprofile-options.
//!
//! [`Settings`] holds all runtime configuration with sensible defaults. It is
//! passed explicitly to whatever needs it; there is no global instance.

use serde::{Deserialize, Serialize};

use crate::error::XProfileError;

/// How submitted option text is turned into lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineMode {
    /// Split strictly on newlines; blank lines become empty options.
    Verbatim,
    /// Trim every line and drop blank ones.
    #[default]
    Trim,
}

impl std::str::FromStr for LineMode {
    type Err = XProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "verbatim" => Ok(Self::Verbatim),
            "trim" => Ok(Self::Trim),
            other => Err(XProfileError::ConfigurationError(format!(
                "Unknown line mode '{other}' (expected 'verbatim' or 'trim')"
            ))),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Path to the SQLite file, or `:memory:`.
    pub path: String,
    /// Prefix prepended to the `xprofile_groups` and `xprofile_fields` tables.
    pub table_prefix: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "xprofile.sqlite3".to_string(),
            table_prefix: "wp_bp_".to_string(),
        }
    }
}

/// Admin page configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSettings {
    /// URL prefix under which the admin routes are mounted.
    pub url_prefix: String,
    /// The `page` query value identifying the bulk-add tool.
    pub page_slug: String,
    /// Capability a user must hold to use the tool.
    pub required_capability: String,
    /// How long a nonce stays valid, in seconds.
    pub nonce_lifetime_secs: u64,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            url_prefix: "/wp-admin".to_string(),
            page_slug: "bulk-add-xprofile-field-options".to_string(),
            required_capability: "manage_options".to_string(),
            nonce_lifetime_secs: 86_400,
        }
    }
}

/// Option-appending behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionSettings {
    /// How the submitted text is split into option lines.
    pub line_mode: LineMode,
    /// Upper bound on lines accepted in one submission.
    pub max_lines: usize,
}

impl Default for OptionSettings {
    fn default() -> Self {
        Self {
            line_mode: LineMode::Trim,
            max_lines: 1000,
        }
    }
}

/// A user allowed to sign in to the admin surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSettings {
    /// Login name, used in logs and to scope nonces.
    pub username: String,
    /// Bearer/cookie token identifying this user.
    pub token: String,
    /// Capabilities granted to the user (e.g. `manage_options`).
    pub capabilities: Vec<String>,
}

/// The complete set of settings.
///
/// # Examples
///
/// ```
/// use xprofile_core::settings::{LineMode, Settings};
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.options.line_mode, LineMode::Trim);
/// assert_eq!(settings.admin.required_capability, "manage_options");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Whether debug mode is enabled.
    pub debug: bool,
    /// Key for nonce signatures.
    pub secret_key: String,
    /// The log filter (e.g. "info", "xprofile_admin=debug").
    pub log_level: String,
    /// Database connection.
    pub database: DatabaseSettings,
    /// Admin surface.
    pub admin: AdminSettings,
    /// Option appending.
    pub options: OptionSettings,
    /// Users that may authenticate.
    pub users: Vec<UserSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            secret_key: String::new(),
            log_level: "info".to_string(),
            database: DatabaseSettings::default(),
            admin: AdminSettings::default(),
            options: OptionSettings::default(),
            users: Vec::new(),
        }
    }
}

impl Settings {
    /// Checks the settings for values that would make the server unsafe or
    /// unusable.
    ///
    /// An empty `secret_key` is only tolerated in debug mode.
    pub fn validate(&self) -> Result<(), XProfileError> {
        if self.secret_key.is_empty() && !self.debug {
            return Err(XProfileError::ConfigurationError(
                "secret_key must be set when debug is off".to_string(),
            ));
        }
        if self.admin.nonce_lifetime_secs == 0 {
            return Err(XProfileError::ConfigurationError(
                "admin.nonce_lifetime_secs must be positive".to_string(),
            ));
        }
        if self.options.max_lines == 0 {
            return Err(XProfileError::ConfigurationError(
                "options.max_lines must be positive".to_string(),
            ));
        }
        if !self.admin.url_prefix.is_empty() && !self.admin.url_prefix.starts_with('/') {
            return Err(XProfileError::ConfigurationError(format!(
                "admin.url_prefix '{}' must start with '/'",
                self.admin.url_prefix
            )));
        }
        for user in &self.users {
            if user.token.is_empty() {
                return Err(XProfileError::ConfigurationError(format!(
                    "user '{}' has an empty token",
                    user.username
                )));
            }
        }
        Ok(())
    }

    /// Returns the secret key, generating a throwaway one in debug mode when
    /// none is configured.
    ///
    /// A generated key changes on every call, so callers should resolve it
    /// once at startup.
    pub fn effective_secret_key(&self) -> String {
        if !self.secret_key.is_empty() {
            return self.secret_key.clone();
        }
        tracing::warn!("No secret_key configured; generating an ephemeral one");
        crate::signing::random_secret()
    }
}
