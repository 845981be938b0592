//! Result notices and the redirect that carries them.
//!
//! After a submission the handler redirects back to the tools page with
//! `status`, `message` and a fresh results nonce in the query string. The
//! page shows the notice only when the status is known and the nonce
//! verifies for the current user.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use xprofile_core::XProfileError;

use crate::appender::AppendOutcome;
use crate::nonce::{NonceIssuer, RESULTS_ACTION};

/// Message shown when every option was written.
pub const SUCCESS_MESSAGE: &str = "Options added successfully.";

/// Message shown for any failure that aborted the batch.
pub const GENERIC_ERROR_MESSAGE: &str = "There was an error adding the options.";

/// Outcome flag carried in the redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeStatus {
    /// The batch was fully written.
    Success,
    /// The batch was aborted or only partly written.
    Error,
}

impl NoticeStatus {
    /// Returns the query-string value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Parses a query-string value; unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(Self::Success),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Returns the CSS classes of the notice box.
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "notice is-dismissible updated",
            Self::Error => "notice is-dismissible error",
        }
    }
}

/// A status flag and the message shown with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticePayload {
    /// Success or error.
    pub status: NoticeStatus,
    /// Human-readable message, unescaped.
    pub message: String,
}

impl NoticePayload {
    /// The full-success notice.
    pub fn success() -> Self {
        Self {
            status: NoticeStatus::Success,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    /// The generic error notice.
    pub fn generic_error() -> Self {
        Self {
            status: NoticeStatus::Error,
            message: GENERIC_ERROR_MESSAGE.to_string(),
        }
    }

    /// Builds the notice for a finished batch.
    ///
    /// A partial batch is an error that reports written versus requested.
    pub fn from_outcome(outcome: &AppendOutcome) -> Self {
        if outcome.is_complete() {
            return Self::success();
        }
        Self {
            status: NoticeStatus::Error,
            message: format!(
                "Added {} of {} options; {} failed.",
                outcome.added,
                outcome.requested,
                outcome.failures.len()
            ),
        }
    }

    /// Builds the notice for a batch that was rejected outright.
    ///
    /// The reason is not exposed to the page; callers log it.
    pub fn from_error(_error: &XProfileError) -> Self {
        Self::generic_error()
    }
}

/// Builds the redirect target carrying `notice` and a results nonce.
///
/// # Examples
///
/// ```
/// use xprofile_admin::notice::{redirect_location, NoticePayload};
///
/// let url = redirect_location("/wp-admin", "bulk", &NoticePayload::success(), "n0nce");
/// assert_eq!(
///     url,
///     "/wp-admin/tools.php?page=bulk&status=success&message=Options%20added%20successfully%2E&nonce=n0nce"
/// );
/// ```
pub fn redirect_location(
    admin_prefix: &str,
    page_slug: &str,
    notice: &NoticePayload,
    nonce: &str,
) -> String {
    format!(
        "{}?page={}&status={}&message={}&nonce={}",
        page_path(admin_prefix),
        encode(page_slug),
        notice.status.as_str(),
        encode(&notice.message),
        encode(nonce),
    )
}

/// Returns the path of the tools page under `admin_prefix`.
pub fn page_path(admin_prefix: &str) -> String {
    format!("{}/tools.php", admin_prefix.trim_end_matches('/'))
}

/// Returns the path of the form submission endpoint under `admin_prefix`.
pub fn post_path(admin_prefix: &str) -> String {
    format!("{}/admin-post.php", admin_prefix.trim_end_matches('/'))
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

/// Query parameters of the tools page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    /// The page slug.
    pub page: Option<String>,
    /// `success` or `error` after a submission.
    pub status: Option<String>,
    /// The notice message.
    pub message: Option<String>,
    /// Results nonce issued with the redirect.
    pub nonce: Option<String>,
}

impl PageQuery {
    /// Returns the notice to display, if the query carries a known status
    /// and a results nonce valid for `username`.
    pub fn verified_notice(&self, issuer: &NonceIssuer, username: &str) -> Option<NoticePayload> {
        let status = NoticeStatus::parse(self.status.as_deref()?)?;
        let nonce = self.nonce.as_deref()?;
        if !issuer.verify(nonce, RESULTS_ACTION, username) {
            tracing::debug!(username, "Ignoring notice with invalid results nonce");
            return None;
        }
        Some(NoticePayload {
            status,
            message: self.message.clone().unwrap_or_default(),
        })
    }
}
