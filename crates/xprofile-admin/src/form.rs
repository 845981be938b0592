//! The bulk-add form payload.

use serde::Deserialize;

/// Value of the hidden `action` field that routes to the bulk-add handler.
pub const ADD_OPTIONS_ACTION: &str = "add_options_to_xprofile_field";

/// Name of the hidden form field holding the form nonce.
pub const NONCE_FIELD: &str = "add_options_to_xprofile_field_nonce";

/// A `application/x-www-form-urlencoded` submission to `admin-post.php`.
///
/// Every field is optional so that a malformed post still reaches the
/// handler and ends in an error redirect rather than an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddOptionsForm {
    /// The routed action.
    pub action: Option<String>,
    /// The form nonce.
    #[serde(rename = "add_options_to_xprofile_field_nonce")]
    pub nonce: Option<String>,
    /// Selected field id as submitted; `0` means nothing was selected.
    pub xprofile_field: Option<String>,
    /// The option lines.
    pub xprofile_field_options: Option<String>,
}

impl AddOptionsForm {
    /// Returns the selected field id, treating a missing or non-numeric
    /// value as `0`.
    pub fn field_id(&self) -> i64 {
        self.xprofile_field
            .as_deref()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Returns the submitted option text, or an empty string.
    pub fn options_text(&self) -> &str {
        self.xprofile_field_options.as_deref().unwrap_or_default()
    }
}
