//! # xprofile-options
//!
//! Bulk-append choice options to profile fields.
//!
//! This is the meta-crate that re-exports the sub-crates and ships the
//! `xprofile-options` binary.

/// Errors, settings, logging, and signing.
pub use xprofile_core as core;

/// The profile field model and its stores.
pub use xprofile_db as db;

/// The option appender and the admin page.
pub use xprofile_admin as admin;

/// Management commands.
pub use xprofile_cli as cli;

use std::path::Path;

use xprofile_core::settings_loader;
use xprofile_core::{Settings, XProfileResult};

/// Resolves settings for a CLI run.
///
/// With a path, the file (TOML, or JSON when it ends in `.json`) is merged
/// over the defaults; otherwise the defaults are used. Environment overrides
/// apply either way, then the result is validated.
pub fn load_settings(path: Option<&Path>) -> XProfileResult<Settings> {
    let settings = match path {
        Some(path) => settings_loader::from_file_with_env(path)?,
        None => settings_loader::from_env()?,
    };
    settings.validate()?;
    Ok(settings)
}
