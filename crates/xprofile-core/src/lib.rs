//! # xprofile-core
//!
//! Foundation types shared by every xprofile-options crate.
//!
//! ## Modules
//!
//! - [`error`] - The [`XProfileError`] enum and result alias
//! - [`settings`] - Runtime configuration with defaults
//! - [`settings_loader`] - Loading settings from TOML/JSON files and the environment
//! - [`logging`] - Tracing subscriber setup and request spans
//! - [`signing`] - HMAC-SHA256 signers used for nonces and tokens

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod signing;

pub use error::{XProfileError, XProfileResult};
pub use settings::{LineMode, Settings};
