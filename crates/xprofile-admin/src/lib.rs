//! # xprofile-admin
//!
//! The bulk option admin surface: everything between an HTTP form post and
//! the profile field store.
//!
//! - [`lines`] - Splitting submitted text into option lines
//! - [`appender`] - [`OptionAppender`], which appends options after a field's existing ones
//! - [`nonce`] - Action- and user-scoped timestamped nonces
//! - [`auth`] - Resolving the requesting admin user and checking capabilities
//! - [`notice`] - Result notices and the redirect that carries them
//! - [`form`] - The submitted form payload
//! - [`page`] - HTML rendering of the tools page
//! - [`site`] - [`AdminSite`], the route table and axum router

pub mod appender;
pub mod auth;
pub mod form;
pub mod lines;
pub mod nonce;
pub mod notice;
pub mod page;
pub mod site;

pub use appender::{AppendOutcome, OptionAppender};
pub use auth::{AdminUser, Authenticator, SettingsAuthenticator};
pub use nonce::NonceIssuer;
pub use notice::{NoticePayload, NoticeStatus};
pub use site::AdminSite;
