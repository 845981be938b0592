//! # xprofile-cli
//!
//! Management commands for xprofile-options.
//!
//! - [`command`] - The [`ManagementCommand`](command::ManagementCommand) trait and
//!   [`CommandRegistry`](command::CommandRegistry)
//! - [`commands`] - Built-in commands: `migrate`, `loaddata`, `listfields`,
//!   `addoptions`, `runserver`
//!
//! ```rust
//! use xprofile_cli::command::CommandRegistry;
//! use xprofile_cli::commands::register_builtin_commands;
//!
//! let mut registry = CommandRegistry::new();
//! register_builtin_commands(&mut registry);
//!
//! let names = registry.list_commands();
//! assert!(names.contains(&"addoptions"));
//! assert!(names.contains(&"runserver"));
//! ```

// unused_async: command handlers keep a uniform async signature
#![allow(clippy::unused_async)]

pub mod command;
pub mod commands;
