//! Management command framework.
//!
//! [`ManagementCommand`] defines one CLI subcommand; [`CommandRegistry`]
//! collects them, builds the clap `Command`, and dispatches parsed matches.
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use xprofile_cli::command::{CommandRegistry, ManagementCommand};
//! use xprofile_core::{Settings, XProfileError};
//!
//! struct ShowPrefix;
//!
//! #[async_trait]
//! impl ManagementCommand for ShowPrefix {
//!     fn name(&self) -> &'static str { "showprefix" }
//!     fn help(&self) -> &'static str { "Print the configured table prefix" }
//!
//!     async fn handle(
//!         &self,
//!         _: &clap::ArgMatches,
//!         settings: &Settings,
//!     ) -> Result<(), XProfileError> {
//!         println!("{}", settings.database.table_prefix);
//!         Ok(())
//!     }
//! }
//!
//! let mut registry = CommandRegistry::new();
//! registry.register(Box::new(ShowPrefix));
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use xprofile_core::{Settings, XProfileError};

/// Name of the program in help output.
pub const PROGRAM_NAME: &str = "xprofile-options";

/// One `xprofile-options` subcommand.
#[async_trait]
pub trait ManagementCommand: Send + Sync {
    /// Subcommand name on the command line.
    fn name(&self) -> &'static str;

    /// One-line description shown in `--help`.
    fn help(&self) -> &'static str;

    /// Declares the subcommand's own flags and positionals. None by default.
    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// Runs the subcommand.
    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), XProfileError>;
}

/// Registered subcommands by name.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, Box<dyn ManagementCommand>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `command`. A later registration under the same name wins.
    pub fn register(&mut self, command: Box<dyn ManagementCommand>) {
        self.commands.insert(command.name(), command);
    }

    pub fn get(&self, name: &str) -> Option<&dyn ManagementCommand> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Command names in alphabetical order.
    pub fn list_commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Builds the top-level clap `Command` with every registered subcommand
    /// and the global `--settings` option.
    pub fn build_cli(&self) -> clap::Command {
        let root = clap::Command::new(PROGRAM_NAME)
            .about("Bulk-append choice options to profile fields")
            .subcommand_required(true)
            .arg(
                clap::Arg::new("settings")
                    .long("settings")
                    .global(true)
                    .value_name("FILE")
                    .help("Settings file (TOML, or JSON with a .json extension)"),
            );

        self.list_commands()
            .into_iter()
            .filter_map(|name| self.commands.get_key_value(name))
            .fold(root, |root, (name, command)| {
                let sub = clap::Command::new(*name).about(command.help());
                root.subcommand(command.add_arguments(sub))
            })
    }

    /// Dispatches the subcommand found in `matches`.
    pub async fn execute(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), XProfileError> {
        let Some((name, sub_matches)) = matches.subcommand() else {
            return Err(XProfileError::ConfigurationError(
                "No subcommand specified".to_string(),
            ));
        };
        let Some(command) = self.get(name) else {
            return Err(XProfileError::ConfigurationError(format!(
                "Unknown command: {name}"
            )));
        };

        tracing::debug!(command = name, "Running management command");
        command.handle(sub_matches, settings).await
    }
}
