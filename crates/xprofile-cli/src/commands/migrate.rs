//! The `migrate` management command.
//!
//! Creates the field group and field tables in the configured SQLite
//! database. Running it again is harmless.

use async_trait::async_trait;
use xprofile_core::{Settings, XProfileError};

use super::open_store;
use crate::command::ManagementCommand;

/// Creates the profile field tables if they are missing.
pub struct MigrateCommand;

#[async_trait]
impl ManagementCommand for MigrateCommand {
    fn name(&self) -> &'static str {
        "migrate"
    }

    fn help(&self) -> &'static str {
        "Create the profile field tables"
    }

    async fn handle(
        &self,
        _matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), XProfileError> {
        let store = open_store(settings)?;
        tracing::info!("Running migrations on '{}'", settings.database.path);
        store.migrate().await?;

        let tables = store.tables();
        println!("Tables ready: {}, {}", tables.groups, tables.fields);
        Ok(())
    }
}
