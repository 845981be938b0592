//! Built-in management commands.
//!
//! Each command implements
//! [`ManagementCommand`](crate::command::ManagementCommand). Commands that
//! touch data open the SQLite store named by `settings.database`.

pub mod addoptions;
pub mod listfields;
pub mod loaddata;
pub mod migrate;
pub mod runserver;

pub use addoptions::AddoptionsCommand;
pub use listfields::ListfieldsCommand;
pub use loaddata::LoaddataCommand;
pub use migrate::MigrateCommand;
pub use runserver::RunserverCommand;

use xprofile_core::{Settings, XProfileResult};
use xprofile_db::SqliteFieldStore;

use crate::command::CommandRegistry;

/// Registers all built-in management commands into the given registry.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(MigrateCommand));
    registry.register(Box::new(LoaddataCommand));
    registry.register(Box::new(ListfieldsCommand));
    registry.register(Box::new(AddoptionsCommand));
    registry.register(Box::new(RunserverCommand));
}

/// Opens the configured SQLite store.
pub fn open_store(settings: &Settings) -> XProfileResult<SqliteFieldStore> {
    let store = SqliteFieldStore::from_settings(&settings.database)?;
    tracing::debug!(path = %store.path().display(), "Opened field store");
    Ok(store)
}
