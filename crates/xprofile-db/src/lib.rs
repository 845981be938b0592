//! # xprofile-db
//!
//! The profile-field data model and the stores that persist it.
//!
//! - [`models`] - `FieldGroup`, `Field`, `FieldType`, `FieldOption` and insert payloads
//! - [`store`] - The [`ProfileFieldStore`] and [`FieldSeeder`] traits
//! - [`memory`] - [`InMemoryFieldStore`], for tests and development
//! - [`schema`] - Table naming and DDL for the SQL layout
//! - [`sqlite`] - [`SqliteFieldStore`] (feature `sqlite`)

pub mod memory;
pub mod models;
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod store;

pub use memory::InMemoryFieldStore;
pub use models::{
    Field, FieldGroup, FieldId, FieldOption, FieldType, NewField, NewFieldGroup, NewFieldOption,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteFieldStore;
pub use store::{FieldSeeder, ProfileFieldStore};
