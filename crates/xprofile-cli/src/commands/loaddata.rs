//! The `loaddata` management command.
//!
//! Loads field groups and their fields from a JSON fixture:
//!
//! ```json
//! [
//!   {
//!     "name": "Base",
//!     "description": "Primary profile data",
//!     "fields": [
//!       { "name": "Colour", "type": "selectbox" },
//!       { "name": "Bio", "type": "textarea", "description": "About you" }
//!     ]
//!   }
//! ]
//! ```
//!
//! Each group is created after the existing ones, each field after its
//! group's existing fields. Loading the same fixture twice creates
//! duplicates.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use xprofile_core::{Settings, XProfileError, XProfileResult};
use xprofile_db::{FieldSeeder, FieldType, NewField, NewFieldGroup};

use super::open_store;
use crate::command::ManagementCommand;

/// One group in a fixture file.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupFixture {
    /// Group name.
    pub name: String,
    /// Group description.
    #[serde(default)]
    pub description: String,
    /// Fields to create in the group.
    #[serde(default)]
    pub fields: Vec<FieldFixture>,
}

/// One field in a fixture file.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldFixture {
    /// Field name.
    pub name: String,
    /// Field type tag, e.g. `selectbox`.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Field description.
    #[serde(default)]
    pub description: String,
}

/// Counts of what a fixture created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Groups created.
    pub groups: usize,
    /// Fields created.
    pub fields: usize,
}

/// Parses fixture JSON.
pub fn parse_fixture(content: &str) -> XProfileResult<Vec<GroupFixture>> {
    serde_json::from_str(content)
        .map_err(|e| XProfileError::ValidationError(format!("Invalid fixture: {e}")))
}

/// Reads and parses a fixture file.
pub async fn load_fixture_file(path: &Path) -> XProfileResult<Vec<GroupFixture>> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            XProfileError::ConfigurationError(format!(
                "Fixture file not found: {}",
                path.display()
            ))
        } else {
            XProfileError::IoError(e)
        }
    })?;
    parse_fixture(&content)
}

/// Creates every group and field of `fixture` in `store`.
pub async fn load_fixture<S>(store: &S, fixture: &[GroupFixture]) -> XProfileResult<LoadSummary>
where
    S: FieldSeeder + ?Sized,
{
    let mut summary = LoadSummary::default();
    for group in fixture {
        let created = store
            .create_group(&NewFieldGroup {
                name: group.name.clone(),
                description: group.description.clone(),
            })
            .await?;
        summary.groups += 1;

        for field in &group.fields {
            store
                .create_field(&NewField {
                    group_id: created.id,
                    field_type: field.field_type.clone(),
                    name: field.name.clone(),
                    description: field.description.clone(),
                })
                .await?;
            summary.fields += 1;
        }
        tracing::debug!(group = %created.name, fields = group.fields.len(), "Loaded field group");
    }
    Ok(summary)
}

/// Loads field groups and fields from a JSON fixture file.
pub struct LoaddataCommand;

#[async_trait]
impl ManagementCommand for LoaddataCommand {
    fn name(&self) -> &'static str {
        "loaddata"
    }

    fn help(&self) -> &'static str {
        "Load field groups and fields from a JSON fixture"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("fixture")
                .help("Fixture file to load")
                .required(true),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), XProfileError> {
        let path = matches
            .get_one::<String>("fixture")
            .ok_or_else(|| XProfileError::BadRequest("No fixture given".to_string()))?;

        let fixture = load_fixture_file(Path::new(path)).await?;
        let store = open_store(settings)?;
        tracing::info!("Loading fixture: {path}");
        let summary = load_fixture(&store, &fixture).await?;

        println!(
            "Installed {} group(s) and {} field(s) from {path}",
            summary.groups, summary.fields
        );
        Ok(())
    }
}
