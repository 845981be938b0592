//! The `listfields` management command.
//!
//! Prints every non-empty field group with its fields, their types and
//! option counts. Field ids shown here are what `addoptions --field` takes.

use std::fmt::Write;

use async_trait::async_trait;
use xprofile_core::{Settings, XProfileError, XProfileResult};
use xprofile_db::ProfileFieldStore;

use super::open_store;
use crate::command::ManagementCommand;

/// Renders the field listing for `store`.
pub async fn render_listing<S>(store: &S, choice_only: bool) -> XProfileResult<String>
where
    S: ProfileFieldStore + ?Sized,
{
    let mut out = String::new();
    for group in store.field_groups().await? {
        let fields: Vec<_> = group
            .fields
            .iter()
            .filter(|f| !choice_only || f.field_type.accepts_options())
            .collect();
        if fields.is_empty() {
            continue;
        }

        let _ = writeln!(out, "{} (group {})", group.name, group.id);
        for field in fields {
            if field.field_type.accepts_options() {
                let count = store.options_for(field.id).await?.len();
                let _ = writeln!(
                    out,
                    "  [{}] {} ({}, {count} option(s))",
                    field.id, field.name, field.field_type
                );
            } else {
                let _ = writeln!(out, "  [{}] {} ({})", field.id, field.name, field.field_type);
            }
        }
    }
    if out.is_empty() {
        out.push_str("No profile fields found.\n");
    }
    Ok(out)
}

/// Lists field groups, fields and option counts.
pub struct ListfieldsCommand;

#[async_trait]
impl ManagementCommand for ListfieldsCommand {
    fn name(&self) -> &'static str {
        "listfields"
    }

    fn help(&self) -> &'static str {
        "List profile field groups, fields and option counts"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("choice-only")
                .long("choice-only")
                .action(clap::ArgAction::SetTrue)
                .help("Only list fields that accept options"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), XProfileError> {
        let choice_only = matches.get_flag("choice-only");
        let store = open_store(settings)?;
        print!("{}", render_listing(&store, choice_only).await?);
        Ok(())
    }
}
