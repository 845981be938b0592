//! The `addoptions` management command.
//!
//! Appends options to a field from the command line, one per line, reading
//! a file or standard input. The same appender backs the admin page, so
//! ordering and validation are identical.

use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use xprofile_admin::{AppendOutcome, OptionAppender};
use xprofile_core::{Settings, XProfileError, XProfileResult};

use super::open_store;
use crate::command::ManagementCommand;

/// Renders a human-readable summary of an append batch.
pub fn render_outcome(outcome: &AppendOutcome) -> String {
    let mut out = format!(
        "Added {} of {} option(s) to field {}\n",
        outcome.added, outcome.requested, outcome.field_id
    );
    for option in &outcome.created {
        let _ = writeln!(out, "  {:>4}  {}", option.option_order, option.name);
    }
    for failure in &outcome.failures {
        let _ = writeln!(out, "  error: {failure}");
    }
    out
}

async fn read_options(file: Option<&String>) -> XProfileResult<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(Path::new(path)).await.map_err(Into::into),
        None => {
            let mut text = String::new();
            tokio::io::stdin().read_to_string(&mut text).await?;
            Ok(text)
        }
    }
}

/// Appends options to a field.
pub struct AddoptionsCommand;

#[async_trait]
impl ManagementCommand for AddoptionsCommand {
    fn name(&self) -> &'static str {
        "addoptions"
    }

    fn help(&self) -> &'static str {
        "Append options to a profile field, one per line"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("field")
                .long("field")
                .required(true)
                .value_parser(clap::value_parser!(i64))
                .help("Id of the field to append to (see listfields)"),
        )
        .arg(
            clap::Arg::new("file")
                .long("file")
                .value_name("PATH")
                .help("Read options from this file instead of standard input"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), XProfileError> {
        let field_id = matches
            .get_one::<i64>("field")
            .copied()
            .ok_or_else(|| XProfileError::BadRequest("--field is required".to_string()))?;
        let text = read_options(matches.get_one::<String>("file")).await?;

        let store = open_store(settings)?;
        let appender = OptionAppender::new(Arc::new(store), &settings.options);
        let mut outcome = appender.append_options(field_id, &text).await?;

        print!("{}", render_outcome(&outcome));
        if outcome.failures.is_empty() {
            Ok(())
        } else {
            Err(outcome.failures.remove(0))
        }
    }
}
