//! The `runserver` management command.
//!
//! Serves the bulk option admin page over HTTP until interrupted.

use std::sync::Arc;

use async_trait::async_trait;
use xprofile_admin::AdminSite;
use xprofile_core::{Settings, XProfileError, XProfileResult};

use super::open_store;
use crate::command::ManagementCommand;

/// Builds the admin site over the configured store.
pub fn build_site(settings: &Settings) -> XProfileResult<AdminSite> {
    let store = open_store(settings)?;
    Ok(AdminSite::new(settings, Arc::new(store)))
}

/// Starts the admin server.
///
/// By default, the server binds to `127.0.0.1:8000`. The address and port
/// can be configured via the `--host` and `--port` options.
pub struct RunserverCommand;

#[async_trait]
impl ManagementCommand for RunserverCommand {
    fn name(&self) -> &'static str {
        "runserver"
    }

    fn help(&self) -> &'static str {
        "Serve the bulk option admin page"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("host")
                .long("host")
                .default_value("127.0.0.1")
                .help("Host to bind to"),
        )
        .arg(
            clap::Arg::new("port")
                .long("port")
                .default_value("8000")
                .value_parser(clap::value_parser!(u16))
                .help("Port to bind to"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), XProfileError> {
        let host = matches
            .get_one::<String>("host")
            .map_or("127.0.0.1", String::as_str);
        let port = matches.get_one::<u16>("port").copied().unwrap_or(8000);
        let addr = format!("{host}:{port}");

        let site = build_site(settings)?;
        for route in site.routes() {
            tracing::info!(method = %route.method, path = %route.path, name = route.name, "Route");
        }
        let router = site.into_axum_router();

        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            XProfileError::ConfigurationError(format!("Failed to bind to {addr}: {e}"))
        })?;

        tracing::info!(
            "Starting admin server at http://{addr}{}/tools.php?page={} (debug={})",
            settings.admin.url_prefix.trim_end_matches('/'),
            settings.admin.page_slug,
            settings.debug
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                tokio::signal::ctrl_c().await.ok();
                tracing::info!("Shutting down");
            })
            .await
            .map_err(|e| XProfileError::OperationalError(format!("Server error: {e}")))
    }
}
