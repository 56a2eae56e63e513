mod api;
mod bootstrap;
mod middleware;

use std::sync::Arc;

use anyhow::{Context, Result};
use stories_core::settings::Settings;
use stories_runtime::dashboard::Dashboard;
use stories_ui::themes::Theme;
use stories_ui::Reports;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Stories Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Granularity: {}, Zero reach: {:?}, Missing side: {:?}, Theme: {}",
        settings.granularity,
        settings.zero_reach,
        settings.missing_side,
        settings.theme
    );
    if !settings.brand_rules.is_empty() {
        tracing::info!("{} brand rule(s) configured", settings.brand_rules.len());
    }

    let state = AppState {
        dashboard: Arc::new(Dashboard::new(
            settings.analysis_options(),
            settings.brand_resolver(),
        )),
        reports: Arc::new(Reports::new(Theme::from_name(&settings.theme))),
        max_upload_mb: settings.max_upload_mb,
    };
    let app = build_app(state, settings.max_upload_bytes());

    let listener = tokio::net::TcpListener::bind(settings.bind)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
