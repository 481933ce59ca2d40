//! photoview-bridge binary: loads config, starts the services and waits for
//! a shutdown signal. SIGHUP reloads the Photoview entries.

use std::sync::Arc;

use anyhow::{Context, bail};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use photoview_bridge::api;
use photoview_bridge::cli::CliOptions;
use photoview_bridge::config::Config;
use photoview_bridge::services::photoview::{LegacyApiClient, PhotoviewClient};
use photoview_bridge::services::{HttpServerConfig, ServicesManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photoview_bridge=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let options = CliOptions::from_args();
    let mut config = Config::from_env()?;
    if let Some(entry_id) = options.entry_id {
        config.entry_id = entry_id;
    }
    let config = Arc::new(config);
    info!(entry_id = %config.entry_id, photoview_url = %config.photoview_url, "Configuration loaded");

    let http = reqwest::Client::builder()
        .user_agent(concat!("photoview-bridge/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    if options.check {
        let client = PhotoviewClient::new(http, config.photoview_entry().credentials);
        if !LegacyApiClient::new(Arc::new(client)).get_data().await {
            bail!("Photoview at {} rejected the configured credentials", config.photoview_url);
        }
        info!("Photoview credentials accepted");
        return Ok(());
    }

    let services = ServicesManager::builder(http)
        .add_api_routes("photoview", |_| api::photoview_router())
        .add_service(config.photoview_entry())
        .add_service(HttpServerConfig {
            config: config.clone(),
        })
        .start()
        .await?;

    wait_for_shutdown(&services).await?;
    info!("Shutting down");
    services.stop_all().await?;

    Ok(())
}

/// Block until ctrl-c. On unix, SIGHUP reloads every Photoview entry meanwhile.
async fn wait_for_shutdown(services: &ServicesManager) -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut hangup = signal(SignalKind::hangup()).context("Failed to listen for SIGHUP")?;
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        loop {
            tokio::select! {
                result = &mut ctrl_c => {
                    return result.context("Failed to listen for shutdown signal");
                }
                _ = hangup.recv() => {
                    info!("SIGHUP received, reloading Photoview entries");
                    if let Err(e) = services.reload_entries().await {
                        tracing::error!(error = %e, "Reloading Photoview entries failed");
                    }
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for shutdown signal")
    }
}
