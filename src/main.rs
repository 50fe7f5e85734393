//! # Image Pull Secret Patcher
//!
//! Periodically distributes a registry pull secret and an env-derived
//! ConfigMap to every namespace, and references the secret from service
//! accounts so pods can pull private images without per-namespace setup.

use anyhow::{Context, Result};
use clap::Parser;
use imagepullsecret_patcher::cluster::KubeCluster;
use imagepullsecret_patcher::config::ControllerArgs;
use imagepullsecret_patcher::controller::driver;
use imagepullsecret_patcher::observability::metrics;
use imagepullsecret_patcher::server::{start_server, ServerState};
use kube::Client;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // We use ring as the crypto provider
    rustls::crypto::ring::default_provider()
        .install_default()
        .unwrap_or_else(|_| panic!("Failed to install rustls crypto provider"));

    let config = ControllerArgs::parse()
        .into_config()
        .context("Invalid configuration")?;

    let default_filter = if config.debug {
        "imagepullsecret_patcher=debug"
    } else {
        "imagepullsecret_patcher=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    info!("Starting imagepullsecret-patcher");
    info!(
        "Build info: timestamp={}, datetime={}, git_hash={}",
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );
    info!(
        "Config: secret={} configmap={} force={} managedonly={} schedule={:?}",
        config.policy.secret_name,
        config.policy.config_map_name,
        config.policy.force,
        config.policy.managed_only,
        config.schedule
    );

    metrics::register_metrics()?;

    let server_state = Arc::new(ServerState::default());
    let server_state_clone = Arc::clone(&server_state);
    let server_port = config.metrics_port;
    tokio::spawn(async move {
        if let Err(e) = start_server(server_port, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    let cluster = KubeCluster::new(client);
    server_state.set_ready(true);

    let shutdown =
        driver::shutdown_signal().context("Failed to install shutdown signal handlers")?;

    let result = driver::run(
        &cluster,
        &config.policy,
        &config.credentials,
        config.schedule,
        shutdown,
    )
    .await;
    server_state.set_ready(false);
    result.context("Reconciliation cycle failed")?;

    info!("imagepullsecret-patcher stopped");
    Ok(())
}
