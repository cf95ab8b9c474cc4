//! Chatlink - settings service for a Minecraft-Discord chat bridge
//!
//! Loads the bridge configuration, logs what it resolved, and reloads it on
//! SIGHUP until asked to stop.

use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tracing::{debug, error, info, warn};

use chatlink::config::{get_config_path, EnvOverlay, YamlFileSource};
use chatlink::settings::{SettingsFacade, SettingsSnapshot};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Chatlink v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let settings = SettingsFacade::builder(EnvOverlay::new(YamlFileSource::new(&config_path)))
        .on_reload(|| info!("Dependents notified of new settings"))
        .build()
        .map_err(|e| {
            error!("Failed to load configuration: {}", e);
            error!("Please ensure {} exists and is properly formatted.", config_path);
            e
        })?;
    let settings = Arc::new(settings);

    log_summary(&settings.snapshot());

    let reload_task = {
        let settings = Arc::clone(&settings);
        tokio::spawn(async move { reload_on_hangup(settings).await })
    };

    tokio::select! {
        _ = shutdown_signal() => info!("Shutdown signal received"),
        result = reload_task => {
            if let Err(e) = result {
                warn!("Reload task ended unexpectedly: {}", e);
            }
        }
    }

    info!("Exiting...");
    Ok(())
}

/// Log what the current settings resolved to. Never logs the token.
fn log_summary(snapshot: &SettingsSnapshot) {
    info!("Configuration generation {}", snapshot.generation());
    info!(
        "  Token: {}",
        if snapshot.bot_token().is_empty() { "missing" } else { "set" }
    );
    info!("  Guild: {}", snapshot.guild_id());
    info!("  Primary channel: {}", snapshot.primary_channel_id());
    info!("  Channel aliases: {}", snapshot.channels().len());

    let presence = snapshot.presence();
    info!(
        "  Presence: {:?} / {:?} \"{}\"",
        presence.status, presence.activity_type, presence.activity_message
    );

    match serde_json::to_string(snapshot.chat()) {
        Ok(chat) => debug!("  Chat: {}", chat),
        Err(e) => debug!("  Chat settings not serializable: {}", e),
    }
}

/// Reload settings every time the process receives SIGHUP.
#[cfg(unix)]
async fn reload_on_hangup(settings: Arc<SettingsFacade>) {
    let mut hangup = match signal::unix::signal(signal::unix::SignalKind::hangup()) {
        Ok(hangup) => hangup,
        Err(e) => {
            warn!("Failed to install SIGHUP handler, reload disabled: {}", e);
            std::future::pending::<()>().await;
            return;
        }
    };

    while hangup.recv().await.is_some() {
        info!("SIGHUP received, reloading configuration...");
        let reload = {
            let settings = Arc::clone(&settings);
            tokio::task::spawn_blocking(move || settings.reload())
        };
        match reload.await {
            Ok(Ok(snapshot)) => log_summary(&snapshot),
            Ok(Err(e)) => error!("{}", e),
            Err(e) => error!("Reload task panicked: {}", e),
        }
    }
}

#[cfg(not(unix))]
async fn reload_on_hangup(_settings: Arc<SettingsFacade>) {
    std::future::pending::<()>().await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
