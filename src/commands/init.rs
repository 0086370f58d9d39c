//! Plugin initialization and configuration commands.

use crate::config::FleetcamConfig;
use crate::signaling::SignalingClient;
use tauri::command;
use tokio::sync::RwLock;

lazy_static::lazy_static! {
    static ref CONFIG: RwLock<FleetcamConfig> = RwLock::new(FleetcamConfig::default());
    static ref GATEWAY: RwLock<Option<SignalingClient>> = RwLock::new(None);
}

/// Current runtime configuration snapshot.
pub(crate) async fn current_config() -> FleetcamConfig {
    CONFIG.read().await.clone()
}

/// The gateway client, once `initialize_streaming` has run.
pub(crate) async fn signaling_client() -> Result<SignalingClient, String> {
    GATEWAY
        .read()
        .await
        .clone()
        .ok_or_else(|| "Streaming not initialized (call initialize_streaming first)".to_string())
}

async fn install(config: FleetcamConfig) -> Result<(), String> {
    config.validate()?;
    let client = SignalingClient::new(&config.gateway).map_err(|e| e.to_string())?;

    *GATEWAY.write().await = Some(client);
    *CONFIG.write().await = config;
    Ok(())
}

/// Initialize the streaming subsystem, from an explicit configuration or
/// the default config file location.
#[command]
pub async fn initialize_streaming(config: Option<FleetcamConfig>) -> Result<String, String> {
    log::info!("Initializing fleetcam streaming subsystem");

    let config = match config {
        Some(config) => config,
        None => FleetcamConfig::load_or_default(),
    };

    install(config).await?;
    Ok("Streaming subsystem initialized".to_string())
}

/// Get the active configuration
#[command]
pub async fn get_config() -> Result<FleetcamConfig, String> {
    Ok(current_config().await)
}

/// Replace the active configuration.
///
/// Views opened before the update keep the gateway client they were built
/// with until they are closed; new views pick up the new settings.
#[command]
pub async fn update_config(config: FleetcamConfig) -> Result<String, String> {
    log::info!("Updating fleetcam configuration");
    install(config).await?;
    Ok("Configuration updated".to_string())
}

/// Tear down every open view and session; the navigation-away hook of the
/// hosting console.
#[command]
pub async fn shutdown_streaming() -> Result<String, String> {
    log::info!("Shutting down streaming subsystem");

    super::grid::close_grid_internal().await;
    super::grid::close_all_expanded_internal().await;
    super::control_room::exit_internal().await;
    super::pip::close_internal().await;

    Ok("All streams closed".to_string())
}
