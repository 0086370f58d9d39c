//! Fleetcam: live camera streaming for 3D printer fleet consoles
//!
//! This crate provides the streaming subsystem of a printer-fleet
//! management console: per-camera WebRTC sessions negotiated through the
//! farm's media gateway, with grid, control-room, and picture-in-picture
//! presentation modes.
//!
//! # Features
//! - One receive-only peer connection per open camera view
//! - Explicit connection state machine with guarded transitions
//! - Camera wall with auto or fixed column layout
//! - Full-viewport control room with clock and chrome suppression
//! - Draggable, viewport-clamped picture-in-picture player
//!
//! # Usage
//! Add this to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! fleetcam = "0.3"
//! tauri = { version = "2.0", features = ["protocol-asset"] }
//! ```
//!
//! Then in your Tauri app:
//! ```rust,ignore
//! fn main() {
//!     tauri::Builder::default()
//!         .plugin(fleetcam::init())
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
pub mod commands;
pub mod config;
pub mod errors;
pub mod signaling;
pub mod stream;
pub mod types;
pub mod views;

// Re-exports for convenience
pub use config::FleetcamConfig;
pub use errors::StreamError;
pub use signaling::SignalingClient;
pub use stream::{RetryPolicy, SessionOptions, SessionState, StreamSession};
pub use types::{CameraSource, StatusDot};
pub use views::{
    ControlRoomOverlay, GridOrchestrator, HostChrome, NoopChrome, PictureInPicturePlayer,
};

use tauri::{
    plugin::{Builder, TauriPlugin},
    Runtime,
};

/// Initialize the fleetcam plugin with all commands
pub fn init<R: Runtime>() -> TauriPlugin<R> {
    Builder::new("fleetcam")
        .invoke_handler(tauri::generate_handler![
            // Initialization commands
            commands::init::initialize_streaming,
            commands::init::get_config,
            commands::init::update_config,
            commands::init::shutdown_streaming,
            // Camera list commands
            commands::cameras::refresh_cameras,
            commands::cameras::get_cameras,
            commands::cameras::toggle_camera,
            // Grid commands
            commands::grid::sync_grid,
            commands::grid::set_grid_columns,
            commands::grid::get_grid_status,
            commands::grid::sweep_grid,
            commands::grid::expand_camera,
            commands::grid::get_expanded_status,
            commands::grid::close_expanded,
            commands::grid::close_grid,
            // Control room commands
            commands::control_room::enter_control_room,
            commands::control_room::exit_control_room,
            commands::control_room::control_room_hotkey,
            commands::control_room::get_control_room_status,
            // Picture-in-picture commands
            commands::pip::open_pip,
            commands::pip::pip_begin_drag,
            commands::pip::pip_drag_to,
            commands::pip::pip_end_drag,
            commands::pip::toggle_pip_size,
            commands::pip::set_pip_viewport,
            commands::pip::get_pip_status,
            commands::pip::get_pip_snapshot,
            commands::pip::close_pip,
        ])
        .build()
}

/// Initialize logging for the streaming subsystem
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "fleetcam=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}
