//! Control-room overlay commands.

use crate::stream::SessionOptions;
use crate::views::control_room::{
    ControlRoomOverlay, ControlRoomTileStatus, HostChrome, OverlayIntent,
};
use serde::Serialize;
use tauri::{command, AppHandle, Emitter, Runtime};
use tokio::sync::Mutex;

lazy_static::lazy_static! {
    static ref CONTROL_ROOM: Mutex<Option<ControlRoomOverlay>> = Mutex::new(None);
}

/// Event the host page listens on to hide or restore its navigation chrome.
pub const CHROME_EVENT: &str = "fleetcam://chrome-hidden";

/// Chrome capability backed by a webview event; best effort by design.
struct EventChrome<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> HostChrome for EventChrome<R> {
    fn set_hidden(&self, hidden: bool) {
        if let Err(e) = self.app.emit(CHROME_EVENT, hidden) {
            log::warn!("Failed to emit chrome visibility event: {}", e);
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ControlRoomStatus {
    pub active: bool,
    pub columns: u32,
    pub clock: Option<String>,
    pub tiles: Vec<ControlRoomTileStatus>,
}

fn status_of(overlay: &ControlRoomOverlay) -> ControlRoomStatus {
    ControlRoomStatus {
        active: overlay.is_active(),
        columns: overlay.columns(),
        clock: overlay.clock_text(),
        tiles: overlay.statuses(),
    }
}

async fn enter<R: Runtime>(app: &AppHandle<R>) -> Result<ControlRoomStatus, String> {
    let cameras = super::cameras::visible_cameras().await;
    let client = super::init::signaling_client().await?;
    let config = super::init::current_config().await;

    let mut guard = CONTROL_ROOM.lock().await;
    let overlay = guard.get_or_insert_with(|| {
        ControlRoomOverlay::new(
            client,
            SessionOptions::from(&config.stream),
            Box::new(EventChrome { app: app.clone() }),
            &config.control_room,
        )
    });

    overlay.enter(&cameras).await;
    Ok(status_of(overlay))
}

/// Enter control-room mode with every visible camera.
#[command]
pub async fn enter_control_room<R: Runtime>(app: AppHandle<R>) -> Result<ControlRoomStatus, String> {
    log::info!("Entering control room");
    enter(&app).await
}

/// Exit control-room mode, restoring chrome and closing all sessions.
#[command]
pub async fn exit_control_room() -> Result<String, String> {
    log::info!("Exiting control room");
    exit_internal().await;
    Ok("Control room exited".to_string())
}

/// Route a keyboard event: the configured hotkey toggles the mode (ignored
/// while typing), Escape exits it. Returns the action taken, if any.
#[command]
pub async fn control_room_hotkey<R: Runtime>(
    app: AppHandle<R>,
    key: String,
    in_text_input: bool,
) -> Result<Option<OverlayIntent>, String> {
    let intent = {
        let guard = CONTROL_ROOM.lock().await;
        match guard.as_ref() {
            Some(overlay) => overlay.interpret_hotkey(&key, in_text_input),
            None => {
                // No overlay yet: consult the configured hotkey directly.
                let config = super::init::current_config().await;
                (key == config.control_room.hotkey && !in_text_input)
                    .then_some(OverlayIntent::Enter)
            }
        }
    };

    match intent {
        Some(OverlayIntent::Enter) => {
            enter(&app).await?;
        }
        Some(OverlayIntent::Exit) => {
            exit_internal().await;
        }
        None => {}
    }
    Ok(intent)
}

/// Overlay state for the host page: active flag, columns, clock, tile dots.
#[command]
pub async fn get_control_room_status() -> Result<ControlRoomStatus, String> {
    let guard = CONTROL_ROOM.lock().await;
    Ok(match guard.as_ref() {
        Some(overlay) => status_of(overlay),
        None => ControlRoomStatus {
            active: false,
            columns: 1,
            clock: None,
            tiles: Vec::new(),
        },
    })
}

pub(crate) async fn exit_internal() {
    let mut guard = CONTROL_ROOM.lock().await;
    if let Some(overlay) = guard.as_mut() {
        overlay.exit().await;
    }
    // Drop the overlay so a later enter rebuilds it against fresh config.
    *guard = None;
}
