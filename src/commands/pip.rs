//! Picture-in-picture player commands.
//!
//! The player itself is pure geometry; this layer owns the snapshot
//! refresh task that feeds it a still frame on the configured cadence.

use crate::views::pip::{PictureInPicturePlayer, PipPosition, PipStatus, Point, Viewport};
use std::time::Duration;
use tauri::command;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

lazy_static::lazy_static! {
    static ref PIP: Mutex<Option<PictureInPicturePlayer>> = Mutex::new(None);
    static ref SNAPSHOT_TASK: Mutex<Option<JoinHandle<()>>> = Mutex::new(None);
}

/// Open the floating player for one camera, bottom-right of the viewport.
/// An already-open player is replaced.
#[command]
pub async fn open_pip(camera_id: String, viewport: Viewport) -> Result<PipStatus, String> {
    let camera = super::cameras::find_camera(&camera_id)
        .await
        .ok_or_else(|| crate::errors::StreamError::camera_unavailable(&camera_id).to_string())?;

    let client = super::init::signaling_client().await?;
    let config = super::init::current_config().await;

    log::info!("Opening PiP player for camera {}", camera_id);
    close_internal().await;

    let player = PictureInPicturePlayer::new(camera, viewport, config.pip.margin);
    let status = player.status();
    *PIP.lock().await = Some(player);

    let interval = Duration::from_millis(config.pip.snapshot_interval_ms);
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;

            match client.fetch_snapshot(&camera_id).await {
                Ok(frame) => {
                    let mut guard = PIP.lock().await;
                    match guard.as_mut() {
                        Some(player) => player.store_snapshot(frame),
                        None => break,
                    }
                }
                Err(e) => {
                    log::debug!("PiP snapshot fetch failed for camera {}: {}", camera_id, e);
                }
            }
        }
    });
    *SNAPSHOT_TASK.lock().await = Some(task);

    Ok(status)
}

/// Start a drag; returns whether the pointer gripped the header region.
#[command]
pub async fn pip_begin_drag(x: f64, y: f64) -> Result<bool, String> {
    let mut guard = PIP.lock().await;
    let player = guard.as_mut().ok_or("PiP player is not open")?;
    Ok(player.begin_drag(Point { x, y }))
}

/// Track the pointer during a drag; the returned position is clamped to
/// keep the player fully inside the viewport.
#[command]
pub async fn pip_drag_to(x: f64, y: f64) -> Result<PipPosition, String> {
    let mut guard = PIP.lock().await;
    let player = guard.as_mut().ok_or("PiP player is not open")?;
    player.drag_to(Point { x, y });
    Ok(player.position())
}

/// Finish a drag gesture.
#[command]
pub async fn pip_end_drag() -> Result<(), String> {
    let mut guard = PIP.lock().await;
    let player = guard.as_mut().ok_or("PiP player is not open")?;
    player.end_drag();
    Ok(())
}

/// Flip between the two size classes; position survives, clamped.
#[command]
pub async fn toggle_pip_size() -> Result<PipStatus, String> {
    let mut guard = PIP.lock().await;
    let player = guard.as_mut().ok_or("PiP player is not open")?;
    player.toggle_size();
    Ok(player.status())
}

/// The host window resized; re-clamp into the new bounds.
#[command]
pub async fn set_pip_viewport(viewport: Viewport) -> Result<PipPosition, String> {
    let mut guard = PIP.lock().await;
    let player = guard.as_mut().ok_or("PiP player is not open")?;
    player.set_viewport(viewport);
    Ok(player.position())
}

/// Player status, or `None` when no player is open.
#[command]
pub async fn get_pip_status() -> Result<Option<PipStatus>, String> {
    let guard = PIP.lock().await;
    Ok(guard.as_ref().map(|player| player.status()))
}

/// Latest snapshot bytes for the host page to render.
#[command]
pub async fn get_pip_snapshot() -> Result<Option<Vec<u8>>, String> {
    let guard = PIP.lock().await;
    let player = guard.as_ref().ok_or("PiP player is not open")?;
    Ok(player.snapshot().map(|frame| frame.data.to_vec()))
}

/// Close the player and stop the snapshot task.
#[command]
pub async fn close_pip() -> Result<String, String> {
    log::info!("Closing PiP player");
    close_internal().await;
    Ok("PiP player closed".to_string())
}

pub(crate) async fn close_internal() {
    if let Some(task) = SNAPSHOT_TASK.lock().await.take() {
        task.abort();
    }
    *PIP.lock().await = None;
}
