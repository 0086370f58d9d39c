//! Camera list commands.
//!
//! The hosting page polls `refresh_cameras` on its own interval; the cache
//! here is what every view reconciles against between polls.

use crate::types::CameraSource;
use tauri::command;
use tokio::sync::RwLock;

lazy_static::lazy_static! {
    static ref CAMERA_CACHE: RwLock<Vec<CameraSource>> = RwLock::new(Vec::new());
}

/// Cached camera list (possibly empty before the first refresh).
pub(crate) async fn cached_cameras() -> Vec<CameraSource> {
    CAMERA_CACHE.read().await.clone()
}

/// Enabled cameras only; the set every view considers visible.
pub(crate) async fn visible_cameras() -> Vec<CameraSource> {
    CAMERA_CACHE
        .read()
        .await
        .iter()
        .filter(|camera| camera.enabled)
        .cloned()
        .collect()
}

pub(crate) async fn find_camera(camera_id: &str) -> Option<CameraSource> {
    CAMERA_CACHE
        .read()
        .await
        .iter()
        .find(|camera| camera.id == camera_id)
        .cloned()
}

/// Re-fetch the camera list from the gateway and cache it.
#[command]
pub async fn refresh_cameras() -> Result<Vec<CameraSource>, String> {
    let client = super::init::signaling_client().await?;

    let cameras = client.list_cameras().await.map_err(|e| {
        log::error!("Failed to refresh camera list: {}", e);
        e.to_string()
    })?;

    log::debug!("Camera list refreshed: {} cameras", cameras.len());
    *CAMERA_CACHE.write().await = cameras.clone();
    Ok(cameras)
}

/// Return the cached camera list without touching the gateway.
#[command]
pub async fn get_cameras() -> Result<Vec<CameraSource>, String> {
    Ok(cached_cameras().await)
}

/// Flip a camera's enablement flag on the gateway and patch the cache.
#[command]
pub async fn toggle_camera(camera_id: String) -> Result<bool, String> {
    let client = super::init::signaling_client().await?;

    let enabled = client.toggle_camera(&camera_id).await.map_err(|e| {
        log::error!("Failed to toggle camera {}: {}", camera_id, e);
        e.to_string()
    })?;

    let mut cache = CAMERA_CACHE.write().await;
    if let Some(camera) = cache.iter_mut().find(|camera| camera.id == camera_id) {
        camera.enabled = enabled;
    }

    Ok(enabled)
}
