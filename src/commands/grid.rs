//! Camera wall commands.

use crate::stream::{RetryPolicy, SessionOptions, SessionState, StreamSession};
use crate::types::StatusDot;
use crate::views::grid::{GridOrchestrator, GridTileStatus};
use crate::views::layout::ColumnMode;
use serde::Serialize;
use std::collections::HashMap;
use tauri::command;
use tokio::sync::{Mutex, RwLock};

lazy_static::lazy_static! {
    static ref GRID: Mutex<Option<GridOrchestrator>> = Mutex::new(None);
    static ref EXPANDED: RwLock<HashMap<String, StreamSession>> = RwLock::new(HashMap::new());
}

#[derive(Debug, Clone, Serialize)]
pub struct GridStatus {
    pub columns: u32,
    pub mode: ColumnMode,
    pub tiles: Vec<GridTileStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpandedView {
    pub session_id: String,
    pub camera_id: String,
    pub state: SessionState,
    pub dot: StatusDot,
    pub status_line: String,
}

async fn build_orchestrator() -> Result<GridOrchestrator, String> {
    let client = super::init::signaling_client().await?;
    let config = super::init::current_config().await;
    Ok(GridOrchestrator::new(
        client,
        SessionOptions::from(&config.stream),
        RetryPolicy::from_settings(&config.stream),
    ))
}

fn status_of(grid: &GridOrchestrator) -> GridStatus {
    GridStatus {
        columns: grid.columns(),
        mode: grid.column_mode(),
        tiles: grid.statuses(),
    }
}

/// Reconcile the grid against the cached camera list, optionally narrowed
/// to an explicit id set (the page's visibility filter).
#[command]
pub async fn sync_grid(camera_ids: Option<Vec<String>>) -> Result<GridStatus, String> {
    let mut visible = super::cameras::visible_cameras().await;
    if let Some(ids) = camera_ids {
        visible.retain(|camera| ids.contains(&camera.id));
    }

    log::info!("Syncing grid to {} visible cameras", visible.len());

    let mut guard = GRID.lock().await;
    if guard.is_none() {
        *guard = Some(build_orchestrator().await?);
    }
    let grid = guard.as_mut().expect("orchestrator just installed");

    grid.sync_cameras(&visible).await;
    Ok(status_of(grid))
}

/// Change the column preference; sessions are untouched.
#[command]
pub async fn set_grid_columns(mode: ColumnMode) -> Result<GridStatus, String> {
    let mut guard = GRID.lock().await;
    let grid = guard.as_mut().ok_or("Grid is not open")?;
    grid.set_column_mode(mode);
    Ok(status_of(grid))
}

/// Current grid layout and per-tile session states.
#[command]
pub async fn get_grid_status() -> Result<Option<GridStatus>, String> {
    let guard = GRID.lock().await;
    Ok(guard.as_ref().map(status_of))
}

/// One supervision pass over failed tiles; a no-op under the default
/// retry policy. Returns the number of sessions reopened.
#[command]
pub async fn sweep_grid() -> Result<usize, String> {
    let mut guard = GRID.lock().await;
    let grid = guard.as_mut().ok_or("Grid is not open")?;
    Ok(grid.sweep_failed().await)
}

/// Open an independent session for the expanded single-camera view.
#[command]
pub async fn expand_camera(camera_id: String) -> Result<ExpandedView, String> {
    let guard = GRID.lock().await;
    let grid = guard.as_ref().ok_or("Grid is not open")?;

    let session = grid.expand(&camera_id).await.map_err(|e| e.to_string())?;
    let view = ExpandedView {
        session_id: session.id().to_string(),
        camera_id: camera_id.clone(),
        state: session.state(),
        dot: session.status_dot(),
        status_line: session.status_line(),
    };

    EXPANDED.write().await.insert(view.session_id.clone(), session);
    Ok(view)
}

/// State of an open expanded view.
#[command]
pub async fn get_expanded_status(session_id: String) -> Result<ExpandedView, String> {
    let expanded = EXPANDED.read().await;
    let session = expanded
        .get(&session_id)
        .ok_or_else(|| format!("No expanded view with session {}", session_id))?;

    Ok(ExpandedView {
        session_id,
        camera_id: session.camera_id().to_string(),
        state: session.state(),
        dot: session.status_dot(),
        status_line: session.status_line(),
    })
}

/// Close an expanded view's session.
#[command]
pub async fn close_expanded(session_id: String) -> Result<String, String> {
    let session = EXPANDED.write().await.remove(&session_id);
    match session {
        Some(session) => {
            session.close().await;
            Ok(format!("Expanded view {} closed", session_id))
        }
        None => Err(format!("No expanded view with session {}", session_id)),
    }
}

/// Close the grid and every tile session.
#[command]
pub async fn close_grid() -> Result<String, String> {
    close_grid_internal().await;
    Ok("Grid closed".to_string())
}

pub(crate) async fn close_grid_internal() {
    let mut guard = GRID.lock().await;
    if let Some(mut grid) = guard.take() {
        grid.close_all().await;
    }
}

pub(crate) async fn close_all_expanded_internal() {
    let sessions: Vec<StreamSession> = EXPANDED.write().await.drain().map(|(_, s)| s).collect();
    for session in sessions {
        session.close().await;
    }
}
