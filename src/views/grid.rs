//! Camera wall: one stream session per visible camera, arranged in a grid.
//!
//! The camera list is owned by the hosting page and refreshed by its
//! polling; the orchestrator reconciles its sessions against whatever list
//! it is handed. Column preferences never touch session lifecycles.

use crate::errors::StreamError;
use crate::signaling::SignalingClient;
use crate::stream::{RetryPolicy, SessionOptions, SessionState, StreamSession};
use crate::types::{CameraSource, StatusDot};
use crate::views::layout::ColumnMode;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

struct GridTile {
    camera: CameraSource,
    session: StreamSession,
    attempts: u32,
    failed_since: Option<Instant>,
}

/// Status snapshot of one tile, for the command boundary.
#[derive(Debug, Clone, Serialize)]
pub struct GridTileStatus {
    pub camera_id: String,
    pub camera_name: String,
    pub session_id: uuid::Uuid,
    pub state: SessionState,
    pub dot: StatusDot,
    pub status_line: String,
}

pub struct GridOrchestrator {
    signaling: SignalingClient,
    options: SessionOptions,
    retry: RetryPolicy,
    column_mode: ColumnMode,
    tiles: HashMap<String, GridTile>,
    /// Camera ids in presentation order, following the last reconcile.
    order: Vec<String>,
}

impl GridOrchestrator {
    pub fn new(signaling: SignalingClient, options: SessionOptions, retry: RetryPolicy) -> Self {
        Self {
            signaling,
            options,
            retry,
            column_mode: ColumnMode::Auto,
            tiles: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Reconcile sessions against the currently visible camera list:
    /// open sessions for newly visible cameras, close sessions for cameras
    /// that dropped out, leave surviving sessions untouched.
    pub async fn sync_cameras(&mut self, visible: &[CameraSource]) {
        let visible_ids: Vec<&str> = visible.iter().map(|c| c.id.as_str()).collect();

        let dropped: Vec<String> = self
            .tiles
            .keys()
            .filter(|id| !visible_ids.contains(&id.as_str()))
            .cloned()
            .collect();
        for camera_id in dropped {
            if let Some(tile) = self.tiles.remove(&camera_id) {
                log::info!("Camera {} left the grid, closing its session", camera_id);
                tile.session.close().await;
            }
        }

        // Sessions negotiate independently; open the newcomers concurrently
        // so one slow camera does not stall the rest of the wall.
        let mut openings = Vec::new();
        for camera in visible {
            if !self.tiles.contains_key(&camera.id) {
                let camera = camera.clone();
                let signaling = self.signaling.clone();
                let options = self.options.clone();
                openings.push(tokio::spawn(async move {
                    let session = StreamSession::open(&camera, &signaling, &options).await;
                    (camera, session)
                }));
            }
        }
        for opening in openings {
            if let Ok((camera, session)) = opening.await {
                self.tiles.insert(
                    camera.id.clone(),
                    GridTile {
                        camera,
                        session,
                        attempts: 0,
                        failed_since: None,
                    },
                );
            }
        }

        self.order = visible.iter().map(|c| c.id.clone()).collect();
        log::debug!(
            "Grid reconciled: {} tiles, {} columns",
            self.tiles.len(),
            self.columns()
        );
    }

    /// Column count for the current tile set and preference.
    pub fn columns(&self) -> u32 {
        self.column_mode.columns(self.tiles.len())
    }

    pub fn column_mode(&self) -> ColumnMode {
        self.column_mode
    }

    /// Changing the preference affects layout only, never sessions.
    pub fn set_column_mode(&mut self, mode: ColumnMode) {
        self.column_mode = mode;
    }

    /// Open a brand-new independent session for the expanded view.
    ///
    /// The grid tile's session is deliberately not reused; the expanded
    /// view has its own lifecycle and closes its own session.
    pub async fn expand(&self, camera_id: &str) -> Result<StreamSession, StreamError> {
        let tile = self
            .tiles
            .get(camera_id)
            .ok_or_else(|| StreamError::camera_unavailable(camera_id))?;

        log::info!("Opening expanded view session for camera {}", camera_id);
        Ok(StreamSession::open(&tile.camera, &self.signaling, &self.options).await)
    }

    /// One supervision pass: replace terminal sessions whose retry delay
    /// has elapsed. With `RetryPolicy::None` this never reopens anything.
    /// Returns the number of sessions reopened.
    pub async fn sweep_failed(&mut self) -> usize {
        let now = Instant::now();
        let mut reopened = 0;

        for tile in self.tiles.values_mut() {
            if !tile.session.state().is_terminal() {
                tile.failed_since = None;
                continue;
            }

            let failed_since = *tile.failed_since.get_or_insert(now);
            let Some(delay) = self.retry.next_delay(tile.attempts) else {
                continue;
            };
            if now.duration_since(failed_since) < delay {
                continue;
            }

            log::info!(
                "Retrying camera {} (attempt {})",
                tile.camera.id,
                tile.attempts + 1
            );
            tile.session.close().await;
            tile.session = StreamSession::open(&tile.camera, &self.signaling, &self.options).await;
            tile.attempts += 1;
            tile.failed_since = None;
            reopened += 1;
        }

        reopened
    }

    /// Tile statuses in presentation order.
    pub fn statuses(&self) -> Vec<GridTileStatus> {
        self.order
            .iter()
            .filter_map(|id| self.tiles.get(id))
            .map(|tile| GridTileStatus {
                camera_id: tile.camera.id.clone(),
                camera_name: tile.camera.name.clone(),
                session_id: tile.session.id(),
                state: tile.session.state(),
                dot: tile.session.status_dot(),
                status_line: tile.session.status_line(),
            })
            .collect()
    }

    pub fn session(&self, camera_id: &str) -> Option<&StreamSession> {
        self.tiles.get(camera_id).map(|tile| &tile.session)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Close every tile's session; each exactly once.
    pub async fn close_all(&mut self) {
        for (camera_id, tile) in self.tiles.drain() {
            log::debug!("Closing grid session for camera {}", camera_id);
            tile.session.close().await;
        }
        self.order.clear();
    }
}
