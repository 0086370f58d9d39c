//! Control room: full-viewport wall of every visible camera.
//!
//! Entering hides the host page's chrome (a best-effort, injected
//! capability so the overlay never touches globals itself), opens one
//! independent session per camera, and runs a one-second clock. Exiting
//! undoes all three.

use crate::config::ControlRoomConfig;
use crate::signaling::SignalingClient;
use crate::stream::{SessionOptions, SessionState, StreamSession};
use crate::types::{CameraSource, StatusDot};
use crate::views::layout::control_room_columns;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Host-chrome visibility toggle, injected by the embedding layer.
///
/// Best effort: failures are the capability's problem, the overlay never
/// observes them.
pub trait HostChrome: Send + Sync {
    fn set_hidden(&self, hidden: bool);
}

/// Capability that does nothing; useful headless and in tests.
pub struct NoopChrome;

impl HostChrome for NoopChrome {
    fn set_hidden(&self, _hidden: bool) {}
}

/// What a keyboard event should do to the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayIntent {
    Enter,
    Exit,
}

#[derive(Debug, Clone, Serialize)]
pub struct ControlRoomTileStatus {
    pub camera_id: String,
    pub camera_name: String,
    pub state: SessionState,
    pub dot: StatusDot,
}

struct ClockTicker {
    handle: JoinHandle<()>,
    rx: watch::Receiver<DateTime<Local>>,
}

pub struct ControlRoomOverlay {
    signaling: SignalingClient,
    options: SessionOptions,
    chrome: Box<dyn HostChrome>,
    hotkey: String,
    clock_format: String,
    tiles: HashMap<String, (CameraSource, StreamSession)>,
    order: Vec<String>,
    clock: Option<ClockTicker>,
    active: bool,
}

impl ControlRoomOverlay {
    pub fn new(
        signaling: SignalingClient,
        options: SessionOptions,
        chrome: Box<dyn HostChrome>,
        config: &ControlRoomConfig,
    ) -> Self {
        Self {
            signaling,
            options,
            chrome,
            hotkey: config.hotkey.clone(),
            clock_format: config.clock_format.clone(),
            tiles: HashMap::new(),
            order: Vec::new(),
            clock: None,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Enter the mode: hide chrome, open one session per visible camera,
    /// start the clock. A second enter while active is a no-op.
    pub async fn enter(&mut self, cameras: &[CameraSource]) {
        if self.active {
            log::debug!("Control room already active");
            return;
        }

        log::info!("Entering control room with {} cameras", cameras.len());
        self.chrome.set_hidden(true);

        // One independent session per camera, negotiated concurrently.
        let mut openings = Vec::new();
        for camera in cameras {
            let camera = camera.clone();
            let signaling = self.signaling.clone();
            let options = self.options.clone();
            openings.push(tokio::spawn(async move {
                let session = StreamSession::open(&camera, &signaling, &options).await;
                (camera, session)
            }));
        }
        for opening in openings {
            if let Ok((camera, session)) = opening.await {
                self.tiles.insert(camera.id.clone(), (camera, session));
            }
        }
        self.order = cameras.iter().map(|c| c.id.clone()).collect();

        self.clock = Some(start_clock());
        self.active = true;
    }

    /// Exit the mode: restore chrome, close every session this overlay
    /// opened, stop the clock. A second exit is a no-op.
    pub async fn exit(&mut self) {
        if !self.active {
            log::debug!("Control room not active");
            return;
        }

        log::info!("Exiting control room, closing {} sessions", self.tiles.len());
        for (camera_id, (_, session)) in self.tiles.drain() {
            log::debug!("Closing control room session for camera {}", camera_id);
            session.close().await;
        }
        self.order.clear();

        if let Some(clock) = self.clock.take() {
            clock.handle.abort();
        }

        self.chrome.set_hidden(false);
        self.active = false;
    }

    /// Band-table column count for the current tile set.
    pub fn columns(&self) -> u32 {
        control_room_columns(self.tiles.len())
    }

    /// Decide what a key event means for the overlay.
    ///
    /// The dedicated hotkey toggles, but is ignored while focus sits in a
    /// text input; Escape always exits while the mode is active.
    pub fn interpret_hotkey(&self, key: &str, in_text_input: bool) -> Option<OverlayIntent> {
        if self.active {
            if key == "Escape" {
                return Some(OverlayIntent::Exit);
            }
            if key == self.hotkey && !in_text_input {
                return Some(OverlayIntent::Exit);
            }
        } else if key == self.hotkey && !in_text_input {
            return Some(OverlayIntent::Enter);
        }
        None
    }

    /// Latest clock tick, formatted for display; `None` while inactive.
    pub fn clock_text(&self) -> Option<String> {
        self.clock
            .as_ref()
            .map(|clock| clock.rx.borrow().format(&self.clock_format).to_string())
    }

    /// Tile statuses in presentation order: dot plus placeholder state
    /// only, no per-tile controls.
    pub fn statuses(&self) -> Vec<ControlRoomTileStatus> {
        self.order
            .iter()
            .filter_map(|id| self.tiles.get(id))
            .map(|(camera, session)| ControlRoomTileStatus {
                camera_id: camera.id.clone(),
                camera_name: camera.name.clone(),
                state: session.state(),
                dot: session.status_dot(),
            })
            .collect()
    }

    pub fn session_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn session(&self, camera_id: &str) -> Option<&StreamSession> {
        self.tiles.get(camera_id).map(|(_, session)| session)
    }
}

fn start_clock() -> ClockTicker {
    let (tx, rx) = watch::channel(Local::now());
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        loop {
            ticker.tick().await;
            if tx.send(Local::now()).is_err() {
                break;
            }
        }
    });
    ClockTicker { handle, rx }
}
