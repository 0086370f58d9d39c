//! Floating picture-in-picture player.
//!
//! The lightweight sibling of the stream session: a single draggable
//! overlay that shows a periodically refreshed snapshot of one camera,
//! independent of the grid and control-room lifecycles. All geometry is
//! pure and synchronous; the snapshot fetch cadence is owned by the
//! command layer.

use crate::types::CameraSource;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Height of the draggable header strip, in CSS pixels.
pub const HEADER_HEIGHT: f64 = 28.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Top-left corner of the player, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipPosition {
    pub x: f64,
    pub y: f64,
}

/// Discrete size classes; toggling keeps the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipSize {
    Small,
    Medium,
}

impl PipSize {
    pub fn dimensions(self) -> (f64, f64) {
        match self {
            PipSize::Small => (320.0, 180.0),
            PipSize::Medium => (480.0, 270.0),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            PipSize::Small => PipSize::Medium,
            PipSize::Medium => PipSize::Small,
        }
    }
}

/// The most recent still frame, with its fetch instant for staleness display.
#[derive(Debug, Clone)]
pub struct SnapshotFrame {
    pub data: Bytes,
    pub taken_at: Instant,
}

#[derive(Debug, Clone, Copy)]
struct DragGrip {
    offset_x: f64,
    offset_y: f64,
}

/// Status snapshot for the command boundary.
#[derive(Debug, Clone, Serialize)]
pub struct PipStatus {
    pub camera_id: String,
    pub camera_name: String,
    pub position: PipPosition,
    pub size: PipSize,
    pub dragging: bool,
    pub snapshot_age_ms: Option<u64>,
}

pub struct PictureInPicturePlayer {
    camera: CameraSource,
    viewport: Viewport,
    position: PipPosition,
    size: PipSize,
    drag: Option<DragGrip>,
    snapshot: Option<SnapshotFrame>,
}

impl PictureInPicturePlayer {
    /// Create the player at the bottom-right of the viewport, inset by
    /// `margin` on both axes.
    pub fn new(camera: CameraSource, viewport: Viewport, margin: f64) -> Self {
        let size = PipSize::Small;
        let (width, height) = size.dimensions();
        let mut player = Self {
            camera,
            viewport,
            position: PipPosition {
                x: viewport.width - width - margin,
                y: viewport.height - height - margin,
            },
            size,
            drag: None,
            snapshot: None,
        };
        player.clamp();
        player
    }

    /// Start a drag if the pointer sits in the header strip. Records the
    /// grab point so the player tracks the pointer without jumping.
    pub fn begin_drag(&mut self, pointer: Point) -> bool {
        let (width, _) = self.size.dimensions();
        let in_header = pointer.x >= self.position.x
            && pointer.x <= self.position.x + width
            && pointer.y >= self.position.y
            && pointer.y <= self.position.y + HEADER_HEIGHT;

        if in_header {
            self.drag = Some(DragGrip {
                offset_x: pointer.x - self.position.x,
                offset_y: pointer.y - self.position.y,
            });
        }
        in_header
    }

    /// Track the pointer while a drag is active; the position is clamped
    /// on every update so the full box stays inside the viewport.
    pub fn drag_to(&mut self, pointer: Point) {
        let Some(grip) = self.drag else {
            return;
        };
        self.position = PipPosition {
            x: pointer.x - grip.offset_x,
            y: pointer.y - grip.offset_y,
        };
        self.clamp();
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Flip between the two size classes; position is kept, clamping uses
    /// the new dimensions.
    pub fn toggle_size(&mut self) {
        self.size = self.size.toggled();
        self.clamp();
    }

    /// Host viewport changed (window resize); re-clamp into the new bounds.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.clamp();
    }

    fn clamp(&mut self) {
        let (width, height) = self.size.dimensions();
        let max_x = (self.viewport.width - width).max(0.0);
        let max_y = (self.viewport.height - height).max(0.0);
        self.position.x = self.position.x.clamp(0.0, max_x);
        self.position.y = self.position.y.clamp(0.0, max_y);
    }

    pub fn store_snapshot(&mut self, data: Bytes) {
        self.snapshot = Some(SnapshotFrame {
            data,
            taken_at: Instant::now(),
        });
    }

    pub fn snapshot(&self) -> Option<&SnapshotFrame> {
        self.snapshot.as_ref()
    }

    pub fn camera(&self) -> &CameraSource {
        &self.camera
    }

    pub fn position(&self) -> PipPosition {
        self.position
    }

    pub fn size(&self) -> PipSize {
        self.size
    }

    pub fn status(&self) -> PipStatus {
        PipStatus {
            camera_id: self.camera.id.clone(),
            camera_name: self.camera.name.clone(),
            position: self.position,
            size: self.size,
            dragging: self.drag.is_some(),
            snapshot_age_ms: self
                .snapshot
                .as_ref()
                .map(|frame| frame.taken_at.elapsed().as_millis() as u64),
        }
    }
}
