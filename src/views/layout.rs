//! Grid column math shared by the camera wall and the control room.

use serde::{Deserialize, Serialize};

/// Column preference for the camera grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnMode {
    /// Derive the count from the number of visible cameras.
    Auto,
    /// One of the small fixed options offered in the toolbar.
    Fixed(u32),
}

impl Default for ColumnMode {
    fn default() -> Self {
        ColumnMode::Auto
    }
}

/// Generic auto layout: `min(4, ceil(sqrt(n)))`.
///
/// Keeps tiles roughly square and bounds the worst-case thumbnail size for
/// up to 16 simultaneous feeds.
pub fn auto_columns(visible: usize) -> u32 {
    if visible == 0 {
        return 1;
    }
    let root = (visible as f64).sqrt().ceil() as u32;
    root.min(4)
}

/// Control-room banding; keeps individual tiles legible at each count.
pub fn control_room_columns(visible: usize) -> u32 {
    match visible {
        0 | 1 => 1,
        2 => 2,
        3..=4 => 2,
        5..=6 => 3,
        7..=9 => 3,
        _ => 4,
    }
}

impl ColumnMode {
    pub fn columns(self, visible: usize) -> u32 {
        match self {
            ColumnMode::Auto => auto_columns(visible),
            ColumnMode::Fixed(n) => n.max(1),
        }
    }
}
