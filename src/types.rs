//! Shared data types for the streaming subsystem.

use serde::{Deserialize, Serialize};

/// A configured video feed tied to a printing device.
///
/// Camera sources are created and disabled by device configuration on the
/// gateway side; this subsystem only reads them. The list endpoint may omit
/// fields beyond `id` and `name`, so everything else defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSource {
    pub id: String,
    pub name: String,
    /// Identifier of the printer this camera is mounted on, when known.
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl CameraSource {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            device_id: None,
            enabled: true,
        }
    }
}

/// User-visible connection indicator for a session tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusDot {
    /// Solid success style: media is flowing.
    Live,
    /// Pulsing transient style: negotiation in flight.
    Pulsing,
    /// Failure style: disconnected or errored.
    Failure,
}
