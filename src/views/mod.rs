//! Presentation-mode orchestrators: camera wall, control room, floating player.

pub mod control_room;
pub mod grid;
pub mod layout;
pub mod pip;

pub use control_room::{ControlRoomOverlay, HostChrome, NoopChrome, OverlayIntent};
pub use grid::GridOrchestrator;
pub use layout::{auto_columns, control_room_columns, ColumnMode};
pub use pip::{PictureInPicturePlayer, PipPosition, PipSize, Point, Viewport};
