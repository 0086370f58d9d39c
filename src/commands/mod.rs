pub mod cameras;
pub mod control_room;
pub mod grid;
pub mod init;
pub mod pip;

pub use cameras::*;
pub use control_room::*;
pub use grid::*;
pub use init::*;
pub use pip::*;
