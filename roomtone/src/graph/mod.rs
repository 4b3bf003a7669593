//! Room/portal graph model and the acoustic path search

pub mod material;
pub mod path;
pub mod rooms;

pub use material::{OcclusionSettings, PortalMaterial, MAX_CUTOFF_HZ, MIN_CUTOFF_HZ};
pub use path::{find_acoustic_path, AcousticPath};
pub use rooms::{
    GraphError, Portal, PortalCommand, PortalCommandQueue, PortalId, RoomGraph, RoomVolume,
};
