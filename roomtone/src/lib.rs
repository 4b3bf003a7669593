//! Real-time spatial audio occlusion
//!
//! This crate models a scene as rooms connected by portals and resolves,
//! per sound source, how muffled the source should be at the listener:
//! a gain multiplier and a low-pass cutoff, smoothed over time and fed to
//! an output stage. Line-of-sight wins outright; otherwise the cheapest
//! acoustic route through the portal graph decides, with a boost for
//! facing the sound's entry portal.

pub mod config;
pub mod doors;
pub mod graph;
pub mod io;
pub mod listener;
pub mod occlusion;
pub mod occupancy;
pub mod output;
pub mod source;
pub mod spatial;
pub mod transform;

// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{AssetConfig, Tuning};
    pub use crate::doors::{door_update_system, set_door_open, toggle_door, Door};
    pub use crate::graph::{
        find_acoustic_path, AcousticPath, OcclusionSettings, Portal, PortalCommand,
        PortalCommandQueue, PortalId, PortalMaterial, RoomGraph, RoomVolume,
    };
    pub use crate::io::{SceneDoc, SceneError, SceneHandles};
    pub use crate::listener::{find_active_listener, Listener, ListenerPose};
    pub use crate::occlusion::{
        occlusion_update_system, proximity_update_system, OcclusionDriver, OcclusionState,
        ProximityOccluder,
    };
    pub use crate::occupancy::{occupancy_update_system, RoomTracker};
    pub use crate::output::{MemoryOutput, OutputParams, OutputStage};
    pub use crate::source::SoundSource;
    pub use crate::spatial::{Aabb, Occluder, SightQuery, WorldOccluders};
    pub use crate::transform::{Name, Transform};

    pub use glam::{Quat, Vec3};
    pub use hecs::{Entity, World};
}

/// Initialize logging for the simulator
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,symphonia=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
