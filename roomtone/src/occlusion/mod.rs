//! Occlusion target resolution, smoothing, and the per-frame systems

pub mod combine;
pub mod debug;
pub mod driver;
pub mod smoothing;
pub mod system;

pub use combine::{
    apply_facing, combine_path, facing_alignment, facing_factor, MIN_COMBINED_VOLUME,
};
pub use debug::{route_debug_lines, RouteDebugLine};
pub use driver::{OcclusionDriver, ProximityOccluder};
pub use smoothing::Smoothed;
pub use system::{
    occlusion_update_system, proximity_update_system, resolve_graph_target,
    resolve_proximity_target, OcclusionState, SourceState,
};
