//! Per-source occlusion strategy components
//!
//! Both components are pure tuning; runtime state (timers, smoothing)
//! lives in [`OcclusionState`] keyed by entity, so components stay plain
//! serializable data.
//!
//! [`OcclusionState`]: crate::occlusion::system::OcclusionState

use serde::{Deserialize, Serialize};

/// Graph-routing occlusion strategy
///
/// Recomputes its target on a fixed-period timer by path-finding between
/// the listener's and the source's rooms, then smooths toward it every
/// tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct OcclusionDriver {
    /// Seconds between target recomputes
    pub update_interval: f32,
    /// Exponential smoothing rate per second
    pub smooth_rate: f32,
    /// How strongly facing the first portal pulls toward the clear preset
    pub facing_weight: f32,
    /// Distance at which the facing boost has faded to nothing
    pub facing_range: f32,
}

impl Default for OcclusionDriver {
    fn default() -> Self {
        Self {
            update_interval: 0.08,
            smooth_rate: 10.0,
            facing_weight: 0.25,
            facing_range: 10.0,
        }
    }
}

/// Portal-proximity occlusion strategy
///
/// Skips graph search entirely: scores portals near the listener that both
/// endpoints can see and takes the best one's material. Cheaper and
/// room-agnostic, for sources that move too fast for occupancy to follow.
/// A source carries this or [`OcclusionDriver`], not both.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityOccluder {
    /// Seconds between target recomputes
    pub update_interval: f32,
    /// Exponential smoothing rate per second
    pub smooth_rate: f32,
    /// How strongly facing the winning portal pulls toward the clear
    /// preset
    pub facing_weight: f32,
    /// Portals farther than this from the listener are never candidates
    pub search_radius: f32,
}

impl Default for ProximityOccluder {
    fn default() -> Self {
        Self {
            update_interval: 0.05,
            smooth_rate: 10.0,
            facing_weight: 0.25,
            search_radius: 12.0,
        }
    }
}
