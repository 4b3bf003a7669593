//! Portal material categories and their occlusion presets

use serde::{Deserialize, Serialize};

/// Lower bound of the low-pass cutoff range in hertz
pub const MIN_CUTOFF_HZ: f32 = 400.0;
/// Upper bound of the low-pass cutoff range; at this value the filter is
/// effectively off
pub const MAX_CUTOFF_HZ: f32 = 22_000.0;

/// Acoustic category of a portal
///
/// Closed set: every material maps to exactly one preset and one traversal
/// cost, with no default arm anywhere so a new category fails to compile
/// until both tables cover it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortalMaterial {
    /// Solid wall, the most opaque category and the universal fallback
    Wall,
    /// Open doorway
    DoorOpen,
    /// Closed door leaf
    DoorClosed,
    /// Glass pane
    Window,
}

impl PortalMaterial {
    /// Occlusion preset for sound passing through this material
    pub fn settings(self) -> OcclusionSettings {
        match self {
            PortalMaterial::Wall => OcclusionSettings::new(0.30, 1_000.0),
            PortalMaterial::DoorOpen => OcclusionSettings::new(0.85, 7_000.0),
            PortalMaterial::DoorClosed => OcclusionSettings::new(0.55, 1_800.0),
            PortalMaterial::Window => OcclusionSettings::new(0.70, 3_500.0),
        }
    }

    /// Edge weight for the acoustic path search
    ///
    /// Monotonically increasing with acoustic opacity, so the cheapest
    /// route is the most open one, not the physically shortest.
    pub fn traversal_cost(self) -> f32 {
        match self {
            PortalMaterial::DoorOpen => 1.0,
            PortalMaterial::Window => 2.0,
            PortalMaterial::DoorClosed => 4.0,
            PortalMaterial::Wall => 6.0,
        }
    }
}

/// How much a sound is muffled: a gain multiplier and a low-pass cutoff
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OcclusionSettings {
    /// Gain multiplier in [0, 1]
    pub volume: f32,
    /// Low-pass cutoff in hertz
    pub cutoff_hz: f32,
}

impl OcclusionSettings {
    /// No occlusion at all: full volume, filter open
    pub const CLEAR: OcclusionSettings = OcclusionSettings {
        volume: 1.0,
        cutoff_hz: MAX_CUTOFF_HZ,
    };

    pub const fn new(volume: f32, cutoff_hz: f32) -> Self {
        Self { volume, cutoff_hz }
    }

    /// The fixed fallback whenever no acoustic route can be resolved
    pub fn wall_fallback() -> Self {
        PortalMaterial::Wall.settings()
    }
}
