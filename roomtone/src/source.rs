//! Sound source component

use serde::{Deserialize, Serialize};

/// A sound-emitting entity
///
/// The occlusion systems drive gain and filtering for every entity that
/// carries this next to a driver component; `sound` names the asset the
/// output stage should loop, and may be absent for sources that only exist
/// in simulation (tests, headless runs).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundSource {
    /// Asset path of the clip to play, relative to the host's sound
    /// directory
    pub sound: Option<String>,
    /// Gain before occlusion is applied, in [0, 1]
    pub base_volume: f32,
    /// Restart the clip when it ends
    pub looped: bool,
    /// Start playback as soon as the output stage binds the source
    pub autoplay: bool,
}

impl Default for SoundSource {
    fn default() -> Self {
        Self {
            sound: None,
            base_volume: 1.0,
            looped: true,
            autoplay: true,
        }
    }
}

impl SoundSource {
    pub fn new(sound: impl Into<String>) -> Self {
        Self {
            sound: Some(sound.into()),
            ..Default::default()
        }
    }

    pub fn with_base_volume(mut self, base_volume: f32) -> Self {
        self.base_volume = base_volume.clamp(0.0, 1.0);
        self
    }
}
