//! Playback output stage backed by kira
//!
//! Every bound source gets its own sub-track with a low-pass filter
//! effect; the per-tick parameter writes become decibel volume and cutoff
//! tweens on that track. Setup is fallible, the per-tick path is not: a
//! write for an unbound source is dropped with a trace.

use crate::output::{OutputParams, OutputStage};
use crate::source::SoundSource;
use hecs::Entity;
use kira::effect::filter::{FilterBuilder, FilterHandle, FilterMode};
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle};
use kira::track::{TrackBuilder, TrackHandle};
use kira::{
    AudioManager, AudioManagerSettings, Decibels, DefaultBackend, ResourceLimitReached, Tween,
};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Errors from output setup and sound loading
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("audio backend failed to start: {0}")]
    Backend(#[from] kira::backend::cpal::Error),
    #[error("sound track limit reached")]
    TrackLimit(#[from] ResourceLimitReached),
    #[error("failed to load sound {path}: {source}")]
    Asset {
        path: PathBuf,
        #[source]
        source: kira::sound::FromFileError,
    },
    #[error("failed to start playback: {0}")]
    Playback(String),
}

struct SourceChannel {
    track: TrackHandle,
    filter: FilterHandle,
    playing: Option<StaticSoundHandle>,
}

/// [`OutputStage`] that actually plays audio
pub struct KiraOutput {
    manager: AudioManager<DefaultBackend>,
    channels: HashMap<Entity, SourceChannel>,
    sound_root: PathBuf,
}

impl KiraOutput {
    /// Start the audio backend; `sound_root` prefixes every asset path
    pub fn new(sound_root: impl Into<PathBuf>) -> Result<Self, OutputError> {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())?;
        Ok(Self {
            manager,
            channels: HashMap::new(),
            sound_root: sound_root.into(),
        })
    }

    /// Create the source's track and start its clip when configured to
    ///
    /// Safe to call again for an already bound source; the existing track
    /// is kept.
    pub fn bind_source(&mut self, entity: Entity, source: &SoundSource) -> Result<(), OutputError> {
        if !self.channels.contains_key(&entity) {
            let mut builder = TrackBuilder::new();
            let filter = builder.add_effect(
                FilterBuilder::new()
                    .mode(FilterMode::LowPass)
                    .cutoff(crate::graph::MAX_CUTOFF_HZ as f64),
            );
            let track = self.manager.add_sub_track(builder)?;
            self.channels.insert(
                entity,
                SourceChannel {
                    track,
                    filter,
                    playing: None,
                },
            );
            debug!(source = ?entity, "bound output channel");
        }

        if let (Some(name), true) = (&source.sound, source.autoplay) {
            self.play_source(entity, name, source.looped)?;
        }
        Ok(())
    }

    /// Load a clip and play it on the source's track
    pub fn play_source(
        &mut self,
        entity: Entity,
        name: &str,
        looped: bool,
    ) -> Result<(), OutputError> {
        let Some(channel) = self.channels.get_mut(&entity) else {
            return Err(OutputError::Playback(format!(
                "source {entity:?} has no bound channel"
            )));
        };

        let path = self.sound_root.join(name);
        let mut data = StaticSoundData::from_file(&path).map_err(|source| OutputError::Asset {
            path: path.clone(),
            source,
        })?;
        if looped {
            data = data.loop_region(0.0..);
        }

        let handle = channel
            .track
            .play(data)
            .map_err(|e| OutputError::Playback(e.to_string()))?;
        channel.playing = Some(handle);
        debug!(source = ?entity, sound = name, looped, "playback started");
        Ok(())
    }

    /// Fade a source's clip out and stop it
    pub fn stop_source(&mut self, entity: Entity) {
        if let Some(channel) = self.channels.get_mut(&entity) {
            if let Some(mut handle) = channel.playing.take() {
                handle.stop(Tween::default());
            }
        }
    }
}

impl OutputStage for KiraOutput {
    fn apply(&mut self, source: Entity, params: OutputParams) {
        let Some(channel) = self.channels.get_mut(&source) else {
            trace!(source = ?source, "parameter write for unbound source dropped");
            return;
        };
        channel
            .track
            .set_volume(amplitude_to_decibels(params.gain), Tween::default());
        channel
            .filter
            .set_cutoff(params.low_pass_cutoff_hz as f64, Tween::default());
    }

    fn remove(&mut self, source: Entity) {
        if let Some(mut channel) = self.channels.remove(&source) {
            if let Some(mut handle) = channel.playing.take() {
                handle.stop(Tween::default());
            }
            debug!(source = ?source, "released output channel");
        }
    }

    fn play_cue(&mut self, name: &str) {
        let path = self.sound_root.join(name);
        match StaticSoundData::from_file(&path) {
            Ok(data) => {
                if let Err(e) = self.manager.play(data) {
                    warn!(cue = name, "cue playback failed: {e}");
                }
            }
            Err(e) => warn!(cue = name, "cue load failed: {e}"),
        }
    }
}

/// Convert a linear [0, 1] gain to kira's decibel volume
///
/// Gains at or under 0.001 map to the backend's silence floor instead of
/// running log10 off toward negative infinity.
fn amplitude_to_decibels(gain: f32) -> Decibels {
    if gain <= 0.001 {
        Decibels::SILENCE
    } else {
        Decibels(20.0 * gain.log10())
    }
}
