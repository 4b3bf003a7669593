//! Audio output stage
//!
//! The occlusion systems end every tick by writing a gain and a low-pass
//! cutoff per source; [`OutputStage`] is that boundary. `KiraOutput` is
//! the playback implementation, [`MemoryOutput`] records writes for tests
//! and headless runs.

pub mod kira;

use hecs::Entity;
use std::collections::HashMap;

pub use kira::{KiraOutput, OutputError};

/// Parameters written to the output stage for one source each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputParams {
    /// Final gain multiplier, occlusion times base volume
    pub gain: f32,
    /// Low-pass filter cutoff in hertz
    pub low_pass_cutoff_hz: f32,
}

/// Consumer of per-source gain and filter parameters
///
/// The simulation writes, never reads; implementations keep whatever
/// playback state they need behind this seam.
pub trait OutputStage {
    /// Write this tick's parameters for one source
    fn apply(&mut self, source: Entity, params: OutputParams);

    /// Forget a source and release anything held for it
    fn remove(&mut self, source: Entity);

    /// Fire a one-shot cue outside any source channel
    ///
    /// Used for doors opening and closing; implementations without
    /// playback ignore it.
    fn play_cue(&mut self, _name: &str) {}
}

/// Recording output stage with no playback
///
/// Keeps the latest parameters per source and every cue in order, which is
/// exactly what assertions and headless logging need.
#[derive(Debug, Default)]
pub struct MemoryOutput {
    params: HashMap<Entity, OutputParams>,
    cues: Vec<String>,
}

impl MemoryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest parameters written for a source, if any write happened
    pub fn last_params(&self, source: Entity) -> Option<OutputParams> {
        self.params.get(&source).copied()
    }

    /// Cues fired so far, in order
    pub fn cues(&self) -> &[String] {
        &self.cues
    }

    pub fn source_count(&self) -> usize {
        self.params.len()
    }
}

impl OutputStage for MemoryOutput {
    fn apply(&mut self, source: Entity, params: OutputParams) {
        self.params.insert(source, params);
    }

    fn remove(&mut self, source: Entity) {
        self.params.remove(&source);
    }

    fn play_cue(&mut self, name: &str) {
        self.cues.push(name.to_owned());
    }
}
