//! Configuration types for the simulator

use crate::occlusion::{OcclusionDriver, ProximityOccluder};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Configuration for asset paths
#[derive(Debug, Clone)]
pub struct AssetConfig {
    /// Root directory for all assets
    pub asset_root: PathBuf,
    /// Directory name for scene files (relative to asset_root)
    pub scenes_dir: String,
    /// Directory name for sound clips (relative to asset_root)
    pub sounds_dir: String,
}

impl AssetConfig {
    pub fn new(asset_root: PathBuf, scenes_dir: String, sounds_dir: String) -> Self {
        debug!(
            asset_root = ?asset_root,
            scenes_dir = scenes_dir,
            sounds_dir = sounds_dir,
            "Creating new AssetConfig"
        );
        Self {
            asset_root,
            scenes_dir,
            sounds_dir,
        }
    }

    /// Get the full path to a scene file
    pub fn scene_path(&self, name: &str) -> PathBuf {
        // Validate name to prevent path traversal attacks
        if name.contains("..") || name.contains("/") || name.contains("\\") {
            panic!("Invalid scene name: {name}");
        }
        self.asset_root
            .join(&self.scenes_dir)
            .join(format!("{name}.json"))
    }

    /// The directory sound clips load from
    pub fn sound_root(&self) -> PathBuf {
        self.asset_root.join(&self.sounds_dir)
    }

    /// Check if the asset directories exist
    pub fn validate(&self) -> Result<(), std::io::Error> {
        let scenes_path = self.asset_root.join(&self.scenes_dir);
        let sounds_path = self.sound_root();

        if !self.asset_root.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Asset root directory not found: {:?}", self.asset_root),
            ));
        }

        if !scenes_path.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Scenes directory not found: {scenes_path:?}"),
            ));
        }

        if !sounds_path.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Sounds directory not found: {sounds_path:?}"),
            ));
        }

        Ok(())
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            scenes_dir: "scenes".to_string(),
            sounds_dir: "sounds".to_string(),
        }
    }
}

/// Errors from loading or validating a tuning file
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("tuning file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tuning JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Host-level occlusion tuning
///
/// Scene records can still override per source; this sets the defaults a
/// host hands to sources spawned outside a scene file.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub graph: OcclusionDriver,
    pub proximity: ProximityOccluder,
}

impl Tuning {
    /// Load tuning from a JSON file and validate it
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning: Tuning = serde_json::from_str(&json)?;
        tuning.validate()?;
        info!(path = ?path, "tuning loaded");
        Ok(tuning)
    }

    /// Reject values that would stall or destabilize the update loop
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.graph.update_interval <= 0.0 || self.proximity.update_interval <= 0.0 {
            return Err(TuningError::Invalid(
                "update_interval must be positive".to_string(),
            ));
        }
        if self.graph.smooth_rate <= 0.0 || self.proximity.smooth_rate <= 0.0 {
            return Err(TuningError::Invalid(
                "smooth_rate must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.graph.facing_weight)
            || !(0.0..=1.0).contains(&self.proximity.facing_weight)
        {
            return Err(TuningError::Invalid(
                "facing_weight must be within [0, 1]".to_string(),
            ));
        }
        if self.graph.facing_range <= 0.0 {
            return Err(TuningError::Invalid(
                "facing_range must be positive".to_string(),
            ));
        }
        if self.proximity.search_radius <= 0.0 {
            return Err(TuningError::Invalid(
                "search_radius must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
