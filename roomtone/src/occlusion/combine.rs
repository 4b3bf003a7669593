//! Folding a portal path into one occlusion target
//!
//! Portals act as independent attenuators in series, so volume multiplies
//! down the path while the most restrictive cutoff wins outright. The
//! facing boost then pulls the result back toward the clear preset when
//! the listener is oriented at the acoustic opening.

use crate::graph::material::{OcclusionSettings, MAX_CUTOFF_HZ, MIN_CUTOFF_HZ};
use crate::graph::path::AcousticPath;
use crate::graph::rooms::RoomGraph;
use glam::Vec3;

/// Combined volume never drops below this, so no route ever goes fully
/// silent
pub const MIN_COMBINED_VOLUME: f32 = 0.05;

/// Fold a path's portals into a single settings pair
///
/// An empty path folds to the clear preset; the bounds hold for any path
/// length.
pub fn combine_path(graph: &RoomGraph, path: &AcousticPath) -> OcclusionSettings {
    let mut volume = 1.0f32;
    let mut cutoff = MAX_CUTOFF_HZ;

    for &id in &path.portals {
        // Path ids always come from this graph; a miss would mean the
        // path outlived a rebuild, which the per-tick recompute rules out
        let Some(portal) = graph.portal(id) else {
            continue;
        };
        let settings = portal.material.settings();
        volume *= settings.volume;
        cutoff = cutoff.min(settings.cutoff_hz);
    }

    OcclusionSettings {
        volume: volume.clamp(MIN_COMBINED_VOLUME, 1.0),
        cutoff_hz: cutoff.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ),
    }
}

/// Directional factor in [0, 1] toward a portal position
///
/// Full 3D distance gates the boost (hard zero beyond `facing_range`,
/// maximal when degenerate), then the alignment of the horizontal
/// projections scales linearly down to zero at the range edge.
pub fn facing_factor(
    listener_position: Vec3,
    listener_forward: Vec3,
    portal_position: Vec3,
    facing_range: f32,
) -> f32 {
    let to_portal = portal_position - listener_position;
    let distance = to_portal.length();
    if distance <= 0.01 {
        return 1.0;
    }
    if distance > facing_range {
        return 0.0;
    }

    let flat_to_portal = Vec3::new(to_portal.x, 0.0, to_portal.z).normalize_or_zero();
    let flat_forward = Vec3::new(listener_forward.x, 0.0, listener_forward.z).normalize_or_zero();

    let alignment = ((flat_forward.dot(flat_to_portal) + 1.0) * 0.5).clamp(0.0, 1.0);
    let distance_factor = 1.0 - (distance / facing_range).clamp(0.0, 1.0);

    alignment * distance_factor
}

/// Directional factor in [0, 1] toward a portal, with no distance gate
///
/// The proximity strategy's flavor: pure horizontal alignment, degenerate
/// geometry counts as full facing.
pub fn facing_alignment(
    listener_position: Vec3,
    listener_forward: Vec3,
    portal_position: Vec3,
) -> f32 {
    let to_portal = portal_position - listener_position;
    let flat_to_portal = Vec3::new(to_portal.x, 0.0, to_portal.z);
    if flat_to_portal.length_squared() < 0.0001 {
        return 1.0;
    }

    let flat_forward = Vec3::new(listener_forward.x, 0.0, listener_forward.z).normalize_or_zero();
    ((flat_forward.dot(flat_to_portal.normalize()) + 1.0) * 0.5).clamp(0.0, 1.0)
}

/// Blend occluded settings toward the clear preset by the facing boost
///
/// `facing01` of zero leaves the settings untouched; the final clamps keep
/// volume in [0, 1] and cutoff inside the filter range whatever the blend
/// produced.
pub fn apply_facing(occluded: OcclusionSettings, facing01: f32, weight: f32) -> OcclusionSettings {
    let mut volume = occluded.volume;
    let mut cutoff = occluded.cutoff_hz;

    if facing01 > 0.0 {
        let t = (weight * facing01).clamp(0.0, 1.0);
        volume += (OcclusionSettings::CLEAR.volume - volume) * t;
        cutoff += (OcclusionSettings::CLEAR.cutoff_hz - cutoff) * t;
    }

    OcclusionSettings {
        volume: volume.clamp(0.0, 1.0),
        cutoff_hz: cutoff.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ),
    }
}
