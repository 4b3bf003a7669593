//! Per-frame occlusion update systems
//!
//! One system per strategy component. Both share the same rhythm: gate on
//! collaborators, recompute targets when the per-source timer fires, then
//! smooth and write to the output stage every tick. Failure of any
//! collaborator skips the affected source for that tick and touches
//! nothing else.

use crate::graph::material::OcclusionSettings;
use crate::graph::path::{find_acoustic_path, AcousticPath};
use crate::graph::rooms::{PortalId, RoomGraph};
use crate::listener::{find_active_listener, ListenerPose};
use crate::occlusion::combine::{apply_facing, combine_path, facing_alignment, facing_factor};
use crate::occlusion::driver::{OcclusionDriver, ProximityOccluder};
use crate::occlusion::smoothing::Smoothed;
use crate::occupancy::RoomTracker;
use crate::output::{OutputParams, OutputStage};
use crate::source::SoundSource;
use crate::spatial::sight::SightQuery;
use crate::transform::Transform;
use glam::Vec3;
use hecs::{Entity, World};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Runtime state for one driven source
#[derive(Debug, Clone)]
pub struct SourceState {
    timer: f32,
    volume: Smoothed,
    cutoff_hz: Smoothed,
    last_target: OcclusionSettings,
    last_route: Option<AcousticPath>,
}

impl SourceState {
    fn new() -> Self {
        Self {
            // Infinite timer makes the first update recompute immediately
            timer: f32::INFINITY,
            volume: Smoothed::new(OcclusionSettings::CLEAR.volume),
            cutoff_hz: Smoothed::new(OcclusionSettings::CLEAR.cutoff_hz),
            last_target: OcclusionSettings::CLEAR,
            last_route: None,
        }
    }

    /// Smoothed volume multiplier currently audible
    pub fn volume(&self) -> f32 {
        self.volume.current()
    }

    /// Smoothed cutoff currently audible
    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz.current()
    }

    /// Target of the most recent recompute
    pub fn target(&self) -> OcclusionSettings {
        self.last_target
    }

    /// Route resolved by the most recent recompute, if any
    pub fn route(&self) -> Option<&AcousticPath> {
        self.last_route.as_ref()
    }
}

/// Smoothing and route state for every driven source, keyed by entity
///
/// Owned by the host next to the world and passed into the update systems;
/// entries appear lazily and are dropped when their entity despawns.
#[derive(Debug, Default)]
pub struct OcclusionState {
    sources: HashMap<Entity, SourceState>,
}

impl OcclusionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source_state(&self, entity: Entity) -> Option<&SourceState> {
        self.sources.get(&entity)
    }

    fn state_mut(&mut self, entity: Entity) -> &mut SourceState {
        self.sources.entry(entity).or_insert_with(SourceState::new)
    }

    fn retain_live(&mut self, world: &World) {
        self.sources.retain(|&entity, _| world.contains(entity));
    }
}

/// Resolve the graph strategy's target for one source
///
/// Order mirrors the recompute contract: line of sight wins outright,
/// missing or equal rooms fall back to the wall preset with no facing,
/// and only a real resolved route earns the facing boost.
pub fn resolve_graph_target(
    world: &World,
    graph: &RoomGraph,
    sight: &dyn SightQuery,
    listener: &ListenerPose,
    listener_room: Option<Entity>,
    source: Entity,
    source_position: Vec3,
    source_room: Option<Entity>,
    driver: &OcclusionDriver,
) -> (OcclusionSettings, Option<AcousticPath>) {
    let exclude = [listener.entity, source];

    if sight.has_line_of_sight(world, listener.position, source_position, &exclude) {
        return (OcclusionSettings::CLEAR, None);
    }

    let (Some(listener_room), Some(source_room)) = (listener_room, source_room) else {
        return (OcclusionSettings::wall_fallback(), None);
    };

    if listener_room == source_room {
        // Same room without sight still means something solid in between
        return (OcclusionSettings::wall_fallback(), None);
    }

    match find_acoustic_path(graph, listener_room, source_room) {
        Some(path) => {
            let combined = combine_path(graph, &path);
            let facing = facing_factor(
                listener.position,
                listener.forward,
                path.first_portal_position,
                driver.facing_range,
            );
            let target = apply_facing(combined, facing, driver.facing_weight);
            (target, Some(path))
        }
        None => (OcclusionSettings::wall_fallback(), None),
    }
}

/// Resolve the proximity strategy's target for one source
///
/// Returns the winning portal so callers can trace the route; no winner
/// means the wall fallback with no facing.
pub fn resolve_proximity_target(
    world: &World,
    graph: &RoomGraph,
    sight: &dyn SightQuery,
    listener: &ListenerPose,
    source: Entity,
    source_position: Vec3,
    occluder: &ProximityOccluder,
) -> (OcclusionSettings, Option<PortalId>) {
    let exclude = [listener.entity, source];

    if sight.has_line_of_sight(world, listener.position, source_position, &exclude) {
        return (OcclusionSettings::CLEAR, None);
    }

    let radius_sq = occluder.search_radius * occluder.search_radius;
    let mut best: Option<(PortalId, f32, Vec3)> = None;

    for (id, portal) in graph.portals() {
        if !portal.enabled {
            continue;
        }
        let listener_dist_sq = portal.position.distance_squared(listener.position);
        if listener_dist_sq > radius_sq {
            continue;
        }
        if !sight.has_line_of_sight(world, listener.position, portal.position, &exclude) {
            continue;
        }
        if !sight.has_line_of_sight(world, source_position, portal.position, &exclude) {
            continue;
        }

        let score = listener_dist_sq + portal.position.distance_squared(source_position);
        if best.map_or(true, |(_, s, _)| score < s) {
            best = Some((id, score, portal.position));
        }
    }

    match best {
        Some((id, _, position)) => {
            let settings = graph
                .portal(id)
                .map(|p| p.material.settings())
                .unwrap_or_else(OcclusionSettings::wall_fallback);
            let facing = facing_alignment(listener.position, listener.forward, position);
            (apply_facing(settings, facing, occluder.facing_weight), Some(id))
        }
        None => (OcclusionSettings::wall_fallback(), None),
    }
}

/// Drive every source carrying an [`OcclusionDriver`]
///
/// Skips everything when no active listener exists and skips sources whose
/// occupancy is unbound; those sources stay frozen at their last smoothed
/// values.
pub fn occlusion_update_system(
    world: &World,
    graph: &RoomGraph,
    sight: &dyn SightQuery,
    state: &mut OcclusionState,
    output: &mut dyn OutputStage,
    dt: f32,
) {
    state.retain_live(world);

    let Some(listener) = find_active_listener(world) else {
        trace!("no active listener, occlusion update skipped");
        return;
    };
    let Ok(listener_tracker) = world.get::<&RoomTracker>(listener.entity) else {
        trace!("listener has no room tracker, occlusion update skipped");
        return;
    };
    let listener_room = listener_tracker.current_room();
    drop(listener_tracker);

    let sources: Vec<(Entity, OcclusionDriver, Vec3)> = world
        .query::<(&OcclusionDriver, &Transform)>()
        .iter()
        .map(|(entity, (driver, transform))| (entity, *driver, transform.position))
        .collect();

    for (entity, driver, source_position) in sources {
        let Ok(source_tracker) = world.get::<&RoomTracker>(entity) else {
            trace!(source = ?entity, "source has no room tracker, skipped");
            continue;
        };
        let source_room = source_tracker.current_room();
        drop(source_tracker);

        let st = state.state_mut(entity);
        st.timer += dt;
        if st.timer >= driver.update_interval {
            st.timer = 0.0;
            let (target, route) = resolve_graph_target(
                world,
                graph,
                sight,
                &listener,
                listener_room,
                entity,
                source_position,
                source_room,
                &driver,
            );
            st.volume.set_target(target.volume);
            st.cutoff_hz.set_target(target.cutoff_hz);
            st.last_target = target;
            st.last_route = route;
            debug!(
                source = ?entity,
                volume = target.volume,
                cutoff_hz = target.cutoff_hz,
                hops = st.last_route.as_ref().map_or(0, |p| p.len()),
                "occlusion target recomputed"
            );
        }

        smooth_and_apply(world, st, entity, driver.smooth_rate, dt, output);
    }
}

/// Drive every source carrying a [`ProximityOccluder`]
///
/// Occupancy-free by design; only needs a listener pose.
pub fn proximity_update_system(
    world: &World,
    graph: &RoomGraph,
    sight: &dyn SightQuery,
    state: &mut OcclusionState,
    output: &mut dyn OutputStage,
    dt: f32,
) {
    state.retain_live(world);

    let Some(listener) = find_active_listener(world) else {
        trace!("no active listener, proximity update skipped");
        return;
    };

    let sources: Vec<(Entity, ProximityOccluder, Vec3)> = world
        .query::<(&ProximityOccluder, &Transform)>()
        .iter()
        .map(|(entity, (occluder, transform))| (entity, *occluder, transform.position))
        .collect();

    for (entity, occluder, source_position) in sources {
        let st = state.state_mut(entity);
        st.timer += dt;
        if st.timer >= occluder.update_interval {
            st.timer = 0.0;
            let (target, winner) = resolve_proximity_target(
                world,
                graph,
                sight,
                &listener,
                entity,
                source_position,
                &occluder,
            );
            st.volume.set_target(target.volume);
            st.cutoff_hz.set_target(target.cutoff_hz);
            st.last_target = target;
            st.last_route = winner.and_then(|id| {
                graph.portal(id).map(|portal| AcousticPath {
                    portals: vec![id],
                    cost: portal.material.traversal_cost(),
                    first_portal_position: portal.position,
                })
            });
            debug!(
                source = ?entity,
                volume = target.volume,
                cutoff_hz = target.cutoff_hz,
                portal = ?winner,
                "proximity target recomputed"
            );
        }

        smooth_and_apply(world, st, entity, occluder.smooth_rate, dt, output);
    }
}

fn smooth_and_apply(
    world: &World,
    st: &mut SourceState,
    entity: Entity,
    smooth_rate: f32,
    dt: f32,
    output: &mut dyn OutputStage,
) {
    let volume = st.volume.advance(smooth_rate, dt);
    let cutoff_hz = st.cutoff_hz.advance(smooth_rate, dt);

    let base_volume = world
        .get::<&SoundSource>(entity)
        .map(|s| s.base_volume)
        .unwrap_or(1.0);

    output.apply(
        entity,
        OutputParams {
            gain: volume * base_volume,
            low_pass_cutoff_hz: cutoff_hz,
        },
    );
}
