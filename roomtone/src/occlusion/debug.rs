//! Debug polylines for resolved acoustic routes
//!
//! Produces data only; overlays and log sinks decide how to draw it. A
//! routed source yields listener → portal → … → source segments with the
//! occlusion accumulated up to each segment; an unrouted source yields the
//! direct segment carrying its current target strength.

use crate::graph::rooms::RoomGraph;
use crate::occlusion::system::SourceState;
use glam::Vec3;

/// One segment of a route visualization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteDebugLine {
    pub start: Vec3,
    pub end: Vec3,
    /// 0.0 clear through 1.0 fully muffled at this segment
    pub strength: f32,
}

/// Build the debug polyline for one driven source
pub fn route_debug_lines(
    graph: &RoomGraph,
    listener_position: Vec3,
    source_position: Vec3,
    state: &SourceState,
) -> Vec<RouteDebugLine> {
    let Some(route) = state.route() else {
        return vec![RouteDebugLine {
            start: listener_position,
            end: source_position,
            strength: 1.0 - state.target().volume,
        }];
    };

    let mut lines = Vec::with_capacity(route.len() + 1);
    let mut cursor = listener_position;
    let mut accumulated = 1.0f32;

    for &portal_id in &route.portals {
        let Some(portal) = graph.portal(portal_id) else {
            continue;
        };
        lines.push(RouteDebugLine {
            start: cursor,
            end: portal.position,
            strength: 1.0 - accumulated,
        });
        accumulated *= portal.material.settings().volume;
        cursor = portal.position;
    }

    lines.push(RouteDebugLine {
        start: cursor,
        end: source_position,
        strength: (1.0 - accumulated).clamp(0.0, 1.0),
    });

    lines
}
