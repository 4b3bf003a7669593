//! Shortest acoustic path search over the room graph
//!
//! Dijkstra with a linear-scan frontier; room counts sit in the tens, so a
//! binary heap buys nothing. Edge weight is the portal material's traversal
//! cost, which makes the cheapest route the most acoustically open one.

use crate::graph::rooms::{PortalId, RoomGraph};
use glam::Vec3;
use hecs::Entity;
use std::collections::HashMap;
use tracing::trace;

/// Resolved route from a start room to a goal room
#[derive(Debug, Clone)]
pub struct AcousticPath {
    /// Portals crossed, in traversal order
    pub portals: Vec<PortalId>,
    /// Sum of traversal costs along the route
    pub cost: f32,
    /// World position of the first portal crossed, for facing geometry
    pub first_portal_position: Vec3,
}

impl AcousticPath {
    pub fn len(&self) -> usize {
        self.portals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portals.is_empty()
    }
}

/// Find the minimum-cost portal sequence between two rooms
///
/// Returns `None` when no route exists under the currently enabled
/// portals, when either room is unknown, or when start and goal are the
/// same room; callers treat every `None` the same way and fall back to the
/// wall preset. Ties on distance resolve to the first room discovered and
/// the first portal registered, so results are reproducible for a fixed
/// registration order.
pub fn find_acoustic_path(
    graph: &RoomGraph,
    start: Entity,
    goal: Entity,
) -> Option<AcousticPath> {
    if !graph.contains_room(start) || !graph.contains_room(goal) {
        trace!(?start, ?goal, "path query against unknown room");
        return None;
    }

    let mut dist: HashMap<Entity, f32> = HashMap::new();
    let mut prev: HashMap<Entity, (PortalId, Entity)> = HashMap::new();
    let mut open: Vec<Entity> = Vec::new();

    dist.insert(start, 0.0);
    open.push(start);

    while !open.is_empty() {
        // First strict minimum wins, keeping discovery order on ties
        let mut best = 0;
        for (i, room) in open.iter().enumerate() {
            if dist[room] < dist[&open[best]] {
                best = i;
            }
        }
        let current = open.remove(best);

        if current == goal {
            break;
        }

        let current_dist = dist[&current];
        for (portal_id, portal) in graph.neighbors(current) {
            let Some(next) = portal.other_room(current) else {
                continue;
            };
            let candidate = current_dist + portal.material.traversal_cost();
            let improved = dist.get(&next).map_or(true, |&d| candidate < d);
            if improved {
                dist.insert(next, candidate);
                prev.insert(next, (portal_id, current));
                if !open.contains(&next) {
                    open.push(next);
                }
            }
        }
    }

    let cost = *dist.get(&goal)?;

    // Walk predecessors back to the start
    let mut portals = Vec::new();
    let mut cursor = goal;
    while cursor != start {
        let (portal_id, previous) = *prev.get(&cursor)?;
        portals.push(portal_id);
        cursor = previous;
    }
    portals.reverse();

    // A found distance with nothing to traverse means start == goal;
    // that case is the caller's same-room branch, not a path
    if portals.is_empty() {
        return None;
    }

    let first_portal_position = graph.portal(portals[0])?.position;

    Some(AcousticPath {
        portals,
        cost,
        first_portal_position,
    })
}
