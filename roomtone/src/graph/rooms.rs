//! Room and portal registry
//!
//! Rooms are world entities carrying a [`RoomVolume`]; the graph itself is
//! a resource owned by the host and passed into systems by reference.
//! Incidence lists keep stable insertion order so equal-cost path
//! tie-breaks stay reproducible for a given registration order.

use crate::graph::material::PortalMaterial;
use crate::spatial::bounds::Aabb;
use crate::transform::Transform;
use glam::Vec3;
use hecs::Entity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

/// Trigger volume marking one acoustically distinct area
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoomVolume {
    /// Local-space bounds of the room
    pub bounds: Aabb,
}

impl RoomVolume {
    pub fn new(bounds: Aabb) -> Self {
        Self { bounds }
    }

    /// Whether a world-space point lies inside this room's volume
    pub fn contains(&self, transform: &Transform, point: Vec3) -> bool {
        self.bounds.to_world(transform).contains_point(point)
    }
}

/// Stable handle to a portal inside a [`RoomGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortalId(u32);

impl PortalId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for PortalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "portal#{}", self.0)
    }
}

/// Acoustic connection between two rooms
#[derive(Debug, Clone)]
pub struct Portal {
    pub room_a: Entity,
    pub room_b: Entity,
    pub material: PortalMaterial,
    pub enabled: bool,
    /// World position of the opening, used for facing and proximity checks
    pub position: Vec3,
}

impl Portal {
    pub fn new(room_a: Entity, room_b: Entity, material: PortalMaterial, position: Vec3) -> Self {
        Self {
            room_a,
            room_b,
            material,
            enabled: true,
            position,
        }
    }

    /// The opposite endpoint, or `None` when `room` is not an endpoint
    pub fn other_room(&self, room: Entity) -> Option<Entity> {
        if room == self.room_a {
            Some(self.room_b)
        } else if room == self.room_b {
            Some(self.room_a)
        } else {
            None
        }
    }
}

/// Errors from graph construction and mutation
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("room {0:?} is not registered in the graph")]
    UnknownRoom(Entity),
    #[error("portal endpoints must be two different rooms")]
    SelfLoop,
    #[error("{0} does not exist")]
    UnknownPortal(PortalId),
}

/// The room/portal graph, immutable during a frame's update pass
///
/// Runtime mutation happens through [`set_portal_enabled`] and
/// [`set_portal_material`], normally via the [`PortalCommandQueue`] drained
/// between update passes.
///
/// [`set_portal_enabled`]: RoomGraph::set_portal_enabled
/// [`set_portal_material`]: RoomGraph::set_portal_material
#[derive(Debug, Default)]
pub struct RoomGraph {
    rooms: Vec<Entity>,
    portals: Vec<Portal>,
    incidence: HashMap<Entity, Vec<PortalId>>,
}

impl RoomGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a room entity; repeated registration is a no-op
    pub fn register_room(&mut self, room: Entity) {
        if !self.incidence.contains_key(&room) {
            self.rooms.push(room);
            self.incidence.insert(room, Vec::new());
        }
    }

    pub fn contains_room(&self, room: Entity) -> bool {
        self.incidence.contains_key(&room)
    }

    /// Registered rooms in registration order
    pub fn rooms(&self) -> &[Entity] {
        &self.rooms
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn portal_count(&self) -> usize {
        self.portals.len()
    }

    /// Add a portal between two registered rooms
    ///
    /// Rejects endpoints that were never registered and degenerate
    /// self-loops.
    pub fn add_portal(&mut self, portal: Portal) -> Result<PortalId, GraphError> {
        if portal.room_a == portal.room_b {
            return Err(GraphError::SelfLoop);
        }
        if !self.contains_room(portal.room_a) {
            return Err(GraphError::UnknownRoom(portal.room_a));
        }
        if !self.contains_room(portal.room_b) {
            return Err(GraphError::UnknownRoom(portal.room_b));
        }

        let id = PortalId(self.portals.len() as u32);
        // Incidence entries exist for both rooms after the checks above
        if let Some(list) = self.incidence.get_mut(&portal.room_a) {
            list.push(id);
        }
        if let Some(list) = self.incidence.get_mut(&portal.room_b) {
            list.push(id);
        }
        self.portals.push(portal);
        Ok(id)
    }

    pub fn portal(&self, id: PortalId) -> Option<&Portal> {
        self.portals.get(id.index())
    }

    /// All portals with their ids, in insertion order
    pub fn portals(&self) -> impl Iterator<Item = (PortalId, &Portal)> {
        self.portals
            .iter()
            .enumerate()
            .map(|(i, p)| (PortalId(i as u32), p))
    }

    /// Enabled portals incident to a room, in insertion order
    ///
    /// Unknown rooms yield an empty iterator rather than an error; a
    /// roomless query is an expected state for entities between volumes.
    pub fn neighbors(&self, room: Entity) -> impl Iterator<Item = (PortalId, &Portal)> {
        self.incidence
            .get(&room)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(|&id| {
                self.portals
                    .get(id.index())
                    .filter(|p| p.enabled)
                    .map(|p| (id, p))
            })
    }

    pub fn set_portal_enabled(&mut self, id: PortalId, enabled: bool) -> Result<(), GraphError> {
        let portal = self
            .portals
            .get_mut(id.index())
            .ok_or(GraphError::UnknownPortal(id))?;
        portal.enabled = enabled;
        Ok(())
    }

    pub fn set_portal_material(
        &mut self,
        id: PortalId,
        material: PortalMaterial,
    ) -> Result<(), GraphError> {
        let portal = self
            .portals
            .get_mut(id.index())
            .ok_or(GraphError::UnknownPortal(id))?;
        portal.material = material;
        Ok(())
    }
}

/// Deferred graph mutation
#[derive(Debug, Clone, Copy)]
pub enum PortalCommand {
    SetEnabled { portal: PortalId, enabled: bool },
    SetMaterial {
        portal: PortalId,
        material: PortalMaterial,
    },
}

/// Queue of graph mutations applied between update passes
///
/// Door toggles and script events push here at any point in a frame; the
/// host drains the queue right before the occlusion systems run, so a
/// recompute never observes a half-applied change.
#[derive(Debug, Default)]
pub struct PortalCommandQueue {
    commands: Vec<PortalCommand>,
}

impl PortalCommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: PortalCommand) {
        self.commands.push(command);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drain every queued command into the graph, in push order
    ///
    /// Commands against portals that no longer exist are dropped with a
    /// warning; one bad command never blocks the rest.
    pub fn apply(&mut self, graph: &mut RoomGraph) {
        for command in self.commands.drain(..) {
            let result = match command {
                PortalCommand::SetEnabled { portal, enabled } => {
                    graph.set_portal_enabled(portal, enabled)
                }
                PortalCommand::SetMaterial { portal, material } => {
                    graph.set_portal_material(portal, material)
                }
            };
            if let Err(err) = result {
                warn!("dropping portal command: {err}");
            }
        }
    }
}
