//! Listener component and pose extraction

use crate::transform::Transform;
use glam::Vec3;
use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

/// Marks the entity whose ears the simulation runs for
///
/// Exactly one listener should be active at a time; with several, the
/// first active one found wins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Listener {
    pub active: bool,
}

impl Default for Listener {
    fn default() -> Self {
        Self { active: true }
    }
}

/// Snapshot of the listener taken once per update pass
#[derive(Debug, Clone, Copy)]
pub struct ListenerPose {
    pub entity: Entity,
    pub position: Vec3,
    pub forward: Vec3,
}

impl ListenerPose {
    pub fn from_transform(entity: Entity, transform: &Transform) -> Self {
        Self {
            entity,
            position: transform.position,
            forward: transform.forward(),
        }
    }
}

/// Find the first active listener in the world
pub fn find_active_listener(world: &World) -> Option<ListenerPose> {
    world
        .query::<(&Listener, &Transform)>()
        .iter()
        .find(|(_, (listener, _))| listener.active)
        .map(|(entity, (_, transform))| ListenerPose::from_transform(entity, transform))
}
