//! Door state driving portals and blocker geometry
//!
//! A [`Door`] owns one portal and optionally one blocker entity. Scripts
//! flip the `open` flag; [`door_update_system`] reconciles the flag into
//! queued portal commands, the blocker's occluder state and a one-shot
//! cue. The very first reconcile after spawn is silent so loading a scene
//! with closed doors does not play a round of slams.

use crate::graph::{PortalCommand, PortalCommandQueue, PortalId, PortalMaterial};
use crate::output::OutputStage;
use crate::spatial::Occluder;
use hecs::{Entity, World};
use tracing::{debug, warn};

/// Openable connection between two rooms
#[derive(Debug, Clone)]
pub struct Door {
    /// Portal this door drives
    pub portal: PortalId,
    /// Solid that blocks sight while the door is closed
    pub blocker: Option<Entity>,
    /// Desired state; the update system applies it
    pub open: bool,
    pub open_cue: Option<String>,
    pub close_cue: Option<String>,
    /// Last state pushed to the graph, `None` before the first reconcile
    applied: Option<bool>,
}

impl Door {
    pub fn new(portal: PortalId) -> Self {
        Self {
            portal,
            blocker: None,
            open: false,
            open_cue: None,
            close_cue: None,
            applied: None,
        }
    }

    pub fn with_blocker(mut self, blocker: Entity) -> Self {
        self.blocker = Some(blocker);
        self
    }

    pub fn with_open(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    pub fn with_cues(
        mut self,
        open_cue: Option<String>,
        close_cue: Option<String>,
    ) -> Self {
        self.open_cue = open_cue;
        self.close_cue = close_cue;
        self
    }

    /// Material the portal should carry for the current state
    pub fn material(&self) -> PortalMaterial {
        if self.open {
            PortalMaterial::DoorOpen
        } else {
            PortalMaterial::DoorClosed
        }
    }
}

/// Flip a door's desired state; a no-op for entities without a [`Door`]
pub fn toggle_door(world: &mut World, door: Entity) {
    if let Ok(mut d) = world.get::<&mut Door>(door) {
        d.open = !d.open;
    }
}

/// Set a door's desired state; a no-op for entities without a [`Door`]
pub fn set_door_open(world: &mut World, door: Entity, open: bool) {
    if let Ok(mut d) = world.get::<&mut Door>(door) {
        d.open = open;
    }
}

/// Reconcile door flags into portal commands, blockers and cues
///
/// Runs once per frame before the command queue is drained. Doors whose
/// flag already matches the applied state do nothing, so repeated calls
/// are free.
pub fn door_update_system(
    world: &mut World,
    commands: &mut PortalCommandQueue,
    output: &mut dyn OutputStage,
) {
    let mut blocker_updates: Vec<(Entity, bool)> = Vec::new();
    let mut cues: Vec<String> = Vec::new();

    for (entity, door) in world.query_mut::<&mut Door>() {
        if door.applied == Some(door.open) {
            continue;
        }
        let first_apply = door.applied.is_none();

        commands.push(PortalCommand::SetEnabled {
            portal: door.portal,
            enabled: true,
        });
        commands.push(PortalCommand::SetMaterial {
            portal: door.portal,
            material: door.material(),
        });

        if let Some(blocker) = door.blocker {
            blocker_updates.push((blocker, !door.open));
        }

        if !first_apply {
            let cue = if door.open {
                door.open_cue.as_ref()
            } else {
                door.close_cue.as_ref()
            };
            if let Some(cue) = cue {
                cues.push(cue.clone());
            }
        }

        debug!(door = ?entity, open = door.open, portal = %door.portal, "door state applied");
        door.applied = Some(door.open);
    }

    for (blocker, enabled) in blocker_updates {
        match world.get::<&mut Occluder>(blocker) {
            Ok(mut occluder) => occluder.enabled = enabled,
            Err(_) => warn!(blocker = ?blocker, "door blocker has no occluder"),
        }
    }

    for cue in cues {
        output.play_cue(&cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Portal, RoomGraph};
    use crate::output::MemoryOutput;
    use crate::spatial::Aabb;
    use crate::transform::Transform;
    use glam::Vec3;

    fn doored_scene() -> (World, RoomGraph, Entity, Entity) {
        let mut world = World::new();
        let a = world.spawn((Transform::default(),));
        let b = world.spawn((Transform::default(),));
        let mut graph = RoomGraph::new();
        graph.register_room(a);
        graph.register_room(b);
        let portal = graph
            .add_portal(Portal::new(a, b, PortalMaterial::Wall, Vec3::ZERO))
            .unwrap();

        let blocker = world.spawn((
            Occluder::new(Aabb::from_half_extents(Vec3::ONE)),
            Transform::default(),
        ));
        let door = world.spawn((Door::new(portal)
            .with_blocker(blocker)
            .with_cues(Some("door_open.ogg".into()), Some("door_close.ogg".into())),));
        (world, graph, door, blocker)
    }

    #[test]
    fn first_reconcile_is_silent() {
        let (mut world, mut graph, _door, blocker) = doored_scene();
        let mut queue = PortalCommandQueue::new();
        let mut output = MemoryOutput::new();

        door_update_system(&mut world, &mut queue, &mut output);
        queue.apply(&mut graph);

        assert!(output.cues().is_empty());
        let portal = graph.portals().next().unwrap().1;
        assert_eq!(portal.material, PortalMaterial::DoorClosed);
        assert!(portal.enabled);
        assert!(world.get::<&Occluder>(blocker).unwrap().enabled);
    }

    #[test]
    fn opening_plays_cue_and_clears_blocker() {
        let (mut world, mut graph, door, blocker) = doored_scene();
        let mut queue = PortalCommandQueue::new();
        let mut output = MemoryOutput::new();

        door_update_system(&mut world, &mut queue, &mut output);
        queue.apply(&mut graph);

        toggle_door(&mut world, door);
        door_update_system(&mut world, &mut queue, &mut output);
        queue.apply(&mut graph);

        assert_eq!(output.cues(), &["door_open.ogg".to_string()]);
        let portal = graph.portals().next().unwrap().1;
        assert_eq!(portal.material, PortalMaterial::DoorOpen);
        assert!(!world.get::<&Occluder>(blocker).unwrap().enabled);
    }

    #[test]
    fn closing_again_plays_the_close_cue() {
        let (mut world, mut graph, door, blocker) = doored_scene();
        let mut queue = PortalCommandQueue::new();
        let mut output = MemoryOutput::new();

        door_update_system(&mut world, &mut queue, &mut output);
        set_door_open(&mut world, door, true);
        door_update_system(&mut world, &mut queue, &mut output);
        set_door_open(&mut world, door, false);
        door_update_system(&mut world, &mut queue, &mut output);
        queue.apply(&mut graph);

        assert_eq!(
            output.cues(),
            &["door_open.ogg".to_string(), "door_close.ogg".to_string()]
        );
        assert_eq!(
            graph.portals().next().unwrap().1.material,
            PortalMaterial::DoorClosed
        );
        assert!(world.get::<&Occluder>(blocker).unwrap().enabled);
    }

    #[test]
    fn matching_state_pushes_nothing() {
        let (mut world, mut graph, _door, _blocker) = doored_scene();
        let mut queue = PortalCommandQueue::new();
        let mut output = MemoryOutput::new();

        door_update_system(&mut world, &mut queue, &mut output);
        queue.apply(&mut graph);

        door_update_system(&mut world, &mut queue, &mut output);
        assert!(queue.is_empty());
        assert!(output.cues().is_empty());
    }

    #[test]
    fn missing_blocker_does_not_stall_the_door() {
        let (mut world, mut graph, door, blocker) = doored_scene();
        world.despawn(blocker).unwrap();
        let mut queue = PortalCommandQueue::new();
        let mut output = MemoryOutput::new();

        door_update_system(&mut world, &mut queue, &mut output);
        toggle_door(&mut world, door);
        door_update_system(&mut world, &mut queue, &mut output);
        queue.apply(&mut graph);

        assert_eq!(
            graph.portals().next().unwrap().1.material,
            PortalMaterial::DoorOpen
        );
    }
}
