//! Room occupancy tracking
//!
//! Each moving entity that matters to occlusion (the listener, every
//! source) carries a [`RoomTracker`]. The tracker is written only through
//! its enter/exit methods; [`occupancy_update_system`] synthesizes those
//! events from point-in-volume tests so no external trigger engine is
//! required. Everything downstream must tolerate a roomless tracker, since
//! an entity can sit between volumes at any time.

use crate::graph::rooms::RoomVolume;
use crate::transform::Transform;
use hecs::{Entity, World};
use tracing::debug;

/// Which room volume currently contains an entity
#[derive(Debug, Clone, Default)]
pub struct RoomTracker {
    current: Option<Entity>,
    inside: Vec<Entity>,
}

impl RoomTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The room this entity is currently attributed to, if any
    pub fn current_room(&self) -> Option<Entity> {
        self.current
    }

    /// Volume-enter event: the entered room becomes current
    ///
    /// With overlapping volumes the most recent enter wins.
    pub fn entered_room(&mut self, room: Entity) {
        if !self.inside.contains(&room) {
            self.inside.push(room);
        }
        self.current = Some(room);
    }

    /// Volume-exit event: clears the current room only when it matches
    ///
    /// Leaving the current room while still inside another volume leaves
    /// the tracker roomless until the next enter event fires.
    pub fn exited_room(&mut self, room: Entity) {
        self.inside.retain(|&r| r != room);
        if self.current == Some(room) {
            self.current = None;
        }
    }

    /// Rooms whose volumes contain the entity right now
    pub fn containing_rooms(&self) -> &[Entity] {
        &self.inside
    }
}

/// Synthesize enter/exit events from room volume containment
///
/// Exits fire before enters, so an entity crossing directly from one room
/// to another ends the frame attributed to the room it moved into.
pub fn occupancy_update_system(world: &mut World) {
    // Snapshot room volumes first so the tracker query can borrow mutably
    let rooms: Vec<(Entity, crate::spatial::Aabb)> = world
        .query::<(&RoomVolume, &Transform)>()
        .iter()
        .map(|(entity, (volume, transform))| (entity, volume.bounds.to_world(transform)))
        .collect();

    for (entity, (tracker, transform)) in world.query_mut::<(&mut RoomTracker, &Transform)>() {
        let position = transform.position;

        let mut exits: Vec<Entity> = Vec::new();
        for &known in tracker.containing_rooms() {
            let still_inside = rooms
                .iter()
                .any(|&(room, bounds)| room == known && bounds.contains_point(position));
            if !still_inside {
                exits.push(known);
            }
        }

        let mut enters: Vec<Entity> = Vec::new();
        for &(room, bounds) in &rooms {
            if bounds.contains_point(position) && !tracker.containing_rooms().contains(&room) {
                enters.push(room);
            }
        }

        for room in exits {
            tracker.exited_room(room);
            debug!(entity = ?entity, room = ?room, "exited room");
        }
        for room in enters {
            tracker.entered_room(room);
            debug!(entity = ?entity, room = ?room, "entered room");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::Aabb;
    use glam::Vec3;

    #[test]
    fn enter_sets_current_room() {
        let mut world = World::new();
        let room = world.spawn(());
        let mut tracker = RoomTracker::new();

        tracker.entered_room(room);
        assert_eq!(tracker.current_room(), Some(room));
    }

    #[test]
    fn exit_clears_only_the_matching_room() {
        let mut world = World::new();
        let a = world.spawn(());
        let b = world.spawn(());
        let mut tracker = RoomTracker::new();

        tracker.entered_room(a);
        tracker.entered_room(b);
        assert_eq!(tracker.current_room(), Some(b));

        // Exiting the non-current room keeps the current one
        tracker.exited_room(a);
        assert_eq!(tracker.current_room(), Some(b));

        tracker.exited_room(b);
        assert_eq!(tracker.current_room(), None);
    }

    fn spawn_room(world: &mut World, center: Vec3) -> Entity {
        world.spawn((
            RoomVolume::new(Aabb::from_half_extents(Vec3::new(4.0, 3.0, 4.0))),
            Transform::from_position(center),
        ))
    }

    #[test]
    fn system_tracks_a_walk_between_rooms() {
        let mut world = World::new();
        let room_a = spawn_room(&mut world, Vec3::ZERO);
        let room_b = spawn_room(&mut world, Vec3::new(10.0, 0.0, 0.0));
        let walker = world.spawn((RoomTracker::new(), Transform::from_position(Vec3::ZERO)));

        occupancy_update_system(&mut world);
        assert_eq!(
            world.get::<&RoomTracker>(walker).unwrap().current_room(),
            Some(room_a)
        );

        // Step into the gap between volumes
        world.get::<&mut Transform>(walker).unwrap().position = Vec3::new(5.0, 0.0, 0.0);
        occupancy_update_system(&mut world);
        assert_eq!(
            world.get::<&RoomTracker>(walker).unwrap().current_room(),
            None
        );

        world.get::<&mut Transform>(walker).unwrap().position = Vec3::new(10.0, 0.0, 0.0);
        occupancy_update_system(&mut world);
        assert_eq!(
            world.get::<&RoomTracker>(walker).unwrap().current_room(),
            Some(room_b)
        );
    }

    #[test]
    fn direct_crossing_lands_in_the_new_room() {
        let mut world = World::new();
        let _room_a = spawn_room(&mut world, Vec3::ZERO);
        let room_b = spawn_room(&mut world, Vec3::new(6.0, 0.0, 0.0));
        let walker = world.spawn((
            RoomTracker::new(),
            Transform::from_position(Vec3::new(-2.0, 0.0, 0.0)),
        ));

        occupancy_update_system(&mut world);
        // Jump straight past the overlap in one frame
        world.get::<&mut Transform>(walker).unwrap().position = Vec3::new(8.0, 0.0, 0.0);
        occupancy_update_system(&mut world);

        assert_eq!(
            world.get::<&RoomTracker>(walker).unwrap().current_room(),
            Some(room_b)
        );
    }

    #[test]
    fn entities_without_trackers_are_ignored() {
        let mut world = World::new();
        spawn_room(&mut world, Vec3::ZERO);
        world.spawn((Transform::from_position(Vec3::ZERO),));

        // Just has to not panic or misattribute anything
        occupancy_update_system(&mut world);
    }
}
