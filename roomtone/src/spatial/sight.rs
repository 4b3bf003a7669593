//! Line-of-sight queries against occluder geometry
//!
//! Room volumes are triggers, not geometry, so only entities carrying an
//! [`Occluder`] can block a sight ray. The [`SightQuery`] trait is the seam
//! the occlusion systems consume; `WorldOccluders` is the shipped
//! implementation and tests substitute scripted ones.

use crate::spatial::bounds::Aabb;
use crate::spatial::ray::{ray_aabb_intersection, Ray, RayHit};
use crate::transform::Transform;
use glam::Vec3;
use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

/// Solid geometry that blocks sound rays
///
/// Door blockers keep this component permanently and flip `enabled` as the
/// door opens and closes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Occluder {
    /// Local-space bounds of the solid
    pub bounds: Aabb,
    /// Disabled occluders are ignored by every sweep
    pub enabled: bool,
}

impl Occluder {
    pub fn new(bounds: Aabb) -> Self {
        Self {
            bounds,
            enabled: true,
        }
    }
}

/// Sweep all enabled occluders for the closest hit along a ray
pub fn raycast_occluders(
    world: &World,
    ray: Ray,
    max_distance: f32,
    exclude: &[Entity],
) -> Option<RayHit> {
    let mut closest: Option<(Entity, f32)> = None;

    for (entity, (occluder, transform)) in world.query::<(&Occluder, &Transform)>().iter() {
        if !occluder.enabled || exclude.contains(&entity) {
            continue;
        }

        let world_bounds = occluder.bounds.to_world(transform);
        if let Some(distance) = ray_aabb_intersection(&ray, &world_bounds, max_distance) {
            if closest.map_or(true, |(_, d)| distance < d) {
                closest = Some((entity, distance));
            }
        }
    }

    closest.map(|(entity, distance)| RayHit {
        entity,
        distance,
        point: ray.origin + ray.direction * distance,
    })
}

/// Two-point visibility query
pub trait SightQuery {
    /// Whether an unobstructed segment exists between `from` and `to`.
    ///
    /// Entities in `exclude` never block the segment; callers pass the
    /// listener and source so their own bodies are ignored.
    fn has_line_of_sight(&self, world: &World, from: Vec3, to: Vec3, exclude: &[Entity]) -> bool;
}

/// [`SightQuery`] backed by the world's occluder entities
#[derive(Debug, Default, Clone, Copy)]
pub struct WorldOccluders;

impl SightQuery for WorldOccluders {
    fn has_line_of_sight(&self, world: &World, from: Vec3, to: Vec3, exclude: &[Entity]) -> bool {
        let delta = to - from;
        let distance = delta.length();
        if distance <= 0.01 {
            // Within a centimeter counts as the same point
            return true;
        }

        let ray = Ray {
            origin: from,
            direction: delta / distance,
        };
        raycast_occluders(world, ray, distance, exclude).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_between() -> (World, Entity) {
        let mut world = World::new();
        let wall = world.spawn((
            Occluder::new(Aabb::from_half_extents(Vec3::new(0.1, 2.0, 2.0))),
            Transform::from_position(Vec3::new(5.0, 0.0, 0.0)),
        ));
        (world, wall)
    }

    #[test]
    fn wall_blocks_sight() {
        let (world, _) = wall_between();
        let sight = WorldOccluders;
        assert!(!sight.has_line_of_sight(
            &world,
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            &[]
        ));
    }

    #[test]
    fn sight_clears_past_the_wall_edge() {
        let (world, _) = wall_between();
        let sight = WorldOccluders;
        assert!(sight.has_line_of_sight(
            &world,
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::new(10.0, 5.0, 0.0),
            &[]
        ));
    }

    #[test]
    fn disabled_occluder_is_transparent() {
        let (mut world, wall) = wall_between();
        world.get::<&mut Occluder>(wall).unwrap().enabled = false;
        let sight = WorldOccluders;
        assert!(sight.has_line_of_sight(
            &world,
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            &[]
        ));
    }

    #[test]
    fn excluded_entity_does_not_block() {
        let (world, wall) = wall_between();
        let sight = WorldOccluders;
        assert!(sight.has_line_of_sight(
            &world,
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            &[wall]
        ));
    }

    #[test]
    fn coincident_points_see_each_other() {
        let (world, _) = wall_between();
        let sight = WorldOccluders;
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!(sight.has_line_of_sight(&world, p, p, &[]));
    }

    #[test]
    fn occluder_beyond_target_does_not_block() {
        let (world, _) = wall_between();
        let sight = WorldOccluders;
        // Segment ends well before the wall at x = 5
        assert!(sight.has_line_of_sight(
            &world,
            Vec3::ZERO,
            Vec3::new(3.0, 0.0, 0.0),
            &[]
        ));
    }
}
