//! Ray intersection tests used by the sight service

use crate::spatial::bounds::Aabb;
use glam::Vec3;
use hecs::Entity;

/// Ray with a world-space origin and normalized direction
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Closest intersection found by an occluder sweep
#[derive(Debug, Clone)]
pub struct RayHit {
    /// Entity whose bounds were hit
    pub entity: Entity,
    /// Distance from the ray origin to the hit
    pub distance: f32,
    /// Hit point in world space
    pub point: Vec3,
}

/// Slab-method ray/AABB test
///
/// Returns the entry distance when the ray hits the box within
/// `max_distance`. Zero direction components map to infinite inverse so
/// axis-parallel rays stay well defined.
pub fn ray_aabb_intersection(ray: &Ray, aabb: &Aabb, max_distance: f32) -> Option<f32> {
    let inv_dir = Vec3::new(
        if ray.direction.x.abs() < f32::EPSILON {
            f32::INFINITY
        } else {
            1.0 / ray.direction.x
        },
        if ray.direction.y.abs() < f32::EPSILON {
            f32::INFINITY
        } else {
            1.0 / ray.direction.y
        },
        if ray.direction.z.abs() < f32::EPSILON {
            f32::INFINITY
        } else {
            1.0 / ray.direction.z
        },
    );

    let t1 = (aabb.min - ray.origin) * inv_dir;
    let t2 = (aabb.max - ray.origin) * inv_dir;

    let tmin = t1.min(t2);
    let tmax = t1.max(t2);

    let tmin = tmin.x.max(tmin.y).max(tmin.z).max(0.0);
    let tmax = tmax.x.min(tmax.y).min(tmax.z).min(max_distance);

    if tmin <= tmax {
        Some(tmin)
    } else {
        None
    }
}
