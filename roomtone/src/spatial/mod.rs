//! Spatial queries backing occupancy and line-of-sight checks
//!
//! Pure geometry lives in `bounds` and `ray`; `sight` runs those tests
//! against the occluder entities in a world.

pub mod bounds;
pub mod ray;
pub mod sight;

pub use bounds::Aabb;
pub use ray::{ray_aabb_intersection, Ray, RayHit};
pub use sight::{raycast_occluders, Occluder, SightQuery, WorldOccluders};
