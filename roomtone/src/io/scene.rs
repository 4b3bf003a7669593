//! Scene serialization and loading
//!
//! A [`SceneDoc`] is the on-disk description of an acoustic scene: rooms,
//! occluders, portals, doors, sources and the listener, cross-referenced
//! by name. [`SceneDoc::instantiate`] spawns the entities and builds the
//! [`RoomGraph`] in one pass, handing back name-to-handle maps so the host
//! can script against what it loaded.

use crate::doors::Door;
use crate::graph::{GraphError, Portal, PortalId, PortalMaterial, RoomGraph, RoomVolume};
use crate::listener::Listener;
use crate::occlusion::{OcclusionDriver, ProximityOccluder};
use crate::occupancy::RoomTracker;
use crate::source::SoundSource;
use crate::spatial::{Aabb, Occluder};
use crate::transform::{Name, Transform};
use glam::Vec3;
use hecs::{Entity, World};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Errors from scene parsing and instantiation
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("scene file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed scene JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate scene name {0:?}")]
    DuplicateName(String),
    #[error("portal {portal:?} references unknown room {room:?}")]
    UnknownRoom { portal: String, room: String },
    #[error("door references unknown portal {0:?}")]
    UnknownPortal(String),
    #[error("door references unknown occluder {0:?}")]
    UnknownOccluder(String),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// One room volume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomRecord {
    pub name: String,
    pub position: Vec3,
    pub half_extents: Vec3,
}

/// One solid occluder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccluderRecord {
    pub name: String,
    pub position: Vec3,
    pub half_extents: Vec3,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// One portal between two named rooms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalRecord {
    pub name: String,
    pub rooms: [String; 2],
    pub material: PortalMaterial,
    pub position: Vec3,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// One door driving a named portal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorRecord {
    pub portal: String,
    /// Occluder that physically blocks the opening while closed
    #[serde(default)]
    pub blocker: Option<String>,
    #[serde(default)]
    pub open: bool,
    #[serde(default)]
    pub open_cue: Option<String>,
    #[serde(default)]
    pub close_cue: Option<String>,
}

/// One sound source
///
/// Carries a proximity strategy when `proximity` is present, otherwise a
/// graph driver (explicit or default).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
    pub name: String,
    pub position: Vec3,
    #[serde(flatten)]
    pub sound: SoundSource,
    #[serde(default)]
    pub driver: Option<OcclusionDriver>,
    #[serde(default)]
    pub proximity: Option<ProximityOccluder>,
}

/// The listener's starting pose
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerRecord {
    pub position: Vec3,
    /// Point the listener initially faces
    #[serde(default)]
    pub look_at: Option<Vec3>,
}

/// On-disk description of an acoustic scene
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDoc {
    #[serde(default)]
    pub rooms: Vec<RoomRecord>,
    #[serde(default)]
    pub occluders: Vec<OccluderRecord>,
    #[serde(default)]
    pub portals: Vec<PortalRecord>,
    #[serde(default)]
    pub doors: Vec<DoorRecord>,
    #[serde(default)]
    pub sources: Vec<SourceRecord>,
    #[serde(default)]
    pub listener: Option<ListenerRecord>,
}

fn default_true() -> bool {
    true
}

/// Name-to-handle maps produced by [`SceneDoc::instantiate`]
#[derive(Debug)]
pub struct SceneHandles {
    pub graph: RoomGraph,
    pub rooms: HashMap<String, Entity>,
    pub occluders: HashMap<String, Entity>,
    pub portals: HashMap<String, PortalId>,
    pub sources: HashMap<String, Entity>,
    pub doors: Vec<Entity>,
    pub listener: Option<Entity>,
}

impl SceneDoc {
    /// Spawn every record into the world and build the room graph
    ///
    /// Bad cross-references are hard errors rather than skips; a scene
    /// with a dangling name is authored wrong, and half a scene is worse
    /// to debug than none.
    pub fn instantiate(&self, world: &mut World) -> Result<SceneHandles, SceneError> {
        info!(
            rooms = self.rooms.len(),
            portals = self.portals.len(),
            sources = self.sources.len(),
            "instantiating scene"
        );

        let mut graph = RoomGraph::new();
        let mut rooms = HashMap::new();
        let mut occluders = HashMap::new();
        let mut portals = HashMap::new();
        let mut sources = HashMap::new();
        let mut doors = Vec::new();

        for record in &self.rooms {
            let entity = world.spawn((
                Name(record.name.clone()),
                Transform::from_position(record.position),
                RoomVolume::new(Aabb::from_half_extents(record.half_extents)),
            ));
            graph.register_room(entity);
            if rooms.insert(record.name.clone(), entity).is_some() {
                return Err(SceneError::DuplicateName(record.name.clone()));
            }
            debug!(room = %record.name, entity = ?entity, "spawned room");
        }

        for record in &self.occluders {
            let mut occluder = Occluder::new(Aabb::from_half_extents(record.half_extents));
            occluder.enabled = record.enabled;
            let entity = world.spawn((
                Name(record.name.clone()),
                Transform::from_position(record.position),
                occluder,
            ));
            if occluders.insert(record.name.clone(), entity).is_some() {
                return Err(SceneError::DuplicateName(record.name.clone()));
            }
        }

        for record in &self.portals {
            let a = *rooms
                .get(&record.rooms[0])
                .ok_or_else(|| SceneError::UnknownRoom {
                    portal: record.name.clone(),
                    room: record.rooms[0].clone(),
                })?;
            let b = *rooms
                .get(&record.rooms[1])
                .ok_or_else(|| SceneError::UnknownRoom {
                    portal: record.name.clone(),
                    room: record.rooms[1].clone(),
                })?;
            let mut portal = Portal::new(a, b, record.material, record.position);
            portal.enabled = record.enabled;
            let id = graph.add_portal(portal)?;
            if portals.insert(record.name.clone(), id).is_some() {
                return Err(SceneError::DuplicateName(record.name.clone()));
            }
            debug!(portal = %record.name, id = %id, "added portal");
        }

        for record in &self.doors {
            let portal = *portals
                .get(&record.portal)
                .ok_or_else(|| SceneError::UnknownPortal(record.portal.clone()))?;
            let mut door = Door::new(portal)
                .with_open(record.open)
                .with_cues(record.open_cue.clone(), record.close_cue.clone());
            if let Some(blocker_name) = &record.blocker {
                let blocker = *occluders
                    .get(blocker_name)
                    .ok_or_else(|| SceneError::UnknownOccluder(blocker_name.clone()))?;
                door = door.with_blocker(blocker);
            }
            doors.push(world.spawn((door,)));
        }

        for record in &self.sources {
            let entity = if let Some(proximity) = record.proximity {
                if record.driver.is_some() {
                    warn!(
                        source = %record.name,
                        "source has both strategies, keeping proximity"
                    );
                }
                world.spawn((
                    Name(record.name.clone()),
                    Transform::from_position(record.position),
                    record.sound.clone(),
                    proximity,
                ))
            } else {
                world.spawn((
                    Name(record.name.clone()),
                    Transform::from_position(record.position),
                    record.sound.clone(),
                    record.driver.unwrap_or_default(),
                    RoomTracker::default(),
                ))
            };
            if sources.insert(record.name.clone(), entity).is_some() {
                return Err(SceneError::DuplicateName(record.name.clone()));
            }
        }

        let listener = self.listener.as_ref().map(|record| {
            let mut transform = Transform::from_position(record.position);
            if let Some(target) = record.look_at {
                transform = transform.looking_at(target, Vec3::Y);
            }
            world.spawn((
                Name("listener".to_string()),
                transform,
                Listener::default(),
                RoomTracker::default(),
            ))
        });

        info!("scene instantiation complete");
        Ok(SceneHandles {
            graph,
            rooms,
            occluders,
            portals,
            sources,
            doors,
            listener,
        })
    }

    /// Save this scene to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!(path = ?path, "scene saved");
        Ok(())
    }

    /// Load a scene from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let doc = serde_json::from_str(&json)?;
        info!(path = ?path, "scene loaded");
        Ok(doc)
    }
}
