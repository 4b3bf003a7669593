//! Headless demo tour of the occlusion simulator
//!
//! Builds a three-room apartment, then runs a scripted twelve-second tour:
//! the hallway door opens at three seconds and closes again at eight,
//! while the loop logs what the listener would hear. Plays real audio when
//! a backend is available and falls back to a silent recorder otherwise.

use roomtone::io::{
    DoorRecord, ListenerRecord, OccluderRecord, PortalRecord, RoomRecord, SourceRecord,
};
use roomtone::output::KiraOutput;
use roomtone::prelude::*;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const TICK: Duration = Duration::from_millis(16);
const TOUR_SECONDS: f32 = 12.0;

fn main() {
    roomtone::init_logging();
    info!("starting occlusion sandbox");

    let mut world = World::new();
    let handles = demo_scene()
        .instantiate(&mut world)
        .expect("demo scene is well formed");
    let SceneHandles {
        mut graph,
        sources,
        doors,
        ..
    } = handles;

    let mut output = make_output(&world);
    let mut queue = PortalCommandQueue::new();
    let mut state = OcclusionState::new();
    let sight = WorldOccluders;

    let door = doors[0];
    let radio = sources["radio"];
    let fountain = sources["fountain"];

    let mut elapsed = 0.0f32;
    let mut last_log = 0.0f32;
    let mut last_tick = Instant::now();
    let mut door_opened = false;
    let mut door_closed = false;

    while elapsed < TOUR_SECONDS {
        let now = Instant::now();
        let dt = now.duration_since(last_tick).as_secs_f32().min(0.1);
        last_tick = now;
        elapsed += dt;

        if !door_opened && elapsed >= 3.0 {
            info!("opening the hallway door");
            set_door_open(&mut world, door, true);
            door_opened = true;
        }
        if !door_closed && elapsed >= 8.0 {
            info!("closing the hallway door");
            set_door_open(&mut world, door, false);
            door_closed = true;
        }

        door_update_system(&mut world, &mut queue, output.as_mut());
        queue.apply(&mut graph);
        occupancy_update_system(&mut world);
        occlusion_update_system(&world, &graph, &sight, &mut state, output.as_mut(), dt);
        proximity_update_system(&world, &graph, &sight, &mut state, output.as_mut(), dt);

        if elapsed - last_log >= 0.5 {
            last_log = elapsed;
            if let Some(st) = state.source_state(radio) {
                info!(
                    t = elapsed,
                    volume = st.volume(),
                    cutoff_hz = st.cutoff_hz(),
                    hops = st.route().map_or(0, |r| r.len()),
                    "radio"
                );
            }
            if let Some(st) = state.source_state(fountain) {
                info!(
                    t = elapsed,
                    volume = st.volume(),
                    cutoff_hz = st.cutoff_hz(),
                    "fountain"
                );
            }
        }

        std::thread::sleep(TICK);
    }

    info!("tour finished");
}

/// Start the real backend and bind every source, or run silent
fn make_output(world: &World) -> Box<dyn OutputStage> {
    let config = AssetConfig::default();
    match KiraOutput::new(config.sound_root()) {
        Ok(mut kira) => {
            for (entity, source) in world.query::<&SoundSource>().iter() {
                if let Err(e) = kira.bind_source(entity, source) {
                    warn!(source = ?entity, "source not bound: {e}");
                }
            }
            info!("audio backend running");
            Box::new(kira)
        }
        Err(e) => {
            warn!("audio backend unavailable ({e}), running silent");
            Box::new(MemoryOutput::new())
        }
    }
}

/// Lobby, hall and study in a row
///
/// The lobby-hall wall has a doorway with a closable leaf; the hall-study
/// wall is a glass pane with a window portal. The radio plays in the study
/// behind both, the fountain murmurs in the hall and is handled by the
/// proximity strategy.
fn demo_scene() -> SceneDoc {
    SceneDoc {
        rooms: vec![
            RoomRecord {
                name: "lobby".into(),
                position: Vec3::ZERO,
                half_extents: Vec3::new(4.0, 3.0, 4.0),
            },
            RoomRecord {
                name: "hall".into(),
                position: Vec3::new(10.0, 0.0, 0.0),
                half_extents: Vec3::new(4.0, 3.0, 4.0),
            },
            RoomRecord {
                name: "study".into(),
                position: Vec3::new(20.0, 0.0, 0.0),
                half_extents: Vec3::new(4.0, 3.0, 4.0),
            },
        ],
        occluders: vec![
            OccluderRecord {
                name: "hall_wall_south".into(),
                position: Vec3::new(5.0, 0.0, -2.5),
                half_extents: Vec3::new(0.25, 3.0, 1.5),
                enabled: true,
            },
            OccluderRecord {
                name: "hall_wall_north".into(),
                position: Vec3::new(5.0, 0.0, 2.5),
                half_extents: Vec3::new(0.25, 3.0, 1.5),
                enabled: true,
            },
            OccluderRecord {
                name: "hall_door_leaf".into(),
                position: Vec3::new(5.0, 0.0, 0.0),
                half_extents: Vec3::new(0.25, 3.0, 1.0),
                enabled: true,
            },
            OccluderRecord {
                name: "study_glass".into(),
                position: Vec3::new(15.0, 0.0, 0.0),
                half_extents: Vec3::new(0.25, 3.0, 4.0),
                enabled: true,
            },
        ],
        portals: vec![
            PortalRecord {
                name: "lobby_hall".into(),
                rooms: ["lobby".into(), "hall".into()],
                material: PortalMaterial::DoorClosed,
                position: Vec3::new(5.0, 0.0, 0.0),
                enabled: true,
            },
            PortalRecord {
                name: "hall_study".into(),
                rooms: ["hall".into(), "study".into()],
                material: PortalMaterial::Window,
                position: Vec3::new(15.0, 0.0, 0.0),
                enabled: true,
            },
        ],
        doors: vec![DoorRecord {
            portal: "lobby_hall".into(),
            blocker: Some("hall_door_leaf".into()),
            open: false,
            open_cue: Some("door_open.ogg".into()),
            close_cue: Some("door_close.ogg".into()),
        }],
        sources: vec![
            SourceRecord {
                name: "radio".into(),
                position: Vec3::new(20.0, 1.0, 0.0),
                sound: SoundSource::new("radio.ogg").with_base_volume(0.8),
                driver: Some(OcclusionDriver::default()),
                proximity: None,
            },
            SourceRecord {
                name: "fountain".into(),
                position: Vec3::new(10.0, 0.0, 0.0),
                sound: SoundSource::new("fountain.ogg"),
                driver: None,
                proximity: Some(ProximityOccluder::default()),
            },
        ],
        listener: Some(ListenerRecord {
            position: Vec3::ZERO,
            look_at: Some(Vec3::new(5.0, 0.0, 0.0)),
        }),
    }
}
