//! Door open/close driving sight, portal material and cues end to end

use roomtone::prelude::*;
use tracing::info;

const DT: f32 = 1.0 / 60.0;

struct Scene {
    world: World,
    graph: RoomGraph,
    queue: PortalCommandQueue,
    source: Entity,
    door: Entity,
    blocker: Entity,
}

/// Two rooms joined by a doorway: the wall leaves a hole at z = 0 and the
/// door's blocker fills it while closed.
fn build_scene() -> Scene {
    let mut world = World::new();
    let mut graph = RoomGraph::new();

    let volume = RoomVolume::new(Aabb::from_half_extents(Vec3::new(4.0, 3.0, 4.0)));
    let room_a = world.spawn((volume, Transform::from_position(Vec3::ZERO)));
    let room_b = world.spawn((volume, Transform::from_position(Vec3::new(10.0, 0.0, 0.0))));
    graph.register_room(room_a);
    graph.register_room(room_b);

    // Wall segments either side of the opening
    let segment = Occluder::new(Aabb::from_half_extents(Vec3::new(0.25, 3.0, 1.5)));
    world.spawn((segment, Transform::from_position(Vec3::new(5.0, 0.0, -2.5))));
    world.spawn((segment, Transform::from_position(Vec3::new(5.0, 0.0, 2.5))));

    let blocker = world.spawn((
        Occluder::new(Aabb::from_half_extents(Vec3::new(0.25, 3.0, 1.0))),
        Transform::from_position(Vec3::new(5.0, 0.0, 0.0)),
    ));

    let portal = graph
        .add_portal(Portal::new(
            room_a,
            room_b,
            PortalMaterial::DoorClosed,
            Vec3::new(5.0, 0.0, 0.0),
        ))
        .unwrap();

    let door = world.spawn((Door::new(portal)
        .with_blocker(blocker)
        .with_cues(Some("door_open.ogg".into()), Some("door_close.ogg".into())),));

    world.spawn((
        Listener::default(),
        Transform::from_position(Vec3::ZERO),
        RoomTracker::default(),
    ));
    let source = world.spawn((
        SoundSource::new("radio.ogg"),
        OcclusionDriver {
            facing_weight: 0.0,
            ..Default::default()
        },
        Transform::from_position(Vec3::new(10.0, 0.0, 0.0)),
        RoomTracker::default(),
    ));

    Scene {
        world,
        graph,
        queue: PortalCommandQueue::new(),
        source,
        door,
        blocker,
    }
}

fn run_frames(scene: &mut Scene, state: &mut OcclusionState, output: &mut MemoryOutput, n: usize) {
    let sight = WorldOccluders;
    for _ in 0..n {
        door_update_system(&mut scene.world, &mut scene.queue, output);
        scene.queue.apply(&mut scene.graph);
        occupancy_update_system(&mut scene.world);
        occlusion_update_system(&scene.world, &scene.graph, &sight, state, output, DT);
    }
}

#[test]
fn door_toggle_swings_the_occlusion() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    let mut scene = build_scene();
    let mut state = OcclusionState::new();
    let mut output = MemoryOutput::new();

    // Closed door: sight is blocked, the route crosses the closed portal
    run_frames(&mut scene, &mut state, &mut output, 150);

    assert!(output.cues().is_empty(), "initial door apply must be silent");
    let closed = PortalMaterial::DoorClosed.settings();
    let params = output.last_params(scene.source).unwrap();
    info!(gain = params.gain, "settled with the door closed");
    assert!(
        (params.gain - closed.volume).abs() < 0.01,
        "gain {} should match the closed-door preset",
        params.gain
    );
    assert!(
        (params.low_pass_cutoff_hz - closed.cutoff_hz).abs() < 40.0,
        "cutoff {} should match the closed-door preset",
        params.low_pass_cutoff_hz
    );

    // Open it: blocker drops out of the sight sweep, sound pours through
    toggle_door(&mut scene.world, scene.door);
    run_frames(&mut scene, &mut state, &mut output, 150);

    assert_eq!(output.cues(), &["door_open.ogg".to_string()]);
    assert!(
        !scene
            .world
            .get::<&Occluder>(scene.blocker)
            .unwrap()
            .enabled,
        "open door must disable its blocker"
    );
    let portal = scene.graph.portals().next().unwrap().1;
    assert_eq!(portal.material, PortalMaterial::DoorOpen);

    let params = output.last_params(scene.source).unwrap();
    info!(gain = params.gain, "settled with the door open");
    assert!(
        params.gain > 0.95,
        "open doorway grants line of sight, gain {} should be near full",
        params.gain
    );
    assert_eq!(
        state.source_state(scene.source).unwrap().target(),
        OcclusionSettings::CLEAR
    );

    // And close it again
    toggle_door(&mut scene.world, scene.door);
    run_frames(&mut scene, &mut state, &mut output, 150);

    assert_eq!(
        output.cues(),
        &["door_open.ogg".to_string(), "door_close.ogg".to_string()]
    );
    let params = output.last_params(scene.source).unwrap();
    assert!(
        (params.gain - closed.volume).abs() < 0.01,
        "gain {} should fall back to the closed-door preset",
        params.gain
    );
}
