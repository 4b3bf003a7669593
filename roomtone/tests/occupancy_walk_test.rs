//! Room tracking and target changes while the listener walks the scene

use roomtone::prelude::*;
use tracing::info;

/// Two rooms with a gap of unclaimed space between them and a solid wall
/// in the gap. The source sits in room B.
struct Scene {
    world: World,
    graph: RoomGraph,
    listener: Entity,
    source: Entity,
    room_a: Entity,
    room_b: Entity,
}

fn build_scene() -> Scene {
    let mut world = World::new();
    let mut graph = RoomGraph::new();

    let volume = RoomVolume::new(Aabb::from_half_extents(Vec3::new(3.0, 3.0, 3.0)));
    let room_a = world.spawn((volume, Transform::from_position(Vec3::ZERO)));
    let room_b = world.spawn((volume, Transform::from_position(Vec3::new(10.0, 0.0, 0.0))));
    graph.register_room(room_a);
    graph.register_room(room_b);

    world.spawn((
        Occluder::new(Aabb::from_half_extents(Vec3::new(0.3, 3.0, 3.0))),
        Transform::from_position(Vec3::new(5.0, 0.0, 0.0)),
    ));
    graph
        .add_portal(Portal::new(
            room_a,
            room_b,
            PortalMaterial::Window,
            Vec3::new(5.0, 0.0, 0.0),
        ))
        .unwrap();

    let listener = world.spawn((
        Listener::default(),
        Transform::from_position(Vec3::ZERO),
        RoomTracker::default(),
    ));
    let source = world.spawn((
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
        listener,
        source,
        room_a,
        room_b,
    }
}

/// Move the listener, then run one frame long enough to force a recompute
fn step_at(scene: &mut Scene, state: &mut OcclusionState, output: &mut MemoryOutput, x: f32) {
    scene
        .world
        .get::<&mut Transform>(scene.listener)
        .unwrap()
        .position = Vec3::new(x, 0.0, 0.0);
    occupancy_update_system(&mut scene.world);
    occlusion_update_system(&scene.world, &scene.graph, &WorldOccluders, state, output, 0.1);
}

#[test]
fn walking_between_rooms_moves_tracker_and_target() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    let mut scene = build_scene();
    let mut state = OcclusionState::new();
    let mut output = MemoryOutput::new();

    // In room A: no sight, so the route through the window portal decides
    step_at(&mut scene, &mut state, &mut output, 0.0);
    {
        let tracker = scene.world.get::<&RoomTracker>(scene.listener).unwrap();
        assert_eq!(tracker.current_room(), Some(scene.room_a));
    }
    assert_eq!(
        state.source_state(scene.source).unwrap().target(),
        PortalMaterial::Window.settings()
    );
    info!("room A: window preset, as routed");

    // In the gap: tracked by neither room, graph cannot help
    step_at(&mut scene, &mut state, &mut output, 4.0);
    {
        let tracker = scene.world.get::<&RoomTracker>(scene.listener).unwrap();
        assert_eq!(
            tracker.current_room(),
            None,
            "gap between rooms should clear the tracker"
        );
    }
    assert_eq!(
        state.source_state(scene.source).unwrap().target(),
        OcclusionSettings::wall_fallback()
    );
    info!("gap: wall fallback");

    // Into room B, right next to the source: sight wins
    step_at(&mut scene, &mut state, &mut output, 9.0);
    {
        let tracker = scene.world.get::<&RoomTracker>(scene.listener).unwrap();
        assert_eq!(tracker.current_room(), Some(scene.room_b));
    }
    assert_eq!(
        state.source_state(scene.source).unwrap().target(),
        OcclusionSettings::CLEAR
    );
    info!("room B: clear");

    // Back out to the gap again; the tracker must drop room B cleanly
    step_at(&mut scene, &mut state, &mut output, 4.0);
    {
        let tracker = scene.world.get::<&RoomTracker>(scene.listener).unwrap();
        assert_eq!(tracker.current_room(), None);
    }
}
