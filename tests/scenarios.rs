//! End-to-end runs through the public API

use bounce_sim::render::{MeshRenderer, Renderer};
use bounce_sim::settings::{BodySpec, Preset, ShapeSpec};
use bounce_sim::sim::{Body, EventKind, Shape, StopReason};
use bounce_sim::{CollisionSystem, RunLimits, SimConfig};
use glam::DVec2;

fn circle(id: usize, pos: DVec2, vel: DVec2) -> Body {
    Body::builder(id, Shape::Circle { radius: 5.0 })
        .position(pos)
        .velocity(vel)
        .arena(DVec2::new(200.0, 100.0))
        .build()
        .unwrap()
}

/// Counts draws and cancels after a fixed number of frames
#[derive(Default)]
struct CountingRenderer {
    draws: usize,
    frames: usize,
    cancel_after: usize,
}

impl Renderer for CountingRenderer {
    fn draw_body(&mut self, _body: &Body) {
        self.draws += 1;
    }

    fn poll_cancelled(&mut self) -> bool {
        self.frames >= self.cancel_after
    }

    fn end_frame(&mut self, _time: f64) {
        self.frames += 1;
    }
}

#[test]
fn head_on_pair_swaps_velocities() {
    let bodies = vec![
        circle(0, DVec2::new(0.0, 50.0), DVec2::new(10.0, 0.0)),
        circle(1, DVec2::new(100.0, 50.0), DVec2::new(-10.0, 0.0)),
    ];
    let mut system = CollisionSystem::new(bodies, Vec::new(), 1000.0).unwrap();

    assert_eq!(system.step().unwrap().unwrap().kind, EventKind::Heartbeat);
    let record = system.step().unwrap().unwrap();
    assert_eq!(record.kind, EventKind::Pair { a: 0, b: 1 });
    assert!((record.time - 4.5).abs() < 1e-12);

    let [a, b] = system.bodies() else {
        panic!("expected two bodies");
    };
    assert!((a.vel - DVec2::new(-10.0, 0.0)).length() < 1e-12);
    assert!((b.vel - DVec2::new(10.0, 0.0)).length() < 1e-12);
    assert_eq!(a.collision_count(), 1);
    assert_eq!(b.collision_count(), 1);
}

#[test]
fn lone_body_reaches_far_wall() {
    let bodies = vec![circle(0, DVec2::new(0.0, 50.0), DVec2::new(5.0, 0.0))];
    let mut system = CollisionSystem::new(bodies, Vec::new(), 1000.0).unwrap();
    system.set_record_trace(true);

    system.advance_to(100.0).unwrap();
    let trace = system.trace().unwrap();
    assert_eq!(trace[0].kind, EventKind::Heartbeat);
    assert_eq!(trace[1].kind, EventKind::VerticalWall { body: 0 });
    assert!((trace[1].time - 39.0).abs() < 1e-12);
    assert!(
        trace
            .iter()
            .all(|r| !matches!(r.kind, EventKind::HorizontalWall { .. }))
    );
    // 39 -> right wall, then 38 back to the left wall at 77
    assert_eq!(trace.len(), 3);
    assert!((trace[2].time - 77.0).abs() < 1e-9);
}

#[test]
fn slow_body_stays_inside_past_the_horizon() {
    let body = Body::builder(0, Shape::Circle { radius: 5.0 })
        .position(DVec2::new(250.0, 250.0))
        .velocity(DVec2::new(0.1, 0.0))
        .arena(DVec2::new(500.0, 500.0))
        .build()
        .unwrap();
    let mut system = CollisionSystem::new(vec![body], Vec::new(), 1000.0).unwrap();

    // Right wall at t = 2450, then back across the arena
    system.advance_to(5000.0).unwrap();
    let body = &system.bodies()[0];
    assert_eq!(body.collision_count(), 1);
    assert!((body.vel.x + 0.1).abs() < 1e-12);
    assert!((body.pos.x - 240.0).abs() < 1e-6);

    for t in (1..=20).map(|k| 5000.0 + 1000.0 * k as f64) {
        system.advance_to(t).unwrap();
        let x = system.bodies()[0].pos.x;
        assert!((5.0 - 1e-6..=495.0 + 1e-6).contains(&x), "x = {x} at t = {t}");
    }
}

#[test]
fn stale_event_changes_nothing() {
    // Body 1 would hit the left wall at t = 9.5, but meets body 0 first
    let bodies = vec![
        circle(0, DVec2::new(0.0, 50.0), DVec2::new(10.0, 0.0)),
        circle(1, DVec2::new(100.0, 50.0), DVec2::new(-10.0, 0.0)),
    ];
    let mut system = CollisionSystem::new(bodies, Vec::new(), 1000.0).unwrap();
    system.set_record_trace(true);
    system.advance_to(9.0).unwrap();

    let before: Vec<Body> = system.bodies().to_vec();
    let discarded = system.events_discarded();
    system.advance_to(9.5).unwrap();

    assert_eq!(system.events_discarded(), discarded + 1);
    for (old, new) in before.iter().zip(system.bodies()) {
        assert_eq!(old.vel, new.vel);
        assert_eq!(old.collision_count(), new.collision_count());
    }
    assert!(
        system
            .trace()
            .unwrap()
            .iter()
            .all(|r| (r.time - 9.5).abs() > 1e-9)
    );
}

#[test]
fn same_seed_replays_same_trace() {
    let config = SimConfig {
        seed: 1234,
        record_trace: true,
        ..Preset::Mixed.config()
    };
    let run = |config: &SimConfig| {
        let mut system = CollisionSystem::from_config(config).unwrap();
        system
            .run(&mut CountingRenderer { cancel_after: usize::MAX, ..Default::default() }, RunLimits::events(500))
            .unwrap();
        system.take_trace()
    };

    let first = run(&config);
    let second = run(&config);
    assert_eq!(first.len(), 500);
    assert_eq!(first, second);
    assert!(first.windows(2).all(|w| w[0].time <= w[1].time));
}

#[test]
fn equal_mass_circles_conserve_energy() {
    let config = SimConfig {
        seed: 99,
        ..Preset::Balls.config()
    };
    let mut system = CollisionSystem::from_config(&config).unwrap();
    let energy = system.kinetic_energy();
    assert!(energy > 0.0);

    system
        .run(&mut MeshRenderer::default(), RunLimits::events(2_000))
        .unwrap();
    assert!((system.kinetic_energy() - energy).abs() <= 1e-6 * energy);

    for body in system.bodies() {
        let half = body.shape.half_extents();
        assert!(body.pos.x >= half.x - 1e-6 && body.pos.x <= config.arena.width - half.x + 1e-6);
        assert!(body.pos.y >= half.y - 1e-6 && body.pos.y <= config.arena.height - half.y + 1e-6);
    }
}

#[test]
fn pinned_obstacles_never_move() {
    let config = Preset::Obstacles.config();
    let mut system = CollisionSystem::from_config(&config).unwrap();
    let pinned: Vec<Body> = system
        .bodies()
        .iter()
        .filter(|b| b.immovable)
        .cloned()
        .collect();
    assert_eq!(pinned.len(), 3);

    system
        .run(&mut MeshRenderer::default(), RunLimits::until(20.0))
        .unwrap();
    for before in &pinned {
        let after = &system.bodies()[before.id];
        assert_eq!(after.pos, before.pos);
        assert_eq!(after.vel, DVec2::ZERO);
        assert_eq!(after.collision_count(), 0);
    }
}

#[test]
fn mover_bounces_off_pinned_body() {
    let config = SimConfig {
        arena: bounce_sim::settings::ArenaConfig { width: 200.0, height: 100.0 },
        random: None,
        bodies: vec![
            BodySpec {
                x: Some(20.0),
                y: Some(50.0),
                vx: Some(10.0),
                vy: Some(0.0),
                ..Default::default()
            },
            BodySpec {
                x: Some(100.0),
                y: Some(50.0),
                shape: ShapeSpec::Rect { width: Some(10.0), height: Some(40.0) },
                immovable: true,
                ..Default::default()
            },
        ],
        ..Default::default()
    };
    let mut system = CollisionSystem::from_config(&config).unwrap();
    system.advance_to(8.0).unwrap();

    // Contact at x = 90 after 7 time units, full reflection
    let mover = &system.bodies()[0];
    assert!((mover.vel - DVec2::new(-10.0, 0.0)).length() < 1e-9);
    assert!((mover.pos.x - 80.0).abs() < 1e-9);
    assert_eq!(system.bodies()[1].vel, DVec2::ZERO);
}

#[test]
fn renderer_sees_every_body_and_can_cancel() {
    let mut system = CollisionSystem::from_config(&SimConfig::default()).unwrap();
    let mut renderer = CountingRenderer {
        cancel_after: 7,
        ..Default::default()
    };
    let summary = system.run(&mut renderer, RunLimits::default()).unwrap();

    assert_eq!(summary.reason, StopReason::Cancelled);
    assert_eq!(summary.events, 7);
    assert_eq!(renderer.draws, 7 * system.bodies().len());
}

#[test]
fn config_file_roundtrip_drives_same_run() {
    let dir = std::env::temp_dir().join(format!("bounce-sim-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.json");

    let config = SimConfig {
        seed: 5,
        record_trace: true,
        ..Preset::Balls.config()
    };
    config.save(&path).unwrap();
    let loaded = SimConfig::load(&path).unwrap();
    std::fs::remove_dir_all(&dir).unwrap();

    let mut a = CollisionSystem::from_config(&config).unwrap();
    let mut b = CollisionSystem::from_config(&loaded).unwrap();
    a.advance_to(3.0).unwrap();
    b.advance_to(3.0).unwrap();
    assert_eq!(a.events_processed(), b.events_processed());
    assert_eq!(
        a.trace().map(|t| t.iter().map(|r| r.kind).collect::<Vec<_>>()),
        b.trace().map(|t| t.iter().map(|r| r.kind).collect::<Vec<_>>())
    );
}
