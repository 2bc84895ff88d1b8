// Copyright 2025 Lars Brubaker
// End-to-end sweep scenarios with known visibility outcomes.

mod helpers;

use helpers::*;
use vision_sweep::{Circle, ClockwiseSweep, SweepConfig, TraceBoundary, WallId, WallSet};

#[test]
fn wall_across_circle_fully_occludes() {
    let scene = walls(&[50.0, -100.0, 50.0, 100.0]);
    let poly = sweep(SweepConfig::default().with_radius(100.0), p(0.0, 0.0), &scene);
    assert!(poly.is_closed());
    assert!(poly.is_clockwise());
    assert!(max_x(&poly) <= 50.0 + EPS, "max x {}", max_x(&poly));
    assert!(poly.contains_point(p(45.0, 0.0)));
    assert!(poly.contains_point(p(-90.0, 0.0)));
    assert!(!poly.contains_point(p(60.0, 0.0)));
}

#[test]
fn second_limited_wall_stops_the_view() {
    let mut scene = WallSet::new(canvas());
    scene.insert(limited_wall(0, p(50.0, -250.0), p(50.0, 250.0))).unwrap();
    scene.insert(limited_wall(1, p(70.0, -250.0), p(70.0, 250.0))).unwrap();
    let poly = sweep(SweepConfig::default().with_radius(200.0), p(0.0, 0.0), &scene);
    let reach = max_x(&poly);
    assert!((reach - 70.0).abs() <= EPS, "max x {reach}");
    // Seen through the first limited wall, stopped by the second.
    assert!(poly.contains_point(p(60.0, 0.0)));
    assert!(!poly.contains_point(p(80.0, 0.0)));
}

#[test]
fn one_limited_wall_is_seen_through() {
    let mut scene = WallSet::new(canvas());
    scene.insert(limited_wall(0, p(50.0, -250.0), p(50.0, 250.0))).unwrap();
    let poly = sweep(SweepConfig::default().with_radius(200.0), p(0.0, 0.0), &scene);
    assert!(poly.contains_point(p(150.0, 0.0)));
}

#[test]
fn sweep_is_idempotent() {
    let mut rng = Lcg(7);
    let mut scene = WallSet::new(canvas());
    for _ in 0..12 {
        let a = rng.point(400.0);
        let b = rng.point(400.0);
        scene.push(a, b).unwrap();
    }
    let sweeper = ClockwiseSweep::new(SweepConfig::default().with_radius(350.0)).unwrap();
    let first = sweeper.sweep(p(3.0, 7.0), &scene).unwrap();
    let second = sweeper.sweep(p(3.0, 7.0), &scene).unwrap();
    assert_eq!(first, second);
}

#[test]
fn result_stays_inside_the_circle() {
    let scene = walls(&[
        -200.0, -50.0, -120.0, 60.0, //
        30.0, 80.0, 140.0, 90.0, //
        100.0, -200.0, 160.0, -20.0,
    ]);
    let poly = sweep(SweepConfig::default().with_radius(250.0), p(0.0, 0.0), &scene);
    assert!(poly.is_closed());
    assert!(poly.is_clockwise());
    for q in poly.iter_points(false) {
        assert!(q.length() <= 250.0 + EPS, "{q:?} outside radius");
    }
}

#[test]
fn no_obstacles_gives_the_circle() {
    let scene = WallSet::new(canvas());
    let origin = p(10.0, -20.0);
    let cfg = SweepConfig::default().with_radius(120.0).with_density(48);
    let poly = sweep(cfg, origin, &scene);
    let circle = Circle::new(origin, 120.0).with_density(48).to_polygon();
    assert_eq!(poly.vertex_count(), circle.vertex_count());
    for (a, b) in poly.iter_points(false).zip(circle.iter_points(false)) {
        assert!(a.distance(b) < EPS, "{a:?} != {b:?}");
    }
}

#[test]
fn removing_a_wall_restores_the_view() {
    let mut scene = walls(&[50.0, -100.0, 50.0, 100.0]);
    let cfg = SweepConfig::default().with_radius(100.0);
    assert!(!sweep(cfg.clone(), p(0.0, 0.0), &scene).contains_point(p(80.0, 0.0)));
    scene.remove(WallId(0)).unwrap();
    assert!(sweep(cfg, p(0.0, 0.0), &scene).contains_point(p(80.0, 0.0)));
}

#[test]
fn sector_and_radius_combine() {
    let scene = WallSet::new(canvas());
    let cfg = SweepConfig::default().with_radius(100.0).with_angle(90.0, 90.0);
    let poly = sweep(cfg, p(0.0, 0.0), &scene);
    // Facing south on screen.
    assert!(poly.contains_point(p(0.0, 50.0)));
    assert!(!poly.contains_point(p(0.0, -50.0)));
    assert!(!poly.contains_point(p(50.0, 10.0)));
    for q in poly.iter_points(false) {
        assert!(q.length() <= 100.0 + EPS);
    }
}

#[test]
fn origin_on_or_beside_the_scene_edge() {
    let scene = walls(&[-900.0, 400.0, -900.0, 600.0]);
    let bounds = canvas().pad(EPS);
    for origin in [p(-999.6, 500.0), p(-1000.0, -1000.0), p(1000.0, 500.0), p(-998.0, 500.0)] {
        let poly = sweep(SweepConfig::default(), origin, &scene);
        assert!(poly.is_clockwise());
        for q in poly.iter_points(false) {
            assert!(bounds.contains_point(q), "{q:?} outside the scene from {origin:?}");
        }
    }
    // Right behind the wall, as seen from the left edge.
    let poly = sweep(SweepConfig::default(), p(-1000.0, 500.0), &scene);
    assert!(!poly.contains_point(p(-800.0, 500.0)));
    assert!(poly.contains_point(p(-950.0, 500.0)));
}
