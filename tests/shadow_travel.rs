// Copyright 2025 Lars Brubaker
// Wall shadows, light projections and elevation-aware travel on one scene.

mod helpers;

use helpers::*;
use vision_sweep::{
    first_collision, has_collision, shadow_polygon, LightProjection, Point3, SenseChannel, ShadowContext,
    Wall, WallId, WallSet,
};

fn scene() -> WallSet {
    let mut set = WallSet::new(canvas());
    set.insert(Wall::new(WallId(0), p(100.0, -50.0), p(100.0, 50.0)).with_elevation(0.0, 20.0))
        .unwrap();
    set.insert(Wall::new(WallId(1), p(-200.0, -100.0), p(-200.0, 100.0))).unwrap();
    set
}

#[test]
fn shadows_fall_away_from_the_light() {
    let set = scene();
    let light = Point3::new(0.0, 0.0, 40.0);
    let wall = set.iter().find(|w| w.id == WallId(0)).unwrap();
    let shadow = shadow_polygon(light, wall, 0.0, 5000.0).unwrap();
    assert!(shadow.is_clockwise());
    for q in shadow.iter_points(false) {
        assert!(q.x >= 100.0 - EPS, "{q:?} in front of the wall");
    }
    // Top corners project to twice the distance.
    assert!(shadow.contains_point(p(150.0, 0.0)));
    assert!(!shadow.contains_point(p(250.0, 0.0)));
}

#[test]
fn projection_covers_every_buffered_corner() {
    let set = scene();
    let mut ctx = ShadowContext::new();
    let buf = ctx.buffer(&set, SenseChannel::Light).clone();
    assert_eq!(buf.len(), 2);
    let proj = LightProjection::perspective(Point3::new(0.0, 0.0, 500.0), &buf).unwrap();
    for i in 0..buf.len() {
        for c in buf.corners(i).unwrap() {
            if c.z < 500.0 {
                let ndc = proj.project(c);
                assert!(ndc.x.abs() <= 1.0 + 1e-9 && ndc.y.abs() <= 1.0 + 1e-9, "{c:?} -> {ndc:?}");
            }
        }
    }
}

#[test]
fn travel_respects_wall_heights() {
    let set = scene();
    let ch = SenseChannel::Move;
    assert!(!has_collision(Point3::new(50.0, 0.0, 30.0), Point3::new(150.0, 0.0, 30.0), &set, ch).unwrap());
    assert!(has_collision(Point3::new(50.0, 0.0, 10.0), Point3::new(150.0, 0.0, 10.0), &set, ch).unwrap());
    // The unbounded wall blocks at any height.
    let hit = first_collision(Point3::new(0.0, 0.0, 1e5), Point3::new(-300.0, 0.0, 1e5), &set, ch)
        .unwrap()
        .unwrap();
    assert_eq!(hit.wall, WallId(1));
}
