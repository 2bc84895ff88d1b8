// Copyright 2025 Lars Brubaker
// Shared test utilities for vision-sweep tests.

#![allow(dead_code)]

use vision_sweep::{
    ClockwiseSweep, Point, Polygon, Rect, SenseChannel, SenseType, SweepConfig, Wall, WallId, WallSet,
};

pub const EPS: f64 = 1e-6;

pub fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// 2000 x 2000 canvas centred on the origin.
pub fn canvas() -> Rect {
    Rect::new(-1000.0, -1000.0, 2000.0, 2000.0)
}

/// Scene with normal walls from flat [ax,ay,bx,by, ...] coordinates.
pub fn walls(coords: &[f64]) -> WallSet {
    let mut set = WallSet::new(canvas());
    for c in coords.chunks_exact(4) {
        set.push(p(c[0], c[1]), p(c[2], c[3])).unwrap();
    }
    set
}

pub fn limited_wall(id: u32, a: Point, b: Point) -> Wall {
    Wall::new(WallId(id), a, b).with_sense(SenseChannel::Sight, SenseType::Limited)
}

pub fn sweep(config: SweepConfig, origin: Point, scene: &WallSet) -> Polygon {
    ClockwiseSweep::new(config)
        .unwrap()
        .sweep(origin, scene)
        .unwrap()
        .expect("sweep produced no polygon")
}

pub fn max_x(poly: &Polygon) -> f64 {
    poly.iter_points(false).map(|q| q.x).fold(f64::NEG_INFINITY, f64::max)
}

/// Tiny deterministic generator so randomized scenes are reproducible.
pub struct Lcg(pub u64);

impl Lcg {
    pub fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    pub fn point(&mut self, half: f64) -> Point {
        let x = self.range(-half, half).round();
        let y = self.range(-half, half).round();
        p(x, y)
    }
}
