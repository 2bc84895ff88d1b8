// Copyright 2025 Lars Brubaker
// License: MIT
//
// Edge gathering and clockwise vertex ordering for the sweep.

use std::collections::HashMap;
use std::f64::consts::{PI, TAU};
use std::ops::ControlFlow;

use crate::config::SweepConfig;
use crate::edge::{EdgeArena, EdgeId, EdgeIdx, VertIdx, INVALID};
use crate::geom::{clockwise_angle, orient, point_key, Point};
use crate::intersections::{brute_single, sort_red_black, sort_single};
use crate::limited_angle::LimitedAngle;
use crate::obstacle::{ObstacleProvider, SenseType, WallId};
use crate::rect::Rect;

pub(super) struct BuiltEdges {
    pub arena: EdgeArena,
    /// Walls outside the observer's elevation.
    pub partitioned: Vec<WallId>,
    /// Walls dropped by the sector test.
    pub culled: usize,
}

/// Collect every edge the sweep from `origin` can meet, plus their
/// intersections.
pub(super) fn build_arena<P: ObstacleProvider + ?Sized>(
    origin: Point,
    cfg: &SweepConfig,
    canvas: &Rect,
    cull: &Rect,
    sector: Option<&LimitedAngle>,
    provider: &P,
) -> BuiltEdges {
    let mut arena = EdgeArena::new();
    let mut partitioned = Vec::new();
    let mut culled = 0;

    for (i, (a, b)) in canvas.edges().into_iter().enumerate() {
        arena.add_edge(origin, EdgeId::Canvas(i as u8), a, b, SenseType::Normal);
    }

    let mut wall_edges: Vec<EdgeIdx> = Vec::new();
    let mut by_wall: HashMap<WallId, EdgeIdx> = HashMap::new();
    let mut cached = true;
    for wall in provider.walls_in(cull) {
        let sense = wall.sense(cfg.channel);
        if !sense.blocks() {
            continue;
        }
        if let Some(z) = cfg.elevation {
            if !wall.spans_elevation(z) {
                partitioned.push(wall.id);
                continue;
            }
        }
        if sector.map_or(false, |s| s.edge_is_outside(wall.a, wall.b)) {
            culled += 1;
            continue;
        }
        let e = arena.add_edge(origin, EdgeId::Wall(wall.id), wall.a, wall.b, sense);
        if e != INVALID {
            cached &= provider.wall_intersections(wall.id).is_some();
            wall_edges.push(e);
            by_wall.insert(wall.id, e);
        }
    }

    let mut extra_edges: Vec<EdgeIdx> = (0..arena.edges.len() as EdgeIdx)
        .filter(|&e| matches!(arena.edge(e).id, EdgeId::Canvas(_)))
        .collect();
    for (i, temp) in cfg.temp_edges.iter().enumerate() {
        if !temp.sense.blocks() {
            continue;
        }
        let e = arena.add_edge(origin, EdgeId::Temporary(i as u32), temp.a, temp.b, temp.sense);
        if e != INVALID {
            extra_edges.push(e);
        }
    }

    // ─────── Intersections ───────
    let mut found: Vec<(EdgeIdx, EdgeIdx, Point)> = Vec::new();
    let segments = |list: &[EdgeIdx]| -> Vec<(Point, Point)> {
        list.iter().map(|&e| (arena.edge(e).a, arena.edge(e).b)).collect()
    };
    let walls = segments(&wall_edges);
    let extras = segments(&extra_edges);

    if cached {
        for &e in &wall_edges {
            if let EdgeId::Wall(id) = arena.edge(e).id {
                for (other, p) in provider.wall_intersections(id).unwrap_or(&[]) {
                    if let Some(&o) = by_wall.get(other) {
                        found.push((e, o, *p));
                    }
                }
            }
        }
    } else {
        let _ = sort_single(&walls, |i, j, p| {
            found.push((wall_edges[i], wall_edges[j], p));
            ControlFlow::Continue(())
        });
    }
    let _ = sort_red_black(&extras, &walls, |i, j, p| {
        found.push((extra_edges[i], wall_edges[j], p));
        ControlFlow::Continue(())
    });
    let _ = brute_single(&extras, |i, j, p| {
        found.push((extra_edges[i], extra_edges[j], p));
        ControlFlow::Continue(())
    });

    for (e1, e2, p) in found {
        arena.add_intersection(e1, e2, p);
    }

    BuiltEdges {
        arena,
        partitioned,
        culled,
    }
}

// ─────── Ordering ─────────────────────────────────────────────────────────────

/// Quadrants in sweep order: north-west, north-east, south-east,
/// south-west. Rays due west or due east count as north.
fn quadrant(origin: Point, p: Point) -> u8 {
    let north = p.y <= origin.y;
    let west = p.x < origin.x;
    match (north, west) {
        (true, true) => 0,
        (true, false) => 1,
        (false, false) => 2,
        (false, true) => 3,
    }
}

/// Sort vertices clockwise from due west. Returns each vertex's group
/// rank (INVALID for vertices at the origin) and the groups of vertices
/// lying on one ray, nearest first.
pub(super) fn sort_vertices(arena: &EdgeArena, origin: Point) -> (Vec<u32>, Vec<Vec<VertIdx>>) {
    let origin_key = point_key(origin);
    let mut verts: Vec<VertIdx> = (0..arena.verts.len() as VertIdx)
        .filter(|&v| arena.vert(v).key != origin_key)
        .collect();

    // Angles from due west give a total order; quadrants keep rays exactly
    // on an axis in the quadrant the grouping test expects.
    let sweep_angle = |p: Point| (clockwise_angle(origin, p) - PI).rem_euclid(TAU);
    verts.sort_by(|&i, &j| {
        let (a, b) = (arena.vert(i), arena.vert(j));
        quadrant(origin, a.point)
            .cmp(&quadrant(origin, b.point))
            .then_with(|| sweep_angle(a.point).total_cmp(&sweep_angle(b.point)))
            .then_with(|| b.ccw_edges.is_empty().cmp(&a.ccw_edges.is_empty()))
            .then_with(|| {
                a.point
                    .distance_squared(origin)
                    .total_cmp(&b.point.distance_squared(origin))
            })
    });

    let mut groups: Vec<Vec<VertIdx>> = Vec::new();
    for v in verts {
        let p = arena.vert(v).point;
        let joins = groups.last().map_or(false, |g| {
            let first = arena.vert(g[0]).point;
            quadrant(origin, first) == quadrant(origin, p) && orient(origin, first, p) == 0.0
        });
        match groups.last_mut() {
            Some(g) if joins => g.push(v),
            _ => groups.push(vec![v]),
        }
    }
    // Nearest first within a ray.
    for g in &mut groups {
        g.sort_by(|&i, &j| {
            arena
                .vert(i)
                .point
                .distance_squared(origin)
                .total_cmp(&arena.vert(j).point.distance_squared(origin))
        });
    }

    let mut rank = vec![INVALID; arena.verts.len()];
    for (r, g) in groups.iter().enumerate() {
        for &v in g {
            rank[v as usize] = r as u32;
        }
    }
    (rank, groups)
}
