// Copyright 2025 Lars Brubaker
// License: MIT
//
// Ray casting for one vertex group: where each active edge meets the ray,
// which hit stops the ray, and what the change of stopping edge adds to
// the polygon.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::config::EPSILON;
use crate::edge::{EdgeArena, EdgeIdx, VertIdx, INVALID};
use crate::geom::{line_line_intersection, points_almost_equal, ray_point, Point};
use crate::obstacle::SenseType;

use super::{SweepRay, Transition};

/// Which side of the ray the active set describes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum Side {
    /// Just counterclockwise of the ray, before the group is processed.
    Before,
    /// Just clockwise of the ray, after the group is processed.
    After,
}

/// An active edge meeting the ray.
#[derive(Copy, Clone, Debug)]
pub(super) struct Hit {
    pub edge: EdgeIdx,
    pub point: Point,
    pub dist2: f64,
    /// Group vertex the hit sits on, or INVALID.
    pub vertex: VertIdx,
}

/// Hits of every active edge on the ray from `origin` through `target`,
/// nearest first. Ties at a shared vertex are broken by which edge is
/// nearer on `side` of the ray.
pub(super) fn collect_hits(
    arena: &EdgeArena,
    origin: Point,
    target: Point,
    active: &BTreeSet<EdgeIdx>,
    group: &[VertIdx],
    side: Side,
) -> Vec<Hit> {
    let mut hits: Vec<Hit> = active
        .iter()
        .filter_map(|&e| {
            if let Some(&v) = group.iter().find(|&&v| arena.vert(v).touches(e)) {
                let point = arena.vert(v).point;
                return Some(Hit {
                    edge: e,
                    point,
                    dist2: point.distance_squared(origin),
                    vertex: v,
                });
            }
            let edge = arena.edge(e);
            let ix = line_line_intersection(origin, target, edge.a, edge.b)?;
            if ix.t0 <= 0.0 {
                return None;
            }
            let point = edge.a + (edge.b - edge.a) * ix.t1.clamp(0.0, 1.0);
            Some(Hit {
                edge: e,
                point,
                dist2: point.distance_squared(origin),
                vertex: INVALID,
            })
        })
        .collect();

    hits.sort_by(|x, y| {
        x.dist2.total_cmp(&y.dist2).then_with(|| {
            let tie = if x.vertex != INVALID && x.vertex == y.vertex {
                side_order(arena, origin, x.point, x.edge, y.edge, side)
            } else {
                Ordering::Equal
            };
            tie.then(x.edge.cmp(&y.edge))
        })
    });
    hits
}

/// Order two edges meeting at `p` by how close to the origin they run on
/// `side` of the ray. The edge whose direction is angularly nearer to the
/// origin direction is the nearer one.
fn side_order(arena: &EdgeArena, origin: Point, p: Point, e1: EdgeIdx, e2: EdgeIdx, side: Side) -> Ordering {
    let away = |e: EdgeIdx| {
        let edge = arena.edge(e);
        match side {
            Side::Before => edge.a - p,
            Side::After => edge.b - p,
        }
    };
    let (u1, u2) = (away(e1), away(e2));
    let w = origin - p;
    let s = u1.perp_dot(u2) * w.perp_dot(u1);
    if s > 0.0 {
        Ordering::Less
    } else if s < 0.0 {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// First normal edge or second limited edge along the ray.
pub(super) fn stopping_hit(arena: &EdgeArena, hits: &[Hit]) -> Option<Hit> {
    let mut limited_seen = false;
    for hit in hits {
        match arena.edge(hit.edge).sense {
            SenseType::Normal => return Some(*hit),
            SenseType::Limited if limited_seen => return Some(*hit),
            SenseType::Limited => limited_seen = true,
            SenseType::None => {}
        }
    }
    None
}

/// Decide what the group adds to the polygon from the stopping hits on
/// either side of the ray.
pub(super) fn emit(
    arena: &EdgeArena,
    origin: Point,
    target: Point,
    radius_max: f64,
    group: &[VertIdx],
    before: Option<Hit>,
    after: Option<Hit>,
) -> SweepRay {
    let far = ray_point(origin, target, radius_max);
    let resolve = |h: Option<Hit>| match h {
        Some(h) => (h.point, h.dist2, h.edge),
        None => (far, far.distance_squared(origin), INVALID),
    };
    let (p_before, d_before, e_before) = resolve(before);
    let (p_after, d_after, e_after) = resolve(after);

    let (transition, points) = if e_before == e_after {
        let limited_only = group.iter().all(|&v| {
            let vert = arena.vert(v);
            vert.cw_edges
                .iter()
                .chain(vert.ccw_edges.iter())
                .all(|&e| arena.edge(e).is_limited())
        });
        let transition = if limited_only {
            Transition::LimitedToLimited
        } else {
            Transition::Occluded
        };
        (transition, Vec::new())
    } else if points_almost_equal(p_before, p_after, EPSILON) {
        (Transition::EdgeToEdge, vec![p_after])
    } else if d_after < d_before {
        (Transition::BeginEdge, vec![p_before, p_after])
    } else {
        (Transition::EndEdge, vec![p_before, p_after])
    };

    SweepRay {
        target,
        transition,
        points,
    }
}
