// Copyright 2025 Lars Brubaker
// License: MIT
//
// Boundary combination without general polygon clipping.
//
// Both shapes are assumed to surround a common point (the sweep origin).
// The combiner walks the polygon clockwise, finds where it crosses the
// boundary outline, and at every crossing switches to whichever of the two
// outlines turns more clockwise (intersection) or more counterclockwise
// (union). Only when the outlines never cross does it fall back to
// containment tests.

use tracing::{debug, warn};

use crate::circle::Circle;
use crate::config::{EPSILON, TRACE_STEPS_PER_CROSSING};
use crate::geom::{orient, points_almost_equal, Point};
use crate::limited_angle::LimitedAngle;
use crate::polygon::Polygon;
use crate::rect::Rect;

/// A closed clockwise outline the combiner can trace along.
pub trait TraceBoundary {
    /// Proper crossings of segment `a -> b` with the outline as
    /// `(t along ab, point)`, nearest to `a` first.
    fn segment_crossings(&self, a: Point, b: Point) -> Vec<(f64, Point)>;

    /// Position of an outline point. Positions grow clockwise and wrap
    /// once around the outline.
    fn outline_position(&self, p: Point) -> f64;

    /// Outline points strictly between two positions, walking clockwise.
    fn outline_points_between(&self, from: f64, to: f64) -> Vec<Point>;

    /// Clockwise direction of the outline at `position` (the point `p`).
    fn tangent_at(&self, position: f64, p: Point) -> Point;

    fn contains_point(&self, p: Point) -> bool;

    /// Closed clockwise polygon form of the whole boundary.
    fn to_polygon(&self) -> Polygon;
}

/// A place where the polygon crosses the boundary outline.
#[derive(Copy, Clone, Debug)]
struct Crossing {
    point: Point,
    /// Polygon edge index and parameter along it.
    edge: usize,
    t: f64,
    /// Boundary outline position.
    position: f64,
}

/// Intersect (`clockwise = true`) or union (`clockwise = false`) a polygon
/// with a boundary. Returns None when the result is empty or, for a union,
/// when the shapes are disjoint.
pub fn combine<B: TraceBoundary + ?Sized>(
    polygon: &Polygon,
    boundary: &B,
    clockwise: bool,
) -> Option<Polygon> {
    let poly = polygon.normalized();
    let pts = poly.open_points();
    if pts.len() < 3 {
        return None;
    }

    let crossings = find_crossings(pts, boundary);
    if crossings.len() < 2 {
        return combine_without_crossings(&poly, boundary, clockwise);
    }

    let out = trace(pts, boundary, &crossings, clockwise);
    finish(out)
}

// ─────── Crossing discovery ───────────────────────────────────────────────────

fn find_crossings<B: TraceBoundary + ?Sized>(pts: &[Point], boundary: &B) -> Vec<Crossing> {
    let n = pts.len();
    let mut crossings: Vec<Crossing> = Vec::new();
    for edge in 0..n {
        let (a, b) = (pts[edge], pts[(edge + 1) % n]);
        for (t, point) in boundary.segment_crossings(a, b) {
            // A crossing at a shared vertex is reported by both edges.
            if let Some(last) = crossings.last() {
                if points_almost_equal(last.point, point, EPSILON) {
                    continue;
                }
            }
            crossings.push(Crossing {
                point,
                edge,
                t,
                position: boundary.outline_position(point),
            });
        }
    }
    if crossings.len() > 1 {
        let first = crossings[0].point;
        if let Some(last) = crossings.last() {
            if points_almost_equal(first, last.point, EPSILON) {
                crossings.pop();
            }
        }
    }
    crossings
}

/// The polygon's direction leaving a crossing, skipping zero-length edges.
fn polygon_direction(pts: &[Point], c: &Crossing) -> Point {
    let n = pts.len();
    let mut from = c.point;
    let mut idx = (c.edge + 1) % n;
    for _ in 0..n {
        let d = pts[idx] - from;
        if d.length_squared() > EPSILON * EPSILON {
            return d;
        }
        from = pts[idx];
        idx = (idx + 1) % n;
    }
    Point::ZERO
}

/// Does the output continue along the polygon after crossing `k`?
fn follows_polygon<B: TraceBoundary + ?Sized>(
    pts: &[Point],
    boundary: &B,
    crossings: &[Crossing],
    k: usize,
    clockwise: bool,
) -> bool {
    let c = &crossings[k];
    let dir_p = polygon_direction(pts, c).normalize_or_zero();
    let dir_b = boundary.tangent_at(c.position, c.point).normalize_or_zero();
    let o = orient(c.point, c.point + dir_b, c.point + dir_p);
    if o.abs() > 1e-10 {
        // Negative: the polygon turns clockwise of the boundary, into it.
        return if clockwise { o < 0.0 } else { o > 0.0 };
    }

    // Tangent or collinear: look at the middle of the next polygon piece.
    let next = &crossings[(k + 1) % crossings.len()];
    let n = pts.len();
    let piece_end = if next.edge == c.edge && next.t > c.t {
        next.point
    } else {
        pts[(c.edge + 1) % n]
    };
    let mid = (c.point + piece_end) / 2.0;
    let inside = boundary.contains_point(mid);
    if clockwise {
        inside
    } else {
        !inside
    }
}

// ─────── Tracing ──────────────────────────────────────────────────────────────

fn trace<B: TraceBoundary + ?Sized>(
    pts: &[Point],
    boundary: &B,
    crossings: &[Crossing],
    clockwise: bool,
) -> Vec<Point> {
    let m = crossings.len();

    // Order of crossings along the boundary outline.
    let mut by_position: Vec<usize> = (0..m).collect();
    by_position.sort_by(|&i, &j| {
        crossings[i]
            .position
            .total_cmp(&crossings[j].position)
            .then(i.cmp(&j))
    });
    let mut next_on_boundary = vec![0usize; m];
    for (rank, &k) in by_position.iter().enumerate() {
        next_on_boundary[k] = by_position[(rank + 1) % m];
    }

    let cap = m * TRACE_STEPS_PER_CROSSING + 2;
    let mut visited = vec![false; m];
    let mut out = Vec::new();
    let start = 0;
    let mut k = start;
    for step in 0.. {
        if step >= cap {
            warn!(crossings = m, "boundary trace hit its step cap; returning partial outline");
            break;
        }
        if visited[k] {
            warn!(crossing = k, "boundary trace revisited a crossing before closing");
            break;
        }
        visited[k] = true;

        let here = &crossings[k];
        out.push(here.point);
        let next = if follows_polygon(pts, boundary, crossings, k, clockwise) {
            let j = (k + 1) % m;
            push_polygon_path(&mut out, pts, here, &crossings[j]);
            j
        } else {
            let j = next_on_boundary[k];
            out.extend(boundary.outline_points_between(here.position, crossings[j].position));
            j
        };
        k = next;
        if k == start {
            break;
        }
    }
    out
}

/// Polygon vertices passed between two crossings (exclusive of both).
fn push_polygon_path(out: &mut Vec<Point>, pts: &[Point], from: &Crossing, to: &Crossing) {
    if to.edge == from.edge && to.t > from.t {
        return;
    }
    let n = pts.len();
    let mut i = (from.edge + 1) % n;
    loop {
        out.push(pts[i]);
        if i == to.edge {
            break;
        }
        i = (i + 1) % n;
    }
}

fn finish(points: Vec<Point>) -> Option<Polygon> {
    let mut poly = Polygon::new(points);
    poly.dedupe(EPSILON);
    if poly.vertex_count() < 3 {
        return None;
    }
    poly.close();
    Some(poly)
}

fn combine_without_crossings<B: TraceBoundary + ?Sized>(
    poly: &Polygon,
    boundary: &B,
    clockwise: bool,
) -> Option<Polygon> {
    let polygon_inside = poly.iter_points(false).all(|p| boundary.contains_point(p));
    let outline = boundary.to_polygon();
    let boundary_inside = !polygon_inside
        && outline
            .iter_points(false)
            .all(|p| poly.contains_point(p) || poly.point_on_boundary(p, EPSILON));

    match (clockwise, polygon_inside, boundary_inside) {
        (true, true, _) => Some(poly.clone()),
        (true, false, true) => Some(outline),
        (false, true, _) => Some(outline),
        (false, false, true) => Some(poly.clone()),
        (true, false, false) => None,
        (false, false, false) => {
            warn!("union of disjoint shapes has no single outline; returning None");
            None
        }
    }
}

// ─────── Polygon outlines ─────────────────────────────────────────────────────

/// A closed clockwise polygon used as a boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct PolygonBoundary {
    polygon: Polygon,
}

impl PolygonBoundary {
    pub fn new(polygon: &Polygon) -> Self {
        Self {
            polygon: polygon.normalized(),
        }
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn intersect_polygon(&self, polygon: &Polygon) -> Option<Polygon> {
        combine(polygon, self, true)
    }

    pub fn union_polygon(&self, polygon: &Polygon) -> Option<Polygon> {
        combine(polygon, self, false)
    }
}

/// Crossings of `a -> b` with the selected edges of a closed clockwise
/// outline, nearest to `a` first.
pub(crate) fn outline_crossings(
    pts: &[Point],
    a: Point,
    b: Point,
    edges: impl Iterator<Item = usize>,
) -> Vec<(f64, Point)> {
    let n = pts.len();
    let mut hits: Vec<(f64, Point)> = edges
        .filter_map(|i| crate::geom::segment_intersection(a, b, pts[i], pts[(i + 1) % n]))
        .map(|ix| (ix.t0, ix.point))
        .collect();
    hits.sort_by(|x, y| x.0.total_cmp(&y.0));
    // Two outline edges meeting at a vertex report the same point.
    hits.dedup_by(|x, y| points_almost_equal(x.1, y.1, EPSILON));
    hits
}

/// Edge index plus parameter of the outline edge nearest to `p`.
pub(crate) fn outline_position(pts: &[Point], p: Point) -> f64 {
    let n = pts.len();
    let mut best = (f64::INFINITY, 0.0);
    for i in 0..n {
        let (a, b) = (pts[i], pts[(i + 1) % n]);
        let d = b - a;
        let len2 = d.length_squared();
        let t = if len2 == 0.0 { 0.0 } else { ((p - a).dot(d) / len2).clamp(0.0, 1.0) };
        let dist = (a + d * t).distance_squared(p);
        if dist < best.0 {
            // A point at the very end of an edge belongs to the next one.
            best = if t >= 1.0 {
                (dist, ((i + 1) % n) as f64)
            } else {
                (dist, i as f64 + t)
            };
        }
    }
    best.1
}

/// Outline vertices strictly between two positions, clockwise.
pub(crate) fn outline_vertices_between(pts: &[Point], from: f64, to: f64) -> Vec<Point> {
    let n = pts.len();
    let period = n as f64;
    let span = (to - from).rem_euclid(period);
    let mut out = Vec::new();
    let mut k = (from.floor() as usize + 1) % n;
    for _ in 0..n {
        let offset = (k as f64 - from).rem_euclid(period);
        if offset <= 0.0 || offset >= span {
            break;
        }
        out.push(pts[k]);
        k = (k + 1) % n;
    }
    out
}

pub(crate) fn outline_tangent(pts: &[Point], position: f64) -> Point {
    let n = pts.len();
    let i = (position.floor() as usize) % n;
    pts[(i + 1) % n] - pts[i]
}

impl TraceBoundary for PolygonBoundary {
    fn segment_crossings(&self, a: Point, b: Point) -> Vec<(f64, Point)> {
        let pts = self.polygon.open_points();
        outline_crossings(pts, a, b, 0..pts.len())
    }

    fn outline_position(&self, p: Point) -> f64 {
        outline_position(self.polygon.open_points(), p)
    }

    fn outline_points_between(&self, from: f64, to: f64) -> Vec<Point> {
        outline_vertices_between(self.polygon.open_points(), from, to)
    }

    fn tangent_at(&self, position: f64, _p: Point) -> Point {
        outline_tangent(self.polygon.open_points(), position)
    }

    fn contains_point(&self, p: Point) -> bool {
        self.polygon.contains_point(p) || self.polygon.point_on_boundary(p, EPSILON)
    }

    fn to_polygon(&self) -> Polygon {
        self.polygon.clone()
    }
}

// ─────── Boundary shapes ──────────────────────────────────────────────────────

/// Outer shape capping an unbounded sweep.
#[derive(Clone, Debug, PartialEq)]
pub enum Boundary {
    Circle(Circle),
    Sector(LimitedAngle),
    Polygon(PolygonBoundary),
}

impl Boundary {
    pub fn polygon(polygon: &Polygon) -> Self {
        Boundary::Polygon(PolygonBoundary::new(polygon))
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Boundary::Circle(c) => c.bounds(),
            Boundary::Sector(s) => s.bounds(),
            Boundary::Polygon(p) => p
                .polygon()
                .bounds()
                .unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0)),
        }
    }

    pub fn intersect_polygon(&self, polygon: &Polygon) -> Option<Polygon> {
        debug!(kind = self.kind(), "intersecting sweep polygon with boundary");
        combine(polygon, self, true)
    }

    pub fn union_polygon(&self, polygon: &Polygon) -> Option<Polygon> {
        combine(polygon, self, false)
    }

    fn kind(&self) -> &'static str {
        match self {
            Boundary::Circle(_) => "circle",
            Boundary::Sector(_) => "sector",
            Boundary::Polygon(_) => "polygon",
        }
    }

    fn inner(&self) -> &dyn TraceBoundary {
        match self {
            Boundary::Circle(c) => c,
            Boundary::Sector(s) => s,
            Boundary::Polygon(p) => p,
        }
    }
}

impl TraceBoundary for Boundary {
    fn segment_crossings(&self, a: Point, b: Point) -> Vec<(f64, Point)> {
        self.inner().segment_crossings(a, b)
    }

    fn outline_position(&self, p: Point) -> f64 {
        self.inner().outline_position(p)
    }

    fn outline_points_between(&self, from: f64, to: f64) -> Vec<Point> {
        self.inner().outline_points_between(from, to)
    }

    fn tangent_at(&self, position: f64, p: Point) -> Point {
        self.inner().tangent_at(position, p)
    }

    fn contains_point(&self, p: Point) -> bool {
        self.inner().contains_point(p)
    }

    fn to_polygon(&self) -> Polygon {
        self.inner().to_polygon()
    }
}
