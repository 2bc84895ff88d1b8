// Copyright 2025 Lars Brubaker
// License: MIT
//
// Edge and vertex arena for one sweep call.
//
// Edges and vertices live in flat vectors addressed by u32 indices, with
// INVALID as the null index. Every edge is stored so that its B endpoint is
// clockwise of A as seen from the sweep origin. A vertex lists the edges
// that start there going clockwise (`cw_edges`) and the edges that end
// there (`ccw_edges`); an edge passing through an intersection vertex is in
// both lists.
//
// The intersection table is owned by the arena, so intersections involving
// temporary or canvas edges never leak into a persistent wall cache.

use std::collections::{BTreeMap, HashMap};

use crate::geom::{orient, point_key, Point};
use crate::intersections::Segment;
use crate::obstacle::{SenseType, WallId};

pub type EdgeIdx = u32;
pub type VertIdx = u32;

pub const INVALID: u32 = u32::MAX;

/// Where an edge came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeId {
    Wall(WallId),
    /// Index into the call's temporary edges.
    Temporary(u32),
    /// Canvas side, clockwise from the top.
    Canvas(u8),
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub id: EdgeId,
    pub a: Point,
    pub b: Point,
    pub sense: SenseType,
    pub vertex_a: VertIdx,
    pub vertex_b: VertIdx,
}

impl Edge {
    pub fn is_limited(&self) -> bool {
        self.sense == SenseType::Limited
    }
}

impl Segment for Edge {
    fn a(&self) -> Point {
        self.a
    }
    fn b(&self) -> Point {
        self.b
    }
}

#[derive(Clone, Debug)]
pub struct Vertex {
    pub point: Point,
    pub key: i64,
    /// Edges leaving this vertex clockwise.
    pub cw_edges: Vec<EdgeIdx>,
    /// Edges arriving at this vertex from the counterclockwise side.
    pub ccw_edges: Vec<EdgeIdx>,
    pub is_intersection: bool,
}

impl Vertex {
    fn new(point: Point, key: i64) -> Self {
        Self {
            point,
            key,
            cw_edges: Vec::new(),
            ccw_edges: Vec::new(),
            is_intersection: false,
        }
    }

    /// Any edge attached here, either list.
    pub fn touches(&self, e: EdgeIdx) -> bool {
        self.cw_edges.contains(&e) || self.ccw_edges.contains(&e)
    }
}

#[derive(Debug, Default)]
pub struct EdgeArena {
    pub edges: Vec<Edge>,
    pub verts: Vec<Vertex>,
    keys: HashMap<i64, VertIdx>,
    intersections: BTreeMap<(EdgeIdx, EdgeIdx), Point>,
}

impl EdgeArena {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn edge(&self, e: EdgeIdx) -> &Edge {
        &self.edges[e as usize]
    }

    #[inline]
    pub fn vert(&self, v: VertIdx) -> &Vertex {
        &self.verts[v as usize]
    }

    /// Vertex at `point`, creating it if no vertex shares its key.
    pub fn vertex_at(&mut self, point: Point) -> VertIdx {
        let key = point_key(point);
        if let Some(&v) = self.keys.get(&key) {
            return v;
        }
        let v = self.verts.len() as VertIdx;
        self.verts.push(Vertex::new(point, key));
        self.keys.insert(key, v);
        v
    }

    /// Add an edge oriented for a sweep around `origin`. Edges collinear
    /// with the origin (including edges through it) are rejected and
    /// return INVALID.
    pub fn add_edge(&mut self, origin: Point, id: EdgeId, a: Point, b: Point, sense: SenseType) -> EdgeIdx {
        let o = orient(origin, a, b);
        if o == 0.0 || point_key(a) == point_key(b) {
            return INVALID;
        }
        let (a, b) = if o > 0.0 { (b, a) } else { (a, b) };
        let e = self.edges.len() as EdgeIdx;
        let vertex_a = self.vertex_at(a);
        let vertex_b = self.vertex_at(b);
        self.verts[vertex_a as usize].cw_edges.push(e);
        self.verts[vertex_b as usize].ccw_edges.push(e);
        self.edges.push(Edge {
            id,
            a,
            b,
            sense,
            vertex_a,
            vertex_b,
        });
        e
    }

    /// Record that edges `e1` and `e2` meet at `point`. Meetings at an
    /// endpoint of both edges are already represented by that vertex.
    pub fn add_intersection(&mut self, e1: EdgeIdx, e2: EdgeIdx, point: Point) {
        if e1 == e2 || e1 == INVALID || e2 == INVALID {
            return;
        }
        let pair = (e1.min(e2), e1.max(e2));
        if self.intersections.contains_key(&pair) {
            return;
        }
        let key = point_key(point);
        let is_end = |e: EdgeIdx| {
            let edge = &self.edges[e as usize];
            self.verts[edge.vertex_a as usize].key == key
                || self.verts[edge.vertex_b as usize].key == key
        };
        let (end1, end2) = (is_end(e1), is_end(e2));
        if end1 && end2 {
            return;
        }
        self.intersections.insert(pair, point);

        let v = self.vertex_at(point);
        let vert = &mut self.verts[v as usize];
        vert.is_intersection = true;
        for (e, is_endpoint) in [(e1, end1), (e2, end2)] {
            if !is_endpoint {
                if !vert.cw_edges.contains(&e) {
                    vert.cw_edges.push(e);
                }
                if !vert.ccw_edges.contains(&e) {
                    vert.ccw_edges.push(e);
                }
            }
        }
    }

    pub fn intersection(&self, e1: EdgeIdx, e2: EdgeIdx) -> Option<Point> {
        self.intersections.get(&(e1.min(e2), e1.max(e2))).copied()
    }

    pub fn intersection_count(&self) -> usize {
        self.intersections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn edges_are_oriented_clockwise_from_origin() {
        let mut arena = EdgeArena::new();
        // Wall east of the origin, given bottom-to-top.
        let e = arena.add_edge(Point::ZERO, EdgeId::Temporary(0), p(10.0, 5.0), p(10.0, -5.0), SenseType::Normal);
        let edge = arena.edge(e);
        // Clockwise on screen from the origin: north end first, then south.
        assert_eq!(edge.a, p(10.0, -5.0));
        assert_eq!(edge.b, p(10.0, 5.0));
        assert!(arena.vert(edge.vertex_a).cw_edges.contains(&e));
        assert!(arena.vert(edge.vertex_b).ccw_edges.contains(&e));
    }

    #[test]
    fn radial_edges_are_rejected() {
        let mut arena = EdgeArena::new();
        let e = arena.add_edge(Point::ZERO, EdgeId::Temporary(0), p(5.0, 5.0), p(10.0, 10.0), SenseType::Normal);
        assert_eq!(e, INVALID);
        assert!(arena.edges.is_empty());
    }

    #[test]
    fn shared_vertices_are_merged() {
        let mut arena = EdgeArena::new();
        arena.add_edge(Point::ZERO, EdgeId::Canvas(0), p(-10.0, -10.0), p(10.0, -10.0), SenseType::Normal);
        arena.add_edge(Point::ZERO, EdgeId::Canvas(1), p(10.0, -10.0), p(10.0, 10.0), SenseType::Normal);
        assert_eq!(arena.verts.len(), 3);
    }

    #[test]
    fn crossing_edges_share_an_intersection_vertex() {
        let mut arena = EdgeArena::new();
        let e1 = arena.add_edge(Point::ZERO, EdgeId::Temporary(0), p(10.0, -10.0), p(20.0, 10.0), SenseType::Normal);
        let e2 = arena.add_edge(Point::ZERO, EdgeId::Temporary(1), p(20.0, -10.0), p(10.0, 10.0), SenseType::Limited);
        arena.add_intersection(e1, e2, p(15.0, 0.0));
        assert_eq!(arena.intersection(e2, e1), Some(p(15.0, 0.0)));
        let v = arena.vertex_at(p(15.0, 0.0));
        let vert = arena.vert(v);
        assert!(vert.is_intersection);
        assert!(vert.cw_edges.contains(&e1) && vert.ccw_edges.contains(&e1));
        assert!(vert.touches(e2));
    }

    #[test]
    fn endpoint_meetings_are_not_recorded() {
        let mut arena = EdgeArena::new();
        let e1 = arena.add_edge(Point::ZERO, EdgeId::Temporary(0), p(10.0, -10.0), p(10.0, 10.0), SenseType::Normal);
        let e2 = arena.add_edge(Point::ZERO, EdgeId::Temporary(1), p(10.0, 10.0), p(-10.0, 10.0), SenseType::Normal);
        arena.add_intersection(e1, e2, p(10.0, 10.0));
        assert_eq!(arena.intersection_count(), 0);
    }
}
