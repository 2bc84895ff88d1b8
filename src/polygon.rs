// Copyright 2025 Lars Brubaker
// License: MIT
//
// Plain polygon value type and the utility operations the sweep and the
// boundary combiner rely on. Polygons produced by this crate are closed
// (first point repeated last) and clockwise on screen.

use serde::{Deserialize, Serialize};

use crate::config::EPSILON;
use crate::error::{SweepError, SweepResult};
use crate::geom::{orient, points_almost_equal, Point};
use crate::rect::Rect;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Closed, clockwise rectangle outline.
    pub fn from_rect(rect: &Rect) -> Self {
        let c = rect.corners();
        Self::new(vec![c[0], c[1], c[2], c[3], c[0]])
    }

    /// Build from [x0, y0, x1, y1, ...].
    pub fn from_flat(coords: &[f64]) -> SweepResult<Self> {
        if coords.len() % 2 != 0 {
            return Err(SweepError::OddCoordinateCount(coords.len()));
        }
        Ok(Self::new(
            coords.chunks_exact(2).map(|c| Point::new(c[0], c[1])).collect(),
        ))
    }

    pub fn to_flat(&self) -> Vec<f64> {
        self.points.iter().flat_map(|p| [p.x, p.y]).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    // ─────── Closing / opening ────────────────────────────────────────────────

    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(&a), Some(&b)) => self.points.len() > 1 && points_almost_equal(a, b, EPSILON),
            _ => false,
        }
    }

    /// Repeat the first point at the end if it is not already there.
    pub fn close(&mut self) {
        if !self.is_closed() {
            if let Some(&first) = self.points.first() {
                self.points.push(first);
            }
        }
    }

    /// Drop the repeated closing point, if any.
    pub fn open(&mut self) {
        if self.is_closed() {
            self.points.pop();
        }
    }

    /// Points without the closing duplicate.
    pub fn open_points(&self) -> &[Point] {
        if self.is_closed() {
            &self.points[..self.points.len() - 1]
        } else {
            &self.points
        }
    }

    /// Number of distinct vertices.
    pub fn vertex_count(&self) -> usize {
        self.open_points().len()
    }

    // ─────── Iteration ────────────────────────────────────────────────────────

    /// Distinct vertices, optionally followed by the first one again.
    pub fn iter_points(&self, close: bool) -> impl Iterator<Item = Point> + '_ {
        let pts = self.open_points();
        let tail = if close { pts.first().copied() } else { None };
        pts.iter().copied().chain(tail)
    }

    /// Directed edges, including the closing edge.
    pub fn iter_edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let pts = self.open_points();
        let n = pts.len();
        (0..if n < 2 { 0 } else { n }).map(move |i| (pts[i], pts[(i + 1) % n]))
    }

    // ─────── Orientation ──────────────────────────────────────────────────────

    /// Signed area; negative for clockwise (screen) polygons.
    pub fn signed_area(&self) -> f64 {
        self.iter_edges()
            .map(|(a, b)| (b.x - a.x) * (b.y + a.y))
            .sum::<f64>()
            / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_clockwise(&self) -> bool {
        self.signed_area() < 0.0
    }

    pub fn reverse_orientation(&mut self) {
        self.points.reverse();
    }

    /// Closed and clockwise copy, the form the combiner expects.
    pub fn normalized(&self) -> Polygon {
        let mut out = self.clone();
        out.close();
        if !out.is_clockwise() {
            out.reverse_orientation();
        }
        out
    }

    /// True when every turn has the same direction. Collinear runs are
    /// ignored; fewer than three vertices is not convex.
    pub fn is_convex(&self) -> bool {
        let pts = self.open_points();
        let n = pts.len();
        if n < 3 {
            return false;
        }
        let mut sign = 0.0;
        for i in 0..n {
            let o = orient(pts[i], pts[(i + 1) % n], pts[(i + 2) % n]);
            if o == 0.0 {
                continue;
            }
            if sign == 0.0 {
                sign = o.signum();
            } else if o.signum() != sign {
                return false;
            }
        }
        sign != 0.0
    }

    // ─────── Measurement ──────────────────────────────────────────────────────

    pub fn bounds(&self) -> Option<Rect> {
        Rect::bounding(self.points.iter().copied())
    }

    /// Even-odd containment test.
    pub fn contains_point(&self, p: Point) -> bool {
        let pts = self.open_points();
        let n = pts.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (pi, pj) = (pts[i], pts[j]);
            if (pi.y > p.y) != (pj.y > p.y) {
                let x = (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x;
                if p.x < x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Is `p` within `epsilon` of some edge?
    pub fn point_on_boundary(&self, p: Point, epsilon: f64) -> bool {
        self.iter_edges().any(|(a, b)| {
            let d = b - a;
            let len2 = d.length_squared();
            let t = if len2 == 0.0 { 0.0 } else { ((p - a).dot(d) / len2).clamp(0.0, 1.0) };
            (a + d * t).distance_squared(p) <= epsilon * epsilon
        })
    }

    // ─────── Transforms ───────────────────────────────────────────────────────

    /// Multiply every coordinate, e.g. before integer clipping.
    pub fn scale(&self, factor: f64) -> Polygon {
        Polygon::new(self.points.iter().map(|p| *p * factor).collect())
    }

    /// Inverse of `scale`.
    pub fn unscale(&self, factor: f64) -> Polygon {
        Polygon::new(self.points.iter().map(|p| *p / factor).collect())
    }

    /// Remove consecutive points closer than `epsilon`, keeping closure.
    pub fn dedupe(&mut self, epsilon: f64) {
        let was_closed = self.is_closed();
        self.open();
        self.points.dedup_by(|b, a| points_almost_equal(*a, *b, epsilon));
        while self.points.len() > 1
            && points_almost_equal(self.points[0], self.points[self.points.len() - 1], epsilon)
        {
            self.points.pop();
        }
        if was_closed {
            self.close();
        }
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(points: Vec<Point>) -> Self {
        Polygon::new(points)
    }
}
