// Copyright 2025 Lars Brubaker
// License: MIT
//
// Pure geometric functions shared by the sweep and the boundary combiner.
//
// All coordinates are screen space: x grows to the right and y grows down.
// "Clockwise" therefore means east -> south -> west -> north on screen, and
// every branch decision downstream depends on the sign conventions below.

use std::cmp::Ordering;
use std::f64::consts::TAU;

use crate::config::KEY_PRECISION;

/// A 2D point or vector.
pub type Point = glam::DVec2;

/// A 3D point or vector (x, y on the canvas, z = elevation).
pub type Point3 = glam::DVec3;

/// Orientation of `c` relative to the directed line `a -> b`.
///
/// Positive when `c` lies counterclockwise of `a -> b` (as seen on screen),
/// negative when clockwise, zero when the three points are collinear.
#[inline]
pub fn orient(a: Point, b: Point, c: Point) -> f64 {
    (a.y - c.y) * (b.x - c.x) - (a.x - c.x) * (b.y - c.y)
}

/// Returns true if `x` and `y` differ by at most `epsilon`.
#[inline]
pub fn almost_equal(x: f64, y: f64, epsilon: f64) -> bool {
    (x - y).abs() <= epsilon
}

/// Coordinate-wise epsilon equality of two points.
#[inline]
pub fn points_almost_equal(a: Point, b: Point, epsilon: f64) -> bool {
    almost_equal(a.x, b.x, epsilon) && almost_equal(a.y, b.y, epsilon)
}

#[inline]
pub fn distance_squared(a: Point, b: Point) -> f64 {
    a.distance_squared(b)
}

/// Lexicographic order: x first, then y. Used for the north-west /
/// south-east endpoint of a segment.
#[inline]
pub fn compare_xy(a: Point, b: Point) -> Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}

/// Quantized key for vertex deduplication. Points closer than
/// 1 / KEY_PRECISION in both axes share a key.
pub fn point_key(p: Point) -> i64 {
    let qx = (p.x * KEY_PRECISION).round() as i64;
    let qy = (p.y * KEY_PRECISION).round() as i64;
    (qx << 32) ^ (qy & 0xFFFF_FFFF)
}

/// Clockwise screen angle of `p` around `center`, in [0, TAU).
/// Zero points east, TAU / 4 points south.
#[inline]
pub fn clockwise_angle(center: Point, p: Point) -> f64 {
    (p.y - center.y).atan2(p.x - center.x).rem_euclid(TAU)
}

/// Point at `distance` from `origin` in the direction of `toward`.
pub fn ray_point(origin: Point, toward: Point, distance: f64) -> Point {
    origin + (toward - origin).normalize_or_zero() * distance
}

/// Do segments AB and CD share at least one point?
///
/// Touching at an endpoint counts. Collinear segments report no
/// intersection, which callers treat as "no interaction at this edge".
pub fn line_segment_intersects(a: Point, b: Point, c: Point, d: Point) -> bool {
    let xa = orient(a, b, c);
    let xb = orient(a, b, d);
    if xa == 0.0 && xb == 0.0 {
        return false;
    }
    let xab = xa * xb <= 0.0;
    let xcd = orient(c, d, a) * orient(c, d, b) <= 0.0;
    xab && xcd
}

/// Intersection of the infinite lines through AB and CD.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LineIntersection {
    pub point: Point,
    /// Parametric position along AB (0 at A, 1 at B).
    pub t0: f64,
    /// Parametric position along CD (0 at C, 1 at D).
    pub t1: f64,
}

/// Intersect the lines through AB and CD. Returns None for parallel or
/// degenerate lines.
pub fn line_line_intersection(a: Point, b: Point, c: Point, d: Point) -> Option<LineIntersection> {
    let dnm = (d.y - c.y) * (b.x - a.x) - (d.x - c.x) * (b.y - a.y);
    let scale = (b - a).length() * (d - c).length();
    if dnm == 0.0 || dnm.abs() <= scale * 1e-14 {
        return None;
    }
    let t0 = ((d.x - c.x) * (a.y - c.y) - (d.y - c.y) * (a.x - c.x)) / dnm;
    let t1 = ((b.x - a.x) * (a.y - c.y) - (b.y - a.y) * (a.x - c.x)) / dnm;
    Some(LineIntersection {
        point: a + (b - a) * t0,
        t0,
        t1,
    })
}

/// Intersection point of segments AB and CD, if they cross or touch.
pub fn segment_intersection(a: Point, b: Point, c: Point, d: Point) -> Option<LineIntersection> {
    if !line_segment_intersects(a, b, c, d) {
        return None;
    }
    line_line_intersection(a, b, c, d).map(|mut ix| {
        ix.t0 = ix.t0.clamp(0.0, 1.0);
        ix.t1 = ix.t1.clamp(0.0, 1.0);
        ix
    })
}

/// Result of intersecting segment AB with a circle.
#[derive(Clone, Debug, PartialEq)]
pub struct LineCircleIntersection {
    pub a_inside: bool,
    pub b_inside: bool,
    /// Proper crossings within the segment, nearest to A first.
    /// Tangent contacts are not reported.
    pub crossings: Vec<(f64, Point)>,
}

impl LineCircleIntersection {
    /// Both endpoints inside and no crossings.
    pub fn contained(&self) -> bool {
        self.a_inside && self.b_inside && self.crossings.is_empty()
    }
}

/// Intersect segment AB with the circle (center, radius).
pub fn line_circle_intersection(
    a: Point,
    b: Point,
    center: Point,
    radius: f64,
    epsilon: f64,
) -> LineCircleIntersection {
    let r2 = radius * radius;
    let a_inside = distance_squared(a, center) <= r2 + epsilon;
    let b_inside = distance_squared(b, center) <= r2 + epsilon;

    let d = b - a;
    let f = a - center;
    let qa = d.dot(d);
    let mut crossings = Vec::new();
    if qa > 0.0 {
        let qb = 2.0 * f.dot(d);
        let qc = f.dot(f) - r2;
        let disc = qb * qb - 4.0 * qa * qc;
        if disc > 0.0 {
            let root = disc.sqrt();
            for t in [(-qb - root) / (2.0 * qa), (-qb + root) / (2.0 * qa)] {
                if (-epsilon..=1.0 + epsilon).contains(&t) {
                    let t = t.clamp(0.0, 1.0);
                    crossings.push((t, a + d * t));
                }
            }
        }
    }
    LineCircleIntersection {
        a_inside,
        b_inside,
        crossings,
    }
}

/// Parameter of the projection of `p` onto the line AB.
pub fn project_parameter(a: Point, b: Point, p: Point) -> f64 {
    let d = b - a;
    let len2 = d.length_squared();
    if len2 == 0.0 {
        return 0.0;
    }
    (p - a).dot(d) / len2
}
