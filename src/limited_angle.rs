// Copyright 2025 Lars Brubaker
// License: MIT
//
// Angular sector ("limited angle") boundary.
//
// The sector is stored as a closed clockwise polygon: apex, the point where
// the min ray leaves the canvas, the canvas corners between the two rays,
// the point where the max ray leaves the canvas, and back to the apex. The
// apex sits one pixel behind the sweep origin so the origin is strictly
// inside.

use serde::{Deserialize, Serialize};

use crate::combine::{
    combine, outline_crossings, outline_position, outline_tangent, outline_vertices_between,
    TraceBoundary,
};
use crate::config::{EPSILON, SECTOR_NUDGE};
use crate::error::{ensure_finite, SweepError, SweepResult};
use crate::geom::{line_segment_intersects, orient, ray_point, Point};
use crate::polygon::Polygon;
use crate::rect::Rect;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LimitedAngle {
    /// Sweep origin the sector was built for.
    pub origin: Point,
    /// Nudged apex of the sector.
    pub apex: Point,
    /// Total angle in degrees, in (0, 360].
    pub angle: f64,
    /// Direction of the bisector in degrees, clockwise from +x.
    pub rotation: f64,
    /// Where the counterclockwise-most ray meets the canvas edge.
    pub min_point: Point,
    /// Where the clockwise-most ray meets the canvas edge.
    pub max_point: Point,
    polygon: Polygon,
}

fn direction(degrees: f64) -> Point {
    let r = degrees.to_radians();
    Point::new(r.cos(), r.sin())
}

impl LimitedAngle {
    pub fn new(origin: Point, angle: f64, rotation: f64, canvas: &Rect) -> SweepResult<Self> {
        ensure_finite("sector origin x", origin.x)?;
        ensure_finite("sector origin y", origin.y)?;
        ensure_finite("sector rotation", rotation)?;
        if !(angle > 0.0 && angle <= 360.0) {
            return Err(SweepError::InvalidAngle(angle));
        }

        let apex = origin - direction(rotation) * SECTOR_NUDGE;
        let exit = |degrees: f64| {
            let toward = apex + direction(degrees);
            canvas
                .ray_exit(apex, toward)
                .unwrap_or_else(|| ray_point(apex, toward, canvas.diagonal()))
        };
        let min_point = exit(rotation - angle / 2.0);
        let max_point = exit(rotation + angle / 2.0);

        let mut points = vec![apex, min_point];
        points.extend(corners_between(canvas, min_point, max_point, angle >= 360.0));
        points.push(max_point);
        points.push(apex);
        let mut polygon = Polygon::new(points);
        polygon.dedupe(EPSILON);

        Ok(Self {
            origin,
            apex,
            angle,
            rotation,
            min_point,
            max_point,
            polygon,
        })
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn bounds(&self) -> Rect {
        self.polygon
            .bounds()
            .unwrap_or(Rect::new(self.apex.x, self.apex.y, 0.0, 0.0))
    }

    /// Is `p` inside the sector (canvas-clipped)?
    pub fn contains_point(&self, p: Point) -> bool {
        let o_min = orient(self.apex, self.min_point, p);
        let o_max = orient(self.apex, self.max_point, p);
        let in_wedge = if self.angle <= 180.0 {
            o_min <= 0.0 && o_max >= 0.0
        } else {
            !(o_min > 0.0 && o_max < 0.0)
        };
        in_wedge
            && self
                .polygon
                .bounds()
                .map_or(false, |b| b.pad(EPSILON).contains_point(p))
    }

    /// True when segment AB cannot contribute to a sweep bounded by this
    /// sector.
    pub fn edge_is_outside(&self, a: Point, b: Point) -> bool {
        let ccw_of_min = |p: Point| orient(self.apex, self.min_point, p) > 0.0;
        let cw_of_max = |p: Point| orient(self.apex, self.max_point, p) < 0.0;

        if self.angle < 180.0 {
            // The wedge is the intersection of two half-planes.
            if (ccw_of_min(a) && ccw_of_min(b)) || (cw_of_max(a) && cw_of_max(b)) {
                return true;
            }
        } else if self.angle == 180.0 {
            if ccw_of_min(a) && ccw_of_min(b) {
                return true;
            }
        } else if ccw_of_min(a) && cw_of_max(a) && ccw_of_min(b) && cw_of_max(b) {
            // Both ends in the convex excluded wedge.
            return true;
        }

        !self.contains_point(a)
            && !self.contains_point(b)
            && !line_segment_intersects(a, b, self.apex, self.min_point)
            && !line_segment_intersects(a, b, self.apex, self.max_point)
    }

    pub fn intersect_polygon(&self, polygon: &Polygon) -> Option<Polygon> {
        combine(polygon, self, true)
    }

    pub fn union_polygon(&self, polygon: &Polygon) -> Option<Polygon> {
        combine(polygon, self, false)
    }
}

/// Canvas corners met walking clockwise along the outline from `from` to
/// `to`, both of which lie on the outline.
fn corners_between(canvas: &Rect, from: Point, to: Point, full_turn: bool) -> Vec<Point> {
    let perimeter = canvas.perimeter();
    let start = canvas.outline_position(from);
    let mut span = (canvas.outline_position(to) - start).rem_euclid(perimeter);
    if full_turn && span <= EPSILON {
        span = perimeter;
    }
    let mut corners: Vec<(f64, Point)> = canvas
        .corners()
        .iter()
        .map(|&c| ((canvas.outline_position(c) - start).rem_euclid(perimeter), c))
        .filter(|&(offset, _)| offset > EPSILON && offset < span - EPSILON)
        .collect();
    corners.sort_by(|x, y| x.0.total_cmp(&y.0));
    corners.into_iter().map(|(_, c)| c).collect()
}

impl TraceBoundary for LimitedAngle {
    /// Only the two rays matter; the canvas part of the outline never
    /// crosses a polygon that is itself clipped to the canvas.
    fn segment_crossings(&self, a: Point, b: Point) -> Vec<(f64, Point)> {
        let pts = self.polygon.open_points();
        let last = pts.len().saturating_sub(1);
        outline_crossings(pts, a, b, [0, last].into_iter())
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
        LimitedAngle::contains_point(self, p)
    }

    fn to_polygon(&self) -> Polygon {
        self.polygon.clone()
    }
}
