// Copyright 2025 Lars Brubaker
// License: MIT
//
// Circular boundary (vision or light radius).
//
// The circle is never clipped as a polygon. The combiner asks it for true
// line/circle crossings and only synthesizes padding points for the arcs
// that end up in the output.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::combine::{combine, TraceBoundary};
use crate::config::{CIRCLE_TOLERANCE, EPSILON};
use crate::geom::{clockwise_angle, distance_squared, line_circle_intersection, Point};
use crate::polygon::Polygon;
use crate::rect::Rect;

/// Number of points needed so a polygon stays within `tolerance` pixels of
/// a circle of the given radius.
pub fn approximate_vertex_density(radius: f64, tolerance: f64) -> usize {
    if radius <= 0.0 || tolerance <= 0.0 {
        return 3;
    }
    let n = (PI / (2.0 * (tolerance / radius)).sqrt()).ceil();
    (n as usize).max(3)
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
    /// Points used for a full turn when the arc is approximated.
    pub density: usize,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            center,
            radius,
            density: approximate_vertex_density(radius, CIRCLE_TOLERANCE),
        }
    }

    pub fn with_density(mut self, density: usize) -> Self {
        self.density = density.max(3);
        self
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            2.0 * self.radius,
            2.0 * self.radius,
        )
    }

    pub fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }

    fn point_at(&self, angle: f64) -> Point {
        self.center + Point::new(angle.cos(), angle.sin()) * self.radius
    }

    /// Padding points strictly inside the clockwise arc from angle `from`
    /// to angle `to`, spaced at the circle's density.
    pub fn padding_points(&self, from: f64, to: f64) -> Vec<Point> {
        let arc = (to - from).rem_euclid(TAU);
        let delta = TAU / self.density as f64;
        let n = (arc / delta).round() as usize;
        (1..n)
            .map(|i| self.point_at(from + arc * i as f64 / n as f64))
            .collect()
    }

    pub fn intersect_polygon(&self, polygon: &Polygon) -> Option<Polygon> {
        combine(polygon, self, true)
    }

    pub fn union_polygon(&self, polygon: &Polygon) -> Option<Polygon> {
        combine(polygon, self, false)
    }
}

impl TraceBoundary for Circle {
    fn segment_crossings(&self, a: Point, b: Point) -> Vec<(f64, Point)> {
        let ix = line_circle_intersection(a, b, self.center, self.radius, EPSILON);
        if !ix.crossings.is_empty() {
            // A chord of a disk cannot leave it.
            let strict = self.radius * self.radius * (1.0 - 1e-9);
            let a_deep = distance_squared(a, self.center) < strict;
            let b_deep = distance_squared(b, self.center) < strict;
            if a_deep && b_deep {
                warn!(?a, ?b, "both endpoints inside circle but crossings reported; ignoring");
                return Vec::new();
            }
        }
        ix.crossings
    }

    fn outline_position(&self, p: Point) -> f64 {
        clockwise_angle(self.center, p)
    }

    fn outline_points_between(&self, from: f64, to: f64) -> Vec<Point> {
        self.padding_points(from, to)
    }

    fn tangent_at(&self, _position: f64, p: Point) -> Point {
        let r = p - self.center;
        Point::new(-r.y, r.x)
    }

    fn contains_point(&self, p: Point) -> bool {
        let r = self.radius + EPSILON;
        distance_squared(p, self.center) <= r * r
    }

    fn to_polygon(&self) -> Polygon {
        let n = self.density;
        let mut points: Vec<Point> = (0..n)
            .map(|i| self.point_at(TAU * i as f64 / n as f64))
            .collect();
        points.push(points[0]);
        Polygon::new(points)
    }
}
