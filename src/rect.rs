// Copyright 2025 Lars Brubaker
// License: MIT
//
// Axis-aligned rectangle: the canvas boundary, bounding boxes for culling,
// and the clockwise perimeter walk the angular sector needs.

use serde::{Deserialize, Serialize};

use crate::geom::{line_segment_intersects, Point};

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Smallest rectangle containing both corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Bounding box of a point set. None when empty.
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self::from_corners(min, max))
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }
    #[inline]
    pub fn top(&self) -> f64 {
        self.y
    }
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Length of the diagonal; no two points inside are further apart.
    pub fn diagonal(&self) -> f64 {
        self.width.hypot(self.height)
    }

    /// Inclusive containment.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Corners in clockwise order starting at the top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left(), self.top()),
            Point::new(self.right(), self.top()),
            Point::new(self.right(), self.bottom()),
            Point::new(self.left(), self.bottom()),
        ]
    }

    /// The four sides as clockwise directed segments.
    pub fn edges(&self) -> [(Point, Point); 4] {
        let c = self.corners();
        [(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])]
    }

    /// Grow (or shrink, for negative values) on every side.
    pub fn pad(&self, amount: f64) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + 2.0 * amount,
            self.height + 2.0 * amount,
        )
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() <= other.right()
            && other.left() <= self.right()
            && self.top() <= other.bottom()
            && other.top() <= self.bottom()
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.overlaps(other) {
            return None;
        }
        let min = Point::new(self.left().max(other.left()), self.top().max(other.top()));
        let max = Point::new(self.right().min(other.right()), self.bottom().min(other.bottom()));
        Some(Self::from_corners(min, max))
    }

    /// Does segment AB touch this rectangle at all?
    pub fn segment_overlaps(&self, a: Point, b: Point) -> bool {
        if self.contains_point(a) || self.contains_point(b) {
            return true;
        }
        // Cheap reject: both endpoints beyond the same side.
        if (a.x < self.left() && b.x < self.left())
            || (a.x > self.right() && b.x > self.right())
            || (a.y < self.top() && b.y < self.top())
            || (a.y > self.bottom() && b.y > self.bottom())
        {
            return false;
        }
        self.edges()
            .iter()
            .any(|&(c, d)| line_segment_intersects(a, b, c, d))
    }

    pub fn perimeter(&self) -> f64 {
        2.0 * (self.width + self.height)
    }

    /// Clockwise distance along the perimeter from the top-left corner to
    /// `p`, which is assumed to lie on the outline.
    pub fn outline_position(&self, p: Point) -> f64 {
        let dl = (p.x - self.left()).abs();
        let dr = (p.x - self.right()).abs();
        let dt = (p.y - self.top()).abs();
        let db = (p.y - self.bottom()).abs();
        let nearest = dl.min(dr).min(dt).min(db);
        if nearest == dt {
            (p.x - self.left()).clamp(0.0, self.width)
        } else if nearest == dr {
            self.width + (p.y - self.top()).clamp(0.0, self.height)
        } else if nearest == db {
            self.width + self.height + (self.right() - p.x).clamp(0.0, self.width)
        } else {
            2.0 * self.width + self.height + (self.bottom() - p.y).clamp(0.0, self.height)
        }
    }

    /// Where a ray from an interior point `origin` toward `toward` leaves
    /// the rectangle.
    pub fn ray_exit(&self, origin: Point, toward: Point) -> Option<Point> {
        let d = toward - origin;
        let mut t_exit = f64::INFINITY;
        if d.x > 0.0 {
            t_exit = t_exit.min((self.right() - origin.x) / d.x);
        } else if d.x < 0.0 {
            t_exit = t_exit.min((self.left() - origin.x) / d.x);
        }
        if d.y > 0.0 {
            t_exit = t_exit.min((self.bottom() - origin.y) / d.y);
        } else if d.y < 0.0 {
            t_exit = t_exit.min((self.top() - origin.y) / d.y);
        }
        if !t_exit.is_finite() || t_exit < 0.0 {
            return None;
        }
        Some(origin + d * t_exit)
    }
}
