// Copyright 2025 Lars Brubaker
// License: MIT
//
// Segment/segment intersection finders.
//
// Two strategies over two shapes of input:
//   - brute force, O(n^2) pair tests;
//   - sort-and-scan, which orders segments by their north-west endpoint and
//     only tests a segment against followers whose north-west x does not
//     exceed its own south-east x.
// Each comes in a "single set" form (every pair within one slice) and a
// "red/black" form (only pairs with one segment from each slice).
//
// Finders report (i, j, point) through a callback that may stop the search
// early, which is how the has_intersection variants are built.

use std::cmp::Ordering;
use std::ops::ControlFlow;

use crate::geom::{compare_xy, segment_intersection, Point};

/// Anything with two endpoints.
pub trait Segment {
    fn a(&self) -> Point;
    fn b(&self) -> Point;

    /// Lexicographically smaller endpoint (x, then y).
    fn nw(&self) -> Point {
        let (a, b) = (self.a(), self.b());
        if compare_xy(a, b) == Ordering::Greater {
            b
        } else {
            a
        }
    }

    /// Lexicographically larger endpoint.
    fn se(&self) -> Point {
        let (a, b) = (self.a(), self.b());
        if compare_xy(a, b) == Ordering::Greater {
            a
        } else {
            b
        }
    }
}

impl Segment for (Point, Point) {
    fn a(&self) -> Point {
        self.0
    }
    fn b(&self) -> Point {
        self.1
    }
}

impl<S: Segment + ?Sized> Segment for &S {
    fn a(&self) -> Point {
        (**self).a()
    }
    fn b(&self) -> Point {
        (**self).b()
    }
    fn nw(&self) -> Point {
        (**self).nw()
    }
    fn se(&self) -> Point {
        (**self).se()
    }
}

/// Point where two segments touch or cross, if any.
pub fn intersect_segments<S: Segment + ?Sized, T: Segment + ?Sized>(s: &S, t: &T) -> Option<Point> {
    segment_intersection(s.a(), s.b(), t.a(), t.b()).map(|ix| ix.point)
}

// ─────── Brute force ──────────────────────────────────────────────────────────

/// Test every pair `(i, j)` with `i < j`.
pub fn brute_single<S, F>(segments: &[S], mut report: F) -> ControlFlow<()>
where
    S: Segment,
    F: FnMut(usize, usize, Point) -> ControlFlow<()>,
{
    for i in 0..segments.len() {
        for j in (i + 1)..segments.len() {
            if let Some(p) = intersect_segments(&segments[i], &segments[j]) {
                report(i, j, p)?;
            }
        }
    }
    ControlFlow::Continue(())
}

/// Test every `(red, black)` pair.
pub fn brute_red_black<R, B, F>(red: &[R], black: &[B], mut report: F) -> ControlFlow<()>
where
    R: Segment,
    B: Segment,
    F: FnMut(usize, usize, Point) -> ControlFlow<()>,
{
    for (i, r) in red.iter().enumerate() {
        for (j, b) in black.iter().enumerate() {
            if let Some(p) = intersect_segments(r, b) {
                report(i, j, p)?;
            }
        }
    }
    ControlFlow::Continue(())
}

// ─────── Sort and scan ────────────────────────────────────────────────────────

/// North-west endpoint and south-east x of a segment, computed once per
/// finder call.
#[derive(Copy, Clone, Debug)]
struct ScanKey<T> {
    nw: Point,
    se_x: f64,
    item: T,
}

impl<T> ScanKey<T> {
    fn new<S: Segment>(segment: &S, item: T) -> Self {
        Self {
            nw: segment.nw(),
            se_x: segment.se().x,
            item,
        }
    }
}

fn sort_keys<T>(keys: &mut [ScanKey<T>]) {
    keys.sort_by(|x, y| compare_xy(x.nw, y.nw));
}

fn order_by_nw<S: Segment>(segments: &[S]) -> Vec<ScanKey<usize>> {
    let mut keys: Vec<ScanKey<usize>> = segments
        .iter()
        .enumerate()
        .map(|(i, s)| ScanKey::new(s, i))
        .collect();
    sort_keys(&mut keys);
    keys
}

/// Same pairs as `brute_single`, reported with the smaller index first.
pub fn sort_single<S, F>(segments: &[S], mut report: F) -> ControlFlow<()>
where
    S: Segment,
    F: FnMut(usize, usize, Point) -> ControlFlow<()>,
{
    let order = order_by_nw(segments);
    for (k, key) in order.iter().enumerate() {
        let i = key.item;
        for other in &order[k + 1..] {
            if other.nw.x > key.se_x {
                break;
            }
            let j = other.item;
            if let Some(p) = intersect_segments(&segments[i], &segments[j]) {
                report(i.min(j), i.max(j), p)?;
            }
        }
    }
    ControlFlow::Continue(())
}

/// Same pairs as `brute_red_black`, found by merging both sets in
/// north-west order.
pub fn sort_red_black<R, B, F>(red: &[R], black: &[B], mut report: F) -> ControlFlow<()>
where
    R: Segment,
    B: Segment,
    F: FnMut(usize, usize, Point) -> ControlFlow<()>,
{
    #[derive(Copy, Clone)]
    enum Item {
        Red(usize),
        Black(usize),
    }

    let mut items: Vec<ScanKey<Item>> = red
        .iter()
        .enumerate()
        .map(|(i, s)| ScanKey::new(s, Item::Red(i)))
        .chain(black.iter().enumerate().map(|(j, s)| ScanKey::new(s, Item::Black(j))))
        .collect();
    sort_keys(&mut items);

    for (k, key) in items.iter().enumerate() {
        for other in &items[k + 1..] {
            if other.nw.x > key.se_x {
                break;
            }
            let (i, j) = match (key.item, other.item) {
                (Item::Red(i), Item::Black(j)) | (Item::Black(j), Item::Red(i)) => (i, j),
                _ => continue,
            };
            if let Some(p) = intersect_segments(&red[i], &black[j]) {
                report(i, j, p)?;
            }
        }
    }
    ControlFlow::Continue(())
}

// ─────── Convenience ──────────────────────────────────────────────────────────

/// Does any pair within `segments` touch?
pub fn has_intersection_single<S: Segment>(segments: &[S]) -> bool {
    sort_single(segments, |_, _, _| ControlFlow::Break(())).is_break()
}

/// Does any red segment touch any black segment?
pub fn has_intersection_red_black<R: Segment, B: Segment>(red: &[R], black: &[B]) -> bool {
    sort_red_black(red, black, |_, _, _| ControlFlow::Break(())).is_break()
}

/// All pairs within `segments`, sorted.
pub fn collect_single<S: Segment>(segments: &[S]) -> Vec<(usize, usize, Point)> {
    let mut out = Vec::new();
    let _ = sort_single(segments, |i, j, p| {
        out.push((i, j, p));
        ControlFlow::Continue(())
    });
    out.sort_by(|x, y| (x.0, x.1).cmp(&(y.0, y.1)));
    out
}

/// All red/black pairs, sorted.
pub fn collect_red_black<R: Segment, B: Segment>(red: &[R], black: &[B]) -> Vec<(usize, usize, Point)> {
    let mut out = Vec::new();
    let _ = sort_red_black(red, black, |i, j, p| {
        out.push((i, j, p));
        ControlFlow::Continue(())
    });
    out.sort_by(|x, y| (x.0, x.1).cmp(&(y.0, y.1)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(ax: f64, ay: f64, bx: f64, by: f64) -> (Point, Point) {
        (Point::new(ax, ay), Point::new(bx, by))
    }

    fn pairs_brute(segs: &[(Point, Point)]) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        let _ = brute_single(segs, |i, j, _| {
            out.push((i, j));
            ControlFlow::Continue(())
        });
        out.sort();
        out
    }

    #[test]
    fn nw_and_se_are_lexicographic() {
        let s = seg(10.0, 0.0, 0.0, 5.0);
        assert_eq!(s.nw(), Point::new(0.0, 5.0));
        assert_eq!(s.se(), Point::new(10.0, 0.0));
        let v = seg(0.0, 5.0, 0.0, 1.0);
        assert_eq!(v.nw(), Point::new(0.0, 1.0));
    }

    #[test]
    fn sort_matches_brute() {
        let segs = vec![
            seg(0.0, 0.0, 10.0, 10.0),
            seg(0.0, 10.0, 10.0, 0.0),
            seg(20.0, 0.0, 30.0, 0.0),
            seg(5.0, -5.0, 5.0, 15.0),
            seg(-5.0, 3.0, 40.0, 3.0),
        ];
        let sorted: Vec<(usize, usize)> =
            collect_single(&segs).into_iter().map(|(i, j, _)| (i, j)).collect();
        assert_eq!(sorted, pairs_brute(&segs));
        assert!(sorted.contains(&(0, 1)));
        assert!(!sorted.contains(&(2, 3)));
    }

    #[test]
    fn red_black_only_reports_cross_pairs() {
        let red = vec![seg(0.0, 0.0, 10.0, 10.0), seg(0.0, 10.0, 10.0, 0.0)];
        let black = vec![seg(5.0, -5.0, 5.0, 15.0)];
        let found = collect_red_black(&red, &black);
        assert_eq!(found.len(), 2);
        assert_eq!((found[0].0, found[0].1), (0, 0));
        assert_eq!((found[1].0, found[1].1), (1, 0));

        let mut brute = Vec::new();
        let _ = brute_red_black(&red, &black, |i, j, _| {
            brute.push((i, j));
            ControlFlow::Continue(())
        });
        assert_eq!(brute, vec![(0, 0), (1, 0)]);
    }

    /// Segment that counts how often its scan keys are asked for.
    struct Counted {
        a: Point,
        b: Point,
        keys: std::cell::Cell<usize>,
    }

    impl Segment for Counted {
        fn a(&self) -> Point {
            self.a
        }
        fn b(&self) -> Point {
            self.b
        }
        fn nw(&self) -> Point {
            self.keys.set(self.keys.get() + 1);
            if compare_xy(self.a, self.b) == Ordering::Greater {
                self.b
            } else {
                self.a
            }
        }
    }

    #[test]
    fn scan_keys_are_computed_once_per_segment() {
        let counted = |ax: f64, ay: f64, bx: f64, by: f64| Counted {
            a: Point::new(ax, ay),
            b: Point::new(bx, by),
            keys: std::cell::Cell::new(0),
        };
        let segs: Vec<Counted> = (0..12)
            .map(|i| {
                let x = i as f64 * 3.0;
                counted(x, 0.0, x + 20.0, 10.0 - i as f64)
            })
            .collect();
        let _ = sort_single(&segs, |_, _, _| ControlFlow::Continue(()));
        assert!(segs.iter().all(|s| s.keys.get() == 1));

        let black = vec![counted(0.0, 5.0, 60.0, 5.0), counted(30.0, -10.0, 30.0, 20.0)];
        let _ = sort_red_black(&segs, &black, |_, _, _| ControlFlow::Continue(()));
        assert!(segs.iter().all(|s| s.keys.get() == 2));
        assert!(black.iter().all(|s| s.keys.get() == 1));
    }

    #[test]
    fn has_intersection_stops_early() {
        let segs = vec![seg(0.0, 0.0, 10.0, 0.0), seg(20.0, 0.0, 30.0, 5.0)];
        assert!(!has_intersection_single(&segs));
        let black = vec![seg(25.0, -5.0, 25.0, 5.0)];
        assert!(has_intersection_red_black(&segs, &black));
    }
}
