// Copyright 2025 Lars Brubaker
// License: MIT
//
// Elevation-aware travel checks.
//
// A straight move (or sight line) between two 3D points collides with a
// wall when the ground segments cross and the interpolated elevation at
// the crossing lies inside the wall's elevation range.

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ensure_finite, SweepResult};
use crate::geom::{project_parameter, Point, Point3};
use crate::intersections::sort_red_black;
use crate::obstacle::{ObstacleProvider, SenseChannel, SenseType, Wall, WallId};
use crate::rect::Rect;

/// One wall crossed by a travel ray.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TravelCollision {
    pub wall: WallId,
    pub point: Point3,
    /// Fraction of the way from origin to destination.
    pub t: f64,
    pub sense: SenseType,
}

fn check_point(what: &'static str, p: Point3) -> SweepResult<()> {
    ensure_finite(what, p.x)?;
    ensure_finite(what, p.y)?;
    ensure_finite(what, p.z)?;
    Ok(())
}

/// Every wall blocking `channel` that the ray from `origin` to
/// `destination` crosses at a height it occupies, nearest first.
pub fn collisions<P: ObstacleProvider + ?Sized>(
    origin: Point3,
    destination: Point3,
    provider: &P,
    channel: SenseChannel,
) -> SweepResult<Vec<TravelCollision>> {
    check_point("travel origin", origin)?;
    check_point("travel destination", destination)?;
    let (a, b) = (origin.truncate(), destination.truncate());
    if a == b {
        return Ok(Vec::new());
    }

    let walls: Vec<&Wall> = provider
        .walls_in(&Rect::from_corners(a, b).pad(1.0))
        .into_iter()
        .filter(|w| w.sense(channel).blocks())
        .collect();
    let ray: [(Point, Point); 1] = [(a, b)];

    let mut found = Vec::new();
    let _ = sort_red_black(&ray, &walls, |_, j, p| {
        let wall = walls[j];
        let t = project_parameter(a, b, p).clamp(0.0, 1.0);
        let z = origin.z + (destination.z - origin.z) * t;
        if wall.spans_elevation(z) {
            found.push(TravelCollision {
                wall: wall.id,
                point: p.extend(z),
                t,
                sense: wall.sense(channel),
            });
        } else {
            trace!(wall = wall.id.0, z, "travel passes over or under wall");
        }
        ControlFlow::Continue(())
    });
    found.sort_by(|x, y| x.t.total_cmp(&y.t).then(x.wall.cmp(&y.wall)));
    Ok(found)
}

/// The collision that stops travel: the first normal wall, or the second
/// limited one.
pub fn first_collision<P: ObstacleProvider + ?Sized>(
    origin: Point3,
    destination: Point3,
    provider: &P,
    channel: SenseChannel,
) -> SweepResult<Option<TravelCollision>> {
    let mut limited_seen = false;
    for hit in collisions(origin, destination, provider, channel)? {
        match hit.sense {
            SenseType::Normal => return Ok(Some(hit)),
            SenseType::Limited if limited_seen => return Ok(Some(hit)),
            SenseType::Limited => limited_seen = true,
            SenseType::None => {}
        }
    }
    Ok(None)
}

pub fn has_collision<P: ObstacleProvider + ?Sized>(
    origin: Point3,
    destination: Point3,
    provider: &P,
    channel: SenseChannel,
) -> SweepResult<bool> {
    Ok(first_collision(origin, destination, provider, channel)?.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SweepError;
    use crate::obstacle::WallSet;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn scene() -> WallSet {
        let mut set = WallSet::new(Rect::new(0.0, 0.0, 1000.0, 1000.0));
        set.insert(Wall::new(WallId(1), p(100.0, 0.0), p(100.0, 200.0)).with_elevation(0.0, 10.0))
            .unwrap();
        set
    }

    #[test]
    fn low_wall_is_passed_over() {
        let set = scene();
        let from = Point3::new(50.0, 100.0, 20.0);
        let to = Point3::new(150.0, 100.0, 20.0);
        assert!(!has_collision(from, to, &set, SenseChannel::Move).unwrap());
    }

    #[test]
    fn walking_into_the_wall_is_blocked() {
        let set = scene();
        let from = Point3::new(50.0, 100.0, 0.0);
        let to = Point3::new(150.0, 100.0, 0.0);
        let hit = first_collision(from, to, &set, SenseChannel::Move).unwrap().unwrap();
        assert_eq!(hit.wall, WallId(1));
        assert!((hit.t - 0.5).abs() < 1e-9);
        assert!(hit.point.distance(Point3::new(100.0, 100.0, 0.0)) < 1e-9);
    }

    #[test]
    fn descending_ray_uses_interpolated_height() {
        let set = scene();
        // Height 12 at the wall: clears it.
        let high = first_collision(
            Point3::new(50.0, 100.0, 14.0),
            Point3::new(150.0, 100.0, 10.0),
            &set,
            SenseChannel::Sight,
        )
        .unwrap();
        assert!(high.is_none());
        // Height 8 at the wall: blocked.
        let low = first_collision(
            Point3::new(50.0, 100.0, 14.0),
            Point3::new(150.0, 100.0, 2.0),
            &set,
            SenseChannel::Sight,
        )
        .unwrap();
        assert!(low.is_some());
    }

    #[test]
    fn limited_walls_block_on_the_second_crossing() {
        let mut set = WallSet::new(Rect::new(0.0, 0.0, 1000.0, 1000.0));
        for (i, x) in [100.0, 200.0].into_iter().enumerate() {
            set.insert(
                Wall::new(WallId(i as u32), p(x, 0.0), p(x, 200.0))
                    .with_sense(SenseChannel::Sight, SenseType::Limited),
            )
            .unwrap();
        }
        let from = Point3::new(50.0, 100.0, 0.0);
        assert!(!has_collision(from, Point3::new(150.0, 100.0, 0.0), &set, SenseChannel::Sight).unwrap());
        let hit = first_collision(from, Point3::new(250.0, 100.0, 0.0), &set, SenseChannel::Sight)
            .unwrap()
            .unwrap();
        assert_eq!(hit.wall, WallId(1));
        assert_eq!(collisions(from, Point3::new(250.0, 100.0, 0.0), &set, SenseChannel::Sight).unwrap().len(), 2);
    }

    #[test]
    fn non_blocking_channel_and_bad_input() {
        let mut set = scene();
        set.insert(
            Wall::new(WallId(2), p(120.0, 0.0), p(120.0, 200.0))
                .with_sense(SenseChannel::Sound, SenseType::None),
        )
        .unwrap();
        let from = Point3::new(110.0, 100.0, 0.0);
        let to = Point3::new(150.0, 100.0, 0.0);
        assert!(!has_collision(from, to, &set, SenseChannel::Sound).unwrap());
        assert!(has_collision(from, to, &set, SenseChannel::Sight).unwrap());
        assert!(matches!(
            has_collision(Point3::new(f64::NAN, 0.0, 0.0), to, &set, SenseChannel::Sight),
            Err(SweepError::NonFinite { .. })
        ));
        assert!(collisions(from, from, &set, SenseChannel::Sight).unwrap().is_empty());
    }
}
