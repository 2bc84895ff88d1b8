// Copyright 2025 Lars Brubaker
// License: MIT
//
// Obstacles as the sweep sees them: walls with per-channel sense types, an
// optional elevation range, and a provider trait that hands them out.
//
// WallSet is the in-memory provider. It keeps a persistent wall/wall
// intersection cache that is patched when walls are added or removed.
// Sweeps only ever read it; call-specific edges are tracked elsewhere.

use std::collections::HashMap;
use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EPSILON;
use crate::error::{ensure_finite, SweepError, SweepResult};
use crate::geom::{point_key, Point};
use crate::intersections::{sort_red_black, sort_single, Segment};
use crate::rect::Rect;

/// What a sweep is computing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenseChannel {
    #[default]
    Sight,
    Light,
    Sound,
    Move,
}

impl SenseChannel {
    pub const ALL: [SenseChannel; 4] = [
        SenseChannel::Sight,
        SenseChannel::Light,
        SenseChannel::Sound,
        SenseChannel::Move,
    ];
}

/// How a wall restricts one channel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenseType {
    /// Never blocks.
    None,
    /// Blocks only behind a second limited wall.
    Limited,
    /// Blocks immediately.
    #[default]
    Normal,
}

impl SenseType {
    pub fn blocks(self) -> bool {
        self != SenseType::None
    }

    /// Numeric form used in GPU buffers.
    pub fn as_f32(self) -> f32 {
        match self {
            SenseType::None => 0.0,
            SenseType::Limited => 1.0,
            SenseType::Normal => 2.0,
        }
    }
}

/// Per-channel sense types of a wall.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Senses {
    pub sight: SenseType,
    pub light: SenseType,
    pub sound: SenseType,
    #[serde(rename = "move")]
    pub movement: SenseType,
}

impl Senses {
    pub fn uniform(sense: SenseType) -> Self {
        Self {
            sight: sense,
            light: sense,
            sound: sense,
            movement: sense,
        }
    }

    pub fn get(&self, channel: SenseChannel) -> SenseType {
        match channel {
            SenseChannel::Sight => self.sight,
            SenseChannel::Light => self.light,
            SenseChannel::Sound => self.sound,
            SenseChannel::Move => self.movement,
        }
    }

    pub fn set(&mut self, channel: SenseChannel, sense: SenseType) {
        match channel {
            SenseChannel::Sight => self.sight = sense,
            SenseChannel::Light => self.light = sense,
            SenseChannel::Sound => self.sound = sense,
            SenseChannel::Move => self.movement = sense,
        }
    }
}

/// Stable wall identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WallId(pub u32);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: WallId,
    pub a: Point,
    pub b: Point,
    #[serde(default)]
    pub senses: Senses,
    /// (bottom, top). None spans every elevation.
    #[serde(default)]
    pub elevation: Option<(f64, f64)>,
}

impl Wall {
    /// A wall that blocks every channel.
    pub fn new(id: WallId, a: Point, b: Point) -> Self {
        Self {
            id,
            a,
            b,
            senses: Senses::default(),
            elevation: None,
        }
    }

    pub fn with_sense(mut self, channel: SenseChannel, sense: SenseType) -> Self {
        self.senses.set(channel, sense);
        self
    }

    pub fn with_senses(mut self, senses: Senses) -> Self {
        self.senses = senses;
        self
    }

    pub fn with_elevation(mut self, bottom: f64, top: f64) -> Self {
        self.elevation = Some((bottom.min(top), bottom.max(top)));
        self
    }

    pub fn sense(&self, channel: SenseChannel) -> SenseType {
        self.senses.get(channel)
    }

    pub fn elevation_range(&self) -> (f64, f64) {
        self.elevation.unwrap_or((f64::NEG_INFINITY, f64::INFINITY))
    }

    /// Does the wall exist at elevation `z`?
    pub fn spans_elevation(&self, z: f64) -> bool {
        let (bottom, top) = self.elevation_range();
        z >= bottom && z <= top
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_corners(self.a, self.b)
    }

    fn is_degenerate(&self) -> bool {
        self.a.distance_squared(self.b) <= EPSILON * EPSILON
    }
}

impl Segment for Wall {
    fn a(&self) -> Point {
        self.a
    }
    fn b(&self) -> Point {
        self.b
    }
}

/// Synthetic edge for a single sweep call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TempEdge {
    pub a: Point,
    pub b: Point,
    #[serde(default)]
    pub sense: SenseType,
}

impl TempEdge {
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            a,
            b,
            sense: SenseType::Normal,
        }
    }

    pub fn with_sense(mut self, sense: SenseType) -> Self {
        self.sense = sense;
        self
    }
}

impl Segment for TempEdge {
    fn a(&self) -> Point {
        self.a
    }
    fn b(&self) -> Point {
        self.b
    }
}

/// Source of obstacles for the sweep.
pub trait ObstacleProvider {
    /// Scene boundary; rays never travel past it.
    fn scene_rect(&self) -> Rect;

    /// Walls that may touch `bounds`.
    fn walls_in(&self, bounds: &Rect) -> Vec<&Wall>;

    fn wall(&self, id: WallId) -> Option<&Wall>;

    /// Cached intersections of one wall with other walls, if the provider
    /// keeps them. Returning None makes the sweep compute them.
    fn wall_intersections(&self, _id: WallId) -> Option<&[(WallId, Point)]> {
        None
    }
}

/// Do two walls only meet at a shared endpoint?
fn shares_endpoint(w: &Wall, other: &Wall, p: Point) -> bool {
    let k = point_key(p);
    let on_w = k == point_key(w.a) || k == point_key(w.b);
    let on_other = k == point_key(other.a) || k == point_key(other.b);
    on_w && on_other
}

/// In-memory obstacle provider.
#[derive(Clone, Debug, Default)]
pub struct WallSet {
    rect: Rect,
    walls: Vec<Wall>,
    index: HashMap<WallId, usize>,
    intersections: HashMap<WallId, Vec<(WallId, Point)>>,
    next_id: u32,
}

impl WallSet {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            ..Self::default()
        }
    }

    /// Build from many walls at once with a single intersection pass.
    pub fn from_walls(rect: Rect, walls: Vec<Wall>) -> SweepResult<Self> {
        let mut set = Self::new(rect);
        for wall in walls {
            validate_wall(&wall)?;
            set.next_id = set.next_id.max(wall.id.0.saturating_add(1));
            if let Some(&i) = set.index.get(&wall.id) {
                set.walls[i] = wall;
            } else {
                set.index.insert(wall.id, set.walls.len());
                set.walls.push(wall);
            }
        }
        set.rebuild_intersections();
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Wall> {
        self.walls.iter()
    }

    pub fn set_scene_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    /// Add a wall blocking every channel with a fresh id.
    pub fn push(&mut self, a: Point, b: Point) -> SweepResult<WallId> {
        let id = WallId(self.next_id);
        self.insert(Wall::new(id, a, b))?;
        Ok(id)
    }

    /// Add or replace a wall and patch the intersection cache.
    pub fn insert(&mut self, wall: Wall) -> SweepResult<()> {
        validate_wall(&wall)?;
        if self.index.contains_key(&wall.id) {
            self.remove(wall.id);
        }
        self.next_id = self.next_id.max(wall.id.0.saturating_add(1));

        let mut found = Vec::new();
        if !wall.is_degenerate() {
            let _ = sort_red_black(std::slice::from_ref(&wall), &self.walls, |_, j, p| {
                let other = &self.walls[j];
                if !other.is_degenerate() && !shares_endpoint(&wall, other, p) {
                    found.push((other.id, p));
                }
                ControlFlow::Continue(())
            });
        }
        for &(other, p) in &found {
            self.intersections.entry(other).or_default().push((wall.id, p));
        }
        debug!(wall = wall.id.0, intersections = found.len(), "inserted wall");
        self.intersections.insert(wall.id, found);
        self.index.insert(wall.id, self.walls.len());
        self.walls.push(wall);
        Ok(())
    }

    /// Remove a wall and every cached intersection that mentions it.
    pub fn remove(&mut self, id: WallId) -> Option<Wall> {
        let i = self.index.remove(&id)?;
        let wall = self.walls.swap_remove(i);
        if let Some(moved) = self.walls.get(i) {
            self.index.insert(moved.id, i);
        }
        if let Some(hits) = self.intersections.remove(&id) {
            for (other, _) in hits {
                if let Some(list) = self.intersections.get_mut(&other) {
                    list.retain(|(w, _)| *w != id);
                }
            }
        }
        Some(wall)
    }

    /// Recompute the whole intersection cache.
    pub fn rebuild_intersections(&mut self) {
        self.intersections = self.walls.iter().map(|w| (w.id, Vec::new())).collect();
        let walls = &self.walls;
        let cache = &mut self.intersections;
        let _ = sort_single(walls, |i, j, p| {
            let (wi, wj) = (&walls[i], &walls[j]);
            if !wi.is_degenerate() && !wj.is_degenerate() && !shares_endpoint(wi, wj, p) {
                cache.entry(wi.id).or_default().push((wj.id, p));
                cache.entry(wj.id).or_default().push((wi.id, p));
            }
            ControlFlow::Continue(())
        });
    }
}

fn validate_wall(wall: &Wall) -> SweepResult<()> {
    ensure_finite("wall x", wall.a.x)?;
    ensure_finite("wall y", wall.a.y)?;
    ensure_finite("wall x", wall.b.x)?;
    ensure_finite("wall y", wall.b.y)?;
    if let Some((bottom, top)) = wall.elevation {
        // Infinite ends are allowed; NaN is not.
        if let Some(value) = [bottom, top].into_iter().find(|v| v.is_nan()) {
            return Err(SweepError::NonFinite {
                what: "wall elevation",
                value,
            });
        }
    }
    Ok(())
}

impl ObstacleProvider for WallSet {
    fn scene_rect(&self) -> Rect {
        self.rect
    }

    fn walls_in(&self, bounds: &Rect) -> Vec<&Wall> {
        self.walls
            .iter()
            .filter(|w| bounds.segment_overlaps(w.a, w.b))
            .collect()
    }

    fn wall(&self, id: WallId) -> Option<&Wall> {
        self.index.get(&id).map(|&i| &self.walls[i])
    }

    fn wall_intersections(&self, id: WallId) -> Option<&[(WallId, Point)]> {
        self.intersections.get(&id).map(|v| v.as_slice())
    }
}
