// Copyright 2025 Lars Brubaker
// License: MIT
//
// Clockwise radial sweep.
//
// Walls, temporary edges and the canvas sides go into an edge arena. Their
// endpoints and mutual intersections become vertices, sorted clockwise
// around the origin starting due west. The sweep visits each group of
// vertices that lie on one ray, updates the set of edges crossing the ray,
// and emits collision points wherever the nearest blocking edge changes.
// The raw polygon is then clipped by the sector, circle or custom boundary.

mod rays;
mod vertices;


use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::circle::{approximate_vertex_density, Circle};
use crate::combine::Boundary;
use crate::config::{SweepConfig, CIRCLE_TOLERANCE, EPSILON, ORIGIN_INSET};
use crate::edge::{EdgeIdx, INVALID};
use crate::error::{ensure_finite, SweepResult};
use crate::geom::Point;
use crate::limited_angle::LimitedAngle;
use crate::obstacle::{ObstacleProvider, WallId};
use crate::polygon::Polygon;
use crate::rect::Rect;

use rays::{collect_hits, emit, stopping_hit, Side};
use vertices::{build_arena, sort_vertices};

/// How the visible outline changes at one ray.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    /// The vertices are hidden behind the same blocking edge.
    Occluded,
    /// Only limited edges meet here and nothing changes.
    LimitedToLimited,
    /// The outline turns a corner without jumping.
    EdgeToEdge,
    /// The outline jumps forward to a nearer edge.
    BeginEdge,
    /// The outline jumps back to a farther edge.
    EndEdge,
}

/// One processed ray of the sweep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepRay {
    /// Nearest vertex of the group the ray was cast toward.
    pub target: Point,
    pub transition: Transition,
    /// Points this ray added to the raw polygon, in order.
    pub points: Vec<Point>,
}

/// Everything a sweep produced.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepOutput {
    /// Closed clockwise visibility polygon after boundary clipping.
    pub polygon: Polygon,
    /// Origin the sweep actually used: rounded to whole pixels and moved
    /// off the scene edge.
    pub origin: Point,
    pub rays: Vec<SweepRay>,
    /// Walls left out because they do not exist at the sweep elevation.
    pub partitioned: Vec<WallId>,
}

/// Move an origin on the scene edge strictly inside it. A canvas side
/// through the origin is collinear with it and never enters the arena.
fn inset_origin(origin: Point, canvas: &Rect) -> Point {
    let inset = |v: f64, lo: f64, hi: f64| {
        let mid = (lo + hi) / 2.0;
        if v <= lo {
            (lo + ORIGIN_INSET).min(mid)
        } else if v >= hi {
            (hi - ORIGIN_INSET).max(mid)
        } else {
            v
        }
    };
    let moved = Point::new(
        inset(origin.x, canvas.left(), canvas.right()),
        inset(origin.y, canvas.top(), canvas.bottom()),
    );
    if moved != origin {
        debug!(?origin, ?moved, "sweep origin moved off the scene edge");
    }
    moved
}

/// A configured sweep, reusable across origins and obstacle sets.
#[derive(Clone, Debug)]
pub struct ClockwiseSweep {
    config: SweepConfig,
}

impl ClockwiseSweep {
    pub fn new(config: SweepConfig) -> SweepResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Visibility polygon only.
    pub fn sweep<P: ObstacleProvider + ?Sized>(
        &self,
        origin: Point,
        provider: &P,
    ) -> SweepResult<Option<Polygon>> {
        Ok(self.compute(origin, provider)?.map(|out| out.polygon))
    }

    /// Run the sweep from `origin`. Returns Ok(None) when the origin is
    /// off the canvas or the boundary leaves nothing visible.
    pub fn compute<P: ObstacleProvider + ?Sized>(
        &self,
        origin: Point,
        provider: &P,
    ) -> SweepResult<Option<SweepOutput>> {
        ensure_finite("origin x", origin.x)?;
        ensure_finite("origin y", origin.y)?;
        let origin = origin.round();
        let cfg = &self.config;

        let canvas = provider.scene_rect();
        if !canvas.contains_point(origin) {
            warn!(?origin, "sweep origin is outside the scene");
            return Ok(None);
        }
        let origin = inset_origin(origin, &canvas);

        // ─────── Boundaries ───────
        let mut boundaries = Vec::new();
        let sector = if cfg.has_limited_angle() {
            Some(LimitedAngle::new(origin, cfg.angle, cfg.rotation, &canvas)?)
        } else {
            None
        };
        if let Some(s) = &sector {
            boundaries.push(Boundary::Sector(s.clone()));
        }
        if let Some(points) = &cfg.boundary_polygon {
            let custom = Polygon::new(points.clone());
            if custom.vertex_count() >= 3 && custom.contains_point(origin) {
                boundaries.push(Boundary::polygon(&custom));
            } else {
                warn!(
                    points = custom.vertex_count(),
                    "custom boundary does not contain the origin; ignoring it"
                );
            }
        } else if let Some(radius) = cfg.limited_radius() {
            let density = cfg
                .density
                .unwrap_or_else(|| approximate_vertex_density(radius, CIRCLE_TOLERANCE));
            boundaries.push(Boundary::Circle(
                Circle::new(origin, radius).with_density(density),
            ));
        }

        let mut cull = canvas;
        for b in boundaries.iter().filter(|b| !matches!(b, Boundary::Sector(_))) {
            if let Some(r) = cull.intersection(&b.bounds().pad(1.0)) {
                cull = r;
            }
        }

        // ─────── Edges and vertices ───────
        let built = build_arena(origin, cfg, &canvas, &cull, sector.as_ref(), provider);
        let arena = built.arena;
        let (order, groups) = sort_vertices(&arena, origin);

        let mut active: BTreeSet<EdgeIdx> = arena
            .edges
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                let (ra, rb) = (order[e.vertex_a as usize], order[e.vertex_b as usize]);
                ra != INVALID && rb != INVALID && ra > rb
            })
            .map(|(i, _)| i as EdgeIdx)
            .collect();

        debug!(
            edges = arena.edges.len(),
            vertices = arena.verts.len(),
            intersections = arena.intersection_count(),
            groups = groups.len(),
            culled = built.culled,
            partitioned = built.partitioned.len(),
            "clockwise sweep"
        );

        // ─────── Sweep ───────
        let radius_max = canvas.diagonal();
        let mut points: Vec<Point> = Vec::new();
        let mut rays = Vec::with_capacity(groups.len());
        for group in &groups {
            let target = arena.vert(group[0]).point;

            let before = collect_hits(&arena, origin, target, &active, group, Side::Before);
            let stop_before = stopping_hit(&arena, &before);

            for &v in group {
                for e in &arena.vert(v).ccw_edges {
                    active.remove(e);
                }
            }
            for &v in group {
                active.extend(arena.vert(v).cw_edges.iter().copied());
            }

            let after = collect_hits(&arena, origin, target, &active, group, Side::After);
            let stop_after = stopping_hit(&arena, &after);

            let ray = emit(&arena, origin, target, radius_max, group, stop_before, stop_after);
            trace!(?target, transition = ?ray.transition, emitted = ray.points.len(), "sweep ray");
            points.extend(ray.points.iter().copied());
            rays.push(ray);
        }

        let mut raw = Polygon::new(points);
        raw.dedupe(EPSILON);
        if raw.vertex_count() < 3 {
            warn!(points = raw.vertex_count(), "sweep produced a degenerate polygon");
            return Ok(None);
        }
        raw.close();

        // ─────── Boundary clipping ───────
        let mut polygon = raw;
        for boundary in &boundaries {
            match boundary.intersect_polygon(&polygon) {
                Some(clipped) => polygon = clipped,
                None => return Ok(None),
            }
        }

        Ok(Some(SweepOutput {
            polygon,
            origin,
            rays,
            partitioned: built.partitioned,
        }))
    }
}
