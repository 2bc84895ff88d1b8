// Copyright 2025 Lars Brubaker
// License: MIT
//
// Interface to a 3D shadow renderer.
//
// The kernel does not render anything. It hands a renderer what it needs:
// flat wall-corner buffers per sense channel, view/projection matrices for
// a light, and the ground shadow of a single wall for CPU-side checks.
// Buffers are cached on an explicit ShadowContext owned by the caller.

use std::collections::HashMap;
use std::f64::consts::PI;

use glam::DMat4;
use tracing::{debug, warn};

use crate::config::{EPSILON, MAX_SHADOW_FOV, UNBOUNDED_WALL_HEIGHT};
use crate::error::{ensure_finite, SweepError, SweepResult};
use crate::geom::{Point, Point3};
use crate::obstacle::{ObstacleProvider, SenseChannel, Wall, WallId};
use crate::polygon::Polygon;
use crate::rect::Rect;

/// Floats per wall: A top, B top, A bottom, B bottom as (x, y, z).
pub const FLOATS_PER_WALL: usize = 12;

/// Wall corner coordinates for one channel, laid out for a vertex buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WallCoordinateBuffer {
    pub channel: SenseChannel,
    pub coords: Vec<f32>,
    /// One sense value per wall (see `SenseType::as_f32`).
    pub senses: Vec<f32>,
    pub ids: Vec<WallId>,
}

fn finite_height(z: f64) -> f64 {
    z.clamp(-UNBOUNDED_WALL_HEIGHT, UNBOUNDED_WALL_HEIGHT)
}

impl WallCoordinateBuffer {
    /// Every wall in the scene that blocks `channel`.
    pub fn build<P: ObstacleProvider + ?Sized>(provider: &P, channel: SenseChannel) -> Self {
        let mut buf = Self {
            channel,
            ..Self::default()
        };
        let mut walls = provider.walls_in(&provider.scene_rect());
        walls.sort_by_key(|w| w.id);
        for wall in walls {
            let sense = wall.sense(channel);
            if !sense.blocks() {
                continue;
            }
            for c in wall_corners(wall) {
                buf.coords.extend([c.x as f32, c.y as f32, c.z as f32]);
            }
            buf.senses.push(sense.as_f32());
            buf.ids.push(wall.id);
        }
        debug!(?channel, walls = buf.ids.len(), "built wall coordinate buffer");
        buf
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Corners of the wall at `index`, in buffer order.
    pub fn corners(&self, index: usize) -> Option<[Point3; 4]> {
        let s = self.coords.get(index * FLOATS_PER_WALL..(index + 1) * FLOATS_PER_WALL)?;
        let c = |i: usize| Point3::new(s[i] as f64, s[i + 1] as f64, s[i + 2] as f64);
        Some([c(0), c(3), c(6), c(9)])
    }

    fn iter_corners(&self) -> impl Iterator<Item = Point3> + '_ {
        self.coords
            .chunks_exact(3)
            .map(|c| Point3::new(c[0] as f64, c[1] as f64, c[2] as f64))
    }
}

/// A top, B top, A bottom, B bottom.
pub fn wall_corners(wall: &Wall) -> [Point3; 4] {
    let (bottom, top) = wall.elevation_range();
    let (bottom, top) = (finite_height(bottom), finite_height(top));
    [
        wall.a.extend(top),
        wall.b.extend(top),
        wall.a.extend(bottom),
        wall.b.extend(bottom),
    ]
}

/// Per-channel buffer cache. Call `invalidate` when walls change.
#[derive(Debug, Default)]
pub struct ShadowContext {
    buffers: HashMap<SenseChannel, WallCoordinateBuffer>,
}

impl ShadowContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer<P: ObstacleProvider + ?Sized>(
        &mut self,
        provider: &P,
        channel: SenseChannel,
    ) -> &WallCoordinateBuffer {
        self.buffers
            .entry(channel)
            .or_insert_with(|| WallCoordinateBuffer::build(provider, channel))
    }

    pub fn is_cached(&self, channel: SenseChannel) -> bool {
        self.buffers.contains_key(&channel)
    }

    /// Drop one channel's buffer, or all of them.
    pub fn invalidate(&mut self, channel: Option<SenseChannel>) {
        match channel {
            Some(c) => {
                self.buffers.remove(&c);
            }
            None => self.buffers.clear(),
        }
    }
}

// ─────── Light projection ─────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightProjection {
    pub view: DMat4,
    pub projection: DMat4,
}

impl LightProjection {
    /// Point light looking straight down, with the field of view fitted to
    /// every wall corner below it.
    pub fn perspective(light: Point3, walls: &WallCoordinateBuffer) -> SweepResult<Self> {
        ensure_finite("light x", light.x)?;
        ensure_finite("light y", light.y)?;
        ensure_finite("light z", light.z)?;

        let mut max_ratio: f64 = 0.0;
        let mut min_depth = f64::INFINITY;
        let mut max_depth: f64 = 0.0;
        let mut below = 0usize;
        for c in walls.iter_corners() {
            let depth = light.z - c.z;
            if depth <= EPSILON {
                continue;
            }
            below += 1;
            let spread = (c.x - light.x).abs().max((c.y - light.y).abs());
            max_ratio = max_ratio.max(spread / depth);
            min_depth = min_depth.min(depth);
            max_depth = max_depth.max(depth);
        }
        if !walls.is_empty() && below == 0 {
            return Err(SweepError::Projection(format!(
                "light at elevation {} is below every wall",
                light.z
            )));
        }

        let min_fov = PI / 180.0;
        let wanted = 2.0 * max_ratio.atan();
        if wanted > MAX_SHADOW_FOV {
            warn!(fov = wanted.to_degrees(), "light field of view clamped");
        }
        let fov = wanted.clamp(min_fov, MAX_SHADOW_FOV);
        let far = max_depth.max(1.0) * 1.01 + 1.0;
        let near = if below == 0 { 1.0 } else { (min_depth * 0.5).max(far * 1e-6) };

        let view = DMat4::look_at_rh(light, light - Point3::Z, Point3::NEG_Y);
        let projection = DMat4::perspective_rh(fov, 1.0, near, far);
        Ok(Self { view, projection })
    }

    /// Directional light shining along `direction` over `bounds`, for walls
    /// no taller than `max_height`.
    pub fn orthographic(direction: Point3, bounds: &Rect, max_height: f64) -> SweepResult<Self> {
        ensure_finite("light direction x", direction.x)?;
        ensure_finite("light direction y", direction.y)?;
        ensure_finite("light direction z", direction.z)?;
        let dir = direction.normalize_or_zero();
        if dir.z >= -EPSILON {
            return Err(SweepError::Projection(
                "directional light must point down".to_string(),
            ));
        }
        let height = finite_height(max_height).max(0.0);
        let center = bounds.center().extend(0.0);
        let distance = bounds.diagonal() + height + 1.0;
        let eye = center - dir * distance;
        let up = if dir.z.abs() > 0.999 { Point3::NEG_Y } else { Point3::Z };
        let half = bounds.diagonal() / 2.0 + height;

        let view = DMat4::look_at_rh(eye, center, up);
        let projection = DMat4::orthographic_rh(-half, half, -half, half, 0.0, 2.0 * distance);
        Ok(Self { view, projection })
    }

    pub fn view_projection(&self) -> DMat4 {
        self.projection * self.view
    }

    /// World point to normalized device coordinates.
    pub fn project(&self, p: Point3) -> Point3 {
        self.view_projection().project_point3(p)
    }
}

// ─────── Ground shadows ───────────────────────────────────────────────────────

/// Ground point hit by the ray from `light` through `p`, no further than
/// `max_distance` from the light's foot.
fn ground_hit(light: Point3, p: Point3, ground: f64, max_distance: f64) -> Point {
    let foot = light.truncate();
    let toward = p.truncate() - foot;
    let drop = light.z - p.z;
    let reach = if drop <= EPSILON {
        max_distance
    } else {
        (toward.length() * (light.z - ground) / drop).min(max_distance)
    };
    foot + toward.normalize_or_zero() * reach
}

/// Clockwise ground-plane shadow cast by `wall` from a point light.
/// None when the light is not above the ground, the wall floats above the
/// light, or the wall is seen edge-on.
pub fn shadow_polygon(light: Point3, wall: &Wall, ground: f64, max_distance: f64) -> Option<Polygon> {
    if light.z <= ground {
        return None;
    }
    let (bottom, top) = wall.elevation_range();
    let bottom = bottom.max(ground);
    if bottom >= light.z || top <= ground {
        return None;
    }
    let [a_top, b_top, a_bottom, b_bottom] = [
        wall.a.extend(top.min(UNBOUNDED_WALL_HEIGHT)),
        wall.b.extend(top.min(UNBOUNDED_WALL_HEIGHT)),
        wall.a.extend(bottom),
        wall.b.extend(bottom),
    ];
    let quad = Polygon::new(vec![
        ground_hit(light, a_bottom, ground, max_distance),
        ground_hit(light, b_bottom, ground, max_distance),
        ground_hit(light, b_top, ground, max_distance),
        ground_hit(light, a_top, ground, max_distance),
    ]);
    if quad.area() <= EPSILON {
        return None;
    }
    Some(quad.normalized())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacle::{SenseType, WallSet};

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn scene() -> WallSet {
        let mut set = WallSet::new(Rect::new(-500.0, -500.0, 1000.0, 1000.0));
        set.insert(Wall::new(WallId(0), p(50.0, -10.0), p(50.0, 10.0)).with_elevation(0.0, 50.0))
            .unwrap();
        set.insert(
            Wall::new(WallId(1), p(-100.0, 0.0), p(-100.0, 40.0))
                .with_sense(SenseChannel::Light, SenseType::None),
        )
        .unwrap();
        set
    }

    #[test]
    fn buffer_holds_blocking_walls_only() {
        let set = scene();
        let sight = WallCoordinateBuffer::build(&set, SenseChannel::Sight);
        assert_eq!(sight.len(), 2);
        assert_eq!(sight.coords.len(), 2 * FLOATS_PER_WALL);
        let light = WallCoordinateBuffer::build(&set, SenseChannel::Light);
        assert_eq!(light.ids, vec![WallId(0)]);
        let c = light.corners(0).unwrap();
        assert_eq!(c[0], Point3::new(50.0, -10.0, 50.0));
        assert_eq!(c[3], Point3::new(50.0, 10.0, 0.0));
        assert!(light.corners(1).is_none());
    }

    #[test]
    fn context_caches_until_invalidated() {
        let set = scene();
        let mut ctx = ShadowContext::new();
        assert_eq!(ctx.buffer(&set, SenseChannel::Light).len(), 1);
        assert!(ctx.is_cached(SenseChannel::Light));
        assert!(!ctx.is_cached(SenseChannel::Sight));
        ctx.invalidate(Some(SenseChannel::Light));
        assert!(!ctx.is_cached(SenseChannel::Light));
        ctx.buffer(&set, SenseChannel::Sight);
        ctx.invalidate(None);
        assert!(!ctx.is_cached(SenseChannel::Sight));
    }

    #[test]
    fn perspective_keeps_walls_in_view() {
        let set = scene();
        let buf = WallCoordinateBuffer::build(&set, SenseChannel::Light);
        let light = Point3::new(0.0, 0.0, 100.0);
        let proj = LightProjection::perspective(light, &buf).unwrap();
        let below = proj.project(Point3::new(0.0, 0.0, 0.0));
        assert!(below.x.abs() < 1e-9 && below.y.abs() < 1e-9);
        for c in buf.corners(0).unwrap() {
            let ndc = proj.project(c);
            assert!(ndc.x.abs() <= 1.0 + 1e-9 && ndc.y.abs() <= 1.0 + 1e-9, "{ndc:?}");
        }
    }

    #[test]
    fn perspective_rejects_light_below_walls() {
        let set = scene();
        let buf = WallCoordinateBuffer::build(&set, SenseChannel::Light);
        let low = Point3::new(0.0, 0.0, -10.0);
        assert!(matches!(
            LightProjection::perspective(low, &buf),
            Err(SweepError::Projection(_))
        ));
    }

    #[test]
    fn orthographic_centers_the_scene() {
        let bounds = Rect::new(-500.0, -500.0, 1000.0, 1000.0);
        let proj = LightProjection::orthographic(Point3::new(0.2, 0.1, -1.0), &bounds, 50.0).unwrap();
        let c = proj.project(Point3::new(0.0, 0.0, 0.0));
        assert!(c.x.abs() < 1e-9 && c.y.abs() < 1e-9);
        assert!(LightProjection::orthographic(Point3::new(0.0, 0.0, 1.0), &bounds, 50.0).is_err());
    }

    #[test]
    fn shadow_lies_behind_the_wall() {
        let wall = Wall::new(WallId(0), p(50.0, -10.0), p(50.0, 10.0)).with_elevation(0.0, 50.0);
        let light = Point3::new(0.0, 0.0, 100.0);
        let shadow = shadow_polygon(light, &wall, 0.0, 1e4).unwrap();
        assert!(shadow.is_clockwise());
        assert!(shadow.contains_point(p(75.0, 0.0)));
        assert!(!shadow.contains_point(p(25.0, 0.0)));
        assert!(!shadow.contains_point(p(120.0, 0.0)));
        // Tops land twice as far out as the base.
        assert!(shadow.point_on_boundary(p(100.0, 20.0), 1e-9));
    }

    #[test]
    fn tall_wall_shadow_is_clamped() {
        let wall = Wall::new(WallId(0), p(50.0, -10.0), p(50.0, 10.0));
        let light = Point3::new(0.0, 0.0, 100.0);
        let shadow = shadow_polygon(light, &wall, 0.0, 300.0).unwrap();
        for q in shadow.iter_points(false) {
            assert!(q.length() <= 300.0 + 1e-9);
        }
        assert!(shadow.contains_point(p(250.0, 0.0)));
    }

    #[test]
    fn no_shadow_when_wall_floats_above_light() {
        let wall = Wall::new(WallId(0), p(50.0, -10.0), p(50.0, 10.0)).with_elevation(200.0, 300.0);
        assert!(shadow_polygon(Point3::new(0.0, 0.0, 100.0), &wall, 0.0, 1e4).is_none());
    }
}
