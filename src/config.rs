// Copyright 2025 Lars Brubaker
// License: MIT
//
// Tunable constants and the per-call sweep configuration.
//
// SweepConfig deserializes from the camelCase JSON a host application
// sends (every field optional), and can also be assembled in Rust with the
// `with_*` builders.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, SweepError, SweepResult};
use crate::geom::Point;
use crate::obstacle::{SenseChannel, TempEdge};

/// Tolerance for "almost equal" comparisons of coordinates.
pub const EPSILON: f64 = 1e-8;

/// Vertex keys quantize coordinates to 1 / KEY_PRECISION pixels.
pub const KEY_PRECISION: f64 = 1000.0;

/// Maximum deviation (pixels) between a circle and its polygon
/// approximation when no explicit density is requested.
pub const CIRCLE_TOLERANCE: f64 = 1.0;

/// Distance the sector apex is pulled back behind the sweep origin.
pub const SECTOR_NUDGE: f64 = 1.0;

/// Distance an origin lying on the scene edge is moved inward, so every
/// canvas side can stop a ray.
pub const ORIGIN_INSET: f64 = 1.0;

/// Boundary traces stop after this many steps per crossing.
pub const TRACE_STEPS_PER_CROSSING: usize = 2;

/// Height used in GPU buffers for walls without an elevation range.
pub const UNBOUNDED_WALL_HEIGHT: f64 = 1.0e6;

/// Widest field of view (radians) a perspective light projection may use.
pub const MAX_SHADOW_FOV: f64 = 170.0 * std::f64::consts::PI / 180.0;

/// Configuration of one sweep call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SweepConfig {
    /// Which sense channel obstacles are filtered by.
    #[serde(rename = "type")]
    pub channel: SenseChannel,
    /// Vision/light radius. Values <= 0 mean unlimited.
    pub radius: Option<f64>,
    /// Sector angle in degrees. 360 means no sector.
    pub angle: f64,
    /// Sector direction in degrees, clockwise from +x.
    pub rotation: f64,
    /// Custom boundary polygon. Overrides `radius`.
    pub boundary_polygon: Option<Vec<Point>>,
    /// Extra synthetic edges for this call only.
    pub temp_edges: Vec<TempEdge>,
    /// Observer elevation; walls outside it are ignored.
    pub elevation: Option<f64>,
    /// Points used to approximate a full circle boundary.
    pub density: Option<usize>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            channel: SenseChannel::Sight,
            radius: None,
            angle: 360.0,
            rotation: 0.0,
            boundary_polygon: None,
            temp_edges: Vec::new(),
            elevation: None,
            density: None,
        }
    }
}

impl SweepConfig {
    pub fn new(channel: SenseChannel) -> Self {
        Self {
            channel,
            ..Self::default()
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_angle(mut self, angle: f64, rotation: f64) -> Self {
        self.angle = angle;
        self.rotation = rotation;
        self
    }

    pub fn with_boundary_polygon(mut self, points: Vec<Point>) -> Self {
        self.boundary_polygon = Some(points);
        self
    }

    pub fn with_temp_edge(mut self, edge: TempEdge) -> Self {
        self.temp_edges.push(edge);
        self
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }

    pub fn with_density(mut self, density: usize) -> Self {
        self.density = Some(density);
        self
    }

    /// Radius if it limits the sweep.
    pub fn limited_radius(&self) -> Option<f64> {
        self.radius.filter(|r| *r > 0.0)
    }

    /// True when the angle describes a real sector.
    pub fn has_limited_angle(&self) -> bool {
        self.angle < 360.0
    }

    /// Reject configurations no sweep can honour.
    pub fn validate(&self) -> SweepResult<()> {
        if let Some(r) = self.radius {
            ensure_finite("radius", r)?;
        }
        ensure_finite("rotation", self.rotation)?;
        if !(self.angle > 0.0 && self.angle <= 360.0) {
            return Err(SweepError::InvalidAngle(self.angle));
        }
        if let Some(d) = self.density {
            if d < 3 {
                return Err(SweepError::InvalidDensity(d));
            }
        }
        if let Some(e) = self.elevation {
            ensure_finite("elevation", e)?;
        }
        if let Some(points) = &self.boundary_polygon {
            for p in points {
                ensure_finite("boundary x", p.x)?;
                ensure_finite("boundary y", p.y)?;
            }
        }
        for edge in &self.temp_edges {
            for p in [edge.a, edge.b] {
                ensure_finite("temp edge x", p.x)?;
                ensure_finite("temp edge y", p.y)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unbounded_sight() {
        let cfg = SweepConfig::default();
        assert_eq!(cfg.channel, SenseChannel::Sight);
        assert!(cfg.limited_radius().is_none());
        assert!(!cfg.has_limited_angle());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_radius_is_unlimited() {
        let cfg = SweepConfig::default().with_radius(0.0);
        assert!(cfg.limited_radius().is_none());
    }

    #[test]
    fn rejects_bad_angle() {
        let cfg = SweepConfig::default().with_angle(0.0, 0.0);
        assert_eq!(cfg.validate(), Err(SweepError::InvalidAngle(0.0)));
        let cfg = SweepConfig::default().with_angle(361.0, 0.0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_tiny_density() {
        let cfg = SweepConfig::default().with_density(2);
        assert_eq!(cfg.validate(), Err(SweepError::InvalidDensity(2)));
    }

    #[test]
    fn rejects_non_finite_radius() {
        let cfg = SweepConfig::default().with_radius(f64::NAN);
        assert!(matches!(cfg.validate(), Err(SweepError::NonFinite { what: "radius", .. })));
    }
}
