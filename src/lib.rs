// vision-sweep: visibility geometry kernel for grid tabletops
// Copyright 2025 Lars Brubaker
// License: MIT

pub mod circle;
pub mod combine;
pub mod config;
pub mod edge;
pub mod error;
pub mod geom;
pub mod intersections;
pub mod limited_angle;
pub mod obstacle;
pub mod polygon;
pub mod rect;
pub mod shadow;
pub mod sweep;
pub mod travel;

pub use circle::Circle;
pub use combine::{combine, Boundary, PolygonBoundary, TraceBoundary};
pub use config::SweepConfig;
pub use error::{SweepError, SweepResult};
pub use geom::{Point, Point3};
pub use limited_angle::LimitedAngle;
pub use obstacle::{ObstacleProvider, SenseChannel, SenseType, Senses, TempEdge, Wall, WallId, WallSet};
pub use polygon::Polygon;
pub use rect::Rect;
pub use shadow::{shadow_polygon, LightProjection, ShadowContext, WallCoordinateBuffer};
pub use sweep::{ClockwiseSweep, SweepOutput, SweepRay, Transition};
pub use travel::{first_collision, has_collision, TravelCollision};
