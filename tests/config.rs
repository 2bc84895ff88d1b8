// Copyright 2025 Lars Brubaker
// SweepConfig as sent by a host application in JSON.

mod helpers;

use helpers::*;
use vision_sweep::{ClockwiseSweep, SenseChannel, SenseType, SweepConfig, SweepError, WallSet};

#[test]
fn camel_case_json_deserializes() {
    let json = r#"{
        "type": "light",
        "radius": 150,
        "angle": 90,
        "rotation": 45,
        "tempEdges": [{ "a": [10, 0], "b": [10, 20], "sense": "limited" }],
        "elevation": 5,
        "density": 64
    }"#;
    let cfg: SweepConfig = serde_json::from_str(json).unwrap();
    assert_eq!(cfg.channel, SenseChannel::Light);
    assert_eq!(cfg.limited_radius(), Some(150.0));
    assert!(cfg.has_limited_angle());
    assert_eq!(cfg.temp_edges.len(), 1);
    assert_eq!(cfg.temp_edges[0].sense, SenseType::Limited);
    assert_eq!(cfg.elevation, Some(5.0));
    assert_eq!(cfg.density, Some(64));
    assert!(cfg.validate().is_ok());
}

#[test]
fn empty_json_is_the_default() {
    let cfg: SweepConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg, SweepConfig::default());
    assert!(!cfg.has_limited_angle());
    assert_eq!(cfg.limited_radius(), None);
}

#[test]
fn boundary_polygon_and_move_channel() {
    let json = r#"{ "type": "move", "boundaryPolygon": [[-10, -10], [10, -10], [10, 10], [-10, 10]] }"#;
    let cfg: SweepConfig = serde_json::from_str(json).unwrap();
    assert_eq!(cfg.channel, SenseChannel::Move);
    let poly = sweep(cfg, p(0.0, 0.0), &WallSet::new(canvas()));
    assert!((poly.area() - 400.0).abs() < EPS);
}

#[test]
fn invalid_settings_are_rejected() {
    for angle in [0.0, -30.0, 400.0, f64::NAN] {
        assert!(matches!(
            ClockwiseSweep::new(SweepConfig::default().with_angle(angle, 0.0)),
            Err(SweepError::InvalidAngle(_))
        ));
    }
    assert!(matches!(
        ClockwiseSweep::new(SweepConfig::default().with_density(2)),
        Err(SweepError::InvalidDensity(2))
    ));
    assert!(matches!(
        ClockwiseSweep::new(SweepConfig::default().with_radius(f64::INFINITY)),
        Err(SweepError::NonFinite { .. })
    ));
}

#[test]
fn config_survives_a_json_round_trip() {
    let cfg = SweepConfig::new(SenseChannel::Sound).with_radius(30.0).with_angle(120.0, 270.0);
    let json = serde_json::to_string(&cfg).unwrap();
    assert!(json.contains("\"type\":\"sound\""));
    let back: SweepConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, cfg);
}
