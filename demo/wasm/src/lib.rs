// Copyright 2025 Lars Brubaker
// WASM bindings for vision-sweep

use vision_sweep::{
    ClockwiseSweep, Point, Point3, Rect, SenseChannel, SenseType, SweepConfig, Wall, WallId, WallSet,
};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn main_js() {
    console_error_panic_hook::set_once();
}

/// A scene of walls that can be swept from any origin.
#[wasm_bindgen]
pub struct SweepJs {
    walls: WallSet,
}

#[wasm_bindgen]
impl SweepJs {
    #[wasm_bindgen(constructor)]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> SweepJs {
        SweepJs {
            walls: WallSet::new(Rect::new(x, y, width, height)),
        }
    }

    /// Add walls from a flat [ax,ay,bx,by, ...] array. Returns the first new id.
    pub fn add_walls(&mut self, coords: &[f64]) -> Result<u32, JsError> {
        if coords.len() % 4 != 0 {
            return Err(JsError::new("wall coordinates must come in groups of four"));
        }
        let mut first = None;
        for c in coords.chunks_exact(4) {
            let id = self.walls.push(Point::new(c[0], c[1]), Point::new(c[2], c[3]))?;
            first.get_or_insert(id.0);
        }
        Ok(first.unwrap_or(u32::MAX))
    }

    /// Add one wall with a sense value for a channel (0=none 1=limited 2=normal)
    /// and an optional elevation range.
    pub fn add_wall(
        &mut self,
        id: u32,
        coords: &[f64],
        channel: &str,
        sense: u32,
        bottom: Option<f64>,
        top: Option<f64>,
    ) -> Result<(), JsError> {
        if coords.len() != 4 {
            return Err(JsError::new("a wall needs exactly four coordinates"));
        }
        let channel = parse_channel(channel)?;
        let sense = match sense {
            0 => SenseType::None,
            1 => SenseType::Limited,
            _ => SenseType::Normal,
        };
        let mut wall = Wall::new(WallId(id), Point::new(coords[0], coords[1]), Point::new(coords[2], coords[3]))
            .with_sense(channel, sense);
        if let (Some(b), Some(t)) = (bottom, top) {
            wall = wall.with_elevation(b, t);
        }
        self.walls.insert(wall)?;
        Ok(())
    }

    pub fn remove_wall(&mut self, id: u32) -> bool {
        self.walls.remove(WallId(id)).is_some()
    }

    pub fn wall_count(&self) -> u32 {
        self.walls.len() as u32
    }

    /// Sweep from (x, y) with a camelCase JSON config ("{}" for defaults).
    /// Returns the closed clockwise polygon as flat [x0,y0, x1,y1, ...],
    /// empty when nothing is visible.
    pub fn sweep(&self, x: f64, y: f64, config_json: &str) -> Result<Vec<f64>, JsError> {
        let config: SweepConfig = serde_json::from_str(config_json)?;
        let sweep = ClockwiseSweep::new(config)?;
        Ok(sweep
            .sweep(Point::new(x, y), &self.walls)?
            .map(|poly| poly.to_flat())
            .unwrap_or_default())
    }

    /// Does travel between two 3D points hit a wall on `channel`?
    pub fn travel_blocked(&self, from: &[f64], to: &[f64], channel: &str) -> Result<bool, JsError> {
        if from.len() != 3 || to.len() != 3 {
            return Err(JsError::new("travel points need three coordinates"));
        }
        let channel = parse_channel(channel)?;
        let from = Point3::new(from[0], from[1], from[2]);
        let to = Point3::new(to[0], to[1], to[2]);
        Ok(vision_sweep::has_collision(from, to, &self.walls, channel)?)
    }
}

fn parse_channel(name: &str) -> Result<SenseChannel, JsError> {
    match name {
        "sight" => Ok(SenseChannel::Sight),
        "light" => Ok(SenseChannel::Light),
        "sound" => Ok(SenseChannel::Sound),
        "move" => Ok(SenseChannel::Move),
        _ => Err(JsError::new(&format!("unknown sense channel {name:?}"))),
    }
}
