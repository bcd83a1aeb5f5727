use serde::{Deserialize, Deserializer, Serialize};

use crate::*;

/// Tunables shared by the board, cache generation and the player session.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Edge length of one cell, in degrees.
    pub tile_width: f64,
    /// Radius, in tiles, of the square of cells considered around the player.
    pub visibility_radius: u32,
    /// Chance for any given cell to hold a cache.
    pub spawn_probability: f64,
    /// Exclusive upper bound on the number of coins a new cache is seeded with.
    pub max_initial_coins: u32,
    /// Where the player stands at the start of a session and after a reset.
    /// Either coordinate may be omitted and falls back to the default start.
    #[serde(deserialize_with = "partial_start")]
    pub start: Point,
}

#[derive(Deserialize)]
struct PartialPoint {
    lat: Option<f64>,
    lng: Option<f64>,
}

fn partial_start<'de, D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Point, D::Error> {
    let partial = PartialPoint::deserialize(deserializer)?;
    let fallback = GameConfig::default().start;
    Ok(Point::new(
        partial.lat.unwrap_or(fallback.lat),
        partial.lng.unwrap_or(fallback.lng),
    ))
}

impl GameConfig {
    pub const MAX_VISIBILITY_RADIUS: u32 = 1024;

    pub fn validate(self) -> Result<Self> {
        if !(self.tile_width.is_finite() && self.tile_width > 0.0) {
            return Err(GameError::InvalidConfig("tile width must be finite and positive"));
        }
        if self.visibility_radius > Self::MAX_VISIBILITY_RADIUS {
            return Err(GameError::InvalidConfig("visibility radius is too large"));
        }
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return Err(GameError::InvalidConfig("spawn probability must be within [0, 1]"));
        }
        if !self.start.is_finite() {
            return Err(GameError::InvalidConfig("start position must be finite"));
        }
        Ok(self)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_width: 1e-4,
            visibility_radius: 8,
            spawn_probability: 0.1,
            max_initial_coins: 10,
            start: Point::new(36.9995, -122.0533),
        }
    }
}
