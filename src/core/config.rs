//! Configuration for tiles, zoom limits, interaction and styling
//!
//! Every section has serde defaults, so a JSON file only needs to name the
//! values it changes. `MapConfig::validate` is run by the builder before a
//! map is mounted.

use crate::{
    core::constants::{
        DEFAULT_ATTRIBUTION, DEFAULT_CACHE_CAPACITY, DEFAULT_TILE_URL, FOCUS_ZOOM,
        MARKER_HIT_RADIUS, MAX_ZOOM, MIN_ZOOM, WORLD_ZOOM,
    },
    rendering::{context::Color, style::MarkerStyle},
    MapError, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Presets for common deployments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapProfile {
    #[default]
    Balanced,
    /// Smaller tile cache and shorter request timeout
    LowResource,
}

impl MapProfile {
    pub fn resolve(&self) -> MapConfig {
        match self {
            Self::Balanced => MapConfig::default(),
            Self::LowResource => MapConfig {
                tiles: TileConfig {
                    cache_capacity: 128,
                    timeout_secs: 10,
                    ..TileConfig::default()
                },
                ..MapConfig::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub tiles: TileConfig,
    pub zoom: ZoomConfig,
    pub interaction: InteractionConfig,
    pub style: StyleConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    /// URL with `{z}`, `{x}` and `{y}` placeholders
    pub url_template: String,
    pub attribution: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Maximum number of tiles kept in memory
    pub cache_capacity: usize,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_TILE_URL.to_string(),
            attribution: DEFAULT_ATTRIBUTION.to_string(),
            user_agent: format!("pinmap/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: u8,
    pub max: u8,
    /// Zoom used when centering on a request or on the first marker
    pub focus: u8,
    /// Zoom used for the world view
    pub world: u8,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: MIN_ZOOM,
            max: MAX_ZOOM,
            focus: FOCUS_ZOOM,
            world: WORLD_ZOOM,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub hit_radius: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            hit_radius: MARKER_HIT_RADIUS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub background: Color,
    pub markers: MarkerStyle,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background: Color::rgb(0xf3, 0xf4, 0xf6),
            markers: MarkerStyle::default(),
        }
    }
}

impl MapConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !self.tiles.url_template.contains(placeholder) {
                return Err(MapError::Config(format!(
                    "tile url template {:?} is missing {}",
                    self.tiles.url_template, placeholder
                )));
            }
        }
        if self.tiles.cache_capacity == 0 {
            return Err(MapError::Config("tile cache capacity must be positive".into()));
        }

        let zoom = &self.zoom;
        if zoom.min < MIN_ZOOM || zoom.max > MAX_ZOOM || zoom.min > zoom.max {
            return Err(MapError::Config(format!(
                "zoom limits {}..={} must lie within {}..={}",
                zoom.min, zoom.max, MIN_ZOOM, MAX_ZOOM
            )));
        }
        for (name, level) in [("focus", zoom.focus), ("world", zoom.world)] {
            if !(zoom.min..=zoom.max).contains(&level) {
                return Err(MapError::Config(format!(
                    "{} zoom {} is outside {}..={}",
                    name, level, zoom.min, zoom.max
                )));
            }
        }

        let radius = self.interaction.hit_radius;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(MapError::Config(format!("hit radius {} must be positive", radius)));
        }
        Ok(())
    }
}
