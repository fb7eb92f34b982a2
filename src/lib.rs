//! # pinmap
//!
//! A slippy-map tile renderer with point markers.
//!
//! The crate projects geographic coordinates onto a pannable, zoomable raster
//! built from 256px image tiles, overlays point markers, and resolves pointer
//! interaction (hover, click, drag) against the viewport and the markers.
//!
//! [`TileMap`] is the controller: construct it to mount a map, feed it pointer
//! events and host inputs, and call [`TileMap::render`] to produce a display
//! list. The `egui` feature adds [`MapWidget`], which does all of that inside
//! an egui `Ui`.

pub mod core;
pub mod input;
pub mod layers;
#[cfg(feature = "debug")]
pub mod logging;
pub mod prelude;
pub mod rendering;
pub mod runtime;
pub mod tiles;
#[cfg(feature = "egui")]
pub mod ui;

pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    builder::MapBuilder,
    config::MapConfig,
    geo::{LatLng, Point, TileCoord},
    map::TileMap,
    viewport::Viewport,
};

pub use layers::marker::{Marker, MarkerState};

pub use input::{
    events::{MapCursor, MapEvent, PointerEvent},
    handler::InputHandler,
};

pub use rendering::{
    context::{Color, RenderContext},
    pipeline::{RenderPipeline, RenderStats},
};

pub use tiles::{
    cache::TileCache,
    loader::{HttpTileFetcher, TileFetcher},
    source::TileSource,
};

#[cfg(feature = "egui")]
pub use ui::widget::MapWidget;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Tile request to {url} failed with status {status}")]
    TileStatus { url: String, status: u16 },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}
