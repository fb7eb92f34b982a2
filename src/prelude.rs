//! Prelude module for common pinmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use pinmap::prelude::*;`

pub use crate::core::{
    builder::MapBuilder,
    config::{InteractionConfig, MapConfig, MapProfile, StyleConfig, TileConfig, ZoomConfig},
    geo::{LatLng, Point, TileCoord},
    map::TileMap,
    viewport::Viewport,
};

pub use crate::layers::marker::{load_markers, markers_from_json, Marker, MarkerState};

pub use crate::input::{
    events::{EventManager, MapCursor, MapEvent, PointerEvent},
    handler::{hit_test, InputHandler, InteractionMode},
    tracker::{PointerSnapshot, PointerTracker},
};

pub use crate::runtime::{runtime, spawn, AsyncHandle, AsyncSpawner};

pub use crate::tiles::{
    cache::{TileCache, TileState},
    loader::{HttpTileFetcher, TileFetcher, TileLoader},
    source::{TileSource, UrlTemplateSource},
};

pub use crate::rendering::{
    context::{Color, RenderContext},
    pipeline::{RenderPipeline, RenderStats},
    raster::rasterize,
    style::MarkerStyle,
};

#[cfg(feature = "egui")]
pub use crate::ui::{MapWidget, MapWidgetConfig, MapWidgetExt};

pub use crate::{MapError, Result};

pub use std::{
    collections::VecDeque,
    sync::Arc,
    time::{Duration, Instant},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
