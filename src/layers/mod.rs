//! Map overlays drawn above the tile layer.

pub mod marker;

pub use marker::{load_markers, markers_from_json, Marker, MarkerState};
