//! Map builder for fluent API configuration
//!
//! This module provides a MapBuilder that collects configuration, initial
//! host inputs and an optional tile fetcher, then mounts a [`TileMap`].

use crate::{
    core::{
        config::{MapConfig, MapProfile},
        geo::LatLng,
        map::TileMap,
    },
    layers::marker::Marker,
    tiles::loader::TileFetcher,
    Result,
};
use std::sync::Arc;

/// Builder for creating and configuring TileMap instances
#[derive(Default)]
pub struct MapBuilder {
    config: MapConfig,
    markers: Vec<Marker>,
    center: Option<LatLng>,
    selected: Option<String>,
    fetcher: Option<Arc<dyn TileFetcher>>,
    size: Option<(f64, f64)>,
}

impl MapBuilder {
    /// Create a new MapBuilder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a preset
    pub fn with_profile(mut self, profile: MapProfile) -> Self {
        self.config = profile.resolve();
        self
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: MapConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the tile URL template and the attribution it requires
    pub fn with_tile_url(mut self, url_template: impl Into<String>, attribution: impl Into<String>) -> Self {
        self.config.tiles.url_template = url_template.into();
        self.config.tiles.attribution = attribution.into();
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.tiles.cache_capacity = capacity;
        self
    }

    /// Set the zoom range; the focus and world zooms are pulled inside it
    pub fn with_zoom_limits(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        let zoom = &mut self.config.zoom;
        zoom.min = min_zoom;
        zoom.max = max_zoom;
        if min_zoom <= max_zoom {
            zoom.focus = zoom.focus.clamp(min_zoom, max_zoom);
            zoom.world = zoom.world.clamp(min_zoom, max_zoom);
        }
        self
    }

    pub fn with_hit_radius(mut self, radius: f64) -> Self {
        self.config.interaction.hit_radius = radius;
        self
    }

    /// Initial marker dataset
    pub fn with_markers(mut self, markers: Vec<Marker>) -> Self {
        self.markers = markers;
        self
    }

    /// Initial "center on" request
    pub fn with_center(mut self, center: LatLng) -> Self {
        self.center = Some(center);
        self
    }

    pub fn with_selected(mut self, id: impl Into<String>) -> Self {
        self.selected = Some(id.into());
        self
    }

    /// Fetch tiles through `fetcher` instead of HTTP
    pub fn with_fetcher(mut self, fetcher: Arc<dyn TileFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Some((width, height));
        self
    }

    /// Validate the configuration and mount the map
    pub fn build(self) -> Result<TileMap> {
        self.config.validate()?;
        let mut map = match self.fetcher {
            Some(fetcher) => TileMap::with_fetcher(self.config, fetcher)?,
            None => TileMap::new(self.config)?,
        };

        map.set_markers(self.markers);
        map.set_center_request(self.center);
        map.set_selected(self.selected);
        if let Some((width, height)) = self.size {
            map.resize(width, height);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MapError, Result as MapResult};

    struct NullFetcher;

    #[async_trait::async_trait]
    impl TileFetcher for NullFetcher {
        async fn fetch(&self, _url: &str) -> MapResult<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_builder_applies_host_inputs() {
        let map = MapBuilder::new()
            .with_markers(vec![Marker::new("1", LatLng::new(40.7128, -74.0060))])
            .with_selected("1")
            .with_size(640.0, 480.0)
            .with_fetcher(Arc::new(NullFetcher))
            .build()
            .unwrap();

        assert_eq!(map.viewport().zoom, 12);
        assert_eq!(map.selected_id(), Some("1"));
        assert_eq!(map.viewport().size.x, 640.0);
    }

    #[test]
    fn test_center_overrides_first_marker() {
        let map = TileMap::builder()
            .with_markers(vec![Marker::new("1", LatLng::new(40.7128, -74.0060))])
            .with_center(LatLng::new(51.5, -0.12))
            .with_fetcher(Arc::new(NullFetcher))
            .build()
            .unwrap();
        assert_eq!(map.viewport().center, LatLng::new(51.5, -0.12));
    }

    #[test]
    fn test_builder_validates() {
        let result = MapBuilder::new()
            .with_zoom_limits(10, 5)
            .with_fetcher(Arc::new(NullFetcher))
            .build();
        assert!(matches!(result, Err(MapError::Config(_))));

        let result = MapBuilder::new()
            .with_tile_url("https://example.com/tile.png", "nobody")
            .with_fetcher(Arc::new(NullFetcher))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_profile_and_overrides() {
        let map = MapBuilder::new()
            .with_profile(MapProfile::LowResource)
            .with_hit_radius(24.0)
            .with_cache_capacity(32)
            .with_fetcher(Arc::new(NullFetcher))
            .build()
            .unwrap();
        assert_eq!(map.config().tiles.timeout_secs, 10);
        assert_eq!(map.tile_cache().capacity(), 32);
        assert_eq!(map.input().hit_radius(), 24.0);
    }
}
