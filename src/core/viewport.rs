use crate::core::{
    config::ZoomConfig,
    geo::{LatLng, Point},
    projection::{self, TileRange},
};
use crate::layers::marker::Marker;
use serde::{Deserialize, Serialize};

/// Manages the current view of the map: center, zoom, pan offset and screen dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: u8,
    /// Screen-space pan applied on top of `center` while a drag is in progress
    pub drag_offset: Point,
    /// The size of the viewport in pixels
    pub size: Point,
    /// The minimum allowed zoom level
    pub min_zoom: u8,
    /// The maximum allowed zoom level
    pub max_zoom: u8,
}

impl Viewport {
    /// Creates a new viewport; `center` is clamped/normalized and `zoom` kept within the default limits
    pub fn new(center: LatLng, zoom: u8, size: Point) -> Self {
        let limits = ZoomConfig::default();
        Self {
            center: projection::normalize(center),
            zoom: zoom.clamp(limits.min, limits.max),
            drag_offset: Point::zero(),
            size,
            min_zoom: limits.min,
            max_zoom: limits.max,
        }
    }

    /// Builds the viewport a freshly mounted map starts from.
    ///
    /// An explicit center request wins, then the first marker with finite
    /// coordinates, both at the focus zoom. With neither, the map shows the
    /// whole world around `{0, 0}`.
    pub fn initial(center_request: Option<LatLng>, markers: &[Marker], zoom: &ZoomConfig) -> Self {
        let requested = center_request.filter(LatLng::is_finite);
        let first_marker = markers.iter().find(|m| m.is_renderable()).map(|m| m.position);

        let (center, level) = match requested.or(first_marker) {
            Some(center) => (center, zoom.focus),
            None => (LatLng::default(), zoom.world),
        };

        Self {
            center: projection::normalize(center),
            zoom: level.clamp(zoom.min, zoom.max),
            drag_offset: Point::zero(),
            size: Point::zero(),
            min_zoom: zoom.min,
            max_zoom: zoom.max,
        }
    }

    /// Re-runs the initialization policy, keeping the current screen size
    pub fn reinitialize(&mut self, center_request: Option<LatLng>, markers: &[Marker], zoom: &ZoomConfig) {
        let size = self.size;
        *self = Self::initial(center_request, markers, zoom);
        self.size = size;
    }

    /// Sets the viewport size
    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Sets the center, discarding any uncommitted pan
    pub fn set_center(&mut self, center: LatLng) {
        self.center = projection::normalize(center);
        self.drag_offset = Point::zero();
    }

    /// Sets the zoom limits
    pub fn set_zoom_limits(&mut self, min_zoom: u8, max_zoom: u8) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.clamp(min_zoom, max_zoom);
    }

    pub fn can_zoom_in(&self) -> bool {
        self.zoom < self.max_zoom
    }

    pub fn can_zoom_out(&self) -> bool {
        self.zoom > self.min_zoom
    }

    /// Steps one zoom level in; returns false (and changes nothing) at the upper bound
    pub fn zoom_in(&mut self) -> bool {
        if !self.can_zoom_in() {
            return false;
        }
        self.zoom += 1;
        true
    }

    /// Steps one zoom level out; returns false (and changes nothing) at the lower bound
    pub fn zoom_out(&mut self) -> bool {
        if !self.can_zoom_out() {
            return false;
        }
        self.zoom -= 1;
        true
    }

    /// World-pixel position of `center` at the current zoom
    pub fn center_pixel(&self) -> Point {
        projection::geo_to_pixel(self.center.lat, self.center.lng, self.zoom)
    }

    /// World-pixel position of the screen's top-left corner, including the pan offset
    pub fn top_left(&self) -> Point {
        self.center_pixel()
            .subtract(&self.size.multiply(0.5))
            .add(&self.drag_offset)
    }

    /// Converts a geographical coordinate to a screen pixel position
    pub fn lat_lng_to_screen(&self, lat_lng: &LatLng) -> Point {
        projection::geo_to_pixel(lat_lng.lat, lat_lng.lng, self.zoom).subtract(&self.top_left())
    }

    /// Converts a screen pixel position to a geographical coordinate
    pub fn screen_to_lat_lng(&self, point: &Point) -> LatLng {
        let world = self.top_left().add(point);
        projection::pixel_to_geo(world.x, world.y, self.zoom)
    }

    /// Folds the pan offset into `center` and resets it.
    ///
    /// Returns whether the center moved.
    pub fn commit_drag(&mut self) -> bool {
        if self.drag_offset.is_zero() {
            return false;
        }
        let target = self.center_pixel().add(&self.drag_offset);
        self.center = projection::pixel_to_geo(target.x, target.y, self.zoom);
        self.drag_offset = Point::zero();
        true
    }

    /// Tiles covering the screen, as unwrapped columns and clamped rows
    pub fn visible_tiles(&self) -> TileRange {
        TileRange::covering(self.top_left(), self.size.x, self.size.y, self.zoom)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::initial(None, &[], &ZoomConfig::default())
    }
}
