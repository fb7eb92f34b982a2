//! Web Mercator projection between geographic, tile and world-pixel space.
//!
//! Continuous math (`geo_to_tile`, `geo_to_pixel`, `pixel_to_geo`) is kept
//! apart from discrete tile addressing (`wrap_tile_x`, `clamp_tile_y`): tiles
//! are drawn at their unwrapped world position so the map stays continuous
//! across the antimeridian, while fetches and cache keys use the wrapped
//! address so one physical tile is only fetched once.
//!
//! Every function accepts raw coordinates and clamps/normalizes internally.

use crate::core::constants::{MAX_LATITUDE, MAX_ZOOM, TILE_SIZE_F64};
use crate::core::geo::{LatLng, Point};
use std::f64::consts::PI;

/// Number of tiles along one axis at `zoom`. Zooms past [`MAX_ZOOM`] are
/// treated as `MAX_ZOOM`.
pub fn tiles_per_axis(zoom: u8) -> i64 {
    1_i64 << zoom.min(MAX_ZOOM)
}

/// Clamps latitude to the Web Mercator range; out-of-range values saturate.
pub fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
}

/// Reduces longitude to `[-180, 180)`.
///
/// In-range values come back unchanged. Others are shifted by a whole number
/// of turns in one step, so huge finite inputs terminate in constant time.
/// Non-finite input yields NaN.
pub fn normalize_longitude(lng: f64) -> f64 {
    if (-180.0..180.0).contains(&lng) {
        return lng;
    }
    let wrapped = lng - 360.0 * ((lng + 180.0) / 360.0).floor();
    // rounding can land a hair outside the range for large inputs
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else if wrapped < -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Clamps and normalizes a coordinate in one go.
pub fn normalize(lat_lng: LatLng) -> LatLng {
    LatLng::new(clamp_latitude(lat_lng.lat), normalize_longitude(lat_lng.lng))
}

/// Continuous tile coordinates of a point (not yet an integer tile index).
pub fn geo_to_tile(lat: f64, lng: f64, zoom: u8) -> Point {
    let n = tiles_per_axis(zoom) as f64;
    let phi = clamp_latitude(lat).to_radians();
    let x = (normalize_longitude(lng) + 180.0) / 360.0 * n;
    let y = (1.0 - (phi.tan() + 1.0 / phi.cos()).ln() / PI) / 2.0 * n;
    Point::new(x, y)
}

/// World-pixel coordinates of a point at `zoom`.
pub fn geo_to_pixel(lat: f64, lng: f64, zoom: u8) -> Point {
    geo_to_tile(lat, lng, zoom).multiply(TILE_SIZE_F64)
}

/// Inverse of [`geo_to_pixel`]; the result is clamped and normalized, so
/// pixels outside the world map back onto it.
pub fn pixel_to_geo(x: f64, y: f64, zoom: u8) -> LatLng {
    let world = tiles_per_axis(zoom) as f64 * TILE_SIZE_F64;
    let lng = x / world * 360.0 - 180.0;
    let lat = (PI - 2.0 * PI * y / world).sinh().atan().to_degrees();
    LatLng::new(clamp_latitude(lat), normalize_longitude(lng))
}

/// Wraps a tile column into `[0, 2^zoom)`; negative columns wrap forward.
pub fn wrap_tile_x(x: i64, zoom: u8) -> u32 {
    x.rem_euclid(tiles_per_axis(zoom)) as u32
}

/// Saturates a tile row to `[0, 2^zoom - 1]`.
pub fn clamp_tile_y(y: i64, zoom: u8) -> u32 {
    y.clamp(0, tiles_per_axis(zoom) - 1) as u32
}

/// Inclusive range of (unwrapped) tile columns and rows covering a screen
/// rectangle whose top-left corner sits at `top_left` in world pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub zoom: u8,
    pub min_x: i64,
    pub max_x: i64,
    pub min_y: i64,
    pub max_y: i64,
}

impl TileRange {
    /// Columns are left unwrapped; rows are clamped to the world so nothing
    /// is drawn above the north edge or below the south edge.
    pub fn covering(top_left: Point, width: f64, height: f64, zoom: u8) -> Self {
        let min_x = (top_left.x / TILE_SIZE_F64).floor() as i64;
        let max_x = ((top_left.x + width) / TILE_SIZE_F64).ceil() as i64;
        let min_y = (top_left.y / TILE_SIZE_F64).floor() as i64;
        let max_y = ((top_left.y + height) / TILE_SIZE_F64).ceil() as i64;
        Self {
            zoom,
            min_x,
            max_x,
            min_y: clamp_tile_y(min_y, zoom) as i64,
            max_y: clamp_tile_y(max_y, zoom) as i64,
        }
    }

    /// Iterates `(column, row)` pairs row by row.
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        (self.min_y..=self.max_y).flat_map(move |y| (self.min_x..=self.max_x).map(move |x| (x, y)))
    }

    pub fn len(&self) -> usize {
        let cols = (self.max_x - self.min_x + 1).max(0) as usize;
        let rows = (self.max_y - self.min_y + 1).max(0) as usize;
        cols * rows
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
