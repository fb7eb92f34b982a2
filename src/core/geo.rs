use crate::core::projection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a geographical coordinate with latitude and longitude, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Clamped latitude and normalized longitude, ready for projection
    pub fn normalized(&self) -> Self {
        projection::normalize(*self)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a point in screen or world-pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::zero()
    }
}

/// Address of a physical tile in the slippy map tile system.
///
/// Always holds a wrapped column and clamped row, so two requests for the
/// same visible tile on different copies of the world share one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Builds the address for an unwrapped `(x, y)` tile position
    pub fn wrapped(x: i64, y: i64, z: u8) -> Self {
        Self::new(projection::wrap_tile_x(x, z), projection::clamp_tile_y(y, z), z)
    }

    /// Cache key in `zoom/x/y` form
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lng_creation() {
        let coord = LatLng::new(40.7128, -74.0060);
        assert_eq!(coord.lat, 40.7128);
        assert_eq!(coord.lng, -74.0060);
        assert!(coord.is_finite());
        assert!(!LatLng::new(f64::NAN, 0.0).is_finite());
    }

    #[test]
    fn test_lat_lng_normalized() {
        let n = LatLng::new(88.0, 190.0).normalized();
        assert_eq!(n.lat, crate::core::constants::MAX_LATITUDE);
        assert_eq!(n.lng, -170.0);
    }

    #[test]
    fn test_point_math() {
        let a = Point::new(3.0, 4.0);
        assert_eq!(a.distance_to(&Point::zero()), 5.0);
        assert_eq!(a.add(&a), Point::new(6.0, 8.0));
        assert_eq!(a.subtract(&a), Point::zero());
        assert!(a.subtract(&a).is_zero());
    }

    #[test]
    fn test_tile_coord_wrapped_key() {
        let coord = TileCoord::wrapped(-3, 4, 5);
        assert_eq!(coord, TileCoord::new(29, 4, 5));
        assert_eq!(coord.key(), "5/29/4");

        // the same physical tile seen one world copy to the east
        assert_eq!(TileCoord::wrapped(29 + 32, 4, 5), coord);
        assert_eq!(TileCoord::wrapped(0, -1, 2).y, 0);
    }
}
