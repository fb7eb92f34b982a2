//! Core constants derived from Web Mercator and common slippy-map conventions.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Tile size as a float, for projection math.
pub const TILE_SIZE_F64: f64 = TILE_SIZE as f64;

/// Latitude bound of the Web Mercator projection (degrees).
pub const MAX_LATITUDE: f64 = 85.051_128_779_8;

/// Lowest zoom the viewport may reach ("world view").
pub const MIN_ZOOM: u8 = 1;

/// Highest zoom the viewport may reach (street level).
pub const MAX_ZOOM: u8 = 18;

/// Zoom used when centering on a requested point or on the first marker.
pub const FOCUS_ZOOM: u8 = 12;

/// Zoom used when there is nothing to center on.
pub const WORLD_ZOOM: u8 = 2;

/// Pointer-to-marker distance (pixels) under which a marker is hit.
pub const MARKER_HIT_RADIUS: f64 = 16.0;

/// Base pin diameter in pixels.
pub const PIN_SIZE: f32 = 28.0;

/// Pin diameter for hovered, clicked and selected markers.
pub const PIN_SIZE_ACTIVE: f32 = 32.0;

/// Default number of tiles kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

/// Default tile provider.
pub const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Attribution required by the default tile provider.
pub const DEFAULT_ATTRIBUTION: &str = "© OpenStreetMap contributors";
