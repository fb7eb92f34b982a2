//! Tile addressing, fetching and caching.

pub mod cache;
pub mod loader;
pub mod source;
