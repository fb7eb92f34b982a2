use image::RgbaImage;
use log::{debug, warn};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

use super::loader::{TileLoader, TileResult};
use crate::core::constants::DEFAULT_CACHE_CAPACITY;
use crate::core::geo::TileCoord;

/// Load state of one cached tile
#[derive(Debug, Clone)]
pub enum TileState {
    /// Fetch in flight
    Pending,
    Loaded(Arc<RgbaImage>),
    /// Fetch or decode failed; the cell stays blank and is not retried
    Failed,
}

impl TileState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, TileState::Loaded(_))
    }

    pub fn image(&self) -> Option<&Arc<RgbaImage>> {
        match self {
            TileState::Loaded(image) => Some(image),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TileEntry {
    pub coord: TileCoord,
    pub state: TileState,
}

/// In-memory tile cache using LRU eviction.
///
/// Entries are keyed by wrapped/clamped address, so every copy of the world
/// shares them. While an address is resident it is fetched at most once;
/// only an evicted address can be requested again.
pub struct TileCache {
    entries: LruCache<TileCoord, TileEntry>,
    loader: TileLoader,
    requested: usize,
}

impl TileCache {
    /// Create a new tile cache with the given capacity
    pub fn new(loader: TileLoader, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or_else(|| NonZeroUsize::new(DEFAULT_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            loader,
            requested: 0,
        }
    }

    /// Looks up a tile, starting a fetch the first time the address is seen
    pub fn get(&mut self, coord: TileCoord) -> TileState {
        if let Some(entry) = self.entries.get(&coord) {
            return entry.state.clone();
        }

        if let Some((evicted, _)) = self.entries.push(
            coord,
            TileEntry {
                coord,
                state: TileState::Pending,
            },
        ) {
            debug!("Evicted tile {}", evicted);
        }
        self.requested += 1;
        self.loader.request(coord);
        TileState::Pending
    }

    /// Records a finished fetch. Returns false if the address is no longer
    /// cached or already settled.
    pub fn apply(&mut self, result: TileResult) -> bool {
        let Some(entry) = self.entries.peek_mut(&result.coord) else {
            debug!("Dropping result for evicted tile {}", result.coord);
            return false;
        };
        if !matches!(entry.state, TileState::Pending) {
            return false;
        }

        entry.state = match result.image {
            Ok(image) => TileState::Loaded(image),
            Err(e) => {
                warn!("Tile {} failed to load: {}", result.coord, e);
                TileState::Failed
            }
        };
        true
    }

    /// Applies every finished fetch; returns how many entries changed
    pub fn poll(&mut self) -> usize {
        self.loader
            .try_recv_results()
            .into_iter()
            .map(|result| self.apply(result))
            .filter(|applied| *applied)
            .count()
    }

    /// Reads an entry without touching its recency
    pub fn peek(&self, coord: &TileCoord) -> Option<&TileEntry> {
        self.entries.peek(coord)
    }

    /// Check if a tile is in the cache
    pub fn contains(&self, coord: &TileCoord) -> bool {
        self.entries.contains(coord)
    }

    /// Number of entries still waiting for their fetch
    pub fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, entry)| matches!(entry.state, TileState::Pending))
            .count()
    }

    /// Total fetches started over the cache's lifetime
    pub fn requested_count(&self) -> usize {
        self.requested
    }

    /// Get the current number of cached tiles
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn loader(&self) -> &TileLoader {
        &self.loader
    }
}
