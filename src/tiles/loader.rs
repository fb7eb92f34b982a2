use crossbeam_channel::{unbounded, Receiver, Sender};
use image::RgbaImage;
use log::{debug, error};
use std::sync::Arc;

use super::source::TileSource;
use crate::core::{config::TileConfig, geo::TileCoord};
use crate::{MapError, Result};

/// Fetches raw tile bytes for a URL.
///
/// The HTTP implementation is the default; tests and offline hosts can
/// provide their own.
#[async_trait::async_trait]
pub trait TileFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Async HTTP client for tile fetching
#[derive(Debug, Clone)]
pub struct HttpTileFetcher {
    client: reqwest::Client,
}

impl HttpTileFetcher {
    pub fn new(config: &TileConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl TileFetcher for HttpTileFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MapError::TileStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Result of a tile loading operation
#[derive(Debug)]
pub struct TileResult {
    pub coord: TileCoord,
    pub image: Result<Arc<RgbaImage>>,
}

/// Decodes PNG or JPEG bytes into an RGBA image
pub fn decode_tile(bytes: &[u8]) -> Result<Arc<RgbaImage>> {
    Ok(Arc::new(image::load_from_memory(bytes)?.to_rgba8()))
}

/// Spawns one fire-and-forget task per requested tile.
///
/// Finished tiles are posted to a channel instead of touching shared state,
/// so the owner applies them on its own thread via [`TileLoader::try_recv_results`].
pub struct TileLoader {
    source: Arc<dyn TileSource>,
    fetcher: Arc<dyn TileFetcher>,
    result_tx: Sender<TileResult>,
    result_rx: Receiver<TileResult>,
}

impl TileLoader {
    pub fn new(source: Arc<dyn TileSource>, fetcher: Arc<dyn TileFetcher>) -> Self {
        let (result_tx, result_rx) = unbounded();
        Self {
            source,
            fetcher,
            result_tx,
            result_rx,
        }
    }

    /// Starts fetching `coord`. A task that cannot be spawned is reported
    /// straight back as a failed result.
    pub fn request(&self, coord: TileCoord) {
        let url = self.source.url(coord);
        debug!("Requesting tile {} from {}", coord, url);

        let fetcher = self.fetcher.clone();
        let result_tx = self.result_tx.clone();
        let task = async move {
            let image = match fetcher.fetch(&url).await {
                Ok(bytes) => decode_tile(&bytes),
                Err(e) => Err(e),
            };
            // receiver gone means the map was dropped
            let _ = result_tx.send(TileResult { coord, image });
        };

        if let Err(e) = crate::runtime::spawn(task) {
            error!("Could not spawn fetch for tile {}: {}", coord, e);
            let _ = self.result_tx.send(TileResult {
                coord,
                image: Err(e),
            });
        }
    }

    /// Try to receive completed tile results (non-blocking)
    pub fn try_recv_results(&self) -> Vec<TileResult> {
        self.result_rx.try_iter().collect()
    }

    /// Check if there are any finished results waiting
    pub fn has_pending_results(&self) -> bool {
        !self.result_rx.is_empty()
    }

    pub fn source(&self) -> &dyn TileSource {
        self.source.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::source::UrlTemplateSource;
    use std::io::Cursor;
    use std::sync::Mutex;
    use std::time::Duration;

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageOutputFormat::Png).unwrap();
        out.into_inner()
    }

    struct RecordingFetcher {
        urls: Mutex<Vec<String>>,
        body: Vec<u8>,
    }

    #[async_trait::async_trait]
    impl TileFetcher for RecordingFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok(self.body.clone())
        }
    }

    async fn wait_for_results(loader: &TileLoader, count: usize) -> Vec<TileResult> {
        let mut results = Vec::new();
        for _ in 0..200 {
            results.extend(loader.try_recv_results());
            if results.len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        results
    }

    #[test]
    fn test_decode_tile() {
        let image = decode_tile(&png_bytes()).unwrap();
        assert_eq!(image.dimensions(), (4, 4));
        assert_eq!(image.get_pixel(0, 0).0, [10, 20, 30, 255]);
        assert!(matches!(decode_tile(b"not an image"), Err(MapError::Image(_))));
    }

    #[tokio::test]
    async fn test_request_posts_decoded_result() {
        let fetcher = Arc::new(RecordingFetcher {
            urls: Mutex::new(Vec::new()),
            body: png_bytes(),
        });
        let loader = TileLoader::new(Arc::new(UrlTemplateSource::openstreetmap()), fetcher.clone());

        loader.request(TileCoord::new(29, 4, 5));
        let results = wait_for_results(&loader, 1).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].coord, TileCoord::new(29, 4, 5));
        assert!(results[0].image.is_ok());
        assert_eq!(
            fetcher.urls.lock().unwrap().as_slice(),
            ["https://tile.openstreetmap.org/5/29/4.png"]
        );
    }

    #[tokio::test]
    async fn test_undecodable_body_is_a_failed_result() {
        let fetcher = Arc::new(RecordingFetcher {
            urls: Mutex::new(Vec::new()),
            body: b"<html>rate limited</html>".to_vec(),
        });
        let loader = TileLoader::new(Arc::new(UrlTemplateSource::openstreetmap()), fetcher);

        loader.request(TileCoord::new(0, 0, 1));
        let results = wait_for_results(&loader, 1).await;
        assert!(results[0].image.is_err());
    }

    #[test]
    fn test_request_without_runtime_fails_fast() {
        let fetcher = Arc::new(RecordingFetcher {
            urls: Mutex::new(Vec::new()),
            body: png_bytes(),
        });
        let loader = TileLoader::new(Arc::new(UrlTemplateSource::openstreetmap()), fetcher);

        loader.request(TileCoord::new(0, 0, 1));
        let results = loader.try_recv_results();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0].image, Err(MapError::Runtime(_))));
    }
}
