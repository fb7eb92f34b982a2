use image::{ImageOutputFormat, Rgba, RgbaImage};
use pinmap::{
    core::projection,
    rendering::rasterize,
    LatLng, MapError, Marker, Point, PointerEvent, RenderContext, Result, TileCoord,
    TileFetcher, TileMap,
};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Integration tests driving a mounted map the way a host would: feeding
/// pointer events, waiting on real async tile fetches and rendering frames.
#[cfg(test)]
mod integration_tests {
    use super::*;

    /// Serves one solid PNG for every URL and records what was asked for
    struct PngFetcher {
        png: Vec<u8>,
        urls: Mutex<Vec<String>>,
    }

    impl PngFetcher {
        fn new() -> Arc<Self> {
            let tile = RgbaImage::from_pixel(256, 256, Rgba([120, 180, 120, 255]));
            let mut png = Vec::new();
            tile.write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
                .unwrap();
            Arc::new(Self {
                png,
                urls: Mutex::new(Vec::new()),
            })
        }

        fn urls(&self) -> Vec<String> {
            self.urls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl TileFetcher for PngFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.urls.lock().unwrap().push(url.to_string());
            if url.contains("/18/") {
                return Err(MapError::TileStatus {
                    url: url.to_string(),
                    status: 404,
                });
            }
            Ok(self.png.clone())
        }
    }

    fn mount(fetcher: Arc<PngFetcher>, markers: Vec<Marker>) -> TileMap {
        TileMap::builder()
            .with_markers(markers)
            .with_fetcher(fetcher)
            .with_size(800.0, 600.0)
            .build()
            .unwrap()
    }

    fn new_york() -> Marker {
        Marker::new("1", LatLng::new(40.7128, -74.0060)).with_name("Corner Café")
    }

    /// Renders and polls until no fetch is in flight
    async fn settle(map: &mut TileMap) {
        let mut ctx = RenderContext::default();
        map.render(&mut ctx);
        for _ in 0..200 {
            map.poll_tiles();
            if !map.has_pending_tiles() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("tiles never settled");
    }

    #[tokio::test]
    async fn test_empty_dataset_opens_world_view() {
        let map = mount(PngFetcher::new(), Vec::new());
        assert_eq!(map.viewport().center, LatLng::new(0.0, 0.0));
        assert_eq!(map.viewport().zoom, 2);
    }

    #[tokio::test]
    async fn test_single_marker_opens_focused_on_it() {
        let map = mount(PngFetcher::new(), vec![new_york()]);
        assert_eq!(map.viewport().center, LatLng::new(40.7128, -74.0060));
        assert_eq!(map.viewport().zoom, 12);
    }

    #[tokio::test]
    async fn test_drag_pans_and_commits_on_release() {
        let mut map = mount(PngFetcher::new(), vec![new_york()]);
        let start = projection::geo_to_pixel(40.7128, -74.0060, 12);

        map.handle_pointer(PointerEvent::Down {
            position: Point::new(100.0, 100.0),
        });
        map.handle_pointer(PointerEvent::Move {
            position: Point::new(150.0, 130.0),
        });
        assert_eq!(map.viewport().drag_offset, Point::new(50.0, 30.0));
        map.handle_pointer(PointerEvent::Up {
            position: Point::new(150.0, 130.0),
        });

        let expected = projection::pixel_to_geo(start.x + 50.0, start.y + 30.0, 12);
        let center = map.viewport().center;
        assert!((center.lat - expected.lat).abs() < 1e-9);
        assert!((center.lng - expected.lng).abs() < 1e-9);
        assert!(map.viewport().drag_offset.is_zero());
        // a drag release is never a click
        assert!(map.clicked_marker().is_none());
    }

    #[tokio::test]
    async fn test_click_near_marker_selects_once() {
        let mut map = mount(PngFetcher::new(), vec![new_york()]);
        let selected = Arc::new(Mutex::new(Vec::new()));
        let sink = selected.clone();
        map.on_select(move |id| sink.lock().unwrap().push(id.to_string()));

        // the marker sits at the screen center, this is 11px away
        let near = Point::new(410.0, 305.0);
        map.handle_pointer(PointerEvent::Move { position: near });
        assert_eq!(map.hovered_marker().map(|m| m.id.as_str()), Some("1"));
        map.handle_pointer(PointerEvent::Down { position: near });
        map.handle_pointer(PointerEvent::Up { position: near });

        assert_eq!(*selected.lock().unwrap(), vec!["1".to_string()]);
        assert_eq!(map.clicked_marker().map(|m| m.label()), Some("Corner Café"));
    }

    #[tokio::test]
    async fn test_tile_arrival_requests_a_redraw() {
        let mut map = mount(PngFetcher::new(), vec![new_york()]);
        let mut ctx = RenderContext::default();
        let before = map.render(&mut ctx);
        assert_eq!(before.tiles_drawn, 0);
        assert!(!map.needs_redraw());

        let mut settled = 0;
        for _ in 0..200 {
            settled = map.poll_tiles();
            if settled > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(settled > 0, "no tile ever arrived");
        assert!(map.needs_redraw());

        let after = map.render(&mut ctx);
        assert!(after.tiles_drawn > before.tiles_drawn);
        assert!(!map.needs_redraw());
    }

    #[tokio::test]
    async fn test_press_on_marker_then_drag_away_selects_nothing() {
        let mut map = mount(PngFetcher::new(), vec![new_york()]);
        let selected = Arc::new(Mutex::new(Vec::new()));
        let sink = selected.clone();
        map.on_select(move |id| sink.lock().unwrap().push(id.to_string()));

        // pressed on the pin at the screen center, released 60px away
        map.handle_pointer(PointerEvent::Down {
            position: Point::new(400.0, 300.0),
        });
        map.handle_pointer(PointerEvent::Move {
            position: Point::new(460.0, 300.0),
        });
        map.handle_pointer(PointerEvent::Up {
            position: Point::new(460.0, 300.0),
        });

        assert!(selected.lock().unwrap().is_empty());
        assert!(map.clicked_marker().is_none());
        assert!(map.viewport().drag_offset.is_zero());
    }

    #[tokio::test]
    async fn test_zoom_in_stops_at_max() {
        let fetcher = PngFetcher::new();
        let mut map = TileMap::builder()
            .with_center(LatLng::new(40.7128, -74.0060))
            .with_fetcher(fetcher.clone())
            .with_size(800.0, 600.0)
            .build()
            .unwrap();
        while map.zoom_in() {}
        assert_eq!(map.viewport().zoom, 18);
        assert!(!map.zoom_in());
        assert!(!map.can_zoom_in());
        assert_eq!(map.viewport().zoom, 18);

        // every zoom-18 fetch fails; the cells stay blank and are not retried
        settle(&mut map).await;
        let requested = fetcher.urls().len();
        let mut ctx = RenderContext::default();
        let stats = map.render(&mut ctx);
        assert_eq!(stats.tiles_drawn, 0);
        assert_eq!(stats.tiles_failed, stats.tiles_visible);
        assert_eq!(fetcher.urls().len(), requested);
    }

    #[tokio::test]
    async fn test_negative_columns_fetch_wrapped_addresses() {
        let fetcher = PngFetcher::new();
        let mut map = TileMap::builder()
            .with_center(LatLng::new(0.0, -180.0))
            .with_fetcher(fetcher.clone())
            .with_size(1600.0, 600.0)
            .build()
            .unwrap();
        while map.viewport().zoom > 5 {
            map.zoom_out();
        }
        while map.viewport().zoom < 5 {
            map.zoom_in();
        }
        settle(&mut map).await;

        let expected = TileCoord::wrapped(-3, 15, 5);
        assert_eq!(expected.x, projection::wrap_tile_x(-3, 5));
        assert!(map.tile_cache().contains(&expected));
        let urls = fetcher.urls();
        assert!(urls.iter().any(|url| url.contains("/5/29/")));
        assert!(urls.iter().all(|url| !url.contains("/-")));
    }

    #[tokio::test]
    async fn test_each_resident_tile_is_fetched_once() {
        let fetcher = PngFetcher::new();
        let mut map = mount(fetcher.clone(), vec![new_york()]);
        settle(&mut map).await;
        let first = fetcher.urls();
        assert!(!first.is_empty());

        // more frames over the same view request nothing new
        settle(&mut map).await;
        assert_eq!(fetcher.urls(), first);

        let mut ctx = RenderContext::default();
        let stats = map.render(&mut ctx);
        assert!(stats.is_complete());
        assert_eq!(stats.tiles_drawn, stats.tiles_visible);
        assert_eq!(stats.markers_drawn, 1);
    }

    #[tokio::test]
    async fn test_rendered_frame_shows_tiles_and_pin() {
        let mut map = mount(PngFetcher::new(), vec![new_york()]);
        settle(&mut map).await;

        let mut ctx = RenderContext::default();
        map.render(&mut ctx);
        let image = rasterize(&ctx);
        assert_eq!(image.dimensions(), (800, 600));
        // tile pixels away from the pin
        assert_eq!(image.get_pixel(20, 20).0, [120, 180, 120, 255]);
        // pin body left of its glyph
        assert_eq!(image.get_pixel(392, 300).0, [0xfb, 0x92, 0x3c, 255]);
    }
}
