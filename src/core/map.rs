use crate::{
    core::{
        builder::MapBuilder,
        config::MapConfig,
        geo::{LatLng, Point},
        viewport::Viewport,
    },
    input::{EventManager, InputHandler, MapCursor, MapEvent, PointerEvent},
    layers::marker::Marker,
    rendering::{
        context::RenderContext,
        pipeline::{FrameInput, RenderPipeline, RenderStats},
    },
    tiles::{
        cache::TileCache,
        loader::{HttpTileFetcher, TileFetcher, TileLoader},
        source::{TileSource, UrlTemplateSource},
    },
    Result,
};
use log::{debug, info};
use std::sync::Arc;

/// A mounted slippy map.
///
/// Owns the viewport, the tile cache and the interaction state. Creating it
/// mounts the map; dropping it unmounts, and any fetch still in flight has
/// its result discarded.
pub struct TileMap {
    config: MapConfig,
    viewport: Viewport,
    markers: Vec<Marker>,
    center_request: Option<LatLng>,
    /// Host-driven highlight, independent of clicks
    selected: Option<String>,
    input: InputHandler,
    tiles: TileCache,
    pipeline: RenderPipeline,
    events: EventManager,
    needs_redraw: bool,
}

impl TileMap {
    /// Mounts a map that fetches tiles over HTTP
    pub fn new(config: MapConfig) -> Result<Self> {
        let fetcher = Arc::new(HttpTileFetcher::new(&config.tiles)?);
        Self::with_fetcher(config, fetcher)
    }

    /// Mounts a map that fetches tiles through `fetcher`
    pub fn with_fetcher(config: MapConfig, fetcher: Arc<dyn TileFetcher>) -> Result<Self> {
        config.validate()?;
        let source = Arc::new(UrlTemplateSource::from_config(&config.tiles));
        let tiles = TileCache::new(TileLoader::new(source, fetcher), config.tiles.cache_capacity);

        Ok(Self {
            viewport: Viewport::initial(None, &[], &config.zoom),
            markers: Vec::new(),
            center_request: None,
            selected: None,
            input: InputHandler::with_hit_radius(config.interaction.hit_radius),
            tiles,
            pipeline: RenderPipeline::new(config.style.background, config.style.markers.clone()),
            events: EventManager::new(),
            needs_redraw: true,
            config,
        })
    }

    pub fn builder() -> MapBuilder {
        MapBuilder::new()
    }

    /// Replaces the marker dataset.
    ///
    /// Interaction state always resets, folding a pan in progress into the
    /// center. The view is only re-initialized when the dataset goes from
    /// empty to non-empty or back.
    pub fn set_markers(&mut self, markers: Vec<Marker>) {
        let transition = self.markers.is_empty() != markers.is_empty();
        self.markers = markers;
        self.reset_interaction();
        if transition {
            self.reinitialize_view();
        }
        self.needs_redraw = true;
    }

    /// Sets or clears the "center on" request; a new request re-initializes the view
    pub fn set_center_request(&mut self, request: Option<LatLng>) {
        if request == self.center_request {
            return;
        }
        self.center_request = request;
        self.reset_interaction();
        self.reinitialize_view();
        self.needs_redraw = true;
    }

    /// Back to Idle; the viewport never keeps a drag offset outside a drag
    fn reset_interaction(&mut self) {
        if self.viewport.commit_drag() {
            self.emit_view_changed();
        }
        self.input.reset();
        self.events.process_events();
    }

    fn reinitialize_view(&mut self) {
        self.viewport
            .reinitialize(self.center_request, &self.markers, &self.config.zoom);
        debug!(
            "View reset to ({:.5}, {:.5}) at zoom {}",
            self.viewport.center.lat, self.viewport.center.lng, self.viewport.zoom
        );
        self.emit_view_changed();
        self.events.process_events();
    }

    /// Externally driven highlight, e.g. the row hovered in a list
    pub fn set_selected(&mut self, id: Option<String>) {
        if id != self.selected {
            self.selected = id;
            self.needs_redraw = true;
        }
    }

    /// Marks a marker as clicked without hit-testing; does not notify `on_select`
    pub fn select_marker(&mut self, id: impl Into<String>) {
        if self.input.select(Some(id.into())) {
            self.needs_redraw = true;
        }
    }

    /// Closes the popup card of the clicked marker
    pub fn dismiss_popup(&mut self) {
        if self.input.select(None) {
            self.needs_redraw = true;
        }
    }

    /// Registers the host callback for marker clicks
    pub fn on_select<F>(&mut self, callback: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.events.on("select", move |event| {
            if let MapEvent::MarkerSelected { id } = event {
                callback(id);
            }
        });
    }

    /// Register a listener for any map event type
    pub fn on<F>(&mut self, event_type: &'static str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.events.on(event_type, callback);
    }

    /// Feeds one pointer event through the interaction state machine.
    ///
    /// Returns whether the map needs to be redrawn.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        let response = self
            .input
            .handle_event(event, &mut self.viewport, &self.markers);

        if let Some(id) = response.selected {
            info!("Marker {} selected", id);
            self.events.emit(MapEvent::MarkerSelected { id });
        }
        if let Some(pixel) = response.missed_click {
            let lat_lng = self.viewport.screen_to_lat_lng(&pixel);
            self.events.emit(MapEvent::Click { lat_lng, pixel });
        }
        if response.hover_changed {
            let id = self.input.hovered().map(str::to_string);
            self.events.emit(MapEvent::HoverChanged { id });
        }
        if response.view_changed {
            self.emit_view_changed();
        }
        self.events.process_events();

        self.needs_redraw |= response.redraw;
        response.redraw
    }

    pub fn can_zoom_in(&self) -> bool {
        self.viewport.can_zoom_in()
    }

    pub fn can_zoom_out(&self) -> bool {
        self.viewport.can_zoom_out()
    }

    /// One zoom level in; false at the upper bound
    pub fn zoom_in(&mut self) -> bool {
        let zoomed = self.viewport.zoom_in();
        self.after_zoom(zoomed)
    }

    /// One zoom level out; false at the lower bound
    pub fn zoom_out(&mut self) -> bool {
        let zoomed = self.viewport.zoom_out();
        self.after_zoom(zoomed)
    }

    fn after_zoom(&mut self, zoomed: bool) -> bool {
        if zoomed {
            self.emit_view_changed();
            self.events.process_events();
            self.needs_redraw = true;
        }
        zoomed
    }

    fn emit_view_changed(&mut self) {
        self.events.emit(MapEvent::ViewChanged {
            center: self.viewport.center,
            zoom: self.viewport.zoom,
        });
    }

    /// Matches the canvas to its container
    pub fn resize(&mut self, width: f64, height: f64) {
        let size = Point::new(width.max(0.0), height.max(0.0));
        if size != self.viewport.size {
            self.viewport.set_size(size);
            self.needs_redraw = true;
        }
    }

    /// Applies finished tile fetches; returns how many tiles settled
    pub fn poll_tiles(&mut self) -> usize {
        let settled = self.tiles.poll();
        if settled > 0 {
            self.needs_redraw = true;
        }
        settled
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Some fetch is still in flight
    pub fn has_pending_tiles(&self) -> bool {
        self.tiles.pending_count() > 0
    }

    /// Draws background, tiles and markers into `ctx`
    pub fn render(&mut self, ctx: &mut RenderContext) -> RenderStats {
        let frame = FrameInput {
            viewport: &self.viewport,
            markers: &self.markers,
            selected: self.selected.as_deref(),
            clicked: self.input.clicked(),
            hovered: self.input.hovered(),
        };
        let stats = self.pipeline.render(ctx, &frame, &mut self.tiles);
        self.needs_redraw = false;
        stats
    }

    fn marker(&self, id: Option<&str>) -> Option<&Marker> {
        let id = id?;
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn hovered_marker(&self) -> Option<&Marker> {
        self.marker(self.input.hovered())
    }

    /// The marker whose popup card is open
    pub fn clicked_marker(&self) -> Option<&Marker> {
        self.marker(self.input.clicked())
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn center_request(&self) -> Option<LatLng> {
        self.center_request
    }

    pub fn cursor(&self) -> MapCursor {
        self.input.cursor()
    }

    pub fn input(&self) -> &InputHandler {
        &self.input
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn tile_cache(&self) -> &TileCache {
        &self.tiles
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Credit line of the tile provider
    pub fn attribution(&self) -> &str {
        self.tiles.loader().source().attribution()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MapError, Result};
    use std::sync::Mutex;

    struct OfflineFetcher;

    #[async_trait::async_trait]
    impl TileFetcher for OfflineFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            Err(MapError::TileStatus {
                url: url.to_string(),
                status: 503,
            })
        }
    }

    fn map() -> TileMap {
        let mut map = TileMap::with_fetcher(MapConfig::default(), Arc::new(OfflineFetcher)).unwrap();
        map.resize(800.0, 600.0);
        map
    }

    fn click(map: &mut TileMap, at: Point) {
        map.handle_pointer(PointerEvent::Down { position: at });
        map.handle_pointer(PointerEvent::Up { position: at });
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = MapConfig::default();
        config.zoom.max = 30;
        assert!(TileMap::with_fetcher(config, Arc::new(OfflineFetcher)).is_err());
    }

    #[test]
    fn test_dataset_transitions_reinitialize_view() {
        let mut map = map();
        assert_eq!(map.viewport().zoom, 2);

        map.set_markers(vec![Marker::new("1", LatLng::new(48.85, 2.35))]);
        assert_eq!(map.viewport().zoom, 12);
        assert_eq!(map.viewport().center, LatLng::new(48.85, 2.35));

        // non-empty to non-empty keeps the view
        map.zoom_out();
        map.set_markers(vec![Marker::new("2", LatLng::new(-33.9, 151.2))]);
        assert_eq!(map.viewport().zoom, 11);
        assert_eq!(map.viewport().center, LatLng::new(48.85, 2.35));

        map.set_markers(Vec::new());
        assert_eq!(map.viewport().zoom, 2);
        assert_eq!(map.viewport().size, Point::new(800.0, 600.0));
    }

    #[test]
    fn test_dataset_swap_mid_drag_commits_pan() {
        let mut map = map();
        map.set_markers(vec![Marker::new("a", LatLng::new(0.0, 0.0))]);
        let selected = Arc::new(Mutex::new(Vec::new()));
        let sink = selected.clone();
        map.on_select(move |id| sink.lock().unwrap().push(id.to_string()));

        let start = map.viewport().center_pixel();
        map.handle_pointer(PointerEvent::Down {
            position: Point::new(350.0, 270.0),
        });
        map.handle_pointer(PointerEvent::Move {
            position: Point::new(400.0, 300.0),
        });

        // a new dataset with a marker right under the pointer
        let under_pointer = map.viewport().screen_to_lat_lng(&Point::new(400.0, 300.0));
        map.set_markers(vec![Marker::new("b", under_pointer)]);
        assert!(map.viewport().drag_offset.is_zero());
        let center = map.viewport().center_pixel();
        assert!((center.x - (start.x + 50.0)).abs() < 1e-6);
        assert!((center.y - (start.y + 30.0)).abs() < 1e-6);

        map.handle_pointer(PointerEvent::Up {
            position: Point::new(400.0, 300.0),
        });
        assert!(map.viewport().drag_offset.is_zero());
        assert!((map.viewport().center_pixel().x - center.x).abs() < 1e-6);
        // the release ends the old drag, it is not a click on "b"
        assert!(selected.lock().unwrap().is_empty());
        assert!(map.clicked_marker().is_none());
    }

    #[test]
    fn test_center_request_reinitializes_and_resets_interaction() {
        let mut map = map();
        map.set_markers(vec![Marker::new("1", LatLng::new(0.0, 0.0))]);
        map.select_marker("1");
        assert!(map.clicked_marker().is_some());

        map.set_center_request(Some(LatLng::new(35.68, 139.69)));
        assert_eq!(map.viewport().center, LatLng::new(35.68, 139.69));
        assert_eq!(map.viewport().zoom, 12);
        assert!(map.clicked_marker().is_none());

        // the same request again changes nothing
        map.zoom_in();
        map.set_center_request(Some(LatLng::new(35.68, 139.69)));
        assert_eq!(map.viewport().zoom, 13);
    }

    #[test]
    fn test_click_notifies_host_but_external_selection_does_not() {
        let mut map = map();
        map.set_markers(vec![Marker::new("1", LatLng::new(0.0, 0.0))]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        map.on_select(move |id| sink.lock().unwrap().push(id.to_string()));

        map.select_marker("1");
        assert!(seen.lock().unwrap().is_empty());

        // the marker sits at the screen center
        click(&mut map, Point::new(400.0, 300.0));
        assert_eq!(*seen.lock().unwrap(), vec!["1".to_string()]);
        assert_eq!(map.clicked_marker().map(|m| m.id.as_str()), Some("1"));

        map.dismiss_popup();
        assert!(map.clicked_marker().is_none());
    }

    #[test]
    fn test_click_on_empty_space_emits_map_click() {
        let mut map = map();
        let clicks = Arc::new(Mutex::new(0));
        let counter = clicks.clone();
        map.on("click", move |_| *counter.lock().unwrap() += 1);

        click(&mut map, Point::new(10.0, 10.0));
        assert_eq!(*clicks.lock().unwrap(), 1);
    }

    #[test]
    fn test_redraw_flag() {
        let mut map = map();
        let mut ctx = RenderContext::default();
        assert!(map.needs_redraw());
        map.render(&mut ctx);
        assert!(!map.needs_redraw());

        map.set_selected(Some("x".into()));
        assert!(map.needs_redraw());
        map.render(&mut ctx);

        map.set_selected(Some("x".into()));
        assert!(!map.needs_redraw());
        assert_eq!(map.selected_id(), Some("x"));
    }

    #[test]
    fn test_zoom_controls_report_bounds() {
        let mut map = map();
        map.set_center_request(Some(LatLng::new(0.0, 0.0)));
        while map.zoom_in() {}
        assert_eq!(map.viewport().zoom, 18);
        assert!(!map.can_zoom_in());
        while map.zoom_out() {}
        assert_eq!(map.viewport().zoom, 1);
        assert!(!map.can_zoom_out());
    }
}
