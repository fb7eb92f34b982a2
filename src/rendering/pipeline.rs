use crate::{
    core::{
        constants::TILE_SIZE_F64,
        geo::{Point, TileCoord},
        viewport::Viewport,
    },
    layers::marker::{Marker, MarkerState},
    rendering::{
        context::{Color, RenderContext, Stroke},
        style::{MarkerStyle, PinStyle},
    },
    tiles::cache::{TileCache, TileState},
};

/// Ground shadow below the pin, relative to the marker position
const SHADOW_OFFSET: Point = Point { x: 0.0, y: 28.0 };
const SHADOW_RADII: (f32, f32) = (8.0, 4.0);
/// Pin glyph: a dot over a short stem
const GLYPH_DOT_OFFSET: Point = Point { x: 0.0, y: -2.0 };
const GLYPH_DOT_RADIUS: f32 = 4.0;
const GLYPH_STEM: (f64, f64) = (2.0, 8.0);
const GLYPH_STEM_WIDTH: f32 = 2.0;

/// Everything a frame depends on besides the tile cache
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub viewport: &'a Viewport,
    pub markers: &'a [Marker],
    /// Host-driven highlight
    pub selected: Option<&'a str>,
    pub clicked: Option<&'a str>,
    pub hovered: Option<&'a str>,
}

/// Counters for one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub tiles_visible: usize,
    pub tiles_drawn: usize,
    pub tiles_pending: usize,
    pub tiles_failed: usize,
    pub markers_drawn: usize,
    pub markers_skipped: usize,
}

impl RenderStats {
    /// Some visible tile is still loading, so another frame will follow
    pub fn is_complete(&self) -> bool {
        self.tiles_pending == 0
    }
}

/// Composites background, tiles and markers, in that order, into a display list
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPipeline {
    pub background: Color,
    pub marker_style: MarkerStyle,
}

impl RenderPipeline {
    pub fn new(background: Color, marker_style: MarkerStyle) -> Self {
        Self {
            background,
            marker_style,
        }
    }

    /// Renders one frame. Resizes `ctx` to the viewport first; a zero-sized
    /// viewport draws nothing and requests no tiles.
    pub fn render(&self, ctx: &mut RenderContext, frame: &FrameInput<'_>, tiles: &mut TileCache) -> RenderStats {
        let viewport = frame.viewport;
        ctx.begin_frame(
            viewport.size.x.max(0.0).round() as u32,
            viewport.size.y.max(0.0).round() as u32,
        );
        if !ctx.is_mounted() {
            return RenderStats::default();
        }

        let mut stats = RenderStats::default();
        ctx.fill(self.background);
        self.draw_tiles(ctx, viewport, tiles, &mut stats);
        self.draw_markers(ctx, frame, &mut stats);
        stats
    }

    fn draw_tiles(&self, ctx: &mut RenderContext, viewport: &Viewport, tiles: &mut TileCache, stats: &mut RenderStats) {
        let top_left = viewport.top_left();
        let range = viewport.visible_tiles();
        stats.tiles_visible = range.len();

        for (x, y) in range.iter() {
            let coord = TileCoord::wrapped(x, y, range.zoom);
            // drawn at the unwrapped position so the map stays continuous
            let min = Point::new(x as f64 * TILE_SIZE_F64, y as f64 * TILE_SIZE_F64).subtract(&top_left);
            match tiles.get(coord) {
                TileState::Loaded(image) => {
                    ctx.draw_tile(coord, image, min, TILE_SIZE_F64);
                    stats.tiles_drawn += 1;
                }
                TileState::Pending => stats.tiles_pending += 1,
                TileState::Failed => stats.tiles_failed += 1,
            }
        }
    }

    fn draw_markers(&self, ctx: &mut RenderContext, frame: &FrameInput<'_>, stats: &mut RenderStats) {
        for marker in frame.markers {
            if !marker.is_renderable() {
                stats.markers_skipped += 1;
                continue;
            }
            let state = MarkerState::resolve(&marker.id, frame.selected, frame.clicked, frame.hovered);
            let position = frame.viewport.lat_lng_to_screen(&marker.projected_position());
            draw_pin(ctx, position, &self.marker_style.pin(state));
            stats.markers_drawn += 1;
        }
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(Color::rgb(0xf3, 0xf4, 0xf6), MarkerStyle::default())
    }
}

/// Round pin with a ground shadow and a white glyph, centered on `at`
pub fn draw_pin(ctx: &mut RenderContext, at: Point, pin: &PinStyle) {
    ctx.draw_ellipse(at.add(&SHADOW_OFFSET), SHADOW_RADII.0, SHADOW_RADII.1, pin.shadow);
    ctx.draw_circle(at, pin.diameter / 2.0, pin.fill, Some(pin.outline));
    ctx.draw_circle(at.add(&GLYPH_DOT_OFFSET), GLYPH_DOT_RADIUS, pin.glyph, None);
    ctx.draw_line(
        at.add(&Point::new(0.0, GLYPH_STEM.0)),
        at.add(&Point::new(0.0, GLYPH_STEM.1)),
        Stroke::new(GLYPH_STEM_WIDTH, pin.glyph),
    );
}
