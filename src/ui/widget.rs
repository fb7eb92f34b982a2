use crate::{
    core::{
        geo::{Point, TileCoord},
        map::TileMap,
    },
    input::tracker::{PointerSnapshot, PointerTracker},
    prelude::HashMap,
    rendering::context::{DrawCommand, RenderContext},
};
use egui::{Color32, ColorImage, Pos2, Rect, Response, Sense, Shape, TextureHandle, Ui, Vec2};
use std::f32::consts::TAU;
use std::time::Duration;

/// Segments used to approximate an ellipse outline
const ELLIPSE_SEGMENTS: usize = 32;
const CONTROL_SIZE: f32 = 30.0;

/// Map widget configuration
#[derive(Debug, Clone, PartialEq)]
pub struct MapWidgetConfig {
    pub show_zoom_controls: bool,
    pub show_attribution: bool,
    /// Details card above the clicked marker
    pub show_popup: bool,
    pub preferred_size: Option<Vec2>,
    /// How often to poll while tiles are loading
    pub tile_poll_interval: Duration,
}

impl Default for MapWidgetConfig {
    fn default() -> Self {
        Self {
            show_zoom_controls: true,
            show_attribution: true,
            show_popup: true,
            preferred_size: None,
            tile_poll_interval: Duration::from_millis(50),
        }
    }
}

/// egui host for a [`TileMap`]: feeds it pointer input, paints its frames
/// and draws the zoom buttons, popup card and attribution.
pub struct MapWidget {
    map: TileMap,
    config: MapWidgetConfig,
    tracker: PointerTracker,
    frame: RenderContext,
    textures: HashMap<TileCoord, TextureHandle>,
}

impl MapWidget {
    pub fn new(map: TileMap) -> Self {
        Self {
            map,
            config: MapWidgetConfig::default(),
            tracker: PointerTracker::new(),
            frame: RenderContext::default(),
            textures: HashMap::default(),
        }
    }

    pub fn with_config(mut self, config: MapWidgetConfig) -> Self {
        self.config = config;
        self
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    /// Host inputs (markers, selection, center requests) go through here
    pub fn map_mut(&mut self) -> &mut TileMap {
        &mut self.map
    }

    pub fn show(&mut self, ui: &mut Ui) -> Response {
        let desired_size = self.config.preferred_size.unwrap_or_else(|| ui.available_size());
        let (rect, response) = ui.allocate_exact_size(desired_size, Sense::click_and_drag());
        self.map.resize(rect.width() as f64, rect.height() as f64);

        let (zoom_in_rect, zoom_out_rect) = control_rects(rect);
        let over_controls = |pos: Pos2| {
            self.config.show_zoom_controls && (zoom_in_rect.contains(pos) || zoom_out_rect.contains(pos))
        };

        let snapshot = ui.input(|input| PointerSnapshot {
            position: input
                .pointer
                .hover_pos()
                .filter(|pos| response.hovered() && rect.contains(*pos) && !over_controls(*pos))
                .map(|pos| Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64)),
            pressed: input.pointer.primary_pressed(),
            released: input.pointer.primary_released(),
        });
        for event in self.tracker.update(snapshot) {
            self.map.handle_pointer(event);
        }
        if response.hovered() {
            ui.ctx().set_cursor_icon(self.map.cursor().into());
        }

        self.map.poll_tiles();
        self.map.render(&mut self.frame);
        self.paint(ui, rect);

        if self.config.show_zoom_controls {
            self.zoom_controls(ui, zoom_in_rect, zoom_out_rect);
        }
        if self.config.show_attribution {
            self.attribution(ui, rect);
        }
        if self.config.show_popup {
            self.popup(ui, rect);
        }

        if self.map.has_pending_tiles() {
            ui.ctx().request_repaint_after(self.config.tile_poll_interval);
        }
        if self.map.needs_redraw() {
            ui.ctx().request_repaint();
        }
        response
    }

    /// Replays the frame's display list with the egui painter
    fn paint(&mut self, ui: &Ui, rect: Rect) {
        let painter = ui.painter_at(rect);
        let cache = self.map.tile_cache();
        self.textures.retain(|coord, _| cache.contains(coord));

        for command in self.frame.get_drawing_queue() {
            match command {
                DrawCommand::Fill { color } => {
                    painter.rect_filled(rect, 0.0, Color32::from(*color));
                }
                DrawCommand::Tile {
                    coord,
                    image,
                    min,
                    size,
                } => {
                    let texture = self.textures.entry(*coord).or_insert_with(|| {
                        let size = [image.width() as usize, image.height() as usize];
                        ui.ctx().load_texture(
                            format!("tile_{}", coord),
                            ColorImage::from_rgba_unmultiplied(size, image.as_raw()),
                            egui::TextureOptions::LINEAR,
                        )
                    });
                    painter.image(
                        texture.id(),
                        Rect::from_min_size(to_screen(rect, *min), Vec2::splat(*size as f32)),
                        Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                        Color32::WHITE,
                    );
                }
                DrawCommand::Ellipse {
                    center,
                    radius_x,
                    radius_y,
                    fill,
                } => {
                    painter.add(Shape::convex_polygon(
                        ellipse_points(to_screen(rect, *center), *radius_x, *radius_y),
                        Color32::from(*fill),
                        egui::Stroke::NONE,
                    ));
                }
                DrawCommand::Circle {
                    center,
                    radius,
                    fill,
                    stroke,
                } => {
                    let stroke = stroke
                        .map(|s| egui::Stroke::new(s.width, Color32::from(s.color)))
                        .unwrap_or(egui::Stroke::NONE);
                    painter.circle(to_screen(rect, *center), *radius, Color32::from(*fill), stroke);
                }
                DrawCommand::Line { from, to, stroke } => {
                    painter.line_segment(
                        [to_screen(rect, *from), to_screen(rect, *to)],
                        egui::Stroke::new(stroke.width, Color32::from(stroke.color)),
                    );
                }
            }
        }
    }

    /// `+`/`−` buttons; a button at its zoom bound is greyed out and ignores clicks
    fn zoom_controls(&mut self, ui: &mut Ui, zoom_in_rect: Rect, zoom_out_rect: Rect) {
        let buttons = [
            (zoom_in_rect, "+", self.map.can_zoom_in(), true),
            (zoom_out_rect, "−", self.map.can_zoom_out(), false),
        ];
        for (button_rect, label, enabled, zoom_in) in buttons {
            let sense = if enabled { Sense::click() } else { Sense::hover() };
            let response = ui.allocate_rect(button_rect, sense);
            if response.clicked() {
                if zoom_in {
                    self.map.zoom_in();
                } else {
                    self.map.zoom_out();
                }
            }

            let (fill, text) = if enabled {
                (Color32::from_rgba_unmultiplied(255, 255, 255, 220), Color32::BLACK)
            } else {
                (Color32::from_rgba_unmultiplied(240, 240, 240, 200), Color32::from_gray(170))
            };
            ui.painter().rect_filled(button_rect, 3.0, fill);
            ui.painter()
                .rect_stroke(button_rect, 3.0, egui::Stroke::new(1.0, Color32::from_gray(100)));
            ui.painter().text(
                button_rect.center(),
                egui::Align2::CENTER_CENTER,
                label,
                egui::FontId::proportional(16.0),
                text,
            );
            if enabled && response.hovered() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            }
        }
    }

    fn attribution(&self, ui: &Ui, rect: Rect) {
        let text = self.map.attribution();
        if text.is_empty() {
            return;
        }
        let painter = ui.painter_at(rect);
        let galley = painter.layout_no_wrap(
            text.to_string(),
            egui::FontId::proportional(10.0),
            Color32::from_gray(60),
        );
        let text_rect = Rect::from_min_size(
            rect.right_bottom() - galley.size() - Vec2::new(6.0, 4.0),
            galley.size(),
        );
        painter.rect_filled(
            text_rect.expand(2.0),
            2.0,
            Color32::from_rgba_unmultiplied(255, 255, 255, 180),
        );
        painter.galley(text_rect.min, galley, Color32::from_gray(60));
    }

    /// Details card for the clicked marker, anchored above its pin
    fn popup(&mut self, ui: &Ui, rect: Rect) {
        let Some(marker) = self.map.clicked_marker() else {
            return;
        };
        if !marker.is_renderable() {
            return;
        }
        let anchor = self.map.viewport().lat_lng_to_screen(&marker.projected_position());
        let pin_radius = self.map.config().style.markers.active_size as f64 / 2.0;
        let anchor = to_screen(rect, anchor.subtract(&Point::new(0.0, pin_radius + 6.0)));
        if !rect.contains(anchor) {
            return;
        }
        let (id, title, address) = (marker.id.clone(), marker.label().to_string(), marker.address.clone());

        let mut close = false;
        egui::Area::new(ui.id().with(("marker_popup", &id)))
            .order(egui::Order::Foreground)
            .fixed_pos(anchor)
            .pivot(egui::Align2::CENTER_BOTTOM)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(220.0);
                    ui.horizontal(|ui| {
                        ui.strong(title);
                        if ui.small_button("✕").clicked() {
                            close = true;
                        }
                    });
                    if let Some(address) = address {
                        ui.label(address);
                    }
                });
            });
        if close {
            self.map.dismiss_popup();
        }
    }
}

fn control_rects(rect: Rect) -> (Rect, Rect) {
    (
        Rect::from_min_size(rect.right_top() + Vec2::new(-40.0, 10.0), Vec2::splat(CONTROL_SIZE)),
        Rect::from_min_size(rect.right_top() + Vec2::new(-40.0, 45.0), Vec2::splat(CONTROL_SIZE)),
    )
}

fn to_screen(rect: Rect, point: Point) -> Pos2 {
    rect.min + Vec2::new(point.x as f32, point.y as f32)
}

fn ellipse_points(center: Pos2, radius_x: f32, radius_y: f32) -> Vec<Pos2> {
    (0..ELLIPSE_SEGMENTS)
        .map(|i| {
            let angle = TAU * i as f32 / ELLIPSE_SEGMENTS as f32;
            center + Vec2::new(radius_x * angle.cos(), radius_y * angle.sin())
        })
        .collect()
}

pub trait MapWidgetExt {
    fn map_widget(&mut self, widget: &mut MapWidget) -> Response;
}

impl MapWidgetExt for Ui {
    fn map_widget(&mut self, widget: &mut MapWidget) -> Response {
        widget.show(self)
    }
}
