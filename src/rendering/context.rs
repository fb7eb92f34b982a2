use crate::{
    core::geo::{Point, TileCoord},
    MapError, Result,
};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Straight (non-premultiplied) RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `#rrggbb` or `#rrggbbaa`
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
            return Err(MapError::InvalidColor(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| MapError::InvalidColor(hex.to_string()))
        };
        let alpha = if digits.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = MapError;

    fn try_from(value: String) -> Result<Self> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

#[cfg(feature = "egui")]
impl From<Color> for egui::Color32 {
    fn from(color: Color) -> Self {
        egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

impl Stroke {
    pub fn new(width: f32, color: Color) -> Self {
        Self { color, width }
    }
}

/// Commands that can be issued to the render context
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// Fill the whole canvas
    Fill { color: Color },
    /// A loaded tile image, placed at its screen-space top-left corner
    Tile {
        coord: TileCoord,
        image: Arc<RgbaImage>,
        min: Point,
        size: f64,
    },
    Ellipse {
        center: Point,
        radius_x: f32,
        radius_y: f32,
        fill: Color,
    },
    Circle {
        center: Point,
        radius: f32,
        fill: Color,
        stroke: Option<Stroke>,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
}

/// Display list for one frame; the "canvas" the render loop draws into.
///
/// A frontend (egui painter, software rasterizer) replays the queue in order.
#[derive(Debug, Default)]
pub struct RenderContext {
    pub width: u32,
    pub height: u32,
    pub drawing_queue: Vec<DrawCommand>,
}

impl RenderContext {
    /// Create a new render context
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            drawing_queue: Vec::new(),
        }
    }

    /// Resize the backing canvas and drop the previous frame
    pub fn begin_frame(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.drawing_queue.clear();
    }

    /// A zero-sized canvas has nowhere to draw
    pub fn is_mounted(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn fill(&mut self, color: Color) {
        self.drawing_queue.push(DrawCommand::Fill { color });
    }

    pub fn draw_tile(&mut self, coord: TileCoord, image: Arc<RgbaImage>, min: Point, size: f64) {
        self.drawing_queue.push(DrawCommand::Tile {
            coord,
            image,
            min,
            size,
        });
    }

    pub fn draw_ellipse(&mut self, center: Point, radius_x: f32, radius_y: f32, fill: Color) {
        self.drawing_queue.push(DrawCommand::Ellipse {
            center,
            radius_x,
            radius_y,
            fill,
        });
    }

    pub fn draw_circle(&mut self, center: Point, radius: f32, fill: Color, stroke: Option<Stroke>) {
        self.drawing_queue.push(DrawCommand::Circle {
            center,
            radius,
            fill,
            stroke,
        });
    }

    pub fn draw_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.drawing_queue.push(DrawCommand::Line { from, to, stroke });
    }

    /// Get the current drawing queue
    pub fn get_drawing_queue(&self) -> &[DrawCommand] {
        &self.drawing_queue
    }
}
