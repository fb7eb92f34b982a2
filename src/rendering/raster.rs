//! CPU rasterizer for display lists.
//!
//! Lets a map render without a GUI: the headless demo writes frames to PNG
//! and tests inspect individual pixels. Shapes are anti-aliased by
//! `tiny_skia`; tiles are snapped to whole pixels.

use crate::core::geo::Point;
use crate::rendering::context::{Color, DrawCommand, RenderContext};
use image::{Rgba, RgbaImage};
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Rect, Shader,
    Transform,
};

/// Executes every queued command, in order, onto a fresh transparent image
pub fn rasterize(ctx: &RenderContext) -> RgbaImage {
    let Some(mut pixmap) = Pixmap::new(ctx.width, ctx.height) else {
        return RgbaImage::new(ctx.width, ctx.height);
    };

    for command in ctx.get_drawing_queue() {
        match command {
            DrawCommand::Fill { color } => {
                if let Some(rect) = Rect::from_xywh(0.0, 0.0, ctx.width as f32, ctx.height as f32) {
                    pixmap.fill_rect(rect, &paint(*color), Transform::default(), None);
                }
            }
            DrawCommand::Tile { image, min, size, .. } => draw_image(&mut pixmap, image, *min, *size),
            DrawCommand::Ellipse {
                center,
                radius_x,
                radius_y,
                fill,
            } => {
                let oval = Rect::from_xywh(
                    center.x as f32 - radius_x,
                    center.y as f32 - radius_y,
                    radius_x * 2.0,
                    radius_y * 2.0,
                )
                .and_then(PathBuilder::from_oval);
                if let Some(path) = oval {
                    self::fill(&mut pixmap, &path, *fill);
                }
            }
            DrawCommand::Circle {
                center,
                radius,
                fill: body,
                stroke,
            } => {
                let Some(path) = PathBuilder::from_circle(center.x as f32, center.y as f32, *radius) else {
                    continue;
                };
                fill(&mut pixmap, &path, *body);
                if let Some(stroke) = stroke {
                    outline(&mut pixmap, &path, stroke.width, stroke.color);
                }
            }
            DrawCommand::Line { from, to, stroke } => {
                let mut builder = PathBuilder::new();
                builder.move_to(from.x as f32, from.y as f32);
                builder.line_to(to.x as f32, to.y as f32);
                if let Some(path) = builder.finish() {
                    outline(&mut pixmap, &path, stroke.width, stroke.color);
                }
            }
        }
    }

    let mut target = RgbaImage::new(ctx.width, ctx.height);
    for (dst, src) in target.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    target
}

fn paint(color: Color) -> Paint<'static> {
    Paint {
        shader: Shader::SolidColor(tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)),
        anti_alias: true,
        ..Default::default()
    }
}

fn fill(pixmap: &mut Pixmap, path: &Path, color: Color) {
    pixmap.fill_path(path, &paint(color), FillRule::Winding, Transform::default(), None);
}

fn outline(pixmap: &mut Pixmap, path: &Path, width: f32, color: Color) {
    if width <= 0.0 {
        return;
    }
    pixmap.stroke_path(
        path,
        &paint(color),
        &tiny_skia::Stroke {
            width,
            ..Default::default()
        },
        Transform::default(),
        None,
    );
}

/// Nearest-neighbour blit of `image` scaled into the square at `min`
fn draw_image(pixmap: &mut Pixmap, image: &RgbaImage, min: Point, size: f64) {
    if !size.is_finite() || size <= 0.0 || !min.x.is_finite() || !min.y.is_finite() {
        return;
    }
    let Some(mut source) = Pixmap::new(image.width(), image.height()) else {
        return;
    };
    for (dst, src) in source.pixels_mut().iter_mut().zip(image.pixels()) {
        let Rgba([r, g, b, a]) = *src;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }

    // whole-pixel edges keep neighbouring tiles from blending at the seam
    let (x, y) = (min.x.round() as f32, min.y.round() as f32);
    let side = size.round().max(1.0) as f32;
    let transform = Transform::from_row(
        side / image.width() as f32,
        0.0,
        0.0,
        side / image.height() as f32,
        x,
        y,
    );
    let paint = PixmapPaint {
        quality: FilterQuality::Nearest,
        ..Default::default()
    };
    pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::TileCoord;
    use crate::rendering::context::Stroke;
    use std::sync::Arc;

    fn close(actual: [u8; 4], expected: [u8; 4]) -> bool {
        actual.iter().zip(expected).all(|(a, e)| (*a as i16 - e as i16).abs() <= 1)
    }

    #[test]
    fn test_fill_and_translucent_blend() {
        let mut ctx = RenderContext::new(4, 4);
        ctx.fill(Color::WHITE);
        ctx.fill(Color::rgba(0, 0, 0, 51));
        let image = rasterize(&ctx);
        let pixel = image.get_pixel(1, 1).0;
        assert!(close(pixel, [204, 204, 204, 255]), "{:?}", pixel);
    }

    #[test]
    fn test_tile_is_scaled_and_clipped() {
        let mut tile = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        tile.put_pixel(1, 1, Rgba([0, 0, 255, 255]));

        let mut ctx = RenderContext::new(8, 8);
        ctx.draw_tile(TileCoord::new(0, 0, 1), Arc::new(tile), Point::new(-2.0, -2.0), 8.0);
        let image = rasterize(&ctx);

        assert_eq!(image.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(4, 4).0, [0, 0, 255, 255]);
        // outside the tile
        assert_eq!(image.get_pixel(7, 7).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_tiles_meet_without_a_seam() {
        let green = Arc::new(RgbaImage::from_pixel(4, 4, Rgba([120, 180, 120, 255])));
        let mut ctx = RenderContext::new(16, 8);
        ctx.draw_tile(TileCoord::new(0, 0, 2), green.clone(), Point::new(0.4, 0.0), 8.0);
        ctx.draw_tile(TileCoord::new(1, 0, 2), green, Point::new(8.4, 0.0), 8.0);
        let image = rasterize(&ctx);

        for x in 0..16 {
            assert_eq!(image.get_pixel(x, 4).0, [120, 180, 120, 255], "column {}", x);
        }
    }

    #[test]
    fn test_circle_with_outline() {
        let orange = Color::rgb(0xfb, 0x92, 0x3c);
        let mut ctx = RenderContext::new(40, 40);
        ctx.draw_circle(Point::new(20.0, 20.0), 14.0, orange, Some(Stroke::new(3.0, Color::WHITE)));
        let image = rasterize(&ctx);

        assert_eq!(image.get_pixel(20, 20).0, orange.to_array());
        // straddles the radius: 12.5 to 15.5 from the center
        assert!(close(image.get_pixel(34, 20).0, Color::WHITE.to_array()));
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_line_and_ellipse() {
        let mut ctx = RenderContext::new(20, 20);
        ctx.draw_line(Point::new(10.0, 2.0), Point::new(10.0, 8.0), Stroke::new(2.0, Color::WHITE));
        ctx.draw_ellipse(Point::new(10.0, 15.0), 8.0, 4.0, Color::BLACK);
        let image = rasterize(&ctx);

        assert!(close(image.get_pixel(9, 5).0, [255, 255, 255, 255]));
        assert_eq!(image.get_pixel(12, 5).0, [0, 0, 0, 0]);
        assert!(close(image.get_pixel(4, 15).0, [0, 0, 0, 255]));
        assert_eq!(image.get_pixel(10, 10).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_empty_context_gives_empty_image() {
        let image = rasterize(&RenderContext::default());
        assert_eq!(image.dimensions(), (0, 0));
    }
}
