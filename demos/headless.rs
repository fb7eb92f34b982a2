//! Renders one frame of a marker map to a PNG without opening a window.
//!
//! ```text
//! cargo run --example headless -- [markers.json] [out.png]
//! ```

use pinmap::{layers::load_markers, logging::init_logging, rendering::rasterize, LatLng, Marker, RenderContext, TileMap};
use std::time::Duration;

fn sample_markers() -> Vec<Marker> {
    vec![
        Marker::new("1", LatLng::new(40.7128, -74.0060))
            .with_name("Blue Door Coffee")
            .with_address("12 Spring St"),
        Marker::new("2", LatLng::new(40.7180, -74.0020)).with_name("Kettle & Crumb"),
        Marker::new("3", LatLng::new(40.7090, -74.0110)).with_name("Harbor Roasters"),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let mut args = std::env::args().skip(1);
    let markers = match args.next() {
        Some(path) => load_markers(path)?,
        None => sample_markers(),
    };
    let out = args.next().unwrap_or_else(|| "pinmap.png".to_string());

    let mut map = TileMap::builder()
        .with_markers(markers)
        .with_size(1024.0, 768.0)
        .build()?;
    if let Some(first) = map.markers().first().map(|m| m.id.clone()) {
        map.set_selected(Some(first));
    }

    let mut ctx = RenderContext::default();
    map.render(&mut ctx);
    for _ in 0..300 {
        map.poll_tiles();
        if !map.has_pending_tiles() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    let stats = map.render(&mut ctx);
    log::info!(
        "{} of {} tiles drawn ({} failed), {} markers",
        stats.tiles_drawn,
        stats.tiles_visible,
        stats.tiles_failed,
        stats.markers_drawn
    );

    rasterize(&ctx).save(&out)?;
    log::info!("Wrote {}", out);
    Ok(())
}
