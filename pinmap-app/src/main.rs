use pinmap::{
    layers::load_markers,
    logging::init_logging,
    ui::{MapWidget, MapWidgetExt},
    LatLng, Marker, TileMap,
};
use std::sync::{Arc, Mutex};

/// Selections kept for the side panel
const SELECTION_LOG_LEN: usize = 8;

/// Standalone marker map viewer.
///
/// Pass a JSON file of markers (`[{"id", "position": {"lat", "lng"}, "name", "address"}]`)
/// as the first argument, or run without one to browse a built-in sample.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let markers = match std::env::args().nth(1) {
        Some(path) => load_markers(path)?,
        None => sample_markers(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("pinmap"),
        ..Default::default()
    };

    let app = PinmapApp::new(markers)?;
    eframe::run_native("pinmap-app", options, Box::new(|_cc| Box::new(app)))?;

    Ok(())
}

fn sample_markers() -> Vec<Marker> {
    vec![
        Marker::new("blue-door", LatLng::new(40.7128, -74.0060))
            .with_name("Blue Door Coffee")
            .with_address("12 Spring St, New York"),
        Marker::new("kettle", LatLng::new(40.7180, -74.0020))
            .with_name("Kettle & Crumb")
            .with_address("88 Grand St, New York"),
        Marker::new("harbor", LatLng::new(40.7090, -74.0110))
            .with_name("Harbor Roasters"),
        Marker::new("monmouth", LatLng::new(51.5055, -0.0910))
            .with_name("Monmouth Coffee")
            .with_address("2 Park St, London"),
        Marker::new("fuglen", LatLng::new(35.6700, 139.6930)).with_name("Fuglen Tokyo"),
    ]
}

fn record_selection(ids: &mut Vec<String>, id: &str) {
    ids.push(id.to_string());
    if ids.len() > SELECTION_LOG_LEN {
        let excess = ids.len() - SELECTION_LOG_LEN;
        ids.drain(..excess);
    }
}

/// The main application struct
struct PinmapApp {
    map_widget: MapWidget,
    /// Last [`SELECTION_LOG_LEN`] ids reported by the select callback, newest last
    selections: Arc<Mutex<Vec<String>>>,
}

impl PinmapApp {
    fn new(markers: Vec<Marker>) -> pinmap::Result<Self> {
        let mut map = TileMap::builder().with_markers(markers).build()?;

        let selections = Arc::new(Mutex::new(Vec::new()));
        let sink = selections.clone();
        map.on_select(move |id| {
            log::info!("Selected {}", id);
            if let Ok(mut ids) = sink.lock() {
                record_selection(&mut ids, id);
            }
        });

        Ok(Self {
            map_widget: MapWidget::new(map),
            selections,
        })
    }

    /// Companion list: hovering an entry highlights its pin, clicking centers on it
    fn marker_list(&mut self, ui: &mut egui::Ui) {
        let map = self.map_widget.map_mut();
        let mut hovered = None;
        let mut clicked = None;

        egui::ScrollArea::vertical().show(ui, |ui| {
            for marker in map.markers() {
                let active = map.selected_id() == Some(marker.id.as_str())
                    || map.clicked_marker().map(|m| m.id == marker.id).unwrap_or(false);
                let response = ui.selectable_label(active, marker.label());
                if let Some(address) = &marker.address {
                    ui.small(address);
                }
                if response.hovered() {
                    hovered = Some(marker.id.clone());
                }
                if response.clicked() {
                    clicked = Some((marker.id.clone(), marker.position));
                }
            }
        });

        map.set_selected(hovered);
        if let Some((id, position)) = clicked {
            map.set_center_request(Some(position));
            map.select_marker(id);
        }
    }
}

impl eframe::App for PinmapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Center on:");
                let presets = [
                    ("New York", LatLng::new(40.7128, -74.0060)),
                    ("London", LatLng::new(51.5074, -0.1278)),
                    ("Tokyo", LatLng::new(35.6762, 139.6503)),
                ];
                for (name, center) in presets {
                    if ui.button(name).clicked() {
                        self.map_widget.map_mut().set_center_request(Some(center));
                    }
                }
                if ui.button("Reset view").clicked() {
                    self.map_widget.map_mut().set_center_request(None);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let viewport = self.map_widget.map().viewport();
                    ui.label(format!(
                        "Center: {:.4}, {:.4} | Zoom: {}",
                        viewport.center.lat, viewport.center.lng, viewport.zoom
                    ));
                });
            });
        });

        egui::SidePanel::left("marker_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Places");
                ui.separator();
                self.marker_list(ui);
                ui.separator();
                ui.heading("Selections");
                if let Ok(ids) = self.selections.lock() {
                    for id in ids.iter().rev() {
                        ui.monospace(id);
                    }
                }
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                ui.map_widget(&mut self.map_widget);
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_log_keeps_newest() {
        let mut ids = Vec::new();
        for i in 0..20 {
            record_selection(&mut ids, &i.to_string());
        }
        assert_eq!(ids.len(), SELECTION_LOG_LEN);
        assert_eq!(ids.first().map(String::as_str), Some("12"));
        assert_eq!(ids.last().map(String::as_str), Some("19"));
    }
}
