use crate::core::geo::{LatLng, Point};
use crate::prelude::{HashMap, VecDeque};
use serde::{Deserialize, Serialize};

/// Pointer input in screen pixels relative to the map's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// Primary button pressed
    Down { position: Point },
    /// Pointer moved, with or without a button held
    Move { position: Point },
    /// Primary button released
    Up { position: Point },
    /// Pointer left the map; ends a drag like `Up` but never clicks
    Leave,
}

impl PointerEvent {
    /// Gets the position associated with this event, if any
    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Down { position }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position } => Some(*position),
            PointerEvent::Leave => None,
        }
    }
}

/// Map event types that can be emitted by the map
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// A marker was clicked
    MarkerSelected { id: String },
    /// The marker under the pointer changed
    HoverChanged { id: Option<String> },
    /// A click that hit no marker
    Click { lat_lng: LatLng, pixel: Point },
    /// Map view has changed (center or zoom)
    ViewChanged { center: LatLng, zoom: u8 },
}

impl MapEvent {
    /// Name listeners register under
    pub fn event_type(&self) -> &'static str {
        match self {
            MapEvent::MarkerSelected { .. } => "select",
            MapEvent::HoverChanged { .. } => "hover",
            MapEvent::Click { .. } => "click",
            MapEvent::ViewChanged { .. } => "viewchanged",
        }
    }
}

/// Event listener callback type
pub type EventCallback = Box<dyn Fn(&MapEvent) + Send + Sync>;

/// Event management system for the map
#[derive(Default)]
pub struct EventManager {
    /// Event listeners by event type
    listeners: HashMap<&'static str, Vec<EventCallback>>,
    /// Event queue for processing
    event_queue: VecDeque<MapEvent>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event listener
    pub fn on<F>(&mut self, event_type: &'static str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.listeners
            .entry(event_type)
            .or_default()
            .push(Box::new(callback));
    }

    /// Emit an event to the queue
    pub fn emit(&mut self, event: MapEvent) {
        self.event_queue.push_back(event);
    }

    /// Deliver all queued events to their listeners, in emission order
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        let events: Vec<_> = self.event_queue.drain(..).collect();

        for event in &events {
            if let Some(callbacks) = self.listeners.get(event.event_type()) {
                for callback in callbacks {
                    callback(event);
                }
            }
        }

        events
    }

    /// Get number of pending events
    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }
}

/// Cursor the host should show over the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapCursor {
    #[default]
    Grab,
    Grabbing,
    /// Over a marker
    PointingHand,
}

#[cfg(feature = "egui")]
impl From<MapCursor> for egui::CursorIcon {
    fn from(cursor: MapCursor) -> Self {
        match cursor {
            MapCursor::Grab => egui::CursorIcon::Grab,
            MapCursor::Grabbing => egui::CursorIcon::Grabbing,
            MapCursor::PointingHand => egui::CursorIcon::PointingHand,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_pointer_event_position() {
        let down = PointerEvent::Down {
            position: Point::new(100.0, 200.0),
        };
        assert_eq!(down.position(), Some(Point::new(100.0, 200.0)));
        assert_eq!(PointerEvent::Leave.position(), None);
    }

    #[test]
    fn test_listeners_receive_their_events_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut manager = EventManager::new();
        let sink = seen.clone();
        manager.on("select", move |event| {
            if let MapEvent::MarkerSelected { id } = event {
                sink.lock().unwrap().push(id.clone());
            }
        });

        manager.emit(MapEvent::MarkerSelected { id: "a".into() });
        manager.emit(MapEvent::HoverChanged { id: None });
        manager.emit(MapEvent::MarkerSelected { id: "b".into() });
        assert_eq!(manager.pending_events(), 3);

        let processed = manager.process_events();
        assert_eq!(processed.len(), 3);
        assert_eq!(manager.pending_events(), 0);
        assert_eq!(*seen.lock().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[cfg(feature = "egui")]
    #[test]
    fn test_cursor_conversion() {
        assert_eq!(egui::CursorIcon::from(MapCursor::Grab), egui::CursorIcon::Grab);
        assert_eq!(
            egui::CursorIcon::from(MapCursor::PointingHand),
            egui::CursorIcon::PointingHand
        );
    }
}
