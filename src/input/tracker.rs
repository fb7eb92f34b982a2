use crate::core::geo::Point;
use crate::input::events::PointerEvent;

/// Raw pointer state sampled once per UI frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSnapshot {
    /// Pointer position relative to the map, `None` when outside it or gone
    pub position: Option<Point>,
    /// Primary button went down this frame
    pub pressed: bool,
    /// Primary button went up this frame
    pub released: bool,
}

/// Turns per-frame pointer snapshots into ordered [`PointerEvent`]s.
///
/// Immediate-mode UIs report state, not transitions; the tracker remembers
/// the last position and button state so each change is emitted exactly once.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    last_position: Option<Point>,
    button_down: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, snapshot: PointerSnapshot) -> Vec<PointerEvent> {
        let mut events = Vec::new();

        let Some(position) = snapshot.position else {
            if self.last_position.is_some() || self.button_down {
                events.push(PointerEvent::Leave);
            }
            self.last_position = None;
            self.button_down = false;
            return events;
        };

        if self.last_position != Some(position) {
            events.push(PointerEvent::Move { position });
            self.last_position = Some(position);
        }
        if snapshot.pressed && !self.button_down {
            events.push(PointerEvent::Down { position });
            self.button_down = true;
        }
        if snapshot.released && self.button_down {
            events.push(PointerEvent::Up { position });
            self.button_down = false;
        }
        events
    }

    pub fn is_button_down(&self) -> bool {
        self.button_down
    }
}
