use crate::{
    core::{constants::MARKER_HIT_RADIUS, geo::Point, viewport::Viewport},
    input::events::{MapCursor, PointerEvent},
    layers::marker::Marker,
};
use log::trace;

/// Pointer mode of the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    Dragging,
}

/// What a pointer event changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputResponse {
    /// Anything visible changed
    pub redraw: bool,
    /// A click hit this marker
    pub selected: Option<String>,
    /// A click hit nothing, at this screen position
    pub missed_click: Option<Point>,
    /// A drag was committed into the center
    pub view_changed: bool,
    pub hover_changed: bool,
}

/// Finds the first marker, in dataset order, within `radius` pixels of `point`.
///
/// Earlier markers win over closer ones so overlapping pins resolve
/// deterministically. Markers with non-finite coordinates never match.
pub fn hit_test<'a>(markers: &'a [Marker], viewport: &Viewport, point: Point, radius: f64) -> Option<&'a Marker> {
    markers.iter().filter(|m| m.is_renderable()).find(|marker| {
        let screen = viewport.lat_lng_to_screen(&marker.projected_position());
        screen.distance_to(&point) < radius
    })
}

/// Idle/Dragging state machine with hover and click hit-testing
#[derive(Debug, Clone)]
pub struct InputHandler {
    mode: InteractionMode,
    hovered: Option<String>,
    clicked: Option<String>,
    /// Pointer position minus the pan offset at press time
    drag_anchor: Point,
    press_position: Point,
    moved: bool,
    /// A press from before a reset is still held; its release is not a click
    stale_press: bool,
    hit_radius: f64,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::with_hit_radius(MARKER_HIT_RADIUS)
    }

    pub fn with_hit_radius(hit_radius: f64) -> Self {
        Self {
            mode: InteractionMode::Idle,
            hovered: None,
            clicked: None,
            drag_anchor: Point::zero(),
            press_position: Point::zero(),
            moved: false,
            stale_press: false,
            hit_radius,
        }
    }

    /// Back to Idle with no hover or click target.
    ///
    /// Does not touch the viewport; the owner commits or discards any drag
    /// offset. A press held across the reset is released without clicking.
    pub fn reset(&mut self) {
        let stale_press = self.mode == InteractionMode::Dragging;
        *self = Self::with_hit_radius(self.hit_radius);
        self.stale_press = stale_press;
    }

    /// Runs one pointer event through the state machine
    pub fn handle_event(
        &mut self,
        event: PointerEvent,
        viewport: &mut Viewport,
        markers: &[Marker],
    ) -> InputResponse {
        trace!("{:?} in {:?}", event, self.mode);
        match (self.mode, event) {
            (_, PointerEvent::Down { position }) => {
                self.stale_press = false;
                self.mode = InteractionMode::Dragging;
                self.drag_anchor = position.subtract(&viewport.drag_offset);
                self.press_position = position;
                self.moved = false;
                InputResponse::default()
            }
            (InteractionMode::Dragging, PointerEvent::Move { position }) => {
                if position != self.press_position {
                    self.moved = true;
                }
                let offset = position.subtract(&self.drag_anchor);
                let redraw = offset != viewport.drag_offset;
                viewport.drag_offset = offset;
                InputResponse {
                    redraw,
                    ..InputResponse::default()
                }
            }
            (InteractionMode::Idle, PointerEvent::Move { position }) => {
                let hit = hit_test(markers, viewport, position, self.hit_radius).map(|m| m.id.clone());
                self.set_hovered(hit)
            }
            (InteractionMode::Dragging, PointerEvent::Up { position }) => {
                self.mode = InteractionMode::Idle;
                if self.moved {
                    self.end_drag(viewport)
                } else {
                    self.click(position, viewport, markers)
                }
            }
            (InteractionMode::Idle, PointerEvent::Up { .. }) if self.stale_press => {
                self.stale_press = false;
                InputResponse::default()
            }
            (InteractionMode::Idle, PointerEvent::Up { position }) => self.click(position, viewport, markers),
            (InteractionMode::Dragging, PointerEvent::Leave) => {
                self.mode = InteractionMode::Idle;
                let mut response = self.end_drag(viewport);
                let hover = self.set_hovered(None);
                response.redraw |= hover.redraw;
                response.hover_changed = hover.hover_changed;
                response
            }
            (InteractionMode::Idle, PointerEvent::Leave) => {
                self.stale_press = false;
                self.set_hovered(None)
            }
        }
    }

    fn end_drag(&mut self, viewport: &mut Viewport) -> InputResponse {
        self.moved = false;
        let committed = viewport.commit_drag();
        InputResponse {
            redraw: committed,
            view_changed: committed,
            ..InputResponse::default()
        }
    }

    fn click(&mut self, position: Point, viewport: &Viewport, markers: &[Marker]) -> InputResponse {
        let hit = hit_test(markers, viewport, position, self.hit_radius).map(|m| m.id.clone());
        let redraw = hit != self.clicked;
        self.clicked = hit.clone();
        InputResponse {
            redraw,
            missed_click: if hit.is_none() { Some(position) } else { None },
            selected: hit,
            ..InputResponse::default()
        }
    }

    fn set_hovered(&mut self, hovered: Option<String>) -> InputResponse {
        if hovered == self.hovered {
            return InputResponse::default();
        }
        self.hovered = hovered;
        InputResponse {
            redraw: true,
            hover_changed: true,
            ..InputResponse::default()
        }
    }

    /// Selects a marker without hit-testing, e.g. from a list next to the map
    pub fn select(&mut self, id: Option<String>) -> bool {
        let changed = id != self.clicked;
        self.clicked = id;
        changed
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn clicked(&self) -> Option<&str> {
        self.clicked.as_deref()
    }

    pub fn hit_radius(&self) -> f64 {
        self.hit_radius
    }

    pub fn cursor(&self) -> MapCursor {
        match (self.mode, &self.hovered) {
            (InteractionMode::Dragging, _) => MapCursor::Grabbing,
            (InteractionMode::Idle, Some(_)) => MapCursor::PointingHand,
            (InteractionMode::Idle, None) => MapCursor::Grab,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
