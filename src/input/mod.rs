pub mod events;
pub mod handler;
pub mod tracker;

pub use events::{EventManager, MapCursor, MapEvent, PointerEvent};
pub use handler::{hit_test, InputHandler, InputResponse, InteractionMode};
pub use tracker::{PointerSnapshot, PointerTracker};
