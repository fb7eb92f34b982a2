pub mod widget;

pub use widget::{MapWidget, MapWidgetConfig, MapWidgetExt};
