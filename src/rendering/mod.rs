pub mod context;
pub mod pipeline;
pub mod raster;
pub mod style;

// Re-export main types
pub use context::{Color, DrawCommand, RenderContext, Stroke};
pub use pipeline::{FrameInput, RenderPipeline, RenderStats};
pub use raster::rasterize;
pub use style::{MarkerStyle, PinStyle};
