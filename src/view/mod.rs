//! Pixel renderers for the main viewport and the minimap.

pub mod background;
pub mod minimap;
pub mod viewport;

pub use minimap::Minimap;
pub use viewport::Viewport;
