//! Screen capture through the xcap library.

pub mod screen;

pub use screen::capture_primary_monitor;
