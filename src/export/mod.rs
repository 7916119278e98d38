//! Ways to get the finished image out of the editor.

pub mod clipboard;
pub mod file;
pub mod upload;

pub use clipboard::ClipboardManager;
pub use upload::{HttpSharer, ImageSharer};
