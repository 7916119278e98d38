use gtk4::gdk::{self, MemoryFormat, MemoryTexture};
use gtk4::glib;
use gtk4::prelude::*;
use image::RgbaImage;
use log::debug;

use crate::error::ExportError;

/// Wraps `image` in a texture GTK can hand to other applications.
pub fn image_to_texture(image: &RgbaImage) -> Result<MemoryTexture, ExportError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ExportError::EmptyImage);
    }
    let stride = image.width() as usize * 4;
    let bytes = glib::Bytes::from(image.as_raw().as_slice());
    Ok(MemoryTexture::new(
        image.width() as i32,
        image.height() as i32,
        MemoryFormat::R8g8b8a8,
        &bytes,
        stride,
    ))
}

pub struct ClipboardManager {
    display: gdk::Display,
}

impl ClipboardManager {
    pub fn from_widget(widget: &impl IsA<gtk4::Widget>) -> Self {
        Self {
            display: widget.display(),
        }
    }

    pub fn copy_image(&self, image: &RgbaImage) -> Result<(), ExportError> {
        let texture = image_to_texture(image)?;
        self.display.clipboard().set_texture(&texture);
        debug!(
            "Copied {}x{} image to clipboard",
            image.width(),
            image.height()
        );
        Ok(())
    }

    pub fn copy_text(&self, text: &str) {
        self.display.clipboard().set_text(text);
        debug!("Copied text to clipboard: {}", text);
    }
}
