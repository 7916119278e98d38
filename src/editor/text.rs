//! Offscreen text rendering for the text filter.

use std::fmt;

use gtk4::cairo;
use image::{Rgba, RgbaImage};

use crate::error::RenderError;

/// Screen resolution assumed when converting point sizes to pixels.
pub const DPI: f64 = 96.0;

const FONT_FAMILY: &str = "Sans";

/// The bold sans face used for every text annotation.
///
/// Loaded once at startup and handed to whoever needs to render text.
#[derive(Clone)]
pub struct TextFont {
    face: cairo::FontFace,
}

impl fmt::Debug for TextFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextFont")
            .field("family", &FONT_FAMILY)
            .finish()
    }
}

impl TextFont {
    pub fn load() -> Result<Self, RenderError> {
        let face = cairo::FontFace::toy_create(
            FONT_FAMILY,
            cairo::FontSlant::Normal,
            cairo::FontWeight::Bold,
        )
        .map_err(|e| RenderError::Font(e.to_string()))?;
        Ok(Self { face })
    }

    fn configure(&self, cr: &cairo::Context, pixel_size: f64) {
        cr.set_font_face(&self.face);
        cr.set_font_size(pixel_size);
    }

    /// Renders `text` over a `background`-filled block.
    ///
    /// Lines are split on `\n`. The returned raster has straight (not
    /// premultiplied) alpha, normalized so the most opaque sample is 255.
    pub fn rasterize(
        &self,
        text: &str,
        color: Rgba<u8>,
        background: Rgba<u8>,
        size: f64,
    ) -> Result<RgbaImage, RenderError> {
        let pixel_size = size * DPI / 72.0;
        let margin = text_margin(size);
        let lines: Vec<&str> = text.split('\n').collect();

        let probe = cairo::ImageSurface::create(cairo::Format::ARgb32, 1, 1)
            .map_err(|e| RenderError::Surface(e.to_string()))?;
        let cr = cairo::Context::new(&probe).map_err(|e| RenderError::Surface(e.to_string()))?;
        self.configure(&cr, pixel_size);
        let font_extents = cr
            .font_extents()
            .map_err(|e| RenderError::Font(e.to_string()))?;
        let mut max_advance: f64 = 0.0;
        for line in &lines {
            let extents = cr
                .text_extents(line)
                .map_err(|e| RenderError::Font(e.to_string()))?;
            max_advance = max_advance.max(extents.x_advance());
        }
        drop(cr);

        let line_step = font_extents.height().ceil().max(1.0) as i32;
        let width = (max_advance.ceil() as i32 + 2 * margin).max(1);
        let height = (lines.len() as i32 * line_step + 2 * margin).max(1);

        let mut surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height)
            .map_err(|e| RenderError::Surface(e.to_string()))?;
        {
            let cr =
                cairo::Context::new(&surface).map_err(|e| RenderError::Surface(e.to_string()))?;
            set_source(&cr, background);
            cr.set_operator(cairo::Operator::Source);
            cr.paint().map_err(|e| RenderError::Surface(e.to_string()))?;
            cr.set_operator(cairo::Operator::Over);

            self.configure(&cr, pixel_size);
            set_source(&cr, color);
            for (i, line) in lines.iter().enumerate() {
                let baseline = margin as f64 + font_extents.ascent() + (i as i32 * line_step) as f64;
                cr.move_to(margin as f64, baseline);
                cr.show_text(line)
                    .map_err(|e| RenderError::Font(e.to_string()))?;
            }
        }
        surface.flush();

        let stride = surface.stride() as usize;
        let data = surface
            .data()
            .map_err(|e| RenderError::Surface(e.to_string()))?;
        let mut raster = RgbaImage::new(width as u32, height as u32);
        for (x, y, pixel) in raster.enumerate_pixels_mut() {
            let offset = y as usize * stride + x as usize * 4;
            let argb = u32::from_ne_bytes([
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3],
            ]);
            *pixel = unpremultiply(argb);
        }
        drop(data);

        normalize_alpha(&mut raster);
        Ok(raster)
    }
}

/// Padding around the text block, in pixels.
pub fn text_margin(size: f64) -> i32 {
    ((size * DPI / 100.0) / 2.0).ceil() as i32
}

fn set_source(cr: &cairo::Context, color: Rgba<u8>) {
    cr.set_source_rgba(
        color[0] as f64 / 255.0,
        color[1] as f64 / 255.0,
        color[2] as f64 / 255.0,
        color[3] as f64 / 255.0,
    );
}

/// Converts one cairo ARGB32 (premultiplied) pixel to straight RGBA.
fn unpremultiply(argb: u32) -> Rgba<u8> {
    let a = (argb >> 24) & 0xff;
    if a == 0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |shift: u32| (((argb >> shift) & 0xff) * 255 / a).min(255) as u8;
    Rgba([channel(16), channel(8), channel(0), a as u8])
}

/// Stretches alpha so the most opaque sample becomes fully opaque.
///
/// Hinted glyphs often never reach full coverage, which would leave the
/// text looking washed out once blended.
pub fn normalize_alpha(img: &mut RgbaImage) {
    let max_alpha = img.pixels().map(|p| p[3]).max().unwrap_or(0) as u32;
    if max_alpha == 0 || max_alpha == 255 {
        return;
    }
    for pixel in img.pixels_mut() {
        pixel[3] = (pixel[3] as u32 * 255 / max_alpha) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_alpha_stretches_to_opaque() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([10, 20, 30, 100]));
        img.put_pixel(1, 0, Rgba([10, 20, 30, 50]));
        normalize_alpha(&mut img);
        assert_eq!(img.get_pixel(0, 0)[3], 255);
        assert_eq!(img.get_pixel(1, 0)[3], 127);
        assert_eq!(img.get_pixel(0, 0)[0], 10);
    }

    #[test]
    fn test_normalize_alpha_transparent_is_noop() {
        let mut img = RgbaImage::new(3, 3);
        normalize_alpha(&mut img);
        assert!(img.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_unpremultiply() {
        assert_eq!(unpremultiply(0xff_10_20_30), Rgba([0x10, 0x20, 0x30, 0xff]));
        assert_eq!(unpremultiply(0x80_40_00_80), Rgba([127, 0, 255, 128]));
        assert_eq!(unpremultiply(0x00_12_34_56), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_text_margin() {
        assert_eq!(text_margin(16.0), 8);
        assert_eq!(text_margin(10.0), 5);
    }

    #[test]
    fn test_rasterize_opaque_background_fills_block() {
        let font = TextFont::load().expect("toy font face");
        let background = Rgba([0, 0, 255, 255]);
        let raster = font
            .rasterize("Hi", Rgba([255, 255, 255, 255]), background, 16.0)
            .expect("rasterize");
        assert!(raster.width() > 2 * text_margin(16.0) as u32);
        assert!(raster.pixels().all(|p| p[3] == 255));
        assert_eq!(*raster.get_pixel(0, 0), background);
    }

    #[test]
    fn test_rasterize_multiline_is_taller() {
        let font = TextFont::load().expect("toy font face");
        let clear = Rgba([0, 0, 0, 0]);
        let white = Rgba([255, 255, 255, 255]);
        let one = font.rasterize("line", white, clear, 12.0).expect("rasterize");
        let two = font.rasterize("line\nline", white, clear, 12.0).expect("rasterize");
        assert!(two.height() > one.height());
        assert_eq!(two.width(), one.width());
    }
}
