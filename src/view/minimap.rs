//! Thumbnail of the whole capture with the viewport outline.

use image::RgbaImage;
use log::debug;

use super::background::checker_at;
use crate::editor::compositor::pixel_at;
use crate::editor::filters::FilterList;
use crate::editor::geometry::{Point, Rect};

/// Smallest size the minimap asks for.
pub const MINIMAP_MIN_SIZE: i32 = 200;

#[derive(Clone, Debug)]
pub struct Minimap {
    /// Original pixels per thumbnail pixel.
    scale: f64,
    /// Where the thumbnail sits inside the widget.
    thumb: Rect,
    cache: RgbaImage,
}

impl Default for Minimap {
    fn default() -> Self {
        Self::new()
    }
}

impl Minimap {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            thumb: Rect::default(),
            cache: RgbaImage::new(0, 0),
        }
    }

    pub fn cache(&self) -> &RgbaImage {
        &self.cache
    }

    /// Fits an `img_w` x `img_h` image into `width` x `height` with a
    /// uniform scale, centered along the axis that has room to spare.
    pub fn refresh_geometry(&mut self, width: u32, height: u32, img_w: u32, img_h: u32) {
        if width == 0 || height == 0 || img_w == 0 || img_h == 0 {
            self.scale = 1.0;
            self.thumb = Rect::default();
            return;
        }
        let (w, h) = (width as f64, height as f64);
        let scale_x = img_w as f64 / w;
        let scale_y = img_h as f64 / h;
        if scale_y > scale_x {
            self.scale = scale_y;
            let thumb_w = (img_w as f64 / scale_y).round() as i32;
            let x = (width as i32 - thumb_w) / 2;
            self.thumb = Rect::new(x, 0, x + thumb_w, height as i32);
        } else {
            self.scale = scale_x;
            let thumb_h = (img_h as f64 / scale_x).round() as i32;
            let y = (height as i32 - thumb_h) / 2;
            self.thumb = Rect::new(0, y, width as i32, y + thumb_h);
        }
    }

    /// Makes the cache `width` x `height`. Returns `true` if it was
    /// reallocated.
    pub fn ensure_cache(&mut self, width: u32, height: u32) -> bool {
        if self.cache.dimensions() == (width, height) {
            return false;
        }
        debug!("Minimap cache resized to {}x{}", width, height);
        self.cache = RgbaImage::new(width, height);
        true
    }

    /// Original pixel sampled for thumbnail pixel `(x, y)`.
    fn sample(&self, x: i32, y: i32) -> Point {
        Point::new(
            (((x - self.thumb.min.x) as f64 + 0.5) * self.scale).floor() as i32,
            (((y - self.thumb.min.y) as f64 + 0.5) * self.scale).floor() as i32,
        )
    }

    /// Repaints the thumbnail of `original` with every filter applied.
    pub fn render(&mut self, original: &RgbaImage, filters: &FilterList) {
        let (w, h) = self.cache.dimensions();
        self.refresh_geometry(w, h, original.width(), original.height());
        let (img_w, img_h) = (original.width() as i32, original.height() as i32);

        for y in 0..h {
            for x in 0..w {
                let src = self.sample(x as i32, y as i32);
                let inside = self.thumb.contains(x as i32, y as i32)
                    && src.x >= 0
                    && src.x < img_w
                    && src.y >= 0
                    && src.y < img_h;
                let color = if inside {
                    pixel_at(original, filters, src.x, src.y)
                } else {
                    checker_at(x, y)
                };
                self.cache.put_pixel(x, y, color);
            }
        }
    }

    /// Outline of the viewport in minimap pixels, as `(x, y, w, h)`.
    ///
    /// `pan` and `view` are in crop-relative source pixels, `crop_origin`
    /// places them back on the original.
    pub fn viewport_rect(
        &self,
        pan: Point,
        view: (i32, i32),
        crop_origin: Point,
    ) -> (f64, f64, f64, f64) {
        let origin = pan.add(crop_origin);
        (
            self.thumb.min.x as f64 + origin.x as f64 / self.scale,
            self.thumb.min.y as f64 + origin.y as f64 / self.scale,
            view.0 as f64 / self.scale,
            view.1 as f64 / self.scale,
        )
    }

    /// Original pixel under the minimap position `(x, y)`.
    pub fn source_at(&self, x: f64, y: f64) -> Point {
        Point::new(
            ((x - self.thumb.min.x as f64) * self.scale).floor() as i32,
            ((y - self.thumb.min.y as f64) * self.scale).floor() as i32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::filters::{CircleFilter, Filter};
    use crate::view::background::CHECKER_DARK;
    use image::Rgba;

    #[test]
    fn test_geometry_wide_image() {
        let mut mm = Minimap::new();
        mm.refresh_geometry(200, 200, 1000, 500);
        assert_eq!(mm.scale, 5.0);
        assert_eq!(mm.thumb, Rect::new(0, 50, 200, 150));
    }

    #[test]
    fn test_geometry_tall_image() {
        let mut mm = Minimap::new();
        mm.refresh_geometry(200, 100, 300, 600);
        assert_eq!(mm.scale, 6.0);
        assert_eq!(mm.thumb, Rect::new(75, 0, 125, 100));
    }

    #[test]
    fn test_geometry_degenerate() {
        let mut mm = Minimap::new();
        mm.refresh_geometry(0, 100, 300, 600);
        assert!(mm.thumb.is_empty());
    }

    #[test]
    fn test_render_letterbox_and_filters() {
        let original = RgbaImage::from_pixel(400, 200, Rgba([10, 10, 10, 255]));
        let mut filters = FilterList::new();
        let red = Rgba([255, 0, 0, 255]);
        filters.push(Filter::Circle(CircleFilter::new(
            Rect::new(0, 0, 400, 200),
            red,
            500.0,
        )));

        let mut mm = Minimap::new();
        mm.ensure_cache(100, 100);
        mm.render(&original, &filters);
        // Letterbox above the 100x50 thumbnail.
        assert_eq!(*mm.cache().get_pixel(0, 0), CHECKER_DARK);
        // Filled ellipse shows through at the center.
        assert_eq!(*mm.cache().get_pixel(50, 50), red);
    }

    #[test]
    fn test_viewport_rect_includes_crop_origin() {
        let mut mm = Minimap::new();
        mm.refresh_geometry(200, 200, 1000, 500);
        let (x, y, w, h) = mm.viewport_rect(Point::new(100, 0), (500, 250), Point::new(50, 25));
        assert_eq!((x, y, w, h), (30.0, 55.0, 100.0, 50.0));
    }

    #[test]
    fn test_source_at_inverts_geometry() {
        let mut mm = Minimap::new();
        mm.refresh_geometry(200, 200, 1000, 500);
        assert_eq!(mm.source_at(100.0, 100.0), Point::new(500, 250));
        assert_eq!(mm.source_at(0.0, 50.0), Point::new(0, 0));
    }
}
