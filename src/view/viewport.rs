//! Pan/zoom window over the composited image.
//!
//! Output pixel `(x, y)` shows source pixel
//! `(round(x * zoom) + pan.x, round(y * zoom) + pan.y)` where
//! `zoom = 2^-log2_zoom`. Source coordinates are relative to the crop
//! origin, which is also the origin of the composited image.

use image::RgbaImage;
use log::debug;

use super::background::checker_at;
use crate::editor::geometry::{Point, Rect};

/// Scroll units per doubling of the zoom.
pub const SCROLL_STEPS_PER_OCTAVE: f64 = 50.0;

/// Zoom limits, in octaves. Keeps the view extent well inside `i32`.
pub const MIN_LOG2_ZOOM: f64 = -10.0;
pub const MAX_LOG2_ZOOM: f64 = 10.0;

#[derive(Clone, Debug)]
pub struct Viewport {
    /// Source pixel shown at the top-left output pixel.
    pub pan: Point,
    log2_zoom: f64,
    view_w: i32,
    view_h: i32,
    cache: RgbaImage,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            pan: Point::default(),
            log2_zoom: 0.0,
            view_w: 0,
            view_h: 0,
            cache: RgbaImage::new(0, 0),
        }
    }

    /// Source pixels per output pixel.
    pub fn zoom(&self) -> f64 {
        (-self.log2_zoom).exp2()
    }

    pub fn log2_zoom(&self) -> f64 {
        self.log2_zoom
    }

    /// Visible extent, in source pixels.
    pub fn view_size(&self) -> (i32, i32) {
        (self.view_w, self.view_h)
    }

    /// Source rectangle currently on screen.
    pub fn visible_rect(&self) -> Rect {
        Rect::new(
            self.pan.x,
            self.pan.y,
            self.pan.x.saturating_add(self.view_w),
            self.pan.y.saturating_add(self.view_h),
        )
    }

    pub fn cache(&self) -> &RgbaImage {
        &self.cache
    }

    fn update_view_size(&mut self) {
        let zoom = self.zoom();
        let (w, h) = self.cache.dimensions();
        self.view_w = (w as f64 * zoom).round() as i32;
        self.view_h = (h as f64 * zoom).round() as i32;
    }

    /// Makes the cache `width` x `height`. Returns `true` if it had to be
    /// reallocated, in which case it must be rendered again.
    pub fn ensure_cache(&mut self, width: u32, height: u32) -> bool {
        if self.cache.dimensions() == (width, height) {
            return false;
        }
        debug!("Viewport cache resized to {}x{}", width, height);
        self.cache = RgbaImage::new(width, height);
        self.update_view_size();
        true
    }

    /// Repaints the cache in place from `image`.
    pub fn render(&mut self, image: &RgbaImage) {
        let zoom = self.zoom();
        let (img_w, img_h) = (image.width() as i32, image.height() as i32);
        let (w, h) = self.cache.dimensions();
        let columns: Vec<i32> = (0..w)
            .map(|x| ((x as f64 * zoom).round() as i32).saturating_add(self.pan.x))
            .collect();

        for y in 0..h {
            let src_y = ((y as f64 * zoom).round() as i32).saturating_add(self.pan.y);
            let row_inside = src_y >= 0 && src_y < img_h;
            for (x, &src_x) in columns.iter().enumerate() {
                let x = x as u32;
                let color = if row_inside && src_x >= 0 && src_x < img_w {
                    *image.get_pixel(src_x as u32, src_y as u32)
                } else {
                    checker_at(x, y)
                };
                self.cache.put_pixel(x, y, color);
            }
        }
    }

    /// Source pixel under the output position `(x, y)`.
    pub fn source_at(&self, x: f64, y: f64) -> Point {
        let zoom = self.zoom();
        Point::new(
            ((x * zoom).round() as i32).saturating_add(self.pan.x),
            ((y * zoom).round() as i32).saturating_add(self.pan.y),
        )
    }

    /// Changes the zoom keeping the source pixel under `cursor` in place.
    /// The zoom is clamped to `MIN_LOG2_ZOOM..=MAX_LOG2_ZOOM`.
    pub fn zoom_at(&mut self, cursor: (f64, f64), log2_zoom: f64) {
        if log2_zoom.is_nan() {
            return;
        }
        let anchor = self.source_at(cursor.0, cursor.1);
        self.log2_zoom = log2_zoom.clamp(MIN_LOG2_ZOOM, MAX_LOG2_ZOOM);
        self.update_view_size();
        let zoom = self.zoom();
        self.pan = Point::new(
            anchor.x.saturating_sub((cursor.0 * zoom).round() as i32),
            anchor.y.saturating_sub((cursor.1 * zoom).round() as i32),
        );
        debug!(
            "Zoom set to {:.3} (log2), pan {:?}, view {}x{}",
            self.log2_zoom, self.pan, self.view_w, self.view_h
        );
    }

    /// Applies a scroll-wheel delta at `cursor`.
    pub fn scroll(&mut self, cursor: (f64, f64), dy: f64) {
        let target = self.log2_zoom + dy / SCROLL_STEPS_PER_OCTAVE;
        self.zoom_at(cursor, target);
    }

    /// Sets the zoom directly, anchored on the top-left corner.
    pub fn set_log2_zoom(&mut self, log2_zoom: f64) {
        self.zoom_at((0.0, 0.0), log2_zoom);
    }

    /// Pans so the image follows a pointer that moved `delta` output
    /// pixels since the drag started at `start_pan`.
    pub fn drag_pan(&mut self, start_pan: Point, delta: (f64, f64)) {
        let zoom = self.zoom();
        self.pan = Point::new(
            start_pan.x.saturating_sub((delta.0 * zoom).round() as i32),
            start_pan.y.saturating_sub((delta.1 * zoom).round() as i32),
        );
    }

    pub fn center_on(&mut self, source: Point) {
        self.pan = Point::new(
            source.x.saturating_sub(self.view_w / 2),
            source.y.saturating_sub(self.view_h / 2),
        );
    }

    /// Centers on any axis where an image of `size` is smaller than the view.
    pub fn center_small_axes(&mut self, size: (i32, i32)) {
        if size.0 < self.view_w {
            self.pan.x = -(self.view_w - size.0) / 2;
        }
        if size.1 < self.view_h {
            self.pan.y = -(self.view_h - size.1) / 2;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::background::{CHECKER_DARK, CHECKER_LIGHT};
    use image::Rgba;

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| Rgba([x as u8, y as u8, 0, 255]))
    }

    #[test]
    fn test_identity_render() {
        let image = gradient(10, 10);
        let mut vp = Viewport::new();
        assert!(vp.ensure_cache(20, 5));
        assert!(!vp.ensure_cache(20, 5));
        vp.render(&image);
        assert_eq!(*vp.cache().get_pixel(3, 4), Rgba([3, 4, 0, 255]));
        // Past the right edge of the image.
        assert_eq!(*vp.cache().get_pixel(12, 0), CHECKER_DARK);
    }

    #[test]
    fn test_out_of_bounds_shows_checker_by_output_position() {
        let image = gradient(4, 4);
        let mut vp = Viewport::new();
        vp.ensure_cache(60, 60);
        vp.pan = Point::new(-100, -100);
        vp.render(&image);
        assert_eq!(*vp.cache().get_pixel(0, 0), CHECKER_DARK);
        assert_eq!(*vp.cache().get_pixel(30, 0), CHECKER_LIGHT);
        assert_eq!(*vp.cache().get_pixel(30, 30), CHECKER_DARK);
    }

    #[test]
    fn test_view_size_follows_zoom() {
        let mut vp = Viewport::new();
        vp.ensure_cache(400, 200);
        assert_eq!(vp.view_size(), (400, 200));
        vp.set_log2_zoom(1.0);
        assert_eq!(vp.view_size(), (200, 100));
        vp.set_log2_zoom(-1.0);
        assert_eq!(vp.view_size(), (800, 400));
    }

    #[test]
    fn test_zoom_preserves_anchor() {
        let mut vp = Viewport::new();
        vp.ensure_cache(640, 480);
        vp.pan = Point::new(37, -12);
        for (cursor, dy) in [((100.0, 50.0), 20.0), ((639.0, 1.0), -35.0), ((320.5, 240.5), 7.0)] {
            let before = vp.source_at(cursor.0, cursor.1);
            vp.scroll(cursor, dy);
            let after = vp.source_at(cursor.0, cursor.1);
            assert!((before.x - after.x).abs() <= 1, "{:?} vs {:?}", before, after);
            assert!((before.y - after.y).abs() <= 1, "{:?} vs {:?}", before, after);
        }
    }

    #[test]
    fn test_zoomed_in_render_repeats_pixels() {
        let image = gradient(10, 10);
        let mut vp = Viewport::new();
        vp.ensure_cache(8, 8);
        vp.set_log2_zoom(1.0);
        vp.render(&image);
        // zoom = 0.5: output 2 and 3 map to source 1 and 2 (round half away from zero)
        assert_eq!(vp.cache().get_pixel(2, 0)[0], 1);
        assert_eq!(vp.cache().get_pixel(3, 0)[0], 2);
    }

    #[test]
    fn test_extreme_zoom_is_clamped() {
        let image = gradient(10, 10);
        let mut vp = Viewport::new();
        vp.ensure_cache(100, 100);
        vp.pan = Point::new(5, 5);

        vp.set_log2_zoom(-31.0);
        assert_eq!(vp.log2_zoom(), MIN_LOG2_ZOOM);
        assert_eq!(vp.view_size(), (102_400, 102_400));
        vp.render(&image);
        let rect = vp.visible_rect();
        assert!(rect.max.x > rect.min.x && rect.max.y > rect.min.y);
        vp.drag_pan(vp.pan, (-1.0e6, 1.0e6));
        vp.render(&image);
        vp.visible_rect();

        for _ in 0..100 {
            vp.scroll((50.0, 50.0), 1_000.0);
        }
        assert_eq!(vp.log2_zoom(), MAX_LOG2_ZOOM);
        vp.render(&image);

        vp.set_log2_zoom(f64::NAN);
        assert_eq!(vp.log2_zoom(), MAX_LOG2_ZOOM);
    }

    #[test]
    fn test_checker_ignores_pan_and_zoom() {
        let image = gradient(30, 30);
        let mut first = Viewport::new();
        first.ensure_cache(120, 90);
        first.pan = Point::new(-40, -10);
        first.render(&image);

        let mut second = Viewport::new();
        second.ensure_cache(120, 90);
        second.set_log2_zoom(1.5);
        second.pan = Point::new(-7, -55);
        second.render(&image);

        let is_checker = |c: &Rgba<u8>| *c == CHECKER_DARK || *c == CHECKER_LIGHT;
        let mut shared = 0;
        for (x, y, a) in first.cache().enumerate_pixels() {
            let b = second.cache().get_pixel(x, y);
            if is_checker(a) && is_checker(b) {
                assert_eq!(a, b, "checker differs at ({}, {})", x, y);
                shared += 1;
            }
        }
        assert!(shared > 1000);
        // Both colors show up, so the comparison covers block boundaries.
        assert!(first.cache().pixels().any(|c| *c == CHECKER_DARK));
        assert!(first.cache().pixels().any(|c| *c == CHECKER_LIGHT));
    }

    #[test]
    fn test_drag_pan() {
        let mut vp = Viewport::new();
        vp.ensure_cache(100, 100);
        vp.set_log2_zoom(-1.0);
        vp.drag_pan(Point::new(10, 10), (5.0, -3.0));
        assert_eq!(vp.pan, Point::new(0, 16));
    }

    #[test]
    fn test_center_on() {
        let mut vp = Viewport::new();
        vp.ensure_cache(100, 50);
        vp.center_on(Point::new(500, 300));
        assert_eq!(vp.pan, Point::new(450, 275));
        assert_eq!(vp.source_at(50.0, 25.0), Point::new(500, 300));
    }

    #[test]
    fn test_center_small_axes() {
        let mut vp = Viewport::new();
        vp.ensure_cache(100, 100);
        vp.pan = Point::new(7, 7);
        vp.center_small_axes((40, 300));
        assert_eq!(vp.pan, Point::new(-30, 7));
    }
}
