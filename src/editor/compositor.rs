//! Applies the filter chain over the original capture.
//!
//! Nothing is flattened ahead of time: every output pixel is pulled through
//! the whole chain on demand, so only the pixels actually written are
//! evaluated.

use image::{Rgba, RgbaImage};
use log::debug;

use super::filters::FilterList;
use super::geometry::Rect;

/// How much of the composited image to re-evaluate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recomposite {
    /// Every pixel of the crop rectangle.
    Full,
    /// Only the given rectangle, in crop-relative coordinates. Used while an
    /// annotation is being dragged.
    Partial(Rect),
}

/// Final color at `(x, y)` of the original image once every filter ran.
pub fn pixel_at(original: &RgbaImage, filters: &FilterList, x: i32, y: i32) -> Rgba<u8> {
    let base = if x >= 0 && y >= 0 {
        original
            .get_pixel_checked(x as u32, y as u32)
            .copied()
            .unwrap_or(Rgba([0, 0, 0, 0]))
    } else {
        Rgba([0, 0, 0, 0])
    };
    filters.apply(x, y, base)
}

/// Owner of the composited, cropped image.
#[derive(Clone, Debug)]
pub struct Compositor {
    buffer: RgbaImage,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    pub fn new() -> Self {
        Self {
            buffer: RgbaImage::new(0, 0),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.buffer
    }

    /// Regenerates the buffer for the `crop` area of `original`.
    ///
    /// A size mismatch between the buffer and the crop always forces a full
    /// pass on a freshly allocated buffer.
    pub fn recomposite(
        &mut self,
        original: &RgbaImage,
        filters: &FilterList,
        crop: Rect,
        mode: Recomposite,
    ) {
        let crop_w = crop.width().max(0) as u32;
        let crop_h = crop.height().max(0) as u32;
        let mut mode = mode;
        if self.buffer.width() != crop_w || self.buffer.height() != crop_h {
            debug!("Reallocating composite buffer to {}x{}", crop_w, crop_h);
            self.buffer = RgbaImage::new(crop_w, crop_h);
            mode = Recomposite::Full;
        }

        let buffer_rect = Rect::from_size(crop_w, crop_h);
        let target = match mode {
            Recomposite::Full => buffer_rect,
            Recomposite::Partial(visible) => visible.intersect(&buffer_rect),
        };
        debug!(
            "Compositing {} filters over {:?} ({:?})",
            filters.len(),
            target,
            mode
        );
        if target.is_empty() {
            return;
        }

        for y in target.min.y..target.max.y {
            for x in target.min.x..target.max.x {
                let color = pixel_at(original, filters, x + crop.min.x, y + crop.min.y);
                self.buffer.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::filters::{CircleFilter, Filter};

    const BACKGROUND: Rgba<u8> = Rgba([20, 40, 60, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn solid(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, BACKGROUND)
    }

    fn circle(x0: i32, y0: i32, x1: i32, y1: i32) -> Filter {
        Filter::Circle(CircleFilter::new(Rect::new(x0, y0, x1, y1), RED, 5.0))
    }

    #[test]
    fn test_end_to_end_circle() {
        let original = solid(100, 100);
        let mut filters = FilterList::new();
        filters.push(circle(10, 10, 90, 90));

        let mut compositor = Compositor::new();
        compositor.recomposite(
            &original,
            &filters,
            Rect::from_size(100, 100),
            Recomposite::Full,
        );
        let out = compositor.image();
        assert_ne!(*out.get_pixel(50, 10), BACKGROUND);
        assert_eq!(*out.get_pixel(50, 50), BACKGROUND);
    }

    #[test]
    fn test_undo_is_bit_identical() {
        let original = RgbaImage::from_fn(64, 48, |x, y| Rgba([x as u8, y as u8, 7, 255]));
        let crop = Rect::new(4, 2, 60, 40);
        let mut filters = FilterList::new();
        filters.push(circle(0, 0, 30, 30));

        let mut compositor = Compositor::new();
        compositor.recomposite(&original, &filters, crop, Recomposite::Full);
        let before = compositor.image().clone();

        filters.push(circle(10, 10, 50, 35));
        compositor.recomposite(&original, &filters, crop, Recomposite::Full);
        assert_ne!(*compositor.image(), before);

        filters.undo();
        compositor.recomposite(&original, &filters, crop, Recomposite::Full);
        assert_eq!(*compositor.image(), before);
    }

    #[test]
    fn test_crop_offsets_source() {
        let original = RgbaImage::from_fn(10, 10, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let mut compositor = Compositor::new();
        compositor.recomposite(
            &original,
            &FilterList::new(),
            Rect::new(3, 4, 8, 9),
            Recomposite::Full,
        );
        assert_eq!(compositor.image().dimensions(), (5, 5));
        assert_eq!(*compositor.image().get_pixel(0, 0), Rgba([3, 4, 0, 255]));
        assert_eq!(*compositor.image().get_pixel(4, 4), Rgba([7, 8, 0, 255]));
    }

    #[test]
    fn test_partial_only_touches_visible_area() {
        let original = solid(100, 100);
        let crop = Rect::from_size(100, 100);
        let mut compositor = Compositor::new();
        compositor.recomposite(&original, &FilterList::new(), crop, Recomposite::Full);

        let mut filters = FilterList::new();
        filters.push(circle(10, 10, 90, 90));
        compositor.recomposite(
            &original,
            &filters,
            crop,
            Recomposite::Partial(Rect::new(0, 0, 100, 50)),
        );
        // Top of the circle is inside the visible half, bottom is not yet.
        assert_eq!(*compositor.image().get_pixel(50, 10), RED);
        assert_eq!(*compositor.image().get_pixel(50, 90), BACKGROUND);

        compositor.recomposite(&original, &filters, crop, Recomposite::Full);
        assert_eq!(*compositor.image().get_pixel(50, 90), RED);
    }

    #[test]
    fn test_partial_upgrades_to_full_on_resize() {
        let original = solid(20, 20);
        let mut filters = FilterList::new();
        filters.push(circle(0, 0, 19, 19));
        let mut compositor = Compositor::new();
        compositor.recomposite(
            &original,
            &filters,
            Rect::from_size(20, 20),
            Recomposite::Partial(Rect::new(0, 0, 1, 1)),
        );
        assert_eq!(*compositor.image().get_pixel(9, 19), RED);
    }

    #[test]
    fn test_pixel_at_outside_is_transparent() {
        let original = solid(2, 2);
        let filters = FilterList::new();
        assert_eq!(pixel_at(&original, &filters, -1, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(pixel_at(&original, &filters, 2, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(pixel_at(&original, &filters, 1, 1), BACKGROUND);
    }
}
