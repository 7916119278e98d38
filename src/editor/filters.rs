use image::{Rgba, RgbaImage};
use log::debug;

use super::geometry::{Point, Rect};
use super::text::TextFont;
use crate::error::RenderError;

/// Length of the arrow head, in multiples of the stroke thickness.
pub const ARROW_HEAD_LENGTH_FACTOR: f64 = 10.0;
/// Full width of the arrow head base, in multiples of the stroke thickness.
pub const ARROW_HEAD_WIDTH_FACTOR: f64 = 6.0;

/// Outline of an ellipse fitting `bounds`.
#[derive(Clone, Debug)]
pub struct CircleFilter {
    pub bounds: Rect,
    pub color: Rgba<u8>,
    pub thickness: f64,
    center: (f64, f64),
    outer_radius: (f64, f64),
    inner_radius: (f64, f64),
}

impl CircleFilter {
    pub fn new(bounds: Rect, color: Rgba<u8>, thickness: f64) -> Self {
        let mut circle = Self {
            bounds,
            color,
            thickness,
            center: (0.0, 0.0),
            outer_radius: (0.0, 0.0),
            inner_radius: (0.0, 0.0),
        };
        circle.set_bounds(bounds);
        circle
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        let cx = (bounds.min.x + bounds.max.x) / 2;
        let cy = (bounds.min.y + bounds.max.y) / 2;
        self.center = (cx as f64, cy as f64);
        self.outer_radius = (
            bounds.max.x as f64 - self.center.0,
            bounds.max.y as f64 - self.center.1,
        );
        self.inner_radius = (
            self.outer_radius.0 - self.thickness,
            self.outer_radius.1 - self.thickness,
        );
    }

    /// Whether the pixel lies on the stroke (the annulus between both radii).
    pub fn is_on_stroke(&self, x: i32, y: i32) -> bool {
        let (ox, oy) = self.outer_radius;
        if ox <= 0.0 || oy <= 0.0 {
            return false;
        }
        let dx = x as f64 - self.center.0;
        let dy = y as f64 - self.center.1;
        if (dx / ox).powi(2) + (dy / oy).powi(2) > 1.0 {
            return false;
        }

        let (ix, iy) = self.inner_radius;
        if ix <= 0.0 || iy <= 0.0 {
            // Stroke thicker than the radius: solid ellipse.
            return true;
        }
        (dx / ix).powi(2) + (dy / iy).powi(2) > 1.0
    }

    pub fn apply(&self, x: i32, y: i32, under: Rgba<u8>) -> Rgba<u8> {
        if !self.bounds.contains_inclusive(x, y) {
            return under;
        }
        if self.is_on_stroke(x, y) {
            self.color
        } else {
            under
        }
    }
}

/// Straight arrow pointing from `from` to `to`, with a triangular head.
#[derive(Clone, Debug)]
pub struct ArrowFilter {
    pub from: Point,
    pub to: Point,
    pub color: Rgba<u8>,
    pub thickness: f64,
    bounds: Rect,
    cos: f64,
    sin: f64,
    length: f64,
}

impl ArrowFilter {
    pub fn new(from: Point, to: Point, color: Rgba<u8>, thickness: f64) -> Self {
        let mut arrow = Self {
            from,
            to,
            color,
            thickness,
            bounds: Rect::default(),
            cos: 1.0,
            sin: 0.0,
            length: 1.0,
        };
        arrow.set_points(from, to);
        arrow
    }

    pub fn set_points(&mut self, from: Point, mut to: Point) {
        if from == to {
            // Keeps the shaft direction defined.
            to.x += 1;
        }
        self.from = from;
        self.to = to;

        let head_extra = (ARROW_HEAD_WIDTH_FACTOR * self.thickness).ceil() as i32;
        self.bounds = Rect { min: from, max: to }.canon().grow(head_extra);

        let dx = (to.x - from.x) as f64;
        let dy = (to.y - from.y) as f64;
        self.length = dx.hypot(dy);
        self.cos = dx / self.length;
        self.sin = dy / self.length;
        debug!(
            "Arrow from {:?} to {:?}: length={:.0}, angle={:.1}",
            from,
            to,
            self.length,
            dy.atan2(dx).to_degrees()
        );
    }

    /// Coordinates of `(x, y)` in the arrow frame: origin at `from`, x axis
    /// along the shaft.
    pub fn to_local(&self, x: i32, y: i32) -> (f64, f64) {
        let px = (x - self.from.x) as f64;
        let py = (y - self.from.y) as f64;
        (px * self.cos + py * self.sin, -px * self.sin + py * self.cos)
    }

    pub fn is_on_arrow(&self, x: i32, y: i32) -> bool {
        let (lx, ly) = self.to_local(x, y);
        if lx < 0.0 {
            return false;
        }
        let head_start = self.length - ARROW_HEAD_LENGTH_FACTOR * self.thickness;
        if lx < head_start {
            ly.abs() < self.thickness / 2.0
        } else {
            let half_width =
                (self.length - lx) * ARROW_HEAD_WIDTH_FACTOR / ARROW_HEAD_LENGTH_FACTOR / 2.0;
            ly.abs() < half_width
        }
    }

    pub fn apply(&self, x: i32, y: i32, under: Rgba<u8>) -> Rgba<u8> {
        if !self.bounds.contains_inclusive(x, y) {
            return under;
        }
        if self.is_on_arrow(x, y) {
            self.color
        } else {
            under
        }
    }
}

/// Block of text centered on a point, pre-rendered into its own raster.
#[derive(Clone, Debug)]
pub struct TextFilter {
    pub text: String,
    pub center: Point,
    pub color: Rgba<u8>,
    pub background: Rgba<u8>,
    pub size: f64,
    bounds: Rect,
    raster: RgbaImage,
}

impl TextFilter {
    pub fn new(
        font: &TextFont,
        text: &str,
        center: Point,
        color: Rgba<u8>,
        background: Rgba<u8>,
        size: f64,
    ) -> Result<Self, RenderError> {
        let mut filter = Self {
            text: String::new(),
            center,
            color,
            background,
            size,
            bounds: Rect::default(),
            raster: RgbaImage::new(0, 0),
        };
        filter.set_text(font, text)?;
        Ok(filter)
    }

    /// Re-renders the raster for new content.
    pub fn set_text(&mut self, font: &TextFont, text: &str) -> Result<(), RenderError> {
        self.raster = font.rasterize(text, self.color, self.background, self.size)?;
        self.text = text.to_string();

        let half_w = self.raster.width() as i32 / 2;
        let half_h = self.raster.height() as i32 / 2;
        self.bounds = Rect::new(
            self.center.x - half_w,
            self.center.y - half_h,
            self.center.x + half_w,
            self.center.y + half_h,
        );
        Ok(())
    }

    pub fn apply(&self, x: i32, y: i32, under: Rgba<u8>) -> Rgba<u8> {
        if !self.bounds.contains_inclusive(x, y) {
            return under;
        }
        let rx = (x - self.bounds.min.x) as u32;
        let ry = (y - self.bounds.min.y) as u32;
        match self.raster.get_pixel_checked(rx, ry) {
            Some(src) if src[3] > 0 => blend_over(*src, under),
            _ => under,
        }
    }
}

/// "Over" compositing of a straight-alpha `src` on top of `under`. The
/// result keeps the alpha of `under`.
pub fn blend_over(src: Rgba<u8>, under: Rgba<u8>) -> Rgba<u8> {
    let a = src[3] as u32;
    let mix = |s: u8, u: u8| ((s as u32 * a + u as u32 * (255 - a)) / 255) as u8;
    Rgba([
        mix(src[0], under[0]),
        mix(src[1], under[1]),
        mix(src[2], under[2]),
        under[3],
    ])
}

/// One annotation drawn over the screenshot.
#[derive(Clone, Debug)]
pub enum Filter {
    Circle(CircleFilter),
    Arrow(ArrowFilter),
    Text(TextFilter),
}

impl Filter {
    /// Color to display at `(x, y)` given the color underneath.
    pub fn apply(&self, x: i32, y: i32, under: Rgba<u8>) -> Rgba<u8> {
        match self {
            Filter::Circle(circle) => circle.apply(x, y, under),
            Filter::Arrow(arrow) => arrow.apply(x, y, under),
            Filter::Text(text) => text.apply(x, y, under),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Filter::Circle(_) => "circle",
            Filter::Arrow(_) => "arrow",
            Filter::Text(_) => "text",
        }
    }
}

/// Ordered filters; later entries are drawn on top.
#[derive(Clone, Debug, Default)]
pub struct FilterList {
    filters: Vec<Filter>,
}

impl FilterList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, filter: Filter) {
        debug!("Adding {} filter #{}", filter.name(), self.filters.len());
        self.filters.push(filter);
    }

    /// Removes the most recent filter.
    pub fn undo(&mut self) -> Option<Filter> {
        self.filters.pop()
    }

    pub fn last_mut(&mut self) -> Option<&mut Filter> {
        self.filters.last_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Runs `under` through every filter in order.
    pub fn apply(&self, x: i32, y: i32, under: Rgba<u8>) -> Rgba<u8> {
        self.iter().fold(under, |color, filter| filter.apply(x, y, color))
    }
}
