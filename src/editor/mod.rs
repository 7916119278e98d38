pub mod compositor;
pub mod filters;
pub mod geometry;
pub mod text;
pub mod tools;

pub use compositor::{Compositor, Recomposite};
pub use filters::{ArrowFilter, CircleFilter, Filter, FilterList, TextFilter};
pub use geometry::{Point, Rect};
pub use text::TextFont;
pub use tools::{Operation, ToolState};

use image::RgbaImage;
use log::{debug, info};

use crate::error::RenderError;

/// The capture being edited, its crop and the annotations drawn over it.
///
/// Positions passed in are relative to the current crop origin, which is
/// how the viewport reports them. Filters themselves live in original-image
/// coordinates so a crop change never moves them.
#[derive(Clone, Debug)]
pub struct EditorState {
    pub tool_state: ToolState,

    pub filters: FilterList,

    original: RgbaImage,
    crop: Rect,
    compositor: Compositor,
    font: TextFont,

    /// Where the shape being dragged was started, in original coordinates.
    shape_anchor: Option<Point>,
}

impl EditorState {
    pub fn new(original: RgbaImage, font: TextFont) -> Self {
        let crop = Rect::from_size(original.width(), original.height());
        let mut editor = Self {
            tool_state: ToolState::default(),
            filters: FilterList::new(),
            original,
            crop,
            compositor: Compositor::new(),
            font,
            shape_anchor: None,
        };
        editor.recomposite(Recomposite::Full);
        editor
    }

    pub fn original(&self) -> &RgbaImage {
        &self.original
    }

    pub fn crop(&self) -> Rect {
        self.crop
    }

    /// The cropped image with every annotation applied.
    pub fn composited(&self) -> &RgbaImage {
        self.compositor.image()
    }

    pub fn set_operation(&mut self, operation: Operation) {
        debug!("Setting operation to {:?}", operation);
        self.tool_state.set_operation(operation);
    }

    pub fn current_operation(&self) -> Operation {
        self.tool_state.operation
    }

    pub fn recomposite(&mut self, mode: Recomposite) {
        self.compositor
            .recomposite(&self.original, &self.filters, self.crop, mode);
    }

    fn to_original(&self, p: Point) -> Point {
        p.add(self.crop.min)
    }

    /// Moves the top-left corner of the crop to `p`.
    pub fn crop_top_left(&mut self, p: Point) {
        let target = self.to_original(p);
        self.crop.min = Point::new(
            target.x.clamp(0, self.crop.max.x - 1),
            target.y.clamp(0, self.crop.max.y - 1),
        );
        info!("Crop set to {:?}", self.crop);
        self.recomposite(Recomposite::Full);
    }

    /// Moves the bottom-right corner of the crop to `p`.
    pub fn crop_bottom_right(&mut self, p: Point) {
        let target = self.to_original(p);
        self.crop.max = Point::new(
            target
                .x
                .clamp(self.crop.min.x + 1, self.original.width() as i32),
            target
                .y
                .clamp(self.crop.min.y + 1, self.original.height() as i32),
        );
        info!("Crop set to {:?}", self.crop);
        self.recomposite(Recomposite::Full);
    }

    /// Restores the full capture. Returns the previous crop origin so the
    /// caller can keep the view where it was.
    pub fn crop_reset(&mut self) -> Point {
        let old_origin = self.crop.min;
        self.crop = Rect::from_size(self.original.width(), self.original.height());
        info!("Crop reset");
        self.recomposite(Recomposite::Full);
        old_origin
    }

    /// Pushes a live circle or arrow anchored at `anchor`.
    ///
    /// Returns `false` when the current operation doesn't draw shapes.
    pub fn begin_shape(&mut self, anchor: Point, visible: Rect) -> bool {
        let anchor = self.to_original(anchor);
        let tools = &self.tool_state;
        let filter = match tools.operation {
            Operation::DrawCircle => Filter::Circle(CircleFilter::new(
                Rect {
                    min: anchor,
                    max: anchor,
                },
                tools.color,
                tools.thickness,
            )),
            Operation::DrawArrow => Filter::Arrow(ArrowFilter::new(
                anchor,
                anchor,
                tools.color,
                tools.thickness,
            )),
            _ => return false,
        };
        self.filters.push(filter);
        self.shape_anchor = Some(anchor);
        self.recomposite(Recomposite::Partial(visible));
        true
    }

    /// Stretches the live shape so it ends at `to`.
    pub fn update_shape(&mut self, to: Point, visible: Rect) {
        let Some(anchor) = self.shape_anchor else {
            return;
        };
        let to = self.to_original(to);
        match self.filters.last_mut() {
            Some(Filter::Circle(circle)) => circle.set_bounds(Rect { min: anchor, max: to }.canon()),
            Some(Filter::Arrow(arrow)) => arrow.set_points(anchor, to),
            _ => return,
        }
        self.recomposite(Recomposite::Partial(visible));
    }

    /// Freezes the live shape. Returns `true` if there was one.
    pub fn finish_shape(&mut self) -> bool {
        if self.shape_anchor.take().is_none() {
            return false;
        }
        debug!("Shape committed, {} filters", self.filters.len());
        self.recomposite(Recomposite::Full);
        true
    }

    /// Drops the live shape, if any.
    pub fn cancel_shape(&mut self) {
        if self.shape_anchor.take().is_some() {
            self.filters.undo();
            debug!("Live shape discarded");
            self.recomposite(Recomposite::Full);
        }
    }

    /// Adds a text block centered on `center`. Blank text adds nothing.
    pub fn add_text(&mut self, text: &str, center: Point) -> Result<bool, RenderError> {
        if text.trim().is_empty() {
            return Ok(false);
        }
        let tools = &self.tool_state;
        let filter = TextFilter::new(
            &self.font,
            text,
            self.to_original(center),
            tools.color,
            tools.background,
            tools.font_size,
        )?;
        self.filters.push(Filter::Text(filter));
        self.recomposite(Recomposite::Full);
        Ok(true)
    }

    pub fn undo(&mut self) -> bool {
        debug!("Undo operation requested");
        self.shape_anchor = None;
        if self.filters.undo().is_none() {
            return false;
        }
        self.recomposite(Recomposite::Full);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const GRAY: Rgba<u8> = Rgba([100, 100, 100, 255]);

    fn editor(w: u32, h: u32) -> EditorState {
        let font = TextFont::load().expect("toy font face");
        EditorState::new(RgbaImage::from_pixel(w, h, GRAY), font)
    }

    #[test]
    fn test_crop_corners_and_reset() {
        let mut ed = editor(200, 100);
        ed.crop_top_left(Point::new(20, 10));
        assert_eq!(ed.crop(), Rect::new(20, 10, 200, 100));
        // Relative to the new origin.
        ed.crop_bottom_right(Point::new(50, 40));
        assert_eq!(ed.crop(), Rect::new(20, 10, 70, 50));
        assert_eq!(ed.composited().dimensions(), (50, 40));

        let old = ed.crop_reset();
        assert_eq!(old, Point::new(20, 10));
        assert_eq!(ed.crop(), Rect::new(0, 0, 200, 100));
        assert_eq!(ed.composited().dimensions(), (200, 100));
    }

    #[test]
    fn test_crop_is_clamped_and_never_empty() {
        let mut ed = editor(50, 50);
        ed.crop_top_left(Point::new(-10, 500));
        assert_eq!(ed.crop(), Rect::new(0, 49, 50, 50));
        ed.crop_bottom_right(Point::new(-5, -5));
        assert_eq!(ed.crop(), Rect::new(0, 49, 1, 50));
        ed.crop_bottom_right(Point::new(1000, 1000));
        assert_eq!(ed.crop(), Rect::new(0, 49, 50, 50));
    }

    #[test]
    fn test_shape_lifecycle() {
        let mut ed = editor(100, 100);
        let visible = Rect::from_size(100, 100);
        ed.set_operation(Operation::DrawCircle);
        assert!(ed.begin_shape(Point::new(10, 10), visible));
        ed.update_shape(Point::new(90, 90), visible);
        assert!(ed.finish_shape());
        assert_eq!(ed.filters.len(), 1);
        assert_ne!(*ed.composited().get_pixel(50, 10), GRAY);
        assert_eq!(*ed.composited().get_pixel(50, 50), GRAY);
        assert!(!ed.finish_shape());
    }

    #[test]
    fn test_cancel_shape_removes_live_filter() {
        let mut ed = editor(40, 40);
        let before = ed.composited().clone();
        ed.set_operation(Operation::DrawArrow);
        assert!(ed.begin_shape(Point::new(5, 5), Rect::from_size(40, 40)));
        ed.update_shape(Point::new(35, 20), Rect::from_size(40, 40));
        ed.cancel_shape();
        assert!(ed.filters.is_empty());
        assert_eq!(*ed.composited(), before);
    }

    #[test]
    fn test_begin_shape_needs_draw_operation() {
        let mut ed = editor(10, 10);
        assert!(!ed.begin_shape(Point::new(1, 1), Rect::from_size(10, 10)));
        assert!(ed.filters.is_empty());
    }

    #[test]
    fn test_shapes_follow_crop_origin() {
        let mut ed = editor(100, 100);
        ed.crop_top_left(Point::new(30, 30));
        ed.set_operation(Operation::DrawArrow);
        ed.begin_shape(Point::new(0, 0), Rect::from_size(70, 70));
        ed.update_shape(Point::new(20, 0), Rect::from_size(70, 70));
        ed.finish_shape();
        match ed.filters.iter().next() {
            Some(Filter::Arrow(arrow)) => {
                assert_eq!(arrow.from, Point::new(30, 30));
                assert_eq!(arrow.to, Point::new(50, 30));
            }
            other => panic!("unexpected filter {:?}", other),
        };
    }

    #[test]
    fn test_add_text_and_undo() {
        let mut ed = editor(200, 100);
        let before = ed.composited().clone();
        assert!(!ed.add_text("   ", Point::new(100, 50)).expect("blank text"));
        assert!(ed.add_text("Hello", Point::new(100, 50)).expect("text"));
        assert_eq!(ed.filters.len(), 1);
        assert!(ed.undo());
        assert_eq!(*ed.composited(), before);
        assert!(!ed.undo());
    }
}
