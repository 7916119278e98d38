use image::Rgba;

use super::geometry::Point;

/// Pointer distance, in output pixels, after which a press becomes a drag.
pub const DRAG_THRESHOLD: f64 = 3.0;

/// What a click or drag on the viewport currently does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Operation {
    #[default]
    Idle,
    CropTopLeft,
    CropBottomRight,
    DrawCircle,
    DrawArrow,
    DrawText,
}

impl Operation {
    /// Get the icon name for this operation
    pub fn icon_name(&self) -> &'static str {
        match self {
            Operation::Idle => "input-mouse-symbolic",
            Operation::CropTopLeft => "go-top-symbolic",
            Operation::CropBottomRight => "go-bottom-symbolic",
            Operation::DrawCircle => "media-record-symbolic",
            Operation::DrawArrow => "go-next-symbolic",
            Operation::DrawText => "insert-text-symbolic",
        }
    }

    /// Get the tooltip text for this operation
    pub fn tooltip(&self) -> &'static str {
        match self {
            Operation::Idle => "Pan",
            Operation::CropTopLeft => "Crop Top-Left (Alt+J)",
            Operation::CropBottomRight => "Crop Bottom-Right (Alt+K)",
            Operation::DrawCircle => "Circle (Alt+C)",
            Operation::DrawArrow => "Arrow (Alt+A)",
            Operation::DrawText => "Text (Alt+T)",
        }
    }

    /// Status line shown when the operation is selected
    pub fn status_hint(&self) -> Option<&'static str> {
        match self {
            Operation::Idle => None,
            Operation::CropTopLeft => Some("Click on new top-left corner"),
            Operation::CropBottomRight => Some("Click on new bottom-right corner"),
            Operation::DrawCircle => Some("Click and drag to draw circle!"),
            Operation::DrawArrow => {
                Some("Click and drag from start to end (point side) to draw an arrow!")
            }
            Operation::DrawText => Some("Click to define center location of text."),
        }
    }

    /// Pointer shape over the viewport. `None` is the default arrow.
    pub fn cursor_name(&self) -> Option<&'static str> {
        match self {
            Operation::Idle => None,
            Operation::CropTopLeft => Some("nw-resize"),
            Operation::CropBottomRight => Some("se-resize"),
            Operation::DrawCircle | Operation::DrawArrow => Some("crosshair"),
            Operation::DrawText => Some("text"),
        }
    }

    /// Whether a drag in this operation moves the view instead of drawing.
    pub fn drag_pans(&self) -> bool {
        matches!(
            self,
            Operation::Idle
                | Operation::CropTopLeft
                | Operation::CropBottomRight
                | Operation::DrawText
        )
    }
}

/// A press on the viewport that may turn into a drag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragState {
    /// Press position, in output pixels.
    pub start: (f64, f64),
    /// Viewport pan when the press happened.
    pub start_pan: Point,
    /// Set once the pointer moved past [`DRAG_THRESHOLD`].
    pub moved: bool,
}

/// State for the editing tools
#[derive(Clone, Debug)]
pub struct ToolState {
    /// Current viewport operation
    pub operation: Operation,
    /// Color for new circles, arrows and text
    pub color: Rgba<u8>,
    /// Background painted behind text
    pub background: Rgba<u8>,
    /// Stroke thickness for circles and arrows
    pub thickness: f64,
    /// Font size, in points, for the text tool
    pub font_size: f64,
    /// Press/drag in progress on the viewport
    pub drag: Option<DragState>,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            operation: Operation::Idle,
            color: Rgba([255, 0, 0, 255]), // Red by default
            background: Rgba([0, 0, 0, 0]),
            thickness: 3.0,
            font_size: 16.0,
            drag: None,
        }
    }
}

impl ToolState {
    pub fn set_operation(&mut self, operation: Operation) {
        self.operation = operation;
    }

    pub fn set_color(&mut self, color: Rgba<u8>) {
        self.color = color;
    }

    pub fn set_background(&mut self, background: Rgba<u8>) {
        self.background = background;
    }

    pub fn set_thickness(&mut self, thickness: f64) {
        self.thickness = thickness.clamp(1.0, 50.0);
    }

    pub fn set_font_size(&mut self, size: f64) {
        self.font_size = size.clamp(4.0, 200.0);
    }

    pub fn start_drag(&mut self, x: f64, y: f64, pan: Point) {
        self.drag = Some(DragState {
            start: (x, y),
            start_pan: pan,
            moved: false,
        });
    }

    /// Records a new pointer position. Returns `true` when this is the move
    /// that turns the press into a drag.
    pub fn update_drag(&mut self, x: f64, y: f64) -> bool {
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        if drag.moved {
            return false;
        }
        let dx = x - drag.start.0;
        let dy = y - drag.start.1;
        if dx.hypot(dy) >= DRAG_THRESHOLD {
            drag.moved = true;
            return true;
        }
        false
    }

    pub fn end_drag(&mut self) -> Option<DragState> {
        self.drag.take()
    }
}

/// Parses a numeric field, returning `None` for anything that isn't a
/// finite number.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_per_operation() {
        assert_eq!(Operation::Idle.cursor_name(), None);
        assert_eq!(Operation::CropTopLeft.cursor_name(), Some("nw-resize"));
        assert_eq!(Operation::CropBottomRight.cursor_name(), Some("se-resize"));
        assert_eq!(Operation::DrawCircle.cursor_name(), Some("crosshair"));
        assert_eq!(Operation::DrawArrow.cursor_name(), Some("crosshair"));
        assert_eq!(Operation::DrawText.cursor_name(), Some("text"));
    }

    #[test]
    fn test_parse_number_rejects_garbage() {
        assert_eq!(parse_number(" 2.5 "), Some(2.5));
        assert_eq!(parse_number("-1"), Some(-1.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn test_drag_threshold() {
        let mut tools = ToolState::default();
        tools.start_drag(10.0, 10.0, Point::new(0, 0));
        assert!(!tools.update_drag(11.0, 11.0));
        assert!(!tools.drag.is_some_and(|d| d.moved));
        assert!(tools.update_drag(14.0, 10.0));
        assert!(tools.drag.is_some_and(|d| d.moved));
        // Only the first crossing reports the transition.
        assert!(!tools.update_drag(30.0, 10.0));
        let drag = tools.end_drag().expect("drag state");
        assert!(drag.moved);
        assert!(tools.end_drag().is_none());
    }

    #[test]
    fn test_drag_pans_by_operation() {
        assert!(Operation::Idle.drag_pans());
        assert!(Operation::CropTopLeft.drag_pans());
        assert!(Operation::DrawText.drag_pans());
        assert!(!Operation::DrawCircle.drag_pans());
    }

    #[test]
    fn test_settings_are_clamped() {
        let mut tools = ToolState::default();
        tools.set_thickness(0.0);
        assert_eq!(tools.thickness, 1.0);
        tools.set_font_size(1000.0);
        assert_eq!(tools.font_size, 200.0);
    }
}
