//! Application state
//!
//! Everything the window shows, kept free of widgets so the interaction
//! rules can be exercised directly. The UI layer forwards events here and
//! repaints from the result.

use chrono::{DateTime, Local};
use image::{Rgba, RgbaImage};
use log::{debug, info};

use super::config::ShortcutConfig;
use super::preferences::{self as prefs, Preferences};
use crate::editor::geometry::Point;
use crate::editor::tools::parse_number;
use crate::editor::{EditorState, Operation, TextFont};
use crate::error::RenderError;
use crate::export::file::default_name;
use crate::view::{Minimap, Viewport};

const DEFAULT_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
const DEFAULT_BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 0]);
const DEFAULT_THICKNESS: f64 = 3.0;
const DEFAULT_FONT_SIZE: f64 = 16.0;

/// What the UI has to do after a click on the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapOutcome {
    Nothing,
    /// Ask for text to be centered on this point (crop-relative).
    AskText(Point),
}

/// Main application state
pub struct AppState {
    pub editor: EditorState,
    pub viewport: Viewport,
    pub minimap: Minimap,
    pub preferences: Preferences,
    pub shortcuts: ShortcutConfig,
    /// When the capture was taken, used to name exports
    pub captured_at: DateTime<Local>,
    /// Text for the status bar
    pub status: String,
    share_count: u32,
}

impl AppState {
    pub fn new(
        capture: RgbaImage,
        captured_at: DateTime<Local>,
        font: TextFont,
        preferences: Preferences,
    ) -> Self {
        let mut editor = EditorState::new(capture, font);
        let tools = &mut editor.tool_state;
        tools.set_color(preferences.color(prefs::DRAWING_COLOR).unwrap_or(DEFAULT_COLOR));
        tools.set_background(
            preferences
                .color(prefs::BACKGROUND_COLOR)
                .unwrap_or(DEFAULT_BACKGROUND),
        );
        tools.set_thickness(
            preferences
                .float(prefs::THICKNESS)
                .filter(|t| *t > 0.0)
                .unwrap_or(DEFAULT_THICKNESS),
        );
        tools.set_font_size(
            preferences
                .float(prefs::FONT_SIZE)
                .filter(|s| *s > 0.0)
                .unwrap_or(DEFAULT_FONT_SIZE),
        );

        let (w, h) = editor.original().dimensions();
        Self {
            editor,
            viewport: Viewport::new(),
            minimap: Minimap::new(),
            preferences,
            shortcuts: ShortcutConfig::new(),
            captured_at,
            status: format!("Captured {} x {} pixels.", w, h),
            share_count: 0,
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = text.into();
        debug!("Status: {}", self.status);
    }

    // ----------------------------------------------------------------
    // Operations
    // ----------------------------------------------------------------

    /// Switches operation, committing any shape being dragged.
    pub fn set_operation(&mut self, operation: Operation) {
        if self.editor.finish_shape() {
            self.editor.tool_state.end_drag();
        }
        self.editor.set_operation(operation);
        if let Some(hint) = operation.status_hint() {
            self.set_status(hint);
        }
    }

    /// Escape: back to Idle without committing anything.
    pub fn cancel(&mut self) {
        let operation = self.editor.current_operation();
        let dragging = self.editor.tool_state.end_drag().is_some();
        self.editor.cancel_shape();
        self.editor.set_operation(Operation::Idle);
        if operation != Operation::Idle || dragging {
            self.set_status("Cancelled.");
        }
    }

    // ----------------------------------------------------------------
    // Pointer on the viewport
    // ----------------------------------------------------------------

    /// Primary button pressed at output position `(x, y)`.
    pub fn press(&mut self, x: f64, y: f64) {
        let pan = self.viewport.pan;
        self.editor.tool_state.start_drag(x, y, pan);
    }

    /// Pointer moved to output position `(x, y)` while pressed. Returns
    /// `true` when something changed on screen.
    pub fn drag_to(&mut self, x: f64, y: f64) -> bool {
        let started = self.editor.tool_state.update_drag(x, y);
        let Some(drag) = self.editor.tool_state.drag.filter(|d| d.moved) else {
            return false;
        };
        let operation = self.editor.current_operation();
        let visible = self.viewport.visible_rect();

        if operation.drag_pans() {
            let delta = (x - drag.start.0, y - drag.start.1);
            self.viewport.drag_pan(drag.start_pan, delta);
            return true;
        }

        if started {
            let anchor = self.viewport.source_at(drag.start.0, drag.start.1);
            debug!("Starting {:?} at {:?}", operation, anchor);
            self.editor.begin_shape(anchor, visible);
        }
        let to = self.viewport.source_at(x, y);
        self.editor.update_shape(to, visible);
        true
    }

    /// Primary button released. A press that never moved is a click.
    pub fn release(&mut self) -> TapOutcome {
        let Some(drag) = self.editor.tool_state.end_drag() else {
            return TapOutcome::Nothing;
        };
        if drag.moved {
            if self.editor.finish_shape() {
                self.set_status("Drawing done, use Control+Z to undo.");
                self.editor.set_operation(Operation::Idle);
            }
            return TapOutcome::Nothing;
        }
        self.tap(drag.start.0, drag.start.1)
    }

    /// Click at output position `(x, y)`.
    fn tap(&mut self, x: f64, y: f64) -> TapOutcome {
        let point = self.viewport.source_at(x, y);
        let operation = self.editor.current_operation();
        debug!("Tap at {:?} during {:?}", point, operation);

        let outcome = match operation {
            Operation::Idle => TapOutcome::Nothing,
            Operation::CropTopLeft => {
                self.editor.crop_top_left(point);
                self.viewport.pan = Point::new(0, 0);
                self.post_crop();
                TapOutcome::Nothing
            }
            Operation::CropBottomRight => {
                self.editor.crop_bottom_right(point);
                let crop = self.editor.crop();
                let (view_w, view_h) = self.viewport.view_size();
                self.viewport.pan = Point::new(crop.width() - view_w, crop.height() - view_h);
                self.post_crop();
                TapOutcome::Nothing
            }
            Operation::DrawCircle | Operation::DrawArrow => {
                self.set_status("You must drag to draw an arrow or circle.");
                return TapOutcome::Nothing;
            }
            Operation::DrawText => TapOutcome::AskText(point),
        };
        self.editor.set_operation(Operation::Idle);
        outcome
    }

    fn post_crop(&mut self) {
        let crop = self.editor.crop();
        self.viewport
            .center_small_axes((crop.width(), crop.height()));
        self.set_status(format!(
            "New crop: {{{}, {}}} - {{{}, {}}} of original screen, {} x {} pixels.",
            crop.min.x,
            crop.min.y,
            crop.max.x,
            crop.max.y,
            crop.width(),
            crop.height()
        ));
    }

    pub fn crop_reset(&mut self) {
        let old_origin = self.editor.crop_reset();
        self.viewport.pan = self.viewport.pan.add(old_origin);
        self.post_crop();
        let crop = self.editor.crop();
        self.set_status(format!(
            "Reset to original screenshot of size {} x {} pixels.",
            crop.width(),
            crop.height()
        ));
    }

    // ----------------------------------------------------------------
    // Drawing
    // ----------------------------------------------------------------

    /// Adds text confirmed in the text dialog.
    pub fn add_text(
        &mut self,
        text: &str,
        center: Point,
        font_size_text: &str,
    ) -> Result<(), RenderError> {
        let Some(size) = parse_number(font_size_text).filter(|s| *s > 0.0) else {
            self.set_status(format!("Error parsing the font size given: {:?}", font_size_text));
            return Ok(());
        };
        self.editor.tool_state.set_font_size(size);
        let size = self.editor.tool_state.font_size;
        self.preferences.set_float(prefs::FONT_SIZE, size);

        if self.editor.add_text(text, center)? {
            self.set_status("Text drawn, use Control+Z to undo.");
        }
        Ok(())
    }

    pub fn undo(&mut self) {
        if self.editor.undo() {
            self.set_status("Last drawing undone.");
        } else {
            self.set_status("Nothing to undo.");
        }
    }

    pub fn set_color(&mut self, color: Rgba<u8>) {
        self.editor.tool_state.set_color(color);
        self.preferences.set_color(prefs::DRAWING_COLOR, color);
    }

    pub fn set_background(&mut self, color: Rgba<u8>) {
        self.editor.tool_state.set_background(color);
        self.preferences.set_color(prefs::BACKGROUND_COLOR, color);
    }

    /// Applies the thickness field. Malformed input is ignored.
    pub fn set_thickness_text(&mut self, text: &str) -> bool {
        let Some(value) = parse_number(text) else {
            return false;
        };
        self.editor.tool_state.set_thickness(value);
        let thickness = self.editor.tool_state.thickness;
        self.preferences.set_float(prefs::THICKNESS, thickness);
        true
    }

    // ----------------------------------------------------------------
    // View
    // ----------------------------------------------------------------

    /// Scroll wheel over the viewport.
    pub fn scroll(&mut self, cursor: (f64, f64), dy: f64) {
        self.viewport.scroll(cursor, dy);
    }

    /// Applies the zoom field. Malformed input is ignored.
    pub fn set_zoom_text(&mut self, text: &str) -> bool {
        match parse_number(text) {
            Some(log2_zoom) => {
                self.viewport.set_log2_zoom(log2_zoom);
                true
            }
            None => false,
        }
    }

    /// Back to one source pixel per output pixel, keeping the pan.
    pub fn reset_zoom(&mut self) {
        self.viewport.set_log2_zoom(0.0);
    }

    pub fn zoom_text(&self) -> String {
        format!("{:.3}", self.viewport.log2_zoom())
    }

    /// Brings the viewport cache to `width` x `height` and repaints it.
    pub fn render_viewport(&mut self, width: u32, height: u32) -> &RgbaImage {
        self.viewport.ensure_cache(width, height);
        self.viewport.render(self.editor.composited());
        self.viewport.cache()
    }

    pub fn render_minimap(&mut self, width: u32, height: u32) -> &RgbaImage {
        self.minimap.ensure_cache(width, height);
        self.minimap
            .render(self.editor.original(), &self.editor.filters);
        self.minimap.cache()
    }

    /// Viewport outline in minimap pixels.
    pub fn minimap_overlay(&self) -> (f64, f64, f64, f64) {
        self.minimap.viewport_rect(
            self.viewport.pan,
            self.viewport.view_size(),
            self.editor.crop().min,
        )
    }

    /// Click or drag on the minimap: center the view there.
    pub fn minimap_click(&mut self, x: f64, y: f64) {
        let source = self.minimap.source_at(x, y);
        let relative = source.sub(self.editor.crop().min);
        self.viewport.center_on(relative);
    }

    // ----------------------------------------------------------------
    // Export
    // ----------------------------------------------------------------

    /// Suggested file name for a save.
    pub fn save_name(&self) -> String {
        default_name(&self.captured_at)
    }

    /// Name for the next upload. Repeated uploads get `_2`, `_3`, ...
    pub fn next_share_name(&mut self) -> String {
        self.share_count += 1;
        let name = self.save_name();
        let stem = name.trim_end_matches(".png");
        if self.share_count == 1 {
            stem.to_string()
        } else {
            format!("{}_{}", stem, self.share_count)
        }
    }

    pub fn note_save_cancelled(&mut self) {
        self.set_status("Save file cancelled.");
    }

    pub fn note_saved(&mut self, path: &std::path::Path) {
        if let Some(folder) = path.parent().and_then(|p| p.to_str()) {
            self.preferences.set_string(prefs::DEFAULT_PATH, folder);
        }
        info!("Saved to {:?}", path);
        self.set_status(format!("Saved image to {}", path.display()));
    }
}
