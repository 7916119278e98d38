use gtk::{gdk, gio, glib};
use gtk4 as gtk;
use libadwaita as adw;
use log::{debug, error, info};

use adw::prelude::*;
use gtk::{EventControllerKey, EventControllerMotion, EventControllerScroll, GestureDrag};
use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use crate::app::preferences as prefs;
use crate::app::{Action, AppState, TapOutcome};
use crate::coalesce::{latest, Drained, LatestReceiver, LatestSender};
use crate::editor::Operation;
use crate::error::ExportError;
use crate::export::file::{encode_png, save_png};
use crate::export::{ClipboardManager, HttpSharer, ImageSharer};
use crate::ui::dialogs;
use crate::ui::drawing::DrawingComponents;
use crate::ui::header::HeaderComponents;
use crate::ui::shortcuts;
use crate::ui::toolbar::{from_gdk_rgba, SidePanelComponents, StatusBarComponents};

/// How often queued drag positions are applied, about 60 Hz.
const DRAG_TICK: Duration = Duration::from_millis(16);

/// Zoom steps per scroll-wheel notch (discrete scroll delta of 1).
const WHEEL_STEP: f64 = 10.0;

#[derive(Clone)]
pub struct UiComponents {
    pub window: adw::ApplicationWindow,
    pub header: HeaderComponents,
    pub drawing: DrawingComponents,
    pub side_panel: SidePanelComponents,
    pub status_bar: StatusBarComponents,
}

impl UiComponents {
    /// Brings the status bar in line with `state` and schedules a repaint.
    pub fn refresh(&self, state: &AppState) {
        let operation = state.editor.current_operation();
        self.status_bar.status_label.set_text(&state.status);
        self.status_bar
            .mode_icon
            .set_icon_name(Some(operation.icon_name()));
        self.status_bar
            .mode_icon
            .set_tooltip_text(Some(operation.tooltip()));
        self.drawing
            .drawing_area
            .set_cursor_from_name(operation.cursor_name());
        self.drawing.drawing_area.queue_draw();
        self.drawing.minimap_area.queue_draw();
    }
}

/// Runs `f` on the state, then refreshes the window.
fn update(state: &Rc<RefCell<AppState>>, ui: &UiComponents, f: impl FnOnce(&mut AppState)) {
    let mut s = state.borrow_mut();
    f(&mut s);
    ui.refresh(&s);
}

pub fn run_action(state: &Rc<RefCell<AppState>>, ui: &UiComponents, action: Action) {
    debug!("Running action {:?}", action);
    match action {
        Action::Copy => copy_to_clipboard(state, ui),
        Action::Save => save_to_file(state, ui),
        Action::Upload => upload(state, ui),
        Action::Undo => update(state, ui, AppState::undo),
        Action::CropTopLeft => set_operation(state, ui, Operation::CropTopLeft),
        Action::CropBottomRight => set_operation(state, ui, Operation::CropBottomRight),
        Action::DrawCircle => set_operation(state, ui, Operation::DrawCircle),
        Action::DrawArrow => set_operation(state, ui, Operation::DrawArrow),
        Action::DrawText => set_operation(state, ui, Operation::DrawText),
        Action::Cancel => update(state, ui, AppState::cancel),
        Action::ShowShortcuts => shortcuts::show_shortcuts_dialog(state, &ui.window),
        Action::Quit => ui.window.close(),
    }
}

fn set_operation(state: &Rc<RefCell<AppState>>, ui: &UiComponents, operation: Operation) {
    update(state, ui, |s| s.set_operation(operation));
}

fn copy_to_clipboard(state: &Rc<RefCell<AppState>>, ui: &UiComponents) {
    let clipboard = ClipboardManager::from_widget(&ui.window);
    update(state, ui, |s| match clipboard.copy_image(s.editor.composited()) {
        Ok(()) => {
            info!("Image copied to clipboard");
            s.set_status("Image copied to clipboard.");
        }
        Err(e) => {
            error!("Failed to copy image: {}", e);
            s.set_status(format!("Failed to copy image: {}", e));
        }
    });
}

fn save_to_file(state: &Rc<RefCell<AppState>>, ui: &UiComponents) {
    let (name, folder) = {
        let s = state.borrow();
        (
            s.save_name(),
            s.preferences.string(prefs::DEFAULT_PATH).map(PathBuf::from),
        )
    };

    let state = state.clone();
    let ui = ui.clone();
    glib::spawn_future_local(async move {
        let dialog = gtk::FileDialog::builder()
            .title("Save Screenshot")
            .initial_name(name)
            .modal(true)
            .build();
        if let Some(folder) = folder.filter(|f| f.is_dir()) {
            dialog.set_initial_folder(Some(&gio::File::for_path(folder)));
        }

        let file = match dialog.save_future(Some(&ui.window)).await {
            Ok(file) => file,
            Err(e) => {
                debug!("Save dialog closed: {}", e);
                update(&state, &ui, AppState::note_save_cancelled);
                return;
            }
        };
        let Some(path) = file.path() else {
            error!("Selected file has no local path");
            return;
        };

        update(&state, &ui, |s| match save_png(&path, s.editor.composited()) {
            Ok(written) => s.note_saved(&written),
            Err(e) => {
                error!("Failed to save image: {}", e);
                s.set_status(format!("Failed to save image: {}", e));
            }
        });
    });
}

/// Everything an upload needs, gathered on the main thread.
fn prepare_upload(
    state: &mut AppState,
) -> Result<(Box<dyn ImageSharer>, Vec<u8>, String), ExportError> {
    let endpoint = state
        .preferences
        .string(prefs::UPLOAD_ENDPOINT)
        .unwrap_or_default();
    let token = state.preferences.string(prefs::UPLOAD_TOKEN);
    let sharer = HttpSharer::new(endpoint, token)?;
    let png = encode_png(state.editor.composited())?;
    Ok((Box::new(sharer), png, state.next_share_name()))
}

fn upload(state: &Rc<RefCell<AppState>>, ui: &UiComponents) {
    let prepared = prepare_upload(&mut state.borrow_mut());
    let (sharer, png, name) = match prepared {
        Ok(job) => job,
        Err(ExportError::NoEndpoint) => {
            update(state, ui, |s| {
                s.set_status("Set an upload endpoint first.");
            });
            dialogs::show_upload_settings(state, ui);
            return;
        }
        Err(e) => {
            error!("Failed to prepare upload: {}", e);
            update(state, ui, |s| s.set_status(format!("Upload failed: {}", e)));
            return;
        }
    };
    update(state, ui, |s| s.set_status(format!("Uploading {}...", name)));

    let state = state.clone();
    let ui = ui.clone();
    glib::spawn_future_local(async move {
        let result = gio::spawn_blocking(move || sharer.share(&name, png)).await;
        let clipboard = ClipboardManager::from_widget(&ui.window);
        update(&state, &ui, |s| match result {
            Ok(Ok(url)) => {
                clipboard.copy_text(&url);
                s.set_status(format!("Uploaded, link copied: {}", url));
            }
            Ok(Err(e)) => {
                error!("Upload failed: {}", e);
                s.set_status(format!("Upload failed: {}", e));
            }
            Err(_) => {
                error!("Upload task panicked");
                s.set_status("Upload failed.");
            }
        });
    });
}

/// Pointer positions flowing from the drag gesture to the state.
#[derive(Default)]
struct DragFeed {
    sender: Option<LatestSender<(f64, f64)>>,
    receiver: Option<LatestReceiver<(f64, f64)>>,
    timer: Option<glib::SourceId>,
}

/// Applies the newest queued position. Returns `false` once the drag has
/// ended and been released.
fn pump_drag(
    state: &Rc<RefCell<AppState>>,
    ui: &UiComponents,
    feed: &Rc<RefCell<DragFeed>>,
) -> bool {
    let drained = match feed.borrow_mut().receiver.as_mut() {
        Some(receiver) => receiver.drain(),
        None => return false,
    };

    match drained {
        Drained::Empty => true,
        Drained::Value((x, y)) => {
            let mut s = state.borrow_mut();
            if s.drag_to(x, y) {
                ui.refresh(&s);
            }
            true
        }
        Drained::Closed(last) => {
            feed.borrow_mut().receiver = None;
            let mut s = state.borrow_mut();
            if let Some((x, y)) = last {
                s.drag_to(x, y);
            }
            let outcome = s.release();
            ui.refresh(&s);
            drop(s);

            if let TapOutcome::AskText(center) = outcome {
                dialogs::show_text_dialog(state, ui, center);
            }
            false
        }
    }
}

pub fn connect_viewport_drag(state: &Rc<RefCell<AppState>>, ui: &UiComponents) {
    let drag = GestureDrag::new();
    drag.set_button(gdk::BUTTON_PRIMARY);
    let feed = Rc::new(RefCell::new(DragFeed::default()));

    drag.connect_drag_begin({
        let state = state.clone();
        let ui = ui.clone();
        let feed = feed.clone();
        move |_, x, y| {
            state.borrow_mut().press(x, y);
            let (sender, receiver) = latest();
            let timer = glib::timeout_add_local(DRAG_TICK, {
                let state = state.clone();
                let ui = ui.clone();
                let feed = feed.clone();
                move || {
                    if pump_drag(&state, &ui, &feed) {
                        glib::ControlFlow::Continue
                    } else {
                        feed.borrow_mut().timer = None;
                        glib::ControlFlow::Break
                    }
                }
            });
            let mut f = feed.borrow_mut();
            f.sender = Some(sender);
            f.receiver = Some(receiver);
            if let Some(stale) = f.timer.replace(timer) {
                stale.remove();
            }
        }
    });

    drag.connect_drag_update({
        let feed = feed.clone();
        move |gesture, offset_x, offset_y| {
            if let (Some((x, y)), Some(sender)) = (gesture.start_point(), &feed.borrow().sender) {
                sender.send((x + offset_x, y + offset_y));
            }
        }
    });

    drag.connect_drag_end({
        let state = state.clone();
        let ui = ui.clone();
        let feed = feed.clone();
        move |gesture, offset_x, offset_y| {
            let (sender, timer) = {
                let mut f = feed.borrow_mut();
                (f.sender.take(), f.timer.take())
            };
            if let (Some(sender), Some((x, y))) = (sender, gesture.start_point()) {
                sender.send((x + offset_x, y + offset_y));
            }
            if let Some(timer) = timer {
                timer.remove();
            }
            // The sender is gone, so this drains the last position and releases.
            pump_drag(&state, &ui, &feed);
        }
    });

    ui.drawing.drawing_area.add_controller(drag);
}

pub fn connect_viewport_zoom(state: &Rc<RefCell<AppState>>, ui: &UiComponents) {
    let cursor = Rc::new(Cell::new((0.0, 0.0)));

    let motion = EventControllerMotion::new();
    motion.connect_motion({
        let cursor = cursor.clone();
        move |_, x, y| cursor.set((x, y))
    });
    ui.drawing.drawing_area.add_controller(motion);

    // Whole notches only; touchpad pixel deltas are accumulated by GTK.
    let scroll = EventControllerScroll::new(
        gtk::EventControllerScrollFlags::VERTICAL | gtk::EventControllerScrollFlags::DISCRETE,
    );
    scroll.connect_scroll({
        let state = state.clone();
        let ui = ui.clone();
        move |_, _, dy| {
            if dy == 0.0 {
                return glib::Propagation::Proceed;
            }
            let mut s = state.borrow_mut();
            s.scroll(cursor.get(), -dy * WHEEL_STEP);
            ui.status_bar.zoom_entry.set_text(&s.zoom_text());
            ui.refresh(&s);
            glib::Propagation::Stop
        }
    });
    ui.drawing.drawing_area.add_controller(scroll);

    ui.status_bar.zoom_entry.connect_activate({
        let state = state.clone();
        let ui = ui.clone();
        move |entry| {
            let mut s = state.borrow_mut();
            if !s.set_zoom_text(&entry.text()) {
                debug!("Ignoring zoom {:?}", entry.text());
            }
            entry.set_text(&s.zoom_text());
            ui.refresh(&s);
        }
    });

    ui.status_bar.zoom_reset_btn.connect_clicked({
        let state = state.clone();
        let ui = ui.clone();
        move |_| {
            let mut s = state.borrow_mut();
            s.reset_zoom();
            ui.status_bar.zoom_entry.set_text(&s.zoom_text());
            ui.refresh(&s);
        }
    });
}

pub fn connect_minimap_handlers(state: &Rc<RefCell<AppState>>, ui: &UiComponents) {
    let drag = GestureDrag::new();
    drag.set_button(gdk::BUTTON_PRIMARY);

    drag.connect_drag_begin({
        let state = state.clone();
        let ui = ui.clone();
        move |_, x, y| update(&state, &ui, |s| s.minimap_click(x, y))
    });

    drag.connect_drag_update({
        let state = state.clone();
        let ui = ui.clone();
        move |gesture, offset_x, offset_y| {
            if let Some((x, y)) = gesture.start_point() {
                update(&state, &ui, |s| s.minimap_click(x + offset_x, y + offset_y));
            }
        }
    });

    ui.drawing.minimap_area.add_controller(drag);
}

pub fn connect_key_handler(state: &Rc<RefCell<AppState>>, ui: &UiComponents) {
    let keys = EventControllerKey::new();
    keys.connect_key_pressed({
        let state = state.clone();
        let ui = ui.clone();
        move |_, key, _, modifiers| {
            let action = state.borrow().shortcuts.get_action(key, modifiers);
            match action {
                Some(action) => {
                    run_action(&state, &ui, action);
                    glib::Propagation::Stop
                }
                None => glib::Propagation::Proceed,
            }
        }
    });
    ui.window.add_controller(keys);
}

pub fn connect_button_handlers(state: &Rc<RefCell<AppState>>, ui: &UiComponents) {
    let buttons = [
        (&ui.header.undo_btn, Action::Undo),
        (&ui.header.copy_btn, Action::Copy),
        (&ui.header.save_btn, Action::Save),
        (&ui.header.upload_btn, Action::Upload),
        (&ui.side_panel.crop_top_left_btn, Action::CropTopLeft),
        (&ui.side_panel.crop_bottom_right_btn, Action::CropBottomRight),
        (&ui.side_panel.circle_btn, Action::DrawCircle),
        (&ui.side_panel.arrow_btn, Action::DrawArrow),
        (&ui.side_panel.text_btn, Action::DrawText),
    ];
    for (button, action) in buttons {
        button.connect_clicked({
            let state = state.clone();
            let ui = ui.clone();
            move |_| run_action(&state, &ui, action)
        });
    }

    ui.side_panel.crop_reset_btn.connect_clicked({
        let state = state.clone();
        let ui = ui.clone();
        move |_| update(&state, &ui, AppState::crop_reset)
    });
}

pub fn connect_tool_settings(state: &Rc<RefCell<AppState>>, ui: &UiComponents) {
    ui.side_panel.thickness_entry.connect_changed({
        let state = state.clone();
        move |entry| {
            if !state.borrow_mut().set_thickness_text(&entry.text()) {
                debug!("Ignoring thickness {:?}", entry.text());
            }
        }
    });

    ui.side_panel.color_button.connect_rgba_notify({
        let state = state.clone();
        move |button| state.borrow_mut().set_color(from_gdk_rgba(&button.rgba()))
    });

    ui.side_panel.background_button.connect_rgba_notify({
        let state = state.clone();
        move |button| state.borrow_mut().set_background(from_gdk_rgba(&button.rgba()))
    });
}

pub fn connect_window_actions(state: &Rc<RefCell<AppState>>, ui: &UiComponents) {
    let upload_settings = gio::SimpleAction::new("upload-settings", None);
    upload_settings.connect_activate({
        let state = state.clone();
        let ui = ui.clone();
        move |_, _| dialogs::show_upload_settings(&state, &ui)
    });
    ui.window.add_action(&upload_settings);

    for (name, action) in [("shortcuts", Action::ShowShortcuts), ("quit", Action::Quit)] {
        let simple = gio::SimpleAction::new(name, None);
        simple.connect_activate({
            let state = state.clone();
            let ui = ui.clone();
            move |_, _| run_action(&state, &ui, action)
        });
        ui.window.add_action(&simple);
    }
}

pub fn connect_all_handlers(state: &Rc<RefCell<AppState>>, components: &UiComponents) {
    debug!("Initializing UI handlers");
    connect_viewport_drag(state, components);
    connect_viewport_zoom(state, components);
    connect_minimap_handlers(state, components);
    connect_key_handler(state, components);
    connect_button_handlers(state, components);
    connect_tool_settings(state, components);
    connect_window_actions(state, components);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::viewport::{Viewport, SCROLL_STEPS_PER_OCTAVE};

    #[test]
    fn test_one_notch_is_a_fifth_of_an_octave() {
        assert!((WHEEL_STEP / SCROLL_STEPS_PER_OCTAVE - 0.2).abs() < 1e-9);

        let mut vp = Viewport::new();
        vp.ensure_cache(100, 100);
        // Wheel up reports dy = -1.
        let dy = -1.0;
        vp.scroll((50.0, 50.0), -dy * WHEEL_STEP);
        assert!((vp.log2_zoom() - 0.2).abs() < 1e-9);
    }
}
