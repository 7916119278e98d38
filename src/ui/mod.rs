pub mod dialogs;
pub mod drawing;
pub mod handlers;
pub mod header;
pub mod shortcuts;
pub mod toolbar;

pub use handlers::{connect_all_handlers, UiComponents};

use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;
use gtk::Orientation;
use log::{error, info};
use std::cell::RefCell;
use std::rc::Rc;

use crate::app::{AppState, Preferences};
use crate::capture::capture_primary_monitor;
use crate::editor::TextFont;
use crate::view::minimap::MINIMAP_MIN_SIZE;

pub fn build_ui(app: &adw::Application) {
    let capture = match capture_primary_monitor() {
        Ok(capture) => capture,
        Err(e) => {
            error!("Cannot start without a capture: {}", e);
            app.quit();
            return;
        }
    };
    let monitor = &capture.monitor_info;
    info!(
        "Captured monitor {:?}: {}x{} at {},{} (scale {})",
        monitor.name, monitor.width, monitor.height, monitor.x, monitor.y, monitor.scale_factor
    );

    let font = match TextFont::load() {
        Ok(font) => font,
        Err(e) => {
            error!("Cannot start without a font: {}", e);
            app.quit();
            return;
        }
    };

    let state = Rc::new(RefCell::new(AppState::new(
        capture.image,
        capture.captured_at,
        font,
        Preferences::load_default(),
    )));

    let header = header::create_header_bar();
    let drawing = drawing::create_drawing_area(&state);
    let (side_panel, status_bar) = {
        let s = state.borrow();
        (
            toolbar::create_side_panel(&s, &drawing.minimap_area),
            toolbar::create_status_bar(&s),
        )
    };

    let paned = gtk::Paned::builder()
        .orientation(Orientation::Horizontal)
        .start_child(&drawing.drawing_area)
        .end_child(&side_panel.panel_box)
        .resize_start_child(true)
        .resize_end_child(false)
        .shrink_end_child(false)
        .vexpand(true)
        .build();

    let content = gtk::Box::builder()
        .orientation(Orientation::Vertical)
        .build();
    content.append(&header.header_bar);
    content.append(&paned);
    content.append(&gtk::Separator::new(Orientation::Horizontal));
    content.append(&status_bar.status_bar);

    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Shotmark")
        .content(&content)
        .default_width(1100)
        .default_height(700)
        .build();
    window.set_size_request(MINIMAP_MIN_SIZE * 3, MINIMAP_MIN_SIZE * 2);

    let components = UiComponents {
        window: window.clone(),
        header,
        drawing,
        side_panel,
        status_bar,
    };

    connect_all_handlers(&state, &components);

    window.present();
}
