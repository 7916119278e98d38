use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;
use gtk::Orientation;
use log::{error, info};
use std::cell::RefCell;
use std::rc::Rc;

use crate::app::preferences as prefs;
use crate::app::AppState;
use crate::editor::Point;
use crate::ui::handlers::UiComponents;
use crate::ui::toolbar::{create_color_button, from_gdk_rgba};

struct TextDialogComponents {
    dialog: gtk::Window,
    text_view: gtk::TextView,
    size_entry: gtk::Entry,
    background_button: gtk::ColorDialogButton,
    confirm_btn: gtk::Button,
    cancel_btn: gtk::Button,
}

fn create_text_dialog(state: &AppState, parent: &impl IsA<gtk::Window>) -> TextDialogComponents {
    let tools = &state.editor.tool_state;

    let text_view = gtk::TextView::builder()
        .wrap_mode(gtk::WrapMode::WordChar)
        .accepts_tab(false)
        .top_margin(6)
        .bottom_margin(6)
        .left_margin(6)
        .right_margin(6)
        .build();
    let scrolled_window = gtk::ScrolledWindow::builder()
        .child(&text_view)
        .min_content_height(120)
        .vexpand(true)
        .build();
    scrolled_window.add_css_class("card");

    let size_entry = gtk::Entry::builder()
        .text(tools.font_size.to_string())
        .width_chars(5)
        .input_purpose(gtk::InputPurpose::Number)
        .build();
    let background_button = create_color_button(tools.background, "Text Background");

    let options_row = gtk::Box::builder()
        .orientation(Orientation::Horizontal)
        .spacing(6)
        .build();
    options_row.append(&gtk::Label::new(Some("Font size")));
    options_row.append(&size_entry);
    options_row.append(&gtk::Label::new(Some("Background")));
    options_row.append(&background_button);

    let cancel_btn = gtk::Button::builder().label("Cancel").build();
    let confirm_btn = gtk::Button::builder().label("Add Text").build();
    confirm_btn.add_css_class("suggested-action");

    let buttons_row = gtk::Box::builder()
        .orientation(Orientation::Horizontal)
        .spacing(6)
        .halign(gtk::Align::End)
        .build();
    buttons_row.append(&cancel_btn);
    buttons_row.append(&confirm_btn);

    let vbox = gtk::Box::builder()
        .orientation(Orientation::Vertical)
        .spacing(12)
        .margin_top(12)
        .margin_bottom(12)
        .margin_start(12)
        .margin_end(12)
        .build();
    vbox.append(&gtk::Label::new(Some("Text to draw:")));
    vbox.append(&scrolled_window);
    vbox.append(&options_row);
    vbox.append(&buttons_row);

    let dialog = gtk::Window::builder()
        .title("Add Text")
        .modal(true)
        .transient_for(parent)
        .default_width(360)
        .default_height(280)
        .child(&vbox)
        .build();

    TextDialogComponents {
        dialog,
        text_view,
        size_entry,
        background_button,
        confirm_btn,
        cancel_btn,
    }
}

/// Asks for text to be centered at `center` (crop-relative source pixels).
pub fn show_text_dialog(state: &Rc<RefCell<AppState>>, ui: &UiComponents, center: Point) {
    let components = create_text_dialog(&state.borrow(), &ui.window);

    components.cancel_btn.connect_clicked({
        let dialog = components.dialog.clone();
        move |_| dialog.close()
    });

    components.confirm_btn.connect_clicked({
        let state = state.clone();
        let ui = ui.clone();
        let dialog = components.dialog.clone();
        let text_view = components.text_view.clone();
        let size_entry = components.size_entry.clone();
        let background_button = components.background_button.clone();
        move |_| {
            let buffer = text_view.buffer();
            let text = buffer
                .text(&buffer.start_iter(), &buffer.end_iter(), false)
                .to_string();
            let size_text = size_entry.text().to_string();
            let background = background_button.rgba();

            let mut s = state.borrow_mut();
            s.set_background(from_gdk_rgba(&background));
            if let Err(e) = s.add_text(&text, center, &size_text) {
                error!("Failed to draw text: {}", e);
                s.set_status(format!("Failed to draw text: {}", e));
            }
            ui.refresh(&s);
            drop(s);

            // Keeps the side panel in step; its handler stores the same color.
            ui.side_panel.background_button.set_rgba(&background);
            dialog.close();
        }
    });

    components.dialog.present();
    components.text_view.grab_focus();
}

/// Endpoint and token used by uploads.
pub fn show_upload_settings(state: &Rc<RefCell<AppState>>, ui: &UiComponents) {
    let window = adw::PreferencesWindow::builder()
        .transient_for(&ui.window)
        .modal(true)
        .title("Upload Settings")
        .default_width(480)
        .default_height(320)
        .search_enabled(false)
        .build();

    let (endpoint, token) = {
        let s = state.borrow();
        (
            s.preferences
                .string(prefs::UPLOAD_ENDPOINT)
                .unwrap_or_default()
                .to_string(),
            s.preferences
                .string(prefs::UPLOAD_TOKEN)
                .unwrap_or_default()
                .to_string(),
        )
    };

    let endpoint_row = adw::EntryRow::new();
    endpoint_row.set_title("Endpoint URL");
    endpoint_row.set_text(&endpoint);
    endpoint_row.set_show_apply_button(true);

    let token_row = adw::PasswordEntryRow::new();
    token_row.set_title("Bearer Token (optional)");
    token_row.set_text(&token);
    token_row.set_show_apply_button(true);

    endpoint_row.connect_apply({
        let state = state.clone();
        let ui = ui.clone();
        move |row| {
            let mut s = state.borrow_mut();
            s.preferences
                .set_string(prefs::UPLOAD_ENDPOINT, row.text().trim());
            info!("Upload endpoint set to {}", row.text());
            s.set_status("Upload endpoint saved.");
            ui.refresh(&s);
        }
    });

    token_row.connect_apply({
        let state = state.clone();
        let ui = ui.clone();
        move |row| {
            let mut s = state.borrow_mut();
            s.preferences.set_string(prefs::UPLOAD_TOKEN, row.text().trim());
            s.set_status("Upload token saved.");
            ui.refresh(&s);
        }
    });

    let group = adw::PreferencesGroup::builder()
        .title("Upload")
        .description("Images are sent with an HTTP PUT, named after the capture time")
        .build();
    group.add(&endpoint_row);
    group.add(&token_row);

    let page = adw::PreferencesPage::new();
    page.add(&group);
    window.add(&page);
    window.present();
}
