use adw::prelude::*;
use gtk4 as gtk;
use libadwaita as adw;
use std::cell::RefCell;
use std::rc::Rc;

use crate::app::config::Action;
use crate::app::AppState;

const OUTPUT: [Action; 4] = [Action::Copy, Action::Save, Action::Upload, Action::Undo];
const OPERATIONS: [Action; 6] = [
    Action::CropTopLeft,
    Action::CropBottomRight,
    Action::DrawCircle,
    Action::DrawArrow,
    Action::DrawText,
    Action::Cancel,
];
const APPLICATION: [Action; 2] = [Action::ShowShortcuts, Action::Quit];

pub fn show_shortcuts_dialog(state: &Rc<RefCell<AppState>>, parent: &impl IsA<gtk::Window>) {
    let window = adw::PreferencesWindow::builder()
        .transient_for(parent)
        .modal(true)
        .title("Keyboard Shortcuts")
        .default_width(500)
        .default_height(600)
        .search_enabled(false)
        .build();

    let page = adw::PreferencesPage::new();
    window.add(&page);

    let s = state.borrow();
    for (title, actions) in [
        ("Output", &OUTPUT[..]),
        ("Operations", &OPERATIONS[..]),
        ("Application", &APPLICATION[..]),
    ] {
        let group = adw::PreferencesGroup::builder().title(title).build();
        for action in actions {
            add_action_row(&group, *action, &s.shortcuts.get_shortcut_label(*action));
        }
        page.add(&group);
    }
    drop(s);

    window.present();
}

fn add_action_row(group: &adw::PreferencesGroup, action: Action, accelerator: &str) {
    let row = adw::ActionRow::builder().title(action.label()).build();

    if accelerator.is_empty() {
        let label = gtk::Label::new(Some("Disabled"));
        label.add_css_class("dim-label");
        row.add_suffix(&label);
    } else {
        let shortcut = gtk::ShortcutLabel::builder()
            .accelerator(accelerator)
            .valign(gtk::Align::Center)
            .build();
        row.add_suffix(&shortcut);
    }

    group.add(&row);
}
