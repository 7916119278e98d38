use gtk4 as gtk;
use libadwaita as adw;

use gtk::gio;
use gtk4::prelude::*;

use crate::app::Action;

#[derive(Clone)]
pub struct HeaderComponents {
    pub header_bar: adw::HeaderBar,
    pub undo_btn: gtk::Button,
    pub copy_btn: gtk::Button,
    pub save_btn: gtk::Button,
    pub upload_btn: gtk::Button,
}

fn action_button(icon_name: &str, action: Action) -> gtk::Button {
    gtk::Button::builder()
        .icon_name(icon_name)
        .tooltip_text(action.label())
        .build()
}

/// Window menu. Items point at `win.*` actions registered by the handlers.
fn create_menu() -> gio::Menu {
    let menu = gio::Menu::new();
    menu.append(Some("Upload Settings"), Some("win.upload-settings"));
    menu.append(Some(Action::ShowShortcuts.label()), Some("win.shortcuts"));
    menu.append(Some(Action::Quit.label()), Some("win.quit"));
    menu
}

pub fn create_header_bar() -> HeaderComponents {
    let undo_btn = action_button("edit-undo-symbolic", Action::Undo);
    let copy_btn = action_button("edit-copy-symbolic", Action::Copy);
    let upload_btn = action_button("send-to-symbolic", Action::Upload);

    let save_btn = action_button("document-save-symbolic", Action::Save);
    save_btn.add_css_class("suggested-action");

    let menu_btn = gtk::MenuButton::builder()
        .icon_name("open-menu-symbolic")
        .menu_model(&create_menu())
        .build();

    let header_bar = adw::HeaderBar::new();
    header_bar.pack_start(&undo_btn);
    header_bar.pack_end(&menu_btn);
    header_bar.pack_end(&save_btn);
    header_bar.pack_end(&upload_btn);
    header_bar.pack_end(&copy_btn);

    HeaderComponents {
        header_bar,
        undo_btn,
        copy_btn,
        save_btn,
        upload_btn,
    }
}
