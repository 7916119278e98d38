mod app;
mod capture;
mod coalesce;
mod editor;
mod error;
mod export;
mod ui;
mod view;

use gtk4::prelude::*;
use libadwaita as adw;

const APP_ID: &str = "org.example.Shotmark";

fn main() -> gtk4::glib::ExitCode {
    env_logger::init();

    let app = adw::Application::builder().application_id(APP_ID).build();
    app.connect_activate(ui::build_ui);
    app.run()
}
