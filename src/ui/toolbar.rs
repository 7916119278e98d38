use gtk4 as gtk;

use gtk::{gdk, Align, Orientation};
use gtk4::prelude::*;
use image::Rgba;

use crate::app::AppState;
use crate::editor::Operation;

/// Controls in the panel beside the viewport.
#[derive(Clone)]
pub struct SidePanelComponents {
    pub panel_box: gtk::Box,
    pub crop_top_left_btn: gtk::Button,
    pub crop_bottom_right_btn: gtk::Button,
    pub crop_reset_btn: gtk::Button,
    pub circle_btn: gtk::Button,
    pub arrow_btn: gtk::Button,
    pub text_btn: gtk::Button,
    pub thickness_entry: gtk::Entry,
    pub color_button: gtk::ColorDialogButton,
    pub background_button: gtk::ColorDialogButton,
}

#[derive(Clone)]
pub struct StatusBarComponents {
    pub status_bar: gtk::Box,
    pub mode_icon: gtk::Image,
    pub status_label: gtk::Label,
    pub zoom_entry: gtk::Entry,
    pub zoom_reset_btn: gtk::Button,
}

pub fn to_gdk_rgba(color: Rgba<u8>) -> gdk::RGBA {
    let [r, g, b, a] = color.0;
    gdk::RGBA::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        a as f32 / 255.0,
    )
}

pub fn from_gdk_rgba(color: &gdk::RGBA) -> Rgba<u8> {
    let channel = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba([
        channel(color.red()),
        channel(color.green()),
        channel(color.blue()),
        channel(color.alpha()),
    ])
}

fn operation_button(operation: Operation) -> gtk::Button {
    let button = gtk::Button::builder()
        .icon_name(operation.icon_name())
        .tooltip_text(operation.tooltip())
        .build();
    button.add_css_class("flat");
    button
}

fn section_label(text: &str) -> gtk::Label {
    let label = gtk::Label::builder().label(text).halign(Align::Start).build();
    label.add_css_class("heading");
    label
}

fn button_row(buttons: &[&gtk::Button]) -> gtk::Box {
    let row = gtk::Box::builder()
        .orientation(Orientation::Horizontal)
        .spacing(6)
        .homogeneous(true)
        .build();
    row.add_css_class("linked");
    for button in buttons {
        row.append(*button);
    }
    row
}

pub fn create_color_button(color: Rgba<u8>, tooltip: &str) -> gtk::ColorDialogButton {
    gtk::ColorDialogButton::builder()
        .dialog(&gtk::ColorDialog::builder().with_alpha(true).build())
        .rgba(&to_gdk_rgba(color))
        .tooltip_text(tooltip)
        .build()
}

pub fn create_side_panel(state: &AppState, minimap_area: &gtk::DrawingArea) -> SidePanelComponents {
    let tools = &state.editor.tool_state;

    let crop_top_left_btn = operation_button(Operation::CropTopLeft);
    let crop_bottom_right_btn = operation_button(Operation::CropBottomRight);
    let crop_reset_btn = gtk::Button::builder()
        .icon_name("view-restore-symbolic")
        .tooltip_text("Reset Crop")
        .build();
    crop_reset_btn.add_css_class("flat");

    let circle_btn = operation_button(Operation::DrawCircle);
    let arrow_btn = operation_button(Operation::DrawArrow);
    let text_btn = operation_button(Operation::DrawText);

    let thickness_entry = gtk::Entry::builder()
        .text(tools.thickness.to_string())
        .width_chars(4)
        .input_purpose(gtk::InputPurpose::Number)
        .tooltip_text("Line thickness in pixels")
        .build();

    let color_button = create_color_button(tools.color, "Drawing Color");
    let background_button = create_color_button(tools.background, "Text Background");

    let thickness_row = gtk::Box::builder()
        .orientation(Orientation::Horizontal)
        .spacing(6)
        .build();
    thickness_row.append(&gtk::Label::new(Some("Thickness")));
    thickness_row.append(&thickness_entry);

    let colors_row = gtk::Box::builder()
        .orientation(Orientation::Horizontal)
        .spacing(6)
        .build();
    colors_row.append(&color_button);
    colors_row.append(&background_button);

    let minimap_frame = gtk::Frame::builder().child(minimap_area).build();

    let panel_box = gtk::Box::builder()
        .orientation(Orientation::Vertical)
        .spacing(8)
        .margin_top(12)
        .margin_bottom(12)
        .margin_start(12)
        .margin_end(12)
        .build();
    panel_box.append(&minimap_frame);
    panel_box.append(&section_label("Crop"));
    panel_box.append(&button_row(&[
        &crop_top_left_btn,
        &crop_bottom_right_btn,
        &crop_reset_btn,
    ]));
    panel_box.append(&section_label("Draw"));
    panel_box.append(&button_row(&[&circle_btn, &arrow_btn, &text_btn]));
    panel_box.append(&thickness_row);
    panel_box.append(&colors_row);

    SidePanelComponents {
        panel_box,
        crop_top_left_btn,
        crop_bottom_right_btn,
        crop_reset_btn,
        circle_btn,
        arrow_btn,
        text_btn,
        thickness_entry,
        color_button,
        background_button,
    }
}

pub fn create_status_bar(state: &AppState) -> StatusBarComponents {
    let operation = state.editor.current_operation();
    let mode_icon = gtk::Image::builder()
        .icon_name(operation.icon_name())
        .tooltip_text(operation.tooltip())
        .build();

    let status_label = gtk::Label::builder()
        .label(&state.status)
        .hexpand(true)
        .xalign(0.0)
        .ellipsize(gtk::pango::EllipsizeMode::End)
        .build();

    let zoom_entry = gtk::Entry::builder()
        .text(state.zoom_text())
        .width_chars(7)
        .tooltip_text("Zoom level (log2), press Enter to apply")
        .build();

    let zoom_reset_btn = gtk::Button::builder()
        .icon_name("zoom-original-symbolic")
        .tooltip_text("Reset zoom")
        .build();
    zoom_reset_btn.add_css_class("flat");

    let status_bar = gtk::Box::builder()
        .orientation(Orientation::Horizontal)
        .spacing(8)
        .margin_top(4)
        .margin_bottom(4)
        .margin_start(8)
        .margin_end(8)
        .build();
    status_bar.append(&mode_icon);
    status_bar.append(&status_label);
    status_bar.append(&gtk::Label::new(Some("Zoom")));
    status_bar.append(&zoom_entry);
    status_bar.append(&zoom_reset_btn);

    StatusBarComponents {
        status_bar,
        mode_icon,
        status_label,
        zoom_entry,
        zoom_reset_btn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_conversion_keeps_channels() {
        for color in [Rgba([255, 0, 0, 255]), Rgba([12, 200, 99, 0]), Rgba([1, 2, 3, 128])] {
            assert_eq!(from_gdk_rgba(&to_gdk_rgba(color)), color);
        }
    }
}
