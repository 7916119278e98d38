use gtk4 as gtk;

use gtk::gdk_pixbuf::{Colorspace, Pixbuf};
use gtk::{glib, DrawingArea};
use gtk4::prelude::*;
use image::RgbaImage;
use std::cell::RefCell;
use std::rc::Rc;

use crate::app::AppState;
use crate::view::minimap::MINIMAP_MIN_SIZE;

#[derive(Clone)]
pub struct DrawingComponents {
    pub drawing_area: DrawingArea,
    pub minimap_area: DrawingArea,
}

pub fn create_drawing_area(state: &Rc<RefCell<AppState>>) -> DrawingComponents {
    let drawing_area = DrawingArea::builder().hexpand(true).vexpand(true).build();
    drawing_area.set_draw_func({
        let state = state.clone();
        move |_, cr, width, height| {
            draw_viewport(&state, cr, width, height);
        }
    });

    let minimap_area = DrawingArea::builder()
        .content_width(MINIMAP_MIN_SIZE)
        .content_height(MINIMAP_MIN_SIZE)
        .build();
    minimap_area.set_draw_func({
        let state = state.clone();
        move |_, cr, width, height| {
            draw_minimap(&state, cr, width, height);
        }
    });

    DrawingComponents {
        drawing_area,
        minimap_area,
    }
}

/// Copies `image` into a pixbuf cairo can paint. Empty images give `None`.
fn image_to_pixbuf(image: &RgbaImage) -> Option<Pixbuf> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return None;
    }
    let bytes = glib::Bytes::from(image.as_raw().as_slice());
    Some(Pixbuf::from_bytes(
        &bytes,
        Colorspace::Rgb,
        true,
        8,
        width as i32,
        height as i32,
        width as i32 * 4,
    ))
}

fn paint_image(cr: &gtk::cairo::Context, image: &RgbaImage) {
    if let Some(pixbuf) = image_to_pixbuf(image) {
        cr.set_source_pixbuf(&pixbuf, 0.0, 0.0);
        let _ = cr.paint();
    }
}

fn draw_viewport(state: &Rc<RefCell<AppState>>, cr: &gtk::cairo::Context, width: i32, height: i32) {
    let mut state = state.borrow_mut();
    let image = state.render_viewport(width.max(0) as u32, height.max(0) as u32);
    paint_image(cr, image);
}

fn draw_minimap(state: &Rc<RefCell<AppState>>, cr: &gtk::cairo::Context, width: i32, height: i32) {
    let mut state = state.borrow_mut();
    let image = state.render_minimap(width.max(0) as u32, height.max(0) as u32);
    paint_image(cr, image);

    let (x, y, w, h) = state.minimap_overlay();
    cr.set_source_rgba(1.0, 0.2, 0.2, 0.9);
    cr.set_line_width(1.0);
    cr.rectangle(x + 0.5, y + 0.5, w, h);
    let _ = cr.stroke();
}
