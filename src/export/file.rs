use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use image::{ImageFormat, RgbaImage};
use log::info;

use crate::error::ExportError;

/// File name offered when saving, based on when the capture was taken.
pub fn default_name(captured_at: &DateTime<Local>) -> String {
    format!("Screenshot {}.png", captured_at.format("%Y-%m-%d %H-%M-%S"))
}

/// Appends `.png` unless the path already ends with it.
pub fn with_png_extension(path: &Path) -> PathBuf {
    let has_png = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false);
    if has_png {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".png");
        PathBuf::from(name)
    }
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ExportError::EmptyImage);
    }
    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}

/// Writes `image` as a PNG at `path`, returning where it was written.
pub fn save_png(path: &Path, image: &RgbaImage) -> Result<PathBuf, ExportError> {
    let path = with_png_extension(path);
    let bytes = encode_png(image)?;
    std::fs::write(&path, bytes).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    info!("Image saved to {:?}", path);
    Ok(path)
}
