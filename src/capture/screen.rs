use chrono::{DateTime, Local};
use image::RgbaImage;
use log::{debug, warn};
use xcap::Monitor;

use crate::error::CaptureError;

/// Information about the captured monitor
#[derive(Debug, Clone)]
pub struct MonitorInfo {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub scale_factor: f32,
}

impl MonitorInfo {
    fn from_xcap(monitor: &Monitor) -> Self {
        Self {
            name: monitor.name().unwrap_or_default(),
            x: monitor.x().unwrap_or(0),
            y: monitor.y().unwrap_or(0),
            width: monitor.width().unwrap_or(0),
            height: monitor.height().unwrap_or(0),
            scale_factor: monitor.scale_factor().unwrap_or(1.0),
        }
    }
}

/// A fresh capture and where it came from
pub struct CaptureResult {
    pub image: RgbaImage,
    pub monitor_info: MonitorInfo,
    pub captured_at: DateTime<Local>,
}

/// Capture the primary monitor, falling back to the first one when none
/// reports itself as primary.
pub fn capture_primary_monitor() -> Result<CaptureResult, CaptureError> {
    let monitors =
        Monitor::all().map_err(|e| CaptureError::MonitorEnumeration(e.to_string()))?;
    if monitors.len() > 1 {
        warn!(
            "{} monitors found, only the primary one is captured",
            monitors.len()
        );
    }

    let primary = monitors
        .iter()
        .position(|m| m.is_primary().unwrap_or(false))
        .unwrap_or(0);
    let monitor = monitors.get(primary).ok_or(CaptureError::NoMonitor)?;
    let monitor_info = MonitorInfo::from_xcap(monitor);

    let image = monitor
        .capture_image()
        .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;
    debug!(
        "Captured {} ({}x{} at {},{})",
        monitor_info.name, image.width(), image.height(), monitor_info.x, monitor_info.y
    );

    Ok(CaptureResult {
        image,
        monitor_info,
        captured_at: Local::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_primary_monitor() {
        // This test may fail in CI environments without display
        if let Ok(result) = capture_primary_monitor() {
            assert!(result.image.width() > 0);
            assert!(result.image.height() > 0);
        }
    }
}
