//! Region capture through xcap

use crate::{CaptureError, CaptureResult, Rect, ScreenSource};
use image::RgbaImage;
use tracing::debug;
use xcap::Monitor;

/// Captures from the monitor that contains the centre of the requested region
#[derive(Debug, Default, Clone, Copy)]
pub struct XcapScreen;

impl XcapScreen {
    pub fn new() -> Self {
        Self
    }

    fn monitor_for(rect: &Rect) -> CaptureResult<Monitor> {
        let (cx, cy) = rect.center();
        match Monitor::from_point(cx, cy) {
            Ok(monitor) => Ok(monitor),
            Err(err) => {
                debug!(error = %err, cx, cy, "No monitor at region centre, using the first one");
                Monitor::all()?
                    .into_iter()
                    .next()
                    .ok_or(CaptureError::NoMonitor)
            }
        }
    }
}

impl ScreenSource for XcapScreen {
    fn capture(&self, rect: Rect) -> CaptureResult<RgbaImage> {
        if rect.is_empty() {
            return Err(CaptureError::EmptyRegion(rect));
        }

        let monitor = Self::monitor_for(&rect)?;
        let origin = (monitor.x()?, monitor.y()?);
        let frame = monitor.capture_image()?;
        debug!(
            monitor_x = origin.0,
            monitor_y = origin.1,
            width = frame.width(),
            height = frame.height(),
            "Monitor captured"
        );

        crop_region(&frame, origin, rect)
    }
}

/// Cut `rect` (screen coordinates) out of a frame whose top-left pixel sits
/// at `origin` on screen. The region is clipped to the frame.
pub fn crop_region(frame: &RgbaImage, origin: (i32, i32), rect: Rect) -> CaptureResult<RgbaImage> {
    if rect.is_empty() {
        return Err(CaptureError::EmptyRegion(rect));
    }

    let bounds = Rect::new(origin.0, origin.1, frame.width(), frame.height());
    let clipped = rect
        .intersection(&bounds)
        .ok_or(CaptureError::OutOfBounds(rect))?;

    let local_x = (clipped.x - bounds.x) as u32;
    let local_y = (clipped.y - bounds.y) as u32;

    Ok(image::imageops::crop_imm(frame, local_x, local_y, clipped.width, clipped.height).to_image())
}
