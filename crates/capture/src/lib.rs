//! Screen capture module for Lil Snippy
//!
//! Grabs a screen region as an RGBA image and persists it to the capture
//! history directory.

pub mod history;
pub mod screen;

pub use history::CaptureHistory;
pub use screen::{crop_region, XcapScreen};

use image::RgbaImage;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Capture region is empty ({0:?})")]
    EmptyRegion(Rect),

    #[error("Capture region {0:?} lies outside the screen")]
    OutOfBounds(Rect),

    #[error("No monitor available")]
    NoMonitor,

    #[error("Screen capture error: {0}")]
    Screen(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Could not find a free file name for {0}")]
    NameCollision(String),
}

impl From<xcap::XCapError> for CaptureError {
    fn from(err: xcap::XCapError) -> Self {
        CaptureError::Screen(err.to_string())
    }
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Rectangle in physical screen pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width as i32 / 2, self.y + self.height as i32 / 2)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right() && self.right() > other.x &&
        self.y < other.bottom() && self.bottom() > other.y
    }

    /// Overlapping part of two rectangles, `None` when they do not overlap
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Some(Rect::new(x, y, (right - x) as u32, (bottom - y) as u32))
    }
}

/// Source of screen pixels.
///
/// `capture` returns an image whose size equals `rect` whenever `rect` lies
/// fully on one screen; regions hanging off the screen are clipped.
pub trait ScreenSource: Send {
    fn capture(&self, rect: Rect) -> CaptureResult<RgbaImage>;
}

/// A captured region together with its file in the capture history
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub image: RgbaImage,
    pub path: PathBuf,
    pub region: Rect,
}

impl CapturedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}
