//! OCR module for Lil Snippy
//!
//! Turns a captured image into text lines. The engine itself is `ocrs`;
//! everything else talks to it through [`TextRecognizer`].

mod engine;

pub use engine::{OcrsRecognizer, DETECTION_MODEL, RECOGNITION_MODEL};

use image::RgbaImage;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR model not found: {0}")]
    ModelMissing(PathBuf),

    #[error("Failed to load OCR model {path}: {message}")]
    ModelLoad { path: PathBuf, message: String },

    #[error("Invalid OCR input: {0}")]
    Input(String),

    #[error("OCR engine error: {0}")]
    Engine(#[from] anyhow::Error),
}

pub type OcrResult<T> = Result<T, OcrError>;

/// Maps pixels to text lines, in reading order as reported by the engine
pub trait TextRecognizer: Send {
    fn recognize(&self, image: &RgbaImage) -> OcrResult<Vec<String>>;
}

/// Join recognized lines for display, dropping blank ones
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(|line| line.as_ref().trim_end())
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
