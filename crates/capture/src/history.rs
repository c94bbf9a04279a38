//! Capture history: timestamp-named PNG files

use crate::{CaptureError, CaptureResult};
use chrono::{DateTime, Local, TimeZone};
use image::{ImageFormat, RgbaImage};
use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Highest numeric suffix tried before giving up on a file name
const MAX_SUFFIX: u32 = 999;

/// Directory of persisted snips
#[derive(Debug, Clone)]
pub struct CaptureHistory {
    dir: PathBuf,
}

impl CaptureHistory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File stem for a capture taken at `at`, microsecond precision
    pub fn file_stem<Tz: TimeZone>(at: &DateTime<Tz>) -> String
    where
        Tz::Offset: Display,
    {
        at.format("snip-%Y%m%d-%H%M%S-%6f").to_string()
    }

    /// Save as PNG under the current local time
    pub fn save(&self, image: &RgbaImage) -> CaptureResult<PathBuf> {
        self.save_at(image, &Local::now())
    }

    /// Save as PNG under the name derived from `at`.
    ///
    /// Existing files are never overwritten: a taken name gets a `-N` suffix.
    pub fn save_at<Tz: TimeZone>(&self, image: &RgbaImage, at: &DateTime<Tz>) -> CaptureResult<PathBuf>
    where
        Tz::Offset: Display,
    {
        fs::create_dir_all(&self.dir)?;

        let stem = Self::file_stem(at);
        let (path, file) = self.create_unique(&stem)?;

        let mut writer = BufWriter::new(file);
        image.write_to(&mut writer, ImageFormat::Png)?;
        writer.flush()?;

        debug!(path = %path.display(), width = image.width(), height = image.height(), "Snip saved");
        Ok(path)
    }

    fn create_unique(&self, stem: &str) -> CaptureResult<(PathBuf, File)> {
        for attempt in 0..=MAX_SUFFIX {
            let name = if attempt == 0 {
                format!("{stem}.png")
            } else {
                format!("{stem}-{attempt}.png")
            };
            let path = self.dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    if attempt > 0 {
                        warn!(stem, attempt, "Snip file name already taken, saved with suffix");
                    }
                    return Ok((path, file));
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err.into()),
            }
        }

        Err(CaptureError::NameCollision(stem.to_string()))
    }

    /// Number of PNG files in the history; a missing directory counts as empty
    pub fn count(&self) -> CaptureResult<usize> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err.into()),
        };

        let mut count = 0;
        for entry in entries {
            let entry = entry?;
            if entry.path().extension().map_or(false, |e| e == "png") {
                count += 1;
            }
        }
        Ok(count)
    }
}
