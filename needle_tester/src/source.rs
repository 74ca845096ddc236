use anyhow::{Context, Result};
use chrono::Local;
use needle_motion::{Frame, FrameSource, TimestampedFrame};
use std::fs;
use std::path::{Path, PathBuf};
use std::vec::IntoIter;

/// Replays a list of still images as a frame stream, stamped with the time
/// each one is decoded.
pub struct ImageFileSource {
    paths: IntoIter<PathBuf>,
    current: Option<PathBuf>,
}

impl ImageFileSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths: paths.into_iter(),
            current: None,
        }
    }

    /// Every regular file in `dir`, in file-name order.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
            let path = entry?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(Self::new(paths))
    }

    /// The file the most recent frame was read from.
    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    fn decode(path: &Path) -> Result<TimestampedFrame> {
        let image = image::open(path).with_context(|| format!("decoding {}", path.display()))?;
        let frame = Frame::try_from(&image).with_context(|| format!("converting {}", path.display()))?;
        Ok(TimestampedFrame::new(frame, Local::now()))
    }
}

impl FrameSource for ImageFileSource {
    type Error = anyhow::Error;

    fn next_frame(&mut self) -> Option<Result<TimestampedFrame, Self::Error>> {
        let path = self.paths.next()?;
        let frame = Self::decode(&path);
        self.current = Some(path);
        Some(frame)
    }
}
