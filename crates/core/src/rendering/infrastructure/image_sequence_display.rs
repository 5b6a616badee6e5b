use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::rendering::domain::frame_display::{DisplayError, FrameDisplay};
use crate::shared::frame::Frame;

use super::cancel_keys::CancelKeys;

/// Writes each rendered frame as a numbered PNG into a directory.
///
/// File names use a running counter (`frame_000000.png`, ...), so the
/// sequence stays gap-free even though the bootstrap frame is never shown.
pub struct ImageSequenceDisplay {
    dir: PathBuf,
    keys: CancelKeys,
    written: usize,
}

impl ImageSequenceDisplay {
    pub fn new(dir: &Path, keys: CancelKeys) -> Result<Self, DisplayError> {
        fs::create_dir_all(dir).map_err(|source| DisplayError::OutputDir {
            path: dir.to_path_buf(),
            source,
        })?;
        log::info!("Writing rendered frames to {}", dir.display());
        Ok(Self {
            dir: dir.to_path_buf(),
            keys,
            written: 0,
        })
    }

    pub fn written(&self) -> usize {
        self.written
    }

    fn next_path(&self) -> PathBuf {
        self.dir.join(format!("frame_{:06}.png", self.written))
    }
}

impl FrameDisplay for ImageSequenceDisplay {
    fn show(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        if frame.channels() != 3 || !frame.is_well_formed() {
            return Err(DisplayError::MalformedFrame(frame.index()));
        }
        let path = self.next_path();
        let img = frame
            .clone()
            .into_rgb_image()
            .ok_or(DisplayError::MalformedFrame(frame.index()))?;
        img.save(&path)
            .map_err(|source| DisplayError::Write { path, source })?;
        self.written += 1;
        Ok(())
    }

    fn wait_for_cancel(&mut self, timeout: Duration) -> bool {
        self.keys.wait(timeout)
    }

    fn close(&mut self) {
        log::debug!(
            "Image sequence display closed: {} frames in {}",
            self.written,
            self.dir.display()
        );
    }
}
