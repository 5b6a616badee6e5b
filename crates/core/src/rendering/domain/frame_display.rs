use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("failed to prepare output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write frame to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("frame {0} cannot be displayed: pixel buffer does not match its dimensions")]
    MalformedFrame(usize),
}

/// Where rendered frames end up, plus the user's cancel input.
pub trait FrameDisplay: Send {
    fn show(&mut self, frame: &Frame) -> Result<(), DisplayError>;

    /// Blocks for at most `timeout` waiting for a cancel request.
    /// Returns true if the user asked to stop.
    fn wait_for_cancel(&mut self, timeout: Duration) -> bool;

    /// Releases display resources. Safe to call more than once.
    fn close(&mut self);
}
