use thiserror::Error;

use crate::shared::annotated_frame::AnnotatedFrame;
use crate::shared::frame::Frame;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    #[error(
        "frame {index} has shape {width}x{height}x{channels}, expected {expected_width}x{expected_height}x3"
    )]
    ShapeMismatch {
        index: usize,
        width: u32,
        height: u32,
        channels: u8,
        expected_width: u32,
        expected_height: u32,
    },
    #[error("invalid detector configuration: {0}")]
    InvalidConfig(String),
}

/// Domain interface for motion detection.
///
/// Implementations keep a reference image across calls, hence `&mut self`.
/// The frame is taken by value and handed back inside the `AnnotatedFrame`
/// so no pixel data is shared with other stages. `Ok(None)` means the frame
/// was consumed without being scored (e.g. it seeded the reference).
pub trait MotionDetector: Send {
    fn process_frame(&mut self, frame: Frame) -> Result<Option<AnnotatedFrame>, DetectionError>;
}
