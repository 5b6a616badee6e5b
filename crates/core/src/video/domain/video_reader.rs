use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Reads frames, in stored order, from a video resource.
///
/// Implementations handle container and codec details; the pipeline only
/// sees [`Frame`] and [`VideoMetadata`]. Frame indices start at 0 and
/// increase by one per frame.
pub trait VideoReader: Send {
    /// Opens the resource and returns its metadata.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over frames in stored order. Calling it before a
    /// successful `open` yields a single error.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held by the reader. Safe to call more than once.
    fn close(&mut self);
}
