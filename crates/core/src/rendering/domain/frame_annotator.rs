use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Domain interface for the visual treatment applied to motion regions.
///
/// Implementations modify the frame in-place (`&mut Frame`); only the
/// renderer, which owns the frame at that point, calls them.
pub trait FrameAnnotator: Send {
    fn annotate(
        &self,
        frame: &mut Frame,
        boxes: &[BoundingBox],
    ) -> Result<(), Box<dyn std::error::Error>>;
}
