use super::bounding_box::BoundingBox;
use super::frame::Frame;

/// The detector's output unit: the original color frame and the motion
/// regions found in it, in contour discovery order.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotatedFrame {
    pub frame: Frame,
    pub boxes: Vec<BoundingBox>,
}

impl AnnotatedFrame {
    pub fn new(frame: Frame, boxes: Vec<BoundingBox>) -> Self {
        Self { frame, boxes }
    }

    pub fn has_motion(&self) -> bool {
        !self.boxes.is_empty()
    }
}
