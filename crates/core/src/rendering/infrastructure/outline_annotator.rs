use image::Rgb;
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::rendering::domain::frame_annotator::FrameAnnotator;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

pub const DEFAULT_OUTLINE_COLOR: [u8; 3] = [0, 255, 0];
pub const DEFAULT_STROKE: u32 = 2;

/// Draws an unfilled rectangle around each motion region.
///
/// The stroke grows inward from the box edge so the outline never leaves
/// the box (and therefore the frame).
pub struct OutlineAnnotator {
    color: Rgb<u8>,
    stroke: u32,
}

impl OutlineAnnotator {
    pub fn new(color: [u8; 3], stroke: u32) -> Self {
        Self {
            color: Rgb(color),
            stroke: stroke.max(1),
        }
    }
}

impl Default for OutlineAnnotator {
    fn default() -> Self {
        Self::new(DEFAULT_OUTLINE_COLOR, DEFAULT_STROKE)
    }
}

impl FrameAnnotator for OutlineAnnotator {
    fn annotate(
        &self,
        frame: &mut Frame,
        boxes: &[BoundingBox],
    ) -> Result<(), Box<dyn std::error::Error>> {
        if boxes.is_empty() {
            return Ok(());
        }
        if frame.channels() != 3 || !frame.is_well_formed() {
            return Err(format!("Frame {} is not a packed RGB frame", frame.index()).into());
        }

        let (fw, fh, index) = (frame.width(), frame.height(), frame.index());
        let owned = std::mem::replace(frame, Frame::new(Vec::new(), 0, 0, 3, index));
        let mut canvas = owned
            .into_rgb_image()
            .ok_or("Failed to create image from frame data")?;

        for bbox in boxes.iter().filter_map(|b| b.clamp_to(fw, fh)) {
            for inset in 0..self.stroke as i32 {
                let w = bbox.width - 2 * inset;
                let h = bbox.height - 2 * inset;
                if w <= 0 || h <= 0 {
                    break;
                }
                let rect = Rect::at(bbox.x + inset, bbox.y + inset).of_size(w as u32, h as u32);
                draw_hollow_rect_mut(&mut canvas, rect, self.color);
            }
        }

        *frame = Frame::from_rgb_image(canvas, index);
        Ok(())
    }
}
