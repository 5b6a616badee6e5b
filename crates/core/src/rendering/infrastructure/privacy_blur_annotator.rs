use image::imageops;

use crate::rendering::domain::frame_annotator::FrameAnnotator;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::PRIVACY_BLUR_KERNEL;
use crate::shared::frame::Frame;
use crate::shared::gaussian;

/// Obscures each motion region with a Gaussian blur.
///
/// Every box is cropped out, blurred on its own and pasted back, so pixels
/// outside all boxes keep their exact values.
pub struct PrivacyBlurAnnotator {
    kernel: Vec<f32>,
}

impl PrivacyBlurAnnotator {
    /// `kernel_size` must be odd; the CLI validates it.
    pub fn new(kernel_size: usize) -> Self {
        Self {
            kernel: gaussian::gaussian_kernel_1d(kernel_size),
        }
    }
}

impl Default for PrivacyBlurAnnotator {
    fn default() -> Self {
        Self::new(PRIVACY_BLUR_KERNEL)
    }
}

impl FrameAnnotator for PrivacyBlurAnnotator {
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
            let (x, y) = (bbox.x as u32, bbox.y as u32);
            let roi =
                imageops::crop_imm(&canvas, x, y, bbox.width as u32, bbox.height as u32).to_image();
            let blurred = gaussian::gaussian_blur(&roi, &self.kernel);
            imageops::replace(&mut canvas, &blurred, x as i64, y as i64);
        }

        *frame = Frame::from_rgb_image(canvas, index);
        Ok(())
    }
}
