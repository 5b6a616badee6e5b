use std::str::FromStr;

use crate::rendering::domain::frame_annotator::FrameAnnotator;

use super::outline_annotator::OutlineAnnotator;
use super::privacy_blur_annotator::PrivacyBlurAnnotator;

/// How motion regions are marked on the displayed frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Green outline around each region.
    Boxes,
    /// Each region is Gaussian-blurred.
    #[default]
    Privacy,
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "boxes" => Ok(Self::Boxes),
            "privacy" => Ok(Self::Privacy),
            other => Err(format!("unknown render mode '{other}' (expected boxes or privacy)")),
        }
    }
}

/// Creates the annotator for `mode`. `kernel_size` only applies to privacy
/// mode.
pub fn create_annotator(mode: RenderMode, kernel_size: usize) -> Box<dyn FrameAnnotator> {
    match mode {
        RenderMode::Boxes => {
            log::info!("Rendering motion regions as outlines");
            Box::new(OutlineAnnotator::default())
        }
        RenderMode::Privacy => {
            log::info!("Rendering motion regions with privacy blur (kernel_size={})", kernel_size);
            Box::new(PrivacyBlurAnnotator::new(kernel_size))
        }
    }
}
