use image::GrayImage;

use crate::detection::domain::contour_boxes::external_boxes;
use crate::detection::domain::luma::to_luma;
use crate::detection::domain::motion_detector::{DetectionError, MotionDetector};
use crate::detection::domain::motion_mask::change_mask;
use crate::shared::annotated_frame::AnnotatedFrame;
use crate::shared::constants::{
    DETECTOR_BLUR_KERNEL, DIFF_THRESHOLD, DILATE_ITERATIONS, MIN_CONTOUR_AREA, REFRESH_INTERVAL,
};
use crate::shared::frame::Frame;
use crate::shared::gaussian;

/// Tunables for [`FrameDifferenceDetector`].
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorConfig {
    /// Processed frames between baseline replacements.
    pub refresh_interval: u64,
    /// Odd Gaussian kernel size used to denoise luma before differencing.
    pub blur_kernel: usize,
    pub diff_threshold: u8,
    pub dilate_iterations: u8,
    /// Minimum contour area (px²) for a region to be reported.
    pub min_area: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            refresh_interval: REFRESH_INTERVAL,
            blur_kernel: DETECTOR_BLUR_KERNEL,
            diff_threshold: DIFF_THRESHOLD,
            dilate_iterations: DILATE_ITERATIONS,
            min_area: MIN_CONTOUR_AREA,
        }
    }
}

/// Detects motion by differencing each smoothed luma frame against a
/// baseline that is seeded by the first frame and replaced every
/// `refresh_interval` frames.
///
/// The refresh happens after the comparison, so the frame that triggers it
/// is still scored against the old baseline.
pub struct FrameDifferenceDetector {
    config: DetectorConfig,
    kernel: Vec<f32>,
    baseline: Option<GrayImage>,
    frame_count: u64,
    refresh_count: u64,
}

impl FrameDifferenceDetector {
    pub fn new(config: DetectorConfig) -> Result<Self, DetectionError> {
        if config.refresh_interval == 0 {
            return Err(DetectionError::InvalidConfig(
                "refresh_interval must be >= 1".into(),
            ));
        }
        if config.blur_kernel == 0 || config.blur_kernel % 2 == 0 {
            return Err(DetectionError::InvalidConfig(format!(
                "blur_kernel must be a positive odd integer, got {}",
                config.blur_kernel
            )));
        }
        Ok(Self {
            kernel: gaussian::gaussian_kernel_1d(config.blur_kernel),
            config,
            baseline: None,
            frame_count: 0,
            refresh_count: 0,
        })
    }

    /// Frames processed so far, including the bootstrap frame.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Times the baseline has been replaced after bootstrap.
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count
    }

    pub fn baseline(&self) -> Option<&GrayImage> {
        self.baseline.as_ref()
    }

    fn smooth(&self, frame: &Frame) -> GrayImage {
        gaussian::gaussian_blur(&to_luma(frame), &self.kernel)
    }

    fn check_shape(&self, frame: &Frame) -> Result<(), DetectionError> {
        let (expected_width, expected_height) = self
            .baseline
            .as_ref()
            .map(|b| b.dimensions())
            .unwrap_or((frame.width(), frame.height()));

        let ok = frame.channels() == 3
            && frame.is_well_formed()
            && frame.width() > 0
            && frame.height() > 0
            && (frame.width(), frame.height()) == (expected_width, expected_height);

        if ok {
            Ok(())
        } else {
            Err(DetectionError::ShapeMismatch {
                index: frame.index(),
                width: frame.width(),
                height: frame.height(),
                channels: frame.channels(),
                expected_width,
                expected_height,
            })
        }
    }
}

impl MotionDetector for FrameDifferenceDetector {
    fn process_frame(&mut self, frame: Frame) -> Result<Option<AnnotatedFrame>, DetectionError> {
        self.check_shape(&frame)?;

        let smoothed = self.smooth(&frame);
        self.frame_count += 1;

        let Some(baseline) = self.baseline.as_ref() else {
            log::debug!("Baseline seeded from frame {}", frame.index());
            self.baseline = Some(smoothed);
            return Ok(None);
        };

        let mask = change_mask(
            baseline,
            &smoothed,
            self.config.diff_threshold,
            self.config.dilate_iterations,
        );
        let boxes = external_boxes(&mask, self.config.min_area);

        if self.frame_count % self.config.refresh_interval == 0 {
            log::debug!(
                "Baseline refreshed from frame {} (frame_count={})",
                frame.index(),
                self.frame_count
            );
            self.baseline = Some(smoothed);
            self.refresh_count += 1;
        }

        log::trace!("Frame {}: {} motion region(s)", frame.index(), boxes.len());
        Ok(Some(AnnotatedFrame::new(frame, boxes)))
    }
}
