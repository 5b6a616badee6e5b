use std::time::Duration;

use thiserror::Error;

use crate::rendering::domain::frame_annotator::FrameAnnotator;
use crate::rendering::domain::frame_display::{DisplayError, FrameDisplay};
use crate::rendering::infrastructure::annotator_factory::{create_annotator, RenderMode};
use crate::rendering::infrastructure::timestamp_overlay::TimestampOverlay;
use crate::shared::annotated_frame::AnnotatedFrame;
use crate::shared::constants::{DISPLAY_WAIT_MS, PRIVACY_BLUR_KERNEL};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to annotate frame {index}: {reason}")]
    Annotate { index: usize, reason: String },
    #[error(transparent)]
    Display(#[from] DisplayError),
}

/// Renderer settings.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub mode: RenderMode,
    /// Privacy blur kernel size; must be odd.
    pub blur_kernel: usize,
    pub timestamp: bool,
    /// How long to wait for a cancel key after each shown frame.
    pub wait: Duration,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::default(),
            blur_kernel: PRIVACY_BLUR_KERNEL,
            timestamp: true,
            wait: Duration::from_millis(DISPLAY_WAIT_MS),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    Continue,
    Cancelled,
}

/// Applies the region treatment and timestamp to annotated frames and
/// hands them to a display.
pub struct FrameRenderer {
    annotator: Box<dyn FrameAnnotator>,
    overlay: Option<TimestampOverlay>,
    display: Box<dyn FrameDisplay>,
    wait: Duration,
    rendered: usize,
    closed: bool,
}

impl FrameRenderer {
    pub fn new(
        annotator: Box<dyn FrameAnnotator>,
        overlay: Option<TimestampOverlay>,
        display: Box<dyn FrameDisplay>,
        wait: Duration,
    ) -> Self {
        Self {
            annotator,
            overlay,
            display,
            wait,
            rendered: 0,
            closed: false,
        }
    }

    pub fn from_config(config: &RenderConfig, display: Box<dyn FrameDisplay>) -> Self {
        let overlay = config.timestamp.then(TimestampOverlay::default);
        Self::new(
            create_annotator(config.mode, config.blur_kernel),
            overlay,
            display,
            config.wait,
        )
    }

    /// Renders one frame, then blocks up to the configured wait for a
    /// cancel key.
    pub fn render(&mut self, item: AnnotatedFrame) -> Result<RenderOutcome, RenderError> {
        let AnnotatedFrame { mut frame, boxes } = item;
        let index = frame.index();

        self.annotator
            .annotate(&mut frame, &boxes)
            .map_err(|e| RenderError::Annotate {
                index,
                reason: e.to_string(),
            })?;
        if let Some(overlay) = &self.overlay {
            overlay.stamp(&mut frame);
        }
        log::debug!("Frame {}: {} motion region(s)", index, boxes.len());
        self.display.show(&frame)?;
        self.rendered += 1;

        if self.display.wait_for_cancel(self.wait) {
            log::info!("Cancel requested after frame {}", index);
            return Ok(RenderOutcome::Cancelled);
        }
        Ok(RenderOutcome::Continue)
    }

    pub fn rendered(&self) -> usize {
        self.rendered
    }

    pub fn close(&mut self) {
        if !self.closed {
            self.display.close();
            self.closed = true;
        }
    }
}

impl Drop for FrameRenderer {
    fn drop(&mut self) {
        self.close();
    }
}
