use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crate::detection::domain::motion_detector::MotionDetector;
use crate::rendering::frame_renderer::FrameRenderer;
use crate::shared::constants::{FRAME_DELAY_MS, QUEUE_CAPACITY};
use crate::video::domain::video_reader::VideoReader;

use super::pipeline_error::PipelineError;
use super::pipeline_logger::PipelineLogger;

/// Configuration for a pipeline execution run.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Pause after each frame the source emits. Zero disables pacing.
    pub frame_delay: Duration,
    /// Capacity of each inter-stage queue; `None` means unbounded.
    pub queue_capacity: Option<usize>,
    /// Shared shutdown flag. Setting it makes every stage wind down.
    pub cancelled: Arc<AtomicBool>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_delay: Duration::from_millis(FRAME_DELAY_MS),
            queue_capacity: Some(QUEUE_CAPACITY),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Counters from a completed run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub frames_read: usize,
    pub frames_annotated: usize,
    pub frames_rendered: usize,
    /// The run stopped early on request rather than at end of input.
    pub cancelled: bool,
}

/// Abstracts how the source → detect → render pipeline is executed.
///
/// This is a port; infrastructure provides the concrete scheduling.
pub trait PipelineExecutor: Send {
    fn execute(
        &self,
        reader: Box<dyn VideoReader>,
        input: &Path,
        detector: Box<dyn MotionDetector>,
        renderer: FrameRenderer,
        config: PipelineConfig,
        logger: &mut dyn PipelineLogger,
    ) -> Result<PipelineReport, PipelineError>;
}
