use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::detection::domain::motion_detector::MotionDetector;
use crate::rendering::frame_renderer::FrameRenderer;
use crate::video::domain::video_reader::VideoReader;

use super::pipeline_error::PipelineError;
use super::pipeline_executor::{PipelineConfig, PipelineExecutor, PipelineReport};
use super::pipeline_logger::PipelineLogger;

/// Wires a reader, detector and renderer together and hands them to a
/// [`PipelineExecutor`].
///
/// Single-use: `execute` consumes the owned stages, so a second call fails
/// with [`PipelineError::AlreadyExecuted`].
pub struct DetectMotionUseCase {
    reader: Option<Box<dyn VideoReader>>,
    detector: Option<Box<dyn MotionDetector>>,
    renderer: Option<FrameRenderer>,
    executor: Box<dyn PipelineExecutor>,
    config: PipelineConfig,
}

impl DetectMotionUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        detector: Box<dyn MotionDetector>,
        renderer: FrameRenderer,
        executor: Box<dyn PipelineExecutor>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            reader: Some(reader),
            detector: Some(detector),
            renderer: Some(renderer),
            executor,
            config,
        }
    }

    /// Token that stops the run when set, e.g. from a signal handler.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.config.cancelled)
    }

    pub fn execute(
        &mut self,
        input: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<PipelineReport, PipelineError> {
        let reader = self.reader.take().ok_or(PipelineError::AlreadyExecuted)?;
        let detector = self.detector.take().ok_or(PipelineError::AlreadyExecuted)?;
        let renderer = self.renderer.take().ok_or(PipelineError::AlreadyExecuted)?;

        let result = self.executor.execute(
            reader,
            input,
            detector,
            renderer,
            self.config.clone(),
            logger,
        );
        logger.summary();
        result
    }
}
