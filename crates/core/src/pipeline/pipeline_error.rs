use thiserror::Error;

use crate::detection::domain::motion_detector::DetectionError;
use crate::rendering::frame_renderer::RenderError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("source failed: {0}")]
    Source(String),
    #[error("detection failed: {0}")]
    Detection(#[from] DetectionError),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    /// A terminal failure arrived that no stage claimed as its own.
    #[error("upstream stage failed: {0}")]
    Upstream(String),
    #[error("{0} stage panicked")]
    StagePanicked(&'static str),
    #[error("pipeline already executed")]
    AlreadyExecuted,
}
