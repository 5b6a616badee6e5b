pub mod detect_motion_use_case;
pub mod infrastructure;
pub mod pipeline_error;
pub mod pipeline_executor;
pub mod pipeline_logger;
pub mod stage_message;
