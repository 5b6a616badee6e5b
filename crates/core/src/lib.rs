//! Frame-differencing motion detection with a threaded
//! source → detector → renderer pipeline.

pub mod detection;
pub mod pipeline;
pub mod rendering;
pub mod shared;
pub mod video;
