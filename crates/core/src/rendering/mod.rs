pub mod domain;
pub mod frame_renderer;
pub mod infrastructure;
