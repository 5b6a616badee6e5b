pub mod frame_annotator;
pub mod frame_display;
