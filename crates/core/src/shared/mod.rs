pub mod annotated_frame;
pub mod bounding_box;
pub mod constants;
pub mod frame;
pub mod gaussian;
pub mod video_metadata;

#[cfg(test)]
pub mod synthetic;
