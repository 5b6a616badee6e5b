pub mod contour_boxes;
pub mod luma;
pub mod motion_detector;
pub mod motion_mask;
