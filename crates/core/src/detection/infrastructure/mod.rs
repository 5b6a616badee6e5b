pub mod frame_difference_detector;
