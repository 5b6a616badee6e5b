pub mod annotator_factory;
mod bitmap_font;
pub mod cancel_keys;
pub mod headless_display;
pub mod image_sequence_display;
pub mod outline_annotator;
pub mod privacy_blur_annotator;
pub mod timestamp_overlay;
