/// Processed frames between baseline replacements (~2 seconds at 30 fps).
pub const REFRESH_INTERVAL: u64 = 60;

/// Smoothing kernel applied to grayscale frames before differencing.
pub const DETECTOR_BLUR_KERNEL: usize = 21;

/// Absolute luma difference above which a pixel counts as changed.
pub const DIFF_THRESHOLD: u8 = 25;

/// 3x3 dilation passes applied to the change mask.
pub const DILATE_ITERATIONS: u8 = 2;

/// Contours enclosing less area than this (px²) are treated as noise.
pub const MIN_CONTOUR_AREA: f64 = 100.0;

/// Kernel for privacy-mode region smoothing. Odd; up to 51 for a stronger effect.
pub const PRIVACY_BLUR_KERNEL: usize = 31;

/// Pause after each frame emitted by the source.
pub const FRAME_DELAY_MS: u64 = 30;

/// Bounded wait for a cancel key after each displayed frame (~30 fps).
pub const DISPLAY_WAIT_MS: u64 = 33;

/// Capacity of each inter-stage queue when bounded.
pub const QUEUE_CAPACITY: usize = 8;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
