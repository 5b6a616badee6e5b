use image::{GrayImage, Luma};
use imageproc::contrast::{threshold_mut, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::map::map_colors2;
use imageproc::morphology::dilate;

/// Per-pixel absolute difference of two equally sized luma images.
pub fn abs_diff(a: &GrayImage, b: &GrayImage) -> GrayImage {
    map_colors2(a, b, |p: Luma<u8>, q: Luma<u8>| Luma([p[0].abs_diff(q[0])]))
}

/// Builds the binary change mask between the baseline and the current image.
///
/// Each dilation iteration grows the mask by one pixel in every direction
/// (3x3 square element), merging nearby fragments into one blob.
pub fn change_mask(
    baseline: &GrayImage,
    current: &GrayImage,
    cutoff: u8,
    dilate_iterations: u8,
) -> GrayImage {
    let mut mask = abs_diff(baseline, current);
    // Binary: strictly above the cutoff becomes 255.
    threshold_mut(&mut mask, cutoff, ThresholdType::Binary);
    if dilate_iterations == 0 {
        return mask;
    }
    dilate(&mask, Norm::LInf, dilate_iterations)
}
