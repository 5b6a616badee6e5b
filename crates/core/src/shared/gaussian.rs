use image::Pixel;
use imageproc::definitions::Image;
use imageproc::filter::separable_filter_equal;

/// Normalised 1D Gaussian kernel with `kernel_size` taps and
/// sigma = `kernel_size / 6`.
///
/// `kernel_size` must be odd and >= 1.
pub fn gaussian_kernel_1d(kernel_size: usize) -> Vec<f32> {
    debug_assert!(kernel_size >= 1 && kernel_size % 2 == 1);
    let sigma = kernel_size as f64 / 6.0;
    let half = (kernel_size / 2) as f64;
    let weights: Vec<f64> = (0..kernel_size)
        .map(|i| {
            let x = i as f64 - half;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.iter().map(|w| (w / sum) as f32).collect()
}

/// Square Gaussian blur with a precomputed kernel; edge pixels are
/// replicated. Works on luma and RGB buffers alike.
pub fn gaussian_blur<P>(image: &Image<P>, kernel: &[f32]) -> Image<P>
where
    P: Pixel<Subpixel = u8>,
{
    if kernel.len() <= 1 || image.width() == 0 || image.height() == 0 {
        return image.clone();
    }
    separable_filter_equal(image, kernel)
}
