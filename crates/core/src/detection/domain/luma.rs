use image::{GrayImage, Luma};

use crate::shared::frame::Frame;

// BT.601 weights in 14-bit fixed point: 0.299, 0.587, 0.114.
const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;
const SHIFT: u32 = 14;

/// Converts an RGB frame to 8-bit luma.
///
/// The caller guarantees a well-formed 3-channel frame.
pub fn to_luma(frame: &Frame) -> GrayImage {
    let pixels = frame.as_ndarray();
    GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        let (row, col) = (y as usize, x as usize);
        let r = pixels[[row, col, 0]] as u32;
        let g = pixels[[row, col, 1]] as u32;
        let b = pixels[[row, col, 2]] as u32;
        let luma = (r * R_WEIGHT + g * G_WEIGHT + b * B_WEIGHT + (1 << (SHIFT - 1))) >> SHIFT;
        Luma([luma as u8])
    })
}
