//! Synthetic scenes shared by detector and pipeline tests.

use super::frame::Frame;

pub const SCENE_WIDTH: u32 = 120;
pub const SCENE_HEIGHT: u32 = 100;
pub const SQUARE_SIDE: i32 = 20;
pub const SQUARE_ORIGIN: (i32, i32) = (20, 20);

/// Black RGB frame with an optional white square at `origin`.
pub fn square_frame(width: u32, height: u32, origin: Option<(i32, i32)>, index: usize) -> Frame {
    let mut frame = Frame::new(vec![0u8; (width * height * 3) as usize], width, height, 3, index);
    if let Some((ox, oy)) = origin {
        let mut pixels = frame.as_ndarray_mut();
        for y in oy.max(0)..(oy + SQUARE_SIDE).min(height as i32) {
            for x in ox.max(0)..(ox + SQUARE_SIDE).min(width as i32) {
                for c in 0..3 {
                    pixels[[y as usize, x as usize, c]] = 255;
                }
            }
        }
    }
    frame
}

/// Square position in frame `index` (0-based) of the ten-frame scene:
/// frames 0..5 hold still, frames 5..10 step 5 px down-right each frame.
pub fn square_position(index: usize) -> (i32, i32) {
    let step = index.saturating_sub(4) as i32 * 5;
    (SQUARE_ORIGIN.0 + step, SQUARE_ORIGIN.1 + step)
}

/// Ten frames: five identical, then the square moves 5 px diagonally per frame.
pub fn moving_square_scene() -> Vec<Frame> {
    (0..10)
        .map(|i| square_frame(SCENE_WIDTH, SCENE_HEIGHT, Some(square_position(i)), i))
        .collect()
}
