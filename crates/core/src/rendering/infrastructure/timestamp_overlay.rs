use chrono::Local;

use crate::shared::frame::Frame;

use super::bitmap_font::{self, GLYPH_HEIGHT, GLYPH_SPACING, GLYPH_WIDTH};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DEFAULT_ORIGIN: (u32, u32) = (10, 10);
pub const DEFAULT_SCALE: u32 = 2;
pub const DEFAULT_TEXT_COLOR: [u8; 3] = [255, 255, 255];

/// Stamps the wall-clock time onto frames at a fixed position.
///
/// Text is clipped at the frame edge; frames smaller than the origin are
/// left untouched.
pub struct TimestampOverlay {
    origin: (u32, u32),
    scale: u32,
    color: [u8; 3],
}

impl TimestampOverlay {
    pub fn new(origin: (u32, u32), scale: u32, color: [u8; 3]) -> Self {
        Self {
            origin,
            scale: scale.max(1),
            color,
        }
    }

    pub fn current_text() -> String {
        Local::now().format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn stamp(&self, frame: &mut Frame) {
        self.draw_text(frame, &Self::current_text());
    }

    pub fn draw_text(&self, frame: &mut Frame, text: &str) {
        if frame.channels() != 3 || !frame.is_well_formed() {
            log::warn!("Skipping timestamp on non-RGB frame {}", frame.index());
            return;
        }
        let (fw, fh) = (frame.width() as usize, frame.height() as usize);
        let (ox, oy) = (self.origin.0 as usize, self.origin.1 as usize);
        let scale = self.scale as usize;
        let mut pixels = frame.as_ndarray_mut();

        for (i, c) in text.chars().enumerate() {
            let glyph = bitmap_font::glyph(c);
            let gx = ox + i * (GLYPH_WIDTH + GLYPH_SPACING) * scale;
            if gx >= fw {
                break;
            }
            for row in 0..GLYPH_HEIGHT {
                for col in 0..GLYPH_WIDTH {
                    if !bitmap_font::is_set(glyph, col, row) {
                        continue;
                    }
                    for dy in 0..scale {
                        let y = oy + row * scale + dy;
                        if y >= fh {
                            break;
                        }
                        for dx in 0..scale {
                            let x = gx + col * scale + dx;
                            if x >= fw {
                                break;
                            }
                            for (ch, value) in self.color.iter().enumerate() {
                                pixels[[y, x, ch]] = *value;
                            }
                        }
                    }
                }
            }
        }
    }
}

impl Default for TimestampOverlay {
    fn default() -> Self {
        Self::new(DEFAULT_ORIGIN, DEFAULT_SCALE, DEFAULT_TEXT_COLOR)
    }
}
