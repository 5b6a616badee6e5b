use std::time::Duration;

use crate::rendering::domain::frame_display::{DisplayError, FrameDisplay};
use crate::shared::frame::Frame;

use super::cancel_keys::CancelKeys;

/// Display that discards frames. Used when no output sink is configured.
pub struct HeadlessDisplay {
    keys: CancelKeys,
    shown: usize,
}

impl HeadlessDisplay {
    pub fn new(keys: CancelKeys) -> Self {
        Self { keys, shown: 0 }
    }

    pub fn shown(&self) -> usize {
        self.shown
    }
}

impl FrameDisplay for HeadlessDisplay {
    fn show(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        if !frame.is_well_formed() {
            return Err(DisplayError::MalformedFrame(frame.index()));
        }
        self.shown += 1;
        log::debug!("Frame {} rendered ({}x{})", frame.index(), frame.width(), frame.height());
        Ok(())
    }

    fn wait_for_cancel(&mut self, timeout: Duration) -> bool {
        self.keys.wait(timeout)
    }

    fn close(&mut self) {
        log::debug!("Headless display closed after {} frames", self.shown);
    }
}
