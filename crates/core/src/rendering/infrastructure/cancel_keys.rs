use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

/// Cancel requests (keypresses, Ctrl-C) delivered over a channel.
///
/// Waiting is a blocking `recv_timeout`, so an idle display parks instead
/// of spinning. Without a channel, or once every sender is gone, the wait
/// degrades to a plain sleep that keeps the display cadence.
pub struct CancelKeys {
    rx: Option<Receiver<()>>,
}

impl CancelKeys {
    pub fn new(rx: Receiver<()>) -> Self {
        Self { rx: Some(rx) }
    }

    pub fn none() -> Self {
        Self { rx: None }
    }

    pub fn wait(&mut self, timeout: Duration) -> bool {
        let Some(rx) = self.rx.as_ref() else {
            if !timeout.is_zero() {
                thread::sleep(timeout);
            }
            return false;
        };
        match rx.recv_timeout(timeout) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => {
                log::debug!("Cancel key source disconnected");
                self.rx = None;
                false
            }
        }
    }
}

impl Default for CancelKeys {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_pending_key_cancels() {
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(()).unwrap();
        let mut keys = CancelKeys::new(rx);
        assert!(keys.wait(Duration::from_millis(5)));
        assert!(!keys.wait(Duration::ZERO));
    }

    #[test]
    fn test_times_out_without_key() {
        let (_tx, rx) = crossbeam_channel::unbounded();
        let mut keys = CancelKeys::new(rx);
        let start = Instant::now();
        assert!(!keys.wait(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_disconnected_source_never_cancels() {
        let (tx, rx) = crossbeam_channel::unbounded::<()>();
        drop(tx);
        let mut keys = CancelKeys::new(rx);
        assert!(!keys.wait(Duration::ZERO));
        assert!(keys.rx.is_none());
    }

    #[test]
    fn test_no_channel_never_cancels() {
        let mut keys = CancelKeys::none();
        assert!(!keys.wait(Duration::ZERO));
    }
}
