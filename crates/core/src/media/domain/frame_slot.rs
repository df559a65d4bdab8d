use std::sync::{Arc, Mutex};

use crate::shared::frame::Frame;

/// Holds only the newest frame from a producer.
///
/// Readers never see a backlog: a slow consumer simply skips the frames it
/// missed.
#[derive(Clone, Default)]
pub struct FrameSlot {
    inner: Arc<Mutex<Option<Arc<Frame>>>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame(frame: Frame) -> Self {
        let slot = Self::new();
        slot.publish(frame);
        slot
    }

    pub fn publish(&self, frame: Frame) {
        *self.inner.lock().unwrap() = Some(Arc::new(frame));
    }

    pub fn latest(&self) -> Option<Arc<Frame>> {
        self.inner.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        *self.inner.lock().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(index: usize) -> Frame {
        Frame::new(vec![0u8; 3], 1, 1, 3, index)
    }

    #[test]
    fn test_empty_slot() {
        assert!(FrameSlot::new().latest().is_none());
    }

    #[test]
    fn test_latest_replaces_previous() {
        let slot = FrameSlot::new();
        slot.publish(frame(1));
        slot.publish(frame(2));
        assert_eq!(slot.latest().unwrap().index(), 2);
    }

    #[test]
    fn test_clones_share_contents() {
        let slot = FrameSlot::with_frame(frame(3));
        let other = slot.clone();
        other.clear();
        assert!(slot.latest().is_none());
    }
}
