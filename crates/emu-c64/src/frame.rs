//! Cross-thread frame-ready handshake.
//!
//! The producer (CPU + VIC driver loop) must never block on the consumer
//! (renderer). The two sides share only an atomic flag and a mutex-guarded
//! snapshot slot; a missed frame is dropped, not queued, and the producer
//! always wins any race for the slot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A full RAM image, owned by whichever side currently holds it.
pub type RamSnapshot = Box<[u8; 0x10000]>;

/// Handshake state shared between the emulation thread and a renderer.
pub struct FrameHandshake {
    frame_ready: AtomicBool,
    stop: AtomicBool,
    slot: Mutex<Option<RamSnapshot>>,
}

impl FrameHandshake {
    #[must_use]
    pub fn new() -> Self {
        Self {
            frame_ready: AtomicBool::new(false),
            stop: AtomicBool::new(false),
            slot: Mutex::new(None),
        }
    }

    /// Producer side: publish a fresh snapshot and raise `frame_ready`.
    /// Overwrites whatever the consumer hasn't yet collected — the
    /// producer never waits for the slot to drain.
    pub fn publish_frame(&self, ram: &[u8; 0x10000]) {
        let snapshot: RamSnapshot = Box::new(*ram);
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(snapshot);
        }
        self.frame_ready.store(true, Ordering::Release);
    }

    /// Consumer side: if a frame is ready, take its snapshot and clear the
    /// flag. Returns `None` if no frame has been published since the last
    /// call.
    pub fn try_take_frame(&self) -> Option<RamSnapshot> {
        if !self.frame_ready.swap(false, Ordering::Acquire) {
            return None;
        }
        self.slot.lock().ok().and_then(|mut slot| slot.take())
    }

    /// Producer side: ask the consumer (and, cooperatively, the producer's
    /// own loop) to stop.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Either side: whether a stop has been requested. Poll this at an
    /// instruction boundary (producer) or the start of a render cycle
    /// (consumer).
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

impl Default for FrameHandshake {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn no_frame_until_published() {
        let hs = FrameHandshake::new();
        assert!(hs.try_take_frame().is_none());
    }

    #[test]
    fn publish_then_take_round_trips() {
        let hs = FrameHandshake::new();
        let mut ram = Box::new([0u8; 0x10000]);
        ram[0] = 0x42;
        hs.publish_frame(&ram);
        let taken = hs.try_take_frame().expect("frame should be ready");
        assert_eq!(taken[0], 0x42);
        assert!(hs.try_take_frame().is_none());
    }

    #[test]
    fn missed_frame_is_overwritten_not_queued() {
        let hs = FrameHandshake::new();
        let ram_a = Box::new([1u8; 0x10000]);
        let ram_b = Box::new([2u8; 0x10000]);
        hs.publish_frame(&ram_a);
        hs.publish_frame(&ram_b);
        let taken = hs.try_take_frame().unwrap();
        assert_eq!(taken[0], 2);
        assert!(hs.try_take_frame().is_none());
    }

    #[test]
    fn stop_is_visible_across_threads() {
        let hs = Arc::new(FrameHandshake::new());
        let hs2 = Arc::clone(&hs);
        let handle = thread::spawn(move || {
            while !hs2.should_stop() {
                thread::yield_now();
            }
        });
        hs.request_stop();
        handle.join().unwrap();
    }
}
