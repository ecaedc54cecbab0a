//! Timer-driven event system.
//!
//! Events are produced by:
//! - esp_timer callbacks (control tick, poll tick)
//! - connectivity transitions (WiFi adapter)
//!
//! Events are consumed by the main loop, which processes them one at a
//! time in FIFO order.  The queue is a lock-free SPSC ring so timer-task
//! producers never contend with the main-loop consumer.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Timer task   │────▶│              │     │              │
//! │ WiFi events  │────▶│  Event Queue │────▶│  Main Loop   │
//! │ Software     │────▶│  (lock-free) │     │  (consumer)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicU8, Ordering};

/// Maximum number of pending events.
/// Power of 2 for efficient ring buffer modulo.
const EVENT_QUEUE_CAP: usize = 32;

/// System event types, ordered by rough priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    // ── Control ───────────────────────────────────────────
    /// Trigger/ring arbitration tick (50 Hz).
    ControlTick = 0,
    /// Long-poll attempt timer fired (every 5 s).
    PollTick = 1,

    // ── Connectivity ──────────────────────────────────────
    /// WiFi station link came up.
    ConnectivityUp = 10,
    /// WiFi station link was lost.
    ConnectivityLost = 11,
}

// ── Lock-free SPSC ring buffer ────────────────────────────────
//
// Timer callbacks write (produce), main loop reads (consume).
// Uses atomic head/tail indices.  The buffer lives in a static so the
// esp_timer callbacks can reach it without a context pointer.

static EVENT_HEAD: AtomicU8 = AtomicU8::new(0);
static EVENT_TAIL: AtomicU8 = AtomicU8::new(0);
// SAFETY: EVENT_BUFFER is accessed only through push_event / pop_event.
// Producer (push_event): esp_timer task context — one writer.
// Consumer (pop_event): main-loop task — one reader.
// The Acquire/Release pairs on head/tail enforce the SPSC discipline.
static mut EVENT_BUFFER: [u8; EVENT_QUEUE_CAP] = [0; EVENT_QUEUE_CAP];

/// Push an event into the queue.
/// Safe to call from timer-task context (lock-free).
/// Returns `false` if the queue is full (event dropped).
pub fn push_event(event: Event) -> bool {
    let head = EVENT_HEAD.load(Ordering::Relaxed);
    let tail = EVENT_TAIL.load(Ordering::Acquire);
    let next_head = (head + 1) % EVENT_QUEUE_CAP as u8;

    if next_head == tail {
        return false; // Queue full — drop event.
    }

    // SAFETY: single producer; the slot at `head` is not visible to the
    // consumer until the Release store below.
    unsafe {
        EVENT_BUFFER[head as usize] = event as u8;
    }

    EVENT_HEAD.store(next_head, Ordering::Release);
    true
}

/// Pop the next event from the queue.
/// Called from the main loop (single consumer).
/// Returns `None` if the queue is empty.
pub fn pop_event() -> Option<Event> {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);

    if tail == head {
        return None; // Empty.
    }

    let raw = unsafe { EVENT_BUFFER[tail as usize] };
    EVENT_TAIL.store((tail + 1) % EVENT_QUEUE_CAP as u8, Ordering::Release);

    event_from_u8(raw)
}

/// Drain all pending events into a callback, FIFO order.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}

/// Check if the event queue is empty.
pub fn queue_is_empty() -> bool {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);
    tail == head
}

// ── Internal ──────────────────────────────────────────────────

fn event_from_u8(raw: u8) -> Option<Event> {
    match raw {
        0 => Some(Event::ControlTick),
        1 => Some(Event::PollTick),
        10 => Some(Event::ConnectivityUp),
        11 => Some(Event::ConnectivityLost),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The static queue is shared across the test binary; keep this module
    // to a single serialized test so drains don't interleave.
    #[test]
    fn fifo_push_pop_drain() {
        while pop_event().is_some() {}

        assert!(queue_is_empty());
        assert!(push_event(Event::PollTick));
        assert!(push_event(Event::ControlTick));
        assert!(push_event(Event::ConnectivityUp));

        let mut seen = Vec::new();
        drain_events(|e| seen.push(e));
        assert_eq!(
            seen,
            vec![Event::PollTick, Event::ControlTick, Event::ConnectivityUp]
        );
        assert!(queue_is_empty());
    }
}
