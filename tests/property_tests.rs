//! Property and fuzz-style tests for robustness of core data structures.
//!
//! Runs on host (x86_64) only — proptest is not available for ESP32 targets.
//! On ESP32, these tests are compiled out.

#![cfg(not(target_os = "espidf"))]

use std::collections::VecDeque;

use gongbot::adapters::nvs::{decode_region, encode_region};
use gongbot::app::events::AppEvent;
use gongbot::app::poll::PollClient;
use gongbot::app::ports::{EventSink, PollTransport, TransportError, TransportEvent};
use gongbot::app::ring::RingLatch;
use gongbot::config::{validate_poll_url, MAX_URL_LEN};
use proptest::prelude::*;

struct NullSink;
impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

struct QueueTransport {
    queued: VecDeque<TransportEvent>,
}

impl PollTransport for QueueTransport {
    fn start_get(&mut self, _url: &str, _timeout_secs: u16) -> Result<(), TransportError> {
        Ok(())
    }

    fn drain_events(&mut self, mut handler: impl FnMut(TransportEvent)) {
        while let Some(event) = self.queued.pop_front() {
            handler(event);
        }
    }

    fn abort(&mut self) {
        self.queued.clear();
    }
}

// ── Ring detection ────────────────────────────────────────────

proptest! {
    /// A body of nothing but whitespace must never latch a ring,
    /// regardless of length or which whitespace characters it mixes.
    #[test]
    fn whitespace_only_bodies_never_ring(
        body in proptest::collection::vec(
            prop_oneof![Just(b' '), Just(b'\t'), Just(b'\r'), Just(b'\n')],
            0..256,
        ),
    ) {
        let mut poll = PollClient::new();
        let ring = RingLatch::new();
        let mut transport = QueueTransport { queued: VecDeque::new() };

        poll.tick(&mut transport, "http://gong.example/poll", true, 0, 60, &mut NullSink);
        transport.queued.push_back(TransportEvent::Data(body));
        transport.queued.push_back(TransportEvent::Done { status: 200 });
        poll.process(&mut transport, &ring, &mut NullSink);

        prop_assert!(!ring.is_set());
        prop_assert_eq!(poll.rings_detected(), 0);
    }

    /// Any body with at least one non-whitespace byte latches exactly
    /// one ring, however much padding surrounds it.
    #[test]
    fn padded_payloads_always_ring(
        lead in proptest::collection::vec(
            prop_oneof![Just(b' '), Just(b'\t'), Just(b'\r'), Just(b'\n')],
            0..64,
        ),
        core in "[A-Za-z0-9]{1,32}",
        trail in proptest::collection::vec(
            prop_oneof![Just(b' '), Just(b'\t'), Just(b'\r'), Just(b'\n')],
            0..64,
        ),
    ) {
        let mut body = lead;
        body.extend_from_slice(core.as_bytes());
        body.extend_from_slice(&trail);

        let mut poll = PollClient::new();
        let ring = RingLatch::new();
        let mut transport = QueueTransport { queued: VecDeque::new() };

        poll.tick(&mut transport, "http://gong.example/poll", true, 0, 60, &mut NullSink);
        transport.queued.push_back(TransportEvent::Data(body));
        poll.process(&mut transport, &ring, &mut NullSink);

        prop_assert!(ring.is_set());
        prop_assert!(ring.consume());
        prop_assert!(!ring.consume(), "latch holds a single pending ring");
    }
}

// ── Config storage region codec ───────────────────────────────

proptest! {
    /// Every URL that passes validation survives the storage region
    /// byte encoding unchanged.
    #[test]
    fn region_codec_round_trips_valid_urls(
        path in "[a-z0-9/._-]{0,100}",
    ) {
        let url = format!("http://gong.example/{}", path);
        prop_assume!(url.len() <= MAX_URL_LEN);
        prop_assume!(validate_poll_url(&url).is_ok());

        let region = encode_region(&url);
        prop_assert_eq!(decode_region(&region), Some(url.as_str()));
    }

    /// Over-long strings are rejected before they can reach storage.
    #[test]
    fn over_long_urls_never_validate(
        extra in proptest::collection::vec(proptest::char::range('a', 'z'), 122..200),
    ) {
        let mut url = String::from("http://");
        url.extend(extra);
        prop_assume!(url.len() > MAX_URL_LEN);
        prop_assert!(validate_poll_url(&url).is_err());
    }
}
