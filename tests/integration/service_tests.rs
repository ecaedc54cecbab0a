//! End-to-end service behaviour against mock adapters.
//!
//! Covers trigger/ring arbitration, the long-poll request lifecycle, and
//! the hung-request recovery path — the full loop a deployed unit runs,
//! minus real hardware and WiFi.

use gongbot::app::events::StrikeSource;
use gongbot::app::poll::{PollClient, RequestState};
use gongbot::app::ports::TransportError;
use gongbot::app::ring::RingLatch;
use gongbot::app::service::AppService;
use gongbot::config::SystemConfig;

use crate::mock_hw::{MockHardware, RecordingSink, ScriptedTransport};

fn config_with_url(url: &str) -> SystemConfig {
    let mut config = SystemConfig::default();
    config.poll_url.push_str(url).unwrap();
    config
}

// ── Trigger / ring arbitration ────────────────────────────────

#[test]
fn trigger_wins_over_pending_ring_in_same_tick() {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let ring = RingLatch::new();

    ring.set();
    hw.press_trigger();
    app.control_tick(&mut hw, &ring, &mut sink);

    // One strike, attributed to the trigger; the ring stays pending.
    assert_eq!(hw.strike_calls, 1);
    assert_eq!(sink.strike_sources(), vec![StrikeSource::Trigger]);
    assert!(ring.is_set(), "ring must survive a trigger tick");

    // Trigger releases; the deferred ring fires on the next tick.
    hw.release_trigger();
    app.control_tick(&mut hw, &ring, &mut sink);
    assert_eq!(hw.strike_calls, 2);
    assert_eq!(
        sink.strike_sources(),
        vec![StrikeSource::Trigger, StrikeSource::Ring]
    );
    assert!(!ring.is_set());
}

#[test]
fn held_trigger_restrikes_every_tick() {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let ring = RingLatch::new();

    hw.press_trigger();
    for _ in 0..3 {
        app.control_tick(&mut hw, &ring, &mut sink);
    }
    assert_eq!(hw.strike_calls, 3);
    assert_eq!(app.strikes_total(), 3);
}

#[test]
fn ring_latch_yields_exactly_one_strike() {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let ring = RingLatch::new();

    // Two server payloads before the next control tick collapse into one.
    ring.set();
    ring.set();

    app.control_tick(&mut hw, &ring, &mut sink);
    app.control_tick(&mut hw, &ring, &mut sink);

    assert_eq!(hw.strike_calls, 1);
    assert_eq!(sink.strike_sources(), vec![StrikeSource::Ring]);
}

#[test]
fn idle_tick_does_nothing() {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let ring = RingLatch::new();

    app.control_tick(&mut hw, &ring, &mut sink);
    assert_eq!(hw.strike_calls, 0);
    assert_eq!(app.tick_count(), 1);
}

// ── Full poll cycle ──────────────────────────────────────────

#[test]
fn poll_data_strike_and_repoll_cycle() {
    let config = config_with_url("http://gong.example/poll");
    let mut app = AppService::new(config.clone());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let mut poll = PollClient::new();
    let mut transport = ScriptedTransport::new();
    let ring = RingLatch::new();
    let timeout = config.request_timeout_secs;

    // t=0: first poll tick issues the GET.
    assert!(poll.tick(&mut transport, app.poll_url(), true, 0, timeout, &mut sink));
    assert_eq!(poll.state(), RequestState::InFlight);

    // t=2: server responds with a ring payload, then the request ends.
    transport.push_data(b"  RING\n");
    transport.push_done(200);
    poll.process(&mut transport, &ring, &mut sink);
    assert_eq!(poll.state(), RequestState::Completed);
    assert_eq!(poll.rings_detected(), 1);
    assert!(ring.is_set());

    // Next control tick strikes from the latched ring.
    app.control_tick(&mut hw, &ring, &mut sink);
    assert_eq!(hw.strike_calls, 1);
    assert_eq!(sink.strike_sources(), vec![StrikeSource::Ring]);

    // t=5: the fixed-interval tick starts a fresh request.
    assert!(poll.tick(&mut transport, app.poll_url(), true, 5, timeout, &mut sink));
    assert_eq!(transport.starts, 2);
}

#[test]
fn empty_body_completes_without_ringing() {
    let mut sink = RecordingSink::new();
    let mut poll = PollClient::new();
    let mut transport = ScriptedTransport::new();
    let ring = RingLatch::new();

    assert!(poll.tick(&mut transport, "http://gong.example/poll", true, 0, 60, &mut sink));
    transport.push_data(b" \r\n\t ");
    transport.push_done(200);
    poll.process(&mut transport, &ring, &mut sink);

    assert_eq!(poll.state(), RequestState::Completed);
    assert_eq!(poll.rings_detected(), 0);
    assert!(!ring.is_set());
}

#[test]
fn hung_request_is_aborted_after_timeout() {
    let mut sink = RecordingSink::new();
    let mut poll = PollClient::new();
    let mut transport = ScriptedTransport::new();

    assert!(poll.tick(&mut transport, "http://gong.example/poll", true, 0, 60, &mut sink));

    // Ticks inside the timeout window are suppressed.
    for now in (5..60).step_by(5) {
        assert!(!poll.tick(&mut transport, "http://gong.example/poll", true, now, 60, &mut sink));
    }
    assert_eq!(transport.starts, 1);
    assert_eq!(transport.aborts, 0);

    // Past the deadline the request is abandoned and a new one issued
    // in the same tick.
    assert!(poll.tick(&mut transport, "http://gong.example/poll", true, 65, 60, &mut sink));
    assert_eq!(transport.aborts, 1);
    assert_eq!(transport.starts, 2);
}

#[test]
fn transport_failure_retries_on_next_interval() {
    let mut sink = RecordingSink::new();
    let mut poll = PollClient::new();
    let mut transport = ScriptedTransport::new();

    assert!(poll.tick(&mut transport, "http://gong.example/poll", true, 0, 60, &mut sink));
    transport.push_failed(TransportError::ConnectFailed);
    poll.process(&mut transport, &RingLatch::new(), &mut sink);
    assert_eq!(poll.state(), RequestState::Failed);

    assert!(poll.tick(&mut transport, "http://gong.example/poll", true, 5, 60, &mut sink));
    assert_eq!(transport.starts, 2);
}

#[test]
fn disconnected_link_suppresses_polling() {
    let mut sink = RecordingSink::new();
    let mut poll = PollClient::new();
    let mut transport = ScriptedTransport::new();

    assert!(!poll.tick(&mut transport, "http://gong.example/poll", false, 0, 60, &mut sink));
    assert_eq!(transport.starts, 0);
    assert_eq!(poll.state(), RequestState::Idle);
}
