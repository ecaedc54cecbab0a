//! Long-poll client state machine.
//!
//! Maintains a fixed-interval poll cycle against the configured endpoint
//! and latches a ring signal as soon as any response payload is observed,
//! without waiting for the request to complete.
//!
//! Ring detection keys off payload bytes, never the final status code:
//! if something goes wrong after chunking has started, the transport can
//! still report a success status, so correctness depends on watching the
//! data path.
//!
//! Failure semantics: network errors, non-2xx status, and timeouts are all
//! non-fatal.  The worst outcome is a missed or delayed ring, recovered by
//! the next periodic tick.  No backoff — the fixed interval already bounds
//! server load.

use log::{debug, info, warn};

use super::ports::{EventSink, PollTransport, TransportEvent};
use super::ring::RingLatch;
use crate::app::events::AppEvent;

/// Lifecycle of the single poll request slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// No request has been issued yet.
    Idle,
    /// A GET is in flight; new attempts are suppressed.
    InFlight,
    /// The last request finished cleanly (any status code).
    Completed,
    /// The last request errored out or was forcibly finalized.
    Failed,
}

impl RequestState {
    /// Whether a new poll attempt may be issued from this state.
    fn can_start(self) -> bool {
        !matches!(self, Self::InFlight)
    }
}

/// The long-poll client.  Owns request pacing and the per-request timeout;
/// the transport owns sockets and buffering.
pub struct PollClient {
    state: RequestState,
    /// Monotonic second the in-flight request was started at.
    started_at_secs: u64,
    requests_started: u32,
    rings_detected: u32,
}

impl Default for PollClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PollClient {
    pub fn new() -> Self {
        Self {
            state: RequestState::Idle,
            started_at_secs: 0,
            requests_started: 0,
            rings_detected: 0,
        }
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Total GET requests issued since boot.
    pub fn requests_started(&self) -> u32 {
        self.requests_started
    }

    /// Total ring payloads observed since boot.
    pub fn rings_detected(&self) -> u32 {
        self.rings_detected
    }

    /// Periodic poll attempt, driven by the 5 s poll timer.
    ///
    /// No-op unless the link is up AND no request is in flight.  A hung
    /// request past `timeout_secs` is forcibly finalized first, so it can
    /// never wedge the cycle.  Returns `true` if a new GET was issued.
    pub fn tick(
        &mut self,
        transport: &mut impl PollTransport,
        url: &str,
        connected: bool,
        now_secs: u64,
        timeout_secs: u16,
        sink: &mut impl EventSink,
    ) -> bool {
        // Hard completion timeout: abandon the request and free the slot.
        if self.state == RequestState::InFlight
            && now_secs.saturating_sub(self.started_at_secs) >= u64::from(timeout_secs)
        {
            warn!(
                "poll: request exceeded {}s timeout, abandoning",
                timeout_secs
            );
            transport.abort();
            self.transition(RequestState::Failed, sink);
        }

        if !connected || url.is_empty() {
            return false;
        }

        if !self.state.can_start() {
            return false;
        }

        info!("poll: GET {}", url);
        match transport.start_get(url, timeout_secs) {
            Ok(()) => {
                self.started_at_secs = now_secs;
                self.requests_started += 1;
                self.transition(RequestState::InFlight, sink);
                true
            }
            Err(e) => {
                // Recoverable: the attempt is abandoned and the next tick
                // retries at the fixed interval.
                warn!("poll: could not start request ({})", e);
                false
            }
        }
    }

    /// Drain transport progress.  Called every main-loop iteration so ring
    /// payloads are observed promptly, independent of the tick cadence.
    pub fn process(
        &mut self,
        transport: &mut impl PollTransport,
        ring: &RingLatch,
        sink: &mut impl EventSink,
    ) {
        let mut observed = Vec::new();
        transport.drain_events(|event| observed.push(event));

        for event in observed {
            match event {
                TransportEvent::Data(bytes) => {
                    if self.state != RequestState::InFlight {
                        debug!("poll: {} stale body bytes ignored", bytes.len());
                        continue;
                    }
                    let text = String::from_utf8_lossy(&bytes);
                    let trimmed = text.trim();
                    debug!(
                        "poll: {} body bytes received: {:?}",
                        bytes.len(),
                        trimmed
                    );
                    if !trimmed.is_empty() {
                        self.rings_detected += 1;
                        ring.set();
                        sink.emit(&AppEvent::RingDetected);
                    }
                }
                TransportEvent::Done { status } => {
                    // Status is diagnostics only; ring detection already
                    // happened on the data path.
                    info!("poll: request done, HTTP {}", status);
                    self.transition(RequestState::Completed, sink);
                }
                TransportEvent::Failed(e) => {
                    warn!("poll: request failed ({})", e);
                    self.transition(RequestState::Failed, sink);
                }
            }
        }
    }

    fn transition(&mut self, to: RequestState, sink: &mut impl EventSink) {
        if self.state != to {
            sink.emit(&AppEvent::PollStateChanged {
                from: self.state,
                to,
            });
            self.state = to;
        }
    }
}
