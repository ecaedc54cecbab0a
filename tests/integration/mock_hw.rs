//! Mock hardware adapter for integration tests.
//!
//! Records every strike so tests can assert on the full command history
//! without touching real GPIO/PWM registers.

use std::cell::RefCell;
use std::collections::VecDeque;

use gongbot::app::events::{AppEvent, StrikeSource};
use gongbot::app::ports::{
    ConfigError, ConfigPort, EventSink, GongPort, PollTransport, TransportError, TransportEvent,
    TriggerPort,
};
use gongbot::config::{validate_poll_url, MAX_URL_LEN};

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub strike_calls: u32,
    pub trigger_active: bool,
    pub busy: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            strike_calls: 0,
            trigger_active: false,
            busy: false,
        }
    }

    pub fn press_trigger(&mut self) {
        self.trigger_active = true;
    }

    pub fn release_trigger(&mut self) {
        self.trigger_active = false;
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl GongPort for MockHardware {
    fn strike(&mut self) {
        self.strike_calls += 1;
    }

    fn is_busy(&self) -> bool {
        self.busy
    }
}

impl TriggerPort for MockHardware {
    fn is_active(&self) -> bool {
        self.trigger_active
    }
}

// ── ScriptedTransport ─────────────────────────────────────────

/// Transport whose responses are scripted by the test.
pub struct ScriptedTransport {
    pub queued: VecDeque<TransportEvent>,
    pub starts: u32,
    pub aborts: u32,
    pub fail_next_start: Option<TransportError>,
    in_flight: bool,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            queued: VecDeque::new(),
            starts: 0,
            aborts: 0,
            fail_next_start: None,
            in_flight: false,
        }
    }

    pub fn push_data(&mut self, body: &[u8]) {
        self.queued.push_back(TransportEvent::Data(body.to_vec()));
    }

    pub fn push_done(&mut self, status: u16) {
        self.queued.push_back(TransportEvent::Done { status });
    }

    pub fn push_failed(&mut self, error: TransportError) {
        self.queued.push_back(TransportEvent::Failed(error));
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl PollTransport for ScriptedTransport {
    fn start_get(&mut self, _url: &str, _timeout_secs: u16) -> Result<(), TransportError> {
        if let Some(e) = self.fail_next_start.take() {
            return Err(e);
        }
        if self.in_flight {
            return Err(TransportError::Busy);
        }
        self.in_flight = true;
        self.starts += 1;
        Ok(())
    }

    fn drain_events(&mut self, mut handler: impl FnMut(TransportEvent)) {
        while let Some(event) = self.queued.pop_front() {
            if matches!(
                event,
                TransportEvent::Done { .. } | TransportEvent::Failed(_)
            ) {
                self.in_flight = false;
            }
            handler(event);
        }
    }

    fn abort(&mut self) {
        self.aborts += 1;
        self.in_flight = false;
        self.queued.clear();
    }
}

// ── MockConfigStore ───────────────────────────────────────────

pub struct MockConfigStore {
    saved: RefCell<Option<heapless::String<MAX_URL_LEN>>>,
    pub fail_saves: bool,
}

#[allow(dead_code)]
impl MockConfigStore {
    pub fn new() -> Self {
        Self {
            saved: RefCell::new(None),
            fail_saves: false,
        }
    }

    pub fn saved_url(&self) -> Option<String> {
        self.saved.borrow().as_ref().map(|u| u.as_str().to_owned())
    }
}

impl Default for MockConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigPort for MockConfigStore {
    fn load_poll_url(&self) -> Result<Option<heapless::String<MAX_URL_LEN>>, ConfigError> {
        Ok(self.saved.borrow().clone())
    }

    fn save_poll_url(&self, url: &str) -> Result<(), ConfigError> {
        if self.fail_saves {
            return Err(ConfigError::IoError);
        }
        validate_poll_url(url).map_err(ConfigError::ValidationFailed)?;
        let mut stored = heapless::String::new();
        stored
            .push_str(url)
            .map_err(|()| ConfigError::ValidationFailed("poll URL too long"))?;
        *self.saved.borrow_mut() = Some(stored);
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Strike sources in emission order.
    pub fn strike_sources(&self) -> Vec<StrikeSource> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::GongStruck { source, .. } => Some(*source),
                _ => None,
            })
            .collect()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
