//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the configuration and the trigger/ring arbitration
//! that decides when the gong fires.  All I/O flows through port traits
//! injected at call sites, making the entire service testable with mock
//! adapters.
//!
//! ```text
//!  TriggerPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!  RingLatch   ──▶ │       AppService        │
//!                  │  arbitration · config   │──▶ GongPort
//!                  └────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::{validate_poll_url, SystemConfig};

use super::commands::AppCommand;
use super::events::{AppEvent, StrikeSource};
use super::ports::{ConfigPort, EventSink, GongPort, TriggerPort};
use super::ring::RingLatch;

/// The application service orchestrates trigger arbitration and
/// configuration lifecycle.
pub struct AppService {
    config: SystemConfig,
    strikes_total: u32,
    tick_count: u64,
    config_dirty: bool,
}

impl AppService {
    /// Construct the service from configuration.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            config,
            strikes_total: 0,
            tick_count: 0,
            config_dirty: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started);
        info!(
            "AppService started (poll_url={})",
            if self.config.has_poll_url() {
                self.config.poll_url.as_str()
            } else {
                "<unset>"
            }
        );
    }

    // ── Per-tick arbitration ──────────────────────────────────

    /// One control iteration: physical trigger first, latched ring second.
    ///
    /// The trigger is sampled fresh each tick and always wins; a held
    /// trigger therefore re-strikes continuously, and a ring latched in
    /// the same iteration survives untouched until the trigger releases.
    /// The `hw` parameter satisfies **both** [`TriggerPort`] and
    /// [`GongPort`] — this avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    pub fn control_tick(
        &mut self,
        hw: &mut (impl TriggerPort + GongPort),
        ring: &RingLatch,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        if hw.is_active() {
            self.dispatch_strike(StrikeSource::Trigger, hw, sink);
        } else if ring.consume() {
            self.dispatch_strike(StrikeSource::Ring, hw, sink);
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (from the portal or tests).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl GongPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::Strike => {
                self.dispatch_strike(StrikeSource::Command, hw, sink);
            }
            AppCommand::SetPollUrl(url) => {
                if let Err(msg) = validate_poll_url(&url) {
                    warn!("rejecting poll URL update: {}", msg);
                    return;
                }
                self.config.poll_url = url;
                self.config_dirty = true;
                sink.emit(&AppEvent::PollUrlUpdated);
                info!("poll URL updated: {}", self.config.poll_url);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Current poll endpoint ("" when unconfigured).
    pub fn poll_url(&self) -> &str {
        &self.config.poll_url
    }

    pub fn strikes_total(&self) -> u32 {
        self.strikes_total
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }

    // ── Config persistence ────────────────────────────────────

    /// Persist the poll URL if it changed since the last save.
    /// Returns `true` if a save happened.
    pub fn save_if_dirty(&mut self, store: &impl ConfigPort) -> bool {
        if !self.config_dirty {
            return false;
        }
        match store.save_poll_url(&self.config.poll_url) {
            Ok(()) => {
                self.config_dirty = false;
                info!("poll URL persisted");
                true
            }
            Err(e) => {
                warn!("poll URL save failed: {}", e);
                false
            }
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn dispatch_strike(
        &mut self,
        source: StrikeSource,
        hw: &mut impl GongPort,
        sink: &mut impl EventSink,
    ) {
        // strike() blocks for the full sequence; the single-loop caller
        // serializes dispatches, so no re-entrancy guard is needed here.
        hw.strike();
        self.strikes_total += 1;
        sink.emit(&AppEvent::GongStruck {
            source,
            total: self.strikes_total,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullSink;
    impl EventSink for NullSink {
        fn emit(&mut self, _event: &AppEvent) {}
    }

    struct NoHw;
    impl GongPort for NoHw {
        fn strike(&mut self) {}
        fn is_busy(&self) -> bool {
            false
        }
    }

    #[test]
    fn set_poll_url_marks_dirty_and_validates() {
        let mut app = AppService::new(SystemConfig::default());
        let mut hw = NoHw;

        let mut bad = heapless::String::new();
        bad.push_str("not-a-url").unwrap();
        app.handle_command(AppCommand::SetPollUrl(bad), &mut hw, &mut NullSink);
        assert!(!app.is_config_dirty());
        assert_eq!(app.poll_url(), "");

        let mut good = heapless::String::new();
        good.push_str("http://example.com/poll").unwrap();
        app.handle_command(AppCommand::SetPollUrl(good), &mut hw, &mut NullSink);
        assert!(app.is_config_dirty());
        assert_eq!(app.poll_url(), "http://example.com/poll");
    }

    #[test]
    fn strike_command_bumps_total() {
        let mut app = AppService::new(SystemConfig::default());
        let mut hw = NoHw;
        app.handle_command(AppCommand::Strike, &mut hw, &mut NullSink);
        app.handle_command(AppCommand::Strike, &mut hw, &mut NullSink);
        assert_eq!(app.strikes_total(), 2);
    }
}
