//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).  A future MQTT or
//! webhook adapter would implement the same trait.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => {
                info!("START | gongbot up");
            }
            AppEvent::GongStruck { source, total } => {
                info!("GONG  | source={:?} total={}", source, total);
            }
            AppEvent::RingDetected => {
                info!("RING  | payload received");
            }
            AppEvent::PollStateChanged { from, to } => {
                info!("POLL  | {:?} -> {:?}", from, to);
            }
            AppEvent::PollUrlUpdated => {
                info!("CONF  | poll URL updated");
            }
            AppEvent::ConnectivityChanged { up } => {
                info!("WIFI  | {}", if *up { "connected" } else { "lost" });
            }
        }
    }
}
