//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) and
//! [`PollClient`](super::poll::PollClient) emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — today that means the serial log.

use super::poll::RequestState;

/// Where a strike request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeSource {
    /// The physical trigger button.
    Trigger,
    /// A ring signal from the long-poll server.
    Ring,
    /// An explicit command (provisioning portal test button).
    Command,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The application service has started.
    Started,

    /// A strike was dispatched; carries the source and the running total.
    GongStruck { source: StrikeSource, total: u32 },

    /// A ring payload was observed on the wire.
    RingDetected,

    /// The poll request state machine moved.
    PollStateChanged {
        from: RequestState,
        to: RequestState,
    },

    /// The poll endpoint URL was replaced at runtime.
    PollUrlUpdated,

    /// The network link changed state.
    ConnectivityChanged { up: bool },
}
