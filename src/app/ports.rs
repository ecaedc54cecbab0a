//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService / PollClient (domain)
//! ```
//!
//! Driven adapters (gong hardware, trigger input, HTTP transport, storage)
//! implement these traits.  The domain core consumes them via generics, so
//! it never touches hardware or sockets directly — which is what lets the
//! whole control path run under host-side tests with mock adapters.

use crate::config::MAX_URL_LEN;

// ───────────────────────────────────────────────────────────────
// Gong port (driven adapter: domain → actuator)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to strike the gong.
pub trait GongPort {
    /// Run the full timed strike sequence.  Blocks the caller for the
    /// whole duration (hundreds of milliseconds); the caller serializes
    /// calls, so implementations need not be re-entrant.
    fn strike(&mut self);

    /// Whether a strike sequence is currently executing.  Always `false`
    /// between calls given the blocking contract; exposed for telemetry.
    fn is_busy(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Trigger port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: instantaneous physical trigger level.
///
/// Level-sensed, never latched — the service samples it fresh each
/// control tick, so the tick period is the effective debounce.
pub trait TriggerPort {
    fn is_active(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Poll transport port (driven adapter: domain ↔ HTTP client)
// ───────────────────────────────────────────────────────────────

/// Events surfaced by an in-flight long-poll request.
///
/// `Data` may arrive multiple times per request (the server streams or
/// chunks its response), and may precede `Done` by an arbitrary margin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A chunk of response body bytes arrived.
    Data(Vec<u8>),
    /// The request completed; carries the final HTTP status code.
    Done { status: u16 },
    /// The request failed before completing.
    Failed(TransportError),
}

/// Errors from [`PollTransport`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The URL could not be parsed or is unsupported.
    InvalidUrl,
    /// A request is already in flight on this transport.
    Busy,
    /// TCP connect / TLS handshake failed.
    ConnectFailed,
    /// The connection dropped mid-response.
    Io,
    /// The per-request completion timeout elapsed.
    Timeout,
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidUrl => write!(f, "invalid URL"),
            Self::Busy => write!(f, "request already in flight"),
            Self::ConnectFailed => write!(f, "connect failed"),
            Self::Io => write!(f, "I/O error"),
            Self::Timeout => write!(f, "request timed out"),
        }
    }
}

/// Minimal non-blocking HTTP GET contract consumed by the poll client.
///
/// The transport owns connection lifecycle and buffering; the client owns
/// request pacing and timeout policy.  Implementations deliver progress
/// through [`drain_events`](Self::drain_events) so the main loop never
/// blocks on network I/O.
pub trait PollTransport {
    /// Begin a GET against `url`.  Returns immediately; progress arrives
    /// via `drain_events`.  `timeout_secs` bounds the underlying socket
    /// reads so an abandoned request eventually unwinds.
    fn start_get(&mut self, url: &str, timeout_secs: u16) -> Result<(), TransportError>;

    /// Drain all pending transport events into `handler`, in order.
    fn drain_events(&mut self, handler: impl FnMut(TransportEvent));

    /// Abandon the in-flight request, if any.  Events already queued may
    /// still be delivered; events produced after the abort are discarded.
    fn abort(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the poll endpoint URL.
///
/// The persisted form is a 256-byte region: one length byte (0–254 valid,
/// 255 = uninitialized sentinel) followed by that many raw bytes.
pub trait ConfigPort {
    /// Load the stored URL.  `Ok(None)` means "no configuration" — the
    /// sentinel byte or an out-of-range length was found.  Never returns
    /// garbage from uninitialized storage.
    fn load_poll_url(&self) -> Result<Option<heapless::String<MAX_URL_LEN>>, ConfigError>;

    /// Validate and persist a URL.  Rejects empty or over-long values.
    fn save_poll_url(&self, url: &str) -> Result<(), ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A candidate URL failed validation; the message names the constraint.
    ValidationFailed(&'static str),
    /// Underlying storage rejected the write.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log today;
/// a status endpoint tomorrow).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
