//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (provisioning
//! portal, tests) that the [`AppService`](super::service::AppService)
//! interprets and acts upon.

use crate::config::MAX_URL_LEN;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Strike the gong immediately (portal test button).
    Strike,

    /// Replace the long-poll endpoint URL (from provisioning).
    /// The new value is persisted on the next save pass.
    SetPollUrl(heapless::String<MAX_URL_LEN>),
}
