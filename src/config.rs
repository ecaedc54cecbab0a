//! System configuration parameters
//!
//! All tunable parameters for the Gongbot device.  The poll URL is the only
//! field persisted to NVS (length-prefixed region, see `adapters::nvs`);
//! everything else ships as compile-time defaults and can be overridden at
//! runtime via the provisioning portal.

use serde::{Deserialize, Serialize};

/// Persisted-storage bound on the poll URL (one length byte + raw bytes
/// inside a 256-byte region, so the practical cap is well below 254).
pub const MAX_URL_LEN: usize = 128;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Long poll ---
    /// Long-poll endpoint URL.  Empty = unconfigured (polling suppressed,
    /// device falls back to provisioning).
    pub poll_url: heapless::String<MAX_URL_LEN>,
    /// Fixed interval between poll attempts (seconds).
    pub poll_interval_secs: u32,
    /// Hard completion timeout per in-flight request (seconds).
    pub request_timeout_secs: u16,

    // --- Strike sequence ---
    /// Servo angle for the strike position (degrees).
    pub strike_angle_deg: u8,
    /// Servo angle for the rest position (degrees).
    pub rest_angle_deg: u8,
    /// Hold time at the strike position (milliseconds).
    pub strike_hold_ms: u32,
    /// Hold time on the return travel before detaching (milliseconds).
    pub return_hold_ms: u32,

    // --- Timing ---
    /// Control loop interval (milliseconds).  Also the effective trigger
    /// debounce window.
    pub control_loop_interval_ms: u32,
    /// Provisioning portal timeout after boot (seconds).
    pub portal_timeout_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Long poll
            poll_url: heapless::String::new(),
            poll_interval_secs: 5,
            request_timeout_secs: 60,

            // Strike sequence
            strike_angle_deg: 180,
            rest_angle_deg: 0,
            strike_hold_ms: 250,
            return_hold_ms: 500,

            // Timing
            control_loop_interval_ms: 20, // 50 Hz — responsiveness-first
            portal_timeout_secs: 600,     // 10 min portal after power loss
        }
    }
}

impl SystemConfig {
    /// Whether a usable poll endpoint is configured.
    pub fn has_poll_url(&self) -> bool {
        !self.poll_url.is_empty()
    }
}

/// Validate a candidate poll URL before it is applied or persisted.
///
/// Returns a static description of the first violated constraint.
pub fn validate_poll_url(url: &str) -> Result<(), &'static str> {
    if url.is_empty() {
        return Err("poll URL is empty");
    }
    if url.len() > MAX_URL_LEN {
        return Err("poll URL exceeds 128 bytes");
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err("poll URL must start with http:// or https://");
    }
    Ok(())
}
