//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the gong driver, trigger input, and status LED, exposing them
//! through [`GongPort`] and [`TriggerPort`].  This is the only module in
//! the system that touches actual actuator hardware.  On non-espidf
//! targets, the underlying drivers use cfg-gated simulation stubs.

use crate::app::ports::{GongPort, TriggerPort};
use crate::drivers::gong::{GongDriver, StrikeProfile};
use crate::drivers::status_led::StatusLed;
use crate::drivers::trigger::TriggerInput;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    gong: GongDriver,
    trigger: TriggerInput,
    led: StatusLed,
    profile: StrikeProfile,
}

impl HardwareAdapter {
    pub fn new(
        gong: GongDriver,
        trigger: TriggerInput,
        led: StatusLed,
        profile: StrikeProfile,
    ) -> Self {
        Self {
            gong,
            trigger,
            led,
            profile,
        }
    }

    /// Boot-time check: trigger held during power-up selects the
    /// provisioning portal instead of auto-connect.
    pub fn trigger_held_at_boot(&self) -> bool {
        self.trigger.is_active()
    }

    pub fn led(&mut self) -> &mut StatusLed {
        &mut self.led
    }

    pub fn strike_count(&self) -> u32 {
        self.gong.strike_count()
    }
}

// ── GongPort implementation ───────────────────────────────────

impl GongPort for HardwareAdapter {
    fn strike(&mut self) {
        self.gong.strike(&mut self.led, &self.profile);
    }

    fn is_busy(&self) -> bool {
        self.gong.is_busy()
    }
}

// ── TriggerPort implementation ────────────────────────────────

impl TriggerPort for HardwareAdapter {
    fn is_active(&self) -> bool {
        self.trigger.is_active()
    }
}
