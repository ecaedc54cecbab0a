//! Physical trigger input.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up: a LOW level means pressed.
//! Deliberately level-sensed rather than edge/ISR driven — the control
//! loop samples it every tick, so the tick period is the effective
//! debounce window and a held trigger keeps re-firing.  This is a
//! responsiveness-first input, not a pulse-clean one.
//!
//! The same pin doubles as the boot-mode selector: held LOW while the
//! device powers up, it requests the provisioning portal instead of
//! auto-connect.

use crate::drivers::hw_init;

pub struct TriggerInput {
    gpio: i32,
}

impl TriggerInput {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    /// GPIO pin this trigger is attached to.
    pub fn gpio(&self) -> i32 {
        self.gpio
    }

    /// Instantaneous level read; `true` while the switch is held.
    pub fn is_active(&self) -> bool {
        !hw_init::gpio_read(self.gpio)
    }
}
