//! On-board status LED driver.
//!
//! Single digital output.  Held on while the device is up and connected;
//! the gong driver blanks it for the duration of a strike.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the GPIO via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

pub struct StatusLed {
    lit: bool,
}

impl Default for StatusLed {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusLed {
    pub fn new() -> Self {
        Self { lit: false }
    }

    pub fn on(&mut self) {
        hw_init::gpio_write(pins::LED_GPIO, true);
        self.lit = true;
    }

    pub fn off(&mut self) {
        hw_init::gpio_write(pins::LED_GPIO, false);
        self.lit = false;
    }

    pub fn is_on(&self) -> bool {
        self.lit
    }
}
