//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod gong;
pub mod hw_init;
pub mod hw_timer;
pub mod servo;
pub mod status_led;
pub mod trigger;
pub mod watchdog;
