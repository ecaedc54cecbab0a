//! Gong strike driver.
//!
//! Runs the fixed timed strike sequence: attach servo, status LED off,
//! swing to the strike angle, hold, return to rest, hold, LED back on,
//! detach.  Blocking for the whole sequence (~750 ms with defaults) —
//! the caller serializes strikes, and nothing else useful happens during
//! a ring anyway.
//!
//! Fire-and-forget hardware: a physically absent servo is undetectable
//! and not reported.

use log::info;

use crate::config::SystemConfig;
use crate::drivers::hw_init;
use crate::drivers::servo::ServoDriver;
use crate::drivers::status_led::StatusLed;

/// Timing/geometry of one strike, snapshotted from [`SystemConfig`].
#[derive(Debug, Clone, Copy)]
pub struct StrikeProfile {
    pub strike_angle_deg: u8,
    pub rest_angle_deg: u8,
    pub strike_hold_ms: u32,
    pub return_hold_ms: u32,
}

impl From<&SystemConfig> for StrikeProfile {
    fn from(cfg: &SystemConfig) -> Self {
        Self {
            strike_angle_deg: cfg.strike_angle_deg,
            rest_angle_deg: cfg.rest_angle_deg,
            strike_hold_ms: cfg.strike_hold_ms,
            return_hold_ms: cfg.return_hold_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GongState {
    Idle,
    Striking,
}

pub struct GongDriver {
    servo: ServoDriver,
    state: GongState,
    strike_count: u32,
}

impl Default for GongDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl GongDriver {
    pub fn new() -> Self {
        Self {
            servo: ServoDriver::new(),
            state: GongState::Idle,
            strike_count: 0,
        }
    }

    /// Run one full strike sequence.  Blocks the caller until the servo
    /// is back at rest and detached.
    pub fn strike(&mut self, led: &mut StatusLed, profile: &StrikeProfile) {
        info!("gong: striking (#{})", self.strike_count + 1);
        self.state = GongState::Striking;

        self.servo.attach();
        led.off();
        self.servo.write_angle(profile.strike_angle_deg);
        hw_init::delay_ms(profile.strike_hold_ms);
        self.servo.write_angle(profile.rest_angle_deg);
        hw_init::delay_ms(profile.return_hold_ms);
        led.on();
        self.servo.detach();

        self.strike_count += 1;
        self.state = GongState::Idle;
    }

    pub fn state(&self) -> GongState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state == GongState::Striking
    }

    pub fn strike_count(&self) -> u32 {
        self.strike_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant_profile() -> StrikeProfile {
        StrikeProfile {
            strike_angle_deg: 180,
            rest_angle_deg: 0,
            strike_hold_ms: 0,
            return_hold_ms: 0,
        }
    }

    #[test]
    fn strike_returns_to_idle_and_counts() {
        let mut gong = GongDriver::new();
        let mut led = StatusLed::new();
        led.on();

        gong.strike(&mut led, &instant_profile());
        assert_eq!(gong.state(), GongState::Idle);
        assert_eq!(gong.strike_count(), 1);
        assert!(led.is_on(), "LED restored after the sequence");
    }

    #[test]
    fn profile_snapshots_config() {
        let cfg = SystemConfig::default();
        let p = StrikeProfile::from(&cfg);
        assert_eq!(p.strike_angle_deg, cfg.strike_angle_deg);
        assert_eq!(p.strike_hold_ms, cfg.strike_hold_ms);
    }
}
