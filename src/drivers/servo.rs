//! Gong servo driver (standard hobby servo on LEDC PWM).
//!
//! Angle commands are converted to pulse widths (500–2500 µs across
//! 0–180°) and written as 14-bit LEDC duty values.  The servo is
//! "attached" only while a strike is in progress; detaching stops the
//! pulse train so the horn holds no torque at rest.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the LEDC channel via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

pub struct ServoDriver {
    attached: bool,
    angle_deg: u8,
}

impl Default for ServoDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ServoDriver {
    pub fn new() -> Self {
        Self {
            attached: false,
            angle_deg: 0,
        }
    }

    /// Start the pulse train at the current angle.
    pub fn attach(&mut self) {
        self.attached = true;
        hw_init::ledc_set(hw_init::LEDC_CH_SERVO, angle_to_duty(self.angle_deg));
    }

    /// Stop the pulse train, idling the signal line LOW.
    pub fn detach(&mut self) {
        hw_init::ledc_stop(hw_init::LEDC_CH_SERVO);
        self.attached = false;
    }

    /// Command an angle (clamped to 180°).  No-op on the wire unless
    /// attached; the angle is still recorded for the next attach.
    pub fn write_angle(&mut self, angle_deg: u8) {
        self.angle_deg = angle_deg.min(180);
        if self.attached {
            hw_init::ledc_set(hw_init::LEDC_CH_SERVO, angle_to_duty(self.angle_deg));
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn current_angle(&self) -> u8 {
        self.angle_deg
    }
}

/// Convert an angle to a 14-bit LEDC duty value at the 50 Hz frame rate.
fn angle_to_duty(angle_deg: u8) -> u32 {
    let span_us = pins::SERVO_MAX_PULSE_US - pins::SERVO_MIN_PULSE_US;
    let pulse_us = pins::SERVO_MIN_PULSE_US + span_us * u32::from(angle_deg.min(180)) / 180;
    let frame_us = 1_000_000 / pins::SERVO_PWM_FREQ_HZ;
    let max_duty = (1u32 << pins::SERVO_PWM_RESOLUTION_BITS) - 1;
    pulse_us * max_duty / frame_us
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duty_endpoint_pulse_widths() {
        // 500 µs of a 20 ms frame ≈ 2.5% of 16383 ≈ 409.
        assert_eq!(angle_to_duty(0), 409);
        // 2500 µs ≈ 12.5% ≈ 2047.
        assert_eq!(angle_to_duty(180), 2047);
    }

    #[test]
    fn duty_is_monotonic_in_angle() {
        let mut last = 0;
        for angle in 0..=180 {
            let duty = angle_to_duty(angle);
            assert!(duty >= last, "duty must not decrease at {angle}°");
            last = duty;
        }
    }

    #[test]
    fn angle_clamped_to_servo_range() {
        let mut servo = ServoDriver::new();
        servo.write_angle(250);
        assert_eq!(servo.current_angle(), 180);
    }

    #[test]
    fn attach_detach_lifecycle() {
        let mut servo = ServoDriver::new();
        assert!(!servo.is_attached());
        servo.attach();
        assert!(servo.is_attached());
        servo.detach();
        assert!(!servo.is_attached());
    }
}
