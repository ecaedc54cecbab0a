//! GPIO / peripheral pin assignments for the Gongbot board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Status LED (single on-board LED, active HIGH after init)
// ---------------------------------------------------------------------------

/// Digital output: on-board status LED.  Held HIGH while idle, driven LOW
/// for the duration of a gong strike.
pub const LED_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Physical trigger (momentary button, active-low with pull-up)
// ---------------------------------------------------------------------------

/// Digital input: momentary trigger button.  LOW = pressed.
/// Also sampled once at boot: held LOW selects provisioning mode.
pub const TRIGGER_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Gong servo (standard hobby servo on LEDC PWM)
// ---------------------------------------------------------------------------

/// LEDC PWM output driving the strike servo signal line.
pub const SERVO_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// Hobby-servo frame rate (one pulse every 20 ms).
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// LEDC timer resolution (bits).  14-bit gives ~1.2 µs pulse granularity
/// at 50 Hz, comfortably below servo deadband.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;

/// Shortest servo pulse (0°), in microseconds.
pub const SERVO_MIN_PULSE_US: u32 = 500;
/// Longest servo pulse (180°), in microseconds.
pub const SERVO_MAX_PULSE_US: u32 = 2_500;
