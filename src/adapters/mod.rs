//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements       | Connects to               |
//! |------------|------------------|---------------------------|
//! | `hardware` | GongPort         | LEDC servo + status LED   |
//! |            | TriggerPort      | ESP32 GPIO (active-low)   |
//! | `http`     | PollTransport    | ESP-IDF HTTP client       |
//! | `log_sink` | EventSink        | Serial log output         |
//! | `nvs`      | ConfigPort       | NVS / in-memory store     |
//! | `portal`   | ProvisioningPort | Setup-AP HTTP form server |
//! | `time`     | —                | ESP32 system timer        |
//! | `wifi`     | ConnectivityPort | ESP-IDF WiFi STA/AP       |

pub mod hardware;
pub mod http;
pub mod log_sink;
pub mod nvs;
pub mod portal;
pub mod time;
pub mod wifi;
