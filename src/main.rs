//! Gongbot Firmware — Main Entry Point
//!
//! Hexagonal architecture with event-driven execution.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  HardwareAdapter    HttpTransport   NvsConfigStore           │
//! │  (Gong+Trigger)     (PollTransport) (ConfigPort)             │
//! │  WifiAdapter        PortalAdapter   LogEventSink             │
//! │  (Connectivity)     (Provisioning)  (EventSink)              │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ────────────────        │
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────────┐    │
//! │  │            AppService + PollClient (pure logic)      │    │
//! │  │  trigger arbitration · ring latch · poll state       │    │
//! │  └──────────────────────────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod config;
mod events;
mod pins;

pub mod app;
mod adapters;
mod drivers;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{info, warn};

use adapters::hardware::HardwareAdapter;
use adapters::http::HttpTransport;
use adapters::log_sink::LogEventSink;
use adapters::nvs::NvsConfigStore;
use adapters::portal::{PortalAdapter, ProvisioningPort};
use adapters::time::UptimeClock;
use adapters::wifi::{ConnectivityPort, WifiAdapter};
use app::commands::AppCommand;
use app::events::AppEvent;
use app::ports::{ConfigPort, EventSink};
use app::poll::PollClient;
use app::ring::RingLatch;
use app::service::AppService;
use config::SystemConfig;
use drivers::gong::{GongDriver, StrikeProfile};
use drivers::status_led::StatusLed;
use drivers::trigger::TriggerInput;
use events::Event;

/// SSID of the open provisioning access point.
const PORTAL_AP_SSID: &str = "Gongbot";

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Gongbot v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    let watchdog = drivers::watchdog::Watchdog::new();
    let clock = UptimeClock::new();

    // ── 3. Load config from NVS (or defaults) ─────────────────
    let store = NvsConfigStore::new()
        .map_err(|e| anyhow::anyhow!("NVS init failed: {}", e))?;
    let mut config = SystemConfig::default();
    match store.load_poll_url() {
        Ok(Some(url)) => {
            info!("Config: poll URL loaded ({} bytes)", url.len());
            config.poll_url = url;
        }
        Ok(None) => info!("Config: no poll URL stored yet"),
        Err(e) => warn!("Config: load failed ({}), using defaults", e),
    }

    // ── 4. Construct adapters ─────────────────────────────────
    let mut hw = HardwareAdapter::new(
        GongDriver::new(),
        TriggerInput::new(pins::TRIGGER_GPIO),
        StatusLed::new(),
        StrikeProfile::from(&config),
    );
    // LED lit = idle; the strike sequence blanks it while the arm swings.
    hw.led().on();

    #[cfg(target_os = "espidf")]
    let mut wifi = {
        let peripherals = esp_idf_svc::hal::peripherals::Peripherals::take()?;
        let sysloop = esp_idf_svc::eventloop::EspSystemEventLoop::take()?;
        let nvs_part = esp_idf_svc::nvs::EspDefaultNvsPartition::take()?;
        WifiAdapter::new(peripherals.modem, sysloop, nvs_part)?
    };
    #[cfg(not(target_os = "espidf"))]
    let mut wifi = WifiAdapter::new();

    let mut transport = HttpTransport::new();
    let mut portal = PortalAdapter::new();
    let mut log_sink = LogEventSink::new();

    // ── 5. Construct app service ──────────────────────────────
    let ring = RingLatch::new();
    let mut poll = PollClient::new();
    let mut app = AppService::new(config.clone());
    app.start(&mut log_sink);

    // ── 6. Provisioning decision ──────────────────────────────
    //
    // Portal mode when the trigger is held through power-up, or when the
    // device has nothing to run with (no URL, or no saved WiFi creds).
    let have_creds = wifi.load_saved_credentials();
    let mut portal_deadline: Option<u64> = None;

    if hw.trigger_held_at_boot() || !app.config().has_poll_url() || !have_creds {
        if hw.trigger_held_at_boot() {
            info!("Boot: trigger held — entering setup mode");
        } else {
            info!("Boot: not provisioned — entering setup mode");
        }
        if let Err(e) = wifi.start_ap(PORTAL_AP_SSID) {
            warn!("Setup AP failed ({}), continuing offline", e);
        } else {
            portal.start();
            portal_deadline =
                Some(clock.uptime_secs() + u64::from(config.portal_timeout_secs));
        }
    } else if let Err(e) = wifi.connect() {
        // poll() retries with backoff from here on.
        warn!("WiFi: initial connect failed ({})", e);
    }

    drivers::hw_timer::start_timers(
        config.control_loop_interval_ms,
        config.poll_interval_secs,
    );

    info!("System ready. Entering event loop.");

    // ── 7. Event loop ─────────────────────────────────────────
    #[cfg(not(target_os = "espidf"))]
    let mut sim_elapsed_ms: u64 = 0;

    loop {
        // Simulate timer interrupts via sleep on non-espidf targets.
        // On real hardware, the CPU executes WFI and wakes when a
        // hardware timer fires.
        #[cfg(not(target_os = "espidf"))]
        {
            std::thread::sleep(std::time::Duration::from_millis(u64::from(
                config.control_loop_interval_ms,
            )));
            events::push_event(Event::ControlTick);
            sim_elapsed_ms += u64::from(config.control_loop_interval_ms);
            if sim_elapsed_ms >= u64::from(config.poll_interval_secs) * 1000 {
                sim_elapsed_ms = 0;
                events::push_event(Event::PollTick);
            }
        }

        // Process all pending timer / connectivity events.
        events::drain_events(|event| match event {
            Event::ControlTick => {
                app.control_tick(&mut hw, &ring, &mut log_sink);
            }
            Event::PollTick => {
                let connected = wifi.is_connected();
                poll.tick(
                    &mut transport,
                    app.poll_url(),
                    connected,
                    clock.uptime_secs(),
                    app.config().request_timeout_secs,
                    &mut log_sink,
                );
            }
            Event::ConnectivityUp => {
                log_sink.emit(&AppEvent::ConnectivityChanged { up: true });
            }
            Event::ConnectivityLost => {
                log_sink.emit(&AppEvent::ConnectivityChanged { up: false });
            }
        });

        // Drain transport progress every iteration so a ring payload is
        // latched the moment the worker delivers it.
        poll.process(&mut transport, &ring, &mut log_sink);

        // Provisioning portal: apply a submitted form, honor the test
        // button, enforce the session timeout.
        if portal.is_active() {
            if portal.take_pending_strike() {
                app.handle_command(AppCommand::Strike, &mut hw, &mut log_sink);
            }

            if let Some(sub) = portal.take_pending_submission() {
                info!("Provisioning: received settings for '{}'", sub.ssid);
                app.handle_command(
                    AppCommand::SetPollUrl(sub.poll_url),
                    &mut hw,
                    &mut log_sink,
                );
                match wifi.set_credentials(sub.ssid.as_str(), sub.password.as_str()) {
                    Ok(()) => {
                        portal.stop();
                        portal_deadline = None;
                        if let Err(e) = wifi.connect() {
                            warn!("Provisioning: WiFi connect failed ({})", e);
                        }
                    }
                    Err(e) => warn!("Provisioning: invalid credentials — {}", e),
                }
            }

            if let Some(deadline) = portal_deadline {
                if clock.uptime_secs() >= deadline {
                    warn!("Portal: session timed out, restarting");
                    #[cfg(target_os = "espidf")]
                    unsafe {
                        esp_idf_svc::sys::esp_restart();
                    }
                    #[cfg(not(target_os = "espidf"))]
                    {
                        portal.stop();
                        portal_deadline = None;
                    }
                }
            }
        }

        // WiFi reconnection poll (exponential backoff).
        wifi.poll(clock.uptime_secs());

        // Persist a changed poll URL.
        if app.save_if_dirty(&store) {
            info!("Config: poll URL persisted");
        }

        // Feed watchdog on every iteration.
        watchdog.feed();
    }
}
