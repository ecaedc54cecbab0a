//! Captive-portal provisioning adapter.
//!
//! Implements [`ProvisioningPort`] — the collaborator that supplies WiFi
//! credentials and the long-poll URL on first run (or when the trigger is
//! held at boot).  The core never sees HTTP forms; it only consumes the
//! completed submission via [`take_pending_submission`].
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: a minimal `EspHttpServer` on the
//!   provisioning AP serving one form page.
//! - **all other targets**: submissions are injected directly by tests.
//!
//! [`take_pending_submission`]: ProvisioningPort::take_pending_submission

use log::info;

use crate::config::MAX_URL_LEN;

#[cfg(target_os = "espidf")]
use std::sync::{Arc, Mutex};

/// A completed provisioning form.
#[derive(Debug, Clone, Default)]
pub struct PortalSubmission {
    pub ssid: heapless::String<32>,
    pub password: heapless::String<64>,
    pub poll_url: heapless::String<MAX_URL_LEN>,
}

pub trait ProvisioningPort {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_active(&self) -> bool;

    /// Take the submitted credentials + URL, if the form was posted.
    /// Consuming — a second call returns `None`.
    fn take_pending_submission(&mut self) -> Option<PortalSubmission>;

    /// Take a pending "test gong" request from the portal page.
    fn take_pending_strike(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Form parsing (pure, unit-testable)
// ───────────────────────────────────────────────────────────────

/// Extract and percent-decode a field from a urlencoded form body.
fn form_value(body: &str, key: &str) -> Option<String> {
    for pair in body.split('&') {
        // Skip malformed pairs (e.g. a trailing '&') rather than
        // rejecting the whole submission.
        let Some((k, v)) = pair.split_once('=') else {
            continue;
        };
        if k == key {
            return Some(percent_decode(v));
        }
    }
    None
}

fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' => {
                if let Some(Ok(hex)) = bytes.get(i + 1..i + 3).map(core::str::from_utf8) {
                    if let Ok(b) = u8::from_str_radix(hex, 16) {
                        out.push(b);
                        i += 3;
                        continue;
                    }
                }
                out.push(b'%');
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn submission_from_form(body: &str) -> Option<PortalSubmission> {
    let ssid = form_value(body, "ssid")?;
    let password = form_value(body, "password").unwrap_or_default();
    let poll_url = form_value(body, "poll_url")?;

    let mut sub = PortalSubmission::default();
    sub.ssid.push_str(&ssid).ok()?;
    sub.password.push_str(&password).ok()?;
    sub.poll_url.push_str(&poll_url).ok()?;
    Some(sub)
}

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
#[derive(Default)]
struct PortalShared {
    submission: Option<PortalSubmission>,
    strike_requested: bool,
}

pub struct PortalAdapter {
    active: bool,
    #[cfg(target_os = "espidf")]
    shared: Arc<Mutex<PortalShared>>,
    #[cfg(target_os = "espidf")]
    server: Option<esp_idf_svc::http::server::EspHttpServer<'static>>,
    #[cfg(not(target_os = "espidf"))]
    pending: Option<PortalSubmission>,
    #[cfg(not(target_os = "espidf"))]
    strike_requested: bool,
}

impl PortalAdapter {
    pub fn new() -> Self {
        Self {
            active: false,
            #[cfg(target_os = "espidf")]
            shared: Arc::new(Mutex::new(PortalShared::default())),
            #[cfg(target_os = "espidf")]
            server: None,
            #[cfg(not(target_os = "espidf"))]
            pending: None,
            #[cfg(not(target_os = "espidf"))]
            strike_requested: false,
        }
    }

    /// Test hook: inject a completed form (host targets only).
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_submit(&mut self, ssid: &str, password: &str, poll_url: &str) {
        let body = format!(
            "ssid={}&password={}&poll_url={}",
            ssid, password, poll_url
        );
        self.pending = submission_from_form(&body);
    }

    /// Test hook: simulate the portal's "test gong" button.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_press_test(&mut self) {
        self.strike_requested = true;
    }
}

impl Default for PortalAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "espidf")]
const PORTAL_PAGE: &str = r#"<!doctype html>
<html><head><meta charset="utf-8"><title>Gongbot Setup</title></head>
<body><h1>Gongbot Setup</h1>
<form method="post" action="/save">
  <label>WiFi SSID <input name="ssid" maxlength="32"></label><br>
  <label>Password <input name="password" type="password" maxlength="64"></label><br>
  <label>Long Poll URL <input name="poll_url" maxlength="128"
      placeholder="http://my.longpoll/unset"></label><br>
  <button type="submit">Save</button>
</form>
<form method="post" action="/strike"><button type="submit">Test gong</button></form>
</body></html>"#;

impl ProvisioningPort for PortalAdapter {
    #[cfg(target_os = "espidf")]
    fn start(&mut self) {
        use embedded_svc::http::Method;
        use embedded_svc::io::{Read, Write};
        use esp_idf_svc::http::server::{Configuration, EspHttpServer};

        if self.active {
            return;
        }

        let mut server = match EspHttpServer::new(&Configuration::default()) {
            Ok(s) => s,
            Err(e) => {
                log::error!("portal: HTTP server start failed ({})", e);
                return;
            }
        };

        let page_result = server.fn_handler("/", Method::Get, |req| {
            let mut resp = req.into_ok_response()?;
            resp.write_all(PORTAL_PAGE.as_bytes())?;
            Ok::<(), anyhow::Error>(())
        });

        let shared = Arc::clone(&self.shared);
        let save_result = server.fn_handler("/save", Method::Post, move |mut req| {
            let mut body = [0u8; 512];
            let len = req.read(&mut body)?;
            let text = core::str::from_utf8(&body[..len]).unwrap_or("");
            if let Some(sub) = submission_from_form(text) {
                if let Ok(mut guard) = shared.lock() {
                    guard.submission = Some(sub);
                }
                req.into_ok_response()?
                    .write_all(b"Saved. The device will now connect.")?;
            } else {
                req.into_status_response(400)?
                    .write_all(b"Missing ssid or poll_url")?;
            }
            Ok::<(), anyhow::Error>(())
        });

        let shared = Arc::clone(&self.shared);
        let strike_result = server.fn_handler("/strike", Method::Post, move |req| {
            if let Ok(mut guard) = shared.lock() {
                guard.strike_requested = true;
            }
            req.into_ok_response()?.write_all(b"Gong!")?;
            Ok::<(), anyhow::Error>(())
        });

        if page_result.is_err() || save_result.is_err() || strike_result.is_err() {
            log::error!("portal: handler registration failed");
            return;
        }

        self.server = Some(server);
        self.active = true;
        info!("portal: serving setup page");
    }

    #[cfg(not(target_os = "espidf"))]
    fn start(&mut self) {
        self.active = true;
        info!("portal(sim): active");
    }

    fn stop(&mut self) {
        #[cfg(target_os = "espidf")]
        {
            self.server = None;
        }
        self.active = false;
        info!("portal: stopped");
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn take_pending_submission(&mut self) -> Option<PortalSubmission> {
        #[cfg(target_os = "espidf")]
        {
            self.shared.lock().ok()?.submission.take()
        }
        #[cfg(not(target_os = "espidf"))]
        {
            self.pending.take()
        }
    }

    fn take_pending_strike(&mut self) -> bool {
        #[cfg(target_os = "espidf")]
        {
            self.shared
                .lock()
                .map(|mut g| core::mem::take(&mut g.strike_requested))
                .unwrap_or(false)
        }
        #[cfg(not(target_os = "espidf"))]
        {
            core::mem::take(&mut self.strike_requested)
        }
    }
}
