//! HTTP long-poll transport adapter.
//!
//! Implements [`PollTransport`] over the ESP-IDF HTTP client.  The
//! blocking GET runs on a short-lived worker thread; body chunks and the
//! final status flow back to the main loop through an mpsc channel, so
//! the control loop never waits on a socket.
//!
//! Every request carries a generation number.  An abort bumps the
//! generation, which makes anything a stale worker still emits filterable
//! on the consumer side — a hung connection can be abandoned without
//! waiting for its thread to unwind.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: real `EspHttpConnection` GET with a socket read timeout.
//! On host/test: requests complete immediately with an empty 204 (tests
//! that need scripted traffic use their own mock transport).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::{PollTransport, TransportError, TransportEvent};

pub struct HttpTransport {
    tx: Sender<(u32, TransportEvent)>,
    rx: Receiver<(u32, TransportEvent)>,
    /// Cancellation flag for the current worker, if any.
    cancel: Arc<AtomicBool>,
    /// Generation of the request currently considered live.
    generation: u32,
    in_flight: bool,
}

impl HttpTransport {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            tx,
            rx,
            cancel: Arc::new(AtomicBool::new(false)),
            generation: 0,
            in_flight: false,
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl PollTransport for HttpTransport {
    fn start_get(&mut self, url: &str, timeout_secs: u16) -> Result<(), TransportError> {
        if self.in_flight {
            return Err(TransportError::Busy);
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(TransportError::InvalidUrl);
        }

        self.generation = self.generation.wrapping_add(1);
        self.cancel = Arc::new(AtomicBool::new(false));
        self.in_flight = true;

        #[cfg(target_os = "espidf")]
        {
            let url = url.to_string();
            let tx = self.tx.clone();
            let generation = self.generation;
            let cancel = Arc::clone(&self.cancel);

            let spawned = std::thread::Builder::new()
                .name("poll-http".into())
                .stack_size(8 * 1024)
                .spawn(move || {
                    run_request(&url, timeout_secs, &cancel, |event| {
                        // Main loop gone means nothing left to notify.
                        let _ = tx.send((generation, event));
                    });
                });
            if let Err(e) = spawned {
                warn!("http: worker spawn failed ({})", e);
                self.in_flight = false;
                return Err(TransportError::ConnectFailed);
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            let _ = timeout_secs;
            log::info!("http(sim): GET {} completes empty", url);
            let _ = self
                .tx
                .send((self.generation, TransportEvent::Done { status: 204 }));
        }

        Ok(())
    }

    fn drain_events(&mut self, mut handler: impl FnMut(TransportEvent)) {
        while let Ok((generation, event)) = self.rx.try_recv() {
            if generation != self.generation {
                continue; // Stale worker output from before an abort.
            }
            if matches!(
                event,
                TransportEvent::Done { .. } | TransportEvent::Failed(_)
            ) {
                self.in_flight = false;
            }
            handler(event);
        }
    }

    fn abort(&mut self) {
        if !self.in_flight {
            return;
        }
        self.cancel.store(true, Ordering::Release);
        // Orphan the worker: its generation no longer matches, so whatever
        // it still emits is dropped in drain_events().
        self.generation = self.generation.wrapping_add(1);
        self.in_flight = false;
    }
}

/// Blocking GET executed on the worker thread.  Emits body chunks as they
/// arrive and a final `Done`/`Failed`; bails out quietly when cancelled.
#[cfg(target_os = "espidf")]
fn run_request(
    url: &str,
    timeout_secs: u16,
    cancel: &AtomicBool,
    mut emit: impl FnMut(TransportEvent),
) {
    use embedded_svc::http::client::Client;
    use embedded_svc::io::Read;
    use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

    let conn = match EspHttpConnection::new(&Configuration {
        timeout: Some(core::time::Duration::from_secs(u64::from(timeout_secs))),
        ..Default::default()
    }) {
        Ok(c) => c,
        Err(e) => {
            warn!("http: connection setup failed ({})", e);
            emit(TransportEvent::Failed(TransportError::ConnectFailed));
            return;
        }
    };
    let mut client = Client::wrap(conn);

    let request = match client.get(url) {
        Ok(r) => r,
        Err(e) => {
            warn!("http: bad request ({})", e);
            emit(TransportEvent::Failed(TransportError::InvalidUrl));
            return;
        }
    };
    let mut response = match request.submit() {
        Ok(r) => r,
        Err(e) => {
            warn!("http: submit failed ({})", e);
            emit(TransportEvent::Failed(TransportError::ConnectFailed));
            return;
        }
    };

    let status = response.status();
    let mut buf = [0u8; 256];
    loop {
        if cancel.load(Ordering::Acquire) {
            return;
        }
        match response.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => emit(TransportEvent::Data(buf[..n].to_vec())),
            Err(e) => {
                warn!("http: read failed ({:?})", e);
                emit(TransportEvent::Failed(TransportError::Io));
                return;
            }
        }
    }
    emit(TransportEvent::Done { status });
}
