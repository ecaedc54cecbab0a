//! Provisioning flow — portal submission through config persistence.

use gongbot::app::commands::AppCommand;
use gongbot::app::ports::ConfigPort;
use gongbot::app::service::AppService;
use gongbot::adapters::portal::{PortalAdapter, ProvisioningPort};
use gongbot::config::SystemConfig;

use crate::mock_hw::{MockConfigStore, MockHardware, RecordingSink};

#[test]
fn portal_submission_updates_and_persists_url() {
    let mut portal = PortalAdapter::new();
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let store = MockConfigStore::new();

    portal.start();
    assert!(portal.is_active());
    portal.sim_submit("HomeNet", "hunter22", "http://gong.example/poll");

    let sub = portal.take_pending_submission().expect("form was posted");
    assert_eq!(sub.ssid.as_str(), "HomeNet");
    app.handle_command(AppCommand::SetPollUrl(sub.poll_url), &mut hw, &mut sink);

    assert!(app.is_config_dirty());
    assert!(app.save_if_dirty(&store));
    assert_eq!(
        store.saved_url().as_deref(),
        Some("http://gong.example/poll")
    );
    assert!(!app.is_config_dirty());

    // Saved URL survives a reload.
    let reloaded = store.load_poll_url().unwrap().unwrap();
    assert_eq!(reloaded.as_str(), "http://gong.example/poll");
}

#[test]
fn invalid_portal_url_is_rejected() {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let store = MockConfigStore::new();

    let mut bogus = heapless::String::new();
    bogus.push_str("ftp://nope").unwrap();
    app.handle_command(AppCommand::SetPollUrl(bogus), &mut hw, &mut sink);

    assert!(!app.is_config_dirty());
    assert!(!app.save_if_dirty(&store));
    assert_eq!(store.saved_url(), None);
}

#[test]
fn portal_test_button_strikes_immediately() {
    let mut portal = PortalAdapter::new();
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    portal.start();
    portal.sim_press_test();

    if portal.take_pending_strike() {
        app.handle_command(AppCommand::Strike, &mut hw, &mut sink);
    }
    assert_eq!(hw.strike_calls, 1);
    // The flag is consumed.
    assert!(!portal.take_pending_strike());
}

#[test]
fn save_failure_keeps_config_dirty() {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let mut store = MockConfigStore::new();
    store.fail_saves = true;

    let mut url = heapless::String::new();
    url.push_str("http://gong.example/poll").unwrap();
    app.handle_command(AppCommand::SetPollUrl(url), &mut hw, &mut sink);

    assert!(!app.save_if_dirty(&store));
    assert!(app.is_config_dirty(), "retry on the next loop iteration");
}
