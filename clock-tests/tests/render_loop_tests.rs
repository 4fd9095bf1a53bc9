//! Integration Tests für die Render Loop
//!
//! Diese Tests laufen auf dem Host (x86_64) und nutzen die Mocks aus `common`

mod common;

use clock_core::portal::{BrightnessForm, FormError, TimezoneForm, WifiForm};
use clock_core::{
    AttemptStatus, Brightness, ConfigCommand, ConnectivityState, Credentials, CredentialsError,
    SettingKey, StoreError, SyncError, SyncReason, Timezone, Transition,
};
use common::{EPOCH, MockStore, TEST_AP, test_loop};
use heapless::String;

fn command_credentials(ssid: &str, psk: &str) -> ConfigCommand {
    ConfigCommand::UpdateCredentials(Credentials::new(ssid, psk).unwrap())
}

fn command_timezone(name: &str) -> ConfigCommand {
    ConfigCommand::UpdateTimezone(Timezone::parse(name).unwrap())
}

fn field<const N: usize>(value: &str) -> String<N> {
    let mut s = String::new();
    s.push_str(value).unwrap();
    s
}

// ============================================================================
// Tests: Boot
// ============================================================================

#[test]
fn test_boot_without_credentials_keeps_access_point() {
    let mut clock = test_loop(MockStore::new());
    let boot = clock.begin_boot(TEST_AP, 0);
    assert_eq!(boot.store_error, None);

    let mut state = boot.state;
    assert_eq!(state.connectivity.state(), ConnectivityState::ApOnly);
    assert!(state.settings.credentials.is_none());
    assert_eq!(clock.poll_boot(&mut state, 0), AttemptStatus::TimedOut);
    assert!(clock.network().connect_requests.is_empty());

    for _ in 0..100 {
        let report = clock.cycle(&mut state, []);
        assert_eq!(report.transition, None);
        clock.time_mut().advance(1);
    }

    assert!(clock.network().ap_active);
    assert_eq!(clock.network().ap_starts, 1);
    assert_eq!(clock.network().ap_stops, 0);
    assert_eq!(state.connectivity.state(), ConnectivityState::ApOnly);
}

#[test]
fn test_boot_with_credentials_connects_before_deadline() {
    let mut clock = test_loop(MockStore::with_credentials("HomeNet", "secret123"));
    let mut state = clock.begin_boot(TEST_AP, 0).state;

    assert_eq!(state.connectivity.state(), ConnectivityState::Connecting);
    assert_eq!(
        clock.network().connect_requests,
        vec![("HomeNet".to_string(), "secret123".to_string())]
    );
    assert_eq!(clock.poll_boot(&mut state, 100), AttemptStatus::Pending);

    clock.network_mut().connected = true;
    assert_eq!(clock.poll_boot(&mut state, 1200), AttemptStatus::Connected);

    assert_eq!(state.connectivity.state(), ConnectivityState::ClientOnly);
    assert!(!clock.network().ap_active);
    assert_eq!(clock.network().ap_stops, 1);
    assert_eq!(state.sync.pending(), Some(SyncReason::Connected));

    let report = clock.cycle(&mut state, []);
    assert_eq!(report.transition, None);
    assert_eq!(report.sync, Some(SyncReason::Connected));
    assert_eq!(clock.time().sync_calls, 1);
}

#[test]
fn test_boot_attempt_times_out_then_connects_later() {
    let mut clock = test_loop(MockStore::with_credentials("HomeNet", "secret123"));
    let mut state = clock.begin_boot(TEST_AP, 1000).state;

    assert_eq!(clock.poll_boot(&mut state, 5999), AttemptStatus::Pending);
    assert_eq!(clock.poll_boot(&mut state, 6000), AttemptStatus::TimedOut);
    assert_eq!(state.connectivity.state(), ConnectivityState::ApOnly);
    assert!(clock.network().ap_active);

    let report = clock.cycle(&mut state, []);
    assert_eq!(report.transition, None);
    assert_eq!(report.sync, None);

    // Client verbindet sich später im Hintergrund
    clock.network_mut().connected = true;
    let report = clock.cycle(&mut state, []);
    assert_eq!(report.transition, Some(Transition::ClientEstablished));
    assert_eq!(report.sync, Some(SyncReason::Connected));
    assert_eq!(state.connectivity.state(), ConnectivityState::ClientOnly);
    assert!(!clock.network().ap_active);
}

#[test]
fn test_boot_with_unreadable_store_uses_defaults() {
    let mut store = MockStore::with_credentials("HomeNet", "secret123");
    store.fail_reads = true;
    let mut clock = test_loop(store);

    let boot = clock.begin_boot(TEST_AP, 0);
    assert_eq!(boot.store_error, Some(StoreError::ReadFailed));
    assert!(boot.state.settings.credentials.is_none());
    assert_eq!(boot.state.settings.timezone, Timezone::utc());
    assert_eq!(boot.state.settings.brightness, Brightness::DEFAULT);
    assert_eq!(boot.state.connectivity.state(), ConnectivityState::ApOnly);
}

#[test]
fn test_boot_loads_stored_settings() {
    let mut store = MockStore::new();
    store.strings[SettingKey::Timezone.index()] = Some("Asia/Kolkata".into());
    store.bytes[SettingKey::MinBrightness.index()] = Some(40);
    store.bytes[SettingKey::MaxBrightness.index()] = Some(90);
    let mut clock = test_loop(store);

    let mut state = clock.begin_boot(TEST_AP, 0).state;
    assert_eq!(state.settings.timezone.name(), "Asia/Kolkata");
    assert_eq!(state.settings.brightness, Brightness { min: 40, max: 90 });

    // 22:13:20 UTC = 03:43:20 IST
    let report = clock.cycle(&mut state, []);
    assert_eq!(report.digits.hours(), 3);
    assert_eq!(report.digits.minutes(), 43);
}

// ============================================================================
// Tests: Verbindungs-Zustandsautomat
// ============================================================================

#[test]
fn test_connection_lost_restarts_access_point() {
    let mut clock = test_loop(MockStore::with_credentials("HomeNet", "secret123"));
    let mut state = clock.begin_boot(TEST_AP, 0).state;
    clock.network_mut().connected = true;
    clock.poll_boot(&mut state, 0);
    clock.cycle(&mut state, []);

    clock.network_mut().connected = false;
    let report = clock.cycle(&mut state, []);

    assert_eq!(report.transition, Some(Transition::ClientLost));
    assert_eq!(report.sync, None);
    assert_eq!(state.connectivity.state(), ConnectivityState::ApOnly);
    assert!(clock.network().ap_active);
    assert_eq!(clock.network().ap_starts, 2);

    // Stabil solange die Verbindung fehlt
    let report = clock.cycle(&mut state, []);
    assert_eq!(report.transition, None);
    assert_eq!(clock.network().ap_starts, 2);
}

#[test]
fn test_access_point_toggles_once_per_change() {
    let mut clock = test_loop(MockStore::new());
    let mut state = clock.begin_boot(TEST_AP, 0).state;

    for round in 1..=3 {
        clock.network_mut().connected = true;
        let report = clock.cycle(&mut state, []);
        assert_eq!(report.transition, Some(Transition::ClientEstablished));
        assert_eq!(clock.network().ap_stops, round);

        clock.network_mut().connected = false;
        let report = clock.cycle(&mut state, []);
        assert_eq!(report.transition, Some(Transition::ClientLost));
        assert_eq!(clock.network().ap_starts, round + 1);
    }

    // Jeder Reconnect synchronisiert sofort
    assert_eq!(clock.time().sync_calls, 3);
}

#[test]
fn test_busy_radio_access_point_is_rearmed_after_link_loss() {
    let mut clock = test_loop(MockStore::with_credentials("HomeNet", "secret123"));
    let mut state = clock.begin_boot(TEST_AP, 0).state;
    clock.network_mut().connected = true;
    clock.poll_boot(&mut state, 0);
    clock.cycle(&mut state, []);
    assert!(!clock.network().ap_active);

    // Queue voll genau in dem Zyklus, in dem die Verbindung abreißt
    clock.network_mut().connected = false;
    clock.network_mut().reject_next = 1;
    let report = clock.cycle(&mut state, []);
    assert_eq!(report.transition, None);
    assert!(report.radio_busy);
    assert!(!state.connectivity.soft_ap_active());

    let report = clock.cycle(&mut state, []);
    assert_eq!(report.transition, Some(Transition::ClientLost));
    assert!(!report.radio_busy);

    for _ in 0..100 {
        let report = clock.cycle(&mut state, []);
        assert_eq!(report.transition, None);
    }

    assert!(clock.network().ap_active);
    assert!(state.connectivity.soft_ap_active());
    assert_eq!(state.connectivity.state(), ConnectivityState::ApOnly);
    assert_eq!(clock.network().ap_starts, 2);
    assert_eq!(clock.network().rejected, 1);
}

#[test]
fn test_busy_radio_keeps_access_point_until_stop_accepted() {
    let mut clock = test_loop(MockStore::new());
    let mut state = clock.begin_boot(TEST_AP, 0).state;

    clock.network_mut().connected = true;
    clock.network_mut().reject_next = 3;
    for _ in 0..3 {
        let report = clock.cycle(&mut state, []);
        assert_eq!(report.transition, None);
        assert_eq!(report.sync, None);
        assert!(clock.network().ap_active);
    }

    let report = clock.cycle(&mut state, []);
    assert_eq!(report.transition, Some(Transition::ClientEstablished));
    assert_eq!(report.sync, Some(SyncReason::Connected));
    assert!(!clock.network().ap_active);
    assert_eq!(clock.time().sync_calls, 1);
}

#[test]
fn test_busy_radio_credentials_are_sent_next_cycle() {
    let mut clock = test_loop(MockStore::new());
    let mut state = clock.begin_boot(TEST_AP, 0).state;

    // Abgelehnt beim Kommando und bei der Wiederholung im selben Zyklus
    clock.network_mut().reject_next = 2;
    let report = clock.cycle(&mut state, [command_credentials("HomeNet", "secret123")]);
    assert!(report.radio_busy);
    assert!(clock.network().connect_requests.is_empty());
    assert_eq!(clock.store().string(SettingKey::WifiSsid), Some("HomeNet"));

    let report = clock.cycle(&mut state, []);
    assert!(!report.radio_busy);
    assert_eq!(
        clock.network().connect_requests,
        vec![("HomeNet".to_string(), "secret123".to_string())]
    );

    clock.cycle(&mut state, []);
    assert_eq!(clock.network().connect_requests.len(), 1);
}

#[test]
fn test_new_credentials_from_portal_connect_and_sync() {
    let mut clock = test_loop(MockStore::new());
    let mut state = clock.begin_boot(TEST_AP, 0).state;
    clock.cycle(&mut state, []);

    let report = clock.cycle(&mut state, [command_credentials("HomeNet", "secret123")]);
    assert_eq!(report.commands_applied, 1);
    assert_eq!(report.store_error, None);
    assert_eq!(report.transition, None);
    assert_eq!(
        clock.network().connect_requests,
        vec![("HomeNet".to_string(), "secret123".to_string())]
    );
    assert_eq!(clock.store().string(SettingKey::WifiSsid), Some("HomeNet"));
    assert_eq!(clock.store().string(SettingKey::WifiPsk), Some("secret123"));
    assert_eq!(
        state.settings.credentials.as_ref().map(|c| c.ssid()),
        Some("HomeNet")
    );

    // Access Point bleibt bis zur Verbindung aktiv
    assert!(clock.network().ap_active);
    assert_eq!(state.connectivity.state(), ConnectivityState::ApOnly);

    clock.network_mut().connected = true;
    let report = clock.cycle(&mut state, []);
    assert_eq!(report.transition, Some(Transition::ClientEstablished));
    assert_eq!(report.sync, Some(SyncReason::Connected));
    assert_eq!(state.connectivity.state(), ConnectivityState::ClientOnly);
    assert!(!clock.network().ap_active);
    assert_eq!(clock.time().sync_calls, 1);
}

// ============================================================================
// Tests: Zeit und Anzeige
// ============================================================================

#[test]
fn test_default_timezone_shows_utc() {
    let mut clock = test_loop(MockStore::new());
    let mut state = clock.begin_boot(TEST_AP, 0).state;

    let report = clock.cycle(&mut state, []);
    assert_eq!(report.local.hour, 22);
    assert_eq!(report.local.minute, 13);
    assert_eq!(clock.display().shown(), [2, 2, 1, 3]);
}

#[test]
fn test_timezone_change_resyncs_and_shows_local_time() {
    let mut clock = test_loop(MockStore::new());
    let mut state = clock.begin_boot(TEST_AP, 0).state;

    let report = clock.cycle(&mut state, [command_timezone("America/New_York")]);

    assert_eq!(report.sync, Some(SyncReason::TimezoneChanged));
    assert_eq!(report.local.hour, 17);
    assert_eq!(report.local.minute, 13);
    assert_eq!(clock.display().shown(), [1, 7, 1, 3]);
    assert_eq!(
        clock.store().string(SettingKey::Timezone),
        Some("America/New_York")
    );

    let status = clock.status(&state, &report);
    assert_eq!(status.hour, 17);
    assert_eq!(status.minute, 13);
    assert_eq!(status.timezone.name(), "America/New_York");
    assert!(status.synced);
}

#[test]
fn test_display_follows_sync_in_same_cycle() {
    let mut clock = test_loop(MockStore::with_credentials("HomeNet", "secret123"));
    // Uhr läuft noch auf 1970, Server kennt die echte Zeit
    clock.time_mut().epoch = 1000;
    clock.time_mut().server_epoch = Some(EPOCH);

    let mut state = clock.begin_boot(TEST_AP, 0).state;
    clock.network_mut().connected = true;
    clock.poll_boot(&mut state, 10);

    let report = clock.cycle(&mut state, []);
    assert_eq!(report.sync, Some(SyncReason::Connected));
    assert_eq!(clock.display().shown(), [2, 2, 1, 3]);
}

#[test]
fn test_hourly_resync_fires_exactly_once() {
    let mut clock = test_loop(MockStore::new());
    let mut state = clock.begin_boot(TEST_AP, 0).state;
    // 22:59:58 UTC
    clock.time_mut().epoch = EPOCH + 2798;
    clock.time_mut().server_epoch = Some(EPOCH + 2798);

    let mut resyncs = 0;
    for _ in 0..10 {
        // Mehrere Zyklen pro Sekunde
        for _ in 0..3 {
            let report = clock.cycle(&mut state, []);
            if report.sync == Some(SyncReason::HourlyResync) {
                resyncs += 1;
                assert_eq!((report.local.hour, report.local.minute), (23, 0));
            }
        }
        clock.time_mut().advance(1);
    }
    assert_eq!(resyncs, 1);
    assert_eq!(clock.time().sync_calls, 1);

    // Nächste volle Stunde löst erneut aus
    clock.time_mut().advance(3600 - 8);
    let report = clock.cycle(&mut state, []);
    assert_eq!(report.local.hour, 0);
    assert_eq!(report.sync, Some(SyncReason::HourlyResync));
}

#[test]
fn test_failed_sync_keeps_epoch() {
    let mut clock = test_loop(MockStore::new());
    let mut state = clock.begin_boot(TEST_AP, 0).state;
    clock.time_mut().server_epoch = None;

    let report = clock.cycle(&mut state, [command_timezone("Europe/Berlin")]);

    assert_eq!(report.sync, Some(SyncReason::TimezoneChanged));
    assert_eq!(report.sync_error, Some(SyncError::Unreachable));
    assert_eq!(clock.time().epoch, EPOCH);
    assert!(!clock.time().synced);
    // 22:13 UTC = 23:13 CET
    assert_eq!(clock.display().shown(), [2, 3, 1, 3]);

    // Kein sofortiger Retry
    let report = clock.cycle(&mut state, []);
    assert_eq!(report.sync, None);
    assert_eq!(clock.time().sync_calls, 1);
}

// ============================================================================
// Tests: Einstellungen
// ============================================================================

#[test]
fn test_brightness_update_is_persisted() {
    let mut clock = test_loop(MockStore::new());
    let mut state = clock.begin_boot(TEST_AP, 0).state;

    let brightness = Brightness::new(20, 200).unwrap();
    let report = clock.cycle(&mut state, [ConfigCommand::UpdateBrightness(brightness)]);

    assert_eq!(report.store_error, None);
    assert_eq!(report.sync, None);
    assert_eq!(state.settings.brightness, brightness);
    assert_eq!(clock.store().byte(SettingKey::MinBrightness), Some(20));
    assert_eq!(clock.store().byte(SettingKey::MaxBrightness), Some(200));
}

#[test]
fn test_store_write_failure_still_applies_setting() {
    let mut clock = test_loop(MockStore::new());
    let mut state = clock.begin_boot(TEST_AP, 0).state;
    clock.store_mut().fail_writes = true;

    let report = clock.cycle(&mut state, [command_timezone("Asia/Kolkata")]);

    assert_eq!(report.store_error, Some(StoreError::WriteFailed));
    assert_eq!(state.settings.timezone.name(), "Asia/Kolkata");
    assert_eq!(report.local.hour, 3);
    assert_eq!(clock.store().string(SettingKey::Timezone), None);
}

#[test]
fn test_multiple_commands_in_one_cycle() {
    let mut clock = test_loop(MockStore::new());
    let mut state = clock.begin_boot(TEST_AP, 0).state;

    let report = clock.cycle(
        &mut state,
        [
            command_timezone("America/New_York"),
            command_credentials("HomeNet", "secret123"),
            ConfigCommand::UpdateBrightness(Brightness::new(0, 100).unwrap()),
        ],
    );

    assert_eq!(report.commands_applied, 3);
    assert_eq!(report.sync, Some(SyncReason::TimezoneChanged));
    assert_eq!(clock.time().sync_calls, 1);
    assert_eq!(clock.network().connect_requests.len(), 1);
    assert_eq!(state.settings.brightness.max, 100);
}

// ============================================================================
// Tests: Portal-Formulare
// ============================================================================

#[test]
fn test_wifi_form_rejects_empty_ssid() {
    let form = WifiForm {
        ssid: field(""),
        psk: field("secret123"),
    };
    assert_eq!(
        form.to_command(),
        Err(FormError::Credentials(CredentialsError::EmptySsid))
    );
}

#[test]
fn test_wifi_form_feeds_render_loop() {
    let form = WifiForm {
        ssid: field("HomeNet"),
        psk: field("secret123"),
    };
    let command = form.to_command().unwrap();

    let mut clock = test_loop(MockStore::new());
    let mut state = clock.begin_boot(TEST_AP, 0).state;
    clock.cycle(&mut state, [command]);

    assert_eq!(clock.network().connect_requests.len(), 1);
}

#[test]
fn test_brightness_form_rejects_malformed_values() {
    let form = |min: &str, max: &str| BrightnessForm {
        min: field(min),
        max: field(max),
    };

    assert_eq!(form("abc", "10").to_command(), Err(FormError::NotANumber));
    assert_eq!(form("-1", "10").to_command(), Err(FormError::NotANumber));
    assert_eq!(form("10", "256").to_command(), Err(FormError::OutOfRange));
    assert_eq!(form("200", "100").to_command(), Err(FormError::InvertedRange));
    assert_eq!(
        form("0", "255").to_command(),
        Ok(ConfigCommand::UpdateBrightness(Brightness { min: 0, max: 255 }))
    );
}

#[test]
fn test_timezone_form_rejects_unknown_zone() {
    let form = TimezoneForm {
        timezone: field("Mars/Olympus_Mons"),
    };
    assert_eq!(form.to_command(), Err(FormError::UnknownTimezone));
}
