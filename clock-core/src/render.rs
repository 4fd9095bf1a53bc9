//! Render Loop
//!
//! Verbindet alle Komponenten, einmal pro Zyklus in fester Reihenfolge:
//! 1. Konfigurations-Kommandos anwenden (vom Portal, seit dem letzten Zyklus)
//! 2. Verbindungs-Zustandsautomat auswerten
//! 3. Sync-Trigger auswerten und ggf. synchronisieren
//! 4. Lokale Uhrzeit aus Epoche + Zeitzone ableiten
//! 5. Ziffern und Indikator ausgeben
//!
//! Fehler sind nie fatal: sie landen im `CycleReport`, der Zyklus läuft weiter.

use rgb::RGB8;

use crate::clock::LocalTime;
use crate::connectivity::{AccessPoint, AttemptStatus, Connectivity, Transition};
use crate::digits::{self, DisplayDigits};
use crate::indicator::indicator_color;
use crate::settings::{SettingKey, Settings};
use crate::sync::{SyncPolicy, SyncReason};
use crate::traits::{
    DigitLines, IndicatorWriter, KeyValueStore, LedError, NetworkControl, StoreError, SyncError,
    TimeSource,
};
use crate::types::{ClockStatus, ConfigCommand};

/// Veränderlicher Zustand der Uhr
///
/// Wird der Render Loop in jedem Zyklus per Referenz übergeben.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockState {
    pub connectivity: Connectivity,
    pub sync: SyncPolicy,
    pub settings: Settings,
}

/// Ergebnis eines Zyklus (für Logging und Tests)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    pub commands_applied: u8,
    pub transition: Option<Transition>,
    /// Funk hat ein Kommando abgelehnt, die Regel greift im nächsten Zyklus erneut
    pub radio_busy: bool,
    pub sync: Option<SyncReason>,
    pub sync_error: Option<SyncError>,
    pub store_error: Option<StoreError>,
    pub indicator_error: Option<LedError>,
    pub local: LocalTime,
    pub digits: DisplayDigits,
}

/// Ergebnis des Boot-Starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boot {
    pub state: ClockState,
    /// Einstellungen nicht lesbar → Defaults
    pub store_error: Option<StoreError>,
}

/// Render Loop über den externen Kollaborateuren
///
/// Die generischen Parameter ermöglichen:
/// - Real Hardware (esp-radio, SNTP, Flash, GPIO, RMT) im Production-Code
/// - Mock Implementations in Tests
pub struct RenderLoop<N, T, S, D, I> {
    network: N,
    time: T,
    store: S,
    display: D,
    indicator: I,
    last_indicator: Option<RGB8>,
}

impl<N, T, S, D, I> RenderLoop<N, T, S, D, I>
where
    N: NetworkControl,
    T: TimeSource,
    S: KeyValueStore,
    D: DigitLines,
    I: IndicatorWriter,
{
    pub fn new(network: N, time: T, store: S, display: D, indicator: I) -> Self {
        Self {
            network,
            time,
            store,
            display,
            indicator,
            last_indicator: None,
        }
    }

    /// Boot: Einstellungen laden, Access Point starten, ggf. Verbindungsversuch
    ///
    /// Danach `poll_boot()` aufrufen bis das Ergebnis nicht mehr `Pending` ist.
    pub fn begin_boot(&mut self, access_point: AccessPoint, now_ms: u64) -> Boot {
        let (settings, store_error) = match Settings::load(&mut self.store) {
            Ok(settings) => (settings, None),
            Err(e) => (Settings::default(), Some(e)),
        };

        let connectivity = Connectivity::boot(
            &mut self.network,
            access_point,
            settings.credentials.as_ref(),
            now_ms,
        );

        Boot {
            state: ClockState {
                connectivity,
                sync: SyncPolicy::new(),
                settings,
            },
            store_error,
        }
    }

    /// Pollt den Boot-Verbindungsversuch
    ///
    /// Bei Erfolg wird sofort ein Sync angefordert (erster verlässlicher Sync).
    pub fn poll_boot(&mut self, state: &mut ClockState, now_ms: u64) -> AttemptStatus {
        let status = state.connectivity.poll_boot(&mut self.network, now_ms);
        if status == AttemptStatus::Connected {
            state.sync.on_connected();
        }
        status
    }

    /// Ein Durchlauf der Render Loop
    pub fn cycle<C>(&mut self, state: &mut ClockState, commands: C) -> CycleReport
    where
        C: IntoIterator<Item = ConfigCommand>,
    {
        let mut commands_applied = 0u8;
        let mut store_error = None;
        for command in commands {
            commands_applied = commands_applied.saturating_add(1);
            if let Err(e) = self.apply(state, command) {
                store_error = Some(e);
            }
        }

        // 1. Verbindungs-Zustand
        let transition = state.connectivity.update(&mut self.network);
        if transition == Some(Transition::ClientEstablished) {
            state.sync.on_connected();
        }

        // 2. Sync-Trigger (Stunden-Trigger braucht die lokale Zeit vor dem Sync)
        let timezone = state.settings.timezone;
        let before = LocalTime::from_epoch(self.time.epoch_seconds(), timezone);
        let sync = state.sync.evaluate(&before);
        let sync_error = match sync {
            Some(_) => self.time.sync_now().err(),
            None => None,
        };

        // 3. Lokale Zeit, immer aus der Epoche
        let local = match sync {
            Some(_) => LocalTime::from_epoch(self.time.epoch_seconds(), timezone),
            None => before,
        };

        // 4. Ausgabe
        let digits = digits::render(&mut self.display, local.hour, local.minute);
        let indicator_error = self.refresh_indicator(state).err();

        CycleReport {
            commands_applied,
            transition,
            radio_busy: state.connectivity.radio_busy(),
            sync,
            sync_error,
            store_error,
            indicator_error,
            local,
            digits,
        }
    }

    /// Status-Snapshot für das Portal
    pub fn status(&self, state: &ClockState, report: &CycleReport) -> ClockStatus {
        ClockStatus {
            connectivity: state.connectivity.state(),
            hour: report.local.hour,
            minute: report.local.minute,
            timezone: state.settings.timezone,
            brightness: state.settings.brightness,
            synced: self.time.is_synced(),
        }
    }

    /// Gibt die Kollaborateure zurück
    pub fn into_parts(self) -> (N, T, S, D, I) {
        (
            self.network,
            self.time,
            self.store,
            self.display,
            self.indicator,
        )
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut N {
        &mut self.network
    }

    pub fn time(&self) -> &T {
        &self.time
    }

    pub fn time_mut(&mut self) -> &mut T {
        &mut self.time
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn indicator_mut(&mut self) -> &mut I {
        &mut self.indicator
    }

    /// Wendet ein Kommando an
    ///
    /// Der neue Wert gilt auch dann, wenn das Speichern fehlschlägt;
    /// der Fehler wird zurückgegeben.
    fn apply(&mut self, state: &mut ClockState, command: ConfigCommand) -> Result<(), StoreError> {
        match command {
            ConfigCommand::UpdateCredentials(credentials) => {
                let persisted = self
                    .store
                    .put_str(SettingKey::WifiSsid, credentials.ssid())
                    .and_then(|_| self.store.put_str(SettingKey::WifiPsk, credentials.psk()));

                state
                    .connectivity
                    .reconnect(&mut self.network, &credentials);
                state.settings.credentials = Some(credentials);
                persisted
            }
            ConfigCommand::UpdateBrightness(brightness) => {
                let persisted = self
                    .store
                    .put_u8(SettingKey::MinBrightness, brightness.min)
                    .and_then(|_| self.store.put_u8(SettingKey::MaxBrightness, brightness.max));

                state.settings.brightness = brightness;
                persisted
            }
            ConfigCommand::UpdateTimezone(timezone) => {
                let persisted = self.store.put_str(SettingKey::Timezone, timezone.name());

                state.settings.timezone = timezone;
                state.sync.on_timezone_changed();
                persisted
            }
        }
    }

    // Strip nur bei Farbwechsel neu beschreiben
    fn refresh_indicator(&mut self, state: &ClockState) -> Result<(), LedError> {
        let color = indicator_color(
            state.connectivity.soft_ap_active(),
            state.settings.brightness,
        );
        if self.last_indicator == Some(color) {
            return Ok(());
        }

        self.indicator.write(color)?;
        self.last_indicator = Some(color);
        Ok(())
    }
}
