//! Hardware Abstraction Traits
//!
//! Diese Traits definieren Schnittstellen zu den externen Kollaborateuren
//! ohne konkrete Implementierung.
//!
//! # Implementierungen
//! - **Production:** Adapter in `clock-firmware` (esp-radio, SNTP-Task, Flash, GPIO, RMT)
//! - **Testing:** In-Memory Mocks in `clock-tests`

use rgb::RGB8;

use crate::digits::DigitPosition;
use crate::settings::{Credentials, SettingKey, SettingValue};

/// Fehler-Typ für LED-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedError {
    InitFailed,
    WriteFailed,
}

/// Fehler einer Zeit-Synchronisation
///
/// Nie fatal: die Policy behält die letzte Epoche und wartet auf den
/// nächsten regulären Trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncError {
    /// Zeitserver nicht erreichbar oder keine Antwort
    Unreachable,
    /// Antwort erhalten, aber ungültig
    InvalidReply,
    /// Es läuft bereits eine Anfrage
    Busy,
}

/// Der Funk-Adapter hat ein Kommando nicht angenommen
///
/// Der Aufrufer behält seinen bisherigen Zustand und wiederholt das
/// Kommando im nächsten Zyklus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkError {
    /// Kommando-Queue voll
    Busy,
}

/// Fehler des Key-Value-Speichers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    ReadFailed,
    WriteFailed,
    /// Wert passt nicht in einen Slot
    ValueTooLong,
}

/// Steuerung des WLAN-Interfaces
///
/// Alle Aufrufe sind nicht-blockierend. Der Verbindungsaufbau läuft im
/// Hintergrund, das Ergebnis wird über `is_connected()` sichtbar.
///
/// `Ok` heißt nur: das Kommando ist angenommen. Bei `Err` ist nichts
/// passiert und der Aufrufer muss es erneut versuchen.
pub trait NetworkControl {
    /// Startet den eigenen Access Point (zusätzlich zum Client-Modus)
    fn start_access_point(&mut self, ssid: &str, psk: &str) -> Result<(), NetworkError>;

    /// Baut den Access Point ab, der Client-Modus bleibt aktiv
    fn stop_access_point(&mut self) -> Result<(), NetworkError>;

    /// Beginnt einen Verbindungsversuch mit einem bestehenden Netzwerk
    fn connect_as_client(&mut self, credentials: &Credentials) -> Result<(), NetworkError>;

    /// true sobald der Client verbunden ist und eine IP-Adresse hat
    fn is_connected(&self) -> bool;
}

/// Netzwerk-Zeitquelle (SNTP)
pub trait TimeSource {
    /// Fordert eine Synchronisation mit dem Zeitserver an
    ///
    /// # Fehlerbehandlung
    /// Bei Fehlern bleibt die bisherige Epoche unverändert.
    fn sync_now(&mut self) -> Result<(), SyncError>;

    /// Aktuelle Epoche in Sekunden (UTC)
    fn epoch_seconds(&self) -> i64;

    /// true sobald mindestens eine Synchronisation erfolgreich war
    fn is_synced(&self) -> bool;
}

/// Persistenter Key-Value-Speicher für Einstellungen
///
/// Fehlende Schlüssel liefern den übergebenen Default.
pub trait KeyValueStore {
    fn get_str(&mut self, key: SettingKey, default: &str) -> Result<SettingValue, StoreError>;
    fn put_str(&mut self, key: SettingKey, value: &str) -> Result<(), StoreError>;
    fn get_u8(&mut self, key: SettingKey, default: u8) -> Result<u8, StoreError>;
    fn put_u8(&mut self, key: SettingKey, value: u8) -> Result<(), StoreError>;
}

/// Vier Ausgangsleitungen pro Ziffer (BCD, LSB zuerst)
pub trait DigitLines {
    fn set_digit(&mut self, position: DigitPosition, bits: [bool; 4]);
}

/// Trait für den RGB-Indikator-Strip
///
/// Füllt alle LEDs des Strips mit einer Farbe.
pub trait IndicatorWriter {
    /// Schreibt eine RGB-Farbe auf den Strip
    ///
    /// # Fehlerbehandlung
    /// Gibt `LedError::WriteFailed` zurück wenn Hardware-Zugriff fehlschlägt
    fn write(&mut self, color: RGB8) -> Result<(), LedError>;
}
