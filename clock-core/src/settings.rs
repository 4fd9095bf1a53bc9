//! Persistente Einstellungen: Schlüssel, Credentials, Helligkeit
//!
//! Das Speicherformat selbst ist Sache des `KeyValueStore`.

use core::fmt;

use heapless::String;

use crate::clock::Timezone;
use crate::traits::{KeyValueStore, StoreError};

/// Maximale Länge eines gespeicherten Werts
pub const SETTING_VALUE_LEN: usize = 64;

/// Gespeicherter String-Wert
pub type SettingValue = String<SETTING_VALUE_LEN>;

/// Default für nicht gesetzte Credentials
///
/// Ein Wert, den niemand als echtes Passwort oder SSID eintippt.
pub const UNSET_CREDENTIAL: &str =
    "C!pbujKY2#4HXbcm5dY!WJX#ns29ff#vEDWmbZ9^d!QfBW@o%Trfj&sPENuVe&sx";

/// Default-Zeitzone
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// WPA2: SSID max. 32 Bytes, PSK 8-64 Zeichen (leer = offenes Netz)
pub const SSID_MAX_LEN: usize = 32;
pub const PSK_MIN_LEN: usize = 8;
pub const PSK_MAX_LEN: usize = 64;

/// Schlüssel im Key-Value-Speicher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingKey {
    WifiSsid,
    WifiPsk,
    Timezone,
    MinBrightness,
    MaxBrightness,
}

impl SettingKey {
    pub const COUNT: usize = 5;

    pub const ALL: [SettingKey; Self::COUNT] = [
        SettingKey::WifiSsid,
        SettingKey::WifiPsk,
        SettingKey::Timezone,
        SettingKey::MinBrightness,
        SettingKey::MaxBrightness,
    ];

    /// Name des Schlüssels im Speicher
    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::WifiSsid => "WiFiSSID",
            SettingKey::WifiPsk => "WiFiPSK",
            SettingKey::Timezone => "timezone",
            SettingKey::MinBrightness => "minBrightness",
            SettingKey::MaxBrightness => "maxBrightness",
        }
    }

    pub fn index(self) -> usize {
        match self {
            SettingKey::WifiSsid => 0,
            SettingKey::WifiPsk => 1,
            SettingKey::Timezone => 2,
            SettingKey::MinBrightness => 3,
            SettingKey::MaxBrightness => 4,
        }
    }
}

/// Ablehnungsgrund für WLAN-Zugangsdaten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CredentialsError {
    EmptySsid,
    SsidTooLong,
    PskTooShort,
    PskTooLong,
    /// Entspricht dem Marker für "nicht gesetzt"
    Reserved,
}

/// WLAN-Zugangsdaten (SSID + Pre-Shared Key)
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    ssid: String<SSID_MAX_LEN>,
    psk: String<PSK_MAX_LEN>,
}

impl Credentials {
    /// Validiert und erstellt Zugangsdaten
    pub fn new(ssid: &str, psk: &str) -> Result<Self, CredentialsError> {
        if ssid.is_empty() {
            return Err(CredentialsError::EmptySsid);
        }
        if ssid == UNSET_CREDENTIAL || psk == UNSET_CREDENTIAL {
            return Err(CredentialsError::Reserved);
        }
        if !psk.is_empty() && psk.len() < PSK_MIN_LEN {
            return Err(CredentialsError::PskTooShort);
        }

        let mut stored_ssid = String::new();
        stored_ssid
            .push_str(ssid)
            .map_err(|_| CredentialsError::SsidTooLong)?;
        let mut stored_psk = String::new();
        stored_psk
            .push_str(psk)
            .map_err(|_| CredentialsError::PskTooLong)?;

        Ok(Self {
            ssid: stored_ssid,
            psk: stored_psk,
        })
    }

    /// Zugangsdaten aus dem Speicher; `None` wenn nicht konfiguriert
    pub fn from_stored(ssid: &str, psk: &str) -> Option<Self> {
        if ssid == UNSET_CREDENTIAL || psk == UNSET_CREDENTIAL {
            return None;
        }
        Self::new(ssid, psk).ok()
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn psk(&self) -> &str {
        &self.psk
    }

    /// Offenes Netzwerk ohne Passwort
    pub fn is_open(&self) -> bool {
        self.psk.is_empty()
    }
}

// PSK taucht nie in Logs auf
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("ssid", &self.ssid.as_str())
            .field("psk", &"<redacted>")
            .finish()
    }
}

/// Ungültiger Helligkeitsbereich (min > max)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvertedRange;

/// Helligkeitsgrenzen des Indikator-Strips (0-255)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Brightness {
    pub min: u8,
    pub max: u8,
}

impl Brightness {
    pub const DEFAULT: Brightness = Brightness { min: 10, max: 255 };

    pub fn new(min: u8, max: u8) -> Result<Self, InvertedRange> {
        if min > max {
            return Err(InvertedRange);
        }
        Ok(Self { min, max })
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Alle Einstellungen, einmal beim Boot gelesen
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Settings {
    pub credentials: Option<Credentials>,
    pub timezone: Timezone,
    pub brightness: Brightness,
}

impl Settings {
    /// Liest alle Schlüssel aus dem Speicher
    ///
    /// Ungültige gespeicherte Werte fallen auf ihre Defaults zurück
    /// (unbekannte Zeitzone → UTC, min > max → Default-Helligkeit).
    pub fn load<S: KeyValueStore>(store: &mut S) -> Result<Self, StoreError> {
        let ssid = store.get_str(SettingKey::WifiSsid, UNSET_CREDENTIAL)?;
        let psk = store.get_str(SettingKey::WifiPsk, UNSET_CREDENTIAL)?;
        let credentials = Credentials::from_stored(&ssid, &psk);

        let timezone_name = store.get_str(SettingKey::Timezone, DEFAULT_TIMEZONE)?;
        let timezone = Timezone::parse(&timezone_name).unwrap_or_default();

        let min = store.get_u8(SettingKey::MinBrightness, Brightness::DEFAULT.min)?;
        let max = store.get_u8(SettingKey::MaxBrightness, Brightness::DEFAULT.max)?;
        let brightness = Brightness::new(min, max).unwrap_or_default();

        Ok(Self {
            credentials,
            timezone,
            brightness,
        })
    }
}
