//! Core Types: Konfigurations-Kommandos und Status-Snapshot
//!
//! Datenstrukturen ohne Hardware-Dependencies

use crate::clock::Timezone;
use crate::connectivity::ConnectivityState;
use crate::settings::{Brightness, Credentials};

/// Konfigurations-Kommando vom Portal an die Render Loop
///
/// Wird über einen Channel übergeben und zu Beginn des nächsten
/// Zyklus angewendet (kein gleichzeitiges Ändern während eines Lesevorgangs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Neue WLAN-Zugangsdaten: speichern und sofort neu verbinden
    UpdateCredentials(Credentials),
    /// Neue Helligkeitsgrenzen für den Indikator-Strip
    UpdateBrightness(Brightness),
    /// Neue Zeitzone: speichern, Regeln neu laden, sofort synchronisieren
    UpdateTimezone(Timezone),
}

/// Status-Snapshot nach einem Render-Zyklus (für das Portal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockStatus {
    pub connectivity: ConnectivityState,
    pub hour: u8,
    pub minute: u8,
    pub timezone: Timezone,
    pub brightness: Brightness,
    pub synced: bool,
}

impl Default for ClockStatus {
    fn default() -> Self {
        Self {
            connectivity: ConnectivityState::ApOnly,
            hour: 0,
            minute: 0,
            timezone: Timezone::utc(),
            brightness: Brightness::DEFAULT,
            synced: false,
        }
    }
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigCommand {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            // PSK wird nie geloggt
            ConfigCommand::UpdateCredentials(credentials) => {
                defmt::write!(fmt, "UpdateCredentials {{ ssid: {} }}", credentials.ssid())
            }
            ConfigCommand::UpdateBrightness(brightness) => {
                defmt::write!(
                    fmt,
                    "UpdateBrightness {{ min: {}, max: {} }}",
                    brightness.min,
                    brightness.max
                )
            }
            ConfigCommand::UpdateTimezone(timezone) => {
                defmt::write!(fmt, "UpdateTimezone {{ {} }}", timezone.name())
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ClockStatus {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "ClockStatus {{ {}, {:02}:{:02} {}, synced: {} }}",
            self.connectivity,
            self.hour,
            self.minute,
            self.timezone.name(),
            self.synced
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for crate::clock::Timezone {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.name())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for crate::clock::LocalTime {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "{:02}:{:02}:{:02}",
            self.hour,
            self.minute,
            self.second
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for crate::settings::Credentials {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Credentials {{ ssid: {} }}", self.ssid())
    }
}
