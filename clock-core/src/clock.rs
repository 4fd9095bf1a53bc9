//! Zeitzone, lokale Uhrzeit und synchronisierte Epoche
//!
//! Die lokale Zeit wird IMMER aus der Epoche + Zeitzonen-Regel berechnet,
//! nie aus einer separat hochgezählten Uhr. Dadurch greifen
//! Sommerzeit-Umstellungen ohne Sonderfälle.

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

/// Unbekannter Zeitzonen-Bezeichner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimezoneError {
    Unknown,
}

/// IANA-Zeitzone (z.B. "Europe/Berlin") inkl. Sommerzeit-Regeln
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(Tz);

impl Timezone {
    pub fn utc() -> Self {
        Self(Tz::UTC)
    }

    /// Sucht eine Zeitzone anhand ihres IANA-Namens
    pub fn parse(name: &str) -> Result<Self, TimezoneError> {
        name.trim()
            .parse::<Tz>()
            .map(Self)
            .map_err(|_| TimezoneError::Unknown)
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self::utc()
    }
}

/// Lokale Uhrzeit zu einer Epoche
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Epoche des Beginns der aktuellen lokalen Stunde
    ///
    /// Eindeutig pro Stundenwechsel, auch wenn sich eine lokale Stunde bei
    /// der Zeitumstellung wiederholt.
    pub hour_start_epoch: i64,
}

impl LocalTime {
    /// Leitet die lokale Uhrzeit aus Epoche und Zeitzone ab
    ///
    /// Epochen außerhalb des darstellbaren Bereichs werden als 0 behandelt.
    pub fn from_epoch(epoch: i64, timezone: Timezone) -> Self {
        let (epoch, utc) = match DateTime::<Utc>::from_timestamp(epoch, 0) {
            Some(utc) => (epoch, utc),
            None => (0, DateTime::<Utc>::default()),
        };
        let local = utc.with_timezone(&timezone.0);

        let minute = local.minute() as u8;
        let second = local.second() as u8;
        Self {
            hour: local.hour() as u8,
            minute,
            second,
            hour_start_epoch: epoch - i64::from(minute) * 60 - i64::from(second),
        }
    }
}

/// Letzte erfolgreiche Synchronisation, fortgeschrieben über die Uptime
///
/// Vor der ersten Synchronisation zählt die Epoche ab 0 (1970-01-01).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncedEpoch {
    epoch_at_sync: i64,
    uptime_ms_at_sync: u64,
    synced: bool,
}

impl SyncedEpoch {
    pub const UNSYNCED: SyncedEpoch = SyncedEpoch {
        epoch_at_sync: 0,
        uptime_ms_at_sync: 0,
        synced: false,
    };

    pub fn new(epoch_at_sync: i64, uptime_ms_at_sync: u64) -> Self {
        Self {
            epoch_at_sync,
            uptime_ms_at_sync,
            synced: true,
        }
    }

    /// Epoche zum Zeitpunkt `uptime_ms`
    pub fn now(&self, uptime_ms: u64) -> i64 {
        let elapsed_secs = uptime_ms.saturating_sub(self.uptime_ms_at_sync) / 1000;
        self.epoch_at_sync + elapsed_secs as i64
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }
}

impl Default for SyncedEpoch {
    fn default() -> Self {
        Self::UNSYNCED
    }
}
