// JSON-Protokoll des Portals
// GET /status liefert den Zustand der Uhr für die Statuszeile der Seite

use clock_core::portal::FormError;
use clock_core::{ClockStatus, ConnectivityState, CredentialsError};
use serde::Serialize;

/// Verbindungs-Zustand für JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionMode {
    AccessPoint,
    Connecting,
    Client,
}

impl From<ConnectivityState> for ConnectionMode {
    fn from(state: ConnectivityState) -> Self {
        match state {
            ConnectivityState::ApOnly => ConnectionMode::AccessPoint,
            ConnectivityState::Connecting => ConnectionMode::Connecting,
            ConnectivityState::ClientOnly => ConnectionMode::Client,
        }
    }
}

/// Server → Client: Status-Snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub mode: ConnectionMode,
    pub hour: u8,
    pub minute: u8,
    pub timezone: &'static str,
    pub min_brightness: u8,
    pub max_brightness: u8,
    pub synced: bool,
}

impl From<ClockStatus> for StatusMessage {
    fn from(status: ClockStatus) -> Self {
        Self {
            mode: status.connectivity.into(),
            hour: status.hour,
            minute: status.minute,
            timezone: status.timezone.name(),
            min_brightness: status.brightness.min,
            max_brightness: status.brightness.max,
            synced: status.synced,
        }
    }
}

/// Klartext für 400-Antworten
pub fn form_error_text(error: FormError) -> &'static str {
    match error {
        FormError::Credentials(CredentialsError::EmptySsid) => "SSID must not be empty",
        FormError::Credentials(CredentialsError::SsidTooLong) => "SSID too long (max 32)",
        FormError::Credentials(CredentialsError::PskTooShort) => "Password too short (min 8)",
        FormError::Credentials(CredentialsError::PskTooLong) => "Password too long (max 64)",
        FormError::Credentials(CredentialsError::Reserved) => "Reserved value",
        FormError::NotANumber => "Brightness must be a number",
        FormError::OutOfRange => "Brightness must be 0-255",
        FormError::InvertedRange => "Minimum brightness above maximum",
        FormError::UnknownTimezone => "Unknown timezone",
    }
}
