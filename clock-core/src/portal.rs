//! Formulare des Konfigurations-Portals
//!
//! Validierung an der Portal-Grenze: fehlerhafte Eingaben werden hier
//! abgelehnt und erreichen den Zustand der Uhr nie.

use heapless::String;

use crate::clock::Timezone;
use crate::settings::{Brightness, Credentials, CredentialsError};
use crate::types::ConfigCommand;

/// Puffergröße für Formularfelder
pub const FORM_FIELD_LEN: usize = 64;

/// Puffergröße für Zahlenfelder
pub const FORM_NUMBER_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormError {
    Credentials(CredentialsError),
    NotANumber,
    OutOfRange,
    InvertedRange,
    UnknownTimezone,
}

impl From<CredentialsError> for FormError {
    fn from(e: CredentialsError) -> Self {
        FormError::Credentials(e)
    }
}

/// POST /updateWiFi
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct WifiForm {
    pub ssid: String<FORM_FIELD_LEN>,
    pub psk: String<FORM_FIELD_LEN>,
}

impl WifiForm {
    pub fn to_command(&self) -> Result<ConfigCommand, FormError> {
        let credentials = Credentials::new(&self.ssid, &self.psk)?;
        Ok(ConfigCommand::UpdateCredentials(credentials))
    }
}

/// POST /updateBrightness
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct BrightnessForm {
    #[cfg_attr(feature = "serde", serde(rename = "minBrightnessSlider"))]
    pub min: String<FORM_NUMBER_LEN>,
    #[cfg_attr(feature = "serde", serde(rename = "maxBrightnessSlider"))]
    pub max: String<FORM_NUMBER_LEN>,
}

impl BrightnessForm {
    pub fn to_command(&self) -> Result<ConfigCommand, FormError> {
        let min = parse_brightness(&self.min)?;
        let max = parse_brightness(&self.max)?;
        let brightness = Brightness::new(min, max).map_err(|_| FormError::InvertedRange)?;
        Ok(ConfigCommand::UpdateBrightness(brightness))
    }
}

/// POST /setTZ
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct TimezoneForm {
    pub timezone: String<FORM_FIELD_LEN>,
}

impl TimezoneForm {
    pub fn to_command(&self) -> Result<ConfigCommand, FormError> {
        let timezone = Timezone::parse(&self.timezone).map_err(|_| FormError::UnknownTimezone)?;
        Ok(ConfigCommand::UpdateTimezone(timezone))
    }
}

/// Slider-Wert 0-255
pub fn parse_brightness(value: &str) -> Result<u8, FormError> {
    let value: u16 = value.trim().parse().map_err(|_| FormError::NotANumber)?;
    u8::try_from(value).map_err(|_| FormError::OutOfRange)
}
