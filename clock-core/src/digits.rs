//! Digit Encoder
//!
//! Zerlegt Stunde/Minute in vier BCD-Ziffern und setzt pro Ziffer
//! vier Ausgangsleitungen (LSB zuerst).

use crate::traits::DigitLines;

/// Position einer Ziffer auf der Anzeige (von links nach rechts)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DigitPosition {
    HoursTens,
    HoursOnes,
    MinutesTens,
    MinutesOnes,
}

impl DigitPosition {
    pub const ALL: [DigitPosition; 4] = [
        DigitPosition::HoursTens,
        DigitPosition::HoursOnes,
        DigitPosition::MinutesTens,
        DigitPosition::MinutesOnes,
    ];

    pub fn index(self) -> usize {
        match self {
            DigitPosition::HoursTens => 0,
            DigitPosition::HoursOnes => 1,
            DigitPosition::MinutesTens => 2,
            DigitPosition::MinutesOnes => 3,
        }
    }
}

/// Vier BCD-Ziffern einer Uhrzeit
///
/// Abgeleiteter Wert, wird jeden Zyklus neu berechnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayDigits {
    pub hours_tens: u8,
    pub hours_ones: u8,
    pub minutes_tens: u8,
    pub minutes_ones: u8,
}

impl DisplayDigits {
    /// Zerlegt eine Uhrzeit in ihre vier Ziffern
    ///
    /// # Beispiele
    ///
    /// ```
    /// # use clock_core::DisplayDigits;
    /// let digits = DisplayDigits::from_time(23, 59);
    /// assert_eq!(digits.hours_tens, 2);
    /// assert_eq!(digits.minutes_ones, 9);
    /// ```
    pub fn from_time(hours: u8, minutes: u8) -> Self {
        Self {
            hours_tens: hours / 10,
            hours_ones: hours % 10,
            minutes_tens: minutes / 10,
            minutes_ones: minutes % 10,
        }
    }

    pub fn digit(&self, position: DigitPosition) -> u8 {
        match position {
            DigitPosition::HoursTens => self.hours_tens,
            DigitPosition::HoursOnes => self.hours_ones,
            DigitPosition::MinutesTens => self.minutes_tens,
            DigitPosition::MinutesOnes => self.minutes_ones,
        }
    }

    pub fn hours(&self) -> u8 {
        self.hours_tens * 10 + self.hours_ones
    }

    pub fn minutes(&self) -> u8 {
        self.minutes_tens * 10 + self.minutes_ones
    }
}

/// BCD-Muster einer Ziffer, Bit 0 zuerst
pub fn bcd_lines(digit: u8) -> [bool; 4] {
    [
        digit & 0b0001 != 0,
        digit & 0b0010 != 0,
        digit & 0b0100 != 0,
        digit & 0b1000 != 0,
    ]
}

/// Setzt eine Ziffer aus ihren vier Leitungen wieder zusammen
pub fn digit_from_lines(lines: [bool; 4]) -> u8 {
    lines
        .iter()
        .enumerate()
        .fold(0, |acc, (bit, &high)| acc | ((high as u8) << bit))
}

/// Gibt eine Uhrzeit auf den Ziffern-Leitungen aus
///
/// Eingaben sind vom Aufrufer validiert (0-23, 0-59). Reine Funktion der
/// beiden Eingaben: gleiche Eingabe ergibt bitgleiche Ausgabe.
pub fn render<D: DigitLines>(lines: &mut D, hours: u8, minutes: u8) -> DisplayDigits {
    let digits = DisplayDigits::from_time(hours, minutes);
    for position in DigitPosition::ALL {
        lines.set_digit(position, bcd_lines(digits.digit(position)));
    }
    digits
}
