// Ziffern-Ausgänge: 4 Ziffern × 4 BCD-Leitungen
//
// Die Röhren hängen an BCD-zu-Dezimal-Decodern. Jede Leitung ist ein
// einfacher Push-Pull-Ausgang.

use clock_core::{DigitLines, DigitPosition};
use esp_hal::gpio::{Level, Output, OutputConfig, OutputPin};

/// Leitungen einer Ziffer, LSB zuerst
pub type DigitPins = [Output<'static>; 4];

/// GPIO-Implementierung von `DigitLines`
pub struct GpioDigitLines {
    digits: [DigitPins; 4],
}

impl GpioDigitLines {
    /// Erstellt die Ausgänge in der Reihenfolge von `DigitPosition::ALL`
    /// (Stunden Zehner, Stunden Einer, Minuten Zehner, Minuten Einer)
    pub fn new(digits: [DigitPins; 4]) -> Self {
        Self { digits }
    }
}

/// Konfiguriert einen Pin als Ausgang (Low = Ziffer 0)
pub fn digit_output(pin: impl OutputPin + 'static) -> Output<'static> {
    Output::new(pin, Level::Low, OutputConfig::default())
}

impl DigitLines for GpioDigitLines {
    fn set_digit(&mut self, position: DigitPosition, bits: [bool; 4]) {
        let pins = &mut self.digits[position.index()];
        for (pin, bit) in pins.iter_mut().zip(bits) {
            pin.set_level(Level::from(bit));
        }
    }
}
