//! RGB-Indikator: Farbe des Strips aus Verbindungszustand und Helligkeit

use rgb::RGB8;

use crate::settings::Brightness;

/// Grundfarbe des Strips (Lila)
pub const INDICATOR_BASE: RGB8 = RGB8 {
    r: 0x80,
    g: 0x00,
    b: 0x80,
};

/// Skaliert einen Kanal mit `level / 256` (wie FastLED `scale8`)
fn scale_channel(value: u8, level: u8) -> u8 {
    ((u16::from(value) * (u16::from(level) + 1)) >> 8) as u8
}

pub fn scale(color: RGB8, level: u8) -> RGB8 {
    RGB8 {
        r: scale_channel(color.r, level),
        g: scale_channel(color.g, level),
        b: scale_channel(color.b, level),
    }
}

/// Indikator-Farbe: gedimmt (`min`) solange der Access Point aktiv ist,
/// volle Helligkeit (`max`) als verbundener Client
pub fn indicator_color(access_point_active: bool, brightness: Brightness) -> RGB8 {
    let level = if access_point_active {
        brightness.min
    } else {
        brightness.max
    };
    scale(INDICATOR_BASE, level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_full_keeps_color() {
        assert_eq!(scale(INDICATOR_BASE, 255), INDICATOR_BASE);
    }

    #[test]
    fn test_scale_zero_turns_off() {
        assert_eq!(scale(INDICATOR_BASE, 0), RGB8 { r: 0, g: 0, b: 0 });
    }

    #[test]
    fn test_indicator_follows_access_point() {
        let brightness = Brightness { min: 10, max: 255 };
        assert_eq!(indicator_color(false, brightness), INDICATOR_BASE);
        assert_eq!(indicator_color(true, brightness), RGB8 { r: 5, g: 0, b: 5 });
    }
}
