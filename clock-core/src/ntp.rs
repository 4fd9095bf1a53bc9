//! SNTP-Paketformat (RFC 4330)
//!
//! Reines Encoding/Decoding; der UDP-Transport liegt in der Firmware.

/// Länge eines SNTP-Pakets in Bytes
pub const NTP_PACKET_LEN: usize = 48;

/// SNTP Port (UDP 123)
pub const NTP_PORT: u16 = 123;

/// Sekunden zwischen 1900-01-01 (NTP) und 1970-01-01 (Unix)
pub const NTP_UNIX_OFFSET: i64 = 2_208_988_800;

const MODE_SERVER: u8 = 4;
const MAX_STRATUM: u8 = 15;
const TRANSMIT_TIMESTAMP: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NtpError {
    /// Paket kürzer als 48 Bytes
    TooShort,
    /// Kein Server-Paket (Mode != 4)
    UnexpectedMode,
    /// Stratum 0: Server verweigert die Antwort
    KissOfDeath,
    /// Stratum > 15: Server selbst nicht synchronisiert
    Unsynchronized,
    /// Transmit Timestamp ist 0
    ZeroTimestamp,
}

/// Client-Anfrage: LI=0, VN=3, Mode=3
pub fn request_packet() -> [u8; NTP_PACKET_LEN] {
    let mut packet = [0u8; NTP_PACKET_LEN];
    packet[0] = 0x1B;
    packet
}

/// Wertet eine Server-Antwort aus und liefert Unix-Sekunden
pub fn parse_response(packet: &[u8]) -> Result<i64, NtpError> {
    if packet.len() < NTP_PACKET_LEN {
        return Err(NtpError::TooShort);
    }
    if packet[0] & 0x07 != MODE_SERVER {
        return Err(NtpError::UnexpectedMode);
    }

    match packet[1] {
        0 => return Err(NtpError::KissOfDeath),
        stratum if stratum > MAX_STRATUM => return Err(NtpError::Unsynchronized),
        _ => {}
    }

    let seconds = u32::from_be_bytes([
        packet[TRANSMIT_TIMESTAMP],
        packet[TRANSMIT_TIMESTAMP + 1],
        packet[TRANSMIT_TIMESTAMP + 2],
        packet[TRANSMIT_TIMESTAMP + 3],
    ]);
    if seconds == 0 {
        return Err(NtpError::ZeroTimestamp);
    }

    // MSB = 0: Era 1 (ab 2036-02-07)
    let ntp_seconds = if seconds & 0x8000_0000 == 0 {
        i64::from(seconds) + (1i64 << 32)
    } else {
        i64::from(seconds)
    };

    Ok(ntp_seconds - NTP_UNIX_OFFSET)
}
