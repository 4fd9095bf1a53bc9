// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen
use clock_core::AccessPoint;

// ============================================================================
// Anzeige (Nixie-Röhren über BCD-Decoder)
// ============================================================================
//
// Pro Ziffer vier Leitungen, LSB zuerst:
//
// | Ziffer         | Bit 0 | Bit 1 | Bit 2 | Bit 3 |
// |----------------|-------|-------|-------|-------|
// | Stunden Zehner | 18    | 16    | 15    | 17    |
// | Stunden Einer  | 9     | 11    | 12    | 10    |
// | Minuten Zehner | 38    | 36    | 35    | 37    |
// | Minuten Einer  | 13    | 21    | 33    | 14    |
//
// Die Zuordnung steckt in `hal::digit_lines` (typisierte GPIO-Peripherals).

/// Takt der Render Loop in Millisekunden
///
/// Mehrere Zyklen pro Sekunde, damit das Stunden-Fenster sicher getroffen wird.
pub const CLOCK_TICK_MS: u64 = 200;

// ============================================================================
// Indikator-LEDs (WS2812)
// ============================================================================

/// Anzahl der LEDs im Strip
pub const LED_COUNT: usize = 4;

/// RMT Taktfrequenz in MHz
/// 80 MHz ist optimal für WS2812 LED-Timing
pub const RMT_CLOCK_MHZ: u32 = 80;

// ============================================================================
// WiFi Konfiguration
// ============================================================================

/// SSID des eigenen Access Points
/// Kann zur Build-Zeit über CLOCK_AP_SSID (.env) überschrieben werden
pub const AP_SSID: &str = match option_env!("CLOCK_AP_SSID") {
    Some(ssid) => ssid,
    None => "NixeClock",
};

/// Passwort des eigenen Access Points (WPA2, mindestens 8 Zeichen)
/// Kann zur Build-Zeit über CLOCK_AP_PASSWORD (.env) überschrieben werden
pub const AP_PASSWORD: &str = match option_env!("CLOCK_AP_PASSWORD") {
    Some(password) => password,
    None => "MinesBigger",
};

pub const ACCESS_POINT: AccessPoint = AccessPoint {
    ssid: AP_SSID,
    psk: AP_PASSWORD,
};

/// Statische Adresse des Access Points (Gateway und DHCP-Server)
pub const AP_ADDRESS: [u8; 4] = [192, 168, 4, 1];

/// Präfix-Länge des Access-Point-Netzes
pub const AP_PREFIX_LEN: u8 = 24;

/// Wartezeit zwischen Verbindungsversuchen im Hintergrund
pub const WIFI_RETRY_DELAY_SECS: u64 = 5;

/// Kapazität der Queue für Funk-Kommandos
pub const WIFI_REQUEST_QUEUE: usize = 4;

/// Heap-Größe für WiFi (Bytes)
/// WiFi benötigt dynamischen Speicher für Pakete
pub const WIFI_HEAP_SIZE: usize = 73744; // 72 KB

/// Zusätzliche Heap-Größe (Bytes)
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

// ============================================================================
// Zeit-Synchronisation
// ============================================================================

/// NTP-Server
pub const NTP_SERVER: &str = "pool.ntp.org";

/// Timeout für eine NTP-Anfrage
pub const NTP_TIMEOUT_MS: u64 = 5000;

// ============================================================================
// DHCP-Server (nur Access Point)
// ============================================================================

/// Wartezeit nach Fehler vor Neustart des Servers
pub const DHCP_RESTART_DELAY_MS: u64 = 500;

/// Paket-Buffer für DHCP (Standard MTU)
pub const DHCP_PACKET_BUFFER_SIZE: usize = 1500;

// ============================================================================
// mDNS-Konfiguration
// ============================================================================

/// mDNS Hostname (ohne .local suffix)
/// Die Uhr ist erreichbar unter: <MDNS_HOSTNAME>.local
pub const MDNS_HOSTNAME: &str = "nixeclock";

/// mDNS TTL (Time To Live) in Sekunden
pub const MDNS_TTL_SECS: u32 = 120;

/// mDNS Reconnect Delay in Sekunden
pub const MDNS_RECONNECT_DELAY_SECS: u64 = 5;

/// mDNS Port (Standard: 5353)
pub const MDNS_PORT: u16 = 5353;

/// mDNS IPv4 Multicast-Adresse (224.0.0.251)
pub const MDNS_MULTICAST_ADDR: [u8; 4] = [224, 0, 0, 251];

/// UDP Buffer-Größen für mDNS (TX, RX in Bytes)
pub const MDNS_UDP_BUFFER_SIZE: usize = 512;

/// mDNS Receive/Send Buffer-Größen in Bytes
pub const MDNS_PACKET_BUFFER_SIZE: usize = 1500;

// ============================================================================
// HTTP Server Konfiguration
// ============================================================================

/// HTTP-Port des Portals
pub const HTTP_PORT: u16 = 80;

/// Server-Tasks pro Netzwerk-Interface
pub const HTTP_TASKS_PER_STACK: usize = 2;

/// HTTP Buffer-Größe in Bytes
/// Für HTTP Request/Response Headers und Body
pub const HTTP_BUFFER_SIZE: usize = 2048;

/// TCP RX Buffer-Größe in Bytes
pub const TCP_RX_BUFFER_SIZE: usize = 1024;

/// TCP TX Buffer-Größe in Bytes
pub const TCP_TX_BUFFER_SIZE: usize = 1024;

/// JSON Serialisierungs-Buffer für GET /status
pub const JSON_STATUS_BUFFER_SIZE: usize = 192;

/// Kapazität der Queue Portal → Render Loop
pub const CONFIG_QUEUE: usize = 4;
