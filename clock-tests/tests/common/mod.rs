//! Mocks für alle externen Kollaborateure der Render Loop
//!
//! Jeder Test-Binary bindet dieses Modul per `mod common;` ein und
//! nutzt nur einen Teil davon.

#![allow(dead_code)]

use clock_core::digits::{DigitPosition, digit_from_lines};
use clock_core::settings::SettingValue;
use clock_core::{
    AccessPoint, Credentials, DigitLines, IndicatorWriter, KeyValueStore, LedError,
    NetworkControl, NetworkError, RenderLoop, SettingKey, StoreError, SyncError, TimeSource,
};
use embedded_storage::{ReadStorage, Storage};
use rgb::RGB8;

pub const TEST_AP: AccessPoint = AccessPoint {
    ssid: "NixeClock",
    psk: "MinesBigger",
};

/// 2023-11-14 22:13:20 UTC
pub const EPOCH: i64 = 1_700_000_000;

pub type TestLoop = RenderLoop<MockNetwork, MockTimeSource, MockStore, MockDigitLines, MockIndicator>;

pub fn test_loop(store: MockStore) -> TestLoop {
    RenderLoop::new(
        MockNetwork::new(),
        MockTimeSource::new(EPOCH),
        store,
        MockDigitLines::new(),
        MockIndicator::new(),
    )
}

// ============================================================================
// Mock Network
// ============================================================================

#[derive(Default)]
pub struct MockNetwork {
    pub connected: bool,
    pub ap_active: bool,
    pub ap_starts: usize,
    pub ap_stops: usize,
    pub connect_requests: Vec<(String, String)>,
    /// Die nächsten N Kommandos werden mit `Busy` abgelehnt (volle Queue)
    pub reject_next: usize,
    pub rejected: usize,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    fn accept(&mut self) -> Result<(), NetworkError> {
        if self.reject_next > 0 {
            self.reject_next -= 1;
            self.rejected += 1;
            return Err(NetworkError::Busy);
        }
        Ok(())
    }
}

impl NetworkControl for MockNetwork {
    fn start_access_point(&mut self, ssid: &str, psk: &str) -> Result<(), NetworkError> {
        assert_eq!(ssid, TEST_AP.ssid);
        assert_eq!(psk, TEST_AP.psk);
        self.accept()?;
        self.ap_active = true;
        self.ap_starts += 1;
        Ok(())
    }

    fn stop_access_point(&mut self) -> Result<(), NetworkError> {
        self.accept()?;
        self.ap_active = false;
        self.ap_stops += 1;
        Ok(())
    }

    fn connect_as_client(&mut self, credentials: &Credentials) -> Result<(), NetworkError> {
        self.accept()?;
        self.connect_requests
            .push((credentials.ssid().into(), credentials.psk().into()));
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

// ============================================================================
// Mock Time Source
// ============================================================================

pub struct MockTimeSource {
    pub epoch: i64,
    pub synced: bool,
    /// Antwort des Zeitservers, `None` = nicht erreichbar
    pub server_epoch: Option<i64>,
    pub sync_calls: usize,
}

impl MockTimeSource {
    pub fn new(epoch: i64) -> Self {
        Self {
            epoch,
            synced: false,
            server_epoch: Some(epoch),
            sync_calls: 0,
        }
    }

    pub fn advance(&mut self, seconds: i64) {
        self.epoch += seconds;
        if let Some(server) = self.server_epoch.as_mut() {
            *server += seconds;
        }
    }
}

impl TimeSource for MockTimeSource {
    fn sync_now(&mut self) -> Result<(), SyncError> {
        self.sync_calls += 1;
        let epoch = self.server_epoch.ok_or(SyncError::Unreachable)?;
        self.epoch = epoch;
        self.synced = true;
        Ok(())
    }

    fn epoch_seconds(&self) -> i64 {
        self.epoch
    }

    fn is_synced(&self) -> bool {
        self.synced
    }
}

// ============================================================================
// Mock Store
// ============================================================================

#[derive(Default)]
pub struct MockStore {
    pub strings: [Option<String>; SettingKey::COUNT],
    pub bytes: [Option<u8>; SettingKey::COUNT],
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub write_count: usize,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(ssid: &str, psk: &str) -> Self {
        let mut store = Self::new();
        store.strings[SettingKey::WifiSsid.index()] = Some(ssid.into());
        store.strings[SettingKey::WifiPsk.index()] = Some(psk.into());
        store
    }

    pub fn string(&self, key: SettingKey) -> Option<&str> {
        self.strings[key.index()].as_deref()
    }

    pub fn byte(&self, key: SettingKey) -> Option<u8> {
        self.bytes[key.index()]
    }

    fn check_write(&mut self) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::WriteFailed);
        }
        self.write_count += 1;
        Ok(())
    }
}

fn value(s: &str) -> Result<SettingValue, StoreError> {
    let mut out = SettingValue::new();
    out.push_str(s).map_err(|_| StoreError::ValueTooLong)?;
    Ok(out)
}

impl KeyValueStore for MockStore {
    fn get_str(&mut self, key: SettingKey, default: &str) -> Result<SettingValue, StoreError> {
        if self.fail_reads {
            return Err(StoreError::ReadFailed);
        }
        value(self.string(key).unwrap_or(default))
    }

    fn put_str(&mut self, key: SettingKey, value: &str) -> Result<(), StoreError> {
        self.check_write()?;
        self.strings[key.index()] = Some(value.into());
        Ok(())
    }

    fn get_u8(&mut self, key: SettingKey, default: u8) -> Result<u8, StoreError> {
        if self.fail_reads {
            return Err(StoreError::ReadFailed);
        }
        Ok(self.byte(key).unwrap_or(default))
    }

    fn put_u8(&mut self, key: SettingKey, value: u8) -> Result<(), StoreError> {
        self.check_write()?;
        self.bytes[key.index()] = Some(value);
        Ok(())
    }
}

// ============================================================================
// Mock Digit Lines
// ============================================================================

#[derive(Default)]
pub struct MockDigitLines {
    pub lines: [[bool; 4]; 4],
    pub set_count: usize,
}

impl MockDigitLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Angezeigte Ziffern, zurückgerechnet aus den Leitungen
    pub fn shown(&self) -> [u8; 4] {
        self.lines.map(digit_from_lines)
    }
}

impl DigitLines for MockDigitLines {
    fn set_digit(&mut self, position: DigitPosition, bits: [bool; 4]) {
        self.lines[position.index()] = bits;
        self.set_count += 1;
    }
}

// ============================================================================
// Mock Indicator
// ============================================================================

#[derive(Default)]
pub struct MockIndicator {
    pub last_color: Option<RGB8>,
    pub write_count: usize,
    pub fail_next_write: bool,
}

impl MockIndicator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IndicatorWriter for MockIndicator {
    fn write(&mut self, color: RGB8) -> Result<(), LedError> {
        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(LedError::WriteFailed);
        }

        self.last_color = Some(color);
        self.write_count += 1;
        Ok(())
    }
}

// ============================================================================
// RAM Flash
// ============================================================================

/// Flash-Ersatz im RAM, gelöscht = 0xFF
pub struct RamFlash {
    pub data: Vec<u8>,
    pub write_count: usize,
    pub fail_writes: bool,
}

impl RamFlash {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0xFF; capacity],
            write_count: 0,
            fail_writes: false,
        }
    }
}

#[derive(Debug)]
pub struct OutOfBounds;

impl ReadStorage for RamFlash {
    type Error = OutOfBounds;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        let src = self
            .data
            .get(start..start + bytes.len())
            .ok_or(OutOfBounds)?;
        bytes.copy_from_slice(src);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }
}

impl Storage for RamFlash {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(OutOfBounds);
        }
        let start = offset as usize;
        let dst = self
            .data
            .get_mut(start..start + bytes.len())
            .ok_or(OutOfBounds)?;
        dst.copy_from_slice(bytes);
        self.write_count += 1;
        Ok(())
    }
}
