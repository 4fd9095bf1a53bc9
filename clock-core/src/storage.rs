//! Einstellungs-Record im Flash
//!
//! Ein einzelner Record an fester Adresse:
//!
//! ```text
//! [magic: 4][version: 1][slot 0][slot 1]...[slot 4]
//! slot = [len: 1][payload: 64]
//! ```
//!
//! Gelöschter Flash (0xFF) bzw. `len > 64` bedeutet "nicht gesetzt".
//! Jedes `put` schreibt den kompletten Record neu.

use embedded_storage::{ReadStorage, Storage};

use crate::settings::{SETTING_VALUE_LEN, SettingKey, SettingValue};
use crate::traits::{KeyValueStore, StoreError};

pub const RECORD_MAGIC: u32 = 0x4B43_4C4E; // "NLCK"
pub const RECORD_VERSION: u8 = 1;

const HEADER_LEN: usize = 5;
const SLOT_LEN: usize = 1 + SETTING_VALUE_LEN;
const SLOT_UNSET: u8 = 0xFF;

/// Gesamtlänge des Records in Bytes
pub const RECORD_LEN: usize = HEADER_LEN + SettingKey::COUNT * SLOT_LEN;

/// Key-Value-Speicher über einem `embedded-storage` Flash-Bereich
pub struct RecordStore<F> {
    flash: F,
    offset: u32,
    record: [u8; RECORD_LEN],
}

impl<F: ReadStorage + Storage> RecordStore<F> {
    /// Liest den Record; fehlt er oder ist die Version fremd, sind alle
    /// Schlüssel ungesetzt
    pub fn open(mut flash: F, offset: u32) -> Result<Self, StoreError> {
        let mut record = [0u8; RECORD_LEN];
        flash
            .read(offset, &mut record)
            .map_err(|_| StoreError::ReadFailed)?;

        let magic = u32::from_le_bytes([record[0], record[1], record[2], record[3]]);
        if magic != RECORD_MAGIC || record[4] != RECORD_VERSION {
            record = empty_record();
        }

        Ok(Self {
            flash,
            offset,
            record,
        })
    }

    /// true wenn der Schlüssel einen gespeicherten Wert hat
    pub fn contains(&self, key: SettingKey) -> bool {
        self.slot(key).is_some()
    }

    pub fn into_inner(self) -> F {
        self.flash
    }

    fn slot(&self, key: SettingKey) -> Option<&[u8]> {
        let base = HEADER_LEN + key.index() * SLOT_LEN;
        let len = usize::from(self.record[base]);
        if len > SETTING_VALUE_LEN {
            return None;
        }
        Some(&self.record[base + 1..base + 1 + len])
    }

    fn write_slot(&mut self, key: SettingKey, value: &[u8]) -> Result<(), StoreError> {
        if value.len() > SETTING_VALUE_LEN {
            return Err(StoreError::ValueTooLong);
        }

        let base = HEADER_LEN + key.index() * SLOT_LEN;
        let payload = &mut self.record[base + 1..base + SLOT_LEN];
        payload.fill(SLOT_UNSET);
        payload[..value.len()].copy_from_slice(value);
        self.record[base] = value.len() as u8;

        self.flash
            .write(self.offset, &self.record)
            .map_err(|_| StoreError::WriteFailed)
    }
}

fn empty_record() -> [u8; RECORD_LEN] {
    let mut record = [SLOT_UNSET; RECORD_LEN];
    record[..4].copy_from_slice(&RECORD_MAGIC.to_le_bytes());
    record[4] = RECORD_VERSION;
    record
}

fn to_value(value: &str) -> Result<SettingValue, StoreError> {
    let mut out = SettingValue::new();
    out.push_str(value).map_err(|_| StoreError::ValueTooLong)?;
    Ok(out)
}

impl<F: ReadStorage + Storage> KeyValueStore for RecordStore<F> {
    fn get_str(&mut self, key: SettingKey, default: &str) -> Result<SettingValue, StoreError> {
        // Ungültiges UTF-8 zählt wie ein fehlender Wert
        match self.slot(key).map(core::str::from_utf8) {
            Some(Ok(value)) => to_value(value),
            _ => to_value(default),
        }
    }

    fn put_str(&mut self, key: SettingKey, value: &str) -> Result<(), StoreError> {
        self.write_slot(key, value.as_bytes())
    }

    fn get_u8(&mut self, key: SettingKey, default: u8) -> Result<u8, StoreError> {
        match self.slot(key) {
            Some([value]) => Ok(*value),
            _ => Ok(default),
        }
    }

    fn put_u8(&mut self, key: SettingKey, value: u8) -> Result<(), StoreError> {
        self.write_slot(key, &[value])
    }
}
