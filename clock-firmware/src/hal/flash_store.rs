// Persistente Einstellungen im Flash
//
// Der Einstellungs-Record liegt am Anfang der NVS-Partition aus der
// Partitionstabelle. Das ESP-IDF NVS-Format wird nicht verwendet.

use clock_core::settings::SettingValue;
use clock_core::{KeyValueStore, RecordStore, SettingKey, StoreError};
use clock_core::storage::RECORD_LEN;
use esp_bootloader_esp_idf::partitions::{
    DataPartitionSubType, PARTITION_TABLE_MAX_LEN, PartitionType, read_partition_table,
};
use esp_storage::FlashStorage;

/// Key-Value-Speicher der Uhr
pub type FlashStore = RecordStore<FlashStorage<'static>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum FlashStoreError {
    PartitionTable,
    PartitionMissing,
    PartitionTooSmall,
    ReadFailed,
}

/// Sucht die NVS-Partition und liest den Record
pub fn open_flash_store(
    flash: esp_hal::peripherals::FLASH<'static>,
) -> Result<FlashStore, FlashStoreError> {
    let mut flash = FlashStorage::new(flash);

    let offset = {
        let mut table_buf = [0u8; PARTITION_TABLE_MAX_LEN];
        let table = read_partition_table(&mut flash, &mut table_buf)
            .map_err(|_| FlashStoreError::PartitionTable)?;

        let (offset, len) = table
            .iter()
            .filter(|entry| !entry.is_read_only())
            .find(|entry| {
                matches!(
                    entry.partition_type(),
                    PartitionType::Data(DataPartitionSubType::Nvs)
                )
            })
            .map(|entry| (entry.offset(), entry.len()))
            .ok_or(FlashStoreError::PartitionMissing)?;

        if (len as usize) < RECORD_LEN {
            return Err(FlashStoreError::PartitionTooSmall);
        }
        offset
    };

    RecordStore::open(flash, offset).map_err(|_| FlashStoreError::ReadFailed)
}

/// Einstellungs-Speicher der Render Loop
///
/// Ohne nutzbare Partition läuft die Uhr mit Defaults weiter; jeder
/// Zugriff meldet dann einen Fehler.
pub enum SettingsStore {
    Flash(FlashStore),
    Unavailable,
}

impl From<Result<FlashStore, FlashStoreError>> for SettingsStore {
    fn from(result: Result<FlashStore, FlashStoreError>) -> Self {
        match result {
            Ok(store) => SettingsStore::Flash(store),
            Err(e) => {
                defmt::error!("Storage: Settings unavailable: {}", e);
                SettingsStore::Unavailable
            }
        }
    }
}

impl KeyValueStore for SettingsStore {
    fn get_str(&mut self, key: SettingKey, default: &str) -> Result<SettingValue, StoreError> {
        match self {
            SettingsStore::Flash(store) => store.get_str(key, default),
            SettingsStore::Unavailable => Err(StoreError::ReadFailed),
        }
    }

    fn put_str(&mut self, key: SettingKey, value: &str) -> Result<(), StoreError> {
        match self {
            SettingsStore::Flash(store) => store.put_str(key, value),
            SettingsStore::Unavailable => Err(StoreError::WriteFailed),
        }
    }

    fn get_u8(&mut self, key: SettingKey, default: u8) -> Result<u8, StoreError> {
        match self {
            SettingsStore::Flash(store) => store.get_u8(key, default),
            SettingsStore::Unavailable => Err(StoreError::ReadFailed),
        }
    }

    fn put_u8(&mut self, key: SettingKey, value: u8) -> Result<(), StoreError> {
        match self {
            SettingsStore::Flash(store) => store.put_u8(key, value),
            SettingsStore::Unavailable => Err(StoreError::WriteFailed),
        }
    }
}
