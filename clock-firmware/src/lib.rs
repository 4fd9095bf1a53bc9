// Library-Root: Tasks, Hardware-Adapter und Portal der Nixie-Uhr
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

extern crate alloc;

// Module
pub mod config;
pub mod hal;
pub mod tasks;
pub mod web;

use core::cell::Cell;

// Re-exports von clock-core
pub use clock_core::{ClockStatus, ConfigCommand, SyncedEpoch};

// Embassy Channel-Typen
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_sync::signal::Signal;

use crate::config::{CONFIG_QUEUE, WIFI_REQUEST_QUEUE};
use crate::tasks::wifi::WifiRequest;

// ============================================================================
// Type-Aliase für Channel-Typen
// ============================================================================
//
// Diese Type-Aliase vereinfachen die Lesbarkeit der Funktionssignaturen.
// Statt:  Sender<'static, NoopRawMutex, ConfigCommand, 4>
// Nutze:  ConfigSender

/// Channel für Konfigurations-Kommandos (Portal → Render Loop)
pub type ConfigChannel = Channel<NoopRawMutex, ConfigCommand, CONFIG_QUEUE>;

/// Sender für Konfigurations-Kommandos (HTTP Tasks)
pub type ConfigSender = Sender<'static, NoopRawMutex, ConfigCommand, CONFIG_QUEUE>;

/// Receiver für Konfigurations-Kommandos (Render Loop leert ihn pro Zyklus)
pub type ConfigReceiver = Receiver<'static, NoopRawMutex, ConfigCommand, CONFIG_QUEUE>;

/// Channel für Funk-Kommandos (Render Loop → WiFi Task)
pub type WifiRequestChannel = Channel<NoopRawMutex, WifiRequest, WIFI_REQUEST_QUEUE>;

/// Sender für Funk-Kommandos
pub type WifiRequestSender = Sender<'static, NoopRawMutex, WifiRequest, WIFI_REQUEST_QUEUE>;

/// Receiver für Funk-Kommandos (nur der WiFi Task besitzt den Controller)
pub type WifiRequestReceiver = Receiver<'static, NoopRawMutex, WifiRequest, WIFI_REQUEST_QUEUE>;

/// Sync-Anforderung (Render Loop → SNTP Task)
pub type SyncSignal = Signal<NoopRawMutex, ()>;

/// Letzte erfolgreiche Synchronisation (SNTP Task schreibt, Render Loop liest)
pub type EpochCell = Mutex<NoopRawMutex, Cell<SyncedEpoch>>;

/// Status-Snapshot (Render Loop schreibt, HTTP Tasks lesen)
pub type StatusCell = Mutex<NoopRawMutex, Cell<ClockStatus>>;
