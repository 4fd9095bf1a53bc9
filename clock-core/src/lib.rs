//! Clock Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert den Verbindungs-Zustandsautomaten, die Zeit-Sync-Policy,
//! den Digit Encoder und die Render Loop, dazu die Traits für alle
//! externen Kollaborateure (Funk, Zeitquelle, Flash, Ausgänge).

#![no_std]

pub mod clock;
pub mod connectivity;
pub mod digits;
pub mod indicator;
pub mod ntp;
pub mod portal;
pub mod render;
pub mod settings;
pub mod storage;
pub mod sync;
pub mod traits;
pub mod types;

// Re-exports für einfachen Zugriff
pub use clock::{LocalTime, SyncedEpoch, Timezone, TimezoneError};
pub use connectivity::{AccessPoint, AttemptStatus, Connectivity, ConnectivityState, Transition};
pub use digits::{DigitPosition, DisplayDigits, render as render_digits};
pub use indicator::indicator_color;
pub use render::{Boot, ClockState, CycleReport, RenderLoop};
pub use settings::{Brightness, Credentials, CredentialsError, SettingKey, Settings};
pub use storage::RecordStore;
pub use sync::{SyncPolicy, SyncReason};
pub use traits::{
    DigitLines, IndicatorWriter, KeyValueStore, LedError, NetworkControl, NetworkError, StoreError,
    SyncError, TimeSource,
};
pub use types::{ClockStatus, ConfigCommand};
