// Hardware Abstraction Layer (HAL) Module
//
// Adapter zwischen den Traits aus clock-core und der ESP32-S3 Hardware
// bzw. den Embassy Tasks.

pub mod digit_lines;
pub mod flash_store;
pub mod led_writer;
pub mod network;
pub mod time_source;

pub use digit_lines::{GpioDigitLines, digit_output};
pub use flash_store::{FlashStore, FlashStoreError, SettingsStore, open_flash_store};
pub use led_writer::RmtLedWriter;
pub use network::RadioControl;
pub use time_source::SntpClock;
