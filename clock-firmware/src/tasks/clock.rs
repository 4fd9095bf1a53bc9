// Clock Task - treibt die Render Loop
use core::iter;

use clock_core::connectivity::BOOT_POLL_INTERVAL_MS;
use clock_core::{AttemptStatus, CycleReport, DisplayDigits, RenderLoop, Transition};
use defmt::{error, info, warn};
use embassy_time::{Duration, Instant, Timer};

use crate::config::{ACCESS_POINT, CLOCK_TICK_MS};
use crate::hal::{GpioDigitLines, RadioControl, RmtLedWriter, SettingsStore, SntpClock};
use crate::{ConfigReceiver, StatusCell};

/// Render Loop mit den Hardware-Adaptern
pub type ClockLoop =
    RenderLoop<RadioControl, SntpClock, SettingsStore, GpioDigitLines, RmtLedWriter<'static>>;

fn uptime_ms() -> u64 {
    Instant::now().as_millis()
}

/// Clock Task
///
/// 1. Boot: Einstellungen laden, Access Point starten, bis zu 5 s auf
///    die gespeicherte Verbindung warten
/// 2. Danach alle `CLOCK_TICK_MS` ein Zyklus mit allen Kommandos aus
///    dem Portal, die seit dem letzten Zyklus eingegangen sind
#[embassy_executor::task]
pub async fn clock_task(
    mut render: ClockLoop,
    commands: ConfigReceiver,
    status: &'static StatusCell,
) {
    info!("Clock: Booting...");

    let boot = render.begin_boot(ACCESS_POINT, uptime_ms());
    if let Some(e) = boot.store_error {
        error!("Storage: Failed to load settings, using defaults: {}", e);
    }
    let mut state = boot.state;
    info!(
        "Clock: Timezone {}, brightness {}-{}",
        state.settings.timezone,
        state.settings.brightness.min,
        state.settings.brightness.max
    );

    if let Some(credentials) = &state.settings.credentials {
        info!("WiFi: Trying stored network '{}'", credentials.ssid());
        loop {
            match render.poll_boot(&mut state, uptime_ms()) {
                AttemptStatus::Pending => {
                    Timer::after(Duration::from_millis(BOOT_POLL_INTERVAL_MS)).await
                }
                AttemptStatus::Connected => {
                    info!("WiFi: Internet connected, tearing down AP");
                    break;
                }
                AttemptStatus::TimedOut => {
                    warn!("WiFi: No connection at boot, keeping AP active");
                    break;
                }
            }
        }
    } else {
        info!("WiFi: No stored credentials, portal only");
    }

    let mut shown: Option<DisplayDigits> = None;

    loop {
        let report = render.cycle(&mut state, iter::from_fn(|| commands.try_receive().ok()));
        log_report(&report);

        if shown != Some(report.digits) {
            info!("Clock: {}", report.local);
            shown = Some(report.digits);
        }

        let snapshot = render.status(&state, &report);
        status.lock(|cell| cell.set(snapshot));

        Timer::after(Duration::from_millis(CLOCK_TICK_MS)).await;
    }
}

fn log_report(report: &CycleReport) {
    if report.commands_applied > 0 {
        info!("Clock: Applied {} setting(s)", report.commands_applied);
    }
    match report.transition {
        Some(Transition::ClientEstablished) => info!("WiFi: Internet connected, tearing down AP"),
        Some(Transition::ClientLost) => warn!("WiFi: Lost internet, restarting AP"),
        None => {}
    }
    if report.radio_busy {
        warn!("WiFi: Radio busy, retrying next cycle");
    }
    if let Some(reason) = report.sync {
        info!("Clock: Time sync requested ({})", reason);
    }
    if let Some(e) = report.sync_error {
        warn!("Clock: Time sync not started: {}", e);
    }
    if let Some(e) = report.store_error {
        error!("Storage: Failed to save setting: {}", e);
    }
    if let Some(e) = report.indicator_error {
        warn!("LED: Indicator write failed: {}", e);
    }
}
