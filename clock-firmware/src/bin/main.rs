// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
// Verbiete mem::forget - gefährlich bei ESP HAL Types mit DMA-Buffern
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
// Verbiete große Stack-Frames (Stack ist auf Embedded Systemen begrenzt)
#![deny(clippy::large_stack_frames)]

// Heap Allocator (WiFi benötigt dynamischen Speicher)
extern crate alloc;

use core::cell::Cell;

// Embassy Async Runtime
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Ipv4Address, Ipv4Cidr, StackResources, StaticConfigV4};
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Timer};
use static_cell::StaticCell;

// ESP32-S3 HAL
use esp_hal::clock::CpuClock;
use esp_hal::rmt::PulseCode;
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;
use esp_hal_smartled::smart_led_buffer;

// Backtrace bei Panic und println!() Support
use {esp_backtrace as _, esp_println as _};

// Projekt-Module und Konfiguration
use clock_core::{ClockStatus, RenderLoop, SyncedEpoch};
use nixie_clock::config::{
    AP_ADDRESS, AP_PREFIX_LEN, EXTRA_HEAP_SIZE, HTTP_TASKS_PER_STACK, LED_COUNT, RMT_CLOCK_MHZ,
    WIFI_HEAP_SIZE,
};
use nixie_clock::hal::led_writer::LED_BUFFER_SIZE;
use nixie_clock::hal::{
    GpioDigitLines, RadioControl, RmtLedWriter, SettingsStore, SntpClock, digit_output,
    open_flash_store,
};
use nixie_clock::tasks::{
    clock_task, connection_task, dhcp_monitor_task, dhcp_server_task, http_server_task,
    mdns_responder_task, net_task, sntp_task,
};
use nixie_clock::{ConfigChannel, EpochCell, StatusCell, SyncSignal, WifiRequestChannel};

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
// Ohne diesen schlägt das Flashen mit "ESP-IDF App Descriptor missing" fehl
esp_bootloader_esp_idf::esp_app_desc!();

/// Main Entry Point
///
/// Initialisiert Hardware, WiFi (Station + Access Point), startet Embassy
/// Runtime und spawnt Tasks. Danach schläft main() - alle Arbeit läuft in Tasks.
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    // CPU auf maximale Taktfrequenz (240 MHz)
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Heap Allocator initialisieren (WiFi braucht dynamischen Speicher!)
    esp_alloc::heap_allocator!(
        #[esp_hal::ram(reclaimed)]
        size: WIFI_HEAP_SIZE
    );
    esp_alloc::heap_allocator!(size: EXTRA_HEAP_SIZE);

    // Embassy Runtime initialisieren
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Ziffern-Ausgänge (LSB zuerst), siehe Tabelle in config.rs
    let digits = GpioDigitLines::new([
        [
            digit_output(peripherals.GPIO18),
            digit_output(peripherals.GPIO16),
            digit_output(peripherals.GPIO15),
            digit_output(peripherals.GPIO17),
        ],
        [
            digit_output(peripherals.GPIO9),
            digit_output(peripherals.GPIO11),
            digit_output(peripherals.GPIO12),
            digit_output(peripherals.GPIO10),
        ],
        [
            digit_output(peripherals.GPIO38),
            digit_output(peripherals.GPIO36),
            digit_output(peripherals.GPIO35),
            digit_output(peripherals.GPIO37),
        ],
        [
            digit_output(peripherals.GPIO13),
            digit_output(peripherals.GPIO21),
            digit_output(peripherals.GPIO33),
            digit_output(peripherals.GPIO14),
        ],
    ]);

    // Indikator-Strip (Buffer muss 'static sein)
    static LED_BUFFER: StaticCell<[PulseCode; LED_BUFFER_SIZE]> = StaticCell::new();
    let led_buffer = LED_BUFFER.init(smart_led_buffer!(LED_COUNT));
    let indicator = RmtLedWriter::new(
        peripherals.GPIO1,
        peripherals.RMT,
        RMT_CLOCK_MHZ,
        led_buffer,
    )
    .expect("Failed to initialize RMT");

    // Einstellungen aus der NVS-Partition
    let store = SettingsStore::from(open_flash_store(peripherals.FLASH));

    // WiFi Hardware initialisieren
    static RADIO_INIT: StaticCell<esp_radio::Controller> = StaticCell::new();
    let radio_init =
        RADIO_INIT.init(esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller"));

    let (wifi_controller, wifi_interfaces) =
        esp_radio::wifi::new(radio_init, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi");

    // Random seed für TCP/IP Stack (von Hardware RNG)
    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    // Station-Stack (DHCP-Client): HTTP, DNS, SNTP, mDNS
    static STA_RESOURCES: StaticCell<StackResources<8>> = StaticCell::new();
    let (sta_stack, sta_runner) = embassy_net::new(
        wifi_interfaces.sta,
        NetConfig::dhcpv4(Default::default()),
        STA_RESOURCES.init(StackResources::new()),
        seed,
    );

    // Access-Point-Stack (statische Adresse): HTTP, DHCP-Server, mDNS
    let ap_address = Ipv4Address::from(AP_ADDRESS);
    static AP_RESOURCES: StaticCell<StackResources<8>> = StaticCell::new();
    let (ap_stack, ap_runner) = embassy_net::new(
        wifi_interfaces.ap,
        NetConfig::ipv4_static(StaticConfigV4 {
            address: Ipv4Cidr::new(ap_address, AP_PREFIX_LEN),
            gateway: Some(ap_address),
            dns_servers: Default::default(),
        }),
        AP_RESOURCES.init(StackResources::new()),
        seed.wrapping_add(1),
    );

    // Kommunikation zwischen den Tasks
    static CONFIG_CHANNEL: StaticCell<ConfigChannel> = StaticCell::new();
    let config_channel = &*CONFIG_CHANNEL.init(ConfigChannel::new());

    static WIFI_CHANNEL: StaticCell<WifiRequestChannel> = StaticCell::new();
    let wifi_channel = &*WIFI_CHANNEL.init(WifiRequestChannel::new());

    static SYNC_SIGNAL: StaticCell<SyncSignal> = StaticCell::new();
    let sync_signal = &*SYNC_SIGNAL.init(SyncSignal::new());

    static EPOCH: StaticCell<EpochCell> = StaticCell::new();
    let epoch = &*EPOCH.init(Mutex::new(Cell::new(SyncedEpoch::UNSYNCED)));

    static STATUS: StaticCell<StatusCell> = StaticCell::new();
    let status = &*STATUS.init(Mutex::new(Cell::new(ClockStatus::default())));

    // Spawn WiFi Tasks
    spawner
        .spawn(connection_task(wifi_controller, wifi_channel.receiver()))
        .unwrap();
    spawner.spawn(net_task(sta_runner)).unwrap();
    spawner.spawn(net_task(ap_runner)).unwrap();
    spawner.spawn(dhcp_monitor_task(sta_stack)).unwrap();
    spawner.spawn(dhcp_server_task(ap_stack)).unwrap();

    // Spawn SNTP Task
    spawner
        .spawn(sntp_task(sta_stack, sync_signal, epoch))
        .unwrap();

    // Spawn Clock Task (Render Loop)
    let render = RenderLoop::new(
        RadioControl::new(wifi_channel.sender(), sta_stack),
        SntpClock::new(sync_signal, epoch),
        store,
        digits,
        indicator,
    );
    spawner
        .spawn(clock_task(render, config_channel.receiver(), status))
        .unwrap();

    // Spawn HTTP Server Tasks (Portal auf beiden Interfaces)
    for task_id in 0..HTTP_TASKS_PER_STACK {
        spawner
            .spawn(http_server_task(
                task_id,
                "sta",
                sta_stack,
                config_channel.sender(),
                status,
            ))
            .unwrap();
        spawner
            .spawn(http_server_task(
                HTTP_TASKS_PER_STACK + task_id,
                "ap",
                ap_stack,
                config_channel.sender(),
                status,
            ))
            .unwrap();
    }

    // Spawn mDNS Responder Tasks (nixeclock.local)
    spawner.spawn(mdns_responder_task("sta", sta_stack)).unwrap();
    spawner.spawn(mdns_responder_task("ap", ap_stack)).unwrap();

    // Main-Loop: schläft (alle Arbeit läuft in Tasks)
    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}
