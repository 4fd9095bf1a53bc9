// WiFi Task - Besitzt den WifiController und setzt Funk-Kommandos um
use clock_core::Credentials;
use defmt::{Debug2Format, error, info, warn};
use embassy_futures::select::{Either, select};
use embassy_net::{Runner, Stack};
use embassy_time::{Duration, Timer};
use esp_radio::wifi::{
    AccessPointConfig, AuthMethod, ClientConfig, ModeConfig, WifiController, WifiDevice,
};
use heapless::String;

use crate::WifiRequestReceiver;
use crate::config::WIFI_RETRY_DELAY_SECS;

/// Kommando an den WiFi Task
#[derive(Debug, Clone)]
pub enum WifiRequest {
    /// Access Point zusätzlich zum Client-Modus starten
    StartAccessPoint { ssid: String<32>, psk: String<64> },
    /// Access Point abbauen, Client-Verbindung bleibt bestehen
    StopAccessPoint,
    /// Mit neuen Zugangsdaten verbinden
    Connect(Credentials),
}

/// Kürzt auf die Kapazität des Ziel-Strings
pub fn bounded<const N: usize>(value: &str) -> String<N> {
    let mut out = String::new();
    for c in value.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Gewünschter Funk-Zustand
#[derive(Default)]
struct RadioState {
    access_point: Option<(String<32>, String<64>)>,
    credentials: Option<Credentials>,
}

impl RadioState {
    fn mode_config(&self) -> ModeConfig {
        let client = match &self.credentials {
            Some(credentials) => ClientConfig::default()
                .with_ssid(credentials.ssid().into())
                .with_password(credentials.psk().into())
                .with_auth_method(if credentials.is_open() {
                    AuthMethod::None
                } else {
                    AuthMethod::Wpa2Personal
                }),
            None => ClientConfig::default(),
        };

        match &self.access_point {
            Some((ssid, psk)) => ModeConfig::ApSta(
                client,
                AccessPointConfig::default()
                    .with_ssid(ssid.as_str().into())
                    .with_password(psk.as_str().into())
                    .with_auth_method(AuthMethod::Wpa2Personal),
            ),
            None => ModeConfig::Client(client),
        }
    }
}

/// WiFi Connection Task
///
/// Managed die WiFi-Verbindung:
/// - Schaltet zwischen AP+STA und reinem STA um
/// - Verbindet mit neuen Zugangsdaten
/// - Versucht es im Hintergrund alle `WIFI_RETRY_DELAY_SECS` erneut
#[embassy_executor::task]
pub async fn connection_task(
    mut controller: WifiController<'static>,
    requests: WifiRequestReceiver,
) {
    info!("WiFi: Starting connection task");

    let mut radio = RadioState::default();

    loop {
        let request = match select(
            requests.receive(),
            Timer::after(Duration::from_secs(WIFI_RETRY_DELAY_SECS)),
        )
        .await
        {
            Either::First(request) => request,
            Either::Second(()) => {
                if radio.credentials.is_some() && !is_connected(&controller) {
                    connect(&mut controller).await;
                }
                continue;
            }
        };

        match request {
            WifiRequest::StartAccessPoint { ssid, psk } => {
                info!("WiFi: Starting access point '{}'", ssid.as_str());
                radio.access_point = Some((ssid, psk));
                apply_config(&mut controller, &radio).await;
            }
            WifiRequest::StopAccessPoint => {
                info!("WiFi: Tearing down access point");
                radio.access_point = None;
                apply_config(&mut controller, &radio).await;
            }
            WifiRequest::Connect(credentials) => {
                info!("WiFi: New credentials for '{}'", credentials.ssid());
                radio.credentials = Some(credentials);
                apply_config(&mut controller, &radio).await;
                if is_connected(&controller) {
                    if let Err(e) = controller.disconnect_async().await {
                        warn!("WiFi: Disconnect failed: {}", Debug2Format(&e));
                    }
                }
                connect(&mut controller).await;
            }
        }
    }
}

fn is_connected(controller: &WifiController<'static>) -> bool {
    matches!(controller.is_connected(), Ok(true))
}

/// Setzt die Konfiguration und startet den Controller bei Bedarf
///
/// Ein laufender Controller wird nicht gestoppt, damit eine bestehende
/// Client-Verbindung den Moduswechsel übersteht.
async fn apply_config(controller: &mut WifiController<'static>, radio: &RadioState) {
    if let Err(e) = controller.set_config(&radio.mode_config()) {
        error!("WiFi: Failed to set configuration: {}", Debug2Format(&e));
        return;
    }

    if matches!(controller.is_started(), Ok(false)) {
        match controller.start_async().await {
            Ok(()) => info!("WiFi: Started successfully"),
            Err(e) => error!("WiFi: Failed to start: {}", Debug2Format(&e)),
        }
    }
}

async fn connect(controller: &mut WifiController<'static>) {
    info!("WiFi: Connecting...");
    match controller.connect_async().await {
        Ok(()) => info!("WiFi: Connected successfully!"),
        Err(e) => warn!("WiFi: Connection failed: {}", Debug2Format(&e)),
    }
}

/// Network Task
///
/// Prozessiert die Pakete eines Interfaces (Station oder Access Point).
#[embassy_executor::task(pool_size = 2)]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}

/// DHCP Monitor Task
///
/// Loggt jede neue Netzwerk-Konfiguration des Station-Interfaces
#[embassy_executor::task]
pub async fn dhcp_monitor_task(stack: Stack<'static>) {
    loop {
        stack.wait_config_up().await;
        if let Some(config) = stack.config_v4() {
            info!("WiFi: Got IP address!");
            info!("  IP:      {}", Debug2Format(&config.address.address()));
            info!("  Gateway: {}", Debug2Format(&config.gateway));
            info!("  DNS:     {}", Debug2Format(&config.dns_servers));
        }

        stack.wait_config_down().await;
        warn!("WiFi: Lost IP configuration");
    }
}
