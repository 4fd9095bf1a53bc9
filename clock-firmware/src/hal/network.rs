// NetworkControl-Adapter
//
// Der WifiController gehört dem WiFi Task. Die Render Loop schickt nur
// Kommandos und liest den Verbindungs-Zustand vom Station-Stack.

use clock_core::{Credentials, NetworkControl, NetworkError};
use defmt::warn;
use embassy_net::Stack;

use crate::WifiRequestSender;
use crate::tasks::wifi::{WifiRequest, bounded};

pub struct RadioControl {
    requests: WifiRequestSender,
    sta_stack: Stack<'static>,
}

impl RadioControl {
    pub fn new(requests: WifiRequestSender, sta_stack: Stack<'static>) -> Self {
        Self {
            requests,
            sta_stack,
        }
    }

    // Queue voll: der WiFi Task hängt in einem Verbindungsversuch.
    // Der Zustandsautomat übernimmt nichts und fragt im nächsten Zyklus neu an.
    fn send(&mut self, request: WifiRequest) -> Result<(), NetworkError> {
        self.requests.try_send(request).map_err(|_| {
            warn!("WiFi: Request queue full");
            NetworkError::Busy
        })
    }
}

impl NetworkControl for RadioControl {
    fn start_access_point(&mut self, ssid: &str, psk: &str) -> Result<(), NetworkError> {
        self.send(WifiRequest::StartAccessPoint {
            ssid: bounded(ssid),
            psk: bounded(psk),
        })
    }

    fn stop_access_point(&mut self) -> Result<(), NetworkError> {
        self.send(WifiRequest::StopAccessPoint)
    }

    fn connect_as_client(&mut self, credentials: &Credentials) -> Result<(), NetworkError> {
        self.send(WifiRequest::Connect(credentials.clone()))
    }

    fn is_connected(&self) -> bool {
        self.sta_stack.is_link_up() && self.sta_stack.config_v4().is_some()
    }
}
