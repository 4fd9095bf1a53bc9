//! Connectivity State Machine
//!
//! Entscheidet pro Zyklus, ob das Gerät als Client, als Fallback-Access-Point
//! oder (während eines Verbindungsversuchs) als beides arbeitet.
//!
//! Invariante: Verliert der Client die Verbindung, wird der Access Point
//! wieder aktiviert. Das Gerät ist nie gleichzeitig offline UND nicht
//! konfigurierbar.

use crate::settings::Credentials;
use crate::traits::{NetworkControl, NetworkError};

/// Boot-Verbindungsversuch: harte Deadline in Millisekunden
pub const BOOT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Boot-Verbindungsversuch: Poll-Intervall in Millisekunden
pub const BOOT_POLL_INTERVAL_MS: u64 = 100;

/// Identität des eigenen Access Points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPoint {
    pub ssid: &'static str,
    pub psk: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectivityState {
    /// Nur Access Point aktiv (Client versucht es ggf. im Hintergrund)
    ApOnly,
    /// Boot-Verbindungsversuch läuft, Access Point aktiv
    Connecting,
    /// Client verbunden, Access Point abgebaut
    ClientOnly,
}

/// Zustandswechsel aus den Per-Zyklus-Regeln
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// Regel 1: Client verbunden → Access Point abgebaut
    ClientEstablished,
    /// Regel 2: Client getrennt → Access Point wieder aktiv
    ClientLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AttemptStatus {
    Pending,
    Connected,
    TimedOut,
}

/// Zeitlich begrenzter Verbindungsversuch mit genau einem Ergebnis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectAttempt {
    deadline_ms: u64,
}

impl ConnectAttempt {
    pub fn new(now_ms: u64, timeout_ms: u64) -> Self {
        Self {
            deadline_ms: now_ms.saturating_add(timeout_ms),
        }
    }

    pub fn poll(&self, now_ms: u64, connected: bool) -> AttemptStatus {
        if connected {
            AttemptStatus::Connected
        } else if now_ms >= self.deadline_ms {
            AttemptStatus::TimedOut
        } else {
            AttemptStatus::Pending
        }
    }
}

/// Verbindungs-Zustand (ersetzt das globale `softAPActive`-Flag)
///
/// `soft_ap_active` ändert sich nur, wenn der Funk das Kommando
/// angenommen hat. Ein abgelehntes Kommando lässt die Regel im nächsten
/// Zyklus erneut greifen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connectivity {
    state: ConnectivityState,
    soft_ap_active: bool,
    access_point: AccessPoint,
    attempt: Option<ConnectAttempt>,
    /// Abgelehnter Verbindungsauftrag, wird pro Zyklus wiederholt
    pending_connect: Option<Credentials>,
    radio_busy: bool,
}

impl Connectivity {
    /// Boot-Übergang: startet immer den Access Point
    ///
    /// Sind Credentials vorhanden, beginnt ein Verbindungsversuch mit
    /// Deadline `BOOT_CONNECT_TIMEOUT_MS`; das Ergebnis liefert `poll_boot()`.
    pub fn boot<N: NetworkControl>(
        network: &mut N,
        access_point: AccessPoint,
        credentials: Option<&Credentials>,
        now_ms: u64,
    ) -> Self {
        let mut connectivity = Self {
            state: ConnectivityState::ApOnly,
            soft_ap_active: false,
            access_point,
            attempt: None,
            pending_connect: None,
            radio_busy: false,
        };
        connectivity.soft_ap_active = connectivity.request_access_point(network).is_ok();

        if let Some(credentials) = credentials {
            connectivity.request_connect(network, credentials);
            connectivity.state = ConnectivityState::Connecting;
            connectivity.attempt = Some(ConnectAttempt::new(now_ms, BOOT_CONNECT_TIMEOUT_MS));
        }

        connectivity
    }

    /// Wertet den Boot-Verbindungsversuch aus
    ///
    /// - `Connected`: Access Point wird abgebaut → `ClientOnly`
    /// - `TimedOut`: bleibt `ApOnly`, Client versucht es im Hintergrund weiter
    /// - ohne laufenden Versuch: `TimedOut` (nichts zu warten)
    ///
    /// Nimmt der Funk das Abbauen nicht an, bleibt der Versuch `Pending`.
    pub fn poll_boot<N: NetworkControl>(&mut self, network: &mut N, now_ms: u64) -> AttemptStatus {
        let Some(attempt) = self.attempt else {
            return AttemptStatus::TimedOut;
        };

        self.radio_busy = false;
        self.retry_connect(network);

        match attempt.poll(now_ms, network.is_connected()) {
            AttemptStatus::Pending => AttemptStatus::Pending,
            AttemptStatus::Connected => match self.enter_client_only(network) {
                Ok(()) => {
                    self.attempt = None;
                    AttemptStatus::Connected
                }
                Err(_) => AttemptStatus::Pending,
            },
            AttemptStatus::TimedOut => {
                self.attempt = None;
                self.state = ConnectivityState::ApOnly;
                AttemptStatus::TimedOut
            }
        }
    }

    /// Per-Zyklus-Regeln
    ///
    /// 1. Access Point aktiv und Client verbunden → `ClientOnly`
    /// 2. Access Point inaktiv und Client getrennt → `ApOnly`
    pub fn update<N: NetworkControl>(&mut self, network: &mut N) -> Option<Transition> {
        self.radio_busy = false;
        self.retry_connect(network);

        let connected = network.is_connected();

        if self.soft_ap_active && connected {
            return match self.enter_client_only(network) {
                Ok(()) => {
                    self.attempt = None;
                    Some(Transition::ClientEstablished)
                }
                Err(_) => None,
            };
        }

        if !self.soft_ap_active && !connected {
            if self.request_access_point(network).is_err() {
                return None;
            }
            self.soft_ap_active = true;
            self.state = ConnectivityState::ApOnly;
            return Some(Transition::ClientLost);
        }

        None
    }

    /// Externer Trigger: neue Credentials vom Portal
    ///
    /// Startet sofort einen Verbindungsversuch, ändert den Access-Point-Zustand
    /// aber nicht; das übernehmen die Regeln im nächsten Zyklus.
    pub fn reconnect<N: NetworkControl>(&mut self, network: &mut N, credentials: &Credentials) {
        self.request_connect(network, credentials);
    }

    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    pub fn soft_ap_active(&self) -> bool {
        self.soft_ap_active
    }

    pub fn access_point(&self) -> AccessPoint {
        self.access_point
    }

    /// true wenn der Funk im letzten Zyklus ein Kommando abgelehnt hat
    pub fn radio_busy(&self) -> bool {
        self.radio_busy
    }

    fn request_access_point<N: NetworkControl>(
        &mut self,
        network: &mut N,
    ) -> Result<(), NetworkError> {
        let result = network.start_access_point(self.access_point.ssid, self.access_point.psk);
        self.radio_busy |= result.is_err();
        result
    }

    // Neuere Credentials ersetzen einen noch offenen Auftrag
    fn request_connect<N: NetworkControl>(&mut self, network: &mut N, credentials: &Credentials) {
        match network.connect_as_client(credentials) {
            Ok(()) => self.pending_connect = None,
            Err(_) => {
                self.radio_busy = true;
                self.pending_connect = Some(credentials.clone());
            }
        }
    }

    fn retry_connect<N: NetworkControl>(&mut self, network: &mut N) {
        if let Some(credentials) = self.pending_connect.take() {
            self.request_connect(network, &credentials);
        }
    }

    fn enter_client_only<N: NetworkControl>(
        &mut self,
        network: &mut N,
    ) -> Result<(), NetworkError> {
        if let Err(e) = network.stop_access_point() {
            self.radio_busy = true;
            return Err(e);
        }
        self.soft_ap_active = false;
        self.state = ConnectivityState::ClientOnly;
        Ok(())
    }
}
