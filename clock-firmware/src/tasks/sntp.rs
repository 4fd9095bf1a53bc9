// SNTP Task - Holt die Zeit vom NTP-Server wenn die Render Loop es anfordert
use clock_core::SyncedEpoch;
use clock_core::ntp::{self, NTP_PACKET_LEN, NTP_PORT, NtpError};
use defmt::{Debug2Format, info, warn};
use embassy_futures::select::{Either, select};
use embassy_net::dns::DnsQueryType;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpEndpoint, Stack};
use embassy_time::{Duration, Instant, Timer};

use crate::config::{NTP_SERVER, NTP_TIMEOUT_MS};
use crate::{EpochCell, SyncSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
enum SntpError {
    NotConnected,
    Dns,
    Socket,
    Timeout,
    Reply(NtpError),
}

/// SNTP Task
///
/// Wartet auf Anforderungen der Render Loop. Nur eine erfolgreiche Antwort
/// ersetzt die Epoche; bei Fehlern läuft die Uhr mit der alten weiter.
#[embassy_executor::task]
pub async fn sntp_task(
    stack: Stack<'static>,
    requests: &'static SyncSignal,
    epoch: &'static EpochCell,
) {
    info!("SNTP: Task started");

    loop {
        requests.wait().await;

        match sntp_request(stack).await {
            Ok(seconds) => {
                let synced = SyncedEpoch::new(seconds, Instant::now().as_millis());
                epoch.lock(|cell| cell.set(synced));
                info!("SNTP: Synchronized, epoch {}", seconds);
            }
            Err(e) => warn!("SNTP: Sync failed: {}", e),
        }
    }
}

/// Eine Anfrage an `NTP_SERVER`, Ergebnis in Unix-Sekunden
async fn sntp_request(stack: Stack<'static>) -> Result<i64, SntpError> {
    if stack.config_v4().is_none() {
        return Err(SntpError::NotConnected);
    }

    let server_ip = stack
        .dns_query(NTP_SERVER, DnsQueryType::A)
        .await
        .map_err(|_| SntpError::Dns)?
        .first()
        .copied()
        .ok_or(SntpError::Dns)?;
    let server = IpEndpoint::new(server_ip, NTP_PORT);
    info!("SNTP: Resolved {} to {}", NTP_SERVER, Debug2Format(&server));

    // NTP-Pakete sind 48 Bytes
    let mut rx_meta = [PacketMetadata::EMPTY; 2];
    let mut rx_buffer = [0u8; 64];
    let mut tx_meta = [PacketMetadata::EMPTY; 2];
    let mut tx_buffer = [0u8; 64];
    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    socket.bind(0).map_err(|_| SntpError::Socket)?;

    socket
        .send_to(&ntp::request_packet(), server)
        .await
        .map_err(|_| SntpError::Socket)?;

    let mut response = [0u8; NTP_PACKET_LEN];
    let (len, from) = match select(
        Timer::after(Duration::from_millis(NTP_TIMEOUT_MS)),
        socket.recv_from(&mut response),
    )
    .await
    {
        Either::First(()) => return Err(SntpError::Timeout),
        Either::Second(result) => result.map_err(|_| SntpError::Socket)?,
    };

    if from.endpoint.addr != server_ip {
        return Err(SntpError::Socket);
    }

    ntp::parse_response(&response[..len]).map_err(SntpError::Reply)
}
