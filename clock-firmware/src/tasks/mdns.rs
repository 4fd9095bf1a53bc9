// mDNS Responder Task - "nixeclock.local" auf beiden Interfaces
//
// Im Heimnetz ändert sich die Adresse mit jedem DHCP-Lease, im eigenen
// Access Point ist sie fest. Der Responder läuft deshalb nur solange das
// Interface konfiguriert ist und startet mit der neuen Adresse neu.

use core::net::{Ipv4Addr, SocketAddr};

use defmt::{Debug2Format, error, info, warn};
use edge_mdns::{HostAnswersMdnsHandler, buf::VecBufAccess, domain::base::Ttl, host::Host, io};
use edge_nal::{MulticastV4, UdpBind, UdpSplit};
use edge_nal_embassy::{Udp, UdpBuffers};
use embassy_futures::select::{Either, select};
use embassy_net::Stack;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use esp_hal::rng::Rng;

use crate::config::{
    MDNS_HOSTNAME, MDNS_MULTICAST_ADDR, MDNS_PACKET_BUFFER_SIZE, MDNS_PORT,
    MDNS_RECONNECT_DELAY_SECS, MDNS_TTL_SECS, MDNS_UDP_BUFFER_SIZE,
};

#[derive(Debug, Clone, Copy, defmt::Format)]
enum MdnsError {
    Bind,
    JoinMulticast,
    Responder,
}

/// Query-IDs aus dem Hardware-RNG
fn fill_random(buf: &mut [u8]) {
    Rng::new().read(buf);
}

/// mDNS Responder Task, eine Instanz pro Interface ("sta" / "ap")
#[embassy_executor::task(pool_size = 2)]
pub async fn mdns_responder_task(interface: &'static str, stack: Stack<'static>) {
    loop {
        stack.wait_config_up().await;
        let Some(config) = stack.config_v4() else {
            continue;
        };
        let address = config.address.address();
        info!(
            "mDNS: Advertising '{}.local' on {} as {}",
            MDNS_HOSTNAME,
            interface,
            Debug2Format(&address)
        );

        match select(respond(stack, address), stack.wait_config_down()).await {
            Either::First(Ok(())) => warn!("mDNS: Responder on {} stopped", interface),
            Either::First(Err(e)) => error!("mDNS: Responder on {} failed: {}", interface, e),
            Either::Second(()) => info!("mDNS: {} lost its address", interface),
        }

        Timer::after(Duration::from_secs(MDNS_RECONNECT_DELAY_SECS)).await;
    }
}

/// Beantwortet A-Record-Anfragen für `MDNS_HOSTNAME` mit `address`
async fn respond(stack: Stack<'static>, address: Ipv4Addr) -> Result<(), MdnsError> {
    // Eigene Buffers pro Aufruf, der Task läuft für zwei Interfaces
    let buffers = UdpBuffers::<1, MDNS_UDP_BUFFER_SIZE, MDNS_UDP_BUFFER_SIZE>::new();
    let udp = Udp::new(stack, &buffers);

    let mut socket = udp
        .bind(SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), MDNS_PORT))
        .await
        .map_err(|_| MdnsError::Bind)?;
    socket
        .join_v4(Ipv4Addr::from(MDNS_MULTICAST_ADDR), Ipv4Addr::UNSPECIFIED)
        .await
        .map_err(|_| MdnsError::JoinMulticast)?;
    let (recv, send) = socket.split();

    let host = Host {
        hostname: MDNS_HOSTNAME,
        ipv4: address.into(),
        ipv6: [0u8; 16].into(), // kein proto-ipv6 in smoltcp
        ttl: Ttl::from_secs(MDNS_TTL_SECS),
    };

    // Broadcast-Signal wird nie ausgelöst, die Uhr kündigt sich nicht selbst an
    let broadcast = Signal::<NoopRawMutex, ()>::new();

    io::Mdns::new(
        Some(address),
        None,
        recv,
        send,
        VecBufAccess::<NoopRawMutex, MDNS_PACKET_BUFFER_SIZE>::new(),
        VecBufAccess::<NoopRawMutex, MDNS_PACKET_BUFFER_SIZE>::new(),
        fill_random,
        &broadcast,
    )
    .run(HostAnswersMdnsHandler::new(&host))
    .await
    .map_err(|_| MdnsError::Responder)
}
