// DHCP-Server Task - vergibt Adressen an Clients des eigenen Access Points
//
// Das Access-Point-Interface hat die statische Adresse `AP_ADDRESS`;
// dieselbe Adresse wird als Gateway und DNS an die Clients verteilt.

use core::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use defmt::{info, warn};
use edge_dhcp::io::{self, DEFAULT_SERVER_PORT};
use edge_dhcp::server::{Server, ServerOptions};
use edge_nal::UdpBind;
use edge_nal_embassy::{Udp, UdpBuffers};
use embassy_net::Stack;
use embassy_time::{Duration, Timer};

use crate::config::{AP_ADDRESS, DHCP_PACKET_BUFFER_SIZE, DHCP_RESTART_DELAY_MS};

/// Maximale Anzahl gleichzeitiger Leases
const DHCP_MAX_LEASES: usize = 8;

#[embassy_executor::task]
pub async fn dhcp_server_task(stack: Stack<'static>) {
    let ip = Ipv4Addr::from(AP_ADDRESS);
    info!("DHCP: Server starting on {}", AP_ADDRESS);

    static UDP_BUFFERS: static_cell::StaticCell<UdpBuffers<1, 1024, 1024>> =
        static_cell::StaticCell::new();
    let udp_buffers = UDP_BUFFERS.init_with(UdpBuffers::new);
    let udp_stack = Udp::new(stack, udp_buffers);

    let mut buf = [0u8; DHCP_PACKET_BUFFER_SIZE];
    let mut gateways = [ip];

    loop {
        let mut socket = match udp_stack
            .bind(SocketAddr::V4(SocketAddrV4::new(
                Ipv4Addr::UNSPECIFIED,
                DEFAULT_SERVER_PORT,
            )))
            .await
        {
            Ok(socket) => socket,
            Err(_) => {
                warn!("DHCP: Socket bind failed");
                Timer::after(Duration::from_millis(DHCP_RESTART_DELAY_MS)).await;
                continue;
            }
        };

        let mut server = Server::<_, DHCP_MAX_LEASES>::new_with_et(ip);
        let options = ServerOptions::new(ip, Some(&mut gateways));

        if io::server::run(&mut server, &options, &mut socket, &mut buf)
            .await
            .is_err()
        {
            warn!("DHCP: Server error, restarting");
        }

        Timer::after(Duration::from_millis(DHCP_RESTART_DELAY_MS)).await;
    }
}
