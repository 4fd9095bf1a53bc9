// Task-Modul: Enthält alle Embassy Tasks
//
// Jeder Task läuft asynchron und unabhängig.
// Tasks kommunizieren über Embassy Channels (Portal → Clock, Clock → WiFi)
// und Signale (Clock → SNTP).

pub mod clock;
pub mod dhcp;
pub mod http;
pub mod mdns;
pub mod sntp;
pub mod wifi;

// Re-export Tasks für einfachen Import
pub use clock::{ClockLoop, clock_task};
pub use dhcp::dhcp_server_task;
pub use http::http_server_task;
pub use mdns::mdns_responder_task;
pub use sntp::sntp_task;
pub use wifi::{connection_task, dhcp_monitor_task, net_task};
