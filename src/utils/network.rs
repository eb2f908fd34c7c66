//! Network utilities
//!
//! Provides network-related utility functions.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Outward-facing IPv4 address of this host, if it has one.
///
/// Connecting a UDP socket sends no packets; it only makes the OS pick the
/// interface it would route through.
pub fn local_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((Ipv4Addr::new(192, 168, 0, 1), 80)).ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_loopback() && !ip.is_unspecified() => Some(ip),
        _ => None,
    }
}

/// URL peers on the LAN can open, falling back to `localhost`
pub fn lan_url(port: u16) -> String {
    let host = local_ipv4()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "localhost".to_string());
    format!("http://{}:{}", host, port)
}
