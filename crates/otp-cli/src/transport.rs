//! Socket transport helpers for the client.

use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::AppError;

/// Connects to `host:port`, preferring an IPv4 address when the host has
/// several.
pub(super) fn connect(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, AppError> {
    let address = resolve_tcp_address(host, port).map_err(|source| AppError::Resolve {
        host: host.to_owned(),
        port,
        source,
    })?;
    TcpStream::connect_timeout(&address, timeout)
        .map_err(|source| AppError::Connect { address, source })
}

fn resolve_tcp_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}
