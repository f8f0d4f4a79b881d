//! Connection handling abstraction for the daemon listener.

use std::net::{SocketAddr, TcpStream};

/// Handles accepted socket connections.
///
/// Each call runs on its own thread and owns the stream for the lifetime of
/// the exchange. Implementations should avoid panicking; a panic only ends
/// the one connection.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Serves a single connection.
    fn handle(&self, stream: TcpStream, peer: SocketAddr);
}
