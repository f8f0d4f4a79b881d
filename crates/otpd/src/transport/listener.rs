//! TCP listener with a bounded set of concurrent handlers.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, info, warn};

use super::slots::{ConnectionSlots, SlotPermit};
use super::{ConnectionHandler, LISTENER_TARGET, ListenerError};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Where and how deeply the daemon listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListenSettings {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) backlog: u16,
    pub(crate) max_connections: usize,
}

/// Listener bound to a TCP address but not yet accepting.
#[derive(Debug)]
pub(crate) struct SocketListener {
    listener: TcpListener,
    local_addr: SocketAddr,
    slots: Arc<ConnectionSlots>,
}

impl SocketListener {
    pub(crate) fn bind(settings: &ListenSettings) -> Result<Self, ListenerError> {
        let addr = resolve(&settings.host, settings.port)?;
        let listener = bind_tcp(addr, settings.backlog)?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ListenerError::Bind { addr, source })?;
        Ok(Self {
            listener,
            local_addr,
            slots: ConnectionSlots::new(settings.max_connections),
        })
    }

    /// Address actually bound, which differs from the request for port 0.
    pub(crate) const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub(crate) fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<ListenerHandle, ListenerError> {
        self.listener
            .set_nonblocking(true)
            .map_err(|source| ListenerError::NonBlocking { source })?;
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);
        let local_addr = self.local_addr;
        let slots = Arc::clone(&self.slots);
        let handle = thread::spawn(move || run_accept_loop(&self, &shutdown_flag, &handler));
        Ok(ListenerHandle {
            local_addr,
            slots,
            shutdown,
            handle: Some(handle),
        })
    }
}

/// Handle to the background accept loop.
pub(crate) struct ListenerHandle {
    local_addr: SocketAddr,
    slots: Arc<ConnectionSlots>,
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    pub(crate) const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Handlers currently running.
    pub(crate) fn active_connections(&self) -> usize {
        self.slots.active()
    }

    /// Stops accepting; handlers already running finish on their own threads.
    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub(crate) fn join(mut self) -> Result<(), ListenerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| ListenerError::ThreadPanic),
            None => Ok(()),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

fn run_accept_loop(
    listener: &SocketListener,
    shutdown: &AtomicBool,
    handler: &Arc<dyn ConnectionHandler>,
) {
    info!(
        target: LISTENER_TARGET,
        address = %listener.local_addr,
        max_connections = listener.slots.capacity(),
        "socket listener active"
    );
    let mut last_error = None::<io::ErrorKind>;
    while !shutdown.load(Ordering::SeqCst) {
        // Without a free slot nothing is accepted, so new clients wait in the
        // kernel backlog.
        let Some(permit) = listener.slots.acquire_for(ACCEPT_BACKOFF) else {
            continue;
        };
        match accept_connection(&listener.listener) {
            Ok(Some((stream, peer))) => {
                last_error = None;
                dispatch(stream, peer, permit, handler, &listener.slots);
            }
            Ok(None) => {
                drop(permit);
                thread::sleep(ACCEPT_BACKOFF);
            }
            Err(error) => {
                drop(permit);
                let kind = error.kind();
                if last_error != Some(kind) {
                    warn!(
                        target: LISTENER_TARGET,
                        error = %error,
                        "socket accept error"
                    );
                }
                last_error = Some(kind);
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }
    info!(
        target: LISTENER_TARGET,
        address = %listener.local_addr,
        "socket listener stopped"
    );
}

fn dispatch(
    stream: TcpStream,
    peer: SocketAddr,
    permit: SlotPermit,
    handler: &Arc<dyn ConnectionHandler>,
    slots: &ConnectionSlots,
) {
    debug!(
        target: LISTENER_TARGET,
        peer = %peer,
        active = slots.active(),
        "connection accepted"
    );
    let handler = Arc::clone(handler);
    let spawned = thread::Builder::new()
        .name(format!("conn-{peer}"))
        .spawn(move || {
            let _permit = permit;
            handler.handle(stream, peer);
        });
    if let Err(error) = spawned {
        // The closure, permit included, is dropped with the error.
        warn!(
            target: LISTENER_TARGET,
            peer = %peer,
            error = %error,
            "failed to spawn connection handler"
        );
    }
}

fn accept_connection(listener: &TcpListener) -> io::Result<Option<(TcpStream, SocketAddr)>> {
    match listener.accept() {
        Ok((stream, peer)) => {
            stream.set_nonblocking(false)?;
            Ok(Some((stream, peer)))
        }
        Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
        Err(error) => Err(error),
    }
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr, ListenerError> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?
        .collect();
    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| ListenerError::ResolveEmpty {
            host: host.to_owned(),
            port,
        })
}

fn bind_tcp(addr: SocketAddr, backlog: u16) -> Result<TcpListener, ListenerError> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
        .map_err(|source| ListenerError::Socket { addr, source })?;
    #[cfg(not(windows))]
    socket
        .set_reuse_address(true)
        .map_err(|source| ListenerError::Socket { addr, source })?;
    socket
        .bind(&addr.into())
        .map_err(|source| ListenerError::Bind { addr, source })?;
    socket
        .listen(i32::from(backlog))
        .map_err(|source| ListenerError::Listen { addr, source })?;
    Ok(socket.into())
}
