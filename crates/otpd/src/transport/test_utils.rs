//! Test helpers for the transport module.

use std::net::{SocketAddr, TcpStream};
use std::sync::{
    Arc, Condvar, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use super::ConnectionHandler;

pub(crate) struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            count: Arc::clone(&count),
        });
        (count, handler)
    }
}

impl ConnectionHandler for CountingHandler {
    fn handle(&self, _stream: TcpStream, _peer: SocketAddr) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Holds every connection open until the gate is opened.
pub(crate) struct GatedHandler {
    started: AtomicUsize,
    open: Mutex<bool>,
    opened: Condvar,
}

impl GatedHandler {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            started: AtomicUsize::new(0),
            open: Mutex::new(false),
            opened: Condvar::new(),
        })
    }

    /// Handlers that have begun running.
    pub(crate) fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub(crate) fn open(&self) {
        let mut open = self.open.lock().expect("gate mutex poisoned");
        *open = true;
        self.opened.notify_all();
    }
}

impl ConnectionHandler for GatedHandler {
    fn handle(&self, _stream: TcpStream, _peer: SocketAddr) {
        self.started.fetch_add(1, Ordering::SeqCst);
        let mut open = self.open.lock().expect("gate mutex poisoned");
        while !*open {
            open = self
                .opened
                .wait(open)
                .expect("gate mutex poisoned during wait");
        }
    }
}
