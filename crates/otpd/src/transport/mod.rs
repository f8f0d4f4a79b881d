//! Socket listener for the daemon.
//!
//! The transport module binds the configured TCP port and accepts connections
//! in a background thread, handing each one to a [`ConnectionHandler`] on a
//! thread of its own while never running more handlers than there are
//! connection slots.

mod errors;
mod handler;
mod listener;
mod slots;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
pub(crate) use self::handler::ConnectionHandler;
pub(crate) use self::listener::{ListenSettings, ListenerHandle, SocketListener};
#[cfg(test)]
pub(crate) use self::test_utils::{CountingHandler, GatedHandler};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
