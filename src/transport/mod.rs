//! Senders for compiled output. The compiler never talks to the network
//! directly; `registry::execute` hands socket commands and link requests to
//! whichever implementations the surface wired up.

pub mod link;
pub mod socket;

use std::future::Future;

use parking_lot::Mutex;

use crate::error::DriverError;
use crate::wire::{LinkRequest, WireCommand};

/// Persistent remote-control connection. Sending requires a connected socket.
pub trait SocketSender: Send + Sync {
    fn send(&self, command: &WireCommand) -> impl Future<Output = Result<(), DriverError>> + Send;
}

/// REST link client. Each request is an independent POST.
pub trait LinkSender: Send + Sync {
    fn post(&self, request: &LinkRequest) -> impl Future<Output = Result<(), DriverError>> + Send;
}

/// A socket that never connected behaves like a dropped one.
impl<S: SocketSender> SocketSender for Option<S> {
    async fn send(&self, command: &WireCommand) -> Result<(), DriverError> {
        match self {
            Some(socket) => socket.send(command).await,
            None => Err(DriverError::NotConnected),
        }
    }
}

// ── In-memory sink ─────────────────────────────────────────────────

/// Records everything it is asked to send. Used by tests and by the CLI's
/// dry-run path.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    socket: Mutex<Vec<WireCommand>>,
    link: Mutex<Vec<LinkRequest>>,
    /// When false, socket sends fail with [`DriverError::NotConnected`].
    connected: bool,
}

impl RecordingTransport {
    pub fn connected() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<WireCommand> {
        self.socket.lock().clone()
    }

    pub fn posted(&self) -> Vec<LinkRequest> {
        self.link.lock().clone()
    }
}

impl SocketSender for RecordingTransport {
    async fn send(&self, command: &WireCommand) -> Result<(), DriverError> {
        if !self.connected {
            return Err(DriverError::NotConnected);
        }
        self.socket.lock().push(command.clone());
        Ok(())
    }
}

impl LinkSender for RecordingTransport {
    async fn post(&self, request: &LinkRequest) -> Result<(), DriverError> {
        self.link.lock().push(request.clone());
        Ok(())
    }
}
