use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use super::SocketSender;
use crate::error::DriverError;
use crate::settings::ConnectionSettings;
use crate::wire::{action, WireCommand, WireField};

/// Frames buffered for slow broadcast subscribers before they start lagging.
const BROADCAST_CAPACITY: usize = 256;

/// Protocol revision announced in the handshake.
fn protocol_for(major_version: u32) -> &'static str {
    if major_version >= 7 {
        "701"
    } else {
        "600"
    }
}

/// `authenticate` handshake sent as the first frame of every connection.
pub fn authenticate_command(settings: &ConnectionSettings) -> WireCommand {
    WireCommand::new(action::AUTHENTICATE)
        .with("password", WireField::text(settings.password.clone()))
        .with("protocol", WireField::text(protocol_for(settings.major_version)))
}

/// Client side of the remote-control socket.
///
/// A writer task drains an mpsc queue into the socket and a reader task fans
/// incoming text frames out to broadcast subscribers. Either task flips the
/// health flag when the connection drops; nothing reconnects automatically.
/// The reader task owns the only broadcast sender, so subscribers see the
/// channel close when the connection ends.
pub struct RemoteSocket {
    outbound: mpsc::UnboundedSender<String>,
    connected: Arc<AtomicBool>,
    writer: JoinHandle<()>,
}

impl RemoteSocket {
    /// Connect and queue the handshake. The returned receiver exists before
    /// the handshake is sent, so it sees the `authenticate` reply; further
    /// subscribers come from [`broadcast::Receiver::resubscribe`].
    pub async fn connect(
        settings: &ConnectionSettings,
    ) -> Result<(Self, broadcast::Receiver<String>), DriverError> {
        let url = settings.socket_url();
        info!(%url, "connecting to remote");
        let (stream, _response) = connect_async(url.as_str()).await?;
        let (mut sink, mut source) = stream.split();

        let connected = Arc::new(AtomicBool::new(true));
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<String>();
        let (reader_frames, first_subscriber) = broadcast::channel(BROADCAST_CAPACITY);

        let writer_health = Arc::clone(&connected);
        let writer = tokio::spawn(async move {
            while let Some(text) = outbound_rx.recv().await {
                if let Err(e) = sink.send(Message::Text(text)).await {
                    error!("socket write failed: {e}");
                    break;
                }
            }
            writer_health.store(false, Ordering::SeqCst);
            let _ = sink.close().await;
        });

        let reader_health = Arc::clone(&connected);
        tokio::spawn(async move {
            while let Some(message) = source.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        // No subscribers is fine; frames are simply dropped.
                        let _ = reader_frames.send(text);
                    }
                    Ok(Message::Binary(bytes)) => {
                        let _ = reader_frames.send(String::from_utf8_lossy(&bytes).into_owned());
                    }
                    Ok(Message::Close(_)) => {
                        info!("remote closed the socket");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("socket read failed: {e}");
                        break;
                    }
                }
            }
            reader_health.store(false, Ordering::SeqCst);
            // Dropping the last sender closes every subscriber.
            drop(reader_frames);
        });

        let socket = Self {
            outbound,
            connected,
            writer,
        };
        socket.send(&authenticate_command(settings)).await?;
        Ok((socket, first_subscriber))
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Flush queued commands and close the connection.
    pub async fn close(self) {
        let Self { outbound, writer, .. } = self;
        drop(outbound);
        if let Err(e) = writer.await {
            warn!("socket writer ended abnormally: {e}");
        }
    }
}

impl SocketSender for RemoteSocket {
    async fn send(&self, command: &WireCommand) -> Result<(), DriverError> {
        if !self.is_connected() {
            return Err(DriverError::NotConnected);
        }
        let text = command.to_text();
        debug!(action = %command.action, "socket send");
        if self.outbound.send(text).is_err() {
            self.connected.store(false, Ordering::SeqCst);
            return Err(DriverError::NotConnected);
        }
        Ok(())
    }
}
