//! WebSocket transport and the outbound sink the core writes into
//!
//! The transport runs as its own task: it owns the socket, reconnects with
//! backoff, and talks to the client timeline only through two channels.
//! Every connection gets a fresh id so payloads queued for a previous
//! connection are never written to the next one.

use crate::config::ReconnectPolicy;
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransmissionFailure {
    #[error("transport is not connected")]
    NotReady,
    #[error("transport has shut down")]
    Closed,
}

/// Where encoded client messages go. Implementations never block.
pub trait OutboundSink {
    fn send_raw(&mut self, payload: String) -> Result<(), TransmissionFailure>;

    fn connection_opened(&mut self, _connection: u64) {}

    fn connection_closed(&mut self) {}
}

/// Signals from the transport task to the client timeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Ready { connection: u64 },
    Payload(String),
    Closed,
}

/// A payload tagged with the connection it was produced for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub connection: u64,
    pub payload: String,
}

/// Sink feeding the transport task's outbound channel
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<Outbound>,
    connection: Option<u64>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::UnboundedSender<Outbound>) -> Self {
        Self {
            sender,
            connection: None,
        }
    }

    pub fn connection(&self) -> Option<u64> {
        self.connection
    }
}

impl OutboundSink for ChannelSink {
    fn send_raw(&mut self, payload: String) -> Result<(), TransmissionFailure> {
        let connection = self.connection.ok_or(TransmissionFailure::NotReady)?;
        self.sender
            .send(Outbound {
                connection,
                payload,
            })
            .map_err(|_| TransmissionFailure::Closed)
    }

    fn connection_opened(&mut self, connection: u64) {
        self.connection = Some(connection);
    }

    fn connection_closed(&mut self) {
        self.connection = None;
    }
}

pub struct Transport {
    url: String,
    reconnect: ReconnectPolicy,
    outbound: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<TransportEvent>,
}

enum SessionEnd {
    Disconnected,
    Shutdown,
}

impl Transport {
    pub fn new(
        url: impl Into<String>,
        reconnect: ReconnectPolicy,
        outbound: mpsc::UnboundedReceiver<Outbound>,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> Self {
        Self {
            url: url.into(),
            reconnect,
            outbound,
            events,
        }
    }

    /// Connects, serves the connection, and reconnects until the client side
    /// drops either channel.
    pub async fn run(mut self) {
        let mut connection = 0u64;
        let mut delay = self.reconnect.initial;

        loop {
            if self.events.is_closed() {
                break;
            }

            match connect_async(self.url.as_str()).await {
                Ok((stream, _)) => {
                    connection += 1;
                    delay = self.reconnect.initial;
                    info!("Connected to {} (connection {})", self.url, connection);

                    if self.events.send(TransportEvent::Ready { connection }).is_err() {
                        break;
                    }

                    let end = self.serve(stream, connection).await;

                    if self.events.send(TransportEvent::Closed).is_err() {
                        break;
                    }
                    if let SessionEnd::Shutdown = end {
                        break;
                    }
                    info!("Connection {} closed", connection);
                }
                Err(e) => {
                    warn!("Failed to connect to {}: {}", self.url, e);
                }
            }

            debug!("Reconnecting in {:?}", delay);
            sleep(delay).await;
            delay = self.reconnect.next_delay(delay);
        }

        info!("Transport stopped");
    }

    async fn serve(
        &mut self,
        stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
        connection: u64,
    ) -> SessionEnd {
        let (mut write, mut read) = stream.split();

        loop {
            tokio::select! {
                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if self.events.send(TransportEvent::Payload(text)).is_err() {
                            let _ = write.close().await;
                            return SessionEnd::Shutdown;
                        }
                    }
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                        Ok(text) => {
                            if self.events.send(TransportEvent::Payload(text)).is_err() {
                                let _ = write.close().await;
                                return SessionEnd::Shutdown;
                            }
                        }
                        Err(e) => warn!("Dropping non UTF-8 frame: {}", e),
                    },
                    Some(Ok(Message::Close(frame))) => {
                        debug!("Server closed connection: {:?}", frame);
                        return SessionEnd::Disconnected;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("Error receiving frame: {}", e);
                        return SessionEnd::Disconnected;
                    }
                    None => return SessionEnd::Disconnected,
                },

                outbound = self.outbound.recv() => match outbound {
                    Some(Outbound { connection: target, payload }) if target == connection => {
                        if let Err(e) = write.send(Message::Text(payload)).await {
                            warn!("Error sending frame: {}", e);
                            return SessionEnd::Disconnected;
                        }
                    }
                    Some(stale) => {
                        debug!("Dropping payload for stale connection {}", stale.connection);
                    }
                    None => {
                        let _ = write.close().await;
                        return SessionEnd::Shutdown;
                    }
                },
            }
        }
    }
}
