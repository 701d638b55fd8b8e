//! WebSocket transport for the board connection.
//!
//! Provides a platform-agnostic transport interface plus the native client,
//! which runs a blocking socket on a background thread and is polled without
//! blocking from the host's event loop.

use thiserror::Error;
use url::Url;

/// Transport errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Already connected")]
    AlreadyConnected,
    #[error("Not connected")]
    NotConnected,
    #[error("Connection failed: {0}")]
    ConnectFailed(String),
    #[error("Send failed: {0}")]
    SendFailed(String),
}

/// Events reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The socket is open.
    Opened,
    /// A text frame arrived.
    Frame(String),
    /// The socket closed or failed (including failed connection attempts).
    Closed { reason: Option<String> },
}

/// A duplex text channel to the server.
pub trait Transport {
    /// Start connecting. Completion is reported as [`TransportEvent::Opened`].
    fn connect(&mut self, url: &Url) -> Result<(), TransportError>;

    /// Send a text frame.
    fn send(&mut self, frame: &str) -> Result<(), TransportError>;

    /// Drain events received since the last poll (non-blocking).
    fn poll_events(&mut self) -> Vec<TransportEvent>;

    /// Close the socket and forget any pending events.
    fn disconnect(&mut self);
}

mod native_client {
    use super::*;
    use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;
    use tungstenite::{Message, connect};

    /// Commands sent to the WebSocket thread.
    enum WsCommand {
        Send(String),
        Close,
    }

    /// WebSocket client for native platforms.
    ///
    /// Uses a background thread for non-blocking operation.
    #[derive(Default)]
    pub struct NativeSocket {
        /// Channel to send commands to the WebSocket thread.
        cmd_tx: Option<Sender<WsCommand>>,
        /// Channel to receive events from the WebSocket thread.
        event_rx: Option<Receiver<TransportEvent>>,
        /// Handle to the WebSocket thread.
        _thread: Option<JoinHandle<()>>,
    }

    impl NativeSocket {
        /// Create a new disconnected client.
        pub fn new() -> Self {
            Self::default()
        }

        /// Check if a connection thread is running.
        pub fn is_running(&self) -> bool {
            self.cmd_tx.is_some()
        }
    }

    /// At most `max` bytes of `text`, cut on a char boundary.
    fn log_excerpt(text: &str, max: usize) -> &str {
        let mut end = text.len().min(max);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        &text[..end]
    }

    fn run_socket(url: String, cmd_rx: Receiver<WsCommand>, event_tx: Sender<TransportEvent>) {
        log::info!("WebSocket thread: connecting to {}", url);

        let (mut socket, response) = match connect(&url) {
            Ok(connected) => connected,
            Err(e) => {
                log::warn!("WebSocket connection failed: {}", e);
                let _ = event_tx.send(TransportEvent::Closed {
                    reason: Some(format!("Connection failed: {}", e)),
                });
                return;
            }
        };
        log::info!("WebSocket connected, status: {}", response.status());
        let _ = event_tx.send(TransportEvent::Opened);

        // Short read timeout so commands are picked up between reads
        if let tungstenite::stream::MaybeTlsStream::Plain(tcp) = socket.get_mut() {
            let _ = tcp.set_read_timeout(Some(Duration::from_millis(50)));
            let _ = tcp.set_write_timeout(Some(Duration::from_secs(5)));
        }

        let reason = loop {
            match cmd_rx.try_recv() {
                Ok(WsCommand::Send(frame)) => {
                    log::trace!("WebSocket sending: {}", log_excerpt(&frame, 100));
                    if let Err(e) = socket.send(Message::Text(frame)) {
                        break Some(format!("Send error: {}", e));
                    }
                }
                Ok(WsCommand::Close) => {
                    log::info!("WebSocket close requested");
                    let _ = socket.close(None);
                    break None;
                }
                Err(TryRecvError::Disconnected) => break None,
                Err(TryRecvError::Empty) => {}
            }

            match socket.read() {
                Ok(Message::Text(txt)) => {
                    log::trace!("WebSocket received: {}", log_excerpt(&txt, 100));
                    if event_tx.send(TransportEvent::Frame(txt)).is_err() {
                        break None;
                    }
                }
                Ok(Message::Ping(data)) => {
                    let _ = socket.send(Message::Pong(data));
                }
                Ok(Message::Close(frame)) => {
                    break frame.map(|f| f.reason.to_string());
                }
                Ok(_) => {}
                Err(tungstenite::Error::Io(ref e))
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    continue;
                }
                Err(e) => break Some(format!("Read error: {}", e)),
            }
        };

        log::info!("WebSocket thread exiting");
        let _ = event_tx.send(TransportEvent::Closed { reason });
    }

    impl Transport for NativeSocket {
        fn connect(&mut self, url: &Url) -> Result<(), TransportError> {
            if self.cmd_tx.is_some() {
                return Err(TransportError::AlreadyConnected);
            }
            if url.scheme() != "ws" && url.scheme() != "wss" {
                return Err(TransportError::InvalidUrl(format!(
                    "Invalid WebSocket URL scheme: {}",
                    url.scheme()
                )));
            }

            let (cmd_tx, cmd_rx) = channel::<WsCommand>();
            let (event_tx, event_rx) = channel::<TransportEvent>();
            let url = url.to_string();

            let handle = thread::Builder::new()
                .name("chalkboard-ws".to_string())
                .spawn(move || run_socket(url, cmd_rx, event_tx))
                .map_err(|e| TransportError::ConnectFailed(e.to_string()))?;

            self.cmd_tx = Some(cmd_tx);
            self.event_rx = Some(event_rx);
            self._thread = Some(handle);
            Ok(())
        }

        fn send(&mut self, frame: &str) -> Result<(), TransportError> {
            match self.cmd_tx {
                Some(ref tx) => tx
                    .send(WsCommand::Send(frame.to_string()))
                    .map_err(|e| TransportError::SendFailed(e.to_string())),
                None => Err(TransportError::NotConnected),
            }
        }

        fn poll_events(&mut self) -> Vec<TransportEvent> {
            let mut events = Vec::new();
            if let Some(ref rx) = self.event_rx {
                loop {
                    match rx.try_recv() {
                        Ok(event) => events.push(event),
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => {
                            // The thread died without reporting a close.
                            if !matches!(events.last(), Some(TransportEvent::Closed { .. })) {
                                log::warn!("WebSocket thread exited unexpectedly");
                                events.push(TransportEvent::Closed {
                                    reason: Some("WebSocket thread exited".to_string()),
                                });
                            }
                            break;
                        }
                    }
                }
            }
            // The thread has exited; the next connect starts a fresh one.
            if matches!(events.last(), Some(TransportEvent::Closed { .. })) {
                self.cmd_tx = None;
                self.event_rx = None;
                self._thread = None;
            }
            events
        }

        fn disconnect(&mut self) {
            if let Some(tx) = self.cmd_tx.take() {
                let _ = tx.send(WsCommand::Close);
            }
            self.event_rx = None;
            self._thread = None;
        }
    }

    impl Drop for NativeSocket {
        fn drop(&mut self) {
            self.disconnect();
        }
    }

}

pub use native_client::NativeSocket;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_rejects_non_websocket_scheme() {
        let mut socket = NativeSocket::new();
        let url = Url::parse("http://localhost:8000/ws/abc").unwrap();
        assert!(matches!(socket.connect(&url), Err(TransportError::InvalidUrl(_))));
        assert!(!socket.is_running());
    }

    #[test]
    fn test_native_send_requires_connection() {
        let mut socket = NativeSocket::new();
        assert_eq!(socket.send("{}"), Err(TransportError::NotConnected));
        assert!(socket.poll_events().is_empty());
    }
}
