//! Connection lifecycle: connect, dispatch inbound frames, reconnect on close.

use crate::config::OutboundPolicy;
use crate::protocol::{ClientMessage, Frame, ServerMessage};
use crate::sync::{Transport, TransportEvent};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use url::Url;

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Open,
}

/// What the connection reports to the board after a poll.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// The socket opened; the server will send history next.
    Opened,
    /// A decoded message from the server.
    Message(ServerMessage),
    /// The socket closed; a reconnect is scheduled.
    Lost,
}

/// Owns the transport and its reconnect timer.
///
/// Reconnects use a fixed delay with no cap on attempts. Outbound messages
/// are only sent while `Open`; otherwise the [`OutboundPolicy`] decides.
pub struct ConnectionManager<T: Transport> {
    transport: T,
    url: Url,
    state: ConnectionState,
    /// Whether any attempt has opened yet (drives the status label).
    ever_opened: bool,
    reconnect_delay: Duration,
    reconnect_at: Option<Instant>,
    outbound: OutboundPolicy,
    queued: VecDeque<Frame>,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(transport: T, url: Url, reconnect_delay: Duration, outbound: OutboundPolicy) -> Self {
        Self {
            transport,
            url,
            state: ConnectionState::Disconnected,
            ever_opened: false,
            reconnect_delay,
            reconnect_at: None,
            outbound,
            queued: VecDeque::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// When the next reconnect attempt is due, if one is scheduled.
    pub fn reconnect_at(&self) -> Option<Instant> {
        self.reconnect_at
    }

    /// Frames waiting for the next open (only with [`OutboundPolicy::Buffer`]).
    pub fn queued(&self) -> usize {
        self.queued.len()
    }

    /// Status text for the connection indicator.
    pub fn status_label(&self) -> &'static str {
        match self.state {
            ConnectionState::Open => "Connected",
            _ if self.ever_opened => "Reconnecting...",
            _ => "Connecting...",
        }
    }

    /// Start a connection attempt if disconnected.
    pub fn connect(&mut self, now: Instant) {
        if self.state != ConnectionState::Disconnected {
            return;
        }
        self.reconnect_at = None;
        self.transport.disconnect();
        match self.transport.connect(&self.url) {
            Ok(()) => {
                log::info!("Connecting to {}", self.url);
                self.state = ConnectionState::Connecting;
            }
            Err(e) => {
                log::warn!("Connection attempt failed: {}", e);
                self.schedule_reconnect(now);
            }
        }
    }

    /// Close the connection for good. No reconnect is scheduled.
    pub fn disconnect(&mut self) {
        self.transport.disconnect();
        self.state = ConnectionState::Disconnected;
        self.reconnect_at = None;
    }

    fn schedule_reconnect(&mut self, now: Instant) {
        let at = now + self.reconnect_delay;
        log::info!("Reconnecting in {:?}", self.reconnect_delay);
        self.reconnect_at = Some(at);
    }

    /// Fire a due reconnect and drain transport events.
    ///
    /// Malformed frames are logged and dropped; unknown kinds are skipped.
    pub fn poll(&mut self, now: Instant) -> Vec<ConnectionEvent> {
        if self.state == ConnectionState::Disconnected {
            if let Some(at) = self.reconnect_at {
                if now >= at {
                    self.connect(now);
                }
            }
        }

        let mut events = Vec::new();
        for event in self.transport.poll_events() {
            match event {
                TransportEvent::Opened => {
                    log::info!("Connected to {}", self.url);
                    self.state = ConnectionState::Open;
                    self.ever_opened = true;
                    events.push(ConnectionEvent::Opened);
                    self.flush_queue();
                }
                TransportEvent::Frame(frame) => match ServerMessage::from_frame(&frame) {
                    Ok(Some(msg)) => events.push(ConnectionEvent::Message(msg)),
                    Ok(None) => log::debug!("Ignoring unknown message: {}", frame),
                    Err(e) => log::warn!("Dropping frame: {}", e),
                },
                TransportEvent::Closed { reason } => {
                    if self.state == ConnectionState::Disconnected {
                        continue;
                    }
                    log::warn!(
                        "Connection closed: {}",
                        reason.as_deref().unwrap_or("no reason given")
                    );
                    self.state = ConnectionState::Disconnected;
                    self.schedule_reconnect(now);
                    events.push(ConnectionEvent::Lost);
                }
            }
        }
        events
    }

    /// Send a message if open. Returns whether it went out now.
    pub fn send(&mut self, msg: &ClientMessage) -> bool {
        let frame = match msg.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("Failed to encode message: {}", e);
                return false;
            }
        };

        if self.is_open() {
            return match self.transport.send(&frame) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Send failed: {}", e);
                    false
                }
            };
        }

        match self.outbound {
            OutboundPolicy::Drop => {
                log::debug!("Not connected, dropping outbound message");
            }
            OutboundPolicy::Buffer { capacity } => {
                if capacity == 0 {
                    return false;
                }
                if self.queued.len() == capacity {
                    self.queued.pop_front();
                }
                self.queued.push_back(frame);
            }
        }
        false
    }

    fn flush_queue(&mut self) {
        while let Some(frame) = self.queued.pop_front() {
            if let Err(e) = self.transport.send(&frame) {
                log::warn!("Failed to flush queued message: {}", e);
                break;
            }
        }
    }
}
