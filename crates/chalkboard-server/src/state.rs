//! Shared board state: participants, history and the broadcast channel.

use crate::history::HistoryLog;
use chalkboard_core::event::DrawEvent;
use chalkboard_core::protocol::ServerMessage;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

/// Broadcast payload: sender's client id and the message.
pub type Broadcast = (String, ServerMessage);

/// What a new connection needs to start relaying.
pub struct Joined {
    /// Identifies this socket among reconnects under the same client id.
    pub connection: u64,
    pub rx: broadcast::Receiver<Broadcast>,
    pub history: ServerMessage,
    pub user_count: usize,
}

#[derive(Debug, Clone)]
struct Peer {
    username: String,
    connection: u64,
}

/// The single shared board.
pub struct BoardState {
    tx: broadcast::Sender<Broadcast>,
    /// client id -> latest connection under that id
    peers: DashMap<String, Peer>,
    next_connection: AtomicU64,
    /// Held while appending and broadcasting so joiners see history strictly before live events.
    history: Mutex<HistoryLog>,
}

impl BoardState {
    pub fn new(history_limit: usize) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            peers: DashMap::new(),
            next_connection: AtomicU64::new(1),
            history: Mutex::new(HistoryLog::new(history_limit)),
        }
    }

    fn history(&self) -> MutexGuard<'_, HistoryLog> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn user_count(&self) -> usize {
        self.peers.len()
    }

    /// Register a participant and announce it to everyone else.
    ///
    /// A second join under the same client id takes over the entry.
    pub fn join(&self, client_id: &str, username: &str) -> Joined {
        let (rx, history) = {
            let history = self.history();
            (self.tx.subscribe(), history.to_message())
        };
        let connection = self.next_connection.fetch_add(1, Ordering::Relaxed);
        let peer = Peer {
            username: username.to_string(),
            connection,
        };
        if self.peers.insert(client_id.to_string(), peer).is_some() {
            tracing::debug!("{} reconnected before its old socket closed", client_id);
        }
        let user_count = self.peers.len();
        self.broadcast(
            client_id,
            ServerMessage::UserJoined {
                username: username.to_string(),
                user_count,
            },
        );
        Joined {
            connection,
            rx,
            history,
            user_count,
        }
    }

    /// Remove a participant and announce it. Returns the username if it was registered.
    ///
    /// Only the connection that currently owns `client_id` is removed; a late
    /// close from a replaced socket is a no-op.
    pub fn leave(&self, client_id: &str, connection: u64) -> Option<String> {
        let (_, Peer { username, .. }) = self
            .peers
            .remove_if(client_id, |_, peer| peer.connection == connection)?;
        let user_count = self.peers.len();
        self.broadcast(
            client_id,
            ServerMessage::UserLeft {
                username: username.clone(),
                user_count,
            },
        );
        Some(username)
    }

    /// Append to history and relay to everyone but the sender.
    pub fn draw(&self, from: &str, event: DrawEvent) {
        let mut history = self.history();
        history.push(event);
        self.broadcast(from, ServerMessage::Draw(event));
    }

    /// Empty history and relay the clear to everyone but the sender.
    pub fn clear(&self, from: &str) {
        let mut history = self.history();
        tracing::debug!("Dropping {} history events", history.len());
        history.clear();
        self.broadcast(from, ServerMessage::Clear);
    }

    fn broadcast(&self, from: &str, msg: ServerMessage) {
        // No receivers is fine.
        let _ = self.tx.send((from.to_string(), msg));
    }
}
