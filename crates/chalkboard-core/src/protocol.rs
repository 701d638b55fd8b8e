//! Wire protocol: JSON frames exchanged with the board server.
//!
//! Every frame is an object with a `type` tag. Unknown kinds decode to
//! `Ok(None)` so newer servers and clients can add messages; a frame that is
//! not the expected shape for a known kind is a [`ProtocolError`].

use crate::event::DrawEvent;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A serialized message as sent over the socket.
pub type Frame = String;

/// Protocol errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Message kind cannot be sent: {0}")]
    Unsendable(&'static str),
}

/// Result type for codec operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Messages sent to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A segment or shape drawn locally.
    Draw(DrawEvent),
    /// Wipe the board for everyone.
    Clear,
    /// Keepalive request; the server answers with `pong`.
    Ping,
    /// Any kind this build does not know.
    #[serde(other)]
    Unknown,
}

/// Messages received from the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Board state so far, sent once right after connecting.
    History { data: Vec<HistoryEntry> },
    /// A mark drawn by another participant.
    Draw(DrawEvent),
    /// Another participant wiped the board.
    Clear,
    /// A participant joined.
    UserJoined { username: String, user_count: usize },
    /// A participant left.
    UserLeft { username: String, user_count: usize },
    /// Current participant count.
    UserCount { count: usize },
    /// Keepalive answer.
    Pong,
    /// Any kind this build does not know.
    #[serde(other)]
    Unknown,
}

/// One entry of the board history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryEntry {
    Draw(DrawEvent),
    Clear,
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// Encode for sending.
    pub fn to_frame(&self) -> ProtocolResult<Frame> {
        if matches!(self, ClientMessage::Unknown) {
            return Err(ProtocolError::Unsendable("unknown"));
        }
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a frame. `Ok(None)` means the kind is not recognized.
    pub fn from_frame(frame: &str) -> ProtocolResult<Option<Self>> {
        match serde_json::from_str(frame)? {
            ClientMessage::Unknown => Ok(None),
            msg => Ok(Some(msg)),
        }
    }
}

impl ServerMessage {
    /// Encode for sending.
    pub fn to_frame(&self) -> ProtocolResult<Frame> {
        if matches!(self, ServerMessage::Unknown) {
            return Err(ProtocolError::Unsendable("unknown"));
        }
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a frame. `Ok(None)` means the kind is not recognized.
    pub fn from_frame(frame: &str) -> ProtocolResult<Option<Self>> {
        match serde_json::from_str(frame)? {
            ServerMessage::Unknown => Ok(None),
            msg => Ok(Some(msg)),
        }
    }

    /// Build a `history` message from stored entries.
    pub fn history(entries: impl IntoIterator<Item = HistoryEntry>) -> Self {
        ServerMessage::History {
            data: entries
                .into_iter()
                .filter(|entry| !matches!(entry, HistoryEntry::Unknown))
                .collect(),
        }
    }
}
