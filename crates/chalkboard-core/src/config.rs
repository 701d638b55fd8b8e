//! Client configuration.

use std::time::Duration;

/// Default board server.
pub const DEFAULT_SERVER_URL: &str = "ws://localhost:8000";

/// Delay between a lost connection and the next connection attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// How long a notice stays fully visible.
pub const NOTICE_VISIBLE: Duration = Duration::from_secs(3);

/// How long a notice fades out before it is removed.
pub const NOTICE_FADE: Duration = Duration::from_millis(400);

/// What happens to outbound draw/clear messages while the connection is down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutboundPolicy {
    /// Drop them. Other participants never see marks made while offline.
    #[default]
    Drop,
    /// Keep up to `capacity` frames (oldest dropped first) and send them on the next open.
    Buffer { capacity: usize },
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base WebSocket URL of the board server (`ws://host:port`).
    pub server_url: String,
    /// Fixed delay before each reconnect attempt.
    pub reconnect_delay: Duration,
    /// Handling of outbound messages while disconnected.
    pub outbound: OutboundPolicy,
    /// Visible lifetime of a notice.
    pub notice_visible: Duration,
    /// Fade-out duration of a notice.
    pub notice_fade: Duration,
    /// Initial surface width in pixels.
    pub width: u32,
    /// Initial surface height in pixels.
    pub height: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            outbound: OutboundPolicy::Drop,
            notice_visible: NOTICE_VISIBLE,
            notice_fade: NOTICE_FADE,
            width: 1280,
            height: 800,
        }
    }
}
