//! Participant count and transient notices.

use crate::protocol::ServerMessage;
use std::time::{Duration, Instant};

/// What a notice is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Join,
    Leave,
}

/// A short message shown to the user for a few seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    pub created: Instant,
}

/// How a live notice should be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoticePhase {
    Visible,
    /// Fading out; `opacity` runs from 1.0 down to 0.0.
    Fading { opacity: f64 },
}

/// Tracks the participant count and the notice list.
#[derive(Debug, Clone)]
pub struct PresenceFeed {
    user_count: usize,
    notices: Vec<Notice>,
    visible: Duration,
    fade: Duration,
}

impl Default for PresenceFeed {
    fn default() -> Self {
        Self::new(crate::config::NOTICE_VISIBLE, crate::config::NOTICE_FADE)
    }
}

impl PresenceFeed {
    pub fn new(visible: Duration, fade: Duration) -> Self {
        Self {
            user_count: 0,
            notices: Vec::new(),
            visible,
            fade,
        }
    }

    pub fn user_count(&self) -> usize {
        self.user_count
    }

    /// Label for the participant counter.
    pub fn count_label(&self) -> String {
        count_label(self.user_count)
    }

    /// Notices still alive, oldest first.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Update from a server message. Returns whether the message was a presence kind.
    pub fn apply(&mut self, msg: &ServerMessage, now: Instant) -> bool {
        match msg {
            ServerMessage::UserJoined { username, user_count } => {
                self.user_count = *user_count;
                self.push(format!("{} joined", username), NoticeKind::Join, now);
                true
            }
            ServerMessage::UserLeft { username, user_count } => {
                self.user_count = *user_count;
                self.push(format!("{} left", username), NoticeKind::Leave, now);
                true
            }
            ServerMessage::UserCount { count } => {
                self.user_count = *count;
                true
            }
            _ => false,
        }
    }

    /// The connection opened.
    pub fn connected(&mut self, username: &str, now: Instant) {
        self.push(format!("Connected as {}", username), NoticeKind::Info, now);
    }

    /// The board was wiped by someone else.
    pub fn board_cleared(&mut self, now: Instant) {
        self.push("Board cleared".to_string(), NoticeKind::Info, now);
    }

    fn push(&mut self, text: String, kind: NoticeKind, now: Instant) {
        log::info!("{}", text);
        self.notices.push(Notice { text, kind, created: now });
    }

    /// Drop notices whose fade has finished.
    pub fn tick(&mut self, now: Instant) {
        let lifetime = self.visible + self.fade;
        self.notices
            .retain(|notice| now.saturating_duration_since(notice.created) < lifetime);
    }

    /// Display phase of a notice at `now`, or `None` once it has expired.
    pub fn phase(&self, notice: &Notice, now: Instant) -> Option<NoticePhase> {
        let age = now.saturating_duration_since(notice.created);
        if age < self.visible {
            return Some(NoticePhase::Visible);
        }
        let fading = age - self.visible;
        if fading >= self.fade {
            return None;
        }
        let opacity = 1.0 - fading.as_secs_f64() / self.fade.as_secs_f64();
        Some(NoticePhase::Fading { opacity })
    }
}

/// `"1 user"` for one participant, `"{n} users"` otherwise.
pub fn count_label(count: usize) -> String {
    if count == 1 {
        "1 user".to_string()
    } else {
        format!("{} users", count)
    }
}
