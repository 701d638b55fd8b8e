//! Participant identity for one join.

use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// Session errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Username must not be empty")]
    EmptyUsername,
    #[error("Invalid server URL: {0}")]
    InvalidServerUrl(String),
}

/// Who this client is on the board.
///
/// The id is generated locally and asserted to the server as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    client_id: String,
    username: String,
}

impl Session {
    /// Start a session with a fresh client id.
    pub fn join(username: &str) -> Result<Self, SessionError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(SessionError::EmptyUsername);
        }
        Ok(Self {
            client_id: Uuid::new_v4().simple().to_string(),
            username: username.to_string(),
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// `{server}/ws/{client_id}?username={username}`.
    pub fn connect_url(&self, server: &str) -> Result<Url, SessionError> {
        let mut url = Url::parse(server.trim_end_matches('/'))
            .map_err(|e| SessionError::InvalidServerUrl(format!("{}: {}", server, e)))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(SessionError::InvalidServerUrl(format!(
                "{}: expected ws:// or wss://",
                server
            )));
        }
        url.path_segments_mut()
            .map_err(|_| SessionError::InvalidServerUrl(server.to_string()))?
            .pop_if_empty()
            .push("ws")
            .push(&self.client_id);
        url.query_pairs_mut().clear().append_pair("username", &self.username);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_trims_and_rejects_empty() {
        assert_eq!(Session::join("   "), Err(SessionError::EmptyUsername));
        let session = Session::join("  ada ").unwrap();
        assert_eq!(session.username(), "ada");
        assert_eq!(session.client_id().len(), 32);
    }

    #[test]
    fn test_each_join_gets_new_id() {
        let a = Session::join("ada").unwrap();
        let b = Session::join("ada").unwrap();
        assert_ne!(a.client_id(), b.client_id());
    }

    #[test]
    fn test_connect_url() {
        let session = Session::join("Ada Lovelace").unwrap();
        let url = session.connect_url("ws://localhost:8000/").unwrap();
        assert_eq!(
            url.as_str(),
            format!("ws://localhost:8000/ws/{}?username=Ada+Lovelace", session.client_id())
        );
    }

    #[test]
    fn test_connect_url_rejects_http() {
        let session = Session::join("ada").unwrap();
        assert!(matches!(
            session.connect_url("http://localhost:8000"),
            Err(SessionError::InvalidServerUrl(_))
        ));
        assert!(matches!(
            session.connect_url("not a url"),
            Err(SessionError::InvalidServerUrl(_))
        ));
    }
}
