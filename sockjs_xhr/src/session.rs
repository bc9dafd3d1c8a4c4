//! Session addressing and lifecycle phase.
//!
//! A session lives at `<base>/<shard>/<session>`. Both path segments are
//! chosen by the client: the shard is a three-digit number the server may
//! use for routing, the session token is random and unique per session.

use alloc::string::String;
use core::fmt;

use rand::{Rng, distributions::Alphanumeric};

use crate::{SESSION_TOKEN_LEN, SHARD_ID_MAX, XHR_PATH, XHR_SEND_PATH};

/// Lifecycle of a session. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Address chosen, handshake not yet done.
    Unopened,

    /// Handshake observed an `o` frame.
    Open,

    /// Closed locally or by the server. Terminal.
    Closed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Unopened => "unopened",
            Phase::Open => "open",
            Phase::Closed => "closed",
        })
    }
}

/// Server shard number, rendered as three zero-padded digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShardId(u16);

impl ShardId {
    /// Pick a random shard.
    #[must_use]
    pub fn random() -> Self {
        Self(rand::thread_rng().gen_range(0..=SHARD_ID_MAX))
    }

    /// Use a specific shard number, if it fits in three digits.
    #[must_use]
    pub const fn new(n: u16) -> Option<Self> {
        if n > SHARD_ID_MAX {
            None
        } else {
            Some(Self(n))
        }
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

/// Random per-session token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate [`SESSION_TOKEN_LEN`] random alphanumeric characters.
    #[must_use]
    pub fn random() -> Self {
        Self(
            rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(SESSION_TOKEN_LEN)
                .map(char::from)
                .collect(),
        )
    }

    /// Use a caller-chosen token.
    ///
    /// Returns `None` if the token is empty or contains anything other
    /// than ASCII alphanumerics, `-` or `_` (it becomes a path segment).
    #[must_use]
    pub fn from_string(token: String) -> Option<Self> {
        let valid = !token.is_empty()
            && token
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        valid.then_some(Self(token))
    }

    /// The token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a session lives. Fixed for the session's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionAddress {
    url: String,
    shard: ShardId,
    token: SessionToken,
}

impl SessionAddress {
    /// Build an address from its parts. Trailing `/` on `base_url` is ignored.
    #[must_use]
    pub fn new(base_url: &str, shard: ShardId, token: SessionToken) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            url: alloc::format!("{base}/{shard}/{token}"),
            shard,
            token,
        }
    }

    /// A fresh address with a random shard and session token.
    #[must_use]
    pub fn random(base_url: &str) -> Self {
        Self::new(base_url, ShardId::random(), SessionToken::random())
    }

    /// `<base>/<shard>/<session>`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// The shard segment.
    #[must_use]
    pub const fn shard(&self) -> ShardId {
        self.shard
    }

    /// The session segment.
    #[must_use]
    pub const fn token(&self) -> &SessionToken {
        &self.token
    }

    /// Handshake and poll endpoint.
    #[must_use]
    pub fn xhr_url(&self) -> String {
        alloc::format!("{}{XHR_PATH}", self.url)
    }

    /// Send endpoint.
    #[must_use]
    pub fn xhr_send_url(&self) -> String {
        alloc::format!("{}{XHR_SEND_PATH}", self.url)
    }
}

impl fmt::Display for SessionAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shard_is_three_digits() {
        for _ in 0..100 {
            let shard = ShardId::random().to_string();
            assert_eq!(shard.len(), 3);
            assert!(shard.bytes().all(|b| b.is_ascii_digit()));
        }
        assert_eq!(ShardId::new(7).map(|s| s.to_string()).as_deref(), Some("007"));
        assert!(ShardId::new(1000).is_none());
    }

    #[test]
    fn session_token_is_alphanumeric() {
        let token = SessionToken::random();
        assert_eq!(token.as_str().len(), SESSION_TOKEN_LEN);
        assert!(token.as_str().bytes().all(|b| b.is_ascii_alphanumeric()));
        assert_ne!(token, SessionToken::random());
    }

    #[test]
    fn session_token_rejects_path_characters() {
        assert!(SessionToken::from_string(String::new()).is_none());
        assert!(SessionToken::from_string("a/b".into()).is_none());
        assert!(SessionToken::from_string("a?b".into()).is_none());
        assert!(SessionToken::from_string("abc_DEF-123".into()).is_some());
    }

    #[test]
    fn address_urls() {
        let shard = ShardId::new(42).expect("valid shard");
        let token = SessionToken::from_string("abc".into()).expect("valid token");
        let address = SessionAddress::new("http://localhost:8081/echo/", shard, token);

        assert_eq!(address.as_str(), "http://localhost:8081/echo/042/abc");
        assert_eq!(address.xhr_url(), "http://localhost:8081/echo/042/abc/xhr");
        assert_eq!(
            address.xhr_send_url(),
            "http://localhost:8081/echo/042/abc/xhr_send"
        );
    }

    #[test]
    fn phases_are_ordered() {
        assert!(Phase::Unopened < Phase::Open);
        assert!(Phase::Open < Phase::Closed);
    }
}
