//! Options for dialing a server.

use alloc::string::String;
use core::time::Duration;

use crate::{DEFAULT_REQUEST_TIMEOUT_SECS, backoff::Backoff};

/// How to reach a server and how hard to try.
#[derive(Debug, Clone, PartialEq)]
pub struct DialOptions {
    /// Server prefix, e.g. `http://localhost:8081/echo`. No trailing `/`.
    pub base_url: String,

    /// Per-request timeout handed to the HTTP client.
    pub request_timeout: Duration,

    /// Total attempts for `/info` and, separately, for the handshake;
    /// transport failures are retried.
    pub handshake_attempts: usize,

    /// Delay schedule between attempts.
    pub backoff: Backoff,
}

impl DialOptions {
    /// Options with defaults for everything but the base URL.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').into(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            handshake_attempts: 1,
            backoff: Backoff::default(),
        }
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the number of handshake attempts (at least one is always made).
    #[must_use]
    pub fn with_handshake_attempts(mut self, attempts: usize) -> Self {
        self.handshake_attempts = attempts;
        self
    }

    /// Set the delay schedule between handshake attempts.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slashes() {
        assert_eq!(DialOptions::new("http://host/echo//").base_url, "http://host/echo");
    }

    #[test]
    fn builder_overrides_defaults() {
        let opts = DialOptions::new("http://host")
            .with_request_timeout(Duration::from_secs(5))
            .with_handshake_attempts(3);

        assert_eq!(opts.request_timeout, Duration::from_secs(5));
        assert_eq!(opts.handshake_attempts, 3);
        assert_eq!(opts.backoff, Backoff::default());
    }
}
