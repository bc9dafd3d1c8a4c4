//! Error types for the XHR transport.

use alloc::string::String;

use thiserror::Error;

use crate::frame::MalformedFrame;

/// The underlying HTTP call failed or returned a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request itself failed (connection refused, timeout, ...).
    #[error("HTTP request error: {0}")]
    Request(String),

    /// Server returned a non-2xx status.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// The HTTP status code.
        status: u16,
        /// The response body as a string.
        body: String,
    },
}

impl TransportError {
    /// Wrap an HTTP client error.
    pub fn request<E: core::error::Error>(err: &E) -> Self {
        TransportError::Request(err.to_string())
    }

    /// The offending HTTP status, if the request got that far.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            TransportError::Request(_) => None,
            TransportError::UnexpectedStatus { status, .. } => Some(*status),
        }
    }
}

/// Errors while fetching `/info`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InfoError {
    /// HTTP request failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The body was not the expected JSON object.
    #[error("info decode error: {0}")]
    Decode(String),
}

/// Failed to establish a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// The handshake request failed.
    #[error("handshake transport error: {0}")]
    Transport(#[from] TransportError),

    /// The handshake response did not start with an `o` frame.
    #[error("can't start session, invalid frame: {}", describe_byte(.byte))]
    UnexpectedFrame {
        /// The first byte of the response body, if there was one.
        byte: Option<u8>,
    },

    /// Capability discovery failed before the handshake.
    #[error("capability discovery failed: {0}")]
    Info(#[from] InfoError),

    /// The session was already closed; phases are never revisited.
    #[error("session already closed")]
    SessionClosed,
}

impl ConnectError {
    /// Whether retrying the handshake could help.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            ConnectError::Transport(_) | ConnectError::Info(InfoError::Transport(_))
        )
    }
}

fn describe_byte(byte: &Option<u8>) -> String {
    match *byte {
        Some(b) => alloc::format!("{:?}", char::from(b)),
        None => String::from("<empty body>"),
    }
}

/// Problem while receiving.
///
/// Well-formed termination is not an error: `receive` returns `Ok(None)`
/// once the session has closed and the queue is drained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecvError {
    /// `receive` called before the handshake.
    #[error("session is not open")]
    NotOpen,

    /// A poll response could not be decoded. The session phase is untouched.
    #[error("protocol error: {0}")]
    Protocol(#[from] MalformedFrame),

    /// The poll request failed. Not retried internally.
    #[error("poll transport error: {0}")]
    Transport(#[from] TransportError),

    /// The caller's cancellation signal fired first.
    #[error("receive cancelled")]
    Cancelled,
}

/// Problem while sending.
#[derive(Debug, Error)]
pub enum SendError {
    /// `send` called before the handshake or after close.
    #[error("session is not open")]
    NotOpen,

    /// The outbound array could not be encoded.
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    /// The send request failed or was rejected.
    #[error("send transport error: {0}")]
    Transport(#[from] TransportError),
}
