//! # SockJS XHR Transport
//!
//! A client for the SockJS `xhr` long-polling transport. Ordered string
//! messages are layered over plain HTTP request/response pairs for servers
//! (or networks) that cannot hold a persistent duplex connection.
//!
//! # Protocol
//!
//! ```text
//! ┌──────────┐                              ┌──────────┐
//! │  Client   │                              │  Server   │
//! └────┬─────┘                              └────┬─────┘
//!      │                                         │
//!      │  GET  /info                             │
//!      │ ──────────────────────────────────────►  │
//!      │  200 {"websocket":..,"entropy":..}      │
//!      │ ◄──────────────────────────────────────  │
//!      │                                         │
//!      │  POST /<shard>/<session>/xhr            │
//!      │ ──────────────────────────────────────►  │
//!      │  200 "o\n"                              │
//!      │ ◄──────────────────────────────────────  │
//!      │                                         │
//!      │  POST /<shard>/<session>/xhr            │
//!      │ ──────────────────────────────────────►  │
//!      │           ... (blocks) ...              │
//!      │  200 "a[\"hello\",\"world\"]\n"         │
//!      │ ◄──────────────────────────────────────  │
//!      │                                         │
//!      │  POST /<shard>/<session>/xhr_send       │
//!      │  Body: ["ping"]                         │
//!      │ ──────────────────────────────────────►  │
//!      │  204 No Content                         │
//!      │ ◄──────────────────────────────────────  │
//! ```
//!
//! Every poll response is one [`Frame`](frame::Frame): `o` (open),
//! `h` (heartbeat), `a[...]` (messages) or `c[code,"reason"]` (close).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     XhrSession<H>                         │
//! │                                                          │
//! │  open()    ──► POST /xhr      ──► expect `o`              │
//! │  receive() ──► MessageQueue? ──► POST /xhr ──► Frame      │
//! │  send(msg) ──► ["msg"]       ──► POST /xhr_send           │
//! │  close()   ──► Phase::Closed (local)                      │
//! └──────────────────────────────────────────────────────────┘
//! ```

extern crate alloc;

pub mod backoff;
pub mod client;
pub mod config;
pub mod error;
pub mod frame;
pub mod http_client;
pub mod info;
pub mod queue;
pub mod session;

pub use client::XhrSession;
pub use config::DialOptions;
pub use frame::{CloseFrame, Frame};
pub use session::{Phase, SessionAddress};

#[cfg(feature = "reqwest")]
pub use http_client::reqwest_client::ReqwestHttpClient;

/// Default per-request timeout in seconds.
///
/// Bounds each individual poll, so it should exceed the server's own
/// long-poll timeout (25 seconds for stock SockJS servers).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Length of the random session token.
pub const SESSION_TOKEN_LEN: usize = 20;

/// Largest shard number; shards are rendered as three digits.
pub const SHARD_ID_MAX: u16 = 999;

/// Path suffix used for the handshake and every poll.
pub const XHR_PATH: &str = "/xhr";

/// Path suffix used for outbound messages.
pub const XHR_SEND_PATH: &str = "/xhr_send";

/// Capability discovery path, relative to the base URL.
pub const INFO_PATH: &str = "/info";
