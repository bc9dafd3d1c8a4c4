//! The HTTP capability the transport is built on.
//!
//! Connection reuse, TLS and per-request timeouts belong to the
//! implementation; the transport only issues `GET /info` and a stream of
//! `POST`s, and always needs the whole response body.

use alloc::{string::String, vec::Vec};

use futures::future::BoxFuture;

#[cfg(feature = "reqwest")]
pub mod reqwest_client;

/// A minimal async HTTP client.
pub trait HttpClient: Clone + Send + Sync + 'static {
    /// The error type for HTTP operations.
    type Error: core::error::Error + Send + Sync + 'static;

    /// Send a `GET` request and return the response.
    fn get(&self, url: &str) -> BoxFuture<'_, Result<HttpResponse, Self::Error>>;

    /// Send a `POST` request and return the response.
    ///
    /// The returned body must be complete: read to end-of-stream.
    fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: Vec<u8>,
    ) -> BoxFuture<'_, Result<HttpResponse, Self::Error>>;
}

/// A minimal HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub status: u16,

    /// The full response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// A response with the given status and complete body.
    #[must_use]
    pub const fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// The body as text, for diagnostics.
    #[must_use]
    pub fn body_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn success_range() {
        assert!(HttpResponse::new(200, vec![]).is_success());
        assert!(HttpResponse::new(204, vec![]).is_success());
        assert!(!HttpResponse::new(199, vec![]).is_success());
        assert!(!HttpResponse::new(404, vec![]).is_success());
        assert!(!HttpResponse::new(500, vec![]).is_success());
    }

    #[test]
    fn lossy_body_survives_invalid_utf8() {
        let resp = HttpResponse::new(500, vec![b'o', b'o', 0xff, b'p', b's']);
        assert_eq!(resp.body_lossy(), "oo\u{fffd}ps");
    }
}
