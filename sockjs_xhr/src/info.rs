//! Capability discovery via `GET <base>/info`.
//!
//! The answer only informs transport selection upstream; the session logic
//! never branches on it.

use alloc::{string::String, vec::Vec};

use serde::Deserialize;

use crate::{
    INFO_PATH,
    error::{InfoError, TransportError},
    http_client::HttpClient,
};

/// Server capabilities advertised at `/info`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Info {
    /// Whether the server offers the WebSocket transport.
    pub websocket: bool,

    /// Whether the server needs a sticky-session cookie.
    pub cookie_needed: bool,

    /// Allowed origins.
    #[serde(default)]
    pub origins: Vec<String>,

    /// Server-supplied random number.
    pub entropy: i64,
}

impl Info {
    /// Decode an `/info` response body.
    ///
    /// # Errors
    ///
    /// Returns [`InfoError::Decode`] if the body is not the expected object.
    pub fn from_json(body: &[u8]) -> Result<Self, InfoError> {
        serde_json::from_slice(body).map_err(|e| InfoError::Decode(e.to_string()))
    }
}

/// Fetch `/info` from the server at `base_url`.
///
/// # Errors
///
/// Returns [`InfoError`] if the request fails, the status is not 2xx, or the
/// body does not decode.
pub async fn fetch_info<H: HttpClient>(http: &H, base_url: &str) -> Result<Info, InfoError> {
    let url = alloc::format!("{}{INFO_PATH}", base_url.trim_end_matches('/'));

    let resp = http
        .get(&url)
        .await
        .map_err(|e| TransportError::request(&e))?;

    if !resp.is_success() {
        return Err(TransportError::UnexpectedStatus {
            status: resp.status,
            body: resp.body_lossy(),
        }
        .into());
    }

    let info = Info::from_json(&resp.body)?;
    tracing::debug!(?info, "fetched server info");
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_info() {
        let info = Info::from_json(
            br#"{"websocket":true,"cookie_needed":false,"origins":["*:*"],"entropy":123456}"#,
        )
        .expect("valid info");

        assert!(info.websocket);
        assert!(!info.cookie_needed);
        assert_eq!(info.origins, ["*:*"]);
        assert_eq!(info.entropy, 123_456);
    }

    #[test]
    fn origins_default_to_empty() {
        let info = Info::from_json(br#"{"websocket":false,"cookie_needed":true,"entropy":-1}"#)
            .expect("valid info");
        assert!(info.origins.is_empty());
    }

    #[test]
    fn rejects_non_object() {
        assert!(matches!(
            Info::from_json(b"[]"),
            Err(InfoError::Decode(_))
        ));
    }
}
