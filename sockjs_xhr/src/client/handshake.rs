//! Opening handshake: one empty `POST /xhr` that must answer with `o`.

use alloc::vec::Vec;

use crate::{
    error::{ConnectError, TransportError},
    frame::OPEN_TAG,
    http_client::HttpClient,
    session::SessionAddress,
};

use super::TEXT_PLAIN;

/// Perform the handshake against `address`.
///
/// Only the first byte of the body is inspected. Safe to repeat: a fresh
/// `o` from the server just re-confirms the session.
pub(super) async fn handshake<H: HttpClient>(
    http: &H,
    address: &SessionAddress,
) -> Result<(), ConnectError> {
    let resp = http
        .post(&address.xhr_url(), &[TEXT_PLAIN], Vec::new())
        .await
        .map_err(|e| TransportError::request(&e))?;

    if !resp.is_success() {
        return Err(TransportError::UnexpectedStatus {
            status: resp.status,
            body: resp.body_lossy(),
        }
        .into());
    }

    match resp.body.first().copied() {
        Some(OPEN_TAG) => Ok(()),
        byte => {
            tracing::warn!(%address, ?byte, "handshake answered with unexpected frame");
            Err(ConnectError::UnexpectedFrame { byte })
        }
    }
}
