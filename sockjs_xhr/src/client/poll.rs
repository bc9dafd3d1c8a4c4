//! The poll loop behind `receive`.

use alloc::{string::String, vec::Vec};

use crate::{
    error::{RecvError, TransportError},
    frame::{CloseFrame, Frame},
    http_client::HttpClient,
};

use super::TEXT_PLAIN;

/// What ended a run of polls.
#[derive(Debug)]
pub(super) enum Delivery {
    /// A non-empty `a` frame.
    Messages(Vec<String>),

    /// A `c` frame.
    Closed(CloseFrame),
}

/// Poll `url` until a frame carries something for the caller.
///
/// `o`, `h` and empty `a` frames are consumed silently. Nothing here touches
/// session state; the caller applies the [`Delivery`] once it has it.
pub(super) async fn poll_until_delivery<H: HttpClient>(
    http: &H,
    url: &str,
) -> Result<Delivery, RecvError> {
    let mut polls = 0u32;

    loop {
        polls = polls.saturating_add(1);

        let resp = http
            .post(url, &[TEXT_PLAIN], Vec::new())
            .await
            .map_err(|e| TransportError::request(&e))?;

        if !resp.is_success() {
            tracing::warn!(status = resp.status, url, "poll returned error status");
            return Err(TransportError::UnexpectedStatus {
                status: resp.status,
                body: resp.body_lossy(),
            }
            .into());
        }

        let frame = Frame::decode(&resp.body);
        tracing::debug!(kind = frame.kind(), polls, "received frame");

        match frame {
            Frame::Open | Frame::Heartbeat => {}
            Frame::Array(messages) if messages.is_empty() => {}
            Frame::Array(messages) => return Ok(Delivery::Messages(messages)),
            Frame::Close(close) => return Ok(Delivery::Closed(close)),
            Frame::Malformed(err) => {
                tracing::warn!(%err, url, "malformed poll response");
                return Err(err.into());
            }
        }
    }
}
