//! A single XHR long-poll session.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    XhrSession<H>                          │
//! │                                                          │
//! │  receive() ──► poll_gate ──► pending? ──► pop             │
//! │                                 │ empty                   │
//! │                                 ▼                         │
//! │                    POST /xhr ◄──┐  o / h / a[]            │
//! │                        │        └── loop                  │
//! │                        ▼                                  │
//! │              a[..] ──► pending     c[..] ──► Closed       │
//! │                                                          │
//! │  send(msg) ──► phase == Open? ──► POST /xhr_send ["msg"]  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! `phase` and `pending` sit behind one [`Mutex`] that is never held across
//! network I/O, so a `send` can be in flight while a `receive` is polling.
//! Concurrent `receive` calls queue up on `poll_gate`.

mod handshake;
mod poll;

use alloc::{string::String, sync::Arc};
use core::{future::Future, pin::pin};

use async_lock::Mutex;
use futures::{
    Stream,
    future::{self, Either, select},
};

use crate::{
    backoff::Backoff,
    config::DialOptions,
    error::{ConnectError, RecvError, SendError, TransportError},
    frame::CloseFrame,
    http_client::HttpClient,
    info::{Info, fetch_info},
    queue::MessageQueue,
    session::{Phase, SessionAddress},
};

use handshake::handshake;
use poll::{Delivery, poll_until_delivery};

/// Content type for every `POST`.
const TEXT_PLAIN: (&str, &str) = ("content-type", "text/plain");

/// A client session over the XHR long-polling transport.
///
/// Clones share the same session.
#[derive(Debug)]
pub struct XhrSession<H> {
    inner: Arc<Inner<H>>,
}

impl<H> Clone for XhrSession<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[derive(Debug)]
struct Inner<H> {
    http: H,
    address: SessionAddress,
    info: Option<Info>,
    state: Mutex<State>,

    /// Held for the whole of a `receive`, so only one poll is in flight.
    poll_gate: Mutex<()>,
}

#[derive(Debug)]
struct State {
    phase: Phase,
    pending: MessageQueue,
    close: Option<CloseFrame>,
}

impl<H: HttpClient> XhrSession<H> {
    /// An unopened session at `address`. Call [`open`](Self::open) next.
    #[must_use]
    pub fn new(http: H, address: SessionAddress) -> Self {
        Self::with_info(http, address, None)
    }

    fn with_info(http: H, address: SessionAddress, info: Option<Info>) -> Self {
        Self {
            inner: Arc::new(Inner {
                http,
                address,
                info,
                state: Mutex::new(State {
                    phase: Phase::Unopened,
                    pending: MessageQueue::new(),
                    close: None,
                }),
                poll_gate: Mutex::new(()),
            }),
        }
    }

    /// Fetch `/info`, pick a fresh random address, and open a session there.
    ///
    /// Transport failures of either step are retried up to
    /// `options.handshake_attempts` times each.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError`] if discovery or every handshake attempt fails.
    pub async fn dial(http: H, options: &DialOptions) -> Result<Self, ConnectError> {
        let info = discover(&http, options).await?;
        let address = SessionAddress::random(&options.base_url);

        let session = Self::with_info(http, address, Some(info));
        session
            .open_with_backoff(options.backoff, options.handshake_attempts)
            .await?;

        Ok(session)
    }

    /// The session's address.
    #[must_use]
    pub fn address(&self) -> &SessionAddress {
        &self.inner.address
    }

    /// Server capabilities, if this session was created by [`dial`](Self::dial).
    #[must_use]
    pub fn info(&self) -> Option<&Info> {
        self.inner.info.as_ref()
    }

    /// Current lifecycle phase.
    pub async fn phase(&self) -> Phase {
        self.inner.state.lock().await.phase
    }

    /// Why the session closed, once it has.
    pub async fn close_frame(&self) -> Option<CloseFrame> {
        self.inner.state.lock().await.close.clone()
    }

    /// Messages received but not yet handed out.
    pub async fn pending_len(&self) -> usize {
        self.inner.state.lock().await.pending.len()
    }

    /// Perform the opening handshake.
    ///
    /// A no-op on an already open session.
    ///
    /// # Errors
    ///
    /// * [`ConnectError::Transport`] if the request fails or is rejected
    /// * [`ConnectError::UnexpectedFrame`] if the body does not start with `o`
    /// * [`ConnectError::SessionClosed`] if the session was already closed
    pub async fn open(&self) -> Result<(), ConnectError> {
        match self.inner.state.lock().await.phase {
            Phase::Unopened => {}
            Phase::Open => return Ok(()),
            Phase::Closed => return Err(ConnectError::SessionClosed),
        }

        handshake(&self.inner.http, &self.inner.address).await?;

        let mut state = self.inner.state.lock().await;
        match state.phase {
            Phase::Closed => Err(ConnectError::SessionClosed),
            Phase::Unopened | Phase::Open => {
                state.phase = Phase::Open;
                tracing::info!(address = %self.inner.address, "session open");
                Ok(())
            }
        }
    }

    /// [`open`](Self::open), retrying transport failures up to `attempts`
    /// times in total with `backoff` between them.
    ///
    /// # Errors
    ///
    /// Returns the last [`ConnectError`] once attempts run out, or the first
    /// error that retrying cannot fix.
    pub async fn open_with_backoff(
        &self,
        mut backoff: Backoff,
        attempts: usize,
    ) -> Result<(), ConnectError> {
        let attempts = attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.open().await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_transient() && attempt < attempts => {
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        error = %e,
                        attempt,
                        attempts,
                        ?delay,
                        "handshake failed, retrying"
                    );
                    futures_timer::Delay::new(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Next message, polling the server if none is queued.
    ///
    /// Returns `Ok(None)` once the session is closed and every queued
    /// message has been handed out; from then on no request is made.
    ///
    /// # Errors
    ///
    /// * [`RecvError::NotOpen`] before the handshake
    /// * [`RecvError::Protocol`] on an undecodable poll response
    /// * [`RecvError::Transport`] if a poll request fails
    pub async fn receive(&self) -> Result<Option<String>, RecvError> {
        self.receive_until(future::pending::<()>()).await
    }

    /// [`receive`](Self::receive), abandoned as soon as `cancel` resolves.
    ///
    /// A cancelled call leaves the session exactly as it found it: any poll
    /// response still in flight is discarded.
    ///
    /// # Errors
    ///
    /// As [`receive`](Self::receive), plus [`RecvError::Cancelled`].
    pub async fn receive_until<C>(&self, cancel: C) -> Result<Option<String>, RecvError>
    where
        C: Future<Output = ()>,
    {
        let work = pin!(self.receive_inner());
        let cancel = pin!(cancel);

        match select(work, cancel).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => {
                tracing::debug!(address = %self.inner.address, "receive cancelled");
                Err(RecvError::Cancelled)
            }
        }
    }

    async fn receive_inner(&self) -> Result<Option<String>, RecvError> {
        let _gate = self.inner.poll_gate.lock().await;

        {
            let mut state = self.inner.state.lock().await;
            if let Some(msg) = state.pending.pop_front() {
                return Ok(Some(msg));
            }

            match state.phase {
                Phase::Unopened => return Err(RecvError::NotOpen),
                Phase::Closed => return Ok(None),
                Phase::Open => {}
            }
        }

        let delivery = poll_until_delivery(&self.inner.http, &self.inner.address.xhr_url()).await?;

        let mut state = self.inner.state.lock().await;
        match delivery {
            Delivery::Messages(messages) => {
                tracing::debug!(count = messages.len(), "queued messages");
                state.pending.extend(messages);
            }
            Delivery::Closed(close) => {
                tracing::info!(address = %self.inner.address, %close, "session closed by server");
                state.phase = Phase::Closed;
                state.close.get_or_insert(close);
            }
        }

        Ok(state.pending.pop_front())
    }

    /// A stream of received messages.
    ///
    /// Ends after the session closes, or after yielding the first error.
    pub fn messages(&self) -> impl Stream<Item = Result<String, RecvError>> + '_ {
        futures::stream::unfold(false, move |failed| async move {
            if failed {
                return None;
            }

            match self.receive().await {
                Ok(Some(msg)) => Some((Ok(msg), false)),
                Ok(None) => None,
                Err(e) => Some((Err(e), true)),
            }
        })
    }

    /// Send one message.
    ///
    /// The body is always a JSON array, even for a single message.
    /// Any 2xx answer is an acknowledgement; its body is ignored.
    ///
    /// # Errors
    ///
    /// * [`SendError::NotOpen`] unless the session is open (no request is made)
    /// * [`SendError::Transport`] if the request fails or is rejected
    pub async fn send(&self, message: &str) -> Result<(), SendError> {
        if self.inner.state.lock().await.phase != Phase::Open {
            return Err(SendError::NotOpen);
        }

        let body = serde_json::to_vec(&[message])?;
        tracing::debug!(bytes = body.len(), "sending message");

        let resp = self
            .inner
            .http
            .post(&self.inner.address.xhr_send_url(), &[TEXT_PLAIN], body)
            .await
            .map_err(|e| TransportError::request(&e))?;

        if !resp.is_success() {
            tracing::warn!(status = resp.status, "send rejected");
            return Err(TransportError::UnexpectedStatus {
                status: resp.status,
                body: resp.body_lossy(),
            }
            .into());
        }

        Ok(())
    }

    /// Close the session locally.
    ///
    /// Idempotent. Later sends fail with [`SendError::NotOpen`]; later
    /// receives drain what is queued and then return `Ok(None)`. The server
    /// is not notified.
    pub async fn close(&self, code: u32, reason: &str) {
        let mut state = self.inner.state.lock().await;
        if state.phase == Phase::Closed {
            return;
        }

        state.phase = Phase::Closed;
        state.close.get_or_insert_with(|| CloseFrame {
            code,
            reason: reason.into(),
        });
        tracing::info!(address = %self.inner.address, code, reason, "session closed locally");
    }
}

/// [`fetch_info`] with the same retry policy as the handshake.
async fn discover<H: HttpClient>(http: &H, options: &DialOptions) -> Result<Info, ConnectError> {
    let attempts = options.handshake_attempts.max(1);
    let mut backoff = options.backoff;
    let mut attempt = 1;

    loop {
        match fetch_info(http, &options.base_url).await {
            Ok(info) => return Ok(info),
            Err(e) => {
                let e = ConnectError::from(e);
                if !e.is_transient() || attempt >= attempts {
                    return Err(e);
                }

                let delay = backoff.next_delay();
                tracing::warn!(
                    error = %e,
                    attempt,
                    attempts,
                    ?delay,
                    "info request failed, retrying"
                );
                futures_timer::Delay::new(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(feature = "reqwest")]
impl XhrSession<crate::http_client::reqwest_client::ReqwestHttpClient> {
    /// [`dial`](Self::dial) with a [`reqwest`] client using the options' timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError`] if discovery or every handshake attempt fails.
    pub async fn connect(options: &DialOptions) -> Result<Self, ConnectError> {
        let http = crate::http_client::reqwest_client::ReqwestHttpClient::with_timeout(
            options.request_timeout,
        );
        Self::dial(http, options).await
    }
}
