//! Poll-response frames.
//!
//! A response body is a single tag byte optionally followed by a JSON
//! payload and a terminating newline:
//!
//! ```text
//! o\n                     open
//! h\n                     heartbeat
//! a["hello","world"]\n    messages
//! c[3000,"Go away!"]\n    close
//! ```
//!
//! [`Frame::decode`] never fails: anything it cannot make sense of becomes
//! [`Frame::Malformed`].

use alloc::{string::String, vec::Vec};
use core::fmt;

use thiserror::Error;

/// Tag byte of an open frame.
pub const OPEN_TAG: u8 = b'o';

/// Tag byte of a heartbeat frame.
pub const HEARTBEAT_TAG: u8 = b'h';

/// Tag byte of a message array frame.
pub const ARRAY_TAG: u8 = b'a';

/// Tag byte of a close frame.
pub const CLOSE_TAG: u8 = b'c';

/// Terminator that ends a frame payload.
pub const FRAME_TERMINATOR: u8 = b'\n';

/// One decoded poll response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// The server (re)confirmed the session.
    Open,

    /// Liveness only.
    Heartbeat,

    /// Zero or more application messages, in server order.
    Array(Vec<String>),

    /// The server terminated the session.
    Close(CloseFrame),

    /// Unknown tag or undecodable payload.
    Malformed(MalformedFrame),
}

/// Code and reason carried by a close frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseFrame {
    /// Close code, e.g. `3000`.
    pub code: u32,

    /// Human-readable reason.
    pub reason: String,
}

impl fmt::Display for CloseFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.code, self.reason)
    }
}

/// Why a response body could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedFrame {
    /// The leading byte is not a known tag, or the body was empty.
    #[error("invalid frame type: {}", describe_tag(.0))]
    InvalidFrameType(Option<u8>),

    /// The tag was recognised but its JSON payload was not.
    #[error("invalid '{}' frame payload: {reason}", tag_char(.tag))]
    InvalidPayload {
        /// The frame's tag byte.
        tag: u8,

        /// The JSON decoder's complaint.
        reason: String,
    },
}

fn describe_tag(tag: &Option<u8>) -> String {
    match *tag {
        Some(byte) if byte.is_ascii_graphic() => alloc::format!("{:?}", char::from(byte)),
        Some(byte) => alloc::format!("0x{byte:02x}"),
        None => String::from("<empty body>"),
    }
}

fn tag_char(tag: &u8) -> char {
    char::from(*tag)
}

impl Frame {
    /// Decode a complete response body.
    ///
    /// The body must already have been read to end-of-stream; the payload is
    /// everything after the tag up to the first [`FRAME_TERMINATOR`], or to
    /// the end if there is none.
    #[must_use]
    pub fn decode(body: &[u8]) -> Self {
        let Some((&tag, rest)) = body.split_first() else {
            return Frame::Malformed(MalformedFrame::InvalidFrameType(None));
        };

        match tag {
            OPEN_TAG => Frame::Open,
            HEARTBEAT_TAG => Frame::Heartbeat,
            ARRAY_TAG => match serde_json::from_slice::<Vec<String>>(payload(rest)) {
                Ok(messages) => Frame::Array(messages),
                Err(e) => Frame::Malformed(MalformedFrame::InvalidPayload {
                    tag,
                    reason: e.to_string(),
                }),
            },
            CLOSE_TAG => match serde_json::from_slice::<(u32, String)>(payload(rest)) {
                Ok((code, reason)) => Frame::Close(CloseFrame { code, reason }),
                Err(e) => Frame::Malformed(MalformedFrame::InvalidPayload {
                    tag,
                    reason: e.to_string(),
                }),
            },
            other => Frame::Malformed(MalformedFrame::InvalidFrameType(Some(other))),
        }
    }

    /// Short name for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Frame::Open => "open",
            Frame::Heartbeat => "heartbeat",
            Frame::Array(_) => "array",
            Frame::Close(_) => "close",
            Frame::Malformed(_) => "malformed",
        }
    }
}

/// Slice the payload off at the terminator.
fn payload(rest: &[u8]) -> &[u8] {
    match rest.iter().position(|&b| b == FRAME_TERMINATOR) {
        Some(end) => rest.get(..end).unwrap_or(rest),
        None => rest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn decodes_open_and_heartbeat() {
        assert_eq!(Frame::decode(b"o"), Frame::Open);
        assert_eq!(Frame::decode(b"o\n"), Frame::Open);
        assert_eq!(Frame::decode(b"h\n"), Frame::Heartbeat);
    }

    #[test]
    fn decodes_array_without_terminator() {
        assert_eq!(
            Frame::decode(br#"a["hello","world"]"#),
            Frame::Array(vec!["hello".into(), "world".into()])
        );
    }

    #[test]
    fn decodes_array_up_to_terminator() {
        assert_eq!(
            Frame::decode(b"a[\"one\"]\ntrailing garbage"),
            Frame::Array(vec!["one".into()])
        );
    }

    #[test]
    fn escaped_newlines_stay_inside_messages() {
        assert_eq!(
            Frame::decode(b"a[\"line\\nbreak\"]\n"),
            Frame::Array(vec!["line\nbreak".into()])
        );
    }

    #[test]
    fn empty_array_is_legal() {
        assert_eq!(Frame::decode(b"a[]\n"), Frame::Array(vec![]));
    }

    #[test]
    fn decodes_close() {
        assert_eq!(
            Frame::decode(br#"c[3000,"Go away!"]"#),
            Frame::Close(CloseFrame {
                code: 3000,
                reason: "Go away!".into()
            })
        );
    }

    #[test]
    fn unknown_tag_is_invalid_frame_type() {
        let frame = Frame::decode(b"x");
        assert_eq!(
            frame,
            Frame::Malformed(MalformedFrame::InvalidFrameType(Some(b'x')))
        );

        let Frame::Malformed(err) = frame else {
            panic!("expected malformed frame");
        };
        assert!(err.to_string().starts_with("invalid frame type"));
    }

    #[test]
    fn empty_body_is_invalid_frame_type() {
        assert_eq!(
            Frame::decode(b""),
            Frame::Malformed(MalformedFrame::InvalidFrameType(None))
        );
    }

    #[test]
    fn bad_array_payload_is_malformed() {
        let bodies: [&[u8]; 4] = [b"a", b"a[1,2]", b"a[\"unterminated", b"a{}"];
        for body in bodies {
            assert!(
                matches!(
                    Frame::decode(body),
                    Frame::Malformed(MalformedFrame::InvalidPayload { tag: ARRAY_TAG, .. })
                ),
                "body {:?} should be malformed",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn bad_close_payload_is_malformed() {
        let bodies: [&[u8]; 4] = [b"c", b"c[3000]", b"c[\"3000\",\"x\"]", b"c[3000,\"x\",1]"];
        for body in bodies {
            assert!(
                matches!(
                    Frame::decode(body),
                    Frame::Malformed(MalformedFrame::InvalidPayload { tag: CLOSE_TAG, .. })
                ),
                "body {:?} should be malformed",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[cfg(feature = "bolero")]
    mod proptests {
        use super::*;

        #[test]
        fn prop_decode_never_panics() {
            bolero::check!().for_each(|body: &[u8]| {
                let _ = Frame::decode(body);
            });
        }

        #[test]
        fn prop_array_payload_decodes_to_same_messages() {
            bolero::check!()
                .with_type::<Vec<String>>()
                .for_each(|messages| {
                    let mut body = vec![ARRAY_TAG];
                    body.extend(serde_json::to_vec(messages).expect("strings encode"));
                    body.push(FRAME_TERMINATOR);

                    assert_eq!(Frame::decode(&body), Frame::Array(messages.clone()));
                });
        }

        #[test]
        fn prop_close_payload_decodes_to_same_frame() {
            bolero::check!()
                .with_type::<(u32, String)>()
                .for_each(|(code, reason)| {
                    let mut body = vec![CLOSE_TAG];
                    body.extend(serde_json::to_vec(&(code, reason)).expect("tuple encodes"));

                    assert_eq!(
                        Frame::decode(&body),
                        Frame::Close(CloseFrame {
                            code: *code,
                            reason: reason.clone(),
                        })
                    );
                });
        }
    }
}
