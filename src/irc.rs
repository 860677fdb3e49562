//! IRC message codec for tokio.
//!
//! This module provides a codec that encodes and decodes IRC [`Message`]
//! types using the tokio codec framework.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::Result;
use crate::line::LineCodec;
use crate::message::{decode_relaxed, Message};

/// Tokio codec for encoding/decoding IRC messages.
///
/// Wraps [`LineCodec`]. Inbound lines are decoded leniently: anything that
/// is not valid IRC still surfaces as a degraded [`Message`] instead of an
/// error, so one bad line never tears down the connection.
pub struct IrcCodec {
    inner: LineCodec,
}

impl IrcCodec {
    pub fn new() -> Self {
        Self {
            inner: LineCodec::new(),
        }
    }

    /// Create a codec with a custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            inner: LineCodec::with_max_len(max_len),
        }
    }

    /// Sanitize outgoing message data by truncating at the first line
    /// ending, so a crafted parameter cannot smuggle a second command.
    pub fn sanitize(mut data: String) -> String {
        if let Some((pos, len)) = ["\r\n", "\r", "\n"]
            .iter()
            .flat_map(|needle| data.find(needle).map(|pos| (pos, needle.len())))
            .min_by_key(|&(pos, _)| pos)
        {
            data.truncate(pos + len);
        }
        data
    }
}

impl Default for IrcCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for IrcCodec {
    type Item = Message;
    type Error = crate::error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>> {
        Ok(self.inner.decode(src)?.map(|line| decode_relaxed(&line)))
    }
}

impl Encoder<Message> for IrcCodec {
    type Error = crate::error::ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> Result<()> {
        let sanitized = Self::sanitize(msg.to_string());
        self.inner.encode(sanitized, dst)
    }
}
