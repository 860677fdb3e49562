//! Line-based codec for tokio.
//!
//! Reads newline-terminated lines with client-grade tolerance: bare LF is
//! accepted alongside CRLF, invalid UTF-8 is decoded lossily, and oversized
//! lines are skipped instead of failing the stream.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{ProtocolError, Result};

/// Maximum accepted line length, covering tagged messages.
pub const MAX_IRC_LINE_LEN: usize = 8191;

/// Codec yielding one line per decoded item, line endings stripped.
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
    /// Currently skipping an oversized line
    discarding: bool,
}

impl LineCodec {
    pub fn new() -> Self {
        Self {
            next_index: 0,
            max_len: MAX_IRC_LINE_LEN,
            discarding: false,
        }
    }

    /// Create a codec with a custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            max_len,
            ..Self::new()
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        loop {
            if self.discarding {
                match src.iter().position(|b| *b == b'\n') {
                    Some(offset) => {
                        let _ = src.split_to(offset + 1);
                        self.discarding = false;
                        self.next_index = 0;
                    }
                    None => {
                        src.clear();
                        return Ok(None);
                    }
                }
                continue;
            }

            match src[self.next_index..].iter().position(|b| *b == b'\n') {
                Some(offset) => {
                    let line = src.split_to(self.next_index + offset + 1);
                    self.next_index = 0;

                    // Oversized lines are skipped; the stream stays usable.
                    if line.len() > self.max_len {
                        continue;
                    }

                    let text = String::from_utf8_lossy(&line);
                    return Ok(Some(text.trim_end_matches(&['\r', '\n'][..]).to_string()));
                }
                None => {
                    // No complete line yet - remember where we stopped
                    self.next_index = src.len();

                    if src.len() > self.max_len {
                        src.clear();
                        self.next_index = 0;
                        self.discarding = true;
                    }
                    return Ok(None);
                }
            }
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> Result<()> {
        dst.extend(msg.into_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_complete_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :test\r\n");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, Some("PING :test".to_string()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_bare_lf() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :test\n:server 001 me :hi\r\n");

        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some("PING :test".to_string())
        );
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(":server 001 me :hi".to_string())
        );
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, None);

        buf.extend_from_slice(b"test\r\n");
        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, Some("PING :test".to_string()));
    }

    #[test]
    fn test_decode_invalid_utf8_is_lossy() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"PING :te\xffst\r\n"[..]);

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, Some("PING :te\u{fffd}st".to_string()));
    }

    #[test]
    fn test_oversized_line_skipped_not_fatal() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("this line is way too long\nPING :x\r\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :x".to_string()));
    }

    #[test]
    fn test_oversized_line_discarded_across_reads() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("aaaaaaaaaaaaaaaa");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"aaaa\nPING :y\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :y".to_string()));
    }

    #[test]
    fn test_encode_passthrough() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();

        codec.encode("PONG :test\r\n".to_string(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"PONG :test\r\n");
    }
}
