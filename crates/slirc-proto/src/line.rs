//! Line-based codec for tokio.
//!
//! Splits the byte stream on `\n`, strips the terminator and decodes the
//! bytes into text. Outbound strings get CRLF appended after encoding.
//! Lines longer than the read limit are skipped, not fatal.

use std::borrow::Cow;

use bytes::{Buf, BytesMut};
use encoding::{Encoding, UTF_8, WINDOWS_1252};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, ProtocolError};

/// Read limit used when none is given. Generous on purpose: servers with
/// message tags send lines far past the classic 512 bytes.
pub const DEFAULT_READ_LIMIT: usize = 16 * 1024;

/// How inbound bytes are turned into text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InEncoding {
    /// UTF-8, falling back to windows-1252 for lines that are not valid
    /// UTF-8. Selected by the `irc` label.
    Irc,
    /// A fixed WHATWG encoding, decoded with replacement.
    Fixed(&'static Encoding),
}

impl InEncoding {
    /// Resolve a configuration label.
    pub fn for_label(label: &str) -> error::Result<Self> {
        if label.eq_ignore_ascii_case("irc") {
            return Ok(InEncoding::Irc);
        }
        Encoding::for_label(label.as_bytes())
            .map(InEncoding::Fixed)
            .ok_or_else(|| ProtocolError::UnknownEncoding(label.to_owned()))
    }

    /// Decode one line.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            InEncoding::Irc => match std::str::from_utf8(bytes) {
                Ok(s) => s.to_owned(),
                Err(_) => WINDOWS_1252.decode_without_bom_handling(bytes).0.into_owned(),
            },
            InEncoding::Fixed(enc) => enc.decode_without_bom_handling(bytes).0.into_owned(),
        }
    }
}

/// Resolve an outbound encoding label.
pub fn out_encoding_for_label(label: &str) -> error::Result<&'static Encoding> {
    Encoding::for_label(label.as_bytes())
        .ok_or_else(|| ProtocolError::UnknownEncoding(label.to_owned()))
}

/// Newline-delimited IRC line codec.
#[derive(Debug)]
pub struct LineCodec {
    incoming: InEncoding,
    outgoing: &'static Encoding,
    /// Index of next byte to check for newline
    next_index: usize,
    read_limit: usize,
    /// Dropping bytes up to the next newline.
    discarding: bool,
    /// Oversized lines skipped since the last [`take_discarded`](Self::take_discarded).
    discarded: usize,
}

impl LineCodec {
    /// Create a codec from encoding labels, e.g. `("irc", "utf-8")`.
    pub fn new(in_label: &str, out_label: &str) -> error::Result<Self> {
        Ok(Self::with_encodings(
            InEncoding::for_label(in_label)?,
            out_encoding_for_label(out_label)?,
        ))
    }

    /// Create a codec from already resolved encodings.
    pub fn with_encodings(incoming: InEncoding, outgoing: &'static Encoding) -> Self {
        LineCodec {
            incoming,
            outgoing,
            next_index: 0,
            read_limit: DEFAULT_READ_LIMIT,
            discarding: false,
            discarded: 0,
        }
    }

    /// Override the maximum accepted inbound line length in bytes.
    pub fn with_read_limit(mut self, limit: usize) -> Self {
        self.read_limit = limit;
        self
    }

    pub fn read_limit(&self) -> usize {
        self.read_limit
    }

    /// Number of oversized lines skipped since the previous call.
    pub fn take_discarded(&mut self) -> usize {
        std::mem::take(&mut self.discarded)
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        LineCodec::with_encodings(InEncoding::Irc, UTF_8)
    }
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        loop {
            let newline = src[self.next_index..].iter().position(|b| *b == b'\n');
            let Some(offset) = newline else {
                if self.discarding {
                    src.clear();
                    self.next_index = 0;
                } else if src.len() > self.read_limit {
                    src.clear();
                    self.next_index = 0;
                    self.discarding = true;
                    self.discarded += 1;
                } else {
                    self.next_index = src.len();
                }
                return Ok(None);
            };

            let end = self.next_index + offset + 1;
            self.next_index = 0;
            if self.discarding {
                src.advance(end);
                self.discarding = false;
                continue;
            }
            if end > self.read_limit {
                src.advance(end);
                self.discarded += 1;
                continue;
            }

            let line = src.split_to(end);
            return Ok(Some(self.incoming.decode(strip_terminator(&line))));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        match self.decode(src)? {
            Some(line) => Ok(Some(line)),
            None if src.is_empty() => Ok(None),
            None => {
                let leftover = src.len();
                src.clear();
                self.next_index = 0;
                Err(ProtocolError::PartialLine(leftover))
            }
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> error::Result<()> {
        let (bytes, _enc, _had_errors) = self.outgoing.encode(&line);
        match bytes {
            Cow::Borrowed(b) => dst.extend_from_slice(b),
            Cow::Owned(v) => dst.extend_from_slice(&v),
        }
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}
