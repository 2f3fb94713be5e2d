//! IEEE-488.2 definite-length arbitrary blocks: `#<d><d length digits><payload>`.
//!
//! Payloads are copied into a [`WaveformBuffer`] of fixed capacity. A block that
//! fills the buffer exactly is reported as possibly truncated, since the
//! instrument may have had more to send than the buffer could hold.

use thiserror::Error;

/// Default receive capacity, 5 MB.
pub const DEFAULT_CAPACITY: usize = 5_000_000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlockError {
    #[error("block does not start with '#'")]
    MissingHash,
    #[error("invalid digit count {0:?}")]
    BadDigitCount(char),
    #[error("header ends after {available} of {expected} length digits")]
    ShortHeader { expected: usize, available: usize },
    #[error("non-digit {0:?} in length field")]
    BadLength(char),
    #[error("block declares {declared} payload bytes but only {available} arrived")]
    ShortPayload { declared: usize, available: usize },
}

/// Fixed-capacity receive buffer, reused across acquisitions.
pub struct WaveformBuffer {
    data: Vec<u8>,
    len: usize,
}

impl WaveformBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The payload of the last decoded block.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

impl Default for WaveformBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockInfo {
    /// Bytes copied into the buffer.
    pub len: usize,
    /// Set when `len` reached the buffer capacity.
    pub truncated: bool,
}

/// Longest possible header: `#`, one digit count, nine length digits.
pub const MAX_HEADER_LEN: usize = 11;

/// Parses one block from `raw` into `buf`.
///
/// Leading whitespace is skipped and anything after the payload (normally a
/// `\n` terminator) is ignored. A declared length larger than the buffer is
/// clipped to the capacity and flagged as truncated.
pub fn decode_block(raw: &[u8], buf: &mut WaveformBuffer) -> Result<BlockInfo, BlockError> {
    let start = raw
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(raw.len());
    let raw = &raw[start..];

    match raw.first() {
        Some(b'#') => {}
        _ => return Err(BlockError::MissingHash),
    }

    let ndigits = match raw.get(1).copied() {
        Some(d @ b'1'..=b'9') => (d - b'0') as usize,
        Some(d) => return Err(BlockError::BadDigitCount(d as char)),
        None => return Err(BlockError::ShortHeader { expected: 1, available: 0 }),
    };

    let digits = &raw[2..];
    if digits.len() < ndigits {
        return Err(BlockError::ShortHeader {
            expected: ndigits,
            available: digits.len(),
        });
    }

    let mut declared: usize = 0;
    for &d in &digits[..ndigits] {
        if !d.is_ascii_digit() {
            return Err(BlockError::BadLength(d as char));
        }
        declared = declared * 10 + (d - b'0') as usize;
    }

    // Only the part that fits in the buffer has to be present
    let payload = &digits[ndigits..];
    let len = declared.min(buf.capacity());
    if len > payload.len() {
        return Err(BlockError::ShortPayload {
            declared,
            available: payload.len(),
        });
    }

    buf.data[..len].copy_from_slice(&payload[..len]);
    buf.len = len;

    Ok(BlockInfo {
        len,
        truncated: len == buf.capacity(),
    })
}

/// Frames `payload` as a definite-length block with a trailing newline.
pub fn encode_block(payload: &[u8]) -> Vec<u8> {
    let length = payload.len().to_string();
    let mut out = Vec::with_capacity(payload.len() + length.len() + 3);
    out.push(b'#');
    out.extend_from_slice(length.len().to_string().as_bytes());
    out.extend_from_slice(length.as_bytes());
    out.extend_from_slice(payload);
    out.push(b'\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_what_encode_produces() {
        let payload: Vec<u8> = (0..=255).collect();
        let mut buf = WaveformBuffer::with_capacity(1024);

        let info = decode_block(&encode_block(&payload), &mut buf).unwrap();
        assert_eq!(info, BlockInfo { len: 256, truncated: false });
        assert_eq!(buf.as_slice(), payload.as_slice());
    }

    #[test]
    fn header_digit_count() {
        assert_eq!(encode_block(&[1, 2, 3]), b"#13\x01\x02\x03\n".to_vec());
        assert!(encode_block(&[0; 10240]).starts_with(b"#510240"));
    }

    #[test]
    fn exactly_full_buffer_is_flagged() {
        let mut buf = WaveformBuffer::with_capacity(4);
        let info = decode_block(b"#14abcd\n", &mut buf).unwrap();
        assert!(info.truncated);
        assert_eq!(info.len, 4);
    }

    #[test]
    fn oversized_block_is_clipped_and_flagged() {
        let mut buf = WaveformBuffer::with_capacity(4);
        let info = decode_block(b"#16abcdef\n", &mut buf).unwrap();
        assert_eq!(info, BlockInfo { len: 4, truncated: true });
        assert_eq!(buf.as_slice(), b"abcd");

        // The read limit may already have cut the response at the capacity
        let info = decode_block(b"#16abcd", &mut buf).unwrap();
        assert_eq!(info, BlockInfo { len: 4, truncated: true });
    }

    #[test]
    fn shorter_than_capacity_is_not_flagged() {
        let mut buf = WaveformBuffer::with_capacity(4);
        let info = decode_block(b"#13abc\n", &mut buf).unwrap();
        assert!(!info.truncated);
    }

    #[test]
    fn empty_payload() {
        let mut buf = WaveformBuffer::with_capacity(4);
        let info = decode_block(b"#10\n", &mut buf).unwrap();
        assert_eq!(info.len, 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn leading_whitespace_and_missing_terminator() {
        let mut buf = WaveformBuffer::with_capacity(16);
        let info = decode_block(b"\r\n #212hello world!", &mut buf).unwrap();
        assert_eq!(info.len, 12);
        assert_eq!(buf.as_slice(), b"hello world!");
    }

    #[test]
    fn malformed_headers() {
        let mut buf = WaveformBuffer::with_capacity(16);
        assert_eq!(decode_block(b"", &mut buf), Err(BlockError::MissingHash));
        assert_eq!(decode_block(b"12abc", &mut buf), Err(BlockError::MissingHash));
        assert_eq!(decode_block(b"#x3abc", &mut buf), Err(BlockError::BadDigitCount('x')));
        assert_eq!(decode_block(b"#0abc\n", &mut buf), Err(BlockError::BadDigitCount('0')));
        assert_eq!(decode_block(b"#2a3abc", &mut buf), Err(BlockError::BadLength('a')));
        assert_eq!(
            decode_block(b"#", &mut buf),
            Err(BlockError::ShortHeader { expected: 1, available: 0 })
        );
        assert_eq!(
            decode_block(b"#51", &mut buf),
            Err(BlockError::ShortHeader { expected: 5, available: 1 })
        );
    }

    #[test]
    fn declared_length_beyond_data() {
        let mut buf = WaveformBuffer::with_capacity(16);
        assert_eq!(
            decode_block(b"#15ab", &mut buf),
            Err(BlockError::ShortPayload { declared: 5, available: 2 })
        );
    }

    #[test]
    fn failed_decode_keeps_previous_length() {
        let mut buf = WaveformBuffer::with_capacity(16);
        decode_block(b"#13abc", &mut buf).unwrap();
        assert!(decode_block(b"#x", &mut buf).is_err());
        assert_eq!(buf.as_slice(), b"abc");
    }
}
