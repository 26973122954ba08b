//! Primitive reads and writes for the document wire format.
//!
//! Unsigned integers are LEB128 varints, signed integers are zigzag
//! varints, strings are length-prefixed UTF-8.

use crate::error::DecodeError;
use crate::limits::MAX_VARINT_BYTES;

// =============================================================================
// DECODING
// =============================================================================

/// Cursor over an input byte slice.
///
/// Every read is bounds checked and names what it was reading, so errors
/// say where the input ran out or went wrong.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset into the input.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The unread part of the input.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true once the whole input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    #[inline]
    pub fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or(DecodeError::UnexpectedEof { context })?;
        self.pos += 1;
        Ok(byte)
    }

    /// Reads exactly `n` bytes without copying.
    #[inline]
    pub fn read_bytes(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(DecodeError::UnexpectedEof { context })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Reads a 0x00/0x01 byte as a bool.
    pub fn read_bool(&mut self, context: &'static str) -> Result<bool, DecodeError> {
        match self.read_byte(context)? {
            0x00 => Ok(false),
            0x01 => Ok(true),
            value => Err(DecodeError::InvalidBool { value }),
        }
    }

    /// Reads an unsigned LEB128 varint.
    #[inline]
    pub fn read_varint(&mut self, context: &'static str) -> Result<u64, DecodeError> {
        let mut result: u64 = 0;
        let mut shift = 0u32;

        for _ in 0..MAX_VARINT_BYTES {
            let byte = self.read_byte(context)?;
            let value = (byte & 0x7F) as u64;

            if shift == 63 && value > 1 {
                return Err(DecodeError::VarintOverflow);
            }
            result |= value << shift;

            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }

        Err(DecodeError::VarintTooLong)
    }

    /// Reads a zigzag-encoded signed varint.
    pub fn read_signed_varint(&mut self, context: &'static str) -> Result<i64, DecodeError> {
        Ok(zigzag_decode(self.read_varint(context)?))
    }

    /// Reads a varint count or length and checks it against `max`.
    pub fn read_length(&mut self, max: usize, field: &'static str) -> Result<usize, DecodeError> {
        let raw = self.read_varint(field)?;
        let len = usize::try_from(raw).unwrap_or(usize::MAX);
        if len > max {
            return Err(DecodeError::LengthExceedsLimit { field, len, max });
        }
        Ok(len)
    }

    /// Reads a length-prefixed UTF-8 string of at most `max_len` bytes.
    #[inline]
    pub fn read_string(&mut self, max_len: usize, field: &'static str) -> Result<String, DecodeError> {
        let len = self.read_length(max_len, field)?;
        let bytes = self.read_bytes(len, field)?;
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| DecodeError::InvalidUtf8 { field })
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Growable output buffer.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(value as u8);
    }

    /// Writes an unsigned LEB128 varint.
    #[inline]
    pub fn write_varint(&mut self, mut value: u64) {
        let mut scratch = [0u8; MAX_VARINT_BYTES];
        let mut len = 0;
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                scratch[len] = byte;
                len += 1;
                break;
            }
            scratch[len] = byte | 0x80;
            len += 1;
        }
        self.buf.extend_from_slice(&scratch[..len]);
    }

    /// Writes a zigzag-encoded signed varint.
    pub fn write_signed_varint(&mut self, value: i64) {
        self.write_varint(zigzag_encode(value));
    }

    /// Writes a length-prefixed UTF-8 string.
    pub fn write_string(&mut self, s: &str) {
        self.write_varint(s.len() as u64);
        self.buf.extend_from_slice(s.as_bytes());
    }
}

// =============================================================================
// ZIGZAG
// =============================================================================

/// Maps signed to unsigned so small magnitudes stay small:
/// 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, ...
#[inline]
pub fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Inverse of [`zigzag_encode`].
#[inline]
pub fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ (-((n & 1) as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zigzag_mapping() {
        assert_eq!(zigzag_encode(0), 0);
        assert_eq!(zigzag_encode(-1), 1);
        assert_eq!(zigzag_encode(1), 2);
        assert_eq!(zigzag_encode(-2), 3);
        for v in [i64::MIN, -300, 300, i64::MAX] {
            assert_eq!(zigzag_decode(zigzag_encode(v)), v);
        }
    }

    #[test]
    fn test_varint_boundaries() {
        for v in [0u64, 127, 128, 16_383, 16_384, u32::MAX as u64, u64::MAX] {
            let mut writer = Writer::new();
            writer.write_varint(v);
            let mut reader = Reader::new(writer.as_bytes());
            assert_eq!(reader.read_varint("test").unwrap(), v);
            assert!(reader.is_empty());
        }

        let mut writer = Writer::new();
        writer.write_varint(u64::MAX);
        assert_eq!(writer.len(), MAX_VARINT_BYTES);
    }

    #[test]
    fn test_varint_too_long() {
        let data = [0x80u8; 11];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_varint("test"), Err(DecodeError::VarintTooLong));
    }

    #[test]
    fn test_varint_overflow() {
        let mut data = [0xFFu8; 10];
        data[9] = 0x02;
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_varint("test"), Err(DecodeError::VarintOverflow));
    }

    #[test]
    fn test_strings_and_limits() {
        let mut writer = Writer::new();
        writer.write_string("élément");
        writer.write_string(&"x".repeat(50));

        let mut reader = Reader::new(writer.as_bytes());
        assert_eq!(reader.read_string(100, "name").unwrap(), "élément");
        assert_eq!(
            reader.read_string(10, "name"),
            Err(DecodeError::LengthExceedsLimit {
                field: "name",
                len: 50,
                max: 10
            })
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let mut writer = Writer::new();
        writer.write_varint(2);
        writer.write_bytes(&[0xC3, 0x28]);
        let mut reader = Reader::new(writer.as_bytes());
        assert_eq!(
            reader.read_string(10, "name"),
            Err(DecodeError::InvalidUtf8 { field: "name" })
        );
    }

    #[test]
    fn test_bool_and_eof() {
        let mut reader = Reader::new(&[0x01, 0x02]);
        assert_eq!(reader.read_bool("flag"), Ok(true));
        assert_eq!(reader.read_bool("flag"), Err(DecodeError::InvalidBool { value: 2 }));
        assert_eq!(
            reader.read_bytes(1, "tail"),
            Err(DecodeError::UnexpectedEof { context: "tail" })
        );
        assert_eq!(reader.remaining_len(), 0);
    }
}
