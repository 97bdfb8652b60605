//! LEB128 (Little Endian Base 128) encoding and the byte cursor used by all
//! section decoders.
//!
//! See [Wasm core §5.2.2](https://webassembly.github.io/spec/core/binary/values.html#integers).

use crate::error::{DecodeContext, DecodeError, DecodeErrorKind};

/// A cursor over a byte slice, tracking the current read position.
#[derive(Debug)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at position 0.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Remaining bytes.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Whether we've consumed all input.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Read a single byte, advancing the cursor.
    pub fn read_byte(&mut self) -> Result<u8, DecodeError> {
        match self.data.get(self.pos) {
            Some(&b) => {
                self.pos += 1;
                Ok(b)
            }
            None => Err(self.eof()),
        }
    }

    /// Read exactly `n` bytes as a slice, advancing the cursor.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.pos.checked_add(n).filter(|&end| end <= self.data.len());
        match end {
            Some(end) => {
                let slice = &self.data[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            None => Err(self.eof()),
        }
    }

    /// Read a `name`: a u32 byte length followed by that many UTF-8 bytes.
    /// See [Wasm core §5.2.4](https://webassembly.github.io/spec/core/binary/values.html#names).
    pub fn read_name(&mut self) -> Result<&'a str, DecodeError> {
        let start = self.pos;
        let len = decode_u32(self)?;
        let bytes = self.read_bytes(len as usize).map_err(|mut e| {
            e.context = DecodeContext::Name;
            e
        })?;
        std::str::from_utf8(bytes)
            .map_err(|_| DecodeError::new(start, DecodeContext::Name, DecodeErrorKind::InvalidUtf8))
    }

    fn eof(&self) -> DecodeError {
        DecodeError::new(self.pos, DecodeContext::Leb128, DecodeErrorKind::UnexpectedEof)
    }
}

/// Decode an unsigned LEB128-encoded u32.
///
/// The encoding uses at most 5 bytes. The final byte's unused high bits
/// must be zero (no overlong encodings).
pub fn decode_u32(cursor: &mut Cursor<'_>) -> Result<u32, DecodeError> {
    let start = cursor.position();
    let mut result: u32 = 0;
    let mut shift: u32 = 0;

    for i in 0..5 {
        let byte = cursor.read_byte().map_err(|mut e| {
            e.context = DecodeContext::Leb128;
            e.offset.0 = start;
            e
        })?;

        // 5th byte (shift=28): only 4 low bits are valid.
        if i == 4 && (byte & 0xF0) != 0 {
            return Err(DecodeError::new(
                start,
                DecodeContext::Leb128,
                DecodeErrorKind::Leb128Overflow,
            ));
        }

        result |= u32::from(byte & 0x7F) << shift;

        if byte & 0x80 == 0 {
            return Ok(result);
        }

        shift += 7;
    }

    Err(DecodeError::new(
        start,
        DecodeContext::Leb128,
        DecodeErrorKind::Leb128TooLong,
    ))
}

/// Append the shortest unsigned LEB128 encoding of `value` to `out`.
pub fn encode_u32(mut value: u32, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u32_zero() {
        let mut c = Cursor::new(&[0x00]);
        assert_eq!(decode_u32(&mut c).unwrap(), 0);
    }

    #[test]
    fn u32_two_bytes() {
        // 128 = 0x80 0x01
        let mut c = Cursor::new(&[0x80, 0x01]);
        assert_eq!(decode_u32(&mut c).unwrap(), 128);
    }

    #[test]
    fn u32_624485() {
        let mut c = Cursor::new(&[0xE5, 0x8E, 0x26]);
        assert_eq!(decode_u32(&mut c).unwrap(), 624485);
    }

    #[test]
    fn u32_max_value() {
        let mut c = Cursor::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
        assert_eq!(decode_u32(&mut c).unwrap(), u32::MAX);
    }

    #[test]
    fn u32_overflow_fifth_byte() {
        // 5th byte has bit 4 set → overflow
        let mut c = Cursor::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x1F]);
        let err = decode_u32(&mut c).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::Leb128Overflow);
    }

    #[test]
    fn u32_unexpected_eof_reports_start() {
        let mut c = Cursor::new(&[0x01, 0x80]);
        c.read_byte().unwrap();
        let err = decode_u32(&mut c).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::UnexpectedEof);
        assert_eq!(err.offset.0, 1);
    }

    #[test]
    fn encode_matches_known_encodings() {
        let cases: [(u32, &[u8]); 5] = [
            (0, &[0x00]),
            (127, &[0x7F]),
            (128, &[0x80, 0x01]),
            (624485, &[0xE5, 0x8E, 0x26]),
            (u32::MAX, &[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]),
        ];
        for (value, expected) in cases {
            let mut out = Vec::new();
            encode_u32(value, &mut out);
            assert_eq!(out, expected, "encoding of {value}");
        }
    }

    #[test]
    fn read_name_ascii() {
        let mut c = Cursor::new(&[0x03, b'f', b'i', b'b', 0xAA]);
        assert_eq!(c.read_name().unwrap(), "fib");
        assert_eq!(c.remaining(), &[0xAA]);
    }

    #[test]
    fn read_name_rejects_invalid_utf8() {
        let mut c = Cursor::new(&[0x02, 0xC3, 0x28]);
        let err = c.read_name().unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidUtf8);
        assert_eq!(err.context, DecodeContext::Name);
    }

    #[test]
    fn read_name_truncated() {
        let mut c = Cursor::new(&[0x05, b'a']);
        let err = c.read_name().unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::UnexpectedEof);
    }

    #[test]
    fn cursor_tracks_position() {
        let mut c = Cursor::new(&[0x01, 0x02, 0x03]);
        assert_eq!(c.position(), 0);
        c.read_byte().unwrap();
        assert_eq!(c.position(), 1);
        c.read_bytes(2).unwrap();
        assert_eq!(c.position(), 3);
        assert!(c.is_empty());
    }
}
