//! Growable, position-tracked byte buffer

use bytes::{BufMut, BytesMut};
use cosem_core::{DlmsError, DlmsResult};

/// Byte buffer with a read position and big-endian fixed-width access.
///
/// Writes append at the end; reads advance the position and are bounds
/// checked, failing with [`DlmsError::Truncated`] instead of panicking.
#[derive(Debug, Default)]
pub struct ByteCursor {
    buf: BytesMut,
    pos: usize,
}

impl ByteCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            pos: 0,
        }
    }

    pub fn from_slice(data: &[u8]) -> Self {
        Self {
            buf: BytesMut::from(data),
            pos: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf.to_vec()
    }

    fn check(&self, needed: usize) -> DlmsResult<()> {
        if self.remaining() < needed {
            return Err(DlmsError::Truncated {
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn append(&mut self, data: &[u8]) {
        self.buf.put_slice(data);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.put_u16(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.put_u32(value);
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.put_u64(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.buf.put_i8(value);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.buf.put_i16(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.put_i64(value);
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buf.put_u32(value.to_bits());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buf.put_u64(value.to_bits());
    }

    pub fn peek_u8(&self) -> DlmsResult<u8> {
        self.check(1)?;
        Ok(self.buf[self.pos])
    }

    pub fn read_u8(&mut self) -> DlmsResult<u8> {
        self.check(1)?;
        let byte = self.buf[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_u16(&mut self) -> DlmsResult<u16> {
        let bytes = self.read_array::<2>()?;
        Ok(u16::from_be_bytes(bytes))
    }

    pub fn read_u32(&mut self) -> DlmsResult<u32> {
        let bytes = self.read_array::<4>()?;
        Ok(u32::from_be_bytes(bytes))
    }

    pub fn read_u64(&mut self) -> DlmsResult<u64> {
        let bytes = self.read_array::<8>()?;
        Ok(u64::from_be_bytes(bytes))
    }

    pub fn read_i8(&mut self) -> DlmsResult<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_i16(&mut self) -> DlmsResult<i16> {
        let bytes = self.read_array::<2>()?;
        Ok(i16::from_be_bytes(bytes))
    }

    pub fn read_i32(&mut self) -> DlmsResult<i32> {
        let bytes = self.read_array::<4>()?;
        Ok(i32::from_be_bytes(bytes))
    }

    pub fn read_i64(&mut self) -> DlmsResult<i64> {
        let bytes = self.read_array::<8>()?;
        Ok(i64::from_be_bytes(bytes))
    }

    pub fn read_f32(&mut self) -> DlmsResult<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> DlmsResult<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    pub fn read_bytes(&mut self, len: usize) -> DlmsResult<Vec<u8>> {
        self.check(len)?;
        let out = self.buf[self.pos..self.pos + len].to_vec();
        self.pos += len;
        Ok(out)
    }

    fn read_array<const N: usize>(&mut self) -> DlmsResult<[u8; N]> {
        self.check(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_back() {
        let mut cursor = ByteCursor::new();
        cursor.write_u8(0xAB);
        cursor.write_u16(0x1234);
        cursor.write_u32(0xDEADBEEF);
        cursor.write_i16(-2);
        cursor.append(&[1, 2, 3]);

        assert_eq!(cursor.read_u8().unwrap(), 0xAB);
        assert_eq!(cursor.read_u16().unwrap(), 0x1234);
        assert_eq!(cursor.read_u32().unwrap(), 0xDEADBEEF);
        assert_eq!(cursor.read_i16().unwrap(), -2);
        assert_eq!(cursor.read_bytes(3).unwrap(), vec![1, 2, 3]);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_short_read_is_truncated_not_panic() {
        let mut cursor = ByteCursor::from_slice(&[0x01]);
        match cursor.read_u32() {
            Err(DlmsError::Truncated { needed, available }) => {
                assert_eq!(needed, 4);
                assert_eq!(available, 1);
            }
            other => panic!("expected Truncated, got {:?}", other),
        }
    }

    #[test]
    fn test_peek_does_not_advance() {
        let mut cursor = ByteCursor::from_slice(&[0x42, 0x43]);
        assert_eq!(cursor.peek_u8().unwrap(), 0x42);
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.read_u8().unwrap(), 0x42);
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_float_round_trip() {
        let mut cursor = ByteCursor::new();
        cursor.write_f32(1.5);
        cursor.write_f64(-0.25);
        assert_eq!(cursor.read_f32().unwrap(), 1.5);
        assert_eq!(cursor.read_f64().unwrap(), -0.25);
    }
}
