//! Arbitrary-length bit strings, MSB first

use crate::error::{DlmsError, DlmsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A string of bits of any length, packed MSB first.
///
/// The wire format carries the number of bits, not bytes; trailing pad
/// bits of the last byte are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitString {
    #[serde(with = "serde_bytes")]
    bytes: Vec<u8>,
    num_bits: usize,
}

impl BitString {
    /// Wrap packed bytes holding `num_bits` bits.
    pub fn new(bytes: Vec<u8>, num_bits: usize) -> DlmsResult<Self> {
        if num_bits > bytes.len() * 8 {
            return Err(DlmsError::InvalidData(format!(
                "{} bytes cannot hold {} bits",
                bytes.len(),
                num_bits
            )));
        }
        Ok(Self { bytes, num_bits })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    pub fn is_empty(&self) -> bool {
        self.num_bits == 0
    }

    /// Value of the bit at `index` (0-based, MSB of byte 0 first)
    pub fn bit(&self, index: usize) -> DlmsResult<bool> {
        if index >= self.num_bits {
            return Err(DlmsError::InvalidData(format!(
                "Bit index {} out of range, string holds {} bits",
                index, self.num_bits
            )));
        }
        let byte = self.bytes[index / 8];
        Ok((byte >> (7 - index % 8)) & 1 == 1)
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in 0..self.num_bits {
            let set = self.bit(index).map_err(|_| fmt::Error)?;
            write!(f, "{}", if set { '1' } else { '0' })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_addressing_is_msb_first() {
        let bits = BitString::new(vec![0b1010_0000], 4).unwrap();
        assert!(bits.bit(0).unwrap());
        assert!(!bits.bit(1).unwrap());
        assert!(bits.bit(2).unwrap());
        assert!(!bits.bit(3).unwrap());
        assert!(bits.bit(4).is_err());
    }

    #[test]
    fn test_too_few_bytes_rejected() {
        assert!(BitString::new(vec![0xFF], 9).is_err());
        assert!(BitString::new(Vec::new(), 0).is_ok());
    }

    #[test]
    fn test_display() {
        let bits = BitString::new(vec![0b1100_0000], 3).unwrap();
        assert_eq!(bits.to_string(), "110");
    }
}
