use crate::error::{DlmsError, DlmsResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// OBIS code (logical name) addressing a COSEM object instance
///
/// A 6-byte identifier, rendered as dotted decimal ("0.0.19.0.0.255").
/// Index 1 of every object returns its logical name as an octet string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObisCode {
    bytes: [u8; 6],
}

impl ObisCode {
    pub const LENGTH: usize = 6;

    /// Create an OBIS code from its six value groups A..F
    pub fn new(a: u8, b: u8, c: u8, d: u8, e: u8, f: u8) -> Self {
        Self {
            bytes: [a, b, c, d, e, f],
        }
    }

    /// Decode an OBIS code from a 6-byte buffer
    pub fn from_bytes(bytes: &[u8]) -> DlmsResult<Self> {
        if bytes.len() != Self::LENGTH {
            return Err(DlmsError::InvalidData(format!(
                "Logical name must be {} bytes, got {}",
                Self::LENGTH,
                bytes.len()
            )));
        }
        let mut code = [0u8; 6];
        code.copy_from_slice(bytes);
        Ok(Self { bytes: code })
    }

    /// The OBIS code as a byte array
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.bytes
    }

    /// A copy of the 6 bytes
    pub fn to_bytes(&self) -> [u8; 6] {
        self.bytes
    }
}

impl FromStr for ObisCode {
    type Err = DlmsError;

    /// Parse dotted-decimal form, e.g. "1.0.99.1.0.255"
    fn from_str(s: &str) -> DlmsResult<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != Self::LENGTH {
            return Err(DlmsError::InvalidData(format!(
                "Expected 6 dot-separated groups, got {}",
                parts.len()
            )));
        }
        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            bytes[i] = part
                .parse::<u8>()
                .map_err(|_| DlmsError::InvalidData(format!("Invalid OBIS group: {}", part)))?;
        }
        Ok(Self { bytes })
    }
}

impl fmt::Display for ObisCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}.{}.{}",
            self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3], self.bytes[4],
            self.bytes[5]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obis_round_trip() {
        let code: ObisCode = "0.0.19.0.0.255".parse().unwrap();
        assert_eq!(code, ObisCode::new(0, 0, 19, 0, 0, 255));
        assert_eq!(code.to_string(), "0.0.19.0.0.255");
    }

    #[test]
    fn test_obis_from_bytes() {
        let code = ObisCode::from_bytes(&[1, 0, 99, 1, 0, 255]).unwrap();
        assert_eq!(code.as_bytes(), &[1, 0, 99, 1, 0, 255]);
        assert!(ObisCode::from_bytes(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_obis_invalid_string() {
        assert!("1.2.3".parse::<ObisCode>().is_err());
        assert!("1.2.3.4.5.300".parse::<ObisCode>().is_err());
    }
}
