//! Tagged value decoder

use crate::compact;
use crate::cursor::ByteCursor;
use crate::tags::{read_count, AxdrTag};
use cosem_core::datatypes::{BitString, CosemDate, CosemDateTime, CosemTime};
use cosem_core::{DataObject, DlmsResult};

/// Parses tagged wire bytes back into [`DataObject`] trees.
///
/// Every read is bounds checked; truncated input fails with
/// [`cosem_core::DlmsError::Truncated`] and an unknown tag with
/// [`cosem_core::DlmsError::UnexpectedTag`].
#[derive(Debug)]
pub struct AxdrDecoder {
    cursor: ByteCursor,
}

impl AxdrDecoder {
    pub fn new(data: &[u8]) -> Self {
        Self {
            cursor: ByteCursor::from_slice(data),
        }
    }

    /// Decode one value from the given bytes.
    pub fn decode_from_slice(data: &[u8]) -> DlmsResult<DataObject> {
        AxdrDecoder::new(data).decode()
    }

    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    /// Decode the next tagged value and advance past it.
    pub fn decode(&mut self) -> DlmsResult<DataObject> {
        let tag = AxdrTag::from_u8(self.cursor.read_u8()?)?;
        match tag {
            AxdrTag::Null => Ok(DataObject::Null),
            // Don't-care carries no payload and degrades to null.
            AxdrTag::DontCare => Ok(DataObject::Null),
            AxdrTag::Boolean => Ok(DataObject::Boolean(self.cursor.read_u8()? != 0x00)),
            AxdrTag::Integer8 => Ok(DataObject::Integer8(self.cursor.read_i8()?)),
            AxdrTag::Integer16 => Ok(DataObject::Integer16(self.cursor.read_i16()?)),
            AxdrTag::Integer32 => Ok(DataObject::Integer32(self.cursor.read_i32()?)),
            AxdrTag::Integer64 => Ok(DataObject::Integer64(self.cursor.read_i64()?)),
            AxdrTag::Unsigned8 => Ok(DataObject::Unsigned8(self.cursor.read_u8()?)),
            AxdrTag::Unsigned16 => Ok(DataObject::Unsigned16(self.cursor.read_u16()?)),
            AxdrTag::Unsigned32 => Ok(DataObject::Unsigned32(self.cursor.read_u32()?)),
            AxdrTag::Unsigned64 => Ok(DataObject::Unsigned64(self.cursor.read_u64()?)),
            AxdrTag::Float32 => Ok(DataObject::Float32(self.cursor.read_f32()?)),
            AxdrTag::Float64 => Ok(DataObject::Float64(self.cursor.read_f64()?)),
            AxdrTag::Enumerate => Ok(DataObject::Enumerate(self.cursor.read_u8()?)),
            AxdrTag::Bcd => Ok(DataObject::Bcd(self.cursor.read_u8()?)),
            AxdrTag::OctetString => Ok(DataObject::OctetString(self.read_counted_bytes()?)),
            AxdrTag::VisibleString => Ok(DataObject::VisibleString(self.read_counted_bytes()?)),
            AxdrTag::Utf8String => Ok(DataObject::Utf8String(self.read_counted_bytes()?)),
            AxdrTag::BitString => {
                let num_bits = read_count(&mut self.cursor)?;
                let bytes = self.cursor.read_bytes(num_bits.div_ceil(8))?;
                Ok(DataObject::BitString(BitString::new(bytes, num_bits)?))
            }
            AxdrTag::Array => {
                let elements = self.read_elements()?;
                DataObject::array(elements)
            }
            AxdrTag::Structure => Ok(DataObject::Structure(self.read_elements()?)),
            AxdrTag::CompactArray => Ok(DataObject::CompactArray(
                compact::decode_compact_array(&mut self.cursor, None)?,
            )),
            AxdrTag::Date => {
                let bytes = self.cursor.read_bytes(CosemDate::LENGTH)?;
                Ok(DataObject::Date(CosemDate::decode(&bytes)?))
            }
            AxdrTag::Time => {
                let bytes = self.cursor.read_bytes(CosemTime::LENGTH)?;
                Ok(DataObject::Time(CosemTime::decode(&bytes)?))
            }
            AxdrTag::DateTime => {
                let bytes = self.cursor.read_bytes(CosemDateTime::LENGTH)?;
                Ok(DataObject::DateTime(CosemDateTime::decode(&bytes)?))
            }
        }
    }

    fn read_counted_bytes(&mut self) -> DlmsResult<Vec<u8>> {
        let len = read_count(&mut self.cursor)?;
        self.cursor.read_bytes(len)
    }

    fn read_elements(&mut self) -> DlmsResult<Vec<DataObject>> {
        let count = read_count(&mut self.cursor)?;
        let mut elements = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            elements.push(self.decode()?);
        }
        Ok(elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::AxdrEncoder;
    use cosem_core::DlmsError;

    #[test]
    fn test_decode_scalars() {
        assert_eq!(
            AxdrDecoder::decode_from_slice(&[0x12, 0x01, 0x02]).unwrap(),
            DataObject::Unsigned16(0x0102)
        );
        assert_eq!(
            AxdrDecoder::decode_from_slice(&[0x03, 0x01]).unwrap(),
            DataObject::Boolean(true)
        );
        assert_eq!(
            AxdrDecoder::decode_from_slice(&[0x00]).unwrap(),
            DataObject::Null
        );
    }

    #[test]
    fn test_dont_care_becomes_null() {
        assert_eq!(
            AxdrDecoder::decode_from_slice(&[0xFF]).unwrap(),
            DataObject::Null
        );
    }

    #[test]
    fn test_unknown_tag() {
        assert!(matches!(
            AxdrDecoder::decode_from_slice(&[0x7E]),
            Err(DlmsError::UnexpectedTag(0x7E))
        ));
    }

    #[test]
    fn test_truncated_payload() {
        assert!(matches!(
            AxdrDecoder::decode_from_slice(&[0x06, 0x00, 0x00]),
            Err(DlmsError::Truncated { .. })
        ));
        // String claims 5 bytes, only 2 present.
        assert!(matches!(
            AxdrDecoder::decode_from_slice(&[0x09, 0x05, 0xAA, 0xBB]),
            Err(DlmsError::Truncated { .. })
        ));
    }

    #[test]
    fn test_heterogeneous_array_rejected() {
        // array of 2: unsigned8 then boolean
        let bytes = [0x01, 0x02, 0x11, 0x01, 0x03, 0xFF];
        assert!(AxdrDecoder::decode_from_slice(&bytes).is_err());
    }

    #[test]
    fn test_structure_round_trip() {
        let value = DataObject::Structure(vec![
            DataObject::OctetString(vec![1, 2, 3, 4, 5, 6]),
            DataObject::Integer8(2),
            DataObject::Unsigned16(0xFFFF),
        ]);
        let encoded = AxdrEncoder::encode_to_vec(&value).unwrap();
        assert_eq!(AxdrDecoder::decode_from_slice(&encoded).unwrap(), value);
    }

    #[test]
    fn test_every_kind_round_trips() {
        use cosem_core::datatypes::{CosemDate, CosemDateTime, CosemTime};

        let values = [
            DataObject::Null,
            DataObject::Boolean(false),
            DataObject::Integer8(i8::MIN),
            DataObject::Integer16(-1),
            DataObject::Integer32(i32::MAX),
            DataObject::Integer64(i64::MIN),
            DataObject::Unsigned8(0x7F),
            DataObject::Unsigned16(0x80),
            DataObject::Unsigned32(0xFFFF),
            DataObject::Unsigned64(u64::MAX),
            DataObject::Float32(1.25),
            DataObject::Float64(-2.5),
            DataObject::Enumerate(255),
            DataObject::Bcd(0x42),
            DataObject::OctetString(Vec::new()),
            DataObject::VisibleString(b"meter-001".to_vec()),
            DataObject::Utf8String("kWh".as_bytes().to_vec()),
            DataObject::Array(vec![DataObject::Unsigned16(1), DataObject::Unsigned16(2)]),
            DataObject::Structure(Vec::new()),
            DataObject::Date(CosemDate::new(2026, 8, 28).unwrap()),
            DataObject::Time(CosemTime::new(23, 59, 59).unwrap()),
            DataObject::DateTime(CosemDateTime::new(2026, 8, 28, 12, 0, 0, 120, &[]).unwrap()),
        ];
        for value in values {
            let encoded = AxdrEncoder::encode_to_vec(&value).unwrap();
            assert_eq!(
                AxdrDecoder::decode_from_slice(&encoded).unwrap(),
                value,
                "round trip of {:?}",
                value
            );
        }
    }

    #[test]
    fn test_bit_string_round_trip_with_padding() {
        let bits = cosem_core::datatypes::BitString::new(vec![0b1011_0100, 0b1000_0000], 9).unwrap();
        let value = DataObject::BitString(bits);
        let encoded = AxdrEncoder::encode_to_vec(&value).unwrap();
        assert_eq!(encoded[1], 9);
        assert_eq!(AxdrDecoder::decode_from_slice(&encoded).unwrap(), value);
    }
}
