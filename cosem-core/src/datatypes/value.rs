//! The recursive wire value model

use crate::datatypes::bit_string::BitString;
use crate::datatypes::compact::CompactArray;
use crate::datatypes::datetime::{CosemDate, CosemDateTime, CosemTime};
use crate::error::{DlmsError, DlmsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value read from or written to a meter attribute.
///
/// Holds scalars, byte and text strings, bit strings, date/time formats,
/// or recursive containers. Array elements must share one type; Structure
/// elements may be heterogeneous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataObject {
    Null,
    Boolean(bool),
    Integer8(i8),
    Integer16(i16),
    Integer32(i32),
    Integer64(i64),
    Unsigned8(u8),
    Unsigned16(u16),
    Unsigned32(u32),
    Unsigned64(u64),
    Float32(f32),
    Float64(f64),
    /// Enumeration ordinal (8-bit)
    Enumerate(u8),
    /// Binary coded decimal
    Bcd(u8),
    OctetString(#[serde(with = "serde_bytes")] Vec<u8>),
    VisibleString(#[serde(with = "serde_bytes")] Vec<u8>),
    Utf8String(#[serde(with = "serde_bytes")] Vec<u8>),
    BitString(BitString),
    /// Ordered sequence of same-typed elements
    Array(Vec<DataObject>),
    /// Ordered sequence of mixed-typed elements
    Structure(Vec<DataObject>),
    /// Template-driven rows without per-cell tags
    CompactArray(CompactArray),
    Date(CosemDate),
    Time(CosemTime),
    DateTime(CosemDateTime),
}

/// Wire type identifier for a [`DataObject`]
///
/// A tag fully determines how many bytes (or nested elements) follow it;
/// decoding never looks ahead past the tag and an explicit count field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataObjectType {
    NullData,
    Array,
    Structure,
    Boolean,
    BitString,
    /// Integer 32-bit
    DoubleLong,
    /// Unsigned integer 32-bit
    DoubleLongUnsigned,
    OctetString,
    VisibleString,
    Utf8String,
    Bcd,
    /// Integer 8-bit
    Integer,
    /// Integer 16-bit
    LongInteger,
    /// Unsigned integer 8-bit
    Unsigned,
    /// Unsigned integer 16-bit
    LongUnsigned,
    CompactArray,
    /// Integer 64-bit
    Long64,
    /// Unsigned integer 64-bit
    Long64Unsigned,
    Enumerate,
    Float32,
    Float64,
    DateTime,
    Date,
    Time,
    DontCare,
}

impl DataObjectType {
    /// Whether this type carries a numeric scalar
    pub fn is_number(&self) -> bool {
        matches!(
            self,
            DataObjectType::DoubleLong
                | DataObjectType::DoubleLongUnsigned
                | DataObjectType::Integer
                | DataObjectType::LongInteger
                | DataObjectType::Unsigned
                | DataObjectType::LongUnsigned
                | DataObjectType::Long64
                | DataObjectType::Long64Unsigned
                | DataObjectType::Enumerate
                | DataObjectType::Bcd
                | DataObjectType::Float32
                | DataObjectType::Float64
        )
    }

    /// Whether this type is a container of nested elements
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            DataObjectType::Array | DataObjectType::Structure | DataObjectType::CompactArray
        )
    }
}

impl DataObject {
    /// The wire type of this value
    pub fn get_type(&self) -> DataObjectType {
        match self {
            DataObject::Null => DataObjectType::NullData,
            DataObject::Boolean(_) => DataObjectType::Boolean,
            DataObject::Integer8(_) => DataObjectType::Integer,
            DataObject::Integer16(_) => DataObjectType::LongInteger,
            DataObject::Integer32(_) => DataObjectType::DoubleLong,
            DataObject::Integer64(_) => DataObjectType::Long64,
            DataObject::Unsigned8(_) => DataObjectType::Unsigned,
            DataObject::Unsigned16(_) => DataObjectType::LongUnsigned,
            DataObject::Unsigned32(_) => DataObjectType::DoubleLongUnsigned,
            DataObject::Unsigned64(_) => DataObjectType::Long64Unsigned,
            DataObject::Float32(_) => DataObjectType::Float32,
            DataObject::Float64(_) => DataObjectType::Float64,
            DataObject::Enumerate(_) => DataObjectType::Enumerate,
            DataObject::Bcd(_) => DataObjectType::Bcd,
            DataObject::OctetString(_) => DataObjectType::OctetString,
            DataObject::VisibleString(_) => DataObjectType::VisibleString,
            DataObject::Utf8String(_) => DataObjectType::Utf8String,
            DataObject::BitString(_) => DataObjectType::BitString,
            DataObject::Array(_) => DataObjectType::Array,
            DataObject::Structure(_) => DataObjectType::Structure,
            DataObject::CompactArray(_) => DataObjectType::CompactArray,
            DataObject::Date(_) => DataObjectType::Date,
            DataObject::Time(_) => DataObjectType::Time,
            DataObject::DateTime(_) => DataObjectType::DateTime,
        }
    }

    /// Build an array, enforcing homogeneous element types.
    pub fn array(elements: Vec<DataObject>) -> DlmsResult<Self> {
        if let Some(first) = elements.first() {
            let element_type = first.get_type();
            for (index, element) in elements.iter().enumerate() {
                if element.get_type() != element_type {
                    return Err(DlmsError::InvalidData(format!(
                        "Array is of type {:?}, but element {} is of type {:?}",
                        element_type,
                        index,
                        element.get_type()
                    )));
                }
            }
        }
        Ok(DataObject::Array(elements))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataObject::Null)
    }

    pub fn is_number(&self) -> bool {
        self.get_type().is_number()
    }

    pub fn as_bool(&self) -> DlmsResult<bool> {
        match self {
            DataObject::Boolean(b) => Ok(*b),
            _ => Err(self.type_mismatch("Boolean")),
        }
    }

    pub fn as_u8(&self) -> DlmsResult<u8> {
        match self {
            DataObject::Unsigned8(u) | DataObject::Enumerate(u) => Ok(*u),
            _ => Err(self.type_mismatch("Unsigned8")),
        }
    }

    pub fn as_u16(&self) -> DlmsResult<u16> {
        match self {
            DataObject::Unsigned16(u) => Ok(*u),
            _ => Err(self.type_mismatch("Unsigned16")),
        }
    }

    pub fn as_i8(&self) -> DlmsResult<i8> {
        match self {
            DataObject::Integer8(i) => Ok(*i),
            _ => Err(self.type_mismatch("Integer8")),
        }
    }

    pub fn as_u32(&self) -> DlmsResult<u32> {
        match self {
            DataObject::Unsigned32(u) => Ok(*u),
            _ => Err(self.type_mismatch("Unsigned32")),
        }
    }

    /// Widening conversion from any unsigned scalar
    pub fn to_u32(&self) -> DlmsResult<u32> {
        match self {
            DataObject::Unsigned8(u) => Ok(u32::from(*u)),
            DataObject::Unsigned16(u) => Ok(u32::from(*u)),
            DataObject::Unsigned32(u) => Ok(*u),
            DataObject::Enumerate(u) => Ok(u32::from(*u)),
            _ => Err(self.type_mismatch("unsigned scalar")),
        }
    }

    pub fn as_octet_string(&self) -> DlmsResult<&[u8]> {
        match self {
            DataObject::OctetString(s) => Ok(s),
            _ => Err(self.type_mismatch("OctetString")),
        }
    }

    pub fn as_array(&self) -> DlmsResult<&[DataObject]> {
        match self {
            DataObject::Array(a) => Ok(a),
            _ => Err(self.type_mismatch("Array")),
        }
    }

    pub fn as_structure(&self) -> DlmsResult<&[DataObject]> {
        match self {
            DataObject::Structure(s) => Ok(s),
            _ => Err(self.type_mismatch("Structure")),
        }
    }

    pub fn as_date_time(&self) -> DlmsResult<CosemDateTime> {
        match self {
            DataObject::DateTime(dt) => Ok(dt.clone()),
            // Timestamps in buffers travel as 12-byte octet strings.
            DataObject::OctetString(bytes) => CosemDateTime::decode(bytes),
            _ => Err(self.type_mismatch("DateTime")),
        }
    }

    fn type_mismatch(&self, expected: &str) -> DlmsError {
        DlmsError::InvalidData(format!(
            "Expected {}, got {:?}",
            expected,
            self.get_type()
        ))
    }
}

impl fmt::Display for DataObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataObject::Null => write!(f, "null"),
            DataObject::Boolean(b) => write!(f, "{}", b),
            DataObject::Integer8(i) => write!(f, "{}", i),
            DataObject::Integer16(i) => write!(f, "{}", i),
            DataObject::Integer32(i) => write!(f, "{}", i),
            DataObject::Integer64(i) => write!(f, "{}", i),
            DataObject::Unsigned8(u) => write!(f, "{}", u),
            DataObject::Unsigned16(u) => write!(f, "{}", u),
            DataObject::Unsigned32(u) => write!(f, "{}", u),
            DataObject::Unsigned64(u) => write!(f, "{}", u),
            DataObject::Float32(v) => write!(f, "{}", v),
            DataObject::Float64(v) => write!(f, "{}", v),
            DataObject::Enumerate(e) => write!(f, "enum({})", e),
            DataObject::Bcd(b) => write!(f, "bcd({:02X})", b),
            DataObject::OctetString(s) => {
                for byte in s {
                    write!(f, "{:02X}", byte)?;
                }
                Ok(())
            }
            DataObject::VisibleString(s) | DataObject::Utf8String(s) => {
                write!(f, "{}", String::from_utf8_lossy(s))
            }
            DataObject::BitString(bs) => write!(f, "{}", bs),
            DataObject::Array(elements) => {
                write!(f, "array[{}]", elements.len())
            }
            DataObject::Structure(members) => {
                write!(f, "structure{{{}}}", members.len())
            }
            DataObject::CompactArray(ca) => write!(f, "{}", ca),
            DataObject::Date(d) => write!(f, "{}", d),
            DataObject::Time(t) => write!(f, "{}", t),
            DataObject::DateTime(dt) => write!(f, "{}", dt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_of_scalars() {
        assert_eq!(DataObject::Null.get_type(), DataObjectType::NullData);
        assert_eq!(
            DataObject::Unsigned32(7).get_type(),
            DataObjectType::DoubleLongUnsigned
        );
        assert!(DataObject::Integer16(-1).is_number());
        assert!(!DataObject::Boolean(true).is_number());
    }

    #[test]
    fn test_array_requires_homogeneous_elements() {
        let ok = DataObject::array(vec![DataObject::Integer32(1), DataObject::Integer32(2)]);
        assert!(ok.is_ok());

        let mixed = DataObject::array(vec![DataObject::Integer32(1), DataObject::Boolean(true)]);
        assert!(mixed.is_err());
    }

    #[test]
    fn test_to_u32_widening() {
        assert_eq!(DataObject::Unsigned8(5).to_u32().unwrap(), 5);
        assert_eq!(DataObject::Unsigned16(300).to_u32().unwrap(), 300);
        assert!(DataObject::Integer8(-1).to_u32().is_err());
    }

    #[test]
    fn test_accessor_mismatch() {
        assert!(DataObject::Boolean(true).as_u32().is_err());
        assert!(DataObject::OctetString(vec![1, 2]).as_structure().is_err());
    }
}
