//! Wire type tags and the BER-style count grammar

use crate::cursor::ByteCursor;
use cosem_core::{DataObjectType, DlmsError, DlmsResult};

/// One-byte type tag preceding every encoded value.
///
/// The numeric values are a compatibility surface with deployed meters
/// and must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxdrTag {
    Null = 0x00,
    Array = 0x01,
    Structure = 0x02,
    Boolean = 0x03,
    BitString = 0x04,
    Integer32 = 0x05,
    Unsigned32 = 0x06,
    OctetString = 0x09,
    VisibleString = 0x0A,
    Utf8String = 0x0C,
    Bcd = 0x0D,
    Integer8 = 0x0F,
    Integer16 = 0x10,
    Unsigned8 = 0x11,
    Unsigned16 = 0x12,
    CompactArray = 0x13,
    Integer64 = 0x14,
    Unsigned64 = 0x15,
    Enumerate = 0x16,
    Float32 = 0x17,
    Float64 = 0x18,
    DateTime = 0x19,
    Date = 0x1A,
    Time = 0x1B,
    DontCare = 0xFF,
}

impl AxdrTag {
    pub fn from_u8(value: u8) -> DlmsResult<Self> {
        match value {
            0x00 => Ok(AxdrTag::Null),
            0x01 => Ok(AxdrTag::Array),
            0x02 => Ok(AxdrTag::Structure),
            0x03 => Ok(AxdrTag::Boolean),
            0x04 => Ok(AxdrTag::BitString),
            0x05 => Ok(AxdrTag::Integer32),
            0x06 => Ok(AxdrTag::Unsigned32),
            0x09 => Ok(AxdrTag::OctetString),
            0x0A => Ok(AxdrTag::VisibleString),
            0x0C => Ok(AxdrTag::Utf8String),
            0x0D => Ok(AxdrTag::Bcd),
            0x0F => Ok(AxdrTag::Integer8),
            0x10 => Ok(AxdrTag::Integer16),
            0x11 => Ok(AxdrTag::Unsigned8),
            0x12 => Ok(AxdrTag::Unsigned16),
            0x13 => Ok(AxdrTag::CompactArray),
            0x14 => Ok(AxdrTag::Integer64),
            0x15 => Ok(AxdrTag::Unsigned64),
            0x16 => Ok(AxdrTag::Enumerate),
            0x17 => Ok(AxdrTag::Float32),
            0x18 => Ok(AxdrTag::Float64),
            0x19 => Ok(AxdrTag::DateTime),
            0x1A => Ok(AxdrTag::Date),
            0x1B => Ok(AxdrTag::Time),
            0xFF => Ok(AxdrTag::DontCare),
            other => Err(DlmsError::UnexpectedTag(other)),
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn from_data_type(kind: DataObjectType) -> Self {
        match kind {
            DataObjectType::NullData => AxdrTag::Null,
            DataObjectType::Array => AxdrTag::Array,
            DataObjectType::Structure => AxdrTag::Structure,
            DataObjectType::Boolean => AxdrTag::Boolean,
            DataObjectType::BitString => AxdrTag::BitString,
            DataObjectType::DoubleLong => AxdrTag::Integer32,
            DataObjectType::DoubleLongUnsigned => AxdrTag::Unsigned32,
            DataObjectType::OctetString => AxdrTag::OctetString,
            DataObjectType::VisibleString => AxdrTag::VisibleString,
            DataObjectType::Utf8String => AxdrTag::Utf8String,
            DataObjectType::Bcd => AxdrTag::Bcd,
            DataObjectType::Integer => AxdrTag::Integer8,
            DataObjectType::LongInteger => AxdrTag::Integer16,
            DataObjectType::Unsigned => AxdrTag::Unsigned8,
            DataObjectType::LongUnsigned => AxdrTag::Unsigned16,
            DataObjectType::CompactArray => AxdrTag::CompactArray,
            DataObjectType::Long64 => AxdrTag::Integer64,
            DataObjectType::Long64Unsigned => AxdrTag::Unsigned64,
            DataObjectType::Enumerate => AxdrTag::Enumerate,
            DataObjectType::Float32 => AxdrTag::Float32,
            DataObjectType::Float64 => AxdrTag::Float64,
            DataObjectType::DateTime => AxdrTag::DateTime,
            DataObjectType::Date => AxdrTag::Date,
            DataObjectType::Time => AxdrTag::Time,
            DataObjectType::DontCare => AxdrTag::DontCare,
        }
    }

    pub fn data_type(self) -> DataObjectType {
        match self {
            AxdrTag::Null => DataObjectType::NullData,
            AxdrTag::Array => DataObjectType::Array,
            AxdrTag::Structure => DataObjectType::Structure,
            AxdrTag::Boolean => DataObjectType::Boolean,
            AxdrTag::BitString => DataObjectType::BitString,
            AxdrTag::Integer32 => DataObjectType::DoubleLong,
            AxdrTag::Unsigned32 => DataObjectType::DoubleLongUnsigned,
            AxdrTag::OctetString => DataObjectType::OctetString,
            AxdrTag::VisibleString => DataObjectType::VisibleString,
            AxdrTag::Utf8String => DataObjectType::Utf8String,
            AxdrTag::Bcd => DataObjectType::Bcd,
            AxdrTag::Integer8 => DataObjectType::Integer,
            AxdrTag::Integer16 => DataObjectType::LongInteger,
            AxdrTag::Unsigned8 => DataObjectType::Unsigned,
            AxdrTag::Unsigned16 => DataObjectType::LongUnsigned,
            AxdrTag::CompactArray => DataObjectType::CompactArray,
            AxdrTag::Integer64 => DataObjectType::Long64,
            AxdrTag::Unsigned64 => DataObjectType::Long64Unsigned,
            AxdrTag::Enumerate => DataObjectType::Enumerate,
            AxdrTag::Float32 => DataObjectType::Float32,
            AxdrTag::Float64 => DataObjectType::Float64,
            AxdrTag::DateTime => DataObjectType::DateTime,
            AxdrTag::Date => DataObjectType::Date,
            AxdrTag::Time => DataObjectType::Time,
            AxdrTag::DontCare => DataObjectType::DontCare,
        }
    }
}

/// Write a count in the BER length-of-length convention.
///
/// Counts below 0x80 take one byte; larger counts take 0x80 | n
/// followed by n length bytes, with the smallest n that fits.
pub fn write_count(cursor: &mut ByteCursor, count: usize) {
    if count < 0x80 {
        cursor.write_u8(count as u8);
        return;
    }
    let mut bytes = Vec::with_capacity(4);
    let mut rest = count;
    while rest > 0 {
        bytes.push((rest & 0xFF) as u8);
        rest >>= 8;
    }
    bytes.reverse();
    cursor.write_u8(0x80 | bytes.len() as u8);
    cursor.append(&bytes);
}

/// Read a count written by [`write_count`].
pub fn read_count(cursor: &mut ByteCursor) -> DlmsResult<usize> {
    let first = cursor.read_u8()?;
    if first & 0x80 == 0 {
        return Ok(usize::from(first));
    }
    let length_of_length = usize::from(first & 0x7F);
    if length_of_length == 0 || length_of_length > 4 {
        return Err(DlmsError::InvalidData(format!(
            "Invalid length-of-length: {}",
            length_of_length
        )));
    }
    let mut count = 0usize;
    for byte in cursor.read_bytes(length_of_length)? {
        count = (count << 8) | usize::from(byte);
    }
    Ok(count)
}
