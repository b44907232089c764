//! Tagged value encoder

use crate::compact;
use crate::cursor::ByteCursor;
use crate::tags::{write_count, AxdrTag};
use cosem_core::{DataObject, DlmsResult};

/// Serializes [`DataObject`] trees into the tagged wire form.
#[derive(Debug, Default)]
pub struct AxdrEncoder {
    cursor: ByteCursor,
}

impl AxdrEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cursor: ByteCursor::with_capacity(capacity),
        }
    }

    /// Encode one value and return its bytes.
    pub fn encode_to_vec(value: &DataObject) -> DlmsResult<Vec<u8>> {
        let mut encoder = AxdrEncoder::new();
        encoder.encode(value)?;
        Ok(encoder.into_vec())
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.cursor.into_vec()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.cursor.as_slice()
    }

    /// Append one tagged value to the buffer.
    pub fn encode(&mut self, value: &DataObject) -> DlmsResult<()> {
        let tag = AxdrTag::from_data_type(value.get_type());
        self.cursor.write_u8(tag.to_u8());
        match value {
            DataObject::Null => {}
            DataObject::Boolean(b) => self.cursor.write_u8(if *b { 0xFF } else { 0x00 }),
            DataObject::Integer8(i) => self.cursor.write_i8(*i),
            DataObject::Integer16(i) => self.cursor.write_i16(*i),
            DataObject::Integer32(i) => self.cursor.write_i32(*i),
            DataObject::Integer64(i) => self.cursor.write_i64(*i),
            DataObject::Unsigned8(u) => self.cursor.write_u8(*u),
            DataObject::Unsigned16(u) => self.cursor.write_u16(*u),
            DataObject::Unsigned32(u) => self.cursor.write_u32(*u),
            DataObject::Unsigned64(u) => self.cursor.write_u64(*u),
            DataObject::Float32(v) => self.cursor.write_f32(*v),
            DataObject::Float64(v) => self.cursor.write_f64(*v),
            DataObject::Enumerate(e) => self.cursor.write_u8(*e),
            DataObject::Bcd(b) => self.cursor.write_u8(*b),
            DataObject::OctetString(s)
            | DataObject::VisibleString(s)
            | DataObject::Utf8String(s) => {
                write_count(&mut self.cursor, s.len());
                self.cursor.append(s);
            }
            // The count field carries bits, not bytes.
            DataObject::BitString(bits) => {
                write_count(&mut self.cursor, bits.num_bits());
                self.cursor.append(bits.as_bytes());
            }
            DataObject::Array(elements) | DataObject::Structure(elements) => {
                write_count(&mut self.cursor, elements.len());
                for element in elements {
                    self.encode(element)?;
                }
            }
            DataObject::CompactArray(ca) => {
                compact::encode_compact_array(&mut self.cursor, ca)?;
            }
            DataObject::Date(d) => self.cursor.append(&d.encode()),
            DataObject::Time(t) => self.cursor.append(&t.encode()),
            DataObject::DateTime(dt) => self.cursor.append(&dt.encode()),
        }
        Ok(())
    }
}
