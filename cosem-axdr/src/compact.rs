//! Template-driven compact array codec
//!
//! The wire form carries the type template once, then a byte-counted
//! block of untagged rows. Within a row a single 0x00 byte stands for
//! an omitted cell, at any nesting level. The format reserves that
//! byte unconditionally, so the encoder rejects any present cell whose
//! encoding would begin with 0x00 (a false boolean, an unsigned zero,
//! a zero high byte) instead of emitting bytes that read back wrong.

use crate::cursor::ByteCursor;
use crate::tags::{read_count, write_count, AxdrTag};
use cosem_core::datatypes::{BitString, CompactArray, CosemDate, CosemDateTime, CosemTime, TypeDescription};
use cosem_core::{DataObject, DataObjectType, DlmsError, DlmsResult};

const OMITTED_CELL: u8 = 0x00;

/// Encode template and rows; the caller has already written the tag.
pub fn encode_compact_array(cursor: &mut ByteCursor, ca: &CompactArray) -> DlmsResult<()> {
    encode_template(cursor, ca.template());

    let mut rows = ByteCursor::new();
    for row in ca.rows() {
        encode_row(&mut rows, ca.template(), row)?;
    }
    let rows = rows.into_vec();
    write_count(cursor, rows.len());
    cursor.append(&rows);
    Ok(())
}

/// Decode template and rows.
///
/// When `expected` is given, the wire template must match it; a buffer
/// read under selective access knows its column layout in advance.
pub fn decode_compact_array(
    cursor: &mut ByteCursor,
    expected: Option<&TypeDescription>,
) -> DlmsResult<CompactArray> {
    let template = decode_template(cursor)?;
    template.validate()?;
    if let Some(expected) = expected {
        if template != *expected {
            return Err(DlmsError::InvalidData(format!(
                "Template mismatch: wire carries {:?}, expected {:?}",
                template, expected
            )));
        }
    }

    let row_bytes = read_count(cursor)?;
    let end = cursor
        .position()
        .checked_add(row_bytes)
        .ok_or_else(|| DlmsError::InvalidData("Row block length overflow".to_string()))?;
    if row_bytes > cursor.remaining() {
        return Err(DlmsError::Truncated {
            needed: row_bytes,
            available: cursor.remaining(),
        });
    }

    let mut rows = Vec::new();
    while cursor.position() < end {
        rows.push(decode_row(cursor, &template)?);
        if cursor.position() > end {
            return Err(DlmsError::InvalidData(format!(
                "Row data overran its declared {} byte(s)",
                row_bytes
            )));
        }
    }
    CompactArray::new(template, rows)
}

fn encode_template(cursor: &mut ByteCursor, template: &TypeDescription) {
    match template {
        TypeDescription::Scalar(kind) => {
            cursor.write_u8(AxdrTag::from_data_type(*kind).to_u8());
        }
        TypeDescription::Array { count, element } => {
            cursor.write_u8(AxdrTag::Array.to_u8());
            cursor.write_u16(*count);
            encode_template(cursor, element);
        }
        TypeDescription::Structure(members) => {
            cursor.write_u8(AxdrTag::Structure.to_u8());
            write_count(cursor, members.len());
            for member in members {
                encode_template(cursor, member);
            }
        }
    }
}

fn decode_template(cursor: &mut ByteCursor) -> DlmsResult<TypeDescription> {
    let tag = AxdrTag::from_u8(cursor.read_u8()?)?;
    match tag {
        // An array template carries a fixed two-byte element count.
        AxdrTag::Array => {
            let count = cursor.read_u16()?;
            let element = decode_template(cursor)?;
            Ok(TypeDescription::Array {
                count,
                element: Box::new(element),
            })
        }
        AxdrTag::Structure => {
            let count = read_count(cursor)?;
            let mut members = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                members.push(decode_template(cursor)?);
            }
            Ok(TypeDescription::Structure(members))
        }
        other => Ok(TypeDescription::Scalar(other.data_type())),
    }
}

fn encode_row(
    cursor: &mut ByteCursor,
    template: &TypeDescription,
    row: &[DataObject],
) -> DlmsResult<()> {
    match template {
        TypeDescription::Structure(members) => {
            for (member, cell) in members.iter().zip(row) {
                encode_cell(cursor, member, cell)?;
            }
            Ok(())
        }
        _ => encode_cell(cursor, template, &row[0]),
    }
}

fn decode_row(cursor: &mut ByteCursor, template: &TypeDescription) -> DlmsResult<Vec<DataObject>> {
    match template {
        TypeDescription::Structure(members) => members
            .iter()
            .map(|member| decode_cell(cursor, member))
            .collect(),
        _ => Ok(vec![decode_cell(cursor, template)?]),
    }
}

fn encode_cell(
    cursor: &mut ByteCursor,
    template: &TypeDescription,
    cell: &DataObject,
) -> DlmsResult<()> {
    if cell.is_null() {
        cursor.write_u8(OMITTED_CELL);
        return Ok(());
    }
    let start = cursor.len();
    match template {
        TypeDescription::Scalar(kind) => encode_scalar_cell(cursor, *kind, cell)?,
        TypeDescription::Array { count, element } => {
            let elements = cell.as_array()?;
            if elements.len() != usize::from(*count) {
                return Err(DlmsError::InvalidData(format!(
                    "Array cell holds {} element(s), template fixes {}",
                    elements.len(),
                    count
                )));
            }
            for item in elements {
                encode_cell(cursor, element, item)?;
            }
        }
        TypeDescription::Structure(members) => {
            let fields = cell.as_structure()?;
            if fields.len() != members.len() {
                return Err(DlmsError::InvalidData(format!(
                    "Structure cell holds {} member(s), template describes {}",
                    fields.len(),
                    members.len()
                )));
            }
            for (member, field) in members.iter().zip(fields) {
                encode_cell(cursor, member, field)?;
            }
        }
    }
    // A present cell must never look like the omission byte, or the
    // decoder would treat it as omitted and misalign the row block.
    if cursor.len() == start || cursor.as_slice()[start] == OMITTED_CELL {
        return Err(DlmsError::InvalidData(format!(
            "{:?} cell encoding starts with 0x00 and is indistinguishable from an omitted cell",
            cell.get_type()
        )));
    }
    Ok(())
}

fn decode_cell(cursor: &mut ByteCursor, template: &TypeDescription) -> DlmsResult<DataObject> {
    if cursor.peek_u8()? == OMITTED_CELL {
        cursor.read_u8()?;
        return Ok(DataObject::Null);
    }
    match template {
        TypeDescription::Scalar(kind) => decode_scalar_cell(cursor, *kind),
        TypeDescription::Array { count, element } => {
            let mut elements = Vec::with_capacity(usize::from(*count).min(1024));
            for _ in 0..*count {
                elements.push(decode_cell(cursor, element)?);
            }
            Ok(DataObject::Array(elements))
        }
        TypeDescription::Structure(members) => {
            let mut fields = Vec::with_capacity(members.len());
            for member in members {
                fields.push(decode_cell(cursor, member)?);
            }
            Ok(DataObject::Structure(fields))
        }
    }
}

fn encode_scalar_cell(
    cursor: &mut ByteCursor,
    kind: DataObjectType,
    cell: &DataObject,
) -> DlmsResult<()> {
    if cell.get_type() != kind {
        return Err(DlmsError::InvalidData(format!(
            "Cell of type {:?} does not match template leaf {:?}",
            cell.get_type(),
            kind
        )));
    }
    match cell {
        DataObject::Boolean(b) => cursor.write_u8(if *b { 0xFF } else { 0x00 }),
        DataObject::Integer8(i) => cursor.write_i8(*i),
        DataObject::Integer16(i) => cursor.write_i16(*i),
        DataObject::Integer32(i) => cursor.write_i32(*i),
        DataObject::Integer64(i) => cursor.write_i64(*i),
        DataObject::Unsigned8(u) => cursor.write_u8(*u),
        DataObject::Unsigned16(u) => cursor.write_u16(*u),
        DataObject::Unsigned32(u) => cursor.write_u32(*u),
        DataObject::Unsigned64(u) => cursor.write_u64(*u),
        DataObject::Float32(v) => cursor.write_f32(*v),
        DataObject::Float64(v) => cursor.write_f64(*v),
        DataObject::Enumerate(e) => cursor.write_u8(*e),
        DataObject::Bcd(b) => cursor.write_u8(*b),
        DataObject::OctetString(s)
        | DataObject::VisibleString(s)
        | DataObject::Utf8String(s) => {
            write_count(cursor, s.len());
            cursor.append(s);
        }
        DataObject::BitString(bits) => {
            write_count(cursor, bits.num_bits());
            cursor.append(bits.as_bytes());
        }
        DataObject::Date(d) => cursor.append(&d.encode()),
        DataObject::Time(t) => cursor.append(&t.encode()),
        DataObject::DateTime(dt) => cursor.append(&dt.encode()),
        DataObject::Null
        | DataObject::Array(_)
        | DataObject::Structure(_)
        | DataObject::CompactArray(_) => {
            return Err(DlmsError::InvalidData(format!(
                "Type {:?} cannot appear as a template leaf",
                cell.get_type()
            )));
        }
    }
    Ok(())
}

fn decode_scalar_cell(cursor: &mut ByteCursor, kind: DataObjectType) -> DlmsResult<DataObject> {
    match kind {
        DataObjectType::Boolean => Ok(DataObject::Boolean(cursor.read_u8()? != 0x00)),
        DataObjectType::Integer => Ok(DataObject::Integer8(cursor.read_i8()?)),
        DataObjectType::LongInteger => Ok(DataObject::Integer16(cursor.read_i16()?)),
        DataObjectType::DoubleLong => Ok(DataObject::Integer32(cursor.read_i32()?)),
        DataObjectType::Long64 => Ok(DataObject::Integer64(cursor.read_i64()?)),
        DataObjectType::Unsigned => Ok(DataObject::Unsigned8(cursor.read_u8()?)),
        DataObjectType::LongUnsigned => Ok(DataObject::Unsigned16(cursor.read_u16()?)),
        DataObjectType::DoubleLongUnsigned => Ok(DataObject::Unsigned32(cursor.read_u32()?)),
        DataObjectType::Long64Unsigned => Ok(DataObject::Unsigned64(cursor.read_u64()?)),
        DataObjectType::Float32 => Ok(DataObject::Float32(cursor.read_f32()?)),
        DataObjectType::Float64 => Ok(DataObject::Float64(cursor.read_f64()?)),
        DataObjectType::Enumerate => Ok(DataObject::Enumerate(cursor.read_u8()?)),
        DataObjectType::Bcd => Ok(DataObject::Bcd(cursor.read_u8()?)),
        DataObjectType::OctetString => {
            let len = read_count(cursor)?;
            Ok(DataObject::OctetString(cursor.read_bytes(len)?))
        }
        DataObjectType::VisibleString => {
            let len = read_count(cursor)?;
            Ok(DataObject::VisibleString(cursor.read_bytes(len)?))
        }
        DataObjectType::Utf8String => {
            let len = read_count(cursor)?;
            Ok(DataObject::Utf8String(cursor.read_bytes(len)?))
        }
        DataObjectType::BitString => {
            let num_bits = read_count(cursor)?;
            let bytes = cursor.read_bytes(num_bits.div_ceil(8))?;
            Ok(DataObject::BitString(BitString::new(bytes, num_bits)?))
        }
        DataObjectType::Date => {
            let bytes = cursor.read_bytes(CosemDate::LENGTH)?;
            Ok(DataObject::Date(CosemDate::decode(&bytes)?))
        }
        DataObjectType::Time => {
            let bytes = cursor.read_bytes(CosemTime::LENGTH)?;
            Ok(DataObject::Time(CosemTime::decode(&bytes)?))
        }
        DataObjectType::DateTime => {
            let bytes = cursor.read_bytes(CosemDateTime::LENGTH)?;
            Ok(DataObject::DateTime(CosemDateTime::decode(&bytes)?))
        }
        other => Err(DlmsError::InvalidData(format!(
            "Type {:?} cannot appear as a template leaf",
            other
        ))),
    }
}
