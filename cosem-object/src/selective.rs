//! Selective access: windowing a buffered attribute
//!
//! A client may ask for a slice of a buffer instead of the whole
//! thing, either by timestamp range or by entry numbers. Range bounds
//! are inclusive at both ends; entry numbers are 1-based and an
//! out-of-range window yields an empty result, never an error, so a
//! peer's bad index becomes a well-formed empty response.

use cosem_core::datatypes::CosemDateTime;
use cosem_core::{DataObject, DlmsError, DlmsResult};
use std::cmp::Ordering;
use std::ops::Range;

/// Selector id of the range descriptor in a get request
pub const SELECTOR_RANGE: u8 = 1;
/// Selector id of the entry descriptor
pub const SELECTOR_ENTRY: u8 = 2;

/// Which rows of a buffered attribute a get request wants
#[derive(Debug, Clone, PartialEq)]
pub enum AccessSelector {
    /// Every row
    All,
    /// Rows whose timestamp column lies in `[from, to]`, both inclusive
    ByRange {
        from: CosemDateTime,
        to: CosemDateTime,
    },
    /// `count` rows starting at 1-based entry `start`
    ByEntry { start: u32, count: u32 },
}

impl AccessSelector {
    /// Decode the wire shape of a selective-access descriptor.
    ///
    /// Selector 1 is a range descriptor: a structure whose second and
    /// third members are the from/to bounds (the first names the
    /// restricting column). Selector 2 is an entry descriptor: a
    /// structure starting with from_entry and to_entry, where a
    /// to_entry of zero means "to the end".
    pub fn from_descriptor(selector: u8, parameters: &DataObject) -> DlmsResult<Self> {
        match selector {
            SELECTOR_RANGE => {
                let members = parameters.as_structure()?;
                if members.len() < 3 {
                    return Err(DlmsError::InvalidData(format!(
                        "Range descriptor has {} member(s), need at least 3",
                        members.len()
                    )));
                }
                let from = members[1].as_date_time()?;
                let to = members[2].as_date_time()?;
                Ok(AccessSelector::ByRange { from, to })
            }
            SELECTOR_ENTRY => {
                let members = parameters.as_structure()?;
                if members.len() < 2 {
                    return Err(DlmsError::InvalidData(format!(
                        "Entry descriptor has {} member(s), need at least 2",
                        members.len()
                    )));
                }
                let from_entry = members[0].to_u32()?;
                let to_entry = members[1].to_u32()?;
                let count = if to_entry == 0 {
                    u32::MAX
                } else if to_entry < from_entry {
                    0
                } else {
                    to_entry - from_entry + 1
                };
                Ok(AccessSelector::ByEntry {
                    start: from_entry,
                    count,
                })
            }
            other => Err(DlmsError::InvalidData(format!(
                "Unknown access selector {}",
                other
            ))),
        }
    }

    /// Whether `timestamp` falls inside this selector's range.
    ///
    /// Always true for `All` and `ByEntry`; range comparison skips
    /// "not specified" calendar fields on either side, so a wildcard
    /// bound matches every value of that field.
    pub fn accepts(&self, timestamp: &CosemDateTime) -> bool {
        match self {
            AccessSelector::ByRange { from, to } => {
                from.cmp_calendar(timestamp) != Ordering::Greater
                    && timestamp.cmp_calendar(to) != Ordering::Greater
            }
            _ => true,
        }
    }
}

/// Normalize a 1-based entry window onto `available` rows.
///
/// Start 0 and start past the end both give an empty window; the count
/// is clipped to what exists. Reads and entry mutations share this
/// rule so both stay total.
pub fn entry_window(available: usize, start: u32, count: u32) -> Range<usize> {
    if start == 0 {
        return 0..0;
    }
    let begin = (start - 1) as usize;
    if begin >= available {
        return 0..0;
    }
    let end = begin
        .checked_add(count as usize)
        .map_or(available, |end| end.min(available));
    begin..end
}
