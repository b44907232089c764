//! Profile Generic interface class (Class ID: 7)
//!
//! A buffer of captured rows: load profiles, event logs, billing
//! history. The buffer attribute is the one place selective access
//! applies; the first captured column is the timestamp column range
//! selection compares against.
//!
//! # Attributes
//!
//! - Attribute 1: logical_name (OBIS code)
//! - Attribute 2: buffer - the captured rows, selector applied
//! - Attribute 3: capture_objects - column definitions
//! - Attribute 4: capture_period - seconds between captures (0 = on demand)
//! - Attribute 5: sort_method - FIFO or LIFO
//! - Attribute 6: sort_object - column governing the ordering (optional)
//! - Attribute 7: entries_in_use
//! - Attribute 8: profile_entries - buffer capacity (version 1 and later)
//!
//! # Methods
//!
//! - Method 1: reset() - clear the buffer
//! - Method 2: capture() - append one row

use crate::access::AccessResultCode;
use crate::capture::CaptureObject;
use crate::object::{CosemObject, ObjectCore};
use crate::selective::{entry_window, AccessSelector};
use cosem_core::datatypes::CosemDateTime;
use cosem_core::{DataObject, DataObjectType, DlmsError, DlmsResult, ObisCode};
use log::debug;
use std::sync::{Mutex, MutexGuard};

/// Buffer ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMethod {
    /// Oldest entry evicted first; rows stored oldest to newest
    Fifo = 1,
    /// Newest entry first; rows stored newest to oldest
    Lifo = 2,
}

impl SortMethod {
    pub fn from_u8(value: u8) -> DlmsResult<Self> {
        match value {
            1 => Ok(SortMethod::Fifo),
            2 => Ok(SortMethod::Lifo),
            other => Err(DlmsError::InvalidData(format!(
                "Invalid sort method {}",
                other
            ))),
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// One captured row: a timestamp and one value per remaining column
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileEntry {
    pub timestamp: CosemDateTime,
    pub values: Vec<DataObject>,
}

impl ProfileEntry {
    pub fn new(timestamp: CosemDateTime, values: Vec<DataObject>) -> Self {
        Self { timestamp, values }
    }

    /// Row wire shape: a structure led by the 12-byte timestamp
    pub fn to_data_object(&self) -> DataObject {
        let mut members = Vec::with_capacity(1 + self.values.len());
        members.push(DataObject::OctetString(self.timestamp.encode()));
        members.extend(self.values.iter().cloned());
        DataObject::Structure(members)
    }

    pub fn from_data_object(value: &DataObject) -> DlmsResult<Self> {
        let members = value.as_structure()?;
        let timestamp = members
            .first()
            .ok_or_else(|| DlmsError::InvalidData("Empty profile row".to_string()))?
            .as_date_time()?;
        Ok(Self {
            timestamp,
            values: members[1..].to_vec(),
        })
    }
}

pub struct ProfileGeneric {
    core: ObjectCore,
    // Guards read-modify-write against the background capture trigger.
    buffer: Mutex<Vec<ProfileEntry>>,
    capture_objects: Vec<CaptureObject>,
    capture_period: u32,
    sort_method: SortMethod,
    sort_object: Option<CaptureObject>,
    profile_entries: u32,
}

impl ProfileGeneric {
    pub const CLASS_ID: u16 = 7;

    pub const ATTR_BUFFER: u8 = 2;
    pub const ATTR_CAPTURE_OBJECTS: u8 = 3;
    pub const ATTR_CAPTURE_PERIOD: u8 = 4;
    pub const ATTR_SORT_METHOD: u8 = 5;
    pub const ATTR_SORT_OBJECT: u8 = 6;
    pub const ATTR_ENTRIES_IN_USE: u8 = 7;
    pub const ATTR_PROFILE_ENTRIES: u8 = 8;

    pub const METHOD_RESET: u8 = 1;
    pub const METHOD_CAPTURE: u8 = 2;

    pub fn new(
        logical_name: ObisCode,
        version: u8,
        profile_entries: u32,
        capture_period: u32,
        sort_method: SortMethod,
    ) -> Self {
        Self {
            core: ObjectCore::new(logical_name, version),
            buffer: Mutex::new(Vec::new()),
            capture_objects: Vec::new(),
            capture_period,
            sort_method,
            sort_object: None,
            profile_entries,
        }
    }

    pub fn capture_objects(&self) -> &[CaptureObject] {
        &self.capture_objects
    }

    pub fn set_capture_objects(&mut self, columns: Vec<CaptureObject>) {
        self.capture_objects = columns;
    }

    pub fn capture_period(&self) -> u32 {
        self.capture_period
    }

    pub fn sort_method(&self) -> SortMethod {
        self.sort_method
    }

    pub fn entries_in_use(&self) -> DlmsResult<u32> {
        Ok(self.lock_buffer()?.len() as u32)
    }

    /// Append one captured row, evicting per the sort method when full.
    ///
    /// This is the entry point of the background capture trigger; the
    /// buffer lock keeps it from interleaving with a client read or
    /// reset.
    pub fn capture(&self, timestamp: CosemDateTime, values: Vec<DataObject>) -> DlmsResult<()> {
        if !self.capture_objects.is_empty() && values.len() + 1 != self.capture_objects.len() {
            return Err(DlmsError::InvalidData(format!(
                "Captured {} value(s) for {} non-timestamp column(s)",
                values.len(),
                self.capture_objects.len() - 1
            )));
        }
        let entry = ProfileEntry::new(timestamp, values);
        let mut buffer = self.lock_buffer()?;
        let limit = self.profile_entries as usize;
        match self.sort_method {
            SortMethod::Fifo => {
                buffer.push(entry);
                if limit > 0 && buffer.len() > limit {
                    buffer.remove(0);
                }
            }
            SortMethod::Lifo => {
                buffer.insert(0, entry);
                if limit > 0 && buffer.len() > limit {
                    buffer.truncate(limit);
                }
            }
        }
        debug!(
            "Captured entry, buffer {} holds {} row(s)",
            self.core.logical_name(),
            buffer.len()
        );
        Ok(())
    }

    /// Clear the buffer.
    pub fn reset(&self) -> DlmsResult<()> {
        self.lock_buffer()?.clear();
        debug!("Buffer {} reset", self.core.logical_name());
        Ok(())
    }

    /// Remove `count` entries starting at 1-based entry `start`.
    ///
    /// Shares the window normalization with entry reads: start 0 or
    /// past the end removes nothing and is not an error. Returns how
    /// many entries were removed.
    pub fn remove_entries(&self, start: u32, count: u32) -> DlmsResult<usize> {
        let mut buffer = self.lock_buffer()?;
        let window = entry_window(buffer.len(), start, count);
        let removed = window.len();
        buffer.drain(window);
        Ok(removed)
    }

    /// Rows passing the selector, in storage order.
    pub fn select_rows(&self, selector: &AccessSelector) -> DlmsResult<Vec<ProfileEntry>> {
        let buffer = self.lock_buffer()?;
        let rows = match selector {
            AccessSelector::All => buffer.clone(),
            AccessSelector::ByRange { .. } => buffer
                .iter()
                .filter(|entry| selector.accepts(&entry.timestamp))
                .cloned()
                .collect(),
            AccessSelector::ByEntry { start, count } => {
                buffer[entry_window(buffer.len(), *start, *count)].to_vec()
            }
        };
        Ok(rows)
    }

    fn lock_buffer(&self) -> DlmsResult<MutexGuard<'_, Vec<ProfileEntry>>> {
        self.buffer
            .lock()
            .map_err(|_| DlmsError::InvalidData("Profile buffer lock poisoned".to_string()))
    }

    fn buffer_attribute(&self, selector: &AccessSelector) -> Result<DataObject, AccessResultCode> {
        // A poisoned lock is a transient host-side fault, reported to
        // the peer as a per-item outcome.
        let rows = self
            .select_rows(selector)
            .map_err(|_| AccessResultCode::TemporaryFailure)?;
        debug!("Buffer read returns {} row(s)", rows.len());
        Ok(DataObject::Array(
            rows.iter().map(ProfileEntry::to_data_object).collect(),
        ))
    }
}

impl CosemObject for ProfileGeneric {
    fn class_id(&self) -> u16 {
        Self::CLASS_ID
    }

    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn attribute_count(&self) -> u8 {
        // Version 1 added the capacity attribute.
        if self.core.version() >= 1 {
            8
        } else {
            7
        }
    }

    fn method_count(&self) -> u8 {
        2
    }

    fn data_type(&self, index: u8) -> DlmsResult<DataObjectType> {
        if index == 0 || index > self.attribute_count() {
            return Err(DlmsError::InvalidIndex(index));
        }
        Ok(match index {
            1 => DataObjectType::OctetString,
            Self::ATTR_BUFFER | Self::ATTR_CAPTURE_OBJECTS => DataObjectType::Array,
            Self::ATTR_CAPTURE_PERIOD
            | Self::ATTR_ENTRIES_IN_USE
            | Self::ATTR_PROFILE_ENTRIES => DataObjectType::DoubleLongUnsigned,
            Self::ATTR_SORT_METHOD => DataObjectType::Enumerate,
            _ => DataObjectType::Structure,
        })
    }

    fn get_attribute(
        &mut self,
        index: u8,
        selector: &AccessSelector,
        _parameters: Option<&DataObject>,
    ) -> Result<DataObject, AccessResultCode> {
        if index != 1 && index <= self.attribute_count() {
            self.core.check_read(index)?;
        }
        match index {
            1 => Ok(self.core.read_logical_name()),
            Self::ATTR_BUFFER => self.buffer_attribute(selector),
            Self::ATTR_CAPTURE_OBJECTS => Ok(DataObject::Array(
                self.capture_objects
                    .iter()
                    .map(CaptureObject::to_data_object)
                    .collect(),
            )),
            Self::ATTR_CAPTURE_PERIOD => Ok(DataObject::Unsigned32(self.capture_period)),
            Self::ATTR_SORT_METHOD => Ok(DataObject::Enumerate(self.sort_method.to_u8())),
            Self::ATTR_SORT_OBJECT => Ok(match &self.sort_object {
                Some(column) => column.to_data_object(),
                None => DataObject::Null,
            }),
            Self::ATTR_ENTRIES_IN_USE => {
                let in_use = self
                    .entries_in_use()
                    .map_err(|_| AccessResultCode::TemporaryFailure)?;
                Ok(DataObject::Unsigned32(in_use))
            }
            Self::ATTR_PROFILE_ENTRIES if self.core.version() >= 1 => {
                Ok(DataObject::Unsigned32(self.profile_entries))
            }
            _ => Err(AccessResultCode::ReadWriteDenied),
        }
    }

    fn set_attribute(&mut self, index: u8, value: DataObject) -> Result<(), AccessResultCode> {
        if index != 1 && index <= self.attribute_count() {
            self.core.check_write(index)?;
        }
        match index {
            Self::ATTR_CAPTURE_OBJECTS => {
                let columns = value
                    .as_array()
                    .and_then(|items| {
                        items.iter().map(CaptureObject::from_data_object).collect()
                    })
                    .map_err(|_| AccessResultCode::ReadWriteDenied)?;
                self.capture_objects = columns;
                Ok(())
            }
            Self::ATTR_CAPTURE_PERIOD => {
                self.capture_period =
                    value.to_u32().map_err(|_| AccessResultCode::ReadWriteDenied)?;
                Ok(())
            }
            Self::ATTR_SORT_METHOD => {
                let method = value
                    .as_u8()
                    .and_then(SortMethod::from_u8)
                    .map_err(|_| AccessResultCode::ReadWriteDenied)?;
                self.sort_method = method;
                Ok(())
            }
            Self::ATTR_SORT_OBJECT => {
                self.sort_object = match value {
                    DataObject::Null => None,
                    other => Some(
                        CaptureObject::from_data_object(&other)
                            .map_err(|_| AccessResultCode::ReadWriteDenied)?,
                    ),
                };
                Ok(())
            }
            Self::ATTR_PROFILE_ENTRIES if self.core.version() >= 1 => {
                self.profile_entries =
                    value.to_u32().map_err(|_| AccessResultCode::ReadWriteDenied)?;
                Ok(())
            }
            _ => Err(AccessResultCode::ReadWriteDenied),
        }
    }

    fn invoke(
        &mut self,
        method: u8,
        parameters: Option<&DataObject>,
    ) -> Result<Option<DataObject>, AccessResultCode> {
        match method {
            Self::METHOD_RESET => {
                self.core.check_invoke(method)?;
                self.reset()
                    .map_err(|_| AccessResultCode::TemporaryFailure)?;
                Ok(None)
            }
            Self::METHOD_CAPTURE => {
                self.core.check_invoke(method)?;
                let row = parameters.ok_or(AccessResultCode::ReadWriteDenied)?;
                let entry = ProfileEntry::from_data_object(row)
                    .map_err(|_| AccessResultCode::ReadWriteDenied)?;
                self.capture(entry.timestamp, entry.values)
                    .map_err(|_| AccessResultCode::ReadWriteDenied)?;
                Ok(None)
            }
            _ => Err(AccessResultCode::ReadWriteDenied),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(hour: u8, minute: u8) -> CosemDateTime {
        CosemDateTime::new(2024, 6, 1, hour, minute, 0, 0, &[]).unwrap()
    }

    fn load_profile() -> ProfileGeneric {
        let mut profile = ProfileGeneric::new(
            ObisCode::new(1, 0, 99, 1, 0, 255),
            1,
            100,
            900,
            SortMethod::Fifo,
        );
        profile.set_capture_objects(vec![
            CaptureObject::new(8, ObisCode::new(0, 0, 1, 0, 0, 255), 2),
            CaptureObject::new(3, ObisCode::new(1, 0, 1, 8, 0, 255), 2),
        ]);
        for (hour, minute, energy) in [(10, 0, 100u32), (10, 5, 110), (10, 10, 120)] {
            profile
                .capture(ts(hour, minute), vec![DataObject::Unsigned32(energy)])
                .unwrap();
        }
        profile
    }

    #[test]
    fn test_range_selection_keeps_boundary_rows() {
        let profile = load_profile();
        let selector = AccessSelector::ByRange {
            from: ts(10, 0),
            to: ts(10, 5),
        };
        let rows = profile.select_rows(&selector).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].values, vec![DataObject::Unsigned32(100)]);
        assert_eq!(rows[1].values, vec![DataObject::Unsigned32(110)]);
    }

    #[test]
    fn test_entry_selection_out_of_range_is_empty() {
        let profile = load_profile();
        for selector in [
            AccessSelector::ByEntry { start: 0, count: 5 },
            AccessSelector::ByEntry { start: 100, count: 5 },
        ] {
            assert!(profile.select_rows(&selector).unwrap().is_empty());
        }
        let clipped = AccessSelector::ByEntry { start: 2, count: 10 };
        assert_eq!(profile.select_rows(&clipped).unwrap().len(), 2);
    }

    #[test]
    fn test_buffer_attribute_rows_are_timestamped_structures() {
        let mut profile = load_profile();
        let buffer = profile
            .get_attribute(2, &AccessSelector::ByEntry { start: 1, count: 1 }, None)
            .unwrap();
        let rows = buffer.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        let row = rows[0].as_structure().unwrap();
        assert_eq!(row[0], DataObject::OctetString(ts(10, 0).encode()));
        assert_eq!(row[1], DataObject::Unsigned32(100));
    }

    #[test]
    fn test_fifo_eviction_at_capacity() {
        let profile = ProfileGeneric::new(
            ObisCode::new(1, 0, 99, 1, 0, 255),
            1,
            2,
            0,
            SortMethod::Fifo,
        );
        for minute in [0, 5, 10] {
            profile.capture(ts(10, minute), vec![]).unwrap();
        }
        let rows = profile.select_rows(&AccessSelector::All).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].timestamp, ts(10, 5));
        assert_eq!(rows[1].timestamp, ts(10, 10));
    }

    #[test]
    fn test_lifo_keeps_newest_first() {
        let profile = ProfileGeneric::new(
            ObisCode::new(1, 0, 99, 2, 0, 255),
            1,
            2,
            0,
            SortMethod::Lifo,
        );
        for minute in [0, 5, 10] {
            profile.capture(ts(10, minute), vec![]).unwrap();
        }
        let rows = profile.select_rows(&AccessSelector::All).unwrap();
        assert_eq!(rows[0].timestamp, ts(10, 10));
        assert_eq!(rows[1].timestamp, ts(10, 5));
    }

    #[test]
    fn test_remove_entries_shares_window_rules() {
        let profile = load_profile();
        assert_eq!(profile.remove_entries(0, 5).unwrap(), 0);
        assert_eq!(profile.remove_entries(100, 5).unwrap(), 0);
        assert_eq!(profile.remove_entries(2, 1).unwrap(), 1);

        let rows = profile.select_rows(&AccessSelector::All).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].timestamp, ts(10, 10));
    }

    #[test]
    fn test_reset_and_capture_methods() {
        let mut profile = load_profile();
        assert_eq!(profile.invoke(1, None), Ok(None));
        assert_eq!(profile.entries_in_use().unwrap(), 0);

        let row = ProfileEntry::new(ts(11, 0), vec![DataObject::Unsigned32(130)]).to_data_object();
        assert_eq!(profile.invoke(2, Some(&row)), Ok(None));
        assert_eq!(profile.entries_in_use().unwrap(), 1);

        // Wrong column arity is a protocol outcome, not a panic.
        let bad = ProfileEntry::new(ts(11, 5), vec![]).to_data_object();
        assert_eq!(
            profile.invoke(2, Some(&bad)),
            Err(AccessResultCode::ReadWriteDenied)
        );
        assert_eq!(profile.invoke(2, None), Err(AccessResultCode::ReadWriteDenied));
    }

    #[test]
    fn test_attribute_count_follows_version() {
        let v0 = ProfileGeneric::new(
            ObisCode::new(1, 0, 99, 1, 0, 255),
            0,
            10,
            0,
            SortMethod::Fifo,
        );
        let v1 = ProfileGeneric::new(
            ObisCode::new(1, 0, 99, 1, 0, 255),
            1,
            10,
            0,
            SortMethod::Fifo,
        );
        assert_eq!(v0.attribute_count(), 7);
        assert_eq!(v1.attribute_count(), 8);

        assert!(v0.data_type(8).is_err());
        assert_eq!(v1.data_type(8).unwrap(), DataObjectType::DoubleLongUnsigned);
    }
}
