//! The dispatch contract every interface class implements

use crate::access::{AccessResultCode, AccessRights};
use crate::selective::AccessSelector;
use cosem_core::{DataObject, DataObjectType, DlmsResult, ObisCode};
use log::warn;
use std::collections::HashSet;

/// Attribute index of the logical name, shared by every class
pub const ATTR_LOGICAL_NAME: u8 = 1;

/// State every object carries: identity, version, access rights and
/// the per-attribute read flags driving read planning.
#[derive(Debug, Clone)]
pub struct ObjectCore {
    logical_name: ObisCode,
    version: u8,
    access_rights: AccessRights,
    read_attributes: HashSet<u8>,
}

impl ObjectCore {
    pub fn new(logical_name: ObisCode, version: u8) -> Self {
        Self {
            logical_name,
            version,
            access_rights: AccessRights::new(),
            read_attributes: HashSet::new(),
        }
    }

    pub fn logical_name(&self) -> ObisCode {
        self.logical_name
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn access_rights(&self) -> &AccessRights {
        &self.access_rights
    }

    pub fn access_rights_mut(&mut self) -> &mut AccessRights {
        &mut self.access_rights
    }

    pub fn is_read(&self, index: u8) -> bool {
        self.read_attributes.contains(&index)
    }

    pub fn mark_read(&mut self, index: u8) {
        self.read_attributes.insert(index);
    }

    /// Forget read flags, e.g. when a new association begins.
    pub fn clear_read_flags(&mut self) {
        self.read_attributes.clear();
    }

    /// Attribute 1: the logical name as an octet string, marked read.
    pub fn read_logical_name(&mut self) -> DataObject {
        self.mark_read(ATTR_LOGICAL_NAME);
        DataObject::OctetString(self.logical_name.to_bytes().to_vec())
    }

    /// Permission gate for reading `index`.
    pub fn check_read(&self, index: u8) -> Result<(), AccessResultCode> {
        if self.access_rights.attribute(index).can_read() {
            Ok(())
        } else {
            warn!("Read of {} attribute {} denied", self.logical_name, index);
            Err(AccessResultCode::ReadWriteDenied)
        }
    }

    /// Permission gate for writing `index`.
    pub fn check_write(&self, index: u8) -> Result<(), AccessResultCode> {
        if self.access_rights.attribute(index).can_write() {
            Ok(())
        } else {
            warn!("Write of {} attribute {} denied", self.logical_name, index);
            Err(AccessResultCode::ReadWriteDenied)
        }
    }

    /// Permission gate for invoking method `index`.
    pub fn check_invoke(&self, index: u8) -> Result<(), AccessResultCode> {
        if self.access_rights.method(index).can_invoke() {
            Ok(())
        } else {
            warn!("Invocation of {} method {} denied", self.logical_name, index);
            Err(AccessResultCode::ReadWriteDenied)
        }
    }
}

/// The uniform interface every interface class satisfies.
///
/// Transports, batching logic and tests are written once against this
/// contract instead of once per class. Attribute and method indices
/// are 1-based; index 1 is always the logical name. Counts are a
/// function of the object's version, never hardcoded by callers.
///
/// Two failure classes are kept apart: [`AccessResultCode`] outcomes
/// are data reported to the peer per item, while [`cosem_core::DlmsError`]
/// aborts the request being processed.
pub trait CosemObject {
    fn class_id(&self) -> u16;

    fn core(&self) -> &ObjectCore;

    fn core_mut(&mut self) -> &mut ObjectCore;

    fn attribute_count(&self) -> u8;

    fn method_count(&self) -> u8;

    /// Wire type of the attribute, failing fast on an out-of-range index.
    fn data_type(&self, index: u8) -> DlmsResult<DataObjectType>;

    /// Read one attribute; buffered attributes apply the selector first.
    fn get_attribute(
        &mut self,
        index: u8,
        selector: &AccessSelector,
        parameters: Option<&DataObject>,
    ) -> Result<DataObject, AccessResultCode>;

    /// Write one attribute; on a malformed value the prior state is kept.
    fn set_attribute(&mut self, index: u8, value: DataObject)
        -> Result<(), AccessResultCode>;

    /// Execute one method.
    fn invoke(
        &mut self,
        method: u8,
        parameters: Option<&DataObject>,
    ) -> Result<Option<DataObject>, AccessResultCode>;

    fn logical_name(&self) -> ObisCode {
        self.core().logical_name()
    }

    fn version(&self) -> u8 {
        self.core().version()
    }

    /// Indices a transport should GET, in ascending order.
    ///
    /// The logical name comes first when forced or not yet read; every
    /// other index is included when forced, or when it is readable and
    /// has no read flag set. Only the logical name read sets a flag, so
    /// ordinary attributes stay eligible for re-reading.
    fn attributes_to_read(&self, all: bool) -> Vec<u8> {
        let mut indices = Vec::new();
        if all || !self.core().is_read(ATTR_LOGICAL_NAME) {
            indices.push(ATTR_LOGICAL_NAME);
        }
        for index in 2..=self.attribute_count() {
            if all
                || (self.core().access_rights().attribute(index).can_read()
                    && !self.core().is_read(index))
            {
                indices.push(index);
            }
        }
        indices
    }
}

/// Resolve a batched get: every index is answered independently, so a
/// denied or unknown index never aborts its siblings.
pub fn get_attribute_list(
    object: &mut dyn CosemObject,
    indices: &[u8],
) -> Vec<Result<DataObject, AccessResultCode>> {
    indices
        .iter()
        .map(|&index| object.get_attribute(index, &AccessSelector::All, None))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AttributeAccess;
    use crate::data::Data;

    fn test_object() -> Data {
        Data::new(ObisCode::new(0, 0, 96, 1, 0, 255), DataObject::Unsigned32(5))
    }

    #[test]
    fn test_logical_name_is_read_once() {
        let mut object = test_object();
        assert_eq!(object.attributes_to_read(false), vec![1, 2]);

        let ln = object
            .get_attribute(1, &AccessSelector::All, None)
            .unwrap();
        assert_eq!(
            ln,
            DataObject::OctetString(vec![0, 0, 96, 1, 0, 255])
        );

        // Index 1 never reappears; index 2 stays re-readable.
        assert_eq!(object.attributes_to_read(false), vec![2]);
        assert_eq!(object.attributes_to_read(false), vec![2]);
        assert_eq!(object.attributes_to_read(true), vec![1, 2]);
    }

    #[test]
    fn test_unreadable_attribute_is_not_planned() {
        let mut object = test_object();
        object
            .core_mut()
            .access_rights_mut()
            .set_attribute(2, AttributeAccess::WriteOnly);
        assert_eq!(object.attributes_to_read(false), vec![1]);
        // Forced plans ignore rights.
        assert_eq!(object.attributes_to_read(true), vec![1, 2]);
    }

    #[test]
    fn test_rights_gate_every_operation() {
        let mut object = test_object();
        object
            .core_mut()
            .access_rights_mut()
            .set_attribute(2, AttributeAccess::WriteOnly);

        assert_eq!(
            object.get_attribute(2, &AccessSelector::All, None),
            Err(AccessResultCode::ReadWriteDenied)
        );
        assert_eq!(object.set_attribute(2, DataObject::Unsigned32(9)), Ok(()));

        object
            .core_mut()
            .access_rights_mut()
            .set_attribute(2, AttributeAccess::ReadOnly);
        assert_eq!(
            object.set_attribute(2, DataObject::Unsigned32(1)),
            Err(AccessResultCode::ReadWriteDenied)
        );
        // The denied write left the last accepted value in place.
        assert_eq!(
            object.get_attribute(2, &AccessSelector::All, None),
            Ok(DataObject::Unsigned32(9))
        );
    }

    #[test]
    fn test_batched_get_isolates_unknown_index() {
        let mut object = test_object();
        let results = get_attribute_list(&mut object, &[1, 99, 2]);

        assert!(results[0].is_ok());
        assert_eq!(results[1], Err(AccessResultCode::ReadWriteDenied));
        assert_eq!(results[2], Ok(DataObject::Unsigned32(5)));
    }

    #[test]
    fn test_clear_read_flags() {
        let mut object = test_object();
        object
            .get_attribute(1, &AccessSelector::All, None)
            .unwrap();
        assert_eq!(object.attributes_to_read(false), vec![2]);

        object.core_mut().clear_read_flags();
        assert_eq!(object.attributes_to_read(false), vec![1, 2]);
    }
}
