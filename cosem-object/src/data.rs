//! Data interface class (Class ID: 1)
//!
//! The simplest class: a logical name and one value of any type.
//!
//! # Attributes
//!
//! - Attribute 1: logical_name (OBIS code)
//! - Attribute 2: value

use crate::access::AccessResultCode;
use crate::object::{CosemObject, ObjectCore};
use crate::selective::AccessSelector;
use cosem_core::{DataObject, DataObjectType, DlmsError, DlmsResult, ObisCode};

#[derive(Debug, Clone)]
pub struct Data {
    core: ObjectCore,
    value: DataObject,
}

impl Data {
    pub const CLASS_ID: u16 = 1;

    pub const ATTR_VALUE: u8 = 2;

    pub fn new(logical_name: ObisCode, value: DataObject) -> Self {
        Self {
            core: ObjectCore::new(logical_name, 0),
            value,
        }
    }

    pub fn value(&self) -> &DataObject {
        &self.value
    }
}

impl CosemObject for Data {
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
        2
    }

    fn method_count(&self) -> u8 {
        0
    }

    fn data_type(&self, index: u8) -> DlmsResult<DataObjectType> {
        match index {
            1 => Ok(DataObjectType::OctetString),
            Self::ATTR_VALUE => Ok(self.value.get_type()),
            other => Err(DlmsError::InvalidIndex(other)),
        }
    }

    fn get_attribute(
        &mut self,
        index: u8,
        _selector: &AccessSelector,
        _parameters: Option<&DataObject>,
    ) -> Result<DataObject, AccessResultCode> {
        match index {
            1 => Ok(self.core.read_logical_name()),
            Self::ATTR_VALUE => {
                self.core.check_read(index)?;
                Ok(self.value.clone())
            }
            _ => Err(AccessResultCode::ReadWriteDenied),
        }
    }

    fn set_attribute(&mut self, index: u8, value: DataObject) -> Result<(), AccessResultCode> {
        match index {
            Self::ATTR_VALUE => {
                self.core.check_write(index)?;
                self.value = value;
                Ok(())
            }
            _ => Err(AccessResultCode::ReadWriteDenied),
        }
    }

    fn invoke(
        &mut self,
        _method: u8,
        _parameters: Option<&DataObject>,
    ) -> Result<Option<DataObject>, AccessResultCode> {
        Err(AccessResultCode::ReadWriteDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AttributeAccess;

    #[test]
    fn test_get_and_set_value() {
        let mut data = Data::new(ObisCode::new(0, 0, 96, 1, 0, 255), DataObject::Unsigned8(1));
        assert_eq!(
            data.get_attribute(2, &AccessSelector::All, None),
            Ok(DataObject::Unsigned8(1))
        );

        data.set_attribute(2, DataObject::Unsigned8(9)).unwrap();
        assert_eq!(data.value(), &DataObject::Unsigned8(9));
    }

    #[test]
    fn test_denied_access_is_a_protocol_outcome() {
        let mut data = Data::new(ObisCode::new(0, 0, 96, 1, 0, 255), DataObject::Null);
        data.core_mut()
            .access_rights_mut()
            .set_attribute(2, AttributeAccess::ReadOnly);

        assert_eq!(
            data.set_attribute(2, DataObject::Boolean(true)),
            Err(AccessResultCode::ReadWriteDenied)
        );
        assert_eq!(
            data.invoke(1, None),
            Err(AccessResultCode::ReadWriteDenied)
        );
    }

    #[test]
    fn test_data_type_is_fail_fast_on_bad_index() {
        let data = Data::new(ObisCode::new(0, 0, 96, 1, 0, 255), DataObject::Boolean(true));
        assert_eq!(data.data_type(2).unwrap(), DataObjectType::Boolean);
        assert!(matches!(data.data_type(9), Err(DlmsError::InvalidIndex(9))));
    }
}
