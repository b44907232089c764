//! Register interface class (Class ID: 3)
//!
//! A measured value with scaling information.
//!
//! # Attributes
//!
//! - Attribute 1: logical_name (OBIS code)
//! - Attribute 2: value
//! - Attribute 3: scaler_unit (structure of scaler exponent and unit enum)
//!
//! # Methods
//!
//! - Method 1: reset() - Set the value back to its default

use crate::access::AccessResultCode;
use crate::object::{CosemObject, ObjectCore};
use crate::selective::AccessSelector;
use cosem_core::{DataObject, DataObjectType, DlmsError, DlmsResult, ObisCode};

/// Scaler exponent and unit of a register value.
///
/// The stored value times 10^scaler gives the physical quantity in the
/// named unit (unit codes per the protocol's unit table, e.g. 30 = Wh).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalerUnit {
    pub scaler: i8,
    pub unit: u8,
}

impl ScalerUnit {
    pub fn new(scaler: i8, unit: u8) -> Self {
        Self { scaler, unit }
    }

    pub fn to_data_object(&self) -> DataObject {
        DataObject::Structure(vec![
            DataObject::Integer8(self.scaler),
            DataObject::Enumerate(self.unit),
        ])
    }

    pub fn from_data_object(value: &DataObject) -> DlmsResult<Self> {
        let members = value.as_structure()?;
        if members.len() != 2 {
            return Err(DlmsError::InvalidData(format!(
                "Scaler-unit must have 2 members, got {}",
                members.len()
            )));
        }
        Ok(Self {
            scaler: members[0].as_i8()?,
            unit: members[1].as_u8()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Register {
    core: ObjectCore,
    value: DataObject,
    default_value: DataObject,
    scaler_unit: ScalerUnit,
}

impl Register {
    pub const CLASS_ID: u16 = 3;

    pub const ATTR_VALUE: u8 = 2;
    pub const ATTR_SCALER_UNIT: u8 = 3;

    pub const METHOD_RESET: u8 = 1;

    /// The initial value doubles as the reset target.
    pub fn new(logical_name: ObisCode, value: DataObject, scaler_unit: ScalerUnit) -> Self {
        Self {
            core: ObjectCore::new(logical_name, 0),
            default_value: value.clone(),
            value,
            scaler_unit,
        }
    }

    pub fn value(&self) -> &DataObject {
        &self.value
    }

    pub fn scaler_unit(&self) -> ScalerUnit {
        self.scaler_unit
    }
}

impl CosemObject for Register {
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
        3
    }

    fn method_count(&self) -> u8 {
        1
    }

    fn data_type(&self, index: u8) -> DlmsResult<DataObjectType> {
        match index {
            1 => Ok(DataObjectType::OctetString),
            Self::ATTR_VALUE => Ok(self.value.get_type()),
            Self::ATTR_SCALER_UNIT => Ok(DataObjectType::Structure),
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
            Self::ATTR_SCALER_UNIT => {
                self.core.check_read(index)?;
                Ok(self.scaler_unit.to_data_object())
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
            Self::ATTR_SCALER_UNIT => {
                self.core.check_write(index)?;
                // Malformed shape leaves the prior scaler-unit intact.
                let scaler_unit = ScalerUnit::from_data_object(&value)
                    .map_err(|_| AccessResultCode::ReadWriteDenied)?;
                self.scaler_unit = scaler_unit;
                Ok(())
            }
            _ => Err(AccessResultCode::ReadWriteDenied),
        }
    }

    fn invoke(
        &mut self,
        method: u8,
        _parameters: Option<&DataObject>,
    ) -> Result<Option<DataObject>, AccessResultCode> {
        match method {
            Self::METHOD_RESET => {
                self.core.check_invoke(method)?;
                self.value = self.default_value.clone();
                Ok(None)
            }
            _ => Err(AccessResultCode::ReadWriteDenied),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_register() -> Register {
        Register::new(
            ObisCode::new(1, 0, 1, 8, 0, 255),
            DataObject::Unsigned32(0),
            ScalerUnit::new(-3, 30),
        )
    }

    #[test]
    fn test_scaler_unit_wire_shape() {
        let mut register = test_register();
        let wire = register
            .get_attribute(3, &AccessSelector::All, None)
            .unwrap();
        assert_eq!(
            wire,
            DataObject::Structure(vec![DataObject::Integer8(-3), DataObject::Enumerate(30)])
        );
        assert_eq!(ScalerUnit::from_data_object(&wire).unwrap(), ScalerUnit::new(-3, 30));
    }

    #[test]
    fn test_malformed_scaler_unit_leaves_state_unchanged() {
        let mut register = test_register();
        let bad = DataObject::Structure(vec![DataObject::Integer8(0)]);
        assert_eq!(
            register.set_attribute(3, bad),
            Err(AccessResultCode::ReadWriteDenied)
        );
        assert_eq!(register.scaler_unit(), ScalerUnit::new(-3, 30));
    }

    #[test]
    fn test_reset_restores_default() {
        let mut register = test_register();
        register
            .set_attribute(2, DataObject::Unsigned32(12345))
            .unwrap();
        assert_eq!(register.invoke(1, None), Ok(None));
        assert_eq!(register.value(), &DataObject::Unsigned32(0));

        assert_eq!(
            register.invoke(2, None),
            Err(AccessResultCode::ReadWriteDenied)
        );
    }
}
