//! Access rights and protocol-level result codes

use cosem_core::{DlmsError, DlmsResult};
use std::collections::HashMap;

/// Access mode of one attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeAccess {
    NoAccess = 0,
    ReadOnly = 1,
    WriteOnly = 2,
    ReadWrite = 3,
    AuthenticatedRead = 4,
    AuthenticatedWrite = 5,
    AuthenticatedReadWrite = 6,
}

impl AttributeAccess {
    pub fn from_u8(value: u8) -> DlmsResult<Self> {
        match value {
            0 => Ok(AttributeAccess::NoAccess),
            1 => Ok(AttributeAccess::ReadOnly),
            2 => Ok(AttributeAccess::WriteOnly),
            3 => Ok(AttributeAccess::ReadWrite),
            4 => Ok(AttributeAccess::AuthenticatedRead),
            5 => Ok(AttributeAccess::AuthenticatedWrite),
            6 => Ok(AttributeAccess::AuthenticatedReadWrite),
            other => Err(DlmsError::InvalidData(format!(
                "Invalid attribute access mode {}",
                other
            ))),
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn can_read(self) -> bool {
        matches!(
            self,
            AttributeAccess::ReadOnly
                | AttributeAccess::ReadWrite
                | AttributeAccess::AuthenticatedRead
                | AttributeAccess::AuthenticatedReadWrite
        )
    }

    pub fn can_write(self) -> bool {
        matches!(
            self,
            AttributeAccess::WriteOnly
                | AttributeAccess::ReadWrite
                | AttributeAccess::AuthenticatedWrite
                | AttributeAccess::AuthenticatedReadWrite
        )
    }
}

/// Access mode of one method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodAccess {
    NoAccess = 0,
    Access = 1,
    AuthenticatedAccess = 2,
}

impl MethodAccess {
    pub fn from_u8(value: u8) -> DlmsResult<Self> {
        match value {
            0 => Ok(MethodAccess::NoAccess),
            1 => Ok(MethodAccess::Access),
            2 => Ok(MethodAccess::AuthenticatedAccess),
            other => Err(DlmsError::InvalidData(format!(
                "Invalid method access mode {}",
                other
            ))),
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn can_invoke(self) -> bool {
        !matches!(self, MethodAccess::NoAccess)
    }
}

/// Per-attribute and per-method access classification of one object.
///
/// Indices the map does not mention fall back to full access; rights
/// are narrowed through explicit management only.
#[derive(Debug, Clone, Default)]
pub struct AccessRights {
    attributes: HashMap<u8, AttributeAccess>,
    methods: HashMap<u8, MethodAccess>,
}

impl AccessRights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(&self, index: u8) -> AttributeAccess {
        self.attributes
            .get(&index)
            .copied()
            .unwrap_or(AttributeAccess::ReadWrite)
    }

    pub fn method(&self, index: u8) -> MethodAccess {
        self.methods
            .get(&index)
            .copied()
            .unwrap_or(MethodAccess::Access)
    }

    pub fn set_attribute(&mut self, index: u8, access: AttributeAccess) {
        self.attributes.insert(index, access);
    }

    pub fn set_method(&mut self, index: u8, access: MethodAccess) {
        self.methods.insert(index, access);
    }
}

/// Per-item outcome reported to the remote peer.
///
/// Returned as data from get/set/invoke, never raised: a batched
/// request keeps processing its remaining items. The numeric values
/// are the protocol's wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessResultCode {
    HardwareFault = 1,
    TemporaryFailure = 2,
    ReadWriteDenied = 3,
    ObjectUndefined = 4,
    ObjectUnavailable = 11,
    OtherReason = 250,
}

impl AccessResultCode {
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> DlmsResult<Self> {
        match value {
            1 => Ok(AccessResultCode::HardwareFault),
            2 => Ok(AccessResultCode::TemporaryFailure),
            3 => Ok(AccessResultCode::ReadWriteDenied),
            4 => Ok(AccessResultCode::ObjectUndefined),
            11 => Ok(AccessResultCode::ObjectUnavailable),
            250 => Ok(AccessResultCode::OtherReason),
            other => Err(DlmsError::InvalidData(format!(
                "Invalid access result code {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_indices_default_to_full_access() {
        let rights = AccessRights::new();
        assert_eq!(rights.attribute(2), AttributeAccess::ReadWrite);
        assert_eq!(rights.method(1), MethodAccess::Access);
    }

    #[test]
    fn test_narrowed_rights() {
        let mut rights = AccessRights::new();
        rights.set_attribute(2, AttributeAccess::ReadOnly);
        rights.set_method(1, MethodAccess::NoAccess);

        assert!(rights.attribute(2).can_read());
        assert!(!rights.attribute(2).can_write());
        assert!(!rights.method(1).can_invoke());
    }

    #[test]
    fn test_mode_round_trip() {
        for value in 0..=6 {
            assert_eq!(AttributeAccess::from_u8(value).unwrap().to_u8(), value);
        }
        assert!(AttributeAccess::from_u8(7).is_err());
        assert!(MethodAccess::from_u8(3).is_err());
    }

    #[test]
    fn test_result_code_wire_values() {
        assert_eq!(AccessResultCode::ReadWriteDenied.to_u8(), 3);
        assert_eq!(
            AccessResultCode::from_u8(11).unwrap(),
            AccessResultCode::ObjectUnavailable
        );
        assert!(AccessResultCode::from_u8(0).is_err());
    }
}
