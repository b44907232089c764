//! Capture object references: the columns of a buffered object

use cosem_core::{DataObject, DlmsError, DlmsResult, ObisCode};

/// Reference to one column of a buffered object.
///
/// Names the target by class id and logical name, never by an owning
/// pointer: the same target can be a column of several buffers and
/// capture graphs may be cyclic. The attribute index must be valid for
/// the target's class; data index 0 means the whole attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureObject {
    pub class_id: u16,
    pub logical_name: ObisCode,
    pub attribute_index: i8,
    pub data_index: u16,
}

impl CaptureObject {
    pub fn new(class_id: u16, logical_name: ObisCode, attribute_index: i8) -> Self {
        Self {
            class_id,
            logical_name,
            attribute_index,
            data_index: 0,
        }
    }

    /// Wire shape used inside the capture_objects attribute
    pub fn to_data_object(&self) -> DataObject {
        DataObject::Structure(vec![
            DataObject::Unsigned16(self.class_id),
            DataObject::OctetString(self.logical_name.to_bytes().to_vec()),
            DataObject::Integer8(self.attribute_index),
            DataObject::Unsigned16(self.data_index),
        ])
    }

    pub fn from_data_object(value: &DataObject) -> DlmsResult<Self> {
        let members = value.as_structure()?;
        if members.len() != 4 {
            return Err(DlmsError::InvalidData(format!(
                "Capture object must have 4 members, got {}",
                members.len()
            )));
        }
        Ok(Self {
            class_id: members[0].as_u16()?,
            logical_name: ObisCode::from_bytes(members[1].as_octet_string()?)?,
            attribute_index: members[2].as_i8()?,
            data_index: members[3].as_u16()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape_round_trip() {
        let capture = CaptureObject {
            class_id: 8,
            logical_name: ObisCode::new(0, 0, 1, 0, 0, 255),
            attribute_index: 2,
            data_index: 0,
        };
        let wire = capture.to_data_object();
        assert_eq!(CaptureObject::from_data_object(&wire).unwrap(), capture);
    }

    #[test]
    fn test_malformed_shapes_rejected() {
        assert!(CaptureObject::from_data_object(&DataObject::Unsigned8(1)).is_err());
        let short = DataObject::Structure(vec![DataObject::Unsigned16(8)]);
        assert!(CaptureObject::from_data_object(&short).is_err());
    }
}
