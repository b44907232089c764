//! Association LN interface class (Class ID: 15)
//!
//! The association object is how a client learns what the server
//! exposes and where the HLS handshake completes: method 1 receives
//! the peer's challenge response and, on success, flips the
//! association to associated and returns the completion payload the
//! transport sends back.
//!
//! # Attributes
//!
//! - Attribute 1: logical_name (OBIS code, commonly 0.0.40.0.0.255)
//! - Attribute 2: object_list - what this association exposes
//! - Attribute 3: association_status
//! - Attribute 4: authentication mechanism id (version 1 and later)
//!
//! # Methods
//!
//! - Method 1: reply_to_hls_authentication(peer response octet string)

use crate::access::AccessResultCode;
use crate::object::{CosemObject, ObjectCore};
use crate::selective::AccessSelector;
use cosem_core::{DataObject, DataObjectType, DlmsError, DlmsResult, ObisCode};
use cosem_security::{AuthenticationMechanism, HandshakeState, HlsAuthenticator};
use log::{info, warn};

/// Where the association stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationStatus {
    NonAssociated = 0,
    AssociationPending = 1,
    Associated = 2,
}

impl AssociationStatus {
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// One exposed object in the association's object list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectListEntry {
    pub class_id: u16,
    pub version: u8,
    pub logical_name: ObisCode,
}

impl ObjectListEntry {
    pub fn new(class_id: u16, version: u8, logical_name: ObisCode) -> Self {
        Self {
            class_id,
            version,
            logical_name,
        }
    }

    pub fn to_data_object(&self) -> DataObject {
        DataObject::Structure(vec![
            DataObject::Unsigned16(self.class_id),
            DataObject::Unsigned8(self.version),
            DataObject::OctetString(self.logical_name.to_bytes().to_vec()),
        ])
    }
}

pub struct AssociationLn {
    core: ObjectCore,
    object_list: Vec<ObjectListEntry>,
    status: AssociationStatus,
    mechanism: AuthenticationMechanism,
    authenticator: HlsAuthenticator,
    // CtoS, held from association setup until the handshake completes
    client_challenge: Vec<u8>,
}

impl AssociationLn {
    pub const CLASS_ID: u16 = 15;

    pub const ATTR_OBJECT_LIST: u8 = 2;
    pub const ATTR_ASSOCIATION_STATUS: u8 = 3;
    pub const ATTR_MECHANISM_ID: u8 = 4;

    pub const METHOD_REPLY_TO_HLS: u8 = 1;

    pub fn new(
        logical_name: ObisCode,
        version: u8,
        mechanism: AuthenticationMechanism,
        authenticator: HlsAuthenticator,
    ) -> Self {
        Self {
            core: ObjectCore::new(logical_name, version),
            object_list: Vec::new(),
            status: AssociationStatus::NonAssociated,
            mechanism,
            authenticator,
            client_challenge: Vec::new(),
        }
    }

    pub fn status(&self) -> AssociationStatus {
        self.status
    }

    /// Connected flag the transport consults before serving requests.
    pub fn is_associated(&self) -> bool {
        self.status == AssociationStatus::Associated
    }

    pub fn object_list(&self) -> &[ObjectListEntry] {
        &self.object_list
    }

    pub fn add_object(&mut self, entry: ObjectListEntry) {
        self.object_list.push(entry);
    }

    /// Start the handshake when the association request arrives.
    ///
    /// Stores the client's challenge and issues the server challenge
    /// returned to the peer. Non-HLS mechanisms skip the handshake and
    /// associate immediately.
    pub fn begin_association(
        &mut self,
        client_challenge: &[u8],
        server_challenge_length: usize,
    ) -> DlmsResult<Option<Vec<u8>>> {
        self.core.clear_read_flags();
        if !self.mechanism.is_high_level() {
            self.status = AssociationStatus::Associated;
            return Ok(None);
        }
        self.client_challenge = client_challenge.to_vec();
        self.authenticator.reset();
        let challenge = self.authenticator.issue_challenge(server_challenge_length)?;
        self.status = AssociationStatus::AssociationPending;
        Ok(Some(challenge))
    }

    /// Tear the association down, back to the unauthenticated state.
    pub fn release(&mut self) {
        self.status = AssociationStatus::NonAssociated;
        self.authenticator.reset();
        self.client_challenge.clear();
    }
}

impl CosemObject for AssociationLn {
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
        // Version 1 added the mechanism id attribute.
        if self.core.version() >= 1 {
            4
        } else {
            3
        }
    }

    fn method_count(&self) -> u8 {
        1
    }

    fn data_type(&self, index: u8) -> DlmsResult<DataObjectType> {
        if index == 0 || index > self.attribute_count() {
            return Err(DlmsError::InvalidIndex(index));
        }
        Ok(match index {
            1 => DataObjectType::OctetString,
            Self::ATTR_OBJECT_LIST => DataObjectType::Array,
            Self::ATTR_ASSOCIATION_STATUS => DataObjectType::Enumerate,
            _ => DataObjectType::Enumerate,
        })
    }

    fn get_attribute(
        &mut self,
        index: u8,
        _selector: &AccessSelector,
        _parameters: Option<&DataObject>,
    ) -> Result<DataObject, AccessResultCode> {
        if index != 1 && index <= self.attribute_count() {
            self.core.check_read(index)?;
        }
        match index {
            1 => Ok(self.core.read_logical_name()),
            Self::ATTR_OBJECT_LIST => Ok(DataObject::Array(
                self.object_list
                    .iter()
                    .map(ObjectListEntry::to_data_object)
                    .collect(),
            )),
            Self::ATTR_ASSOCIATION_STATUS => Ok(DataObject::Enumerate(self.status.to_u8())),
            Self::ATTR_MECHANISM_ID if self.core.version() >= 1 => {
                Ok(DataObject::Enumerate(self.mechanism.to_u8()))
            }
            _ => Err(AccessResultCode::ReadWriteDenied),
        }
    }

    fn set_attribute(&mut self, _index: u8, _value: DataObject) -> Result<(), AccessResultCode> {
        // Association state is negotiated, not written.
        Err(AccessResultCode::ReadWriteDenied)
    }

    fn invoke(
        &mut self,
        method: u8,
        parameters: Option<&DataObject>,
    ) -> Result<Option<DataObject>, AccessResultCode> {
        match method {
            Self::METHOD_REPLY_TO_HLS => {
                self.core.check_invoke(method)?;
                let response = parameters
                    .ok_or(AccessResultCode::ReadWriteDenied)?
                    .as_octet_string()
                    .map_err(|_| AccessResultCode::ReadWriteDenied)?;

                if self.authenticator.state() != HandshakeState::ChallengeIssued {
                    return Err(AccessResultCode::ReadWriteDenied);
                }
                let payload = self
                    .authenticator
                    .verify_response(&self.client_challenge, response)
                    .map_err(|_| AccessResultCode::OtherReason)?;
                match payload {
                    Some(payload) => {
                        self.status = AssociationStatus::Associated;
                        info!("Association {} authenticated", self.core.logical_name());
                        Ok(Some(DataObject::OctetString(payload)))
                    }
                    None => {
                        self.status = AssociationStatus::NonAssociated;
                        warn!("Association {} rejected", self.core.logical_name());
                        Err(AccessResultCode::ReadWriteDenied)
                    }
                }
            }
            _ => Err(AccessResultCode::ReadWriteDenied),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosem_security::{ChallengeMac, SecretMac};

    fn hls_association() -> AssociationLn {
        let authenticator = HlsAuthenticator::new(
            AuthenticationMechanism::Hls5Gmac,
            Box::new(SecretMac::new(b"shared secret")),
            *b"SERVER01",
            7,
            *b"CLIENT01",
        );
        AssociationLn::new(
            ObisCode::new(0, 0, 40, 0, 0, 255),
            1,
            AuthenticationMechanism::Hls5Gmac,
            authenticator,
        )
    }

    #[test]
    fn test_successful_handshake_flips_connected_flag() {
        let mut association = hls_association();
        let server_challenge = association
            .begin_association(b"CtoS-challenge", 16)
            .unwrap()
            .unwrap();
        assert_eq!(association.status(), AssociationStatus::AssociationPending);

        let response = SecretMac::new(b"shared secret")
            .compute(b"CLIENT01", 0, &server_challenge)
            .unwrap();
        let reply = association
            .invoke(1, Some(&DataObject::OctetString(response)))
            .unwrap();

        assert!(association.is_associated());
        assert!(matches!(reply, Some(DataObject::OctetString(bytes)) if !bytes.is_empty()));
    }

    #[test]
    fn test_failed_handshake_is_terminal() {
        let mut association = hls_association();
        let server_challenge = association
            .begin_association(b"CtoS-challenge", 16)
            .unwrap()
            .unwrap();

        let mut response = SecretMac::new(b"shared secret")
            .compute(b"CLIENT01", 0, &server_challenge)
            .unwrap();
        response[3] ^= 0x80;

        assert_eq!(
            association.invoke(1, Some(&DataObject::OctetString(response.clone()))),
            Err(AccessResultCode::ReadWriteDenied)
        );
        assert!(!association.is_associated());

        // The attempt is over; the same method cannot be retried.
        assert_eq!(
            association.invoke(1, Some(&DataObject::OctetString(response))),
            Err(AccessResultCode::ReadWriteDenied)
        );

        // A fresh attempt starts over from the beginning.
        association.release();
        assert!(association.begin_association(b"CtoS-challenge", 16).is_ok());
    }

    #[test]
    fn test_low_mechanism_skips_handshake() {
        let authenticator = HlsAuthenticator::new(
            AuthenticationMechanism::Low,
            Box::new(SecretMac::new(b"password")),
            *b"SERVER01",
            0,
            *b"CLIENT01",
        );
        let mut association = AssociationLn::new(
            ObisCode::new(0, 0, 40, 0, 0, 255),
            1,
            AuthenticationMechanism::Low,
            authenticator,
        );
        assert_eq!(association.begin_association(&[], 16).unwrap(), None);
        assert!(association.is_associated());
    }

    #[test]
    fn test_attributes_and_version_surface() {
        let mut association = hls_association();
        association.add_object(ObjectListEntry::new(1, 0, ObisCode::new(0, 0, 96, 1, 0, 255)));

        assert_eq!(association.attribute_count(), 4);
        assert_eq!(
            association.get_attribute(3, &AccessSelector::All, None),
            Ok(DataObject::Enumerate(0))
        );
        assert_eq!(
            association.get_attribute(4, &AccessSelector::All, None),
            Ok(DataObject::Enumerate(5))
        );
        let list = association
            .get_attribute(2, &AccessSelector::All, None)
            .unwrap();
        assert_eq!(list.as_array().unwrap().len(), 1);

        assert_eq!(
            association.set_attribute(3, DataObject::Enumerate(2)),
            Err(AccessResultCode::ReadWriteDenied)
        );
    }

    #[test]
    fn test_malformed_reply_parameter() {
        let mut association = hls_association();
        association.begin_association(b"CtoS", 16).unwrap();

        assert_eq!(
            association.invoke(1, None),
            Err(AccessResultCode::ReadWriteDenied)
        );
        assert_eq!(
            association.invoke(1, Some(&DataObject::Unsigned8(1))),
            Err(AccessResultCode::ReadWriteDenied)
        );
        // Parameter probing must not consume the handshake attempt.
        assert_eq!(
            association.status(),
            AssociationStatus::AssociationPending
        );
    }
}
