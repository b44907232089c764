//! Challenge-response handshake state machine
//!
//! One authenticator instance serves one association attempt. The
//! server issues a random challenge, the peer answers with a MAC over
//! it, and a matching answer flips the association to connected. A
//! failed attempt is terminal; the caller starts over from idle.

use crate::authentication::{constant_time_eq, AuthenticationMechanism, ChallengeMac};
use cosem_core::{DlmsError, DlmsResult};
use log::{debug, warn};
use rand::RngCore;

const MIN_CHALLENGE_LENGTH: usize = 8;
const MAX_CHALLENGE_LENGTH: usize = 64;

/// Where an association attempt currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// No challenge outstanding
    Idle,
    /// Server challenge sent, waiting for the peer's response
    ChallengeIssued,
    /// Peer response verified, association authenticated
    Connected,
    /// Peer response did not verify; terminal for this attempt
    Rejected,
}

/// HLS challenge-response authenticator.
///
/// The MAC primitive is injected so GMAC and shared-secret mechanisms
/// drive the same state machine.
pub struct HlsAuthenticator {
    mechanism: AuthenticationMechanism,
    mac: Box<dyn ChallengeMac + Send>,
    local_system_title: [u8; 8],
    local_frame_counter: u32,
    peer_system_title: [u8; 8],
    state: HandshakeState,
    server_challenge: Option<Vec<u8>>,
}

impl HlsAuthenticator {
    pub fn new(
        mechanism: AuthenticationMechanism,
        mac: Box<dyn ChallengeMac + Send>,
        local_system_title: [u8; 8],
        local_frame_counter: u32,
        peer_system_title: [u8; 8],
    ) -> Self {
        Self {
            mechanism,
            mac,
            local_system_title,
            local_frame_counter,
            peer_system_title,
            state: HandshakeState::Idle,
            server_challenge: None,
        }
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == HandshakeState::Connected
    }

    /// Issue a fresh random server challenge and arm the handshake.
    ///
    /// Only valid from idle; challenge length must be 8 to 64 bytes.
    pub fn issue_challenge(&mut self, length: usize) -> DlmsResult<Vec<u8>> {
        if self.state != HandshakeState::Idle {
            return Err(DlmsError::Security(format!(
                "Cannot issue a challenge in state {:?}",
                self.state
            )));
        }
        if !(MIN_CHALLENGE_LENGTH..=MAX_CHALLENGE_LENGTH).contains(&length) {
            return Err(DlmsError::Security(format!(
                "Challenge length {} outside {}..={}",
                length, MIN_CHALLENGE_LENGTH, MAX_CHALLENGE_LENGTH
            )));
        }

        let mut challenge = vec![0u8; length];
        rand::thread_rng().fill_bytes(&mut challenge);
        self.server_challenge = Some(challenge.clone());
        self.state = HandshakeState::ChallengeIssued;
        debug!("Issued {}-byte server challenge", length);
        Ok(challenge)
    }

    /// Verify the peer's response to the outstanding server challenge.
    ///
    /// `client_challenge` is the challenge the peer issued to us; on a
    /// match it is answered in the returned completion payload, computed
    /// with the local system title and local frame counter. A mismatch
    /// is terminal: the state moves to rejected and no payload is
    /// returned.
    pub fn verify_response(
        &mut self,
        client_challenge: &[u8],
        response: &[u8],
    ) -> DlmsResult<Option<Vec<u8>>> {
        if self.state != HandshakeState::ChallengeIssued {
            return Err(DlmsError::Security(format!(
                "No challenge outstanding, state is {:?}",
                self.state
            )));
        }
        let server_challenge = self
            .server_challenge
            .take()
            .ok_or_else(|| DlmsError::Security("Server challenge missing".to_string()))?;

        let expected = match self.peer_frame_counter(response) {
            Some(frame_counter) => {
                self.mac
                    .compute(&self.peer_system_title, frame_counter, &server_challenge)?
            }
            None => {
                warn!("Peer response too short to carry a frame counter");
                self.state = HandshakeState::Rejected;
                return Ok(None);
            }
        };

        if !constant_time_eq(&expected, response) {
            warn!("Peer challenge response did not verify");
            self.state = HandshakeState::Rejected;
            return Ok(None);
        }

        let payload = self.mac.compute(
            &self.local_system_title,
            self.local_frame_counter,
            client_challenge,
        )?;
        self.state = HandshakeState::Connected;
        debug!("Association authenticated");
        Ok(Some(payload))
    }

    /// Abandon the current attempt and return to idle.
    pub fn reset(&mut self) {
        self.state = HandshakeState::Idle;
        self.server_challenge = None;
    }

    /// Frame counter governing the peer's MAC.
    ///
    /// GMAC responses carry it in bytes 1..5 after the security control
    /// byte; other mechanisms do not use one. `None` means the response
    /// cannot be parsed at all.
    fn peer_frame_counter(&self, response: &[u8]) -> Option<u32> {
        if !self.mechanism.is_high_level() {
            return Some(0);
        }
        if response.len() < 5 {
            return None;
        }
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&response[1..5]);
        Some(u32::from_be_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authentication::{GmacChallenge, SecretMac};

    fn secret_authenticator() -> HlsAuthenticator {
        HlsAuthenticator::new(
            AuthenticationMechanism::Low,
            Box::new(SecretMac::new(b"shared secret")),
            *b"SERVER01",
            7,
            *b"CLIENT01",
        )
    }

    #[test]
    fn test_shared_secret_handshake_connects() {
        let mut auth = secret_authenticator();
        let server_challenge = auth.issue_challenge(8).unwrap();
        assert_eq!(auth.state(), HandshakeState::ChallengeIssued);

        let peer_mac = SecretMac::new(b"shared secret");
        let response = peer_mac.compute(b"CLIENT01", 0, &server_challenge).unwrap();

        let payload = auth.verify_response(b"client challenge", &response).unwrap();
        assert_eq!(auth.state(), HandshakeState::Connected);
        assert!(auth.is_connected());
        let payload = payload.unwrap();
        assert!(!payload.is_empty());

        // The completion payload answers the client's challenge.
        let expected = SecretMac::new(b"shared secret")
            .compute(b"SERVER01", 7, b"client challenge")
            .unwrap();
        assert_eq!(payload, expected);
    }

    #[test]
    fn test_single_bit_flip_rejects() {
        let mut auth = secret_authenticator();
        let server_challenge = auth.issue_challenge(8).unwrap();

        let peer_mac = SecretMac::new(b"shared secret");
        let mut response = peer_mac.compute(b"CLIENT01", 0, &server_challenge).unwrap();
        response[0] ^= 0x01;

        let payload = auth.verify_response(b"client challenge", &response).unwrap();
        assert!(payload.is_none());
        assert_eq!(auth.state(), HandshakeState::Rejected);

        // Terminal: a second verify is a state error, not a retry.
        assert!(auth.verify_response(b"client challenge", &response).is_err());
    }

    #[test]
    fn test_gmac_handshake_uses_peer_counter_from_response() {
        let cipher_key = [0x42; 16];
        let auth_key = [0x24; 16];
        let mut auth = HlsAuthenticator::new(
            AuthenticationMechanism::Hls5Gmac,
            Box::new(GmacChallenge::new(cipher_key, &auth_key)),
            *b"SERVER01",
            100,
            *b"CLIENT01",
        );
        let server_challenge = auth.issue_challenge(16).unwrap();

        // Peer computes with its own title and its own counter; ours
        // only learns the counter from the response itself.
        let peer_mac = GmacChallenge::new(cipher_key, &auth_key);
        let response = peer_mac.compute(b"CLIENT01", 31, &server_challenge).unwrap();

        let payload = auth.verify_response(b"CtoS-challenge", &response).unwrap();
        assert_eq!(auth.state(), HandshakeState::Connected);

        let expected = GmacChallenge::new(cipher_key, &auth_key)
            .compute(b"SERVER01", 100, b"CtoS-challenge")
            .unwrap();
        assert_eq!(payload.unwrap(), expected);
    }

    #[test]
    fn test_short_gmac_response_rejects() {
        let mut auth = HlsAuthenticator::new(
            AuthenticationMechanism::Hls5Gmac,
            Box::new(GmacChallenge::new([0; 16], &[0; 16])),
            *b"SERVER01",
            1,
            *b"CLIENT01",
        );
        auth.issue_challenge(8).unwrap();
        let payload = auth.verify_response(b"x", &[0x10, 0x00]).unwrap();
        assert!(payload.is_none());
        assert_eq!(auth.state(), HandshakeState::Rejected);
    }

    #[test]
    fn test_challenge_length_and_state_guards() {
        let mut auth = secret_authenticator();
        assert!(auth.issue_challenge(4).is_err());
        assert!(auth.issue_challenge(65).is_err());

        auth.issue_challenge(64).unwrap();
        assert!(auth.issue_challenge(8).is_err());

        auth.reset();
        assert_eq!(auth.state(), HandshakeState::Idle);
        assert!(auth.issue_challenge(8).is_ok());
    }

    #[test]
    fn test_verify_without_challenge_is_an_error() {
        let mut auth = secret_authenticator();
        assert!(auth.verify_response(b"c", b"r").is_err());
    }
}
