//! Authentication mechanisms and MAC primitives

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes128Gcm, Key, Nonce};
use cosem_core::{DlmsError, DlmsResult};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Security control byte of an authenticated-only GMAC message
pub const SECURITY_CONTROL_AUTHENTICATED: u8 = 0x10;

/// GMAC tag length carried in HLS replies
pub const GMAC_TAG_LENGTH: usize = 12;

/// Authentication mechanism negotiated for an association
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationMechanism {
    /// No authentication
    None = 0,
    /// Low-level security (password-based)
    Low = 1,
    /// High-level security 5 (GMAC)
    Hls5Gmac = 5,
}

impl AuthenticationMechanism {
    pub fn from_u8(value: u8) -> DlmsResult<Self> {
        match value {
            0 => Ok(AuthenticationMechanism::None),
            1 => Ok(AuthenticationMechanism::Low),
            5 => Ok(AuthenticationMechanism::Hls5Gmac),
            other => Err(DlmsError::Security(format!(
                "Unsupported authentication mechanism id {}",
                other
            ))),
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Whether this mechanism runs the challenge-response handshake
    pub fn is_high_level(self) -> bool {
        matches!(self, AuthenticationMechanism::Hls5Gmac)
    }
}

/// MAC primitive the handshake computes challenge digests with.
///
/// The key context (system title) and frame counter are only meaningful
/// for GMAC; shared-secret implementations ignore them.
pub trait ChallengeMac {
    fn compute(
        &self,
        system_title: &[u8; 8],
        frame_counter: u32,
        challenge: &[u8],
    ) -> DlmsResult<Vec<u8>>;
}

/// GMAC over a challenge, shaped as a full HLS reply.
///
/// The cipher runs AES-128-GCM with an empty message: the IV is the
/// system title followed by the frame counter, the additional data is
/// the security control byte, the authentication key and the challenge.
/// Output is SC || frame counter || 12-byte tag.
pub struct GmacChallenge {
    cipher_key: [u8; 16],
    authentication_key: Vec<u8>,
}

impl GmacChallenge {
    pub fn new(cipher_key: [u8; 16], authentication_key: &[u8]) -> Self {
        Self {
            cipher_key,
            authentication_key: authentication_key.to_vec(),
        }
    }
}

impl ChallengeMac for GmacChallenge {
    fn compute(
        &self,
        system_title: &[u8; 8],
        frame_counter: u32,
        challenge: &[u8],
    ) -> DlmsResult<Vec<u8>> {
        let key = Key::<Aes128Gcm>::from_slice(&self.cipher_key);
        let cipher = Aes128Gcm::new(key);

        let mut iv = [0u8; 12];
        iv[..8].copy_from_slice(system_title);
        iv[8..].copy_from_slice(&frame_counter.to_be_bytes());
        let nonce = Nonce::from_slice(&iv);

        let mut aad = Vec::with_capacity(1 + self.authentication_key.len() + challenge.len());
        aad.push(SECURITY_CONTROL_AUTHENTICATED);
        aad.extend_from_slice(&self.authentication_key);
        aad.extend_from_slice(challenge);

        // Empty message: the ciphertext is the 16-byte tag alone.
        let payload = Payload { msg: &[], aad: &aad };
        let tag = cipher
            .encrypt(nonce, payload)
            .map_err(|e| DlmsError::Security(format!("GMAC computation failed: {}", e)))?;

        let mut reply = Vec::with_capacity(5 + GMAC_TAG_LENGTH);
        reply.push(SECURITY_CONTROL_AUTHENTICATED);
        reply.extend_from_slice(&frame_counter.to_be_bytes());
        reply.extend_from_slice(&tag[..GMAC_TAG_LENGTH]);
        Ok(reply)
    }
}

/// HMAC-SHA-256 over a challenge keyed by a static shared secret.
///
/// Used by the non-GMAC mechanisms; system title and frame counter are
/// ignored.
pub struct SecretMac {
    secret: Vec<u8>,
}

impl SecretMac {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            secret: secret.to_vec(),
        }
    }
}

impl ChallengeMac for SecretMac {
    fn compute(
        &self,
        _system_title: &[u8; 8],
        _frame_counter: u32,
        challenge: &[u8],
    ) -> DlmsResult<Vec<u8>> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.secret)
            .map_err(|e| DlmsError::Security(format!("Failed to create HMAC: {}", e)))?;
        mac.update(challenge);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

/// Compare two byte strings without early exit on the first mismatch.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
