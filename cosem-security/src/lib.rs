//! High-level security (HLS) for the COSEM object system
//!
//! This crate provides the challenge-response authentication used to
//! establish an association: the MAC primitives (GMAC and shared-secret
//! HMAC) and the handshake state machine driven by the association
//! object's authentication method.

pub mod authentication;
pub mod handshake;

pub use authentication::{
    constant_time_eq, AuthenticationMechanism, ChallengeMac, GmacChallenge, SecretMac,
};
pub use handshake::{HandshakeState, HlsAuthenticator};
