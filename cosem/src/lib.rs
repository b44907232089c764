//! COSEM object system core
//!
//! Re-exports the workspace crates behind one entry point:
//!
//! - `cosem-core`: value model, OBIS codes, date/time formats, errors
//! - `cosem-axdr`: the tagged binary value codec and its compact array form
//! - `cosem-object`: the dispatch contract, access rights, selective
//!   access and the interface classes
//! - `cosem-security`: the HLS challenge-response authenticator
//!
//! Transport framing and the application-layer PDUs live outside this
//! core; they drive it one decoded request at a time.

pub use cosem_axdr as axdr;
pub use cosem_core as core;
pub use cosem_object as object;
pub use cosem_security as security;

pub use cosem_core::{DataObject, DataObjectType, DlmsError, DlmsResult, ObisCode};
pub use cosem_axdr::{AxdrDecoder, AxdrEncoder};
pub use cosem_object::{AccessResultCode, AccessSelector, CosemObject};
pub use cosem_security::{HandshakeState, HlsAuthenticator};
