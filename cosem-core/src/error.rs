use thiserror::Error;

/// Integrity errors that abort the request being processed.
///
/// These indicate a local bug or a malformed peer: an index outside the
/// object's attribute range, a wire buffer shorter than its declared
/// length, an unknown tag. Per-attribute protocol outcomes that a peer
/// must see inside an otherwise successful response are carried by
/// `AccessResultCode` in `cosem-object` instead, never by this type.
#[derive(Error, Debug)]
pub enum DlmsError {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Security error: {0}")]
    Security(String),

    #[error("Buffer truncated: need {needed} byte(s), {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("Unexpected tag: 0x{0:02X}")]
    UnexpectedTag(u8),

    #[error("Attribute or method index out of range: {0}")]
    InvalidIndex(u8),
}

/// Result type alias used throughout the workspace
pub type DlmsResult<T> = Result<T, DlmsError>;
