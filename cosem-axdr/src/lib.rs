//! A-XDR value codec
//!
//! Encodes and decodes the tagged recursive value format: a one-byte
//! type tag, then a payload whose size is fully determined by the tag
//! plus an explicit count field. Includes the template-driven compact
//! array variant that omits per-row type tags.

pub mod compact;
pub mod cursor;
pub mod decoder;
pub mod encoder;
pub mod tags;

pub use cursor::ByteCursor;
pub use decoder::AxdrDecoder;
pub use encoder::AxdrEncoder;
pub use tags::AxdrTag;
