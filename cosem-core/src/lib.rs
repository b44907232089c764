//! Core types for the COSEM object system
//!
//! This crate provides the recursive value model, OBIS codes, date/time
//! formats and the error type shared by the codec, object and security
//! layers.

pub mod error;
pub mod obis_code;
pub mod datatypes;

pub use error::{DlmsError, DlmsResult};
pub use obis_code::ObisCode;
pub use datatypes::{DataObject, DataObjectType};
