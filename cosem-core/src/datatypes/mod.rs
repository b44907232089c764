//! Data types carried over the COSEM wire format

pub mod bit_string;
pub mod compact;
pub mod datetime;
pub mod value;

pub use bit_string::BitString;
pub use compact::{CompactArray, TypeDescription};
pub use datetime::{ClockStatus, CosemDate, CosemDateTime, CosemTime, DEVIATION_NOT_SPECIFIED};
pub use value::{DataObject, DataObjectType};
