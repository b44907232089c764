//! COSEM object layer
//!
//! This crate provides the dispatch contract every interface class
//! implements (attribute/method counts, read planning, typed get, set
//! and invoke with protocol-level error signalling), the access rights
//! model consulted on every operation, selective-access windowing for
//! buffered objects, and a small set of interface classes exercising
//! the contract: Data (1), Register (3), Profile Generic (7) and
//! Association LN (15).

pub mod access;
pub mod association_ln;
pub mod capture;
pub mod data;
pub mod object;
pub mod profile_generic;
pub mod register;
pub mod registry;
pub mod selective;

pub use access::{AccessResultCode, AccessRights, AttributeAccess, MethodAccess};
pub use association_ln::{AssociationLn, AssociationStatus, ObjectListEntry};
pub use capture::CaptureObject;
pub use data::Data;
pub use object::{get_attribute_list, CosemObject, ObjectCore};
pub use profile_generic::{ProfileEntry, ProfileGeneric, SortMethod};
pub use register::{Register, ScalerUnit};
pub use registry::ObjectRegistry;
pub use selective::{entry_window, AccessSelector};
