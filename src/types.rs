//! Type layer for scalar expressions.
//!
//! This module provides:
//! - **SqlTypeName / TypeFamily**: type-name tags and their coarse classification
//! - **RelDataType**: immutable type descriptors with structural equality
//! - **TypeRegistry**: the owner of descriptors, able to copy descriptors
//!   created by another registry

pub mod data_type;
pub mod registry;
pub mod type_name;

pub use data_type::{RegistryId, RelDataType, RelDataTypeField, TypeKind};
pub use registry::TypeRegistry;
pub use type_name::{SqlTypeName, TypeFamily};
