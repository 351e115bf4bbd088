//! Scalar expression substrate for a SQL query optimizer.
//!
//! - [`types`]: type descriptors and the registries that own them
//! - [`rex`]: expression trees, shuttles, the builder and the cross-registry copier
//! - [`runtime`]: enumerators and row cursors

pub mod rex;
pub mod runtime;
pub mod types;

pub use rex::{RexBuilder, RexCopier, RexError, RexNode, RexResult, RexShuttle};
pub use types::{RelDataType, TypeRegistry};
