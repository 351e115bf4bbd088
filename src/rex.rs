//! Scalar expression layer.
//!
//! This module provides:
//! - **RexNode**: immutable expression trees (literals, references, calls,
//!   field accesses, windowed calls)
//! - **RexShuttle**: double-dispatch rewriting with identity or rejecting defaults
//! - **RexBuilder**: the validated factory for every node
//! - **RexCopier**: deep copy of a tree into another type registry
//!
//! ```
//! use std::sync::Arc;
//! use viberex::rex::{std_ops, RexBuilder};
//! use viberex::types::TypeRegistry;
//!
//! let source = RexBuilder::new(Arc::new(TypeRegistry::new()));
//! let sum = source
//!     .make_call_inferred(
//!         std_ops::PLUS,
//!         vec![source.make_exact_literal(1)?, source.make_exact_literal(2)?],
//!     )?;
//!
//! let target = RexBuilder::new(Arc::new(TypeRegistry::new()));
//! let copied = target.copy(&sum)?;
//! assert_eq!(copied, sum);
//! assert!(target.type_registry().owns(copied.data_type()));
//! # Ok::<(), viberex::rex::RexError>(())
//! ```

pub mod builder;
pub mod copier;
pub mod error;
pub mod node;
pub mod operator;
pub mod shift;
pub mod shuttle;
pub mod value;
pub mod window;

pub use builder::{BuilderConfig, RexBuilder, DEFAULT_MAX_NESTING_DEPTH};
pub use copier::RexCopier;
pub use error::{RexError, RexResult};
pub use node::{
    CorrelationId, RexCall, RexCorrelVariable, RexDynamicParam, RexFieldAccess, RexInputRef,
    RexKind, RexLiteral, RexLocalRef, RexNode, RexOver, RexRangeRef,
};
pub use operator::{
    std_ops, OperandCount, OperandTypes, ReturnTypeRule, SqlKind, SqlOperator,
};
pub use shift::InputShifter;
pub use shuttle::{DefaultPolicy, RexShuttle};
pub use value::Value;
pub use window::{NullDirection, RexFieldCollation, RexWindow, RexWindowBound, SortDirection};
