//! Validated construction of expression nodes.

use crate::rex::copier::RexCopier;
use crate::rex::error::{RexError, RexResult};
use crate::rex::node::{
    CorrelationId, RexCall, RexCorrelVariable, RexDynamicParam, RexFieldAccess, RexInputRef,
    RexLiteral, RexLocalRef, RexNode, RexOver, RexRangeRef,
};
use crate::rex::operator::SqlOperator;
use crate::rex::value::Value;
use crate::rex::window::{RexWindow, RexWindowBound};
use crate::types::{RelDataType, SqlTypeName, TypeFamily, TypeRegistry};
use log::trace;
use std::sync::Arc;

/// Default limit on expression nesting depth
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 256;

/// Builder configuration.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Deepest expression tree the builder will construct.
    pub max_nesting_depth: usize,
    /// Re-derive call result types and reject mismatching ones.
    pub strict_call_types: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        BuilderConfig {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            strict_call_types: false,
        }
    }
}

impl BuilderConfig {
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn with_strict_call_types(mut self, strict: bool) -> Self {
        self.strict_call_types = strict;
        self
    }
}

/// Factory for expression nodes.
///
/// Every node is created here, after its operands, types and indexes have
/// been validated. A builder is bound to one [`TypeRegistry`]; shuttles that
/// need new types (such as [`RexCopier`]) request them through
/// [`RexBuilder::type_registry`].
pub struct RexBuilder {
    registry: Arc<TypeRegistry>,
    config: BuilderConfig,
}

impl RexBuilder {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_config(registry, BuilderConfig::default())
    }

    pub fn with_config(registry: Arc<TypeRegistry>, config: BuilderConfig) -> Self {
        Self { registry, config }
    }

    pub fn type_registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Create a literal.
    ///
    /// The value must have the shape `type_name` requires, `type_name` must
    /// belong to the family of `ty`, and NULL requires a nullable type.
    pub fn make_literal(
        &self,
        value: Value,
        ty: &RelDataType,
        type_name: SqlTypeName,
    ) -> RexResult<RexNode> {
        let consistent = type_name.accepts(&value)
            && ty.family().admits(type_name.family())
            && (!value.is_null() || ty.is_nullable());
        if !consistent {
            return Err(RexError::InvalidLiteral {
                value: value.to_string(),
                type_name,
                type_digest: ty.digest(),
            });
        }
        Ok(RexNode::Literal(Arc::new(RexLiteral::new(
            value,
            ty.clone(),
            type_name,
        ))))
    }

    pub fn make_bool_literal(&self, value: bool) -> RexResult<RexNode> {
        let ty = self.registry.create_sql_type(SqlTypeName::Boolean);
        self.make_literal(Value::Boolean(value), &ty, SqlTypeName::Boolean)
    }

    /// Create an INTEGER literal, or BIGINT when the value needs 64 bits
    pub fn make_exact_literal(&self, value: i64) -> RexResult<RexNode> {
        match i32::try_from(value) {
            Ok(small) => {
                let ty = self.registry.create_sql_type(SqlTypeName::Integer);
                self.make_literal(Value::Int32(small), &ty, SqlTypeName::Integer)
            }
            Err(_) => {
                let ty = self.registry.create_sql_type(SqlTypeName::BigInt);
                self.make_literal(Value::Int64(value), &ty, SqlTypeName::BigInt)
            }
        }
    }

    /// Create a `CHAR(n)` literal where `n` is the character count
    pub fn make_char_literal(&self, value: impl Into<String>) -> RexResult<RexNode> {
        let value = value.into();
        let count = value.chars().count();
        let length = char_precision(count).ok_or_else(|| RexError::InvalidLiteral {
            value: format!("<{} characters>", count),
            type_name: SqlTypeName::Char,
            type_digest: SqlTypeName::Char.to_string(),
        })?;
        let ty = self
            .registry
            .create_sql_type_with_precision(SqlTypeName::Char, Some(length), None);
        self.make_literal(Value::String(value), &ty, SqlTypeName::Char)
    }

    /// Create a typed NULL
    pub fn make_null_literal(&self, type_name: SqlTypeName) -> RexResult<RexNode> {
        let ty = self.registry.create_sql_type(type_name);
        let ty = self.registry.create_type_with_nullability(&ty, true);
        self.make_literal(Value::Null, &ty, type_name)
    }

    pub fn make_input_ref(&self, ty: RelDataType, index: usize) -> RexResult<RexNode> {
        Ok(RexNode::InputRef(Arc::new(RexInputRef::new(index, ty))))
    }

    pub fn make_local_ref(&self, ty: RelDataType, index: usize) -> RexResult<RexNode> {
        Ok(RexNode::LocalRef(Arc::new(RexLocalRef::new(index, ty))))
    }

    pub fn make_correl(&self, ty: RelDataType, id: CorrelationId) -> RexResult<RexNode> {
        Ok(RexNode::CorrelVariable(Arc::new(RexCorrelVariable::new(
            id, ty,
        ))))
    }

    pub fn make_dynamic_param(&self, ty: RelDataType, index: usize) -> RexResult<RexNode> {
        Ok(RexNode::DynamicParam(Arc::new(RexDynamicParam::new(
            index, ty,
        ))))
    }

    /// Reference the input fields starting at `offset`; `row_type` must be a
    /// row type listing the referenced fields
    pub fn make_range_ref(&self, row_type: RelDataType, offset: usize) -> RexResult<RexNode> {
        if !row_type.is_struct() {
            return Err(RexError::InvalidFieldIndex {
                index: offset,
                field_count: 0,
                type_digest: row_type.digest(),
            });
        }
        Ok(RexNode::RangeRef(Arc::new(RexRangeRef::new(offset, row_type))))
    }

    /// Create a call with an already-resolved result type.
    ///
    /// Operands are validated against the operator's signature. The result
    /// type is trusted unless `strict_call_types` is configured.
    pub fn make_call(
        &self,
        ty: RelDataType,
        op: SqlOperator,
        operands: Vec<RexNode>,
    ) -> RexResult<RexNode> {
        let operand_types = operand_types(&operands);
        op.check_operands(&operand_types)?;
        if self.config.strict_call_types {
            self.check_result_type(&op, &operand_types, &ty)?;
        }
        let call = RexCall::new(ty, op, operands);
        self.check_depth(call.depth())?;
        trace!("make_call: {} as {}", call.operator(), call.data_type());
        Ok(RexNode::Call(Arc::new(call)))
    }

    /// Create a call whose result type is derived from the operator
    pub fn make_call_inferred(&self, op: SqlOperator, operands: Vec<RexNode>) -> RexResult<RexNode> {
        let operand_types = operand_types(&operands);
        op.check_operands(&operand_types)?;
        let ty = op
            .infer_return_type(&self.registry, &operand_types)
            .ok_or_else(|| RexError::InvalidOperatorUse {
                operator: op.name().to_string(),
                reason: "result type cannot be inferred; supply it explicitly".to_string(),
            })?;
        let call = RexCall::new(ty, op, operands);
        self.check_depth(call.depth())?;
        Ok(RexNode::Call(Arc::new(call)))
    }

    /// Access field `index` of a row-typed expression
    pub fn make_field_access(&self, expr: RexNode, index: usize) -> RexResult<RexNode> {
        let ty = expr.data_type();
        let field = ty
            .field(index)
            .cloned()
            .ok_or_else(|| RexError::InvalidFieldIndex {
                index,
                field_count: ty.field_count(),
                type_digest: ty.digest(),
            })?;
        self.check_depth(expr.depth() + 1)?;
        Ok(RexNode::FieldAccess(Arc::new(RexFieldAccess::new(
            expr, field,
        ))))
    }

    /// Access a field of a row-typed expression by name
    pub fn make_field_access_by_name(&self, expr: RexNode, name: &str) -> RexResult<RexNode> {
        let index = expr
            .data_type()
            .field_by_name(name)
            .map(|f| f.index())
            .ok_or_else(|| RexError::UnknownField {
                name: name.to_string(),
                type_digest: expr.data_type().digest(),
            })?;
        self.make_field_access(expr, index)
    }

    /// Create a windowed aggregate call
    pub fn make_over(
        &self,
        ty: RelDataType,
        op: SqlOperator,
        operands: Vec<RexNode>,
        window: RexWindow,
    ) -> RexResult<RexNode> {
        if !op.is_aggregate() {
            return Err(RexError::InvalidOperatorUse {
                operator: op.name().to_string(),
                reason: "not an aggregate function; cannot be used with OVER".to_string(),
            });
        }
        let operand_types = operand_types(&operands);
        op.check_operands(&operand_types)?;
        if self.config.strict_call_types {
            self.check_result_type(&op, &operand_types, &ty)?;
        }
        check_window(&window)?;
        let over = RexOver::new(ty, op, operands, window);
        self.check_depth(over.depth())?;
        Ok(RexNode::Over(Arc::new(over)))
    }

    /// Deep-copy an expression into this builder's type registry
    pub fn copy(&self, node: &RexNode) -> RexResult<RexNode> {
        RexCopier::new(self).copy(node)
    }

    fn check_result_type(
        &self,
        op: &SqlOperator,
        operand_types: &[RelDataType],
        ty: &RelDataType,
    ) -> RexResult<()> {
        match op.infer_return_type(&self.registry, operand_types) {
            Some(inferred) if inferred != *ty => Err(RexError::InvalidOperatorUse {
                operator: op.name().to_string(),
                reason: format!("result type {} does not match derived type {}", ty, inferred),
            }),
            _ => Ok(()),
        }
    }

    fn check_depth(&self, depth: usize) -> RexResult<()> {
        if depth > self.config.max_nesting_depth {
            return Err(RexError::NestingTooDeep {
                depth,
                limit: self.config.max_nesting_depth,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for RexBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RexBuilder")
            .field("registry", &self.registry.id())
            .field("config", &self.config)
            .finish()
    }
}

/// CHAR precision for a string of `length` characters, if representable
fn char_precision(length: usize) -> Option<u32> {
    u32::try_from(length).ok()
}

fn operand_types(operands: &[RexNode]) -> Vec<RelDataType> {
    operands.iter().map(|o| o.data_type().clone()).collect()
}

fn check_window(window: &RexWindow) -> RexResult<()> {
    let lower = window.lower_bound();
    let upper = window.upper_bound();
    if matches!(lower, RexWindowBound::UnboundedFollowing) {
        return Err(invalid_window("frame cannot start at UNBOUNDED FOLLOWING"));
    }
    if matches!(upper, RexWindowBound::UnboundedPreceding) {
        return Err(invalid_window("frame cannot end at UNBOUNDED PRECEDING"));
    }
    if lower.order_key() > upper.order_key() {
        return Err(invalid_window(format!(
            "frame starts at {} but ends at {}",
            lower, upper
        )));
    }
    for offset in [lower.offset(), upper.offset()].into_iter().flatten() {
        if !TypeFamily::Numeric.admits(offset.data_type().family()) {
            return Err(invalid_window(format!(
                "frame offset {} must be numeric, got {}",
                offset,
                offset.data_type()
            )));
        }
    }
    Ok(())
}

fn invalid_window(reason: impl Into<String>) -> RexError {
    RexError::InvalidWindow {
        reason: reason.into(),
    }
}
