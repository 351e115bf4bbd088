//! Expression node definitions.
//!
//! Nodes are immutable and cheap to clone: every variant holds its payload
//! behind an `Arc`, so subtrees can be shared between parent trees. Payload
//! constructors are crate-private; use [`crate::rex::RexBuilder`] to create
//! nodes.

use crate::rex::operator::SqlOperator;
use crate::rex::value::Value;
use crate::rex::window::RexWindow;
use crate::types::{RelDataType, RelDataTypeField, SqlTypeName};
use std::fmt;
use std::sync::Arc;

/// Discriminant of a [`RexNode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RexKind {
    Literal,
    InputRef,
    LocalRef,
    Call,
    FieldAccess,
    CorrelVariable,
    DynamicParam,
    RangeRef,
    Over,
}

impl fmt::Display for RexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Constant value; its runtime shape is determined by `type_name`
#[derive(Debug, Clone, PartialEq)]
pub struct RexLiteral {
    value: Value,
    ty: RelDataType,
    type_name: SqlTypeName,
}

impl RexLiteral {
    pub(crate) fn new(value: Value, ty: RelDataType, type_name: SqlTypeName) -> Self {
        Self {
            value,
            ty,
            type_name,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn data_type(&self) -> &RelDataType {
        &self.ty
    }

    pub fn type_name(&self) -> SqlTypeName {
        self.type_name
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }
}

/// Reference to a field of the input row
#[derive(Debug, Clone, PartialEq)]
pub struct RexInputRef {
    index: usize,
    ty: RelDataType,
}

impl RexInputRef {
    pub(crate) fn new(index: usize, ty: RelDataType) -> Self {
        Self { index, ty }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn data_type(&self) -> &RelDataType {
        &self.ty
    }
}

/// Reference to a locally bound sub-expression
#[derive(Debug, Clone, PartialEq)]
pub struct RexLocalRef {
    index: usize,
    ty: RelDataType,
}

impl RexLocalRef {
    pub(crate) fn new(index: usize, ty: RelDataType) -> Self {
        Self { index, ty }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn data_type(&self) -> &RelDataType {
        &self.ty
    }
}

/// Application of an operator to operands
#[derive(Debug, Clone, PartialEq)]
pub struct RexCall {
    op: SqlOperator,
    operands: Vec<RexNode>,
    ty: RelDataType,
    depth: usize,
}

impl RexCall {
    pub(crate) fn new(ty: RelDataType, op: SqlOperator, operands: Vec<RexNode>) -> Self {
        let depth = 1 + operands.iter().map(RexNode::depth).max().unwrap_or(0);
        Self {
            op,
            operands,
            ty,
            depth,
        }
    }

    /// Same operator and type over different operands
    pub(crate) fn with_operands(&self, operands: Vec<RexNode>) -> Self {
        Self::new(self.ty.clone(), self.op.clone(), operands)
    }

    pub fn operator(&self) -> &SqlOperator {
        &self.op
    }

    pub fn operands(&self) -> &[RexNode] {
        &self.operands
    }

    pub fn data_type(&self) -> &RelDataType {
        &self.ty
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }
}

/// Access of a field of a row-typed expression
#[derive(Debug, Clone, PartialEq)]
pub struct RexFieldAccess {
    expr: RexNode,
    field: RelDataTypeField,
}

impl RexFieldAccess {
    pub(crate) fn new(expr: RexNode, field: RelDataTypeField) -> Self {
        Self { expr, field }
    }

    pub(crate) fn with_expr(&self, expr: RexNode) -> Self {
        Self::new(expr, self.field.clone())
    }

    pub fn reference_expr(&self) -> &RexNode {
        &self.expr
    }

    pub fn field(&self) -> &RelDataTypeField {
        &self.field
    }

    pub fn field_index(&self) -> usize {
        self.field.index()
    }

    pub fn data_type(&self) -> &RelDataType {
        self.field.data_type()
    }
}

/// Identifier of a correlation binding in an outer query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationId(pub usize);

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$cor{}", self.0)
    }
}

/// Reference to a row bound by an enclosing query
#[derive(Debug, Clone, PartialEq)]
pub struct RexCorrelVariable {
    id: CorrelationId,
    ty: RelDataType,
}

impl RexCorrelVariable {
    pub(crate) fn new(id: CorrelationId, ty: RelDataType) -> Self {
        Self { id, ty }
    }

    pub fn id(&self) -> CorrelationId {
        self.id
    }

    pub fn data_type(&self) -> &RelDataType {
        &self.ty
    }
}

/// Placeholder bound at execution time
#[derive(Debug, Clone, PartialEq)]
pub struct RexDynamicParam {
    index: usize,
    ty: RelDataType,
}

impl RexDynamicParam {
    pub(crate) fn new(index: usize, ty: RelDataType) -> Self {
        Self { index, ty }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn data_type(&self) -> &RelDataType {
        &self.ty
    }
}

/// Reference to a contiguous range of input fields starting at `offset`;
/// the row type lists the fields in the range
#[derive(Debug, Clone, PartialEq)]
pub struct RexRangeRef {
    offset: usize,
    ty: RelDataType,
}

impl RexRangeRef {
    pub(crate) fn new(offset: usize, ty: RelDataType) -> Self {
        Self { offset, ty }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn data_type(&self) -> &RelDataType {
        &self.ty
    }
}

/// Aggregate call evaluated over a window
#[derive(Debug, Clone, PartialEq)]
pub struct RexOver {
    op: SqlOperator,
    operands: Vec<RexNode>,
    ty: RelDataType,
    window: RexWindow,
    depth: usize,
}

impl RexOver {
    pub(crate) fn new(
        ty: RelDataType,
        op: SqlOperator,
        operands: Vec<RexNode>,
        window: RexWindow,
    ) -> Self {
        let operand_depth = operands.iter().map(RexNode::depth).max().unwrap_or(0);
        let depth = 1 + operand_depth.max(window.depth());
        Self {
            op,
            operands,
            ty,
            window,
            depth,
        }
    }

    pub(crate) fn with_parts(&self, operands: Vec<RexNode>, window: RexWindow) -> Self {
        Self::new(self.ty.clone(), self.op.clone(), operands, window)
    }

    pub fn operator(&self) -> &SqlOperator {
        &self.op
    }

    pub fn operands(&self) -> &[RexNode] {
        &self.operands
    }

    pub fn window(&self) -> &RexWindow {
        &self.window
    }

    pub fn data_type(&self) -> &RelDataType {
        &self.ty
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }
}

/// Expression tree node.
///
/// Equality is structural, including the structural equality of types.
#[derive(Debug, Clone, PartialEq)]
pub enum RexNode {
    Literal(Arc<RexLiteral>),
    InputRef(Arc<RexInputRef>),
    LocalRef(Arc<RexLocalRef>),
    Call(Arc<RexCall>),
    FieldAccess(Arc<RexFieldAccess>),
    CorrelVariable(Arc<RexCorrelVariable>),
    DynamicParam(Arc<RexDynamicParam>),
    RangeRef(Arc<RexRangeRef>),
    Over(Arc<RexOver>),
}

impl RexNode {
    pub fn kind(&self) -> RexKind {
        match self {
            RexNode::Literal(_) => RexKind::Literal,
            RexNode::InputRef(_) => RexKind::InputRef,
            RexNode::LocalRef(_) => RexKind::LocalRef,
            RexNode::Call(_) => RexKind::Call,
            RexNode::FieldAccess(_) => RexKind::FieldAccess,
            RexNode::CorrelVariable(_) => RexKind::CorrelVariable,
            RexNode::DynamicParam(_) => RexKind::DynamicParam,
            RexNode::RangeRef(_) => RexKind::RangeRef,
            RexNode::Over(_) => RexKind::Over,
        }
    }

    /// Get the type of this expression
    pub fn data_type(&self) -> &RelDataType {
        match self {
            RexNode::Literal(n) => n.data_type(),
            RexNode::InputRef(n) => n.data_type(),
            RexNode::LocalRef(n) => n.data_type(),
            RexNode::Call(n) => n.data_type(),
            RexNode::FieldAccess(n) => n.data_type(),
            RexNode::CorrelVariable(n) => n.data_type(),
            RexNode::DynamicParam(n) => n.data_type(),
            RexNode::RangeRef(n) => n.data_type(),
            RexNode::Over(n) => n.data_type(),
        }
    }

    /// Operands of a call or windowed call; empty for other kinds
    pub fn operands(&self) -> &[RexNode] {
        match self {
            RexNode::Call(call) => call.operands(),
            RexNode::Over(over) => over.operands(),
            _ => &[],
        }
    }

    /// Height of the tree rooted here; leaves have depth 1
    pub fn depth(&self) -> usize {
        match self {
            RexNode::Call(call) => call.depth(),
            RexNode::Over(over) => over.depth(),
            RexNode::FieldAccess(access) => 1 + access.expr.depth(),
            _ => 1,
        }
    }

    pub fn as_literal(&self) -> Option<&RexLiteral> {
        match self {
            RexNode::Literal(literal) => Some(literal.as_ref()),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&RexCall> {
        match self {
            RexNode::Call(call) => Some(call.as_ref()),
            _ => None,
        }
    }

    pub fn as_field_access(&self) -> Option<&RexFieldAccess> {
        match self {
            RexNode::FieldAccess(access) => Some(access.as_ref()),
            _ => None,
        }
    }

    pub fn as_input_ref(&self) -> Option<&RexInputRef> {
        match self {
            RexNode::InputRef(input) => Some(input.as_ref()),
            _ => None,
        }
    }

    /// Whether both handles share the same node instance
    pub fn ptr_eq(&self, other: &RexNode) -> bool {
        match (self, other) {
            (RexNode::Literal(a), RexNode::Literal(b)) => Arc::ptr_eq(a, b),
            (RexNode::InputRef(a), RexNode::InputRef(b)) => Arc::ptr_eq(a, b),
            (RexNode::LocalRef(a), RexNode::LocalRef(b)) => Arc::ptr_eq(a, b),
            (RexNode::Call(a), RexNode::Call(b)) => Arc::ptr_eq(a, b),
            (RexNode::FieldAccess(a), RexNode::FieldAccess(b)) => Arc::ptr_eq(a, b),
            (RexNode::CorrelVariable(a), RexNode::CorrelVariable(b)) => Arc::ptr_eq(a, b),
            (RexNode::DynamicParam(a), RexNode::DynamicParam(b)) => Arc::ptr_eq(a, b),
            (RexNode::RangeRef(a), RexNode::RangeRef(b)) => Arc::ptr_eq(a, b),
            (RexNode::Over(a), RexNode::Over(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Apply `f` to each direct child
    pub fn visit1<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(&'a RexNode),
    {
        match self {
            RexNode::Call(call) => call.operands.iter().for_each(f),
            RexNode::FieldAccess(access) => f(&access.expr),
            RexNode::Over(over) => {
                over.operands.iter().for_each(&mut f);
                over.window.nodes().for_each(f);
            }
            RexNode::Literal(_)
            | RexNode::InputRef(_)
            | RexNode::LocalRef(_)
            | RexNode::CorrelVariable(_)
            | RexNode::DynamicParam(_)
            | RexNode::RangeRef(_) => (),
        }
    }

    /// Post-order walk over the whole tree
    pub fn walk<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a RexNode),
    {
        self.visit1(|child| child.walk(f));
        f(self);
    }

    /// Pre-order search for the first node matching `pred`
    pub fn find<P>(&self, pred: &mut P) -> Option<&RexNode>
    where
        P: FnMut(&RexNode) -> bool,
    {
        if pred(self) {
            return Some(self);
        }
        let mut found = None;
        self.visit1(|child| {
            if found.is_none() {
                found = child.find(&mut *pred);
            }
        });
        found
    }
}

impl fmt::Display for RexNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RexNode::Literal(lit) if lit.is_null() => write!(f, "NULL:{}", lit.ty),
            RexNode::Literal(lit) => write!(f, "{}", lit.value),
            RexNode::InputRef(input) => write!(f, "${}", input.index),
            RexNode::LocalRef(local) => write!(f, "$t{}", local.index),
            RexNode::Call(call) => write_call(f, &call.op, &call.operands),
            RexNode::FieldAccess(access) => write!(f, "{}.{}", access.expr, access.field.name()),
            RexNode::CorrelVariable(correl) => write!(f, "{}", correl.id),
            RexNode::DynamicParam(param) => write!(f, "?{}", param.index),
            RexNode::RangeRef(range) => write!(f, "$range{}", range.offset),
            RexNode::Over(over) => {
                write_call(f, &over.op, &over.operands)?;
                write!(f, " OVER {}", over.window)
            }
        }
    }
}

fn write_call(f: &mut fmt::Formatter<'_>, op: &SqlOperator, operands: &[RexNode]) -> fmt::Result {
    write!(f, "{}(", op)?;
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", operand)?;
    }
    write!(f, ")")
}
