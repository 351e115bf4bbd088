//! Tree-rewriting visitors.
//!
//! A [`RexShuttle`] has one visit method per node kind. [`RexNode::accept`]
//! dispatches to the method matching the node's own kind, and each method
//! returns the node that takes the visited node's place.
//!
//! Methods a shuttle does not override follow its [`DefaultPolicy`]:
//! `Identity` keeps leaves unchanged and rebuilds compound nodes only when
//! an operand changed, `Reject` fails with
//! [`RexError::UnsupportedTransformation`].

use crate::rex::error::{RexError, RexResult};
use crate::rex::node::{
    RexCall, RexCorrelVariable, RexDynamicParam, RexFieldAccess, RexInputRef, RexLiteral,
    RexLocalRef, RexNode, RexOver, RexRangeRef,
};
use crate::rex::window::RexWindow;
use std::sync::Arc;

/// What an unoverridden visit method does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultPolicy {
    /// Return the node, recursing into compound nodes
    Identity,
    /// Fail with `UnsupportedTransformation`
    Reject,
}

pub trait RexShuttle {
    /// Name used in error messages
    fn name(&self) -> &'static str {
        "RexShuttle"
    }

    fn default_policy(&self) -> DefaultPolicy {
        DefaultPolicy::Identity
    }

    fn visit_literal(&mut self, literal: &Arc<RexLiteral>) -> RexResult<RexNode> {
        self.keep(RexNode::Literal(Arc::clone(literal)))
    }

    fn visit_input_ref(&mut self, input_ref: &Arc<RexInputRef>) -> RexResult<RexNode> {
        self.keep(RexNode::InputRef(Arc::clone(input_ref)))
    }

    fn visit_local_ref(&mut self, local_ref: &Arc<RexLocalRef>) -> RexResult<RexNode> {
        self.keep(RexNode::LocalRef(Arc::clone(local_ref)))
    }

    fn visit_correl_variable(&mut self, variable: &Arc<RexCorrelVariable>) -> RexResult<RexNode> {
        self.keep(RexNode::CorrelVariable(Arc::clone(variable)))
    }

    fn visit_dynamic_param(&mut self, param: &Arc<RexDynamicParam>) -> RexResult<RexNode> {
        self.keep(RexNode::DynamicParam(Arc::clone(param)))
    }

    fn visit_range_ref(&mut self, range_ref: &Arc<RexRangeRef>) -> RexResult<RexNode> {
        self.keep(RexNode::RangeRef(Arc::clone(range_ref)))
    }

    fn visit_call(&mut self, call: &Arc<RexCall>) -> RexResult<RexNode> {
        match self.default_policy() {
            DefaultPolicy::Identity => walk_call(self, call),
            DefaultPolicy::Reject => Err(self.unsupported(RexNode::Call(Arc::clone(call)))),
        }
    }

    fn visit_field_access(&mut self, access: &Arc<RexFieldAccess>) -> RexResult<RexNode> {
        match self.default_policy() {
            DefaultPolicy::Identity => walk_field_access(self, access),
            DefaultPolicy::Reject => {
                Err(self.unsupported(RexNode::FieldAccess(Arc::clone(access))))
            }
        }
    }

    fn visit_over(&mut self, over: &Arc<RexOver>) -> RexResult<RexNode> {
        match self.default_policy() {
            DefaultPolicy::Identity => walk_over(self, over),
            DefaultPolicy::Reject => Err(self.unsupported(RexNode::Over(Arc::clone(over)))),
        }
    }

    /// Rewrite the expressions nested in a window specification
    fn visit_window(&mut self, window: &RexWindow) -> RexResult<RexWindow> {
        window.map_nodes(|node| node.accept(self))
    }

    /// Apply the default policy to a leaf
    fn keep(&self, node: RexNode) -> RexResult<RexNode> {
        match self.default_policy() {
            DefaultPolicy::Identity => Ok(node),
            DefaultPolicy::Reject => Err(self.unsupported(node)),
        }
    }

    fn unsupported(&self, node: RexNode) -> RexError {
        RexError::UnsupportedTransformation {
            shuttle: self.name(),
            kind: node.kind(),
        }
    }
}

/// Visit every operand in order.
///
/// The flag is true when at least one operand came back as a different node.
pub fn visit_operands<S>(
    shuttle: &mut S,
    operands: &[RexNode],
) -> RexResult<(Vec<RexNode>, bool)>
where
    S: RexShuttle + ?Sized,
{
    let mut changed = false;
    let mut visited = Vec::with_capacity(operands.len());
    for operand in operands {
        let new_operand = operand.accept(shuttle)?;
        changed |= !new_operand.ptr_eq(operand);
        visited.push(new_operand);
    }
    Ok((visited, changed))
}

/// Recurse into a call's operands, rebuilding it only if one changed
pub fn walk_call<S>(shuttle: &mut S, call: &Arc<RexCall>) -> RexResult<RexNode>
where
    S: RexShuttle + ?Sized,
{
    let (operands, changed) = visit_operands(shuttle, call.operands())?;
    if !changed {
        return Ok(RexNode::Call(Arc::clone(call)));
    }
    Ok(RexNode::Call(Arc::new(call.with_operands(operands))))
}

/// Recurse into the referenced expression, rebuilding only if it changed
pub fn walk_field_access<S>(shuttle: &mut S, access: &Arc<RexFieldAccess>) -> RexResult<RexNode>
where
    S: RexShuttle + ?Sized,
{
    let expr = access.reference_expr().accept(shuttle)?;
    if expr.ptr_eq(access.reference_expr()) {
        return Ok(RexNode::FieldAccess(Arc::clone(access)));
    }
    Ok(RexNode::FieldAccess(Arc::new(access.with_expr(expr))))
}

/// Recurse into operands and window, rebuilding only if something changed
pub fn walk_over<S>(shuttle: &mut S, over: &Arc<RexOver>) -> RexResult<RexNode>
where
    S: RexShuttle + ?Sized,
{
    let (operands, operands_changed) = visit_operands(shuttle, over.operands())?;
    let window = shuttle.visit_window(over.window())?;
    if !operands_changed && window_shares_nodes(&window, over.window()) {
        return Ok(RexNode::Over(Arc::clone(over)));
    }
    Ok(RexNode::Over(Arc::new(over.with_parts(operands, window))))
}

fn window_shares_nodes(a: &RexWindow, b: &RexWindow) -> bool {
    a.nodes().zip(b.nodes()).all(|(x, y)| x.ptr_eq(y))
}

impl RexNode {
    /// Dispatch to the shuttle method for this node's kind
    pub fn accept<S>(&self, shuttle: &mut S) -> RexResult<RexNode>
    where
        S: RexShuttle + ?Sized,
    {
        match self {
            RexNode::Literal(n) => shuttle.visit_literal(n),
            RexNode::InputRef(n) => shuttle.visit_input_ref(n),
            RexNode::LocalRef(n) => shuttle.visit_local_ref(n),
            RexNode::Call(n) => shuttle.visit_call(n),
            RexNode::FieldAccess(n) => shuttle.visit_field_access(n),
            RexNode::CorrelVariable(n) => shuttle.visit_correl_variable(n),
            RexNode::DynamicParam(n) => shuttle.visit_dynamic_param(n),
            RexNode::RangeRef(n) => shuttle.visit_range_ref(n),
            RexNode::Over(n) => shuttle.visit_over(n),
        }
    }

    /// Run a shuttle over a list of expressions, e.g. a projection list
    pub fn accept_all<S>(nodes: &[RexNode], shuttle: &mut S) -> RexResult<Vec<RexNode>>
    where
        S: RexShuttle + ?Sized,
    {
        nodes.iter().map(|node| node.accept(shuttle)).collect()
    }
}
