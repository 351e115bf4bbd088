//! Deep copy of expression trees into another type registry.

use crate::rex::builder::RexBuilder;
use crate::rex::error::{RexError, RexResult};
use crate::rex::node::{RexCall, RexFieldAccess, RexInputRef, RexKind, RexLiteral, RexNode};
use crate::rex::shuttle::{DefaultPolicy, RexShuttle};
use log::{debug, trace};
use std::sync::Arc;

type InputRemap<'a> = Box<dyn Fn(usize) -> Option<usize> + 'a>;

/// Rebuilds an expression through a target builder.
///
/// Literals, calls and field accesses are copied; every copied node gets a
/// type owned by the target builder's registry. Nodes whose meaning depends
/// on an enclosing context (input, local and range references, correlation
/// variables, dynamic parameters, windowed calls) are rejected. Input
/// references become copyable once an index mapping is supplied with
/// [`RexCopier::with_input_remap`].
pub struct RexCopier<'a> {
    builder: &'a RexBuilder,
    input_remap: Option<InputRemap<'a>>,
    /// Number of copied nodes currently being rebuilt; 0 outside a copy
    level: usize,
}

impl<'a> RexCopier<'a> {
    pub fn new(builder: &'a RexBuilder) -> Self {
        Self {
            builder,
            input_remap: None,
            level: 0,
        }
    }

    /// Copy input references too, mapping each source index through `remap`.
    ///
    /// An index the mapping returns `None` for fails the copy.
    pub fn with_input_remap<F>(mut self, remap: F) -> Self
    where
        F: Fn(usize) -> Option<usize> + 'a,
    {
        self.input_remap = Some(Box::new(remap));
        self
    }

    /// Copy `node` into the target registry.
    ///
    /// Equivalent to `node.accept(copier)`. Either way the tree is checked
    /// for unsupported nodes before anything is built, so a rejected copy
    /// creates nothing in the target registry.
    pub fn copy(&mut self, node: &RexNode) -> RexResult<RexNode> {
        debug!(
            "copying {} into registry {}",
            node,
            self.builder.type_registry().id().value()
        );
        let copied = node.accept(self)?;
        debug!("copy finished: {}", copied);
        Ok(copied)
    }

    /// Rebuild `node` with `build`, scanning the whole subtree first when
    /// `node` is the root of the copy
    fn rebuild<F>(&mut self, node: RexNode, build: F) -> RexResult<RexNode>
    where
        F: FnOnce(&mut Self) -> RexResult<RexNode>,
    {
        if self.level == 0 {
            self.check_supported(&node)?;
        }
        self.level += 1;
        let result = build(self);
        self.level -= 1;
        result
    }

    fn check_supported(&self, root: &RexNode) -> RexResult<()> {
        match root.find(&mut |n| !self.supports(n)) {
            Some(unsupported) => {
                debug!(
                    "copy into registry {} rejected at {}",
                    self.builder.type_registry().id().value(),
                    unsupported
                );
                Err(self.unsupported(unsupported.clone()))
            }
            None => Ok(()),
        }
    }

    fn supports(&self, node: &RexNode) -> bool {
        match node {
            RexNode::Literal(_) | RexNode::Call(_) | RexNode::FieldAccess(_) => true,
            RexNode::InputRef(input) => self.remap(input.index()).is_some(),
            _ => false,
        }
    }

    fn remap(&self, index: usize) -> Option<usize> {
        self.input_remap.as_ref().and_then(|remap| remap(index))
    }
}

impl RexShuttle for RexCopier<'_> {
    fn name(&self) -> &'static str {
        "RexCopier"
    }

    fn default_policy(&self) -> DefaultPolicy {
        DefaultPolicy::Reject
    }

    fn visit_literal(&mut self, literal: &Arc<RexLiteral>) -> RexResult<RexNode> {
        self.rebuild(RexNode::Literal(Arc::clone(literal)), |this| {
            trace!("copy literal {}", literal.value());
            let ty = this
                .builder
                .type_registry()
                .copy_type(literal.data_type());
            this.builder
                .make_literal(literal.value().clone(), &ty, literal.type_name())
        })
    }

    fn visit_input_ref(&mut self, input_ref: &Arc<RexInputRef>) -> RexResult<RexNode> {
        self.rebuild(RexNode::InputRef(Arc::clone(input_ref)), |this| {
            let index = this
                .remap(input_ref.index())
                .ok_or(RexError::UnsupportedTransformation {
                    shuttle: "RexCopier",
                    kind: RexKind::InputRef,
                })?;
            trace!("copy input ref ${} as ${}", input_ref.index(), index);
            let ty = this
                .builder
                .type_registry()
                .copy_type(input_ref.data_type());
            this.builder.make_input_ref(ty, index)
        })
    }

    fn visit_call(&mut self, call: &Arc<RexCall>) -> RexResult<RexNode> {
        self.rebuild(RexNode::Call(Arc::clone(call)), |this| {
            trace!("copy call {}", call.operator());
            let operands = call
                .operands()
                .iter()
                .map(|operand| operand.accept(&mut *this))
                .collect::<RexResult<Vec<_>>>()?;
            let ty = this.builder.type_registry().copy_type(call.data_type());
            this.builder.make_call(ty, call.operator().clone(), operands)
        })
    }

    fn visit_field_access(&mut self, access: &Arc<RexFieldAccess>) -> RexResult<RexNode> {
        self.rebuild(RexNode::FieldAccess(Arc::clone(access)), |this| {
            trace!("copy field access .{}", access.field().name());
            let expr = access.reference_expr().accept(&mut *this)?;
            this.builder.make_field_access(expr, access.field_index())
        })
    }
}
