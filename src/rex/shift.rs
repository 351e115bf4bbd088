//! Input reference shifting.

use crate::rex::builder::RexBuilder;
use crate::rex::error::{RexError, RexResult};
use crate::rex::node::{RexInputRef, RexNode};
use crate::rex::shuttle::RexShuttle;
use std::sync::Arc;

/// Adds `offset` to every input reference, e.g. when a predicate written
/// against the right input of a join is moved above the join.
///
/// Subtrees without input references are returned as the same nodes.
pub struct InputShifter<'a> {
    builder: &'a RexBuilder,
    offset: usize,
}

impl<'a> InputShifter<'a> {
    pub fn new(builder: &'a RexBuilder, offset: usize) -> Self {
        Self { builder, offset }
    }

    pub fn shift(&mut self, node: &RexNode) -> RexResult<RexNode> {
        node.accept(self)
    }
}

impl RexShuttle for InputShifter<'_> {
    fn name(&self) -> &'static str {
        "InputShifter"
    }

    fn visit_input_ref(&mut self, input_ref: &Arc<RexInputRef>) -> RexResult<RexNode> {
        if self.offset == 0 {
            return Ok(RexNode::InputRef(Arc::clone(input_ref)));
        }
        let index = input_ref
            .index()
            .checked_add(self.offset)
            .ok_or(RexError::IndexOverflow {
                index: input_ref.index(),
                offset: self.offset,
            })?;
        self.builder
            .make_input_ref(input_ref.data_type().clone(), index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rex::operator::std_ops;
    use crate::rex::window::{RexFieldCollation, RexWindow};
    use crate::types::{SqlTypeName, TypeRegistry};

    fn builder() -> RexBuilder {
        RexBuilder::new(Arc::new(TypeRegistry::new()))
    }

    #[test]
    fn test_shift_input_refs() {
        let b = builder();
        let int = b.type_registry().create_sql_type(SqlTypeName::Integer);
        let constant = b
            .make_call_inferred(
                std_ops::MULTIPLY,
                vec![b.make_exact_literal(2).unwrap(), b.make_exact_literal(3).unwrap()],
            )
            .unwrap();
        let predicate = b
            .make_call_inferred(
                std_ops::GREATER_THAN,
                vec![b.make_input_ref(int, 1).unwrap(), constant.clone()],
            )
            .unwrap();

        let shifted = InputShifter::new(&b, 4).shift(&predicate).unwrap();
        assert_eq!(shifted.to_string(), ">($5, *(2, 3))");
        assert!(shifted.operands()[1].ptr_eq(&constant));
        assert_eq!(shifted.data_type(), predicate.data_type());
    }

    #[test]
    fn test_shift_without_input_refs_is_identity() {
        let b = builder();
        let expr = b
            .make_call_inferred(
                std_ops::PLUS,
                vec![b.make_exact_literal(1).unwrap(), b.make_exact_literal(2).unwrap()],
            )
            .unwrap();
        let shifted = InputShifter::new(&b, 3).shift(&expr).unwrap();
        assert!(shifted.ptr_eq(&expr));

        let zero = b
            .make_input_ref(b.type_registry().create_sql_type(SqlTypeName::Integer), 0)
            .unwrap();
        assert!(InputShifter::new(&b, 0).shift(&zero).unwrap().ptr_eq(&zero));
    }

    #[test]
    fn test_shift_overflow() {
        let b = builder();
        let int = b.type_registry().create_sql_type(SqlTypeName::Integer);
        let input = b.make_input_ref(int, 2).unwrap();
        let err = InputShifter::new(&b, usize::MAX).shift(&input).unwrap_err();
        assert_eq!(
            err,
            RexError::IndexOverflow {
                index: 2,
                offset: usize::MAX,
            }
        );
    }

    #[test]
    fn test_shift_reaches_into_windows() {
        let b = builder();
        let int = b.type_registry().create_sql_type(SqlTypeName::Integer);
        let bigint = b.type_registry().create_sql_type(SqlTypeName::BigInt);
        let window = RexWindow::unbounded_to_current(
            vec![b.make_input_ref(int.clone(), 0).unwrap()],
            vec![RexFieldCollation::descending(
                b.make_input_ref(int, 1).unwrap(),
            )],
        );
        let over = b
            .make_over(bigint, std_ops::RANK, vec![], window)
            .unwrap();

        let shifted = InputShifter::new(&b, 2).shift(&over).unwrap();
        assert_eq!(
            shifted.to_string(),
            "RANK() OVER (PARTITION BY $2 ORDER BY $3 DESC RANGE BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW)"
        );
    }
}
