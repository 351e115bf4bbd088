//! Property-based tests for cross-registry copies.

use proptest::prelude::*;
use std::sync::Arc;
use viberex::rex::{std_ops, RexBuilder, RexNode, RexResult, SqlOperator};
use viberex::types::TypeRegistry;

/// Shape of an arithmetic expression over integer literals
#[derive(Debug, Clone)]
enum Shape {
    Leaf(i64),
    Plus(Box<Shape>, Box<Shape>),
    Times(Box<Shape>, Box<Shape>),
    Negate(Box<Shape>),
    Coalesce(Vec<Shape>),
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    any::<i64>().prop_map(Shape::Leaf).prop_recursive(6, 48, 4, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Shape::Plus(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Shape::Times(Box::new(a), Box::new(b))),
            inner.clone().prop_map(|a| Shape::Negate(Box::new(a))),
            prop::collection::vec(inner, 1..5).prop_map(Shape::Coalesce),
        ]
    })
}

fn build(b: &RexBuilder, shape: &Shape) -> RexResult<RexNode> {
    let call = |op: SqlOperator, operands: &[&Shape]| -> RexResult<RexNode> {
        let operands = operands
            .iter()
            .map(|s| build(b, s))
            .collect::<RexResult<Vec<_>>>()?;
        b.make_call_inferred(op, operands)
    };
    match shape {
        Shape::Leaf(v) => b.make_exact_literal(*v),
        Shape::Plus(l, r) => call(std_ops::PLUS, &[l.as_ref(), r.as_ref()]),
        Shape::Times(l, r) => call(std_ops::MULTIPLY, &[l.as_ref(), r.as_ref()]),
        Shape::Negate(a) => call(std_ops::UNARY_MINUS, &[a.as_ref()]),
        Shape::Coalesce(items) => call(std_ops::COALESCE, &items.iter().collect::<Vec<_>>()),
    }
}

fn builder() -> RexBuilder {
    RexBuilder::new(Arc::new(TypeRegistry::new()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_round_trip_is_structurally_equal(shape in arb_shape()) {
        let a = builder();
        let b = builder();
        let original = build(&a, &shape).unwrap();

        let in_b = b.copy(&original).unwrap();
        let back = a.copy(&in_b).unwrap();

        prop_assert_eq!(&in_b, &original);
        prop_assert_eq!(&back, &original);
        prop_assert!(b.type_registry().owns(in_b.data_type()));
        prop_assert!(!in_b.data_type().identical(original.data_type()));
    }

    #[test]
    fn prop_copy_preserves_operand_order(shape in arb_shape()) {
        let a = builder();
        let b = builder();
        let original = build(&a, &shape).unwrap();
        let copied = b.copy(&original).unwrap();

        let mut source_order = Vec::new();
        original.walk(&mut |n: &RexNode| source_order.push(n.to_string()));
        let mut copied_order = Vec::new();
        copied.walk(&mut |n: &RexNode| copied_order.push(n.to_string()));

        prop_assert_eq!(source_order, copied_order);
        prop_assert_eq!(copied.operands().len(), original.operands().len());
        for (c, o) in copied.operands().iter().zip(original.operands()) {
            prop_assert_eq!(c, o);
        }
    }
}
