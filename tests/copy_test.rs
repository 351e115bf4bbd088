use std::sync::Arc;
use viberex::rex::{
    std_ops, CorrelationId, RexBuilder, RexCopier, RexError, RexKind, RexNode, RexWindow, Value,
};
use viberex::types::{SqlTypeName, TypeRegistry};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn builder() -> RexBuilder {
    RexBuilder::new(Arc::new(TypeRegistry::new()))
}

fn int_literal(b: &RexBuilder, v: i32) -> RexNode {
    let int = b.type_registry().create_sql_type(SqlTypeName::Integer);
    b.make_literal(Value::Int32(v), &int, SqlTypeName::Integer)
        .unwrap()
}

#[test]
fn test_copy_plus_into_other_registry() {
    init_logging();
    let a = builder();
    let b = builder();

    let int_a = a.type_registry().create_sql_type(SqlTypeName::Integer);
    let sum = a
        .make_call(
            int_a.clone(),
            std_ops::PLUS,
            vec![int_literal(&a, 1), int_literal(&a, 2)],
        )
        .unwrap();

    let copied = RexCopier::new(&b).copy(&sum).unwrap();

    let call = copied.as_call().expect("copy of a call is a call");
    assert_eq!(call.operator(), &std_ops::PLUS);
    assert_eq!(call.operands().len(), 2);
    let values: Vec<&Value> = call
        .operands()
        .iter()
        .map(|o| o.as_literal().expect("literal operand").value())
        .collect();
    assert_eq!(values, vec![&Value::Int32(1), &Value::Int32(2)]);

    assert_eq!(copied.data_type(), &int_a);
    assert!(!copied.data_type().identical(&int_a));
    assert!(b.type_registry().owns(copied.data_type()));
    assert!(!a.type_registry().owns(copied.data_type()));
}

#[test]
fn test_round_trip_through_two_registries() {
    init_logging();
    let a = builder();
    let b = builder();

    let registry = a.type_registry();
    let row = registry.create_struct_type(vec![
        ("x", registry.create_sql_type(SqlTypeName::Integer)),
        (
            "y",
            registry.create_sql_type_with_precision(SqlTypeName::Varchar, Some(20), None),
        ),
    ]);
    let nullable_row = registry.create_type_with_nullability(&row, true);
    let record = a
        .make_literal(Value::Null, &nullable_row, SqlTypeName::Row)
        .unwrap();
    let y = a.make_field_access_by_name(record, "y").unwrap();
    let concat = a
        .make_call_inferred(std_ops::CONCAT, vec![y, a.make_char_literal("suffix").unwrap()])
        .unwrap();
    let is_null = a
        .make_call_inferred(std_ops::IS_NULL, vec![concat])
        .unwrap();
    let expr = a
        .make_call_inferred(
            std_ops::AND,
            vec![is_null, a.make_bool_literal(true).unwrap()],
        )
        .unwrap();

    let in_b = b.copy(&expr).unwrap();
    let back = a.copy(&in_b).unwrap();

    assert_eq!(back, expr);
    assert_eq!(back.to_string(), expr.to_string());
    let mut foreign = 0;
    back.walk(&mut |n: &RexNode| {
        if !a.type_registry().owns(n.data_type()) {
            foreign += 1;
        }
    });
    assert_eq!(foreign, 0);
}

#[test]
fn test_nan_literal_round_trip() {
    init_logging();
    let a = builder();
    let b = builder();
    let double = a.type_registry().create_sql_type(SqlTypeName::Double);
    let nan = a
        .make_literal(Value::Double(f64::NAN), &double, SqlTypeName::Double)
        .unwrap();
    assert_eq!(nan, nan.clone());

    let back = a.copy(&b.copy(&nan).unwrap()).unwrap();
    assert_eq!(back, nan);
}

#[test]
fn test_accept_rejection_leaves_target_registry_untouched() {
    init_logging();
    let a = builder();
    let b = builder();
    let int = a.type_registry().create_sql_type(SqlTypeName::Integer);
    let expr = a
        .make_call(
            int.clone(),
            std_ops::PLUS,
            vec![int_literal(&a, 1), a.make_input_ref(int, 0).unwrap()],
        )
        .unwrap();

    let result = expr.accept(&mut RexCopier::new(&b));
    assert!(matches!(
        result,
        Err(RexError::UnsupportedTransformation {
            kind: RexKind::InputRef,
            ..
        })
    ));
    assert_eq!(b.type_registry().len(), 0);
}

#[test]
fn test_rejection_leaves_target_registry_untouched() {
    init_logging();
    let a = builder();
    let b = builder();
    let registry = a.type_registry();
    let int = registry.create_sql_type(SqlTypeName::Integer);
    let row = registry.create_struct_type(vec![("c", int.clone())]);

    let cases = vec![
        a.make_input_ref(int.clone(), 0).unwrap(),
        a.make_local_ref(int.clone(), 1).unwrap(),
        a.make_correl(row.clone(), CorrelationId(2)).unwrap(),
        a.make_dynamic_param(int.clone(), 0).unwrap(),
        a.make_range_ref(row, 0).unwrap(),
        a.make_over(
            registry.create_sql_type(SqlTypeName::BigInt),
            std_ops::COUNT,
            vec![],
            RexWindow::unbounded_to_current(vec![], vec![]),
        )
        .unwrap(),
    ];

    for node in cases {
        // Nested under a supported call, so the failure is not at the root
        let wrapped = a
            .make_call_inferred(std_ops::IS_NOT_NULL, vec![node.clone()])
            .unwrap();
        for root in [node, wrapped] {
            let before = b.type_registry().len();
            match b.copy(&root) {
                Err(RexError::UnsupportedTransformation { shuttle, kind }) => {
                    assert_eq!(shuttle, "RexCopier");
                    assert_ne!(kind, RexKind::Call);
                }
                other => panic!("expected rejection for {}, got {:?}", root, other),
            }
            assert_eq!(b.type_registry().len(), before);
        }
    }
    assert!(b.type_registry().is_empty());
}

#[test]
fn test_builder_validation_constructs_nothing() {
    init_logging();
    let b = builder();
    let int = b.type_registry().create_sql_type(SqlTypeName::Integer);
    let one = int_literal(&b, 1);

    let err = b
        .make_call(int.clone(), std_ops::PLUS, vec![one.clone()])
        .unwrap_err();
    assert!(matches!(err, RexError::InvalidOperatorUse { ref operator, .. } if operator == "+"));

    let row = b
        .type_registry()
        .create_struct_type(vec![("only", int.clone())]);
    let input = b.make_input_ref(row, 0).unwrap();
    let err = b.make_field_access(input, 1).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Field index 1 out of bounds for type RecordType(INTEGER NOT NULL only) NOT NULL with 1 fields"
    );
}
