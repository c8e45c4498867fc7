use super::helpers::*;
use crate::checker::ExprVal;
use crate::error::ExprError;
use crate::patterns::{PatternItem, TypedPatternKind};
use kuma_ast::{Module, Pattern, TypeExpression};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn main_module() -> Module {
    let lib = module("Lib")
        .with_item(boxed_with(
            "Pair",
            &[],
            Some(t_tuple(vec![t("Int"), t("Int")])),
            BoxFlags {
                opaque: true,
                ..BoxFlags::default()
            },
        ))
        .with_item(boxed_with(
            "Record",
            &[],
            Some(t_bundle(vec![("id", t("Int"))])),
            BoxFlags {
                opaque: true,
                ..BoxFlags::default()
            },
        ));
    module("Main")
        .with_import("lib", Arc::new(lib))
        .with_item(boxed("Coords", &[], t_tuple(vec![t("Float"), t("Float")])))
        .with_item(boxed_with(
            "Meters",
            &[],
            Some(t("Float")),
            BoxFlags {
                as_is: true,
                ..BoxFlags::default()
            },
        ))
}

/// A lambda from `input` to `Unit` taking its argument apart with `pattern`
fn destructure(pattern: Pattern, input: TypeExpression) -> Result<crate::checker::Expr, ExprError> {
    check_expr(&main_module(), &lambda(pattern, unit()), Some(t_func(input, t_unit())))
}

fn input_pattern(expr: crate::checker::Expr) -> TypedPatternKind {
    match expr.value {
        ExprVal::Lambda { input, .. } => input.kind,
        other => panic!("expected a lambda, got {:?}", other),
    }
}

#[test]
fn test_tuple_pattern_through_boxed_type() {
    let expr = destructure(p_tuple(&["x", "_"]), t("Coords")).unwrap();
    match input_pattern(expr) {
        TypedPatternKind::Tuple(items) => {
            let names: Vec<_> = items.iter().map(|i| (i.name.as_str(), i.index)).collect();
            assert_eq!(names, vec![("x", 0)]);
            assert_eq!(items[0].ty, core("Float"));
        }
        other => panic!("expected a tuple pattern, got {:?}", other),
    }
}

#[test]
fn test_tuple_pattern_errors() {
    let pair = || t_tuple(vec![t("Int"), t("String")]);

    let err = destructure(p_tuple(&["a", "b", "c"]), pair()).unwrap_err();
    assert!(matches!(err, ExprError::TupleSizeNotMatching { required: 2, given: 3, .. }));

    let err = destructure(p_tuple(&["a", "a"]), pair()).unwrap_err();
    assert!(matches!(err, ExprError::DuplicateBinding { ref name, .. } if name == "a"));

    let err = destructure(p_tuple(&["_", "_"]), pair()).unwrap_err();
    assert!(matches!(err, ExprError::EntireValueIgnored { .. }));

    let err = destructure(p_tuple(&["a", "b"]), t("Float")).unwrap_err();
    assert!(matches!(err, ExprError::MatchingNonTupleType { .. }));

    let err = destructure(p_tuple(&["a", "b"]), t_qualified("lib", "Pair")).unwrap_err();
    assert!(matches!(err, ExprError::MatchingOpaqueTupleType { .. }));
}

#[test]
fn test_bundle_pattern_renames_fields() {
    let point = t_bundle(vec![("x", t("Float")), ("y", t("String"))]);
    let expr = destructure(p_bundle(&[("y", Some("label")), ("x", None)]), point).unwrap();
    match input_pattern(expr) {
        TypedPatternKind::Bundle(items) => {
            let summary: Vec<_> = items
                .iter()
                .map(|PatternItem { name, index, ty, .. }| (name.clone(), *index, ty.clone()))
                .collect();
            assert_eq!(
                summary,
                vec![
                    ("label".to_string(), 1, core("String")),
                    ("x".to_string(), 0, core("Float")),
                ]
            );
        }
        other => panic!("expected a bundle pattern, got {:?}", other),
    }
}

#[test]
fn test_bundle_pattern_errors() {
    let point = || t_bundle(vec![("x", t("Float")), ("y", t("Float"))]);

    let err = destructure(p_bundle(&[("z", None)]), point()).unwrap_err();
    assert!(matches!(err, ExprError::FieldDoesNotExist { ref field, .. } if field == "z"));

    let err = destructure(p_bundle(&[("x", Some("v")), ("y", Some("v"))]), point()).unwrap_err();
    assert!(matches!(err, ExprError::DuplicateBinding { .. }));

    let err = destructure(p_bundle(&[("x", None)]), t("Float")).unwrap_err();
    assert!(matches!(err, ExprError::MatchingNonBundleType { .. }));

    let err = destructure(p_bundle(&[("id", None)]), t_qualified("lib", "Record")).unwrap_err();
    assert!(matches!(err, ExprError::MatchingOpaqueBundleType { .. }));
}

#[test]
fn test_trivial_binding_sees_through_as_is_types() {
    let expr = destructure(p("m"), t("Meters")).unwrap();
    match input_pattern(expr) {
        TypedPatternKind::Trivial { name, ty } => {
            assert_eq!(name, "m");
            assert_eq!(ty, core("Float"));
        }
        other => panic!("expected a trivial pattern, got {:?}", other),
    }

    let expr = destructure(p("c"), t("Coords")).unwrap();
    assert!(matches!(
        input_pattern(expr),
        TypedPatternKind::Trivial { ty, .. } if ty == named("Main", "Coords", vec![])
    ));
}

#[test]
fn test_discarded_binding_is_not_in_scope() {
    let m = main_module();
    let expr = block(vec![binding(p("_"), None, float(1.0))], var("_"));
    assert!(matches!(check_err(&m, &expr, None), ExprError::SymbolNotFound { .. }));
}
