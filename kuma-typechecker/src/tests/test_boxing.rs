use super::helpers::*;
use crate::checker::ExprVal;
use crate::error::{ExprError, TypeDeclError};
use crate::types::Type;
use kuma_ast::Module;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn wrappers() -> Module {
    module("Main")
        .with_item(boxed("Wrapper", &["+T"], t("T")))
        .with_item(boxed("Age", &[], t("Int")))
        .with_item(boxed_with("Marker", &[], None, BoxFlags::default()))
}

fn library() -> Module {
    module("Lib")
        .with_item(boxed_with(
            "Token",
            &[],
            Some(t("Int")),
            BoxFlags {
                protected: true,
                ..BoxFlags::default()
            },
        ))
        .with_item(boxed_with(
            "Secret",
            &[],
            Some(t("String")),
            BoxFlags {
                opaque: true,
                ..BoxFlags::default()
            },
        ))
}

fn importing_library() -> Module {
    module("Main").with_import("lib", Arc::new(library()))
}

#[test]
fn test_box_with_explicit_arguments() {
    let m = wrappers();
    let expr = check_ok(&m, &call(var_args("Wrapper", vec![t("Int8")]), int(3)), None);
    assert_eq!(expr.ty, named("Main", "Wrapper", vec![core("Int8")]));
}

#[test]
fn test_box_infers_arguments_from_value() {
    let m = wrappers();
    let expr = check_ok(&m, &call(var("Wrapper"), float(1.0)), None);
    assert_eq!(expr.ty, named("Main", "Wrapper", vec![core("Float")]));

    let nested = check_ok(&m, &call(var("Wrapper"), call(var("Wrapper"), string("x"))), None);
    assert_eq!(
        nested.ty,
        named("Main", "Wrapper", vec![named("Main", "Wrapper", vec![core("String")])])
    );
}

#[test]
fn test_box_inference_needs_a_typed_value() {
    let m = wrappers();
    let err = check_err(&m, &call(var("Wrapper"), int(1)), None);
    assert!(matches!(err, ExprError::ExplicitTypeRequired { .. }));
}

#[test]
fn test_box_with_wrong_argument_count() {
    let m = wrappers();
    let err = check_err(&m, &call(var_args("Wrapper", vec![t("Int"), t("Int")]), int(1)), None);
    assert!(matches!(
        err,
        ExprError::TypeExpr(TypeDeclError::WrongParameterQuantity { required: 1, given: 2, .. })
    ));

    let err = check_err(&m, &call(var_args("Age", vec![t("Int")]), int(1)), None);
    assert!(matches!(
        err,
        ExprError::TypeExpr(TypeDeclError::WrongParameterQuantity { required: 0, given: 1, .. })
    ));
}

#[test]
fn test_box_checks_inner_type() {
    let m = wrappers();
    let expr = check_ok(&m, &call(var("Age"), int(30)), None);
    assert_eq!(expr.ty, named("Main", "Age", vec![]));

    let err = check_err(&m, &call(var("Age"), string("thirty")), None);
    assert!(matches!(err, ExprError::NotAssignable { .. }));
}

#[test]
fn test_type_name_as_value_boxes_unit() {
    let m = wrappers();
    let expr = check_ok(&m, &var("Marker"), None);
    assert_eq!(expr.ty, named("Main", "Marker", vec![]));
    assert_eq!(expr.value, ExprVal::Unit);

    let err = check_err(&m, &var("Age"), None);
    assert!(matches!(err, ExprError::NotAssignable { .. }));
}

#[test]
fn test_native_types_cannot_be_boxed() {
    let m = wrappers();
    let err = check_err(&m, &call(var("Float"), float(1.0)), None);
    assert!(matches!(err, ExprError::BoxNonBoxedType { ref name, .. } if name == "Core::Float"));
}

#[test]
fn test_protected_and_opaque_types_box_only_at_home() {
    let lib = library();
    assert_eq!(
        check_ok(&lib, &call(var("Token"), int(7)), None).ty,
        named("Lib", "Token", vec![])
    );
    assert_eq!(
        check_ok(&lib, &call(var("Secret"), string("s")), None).ty,
        named("Lib", "Secret", vec![])
    );

    let m = importing_library();
    let err = check_err(&m, &call(qvar("lib", "Token"), int(7)), None);
    assert!(matches!(err, ExprError::BoxProtectedType { .. }));
    let err = check_err(&m, &call(qvar("lib", "Secret"), string("s")), None);
    assert!(matches!(err, ExprError::BoxOpaqueType { .. }));
}

#[test]
fn test_auto_boxing() {
    let m = wrappers();
    let expr = check_ok(&m, &float(2.0), Some(t_args("Wrapper", vec![t("Float")])));
    assert_eq!(expr.ty, named("Main", "Wrapper", vec![core("Float")]));

    let pair = t_tuple(vec![t("Int"), t("Int8")]);
    let expr = check_ok(&m, &tuple(vec![int(1), int(2)]), Some(t_args("Wrapper", vec![pair])));
    assert_eq!(
        expr.ty,
        named("Main", "Wrapper", vec![Type::tuple(vec![core("Int"), core("Int8")])])
    );
}

#[test]
fn test_auto_boxing_skips_protected_types() {
    let m = importing_library();
    let err = check_err(&m, &int(7), Some(t_qualified("lib", "Token")));
    assert!(matches!(err, ExprError::IntegerAssignedToNonIntegerType { .. }));
}

#[test]
fn test_calling_a_union_lifts_a_case() {
    let m = module("Main");
    let expr = check_ok(&m, &call(var("Maybe"), call(var("Just"), float(1.0))), None);
    assert_eq!(expr.ty, named("Core", "Maybe", vec![core("Float")]));
    assert!(matches!(expr.value, ExprVal::Sum { index: 0, .. }));

    let expr = check_ok(&m, &call(var_args("Maybe", vec![t("Float")]), var("Nothing")), None);
    assert_eq!(expr.ty, named("Core", "Maybe", vec![core("Float")]));
}

#[test]
fn test_union_lifting_errors() {
    let m = module("Main");
    let err = check_err(&m, &call(var("Maybe"), var("Nothing")), None);
    assert!(matches!(err, ExprError::ExplicitTypeParamsRequired { .. }));

    let err = check_err(&m, &call(var("Maybe"), float(1.0)), None);
    assert!(matches!(err, ExprError::NotCaseType { .. }));

    let err = check_err(&m, &call(var("Bool"), call(var("Just"), float(1.0))), None);
    assert!(matches!(err, ExprError::NotCaseType { .. }));
}
