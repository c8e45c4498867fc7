use super::helpers::*;
use crate::error::ExprError;
use crate::types::Type;
use kuma_ast::Module;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn macros() -> Module {
    module("Main")
        .with_item(macro_def("swap", &["a", "b"], tuple(vec![var("b"), var("a")])))
        .with_item(macro_def("same", &["x"], var("x")))
        .with_item(macro_def("forever", &["x"], call(var("forever"), var("x"))))
        .with_item(macro_def("field", &["x"], get(var("x"), "f")))
        .with_item(macro_def(
            "with_label",
            &["x"],
            block(vec![binding(p("a"), None, string("label"))], tuple(vec![var("x"), var("a")])),
        ))
}

#[test]
fn test_expansion_substitutes_arguments() {
    let m = macros();
    let expr = check_ok(&m, &call(var("swap"), tuple(vec![float(1.0), string("x")])), None);
    assert_eq!(expr.ty, Type::tuple(vec![core("String"), core("Float")]));
}

#[test]
fn test_expansion_stays_semi_typed() {
    let m = macros();
    let expr = check_ok(&m, &call(var("same"), int(3)), Some(t("Int8")));
    assert_eq!(expr.ty, core("Int8"));
}

#[test]
fn test_arguments_resolve_at_the_call_site() {
    let m = macros();
    let expr = block(
        vec![binding(p("a"), None, float(1.0))],
        call(var("with_label"), var("a")),
    );
    let checked = check_ok(&m, &expr, None);
    assert_eq!(checked.ty, Type::tuple(vec![core("Float"), core("String")]));
}

#[test]
fn test_single_parameter_takes_a_whole_tuple() {
    let m = macros();
    let expr = check_ok(&m, &call(var("same"), tuple(vec![float(1.0), string("s")])), None);
    assert_eq!(expr.ty, Type::tuple(vec![core("Float"), core("String")]));
}

#[test]
fn test_wrong_argument_count() {
    let m = macros();
    let err = check_err(&m, &call(var("swap"), float(1.0)), None);
    assert!(matches!(
        err,
        ExprError::MacroWrongArgsQuantity { required: 2, given: 1, .. }
    ));
}

#[test]
fn test_circular_expansion() {
    let m = macros();
    let err = check_err(&m, &call(var("forever"), float(1.0)), None);
    match err {
        ExprError::MacroExpandingFailed { name, deeper, .. } => {
            assert_eq!(name, "forever");
            assert!(matches!(*deeper, ExprError::MacroCircularExpanding { .. }));
        }
        other => panic!("expected a failed expansion, got {:?}", other),
    }
}

#[test]
fn test_errors_inside_body_name_the_macro() {
    let m = macros();
    let err = check_err(&m, &call(var("field"), float(1.0)), None);
    assert!(matches!(
        err,
        ExprError::MacroExpandingFailed { ref deeper, .. } if matches!(**deeper, ExprError::GetFromNonBundle { .. })
    ));
}

#[test]
fn test_macro_used_as_value() {
    let m = macros();
    let err = check_err(&m, &var("swap"), None);
    assert!(matches!(err, ExprError::MacroUsedAsValue { ref name, .. } if name == "swap"));
}

#[test]
fn test_imported_macro() {
    let lib = module("Lib").with_item(macro_def("pair", &["x"], tuple(vec![var("x"), var("x")])));
    let m = module("Main").with_import("lib", Arc::new(lib));
    let expr = check_ok(&m, &call(var("pair"), string("s")), None);
    assert_eq!(expr.ty, Type::tuple(vec![core("String"), core("String")]));
}
