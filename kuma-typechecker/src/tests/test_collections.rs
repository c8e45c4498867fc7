use super::helpers::*;
use crate::error::{DeclarationError, ExprError, ModuleError, TypeDeclError};
use kuma_ast::Module;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn declaration_errors(m: &Module) -> Vec<DeclarationError> {
    typecheck_errors(m)
        .iter()
        .filter_map(ModuleError::as_declaration)
        .cloned()
        .collect()
}

fn library() -> Module {
    module("Lib")
        .with_item(native_function("double", &[], t("Int"), t("Int")))
        .with_item(private(native_function("helper", &[], t("Int"), t("Int"))))
        .with_item(constant("limit", t("Int"), int(10)))
        .with_item(private(constant("secret", t("Int"), int(1))))
        .with_item(macro_def("twice", &["x"], tuple(vec![var("x"), var("x")])))
}

#[test]
fn test_identical_overloads_are_rejected() {
    let m = module("Main")
        .with_item(native_function("f", &[], t("Int"), t("Int")))
        .with_item(native_function("f", &[], t("Int"), t("Int")));
    let errors = declaration_errors(&m);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        DeclarationError::InvalidOverload { name, module, between_local: true, .. }
            if name == "f" && module == "Main"
    ));
}

#[test]
fn test_overload_clashing_with_import() {
    let m = module("Main")
        .with_import("lib", Arc::new(library()))
        .with_item(native_function("double", &[], t("Int"), t("Int")));
    let errors = declaration_errors(&m);
    assert!(matches!(
        &errors[..],
        [DeclarationError::InvalidOverload { module, between_local: false, .. }] if module == "Lib"
    ));
}

#[test]
fn test_overloads_differing_in_output_are_allowed() {
    let m = module("Main")
        .with_item(native_function("f", &[], t("Int"), t("Int")))
        .with_item(native_function("f", &[], t("Int"), t("Float")));
    let checked = typecheck_ok(&m);
    assert_eq!(checked.functions["Main"].get("f").len(), 2);
}

#[test]
fn test_only_public_declarations_are_imported() {
    let m = module("Main").with_import("lib", Arc::new(library()));
    let checked = typecheck_ok(&m);

    let functions = &checked.functions["Main"];
    let double = functions.get("double");
    assert_eq!(double.len(), 1);
    assert!(double[0].is_imported);
    assert_eq!(double[0].module, "Lib");
    assert!(functions.get("helper").is_empty());
    assert!(functions.locals().is_empty());

    let constants: Vec<_> = checked.constants["Main"].iter().map(|(sym, _)| sym.to_string()).collect();
    assert_eq!(constants, vec!["Lib::limit".to_string()]);

    let twice = checked.macros["Main"].get("twice").expect("imported macro");
    assert!(twice.is_imported);
    assert_eq!(twice.module, "Lib");
}

#[test]
fn test_imported_declarations_are_usable() {
    let m = module("Main").with_import("lib", Arc::new(library()));
    let expr = check_ok(&m, &call(var("double"), qvar("lib", "limit")), None);
    assert_eq!(expr.ty, core("Int"));

    let err = check_err(&m, &call(var("helper"), int(1)), None);
    assert!(matches!(err, ExprError::SymbolNotFound { .. }));
}

#[test]
fn test_reserved_names() {
    let m = module("Main")
        .with_item(native_function("_", &[], t("Int"), t("Int")))
        .with_item(constant("_", t("Int"), int(1)))
        .with_item(macro_def("_", &[], unit()));
    let errors = declaration_errors(&m);
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().any(|e| matches!(e, DeclarationError::InvalidFunctionName { .. })));
    assert!(errors.iter().any(|e| matches!(e, DeclarationError::InvalidConstantName { .. })));
    assert!(errors.iter().any(|e| matches!(e, DeclarationError::InvalidMacroName { .. })));
}

#[test]
fn test_duplicate_constant() {
    let m = module("Main")
        .with_item(constant("x", t("Int"), int(1)))
        .with_item(constant("x", t("Int"), int(2)));
    let errors = typecheck_errors(&m);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].module, "Main");
    assert!(matches!(
        errors[0].as_declaration(),
        Some(DeclarationError::DuplicateConstantDecl { name, .. }) if name == "x"
    ));
}

#[test]
fn test_duplicate_function_type_parameter() {
    let m = module("Main").with_item(native_function("g", &["T", "T"], t("T"), t("T")));
    let errors = declaration_errors(&m);
    assert!(matches!(
        &errors[..],
        [DeclarationError::TypeExpr(TypeDeclError::DuplicateTypeParam { name, .. })] if name == "T"
    ));
}

#[test]
fn test_macro_name_conflicts() {
    let m = module("Main")
        .with_item(macro_def("m", &[], unit()))
        .with_item(macro_def("m", &[], unit()));
    assert!(matches!(
        &declaration_errors(&m)[..],
        [DeclarationError::DuplicateMacroName { name, .. }] if name == "m"
    ));

    let m = module("Main")
        .with_import("lib", Arc::new(library()))
        .with_item(macro_def("twice", &["x"], var("x")));
    assert!(matches!(
        &declaration_errors(&m)[..],
        [DeclarationError::MacroConflictWithImported { module, .. }] if module == "Lib"
    ));
}

#[test]
fn test_macro_exported_by_two_imports() {
    let other = module("Other").with_item(macro_def("twice", &["x"], var("x")));
    let m = module("Main")
        .with_import("lib", Arc::new(library()))
        .with_import("other", Arc::new(other));
    let errors = declaration_errors(&m);
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        DeclarationError::MacroConflictBetweenModules { name, module1, module2, .. } => {
            assert_eq!(name, "twice");
            assert_eq!((module1.as_str(), module2.as_str()), ("Lib", "Other"));
        }
        other => panic!("expected a conflict between modules, got {:?}", other),
    }
}
