use super::helpers::*;
use crate::config::CheckerConfig;
use crate::error::TypeDeclError;
use crate::registry::TypeRegistry;
use crate::types::{Symbol, Type, TypeVal, Variance};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn register(module: &kuma_ast::Module) -> TypeRegistry {
    match TypeRegistry::register(module, &CheckerConfig::default()) {
        Ok(registry) => registry,
        Err(errors) => panic!("types should register: {:?}", errors),
    }
}

fn register_errors(module: &kuma_ast::Module) -> Vec<TypeDeclError> {
    match TypeRegistry::register(module, &CheckerConfig::default()) {
        Ok(_) => panic!("registration should fail"),
        Err(errors) => errors.iter().filter_map(|e| e.as_type_decl().cloned()).collect(),
    }
}

#[test]
fn test_core_types_are_preloaded() {
    let registry = register(&module("Main"));
    let maybe = registry.get(&Symbol::new("Core", "Maybe")).unwrap();
    assert_eq!(maybe.arity(), 1);
    assert_eq!(maybe.params[0].variance, Variance::Covariant);

    let just = registry.get(&Symbol::new("Core", "Just")).unwrap();
    let info = just.case_info.as_ref().unwrap();
    assert_eq!(info.union_name, Symbol::new("Core", "Maybe"));
    assert_eq!(info.case_index, 0);
    assert_eq!(info.case_params, vec![0]);

    assert!(registry.contains(&Symbol::new("Core", "Byte")));
}

#[test]
fn test_union_cases_are_flattened_with_param_mapping() {
    let m = module("Main").with_item(union(
        "Either",
        &["+L", "+R"],
        vec![
            boxed_decl("Left", &["+L"], Some(t("L")), BoxFlags::default()),
            boxed_decl("Right", &["+R"], Some(t("R")), BoxFlags::default()),
        ],
    ));
    let registry = register(&m);

    let either = registry.get(&Symbol::new("Main", "Either")).unwrap();
    let cases: Vec<_> = either.as_union().unwrap().case_types.iter().map(|c| c.params.clone()).collect();
    assert_eq!(cases, vec![vec![0], vec![1]]);

    let right = registry.get(&Symbol::new("Main", "Right")).unwrap();
    let info = right.case_info.as_ref().unwrap();
    assert_eq!(info.case_index, 1);
    assert_eq!(info.case_params, vec![1]);
    assert_eq!(right.as_boxed().unwrap().inner_type, Type::parameter(0));
}

#[test]
fn test_duplicate_declaration() {
    let m = module("Main")
        .with_item(boxed("Age", &[], t("Int")))
        .with_item(boxed("Age", &[], t("Int")));
    let errors = register_errors(&m);
    assert!(matches!(&errors[..], [TypeDeclError::DuplicateTypeDecl { name, .. }] if name == "Main::Age"));
}

#[test]
fn test_core_name_cannot_be_redeclared() {
    let m = module("Main").with_item(native_type("Int", &[]));
    let errors = register_errors(&m);
    assert!(matches!(&errors[..], [TypeDeclError::DuplicateTypeDecl { .. }]));
}

#[test]
fn test_reserved_type_names() {
    let m = module("Main").with_item(native_type("_", &[]));
    let errors = register_errors(&m);
    assert!(matches!(&errors[..], [TypeDeclError::InvalidTypeName { .. }]));
}

#[test]
fn test_case_cannot_introduce_parameters() {
    let m = module("Main").with_item(union(
        "Wrapper",
        &["+T"],
        vec![boxed_decl("Item", &["+U"], Some(t("U")), BoxFlags::default())],
    ));
    let errors = register_errors(&m);
    assert!(matches!(
        &errors[..],
        [TypeDeclError::InvalidCaseTypeParam { param, .. }] if param == "U"
    ));
}

#[test]
fn test_wrong_arity_in_reference() {
    let m = module("Main")
        .with_item(boxed("Bare", &[], t("Array")))
        .with_item(boxed("Double", &[], t_args("Array", vec![t("Int"), t("Int")])));
    let errors = register_errors(&m);
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| matches!(
        e,
        TypeDeclError::WrongParameterQuantity { required: 1, .. }
    )));
}

#[test]
fn test_unknown_type_reference() {
    let m = module("Main").with_item(boxed("Ghost", &[], t("Missing")));
    let errors = register_errors(&m);
    assert!(matches!(&errors[..], [TypeDeclError::TypeNotFound { .. }]));
}

#[test]
fn test_circular_boxing_names_every_member() {
    let m = module("Main")
        .with_item(boxed("A", &[], t("B")))
        .with_item(boxed("B", &[], t("A")));
    let errors = register_errors(&m);
    match &errors[..] {
        [TypeDeclError::TypeCircularDependency { path, .. }] => {
            assert!(path.contains(&"Main::A".to_string()));
            assert!(path.contains(&"Main::B".to_string()));
        }
        other => panic!("expected one cycle, got {:?}", other),
    }
}

#[test]
fn test_deep_acyclic_boxing_chain() {
    let m = module("Main")
        .with_item(boxed("A", &[], t("B")))
        .with_item(boxed("B", &[], t("C")))
        .with_item(boxed("C", &[], t("D")))
        .with_item(boxed("D", &[], t_tuple(vec![t("Int"), t("String")])));
    let registry = register(&m);
    assert!(registry.contains(&Symbol::new("Main", "A")));
}

#[test]
fn test_boxed_variance_is_validated() {
    let m = module("Main").with_item(boxed("Sink", &["+T"], t_func(t("T"), t("Int"))));
    let errors = register_errors(&m);
    assert!(matches!(
        &errors[..],
        [TypeDeclError::BoxedBadVariance { bad_params, .. }] if bad_params == &vec!["T".to_string()]
    ));

    let ok = module("Main").with_item(boxed("Sink", &["-T"], t_func(t("T"), t("Int"))));
    register(&ok);
}

#[test]
fn test_too_many_union_cases() {
    let m = module("Main").with_item(union(
        "Three",
        &[],
        vec![
            boxed_decl("One", &[], None, BoxFlags::default()),
            boxed_decl("Two", &[], None, BoxFlags::default()),
            boxed_decl("Tri", &[], None, BoxFlags::default()),
        ],
    ));
    let config = CheckerConfig::default().with_sum_max_branches(2);
    let errors = match TypeRegistry::register(&m, &config) {
        Ok(_) => panic!("registration should fail"),
        Err(errors) => errors,
    };
    assert!(matches!(
        errors[0].as_type_decl(),
        Some(TypeDeclError::TooManyUnionItems { given: 3, max: 2, .. })
    ));
}

#[test]
fn test_box_without_inner_wraps_unit() {
    let m = module("Main").with_item(boxed_with(
        "Token",
        &[],
        None,
        BoxFlags {
            protected: true,
            ..BoxFlags::default()
        },
    ));
    let registry = register(&m);
    let token = registry.get(&Symbol::new("Main", "Token")).unwrap();
    match &token.value {
        TypeVal::Boxed(boxed) => {
            assert_eq!(boxed.inner_type, Type::unit());
            assert!(boxed.protected);
            assert!(!boxed.opaque);
        }
        other => panic!("expected a boxed type, got {:?}", other),
    }
}

#[test]
fn test_imported_types_are_registered_once() {
    let shared = Arc::new(module("Shared").with_item(boxed("Id", &[], t("Int"))));
    let left = Arc::new(module("Left").with_import("s", shared.clone()));
    let right = Arc::new(module("Right").with_import("s", shared));
    let main = module("Main")
        .with_import("l", left)
        .with_import("r", right)
        .with_item(boxed("Ref", &[], t_qualified("l", "Missing")));
    let errors = register_errors(&main);
    // the diamond import does not produce a duplicate declaration
    assert!(matches!(&errors[..], [TypeDeclError::TypeNotFound { .. }]));
}
