//! AST builders and checking harnesses shared by the tests
//!
//! There is no parser in this workspace, so test programs are assembled from
//! these builders. Spans are all zero; tests assert on error variants, not positions.

use crate::checker::{assign_to, check, Expr, ExprContext, ModuleScope};
use crate::collections::{
    collect_constants, collect_functions, collect_macros, ConstantStore, FunctionStore, MacroStore,
};
use crate::config::CheckerConfig;
use crate::error::{ExprError, ModuleError};
use crate::registry::TypeRegistry;
use crate::types::{Symbol, Type, TypeBounds};
use crate::{typecheck, CheckedModules};
use kuma_ast::*;
use num_bigint::BigInt;

pub fn sp() -> Span {
    Span::default()
}

pub fn id(name: &str) -> Identifier {
    Identifier::new(name, sp())
}

pub fn qname(name: &str) -> QualifiedName {
    QualifiedName::local(id(name))
}

pub fn module(name: &str) -> Module {
    Module::new(name, format!("{}.kuma", name))
}

pub fn core(name: &str) -> Type {
    Type::named(Symbol::new("Core", name), Vec::new())
}

pub fn named(module: &str, name: &str, args: Vec<Type>) -> Type {
    Type::named(Symbol::new(module, name), args)
}

// Type expressions

fn te(kind: TypeExpressionKind) -> TypeExpression {
    TypeExpression { kind, span: sp() }
}

pub fn t(name: &str) -> TypeExpression {
    t_args(name, vec![])
}

pub fn t_args(name: &str, args: Vec<TypeExpression>) -> TypeExpression {
    te(TypeExpressionKind::Reference { name: qname(name), args })
}

pub fn t_qualified(alias: &str, name: &str) -> TypeExpression {
    te(TypeExpressionKind::Reference {
        name: QualifiedName::qualified(id(alias), id(name)),
        args: vec![],
    })
}

pub fn t_tuple(elements: Vec<TypeExpression>) -> TypeExpression {
    te(TypeExpressionKind::Tuple(elements))
}

pub fn t_bundle(fields: Vec<(&str, TypeExpression)>) -> TypeExpression {
    te(TypeExpressionKind::Bundle(
        fields
            .into_iter()
            .map(|(name, type_expr)| BundleFieldType {
                name: id(name),
                type_expr,
                span: sp(),
            })
            .collect(),
    ))
}

pub fn t_func(input: TypeExpression, output: TypeExpression) -> TypeExpression {
    te(TypeExpressionKind::Function {
        input: Box::new(input),
        output: Box::new(output),
    })
}

pub fn t_unit() -> TypeExpression {
    t_tuple(vec![])
}

pub fn t_wild() -> TypeExpression {
    te(TypeExpressionKind::Wildcard)
}

// Declarations

fn item(kind: ItemKind) -> Item {
    Item { kind, span: sp() }
}

pub fn params(names: &[&str]) -> Vec<TypeParameter> {
    names
        .iter()
        .map(|raw| {
            let (variance, name) = match raw.strip_prefix('+') {
                Some(name) => (VarianceAnnotation::Covariant, name),
                None => match raw.strip_prefix('-') {
                    Some(name) => (VarianceAnnotation::Contravariant, name),
                    None => (VarianceAnnotation::Invariant, *raw),
                },
            };
            TypeParameter {
                name: id(name),
                variance,
                span: sp(),
            }
        })
        .collect()
}

fn type_decl(name: &str, type_params: &[&str], definition: TypeDefinition) -> TypeDeclaration {
    TypeDeclaration {
        name: id(name),
        params: params(type_params),
        definition,
        span: sp(),
    }
}

/// Options of a boxed declaration beyond its inner type
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxFlags {
    pub protected: bool,
    pub opaque: bool,
    pub as_is: bool,
}

pub fn boxed_decl(name: &str, type_params: &[&str], inner: Option<TypeExpression>, flags: BoxFlags) -> TypeDeclaration {
    type_decl(
        name,
        type_params,
        TypeDefinition::Boxed(BoxedDefinition {
            inner,
            protected: flags.protected,
            opaque: flags.opaque,
            as_is: flags.as_is,
        }),
    )
}

pub fn boxed(name: &str, type_params: &[&str], inner: TypeExpression) -> Item {
    item(ItemKind::TypeDeclaration(boxed_decl(
        name,
        type_params,
        Some(inner),
        BoxFlags::default(),
    )))
}

pub fn boxed_with(name: &str, type_params: &[&str], inner: Option<TypeExpression>, flags: BoxFlags) -> Item {
    item(ItemKind::TypeDeclaration(boxed_decl(name, type_params, inner, flags)))
}

pub fn native_type(name: &str, type_params: &[&str]) -> Item {
    item(ItemKind::TypeDeclaration(type_decl(name, type_params, TypeDefinition::Native)))
}

pub fn union(name: &str, type_params: &[&str], cases: Vec<TypeDeclaration>) -> Item {
    item(ItemKind::TypeDeclaration(type_decl(
        name,
        type_params,
        TypeDefinition::Union { cases },
    )))
}

pub fn function(
    name: &str,
    type_params: &[&str],
    input: TypeExpression,
    output: TypeExpression,
    body: Lambda,
) -> Item {
    function_with_body(name, type_params, input, output, FunctionBody::Lambda(body))
}

pub fn native_function(name: &str, type_params: &[&str], input: TypeExpression, output: TypeExpression) -> Item {
    function_with_body(name, type_params, input, output, FunctionBody::Native(format!("native_{}", name)))
}

fn function_with_body(
    name: &str,
    type_params: &[&str],
    input: TypeExpression,
    output: TypeExpression,
    body: FunctionBody,
) -> Item {
    let type_params = type_params
        .iter()
        .map(|p| FunctionTypeParameter {
            name: id(p),
            bound: None,
            span: sp(),
        })
        .collect();
    item(ItemKind::FunctionDeclaration(FunctionDeclaration {
        public: true,
        name: id(name),
        type_params,
        input,
        output,
        body,
        span: sp(),
    }))
}

/// Generic native function whose first type parameter carries a bound
pub fn bounded_native_function(
    name: &str,
    param: &str,
    kind: BoundKind,
    bound: TypeExpression,
    input: TypeExpression,
    output: TypeExpression,
) -> Item {
    item(ItemKind::FunctionDeclaration(FunctionDeclaration {
        public: true,
        name: id(name),
        type_params: vec![FunctionTypeParameter {
            name: id(param),
            bound: Some(TypeBound { kind, type_expr: bound }),
            span: sp(),
        }],
        input,
        output,
        body: FunctionBody::Native(format!("native_{}", name)),
        span: sp(),
    }))
}

pub fn constant(name: &str, declared: TypeExpression, value: Expression) -> Item {
    item(ItemKind::ConstantDeclaration(ConstantDeclaration {
        public: true,
        name: id(name),
        declared_type: declared,
        value: ConstantValue::Expression(value),
        span: sp(),
    }))
}

pub fn private(mut item: Item) -> Item {
    match &mut item.kind {
        ItemKind::FunctionDeclaration(decl) => decl.public = false,
        ItemKind::ConstantDeclaration(decl) => decl.public = false,
        ItemKind::MacroDeclaration(decl) => decl.public = false,
        ItemKind::TypeDeclaration(_) => {}
    }
    item
}

pub fn macro_def(name: &str, input: &[&str], output: Expression) -> Item {
    item(ItemKind::MacroDeclaration(MacroDeclaration {
        public: true,
        name: id(name),
        input: input.iter().map(|p| id(p)).collect(),
        output,
        span: sp(),
    }))
}

// Expressions

fn ex(kind: ExpressionKind) -> Expression {
    Expression { kind, span: sp() }
}

pub fn int(value: i128) -> Expression {
    int_literal(BigInt::from(value))
}

/// Integer literal written as decimal digits, of any size
pub fn int_digits(digits: &str) -> Expression {
    int_literal(digits.parse().expect("decimal digits"))
}

fn int_literal(value: BigInt) -> Expression {
    ex(ExpressionKind::IntegerLiteral(IntegerLiteral { value, span: sp() }))
}

pub fn float(value: f64) -> Expression {
    ex(ExpressionKind::FloatLiteral(FloatLiteral { value, span: sp() }))
}

pub fn string(value: &str) -> Expression {
    ex(ExpressionKind::StringLiteral(StringLiteral {
        value: value.to_string(),
        span: sp(),
    }))
}

pub fn tuple(elements: Vec<Expression>) -> Expression {
    ex(ExpressionKind::Tuple(elements))
}

pub fn unit() -> Expression {
    tuple(vec![])
}

fn fields(fields: Vec<(&str, Expression)>) -> Vec<BundleField> {
    fields
        .into_iter()
        .map(|(name, value)| BundleField {
            name: id(name),
            value,
            span: sp(),
        })
        .collect()
}

pub fn bundle(items: Vec<(&str, Expression)>) -> Expression {
    ex(ExpressionKind::Bundle(fields(items)))
}

pub fn update(base: Expression, items: Vec<(&str, Expression)>) -> Expression {
    ex(ExpressionKind::Update {
        base: Box::new(base),
        fields: fields(items),
    })
}

pub fn get(base: Expression, field: &str) -> Expression {
    ex(ExpressionKind::Get {
        base: Box::new(base),
        field: id(field),
    })
}

pub fn array(elements: Vec<Expression>) -> Expression {
    ex(ExpressionKind::Array(elements))
}

pub fn lambda_of(input: Pattern, output: Expression) -> Lambda {
    Lambda {
        input,
        output: Box::new(output),
        span: sp(),
    }
}

pub fn lambda(input: Pattern, output: Expression) -> Expression {
    ex(ExpressionKind::Lambda(lambda_of(input, output)))
}

pub fn binding(pattern: Pattern, declared: Option<TypeExpression>, value: Expression) -> Binding {
    Binding {
        pattern,
        declared_type: declared,
        recursive: false,
        value,
        span: sp(),
    }
}

pub fn rec_binding(name: &str, declared: Option<TypeExpression>, value: Expression) -> Binding {
    Binding {
        recursive: true,
        ..binding(p(name), declared, value)
    }
}

pub fn block(bindings: Vec<Binding>, value: Expression) -> Expression {
    ex(ExpressionKind::Block(Block {
        bindings,
        value: Box::new(value),
        span: sp(),
    }))
}

pub fn call(callee: Expression, argument: Expression) -> Expression {
    ex(ExpressionKind::Call {
        callee: Box::new(callee),
        argument: Box::new(argument),
    })
}

pub fn var(name: &str) -> Expression {
    var_args(name, vec![])
}

pub fn var_args(name: &str, type_args: Vec<TypeExpression>) -> Expression {
    ex(ExpressionKind::Reference(InlineReference {
        name: qname(name),
        type_args,
        span: sp(),
    }))
}

pub fn qvar(alias: &str, name: &str) -> Expression {
    ex(ExpressionKind::Reference(InlineReference {
        name: QualifiedName::qualified(id(alias), id(name)),
        type_args: vec![],
        span: sp(),
    }))
}

pub fn case(type_name: &str, pattern: Option<Pattern>, value: Expression) -> Branch {
    Branch {
        kind: BranchKind::Case {
            type_name: qname(type_name),
            pattern,
        },
        value,
        span: sp(),
    }
}

pub fn default(value: Expression) -> Branch {
    Branch {
        kind: BranchKind::Default,
        value,
        span: sp(),
    }
}

pub fn switch(argument: Expression, branches: Vec<Branch>) -> Expression {
    ex(ExpressionKind::Switch(Switch {
        argument: Box::new(argument),
        branches,
        span: sp(),
    }))
}

pub fn if_(condition: Expression, then_branch: Expression, else_branch: Expression) -> Expression {
    ex(ExpressionKind::If(IfExpression {
        condition: Box::new(condition),
        then_branch: Box::new(then_branch),
        else_branch: Box::new(else_branch),
        span: sp(),
    }))
}

pub fn cast(expression: Expression, target: TypeExpression) -> Expression {
    ex(ExpressionKind::Cast {
        expression: Box::new(expression),
        target,
    })
}

// Patterns

pub fn p(name: &str) -> Pattern {
    Pattern {
        kind: PatternKind::Trivial(id(name)),
        span: sp(),
    }
}

pub fn p_tuple(names: &[&str]) -> Pattern {
    Pattern {
        kind: PatternKind::Tuple(names.iter().map(|n| id(n)).collect()),
        span: sp(),
    }
}

pub fn p_bundle(items: &[(&str, Option<&str>)]) -> Pattern {
    Pattern {
        kind: PatternKind::Bundle(
            items
                .iter()
                .map(|(field, binding)| BundlePatternItem {
                    field: id(field),
                    binding: binding.map(id),
                    span: sp(),
                })
                .collect(),
        ),
        span: sp(),
    }
}

// Harnesses

/// Check `expr` inside `module`, optionally against the annotation `expected`
pub fn check_expr(module: &Module, expr: &Expression, expected: Option<TypeExpression>) -> Result<Expr, ExprError> {
    let config = CheckerConfig::default();
    let registry = TypeRegistry::register(module, &config).expect("types should register");
    let mut errors = Vec::new();
    let mut functions = FunctionStore::new();
    let mut constants = ConstantStore::new();
    let mut macros = MacroStore::new();
    collect_constants(module, &registry, &config, &mut constants, &mut errors);
    collect_macros(module, &mut macros, &mut errors);
    collect_functions(module, &registry, &config, &mut functions, &mut errors);
    assert!(errors.is_empty(), "declarations should collect: {:?}", errors);
    let scope = ModuleScope {
        module,
        registry: &registry,
        functions: &functions[&module.name],
        constants: &constants[&module.name],
        macros: &macros[&module.name],
        config: &config,
    };
    let ctx = ExprContext::new(scope, Vec::new(), TypeBounds::default());
    let expected = expected.map(|te| ctx.type_from_expr(&te)).transpose()?;
    let semi = check(expr, &ctx)?;
    assign_to(expected.as_ref(), semi, &ctx)
}

pub fn check_ok(module: &Module, expr: &Expression, expected: Option<TypeExpression>) -> Expr {
    match check_expr(module, expr, expected) {
        Ok(expr) => expr,
        Err(err) => panic!("expression should check: {:?}", err),
    }
}

pub fn check_err(module: &Module, expr: &Expression, expected: Option<TypeExpression>) -> ExprError {
    match check_expr(module, expr, expected) {
        Ok(expr) => panic!("expression should fail, got {:?}", expr.ty),
        Err(err) => err,
    }
}

pub fn typecheck_ok(module: &Module) -> CheckedModules {
    match typecheck(module, &CheckerConfig::default()) {
        Ok(checked) => checked,
        Err(errors) => panic!("module should check: {:?}", errors),
    }
}

pub fn typecheck_errors(module: &Module) -> Vec<ModuleError> {
    match typecheck(module, &CheckerConfig::default()) {
        Ok(_) => panic!("module should fail to check"),
        Err(errors) => errors,
    }
}
