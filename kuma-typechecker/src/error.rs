//! Error types for the Kuma type checker
//!
//! Every user-facing failure is a tagged diagnostic: the miette `code` is the stable tag,
//! the variant fields are the tag-specific payload and the label carries the position.
//! Errors are grouped by the phase that reports them.

use kuma_ast::Span;
use miette::{Diagnostic, SourceSpan};
use num_bigint::BigInt;
use thiserror::Error;

/// Diagnostic anchor: source file plus position
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorPoint {
    pub file: String,
    pub span: Span,
}

impl ErrorPoint {
    pub fn new(file: impl Into<String>, span: Span) -> Self {
        Self {
            file: file.into(),
            span,
        }
    }

    pub fn source_span(&self) -> Option<SourceSpan> {
        to_source_span(Some(self.span))
    }
}

/// Convert an AST span to a miette label position
pub fn to_source_span(span: Option<Span>) -> Option<SourceSpan> {
    span.map(SourceSpan::from)
}

/// Abort on a state that earlier validation must have ruled out.
///
/// Reserved for internal invariants; user-facing conditions are always returned as errors.
#[track_caller]
pub fn invariant_violated(what: &str) -> ! {
    panic!("type system internal error: {}", what)
}

/// Main type checker error, one variant per reporting phase
#[derive(Error, Diagnostic, Debug)]
pub enum TypecheckError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    TypeDecl(#[from] TypeDeclError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Declaration(#[from] DeclarationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Expr(#[from] ExprError),
}

/// A checker error attributed to the module and file it was found in
#[derive(Error, Diagnostic, Debug)]
#[error("{error} (in module {module}, {file})")]
#[diagnostic(code(kuma::typecheck::module))]
pub struct ModuleError {
    pub module: String,
    pub file: String,
    #[diagnostic_source]
    pub error: TypecheckError,
}

impl ModuleError {
    pub fn new(module: impl Into<String>, file: impl Into<String>, error: impl Into<TypecheckError>) -> Self {
        Self {
            module: module.into(),
            file: file.into(),
            error: error.into(),
        }
    }

    pub fn as_type_decl(&self) -> Option<&TypeDeclError> {
        match &self.error {
            TypecheckError::TypeDecl(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_declaration(&self) -> Option<&DeclarationError> {
        match &self.error {
            TypecheckError::Declaration(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_expr(&self) -> Option<&ExprError> {
        match &self.error {
            TypecheckError::Expr(err) => Some(err),
            _ => None,
        }
    }
}

/// Errors in type declarations and type expressions
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum TypeDeclError {
    #[error("Duplicate type declaration: {name}")]
    #[diagnostic(
        code(kuma::typecheck::decl::duplicate_type_decl),
        help("Type names must be unique within a module and must not shadow core types")
    )]
    DuplicateTypeDecl {
        name: String,
        #[label("{name} is already declared")]
        span: Option<SourceSpan>,
    },

    #[error("Invalid type name: {name}")]
    #[diagnostic(code(kuma::typecheck::decl::invalid_type_name))]
    InvalidTypeName {
        name: String,
        #[label("reserved or malformed name")]
        span: Option<SourceSpan>,
    },

    #[error("Invalid type parameter name: {name}")]
    #[diagnostic(code(kuma::typecheck::decl::invalid_type_param_name))]
    InvalidTypeParamName {
        name: String,
        #[label("reserved or malformed name")]
        span: Option<SourceSpan>,
    },

    #[error("Duplicate type parameter: {name}")]
    #[diagnostic(code(kuma::typecheck::decl::duplicate_type_param))]
    DuplicateTypeParam {
        name: String,
        #[label("declared twice")]
        span: Option<SourceSpan>,
    },

    #[error("Case type {case_name} declares parameter {param} which its union does not have")]
    #[diagnostic(
        code(kuma::typecheck::decl::invalid_case_type_param),
        help("A case type may only use (a subset of) the parameters of its union")
    )]
    InvalidCaseTypeParam {
        case_name: String,
        param: String,
        #[label("unknown union parameter")]
        span: Option<SourceSpan>,
    },

    #[error("No such module: {alias}")]
    #[diagnostic(code(kuma::typecheck::decl::module_not_found))]
    ModuleNotFound {
        alias: String,
        #[label("not imported")]
        span: Option<SourceSpan>,
    },

    #[error("No such type: {name}")]
    #[diagnostic(code(kuma::typecheck::decl::type_not_found))]
    TypeNotFound {
        name: String,
        #[label("unknown type")]
        span: Option<SourceSpan>,
    },

    #[error("Wrong parameter quantity for {name}: {required} required but {given} given")]
    #[diagnostic(code(kuma::typecheck::decl::wrong_parameter_quantity))]
    WrongParameterQuantity {
        name: String,
        required: usize,
        given: usize,
        #[label("expected {required} type arguments")]
        span: Option<SourceSpan>,
    },

    #[error("Too many tuple or bundle items: {given} given, at most {max} allowed")]
    #[diagnostic(code(kuma::typecheck::decl::too_many_tuple_bundle_items))]
    TooManyTupleBundleItems {
        given: usize,
        max: usize,
        #[label("too many items")]
        span: Option<SourceSpan>,
    },

    #[error("Too many union cases in {name}: {given} given, at most {max} allowed")]
    #[diagnostic(code(kuma::typecheck::decl::too_many_union_items))]
    TooManyUnionItems {
        name: String,
        given: usize,
        max: usize,
        #[label("too many cases")]
        span: Option<SourceSpan>,
    },

    #[error("Invalid field name: {name}")]
    #[diagnostic(code(kuma::typecheck::decl::invalid_field_name))]
    InvalidFieldName {
        name: String,
        #[label("reserved field name")]
        span: Option<SourceSpan>,
    },

    #[error("Duplicate field: {name}")]
    #[diagnostic(code(kuma::typecheck::decl::duplicate_field))]
    DuplicateField {
        name: String,
        #[label("field declared twice")]
        span: Option<SourceSpan>,
    },

    #[error("Wildcard type is not allowed here")]
    #[diagnostic(
        code(kuma::typecheck::decl::wildcard_not_allowed),
        help("`_` can only be used where the type can be inferred from context")
    )]
    WildcardNotAllowed {
        #[label("wildcard")]
        span: Option<SourceSpan>,
    },

    #[error("Circular boxed type dependency: {}", .path.join(" -> "))]
    #[diagnostic(
        code(kuma::typecheck::decl::type_circular_dependency),
        help("A boxed type cannot (indirectly) wrap itself")
    )]
    TypeCircularDependency {
        path: Vec<String>,
        #[label("cycle starts here")]
        span: Option<SourceSpan>,
    },

    #[error("Variance of case type {case_name} does not match its union {union_name}")]
    #[diagnostic(code(kuma::typecheck::decl::case_bad_variance))]
    CaseBadVariance {
        case_name: String,
        union_name: String,
        #[label("incompatible variance")]
        span: Option<SourceSpan>,
    },

    #[error("Boxed type {name} violates the declared variance of: {}", .bad_params.join(", "))]
    #[diagnostic(
        code(kuma::typecheck::decl::boxed_bad_variance),
        help("The inner type must use each parameter consistently with its declared variance")
    )]
    BoxedBadVariance {
        name: String,
        bad_params: Vec<String>,
        #[label("inner type is not compatible")]
        span: Option<SourceSpan>,
    },
}

/// Errors while collecting functions, constants and macros
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum DeclarationError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    TypeExpr(#[from] TypeDeclError),

    #[error("Invalid function name: {name}")]
    #[diagnostic(code(kuma::typecheck::function::invalid_function_name))]
    InvalidFunctionName {
        name: String,
        #[label("reserved name")]
        span: Option<SourceSpan>,
    },

    #[error("Invalid overload of {name}: same signature already declared in module {module}")]
    #[diagnostic(
        code(kuma::typecheck::function::invalid_overload),
        help("Overloads of a name must differ in their type parameters or signature")
    )]
    InvalidOverload {
        name: String,
        module: String,
        between_local: bool,
        #[label("conflicting overload")]
        span: Option<SourceSpan>,
    },

    #[error("Invalid constant name: {name}")]
    #[diagnostic(code(kuma::typecheck::constant::invalid_constant_name))]
    InvalidConstantName {
        name: String,
        #[label("reserved name")]
        span: Option<SourceSpan>,
    },

    #[error("Duplicate constant declaration: {name}")]
    #[diagnostic(code(kuma::typecheck::constant::duplicate_constant_decl))]
    DuplicateConstantDecl {
        name: String,
        #[label("already declared")]
        span: Option<SourceSpan>,
    },

    #[error("Invalid macro name: {name}")]
    #[diagnostic(code("kuma::typecheck::macro::invalid_macro_name"))]
    InvalidMacroName {
        name: String,
        #[label("reserved name")]
        span: Option<SourceSpan>,
    },

    #[error("Duplicate macro declaration: {name}")]
    #[diagnostic(code("kuma::typecheck::macro::duplicate_macro_name"))]
    DuplicateMacroName {
        name: String,
        #[label("already declared")]
        span: Option<SourceSpan>,
    },

    #[error("Macro {name} conflicts with the macro imported from {module}")]
    #[diagnostic(code("kuma::typecheck::macro::conflict_with_imported"))]
    MacroConflictWithImported {
        name: String,
        module: String,
        #[label("conflicting declaration")]
        span: Option<SourceSpan>,
    },

    #[error("Macro {name} is exported by both {module1} and {module2}")]
    #[diagnostic(code("kuma::typecheck::macro::conflict_between_modules"))]
    MacroConflictBetweenModules {
        name: String,
        module1: String,
        module2: String,
        #[label("conflicting imports")]
        span: Option<SourceSpan>,
    },
}

/// An overload candidate that could not be used, with its printable signature
#[derive(Debug, Clone, PartialEq)]
pub struct UnavailableCandidate {
    pub description: String,
    pub error: Box<ExprError>,
}

fn describe_candidates(candidates: &[UnavailableCandidate]) -> String {
    candidates
        .iter()
        .map(|c| format!("\n  {}: {}", c.description, c.error))
        .collect()
}

fn describe_signatures(candidates: &[String]) -> String {
    candidates.iter().map(|c| format!("\n  {}", c)).collect()
}

/// Errors while checking expressions
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    TypeExpr(#[from] TypeDeclError),

    #[error("Value of type {from} is not assignable to type {to}")]
    #[diagnostic(code(kuma::typecheck::expr::not_assignable))]
    NotAssignable {
        from: String,
        to: String,
        #[label("expected {to}")]
        span: Option<SourceSpan>,
    },

    #[error("Explicit type required")]
    #[diagnostic(
        code(kuma::typecheck::expr::explicit_type_required),
        help("Add a type annotation; the type cannot be inferred from context")
    )]
    ExplicitTypeRequired {
        #[label("type unknown")]
        span: Option<SourceSpan>,
    },

    #[error("Explicit type parameters required")]
    #[diagnostic(
        code(kuma::typecheck::expr::explicit_type_params_required),
        help("Some type parameters cannot be inferred from the argument")
    )]
    ExplicitTypeParamsRequired {
        #[label("cannot infer all type parameters")]
        span: Option<SourceSpan>,
    },

    #[error("Function {name} takes {required} type parameters but {given} given")]
    #[diagnostic(code(kuma::typecheck::expr::function_wrong_type_params_quantity))]
    FunctionWrongTypeParamsQuantity {
        name: String,
        required: usize,
        given: usize,
        #[label("wrong number of type arguments")]
        span: Option<SourceSpan>,
    },

    #[error("Integer literal assigned to non-integer type {expected}")]
    #[diagnostic(code(kuma::typecheck::expr::integer_assigned_to_non_integer_type))]
    IntegerAssignedToNonIntegerType {
        expected: String,
        #[label("not an integer type")]
        span: Option<SourceSpan>,
    },

    #[error("Integer {value} overflows {kind}")]
    #[diagnostic(code(kuma::typecheck::expr::integer_overflow))]
    IntegerOverflow {
        kind: String,
        value: BigInt,
        #[label("out of range for {kind}")]
        span: Option<SourceSpan>,
    },

    #[error("Tuple literal assigned to non-tuple type {ty}")]
    #[diagnostic(code(kuma::typecheck::expr::tuple_assigned_to_non_tuple_type))]
    TupleAssignedToNonTupleType {
        ty: String,
        #[label("expected {ty}")]
        span: Option<SourceSpan>,
    },

    #[error("Bundle literal assigned to non-bundle type {ty}")]
    #[diagnostic(code(kuma::typecheck::expr::bundle_assigned_to_non_bundle_type))]
    BundleAssignedToNonBundleType {
        ty: String,
        #[label("expected {ty}")]
        span: Option<SourceSpan>,
    },

    #[error("Array literal assigned to non-array type {ty}")]
    #[diagnostic(code(kuma::typecheck::expr::array_assigned_to_non_array_type))]
    ArrayAssignedToNonArrayType {
        ty: String,
        #[label("expected {ty}")]
        span: Option<SourceSpan>,
    },

    #[error("Lambda assigned to non-function type {ty}")]
    #[diagnostic(code(kuma::typecheck::expr::lambda_assigned_to_non_func_type))]
    LambdaAssignedToNonFuncType {
        ty: String,
        #[label("expected {ty}")]
        span: Option<SourceSpan>,
    },

    #[error("Tuple size not matching: {required} required but {given} given ({given_type})")]
    #[diagnostic(code(kuma::typecheck::expr::tuple_size_not_matching))]
    TupleSizeNotMatching {
        required: usize,
        given: usize,
        given_type: String,
        #[label("wrong number of elements")]
        span: Option<SourceSpan>,
    },

    #[error("Missing field {field} of type {ty}")]
    #[diagnostic(code(kuma::typecheck::expr::missing_field))]
    MissingField {
        field: String,
        ty: String,
        #[label("field {field} missing")]
        span: Option<SourceSpan>,
    },

    #[error("Surplus field {field}")]
    #[diagnostic(code(kuma::typecheck::expr::surplus_field))]
    SurplusField {
        field: String,
        #[label("not part of the expected bundle")]
        span: Option<SourceSpan>,
    },

    #[error("Duplicate field {field}")]
    #[diagnostic(code(kuma::typecheck::expr::duplicate_field))]
    ExprDuplicateField {
        field: String,
        #[label("field given twice")]
        span: Option<SourceSpan>,
    },

    #[error("Field {field} does not exist in {target}")]
    #[diagnostic(code(kuma::typecheck::expr::field_does_not_exist))]
    FieldDoesNotExist {
        field: String,
        target: String,
        #[label("unknown field")]
        span: Option<SourceSpan>,
    },

    #[error("Cannot get a field from a value of non-bundle type {ty}")]
    #[diagnostic(code(kuma::typecheck::expr::get_from_non_bundle))]
    GetFromNonBundle {
        ty: String,
        #[label("not a bundle")]
        span: Option<SourceSpan>,
    },

    #[error("Cannot get a field from a bundle literal")]
    #[diagnostic(code(kuma::typecheck::expr::get_from_literal_bundle))]
    GetFromLiteralBundle {
        #[label("bundle literal")]
        span: Option<SourceSpan>,
    },

    #[error("Cannot get a field from opaque bundle type {ty}")]
    #[diagnostic(code(kuma::typecheck::expr::get_from_opaque_bundle))]
    GetFromOpaqueBundle {
        ty: String,
        #[label("opaque outside its module")]
        span: Option<SourceSpan>,
    },

    #[error("Cannot update a value of non-bundle type {ty}")]
    #[diagnostic(code(kuma::typecheck::expr::set_to_non_bundle))]
    SetToNonBundle {
        ty: String,
        #[label("not a bundle")]
        span: Option<SourceSpan>,
    },

    #[error("Cannot update a bundle literal")]
    #[diagnostic(
        code(kuma::typecheck::expr::set_to_literal_bundle),
        help("Write the updated fields in the literal directly")
    )]
    SetToLiteralBundle {
        #[label("bundle literal")]
        span: Option<SourceSpan>,
    },

    #[error("Cannot update opaque bundle type {ty}")]
    #[diagnostic(code(kuma::typecheck::expr::set_to_opaque_bundle))]
    SetToOpaqueBundle {
        ty: String,
        #[label("opaque outside its module")]
        span: Option<SourceSpan>,
    },

    #[error("Cannot match a value of non-tuple type {ty} with a tuple pattern")]
    #[diagnostic(code(kuma::typecheck::expr::matching_non_tuple_type))]
    MatchingNonTupleType {
        ty: String,
        #[label("not a tuple")]
        span: Option<SourceSpan>,
    },

    #[error("Cannot match opaque tuple type {ty}")]
    #[diagnostic(code(kuma::typecheck::expr::matching_opaque_tuple_type))]
    MatchingOpaqueTupleType {
        ty: String,
        #[label("opaque outside its module")]
        span: Option<SourceSpan>,
    },

    #[error("Cannot match a value of non-bundle type {ty} with a bundle pattern")]
    #[diagnostic(code(kuma::typecheck::expr::matching_non_bundle_type))]
    MatchingNonBundleType {
        ty: String,
        #[label("not a bundle")]
        span: Option<SourceSpan>,
    },

    #[error("Cannot match opaque bundle type {ty}")]
    #[diagnostic(code(kuma::typecheck::expr::matching_opaque_bundle_type))]
    MatchingOpaqueBundleType {
        ty: String,
        #[label("opaque outside its module")]
        span: Option<SourceSpan>,
    },

    #[error("Duplicate binding {name}")]
    #[diagnostic(code(kuma::typecheck::expr::duplicate_binding))]
    DuplicateBinding {
        name: String,
        #[label("bound twice")]
        span: Option<SourceSpan>,
    },

    #[error("Entire value ignored")]
    #[diagnostic(
        code(kuma::typecheck::expr::entire_value_ignored),
        help("Use a single `_` instead of a pattern that discards every element")
    )]
    EntireValueIgnored {
        #[label("every element discarded")]
        span: Option<SourceSpan>,
    },

    #[error("A name is required here")]
    #[diagnostic(
        code(kuma::typecheck::expr::binding_name_required),
        help("Recursive bindings must bind a single name")
    )]
    BindingNameRequired {
        #[label("nothing bound")]
        span: Option<SourceSpan>,
    },

    #[error("Recursive binding used on a non-lambda value")]
    #[diagnostic(code(kuma::typecheck::expr::recursive_mark_used_on_non_lambda))]
    RecursiveMarkUsedOnNonLambda {
        #[label("not a lambda")]
        span: Option<SourceSpan>,
    },

    #[error("Cannot switch on a value of non-union type {ty}")]
    #[diagnostic(code(kuma::typecheck::expr::invalid_switch_arg_type))]
    InvalidSwitchArgType {
        ty: String,
        #[label("not a union")]
        span: Option<SourceSpan>,
    },

    #[error("{ty} is not a case of union {union}")]
    #[diagnostic(code(kuma::typecheck::expr::not_branch_type))]
    NotBranchType {
        union: String,
        ty: String,
        #[label("not a case of {union}")]
        span: Option<SourceSpan>,
    },

    #[error("Case {case_name} is already checked")]
    #[diagnostic(code(kuma::typecheck::expr::checked_branch))]
    CheckedBranch {
        case_name: String,
        #[label("duplicate branch")]
        span: Option<SourceSpan>,
    },

    #[error("Duplicate default branch")]
    #[diagnostic(code(kuma::typecheck::expr::duplicate_default_branch))]
    DuplicateDefaultBranch {
        #[label("second default branch")]
        span: Option<SourceSpan>,
    },

    #[error("Incomplete match, missing: {}", .missing.join(", "))]
    #[diagnostic(
        code(kuma::typecheck::expr::incomplete_match),
        help("Add the missing branches or a default branch")
    )]
    IncompleteMatch {
        missing: Vec<String>,
        #[label("not all cases covered")]
        span: Option<SourceSpan>,
    },

    #[error("Superfluous default branch")]
    #[diagnostic(
        code(kuma::typecheck::expr::superfluous_default_branch),
        help("Every case is already covered")
    )]
    SuperfluousDefaultBranch {
        #[label("unreachable branch")]
        span: Option<SourceSpan>,
    },

    #[error("Expression is not callable")]
    #[diagnostic(code(kuma::typecheck::expr::expr_not_callable))]
    ExprNotCallable {
        #[label("not callable")]
        span: Option<SourceSpan>,
    },

    #[error("Value of type {ty} is not callable")]
    #[diagnostic(code(kuma::typecheck::expr::expr_type_not_callable))]
    ExprTypeNotCallable {
        ty: String,
        #[label("not a function")]
        span: Option<SourceSpan>,
    },

    #[error("Cannot box non-boxed type {name}")]
    #[diagnostic(code(kuma::typecheck::expr::box_non_boxed_type))]
    BoxNonBoxedType {
        name: String,
        #[label("not a boxed type")]
        span: Option<SourceSpan>,
    },

    #[error("Cannot box protected type {name} outside its module")]
    #[diagnostic(code(kuma::typecheck::expr::box_protected_type))]
    BoxProtectedType {
        name: String,
        #[label("protected")]
        span: Option<SourceSpan>,
    },

    #[error("Cannot box opaque type {name} outside its module")]
    #[diagnostic(code(kuma::typecheck::expr::box_opaque_type))]
    BoxOpaqueType {
        name: String,
        #[label("opaque")]
        span: Option<SourceSpan>,
    },

    #[error("{ty} is not a case type of union {union}")]
    #[diagnostic(code(kuma::typecheck::expr::not_case_type))]
    NotCaseType {
        ty: String,
        union: String,
        #[label("not a case of {union}")]
        span: Option<SourceSpan>,
    },

    #[error("None of the overloads of {name} are callable:{}", describe_candidates(.candidates))]
    #[diagnostic(code(kuma::typecheck::expr::none_of_functions_callable))]
    NoneOfFunctionsCallable {
        name: String,
        candidates: Vec<UnavailableCandidate>,
        #[label("no matching overload")]
        span: Option<SourceSpan>,
    },

    #[error("None of the overloads of {name} are assignable to {to}:{}", describe_candidates(.candidates))]
    #[diagnostic(code(kuma::typecheck::expr::none_of_functions_assignable))]
    NoneOfFunctionsAssignable {
        name: String,
        to: String,
        candidates: Vec<UnavailableCandidate>,
        #[label("no matching overload")]
        span: Option<SourceSpan>,
    },

    #[error("Ambiguous call to {name}, candidates:{}", describe_signatures(.candidates))]
    #[diagnostic(
        code(kuma::typecheck::expr::ambiguous_call),
        help("Annotate the expected result type to pick one overload")
    )]
    AmbiguousCall {
        name: String,
        candidates: Vec<String>,
        #[label("ambiguous")]
        span: Option<SourceSpan>,
    },

    #[error("Ambiguous reference to {name}, candidates:{}", describe_signatures(.candidates))]
    #[diagnostic(code(kuma::typecheck::expr::ambiguous_function_assign))]
    AmbiguousFunctionAssign {
        name: String,
        candidates: Vec<String>,
        #[label("ambiguous")]
        span: Option<SourceSpan>,
    },

    #[error("Type arguments given to a value that takes none")]
    #[diagnostic(code(kuma::typecheck::expr::superfluous_type_args))]
    SuperfluousTypeArgs {
        #[label("not generic")]
        span: Option<SourceSpan>,
    },

    #[error("Type argument for {param} does not satisfy its bound {bound}")]
    #[diagnostic(code(kuma::typecheck::expr::bound_not_satisfied))]
    BoundNotSatisfied {
        param: String,
        bound: String,
        #[label("bound violated")]
        span: Option<SourceSpan>,
    },

    #[error("No such value or type: {name}")]
    #[diagnostic(code(kuma::typecheck::expr::symbol_not_found))]
    SymbolNotFound {
        name: String,
        #[label("unknown name")]
        span: Option<SourceSpan>,
    },

    #[error("Type parameter {name} cannot be used as a value")]
    #[diagnostic(code(kuma::typecheck::expr::type_param_used_as_value))]
    TypeParamUsedAsValue {
        name: String,
        #[label("type parameter")]
        span: Option<SourceSpan>,
    },

    #[error("Macro {name} cannot be used as a value")]
    #[diagnostic(
        code(kuma::typecheck::expr::macro_used_as_value),
        help("Call the macro with its arguments instead")
    )]
    MacroUsedAsValue {
        name: String,
        #[label("macro")]
        span: Option<SourceSpan>,
    },

    #[error("Macro {name} takes {required} arguments but {given} given")]
    #[diagnostic(code(kuma::typecheck::expr::macro_wrong_args_quantity))]
    MacroWrongArgsQuantity {
        name: String,
        required: usize,
        given: usize,
        #[label("wrong number of arguments")]
        span: Option<SourceSpan>,
    },

    #[error("Macro {name} expands into itself")]
    #[diagnostic(code(kuma::typecheck::expr::macro_circular_expanding))]
    MacroCircularExpanding {
        name: String,
        #[label("circular expansion")]
        span: Option<SourceSpan>,
    },

    #[error("Error while expanding macro {name}: {deeper}")]
    #[diagnostic(code(kuma::typecheck::expr::macro_expanding_failed))]
    MacroExpandingFailed {
        name: String,
        #[diagnostic_source]
        deeper: Box<ExprError>,
        #[label("expanded here")]
        span: Option<SourceSpan>,
    },
}

impl std::borrow::Borrow<dyn Diagnostic> for Box<ExprError> {
    fn borrow(&self) -> &(dyn Diagnostic + 'static) {
        self.as_ref()
    }
}
