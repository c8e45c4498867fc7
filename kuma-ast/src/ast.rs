// Kuma AST Definitions
// Abstract Syntax Tree nodes handed to the type checker by the module loader

use miette::SourceSpan;
use num_bigint::BigInt;
use std::fmt;

/// Source position information for AST nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub start_line_col: Option<(usize, usize)>,
    pub end_line_col: Option<(usize, usize)>,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            start_line_col: None,
            end_line_col: None,
        }
    }

    pub fn with_line_col(
        start: usize,
        end: usize,
        start_line_col: (usize, usize),
        end_line_col: (usize, usize),
    ) -> Self {
        Self {
            start,
            end,
            start_line_col: Some(start_line_col),
            end_line_col: Some(end_line_col),
        }
    }

    /// Smallest span covering both `self` and `other`
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            start_line_col: self.start_line_col,
            end_line_col: other.end_line_col,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.start.into(), span.len())
    }
}

/// Plain identifier
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

/// Name with an optional module alias prefix (`alias::Name`)
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedName {
    pub module: Option<Identifier>,
    pub name: Identifier,
    pub span: Span,
}

impl QualifiedName {
    pub fn local(name: Identifier) -> Self {
        let span = name.span;
        Self {
            module: None,
            name,
            span,
        }
    }

    pub fn qualified(module: Identifier, name: Identifier) -> Self {
        let span = module.span.to(name.span);
        Self {
            module: Some(module),
            name,
            span,
        }
    }
}

// Type expressions

/// Type expression as written in a declaration or an annotation
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpression {
    pub kind: TypeExpressionKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpressionKind {
    /// `Name` or `alias::Name[Args...]`
    Reference {
        name: QualifiedName,
        args: Vec<TypeExpression>,
    },
    Tuple(Vec<TypeExpression>),
    Bundle(Vec<BundleFieldType>),
    Function {
        input: Box<TypeExpression>,
        output: Box<TypeExpression>,
    },
    /// `_`, inferred from context
    Wildcard,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BundleFieldType {
    pub name: Identifier,
    pub type_expr: TypeExpression,
    pub span: Span,
}

// Declarations

/// Variance written on a declared type parameter (`+T`, `-T` or `T`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarianceAnnotation {
    Invariant,
    Covariant,
    Contravariant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameter {
    pub name: Identifier,
    pub variance: VarianceAnnotation,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDeclaration {
    pub name: Identifier,
    pub params: Vec<TypeParameter>,
    pub definition: TypeDefinition,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefinition {
    /// Case declarations are nested inside the union that owns them
    Union { cases: Vec<TypeDeclaration> },
    Boxed(BoxedDefinition),
    Native,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxedDefinition {
    /// `None` boxes `Unit`
    pub inner: Option<TypeExpression>,
    pub protected: bool,
    pub opaque: bool,
    pub as_is: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    /// `T < Bound`
    Upper,
    /// `T > Bound`
    Lower,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeBound {
    pub kind: BoundKind,
    pub type_expr: TypeExpression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionTypeParameter {
    pub name: Identifier,
    pub bound: Option<TypeBound>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub public: bool,
    pub name: Identifier,
    pub type_params: Vec<FunctionTypeParameter>,
    pub input: TypeExpression,
    pub output: TypeExpression,
    pub body: FunctionBody,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    Lambda(Lambda),
    Native(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantDeclaration {
    pub public: bool,
    pub name: Identifier,
    pub declared_type: TypeExpression,
    pub value: ConstantValue,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Expression(Expression),
    Native(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacroDeclaration {
    pub public: bool,
    pub name: Identifier,
    pub input: Vec<Identifier>,
    pub output: Expression,
    pub span: Span,
}

/// Top-level module items
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub kind: ItemKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    TypeDeclaration(TypeDeclaration),
    FunctionDeclaration(FunctionDeclaration),
    ConstantDeclaration(ConstantDeclaration),
    MacroDeclaration(MacroDeclaration),
}

// Expressions

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    IntegerLiteral(IntegerLiteral),
    FloatLiteral(FloatLiteral),
    StringLiteral(StringLiteral),
    Tuple(Vec<Expression>),
    Bundle(Vec<BundleField>),
    /// `base with { field: value, ... }`
    Update {
        base: Box<Expression>,
        fields: Vec<BundleField>,
    },
    /// `base.field`
    Get {
        base: Box<Expression>,
        field: Identifier,
    },
    Array(Vec<Expression>),
    Lambda(Lambda),
    Block(Block),
    Call {
        callee: Box<Expression>,
        argument: Box<Expression>,
    },
    Reference(InlineReference),
    Switch(Switch),
    If(IfExpression),
    /// `expression: Type`
    Cast {
        expression: Box<Expression>,
        target: TypeExpression,
    },
}

/// Integer literal at full precision, converted from its source digits
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerLiteral {
    pub value: BigInt,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatLiteral {
    pub value: f64,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BundleField {
    pub name: Identifier,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub input: Pattern,
    pub output: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub bindings: Vec<Binding>,
    pub value: Box<Expression>,
    pub span: Span,
}

/// `let pattern: Type = value` (or `let rec ...`)
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub pattern: Pattern,
    pub declared_type: Option<TypeExpression>,
    pub recursive: bool,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineReference {
    pub name: QualifiedName,
    pub type_args: Vec<TypeExpression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    pub argument: Box<Expression>,
    pub branches: Vec<Branch>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub kind: BranchKind,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BranchKind {
    Case {
        type_name: QualifiedName,
        pattern: Option<Pattern>,
    },
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpression {
    pub condition: Box<Expression>,
    pub then_branch: Box<Expression>,
    pub else_branch: Box<Expression>,
    pub span: Span,
}

// Patterns

#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatternKind {
    Trivial(Identifier),
    Tuple(Vec<Identifier>),
    Bundle(Vec<BundlePatternItem>),
}

/// `field` or `field: binding`
#[derive(Debug, Clone, PartialEq)]
pub struct BundlePatternItem {
    pub field: Identifier,
    pub binding: Option<Identifier>,
    pub span: Span,
}

impl BundlePatternItem {
    pub fn binding_name(&self) -> &Identifier {
        self.binding.as_ref().unwrap_or(&self.field)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.module {
            Some(module) => write!(f, "{}::{}", module, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl fmt::Display for VarianceAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarianceAnnotation::Invariant => Ok(()),
            VarianceAnnotation::Covariant => write!(f, "+"),
            VarianceAnnotation::Contravariant => write!(f, "-"),
        }
    }
}

impl fmt::Display for TypeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeExpressionKind::Reference { name, args } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "[")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, "]")?;
                }
                Ok(())
            }
            TypeExpressionKind::Tuple(elements) => {
                write!(f, "(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, ")")
            }
            TypeExpressionKind::Bundle(fields) => {
                write!(f, "{{ ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.type_expr)?;
                }
                write!(f, " }}")
            }
            TypeExpressionKind::Function { input, output } => {
                write!(f, "({} => {})", input, output)
            }
            TypeExpressionKind::Wildcard => write!(f, "_"),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PatternKind::Trivial(name) => write!(f, "{}", name),
            PatternKind::Tuple(names) => {
                let names: Vec<&str> = names.iter().map(|n| n.as_str()).collect();
                write!(f, "({})", names.join(", "))
            }
            PatternKind::Bundle(items) => {
                let items: Vec<String> = items
                    .iter()
                    .map(|item| match &item.binding {
                        Some(binding) => format!("{}: {}", item.field, binding),
                        None => item.field.name.clone(),
                    })
                    .collect();
                write!(f, "{{ {} }}", items.join(", "))
            }
        }
    }
}
