//! Core type representation for the Kuma type system
//!
//! Types are immutable values. New types are only ever produced by substitution
//! (see [`crate::generics`]); nothing here is mutated in place after construction.

use crate::error::ErrorPoint;
use indexmap::IndexMap;
use std::fmt;

/// Globally unique name of a declaration: defining module plus local name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    pub module: String,
    pub name: String,
}

impl Symbol {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.name)
    }
}

/// A type as seen by the checker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// Positional reference into the enclosing generic's parameter list
    Parameter { index: usize, being_inferred: bool },
    /// Nominal type applied to exactly `arity(name)` arguments
    Named { name: Symbol, args: Vec<Type> },
    /// Structural type
    Anonymous(Repr),
    /// Placeholder to be inferred from context
    Wildcard,
}

/// Structural representation of an anonymous type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repr {
    Unit,
    Tuple(Vec<Type>),
    Bundle(Bundle),
    Func(Func),
}

/// Named fields with fixed positional indices
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bundle {
    pub fields: IndexMap<String, Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub ty: Type,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Func {
    pub input: Box<Type>,
    pub output: Box<Type>,
}

impl Type {
    pub fn parameter(index: usize) -> Self {
        Type::Parameter {
            index,
            being_inferred: false,
        }
    }

    pub fn inferred_parameter(index: usize) -> Self {
        Type::Parameter {
            index,
            being_inferred: true,
        }
    }

    pub fn named(name: Symbol, args: Vec<Type>) -> Self {
        Type::Named { name, args }
    }

    pub fn unit() -> Self {
        Type::Anonymous(Repr::Unit)
    }

    pub fn tuple(elements: Vec<Type>) -> Self {
        Type::Anonymous(Repr::Tuple(elements))
    }

    pub fn bundle(bundle: Bundle) -> Self {
        Type::Anonymous(Repr::Bundle(bundle))
    }

    pub fn func(input: Type, output: Type) -> Self {
        Type::Anonymous(Repr::Func(Func::new(input, output)))
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Type::Anonymous(Repr::Unit))
    }

    pub fn as_named(&self) -> Option<(&Symbol, &[Type])> {
        match self {
            Type::Named { name, args } => Some((name, args)),
            _ => None,
        }
    }

    /// True when some parameter node is marked as an inference slot
    pub fn has_inference_slots(&self) -> bool {
        self.any_node(&|t| {
            matches!(
                t,
                Type::Parameter {
                    being_inferred: true,
                    ..
                }
            )
        })
    }

    pub fn has_wildcard(&self) -> bool {
        self.any_node(&|t| matches!(t, Type::Wildcard))
    }

    fn any_node(&self, pred: &dyn Fn(&Type) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        match self {
            Type::Parameter { .. } | Type::Wildcard => false,
            Type::Named { args, .. } => args.iter().any(|arg| arg.any_node(pred)),
            Type::Anonymous(repr) => match repr {
                Repr::Unit => false,
                Repr::Tuple(elements) => elements.iter().any(|el| el.any_node(pred)),
                Repr::Bundle(bundle) => bundle.fields.values().any(|f| f.ty.any_node(pred)),
                Repr::Func(func) => func.input.any_node(pred) || func.output.any_node(pred),
            },
        }
    }
}

impl Func {
    pub fn new(input: Type, output: Type) -> Self {
        Self {
            input: Box::new(input),
            output: Box::new(output),
        }
    }
}

impl Bundle {
    /// Build from fields listed in index order
    pub fn from_ordered(fields: Vec<(String, Type)>) -> Self {
        let fields = fields
            .into_iter()
            .enumerate()
            .map(|(index, (name, ty))| (name, Field { ty, index }))
            .collect();
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields sorted by positional index
    pub fn ordered(&self) -> Vec<(&String, &Field)> {
        let mut fields: Vec<_> = self.fields.iter().collect();
        fields.sort_by_key(|(_, field)| field.index);
        fields
    }
}

/// How subtyping of a parameter propagates through its container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variance {
    Invariant,
    Covariant,
    Contravariant,
    Bivariant,
}

impl Variance {
    pub fn inverse(self) -> Self {
        match self {
            Variance::Covariant => Variance::Contravariant,
            Variance::Contravariant => Variance::Covariant,
            other => other,
        }
    }
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Variance::Invariant => "invariant",
            Variance::Covariant => "covariant",
            Variance::Contravariant => "contravariant",
            Variance::Bivariant => "bivariant",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub name: String,
    pub variance: Variance,
}

impl TypeParam {
    pub fn invariant(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variance: Variance::Invariant,
        }
    }
}

/// Declared upper (`T < U`) and lower (`T > U`) bounds of type parameters, by index
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeBounds {
    pub upper: IndexMap<usize, Type>,
    pub lower: IndexMap<usize, Type>,
}

impl TypeBounds {
    pub fn is_empty(&self) -> bool {
        self.upper.is_empty() && self.lower.is_empty()
    }
}

/// One registered type declaration
#[derive(Debug, Clone, PartialEq)]
pub struct GenericType {
    pub params: Vec<TypeParam>,
    pub value: TypeVal,
    pub point: ErrorPoint,
    /// Present when this type is a case of a union
    pub case_info: Option<CaseInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeVal {
    Union(Union),
    Boxed(Boxed),
    Native,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Union {
    pub case_types: Vec<CaseType>,
}

/// A union case and, for each of its parameters, the union parameter it maps to
#[derive(Debug, Clone, PartialEq)]
pub struct CaseType {
    pub name: Symbol,
    pub params: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Boxed {
    pub inner_type: Type,
    pub protected: bool,
    pub opaque: bool,
    pub as_is: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseInfo {
    pub union_name: Symbol,
    pub union_arity: usize,
    pub case_index: usize,
    /// case parameter index -> union parameter index
    pub case_params: Vec<usize>,
}

impl GenericType {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn as_boxed(&self) -> Option<&Boxed> {
        match &self.value {
            TypeVal::Boxed(boxed) => Some(boxed),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&Union> {
        match &self.value {
            TypeVal::Union(union) => Some(union),
            _ => None,
        }
    }

    pub fn variances(&self) -> Vec<Variance> {
        self.params.iter().map(|p| p.variance).collect()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Parameter {
                index,
                being_inferred: false,
            } => write!(f, "#{}", index),
            Type::Parameter {
                index,
                being_inferred: true,
            } => write!(f, "?{}", index),
            Type::Named { name, args } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                    write!(f, "[{}]", args.join(", "))?;
                }
                Ok(())
            }
            Type::Anonymous(repr) => write!(f, "{}", repr),
            Type::Wildcard => write!(f, "_"),
        }
    }
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repr::Unit => write!(f, "()"),
            Repr::Tuple(elements) => {
                let elements: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "({})", elements.join(", "))
            }
            Repr::Bundle(bundle) => {
                let fields: Vec<String> = bundle
                    .ordered()
                    .into_iter()
                    .map(|(name, field)| format!("{}: {}", name, field.ty))
                    .collect();
                write!(f, "{{ {} }}", fields.join(", "))
            }
            Repr::Func(func) => write!(f, "({} => {})", func.input, func.output),
        }
    }
}
