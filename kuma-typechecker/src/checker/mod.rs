//! Bidirectional expression checker
//!
//! `check` turns an AST expression into a [`SemiExpr`]: either a fully typed
//! [`Expr`] or a shape whose type still depends on what the context expects.
//! `assign_to` supplies that expectation and finalizes the shape.
//!
//! ## Architecture
//!
//! - [`context`] - the immutable checking context threaded through every call
//! - `check` - AST to semi-typed expression, one function per expression form
//! - `assign_to` - finalization of every semi-typed shape against an expected type
//! - `integer`, `product`, `array`, `lambda`, `block`, `switch` - the individual forms
//! - `call`, `boxing`, `reference`, `macros` - calls, boxing, name references and macro expansion

mod array;
mod assign_to;
mod block;
mod boxing;
mod call;
mod check;
pub mod context;
pub mod integer;
mod lambda;
mod macros;
mod product;
mod reference;
mod switch;

pub use assign_to::{assign_to, assign_typed_to};
pub use check::check;
pub use context::{ExprContext, InferringState, MacroExpansion, ModuleScope, ValueSymbol};
pub use integer::IntValue;

use crate::collections::FunctionReference;
use crate::error::ErrorPoint;
use crate::patterns::TypedPattern;
use crate::types::{Bundle, Symbol, Type};
use kuma_ast::Lambda;
use num_bigint::BigInt;

/// A fully typed expression
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub ty: Type,
    pub value: ExprVal,
    pub point: ErrorPoint,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprVal {
    Unit,
    Integer(IntValue),
    Float(f64),
    String(String),
    /// Tuple elements or bundle fields in index order
    Product(Vec<Expr>),
    Array(Vec<Expr>),
    Lambda {
        input: TypedPattern,
        output: Box<Expr>,
    },
    Block {
        bindings: Vec<TypedBinding>,
        value: Box<Expr>,
    },
    Call {
        function: Box<Expr>,
        argument: Box<Expr>,
    },
    /// A case value lifted into its union
    Sum {
        value: Box<Expr>,
        index: usize,
    },
    Get {
        base: Box<Expr>,
        index: usize,
    },
    Set {
        base: Box<Expr>,
        index: usize,
        value: Box<Expr>,
    },
    Switch {
        argument: Box<Expr>,
        branches: Vec<TypedBranch>,
    },
    LocalRef(String),
    ConstantRef(Symbol),
    FunctionRef {
        name: String,
        module: String,
        index: usize,
        type_args: Vec<Type>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedBinding {
    pub pattern: TypedPattern,
    pub recursive: bool,
    pub value: Expr,
}

/// One switch branch; `index` is `None` for the default branch
#[derive(Debug, Clone, PartialEq)]
pub struct TypedBranch {
    pub index: Option<usize>,
    pub pattern: Option<TypedPattern>,
    pub value: Expr,
}

impl Expr {
    pub fn new(ty: Type, value: ExprVal, point: ErrorPoint) -> Self {
        Self { ty, value, point }
    }
}

/// An expression whose type may still depend on the expected type
#[derive(Debug, Clone)]
pub struct SemiExpr<'a> {
    pub value: SemiValue<'a>,
    pub point: ErrorPoint,
}

#[derive(Debug, Clone)]
pub enum SemiValue<'a> {
    Typed(Expr),
    UntypedInteger(BigInt),
    UntypedLambda {
        lambda: &'a Lambda,
        ctx: ExprContext<'a>,
    },
    Tuple(Vec<SemiExpr<'a>>),
    Bundle(Vec<SemiField<'a>>),
    Array(Vec<SemiExpr<'a>>),
    Block {
        bindings: Vec<TypedBinding>,
        value: Box<SemiExpr<'a>>,
    },
    Switch {
        argument: Expr,
        branches: Vec<SemiBranch<'a>>,
    },
    UntypedRef(UntypedRef),
    UndecidedCall {
        name: String,
        calls: Vec<AvailableCall>,
    },
}

#[derive(Debug, Clone)]
pub struct SemiField<'a> {
    pub name: String,
    pub value: SemiExpr<'a>,
    pub point: ErrorPoint,
}

#[derive(Debug, Clone)]
pub struct SemiBranch<'a> {
    pub index: Option<usize>,
    pub pattern: Option<TypedPattern>,
    pub value: SemiExpr<'a>,
}

/// A name referring to a type constructor or an overload set
#[derive(Debug, Clone, PartialEq)]
pub struct UntypedRef {
    pub name: String,
    pub type_args: Vec<Type>,
    pub type_args_point: ErrorPoint,
    pub target: RefTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefTarget {
    Type(Symbol),
    Functions {
        functions: Vec<FunctionReference>,
        /// Type of the same name, boxed into when no overload accepts the argument
        fallback_type: Option<Symbol>,
    },
}

/// An overload that accepted the argument at minimal cost
#[derive(Debug, Clone, PartialEq)]
pub struct AvailableCall {
    pub expr: Expr,
    pub function: FunctionReference,
}

impl<'a> SemiExpr<'a> {
    pub fn new(value: SemiValue<'a>, point: ErrorPoint) -> Self {
        Self { value, point }
    }

    pub fn typed(expr: Expr) -> Self {
        let point = expr.point.clone();
        Self {
            value: SemiValue::Typed(expr),
            point,
        }
    }

    pub fn as_typed(&self) -> Option<&Expr> {
        match &self.value {
            SemiValue::Typed(expr) => Some(expr),
            _ => None,
        }
    }

    /// Type this expression takes without an expected type, if nothing in it
    /// waits for one
    pub fn synthesized_type(&self) -> Option<Type> {
        match &self.value {
            SemiValue::Typed(expr) => Some(expr.ty.clone()),
            SemiValue::Tuple(items) => items
                .iter()
                .map(SemiExpr::synthesized_type)
                .collect::<Option<Vec<_>>>()
                .map(Type::tuple),
            SemiValue::Bundle(fields) => fields
                .iter()
                .map(|f| f.value.synthesized_type().map(|t| (f.name.clone(), t)))
                .collect::<Option<Vec<_>>>()
                .map(|fields| Type::bundle(Bundle::from_ordered(fields))),
            _ => None,
        }
    }
}
