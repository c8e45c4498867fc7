//! Kuma Typechecker
//!
//! Nominal types over structural representations, with variance, boxing and
//! bidirectional checking of expressions.

// Allow clippy lints for development
#![allow(clippy::result_large_err)]
#![allow(clippy::uninlined_format_args)]
//!
//! ## Architecture
//!
//! - **Type Registry**: every type declaration of the program, with union cases flattened
//! - **Variance Analyzer**: deduces and validates how declarations use their parameters
//! - **Coercion Engine**: assignability with unboxing fallback and inference slots
//! - **Expression Checker**: semi-typed expressions finalized against expected types
//! - **Overload Resolver**: cost-based choice between overloads, deferred when tied
//! - **Exhaustiveness Checker**: switch coverage over union cases
//!
//! ## Entry point
//!
//! [`typecheck`] takes the loaded entry module and returns the registry, the
//! per-module collections and the checked declarations, or every error found.

pub mod assign;
pub mod boxing_graph;
pub mod builtins;
pub mod checker;
pub mod collections;
pub mod config;
pub mod describe;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod exhaustiveness;
pub mod generics;
pub mod patterns;
pub mod registry;
pub mod type_expr;
pub mod types;
pub mod unbox;
pub mod variance;

// Re-export public API
pub use assign::{assign_type, AssignContext};
pub use checker::{assign_to, check, Expr, ExprContext, ExprVal, ModuleScope, SemiExpr};
pub use collections::{
    ConstantCollection, FunctionCollection, FunctionReference, GenericFunction, MacroCollection,
};
pub use config::CheckerConfig;
pub use driver::{typecheck, CheckedConstant, CheckedFunction, CheckedModule, CheckedModules};
pub use error::{
    DeclarationError, ErrorPoint, ExprError, ModuleError, TypeDeclError, TypecheckError,
};
pub use registry::TypeRegistry;
pub use types::{GenericType, Symbol, Type, TypeVal, Variance};

#[cfg(test)]
mod tests;
