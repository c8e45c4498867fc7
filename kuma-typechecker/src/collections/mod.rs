//! Per-module collections of functions, constants and macros
//!
//! Each collection is built once per module, imports first, and memoized in a
//! store keyed by module name. They are read-only once expression checking starts.

pub mod constants;
pub mod functions;
pub mod macros;

pub use constants::{collect_constants, Constant, ConstantCollection, ConstantStore};
pub use functions::{
    collect_functions, FunctionCollection, FunctionReference, FunctionStore, GenericFunction,
};
pub use macros::{collect_macros, Macro, MacroCollection, MacroReference, MacroStore};
