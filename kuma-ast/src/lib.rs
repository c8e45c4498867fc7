// Kuma AST Library
// Syntax trees and loaded modules consumed by the Kuma type checker

pub mod ast;
pub mod module;

pub use ast::*;
pub use module::*;

// Version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
