//! Tests for the Kuma type checker
//!
//! Programs are built directly as syntax trees with the builders in `helpers`.

mod helpers;

mod test_registry;

// Expression checking
mod test_boxing;
mod test_macros;
mod test_patterns;

// Collections and whole-program checking
mod test_collections;
