//! Unboxing of named types, subject to opacity
//!
//! Every caller distinguishes "not a boxed type" from "boxed, but opaque to the
//! asking module"; the two lead to different diagnostics.

use crate::generics::fill;
use crate::registry::TypeRegistry;
use crate::types::{Boxed, Bundle, Func, Repr, Symbol, Type, Union};

#[derive(Debug, Clone, PartialEq)]
pub enum UnboxResult {
    Unboxed(Type),
    UnboxedButOpaque,
    UnboxFailed,
}

/// Outcome of looking for a specific representation through boxed wrappers
#[derive(Debug, Clone, PartialEq)]
pub enum ReprResult<T> {
    Found(T),
    FoundButOpaque,
    NotFound,
}

fn boxed_of<'r>(name: &Symbol, registry: &'r TypeRegistry) -> Option<&'r Boxed> {
    registry.get(name).and_then(|g| g.as_boxed())
}

fn is_opaque_to(boxed: &Boxed, name: &Symbol, module: &str) -> bool {
    boxed.opaque && name.module != module
}

/// Unwrap one boxing layer of `t` as seen from `module`
pub fn unbox(t: &Type, module: &str, registry: &TypeRegistry) -> UnboxResult {
    match t {
        Type::Named { name, args } => match boxed_of(name, registry) {
            Some(boxed) if is_opaque_to(boxed, name, module) => UnboxResult::UnboxedButOpaque,
            Some(boxed) => UnboxResult::Unboxed(fill(&boxed.inner_type, args)),
            None => UnboxResult::UnboxFailed,
        },
        _ => UnboxResult::UnboxFailed,
    }
}

/// Follow boxing layers until `pick` recognizes an anonymous representation
fn unbox_repr<T>(
    t: &Type,
    module: &str,
    registry: &TypeRegistry,
    pick: &dyn Fn(&Repr) -> Option<T>,
) -> ReprResult<T> {
    let mut current = t.clone();
    let mut opaque = false;
    loop {
        match &current {
            Type::Anonymous(repr) => {
                return match pick(repr) {
                    Some(_) if opaque => ReprResult::FoundButOpaque,
                    Some(found) => ReprResult::Found(found),
                    None => ReprResult::NotFound,
                };
            }
            Type::Named { name, args } => match boxed_of(name, registry) {
                Some(boxed) => {
                    opaque = opaque || is_opaque_to(boxed, name, module);
                    current = fill(&boxed.inner_type, args);
                }
                None => return ReprResult::NotFound,
            },
            Type::Parameter { .. } | Type::Wildcard => return ReprResult::NotFound,
        }
    }
}

pub fn unbox_tuple(t: &Type, module: &str, registry: &TypeRegistry) -> ReprResult<Vec<Type>> {
    unbox_repr(t, module, registry, &|repr| match repr {
        Repr::Tuple(elements) => Some(elements.clone()),
        _ => None,
    })
}

pub fn unbox_bundle(t: &Type, module: &str, registry: &TypeRegistry) -> ReprResult<Bundle> {
    unbox_repr(t, module, registry, &|repr| match repr {
        Repr::Bundle(bundle) => Some(bundle.clone()),
        _ => None,
    })
}

pub fn unbox_func(t: &Type, module: &str, registry: &TypeRegistry) -> ReprResult<Func> {
    unbox_repr(t, module, registry, &|repr| match repr {
        Repr::Func(func) => Some(func.clone()),
        _ => None,
    })
}

/// Strip every `as is` wrapper
pub fn unbox_as_is(t: &Type, registry: &TypeRegistry) -> Type {
    match t {
        Type::Named { name, args } => match boxed_of(name, registry) {
            Some(boxed) if boxed.as_is => unbox_as_is(&fill(&boxed.inner_type, args), registry),
            _ => t.clone(),
        },
        _ => t.clone(),
    }
}

/// A union type reached from `t` through boxed wrappers, with its type arguments
pub fn unbox_union<'r>(
    t: &Type,
    module: &str,
    registry: &'r TypeRegistry,
) -> ReprResult<(Symbol, &'r Union, Vec<Type>)> {
    let mut current = t.clone();
    let mut opaque = false;
    loop {
        match &current {
            Type::Named { name, args } => {
                let g = match registry.get(name) {
                    Some(g) => g,
                    None => return ReprResult::NotFound,
                };
                if let Some(union) = g.as_union() {
                    if opaque {
                        return ReprResult::FoundButOpaque;
                    }
                    return ReprResult::Found((name.clone(), union, args.clone()));
                }
                match g.as_boxed() {
                    Some(boxed) => {
                        opaque = opaque || is_opaque_to(boxed, name, module);
                        current = fill(&boxed.inner_type, args);
                    }
                    None => return ReprResult::NotFound,
                }
            }
            _ => return ReprResult::NotFound,
        }
    }
}
