//! Assignability between types
//!
//! `assign_type(expected, given, variance)` first tries a direct structural match and
//! then falls back to unboxing: the given side when assigning covariantly, the
//! expected side when contravariantly. Invariant assignment never unboxes.
//!
//! While inferring, `expected` may contain inference slots. An unbound slot is bound
//! to whatever it meets; a bound slot only accepts an identical type.

use crate::generics::{fill_inferred, resolve};
use crate::registry::TypeRegistry;
use crate::types::{Bundle, Field, Func, Repr, Type, TypeBounds, Variance};
use crate::unbox::{unbox, UnboxResult};
use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use tracing::trace;

/// Everything assignability needs to know about where it is asked
#[derive(Debug, Clone, Copy)]
pub struct AssignContext<'a> {
    pub registry: &'a TypeRegistry,
    /// Module asking; opaque types of other modules are never unboxed
    pub module: &'a str,
    pub bounds: &'a TypeBounds,
    /// Bindings of the inference episode in progress, if any
    pub slots: Option<&'a RefCell<IndexMap<usize, Type>>>,
    /// Incremented once per unboxing step taken
    pub unbox_count: &'a Cell<usize>,
}

struct Snapshot {
    slots: Option<IndexMap<usize, Type>>,
    unbox_count: usize,
}

impl<'a> AssignContext<'a> {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            slots: self.slots.map(|slots| slots.borrow().clone()),
            unbox_count: self.unbox_count.get(),
        }
    }

    /// Undo the bindings and unboxing steps of an attempt that failed
    fn restore(&self, snapshot: Snapshot) {
        if let (Some(slots), Some(saved)) = (self.slots, snapshot.slots) {
            *slots.borrow_mut() = saved;
        }
        self.unbox_count.set(snapshot.unbox_count);
    }

    fn count_unbox(&self) {
        self.unbox_count.set(self.unbox_count.get() + 1);
    }

    /// `t` with the current bindings substituted
    pub fn current(&self, t: &Type) -> Type {
        match self.slots {
            Some(slots) => fill_inferred(t, &slots.borrow()),
            None => t.clone(),
        }
    }
}

/// Assign `given` to `expected`; the result is `expected` with its slots resolved
/// as far as this assignment determined them
pub fn assign_type(expected: &Type, given: &Type, v: Variance, ctx: &AssignContext<'_>) -> Option<Type> {
    let saved = ctx.snapshot();
    if let Some(t) = direct_assign(expected, given, v, ctx) {
        return Some(t);
    }
    ctx.restore(saved);
    let saved = ctx.snapshot();
    let unboxed = assign_unboxed(expected, given, v, ctx);
    if unboxed.is_none() {
        ctx.restore(saved);
    }
    unboxed
}

/// Retry after unwrapping one boxing layer on the side the variance allows
fn assign_unboxed(expected: &Type, given: &Type, v: Variance, ctx: &AssignContext<'_>) -> Option<Type> {
    match v {
        Variance::Covariant => {
            if matches!(given, Type::Wildcard) {
                return wildcard_to(expected, ctx);
            }
            match unbox(given, ctx.module, ctx.registry) {
                UnboxResult::Unboxed(inner) => {
                    ctx.count_unbox();
                    assign_type(expected, &inner, v, ctx)
                }
                UnboxResult::UnboxedButOpaque | UnboxResult::UnboxFailed => None,
            }
        }
        Variance::Contravariant => {
            if matches!(expected, Type::Wildcard) {
                return wildcard_to(given, ctx);
            }
            match unbox(expected, ctx.module, ctx.registry) {
                UnboxResult::Unboxed(inner) => {
                    ctx.count_unbox();
                    assign_type(&inner, given, v, ctx)
                }
                UnboxResult::UnboxedButOpaque | UnboxResult::UnboxFailed => None,
            }
        }
        Variance::Invariant | Variance::Bivariant => None,
    }
}

/// A wildcard takes the fully determined form of the other side
fn wildcard_to(other: &Type, ctx: &AssignContext<'_>) -> Option<Type> {
    match ctx.slots {
        Some(slots) => resolve(other, &slots.borrow()),
        None if other.has_inference_slots() => None,
        None => Some(other.clone()),
    }
}

/// Structural match without unboxing at the top level
pub fn direct_assign(expected: &Type, given: &Type, v: Variance, ctx: &AssignContext<'_>) -> Option<Type> {
    if let Type::Parameter {
        index,
        being_inferred: false,
    } = given
    {
        let bound = match v {
            Variance::Covariant => ctx.bounds.upper.get(index),
            Variance::Contravariant => ctx.bounds.lower.get(index),
            _ => None,
        };
        if let Some(bound) = bound {
            let saved = ctx.snapshot();
            if let Some(t) = assign_type(expected, bound, v, ctx) {
                return Some(t);
            }
            ctx.restore(saved);
        }
    }
    match expected {
        Type::Wildcard => Some(given.clone()),
        Type::Parameter {
            index,
            being_inferred: true,
        } => bind_slot(*index, given, ctx),
        Type::Parameter { index, .. } => match given {
            Type::Parameter {
                index: given_index,
                being_inferred: false,
            } if given_index == index => Some(given.clone()),
            _ => {
                let bound = match v {
                    Variance::Covariant => ctx.bounds.lower.get(index),
                    Variance::Contravariant => ctx.bounds.upper.get(index),
                    _ => None,
                };
                bound.and_then(|bound| assign_type(bound, given, v, ctx))?;
                Some(expected.clone())
            }
        },
        Type::Named { name, args } => match given {
            Type::Named {
                name: given_name,
                args: given_args,
            } if given_name == name && given_args.len() == args.len() => {
                let g = ctx.registry.get(name)?;
                let mut result = Vec::with_capacity(args.len());
                for ((arg, given_arg), param) in args.iter().zip(given_args.iter()).zip(g.params.iter()) {
                    let param_v = match v {
                        Variance::Contravariant => param.variance.inverse(),
                        Variance::Invariant => Variance::Invariant,
                        _ => param.variance,
                    };
                    let t = match param_v {
                        Variance::Bivariant => ctx.current(given_arg),
                        _ => assign_type(arg, given_arg, param_v, ctx)?,
                    };
                    result.push(t);
                }
                Some(Type::named(name.clone(), result))
            }
            _ => None,
        },
        Type::Anonymous(repr) => match (repr, given) {
            (Repr::Unit, Type::Anonymous(Repr::Unit)) => Some(Type::unit()),
            (Repr::Tuple(elements), Type::Anonymous(Repr::Tuple(given_elements)))
                if elements.len() == given_elements.len() =>
            {
                let result = elements
                    .iter()
                    .zip(given_elements.iter())
                    .map(|(el, given_el)| assign_type(el, given_el, v, ctx))
                    .collect::<Option<Vec<_>>>()?;
                Some(Type::tuple(result))
            }
            (Repr::Bundle(bundle), Type::Anonymous(Repr::Bundle(given_bundle)))
                if bundle.len() == given_bundle.len() =>
            {
                let mut fields = IndexMap::with_capacity(bundle.len());
                for (name, field) in bundle.fields.iter() {
                    let given_field = given_bundle.get(name)?;
                    if given_field.index != field.index {
                        return None;
                    }
                    let ty = assign_type(&field.ty, &given_field.ty, v, ctx)?;
                    fields.insert(
                        name.clone(),
                        Field {
                            ty,
                            index: field.index,
                        },
                    );
                }
                Some(Type::bundle(Bundle { fields }))
            }
            (Repr::Func(func), Type::Anonymous(Repr::Func(given_func))) => {
                let input = assign_type(&func.input, &given_func.input, v.inverse(), ctx)?;
                let output = assign_type(&func.output, &given_func.output, v, ctx)?;
                Some(Type::Anonymous(Repr::Func(Func::new(input, output))))
            }
            _ => None,
        },
    }
}

fn bind_slot(index: usize, given: &Type, ctx: &AssignContext<'_>) -> Option<Type> {
    let slots = ctx.slots?;
    let existing = slots.borrow().get(&index).cloned();
    match existing {
        Some(bound) => {
            if &bound == given {
                Some(bound)
            } else {
                trace!(slot = index, bound = %bound, given = %given, "inference slot conflict");
                None
            }
        }
        None => {
            trace!(slot = index, bound = %given, "inference slot bound");
            slots.borrow_mut().insert(index, given.clone());
            Some(given.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::core_symbol;
    use crate::types::Symbol;

    struct Fixture {
        registry: TypeRegistry,
        bounds: TypeBounds,
        slots: RefCell<IndexMap<usize, Type>>,
        count: Cell<usize>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                registry: TypeRegistry::core_only(),
                bounds: TypeBounds::default(),
                slots: RefCell::new(IndexMap::new()),
                count: Cell::new(0),
            }
        }

        fn ctx(&self, inferring: bool) -> AssignContext<'_> {
            AssignContext {
                registry: &self.registry,
                module: "m",
                bounds: &self.bounds,
                slots: if inferring { Some(&self.slots) } else { None },
                unbox_count: &self.count,
            }
        }
    }

    fn int() -> Type {
        Type::named(core_symbol("Int"), vec![])
    }

    #[test]
    fn test_repeated_slot_requires_equal_types() {
        let f = Fixture::new();
        let ctx = f.ctx(true);
        let expected = Type::tuple(vec![Type::inferred_parameter(0), Type::inferred_parameter(0)]);
        assert_eq!(
            assign_type(&expected, &Type::tuple(vec![int(), int()]), Variance::Covariant, &ctx),
            Some(Type::tuple(vec![int(), int()]))
        );
        f.slots.borrow_mut().clear();
        let mismatch = Type::tuple(vec![int(), Type::unit()]);
        assert_eq!(assign_type(&expected, &mismatch, Variance::Covariant, &ctx), None);
    }

    #[test]
    fn test_failed_direct_match_leaves_no_bindings() {
        let f = Fixture::new();
        let ctx = f.ctx(true);
        let expected = Type::tuple(vec![Type::inferred_parameter(0), int()]);
        let given = Type::tuple(vec![int(), Type::unit()]);
        assert_eq!(assign_type(&expected, &given, Variance::Covariant, &ctx), None);
        assert!(f.slots.borrow().is_empty());
    }

    #[test]
    fn test_wildcard_given_takes_expected() {
        let f = Fixture::new();
        let ctx = f.ctx(false);
        let expected = Type::named(core_symbol("Array"), vec![int()]);
        assert_eq!(
            assign_type(&expected, &Type::Wildcard, Variance::Covariant, &ctx),
            Some(expected.clone())
        );
        let holes = Type::named(Symbol::new("Core", "Array"), vec![Type::inferred_parameter(0)]);
        let inferring = f.ctx(true);
        assert_eq!(assign_type(&holes, &Type::Wildcard, Variance::Covariant, &inferring), None);
    }

    #[test]
    fn test_function_input_is_contravariant() {
        let f = Fixture::new();
        let ctx = f.ctx(false);
        let maybe_int = Type::named(core_symbol("Maybe"), vec![int()]);
        let just_int = Type::named(core_symbol("Just"), vec![int()]);
        // Just[Int] unboxes to Int, so (Int => ()) accepts where (Just[Int] => ()) is expected
        let expected = Type::func(just_int.clone(), Type::unit());
        let given = Type::func(int(), Type::unit());
        assert!(assign_type(&expected, &given, Variance::Covariant, &ctx).is_some());
        assert!(assign_type(&given, &expected, Variance::Covariant, &ctx).is_none());
        assert!(assign_type(&maybe_int, &maybe_int, Variance::Invariant, &ctx).is_some());
    }

    #[test]
    fn test_failed_bound_retry_takes_no_steps() {
        let mut f = Fixture::new();
        f.bounds.upper.insert(0, Type::named(core_symbol("Just"), vec![int()]));
        let ctx = f.ctx(false);
        let param = Type::parameter(0);

        let string = Type::named(core_symbol("String"), vec![]);
        assert_eq!(assign_type(&string, &param, Variance::Covariant, &ctx), None);
        assert_eq!(f.count.get(), 0);

        assert_eq!(assign_type(&int(), &param, Variance::Covariant, &ctx), Some(int()));
        assert_eq!(f.count.get(), 1);
    }
}
