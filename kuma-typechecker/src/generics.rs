//! Generic substitution and inference
//!
//! Types are never mutated: every operation here rebuilds the parts of a type
//! it changes. Inference slots are `Parameter` nodes with `being_inferred` set;
//! their bindings live in a slot map owned by one inference episode.

use crate::error::invariant_violated;
use crate::types::{Bundle, Field, Func, Repr, Type};
use indexmap::IndexMap;
use tracing::trace;

/// Rebuild `t`, replacing every parameter node with `on_param(index, being_inferred)`
fn map_params(t: &Type, on_param: &mut dyn FnMut(usize, bool) -> Option<Type>) -> Option<Type> {
    Some(match t {
        Type::Parameter {
            index,
            being_inferred,
        } => on_param(*index, *being_inferred)?,
        Type::Wildcard => Type::Wildcard,
        Type::Named { name, args } => Type::Named {
            name: name.clone(),
            args: args
                .iter()
                .map(|arg| map_params(arg, on_param))
                .collect::<Option<Vec<_>>>()?,
        },
        Type::Anonymous(repr) => Type::Anonymous(match repr {
            Repr::Unit => Repr::Unit,
            Repr::Tuple(elements) => Repr::Tuple(
                elements
                    .iter()
                    .map(|el| map_params(el, on_param))
                    .collect::<Option<Vec<_>>>()?,
            ),
            Repr::Bundle(bundle) => {
                let mut fields = IndexMap::with_capacity(bundle.len());
                for (name, field) in bundle.fields.iter() {
                    fields.insert(
                        name.clone(),
                        Field {
                            ty: map_params(&field.ty, on_param)?,
                            index: field.index,
                        },
                    );
                }
                Repr::Bundle(Bundle { fields })
            }
            Repr::Func(func) => Repr::Func(Func::new(
                map_params(&func.input, on_param)?,
                map_params(&func.output, on_param)?,
            )),
        }),
    })
}

/// Substitute `args[i]` for every parameter `i` of `template`
pub fn fill(template: &Type, args: &[Type]) -> Type {
    let filled = map_params(template, &mut |index, _| match args.get(index) {
        Some(arg) => Some(arg.clone()),
        None => invariant_violated("type argument missing during substitution"),
    });
    filled.unwrap_or_else(|| invariant_violated("substitution cannot fail"))
}

/// Tag every parameter of `template` as an inference slot
pub fn mark_for_inference(template: &Type) -> Type {
    map_params(template, &mut |index, _| Some(Type::inferred_parameter(index)))
        .unwrap_or_else(|| invariant_violated("marking cannot fail"))
}

/// Replace bound inference slots, leaving unbound ones in place
pub fn fill_inferred(t: &Type, slots: &IndexMap<usize, Type>) -> Type {
    map_params(t, &mut |index, being_inferred| {
        if being_inferred {
            Some(
                slots
                    .get(&index)
                    .cloned()
                    .unwrap_or_else(|| Type::inferred_parameter(index)),
            )
        } else {
            Some(Type::parameter(index))
        }
    })
    .unwrap_or_else(|| invariant_violated("partial resolution cannot fail"))
}

/// Replace every inference slot with its binding; `None` if some slot is unbound
pub fn resolve(t: &Type, slots: &IndexMap<usize, Type>) -> Option<Type> {
    map_params(t, &mut |index, being_inferred| {
        if being_inferred {
            slots.get(&index).cloned()
        } else {
            Some(Type::parameter(index))
        }
    })
}

/// First-occurrence inference of `template`'s parameters from `given`.
///
/// Walks both types in lock-step and records the first binding seen for each
/// parameter index. Later occurrences that disagree are ignored, never rejected.
pub fn naive_infer(template: &Type, given: &Type, slots: &mut IndexMap<usize, Type>) {
    match (template, given) {
        (Type::Parameter { index, .. }, _) => {
            if !slots.contains_key(index) {
                trace!(slot = index, bound = %given, "naive inference binding");
                slots.insert(*index, given.clone());
            }
        }
        (
            Type::Named { name, args },
            Type::Named {
                name: given_name,
                args: given_args,
            },
        ) if name == given_name && args.len() == given_args.len() => {
            for (arg, given_arg) in args.iter().zip(given_args.iter()) {
                naive_infer(arg, given_arg, slots);
            }
        }
        (Type::Anonymous(repr), Type::Anonymous(given_repr)) => match (repr, given_repr) {
            (Repr::Tuple(elements), Repr::Tuple(given_elements))
                if elements.len() == given_elements.len() =>
            {
                for (el, given_el) in elements.iter().zip(given_elements.iter()) {
                    naive_infer(el, given_el, slots);
                }
            }
            (Repr::Bundle(bundle), Repr::Bundle(given_bundle)) => {
                for (name, field) in bundle.fields.iter() {
                    if let Some(given_field) = given_bundle.get(name) {
                        naive_infer(&field.ty, &given_field.ty, slots);
                    }
                }
            }
            (Repr::Func(func), Repr::Func(given_func)) => {
                naive_infer(&func.input, &given_func.input, slots);
                naive_infer(&func.output, &given_func.output, slots);
            }
            _ => {}
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Symbol;
    use pretty_assertions::assert_eq;

    fn pair(a: Type, b: Type) -> Type {
        Type::named(Symbol::new("m", "Pair"), vec![a, b])
    }

    fn int() -> Type {
        Type::named(Symbol::new("Core", "Int"), vec![])
    }

    #[test]
    fn test_fill_replaces_every_occurrence() {
        let template = Type::func(Type::parameter(0), pair(Type::parameter(1), Type::parameter(0)));
        let filled = fill(&template, &[int(), Type::unit()]);
        assert_eq!(filled, Type::func(int(), pair(Type::unit(), int())));
    }

    #[test]
    fn test_mark_keeps_indices() {
        let template = pair(Type::parameter(1), Type::tuple(vec![Type::parameter(0), Type::Wildcard]));
        let marked = mark_for_inference(&template);
        assert_eq!(
            marked,
            pair(
                Type::inferred_parameter(1),
                Type::tuple(vec![Type::inferred_parameter(0), Type::Wildcard])
            )
        );
        assert!(marked.has_inference_slots());
    }

    #[test]
    fn test_resolve_requires_every_slot() {
        let marked = pair(Type::inferred_parameter(0), Type::inferred_parameter(1));
        let mut slots = IndexMap::new();
        slots.insert(0, int());
        assert_eq!(resolve(&marked, &slots), None);
        assert_eq!(
            fill_inferred(&marked, &slots),
            pair(int(), Type::inferred_parameter(1))
        );
        slots.insert(1, Type::unit());
        assert_eq!(resolve(&marked, &slots), Some(pair(int(), Type::unit())));
    }

    #[test]
    fn test_naive_infer_keeps_first_binding() {
        let template = Type::tuple(vec![Type::parameter(0), Type::parameter(0)]);
        let given = Type::tuple(vec![int(), Type::unit()]);
        let mut slots = IndexMap::new();
        naive_infer(&template, &given, &mut slots);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[&0], int());
    }
}
