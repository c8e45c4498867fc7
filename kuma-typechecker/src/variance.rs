//! Variance analysis
//!
//! `variance_of` deduces, for every parameter of an enclosing declaration, how a type
//! expression uses it. The result is checked against the declared variances of boxed
//! types and union cases during registration.

use crate::error::invariant_violated;
use crate::registry::TypeRegistry;
use crate::types::{Repr, Type, TypeParam, Variance};

/// Variance of a child occurrence seen through a position of variance `position`
pub fn apply(position: Variance, child: Variance) -> Variance {
    match child {
        Variance::Covariant | Variance::Contravariant => {
            if position == Variance::Bivariant {
                child
            } else if position == child {
                Variance::Covariant
            } else if position == child.inverse() {
                Variance::Contravariant
            } else {
                Variance::Invariant
            }
        }
        // a parameter that does not occur below this position is unaffected by it
        Variance::Bivariant => Variance::Bivariant,
        Variance::Invariant => Variance::Invariant,
    }
}

/// Merge two occurrences of the same parameter
pub fn combine(a: Variance, b: Variance) -> Variance {
    match (a, b) {
        (Variance::Invariant, _) | (_, Variance::Invariant) => Variance::Invariant,
        (Variance::Bivariant, other) | (other, Variance::Bivariant) => other,
        (Variance::Covariant, Variance::Covariant) => Variance::Covariant,
        (Variance::Contravariant, Variance::Contravariant) => Variance::Contravariant,
        _ => Variance::Invariant,
    }
}

fn filled(v: Variance, arity: usize) -> Vec<Variance> {
    vec![v; arity]
}

/// Fold children's vectors through the variances of the positions they occupy
fn deduce(arity: usize, positions: &[Variance], children: &[Vec<Variance>]) -> Vec<Variance> {
    (0..arity)
        .map(|i| {
            positions
                .iter()
                .zip(children.iter())
                .fold(Variance::Bivariant, |acc, (position, child)| {
                    combine(acc, apply(*position, child[i]))
                })
        })
        .collect()
}

/// Variance vector of `t` with respect to the `arity` parameters of its context
pub fn variance_of(t: &Type, arity: usize, registry: &TypeRegistry) -> Vec<Variance> {
    match t {
        Type::Wildcard => filled(Variance::Bivariant, arity),
        Type::Parameter { index, .. } => {
            let mut v = filled(Variance::Bivariant, arity);
            match v.get_mut(*index) {
                Some(slot) => *slot = Variance::Covariant,
                None => invariant_violated("parameter index out of range in variance analysis"),
            }
            v
        }
        Type::Named { name, args } => {
            let g = match registry.get(name) {
                Some(g) => g,
                None => invariant_violated("variance analysis of an unregistered type"),
            };
            if g.arity() != args.len() {
                invariant_violated("arity mismatch in variance analysis");
            }
            let children: Vec<_> = args.iter().map(|arg| variance_of(arg, arity, registry)).collect();
            deduce(arity, &g.variances(), &children)
        }
        Type::Anonymous(repr) => match repr {
            Repr::Unit => filled(Variance::Bivariant, arity),
            Repr::Tuple(elements) => {
                let children: Vec<_> = elements
                    .iter()
                    .map(|el| variance_of(el, arity, registry))
                    .collect();
                deduce(arity, &filled(Variance::Covariant, elements.len()), &children)
            }
            Repr::Bundle(bundle) => {
                let children: Vec<_> = bundle
                    .ordered()
                    .into_iter()
                    .map(|(_, field)| variance_of(&field.ty, arity, registry))
                    .collect();
                deduce(arity, &filled(Variance::Covariant, bundle.len()), &children)
            }
            Repr::Func(func) => {
                let children = vec![
                    variance_of(&func.input, arity, registry),
                    variance_of(&func.output, arity, registry),
                ];
                deduce(
                    arity,
                    &[Variance::Contravariant, Variance::Covariant],
                    &children,
                )
            }
        },
    }
}

/// Whether a deduced variance is permitted by a declared one
pub fn permits(declared: Variance, deduced: Variance) -> bool {
    match declared {
        Variance::Covariant => matches!(deduced, Variance::Covariant | Variance::Bivariant),
        Variance::Contravariant => {
            matches!(deduced, Variance::Contravariant | Variance::Bivariant)
        }
        Variance::Bivariant => deduced == Variance::Bivariant,
        Variance::Invariant => true,
    }
}

/// Names of declared parameters whose deduced usage violates their declaration
pub fn match_variance(declared: &[TypeParam], deduced: &[Variance]) -> Result<(), Vec<String>> {
    let bad: Vec<String> = declared
        .iter()
        .zip(deduced.iter())
        .filter(|(param, v)| !permits(param.variance, **v))
        .map(|(param, _)| param.name.clone())
        .collect();
    if bad.is_empty() {
        Ok(())
    } else {
        Err(bad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Variance::*;

    #[test]
    fn test_apply_signs() {
        assert_eq!(apply(Covariant, Covariant), Covariant);
        assert_eq!(apply(Contravariant, Contravariant), Covariant);
        assert_eq!(apply(Covariant, Contravariant), Contravariant);
        assert_eq!(apply(Contravariant, Covariant), Contravariant);
        assert_eq!(apply(Bivariant, Contravariant), Contravariant);
        assert_eq!(apply(Invariant, Covariant), Invariant);
    }

    #[test]
    fn test_apply_absent_parameter() {
        for position in [Invariant, Covariant, Contravariant, Bivariant] {
            assert_eq!(apply(position, Bivariant), Bivariant);
            assert_eq!(apply(position, Invariant), Invariant);
        }
    }

    #[test]
    fn test_combine() {
        assert_eq!(combine(Invariant, Bivariant), Invariant);
        assert_eq!(combine(Bivariant, Contravariant), Contravariant);
        assert_eq!(combine(Covariant, Covariant), Covariant);
        assert_eq!(combine(Covariant, Contravariant), Invariant);
    }

    #[test]
    fn test_function_positions() {
        let registry = TypeRegistry::core_only();
        // (A => B) with params [A, B]
        let t = Type::func(Type::parameter(0), Type::parameter(1));
        assert_eq!(variance_of(&t, 2, &registry), vec![Contravariant, Covariant]);
        // ((A => Unit) => Unit): input of input is covariant
        let nested = Type::func(Type::func(Type::parameter(0), Type::unit()), Type::unit());
        assert_eq!(variance_of(&nested, 1, &registry), vec![Covariant]);
    }

    #[test]
    fn test_match_variance_reports_names() {
        let declared = vec![
            TypeParam {
                name: "A".into(),
                variance: Covariant,
            },
            TypeParam::invariant("B"),
        ];
        assert_eq!(
            match_variance(&declared, &[Contravariant, Contravariant]),
            Err(vec!["A".to_string()])
        );
        assert_eq!(match_variance(&declared, &[Bivariant, Covariant]), Ok(()));
    }
}
