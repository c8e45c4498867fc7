//! Overload resolution
//!
//! Every candidate of an overload set is tried against the argument in a
//! forked context. The cost of a candidate is the number of unboxing steps its
//! argument needed; the cheapest candidates win. A tie is kept as an undecided
//! call until the expected result type picks exactly one.

mod generic_call;

pub use generic_call::{check_type_args_bounds, generic_function_assign_to, generic_function_call};

use crate::assign::direct_assign;
use crate::checker::{AvailableCall, Expr, ExprContext, SemiExpr, SemiValue};
use crate::collections::FunctionReference;
use crate::describe::{describe_type, DescribeContext};
use crate::error::{ErrorPoint, ExprError, UnavailableCandidate};
use crate::generics::naive_infer;
use crate::types::{Type, Variance};
use tracing::trace;

/// `name[T, U]: (A => B)`
pub fn describe_function(reference: &FunctionReference) -> String {
    let func = &reference.function;
    let ctx = DescribeContext::new(&func.type_params, &reference.module);
    let params = if func.type_params.is_empty() {
        String::new()
    } else {
        format!("[{}]", func.type_params.join(", "))
    };
    format!(
        "{}::{}{}: ({})",
        reference.module,
        func.name,
        params,
        describe_type(&func.signature(), &ctx)
    )
}

fn unavailable(reference: &FunctionReference, error: ExprError) -> UnavailableCandidate {
    UnavailableCandidate {
        description: describe_function(reference),
        error: Box::new(error),
    }
}

pub fn overloaded_call<'a>(
    name: &str,
    functions: &[FunctionReference],
    type_args: &[Type],
    type_point: &ErrorPoint,
    argument: SemiExpr<'a>,
    point: ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<SemiExpr<'a>, ExprError> {
    if let [single] = functions {
        return generic_function_call(single, type_args, type_point, argument, point, ctx).map(SemiExpr::typed);
    }
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    for reference in functions {
        let fork = ctx.fork();
        match generic_function_call(reference, type_args, type_point, argument.clone(), point.clone(), &fork) {
            Ok(expr) => {
                let cost = fork.unbox_steps();
                trace!(candidate = %describe_function(reference), cost, "overload accepted");
                accepted.push((cost, expr, fork, reference));
            }
            Err(err) => {
                trace!(candidate = %describe_function(reference), error = %err, "overload rejected");
                rejected.push(unavailable(reference, err));
            }
        }
    }
    let min_cost = match accepted.iter().map(|(cost, ..)| *cost).min() {
        Some(cost) => cost,
        None => {
            return Err(ExprError::NoneOfFunctionsCallable {
                name: name.to_string(),
                candidates: rejected,
                span: point.source_span(),
            })
        }
    };
    let mut cheapest: Vec<_> = accepted.into_iter().filter(|(cost, ..)| *cost == min_cost).collect();
    if cheapest.len() == 1 {
        if let Some((_, expr, fork, _)) = cheapest.pop() {
            ctx.merge_from(&fork);
            return Ok(SemiExpr::typed(expr));
        }
    }
    trace!(name, candidates = cheapest.len(), cost = min_cost, "undecided call");
    let calls = cheapest
        .into_iter()
        .map(|(_, expr, _, reference)| AvailableCall {
            expr,
            function: reference.clone(),
        })
        .collect();
    Ok(SemiExpr::new(
        SemiValue::UndecidedCall {
            name: name.to_string(),
            calls,
        },
        point,
    ))
}

/// Pick the one undecided candidate whose result is exactly the expected type
pub fn assign_undecided_to(
    expected: Option<&Type>,
    name: &str,
    calls: Vec<AvailableCall>,
    point: ErrorPoint,
    ctx: &ExprContext<'_>,
) -> Result<Expr, ExprError> {
    let ambiguous = |calls: Vec<&FunctionReference>| ExprError::AmbiguousCall {
        name: name.to_string(),
        candidates: calls.into_iter().map(describe_function).collect(),
        span: point.source_span(),
    };
    let expected = match expected {
        Some(t) => t,
        None => return Err(ambiguous(calls.iter().map(|c| &c.function).collect())),
    };
    let mut exact = Vec::new();
    let mut rejected = Vec::new();
    for call in calls {
        let fork = ctx.fork();
        if let Some(mut slots) = fork.inferred() {
            naive_infer(&fork.current(expected), &call.expr.ty, &mut slots);
            fork.restore_inferred(Some(slots));
        }
        let target = fork.current(expected);
        match direct_assign(&target, &call.expr.ty, Variance::Invariant, &fork.assign_ctx()) {
            Some(ty) => exact.push((Expr { ty, ..call.expr }, fork, call.function)),
            None => {
                let err = ExprError::NotAssignable {
                    from: fork.describe(&call.expr.ty),
                    to: fork.describe(&target),
                    span: point.source_span(),
                };
                rejected.push(unavailable(&call.function, err));
            }
        }
    }
    match exact.len() {
        0 => Err(ExprError::NoneOfFunctionsAssignable {
            name: name.to_string(),
            to: ctx.describe(expected),
            candidates: rejected,
            span: point.source_span(),
        }),
        1 => {
            let (expr, fork, _) = exact.remove(0);
            ctx.merge_from(&fork);
            Ok(expr)
        }
        _ => Err(ambiguous(exact.iter().map(|(_, _, f)| f).collect())),
    }
}

/// An overload set used as a value
pub fn overloaded_assign_to(
    expected: Option<&Type>,
    name: &str,
    functions: &[FunctionReference],
    type_args: &[Type],
    type_point: &ErrorPoint,
    point: ErrorPoint,
    ctx: &ExprContext<'_>,
) -> Result<Expr, ExprError> {
    if let [single] = functions {
        return generic_function_assign_to(expected, single, type_args, type_point, point, ctx);
    }
    let mut matched = Vec::new();
    let mut rejected = Vec::new();
    for reference in functions {
        let fork = ctx.fork();
        match generic_function_assign_to(expected, reference, type_args, type_point, point.clone(), &fork) {
            Ok(expr) => matched.push((expr, fork, reference)),
            Err(err) => rejected.push(unavailable(reference, err)),
        }
    }
    match matched.len() {
        0 => Err(ExprError::NoneOfFunctionsAssignable {
            name: name.to_string(),
            to: expected.map(|t| ctx.describe(t)).unwrap_or_else(|| "_".to_string()),
            candidates: rejected,
            span: point.source_span(),
        }),
        1 => {
            let (expr, fork, _) = matched.remove(0);
            ctx.merge_from(&fork);
            Ok(expr)
        }
        _ => Err(ExprError::AmbiguousFunctionAssign {
            name: name.to_string(),
            candidates: matched.iter().map(|(_, _, f)| describe_function(f)).collect(),
            span: point.source_span(),
        }),
    }
}
