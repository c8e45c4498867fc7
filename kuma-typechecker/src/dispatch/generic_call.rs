//! Instantiating one generic function, at a call or as a value

use super::describe_function;
use crate::assign::{assign_type, AssignContext};
use crate::checker::{assign_to, assign_typed_to, Expr, ExprContext, ExprVal, SemiExpr};
use crate::collections::{FunctionReference, GenericFunction};
use crate::error::{ErrorPoint, ExprError};
use crate::generics::{fill, mark_for_inference};
use crate::types::{Repr, Type, Variance};
use std::cell::Cell;
use tracing::trace;

fn function_ref(reference: &FunctionReference, args: &[Type], point: &ErrorPoint) -> Expr {
    let func = &reference.function;
    Expr::new(
        fill(&func.signature(), args),
        ExprVal::FunctionRef {
            name: func.name.clone(),
            module: reference.module.clone(),
            index: reference.index,
            type_args: args.to_vec(),
        },
        point.clone(),
    )
}

fn check_quantity(func: &GenericFunction, type_args: &[Type], type_point: &ErrorPoint) -> Result<(), ExprError> {
    if type_args.len() != func.arity() {
        return Err(ExprError::FunctionWrongTypeParamsQuantity {
            name: func.name.clone(),
            required: func.arity(),
            given: type_args.len(),
            span: type_point.source_span(),
        });
    }
    Ok(())
}

/// Every type argument must sit within the bounds its parameter declares
pub fn check_type_args_bounds(
    func: &GenericFunction,
    args: &[Type],
    point: &ErrorPoint,
    ctx: &ExprContext<'_>,
) -> Result<(), ExprError> {
    let steps = Cell::new(0);
    let assign_ctx = AssignContext {
        unbox_count: &steps,
        ..ctx.plain_assign_ctx()
    };
    let violated = |index: usize, bound: &Type| ExprError::BoundNotSatisfied {
        param: func.type_params.get(index).cloned().unwrap_or_default(),
        bound: ctx.describe(bound),
        span: point.source_span(),
    };
    for (index, bound) in func.bounds.upper.iter() {
        let (arg, bound) = (&args[*index], fill(bound, args));
        if assign_type(&bound, arg, Variance::Covariant, &assign_ctx).is_none() {
            return Err(violated(*index, &bound));
        }
    }
    for (index, bound) in func.bounds.lower.iter() {
        let (arg, bound) = (&args[*index], fill(bound, args));
        if assign_type(arg, &bound, Variance::Covariant, &assign_ctx).is_none() {
            return Err(violated(*index, &bound));
        }
    }
    Ok(())
}

/// Call `reference` with `argument`, inferring type arguments from it when none are given
pub fn generic_function_call<'a>(
    reference: &FunctionReference,
    type_args: &[Type],
    type_point: &ErrorPoint,
    argument: SemiExpr<'a>,
    point: ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<Expr, ExprError> {
    let func = &reference.function;
    let (args, argument) = if !type_args.is_empty() || func.arity() == 0 {
        check_quantity(func, type_args, type_point)?;
        check_type_args_bounds(func, type_args, type_point, ctx)?;
        let input = fill(&func.declared_type.input, type_args);
        (type_args.to_vec(), assign_to(Some(&input), argument, ctx)?)
    } else {
        let infer_ctx = ctx.with_inferring_enabled(&func.type_params);
        let input = mark_for_inference(&func.declared_type.input);
        let argument = assign_to(Some(&input), argument, &infer_ctx)?;
        let slots = infer_ctx.inferred().unwrap_or_default();
        let args = (0..func.arity())
            .map(|index| slots.get(&index).cloned())
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ExprError::ExplicitTypeParamsRequired {
                span: point.source_span(),
            })?;
        trace!(function = %func.name, ?args, "inferred call type arguments");
        check_type_args_bounds(func, &args, &point, ctx)?;
        (args, argument)
    };
    let function = function_ref(reference, &args, &point);
    Ok(Expr::new(
        fill(&func.declared_type.output, &args),
        ExprVal::Call {
            function: Box::new(function),
            argument: Box::new(argument),
        },
        point,
    ))
}

/// A function with `()` input stands for its result where a non-function value is expected
fn is_thunk_use(func: &GenericFunction, expected: Option<&Type>, ctx: &ExprContext<'_>) -> bool {
    if !func.declared_type.input.is_unit() {
        return false;
    }
    matches!(
        expected.map(|t| ctx.current(t)),
        Some(Type::Named { .. }) | Some(Type::Anonymous(Repr::Unit | Repr::Tuple(_) | Repr::Bundle(_)))
    )
}

/// Use `reference` as a value of the expected type
pub fn generic_function_assign_to(
    expected: Option<&Type>,
    reference: &FunctionReference,
    type_args: &[Type],
    type_point: &ErrorPoint,
    point: ErrorPoint,
    ctx: &ExprContext<'_>,
) -> Result<Expr, ExprError> {
    let func = &reference.function;
    let thunk = is_thunk_use(func, expected, ctx);
    let args = if !type_args.is_empty() || func.arity() == 0 {
        check_quantity(func, type_args, type_point)?;
        type_args.to_vec()
    } else {
        let expected = expected.ok_or_else(|| ExprError::ExplicitTypeParamsRequired {
            span: point.source_span(),
        })?;
        let template = if thunk {
            (*func.declared_type.output).clone()
        } else {
            func.signature()
        };
        infer_from_expected(reference, &template, expected, &point, ctx)?
    };
    check_type_args_bounds(func, &args, type_point, ctx)?;
    let function = function_ref(reference, &args, &point);
    let expr = if thunk {
        let unit = Expr::new(Type::unit(), ExprVal::Unit, point.clone());
        Expr::new(
            fill(&func.declared_type.output, &args),
            ExprVal::Call {
                function: Box::new(function),
                argument: Box::new(unit),
            },
            point,
        )
    } else {
        function
    };
    assign_typed_to(expected, expr, ctx)
}

/// Type arguments making `template` assignable to `expected`
fn infer_from_expected(
    reference: &FunctionReference,
    template: &Type,
    expected: &Type,
    point: &ErrorPoint,
    ctx: &ExprContext<'_>,
) -> Result<Vec<Type>, ExprError> {
    let func = &reference.function;
    let target = ctx.current(expected);
    if target.has_inference_slots() {
        return Err(ExprError::ExplicitTypeParamsRequired {
            span: point.source_span(),
        });
    }
    let infer_ctx = ctx.with_inferring_enabled(&func.type_params);
    let marked = mark_for_inference(template);
    if assign_type(&marked, &target, Variance::Contravariant, &infer_ctx.assign_ctx()).is_none() {
        return Err(ExprError::NotAssignable {
            from: describe_function(reference),
            to: ctx.describe(&target),
            span: point.source_span(),
        });
    }
    let slots = infer_ctx.inferred().unwrap_or_default();
    (0..func.arity())
        .map(|index| slots.get(&index).cloned())
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| ExprError::ExplicitTypeParamsRequired {
            span: point.source_span(),
        })
}
