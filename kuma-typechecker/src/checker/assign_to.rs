//! Finalization of semi-typed expressions against an expected type

use super::{
    array, block, boxing, integer, lambda, product, reference, switch, Expr, ExprContext, ExprVal, SemiExpr,
    SemiValue,
};
use crate::assign::assign_type;
use crate::dispatch;
use crate::error::ExprError;
use crate::types::{Symbol, Type, Variance};

/// Finalize `semi`. With no expected type, the expression types itself or fails.
///
/// A value that does not fit an expected boxed type is retried by boxing it
/// into that type, provided the type may be constructed here. When boxing
/// fails too, the original mismatch is reported.
pub fn assign_to<'a>(expected: Option<&Type>, semi: SemiExpr<'a>, ctx: &ExprContext<'a>) -> Result<Expr, ExprError> {
    let auto_box = expected.and_then(|exp| auto_box_target(&ctx.current(exp), ctx));
    let (sym, args) = match auto_box {
        Some(target) => target,
        None => return assign_semi(expected, semi, ctx),
    };
    let fallback = semi.clone();
    let saved = ctx.inferred();
    let saved_steps = ctx.unbox_steps();
    let err = match assign_semi(expected, semi, ctx) {
        Ok(expr) => return Ok(expr),
        Err(err) => err,
    };
    ctx.restore_inferred(saved.clone());
    ctx.restore_unbox_steps(saved_steps);
    let point = fallback.point.clone();
    match boxing::box_value(fallback, &sym, &args, &point, &point, ctx) {
        Ok(boxed) => {
            ctx.count_auto_box();
            Ok(boxed)
        }
        Err(_) => {
            ctx.restore_inferred(saved);
            ctx.restore_unbox_steps(saved_steps);
            Err(err)
        }
    }
}

/// Boxed type a value may be implicitly wrapped into
fn auto_box_target(expected: &Type, ctx: &ExprContext<'_>) -> Option<(Symbol, Vec<Type>)> {
    let (name, args) = expected.as_named()?;
    let boxed = ctx.registry().get(name)?.as_boxed()?;
    if boxed.protected || boxed.opaque {
        return None;
    }
    Some((name.clone(), args.to_vec()))
}

fn assign_semi<'a>(expected: Option<&Type>, semi: SemiExpr<'a>, ctx: &ExprContext<'a>) -> Result<Expr, ExprError> {
    let point = semi.point;
    match semi.value {
        SemiValue::Typed(expr) => assign_typed_to(expected, expr, ctx),
        SemiValue::UntypedInteger(value) => integer::assign_integer_to(expected, value, point, ctx),
        SemiValue::UntypedLambda { lambda, ctx: l_ctx } => {
            lambda::assign_lambda_to(expected, lambda, &l_ctx.with_inference_from(ctx), point)
        }
        SemiValue::Tuple(items) => product::assign_tuple_to(expected, items, point, ctx),
        SemiValue::Bundle(fields) => product::assign_bundle_to(expected, fields, point, ctx),
        SemiValue::Array(items) => array::assign_array_to(expected, items, point, ctx),
        SemiValue::Block { bindings, value } => block::assign_block_to(expected, bindings, *value, point, ctx),
        SemiValue::Switch { argument, branches } => {
            switch::assign_switch_to(expected, argument, branches, point, ctx)
        }
        SemiValue::UntypedRef(r) => reference::assign_ref_to(expected, r, point, ctx),
        SemiValue::UndecidedCall { name, calls } => {
            dispatch::assign_undecided_to(expected, &name, calls, point, ctx)
        }
    }
}

/// Assign an already typed expression, lifting a case value into its union
pub fn assign_typed_to(expected: Option<&Type>, expr: Expr, ctx: &ExprContext<'_>) -> Result<Expr, ExprError> {
    let expected = match expected {
        Some(t) => t,
        None => return Ok(expr),
    };
    if let Some(lifted) = lift_case(expected, &expr, ctx) {
        return lifted;
    }
    match assign_type(expected, &expr.ty, Variance::Covariant, &ctx.assign_ctx()) {
        Some(ty) => Ok(Expr { ty, ..expr }),
        None => Err(ExprError::NotAssignable {
            from: ctx.describe(&expr.ty),
            to: ctx.describe(expected),
            span: expr.point.source_span(),
        }),
    }
}

/// `Sum` of a case value assigned to its own union, or `None` when `expr` is not such a case
fn lift_case(expected: &Type, expr: &Expr, ctx: &ExprContext<'_>) -> Option<Result<Expr, ExprError>> {
    let registry = ctx.registry();
    let current = ctx.current(expected);
    let (union_name, union_args) = current.as_named()?;
    let union_decl = registry.get(union_name)?;
    union_decl.as_union()?;
    let (case_name, case_args) = expr.ty.as_named()?;
    let info = registry.get(case_name)?.case_info.as_ref()?;
    if &info.union_name != union_name {
        return None;
    }
    let not_assignable = || ExprError::NotAssignable {
        from: ctx.describe(&expr.ty),
        to: ctx.describe(&current),
        span: expr.point.source_span(),
    };
    let assign_ctx = ctx.assign_ctx();
    for (case_arg, union_index) in case_args.iter().zip(info.case_params.iter()) {
        let (union_arg, param) = match (union_args.get(*union_index), union_decl.params.get(*union_index)) {
            (Some(arg), Some(param)) => (arg, param),
            _ => return Some(Err(not_assignable())),
        };
        if param.variance == Variance::Bivariant {
            continue;
        }
        if assign_type(union_arg, case_arg, param.variance, &assign_ctx).is_none() {
            return Some(Err(not_assignable()));
        }
    }
    Some(Ok(Expr::new(
        ctx.current(&current),
        ExprVal::Sum {
            value: Box::new(expr.clone()),
            index: info.case_index,
        },
        expr.point.clone(),
    )))
}
