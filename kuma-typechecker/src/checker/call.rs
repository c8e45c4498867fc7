//! Calls: functions, lambdas, overload sets, boxing and macros

use super::{
    assign_to, boxing, check, lambda, macros, Expr, ExprContext, ExprVal, RefTarget, SemiExpr, SemiValue, ValueSymbol,
};
use crate::dispatch;
use crate::error::{ErrorPoint, ExprError};
use crate::unbox::{unbox_func, ReprResult};
use kuma_ast::{Expression, ExpressionKind};

pub(super) fn check_call<'a>(
    callee: &'a Expression,
    argument: &'a Expression,
    point: ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<SemiExpr<'a>, ExprError> {
    if let ExpressionKind::Reference(r) = &callee.kind {
        if let Ok(ValueSymbol::Macro(m)) = ctx.lookup_symbol(&r.name) {
            return macros::expand_macro(
                m,
                macros::macro_arguments(argument, m.macro_def.input.len()),
                point,
                ctx,
            );
        }
    }
    let function = check(callee, ctx)?;
    let argument = check(argument, ctx)?;
    let callee_point = function.point;
    match function.value {
        SemiValue::Typed(f) => call_typed(f, argument, point, ctx).map(SemiExpr::typed),
        SemiValue::UntypedLambda { lambda, ctx: l_ctx } => {
            lambda::call_lambda(lambda, &l_ctx, callee_point, argument, point, ctx).map(SemiExpr::typed)
        }
        SemiValue::UntypedRef(r) => match r.target {
            RefTarget::Type(sym) => {
                boxing::box_value(argument, &sym, &r.type_args, &r.type_args_point, &point, ctx).map(SemiExpr::typed)
            }
            RefTarget::Functions {
                functions,
                fallback_type,
            } => {
                let fallback = fallback_type.map(|sym| (sym, argument.clone()));
                let called = dispatch::overloaded_call(
                    &r.name,
                    &functions,
                    &r.type_args,
                    &r.type_args_point,
                    argument,
                    point.clone(),
                    ctx,
                );
                match (called, fallback) {
                    (Err(err), Some((sym, argument))) => {
                        boxing::box_value(argument, &sym, &r.type_args, &r.type_args_point, &point, ctx)
                            .map(SemiExpr::typed)
                            .map_err(|_| err)
                    }
                    (called, _) => called,
                }
            }
        },
        SemiValue::Block { .. } | SemiValue::Switch { .. } | SemiValue::UndecidedCall { .. } => {
            Err(ExprError::ExplicitTypeRequired {
                span: callee_point.source_span(),
            })
        }
        SemiValue::UntypedInteger(_) | SemiValue::Tuple(_) | SemiValue::Bundle(_) | SemiValue::Array(_) => {
            Err(ExprError::ExprNotCallable {
                span: callee_point.source_span(),
            })
        }
    }
}

fn call_typed<'a>(
    function: Expr,
    argument: SemiExpr<'a>,
    point: ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<Expr, ExprError> {
    let func = match unbox_func(&function.ty, ctx.module_name(), ctx.registry()) {
        ReprResult::Found(func) => func,
        ReprResult::FoundButOpaque | ReprResult::NotFound => {
            return Err(ExprError::ExprTypeNotCallable {
                ty: ctx.describe(&function.ty),
                span: function.point.source_span(),
            })
        }
    };
    let argument = assign_to(Some(&func.input), argument, ctx)?;
    Ok(Expr::new(
        (*func.output).clone(),
        ExprVal::Call {
            function: Box::new(function),
            argument: Box::new(argument),
        },
        point,
    ))
}
