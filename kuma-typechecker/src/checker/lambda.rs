//! Lambdas: checked only once the function type they must have is known

use super::{assign_to, check, Expr, ExprContext, ExprVal, SemiExpr};
use crate::error::{ErrorPoint, ExprError};
use crate::patterns::match_pattern;
use crate::types::{Repr, Type};
use kuma_ast::Lambda;

pub(super) fn assign_lambda_to<'a>(
    expected: Option<&Type>,
    lambda: &'a Lambda,
    ctx: &ExprContext<'a>,
    point: ErrorPoint,
) -> Result<Expr, ExprError> {
    let span = point.source_span();
    let expected = expected.ok_or(ExprError::ExplicitTypeRequired { span })?;
    let func = match ctx.current(expected) {
        Type::Anonymous(Repr::Func(func)) => func,
        other => {
            return Err(ExprError::LambdaAssignedToNonFuncType {
                ty: ctx.describe(&other),
                span,
            })
        }
    };
    let input = ctx.certain_type(&func.input, &point)?;
    let pattern = match_pattern(&lambda.input, &input, ctx)?;
    let body_ctx = ctx.with_locals(pattern.bindings());
    let body = check(&lambda.output, &body_ctx)?;
    let output = assign_to(Some(&func.output), body, &body_ctx)?;
    let output_ty = body_ctx.certain_type(&output.ty, &output.point)?;
    Ok(Expr::new(
        Type::func(input, output_ty),
        ExprVal::Lambda {
            input: pattern,
            output: Box::new(output),
        },
        point,
    ))
}

/// Apply a lambda literal directly; its input type comes from the argument
pub(super) fn call_lambda<'a>(
    lambda: &'a Lambda,
    l_ctx: &ExprContext<'a>,
    lambda_point: ErrorPoint,
    argument: SemiExpr<'a>,
    point: ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<Expr, ExprError> {
    let argument = assign_to(None, argument, ctx)?;
    let l_ctx = l_ctx.with_inference_from(ctx);
    let pattern = match_pattern(&lambda.input, &argument.ty, &l_ctx)?;
    let body_ctx = l_ctx.with_locals(pattern.bindings());
    let output = assign_to(None, check(&lambda.output, &body_ctx)?, &body_ctx)?;
    let output_ty = output.ty.clone();
    let function = Expr::new(
        Type::func(argument.ty.clone(), output_ty.clone()),
        ExprVal::Lambda {
            input: pattern,
            output: Box::new(output),
        },
        lambda_point,
    );
    Ok(Expr::new(
        output_ty,
        ExprVal::Call {
            function: Box::new(function),
            argument: Box::new(argument),
        },
        point,
    ))
}
