//! Blocks of bindings followed by a value

use super::{assign_to, check, Expr, ExprContext, ExprVal, SemiExpr, SemiValue, TypedBinding};
use crate::builtins::IGNORE_MARK;
use crate::error::{ErrorPoint, ExprError};
use crate::patterns::match_pattern;
use crate::types::Type;
use kuma_ast::{Binding, Block, ExpressionKind, PatternKind};

pub(super) fn check_block<'a>(
    block: &'a Block,
    point: ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<SemiExpr<'a>, ExprError> {
    let mut current = ctx.clone();
    let mut bindings = Vec::with_capacity(block.bindings.len());
    for binding in &block.bindings {
        let typed = check_binding(binding, &current)?;
        current = current.with_locals(typed.pattern.bindings());
        bindings.push(typed);
    }
    let value = check(&block.value, &current)?;
    match value.value {
        SemiValue::Typed(expr) => Ok(SemiExpr::typed(Expr::new(
            expr.ty.clone(),
            ExprVal::Block {
                bindings,
                value: Box::new(expr),
            },
            point,
        ))),
        _ => Ok(SemiExpr::new(
            SemiValue::Block {
                bindings,
                value: Box::new(value),
            },
            point,
        )),
    }
}

fn check_binding<'a>(binding: &'a Binding, ctx: &ExprContext<'a>) -> Result<TypedBinding, ExprError> {
    let declared = binding
        .declared_type
        .as_ref()
        .map(|te| ctx.type_from_expr(te))
        .transpose()?;
    let value = if binding.recursive {
        let declared = declared.ok_or(ExprError::ExplicitTypeRequired {
            span: Some(binding.span.into()),
        })?;
        let name = match &binding.pattern.kind {
            PatternKind::Trivial(id) if id.name != IGNORE_MARK => id.name.clone(),
            _ => {
                return Err(ExprError::BindingNameRequired {
                    span: Some(binding.pattern.span.into()),
                })
            }
        };
        if !matches!(binding.value.kind, ExpressionKind::Lambda(_)) {
            return Err(ExprError::RecursiveMarkUsedOnNonLambda {
                span: Some(binding.value.span.into()),
            });
        }
        let rec_ctx = ctx.with_locals([(name, declared.clone())]);
        assign_to(Some(&declared), check(&binding.value, &rec_ctx)?, &rec_ctx)?
    } else {
        assign_to(declared.as_ref(), check(&binding.value, ctx)?, ctx)?
    };
    let ty = ctx.certain_type(&value.ty, &value.point)?;
    let pattern = match_pattern(&binding.pattern, &ty, ctx)?;
    Ok(TypedBinding {
        pattern,
        recursive: binding.recursive,
        value,
    })
}

pub(super) fn assign_block_to<'a>(
    expected: Option<&Type>,
    bindings: Vec<TypedBinding>,
    value: SemiExpr<'a>,
    point: ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<Expr, ExprError> {
    let value = assign_to(expected, value, ctx)?;
    Ok(Expr::new(
        value.ty.clone(),
        ExprVal::Block {
            bindings,
            value: Box::new(value),
        },
        point,
    ))
}
