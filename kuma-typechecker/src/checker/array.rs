//! Array literals

use super::{assign_to, assign_typed_to, check, Expr, ExprContext, ExprVal, SemiExpr, SemiValue};
use crate::builtins::{array_element, array_type};
use crate::error::{ErrorPoint, ExprError};
use crate::types::Type;
use kuma_ast::Expression;

pub(super) fn check_array<'a>(
    elements: &'a [Expression],
    point: ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<SemiExpr<'a>, ExprError> {
    let items = elements
        .iter()
        .map(|el| check(el, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    let all_typed = !items.is_empty() && items.iter().all(|item| item.as_typed().is_some());
    if all_typed {
        return synthesize(items, point, ctx).map(SemiExpr::typed);
    }
    Ok(SemiExpr::new(SemiValue::Array(items), point))
}

/// Element type taken from the first element; an empty array leaves it open
fn synthesize<'a>(items: Vec<SemiExpr<'a>>, point: ErrorPoint, ctx: &ExprContext<'a>) -> Result<Expr, ExprError> {
    let mut items = items.into_iter();
    let first = match items.next() {
        Some(first) => assign_to(None, first, ctx)?,
        None => return Ok(Expr::new(array_type(Type::Wildcard), ExprVal::Array(Vec::new()), point)),
    };
    let element = first.ty.clone();
    let mut exprs = vec![first];
    for item in items {
        exprs.push(assign_to(Some(&element), item, ctx)?);
    }
    Ok(Expr::new(array_type(element), ExprVal::Array(exprs), point))
}

pub(super) fn assign_array_to<'a>(
    expected: Option<&Type>,
    items: Vec<SemiExpr<'a>>,
    point: ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<Expr, ExprError> {
    let current = expected.map(|t| ctx.current(t));
    if let Some(element) = current.as_ref().and_then(array_element) {
        let exprs = items
            .into_iter()
            .map(|item| assign_to(Some(element), item, ctx))
            .collect::<Result<Vec<_>, _>>()?;
        let ty = array_type(ctx.current(element));
        return Ok(Expr::new(ty, ExprVal::Array(exprs), point));
    }
    let not_array = match &current {
        Some(Type::Anonymous(_)) => true,
        Some(Type::Named { name, .. }) => ctx.registry().get(name).and_then(|g| g.as_boxed()).is_none(),
        _ => false,
    };
    if let (true, Some(t)) = (not_array, &current) {
        return Err(ExprError::ArrayAssignedToNonArrayType {
            ty: ctx.describe(t),
            span: point.source_span(),
        });
    }
    let expr = synthesize(items, point, ctx)?;
    assign_typed_to(expected, expr, ctx)
}
