use super::{
    array, assign_to, block, call, product, reference, switch, Expr, ExprContext, ExprVal, SemiExpr, SemiValue,
};
use crate::builtins::{float_type, string_type};
use crate::error::ExprError;
use kuma_ast::{Expression, ExpressionKind};

/// Check `expr` as far as it can be without knowing the type expected of it
pub fn check<'a>(expr: &'a Expression, ctx: &ExprContext<'a>) -> Result<SemiExpr<'a>, ExprError> {
    let point = ctx.point(expr.span);
    match &expr.kind {
        ExpressionKind::IntegerLiteral(lit) => {
            Ok(SemiExpr::new(SemiValue::UntypedInteger(lit.value.clone()), point))
        }
        ExpressionKind::FloatLiteral(lit) => Ok(SemiExpr::typed(Expr::new(
            float_type(),
            ExprVal::Float(lit.value),
            point,
        ))),
        ExpressionKind::StringLiteral(lit) => Ok(SemiExpr::typed(Expr::new(
            string_type(),
            ExprVal::String(lit.value.clone()),
            point,
        ))),
        ExpressionKind::Tuple(elements) => product::check_tuple(elements, point, ctx),
        ExpressionKind::Bundle(fields) => product::check_bundle(fields, point, ctx),
        ExpressionKind::Update { base, fields } => product::check_update(base, fields, point, ctx),
        ExpressionKind::Get { base, field } => product::check_get(base, field, point, ctx),
        ExpressionKind::Array(elements) => array::check_array(elements, point, ctx),
        ExpressionKind::Lambda(l) => Ok(SemiExpr::new(
            SemiValue::UntypedLambda {
                lambda: l,
                ctx: ctx.clone(),
            },
            point,
        )),
        ExpressionKind::Block(b) => block::check_block(b, point, ctx),
        ExpressionKind::Call { callee, argument } => call::check_call(callee, argument, point, ctx),
        ExpressionKind::Reference(r) => reference::check_reference(r, point, ctx),
        ExpressionKind::Switch(sw) => switch::check_switch(sw, point, ctx),
        ExpressionKind::If(ifx) => switch::check_if(ifx, point, ctx),
        ExpressionKind::Cast { expression, target } => {
            let target = ctx.type_from_expr(target)?;
            let value = assign_to(Some(&target), check(expression, ctx)?, ctx)?;
            let ty = if target.has_wildcard() {
                value.ty.clone()
            } else {
                ctx.current(&target)
            };
            Ok(SemiExpr::typed(Expr { ty, ..value }))
        }
    }
}
