//! Name references in value position

use super::{
    assign_typed_to, boxing, check, Expr, ExprContext, ExprVal, RefTarget, SemiExpr, SemiValue, UntypedRef,
    ValueSymbol,
};
use crate::dispatch;
use crate::error::{ErrorPoint, ExprError};
use crate::types::Type;
use kuma_ast::InlineReference;

pub(super) fn check_reference<'a>(
    r: &'a InlineReference,
    point: ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<SemiExpr<'a>, ExprError> {
    let no_type_args = || -> Result<(), ExprError> {
        match r.type_args.first() {
            Some(first) => Err(ExprError::SuperfluousTypeArgs {
                span: Some(first.span.into()),
            }),
            None => Ok(()),
        }
    };
    let name = r.name.name.name.clone();
    let target = match ctx.lookup_symbol(&r.name)? {
        ValueSymbol::MacroArgument { expr, ctx: arg_ctx } => {
            no_type_args()?;
            return check(expr, &arg_ctx);
        }
        ValueSymbol::Local(ty) => {
            no_type_args()?;
            return Ok(SemiExpr::typed(Expr::new(ty, ExprVal::LocalRef(name), point)));
        }
        ValueSymbol::Constant { sym, ty } => {
            no_type_args()?;
            return Ok(SemiExpr::typed(Expr::new(ty, ExprVal::ConstantRef(sym), point)));
        }
        ValueSymbol::TypeParam => {
            return Err(ExprError::TypeParamUsedAsValue {
                name,
                span: point.source_span(),
            })
        }
        ValueSymbol::Macro(_) => {
            return Err(ExprError::MacroUsedAsValue {
                name,
                span: point.source_span(),
            })
        }
        ValueSymbol::Type(sym) => RefTarget::Type(sym),
        ValueSymbol::Functions {
            functions,
            fallback_type,
        } => RefTarget::Functions {
            functions,
            fallback_type,
        },
    };
    let type_args = r
        .type_args
        .iter()
        .map(|te| ctx.type_from_expr(te))
        .collect::<Result<Vec<_>, _>>()?;
    let type_args_point = match (r.type_args.first(), r.type_args.last()) {
        (Some(first), Some(last)) => ctx.point(first.span.to(last.span)),
        _ => point.clone(),
    };
    Ok(SemiExpr::new(
        SemiValue::UntypedRef(UntypedRef {
            name,
            type_args,
            type_args_point,
            target,
        }),
        point,
    ))
}

/// A type name used as a value is that type boxing `()`
pub(super) fn assign_ref_to<'a>(
    expected: Option<&Type>,
    r: UntypedRef,
    point: ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<Expr, ExprError> {
    match r.target {
        RefTarget::Type(sym) => {
            let unit = SemiExpr::typed(Expr::new(Type::unit(), ExprVal::Unit, point.clone()));
            let boxed = boxing::box_value(unit, &sym, &r.type_args, &r.type_args_point, &point, ctx)?;
            assign_typed_to(expected, boxed, ctx)
        }
        RefTarget::Functions { functions, .. } => dispatch::overloaded_assign_to(
            expected,
            &r.name,
            &functions,
            &r.type_args,
            &r.type_args_point,
            point,
            ctx,
        ),
    }
}
