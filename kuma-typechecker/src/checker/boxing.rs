//! Boxing a value into a named type: `T(v)`, `T[A, B](v)`

use super::{assign_to, assign_typed_to, Expr, ExprContext, SemiExpr};
use crate::error::{ErrorPoint, ExprError, TypeDeclError};
use crate::generics::{fill, mark_for_inference};
use crate::types::{Boxed, GenericType, Symbol, Type, TypeVal};
use tracing::trace;

pub(super) fn box_value<'a>(
    semi: SemiExpr<'a>,
    sym: &Symbol,
    type_args: &[Type],
    type_point: &ErrorPoint,
    point: &ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<Expr, ExprError> {
    let generic = ctx.registry().get(sym).ok_or_else(|| ExprError::BoxNonBoxedType {
        name: sym.to_string(),
        span: point.source_span(),
    })?;
    match &generic.value {
        TypeVal::Boxed(boxed) => box_into(semi, sym, generic, boxed, type_args, type_point, point, ctx),
        TypeVal::Union(_) => lift_into_union(semi, sym, generic, type_args, point, ctx),
        TypeVal::Native => Err(ExprError::BoxNonBoxedType {
            name: sym.to_string(),
            span: point.source_span(),
        }),
    }
}

#[allow(clippy::too_many_arguments)]
fn box_into<'a>(
    semi: SemiExpr<'a>,
    sym: &Symbol,
    generic: &GenericType,
    boxed: &Boxed,
    type_args: &[Type],
    type_point: &ErrorPoint,
    point: &ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<Expr, ExprError> {
    let foreign = sym.module != ctx.module_name();
    if foreign && boxed.opaque {
        return Err(ExprError::BoxOpaqueType {
            name: sym.to_string(),
            span: point.source_span(),
        });
    }
    if foreign && boxed.protected {
        return Err(ExprError::BoxProtectedType {
            name: sym.to_string(),
            span: point.source_span(),
        });
    }
    let arity = generic.arity();
    if arity == 0 || !type_args.is_empty() {
        if type_args.len() != arity {
            return Err(TypeDeclError::WrongParameterQuantity {
                name: sym.to_string(),
                required: arity,
                given: type_args.len(),
                span: type_point.source_span(),
            }
            .into());
        }
        let inner = fill(&boxed.inner_type, type_args);
        let value = assign_to(Some(&inner), semi, ctx)?;
        let ty = Type::named(sym.clone(), type_args.iter().map(|t| ctx.current(t)).collect());
        return Ok(Expr { ty, ..value });
    }

    let names: Vec<String> = generic.params.iter().map(|p| p.name.clone()).collect();
    let infer_ctx = ctx.with_inferring_enabled(&names);
    let inner = mark_for_inference(&boxed.inner_type);
    let value = assign_to(Some(&inner), semi, &infer_ctx)?;
    let slots = infer_ctx.inferred().unwrap_or_default();
    let args = (0..arity)
        .map(|index| slots.get(&index).cloned())
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| ExprError::ExplicitTypeParamsRequired {
            span: point.source_span(),
        })?;
    trace!(ty = %sym, ?args, "inferred boxing type arguments");
    Ok(Expr {
        ty: Type::named(sym.clone(), args),
        ..value
    })
}

/// Calling a union type with one of its case values
fn lift_into_union<'a>(
    semi: SemiExpr<'a>,
    sym: &Symbol,
    generic: &GenericType,
    type_args: &[Type],
    point: &ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<Expr, ExprError> {
    let value = assign_to(None, semi, ctx)?;
    let not_case = || ExprError::NotCaseType {
        ty: ctx.describe(&value.ty),
        union: sym.to_string(),
        span: value.point.source_span(),
    };
    let (case_name, case_args) = value.ty.as_named().ok_or_else(not_case)?;
    let info = ctx
        .registry()
        .get(case_name)
        .and_then(|g| g.case_info.as_ref())
        .filter(|info| &info.union_name == sym)
        .ok_or_else(not_case)?;
    let arity = generic.arity();
    let args = if type_args.is_empty() {
        let mut args = vec![None; arity];
        for (case_arg, union_index) in case_args.iter().zip(info.case_params.iter()) {
            if let Some(slot) = args.get_mut(*union_index) {
                *slot = Some(case_arg.clone());
            }
        }
        args.into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ExprError::ExplicitTypeParamsRequired {
                span: point.source_span(),
            })?
    } else if type_args.len() == arity {
        type_args.to_vec()
    } else {
        return Err(TypeDeclError::WrongParameterQuantity {
            name: sym.to_string(),
            required: arity,
            given: type_args.len(),
            span: point.source_span(),
        }
        .into());
    };
    assign_typed_to(Some(&Type::named(sym.clone(), args)), value, ctx)
}
