//! Tuples, bundles, field access and bundle update

use super::{assign_to, assign_typed_to, check, Expr, ExprContext, ExprVal, SemiExpr, SemiField, SemiValue};
use crate::error::{ErrorPoint, ExprError, TypeDeclError};
use crate::types::{Bundle, Field, Repr, Type};
use crate::unbox::{unbox_bundle, ReprResult};
use indexmap::IndexMap;
use kuma_ast::{BundleField, Expression, Identifier};

fn too_many(given: usize, point: &ErrorPoint, ctx: &ExprContext<'_>) -> Result<(), ExprError> {
    let max = ctx.scope.config.product_max_size;
    if given > max {
        return Err(ExprError::TypeExpr(TypeDeclError::TooManyTupleBundleItems {
            given,
            max,
            span: point.source_span(),
        }));
    }
    Ok(())
}

fn unit(point: ErrorPoint) -> SemiExpr<'static> {
    SemiExpr::typed(Expr::new(Type::unit(), ExprVal::Unit, point))
}

/// Products stay semi-typed; elements are finalized against the expected element types
pub(super) fn check_tuple<'a>(
    elements: &'a [Expression],
    point: ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<SemiExpr<'a>, ExprError> {
    match elements {
        [] => return Ok(unit(point)),
        [single] => return check(single, ctx),
        _ => {}
    }
    too_many(elements.len(), &point, ctx)?;
    let items = elements
        .iter()
        .map(|el| check(el, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SemiExpr::new(SemiValue::Tuple(items), point))
}

pub(super) fn check_bundle<'a>(
    fields: &'a [BundleField],
    point: ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<SemiExpr<'a>, ExprError> {
    if fields.is_empty() {
        return Ok(unit(point));
    }
    too_many(fields.len(), &point, ctx)?;
    let mut items: Vec<SemiField<'a>> = Vec::with_capacity(fields.len());
    for field in fields {
        let name = field.name.name.clone();
        if items.iter().any(|item| item.name == name) {
            return Err(ExprError::ExprDuplicateField {
                field: name,
                span: Some(field.name.span.into()),
            });
        }
        items.push(SemiField {
            name,
            value: check(&field.value, ctx)?,
            point: ctx.point(field.name.span),
        });
    }
    Ok(SemiExpr::new(SemiValue::Bundle(items), point))
}

/// Bundle literal whose fields are all typed, indexed in the order written
fn typed_bundle(items: Vec<SemiField<'_>>, point: ErrorPoint) -> Result<Expr, ExprError> {
    let mut fields = Vec::with_capacity(items.len());
    let mut values = Vec::with_capacity(items.len());
    for item in items {
        let span = item.point.source_span();
        let expr = item
            .value
            .as_typed()
            .cloned()
            .ok_or(ExprError::ExplicitTypeRequired { span })?;
        fields.push((item.name, expr.ty.clone()));
        values.push(expr);
    }
    let ty = Type::bundle(Bundle::from_ordered(fields));
    Ok(Expr::new(ty, ExprVal::Product(values), point))
}

/// A bundle built in place, with no nominal type to reach it through
fn is_bundle_literal(expr: &Expr) -> bool {
    matches!(expr.value, ExprVal::Product(_)) && matches!(expr.ty, Type::Anonymous(Repr::Bundle(_)))
}

pub(super) fn assign_tuple_to<'a>(
    expected: Option<&Type>,
    items: Vec<SemiExpr<'a>>,
    point: ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<Expr, ExprError> {
    match expected.map(|t| ctx.current(t)) {
        Some(Type::Anonymous(Repr::Tuple(types))) => {
            if types.len() != items.len() {
                return Err(ExprError::TupleSizeNotMatching {
                    required: types.len(),
                    given: items.len(),
                    given_type: ctx.describe(&Type::tuple(types)),
                    span: point.source_span(),
                });
            }
            let exprs = items
                .into_iter()
                .zip(types.iter())
                .map(|(item, el_type)| assign_to(Some(el_type), item, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            let ty = Type::tuple(exprs.iter().map(|e| e.ty.clone()).collect());
            Ok(Expr::new(ty, ExprVal::Product(exprs), point))
        }
        Some(t @ Type::Anonymous(_)) => Err(ExprError::TupleAssignedToNonTupleType {
            ty: ctx.describe(&t),
            span: point.source_span(),
        }),
        _ => {
            let exprs = items
                .into_iter()
                .map(|item| assign_to(None, item, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            let ty = Type::tuple(exprs.iter().map(|e| e.ty.clone()).collect());
            assign_typed_to(expected, Expr::new(ty, ExprVal::Product(exprs), point), ctx)
        }
    }
}

pub(super) fn assign_bundle_to<'a>(
    expected: Option<&Type>,
    items: Vec<SemiField<'a>>,
    point: ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<Expr, ExprError> {
    match expected.map(|t| ctx.current(t)) {
        Some(Type::Anonymous(Repr::Bundle(bundle))) => {
            if let Some(surplus) = items.iter().find(|item| bundle.get(&item.name).is_none()) {
                return Err(ExprError::SurplusField {
                    field: surplus.name.clone(),
                    span: surplus.point.source_span(),
                });
            }
            let mut given: IndexMap<String, SemiExpr<'a>> =
                items.into_iter().map(|item| (item.name, item.value)).collect();
            let mut fields = IndexMap::with_capacity(bundle.len());
            let mut values = Vec::with_capacity(bundle.len());
            for (name, field) in bundle.ordered() {
                let value = given.shift_remove(name).ok_or_else(|| ExprError::MissingField {
                    field: name.clone(),
                    ty: ctx.describe(&field.ty),
                    span: point.source_span(),
                })?;
                let expr = assign_to(Some(&field.ty), value, ctx)?;
                fields.insert(
                    name.clone(),
                    Field {
                        ty: expr.ty.clone(),
                        index: field.index,
                    },
                );
                values.push(expr);
            }
            Ok(Expr::new(Type::bundle(Bundle { fields }), ExprVal::Product(values), point))
        }
        Some(t @ Type::Anonymous(_)) => Err(ExprError::BundleAssignedToNonBundleType {
            ty: ctx.describe(&t),
            span: point.source_span(),
        }),
        _ => {
            let mut typed = Vec::with_capacity(items.len());
            for item in items {
                let expr = assign_to(None, item.value, ctx)?;
                typed.push(SemiField {
                    name: item.name,
                    value: SemiExpr::typed(expr),
                    point: item.point,
                });
            }
            assign_typed_to(expected, typed_bundle(typed, point)?, ctx)
        }
    }
}

/// Typed base of a field access or update; literal bundles are reported with `on_literal`
fn bundle_base<'a>(
    base: &'a Expression,
    ctx: &ExprContext<'a>,
    on_literal: fn(Option<miette::SourceSpan>) -> ExprError,
) -> Result<Expr, ExprError> {
    let semi = check(base, ctx)?;
    let span = semi.point.source_span();
    if matches!(semi.value, SemiValue::Bundle(_)) {
        return Err(on_literal(span));
    }
    let expr = assign_to(None, semi, ctx)?;
    if is_bundle_literal(&expr) {
        return Err(on_literal(span));
    }
    Ok(expr)
}

pub(super) fn check_get<'a>(
    base: &'a Expression,
    field: &Identifier,
    point: ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<SemiExpr<'a>, ExprError> {
    let base = bundle_base(base, ctx, |span| ExprError::GetFromLiteralBundle { span })?;
    let bundle = match unbox_bundle(&base.ty, ctx.module_name(), ctx.registry()) {
        ReprResult::Found(bundle) => bundle,
        ReprResult::FoundButOpaque => {
            return Err(ExprError::GetFromOpaqueBundle {
                ty: ctx.describe(&base.ty),
                span: base.point.source_span(),
            })
        }
        ReprResult::NotFound => {
            return Err(ExprError::GetFromNonBundle {
                ty: ctx.describe(&base.ty),
                span: base.point.source_span(),
            })
        }
    };
    let found = bundle.get(&field.name).cloned().ok_or_else(|| ExprError::FieldDoesNotExist {
        field: field.name.clone(),
        target: ctx.describe(&Type::bundle(bundle.clone())),
        span: Some(field.span.into()),
    })?;
    Ok(SemiExpr::typed(Expr::new(
        found.ty,
        ExprVal::Get {
            base: Box::new(base),
            index: found.index,
        },
        point,
    )))
}

pub(super) fn check_update<'a>(
    base: &'a Expression,
    updates: &'a [BundleField],
    point: ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<SemiExpr<'a>, ExprError> {
    let base = bundle_base(base, ctx, |span| ExprError::SetToLiteralBundle { span })?;
    let bundle = match unbox_bundle(&base.ty, ctx.module_name(), ctx.registry()) {
        ReprResult::Found(bundle) => bundle,
        ReprResult::FoundButOpaque => {
            return Err(ExprError::SetToOpaqueBundle {
                ty: ctx.describe(&base.ty),
                span: base.point.source_span(),
            })
        }
        ReprResult::NotFound => {
            return Err(ExprError::SetToNonBundle {
                ty: ctx.describe(&base.ty),
                span: base.point.source_span(),
            })
        }
    };
    let ty = base.ty.clone();
    let mut seen: Vec<&str> = Vec::with_capacity(updates.len());
    let mut current = base;
    for update in updates {
        let name = update.name.as_str();
        let field = bundle.get(name).ok_or_else(|| ExprError::FieldDoesNotExist {
            field: name.to_string(),
            target: ctx.describe(&ty),
            span: Some(update.name.span.into()),
        })?;
        if seen.contains(&name) {
            return Err(ExprError::ExprDuplicateField {
                field: name.to_string(),
                span: Some(update.name.span.into()),
            });
        }
        seen.push(name);
        let value = assign_to(Some(&field.ty), check(&update.value, ctx)?, ctx)?;
        current = Expr::new(
            ty.clone(),
            ExprVal::Set {
                base: Box::new(current),
                index: field.index,
                value: Box::new(value),
            },
            point.clone(),
        );
    }
    Ok(SemiExpr::typed(current))
}
