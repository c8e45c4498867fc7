//! Switch over union cases, and `if` as a switch over `Bool`

use super::{assign_to, check, Expr, ExprContext, ExprVal, SemiBranch, SemiExpr, SemiValue, TypedBranch};
use crate::builtins::{bool_type, BOOL_YES_INDEX};
use crate::error::{ErrorPoint, ExprError};
use crate::exhaustiveness::CaseCoverage;
use crate::patterns::match_pattern;
use crate::type_expr::resolve_type_symbol;
use crate::types::Type;
use crate::unbox::{unbox_union, ReprResult};
use kuma_ast::{BranchKind, IfExpression, Switch};

pub(super) fn check_switch<'a>(
    sw: &'a Switch,
    point: ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<SemiExpr<'a>, ExprError> {
    let argument = assign_to(None, check(&sw.argument, ctx)?, ctx)?;
    let registry = ctx.registry();
    let (union, union_args) = match unbox_union(&argument.ty, ctx.module_name(), registry) {
        ReprResult::Found((_, union, args)) => (union, args),
        ReprResult::FoundButOpaque | ReprResult::NotFound => {
            return Err(ExprError::InvalidSwitchArgType {
                ty: ctx.describe(&argument.ty),
                span: argument.point.source_span(),
            })
        }
    };
    let mut coverage = CaseCoverage::new(union);
    let mut branches = Vec::with_capacity(sw.branches.len());
    for branch in &sw.branches {
        let branch_span = Some(branch.span.into());
        match &branch.kind {
            BranchKind::Case { type_name, pattern } => {
                let sym = resolve_type_symbol(type_name, ctx.scope.module, registry)?;
                let index = coverage.case_index(&sym).ok_or_else(|| ExprError::NotBranchType {
                    union: ctx.describe(&argument.ty),
                    ty: sym.to_string(),
                    span: Some(type_name.span.into()),
                })?;
                coverage.cover_case(index, branch_span)?;
                let case_args = union.case_types[index]
                    .params
                    .iter()
                    .filter_map(|union_index| union_args.get(*union_index).cloned())
                    .collect();
                let case_type = Type::named(sym, case_args);
                let (pattern, branch_ctx) = match pattern {
                    Some(p) => {
                        let typed = match_pattern(p, &case_type, ctx)?;
                        let branch_ctx = ctx.with_locals(typed.bindings());
                        (Some(typed), branch_ctx)
                    }
                    None => (None, ctx.clone()),
                };
                branches.push(SemiBranch {
                    index: Some(index),
                    pattern,
                    value: check(&branch.value, &branch_ctx)?,
                });
            }
            BranchKind::Default => {
                coverage.cover_default(branch_span)?;
                branches.push(SemiBranch {
                    index: None,
                    pattern: None,
                    value: check(&branch.value, ctx)?,
                });
            }
        }
    }
    coverage.finish(point.source_span())?;
    Ok(finish_switch(argument, branches, point))
}

pub(super) fn check_if<'a>(
    ifx: &'a IfExpression,
    point: ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<SemiExpr<'a>, ExprError> {
    let condition = assign_to(Some(&bool_type()), check(&ifx.condition, ctx)?, ctx)?;
    let branches = vec![
        SemiBranch {
            index: Some(BOOL_YES_INDEX),
            pattern: None,
            value: check(&ifx.then_branch, ctx)?,
        },
        SemiBranch {
            index: None,
            pattern: None,
            value: check(&ifx.else_branch, ctx)?,
        },
    ];
    Ok(finish_switch(condition, branches, point))
}

/// Typed when every branch is typed with one and the same type
fn finish_switch<'a>(argument: Expr, branches: Vec<SemiBranch<'a>>, point: ErrorPoint) -> SemiExpr<'a> {
    let first_ty = branches.first().and_then(|b| b.value.as_typed()).map(|e| e.ty.clone());
    let uniform = match &first_ty {
        Some(ty) => branches
            .iter()
            .all(|b| b.value.as_typed().map(|e| &e.ty == ty).unwrap_or(false)),
        None => false,
    };
    match (uniform, first_ty) {
        (true, Some(ty)) => {
            let typed = branches
                .into_iter()
                .filter_map(|b| {
                    let index = b.index;
                    let pattern = b.pattern;
                    match b.value.value {
                        SemiValue::Typed(value) => Some(TypedBranch { index, pattern, value }),
                        _ => None,
                    }
                })
                .collect();
            SemiExpr::typed(Expr::new(
                ty,
                ExprVal::Switch {
                    argument: Box::new(argument),
                    branches: typed,
                },
                point,
            ))
        }
        _ => SemiExpr::new(SemiValue::Switch { argument, branches }, point),
    }
}

/// The one type every branch synthesizes, if they agree
fn uniform_type(branches: &[SemiBranch<'_>]) -> Option<Type> {
    let mut types = branches.iter().map(|b| b.value.synthesized_type());
    let first = types.next()??;
    types.all(|t| t.as_ref() == Some(&first)).then_some(first)
}

pub(super) fn assign_switch_to<'a>(
    expected: Option<&Type>,
    argument: Expr,
    branches: Vec<SemiBranch<'a>>,
    point: ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<Expr, ExprError> {
    let expected = match expected {
        Some(t) => t.clone(),
        None => uniform_type(&branches).ok_or(ExprError::ExplicitTypeRequired {
            span: point.source_span(),
        })?,
    };
    let expected = &expected;
    let mut typed = Vec::with_capacity(branches.len());
    for branch in branches {
        typed.push(TypedBranch {
            index: branch.index,
            pattern: branch.pattern,
            value: assign_to(Some(expected), branch.value, ctx)?,
        });
    }
    let ty = ctx.certain_type(&ctx.current(expected), &point)?;
    Ok(Expr::new(
        ty,
        ExprVal::Switch {
            argument: Box::new(argument),
            branches: typed,
        },
        point,
    ))
}
