//! Binding patterns matched against a subject type

use crate::builtins::IGNORE_MARK;
use crate::checker::ExprContext;
use crate::error::{ErrorPoint, ExprError};
use crate::types::Type;
use crate::unbox::{unbox_as_is, unbox_bundle, unbox_tuple, ReprResult};
use kuma_ast::{Identifier, Pattern, PatternKind};

#[derive(Debug, Clone, PartialEq)]
pub struct TypedPattern {
    pub kind: TypedPatternKind,
    pub point: ErrorPoint,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedPatternKind {
    Trivial { name: String, ty: Type },
    Tuple(Vec<PatternItem>),
    Bundle(Vec<PatternItem>),
}

/// One name bound to the element or field at `index`
#[derive(Debug, Clone, PartialEq)]
pub struct PatternItem {
    pub name: String,
    pub index: usize,
    pub ty: Type,
    pub point: ErrorPoint,
}

impl TypedPattern {
    /// Names this pattern brings into scope, discarded names excluded
    pub fn bindings(&self) -> Vec<(String, Type)> {
        match &self.kind {
            TypedPatternKind::Trivial { name, ty } if name != IGNORE_MARK => vec![(name.clone(), ty.clone())],
            TypedPatternKind::Trivial { .. } => Vec::new(),
            TypedPatternKind::Tuple(items) | TypedPatternKind::Bundle(items) => items
                .iter()
                .map(|item| (item.name.clone(), item.ty.clone()))
                .collect(),
        }
    }
}

fn check_duplicate(seen: &mut Vec<String>, id: &Identifier) -> Result<(), ExprError> {
    if seen.iter().any(|name| name == &id.name) {
        return Err(ExprError::DuplicateBinding {
            name: id.name.clone(),
            span: Some(id.span.into()),
        });
    }
    seen.push(id.name.clone());
    Ok(())
}

pub fn match_pattern(pattern: &Pattern, subject: &Type, ctx: &ExprContext<'_>) -> Result<TypedPattern, ExprError> {
    let point = ctx.point(pattern.span);
    let span = point.source_span();
    let module = ctx.module_name();
    let registry = ctx.registry();
    let kind = match &pattern.kind {
        PatternKind::Trivial(id) => TypedPatternKind::Trivial {
            name: id.name.clone(),
            ty: unbox_as_is(subject, registry),
        },
        PatternKind::Tuple(names) => {
            let types = match unbox_tuple(subject, module, registry) {
                ReprResult::Found(types) => types,
                ReprResult::FoundButOpaque => {
                    return Err(ExprError::MatchingOpaqueTupleType {
                        ty: ctx.describe(subject),
                        span,
                    })
                }
                ReprResult::NotFound => {
                    return Err(ExprError::MatchingNonTupleType {
                        ty: ctx.describe(subject),
                        span,
                    })
                }
            };
            if types.len() != names.len() {
                return Err(ExprError::TupleSizeNotMatching {
                    required: types.len(),
                    given: names.len(),
                    given_type: ctx.describe(subject),
                    span,
                });
            }
            let mut seen = Vec::new();
            let mut items = Vec::new();
            for (index, (id, ty)) in names.iter().zip(types).enumerate() {
                if id.name == IGNORE_MARK {
                    continue;
                }
                check_duplicate(&mut seen, id)?;
                items.push(PatternItem {
                    name: id.name.clone(),
                    index,
                    ty,
                    point: ctx.point(id.span),
                });
            }
            if items.is_empty() {
                return Err(ExprError::EntireValueIgnored { span });
            }
            TypedPatternKind::Tuple(items)
        }
        PatternKind::Bundle(fields) => {
            let bundle = match unbox_bundle(subject, module, registry) {
                ReprResult::Found(bundle) => bundle,
                ReprResult::FoundButOpaque => {
                    return Err(ExprError::MatchingOpaqueBundleType {
                        ty: ctx.describe(subject),
                        span,
                    })
                }
                ReprResult::NotFound => {
                    return Err(ExprError::MatchingNonBundleType {
                        ty: ctx.describe(subject),
                        span,
                    })
                }
            };
            let mut seen = Vec::new();
            let mut items = Vec::new();
            for item in fields {
                let field = bundle.get(&item.field.name).ok_or_else(|| ExprError::FieldDoesNotExist {
                    field: item.field.name.clone(),
                    target: ctx.describe(subject),
                    span: Some(item.field.span.into()),
                })?;
                let binding = item.binding_name();
                if binding.name == IGNORE_MARK {
                    continue;
                }
                check_duplicate(&mut seen, binding)?;
                items.push(PatternItem {
                    name: binding.name.clone(),
                    index: field.index,
                    ty: field.ty.clone(),
                    point: ctx.point(item.span),
                });
            }
            TypedPatternKind::Bundle(items)
        }
    };
    Ok(TypedPattern { kind, point })
}
