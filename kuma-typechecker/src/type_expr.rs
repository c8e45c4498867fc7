//! Conversion of written type expressions into checker types
//!
//! Used both while registering declarations (where the registry is still being
//! built) and while checking expressions, so the set of known names is abstracted
//! behind [`TypeLookup`].

use crate::builtins::{core_symbol, IGNORE_MARK, UNIT_ALIAS};
use crate::config::CheckerConfig;
use crate::error::TypeDeclError;
use crate::types::{Bundle, Symbol, Type};
use indexmap::IndexMap;
use kuma_ast::{Module, QualifiedName, TypeExpression, TypeExpressionKind};

/// Anything that knows which type symbols exist and their arities
pub trait TypeLookup {
    fn arity(&self, name: &Symbol) -> Option<usize>;
}

/// Where a type expression is being read
#[derive(Debug, Clone, Copy)]
pub struct TypeExprContext<'a> {
    pub module: &'a Module,
    pub param_names: &'a [String],
    pub allow_wildcard: bool,
    pub config: &'a CheckerConfig,
}

impl<'a> TypeExprContext<'a> {
    pub fn new(module: &'a Module, param_names: &'a [String], config: &'a CheckerConfig) -> Self {
        Self {
            module,
            param_names,
            allow_wildcard: false,
            config,
        }
    }

    pub fn with_wildcard(mut self) -> Self {
        self.allow_wildcard = true;
        self
    }
}

/// Resolve a type name to its symbol.
///
/// Unqualified names are looked up in the current module first, then in `Core`.
pub fn resolve_type_symbol(
    name: &QualifiedName,
    module: &Module,
    lookup: &dyn TypeLookup,
) -> Result<Symbol, TypeDeclError> {
    let not_found = || TypeDeclError::TypeNotFound {
        name: name.to_string(),
        span: Some(name.span.into()),
    };
    match &name.module {
        Some(alias) => {
            let imported = module
                .import(&alias.name)
                .ok_or_else(|| TypeDeclError::ModuleNotFound {
                    alias: alias.name.clone(),
                    span: Some(alias.span.into()),
                })?;
            let sym = Symbol::new(imported.name.clone(), name.name.name.clone());
            lookup.arity(&sym).map(|_| sym).ok_or_else(not_found)
        }
        None => {
            let own = Symbol::new(module.name.clone(), name.name.name.clone());
            if lookup.arity(&own).is_some() {
                return Ok(own);
            }
            let core = core_symbol(&name.name.name);
            lookup.arity(&core).map(|_| core).ok_or_else(not_found)
        }
    }
}

pub fn type_from_expr(
    expr: &TypeExpression,
    ctx: &TypeExprContext<'_>,
    lookup: &dyn TypeLookup,
) -> Result<Type, TypeDeclError> {
    let span = Some(expr.span.into());
    match &expr.kind {
        TypeExpressionKind::Wildcard => {
            if ctx.allow_wildcard {
                Ok(Type::Wildcard)
            } else {
                Err(TypeDeclError::WildcardNotAllowed { span })
            }
        }
        TypeExpressionKind::Reference { name, args } => {
            if name.module.is_none() && args.is_empty() {
                let local = name.name.as_str();
                if local == UNIT_ALIAS {
                    return Ok(Type::unit());
                }
                if local == IGNORE_MARK {
                    return type_from_expr(
                        &TypeExpression {
                            kind: TypeExpressionKind::Wildcard,
                            span: expr.span,
                        },
                        ctx,
                        lookup,
                    );
                }
                if let Some(index) = ctx.param_names.iter().position(|p| p == local) {
                    return Ok(Type::parameter(index));
                }
            }
            let sym = resolve_type_symbol(name, ctx.module, lookup)?;
            let required = lookup.arity(&sym).unwrap_or(0);
            if required != args.len() {
                return Err(TypeDeclError::WrongParameterQuantity {
                    name: sym.to_string(),
                    required,
                    given: args.len(),
                    span,
                });
            }
            let args = args
                .iter()
                .map(|arg| type_from_expr(arg, ctx, lookup))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Type::named(sym, args))
        }
        TypeExpressionKind::Tuple(elements) => {
            if elements.len() > ctx.config.product_max_size {
                return Err(TypeDeclError::TooManyTupleBundleItems {
                    given: elements.len(),
                    max: ctx.config.product_max_size,
                    span,
                });
            }
            let mut elements = elements
                .iter()
                .map(|el| type_from_expr(el, ctx, lookup))
                .collect::<Result<Vec<_>, _>>()?;
            match elements.len() {
                0 => Ok(Type::unit()),
                1 => Ok(elements.remove(0)),
                _ => Ok(Type::tuple(elements)),
            }
        }
        TypeExpressionKind::Bundle(fields) => {
            if fields.len() > ctx.config.product_max_size {
                return Err(TypeDeclError::TooManyTupleBundleItems {
                    given: fields.len(),
                    max: ctx.config.product_max_size,
                    span,
                });
            }
            if fields.is_empty() {
                return Ok(Type::unit());
            }
            let mut seen: IndexMap<String, Type> = IndexMap::new();
            for field in fields {
                let name = field.name.name.clone();
                if name == IGNORE_MARK {
                    return Err(TypeDeclError::InvalidFieldName {
                        name,
                        span: Some(field.name.span.into()),
                    });
                }
                if seen.contains_key(&name) {
                    return Err(TypeDeclError::DuplicateField {
                        name,
                        span: Some(field.name.span.into()),
                    });
                }
                let ty = type_from_expr(&field.type_expr, ctx, lookup)?;
                seen.insert(name, ty);
            }
            Ok(Type::bundle(Bundle::from_ordered(seen.into_iter().collect())))
        }
        TypeExpressionKind::Function { input, output } => {
            let input = type_from_expr(input, ctx, lookup)?;
            let output = type_from_expr(output, ctx, lookup)?;
            Ok(Type::func(input, output))
        }
    }
}
