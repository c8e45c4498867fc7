//! Type registry
//!
//! Registration runs in three passes over the module graph:
//!
//! 1. collect every type declaration (flattening union cases) into a raw table,
//!    visiting each module once
//! 2. evaluate each raw declaration into a [`GenericType`]
//! 3. validate the finished registry: boxing cycles, case variance, boxed variance
//!    and union size
//!
//! Declaration errors are reported per declaration; a registry is only returned
//! when every declaration is valid.

use crate::boxing_graph::BoxingGraph;
use crate::builtins::{is_core_name, CORE_MODULE, CORE_TYPES, IGNORE_MARK, UNIT_ALIAS};
use crate::config::CheckerConfig;
use crate::error::{ErrorPoint, ModuleError, TypeDeclError};
use crate::type_expr::{type_from_expr, TypeExprContext, TypeLookup};
use crate::types::{
    Boxed, CaseInfo, CaseType, GenericType, Symbol, Type, TypeParam, TypeVal, Union, Variance,
};
use crate::variance::{match_variance, variance_of};
use indexmap::IndexMap;
use kuma_ast::{Module, TypeDeclaration, TypeDefinition, TypeParameter, VarianceAnnotation};
use std::collections::HashSet;
use tracing::debug;

/// Every named type visible to a compilation, keyed by symbol
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRegistry {
    types: IndexMap<Symbol, GenericType>,
}

impl TypeLookup for TypeRegistry {
    fn arity(&self, name: &Symbol) -> Option<usize> {
        self.types.get(name).map(GenericType::arity)
    }
}

/// Whether a name may be used for a type or type parameter
pub fn is_valid_type_name(name: &str) -> bool {
    !(name.is_empty()
        || name == IGNORE_MARK
        || name == UNIT_ALIAS
        || name.starts_with('+')
        || name.starts_with('-'))
}

impl TypeRegistry {
    /// Registry holding only the preloaded `Core` types
    pub fn core_only() -> Self {
        Self {
            types: CORE_TYPES.clone(),
        }
    }

    /// Register every type declared by `entry` and its transitive imports
    pub fn register(entry: &Module, config: &CheckerConfig) -> Result<Self, Vec<ModuleError>> {
        debug!(module = %entry.name, "registering types");
        let mut raw = RawRegistry::default();
        let mut errors = Vec::new();
        raw.collect_module(entry, &mut errors);
        if !errors.is_empty() {
            return Err(errors);
        }

        let mut registry = Self::core_only();
        for (sym, decl) in raw.decls.iter() {
            match raw.evaluate(decl, config) {
                Ok(g) => {
                    registry.types.insert(sym.clone(), g);
                }
                Err(err) => errors.push(ModuleError::new(
                    decl.module.name.clone(),
                    decl.module.source_file.clone(),
                    err,
                )),
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        errors.extend(BoxingGraph::build(&registry).cycle_errors(&registry));
        if !errors.is_empty() {
            return Err(errors);
        }
        for (sym, g) in registry.types.iter() {
            if sym.module == CORE_MODULE {
                continue;
            }
            if let Err(err) = registry.validate(sym, g, config) {
                errors.push(ModuleError::new(sym.module.clone(), g.point.file.clone(), err));
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        debug!(
            module = %entry.name,
            types = registry.types.len(),
            "type registration finished"
        );
        Ok(registry)
    }

    pub fn get(&self, name: &Symbol) -> Option<&GenericType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &Symbol) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &GenericType)> {
        self.types.iter()
    }

    fn validate(&self, sym: &Symbol, g: &GenericType, config: &CheckerConfig) -> Result<(), TypeDeclError> {
        let span = g.point.source_span();
        match &g.value {
            TypeVal::Union(union) => {
                if union.case_types.len() > config.sum_max_branches {
                    return Err(TypeDeclError::TooManyUnionItems {
                        name: sym.to_string(),
                        given: union.case_types.len(),
                        max: config.sum_max_branches,
                        span,
                    });
                }
                for case in &union.case_types {
                    let case_g = match self.get(&case.name) {
                        Some(case_g) => case_g,
                        None => continue,
                    };
                    let consistent = case_g
                        .params
                        .iter()
                        .zip(case.params.iter())
                        .all(|(p, j)| g.params.get(*j).map(|up| up.variance) == Some(p.variance));
                    if !consistent {
                        return Err(TypeDeclError::CaseBadVariance {
                            case_name: case.name.to_string(),
                            union_name: sym.to_string(),
                            span: case_g.point.source_span(),
                        });
                    }
                }
                Ok(())
            }
            TypeVal::Boxed(boxed) => {
                let deduced = variance_of(&boxed.inner_type, g.arity(), self);
                match_variance(&g.params, &deduced).map_err(|bad_params| {
                    TypeDeclError::BoxedBadVariance {
                        name: sym.to_string(),
                        bad_params,
                        span,
                    }
                })
            }
            TypeVal::Native => Ok(()),
        }
    }
}

struct RawDecl<'m> {
    decl: &'m TypeDeclaration,
    module: &'m Module,
    params: Vec<TypeParam>,
    case_info: Option<CaseInfo>,
}

#[derive(Default)]
struct RawRegistry<'m> {
    decls: IndexMap<Symbol, RawDecl<'m>>,
    visited: HashSet<String>,
}

impl TypeLookup for RawRegistry<'_> {
    fn arity(&self, name: &Symbol) -> Option<usize> {
        self.decls
            .get(name)
            .map(|d| d.params.len())
            .or_else(|| CORE_TYPES.get(name).map(GenericType::arity))
    }
}

/// The union a case declaration is nested in
struct Parent<'p> {
    name: Symbol,
    params: &'p [TypeParam],
    case_index: usize,
}

fn collect_params(raw: &[TypeParameter]) -> Result<Vec<TypeParam>, TypeDeclError> {
    let mut params: Vec<TypeParam> = Vec::with_capacity(raw.len());
    for p in raw {
        let name = p.name.name.clone();
        if !is_valid_type_name(&name) {
            return Err(TypeDeclError::InvalidTypeParamName {
                name,
                span: Some(p.name.span.into()),
            });
        }
        if params.iter().any(|existing| existing.name == name) {
            return Err(TypeDeclError::DuplicateTypeParam {
                name,
                span: Some(p.name.span.into()),
            });
        }
        let variance = match p.variance {
            VarianceAnnotation::Invariant => Variance::Invariant,
            VarianceAnnotation::Covariant => Variance::Covariant,
            VarianceAnnotation::Contravariant => Variance::Contravariant,
        };
        params.push(TypeParam { name, variance });
    }
    Ok(params)
}

impl<'m> RawRegistry<'m> {
    fn collect_module(&mut self, module: &'m Module, errors: &mut Vec<ModuleError>) {
        if !self.visited.insert(module.name.clone()) {
            return;
        }
        for imported in module.imports.values() {
            self.collect_module(imported, errors);
        }
        for decl in module.type_declarations() {
            if let Err(err) = self.collect_decl(decl, module, None) {
                errors.push(ModuleError::new(module.name.clone(), module.source_file.clone(), err));
            }
        }
    }

    fn collect_decl(
        &mut self,
        decl: &'m TypeDeclaration,
        module: &'m Module,
        parent: Option<Parent<'_>>,
    ) -> Result<(), TypeDeclError> {
        let name = decl.name.name.clone();
        let span = Some(decl.name.span.into());
        if !is_valid_type_name(&name) {
            return Err(TypeDeclError::InvalidTypeName { name, span });
        }
        let sym = Symbol::new(module.name.clone(), name.clone());
        if self.decls.contains_key(&sym) || (module.name != CORE_MODULE && is_core_name(&name)) {
            return Err(TypeDeclError::DuplicateTypeDecl {
                name: sym.to_string(),
                span,
            });
        }
        let params = collect_params(&decl.params)?;
        let case_info = match parent {
            Some(parent) => {
                let mut case_params = Vec::with_capacity(params.len());
                for (p, raw_p) in params.iter().zip(decl.params.iter()) {
                    let j = parent
                        .params
                        .iter()
                        .position(|up| up.name == p.name)
                        .ok_or_else(|| TypeDeclError::InvalidCaseTypeParam {
                            case_name: sym.to_string(),
                            param: p.name.clone(),
                            span: Some(raw_p.span.into()),
                        })?;
                    case_params.push(j);
                }
                Some(CaseInfo {
                    union_name: parent.name,
                    union_arity: parent.params.len(),
                    case_index: parent.case_index,
                    case_params,
                })
            }
            None => None,
        };
        self.decls.insert(
            sym.clone(),
            RawDecl {
                decl,
                module,
                params: params.clone(),
                case_info,
            },
        );
        if let TypeDefinition::Union { cases } = &decl.definition {
            for (case_index, case) in cases.iter().enumerate() {
                self.collect_decl(
                    case,
                    module,
                    Some(Parent {
                        name: sym.clone(),
                        params: &params,
                        case_index,
                    }),
                )?;
            }
        }
        Ok(())
    }

    fn evaluate(&self, raw: &RawDecl<'m>, config: &CheckerConfig) -> Result<GenericType, TypeDeclError> {
        let param_names: Vec<String> = raw.params.iter().map(|p| p.name.clone()).collect();
        let ctx = TypeExprContext::new(raw.module, &param_names, config);
        let value = match &raw.decl.definition {
            TypeDefinition::Union { cases } => {
                let case_types = cases
                    .iter()
                    .map(|case| {
                        let name = Symbol::new(raw.module.name.clone(), case.name.name.clone());
                        let params = self
                            .decls
                            .get(&name)
                            .and_then(|d| d.case_info.as_ref())
                            .map(|info| info.case_params.clone())
                            .unwrap_or_default();
                        CaseType { name, params }
                    })
                    .collect();
                TypeVal::Union(Union { case_types })
            }
            TypeDefinition::Boxed(boxed) => {
                let inner_type = match &boxed.inner {
                    Some(inner) => type_from_expr(inner, &ctx, self)?,
                    None => Type::unit(),
                };
                TypeVal::Boxed(Boxed {
                    inner_type,
                    protected: boxed.protected,
                    opaque: boxed.opaque,
                    as_is: boxed.as_is,
                })
            }
            TypeDefinition::Native => TypeVal::Native,
        };
        Ok(GenericType {
            params: raw.params.clone(),
            value,
            point: ErrorPoint::new(raw.module.source_file.clone(), raw.decl.span),
            case_info: raw.case_info.clone(),
        })
    }
}
