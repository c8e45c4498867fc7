//! Function collection and overload validation

use crate::builtins::IGNORE_MARK;
use crate::config::CheckerConfig;
use crate::error::{DeclarationError, ErrorPoint, ModuleError, TypeDeclError};
use crate::registry::{is_valid_type_name, TypeRegistry};
use crate::type_expr::{type_from_expr, TypeExprContext};
use crate::types::{Func, Type, TypeBounds};
use indexmap::IndexMap;
use kuma_ast::{BoundKind, FunctionDeclaration, FunctionTypeParameter, Module};
use std::sync::Arc;
use tracing::debug;

/// A declared function, generic over `type_params`
#[derive(Debug, Clone, PartialEq)]
pub struct GenericFunction {
    pub name: String,
    pub public: bool,
    pub type_params: Vec<String>,
    pub bounds: TypeBounds,
    pub declared_type: Func,
    pub point: ErrorPoint,
}

impl GenericFunction {
    pub fn arity(&self) -> usize {
        self.type_params.len()
    }

    pub fn signature(&self) -> Type {
        Type::Anonymous(crate::types::Repr::Func(self.declared_type.clone()))
    }
}

/// One overload visible in a module
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionReference {
    pub function: Arc<GenericFunction>,
    /// Declaring module
    pub module: String,
    /// Position among the declaring module's functions
    pub index: usize,
    pub is_imported: bool,
}

/// Overload sets visible in one module, keyed by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionCollection {
    functions: IndexMap<String, Vec<FunctionReference>>,
    locals: Vec<Arc<GenericFunction>>,
}

impl FunctionCollection {
    pub fn get(&self, name: &str) -> &[FunctionReference] {
        self.functions.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Functions declared by the module itself, in declaration order
    pub fn locals(&self) -> &[Arc<GenericFunction>] {
        &self.locals
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<FunctionReference>)> {
        self.functions.iter()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    fn add(&mut self, name: &str, reference: FunctionReference) -> Result<(), DeclarationError> {
        let existing = self.functions.entry(name.to_string()).or_default();
        for other in existing.iter() {
            if is_overload_unsafe(&other.function, &reference.function) {
                return Err(DeclarationError::InvalidOverload {
                    name: name.to_string(),
                    module: other.module.clone(),
                    between_local: !other.is_imported,
                    span: reference.function.point.source_span(),
                });
            }
        }
        existing.push(reference);
        Ok(())
    }
}

/// Two overloads that no call could tell apart
fn is_overload_unsafe(a: &GenericFunction, b: &GenericFunction) -> bool {
    a.arity() == b.arity() && a.declared_type == b.declared_type
}

/// Function collections of every module, keyed by module name
pub type FunctionStore = IndexMap<String, FunctionCollection>;

/// Collect the functions of `module` and (first) of everything it imports
pub fn collect_functions(
    module: &Module,
    registry: &TypeRegistry,
    config: &CheckerConfig,
    store: &mut FunctionStore,
    errors: &mut Vec<ModuleError>,
) {
    if store.contains_key(&module.name) {
        return;
    }
    let mut collection = FunctionCollection::default();
    for imported in module.imports.values() {
        collect_functions(imported, registry, config, store, errors);
        let imported_col = match store.get(&imported.name) {
            Some(col) => col.clone(),
            None => continue,
        };
        for (name, refs) in imported_col.iter() {
            for r in refs.iter().filter(|r| !r.is_imported && r.function.public) {
                let already = collection
                    .get(name)
                    .iter()
                    .any(|other| other.module == r.module && other.index == r.index);
                if already {
                    continue;
                }
                let reference = FunctionReference {
                    is_imported: true,
                    ..r.clone()
                };
                if let Err(err) = collection.add(name, reference) {
                    errors.push(ModuleError::new(&module.name, &module.source_file, err));
                }
            }
        }
    }
    for (index, decl) in module.function_declarations().enumerate() {
        let result = evaluate_function(decl, module, registry, config).and_then(|function| {
            let function = Arc::new(function);
            collection.locals.push(function.clone());
            collection.add(
                &decl.name.name,
                FunctionReference {
                    function,
                    module: module.name.clone(),
                    index,
                    is_imported: false,
                },
            )
        });
        if let Err(err) = result {
            errors.push(ModuleError::new(&module.name, &module.source_file, err));
        }
    }
    debug!(module = %module.name, functions = collection.len(), "functions collected");
    store.insert(module.name.clone(), collection);
}

fn type_param_names(params: &[FunctionTypeParameter]) -> Result<Vec<String>, TypeDeclError> {
    let mut names: Vec<String> = Vec::with_capacity(params.len());
    for p in params {
        let name = p.name.name.clone();
        let span = Some(p.name.span.into());
        if !is_valid_type_name(&name) {
            return Err(TypeDeclError::InvalidTypeParamName { name, span });
        }
        if names.contains(&name) {
            return Err(TypeDeclError::DuplicateTypeParam { name, span });
        }
        names.push(name);
    }
    Ok(names)
}

fn evaluate_function(
    decl: &FunctionDeclaration,
    module: &Module,
    registry: &TypeRegistry,
    config: &CheckerConfig,
) -> Result<GenericFunction, DeclarationError> {
    let name = decl.name.name.clone();
    if name == IGNORE_MARK {
        return Err(DeclarationError::InvalidFunctionName {
            name,
            span: Some(decl.name.span.into()),
        });
    }
    let type_params = type_param_names(&decl.type_params)?;
    let ctx = TypeExprContext::new(module, &type_params, config);
    let mut bounds = TypeBounds::default();
    for (index, p) in decl.type_params.iter().enumerate() {
        if let Some(bound) = &p.bound {
            let t = type_from_expr(&bound.type_expr, &ctx, registry)?;
            match bound.kind {
                BoundKind::Upper => bounds.upper.insert(index, t),
                BoundKind::Lower => bounds.lower.insert(index, t),
            };
        }
    }
    let input = type_from_expr(&decl.input, &ctx, registry)?;
    let output = type_from_expr(&decl.output, &ctx, registry)?;
    Ok(GenericFunction {
        name,
        public: decl.public,
        type_params,
        bounds,
        declared_type: Func::new(input, output),
        point: ErrorPoint::new(module.source_file.clone(), decl.span),
    })
}
