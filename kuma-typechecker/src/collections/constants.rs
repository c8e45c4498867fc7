//! Constant collection

use crate::builtins::IGNORE_MARK;
use crate::config::CheckerConfig;
use crate::error::{DeclarationError, ErrorPoint, ModuleError};
use crate::registry::TypeRegistry;
use crate::type_expr::{type_from_expr, TypeExprContext};
use crate::types::{Symbol, Type};
use indexmap::IndexMap;
use kuma_ast::{ConstantDeclaration, ConstantValue, Module};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub name: String,
    pub public: bool,
    pub declared_type: Type,
    pub point: ErrorPoint,
    pub is_native: bool,
}

/// Constants reachable from one module: its own plus public ones of its imports
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantCollection {
    constants: IndexMap<Symbol, Constant>,
}

impl ConstantCollection {
    pub fn get(&self, sym: &Symbol) -> Option<&Constant> {
        self.constants.get(sym)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Constant)> {
        self.constants.iter()
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }
}

pub type ConstantStore = IndexMap<String, ConstantCollection>;

pub fn collect_constants(
    module: &Module,
    registry: &TypeRegistry,
    config: &CheckerConfig,
    store: &mut ConstantStore,
    errors: &mut Vec<ModuleError>,
) {
    if store.contains_key(&module.name) {
        return;
    }
    let mut collection = ConstantCollection::default();
    for imported in module.imports.values() {
        collect_constants(imported, registry, config, store, errors);
        if let Some(imported_col) = store.get(&imported.name) {
            for (sym, constant) in imported_col.iter() {
                if constant.public && sym.module == imported.name {
                    collection.constants.insert(sym.clone(), constant.clone());
                }
            }
        }
    }
    for decl in module.constant_declarations() {
        let sym = Symbol::new(module.name.clone(), decl.name.name.clone());
        if collection.constants.contains_key(&sym) {
            errors.push(ModuleError::new(
                &module.name,
                &module.source_file,
                DeclarationError::DuplicateConstantDecl {
                    name: decl.name.name.clone(),
                    span: Some(decl.name.span.into()),
                },
            ));
            continue;
        }
        match evaluate_constant(decl, module, registry, config) {
            Ok(constant) => {
                collection.constants.insert(sym, constant);
            }
            Err(err) => errors.push(ModuleError::new(&module.name, &module.source_file, err)),
        }
    }
    debug!(module = %module.name, constants = collection.len(), "constants collected");
    store.insert(module.name.clone(), collection);
}

fn evaluate_constant(
    decl: &ConstantDeclaration,
    module: &Module,
    registry: &TypeRegistry,
    config: &CheckerConfig,
) -> Result<Constant, DeclarationError> {
    if decl.name.name == IGNORE_MARK {
        return Err(DeclarationError::InvalidConstantName {
            name: decl.name.name.clone(),
            span: Some(decl.name.span.into()),
        });
    }
    let ctx = TypeExprContext::new(module, &[], config);
    let declared_type = type_from_expr(&decl.declared_type, &ctx, registry)?;
    Ok(Constant {
        name: decl.name.name.clone(),
        public: decl.public,
        declared_type,
        point: ErrorPoint::new(module.source_file.clone(), decl.span),
        is_native: matches!(decl.value, ConstantValue::Native(_)),
    })
}
