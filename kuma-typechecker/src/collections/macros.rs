//! Macro collection

use crate::builtins::IGNORE_MARK;
use crate::error::{DeclarationError, ErrorPoint, ModuleError};
use indexmap::IndexMap;
use kuma_ast::{Expression, Module};
use std::sync::Arc;
use tracing::debug;

/// A macro: parameter names and the expression they are substituted into
#[derive(Debug, Clone, PartialEq)]
pub struct Macro {
    pub name: String,
    pub public: bool,
    pub input: Vec<String>,
    pub output: Expression,
    pub point: ErrorPoint,
    /// Declaring module
    pub module: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacroReference {
    pub macro_def: Arc<Macro>,
    /// Module the macro was taken from
    pub module: String,
    pub is_imported: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacroCollection {
    macros: IndexMap<String, MacroReference>,
}

impl MacroCollection {
    pub fn get(&self, name: &str) -> Option<&MacroReference> {
        self.macros.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MacroReference)> {
        self.macros.iter()
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

pub type MacroStore = IndexMap<String, MacroCollection>;

pub fn collect_macros(module: &Module, store: &mut MacroStore, errors: &mut Vec<ModuleError>) {
    if store.contains_key(&module.name) {
        return;
    }
    let mut collection = MacroCollection::default();
    let mut local_errors = Vec::new();
    for imported in module.imports.values() {
        collect_macros(imported, store, errors);
        let imported_col = match store.get(&imported.name) {
            Some(col) => col.clone(),
            None => continue,
        };
        for (name, r) in imported_col.iter() {
            if r.is_imported || !r.macro_def.public {
                continue;
            }
            if let Some(existing) = collection.macros.get(name) {
                local_errors.push(DeclarationError::MacroConflictBetweenModules {
                    name: name.clone(),
                    module1: existing.module.clone(),
                    module2: imported.name.clone(),
                    span: Some(module.span.into()),
                });
                continue;
            }
            collection.macros.insert(
                name.clone(),
                MacroReference {
                    macro_def: r.macro_def.clone(),
                    module: imported.name.clone(),
                    is_imported: true,
                },
            );
        }
    }
    for decl in module.macro_declarations() {
        let name = decl.name.name.clone();
        let span = Some(decl.name.span.into());
        if name == IGNORE_MARK {
            local_errors.push(DeclarationError::InvalidMacroName { name, span });
            continue;
        }
        if let Some(existing) = collection.macros.get(&name) {
            if existing.module == module.name {
                local_errors.push(DeclarationError::DuplicateMacroName { name, span });
            } else {
                local_errors.push(DeclarationError::MacroConflictWithImported {
                    name,
                    module: existing.module.clone(),
                    span,
                });
            }
            continue;
        }
        let macro_def = Macro {
            name: name.clone(),
            public: decl.public,
            input: decl.input.iter().map(|id| id.name.clone()).collect(),
            output: decl.output.clone(),
            point: ErrorPoint::new(module.source_file.clone(), decl.span),
            module: module.name.clone(),
        };
        collection.macros.insert(
            name,
            MacroReference {
                macro_def: Arc::new(macro_def),
                module: module.name.clone(),
                is_imported: false,
            },
        );
    }
    errors.extend(
        local_errors
            .into_iter()
            .map(|err: DeclarationError| ModuleError::new(&module.name, &module.source_file, err)),
    );
    debug!(module = %module.name, macros = collection.len(), "macros collected");
    store.insert(module.name.clone(), collection);
}
