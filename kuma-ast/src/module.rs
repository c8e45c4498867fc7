// Loaded module interface
// The module loader resolves imports and hands over one `Module` per source file

use crate::ast::{
    ConstantDeclaration, FunctionDeclaration, Item, ItemKind, MacroDeclaration, Span,
    TypeDeclaration,
};
use indexmap::IndexMap;
use std::sync::Arc;

/// A parsed module together with its resolved imports
///
/// Imports form a DAG; diamond imports share the same `Arc<Module>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub source_file: String,
    /// Local alias -> imported module
    pub imports: IndexMap<String, Arc<Module>>,
    pub items: Vec<Item>,
    pub span: Span,
}

impl Module {
    pub fn new(name: impl Into<String>, source_file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_file: source_file.into(),
            imports: IndexMap::new(),
            items: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn with_import(mut self, alias: impl Into<String>, module: Arc<Module>) -> Self {
        self.imports.insert(alias.into(), module);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.span = self.span.to(item.span);
        self.items.push(item);
        self
    }

    pub fn type_declarations(&self) -> impl Iterator<Item = &TypeDeclaration> {
        self.items.iter().filter_map(|item| match &item.kind {
            ItemKind::TypeDeclaration(decl) => Some(decl),
            _ => None,
        })
    }

    pub fn function_declarations(&self) -> impl Iterator<Item = &FunctionDeclaration> {
        self.items.iter().filter_map(|item| match &item.kind {
            ItemKind::FunctionDeclaration(decl) => Some(decl),
            _ => None,
        })
    }

    pub fn constant_declarations(&self) -> impl Iterator<Item = &ConstantDeclaration> {
        self.items.iter().filter_map(|item| match &item.kind {
            ItemKind::ConstantDeclaration(decl) => Some(decl),
            _ => None,
        })
    }

    pub fn macro_declarations(&self) -> impl Iterator<Item = &MacroDeclaration> {
        self.items.iter().filter_map(|item| match &item.kind {
            ItemKind::MacroDeclaration(decl) => Some(decl),
            _ => None,
        })
    }

    /// Look up an import by its local alias
    pub fn import(&self, alias: &str) -> Option<&Arc<Module>> {
        self.imports.get(alias)
    }
}
