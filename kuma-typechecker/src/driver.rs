//! Checking a whole program, starting from its entry module
//!
//! Phases run in a fixed order: type registration, then constant, macro and
//! function collection, then expression checking of every module reachable
//! from the entry. Each phase walks the import graph depth-first, imports
//! first, memoized by module name. A failing declaration is reported and
//! skipped; independent declarations are still checked.

use crate::checker::{assign_to, check, Expr, ExprContext, ModuleScope, SemiExpr, SemiValue};
use crate::collections::{
    collect_constants, collect_functions, collect_macros, ConstantCollection, ConstantStore, FunctionCollection,
    FunctionStore, GenericFunction, MacroCollection, MacroStore,
};
use crate::config::CheckerConfig;
use crate::error::{ExprError, ModuleError};
use crate::registry::TypeRegistry;
use crate::types::{Symbol, TypeBounds};
use indexmap::IndexMap;
use kuma_ast::{ConstantValue, FunctionBody, Module};
use std::sync::Arc;
use tracing::debug;

/// A function with its checked body; native functions have none
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedFunction {
    pub function: Arc<GenericFunction>,
    pub index: usize,
    pub body: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckedConstant {
    pub sym: Symbol,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckedModule {
    pub functions: Vec<CheckedFunction>,
    pub constants: Vec<CheckedConstant>,
}

/// Everything the checker learned about a program
#[derive(Debug)]
pub struct CheckedModules {
    pub registry: TypeRegistry,
    pub functions: FunctionStore,
    pub constants: ConstantStore,
    pub macros: MacroStore,
    pub modules: IndexMap<String, CheckedModule>,
}

impl CheckedModules {
    pub fn module(&self, name: &str) -> Option<&CheckedModule> {
        self.modules.get(name)
    }
}

/// Type check `entry` and every module it imports
pub fn typecheck(entry: &Module, config: &CheckerConfig) -> Result<CheckedModules, Vec<ModuleError>> {
    debug!(module = %entry.name, "type registration");
    let registry = TypeRegistry::register(entry, config)?;

    let mut errors = Vec::new();
    let mut constants = ConstantStore::new();
    let mut macros = MacroStore::new();
    let mut functions = FunctionStore::new();
    collect_constants(entry, &registry, config, &mut constants, &mut errors);
    collect_macros(entry, &mut macros, &mut errors);
    collect_functions(entry, &registry, config, &mut functions, &mut errors);

    let stores = Stores {
        registry: &registry,
        functions: &functions,
        constants: &constants,
        macros: &macros,
        config,
    };
    let mut modules = IndexMap::new();
    check_module(entry, &stores, &mut modules, &mut errors);

    if !errors.is_empty() {
        debug!(errors = errors.len(), "type check failed");
        return Err(errors);
    }
    Ok(CheckedModules {
        registry,
        functions,
        constants,
        macros,
        modules,
    })
}

struct Stores<'s> {
    registry: &'s TypeRegistry,
    functions: &'s FunctionStore,
    constants: &'s ConstantStore,
    macros: &'s MacroStore,
    config: &'s CheckerConfig,
}

fn check_module(
    module: &Module,
    stores: &Stores<'_>,
    checked: &mut IndexMap<String, CheckedModule>,
    errors: &mut Vec<ModuleError>,
) {
    if checked.contains_key(&module.name) {
        return;
    }
    // Marks the module as visited before its imports are walked
    checked.insert(module.name.clone(), CheckedModule::default());
    for imported in module.imports.values() {
        check_module(imported, stores, checked, errors);
    }
    debug!(module = %module.name, "checking module");

    let empty_functions = FunctionCollection::default();
    let empty_constants = ConstantCollection::default();
    let empty_macros = MacroCollection::default();
    let scope = ModuleScope {
        module,
        registry: stores.registry,
        functions: stores.functions.get(&module.name).unwrap_or(&empty_functions),
        constants: stores.constants.get(&module.name).unwrap_or(&empty_constants),
        macros: stores.macros.get(&module.name).unwrap_or(&empty_macros),
        config: stores.config,
    };
    let mut result = CheckedModule::default();
    let mut report = |err: ExprError| errors.push(ModuleError::new(&module.name, &module.source_file, err));

    for (index, decl) in module.function_declarations().enumerate() {
        let reference = scope
            .functions
            .get(&decl.name.name)
            .iter()
            .find(|r| !r.is_imported && r.index == index);
        // Functions that failed collection were already reported
        let function = match reference {
            Some(r) => r.function.clone(),
            None => continue,
        };
        let body = match &decl.body {
            FunctionBody::Native(_) => None,
            FunctionBody::Lambda(lambda) => {
                let ctx = ExprContext::new(scope, function.type_params.clone(), function.bounds.clone());
                let semi = SemiExpr::new(
                    SemiValue::UntypedLambda {
                        lambda,
                        ctx: ctx.clone(),
                    },
                    ctx.point(lambda.span),
                );
                match assign_to(Some(&function.signature()), semi, &ctx) {
                    Ok(expr) => Some(expr),
                    Err(err) => {
                        report(err);
                        continue;
                    }
                }
            }
        };
        result.functions.push(CheckedFunction { function, index, body });
    }

    for decl in module.constant_declarations() {
        let sym = Symbol::new(module.name.clone(), decl.name.name.clone());
        let declared = match scope.constants.get(&sym) {
            Some(constant) => constant.declared_type.clone(),
            None => continue,
        };
        let value = match &decl.value {
            ConstantValue::Native(_) => None,
            ConstantValue::Expression(expr) => {
                let ctx = ExprContext::new(scope, Vec::new(), TypeBounds::default());
                match check(expr, &ctx).and_then(|semi| assign_to(Some(&declared), semi, &ctx)) {
                    Ok(expr) => Some(expr),
                    Err(err) => {
                        report(err);
                        continue;
                    }
                }
            }
        };
        result.constants.push(CheckedConstant { sym, value });
    }

    debug!(
        module = %module.name,
        functions = result.functions.len(),
        constants = result.constants.len(),
        "module checked"
    );
    checked.insert(module.name.clone(), result);
}
