//! Expression checking context
//!
//! The context is immutable: every `with_*` method returns an extended copy.
//! The only shared mutable state is the inference slot map of the episode in
//! progress and its unboxing counter, both behind `Rc` so that a lambda checked
//! later can join the episode of the call that finalizes it.

use crate::assign::AssignContext;
use crate::collections::{ConstantCollection, FunctionCollection, FunctionReference, MacroCollection, MacroReference};
use crate::config::CheckerConfig;
use crate::describe::{describe_type, DescribeContext};
use crate::error::{ErrorPoint, ExprError, TypeDeclError};
use crate::generics::{fill_inferred, resolve};
use crate::registry::TypeRegistry;
use crate::type_expr::{type_from_expr, TypeExprContext};
use crate::types::{Symbol, Type, TypeBounds};
use indexmap::IndexMap;
use kuma_ast::{Expression, Module, QualifiedName, TypeExpression};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Everything a module offers to the expressions inside it
#[derive(Debug, Clone, Copy)]
pub struct ModuleScope<'a> {
    pub module: &'a Module,
    pub registry: &'a TypeRegistry,
    pub functions: &'a FunctionCollection,
    pub constants: &'a ConstantCollection,
    pub macros: &'a MacroCollection,
    pub config: &'a CheckerConfig,
}

/// Slots of one inference episode, with the parameter names of the generic being inferred
#[derive(Debug, Clone)]
pub struct InferringState {
    pub param_names: Rc<[String]>,
    pub slots: Rc<RefCell<IndexMap<usize, Type>>>,
}

/// One macro being expanded: parameter name -> argument expression
#[derive(Debug, Clone)]
pub struct MacroExpansion<'a> {
    pub name: String,
    pub module: String,
    pub args: IndexMap<String, &'a Expression>,
    /// Locals in scope at the call site
    pub caller_locals: Rc<HashMap<String, Type>>,
}

/// What a value name refers to
#[derive(Debug, Clone)]
pub enum ValueSymbol<'a> {
    /// Macro argument, checked in the context of the macro call site
    MacroArgument {
        expr: &'a Expression,
        ctx: ExprContext<'a>,
    },
    Local(Type),
    TypeParam,
    Functions {
        functions: Vec<FunctionReference>,
        fallback_type: Option<Symbol>,
    },
    Type(Symbol),
    Constant {
        sym: Symbol,
        ty: Type,
    },
    Macro(&'a MacroReference),
}

#[derive(Debug, Clone)]
pub struct ExprContext<'a> {
    pub scope: ModuleScope<'a>,
    type_params: Rc<[String]>,
    bounds: Rc<TypeBounds>,
    locals: Rc<HashMap<String, Type>>,
    inferring: Option<InferringState>,
    unbox_count: Rc<Cell<usize>>,
    macro_path: Rc<Vec<MacroExpansion<'a>>>,
}

impl<'a> ExprContext<'a> {
    pub fn new(scope: ModuleScope<'a>, type_params: Vec<String>, bounds: TypeBounds) -> Self {
        Self {
            scope,
            type_params: type_params.into(),
            bounds: Rc::new(bounds),
            locals: Rc::new(HashMap::new()),
            inferring: None,
            unbox_count: Rc::new(Cell::new(0)),
            macro_path: Rc::new(Vec::new()),
        }
    }

    pub fn module_name(&self) -> &'a str {
        &self.scope.module.name
    }

    pub fn registry(&self) -> &'a TypeRegistry {
        self.scope.registry
    }

    pub fn point(&self, span: kuma_ast::Span) -> ErrorPoint {
        ErrorPoint::new(self.scope.module.source_file.clone(), span)
    }

    /// Later bindings shadow earlier ones of the same name
    pub fn with_locals(&self, bindings: impl IntoIterator<Item = (String, Type)>) -> Self {
        let mut locals = (*self.locals).clone();
        locals.extend(bindings);
        Self {
            locals: Rc::new(locals),
            ..self.clone()
        }
    }

    /// Start a fresh inference episode for a generic with parameters `names`
    pub fn with_inferring_enabled(&self, names: &[String]) -> Self {
        Self {
            inferring: Some(InferringState {
                param_names: names.to_vec().into(),
                slots: Rc::new(RefCell::new(IndexMap::new())),
            }),
            ..self.clone()
        }
    }

    /// Independent copy of the current episode with its own unboxing counter,
    /// for trying one candidate among several
    pub fn fork(&self) -> Self {
        Self {
            inferring: self.inferring.as_ref().map(|state| InferringState {
                param_names: state.param_names.clone(),
                slots: Rc::new(RefCell::new(state.slots.borrow().clone())),
            }),
            unbox_count: Rc::new(Cell::new(0)),
            ..self.clone()
        }
    }

    /// Adopt the bindings and unboxing steps of a fork that was chosen
    pub fn merge_from(&self, fork: &ExprContext<'_>) {
        if let (Some(mine), Some(theirs)) = (&self.inferring, &fork.inferring) {
            let bound = theirs.slots.borrow().clone();
            *mine.slots.borrow_mut() = bound;
        }
        self.unbox_count
            .set(self.unbox_count.get() + fork.unbox_count.get());
    }

    /// This context, joined to the inference episode of `caller`
    pub fn with_inference_from(&self, caller: &ExprContext<'a>) -> Self {
        Self {
            inferring: caller.inferring.clone(),
            unbox_count: caller.unbox_count.clone(),
            ..self.clone()
        }
    }

    pub fn with_macro_expanded(&self, expansion: MacroExpansion<'a>) -> Self {
        let mut path = (*self.macro_path).clone();
        path.push(expansion);
        Self {
            macro_path: Rc::new(path),
            ..self.clone()
        }
    }

    pub fn macro_path(&self) -> &[MacroExpansion<'a>] {
        &self.macro_path
    }

    pub fn locals(&self) -> &Rc<HashMap<String, Type>> {
        &self.locals
    }

    pub fn unbox_steps(&self) -> usize {
        self.unbox_count.get()
    }

    /// Roll the step count back to a value read with [`ExprContext::unbox_steps`]
    pub fn restore_unbox_steps(&self, steps: usize) {
        self.unbox_count.set(steps);
    }

    /// An implicit boxing costs as much as one unboxing step
    pub fn count_auto_box(&self) {
        self.unbox_count.set(self.unbox_count.get() + 1);
    }

    pub fn is_inferring(&self) -> bool {
        self.inferring.is_some()
    }

    pub fn type_params(&self) -> &[String] {
        &self.type_params
    }

    pub fn bounds(&self) -> &TypeBounds {
        &self.bounds
    }

    pub fn inferred(&self) -> Option<IndexMap<usize, Type>> {
        self.inferring.as_ref().map(|state| state.slots.borrow().clone())
    }

    /// Roll the slot map back to a snapshot taken with [`ExprContext::inferred`]
    pub fn restore_inferred(&self, saved: Option<IndexMap<usize, Type>>) {
        if let (Some(state), Some(saved)) = (&self.inferring, saved) {
            *state.slots.borrow_mut() = saved;
        }
    }

    pub fn assign_ctx(&self) -> AssignContext<'_> {
        AssignContext {
            registry: self.scope.registry,
            module: &self.scope.module.name,
            bounds: &self.bounds,
            slots: self.inferring.as_ref().map(|state| &*state.slots),
            unbox_count: &self.unbox_count,
        }
    }

    /// Assignment context that never touches inference slots
    pub fn plain_assign_ctx(&self) -> AssignContext<'_> {
        AssignContext {
            slots: None,
            ..self.assign_ctx()
        }
    }

    /// `t` with the bindings made so far substituted
    pub fn current(&self, t: &Type) -> Type {
        match &self.inferring {
            Some(state) => fill_inferred(t, &state.slots.borrow()),
            None => t.clone(),
        }
    }

    /// `t` fully determined, or an explicit-type error at `point`
    pub fn certain_type(&self, t: &Type, point: &ErrorPoint) -> Result<Type, ExprError> {
        let resolved = match &self.inferring {
            Some(state) => resolve(t, &state.slots.borrow()),
            None if t.has_inference_slots() => None,
            None => Some(t.clone()),
        };
        match resolved {
            Some(t) if !t.has_wildcard() => Ok(t),
            _ => Err(ExprError::ExplicitTypeRequired {
                span: point.source_span(),
            }),
        }
    }

    pub fn describe(&self, t: &Type) -> String {
        let ctx = DescribeContext::new(&self.type_params, &self.scope.module.name);
        match &self.inferring {
            Some(state) => {
                let slots = state.slots.borrow();
                describe_type(t, &ctx.with_inferred(&slots, &state.param_names))
            }
            None => describe_type(t, &ctx),
        }
    }

    /// Read a type annotation; `_` is allowed inside expressions
    pub fn type_from_expr(&self, te: &TypeExpression) -> Result<Type, TypeDeclError> {
        let ctx = TypeExprContext::new(self.scope.module, &self.type_params, self.scope.config).with_wildcard();
        type_from_expr(te, &ctx, self.scope.registry)
    }

    /// Argument `name` of the innermost macro being expanded, with the context of its call site
    pub fn find_macro_arg(&self, name: &str) -> Option<(&'a Expression, ExprContext<'a>)> {
        let (last, outer) = self.macro_path.split_last()?;
        let expr = *last.args.get(name)?;
        let ctx = Self {
            macro_path: Rc::new(outer.to_vec()),
            locals: last.caller_locals.clone(),
            ..self.clone()
        };
        Some((expr, ctx))
    }

    pub fn lookup_symbol(&self, name: &QualifiedName) -> Result<ValueSymbol<'a>, ExprError> {
        let local = name.name.as_str();
        let not_found = || ExprError::SymbolNotFound {
            name: name.to_string(),
            span: Some(name.span.into()),
        };
        let scope = self.scope;
        match &name.module {
            Some(alias) => {
                let imported = scope.module.import(&alias.name).ok_or_else(|| {
                    ExprError::TypeExpr(TypeDeclError::ModuleNotFound {
                        alias: alias.name.clone(),
                        span: Some(alias.span.into()),
                    })
                })?;
                let sym = Symbol::new(imported.name.clone(), local);
                let type_sym = Some(sym.clone()).filter(|sym| scope.registry.contains(sym));
                let functions: Vec<FunctionReference> = scope
                    .functions
                    .get(local)
                    .iter()
                    .filter(|r| r.module == imported.name)
                    .cloned()
                    .collect();
                if !functions.is_empty() {
                    return Ok(ValueSymbol::Functions {
                        functions,
                        fallback_type: type_sym,
                    });
                }
                if let Some(sym) = type_sym {
                    return Ok(ValueSymbol::Type(sym));
                }
                match scope.constants.get(&sym) {
                    Some(constant) => Ok(ValueSymbol::Constant {
                        ty: constant.declared_type.clone(),
                        sym,
                    }),
                    None => Err(not_found()),
                }
            }
            None => {
                if let Some((expr, ctx)) = self.find_macro_arg(local) {
                    return Ok(ValueSymbol::MacroArgument { expr, ctx });
                }
                if let Some(t) = self.locals.get(local) {
                    return Ok(ValueSymbol::Local(t.clone()));
                }
                if self.type_params.iter().any(|p| p == local) {
                    return Ok(ValueSymbol::TypeParam);
                }
                let own = Symbol::new(scope.module.name.clone(), local);
                let core = crate::builtins::core_symbol(local);
                let type_sym = [own.clone(), core]
                    .into_iter()
                    .find(|sym| scope.registry.contains(sym));
                let functions = scope.functions.get(local);
                if !functions.is_empty() {
                    return Ok(ValueSymbol::Functions {
                        functions: functions.to_vec(),
                        fallback_type: type_sym,
                    });
                }
                if let Some(sym) = type_sym {
                    return Ok(ValueSymbol::Type(sym));
                }
                if let Some(constant) = scope.constants.get(&own) {
                    return Ok(ValueSymbol::Constant {
                        ty: constant.declared_type.clone(),
                        sym: own,
                    });
                }
                match scope.macros.get(local) {
                    Some(m) => Ok(ValueSymbol::Macro(m)),
                    None => Err(not_found()),
                }
            }
        }
    }
}
