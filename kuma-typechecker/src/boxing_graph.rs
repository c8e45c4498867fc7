//! Boxed-type wrapping graph using petgraph
//!
//! Each boxed type whose inner type is another boxed named type contributes one
//! edge. A strongly connected component of this graph is a type that (indirectly)
//! wraps itself.

use crate::error::{ModuleError, TypeDeclError};
use crate::registry::TypeRegistry;
use crate::types::{Symbol, Type};
use indexmap::IndexMap;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

#[derive(Debug, Clone)]
pub struct BoxingGraph {
    graph: DiGraph<Symbol, ()>,
    nodes: IndexMap<Symbol, NodeIndex>,
}

impl BoxingGraph {
    pub fn build(registry: &TypeRegistry) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = IndexMap::new();
        for (sym, g) in registry.iter() {
            if g.as_boxed().is_some() {
                nodes.insert(sym.clone(), graph.add_node(sym.clone()));
            }
        }
        for (sym, g) in registry.iter() {
            let inner = match g.as_boxed().map(|boxed| &boxed.inner_type) {
                Some(Type::Named { name, .. }) => name,
                _ => continue,
            };
            if let (Some(from), Some(to)) = (nodes.get(sym), nodes.get(inner)) {
                graph.add_edge(*from, *to, ());
            }
        }
        Self { graph, nodes }
    }

    /// Every wrapping cycle, as a closed path starting at its earliest-registered member
    pub fn cycles(&self) -> Vec<Vec<Symbol>> {
        let mut cycles = Vec::new();
        for component in tarjan_scc(&self.graph) {
            let is_cycle = component.len() > 1
                || component
                    .first()
                    .map(|n| self.graph.contains_edge(*n, *n))
                    .unwrap_or(false);
            if !is_cycle {
                continue;
            }
            let start = match component
                .iter()
                .min_by_key(|n| self.nodes.get_index_of(&self.graph[**n]))
            {
                Some(start) => *start,
                None => continue,
            };
            // every boxed type wraps exactly one type, so the component is a single ring
            let mut path = vec![self.graph[start].clone()];
            let mut current = start;
            while let Some(next) = self.graph.neighbors(current).next() {
                path.push(self.graph[next].clone());
                if next == start || path.len() > component.len() {
                    break;
                }
                current = next;
            }
            cycles.push(path);
        }
        cycles.sort_by_key(|path| path.first().and_then(|s| self.nodes.get_index_of(s)));
        cycles
    }

    /// One error per cycle, attributed to the module declaring its first member
    pub fn cycle_errors(&self, registry: &TypeRegistry) -> Vec<ModuleError> {
        let mut errors = Vec::new();
        for path in self.cycles() {
            let (first, g) = match path.first().and_then(|s| registry.get(s).map(|g| (s, g))) {
                Some(found) => found,
                None => continue,
            };
            let error = TypeDeclError::TypeCircularDependency {
                path: path.iter().map(|s| s.to_string()).collect(),
                span: g.point.source_span(),
            };
            errors.push(ModuleError::new(first.module.clone(), g.point.file.clone(), error));
        }
        errors
    }
}
