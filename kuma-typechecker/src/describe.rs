//! Human-readable rendering of types for diagnostics

use crate::builtins::CORE_MODULE;
use crate::types::{Repr, Type};
use indexmap::IndexMap;

/// Names needed to print a type the way the user wrote it
#[derive(Debug, Clone, Copy)]
pub struct DescribeContext<'a> {
    pub param_names: &'a [String],
    pub current_module: &'a str,
    /// Bindings of inference slots made so far
    pub inferred: Option<&'a IndexMap<usize, Type>>,
    /// Parameter names of the generic whose arguments are being inferred
    pub inferred_names: &'a [String],
}

impl<'a> DescribeContext<'a> {
    pub fn new(param_names: &'a [String], current_module: &'a str) -> Self {
        Self {
            param_names,
            current_module,
            inferred: None,
            inferred_names: &[],
        }
    }

    pub fn with_inferred(mut self, inferred: &'a IndexMap<usize, Type>, names: &'a [String]) -> Self {
        self.inferred = Some(inferred);
        self.inferred_names = names;
        self
    }

    fn param_name(names: &[String], index: usize) -> String {
        names.get(index).cloned().unwrap_or_else(|| format!("#{}", index))
    }
}

pub fn describe_type(t: &Type, ctx: &DescribeContext<'_>) -> String {
    match t {
        Type::Wildcard => "_".to_string(),
        Type::Parameter {
            index,
            being_inferred: true,
        } => match ctx.inferred.and_then(|slots| slots.get(index)) {
            Some(bound) => describe_type(bound, ctx),
            None => format!("?{}", DescribeContext::param_name(ctx.inferred_names, *index)),
        },
        Type::Parameter { index, .. } => DescribeContext::param_name(ctx.param_names, *index),
        Type::Named { name, args } => {
            let mut buf = if name.module == CORE_MODULE || name.module == ctx.current_module {
                name.name.clone()
            } else {
                name.to_string()
            };
            if !args.is_empty() {
                let args: Vec<String> = args.iter().map(|arg| describe_type(arg, ctx)).collect();
                buf.push('[');
                buf.push_str(&args.join(", "));
                buf.push(']');
            }
            buf
        }
        Type::Anonymous(repr) => match repr {
            Repr::Unit => "()".to_string(),
            Repr::Tuple(elements) => {
                let elements: Vec<String> = elements.iter().map(|el| describe_type(el, ctx)).collect();
                format!("({})", elements.join(", "))
            }
            Repr::Bundle(bundle) => {
                let fields: Vec<String> = bundle
                    .ordered()
                    .into_iter()
                    .map(|(name, field)| format!("{}: {}", name, describe_type(&field.ty, ctx)))
                    .collect();
                format!("{{ {} }}", fields.join(", "))
            }
            Repr::Func(func) => format!(
                "({} => {})",
                describe_type(&func.input, ctx),
                describe_type(&func.output, ctx)
            ),
        },
    }
}
