//! Macro expansion at call sites

use super::{check, ExprContext, MacroExpansion, SemiExpr};
use crate::collections::MacroReference;
use crate::error::{ErrorPoint, ExprError};
use kuma_ast::{Expression, ExpressionKind};
use tracing::trace;

/// `m(a, b)` passes two arguments and `m()` none. A macro of one parameter
/// receives the whole argument, tuples included.
pub(super) fn macro_arguments(argument: &Expression, arity: usize) -> Vec<&Expression> {
    match &argument.kind {
        ExpressionKind::Tuple(elements) if arity != 1 => elements.iter().collect(),
        _ => vec![argument],
    }
}

pub(super) fn expand_macro<'a>(
    reference: &'a MacroReference,
    args: Vec<&'a Expression>,
    point: ErrorPoint,
    ctx: &ExprContext<'a>,
) -> Result<SemiExpr<'a>, ExprError> {
    let def = &*reference.macro_def;
    if args.len() != def.input.len() {
        return Err(ExprError::MacroWrongArgsQuantity {
            name: def.name.clone(),
            required: def.input.len(),
            given: args.len(),
            span: point.source_span(),
        });
    }
    let circular = ctx
        .macro_path()
        .iter()
        .any(|frame| frame.name == def.name && frame.module == def.module);
    if circular {
        return Err(ExprError::MacroCircularExpanding {
            name: def.name.clone(),
            span: point.source_span(),
        });
    }
    trace!(name = %def.name, depth = ctx.macro_path().len(), "expanding macro");
    let expansion = MacroExpansion {
        name: def.name.clone(),
        module: def.module.clone(),
        args: def.input.iter().cloned().zip(args).collect(),
        caller_locals: ctx.locals().clone(),
    };
    check(&def.output, &ctx.with_macro_expanded(expansion)).map_err(|deeper| ExprError::MacroExpandingFailed {
        name: def.name.clone(),
        deeper: Box::new(deeper),
        span: point.source_span(),
    })
}
