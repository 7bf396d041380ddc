use std::cell::Cell;

use crate::error::EnsembleError;
use crate::value::{FnKind, Value};

/// Nesting limit for a default interpreter. Fits a standard 8 MiB thread stack;
/// raise it only when running on a larger stack.
pub const DEFAULT_MAX_EVAL_DEPTH: usize = 1_000;

/// Apply a callable value to already-evaluated arguments.
pub type CallCallback = fn(&EvalContext, &Value, &[Value]) -> Result<Value, EnsembleError>;

/// Per-interpreter evaluation state shared by the evaluator and natives.
pub struct EvalContext {
    pub eval_depth: Cell<usize>,
    pub max_eval_depth: Cell<usize>,
    call_fn: Cell<Option<CallCallback>>,
}

impl EvalContext {
    pub fn new() -> Self {
        EvalContext {
            eval_depth: Cell::new(0),
            max_eval_depth: Cell::new(DEFAULT_MAX_EVAL_DEPTH),
            call_fn: Cell::new(None),
        }
    }

    pub fn set_max_eval_depth(&self, depth: usize) {
        self.max_eval_depth.set(depth);
    }

    /// Enter one level of non-tail evaluation. The returned guard leaves it on drop.
    pub fn enter(&self) -> Result<DepthGuard<'_>, EnsembleError> {
        let depth = self.eval_depth.get() + 1;
        if depth > self.max_eval_depth.get() {
            return Err(EnsembleError::range("maximum evaluation depth exceeded"));
        }
        self.eval_depth.set(depth);
        Ok(DepthGuard { ctx: self })
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}

pub struct DepthGuard<'a> {
    ctx: &'a EvalContext,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        let depth = self.ctx.eval_depth.get();
        self.ctx.eval_depth.set(depth.saturating_sub(1));
    }
}

pub fn set_call_callback(ctx: &EvalContext, f: CallCallback) {
    ctx.call_fn.set(Some(f));
}

/// Call a function value. Natives run directly; closures go through the evaluator.
pub fn call_callback(ctx: &EvalContext, func: &Value, args: &[Value]) -> Result<Value, EnsembleError> {
    match func {
        Value::Function(f) if !f.is_macro => match &f.kind {
            FnKind::Native(native) => (native.func)(ctx, args),
            FnKind::Closure(_) => match ctx.call_fn.get() {
                Some(call) => call(ctx, func, args),
                None => Err(EnsembleError::eval("no evaluator registered")),
            },
        },
        other => Err(EnsembleError::type_error("function", other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::NativeFn;

    #[test]
    fn depth_guard_unwinds() {
        let ctx = EvalContext::new();
        {
            let _a = ctx.enter().unwrap();
            let _b = ctx.enter().unwrap();
            assert_eq!(ctx.eval_depth.get(), 2);
        }
        assert_eq!(ctx.eval_depth.get(), 0);
    }

    #[test]
    fn depth_limit_is_range_error() {
        let ctx = EvalContext::new();
        ctx.set_max_eval_depth(1);
        let _a = ctx.enter().unwrap();
        let err = ctx.enter().err().unwrap();
        assert!(matches!(err, EnsembleError::Range(_)));
        assert_eq!(ctx.eval_depth.get(), 1);
    }

    #[test]
    fn call_callback_runs_natives_directly() {
        let ctx = EvalContext::new();
        let f = Value::native_fn(NativeFn::simple("len", |args| {
            Ok(Value::number(args.len() as f64))
        }));
        let out = call_callback(&ctx, &f, &[Value::Nil, Value::Nil]).unwrap();
        assert_eq!(out, Value::number(2.0));
    }

    #[test]
    fn call_callback_rejects_non_functions() {
        let ctx = EvalContext::new();
        let err = call_callback(&ctx, &Value::number(1.0), &[]).unwrap_err();
        assert!(matches!(err, EnsembleError::Type { .. }));
    }
}
