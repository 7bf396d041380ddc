use std::rc::Rc;

use ensemble_core::{
    set_call_callback, EnsembleError, Env, EvalContext, FnKind, Function, MapEntries, Namespace,
    Value,
};

use crate::{prelude, special_forms};

/// Trampoline for tail-call optimization.
pub enum Trampoline {
    Value(Value),
    Eval(Value, Env),
}

pub type EvalResult = Result<Value, EnsembleError>;

/// The interpreter holds the root environment and the evaluation context.
pub struct Interpreter {
    pub global_env: Env,
    pub ctx: EvalContext,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// An interpreter with the full builtin library, including file access.
    pub fn new() -> Self {
        let interp = Self::with_namespaces([
            ensemble_stdlib::core_namespace(),
            ensemble_stdlib::io_namespace(),
        ]);
        interp.enable_load_file();
        if let Err(e) = interp.load_prelude() {
            tracing::error!(error = %e, "prelude failed to load");
        }
        interp
    }

    /// Bootstrap a root environment from `namespaces` and bind `eval`,
    /// `*ARGV*` and `*host-language*` in it.
    pub fn with_namespaces(namespaces: impl IntoIterator<Item = Namespace>) -> Self {
        let global_env = Env::bootstrap(namespaces);
        let ctx = EvalContext::new();
        set_call_callback(&ctx, call_value);
        prelude::install(&global_env);
        Interpreter { global_env, ctx }
    }

    /// Define `not` and `cond`. Requires the core namespace.
    pub fn load_prelude(&self) -> Result<(), EnsembleError> {
        prelude::load(&self.ctx, &self.global_env)
    }

    /// Bind `load-file`. It reads through the host file system.
    pub fn enable_load_file(&self) {
        prelude::install_load_file(&self.global_env);
    }

    /// Rebind `*ARGV*` to `args` as a list of strings.
    pub fn set_argv(&self, args: &[String]) {
        let argv = args.iter().map(|a| Value::string(a)).collect();
        self.global_env.set_str("*ARGV*", Value::list(argv));
    }

    pub fn eval(&self, expr: &Value) -> EvalResult {
        eval_value(&self.ctx, expr, &self.global_env)
    }

    pub fn eval_str(&self, input: &str) -> EvalResult {
        eval_string(&self.ctx, input, &self.global_env)
    }
}

impl Drop for Interpreter {
    /// Closures defined at top level capture the root frame, which in turn owns
    /// them. Emptying the frame breaks that cycle so the globals are freed.
    /// Values that escaped the interpreter keep working until they read a global.
    fn drop(&mut self) {
        let bindings = std::mem::take(&mut *self.global_env.bindings.borrow_mut());
        drop(bindings);
    }
}

/// Evaluate a string containing zero or more forms. Yields the last result, or nil.
pub fn eval_string(ctx: &EvalContext, input: &str, env: &Env) -> EvalResult {
    let exprs = ensemble_reader::read_many(input)?;
    let mut result = Value::Nil;
    for expr in &exprs {
        result = eval_value(ctx, expr, env)?;
    }
    Ok(result)
}

/// Evaluate with trampoline for TCO.
///
/// One depth level covers the whole loop, so tail positions (`if` branches,
/// the last `do` form, `let*` and closure bodies) run in constant stack.
pub fn eval_value(ctx: &EvalContext, expr: &Value, env: &Env) -> EvalResult {
    let _guard = ctx.enter()?;
    let mut current_expr = expr.clone();
    let mut current_env = env.clone();

    loop {
        match eval_step(ctx, &current_expr, &current_env)? {
            Trampoline::Value(v) => return Ok(v),
            Trampoline::Eval(next_expr, next_env) => {
                current_expr = next_expr;
                current_env = next_env;
            }
        }
    }
}

fn eval_step(ctx: &EvalContext, expr: &Value, env: &Env) -> Result<Trampoline, EnsembleError> {
    match expr {
        Value::List(items, _) if !items.is_empty() => {}
        _ => return eval_ast(ctx, expr, env).map(Trampoline::Value),
    }

    let expanded = macroexpand(ctx, expr, env)?;
    let items = match &expanded {
        Value::List(items, _) if !items.is_empty() => Rc::clone(items),
        _ => return eval_ast(ctx, &expanded, env).map(Trampoline::Value),
    };

    let head = &items[0];
    let args = &items[1..];

    if let Value::Symbol(spur) = head {
        if let Some(result) = special_forms::try_eval_special(*spur, args, env, ctx) {
            return result;
        }
    }

    let func = eval_value(ctx, head, env)?;
    let mut eval_args = Vec::with_capacity(args.len());
    for arg in args {
        eval_args.push(eval_value(ctx, arg, env)?);
    }
    apply(ctx, func, &eval_args)
}

/// Apply an evaluated head to evaluated arguments.
///
/// Closure bodies come back as `Trampoline::Eval` so the caller can continue
/// in place. A head that is not a function is returned unchanged.
fn apply(ctx: &EvalContext, func: Value, args: &[Value]) -> Result<Trampoline, EnsembleError> {
    let Value::Function(f) = &func else {
        return Ok(Trampoline::Value(func));
    };
    if f.is_macro {
        return Err(EnsembleError::eval("a macro cannot be applied as a function"));
    }
    match &f.kind {
        FnKind::Native(native) => (native.func)(ctx, args).map(Trampoline::Value),
        FnKind::Closure(closure) => Ok(Trampoline::Eval(
            closure.body.clone(),
            Env::bind(&closure.env, &closure.params, args),
        )),
    }
}

/// Call a function value to completion. Registered as the context's call callback
/// so natives like `map`, `apply` and `swap!` can invoke closures.
pub fn call_value(ctx: &EvalContext, func: &Value, args: &[Value]) -> EvalResult {
    match apply(ctx, func.clone(), args)? {
        Trampoline::Value(v) => Ok(v),
        Trampoline::Eval(body, env) => eval_value(ctx, &body, &env),
    }
}

/// Evaluate a form without treating lists as calls: symbols are looked up and
/// collections have their elements evaluated.
pub fn eval_ast(ctx: &EvalContext, expr: &Value, env: &Env) -> EvalResult {
    match expr {
        Value::Symbol(spur) => env.get(*spur),
        Value::List(items, _) => Ok(Value::list(eval_items(ctx, items, env)?)),
        Value::Vector(items, _) => Ok(Value::vector(eval_items(ctx, items, env)?)),
        Value::Map(entries, _) => {
            let mut result = MapEntries::new();
            for (k, v) in entries.iter() {
                result.insert(k.clone(), eval_value(ctx, v, env)?);
            }
            Ok(Value::map(result))
        }
        _ => Ok(expr.clone()),
    }
}

fn eval_items(ctx: &EvalContext, items: &[Value], env: &Env) -> Result<Vec<Value>, EnsembleError> {
    items.iter().map(|item| eval_value(ctx, item, env)).collect()
}

/// The macro named by the head of `ast`, if any.
fn macro_call(ast: &Value, env: &Env) -> Option<Rc<Function>> {
    let head = ast.as_list()?.first()?.as_symbol_spur()?;
    match env.lookup(head)? {
        Value::Function(f) if f.is_macro => Some(f),
        _ => None,
    }
}

/// Expand `ast` until its head no longer names a macro.
pub fn macroexpand(ctx: &EvalContext, ast: &Value, env: &Env) -> EvalResult {
    let mut ast = ast.clone();
    while let Some(mac) = macro_call(&ast, env) {
        let args = ast.as_list().map(|items| &items[1..]).unwrap_or_default();
        tracing::trace!(form = %ast, "macroexpand");
        ast = match &mac.kind {
            FnKind::Native(native) => (native.func)(ctx, args)?,
            FnKind::Closure(closure) => eval_value(
                ctx,
                &closure.body,
                &Env::bind(&closure.env, &closure.params, args),
            )?,
        };
    }
    Ok(ast)
}
