use std::cell::Cell;

use ensemble_core::{intern, resolve, Closure, EnsembleError, Env, EvalContext, Spur, Value};

use crate::eval::{self, Trampoline};
use crate::quasiquote;

/// Pre-interned `Spur` handles for the special form names.
///
/// Every list expression checks its head against these, so dispatch compares
/// integers instead of resolving strings.
///
/// `var`, `let`, `const`, `function`, `=>`, `try` and `catch` are accepted as
/// spellings of `def!`, `let*`, `fn*`, `try*` and `catch*`.
struct SpecialFormSpurs {
    arrow: Spur,
    catch: Spur,
    catch_alias: Spur,
    const_: Spur,
    def: Spur,
    defmacro: Spur,
    do_: Spur,
    fn_: Spur,
    function: Spur,
    if_: Spur,
    let_: Spur,
    let_star: Spur,
    macroexpand: Spur,
    quasiquote: Spur,
    quasiquoteexpand: Spur,
    quote: Spur,
    try_: Spur,
    try_alias: Spur,
    var: Spur,
}

impl SpecialFormSpurs {
    fn init() -> Self {
        Self {
            arrow: intern("=>"),
            catch: intern("catch*"),
            catch_alias: intern("catch"),
            const_: intern("const"),
            def: intern("def!"),
            defmacro: intern("defmacro!"),
            do_: intern("do"),
            fn_: intern("fn*"),
            function: intern("function"),
            if_: intern("if"),
            let_: intern("let"),
            let_star: intern("let*"),
            macroexpand: intern("macroexpand"),
            quasiquote: intern("quasiquote"),
            quasiquoteexpand: intern("quasiquoteexpand"),
            quote: intern("quote"),
            try_: intern("try*"),
            try_alias: intern("try"),
            var: intern("var"),
        }
    }
}

thread_local! {
    static SF: Cell<Option<&'static SpecialFormSpurs>> = const { Cell::new(None) };
}

fn special_forms() -> &'static SpecialFormSpurs {
    SF.with(|cell| match cell.get() {
        Some(sf) => sf,
        None => {
            let sf: &'static SpecialFormSpurs = Box::leak(Box::new(SpecialFormSpurs::init()));
            cell.set(Some(sf));
            sf
        }
    })
}

/// Evaluate a special form. Returns Some(result) if the head is a special form, None otherwise.
pub fn try_eval_special(
    head_spur: Spur,
    args: &[Value],
    env: &Env,
    ctx: &EvalContext,
) -> Option<Result<Trampoline, EnsembleError>> {
    let sf = special_forms();

    if head_spur == sf.if_ {
        Some(eval_if(args, env, ctx))
    } else if head_spur == sf.def || head_spur == sf.var {
        Some(eval_def(args, env, ctx))
    } else if [sf.let_star, sf.let_, sf.const_].contains(&head_spur) {
        Some(eval_let_star(args, env, ctx))
    } else if head_spur == sf.do_ {
        Some(eval_do(args, env, ctx))
    } else if [sf.fn_, sf.function, sf.arrow].contains(&head_spur) {
        Some(eval_fn(args, env))
    } else if head_spur == sf.quote {
        Some(eval_quote(args))
    } else if head_spur == sf.quasiquote {
        Some(eval_quasiquote(args, env))
    } else if head_spur == sf.quasiquoteexpand {
        Some(eval_quasiquoteexpand(args))
    } else if head_spur == sf.defmacro {
        Some(eval_defmacro(args, env, ctx))
    } else if head_spur == sf.macroexpand {
        Some(eval_macroexpand(args, env, ctx))
    } else if head_spur == sf.try_ || head_spur == sf.try_alias {
        Some(eval_try(args, env, ctx))
    } else {
        None
    }
}

fn binding_name(form: &str, val: &Value) -> Result<Spur, EnsembleError> {
    val.as_symbol_spur().ok_or_else(|| {
        EnsembleError::type_error(format!("symbol in {form}"), val.type_name())
    })
}

fn eval_quote(args: &[Value]) -> Result<Trampoline, EnsembleError> {
    if args.len() != 1 {
        return Err(EnsembleError::arity("quote", "1", args.len()));
    }
    Ok(Trampoline::Value(args[0].clone()))
}

fn eval_if(args: &[Value], env: &Env, ctx: &EvalContext) -> Result<Trampoline, EnsembleError> {
    if args.len() < 2 || args.len() > 3 {
        return Err(EnsembleError::arity("if", "2 or 3", args.len()));
    }
    let cond = eval::eval_value(ctx, &args[0], env)?;
    if cond.is_truthy() {
        Ok(Trampoline::Eval(args[1].clone(), env.clone()))
    } else if args.len() == 3 {
        Ok(Trampoline::Eval(args[2].clone(), env.clone()))
    } else {
        Ok(Trampoline::Value(Value::nil()))
    }
}

fn eval_def(args: &[Value], env: &Env, ctx: &EvalContext) -> Result<Trampoline, EnsembleError> {
    if args.len() != 2 {
        return Err(EnsembleError::arity("def!", "2", args.len()));
    }
    let name = binding_name("def!", &args[0])?;
    let val = eval::eval_value(ctx, &args[1], env)?;
    tracing::trace!(name = %resolve(name), "def!");
    env.set(name, val.clone());
    Ok(Trampoline::Value(val))
}

fn eval_let_star(
    args: &[Value],
    env: &Env,
    ctx: &EvalContext,
) -> Result<Trampoline, EnsembleError> {
    if args.len() != 2 {
        return Err(EnsembleError::arity("let*", "2", args.len()));
    }
    let bindings = args[0]
        .as_seq()
        .ok_or_else(|| EnsembleError::type_error("list or vector of bindings", args[0].type_name()))?;
    if bindings.len() % 2 != 0 {
        return Err(EnsembleError::eval(
            "let*: bindings must have an even number of forms",
        ));
    }

    let new_env = env.child();
    for pair in bindings.chunks(2) {
        let name = binding_name("let*", &pair[0])?;
        let val = eval::eval_value(ctx, &pair[1], &new_env)?;
        new_env.set(name, val);
    }

    Ok(Trampoline::Eval(args[1].clone(), new_env))
}

fn eval_do(args: &[Value], env: &Env, ctx: &EvalContext) -> Result<Trampoline, EnsembleError> {
    let Some((last, init)) = args.split_last() else {
        return Ok(Trampoline::Value(Value::nil()));
    };
    for expr in init {
        eval::eval_value(ctx, expr, env)?;
    }
    Ok(Trampoline::Eval(last.clone(), env.clone()))
}

fn eval_fn(args: &[Value], env: &Env) -> Result<Trampoline, EnsembleError> {
    if args.len() != 2 {
        return Err(EnsembleError::arity("fn*", "2", args.len()));
    }
    let params = args[0]
        .as_seq()
        .ok_or_else(|| EnsembleError::type_error("list or vector of parameters", args[0].type_name()))?
        .iter()
        .map(|p| binding_name("fn*", p))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Trampoline::Value(Value::closure(Closure {
        params,
        body: args[1].clone(),
        env: env.clone(),
    })))
}

fn eval_quasiquoteexpand(args: &[Value]) -> Result<Trampoline, EnsembleError> {
    if args.len() != 1 {
        return Err(EnsembleError::arity("quasiquoteexpand", "1", args.len()));
    }
    Ok(Trampoline::Value(quasiquote::expand(&args[0])))
}

fn eval_quasiquote(args: &[Value], env: &Env) -> Result<Trampoline, EnsembleError> {
    if args.len() != 1 {
        return Err(EnsembleError::arity("quasiquote", "1", args.len()));
    }
    Ok(Trampoline::Eval(quasiquote::expand(&args[0]), env.clone()))
}

fn eval_defmacro(
    args: &[Value],
    env: &Env,
    ctx: &EvalContext,
) -> Result<Trampoline, EnsembleError> {
    if args.len() != 2 {
        return Err(EnsembleError::arity("defmacro!", "2", args.len()));
    }
    let name = binding_name("defmacro!", &args[0])?;
    let val = eval::eval_value(ctx, &args[1], env)?;
    let func = val
        .as_function()
        .ok_or_else(|| EnsembleError::type_error("function", val.type_name()))?;
    let mac = Value::Function(std::rc::Rc::new(func.to_macro()));
    tracing::trace!(name = %resolve(name), "defmacro!");
    env.set(name, mac.clone());
    Ok(Trampoline::Value(mac))
}

fn eval_macroexpand(
    args: &[Value],
    env: &Env,
    ctx: &EvalContext,
) -> Result<Trampoline, EnsembleError> {
    if args.len() != 1 {
        return Err(EnsembleError::arity("macroexpand", "1", args.len()));
    }
    eval::macroexpand(ctx, &args[0], env).map(Trampoline::Value)
}

/// `(try* body (catch* name handler))`
///
/// Only runtime errors are caught. Reader errors from `read-string` propagate
/// past every handler. Without a catch clause the error is re-raised as is.
fn eval_try(args: &[Value], env: &Env, ctx: &EvalContext) -> Result<Trampoline, EnsembleError> {
    let sf = special_forms();
    if args.is_empty() || args.len() > 2 {
        return Err(EnsembleError::arity("try*", "1 or 2", args.len()));
    }

    let handler = match args.get(1) {
        None => None,
        Some(form) => {
            let clause = form
                .as_list()
                .filter(|items| {
                    items
                        .first()
                        .is_some_and(|h| h.is_symbol(sf.catch) || h.is_symbol(sf.catch_alias))
                })
                .ok_or_else(|| EnsembleError::eval("try*: expected (catch* name handler)"))?;
            if clause.len() != 3 {
                return Err(EnsembleError::arity("catch*", "2", clause.len() - 1));
            }
            Some((binding_name("catch*", &clause[1])?, clause[2].clone()))
        }
    };

    match eval::eval_value(ctx, &args[0], env) {
        Ok(val) => Ok(Trampoline::Value(val)),
        Err(err) => {
            let Some((name, body)) = handler.filter(|_| err.is_catchable()) else {
                return Err(err);
            };
            tracing::debug!(error = %err, kind = err.name(), "caught by try*");
            let catch_env = env.child();
            catch_env.set(name, err.to_value());
            eval::eval_value(ctx, &body, &catch_env).map(Trampoline::Value)
        }
    }
}
