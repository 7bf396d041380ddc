use ensemble_core::{check_arity, EnsembleError, Env, EvalContext, NativeFn, Value, WeakEnv};

use crate::eval::{eval_string, eval_value};

/// Definitions written in Ensemble itself, loaded at interpreter startup.
pub const PRELUDE: &str = r#"
(def! not (fn* (a) (if a false true)))

(defmacro! cond
  (fn* (& xs)
    (if (> (count xs) 0)
      (list 'if (first xs)
        (if (> (count xs) 1)
          (nth xs 1)
          (throw "odd number of forms to cond"))
        (cons 'cond (rest (rest xs)))))))
"#;

/// The root frame behind a weak handle. Natives stored in the root must not own it.
fn upgrade(env: &WeakEnv) -> Result<Env, EnsembleError> {
    env.upgrade()
        .ok_or_else(|| EnsembleError::eval("root environment has been dropped"))
}

/// Bind the evaluator-backed natives and the host variables.
pub(crate) fn install(env: &Env) {
    let root = env.downgrade();
    env.set_str(
        "eval",
        Value::native_fn(NativeFn::with_ctx("eval", move |ctx, args| {
            check_arity!(args, "eval", 1);
            eval_value(ctx, &args[0], &upgrade(&root)?)
        })),
    );
    env.set_str("*host-language*", Value::string("ensemble"));
    env.set_str("*ARGV*", Value::list(vec![]));
}

/// Run `PRELUDE` in `env`. Needs the core namespace.
pub(crate) fn load(ctx: &EvalContext, env: &Env) -> Result<(), EnsembleError> {
    eval_string(ctx, PRELUDE, env)?;
    tracing::debug!("prelude loaded");
    Ok(())
}

/// Bind `load-file`: read every form in a file and evaluate it in the root
/// environment. Yields nil.
pub(crate) fn install_load_file(env: &Env) {
    let root = env.downgrade();
    env.set_str(
        "load-file",
        Value::native_fn(NativeFn::with_ctx("load-file", move |ctx, args| {
            check_arity!(args, "load-file", 1);
            let path = args[0]
                .as_str()
                .ok_or_else(|| EnsembleError::type_error("string", args[0].type_name()))?;
            let source = std::fs::read_to_string(path)
                .map_err(|e| EnsembleError::io(format!("load-file {path}: {e}")))?;
            tracing::debug!(path, bytes = source.len(), "load-file");
            eval_string(ctx, &source, &upgrade(&root)?)?;
            Ok(Value::Nil)
        })),
    );
}
