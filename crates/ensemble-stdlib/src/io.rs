use ensemble_core::{check_arity, register_fn, EnsembleError, Namespace, Value};

use crate::string_arg;

pub fn register(ns: &mut Namespace) {
    register_fn(ns, "slurp", |args| {
        check_arity!(args, "slurp", 1);
        let path = string_arg(&args[0])?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| EnsembleError::io(format!("slurp {path}: {e}")))?;
        tracing::debug!(path, bytes = content.len(), "slurp");
        Ok(Value::string(&content))
    });

    // Writes the raw text of strings and the printed form of anything else
    register_fn(ns, "spit", |args| {
        check_arity!(args, "spit", 2);
        let path = string_arg(&args[0])?;
        let content = ensemble_core::pr_str(&args[1], false);
        std::fs::write(path, &content)
            .map_err(|e| EnsembleError::io(format!("spit {path}: {e}")))?;
        tracing::debug!(path, bytes = content.len(), "spit");
        Ok(Value::Nil)
    });
}
