use std::rc::Rc;

use ensemble_core::{check_arity, register_fn, EnsembleError, ErrorValue, Namespace, Value};

use crate::string_arg;

fn error_arg(val: &Value) -> Result<&Rc<ErrorValue>, EnsembleError> {
    match val {
        Value::Error(e) => Ok(e),
        other => Err(EnsembleError::type_error("error", other.type_name())),
    }
}

pub fn register(ns: &mut Namespace) {
    // (throw payload [name [cause]]); a lone Error node is re-raised as is
    register_fn(ns, "throw", |args| {
        check_arity!(args, "throw", 1..=3);
        if let [Value::Error(e)] = args {
            return Err(EnsembleError::Thrown(Rc::clone(e)));
        }
        let mut error = ErrorValue::new(args[0].clone());
        if let Some(name) = args.get(1) {
            error.name = string_arg(name)?.to_string();
        }
        error.cause = args.get(2).cloned();
        Err(EnsembleError::Thrown(Rc::new(error)))
    });

    register_fn(ns, "error-value", |args| {
        check_arity!(args, "error-value", 1);
        Ok(error_arg(&args[0])?.payload.clone())
    });

    register_fn(ns, "error-name", |args| {
        check_arity!(args, "error-name", 1);
        Ok(Value::string(&error_arg(&args[0])?.name))
    });

    register_fn(ns, "error-cause", |args| {
        check_arity!(args, "error-cause", 1);
        Ok(error_arg(&args[0])?.cause.clone().unwrap_or(Value::Nil))
    });
}
