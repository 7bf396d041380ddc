use ensemble_core::{check_arity, register_fn, EnsembleError, Namespace, Value};

pub fn register(ns: &mut Namespace) {
    register_fn(ns, "meta", |args| {
        check_arity!(args, "meta", 1);
        match &args[0] {
            Value::List(..) | Value::Vector(..) | Value::Map(..) | Value::Function(_) => {
                Ok(args[0].meta())
            }
            other => Err(EnsembleError::type_error(
                "function, list, vector or map",
                other.type_name(),
            )),
        }
    });

    register_fn(ns, "with-meta", |args| {
        check_arity!(args, "with-meta", 2);
        args[0].with_meta(args[1].clone())
    });
}
