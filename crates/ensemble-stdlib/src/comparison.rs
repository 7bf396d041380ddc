use ensemble_core::{check_arity, register_fn, Namespace, Value};

use crate::number_arg;

fn compare(ns: &mut Namespace, name: &'static str, op: fn(f64, f64) -> bool) {
    register_fn(ns, name, move |args| {
        check_arity!(args, name, 2);
        Ok(Value::Bool(op(number_arg(&args[0])?, number_arg(&args[1])?)))
    });
}

pub fn register(ns: &mut Namespace) {
    register_fn(ns, "=", |args| {
        check_arity!(args, "=", 2);
        Ok(Value::Bool(args[0] == args[1]))
    });

    compare(ns, "<", |a, b| a < b);
    compare(ns, "<=", |a, b| a <= b);
    compare(ns, ">", |a, b| a > b);
    compare(ns, ">=", |a, b| a >= b);
}
