use ensemble_core::{check_arity, register_fn, Namespace, Value};

fn predicate(ns: &mut Namespace, name: &'static str, test: fn(&Value) -> bool) {
    register_fn(ns, name, move |args| {
        check_arity!(args, name, 1);
        Ok(Value::Bool(test(&args[0])))
    });
}

pub fn register(ns: &mut Namespace) {
    predicate(ns, "nil?", |v| matches!(v, Value::Nil));
    predicate(ns, "true?", |v| matches!(v, Value::Bool(true)));
    predicate(ns, "false?", |v| matches!(v, Value::Bool(false)));
    predicate(ns, "symbol?", |v| matches!(v, Value::Symbol(_)));
    predicate(ns, "keyword?", |v| matches!(v, Value::Keyword(_)));
    predicate(ns, "number?", |v| matches!(v, Value::Number(_)));
    predicate(ns, "string?", |v| matches!(v, Value::String(_)));
    predicate(ns, "fn?", |v| matches!(v, Value::Function(f) if !f.is_macro));
    predicate(ns, "macro?", Value::is_macro);
    predicate(ns, "list?", |v| matches!(v, Value::List(..)));
    predicate(ns, "vector?", |v| matches!(v, Value::Vector(..)));
    predicate(ns, "map?", |v| matches!(v, Value::Map(..)));
    predicate(ns, "sequential?", |v| {
        matches!(v, Value::List(..) | Value::Vector(..))
    });
    predicate(ns, "atom?", |v| matches!(v, Value::Atom(_)));
    predicate(ns, "error?", |v| matches!(v, Value::Error(_)));
}
