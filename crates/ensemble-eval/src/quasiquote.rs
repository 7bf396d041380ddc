use ensemble_core::{intern, Value};

fn sym(name: &str) -> Value {
    Value::symbol(name)
}

fn head_is(items: &[Value], name: &str) -> bool {
    items.first().is_some_and(|h| h.is_symbol(intern(name)))
}

/// Rewrite a quasiquoted template into plain `cons`/`concat`/`vec`/`quote` calls.
pub fn expand(ast: &Value) -> Value {
    match ast {
        Value::Map(..) | Value::Symbol(_) => Value::list(vec![sym("quote"), ast.clone()]),
        Value::List(items, _) => {
            if head_is(items, "unquote") {
                return items.get(1).cloned().unwrap_or(Value::Nil);
            }
            fold_elements(items)
        }
        Value::Vector(items, _) => Value::list(vec![sym("vec"), fold_elements(items)]),
        _ => ast.clone(),
    }
}

/// Build the list right to left so `~@x` splices with `concat` and everything
/// else is prepended with `cons`.
fn fold_elements(items: &[Value]) -> Value {
    items.iter().rev().fold(Value::list(vec![]), |acc, elt| {
        match elt.as_list() {
            Some(inner) if head_is(inner, "splice-unquote") => Value::list(vec![
                sym("concat"),
                inner.get(1).cloned().unwrap_or(Value::Nil),
                acc,
            ]),
            _ => Value::list(vec![sym("cons"), expand(elt), acc]),
        }
    })
}
