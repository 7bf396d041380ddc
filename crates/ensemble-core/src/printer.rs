use crate::value::{with_resolved, FnKind, MapKey, Value};

/// Render a value as text. Readable output escapes strings so the reader can
/// parse it back; display output emits string contents verbatim.
pub fn pr_str(value: &Value, readably: bool) -> String {
    let mut out = String::new();
    write_value(&mut out, value, readably);
    out
}

/// Print each value and join the results with `sep`.
pub fn pr_seq(values: &[Value], readably: bool, sep: &str) -> String {
    let mut out = String::new();
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        write_value(&mut out, v, readably);
    }
    out
}

pub fn escape_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

fn write_items(out: &mut String, items: &[Value], readably: bool, open: char, close: char) {
    out.push(open);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write_value(out, item, readably);
    }
    out.push(close);
}

fn write_value(out: &mut String, value: &Value, readably: bool) {
    match value {
        Value::Nil => out.push_str("nil"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) if readably => out.push_str(&escape_str(s)),
        Value::String(s) => out.push_str(s),
        Value::Symbol(s) => with_resolved(*s, |name| out.push_str(name)),
        Value::Keyword(k) => with_resolved(*k, |name| {
            out.push(':');
            out.push_str(name);
        }),
        Value::List(items, _) => write_items(out, items, readably, '(', ')'),
        Value::Vector(items, _) => write_items(out, items, readably, '[', ']'),
        Value::Map(entries, _) => {
            out.push('{');
            for (i, (k, v)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_value(out, &MapKey::to_value(k), readably);
                out.push(' ');
                write_value(out, v, readably);
            }
            out.push('}');
        }
        Value::Function(f) => match (&f.kind, f.is_macro) {
            (_, true) => out.push_str("#<macro>"),
            (FnKind::Native(n), false) => {
                out.push_str("#<fn ");
                out.push_str(&n.name);
                out.push('>');
            }
            (FnKind::Closure(_), false) => out.push_str("#<fn>"),
        },
        Value::Atom(cell) => {
            out.push_str("(atom ");
            write_value(out, &cell.borrow(), readably);
            out.push(')');
        }
        Value::Error(e) => write_value(out, &e.payload, readably),
    }
}
