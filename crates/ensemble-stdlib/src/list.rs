use ensemble_core::{
    call_callback, check_arity, register_fn, register_fn_ctx, EnsembleError, Namespace, Value,
};

use crate::{number_arg, seq_arg};

pub fn register(ns: &mut Namespace) {
    register_fn(ns, "list", |args| Ok(Value::list(args.to_vec())));

    register_fn(ns, "vector", |args| Ok(Value::vector(args.to_vec())));

    register_fn(ns, "cons", |args| {
        check_arity!(args, "cons", 2);
        let tail = seq_arg(&args[1])?;
        let mut items = Vec::with_capacity(tail.len() + 1);
        items.push(args[0].clone());
        items.extend_from_slice(tail);
        Ok(Value::list(items))
    });

    register_fn(ns, "concat", |args| {
        let mut items = Vec::new();
        for arg in args {
            items.extend_from_slice(seq_arg(arg)?);
        }
        Ok(Value::list(items))
    });

    // Anything other than a list passes through unchanged
    register_fn(ns, "vec", |args| {
        check_arity!(args, "vec", 1);
        match &args[0] {
            Value::List(items, _) => Ok(Value::Vector(items.clone(), None)),
            other => Ok(other.clone()),
        }
    });

    register_fn(ns, "nth", |args| {
        check_arity!(args, "nth", 2);
        let items = seq_arg(&args[0])?;
        let index = number_arg(&args[1])?;
        if index < 0.0 || index.fract() != 0.0 {
            return Err(EnsembleError::range("out of range"));
        }
        items
            .get(index as usize)
            .cloned()
            .ok_or_else(|| EnsembleError::range("out of range"))
    });

    register_fn(ns, "first", |args| {
        check_arity!(args, "first", 1);
        Ok(args[0]
            .as_seq()
            .and_then(|items| items.first())
            .cloned()
            .unwrap_or(Value::Nil))
    });

    register_fn(ns, "last", |args| {
        check_arity!(args, "last", 1);
        Ok(args[0]
            .as_seq()
            .and_then(|items| items.last())
            .cloned()
            .unwrap_or(Value::Nil))
    });

    register_fn(ns, "rest", |args| {
        check_arity!(args, "rest", 1);
        let rest = match args[0].as_seq() {
            Some(items) if !items.is_empty() => items[1..].to_vec(),
            _ => Vec::new(),
        };
        Ok(Value::list(rest))
    });

    register_fn(ns, "count", |args| {
        check_arity!(args, "count", 1);
        let len = match &args[0] {
            Value::Nil => 0,
            Value::List(items, _) | Value::Vector(items, _) => items.len(),
            Value::Map(entries, _) => entries.len(),
            other => {
                return Err(EnsembleError::type_error(
                    "list, vector, map or nil",
                    other.type_name(),
                ))
            }
        };
        Ok(Value::number(len as f64))
    });

    register_fn(ns, "empty?", |args| {
        check_arity!(args, "empty?", 1);
        Ok(Value::Bool(seq_arg(&args[0])?.is_empty()))
    });

    // Lists grow at the front, vectors at the back
    register_fn(ns, "conj", |args| {
        check_arity!(args, "conj", 2..);
        let items = seq_arg(&args[0])?;
        let extra = &args[1..];
        match &args[0] {
            Value::List(..) => {
                let mut out: Vec<Value> = extra.iter().rev().cloned().collect();
                out.extend_from_slice(items);
                Ok(Value::list(out))
            }
            _ => {
                let mut out = items.to_vec();
                out.extend_from_slice(extra);
                Ok(Value::vector(out))
            }
        }
    });

    register_fn(ns, "seq", |args| {
        check_arity!(args, "seq", 1);
        match &args[0] {
            Value::List(items, _) if !items.is_empty() => Ok(args[0].clone()),
            Value::Vector(items, _) if !items.is_empty() => Ok(Value::list(items.to_vec())),
            Value::String(s) if !s.is_empty() => Ok(Value::list(
                s.chars()
                    .map(|c| Value::string(c.encode_utf8(&mut [0; 4])))
                    .collect(),
            )),
            _ => Ok(Value::Nil),
        }
    });

    // (apply f a b [c d]) calls (f a b c d)
    register_fn_ctx(ns, "apply", |ctx, args| {
        check_arity!(args, "apply", 2..);
        let (last, middle) = args[1..]
            .split_last()
            .ok_or_else(|| EnsembleError::arity("apply", "2+", args.len()))?;
        let mut call_args = middle.to_vec();
        call_args.extend_from_slice(seq_arg(last)?);
        call_callback(ctx, &args[0], &call_args)
    });

    register_fn_ctx(ns, "map", |ctx, args| {
        check_arity!(args, "map", 2);
        let items = seq_arg(&args[1])?;
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            out.push(call_callback(ctx, &args[0], std::slice::from_ref(item))?);
        }
        Ok(Value::list(out))
    });
}
