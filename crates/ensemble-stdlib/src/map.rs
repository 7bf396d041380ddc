use ensemble_core::{check_arity, register_fn, EnsembleError, MapKey, Namespace, Value};

use crate::map_arg;

/// `(hash-map)` is empty, `(hash-map m)` copies `m`, otherwise alternating keys and values.
fn hash_map(args: &[Value]) -> Result<Value, EnsembleError> {
    match args {
        [m @ Value::Map(..)] => Ok(Value::map(map_arg(m)?.clone())),
        _ => Value::map_from_pairs(args),
    }
}

pub fn register(ns: &mut Namespace) {
    register_fn(ns, "hash-map", hash_map);
    register_fn(ns, "dict", hash_map);

    register_fn(ns, "assoc", |args| {
        check_arity!(args, "assoc", 1..);
        let mut entries = map_arg(&args[0])?.clone();
        let pairs = &args[1..];
        if pairs.len() % 2 != 0 {
            return Err(EnsembleError::eval(
                "assoc requires an even number of key/value forms",
            ));
        }
        for pair in pairs.chunks(2) {
            entries.insert(MapKey::from_value(&pair[0])?, pair[1].clone());
        }
        Ok(Value::map(entries))
    });

    register_fn(ns, "dissoc", |args| {
        check_arity!(args, "dissoc", 1..);
        let mut entries = map_arg(&args[0])?.clone();
        for key in &args[1..] {
            entries.remove(&MapKey::from_value(key)?);
        }
        Ok(Value::map(entries))
    });

    // Anything but a map reads as empty
    register_fn(ns, "get", |args| {
        check_arity!(args, "get", 2);
        let Value::Map(entries, _) = &args[0] else {
            return Ok(Value::Nil);
        };
        let key = MapKey::from_value(&args[1])?;
        Ok(entries.get(&key).cloned().unwrap_or(Value::Nil))
    });

    register_fn(ns, "contains?", |args| {
        check_arity!(args, "contains?", 2);
        let entries = map_arg(&args[0])?;
        let key = MapKey::from_value(&args[1])?;
        Ok(Value::Bool(entries.contains_key(&key)))
    });

    register_fn(ns, "keys", |args| {
        check_arity!(args, "keys", 1);
        let keys = map_arg(&args[0])?.keys().map(MapKey::to_value).collect();
        Ok(Value::list(keys))
    });

    register_fn(ns, "vals", |args| {
        check_arity!(args, "vals", 1);
        let vals = map_arg(&args[0])?.values().cloned().collect();
        Ok(Value::list(vals))
    });
}

#[cfg(test)]
mod tests {
    use crate::test_support::{call, read};
    use ensemble_core::{pr_str, EnsembleError, Value};

    fn show(name: &str, src: &[&str]) -> String {
        let args: Vec<Value> = src.iter().map(|x| read(x)).collect();
        pr_str(&call(name, &args).unwrap(), true)
    }

    #[test]
    fn hash_map_forms() {
        assert_eq!(show("hash-map", &[]), "{}");
        assert_eq!(show("hash-map", &[":a", "1", "\"b\"", "2"]), "{\"b\" 2 :a 1}");
        assert_eq!(show("hash-map", &["{:a 1}"]), "{:a 1}");
        assert_eq!(show("dict", &[":b", "2", ":a", "1"]), "{:a 1 :b 2}");
        assert_eq!(show("dict", &[]), "{}");
        assert!(matches!(
            call("hash-map", &[read(":a")]),
            Err(EnsembleError::Eval(_))
        ));
    }

    #[test]
    fn assoc_and_dissoc_copy() {
        let original = read("{:a 1}");
        let bigger = call("assoc", &[original.clone(), read(":b"), read("2")]).unwrap();
        assert_eq!(pr_str(&bigger, true), "{:a 1 :b 2}");
        assert_eq!(pr_str(&original, true), "{:a 1}");
        assert_eq!(show("assoc", &["{:a 1}", ":a", "9"]), "{:a 9}");
        assert_eq!(show("dissoc", &["{:a 1 :b 2}", ":a", ":zz"]), "{:b 2}");
    }

    #[test]
    fn get_and_contains() {
        assert_eq!(show("get", &["{:a 1}", ":a"]), "1");
        assert_eq!(show("get", &["{:a 1}", ":b"]), "nil");
        assert_eq!(show("get", &["nil", ":a"]), "nil");
        assert_eq!(show("contains?", &["{:a nil}", ":a"]), "true");
        assert_eq!(show("contains?", &["{:a 1}", "\"a\""]), "false");
    }

    #[test]
    fn keys_and_vals_follow_key_order() {
        assert_eq!(show("keys", &["{:b 2 :a 1}"]), "(:a :b)");
        assert_eq!(show("vals", &["{:b 2 :a 1}"]), "(1 2)");
    }

    #[test]
    fn invalid_key_is_type_error() {
        let err = call("get", &[read("{}"), read("[1]")]).unwrap_err();
        assert!(matches!(err, EnsembleError::Type { .. }));
    }
}
