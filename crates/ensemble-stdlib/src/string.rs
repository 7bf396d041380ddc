use ensemble_core::{check_arity, pr_seq, register_fn, Namespace, Value};

use crate::{seq_arg, string_arg};

pub fn register(ns: &mut Namespace) {
    register_fn(ns, "pr-str", |args| Ok(Value::string(&pr_seq(args, true, " "))));

    register_fn(ns, "str", |args| Ok(Value::string(&pr_seq(args, false, ""))));

    register_fn(ns, "prn", |args| {
        println!("{}", pr_seq(args, true, " "));
        Ok(Value::Nil)
    });

    register_fn(ns, "println", |args| {
        println!("{}", pr_seq(args, false, " "));
        Ok(Value::Nil)
    });

    register_fn(ns, "read-string", |args| {
        check_arity!(args, "read-string", 1);
        ensemble_reader::read(string_arg(&args[0])?)
    });

    register_fn(ns, "trim", |args| {
        check_arity!(args, "trim", 1);
        Ok(Value::string(string_arg(&args[0])?.trim()))
    });

    // (join seq) separates with a space; a non-string delimiter is ignored
    register_fn(ns, "join", |args| {
        check_arity!(args, "join", 1..=2);
        let items = seq_arg(&args[0])?;
        let delim = args.get(1).and_then(Value::as_str).unwrap_or(" ");
        Ok(Value::string(&pr_seq(items, false, delim)))
    });

    register_fn(ns, "symbol", |args| {
        check_arity!(args, "symbol", 1);
        Ok(Value::symbol(string_arg(&args[0])?))
    });

    // A leading colon in the name is the keyword marker, not part of the name
    register_fn(ns, "keyword", |args| {
        check_arity!(args, "keyword", 1);
        match &args[0] {
            Value::Keyword(_) => Ok(args[0].clone()),
            other => {
                let name = string_arg(other)?;
                Ok(Value::keyword(name.strip_prefix(':').unwrap_or(name)))
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use crate::test_support::{call, n, read, s};
    use ensemble_core::{pr_str, EnsembleError, Value};

    #[test]
    fn pr_str_is_readable_and_spaced() {
        let out = call("pr-str", &[s("a\"b"), n(1.0), read(":k")]).unwrap();
        assert_eq!(out, s("\"a\\\"b\" 1 :k"));
        assert_eq!(call("pr-str", &[]).unwrap(), s(""));
    }

    #[test]
    fn str_is_raw_and_unspaced() {
        let out = call("str", &[s("a\"b"), n(1.0), read("(1 \"x\")")]).unwrap();
        assert_eq!(out, s("a\"b1(1 x)"));
    }

    #[test]
    fn printers_return_nil() {
        assert_eq!(call("prn", &[s("x")]).unwrap(), Value::Nil);
        assert_eq!(call("println", &[s("x")]).unwrap(), Value::Nil);
    }

    #[test]
    fn read_string_reads_one_form() {
        let out = call("read-string", &[s("(+ 1 2) ignored")]).unwrap();
        assert_eq!(pr_str(&out, true), "(+ 1 2)");
        let err = call("read-string", &[s("(1")]).unwrap_err();
        assert!(err.is_unbalanced());
    }

    #[test]
    fn trim_and_join() {
        assert_eq!(call("trim", &[s("  x y \n")]).unwrap(), s("x y"));
        assert_eq!(call("join", &[read("[1 \"a\" :b]")]).unwrap(), s("1 a :b"));
        assert_eq!(call("join", &[read("(1 2 3)"), s("#")]).unwrap(), s("1#2#3"));
    }

    #[test]
    fn symbol_and_keyword_constructors() {
        assert_eq!(call("symbol", &[s("abc")]).unwrap(), Value::symbol("abc"));
        assert_eq!(call("keyword", &[s("abc")]).unwrap(), Value::keyword("abc"));
        assert_eq!(call("keyword", &[read(":k")]).unwrap(), Value::keyword("k"));
        let marked = call("keyword", &[s(":abc")]).unwrap();
        assert_eq!(marked, Value::keyword("abc"));
        assert_eq!(pr_str(&marked, true), ":abc");
        assert!(matches!(
            call("symbol", &[n(1.0)]),
            Err(EnsembleError::Type { .. })
        ));
    }
}
