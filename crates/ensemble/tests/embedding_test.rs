mod common;

use common::{rep_with, run_with_large_stack, sandboxed};
use ensemble::{error_message, EnsembleError, Interpreter, InterpreterBuilder, Value};

#[test]
fn test_definitions_persist_across_calls() {
    let out = run_with_large_stack(|| {
        let interp = Interpreter::new();
        interp.eval_str("(def! counter (atom 0))").unwrap();
        interp.eval_str("(swap! counter + 5)").unwrap();
        interp.rep("@counter").unwrap()
    });
    assert_eq!(out, "5");
}

#[test]
fn test_register_fn_is_callable() {
    let out = run_with_large_stack(|| {
        let interp = Interpreter::new();
        interp.register_fn("square", |args: &[Value]| match args {
            [Value::Number(n)] => Ok(Value::number(n * n)),
            _ => Err(EnsembleError::eval("square takes one number")),
        });
        let mapped = interp.rep("(map square [1 2 3])").unwrap();
        let err = interp.eval_str("(square :x)").unwrap_err();
        (mapped, err.to_string())
    });
    assert_eq!(out.0, "(1 4 9)");
    assert_eq!(out.1, "square takes one number");
}

#[test]
fn test_eval_takes_parsed_forms() {
    let out = run_with_large_stack(|| {
        let interp = Interpreter::new();
        let form = ensemble::read("(* 6 7)").unwrap();
        ensemble::pr_str(&interp.eval(&form).unwrap(), true)
    });
    assert_eq!(out, "42");
}

#[test]
fn test_global_env_is_shared() {
    let out = run_with_large_stack(|| {
        let interp = Interpreter::new();
        interp.global_env().set_str("answer", Value::number(42.0));
        interp.rep("(+ answer 0)").unwrap()
    });
    assert_eq!(out, "42");
}

#[test]
fn test_argv_binding() {
    let out = rep_with(
        || {
            InterpreterBuilder::new()
                .with_argv(vec!["a".into(), "--flag".into()])
                .build()
        },
        "*ARGV*",
    );
    assert_eq!(out.unwrap(), "(\"a\" \"--flag\")");
    assert_eq!(rep_with(Interpreter::new, "*ARGV*").unwrap(), "()");
}

#[test]
fn test_host_language() {
    assert_eq!(
        rep_with(Interpreter::new, "*host-language*").unwrap(),
        "\"ensemble\""
    );
}

#[test]
fn test_small_depth_limit() {
    let build = || InterpreterBuilder::new().max_eval_depth(50).build();
    let err = rep_with(build, "(def! f (fn* (n) (if (= n 0) 0 (+ 1 (f (- n 1)))))) (f 100)")
        .unwrap_err();
    assert_eq!(err.name, "RangeError");

    let ok = rep_with(build, "(def! f (fn* (n) (if (= n 0) 0 (+ 1 (f (- n 1)))))) (f 5)");
    assert_eq!(ok.unwrap(), "5");

    let depth = run_with_large_stack(move || build().max_eval_depth());
    assert_eq!(depth, 50);
}

#[test]
fn test_default_depth_limit_fits_standard_stack() {
    let handle = std::thread::Builder::new()
        .stack_size(8 * 1024 * 1024)
        .spawn(|| {
            let interp = Interpreter::new();
            let err = interp
                .eval_str("(def! f (fn* (n) (if (= n 0) 0 (+ 1 (f (- n 1)))))) (f 20000)")
                .unwrap_err();
            let recovered = interp.rep("(f 100)").unwrap();
            (err.name().to_string(), recovered)
        })
        .unwrap();
    let (name, recovered) = handle.join().unwrap();
    assert_eq!(name, "RangeError");
    assert_eq!(recovered, "100");
}

#[test]
fn test_without_stdlib_only_special_forms() {
    let build = || InterpreterBuilder::new().with_stdlib(false).without_io().build();
    assert_eq!(rep_with(build, "(let* (x 1) (if x [x] nil))").unwrap(), "[1]");
    assert_eq!(rep_with(build, "(eval '(def! y 2)) y").unwrap(), "2");
    assert_eq!(rep_with(build, "(+ 1 2)").unwrap_err().name, "ReferenceError");
    assert_eq!(rep_with(build, "(not true)").unwrap_err().name, "ReferenceError");
}

#[test]
fn test_sandbox_hides_file_access() {
    for src in ["(slurp \"/etc/hostname\")", "(spit \"/tmp/x\" 1)", "(load-file \"x\")"] {
        let err = rep_with(sandboxed, src).unwrap_err();
        assert_eq!(err.name, "ReferenceError", "{src}");
    }
    assert_eq!(rep_with(sandboxed, "(cond false 1 :else 2)").unwrap(), "2");
}

#[test]
fn test_spit_then_slurp() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt");
    let src = format!(
        "(spit \"{p}\" \"hello\\nworld\") (slurp \"{p}\")",
        p = path.display()
    );
    assert_eq!(rep_with(Interpreter::new, &src).unwrap(), "\"hello\\nworld\"");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\nworld");
}

#[test]
fn test_load_file_defines_in_root() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lib.ens");
    std::fs::write(
        &path,
        "(def! twice (fn* (f x) (f (f x))))\n(defmacro! when (fn* (c x) `(if ~c ~x nil)))\n",
    )
    .unwrap();
    let src = format!(
        "(let* (ignored 1) (load-file \"{}\")) (when true (twice (fn* (n) (* n 3)) 2))",
        path.display()
    );
    assert_eq!(rep_with(Interpreter::new, &src).unwrap(), "18");
}

#[test]
fn test_missing_file_is_catchable() {
    let src = "(try* (slurp \"/no/such/file\") (catch* e (error-name e)))";
    assert_eq!(rep_with(Interpreter::new, src).unwrap(), "\"Error\"");
}

#[test]
fn test_error_message_format() {
    let out = run_with_large_stack(|| {
        let interp = Interpreter::new();
        let thrown = interp.eval_str("(throw \"oops\")").unwrap_err();
        let structured = interp.eval_str("(throw {:code 1})").unwrap_err();
        let native = interp.eval_str("(nth [] 0)").unwrap_err();
        (
            error_message(&thrown),
            error_message(&structured),
            error_message(&native),
        )
    });
    assert_eq!(out.0, "error: oops");
    assert_eq!(out.1, "error: {:code 1}");
    assert_eq!(out.2, "error: out of range");
}
