mod common;

use common::{eval, eval_err};

#[test]
fn test_arithmetic_builtins() {
    assert_eq!(eval("(+)"), "0");
    assert_eq!(eval("(*)"), "1");
    assert_eq!(eval("(- 5)"), "-5");
    assert_eq!(eval("(/ 4)"), "0.25");
    assert_eq!(eval("(- 10 1 2 3)"), "4");
    assert_eq!(eval("(/ 1 0)"), "inf");
    assert_eq!(eval("(number? (time-ms))"), "true");
    assert_eq!(eval_err("(-)").name, "ArgumentCountError");
    assert_eq!(eval_err("(* 2 :a)").name, "TypeError");
}

#[test]
fn test_comparison_builtins() {
    assert_eq!(eval("(list (< 1 2) (<= 2 2) (> 1 2) (>= 3 2))"), "(true true false true)");
    assert_eq!(eval("(= \"a\" \"a\")"), "true");
    assert_eq!(eval("(= (atom 1) (atom 1))"), "false");
    assert_eq!(eval_err("(< 1 \"2\")").name, "TypeError");
}

#[test]
fn test_predicates() {
    assert_eq!(
        eval("(list (nil? nil) (true? true) (false? nil) (symbol? 'a) (keyword? :a))"),
        "(true true false true true)"
    );
    assert_eq!(
        eval("(list (number? 1) (string? \"s\") (list? []) (vector? []) (map? {}))"),
        "(true true false true true)"
    );
    assert_eq!(
        eval("(defmacro! m (fn* () 1)) (list (fn? m) (macro? m) (fn? +) (fn? (fn* () 1)))"),
        "(false true true true)"
    );
    assert_eq!(
        eval("(list (sequential? '()) (sequential? {}) (atom? (atom 1)) (error? 1))"),
        "(true false true false)"
    );
}

#[test]
fn test_list_construction() {
    assert_eq!(eval("(cons 0 [1 2])"), "(0 1 2)");
    assert_eq!(eval("(concat [1] '(2) [] '(3 4))"), "(1 2 3 4)");
    assert_eq!(eval("(concat)"), "()");
    assert_eq!(eval("(vec '(1 2))"), "[1 2]");
    assert_eq!(eval("(vec [1 2])"), "[1 2]");
    assert_eq!(eval("(vector 1 \"a\")"), "[1 \"a\"]");
}

#[test]
fn test_list_access() {
    assert_eq!(eval("(nth '(a b c) 2)"), "c");
    assert_eq!(eval_err("(nth [1 2] -1)").name, "RangeError");
    assert_eq!(eval_err("(nth [1 2] 1.5)").name, "RangeError");
    assert_eq!(eval("(list (first []) (first nil) (first [7 8]))"), "(nil nil 7)");
    assert_eq!(eval("(list (last []) (last '(1 2 3)))"), "(nil 3)");
    assert_eq!(eval("(list (rest [1 2 3]) (rest []) (rest nil))"), "((2 3) () ())");
    assert_eq!(eval("(list (count nil) (count [1 2]) (count {:a 1}))"), "(0 2 1)");
    assert_eq!(eval("(list (empty? []) (empty? '(1)))"), "(true false)");
    assert_eq!(eval_err("(count 5)").name, "TypeError");
}

#[test]
fn test_conj_and_seq() {
    assert_eq!(eval("(conj '(3) 2 1)"), "(1 2 3)");
    assert_eq!(eval("(conj [1] 2 3)"), "[1 2 3]");
    assert_eq!(eval("(seq [1 2])"), "(1 2)");
    assert_eq!(eval("(seq \"ab\")"), "(\"a\" \"b\")");
    assert_eq!(eval("(list (seq []) (seq \"\") (seq nil))"), "(nil nil nil)");
}

#[test]
fn test_map_builtins() {
    assert_eq!(eval("(hash-map :b 2 :a 1)"), "{:a 1 :b 2}");
    assert_eq!(eval("(hash-map)"), "{}");
    assert_eq!(eval("(assoc {:a 1} :b 2 :a 3)"), "{:a 3 :b 2}");
    assert_eq!(eval("(dissoc {:a 1 :b 2} :a :missing)"), "{:b 2}");
    assert_eq!(eval("(list (get {:a 1} :a) (get {:a 1} :b) (get nil :a))"), "(1 nil nil)");
    assert_eq!(eval("(list (contains? {:a nil} :a) (contains? {} :a))"), "(true false)");
    assert_eq!(eval("(keys {:b 2 \"a\" 1})"), "(\"a\" :b)");
    assert_eq!(eval("(vals {:b 2 \"a\" 1})"), "(1 2)");
    assert_eq!(eval_err("(assoc {} :a)").name, "Error");
    assert_eq!(eval_err("(hash-map [1] 2)").name, "TypeError");
}

#[test]
fn test_map_keys_keep_their_kind() {
    assert_eq!(eval("(get {1 :num \"1\" :str} 1)"), ":num");
    assert_eq!(eval("(get (assoc {} 'sym 1) 'sym)"), "1");
    assert_eq!(eval("(= (first (keys {'s 1})) 's)"), "true");
}

#[test]
fn test_string_builtins() {
    assert_eq!(eval("(pr-str \"a\" 1 [:k])"), r#""\"a\" 1 [:k]""#);
    assert_eq!(eval("(str \"a\" 1 nil [\"b\"])"), r#""a1nil[b]""#);
    assert_eq!(eval("(str)"), "\"\"");
    assert_eq!(eval("(read-string \"(+ 1 2)\")"), "(+ 1 2)");
    assert_eq!(eval("(read-string \"\")"), "nil");
    assert_eq!(eval("(trim \"  x y \\n\")"), "\"x y\"");
    assert_eq!(eval("(join [1 \"b\" :c])"), "\"1 b :c\"");
    assert_eq!(eval("(join '(1 2) \", \")"), "\"1, 2\"");
    assert_eq!(eval("(symbol \"abc\")"), "abc");
    assert_eq!(eval("(list (keyword \"k\") (keyword :k))"), "(:k :k)");
    assert_eq!(eval("(keyword \":k\")"), ":k");
    assert_eq!(eval("(= (keyword \":k\") :k)"), "true");
    assert_eq!(eval("(list (prn 1) (println \"x\"))"), "(nil nil)");
}

#[test]
fn test_print_read_round_trip() {
    let src = r#"(= (read-string (pr-str {:a [1 "q\"uote\n"] "k" '(x y)})) {:a [1 "q\"uote\n"] "k" '(x y)})"#;
    assert_eq!(eval(src), "true");
}

#[test]
fn test_error_builtins() {
    assert_eq!(
        eval("(try* (throw 1 \"Custom\" :why) (catch* e (list (error-value e) (error-name e) (error-cause e))))"),
        "(1 \"Custom\" :why)"
    );
    assert_eq!(eval("(try* (throw 1) (catch* e (error-cause e)))"), "nil");
    assert_eq!(eval("(try* (throw 1) (catch* e (error-name e)))"), "\"Error\"");
    assert_eq!(eval_err("(throw 1 :not-a-string)").name, "TypeError");
    assert_eq!(eval_err("(error-value 1)").name, "TypeError");
}

#[test]
fn test_meta_rejects_scalars() {
    assert_eq!(eval_err("(with-meta 1 {})").name, "TypeError");
    assert_eq!(eval("(meta [1])"), "nil");
}

#[test]
fn test_atom_builtins() {
    assert_eq!(eval("(def! a (atom 1)) (list (reset! a 2) @a)"), "(2 2)");
    assert_eq!(eval("(def! a (atom 1)) (swap! a + 10)"), "11");
    assert_eq!(eval_err("(deref 1)").name, "TypeError");
}
