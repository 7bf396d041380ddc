//! Ensemble: a small Lisp with tail calls, macros and structured errors.
//!
//! This crate is the embedding API: configure an interpreter with
//! [`InterpreterBuilder`], then feed it source text.
//!
//! # Quick Start
//!
//! ```no_run
//! use ensemble::{InterpreterBuilder, Value};
//!
//! let interp = InterpreterBuilder::new().build();
//! let result = interp.eval_str("(+ 1 2)").unwrap();
//! assert_eq!(result, Value::number(3.0));
//! ```

use ensemble_core::NativeFn;

// Re-export core types.
pub use ensemble_core::{
    intern, pr_str, resolve, EnsembleError, Env, ErrorValue, Namespace, Value,
    DEFAULT_MAX_EVAL_DEPTH,
};
pub use ensemble_reader::{read, read_many};

pub type Result<T> = std::result::Result<T, EnsembleError>;

/// Result of evaluating an Ensemble expression.
pub type EvalResult = Result<Value>;

/// Builder for configuring and constructing an [`Interpreter`].
///
/// By default the core library and file access are both enabled.
pub struct InterpreterBuilder {
    stdlib: bool,
    io: bool,
    max_eval_depth: usize,
    argv: Vec<String>,
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self {
            stdlib: true,
            io: true,
            max_eval_depth: DEFAULT_MAX_EVAL_DEPTH,
            argv: Vec::new(),
        }
    }

    /// Enable or disable the core library (default: `true`).
    ///
    /// Without it only the special forms, `eval` and the io builtins are
    /// bound. The prelude (`not`, `cond`) is skipped too.
    pub fn with_stdlib(mut self, enable: bool) -> Self {
        self.stdlib = enable;
        self
    }

    /// Enable or disable `slurp`, `spit` and `load-file` (default: `true`).
    pub fn with_io(mut self, enable: bool) -> Self {
        self.io = enable;
        self
    }

    /// Cap on nested (non-tail) evaluation. Exceeding it raises a `RangeError`.
    pub fn max_eval_depth(mut self, depth: usize) -> Self {
        self.max_eval_depth = depth;
        self
    }

    /// Arguments exposed to programs as `*ARGV*`.
    pub fn with_argv(mut self, argv: Vec<String>) -> Self {
        self.argv = argv;
        self
    }

    pub fn without_io(self) -> Self {
        self.with_io(false)
    }

    /// Build the [`Interpreter`] with the configured options.
    pub fn build(self) -> Interpreter {
        let mut namespaces = Vec::new();
        if self.stdlib {
            namespaces.push(ensemble_stdlib::core_namespace());
        }
        if self.io {
            namespaces.push(ensemble_stdlib::io_namespace());
        }

        let inner = ensemble_eval::Interpreter::with_namespaces(namespaces);
        if self.io {
            inner.enable_load_file();
        }
        if self.stdlib {
            if let Err(e) = inner.load_prelude() {
                tracing::error!(error = %e, "prelude failed to load");
            }
        }
        inner.ctx.set_max_eval_depth(self.max_eval_depth);
        inner.set_argv(&self.argv);

        Interpreter { inner }
    }
}

/// An Ensemble interpreter instance.
///
/// Use [`InterpreterBuilder`] for fine-grained control, or call
/// [`Interpreter::new`] for a default interpreter.
pub struct Interpreter {
    inner: ensemble_eval::Interpreter,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    /// Create an [`InterpreterBuilder`] for fine-grained configuration.
    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    /// Evaluate a single parsed [`Value`] in the root environment.
    pub fn eval(&self, expr: &Value) -> EvalResult {
        self.inner.eval(expr)
    }

    /// Read and evaluate every form in `input`, returning the last result.
    ///
    /// Definitions (`def!`, `defmacro!`) persist across calls.
    pub fn eval_str(&self, input: &str) -> EvalResult {
        self.inner.eval_str(input)
    }

    /// Read, evaluate and print: the readable form of the last result.
    pub fn rep(&self, input: &str) -> Result<String> {
        self.eval_str(input).map(|v| pr_str(&v, true))
    }

    /// Register a native function that can be called from Ensemble code.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ensemble::{EnsembleError, Interpreter, Value};
    ///
    /// let interp = Interpreter::new();
    /// interp.register_fn("square", |args: &[Value]| match args {
    ///     [Value::Number(n)] => Ok(Value::number(n * n)),
    ///     _ => Err(EnsembleError::eval("square takes one number")),
    /// });
    /// ```
    pub fn register_fn<F>(&self, name: &str, f: F)
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        self.inner
            .global_env
            .set_str(name, Value::native_fn(NativeFn::simple(name, f)));
    }

    /// Rebind `*ARGV*`.
    pub fn set_argv(&self, args: &[String]) {
        self.inner.set_argv(args);
    }

    pub fn max_eval_depth(&self) -> usize {
        self.inner.ctx.max_eval_depth.get()
    }

    /// Return a reference to the root environment.
    pub fn global_env(&self) -> &Env {
        &self.inner.global_env
    }
}

/// The text printed for an uncaught error: `error: ` followed by the
/// non-readable form of its Error node.
pub fn error_message(err: &EnsembleError) -> String {
    format!("error: {}", pr_str(&err.to_value(), false))
}
