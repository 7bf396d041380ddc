use std::fmt;
use std::rc::Rc;

use crate::printer::pr_str;
use crate::value::{ErrorValue, Value};

/// Check arity of a native function's arguments, returning `EnsembleError::Arity` on mismatch.
///
/// # Forms
///
/// ```ignore
/// check_arity!(args, "fn-name", 2);        // exactly 2
/// check_arity!(args, "fn-name", 1..=3);    // 1 to 3 inclusive
/// check_arity!(args, "fn-name", 2..);      // 2 or more
/// ```
#[macro_export]
macro_rules! check_arity {
    ($args:expr, $name:expr, $exact:literal) => {
        if $args.len() != $exact {
            return Err($crate::EnsembleError::arity(
                $name,
                stringify!($exact),
                $args.len(),
            ));
        }
    };
    ($args:expr, $name:expr, $lo:literal ..= $hi:literal) => {
        if $args.len() < $lo || $args.len() > $hi {
            return Err($crate::EnsembleError::arity(
                $name,
                concat!(stringify!($lo), "-", stringify!($hi)),
                $args.len(),
            ));
        }
    };
    ($args:expr, $name:expr, $lo:literal ..) => {
        if $args.len() < $lo {
            return Err($crate::EnsembleError::arity(
                $name,
                concat!(stringify!($lo), "+"),
                $args.len(),
            ));
        }
    };
}

/// A source position, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

impl Span {
    pub fn new(line: usize, col: usize) -> Self {
        Span { line, col }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EnsembleError {
    #[error("Syntax error at {span}: {message}")]
    Syntax { message: String, span: Span },

    /// Input ended inside an open form or string. A REPL can ask for more lines.
    #[error("Unbalanced input at {span}: {message}")]
    Unbalanced { message: String, span: Span },

    #[error("{0}")]
    Eval(String),

    #[error("Type error: expected {expected}, got {got}")]
    Type { expected: String, got: String },

    #[error("Wrong number of arguments: {name} expects {expected}, got {got}")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },

    #[error("The variable name '{0}' has not been declared.")]
    Reference(String),

    #[error("{0}")]
    Range(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("{}", payload_text(.0))]
    Thrown(Rc<ErrorValue>),
}

fn payload_text(e: &ErrorValue) -> String {
    pr_str(&e.payload, false)
}

impl EnsembleError {
    pub fn eval(msg: impl Into<String>) -> Self {
        EnsembleError::Eval(msg.into())
    }

    pub fn syntax(msg: impl Into<String>, span: Span) -> Self {
        EnsembleError::Syntax {
            message: msg.into(),
            span,
        }
    }

    pub fn unbalanced(msg: impl Into<String>, span: Span) -> Self {
        EnsembleError::Unbalanced {
            message: msg.into(),
            span,
        }
    }

    pub fn type_error(expected: impl Into<String>, got: impl Into<String>) -> Self {
        EnsembleError::Type {
            expected: expected.into(),
            got: got.into(),
        }
    }

    pub fn arity(name: impl Into<String>, expected: impl Into<String>, got: usize) -> Self {
        EnsembleError::Arity {
            name: name.into(),
            expected: expected.into(),
            got,
        }
    }

    pub fn range(msg: impl Into<String>) -> Self {
        EnsembleError::Range(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        EnsembleError::Io(msg.into())
    }

    /// Raise a user error carrying an arbitrary payload.
    pub fn thrown(payload: Value) -> Self {
        EnsembleError::Thrown(Rc::new(ErrorValue::new(payload)))
    }

    /// The error-node name this error normalizes to.
    pub fn name(&self) -> &str {
        match self {
            EnsembleError::Syntax { .. } | EnsembleError::Unbalanced { .. } => "SyntaxError",
            EnsembleError::Type { .. } => "TypeError",
            EnsembleError::Arity { .. } => "ArgumentCountError",
            EnsembleError::Reference(_) => "ReferenceError",
            EnsembleError::Range(_) => "RangeError",
            EnsembleError::Eval(_) | EnsembleError::Io(_) => "Error",
            EnsembleError::Thrown(e) => &e.name,
        }
    }

    /// Reader failures are fatal to the current read and never reach a `catch*`.
    pub fn is_catchable(&self) -> bool {
        !matches!(
            self,
            EnsembleError::Syntax { .. } | EnsembleError::Unbalanced { .. }
        )
    }

    pub fn is_unbalanced(&self) -> bool {
        matches!(self, EnsembleError::Unbalanced { .. })
    }

    /// Normalize into an Error node. User errors pass through unchanged; everything
    /// else becomes an Error whose payload is the message string.
    pub fn to_value(&self) -> Value {
        match self {
            EnsembleError::Thrown(e) => Value::Error(Rc::clone(e)),
            other => Value::Error(Rc::new(ErrorValue {
                payload: Value::string(&other.to_string()),
                name: other.name().to_string(),
                cause: None,
            })),
        }
    }
}

impl From<std::io::Error> for EnsembleError {
    fn from(e: std::io::Error) -> Self {
        EnsembleError::Io(e.to_string())
    }
}
