use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use lasso::{Rodeo, Spur};

use crate::context::EvalContext;
use crate::env::Env;
use crate::error::EnsembleError;
use crate::printer::pr_str;

thread_local! {
    static INTERNER: RefCell<Rodeo> = RefCell::new(Rodeo::default());
}

/// Intern a string, returning a Spur key.
pub fn intern(s: &str) -> Spur {
    INTERNER.with(|r| r.borrow_mut().get_or_intern(s))
}

/// Resolve a Spur key back to a String.
pub fn resolve(spur: Spur) -> String {
    INTERNER.with(|r| r.borrow().resolve(&spur).to_string())
}

/// Resolve a Spur and call f with the &str, avoiding allocation.
pub fn with_resolved<F, R>(spur: Spur, f: F) -> R
where
    F: FnOnce(&str) -> R,
{
    INTERNER.with(|r| {
        let interner = r.borrow();
        f(interner.resolve(&spur))
    })
}

/// Compare two Spurs by their resolved string content (lexicographic).
pub fn compare_spurs(a: Spur, b: Spur) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    INTERNER.with(|r| {
        let interner = r.borrow();
        interner.resolve(&a).cmp(interner.resolve(&b))
    })
}

/// Metadata attached with `with-meta`. Never part of equality.
pub type Meta = Option<Rc<Value>>;

pub type NativeFnInner = dyn Fn(&EvalContext, &[Value]) -> Result<Value, EnsembleError>;

/// A host function registered into an environment.
pub struct NativeFn {
    pub name: String,
    pub func: Box<NativeFnInner>,
}

impl NativeFn {
    pub fn simple(
        name: impl Into<String>,
        f: impl Fn(&[Value]) -> Result<Value, EnsembleError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Box::new(move |_ctx, args| f(args)),
        }
    }

    /// A native that needs the evaluation context, e.g. to call back into closures.
    pub fn with_ctx(
        name: impl Into<String>,
        f: impl Fn(&EvalContext, &[Value]) -> Result<Value, EnsembleError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Box::new(f),
        }
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native-fn {}>", self.name)
    }
}

/// A user-defined function: parameters, one body form and the captured scope.
pub struct Closure {
    pub params: Vec<Spur>,
    pub body: Value,
    pub env: Env,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| resolve(*p)).collect();
        f.debug_struct("Closure")
            .field("params", &params)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum FnKind {
    Native(Rc<NativeFn>),
    Closure(Rc<Closure>),
}

#[derive(Debug, Clone)]
pub struct Function {
    pub kind: FnKind,
    pub is_macro: bool,
    pub meta: Meta,
}

impl Function {
    /// Copy of this function flagged as a macro.
    pub fn to_macro(&self) -> Function {
        Function {
            kind: self.kind.clone(),
            is_macro: true,
            meta: self.meta.clone(),
        }
    }
}

/// The payload of an Error node.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorValue {
    pub payload: Value,
    pub name: String,
    pub cause: Option<Value>,
}

impl ErrorValue {
    pub fn new(payload: Value) -> Self {
        ErrorValue {
            payload,
            name: "Error".to_string(),
            cause: None,
        }
    }
}

/// A map key. Its `Ord` is the canonical key order used for printing
/// and for `keys`/`vals`.
#[derive(Debug, Clone)]
pub enum MapKey {
    Number(f64),
    String(Rc<str>),
    Keyword(Spur),
    Symbol(Spur),
}

impl MapKey {
    pub fn from_value(value: &Value) -> Result<MapKey, EnsembleError> {
        match value {
            // -0.0 and 0.0 are the same key
            Value::Number(n) if *n == 0.0 => Ok(MapKey::Number(0.0)),
            Value::Number(n) => Ok(MapKey::Number(*n)),
            Value::String(s) => Ok(MapKey::String(Rc::clone(s))),
            Value::Keyword(k) => Ok(MapKey::Keyword(*k)),
            Value::Symbol(s) => Ok(MapKey::Symbol(*s)),
            other => Err(EnsembleError::type_error(
                "string, keyword, symbol or number as map key",
                other.type_name(),
            )),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            MapKey::Number(n) => Value::Number(*n),
            MapKey::String(s) => Value::String(Rc::clone(s)),
            MapKey::Keyword(k) => Value::Keyword(*k),
            MapKey::Symbol(s) => Value::Symbol(*s),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            MapKey::Number(_) => 0,
            MapKey::String(_) => 1,
            MapKey::Keyword(_) => 2,
            MapKey::Symbol(_) => 3,
        }
    }
}

impl PartialEq for MapKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MapKey {}

impl PartialOrd for MapKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MapKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (MapKey::Number(a), MapKey::Number(b)) => a.total_cmp(b),
            (MapKey::String(a), MapKey::String(b)) => a.cmp(b),
            (MapKey::Keyword(a), MapKey::Keyword(b)) => compare_spurs(*a, *b),
            (MapKey::Symbol(a), MapKey::Symbol(b)) => compare_spurs(*a, *b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

pub type MapEntries = BTreeMap<MapKey, Value>;

/// The core Value type for all Ensemble data.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Symbol(Spur),
    /// Stores the bare name; printed with a leading `:`.
    Keyword(Spur),
    List(Rc<Vec<Value>>, Meta),
    Vector(Rc<Vec<Value>>, Meta),
    Map(Rc<MapEntries>, Meta),
    Function(Rc<Function>),
    Atom(Rc<RefCell<Value>>),
    Error(Rc<ErrorValue>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Keyword(_) => "keyword",
            Value::List(..) => "list",
            Value::Vector(..) => "vector",
            Value::Map(..) => "map",
            Value::Function(f) if f.is_macro => "macro",
            Value::Function(_) => "function",
            Value::Atom(_) => "atom",
            Value::Error(_) => "error",
        }
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_symbol_spur(&self) -> Option<Spur> {
        match self {
            Value::Symbol(s) => Some(*s),
            _ => None,
        }
    }

    pub fn is_symbol(&self, name: Spur) -> bool {
        matches!(self, Value::Symbol(s) if *s == name)
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items, _) => Some(items),
            _ => None,
        }
    }

    /// Elements of a List or Vector.
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::List(items, _) | Value::Vector(items, _) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapEntries> {
        match self {
            Value::Map(entries, _) => Some(entries),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Rc<Function>> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn is_macro(&self) -> bool {
        matches!(self, Value::Function(f) if f.is_macro)
    }

    pub fn nil() -> Value {
        Value::Nil
    }

    pub fn number(n: f64) -> Value {
        Value::Number(n)
    }

    pub fn string(s: &str) -> Value {
        Value::String(Rc::from(s))
    }

    pub fn symbol(s: &str) -> Value {
        Value::Symbol(intern(s))
    }

    pub fn keyword(s: &str) -> Value {
        Value::Keyword(intern(s))
    }

    pub fn list(v: Vec<Value>) -> Value {
        Value::List(Rc::new(v), None)
    }

    pub fn vector(v: Vec<Value>) -> Value {
        Value::Vector(Rc::new(v), None)
    }

    pub fn map(entries: MapEntries) -> Value {
        Value::Map(Rc::new(entries), None)
    }

    /// Build a map from alternating key/value items.
    pub fn map_from_pairs(items: &[Value]) -> Result<Value, EnsembleError> {
        if items.len() % 2 != 0 {
            return Err(EnsembleError::eval(
                "map requires an even number of key/value forms",
            ));
        }
        let mut entries = MapEntries::new();
        for pair in items.chunks(2) {
            entries.insert(MapKey::from_value(&pair[0])?, pair[1].clone());
        }
        Ok(Value::map(entries))
    }

    pub fn native_fn(native: NativeFn) -> Value {
        Value::Function(Rc::new(Function {
            kind: FnKind::Native(Rc::new(native)),
            is_macro: false,
            meta: None,
        }))
    }

    pub fn closure(closure: Closure) -> Value {
        Value::Function(Rc::new(Function {
            kind: FnKind::Closure(Rc::new(closure)),
            is_macro: false,
            meta: None,
        }))
    }

    pub fn atom(v: Value) -> Value {
        Value::Atom(Rc::new(RefCell::new(v)))
    }

    pub fn error(e: ErrorValue) -> Value {
        Value::Error(Rc::new(e))
    }

    pub fn meta(&self) -> Value {
        let meta = match self {
            Value::List(_, m) | Value::Vector(_, m) | Value::Map(_, m) => m.as_deref(),
            Value::Function(f) => f.meta.as_deref(),
            _ => None,
        };
        meta.cloned().unwrap_or(Value::Nil)
    }

    /// A copy of this value carrying `meta`. Only functions and collections take metadata.
    pub fn with_meta(&self, meta: Value) -> Result<Value, EnsembleError> {
        let meta = Some(Rc::new(meta));
        match self {
            Value::List(items, _) => Ok(Value::List(Rc::clone(items), meta)),
            Value::Vector(items, _) => Ok(Value::Vector(Rc::clone(items), meta)),
            Value::Map(entries, _) => Ok(Value::Map(Rc::clone(entries), meta)),
            Value::Function(f) => Ok(Value::Function(Rc::new(Function {
                kind: f.kind.clone(),
                is_macro: f.is_macro,
                meta,
            }))),
            other => Err(EnsembleError::type_error(
                "function, list, vector or map for metadata",
                other.type_name(),
            )),
        }
    }
}

fn seq_eq(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
}

/// Structural equality: deep, cross-variant for lists and vectors, metadata ignored.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Keyword(a), Value::Keyword(b)) => a == b,
            (
                Value::List(a, _) | Value::Vector(a, _),
                Value::List(b, _) | Value::Vector(b, _),
            ) => Rc::ptr_eq(a, b) || seq_eq(a, b),
            (Value::Map(a, _), Value::Map(b, _)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other| v == other))
            }
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Atom(a), Value::Atom(b)) => Rc::ptr_eq(a, b),
            (Value::Error(a), Value::Error(b)) => Rc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&pr_str(self, true))
    }
}
