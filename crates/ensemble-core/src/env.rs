use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use hashbrown::HashMap as SpurMap;
use lasso::Spur;

use crate::context::EvalContext;
use crate::error::EnsembleError;
use crate::value::{intern, resolve, NativeFn, Value};

type Bindings = Rc<RefCell<SpurMap<Spur, Value>>>;

/// An Ensemble environment: a chain of scopes with bindings.
///
/// Cloning an `Env` clones the handle, not the frame. Every clone sees the same
/// bindings, so `set` through one handle is visible through all of them.
#[derive(Clone)]
pub struct Env {
    pub bindings: Bindings,
    pub parent: Option<Rc<Env>>,
}

impl Env {
    pub fn new() -> Self {
        Env {
            bindings: Rc::new(RefCell::new(SpurMap::new())),
            parent: None,
        }
    }

    pub fn with_parent(parent: Rc<Env>) -> Self {
        Env {
            bindings: Rc::new(RefCell::new(SpurMap::new())),
            parent: Some(parent),
        }
    }

    /// A fresh child frame of `self`.
    pub fn child(&self) -> Env {
        Env::with_parent(Rc::new(self.clone()))
    }

    /// A child frame of `outer` with `binds` zipped positionally against `exprs`.
    ///
    /// The symbol `&` makes the following name capture every remaining expression
    /// as a List. Names without a matching expression are bound to nil; surplus
    /// expressions are ignored.
    pub fn bind(outer: &Env, binds: &[Spur], exprs: &[Value]) -> Env {
        let env = outer.child();
        let amp = intern("&");
        let mut i = 0;
        while i < binds.len() {
            if binds[i] == amp {
                if let Some(rest_name) = binds.get(i + 1) {
                    let rest = exprs.get(i..).map(<[Value]>::to_vec).unwrap_or_default();
                    env.set(*rest_name, Value::list(rest));
                }
                break;
            }
            env.set(binds[i], exprs.get(i).cloned().unwrap_or(Value::Nil));
            i += 1;
        }
        env
    }

    /// Assemble a root environment from namespaces, in order. A later binding
    /// of the same name shadows an earlier one.
    pub fn bootstrap(namespaces: impl IntoIterator<Item = Namespace>) -> Env {
        let env = Env::new();
        for ns in namespaces {
            tracing::debug!(namespace = ns.name, bindings = ns.len(), "bootstrap");
            for (name, value) in ns.entries {
                env.set(name, value);
            }
        }
        env
    }

    /// Insert or overwrite in the local frame only.
    pub fn set(&self, name: Spur, val: Value) {
        self.bindings.borrow_mut().insert(name, val);
    }

    pub fn set_str(&self, name: &str, val: Value) {
        self.set(intern(name), val);
    }

    /// The nearest frame, starting at `self`, that binds `name`.
    pub fn find_env(&self, name: Spur) -> Option<Env> {
        let mut current = self;
        loop {
            if current.bindings.borrow().contains_key(&name) {
                return Some(current.clone());
            }
            match &current.parent {
                Some(parent) => current = parent.as_ref(),
                None => return None,
            }
        }
    }

    /// Look a name up through the chain without raising.
    pub fn lookup(&self, name: Spur) -> Option<Value> {
        let env = self.find_env(name)?;
        let val = env.bindings.borrow().get(&name).cloned();
        val
    }

    pub fn get(&self, name: Spur) -> Result<Value, EnsembleError> {
        self.lookup(name)
            .ok_or_else(|| EnsembleError::Reference(resolve(name)))
    }

    pub fn get_str(&self, name: &str) -> Result<Value, EnsembleError> {
        self.get(intern(name))
    }

    /// A non-owning handle, for natives stored inside the frame they refer to.
    pub fn downgrade(&self) -> WeakEnv {
        WeakEnv {
            bindings: Rc::downgrade(&self.bindings),
            parent: self.parent.clone(),
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("bindings", &self.bindings.borrow().len())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

#[derive(Clone)]
pub struct WeakEnv {
    bindings: Weak<RefCell<SpurMap<Spur, Value>>>,
    parent: Option<Rc<Env>>,
}

impl WeakEnv {
    pub fn upgrade(&self) -> Option<Env> {
        self.bindings.upgrade().map(|bindings| Env {
            bindings,
            parent: self.parent.clone(),
        })
    }
}

/// A named, ordered set of bindings inserted into the root environment at startup.
pub struct Namespace {
    pub name: &'static str,
    entries: Vec<(Spur, Value)>,
}

impl Namespace {
    pub fn new(name: &'static str) -> Self {
        Namespace {
            name,
            entries: Vec::new(),
        }
    }

    pub fn define(&mut self, name: &str, value: Value) {
        self.entries.push((intern(name), value));
    }

    pub fn entries(&self) -> &[(Spur, Value)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Register a native function into a namespace.
pub fn register_fn(
    ns: &mut Namespace,
    name: &str,
    f: impl Fn(&[Value]) -> Result<Value, EnsembleError> + 'static,
) {
    ns.define(name, Value::native_fn(NativeFn::simple(name, f)));
}

/// Register a native that needs the evaluation context.
pub fn register_fn_ctx(
    ns: &mut Namespace,
    name: &str,
    f: impl Fn(&EvalContext, &[Value]) -> Result<Value, EnsembleError> + 'static,
) {
    ns.define(name, Value::native_fn(NativeFn::with_ctx(name, f)));
}
