pub mod context;
pub mod env;
pub mod error;
pub mod printer;
pub mod value;

pub use context::{call_callback, set_call_callback, EvalContext, DEFAULT_MAX_EVAL_DEPTH};
pub use env::{register_fn, register_fn_ctx, Env, Namespace, WeakEnv};
pub use error::{EnsembleError, Span};
pub use lasso::Spur;
pub use printer::{escape_str, pr_seq, pr_str};
pub use value::{
    compare_spurs, intern, resolve, with_resolved, Closure, ErrorValue, FnKind, Function,
    MapEntries, MapKey, Meta, NativeFn, Value,
};
