mod eval;
mod prelude;
mod quasiquote;
mod special_forms;

pub use eval::{
    call_value, eval_ast, eval_string, eval_value, macroexpand, EvalResult, Interpreter,
    Trampoline,
};
pub use prelude::PRELUDE;
pub use quasiquote::expand as quasiquote_expand;
