mod arithmetic;
mod atom;
mod comparison;
mod errors;
mod io;
mod list;
mod map;
mod meta;
mod predicates;
mod string;

use ensemble_core::{EnsembleError, MapEntries, Namespace, Value};

/// Every pure builtin: arithmetic, collections, strings, atoms and errors.
pub fn core_namespace() -> Namespace {
    let mut ns = Namespace::new("core");
    arithmetic::register(&mut ns);
    comparison::register(&mut ns);
    predicates::register(&mut ns);
    list::register(&mut ns);
    map::register(&mut ns);
    string::register(&mut ns);
    meta::register(&mut ns);
    atom::register(&mut ns);
    errors::register(&mut ns);
    ns
}

/// File system builtins (`slurp`, `spit`). Left out of sandboxed interpreters.
pub fn io_namespace() -> Namespace {
    let mut ns = Namespace::new("io");
    io::register(&mut ns);
    ns
}

pub(crate) fn number_arg(val: &Value) -> Result<f64, EnsembleError> {
    val.as_number()
        .ok_or_else(|| EnsembleError::type_error("number", val.type_name()))
}

pub(crate) fn string_arg(val: &Value) -> Result<&str, EnsembleError> {
    val.as_str()
        .ok_or_else(|| EnsembleError::type_error("string", val.type_name()))
}

/// Elements of a list or vector.
pub(crate) fn seq_arg(val: &Value) -> Result<&[Value], EnsembleError> {
    val.as_seq()
        .ok_or_else(|| EnsembleError::type_error("list or vector", val.type_name()))
}

pub(crate) fn map_arg(val: &Value) -> Result<&MapEntries, EnsembleError> {
    val.as_map()
        .ok_or_else(|| EnsembleError::type_error("map", val.type_name()))
}
