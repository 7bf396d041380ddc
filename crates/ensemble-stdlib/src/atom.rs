use std::cell::RefCell;
use std::rc::Rc;

use ensemble_core::{
    call_callback, check_arity, register_fn, register_fn_ctx, EnsembleError, Namespace, Value,
};

fn atom_arg(val: &Value) -> Result<&Rc<RefCell<Value>>, EnsembleError> {
    match val {
        Value::Atom(cell) => Ok(cell),
        other => Err(EnsembleError::type_error("atom", other.type_name())),
    }
}

pub fn register(ns: &mut Namespace) {
    register_fn(ns, "atom", |args| {
        check_arity!(args, "atom", 1);
        Ok(Value::atom(args[0].clone()))
    });

    register_fn(ns, "deref", |args| {
        check_arity!(args, "deref", 1);
        Ok(atom_arg(&args[0])?.borrow().clone())
    });

    register_fn(ns, "reset!", |args| {
        check_arity!(args, "reset!", 2);
        *atom_arg(&args[0])?.borrow_mut() = args[1].clone();
        Ok(args[1].clone())
    });

    // The borrow is released before calling f, so f may deref the same atom
    register_fn_ctx(ns, "swap!", |ctx, args| {
        check_arity!(args, "swap!", 2..);
        let cell = atom_arg(&args[0])?;
        let mut call_args = Vec::with_capacity(args.len() - 1);
        call_args.push(cell.borrow().clone());
        call_args.extend_from_slice(&args[2..]);
        let new_val = call_callback(ctx, &args[1], &call_args)?;
        *cell.borrow_mut() = new_val.clone();
        Ok(new_val)
    });
}
