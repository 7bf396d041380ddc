#![allow(dead_code)]

use std::thread;

use ensemble::{error_message, Interpreter, InterpreterBuilder};

/// Error details that can cross a thread boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// Error node name, e.g. `TypeError`.
    pub name: String,
    /// What the CLI would print, `error: ...`.
    pub message: String,
}

/// Run `f` on a thread with room for the default evaluation depth.
pub fn run_with_large_stack<F, T>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let handle = thread::Builder::new()
        .stack_size(256 * 1024 * 1024)
        .spawn(f)
        .expect("failed to spawn test thread with larger stack");
    handle.join().expect("test thread panicked")
}

/// Evaluate `src` in a fresh interpreter built by `build`, returning the
/// readable form of the last result.
pub fn rep_with<B>(build: B, src: &str) -> Result<String, Failure>
where
    B: FnOnce() -> Interpreter + Send + 'static,
{
    let src = src.to_string();
    run_with_large_stack(move || {
        let interp = build();
        interp.rep(&src).map_err(|e| Failure {
            name: e.name().to_string(),
            message: error_message(&e),
        })
    })
}

pub fn rep(src: &str) -> Result<String, Failure> {
    rep_with(Interpreter::new, src)
}

/// Evaluate and print, panicking on error.
pub fn eval(src: &str) -> String {
    rep(src).unwrap_or_else(|f| panic!("{src} failed: {}", f.message))
}

/// Evaluate expecting an error.
pub fn eval_err(src: &str) -> Failure {
    match rep(src) {
        Ok(out) => panic!("{src} should fail, got {out}"),
        Err(f) => f,
    }
}

pub fn sandboxed() -> Interpreter {
    InterpreterBuilder::new().without_io().build()
}
