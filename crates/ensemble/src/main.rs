use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use ensemble::{error_message, pr_str, Interpreter, InterpreterBuilder};

/// Deep non-tail recursion needs far more than the default main-thread stack.
const INTERPRETER_STACK_SIZE: usize = 256 * 1024 * 1024;

/// Nesting limit for the CLI, sized for `INTERPRETER_STACK_SIZE`.
const CLI_MAX_EVAL_DEPTH: usize = 10_000;

#[derive(Parser)]
#[command(name = "ensemble", version, about = "Ensemble: a small Lisp with tail calls and macros")]
struct Cli {
    /// File to execute
    file: Option<PathBuf>,

    /// Arguments bound to *ARGV* when running a file
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,

    /// Evaluate an expression and print the result
    #[arg(short, long)]
    eval: Option<String>,

    /// Disable slurp, spit and load-file
    #[arg(long)]
    no_io: bool,

    /// Maximum nested evaluation depth
    #[arg(long, default_value_t = CLI_MAX_EVAL_DEPTH)]
    max_depth: usize,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env("ENSEMBLE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let handle = std::thread::Builder::new()
        .name("ensemble".into())
        .stack_size(INTERPRETER_STACK_SIZE)
        .spawn(move || run(cli));
    match handle.map(|h| h.join()) {
        Ok(Ok(code)) => code,
        Ok(Err(_)) => {
            eprintln!("error: interpreter thread panicked");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: failed to start interpreter thread: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> ExitCode {
    let interpreter = InterpreterBuilder::new()
        .with_io(!cli.no_io)
        .max_eval_depth(cli.max_depth)
        .with_argv(cli.args)
        .build();

    if let Some(expr) = &cli.eval {
        return match interpreter.rep(expr) {
            Ok(out) => {
                println!("{out}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", error_message(&e));
                ExitCode::FAILURE
            }
        };
    }

    if let Some(file) = &cli.file {
        return run_file(&interpreter, file);
    }

    repl(&interpreter)
}

/// Evaluate a script in the root environment, like `load-file`.
fn run_file(interpreter: &Interpreter, file: &Path) -> ExitCode {
    let source = match std::fs::read_to_string(file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read {}: {e}", file.display());
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(path = %file.display(), "running script");
    match interpreter.eval_str(&source) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", error_message(&e));
            ExitCode::FAILURE
        }
    }
}

fn repl(interpreter: &Interpreter) -> ExitCode {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("error: failed to create line editor: {e}");
            return ExitCode::FAILURE;
        }
    };
    let history_path = history_path();
    let _ = rl.load_history(&history_path);

    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { "user> " } else { "  ... " };
        match rl.readline(prompt) {
            Ok(line) => {
                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&line);

                if buffer.trim().is_empty() {
                    buffer.clear();
                    continue;
                }

                match interpreter.eval_str(&buffer) {
                    Ok(val) => println!("{}", pr_str(&val, true)),
                    // Keep reading until the form is complete
                    Err(e) if e.is_unbalanced() => continue,
                    Err(e) => eprintln!("{}", error_message(&e)),
                }
                let _ = rl.add_history_entry(buffer.trim());
                buffer.clear();
            }
            Err(ReadlineError::Interrupted) => {
                if !buffer.is_empty() {
                    buffer.clear();
                    println!("^C");
                    continue;
                }
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("error: {e}");
                break;
            }
        }
    }

    let _ = rl.save_history(&history_path);
    ExitCode::SUCCESS
}

fn history_path() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".ensemble_history")
}
