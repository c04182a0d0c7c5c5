//! TeenyJVM driver: `teenyjvm <class-file>` loads a single `.class` file,
//! resolves its `main([Ljava/lang/String;)V`, and runs it to completion.
//!
//! Argument parsing is hand-rolled rather than built on a parsing crate, so
//! the wrong-arity path matches the exact contract the engine's test suite
//! expects: anything other than one positional argument prints a usage line
//! to stderr and exits 1, with no crate-specific usage formatting in between.

mod error;

use std::process::ExitCode;

use error::CliError;
use teenyjvm_core::{execute, find_method, ClassFile, ClassFileError, Heap, OptionalValue};

const MAIN_NAME: &str = "main";
const MAIN_DESCRIPTOR: &str = "([Ljava/lang/String;)V";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("teenyjvm");

    if args.iter().skip(1).any(|a| a == "--version") {
        println!("teenyjvm {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }
    if args.iter().skip(1).any(|a| a == "-h" || a == "--help") {
        print_usage(program);
        return ExitCode::SUCCESS;
    }

    let verbose = args.iter().skip(1).any(|a| a == "-v" || a == "--verbose");
    init_logging(verbose);

    let positional: Vec<&String> =
        args.iter().skip(1).filter(|a| !a.starts_with('-')).collect();

    if positional.len() != 1 {
        print_usage(program);
        return ExitCode::from(1);
    }

    match run(positional[0]) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("usage: {program} <class-file>");
}

/// Trace output goes to stderr only, so it never contaminates the program's
/// own `println` output on stdout.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "teenyjvm_core=trace,teenyjvm_cli=trace" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

fn run(path: &str) -> Result<(), CliError> {
    let data = std::fs::read(path)?;
    let class = ClassFile::parse(&data)?;
    let main = find_method(&class, MAIN_NAME, MAIN_DESCRIPTOR).ok_or_else(|| {
        ClassFileError::MethodNotFound {
            name: MAIN_NAME.to_string(),
            descriptor: MAIN_DESCRIPTOR.to_string(),
        }
    })?;

    let locals = vec![0i32; main.max_locals as usize];
    let mut heap = Heap::new();
    let result = execute(main, locals, &class, &mut heap)?;
    if result != OptionalValue::Void {
        return Err(CliError::MainReturnedValue);
    }
    Ok(())
}
