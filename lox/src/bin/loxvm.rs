//! Bytecode driver: `loxvm [path]`.
//!
//! Without an argument it drops into a read-eval-print loop; with a file it
//! compiles and runs it. Exit codes: 65 for compile errors, 70 for runtime
//! errors, 74 when the file cannot be read.

use std::io::{self, BufRead, Write};
use std::process;

use lox_bytecode::Chunk;
use lox_vm::{InterpretError, Vm};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let debug_trace = std::env::var("DEBUG_TRACE_EXECUTION").as_deref() == Ok("1");

    match args.len() {
        1 => repl(debug_trace),
        2 => run_file(&args[1], debug_trace),
        _ => {
            eprintln!("Usage: loxvm [path]");
            process::exit(64);
        }
    }
}

fn repl(debug_trace: bool) {
    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let _ = interpret(&line, debug_trace);
            }
        }
    }
}

fn run_file(path: &str, debug_trace: bool) {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Could not read file: {}", error);
            process::exit(74);
        }
    };

    match interpret(&source, debug_trace) {
        Ok(()) => (),
        Err(InterpretError::Compile) => process::exit(65),
        Err(InterpretError::Runtime) => process::exit(70),
    }
}

fn interpret(source: &str, debug_trace: bool) -> Result<(), InterpretError> {
    let mut chunk = Chunk::new();
    if !lox_compiler::compile(source, &mut chunk) {
        return Err(InterpretError::Compile);
    }

    let mut vm = Vm::new(&chunk);
    vm.debug_trace = debug_trace;
    vm.run().map(|_| ())
}
