// monkey - The Monkey programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::process;

use monkey_core::{eval_program, Env, Object, BUILTINS};
use monkey_parser::Parser;
use monkey_vm::{Compiler, SymbolTable, Vm, GLOBALS_SIZE};

const PROMPT: &str = ">> ";

#[derive(Clone, Copy, PartialEq)]
enum Engine {
    Vm,
    Eval,
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut engine = Engine::Vm;
    let mut file: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--version" | "-v" => {
                println!("Monkey v0.1.0");
                return;
            }
            "--engine" => {
                i += 1;
                match args.get(i).map(String::as_str) {
                    Some("vm") => engine = Engine::Vm,
                    Some("eval") => engine = Engine::Eval,
                    other => {
                        eprintln!(
                            "unknown engine {:?} (use 'vm' or 'eval')",
                            other.unwrap_or("")
                        );
                        process::exit(1);
                    }
                }
            }
            arg => file = Some(arg.to_string()),
        }
        i += 1;
    }

    match file {
        Some(path) => run_file(&path, engine),
        None => {
            let user = env::var("USER").unwrap_or_else(|_| "there".to_string());
            println!("Hello {}! This is the Monkey programming language!", user);
            println!("Feel free to type in commands");
            run_repl(engine);
        }
    }
}

/// Parse and run a source file, printing the final value.
fn run_file(path: &str, engine: Engine) {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error reading '{}': {}", path, err);
            process::exit(1);
        }
    };

    let mut parser = Parser::from_source(&source);
    let program = parser.parse_program();
    if !parser.errors().is_empty() {
        print_parser_errors(parser.errors());
        process::exit(1);
    }

    let result = match engine {
        Engine::Eval => {
            let env = Env::new();
            eval_program(&program, &env)
        }
        Engine::Vm => {
            let mut compiler = Compiler::new();
            if let Err(err) = compiler.compile(&program) {
                eprintln!("compiler error: {}", err);
                process::exit(1);
            }
            let mut vm = Vm::new(compiler.bytecode());
            if let Err(err) = vm.run() {
                eprintln!("vm error: {}", err);
                process::exit(1);
            }
            vm.last_popped().clone()
        }
    };

    println!("{}", result.inspect());
}

/// The interactive prompt. Compiler state and globals persist across lines,
/// so definitions from earlier lines stay visible.
fn run_repl(engine: Engine) {
    let stdin = io::stdin();

    // VM engine state
    let mut symbol_table = SymbolTable::new();
    for (i, builtin) in BUILTINS.iter().enumerate() {
        symbol_table.define_builtin(i, builtin.name);
    }
    let mut constants: Vec<Object> = Vec::new();
    let mut globals: Vec<Object> = vec![Object::Null; GLOBALS_SIZE];

    // Evaluator engine state
    let env = Env::new();

    loop {
        print!("{}", PROMPT);
        io::stdout().flush().expect("flushing stdout");

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => {
                println!();
                return;
            }
            Ok(_) => {}
            Err(err) => {
                eprintln!("Read error: {}", err);
                return;
            }
        }
        if line.trim().is_empty() {
            continue;
        }

        let mut parser = Parser::from_source(&line);
        let program = parser.parse_program();
        if !parser.errors().is_empty() {
            print_parser_errors(parser.errors());
            continue;
        }

        if engine == Engine::Eval {
            let result = eval_program(&program, &env);
            println!("{}", result.inspect());
            continue;
        }

        let mut compiler = Compiler::with_state(
            std::mem::take(&mut symbol_table),
            std::mem::take(&mut constants),
        );
        let compiled = compiler.compile(&program);
        let bytecode = compiled.is_ok().then(|| compiler.bytecode());
        (symbol_table, constants) = compiler.into_state();

        let bytecode = match compiled {
            Ok(()) => bytecode.expect("bytecode of a successful compile"),
            Err(err) => {
                println!("Woops! Compilation failed:\n {}", err);
                continue;
            }
        };

        let mut vm = Vm::with_globals(bytecode, std::mem::take(&mut globals));
        match vm.run() {
            Ok(()) => {
                println!("{}", vm.last_popped().inspect());
                globals = vm.into_globals();
            }
            Err(err) => {
                println!("Woops! Executing bytecode failed:\n {}", err);
                globals = vm.into_globals();
            }
        }
    }
}

fn print_parser_errors(errors: &[String]) {
    for error in errors {
        eprintln!("\t{}", error);
    }
}
